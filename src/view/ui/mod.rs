//! Widget containers

pub mod root;

pub use root::RootElement;
