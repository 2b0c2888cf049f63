//! Once-per-owner logging of integration mistakes
//!
//! Owners call the registration API every frame in some cases (for example
//! from an update hook), so the same mistake would otherwise flood the log.
//! Each distinct (owner, message) pair is logged once per session.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;

use crate::model::OwnerId;

#[derive(Debug, Default)]
pub struct IntegrationLog {
    reported: RefCell<HashSet<(OwnerId, String)>>,
}

impl IntegrationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a mistake in an owner's integration code. Returns true the first
    /// time this owner reports this message.
    pub fn report(&self, owner: &OwnerId, error: &dyn fmt::Display) -> bool {
        let message = error.to_string();
        if !self.reported.borrow_mut().insert((owner.clone(), message.clone())) {
            return false;
        }
        tracing::warn!(owner = %owner, "{message}");
        true
    }

    /// Log a failure the user will see (an option shown as unavailable)
    pub fn report_error(&self, owner: &OwnerId, error: &dyn fmt::Display) -> bool {
        let message = error.to_string();
        if !self.reported.borrow_mut().insert((owner.clone(), message.clone())) {
            return false;
        }
        tracing::error!(owner = %owner, "{message}");
        true
    }

    /// Warn once per owner that it uses an API slated for removal
    pub fn deprecated(&self, owner: &OwnerId, api: &str) -> bool {
        self.report(
            owner,
            &format_args!("uses deprecated API `{api}`; it will be removed in a future version"),
        )
    }

    pub fn was_reported(&self, owner: &OwnerId, message: &str) -> bool {
        self.reported
            .borrow()
            .contains(&(owner.clone(), message.to_string()))
    }
}
