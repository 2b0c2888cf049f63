//! Option descriptors: one configurable value and how to reach it
//!
//! A descriptor never stores the value. It holds accessor closures over the
//! owner's live config object, so every read sees the current value and every
//! write goes straight to the owner.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::input::KeybindList;
use crate::view::controls::DrawHook;

/// Text computed every time it is shown, so owners can switch language at runtime
#[derive(Clone)]
pub struct LazyText(Rc<dyn Fn() -> String>);

impl LazyText {
    pub fn new(f: impl Fn() -> String + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn get(&self) -> String {
        (self.0)()
    }
}

impl From<&str> for LazyText {
    fn from(text: &str) -> Self {
        text.to_string().into()
    }
}

impl From<String> for LazyText {
    fn from(text: String) -> Self {
        Self::new(move || text.clone())
    }
}

impl fmt::Debug for LazyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LazyText({:?})", self.get())
    }
}

/// Which kind of value an option holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Bool,
    Int,
    Float,
    Text,
    Choice,
    Keybinds,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionKind::Bool => "boolean",
            OptionKind::Int => "integer",
            OptionKind::Float => "float",
            OptionKind::Text => "string",
            OptionKind::Choice => "choice",
            OptionKind::Keybinds => "keybind list",
        };
        f.write_str(name)
    }
}

/// A value passed through the type-erased accessors
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Choice(String),
    Keybinds(KeybindList),
}

impl OptionValue {
    pub fn kind(&self) -> OptionKind {
        match self {
            OptionValue::Bool(_) => OptionKind::Bool,
            OptionValue::Int(_) => OptionKind::Int,
            OptionValue::Float(_) => OptionKind::Float,
            OptionValue::Text(_) => OptionKind::Text,
            OptionValue::Choice(_) => OptionKind::Choice,
            OptionValue::Keybinds(_) => OptionKind::Keybinds,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Int(v) => Some(*v as f64),
            OptionValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(v) => write!(f, "{v}"),
            OptionValue::Int(v) => write!(f, "{v}"),
            OptionValue::Float(v) => write!(f, "{v}"),
            OptionValue::Text(v) | OptionValue::Choice(v) => f.write_str(v),
            OptionValue::Keybinds(v) => write!(f, "{v}"),
        }
    }
}

/// Inclusive numeric range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
    /// Given by the owner, rather than the type's natural range
    pub explicit: bool,
}

impl<T: PartialOrd + Copy + fmt::Display> Bounds<T> {
    fn resolve(min: Option<T>, max: Option<T>, natural: (T, T)) -> Result<Self, OptionError> {
        let bounds = Self {
            explicit: min.is_some() && max.is_some(),
            min: min.unwrap_or(natural.0),
            max: max.unwrap_or(natural.1),
        };
        if bounds.min > bounds.max {
            return Err(OptionError::InvalidBounds {
                min: bounds.min.to_string(),
                max: bounds.max.to_string(),
            });
        }
        Ok(bounds)
    }

    fn check(&self, value: T) -> Result<(), OptionError> {
        if value >= self.min && value <= self.max {
            Ok(())
        } else {
            Err(OptionError::OutOfRange {
                value: value.to_string(),
                min: self.min.to_string(),
                max: self.max.to_string(),
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericBounds {
    Int(Bounds<i64>),
    Float(Bounds<f64>),
}

impl NumericBounds {
    /// Both ends were given: edit with a slider rather than a text box
    pub fn is_explicit(&self) -> bool {
        match self {
            NumericBounds::Int(b) => b.explicit,
            NumericBounds::Float(b) => b.explicit,
        }
    }

    pub fn range_f64(&self) -> (f64, f64) {
        match self {
            NumericBounds::Int(b) => (b.min as f64, b.max as f64),
            NumericBounds::Float(b) => (b.min, b.max),
        }
    }
}

pub type Getter = Rc<dyn Fn() -> anyhow::Result<OptionValue>>;
pub type Setter = Rc<dyn Fn(OptionValue) -> anyhow::Result<()>>;
pub type Formatter = Rc<dyn Fn(&OptionValue) -> String>;

/// An owner-drawn option row
#[derive(Clone)]
pub struct CustomWidget {
    pub height: u16,
    pub draw: DrawHook,
    /// Called when the user saves, before the owner's save callback
    pub before_save: Option<Rc<dyn Fn()>>,
    /// Called after the owner's reset callback
    pub after_reset: Option<Rc<dyn Fn()>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptionError {
    InvalidBounds { min: String, max: String },
    KindMismatch { expected: OptionKind, found: OptionKind },
    OutOfRange { value: String, min: String, max: String },
    NotAllowed { value: String, allowed: Vec<String> },
    Accessor(String),
}

impl fmt::Display for OptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionError::InvalidBounds { min, max } => {
                write!(f, "Invalid bounds: min {min} is greater than max {max}")
            }
            OptionError::KindMismatch { expected, found } => {
                write!(f, "Expected a {expected} value, got a {found} value")
            }
            OptionError::OutOfRange { value, min, max } => {
                write!(f, "Value {value} is outside [{min}, {max}]")
            }
            OptionError::NotAllowed { value, allowed } => {
                write!(f, "Value '{value}' is not one of: {}", allowed.join(", "))
            }
            OptionError::Accessor(msg) => write!(f, "Accessor failed: {msg}"),
        }
    }
}

impl std::error::Error for OptionError {}

/// One configurable value
#[derive(Clone)]
pub struct OptionDescriptor {
    /// Stable id used by change hooks and keybind lookups
    pub field_id: Option<String>,
    name: LazyText,
    tooltip: Option<LazyText>,
    kind: OptionKind,
    getter: Getter,
    setter: Setter,
    bounds: Option<NumericBounds>,
    interval: Option<f64>,
    allowed: Vec<String>,
    formatter: Option<Formatter>,
    custom: Option<CustomWidget>,
    title_screen_only: bool,
}

impl fmt::Debug for OptionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionDescriptor")
            .field("field_id", &self.field_id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("bounds", &self.bounds)
            .field("allowed", &self.allowed)
            .field("title_screen_only", &self.title_screen_only)
            .finish()
    }
}

fn caught<T>(f: impl FnOnce() -> anyhow::Result<T>) -> Result<T, OptionError> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(OptionError::Accessor(format!("{err:#}"))),
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic".to_string());
            Err(OptionError::Accessor(msg))
        }
    }
}

impl OptionDescriptor {
    /// Descriptor over fallible, type-erased accessors
    pub fn new(name: impl Into<LazyText>, kind: OptionKind, getter: Getter, setter: Setter) -> Self {
        Self {
            field_id: None,
            name: name.into(),
            tooltip: None,
            kind,
            getter,
            setter,
            bounds: None,
            interval: None,
            allowed: Vec::new(),
            formatter: None,
            custom: None,
            title_screen_only: false,
        }
    }

    pub fn boolean(
        name: impl Into<LazyText>,
        get: impl Fn() -> bool + 'static,
        set: impl Fn(bool) + 'static,
    ) -> Self {
        Self::new(
            name,
            OptionKind::Bool,
            Rc::new(move || Ok(OptionValue::Bool(get()))),
            Rc::new(move |value| match value {
                OptionValue::Bool(v) => {
                    set(v);
                    Ok(())
                }
                other => anyhow::bail!("expected boolean, got {other:?}"),
            }),
        )
    }

    /// Integer option; omitted bounds fall back to the full i64 range
    pub fn integer(
        name: impl Into<LazyText>,
        get: impl Fn() -> i64 + 'static,
        set: impl Fn(i64) + 'static,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Result<Self, OptionError> {
        let bounds = Bounds::resolve(min, max, (i64::MIN, i64::MAX))?;
        let mut descriptor = Self::new(
            name,
            OptionKind::Int,
            Rc::new(move || Ok(OptionValue::Int(get()))),
            Rc::new(move |value| match value {
                OptionValue::Int(v) => {
                    set(v);
                    Ok(())
                }
                other => anyhow::bail!("expected integer, got {other:?}"),
            }),
        );
        descriptor.bounds = Some(NumericBounds::Int(bounds));
        Ok(descriptor)
    }

    /// Float option; omitted bounds fall back to the full finite f64 range
    pub fn float(
        name: impl Into<LazyText>,
        get: impl Fn() -> f64 + 'static,
        set: impl Fn(f64) + 'static,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<Self, OptionError> {
        if min.is_some_and(f64::is_nan) || max.is_some_and(f64::is_nan) {
            return Err(OptionError::InvalidBounds {
                min: format!("{min:?}"),
                max: format!("{max:?}"),
            });
        }
        let bounds = Bounds::resolve(min, max, (f64::MIN, f64::MAX))?;
        let mut descriptor = Self::new(
            name,
            OptionKind::Float,
            Rc::new(move || Ok(OptionValue::Float(get()))),
            Rc::new(move |value| match value {
                OptionValue::Float(v) => {
                    set(v);
                    Ok(())
                }
                other => anyhow::bail!("expected float, got {other:?}"),
            }),
        );
        descriptor.bounds = Some(NumericBounds::Float(bounds));
        Ok(descriptor)
    }

    pub fn text(
        name: impl Into<LazyText>,
        get: impl Fn() -> String + 'static,
        set: impl Fn(String) + 'static,
    ) -> Self {
        Self::new(
            name,
            OptionKind::Text,
            Rc::new(move || Ok(OptionValue::Text(get()))),
            Rc::new(move |value| match value {
                OptionValue::Text(v) => {
                    set(v);
                    Ok(())
                }
                other => anyhow::bail!("expected string, got {other:?}"),
            }),
        )
    }

    /// String option limited to `allowed`, shown as a dropdown in that order
    pub fn choice(
        name: impl Into<LazyText>,
        get: impl Fn() -> String + 'static,
        set: impl Fn(String) + 'static,
        allowed: Vec<String>,
    ) -> Self {
        let mut descriptor = Self::new(
            name,
            OptionKind::Choice,
            Rc::new(move || Ok(OptionValue::Choice(get()))),
            Rc::new(move |value| match value {
                OptionValue::Choice(v) => {
                    set(v);
                    Ok(())
                }
                other => anyhow::bail!("expected choice, got {other:?}"),
            }),
        );
        descriptor.allowed = allowed;
        descriptor
    }

    pub fn keybinds(
        name: impl Into<LazyText>,
        get: impl Fn() -> KeybindList + 'static,
        set: impl Fn(KeybindList) + 'static,
    ) -> Self {
        Self::new(
            name,
            OptionKind::Keybinds,
            Rc::new(move || Ok(OptionValue::Keybinds(get()))),
            Rc::new(move |value| match value {
                OptionValue::Keybinds(v) => {
                    set(v);
                    Ok(())
                }
                other => anyhow::bail!("expected keybind list, got {other:?}"),
            }),
        )
    }

    pub fn with_field_id(mut self, id: impl Into<String>) -> Self {
        self.field_id = Some(id.into());
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<LazyText>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// Snap step for slider-edited numbers
    pub fn with_interval(mut self, interval: f64) -> Self {
        self.interval = (interval > 0.0).then_some(interval);
        self
    }

    pub fn with_formatter(mut self, formatter: impl Fn(&OptionValue) -> String + 'static) -> Self {
        self.formatter = Some(Rc::new(formatter));
        self
    }

    pub fn with_custom_widget(mut self, widget: CustomWidget) -> Self {
        self.custom = Some(widget);
        self
    }

    pub fn title_screen_only(mut self, only: bool) -> Self {
        self.title_screen_only = only;
        self
    }

    pub fn name(&self) -> String {
        self.name.get()
    }

    pub fn tooltip(&self) -> Option<String> {
        self.tooltip.as_ref().map(LazyText::get).filter(|t| !t.is_empty())
    }

    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    pub fn bounds(&self) -> Option<NumericBounds> {
        self.bounds
    }

    pub fn interval(&self) -> Option<f64> {
        self.interval
    }

    pub fn allowed_values(&self) -> &[String] {
        &self.allowed
    }

    pub fn custom_widget(&self) -> Option<&CustomWidget> {
        self.custom.as_ref()
    }

    pub fn is_title_screen_only(&self) -> bool {
        self.title_screen_only
    }

    /// Current value from the owner. Errors and panics in the getter are caught.
    pub fn read(&self) -> Result<OptionValue, OptionError> {
        let value = caught(|| (self.getter)())?;
        if value.kind() != self.kind {
            return Err(OptionError::KindMismatch {
                expected: self.kind,
                found: value.kind(),
            });
        }
        Ok(value)
    }

    /// Check a value against kind, bounds and the allowed set
    pub fn validate(&self, value: &OptionValue) -> Result<(), OptionError> {
        if value.kind() != self.kind {
            return Err(OptionError::KindMismatch {
                expected: self.kind,
                found: value.kind(),
            });
        }
        match (value, &self.bounds) {
            (OptionValue::Int(v), Some(NumericBounds::Int(b))) => b.check(*v)?,
            (OptionValue::Float(v), Some(NumericBounds::Float(b))) => {
                if v.is_nan() {
                    return Err(OptionError::OutOfRange {
                        value: v.to_string(),
                        min: b.min.to_string(),
                        max: b.max.to_string(),
                    });
                }
                b.check(*v)?
            }
            (OptionValue::Choice(v), _) if !self.allowed.contains(v) => {
                return Err(OptionError::NotAllowed {
                    value: v.clone(),
                    allowed: self.allowed.clone(),
                });
            }
            _ => {}
        }
        Ok(())
    }

    /// Validate, then hand the value to the owner. Rejected values never reach the setter.
    pub fn write(&self, value: OptionValue) -> Result<(), OptionError> {
        self.validate(&value)?;
        caught(|| (self.setter)(value))
    }

    pub fn display_value(&self, value: &OptionValue) -> String {
        match &self.formatter {
            Some(formatter) => formatter(value),
            None => value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    fn int_option(store: &Rc<Cell<i64>>, min: Option<i64>, max: Option<i64>) -> OptionDescriptor {
        let get = store.clone();
        let set = store.clone();
        OptionDescriptor::integer("Speed", move || get.get(), move |v| set.set(v), min, max)
            .unwrap()
    }

    #[test]
    fn test_integer_round_trip_within_bounds() {
        let store = Rc::new(Cell::new(5));
        let option = int_option(&store, Some(1), Some(10));
        option.write(OptionValue::Int(7)).unwrap();
        assert_eq!(option.read().unwrap(), OptionValue::Int(7));
    }

    #[test]
    fn test_out_of_range_write_leaves_value() {
        let store = Rc::new(Cell::new(5));
        let option = int_option(&store, Some(1), Some(10));
        let err = option.write(OptionValue::Int(11)).unwrap_err();
        assert!(matches!(err, OptionError::OutOfRange { .. }));
        assert_eq!(store.get(), 5);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let result = OptionDescriptor::integer("x", || 0, |_| {}, Some(3), Some(1));
        assert!(matches!(result, Err(OptionError::InvalidBounds { .. })));
        let result = OptionDescriptor::float("x", || 0.0, |_| {}, Some(f64::NAN), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_bounds_are_natural_and_implicit() {
        let store = Rc::new(Cell::new(0));
        let option = int_option(&store, None, None);
        let Some(NumericBounds::Int(bounds)) = option.bounds() else {
            panic!("expected integer bounds");
        };
        assert_eq!((bounds.min, bounds.max), (i64::MIN, i64::MAX));
        assert!(!bounds.explicit);
        assert!(int_option(&store, Some(0), Some(1)).bounds().unwrap().is_explicit());
    }

    #[test]
    fn test_choice_rejects_unknown_value() {
        let store = Rc::new(RefCell::new("low".to_string()));
        let get = store.clone();
        let set = store.clone();
        let option = OptionDescriptor::choice(
            "Quality",
            move || get.borrow().clone(),
            move |v| *set.borrow_mut() = v,
            vec!["low".into(), "high".into()],
        );
        assert!(matches!(
            option.write(OptionValue::Choice("ultra".into())),
            Err(OptionError::NotAllowed { .. })
        ));
        option.write(OptionValue::Choice("high".into())).unwrap();
        assert_eq!(*store.borrow(), "high");
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let option = OptionDescriptor::boolean("On", || true, |_| {});
        assert!(matches!(
            option.write(OptionValue::Int(1)),
            Err(OptionError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_panicking_getter_is_contained() {
        let option = OptionDescriptor::text("Broken", || panic!("config gone"), |_| {});
        match option.read() {
            Err(OptionError::Accessor(msg)) => assert!(msg.contains("config gone")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_failing_setter_is_reported() {
        let option = OptionDescriptor::new(
            "Fallible",
            OptionKind::Bool,
            Rc::new(|| Ok(OptionValue::Bool(false))),
            Rc::new(|_| Err(anyhow::anyhow!("read-only"))),
        );
        assert_eq!(
            option.write(OptionValue::Bool(true)),
            Err(OptionError::Accessor("read-only".into()))
        );
    }

    #[test]
    fn test_lazy_name_reevaluated() {
        let lang = Rc::new(RefCell::new("Speed"));
        let source = lang.clone();
        let option = OptionDescriptor::boolean(LazyText::new(move || source.borrow().to_string()), || true, |_| {});
        assert_eq!(option.name(), "Speed");
        *lang.borrow_mut() = "Vitesse";
        assert_eq!(option.name(), "Vitesse");
    }

    #[test]
    fn test_formatter_used_for_display() {
        let option = OptionDescriptor::integer("Volume", || 50, |_| {}, Some(0), Some(100))
            .unwrap()
            .with_formatter(|v| format!("{v}%"));
        assert_eq!(option.display_value(&OptionValue::Int(50)), "50%");
        let plain = OptionDescriptor::boolean("On", || true, |_| {});
        assert_eq!(plain.display_value(&OptionValue::Bool(true)), "true");
    }
}
