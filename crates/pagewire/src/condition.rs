//! Conditions a component can be asked to satisfy.
//!
//! A [`Condition`] is plain data. It says nothing about which components
//! support it; that decision belongs to each component's
//! [`crate::dispatch::HandlerTable`], keyed by [`ConditionKind`].
//!
//! ```rust,ignore
//! use pagewire::prelude::*;
//!
//! field.should(&visible())?.should(&value("Ada"))?;
//! checkbox.should_not(&checked())?;
//! ```

use std::fmt;
use std::sync::Arc;

use crate::dispatch::Probe;
use crate::result::PagewireResult;

/// Payload-free discriminant of a [`Condition`], used as the dispatch key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConditionKind {
    /// Rendered and visible
    Visible,
    /// Absent or not visible
    Hidden,
    /// Accepts interaction
    Enabled,
    /// Refuses interaction
    Disabled,
    /// Marked as mandatory
    Required,
    /// Cannot be edited
    Readonly,
    /// Can be edited
    Editable,
    /// Chosen among siblings (tab, row, option)
    Selected,
    /// Checkbox ticked
    Checked,
    /// Collapsible container open
    Expanded,
    /// Collapsible container closed
    Collapsed,
    /// Caption text equals
    Caption,
    /// Caption text contains
    CaptionContains,
    /// Input value equals
    Value,
    /// Input value contains
    ValueContains,
    /// Date part of a date input equals
    DateValue,
    /// User-supplied predicate
    Custom,
}

impl ConditionKind {
    /// Stable lowercase name used in diagnostics
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Required => "required",
            Self::Readonly => "readonly",
            Self::Editable => "editable",
            Self::Selected => "selected",
            Self::Checked => "checked",
            Self::Expanded => "expanded",
            Self::Collapsed => "collapsed",
            Self::Caption => "caption",
            Self::CaptionContains => "captionContains",
            Self::Value => "value",
            Self::ValueContains => "valueContains",
            Self::DateValue => "dateValue",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type Predicate = dyn Fn(&Probe<'_>) -> PagewireResult<bool> + Send + Sync;

/// Named predicate evaluated directly against a component probe.
///
/// Two custom conditions are equal when their names are equal.
#[derive(Clone)]
pub struct CustomCondition {
    name: String,
    predicate: Arc<Predicate>,
}

impl CustomCondition {
    /// Create a custom condition
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Probe<'_>) -> PagewireResult<bool> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Condition name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the predicate
    pub fn test(&self, probe: &Probe<'_>) -> PagewireResult<bool> {
        (self.predicate)(probe)
    }
}

impl fmt::Debug for CustomCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomCondition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CustomCondition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for CustomCondition {}

/// A predicate over a component's current state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Rendered and visible
    Visible,
    /// Absent or not visible
    Hidden,
    /// Accepts interaction
    Enabled,
    /// Refuses interaction
    Disabled,
    /// Marked as mandatory
    Required,
    /// Cannot be edited
    Readonly,
    /// Can be edited
    Editable,
    /// Chosen among siblings
    Selected,
    /// Checkbox ticked
    Checked,
    /// Collapsible container open
    Expanded,
    /// Collapsible container closed
    Collapsed,
    /// Caption equals the text after normalization
    Caption(String),
    /// Caption contains the text after normalization
    CaptionContains(String),
    /// Input value equals the text after normalization
    Value(String),
    /// Input value contains the text after normalization
    ValueContains(String),
    /// Date part equals the text exactly
    DateValue(String),
    /// Named predicate
    Custom(CustomCondition),
}

impl Condition {
    /// Dispatch key
    #[must_use]
    pub const fn kind(&self) -> ConditionKind {
        match self {
            Self::Visible => ConditionKind::Visible,
            Self::Hidden => ConditionKind::Hidden,
            Self::Enabled => ConditionKind::Enabled,
            Self::Disabled => ConditionKind::Disabled,
            Self::Required => ConditionKind::Required,
            Self::Readonly => ConditionKind::Readonly,
            Self::Editable => ConditionKind::Editable,
            Self::Selected => ConditionKind::Selected,
            Self::Checked => ConditionKind::Checked,
            Self::Expanded => ConditionKind::Expanded,
            Self::Collapsed => ConditionKind::Collapsed,
            Self::Caption(_) => ConditionKind::Caption,
            Self::CaptionContains(_) => ConditionKind::CaptionContains,
            Self::Value(_) => ConditionKind::Value,
            Self::ValueContains(_) => ConditionKind::ValueContains,
            Self::DateValue(_) => ConditionKind::DateValue,
            Self::Custom(_) => ConditionKind::Custom,
        }
    }

    /// Text payload of parameterized conditions
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Caption(text)
            | Self::CaptionContains(text)
            | Self::Value(text)
            | Self::ValueContains(text)
            | Self::DateValue(text) => Some(text),
            Self::Custom(custom) => Some(custom.name()),
            _ => None,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(custom) => write!(f, "{} '{}'", self.kind(), custom.name()),
            _ => match self.payload() {
                Some(text) => write!(f, "{} '{text}'", self.kind()),
                None => write!(f, "{}", self.kind()),
            },
        }
    }
}

/// Rendered and visible
#[must_use]
pub const fn visible() -> Condition {
    Condition::Visible
}

/// Absent or not visible
#[must_use]
pub const fn hidden() -> Condition {
    Condition::Hidden
}

/// Accepts interaction
#[must_use]
pub const fn enabled() -> Condition {
    Condition::Enabled
}

/// Refuses interaction
#[must_use]
pub const fn disabled() -> Condition {
    Condition::Disabled
}

/// Marked as mandatory
#[must_use]
pub const fn required() -> Condition {
    Condition::Required
}

/// Cannot be edited
#[must_use]
pub const fn readonly() -> Condition {
    Condition::Readonly
}

/// Can be edited
#[must_use]
pub const fn editable() -> Condition {
    Condition::Editable
}

/// Chosen among siblings
#[must_use]
pub const fn selected() -> Condition {
    Condition::Selected
}

/// Checkbox ticked
#[must_use]
pub const fn checked() -> Condition {
    Condition::Checked
}

/// Collapsible container open
#[must_use]
pub const fn expanded() -> Condition {
    Condition::Expanded
}

/// Collapsible container closed
#[must_use]
pub const fn collapsed() -> Condition {
    Condition::Collapsed
}

/// Caption equals `text`
#[must_use]
pub fn caption(text: impl Into<String>) -> Condition {
    Condition::Caption(text.into())
}

/// Caption contains `text`
#[must_use]
pub fn caption_contains(text: impl Into<String>) -> Condition {
    Condition::CaptionContains(text.into())
}

/// Input value equals `text`
#[must_use]
pub fn value(text: impl Into<String>) -> Condition {
    Condition::Value(text.into())
}

/// Input value contains `text`
#[must_use]
pub fn value_contains(text: impl Into<String>) -> Condition {
    Condition::ValueContains(text.into())
}

/// Date part equals `text`
#[must_use]
pub fn date_value(text: impl Into<String>) -> Condition {
    Condition::DateValue(text.into())
}

/// Named predicate over the component probe
pub fn custom<F>(name: impl Into<String>, predicate: F) -> Condition
where
    F: Fn(&Probe<'_>) -> PagewireResult<bool> + Send + Sync + 'static,
{
    Condition::Custom(CustomCondition::new(name, predicate))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        assert_eq!(caption("Save"), Condition::Caption("Save".into()));
        assert_ne!(caption("Save"), caption_contains("Save"));
        assert_ne!(value("a"), value("b"));
        assert_eq!(visible(), Condition::Visible);
    }

    #[test]
    fn test_custom_compares_by_name() {
        let a = custom("wide", |_| Ok(true));
        let b = custom("wide", |_| Ok(false));
        let c = custom("narrow", |_| Ok(true));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_kind_ignores_payload() {
        assert_eq!(value("x").kind(), ConditionKind::Value);
        assert_eq!(value("y").kind(), value("x").kind());
        assert_eq!(custom("k", |_| Ok(true)).kind(), ConditionKind::Custom);
    }

    #[test]
    fn test_display() {
        assert_eq!(visible().to_string(), "visible");
        assert_eq!(caption("Save").to_string(), "caption 'Save'");
        assert_eq!(value_contains("da").to_string(), "valueContains 'da'");
        assert_eq!(custom("wide", |_| Ok(true)).to_string(), "custom 'wide'");
    }

    #[test]
    fn test_payload() {
        assert_eq!(date_value("01/02/2024").payload(), Some("01/02/2024"));
        assert_eq!(checked().payload(), None);
    }
}
