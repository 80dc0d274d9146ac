//! Result and error types for pagewire.

use std::fmt;
use thiserror::Error;

use crate::driver::DriverError;

/// Result type for pagewire operations
pub type PagewireResult<T> = Result<T, PagewireError>;

/// What the wait engine saw on its last poll before giving up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LastObserved {
    /// The timeout elapsed before a single evaluation finished
    NotEvaluated,
    /// The last evaluation produced this value
    Evaluated(bool),
    /// The last evaluation hit a transient driver error
    Transient(String),
}

impl fmt::Display for LastObserved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEvaluated => write!(f, "not evaluated"),
            Self::Evaluated(value) => write!(f, "{value}"),
            Self::Transient(message) => write!(f, "transient driver error: {message}"),
        }
    }
}

/// Errors that can occur in pagewire
#[derive(Debug, Error)]
pub enum PagewireError {
    /// No handler matches the condition for this component kind
    #[error("Unsupported condition {condition} for {component}")]
    UnsupportedCondition {
        /// Component kind and locator
        component: String,
        /// Condition description
        condition: String,
    },

    /// Condition did not reach the expected state in time
    #[error(
        "{component} should {expectation} {condition} within {timeout_ms}ms (last observed: {last_observed})"
    )]
    ConditionTimeout {
        /// Component kind and locator
        component: String,
        /// Condition description
        condition: String,
        /// "be" or "not be"
        expectation: &'static str,
        /// Timeout in milliseconds
        timeout_ms: u64,
        /// State seen on the final poll
        last_observed: LastObserved,
    },

    /// A plain predicate wait ran out of time
    #[error("Timeout after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// Description of the predicate
        waited_for: String,
    },

    /// A structural-only step reached the driver
    #[error("{step} can only be resolved by a component that understands it (locator: {locator})")]
    StructuralLocatorMisuse {
        /// Offending step
        step: String,
        /// Full locator
        locator: String,
    },

    /// A locator or path without steps
    #[error("Locator must contain at least one step")]
    EmptyLocator,

    /// Locator that cannot be resolved as written
    #[error("Invalid locator: {message}")]
    InvalidLocator {
        /// Error message
        message: String,
    },

    /// Driver-level failure
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PagewireError {
    /// Create an invalid locator error
    #[must_use]
    pub fn invalid_locator(message: impl Into<String>) -> Self {
        Self::InvalidLocator {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the wait engine may retry after this error
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Driver(err) if err.is_transient())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_driver_errors_are_transient() {
        let not_attached = PagewireError::from(DriverError::not_attached("By.stableId: x"));
        assert!(not_attached.is_transient());

        let session = PagewireError::from(DriverError::session("browser gone"));
        assert!(!session.is_transient());

        assert!(!PagewireError::EmptyLocator.is_transient());
    }

    #[test]
    fn test_timeout_message_names_everything() {
        let err = PagewireError::ConditionTimeout {
            component: "TextField(By.stableId: username)".into(),
            condition: "visible".into(),
            expectation: "be",
            timeout_ms: 4000,
            last_observed: LastObserved::Evaluated(false),
        };
        let message = err.to_string();
        assert!(message.contains("TextField(By.stableId: username)"));
        assert!(message.contains("should be visible within 4000ms"));
        assert!(message.contains("last observed: false"));
    }

    #[test]
    fn test_last_observed_display() {
        assert_eq!(LastObserved::NotEvaluated.to_string(), "not evaluated");
        assert_eq!(
            LastObserved::Transient("stale".into()).to_string(),
            "transient driver error: stale"
        );
    }
}
