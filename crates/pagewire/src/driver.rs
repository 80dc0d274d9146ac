//! Driver boundary.
//!
//! pagewire never talks to a browser itself. Everything it knows about the
//! page comes through two traits:
//!
//! - [`Driver`] turns a [`CompositeLocator`] into the live elements it
//!   currently matches, in document order.
//! - [`DomHandle`] is one live element. Handles are cheap to obtain and are
//!   never cached by components; every operation asks the driver again.
//!
//! Adapters for real browser sessions implement both traits. The in-memory
//! [`crate::mock::MockPage`] implements them for tests.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::locator::CompositeLocator;

/// Shared handle to a live element
pub type DomRef = Arc<dyn DomHandle>;

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// Failures reported by a driver adapter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// Nothing in the page matches the locator yet
    #[error("element not attached: {target}")]
    NotAttached {
        /// Locator or reference that was looked up
        target: String,
    },

    /// The handle points to an element that left the document
    #[error("stale element reference: {target}")]
    StaleElement {
        /// Reference of the detached element
        target: String,
    },

    /// The page is between documents
    #[error("navigation in progress")]
    NavigationInProgress,

    /// Session-level failure (browser gone, protocol error)
    #[error("session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// The adapter cannot perform this operation
    #[error("unsupported driver operation: {operation}")]
    Unsupported {
        /// Operation name
        operation: String,
    },
}

impl DriverError {
    /// Create a not-attached error
    #[must_use]
    pub fn not_attached(target: impl Into<String>) -> Self {
        Self::NotAttached {
            target: target.into(),
        }
    }

    /// Create a stale element error
    #[must_use]
    pub fn stale(target: impl Into<String>) -> Self {
        Self::StaleElement {
            target: target.into(),
        }
    }

    /// Create a navigation-in-progress error
    #[must_use]
    pub const fn navigation_in_progress() -> Self {
        Self::NavigationInProgress
    }

    /// Create a session error
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Create an unsupported operation error
    #[must_use]
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Errors that may clear up on their own while the page settles
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NotAttached { .. } | Self::StaleElement { .. } | Self::NavigationInProgress
        )
    }
}

/// One live element of the page under test
pub trait DomHandle: fmt::Debug + Send + Sync {
    /// Opaque identity of the element, stable while it stays attached
    fn reference(&self) -> String;

    /// Attribute value, `None` when the attribute is absent
    fn attribute(&self, name: &str) -> DriverResult<Option<String>>;

    /// Computed style property
    fn css_value(&self, name: &str) -> DriverResult<Option<String>>;

    /// Rendered text of the element and its descendants
    fn text(&self) -> DriverResult<String>;

    /// Current value of a form control, `None` for non-controls
    fn value(&self) -> DriverResult<Option<String>>;

    /// Click the element
    fn click(&self) -> DriverResult<()>;

    /// Type text; special keys are encoded with [`keys`]
    fn send_keys(&self, text: &str) -> DriverResult<()>;

    /// Whether the element is still in the document
    fn exists(&self) -> DriverResult<bool>;

    /// Whether the element is rendered visibly
    fn is_displayed(&self) -> DriverResult<bool>;

    /// Whether the element's class list contains `class`
    fn has_class(&self, class: &str) -> DriverResult<bool> {
        Ok(self
            .attribute("class")?
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class)))
    }
}

/// A browser session able to resolve locators
pub trait Driver: fmt::Debug + Send + Sync {
    /// All elements currently matching `locator`, in document order.
    ///
    /// `ByStableId` steps match on `stable_id_attribute`. An empty result is
    /// not an error; callers decide whether absence matters.
    fn find_all(
        &self,
        locator: &CompositeLocator,
        stable_id_attribute: &str,
    ) -> DriverResult<Vec<DomRef>>;
}

/// WebDriver special-key codepoints for [`DomHandle::send_keys`]
pub mod keys {
    /// Space bar
    pub const SPACE: char = '\u{E00D}';
    /// Control modifier
    pub const CONTROL: char = '\u{E009}';
    /// Delete
    pub const DELETE: char = '\u{E017}';
    /// Home
    pub const HOME: char = '\u{E011}';
    /// Enter
    pub const ENTER: char = '\u{E007}';
    /// Escape
    pub const ESCAPE: char = '\u{E00C}';
    /// Null key, releases held modifiers
    pub const NULL: char = '\u{E000}';

    /// Press `keys` together and release them.
    ///
    /// `chord(&[CONTROL, 'a'])` selects all text in an input.
    #[must_use]
    pub fn chord(keys: &[char]) -> String {
        let mut out: String = keys.iter().collect();
        out.push(NULL);
        out
    }

    /// Whether `c` lies in the WebDriver private-use key range
    #[must_use]
    pub fn is_special(c: char) -> bool {
        ('\u{E000}'..='\u{F8FF}').contains(&c)
    }
}
