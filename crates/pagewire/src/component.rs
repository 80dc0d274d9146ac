//! Typed component handles.
//!
//! A component is a locator plus a kind. It holds no DOM state: every call
//! goes back through the session's driver, so a handle stays valid across
//! re-renders as long as its locator still matches.
//!
//! Behavior comes in two parts. Conditions go through the kind's
//! [`HandlerTable`]; actions come from capability traits
//! ([`Clickable`], [`HasCaption`], [`HasValue`], [`Collapsible`],
//! [`Checkable`]) implemented per widget.

use std::fmt;
use std::time::Duration;

use crate::condition::Condition;
use crate::config::Markers;
use crate::dispatch::{self, HandlerTable, Probe};
use crate::locator::{normalize_text, CompositeLocator, LocatorStep};
use crate::result::PagewireResult;
use crate::session::Session;
use crate::wait;

/// State shared by every component: session, kind and locators
#[derive(Debug, Clone)]
pub struct ComponentCore {
    session: Session,
    kind: &'static str,
    locator: CompositeLocator,
    input: Option<CompositeLocator>,
}

impl ComponentCore {
    /// Create a core without an input locator
    #[must_use]
    pub const fn new(session: Session, kind: &'static str, locator: CompositeLocator) -> Self {
        Self {
            session,
            kind,
            locator,
            input: None,
        }
    }

    /// Set the input locator
    #[must_use]
    pub fn with_input(mut self, input: CompositeLocator) -> Self {
        self.input = Some(input);
        self
    }

    /// Owning session
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Component kind
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// Root locator
    #[must_use]
    pub const fn locator(&self) -> &CompositeLocator {
        &self.locator
    }

    /// Input locator, for input-like components
    #[must_use]
    pub const fn input_locator(&self) -> Option<&CompositeLocator> {
        self.input.as_ref()
    }

    /// Root locator extended by `step`
    #[must_use]
    pub fn scoped(&self, step: LocatorStep) -> CompositeLocator {
        self.locator.then(step)
    }

    /// Bind a child component under this one
    #[must_use]
    pub fn child<T: Component>(&self, locator: CompositeLocator) -> T {
        self.session.bind(locator)
    }
}

impl fmt::Display for ComponentCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.locator)
    }
}

/// A typed handle over one widget
pub trait Component: Sized {
    /// Kind name used in diagnostics
    const KIND: &'static str;

    /// Wrap a core built by [`Session::bind`]
    fn bind(core: ComponentCore) -> Self;

    /// Shared state
    fn core(&self) -> &ComponentCore;

    /// Condition handlers for this kind
    fn handlers() -> &'static HandlerTable;

    /// Input locator derived from the root, for input-like components
    fn input_locator(_root: &CompositeLocator, _markers: &Markers) -> Option<CompositeLocator> {
        None
    }

    /// Root locator
    fn locator(&self) -> &CompositeLocator {
        self.core().locator()
    }

    /// Read-only view used by condition handlers
    fn probe(&self) -> Probe<'_> {
        Probe::new(self.core())
    }

    /// Whether `condition` holds right now
    fn is(&self, condition: &Condition) -> PagewireResult<bool> {
        dispatch::evaluate(self, condition)
    }

    /// Alias of [`Component::is`] that reads better for parameterized conditions
    fn has(&self, condition: &Condition) -> PagewireResult<bool> {
        self.is(condition)
    }

    /// Wait with the session's timeout until `condition` holds
    fn should(&self, condition: &Condition) -> PagewireResult<&Self> {
        wait::await_condition(self, condition, &self.core().session().wait_options())?;
        Ok(self)
    }

    /// Wait up to `timeout` until `condition` holds
    fn should_within(&self, condition: &Condition, timeout: Duration) -> PagewireResult<&Self> {
        let options = self
            .core()
            .session()
            .wait_options()
            .with_timeout_duration(timeout);
        wait::await_condition(self, condition, &options)?;
        Ok(self)
    }

    /// Wait with the session's timeout until `condition` no longer holds
    fn should_not(&self, condition: &Condition) -> PagewireResult<&Self> {
        wait::await_not(self, condition, &self.core().session().wait_options())?;
        Ok(self)
    }

    /// Wait up to `timeout` until `condition` no longer holds
    fn should_not_within(&self, condition: &Condition, timeout: Duration) -> PagewireResult<&Self> {
        let options = self
            .core()
            .session()
            .wait_options()
            .with_timeout_duration(timeout);
        wait::await_not(self, condition, &options)?;
        Ok(self)
    }

    /// Whether the root is currently in the document
    fn exists(&self) -> PagewireResult<bool> {
        Ok(self.probe().try_root()?.is_some())
    }

    /// Root attribute
    fn attribute(&self, name: &str) -> PagewireResult<Option<String>> {
        Ok(self.probe().root()?.attribute(name)?)
    }

    /// Root computed style
    fn css_value(&self, name: &str) -> PagewireResult<Option<String>> {
        Ok(self.probe().root()?.css_value(name)?)
    }

    /// Root rendered text
    fn text(&self) -> PagewireResult<String> {
        Ok(self.probe().root()?.text()?)
    }
}

/// Components that can be clicked
pub trait Clickable: Component {
    /// Wait for visible and enabled, then click the root
    fn click(&self) -> PagewireResult<&Self> {
        self.should(&Condition::Visible)?.should(&Condition::Enabled)?;
        self.probe().root()?.click()?;
        Ok(self)
    }
}

/// Components with a caption
pub trait HasCaption: Component {
    /// Caption text, normalized
    fn caption(&self) -> PagewireResult<String> {
        Ok(normalize_text(&self.text()?))
    }
}

/// Components holding an editable value
pub trait HasValue: Component {
    /// Current value once the component is visible
    fn value(&self) -> PagewireResult<String>;

    /// Replace the value
    fn set_value(&self, value: &str) -> PagewireResult<&Self>;
}

/// Containers that expand and collapse
pub trait Collapsible: Component {
    /// Open the container if it is collapsed
    fn expand(&self) -> PagewireResult<&Self>;

    /// Close the container if it is expanded
    fn collapse(&self) -> PagewireResult<&Self>;

    /// Whether the container is collapsed right now
    fn is_collapsed(&self) -> PagewireResult<bool> {
        self.is(&Condition::Collapsed)
    }
}

/// Components with a checked state
pub trait Checkable: Component {
    /// Bring the component to `checked`
    fn set_checked(&self, checked: bool) -> PagewireResult<&Self>;

    /// Whether the component is checked right now
    fn is_checked(&self) -> PagewireResult<bool> {
        self.is(&Condition::Checked)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::condition::{custom, enabled, visible, ConditionKind};
    use crate::dispatch::{layers, HandlerLayer};
    use crate::mock::{MockElement, MockPage};
    use crate::result::PagewireError;
    use std::sync::OnceLock;

    /// Element whose Enabled handler ignores the disabled marker
    #[derive(Debug, Clone)]
    struct AlwaysEnabled {
        core: ComponentCore,
    }

    fn always_enabled(_: &Probe<'_>, _: &Condition) -> PagewireResult<bool> {
        Ok(true)
    }

    impl Component for AlwaysEnabled {
        const KIND: &'static str = "AlwaysEnabled";

        fn bind(core: ComponentCore) -> Self {
            Self { core }
        }

        fn core(&self) -> &ComponentCore {
            &self.core
        }

        fn handlers() -> &'static HandlerTable {
            static TABLE: OnceLock<HandlerTable> = OnceLock::new();
            TABLE.get_or_init(|| {
                HandlerTable::new(Self::KIND)
                    .layer(layers::element())
                    .layer(
                        HandlerLayer::new("always-enabled")
                            .on(ConditionKind::Enabled, always_enabled),
                    )
            })
        }
    }

    fn disabled_page() -> MockPage {
        let page = MockPage::new();
        page.root(
            MockElement::div()
                .with_test_id("panel")
                .with_class("disabled"),
        );
        page
    }

    mod dispatch_tests {
        use super::*;
        use crate::components::Untyped;

        #[test]
        fn test_derived_handler_overrides_base() {
            let session = disabled_page().session();
            let base: Untyped = session.resolve("panel").unwrap();
            let derived: AlwaysEnabled = session.resolve("panel").unwrap();
            assert!(!base.is(&enabled()).unwrap());
            assert!(derived.is(&enabled()).unwrap());
        }

        #[test]
        fn test_unsupported_condition_names_component() {
            let session = disabled_page().session();
            let panel: Untyped = session.resolve("panel").unwrap();
            let err = panel.is(&Condition::Checked).unwrap_err();
            match err {
                PagewireError::UnsupportedCondition {
                    component,
                    condition,
                } => {
                    assert_eq!(component, "Untyped(By.stableId: panel)");
                    assert_eq!(condition, "checked");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_evaluation_is_repeatable_and_read_only() {
            let page = disabled_page();
            let panel: Untyped = page.session().resolve("panel").unwrap();
            let first = panel.is(&visible()).unwrap();
            let second = panel.is(&visible()).unwrap();
            assert_eq!(first, second);
            assert!(!page.was_called("click"));
            assert!(!page.was_called("send_keys"));
        }

        #[test]
        fn test_custom_bypasses_table() {
            let session = disabled_page().session();
            let panel: AlwaysEnabled = session.resolve("panel").unwrap();
            let has_disabled_class =
                custom("has disabled class", |probe| probe.root_has_class("disabled"));
            assert!(panel.is(&has_disabled_class).unwrap());
        }

        #[test]
        fn test_missing_root_is_hidden_but_not_enabled() {
            let session = MockPage::new().session();
            let ghost: Untyped = session.resolve("ghost").unwrap();
            assert!(!ghost.is(&visible()).unwrap());
            assert!(ghost.is(&Condition::Hidden).unwrap());
            assert!(!ghost.exists().unwrap());
            let err = ghost.is(&enabled()).unwrap_err();
            assert!(err.is_transient());
        }
    }

    mod core_tests {
        use super::*;

        #[test]
        fn test_display_and_scoping() {
            let session = MockPage::new().session();
            let core = ComponentCore::new(session, "Tab", CompositeLocator::stable_id("tabs"));
            assert_eq!(core.to_string(), "Tab(By.stableId: tabs)");
            assert_eq!(
                core.scoped(LocatorStep::nth(1)).to_string(),
                "By.stableId: tabs > By.nth: 1"
            );
            assert!(core.input_locator().is_none());
        }
    }
}
