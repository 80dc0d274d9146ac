//! Session: the entry point test code resolves components from.

use std::fmt;
use std::sync::Arc;

use crate::component::{Component, ComponentCore};
use crate::config::{EngineConfig, Markers};
use crate::driver::{DomRef, Driver};
use crate::locator::{path, CompositeLocator, LocatorStep};
use crate::page_object::{Composite, CompositeSchema, ResolvedComposite, WireContext};
use crate::result::PagewireResult;
use crate::wait::WaitOptions;

/// Where a component lives: a locator, or a path of stable ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Ready-made locator
    Locator(CompositeLocator),
    /// Stable id segments, outermost first
    Path(Vec<String>),
}

impl Target {
    /// Compile into a locator.
    ///
    /// # Errors
    /// Returns `EmptyLocator` for an empty path.
    pub fn into_locator(self) -> PagewireResult<CompositeLocator> {
        match self {
            Self::Locator(locator) => Ok(locator),
            Self::Path(segments) => path(segments),
        }
    }
}

impl From<CompositeLocator> for Target {
    fn from(locator: CompositeLocator) -> Self {
        Self::Locator(locator)
    }
}

impl From<&CompositeLocator> for Target {
    fn from(locator: &CompositeLocator) -> Self {
        Self::Locator(locator.clone())
    }
}

impl From<LocatorStep> for Target {
    fn from(step: LocatorStep) -> Self {
        Self::Locator(CompositeLocator::new(step))
    }
}

impl From<&str> for Target {
    fn from(id: &str) -> Self {
        Self::Path(vec![id.to_string()])
    }
}

impl From<String> for Target {
    fn from(id: String) -> Self {
        Self::Path(vec![id])
    }
}

impl<const N: usize> From<[&str; N]> for Target {
    fn from(segments: [&str; N]) -> Self {
        Self::Path(segments.iter().map(|s| (*s).to_string()).collect())
    }
}

impl From<&[&str]> for Target {
    fn from(segments: &[&str]) -> Self {
        Self::Path(segments.iter().map(|s| (*s).to_string()).collect())
    }
}

impl From<Vec<String>> for Target {
    fn from(segments: Vec<String>) -> Self {
        Self::Path(segments)
    }
}

impl From<Vec<&str>> for Target {
    fn from(segments: Vec<&str>) -> Self {
        Self::Path(segments.into_iter().map(str::to_string).collect())
    }
}

/// One driver session plus the configuration components consult.
///
/// A session built with [`Session::with_config`] waits with the configured
/// timeout and poll interval. One built with [`Session::new`] follows the
/// process-wide defaults in [`crate::wait`].
#[derive(Clone)]
pub struct Session {
    driver: Arc<dyn Driver>,
    config: Arc<EngineConfig>,
    wait: Option<WaitOptions>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("driver", &self.driver)
            .field("stable_id_attribute", &self.config.stable_id_attribute)
            .field("wait", &self.wait)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Session with default configuration and process-wide wait timings
    #[must_use]
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self {
            driver,
            config: Arc::new(EngineConfig::default()),
            wait: None,
        }
    }

    /// Session with explicit configuration, timings included
    #[must_use]
    pub fn with_config(driver: Arc<dyn Driver>, config: EngineConfig) -> Self {
        let wait = WaitOptions::new()
            .with_timeout(config.default_timeout_ms)
            .with_poll_interval(config.poll_interval_ms);
        Self {
            driver,
            config: Arc::new(config),
            wait: Some(wait),
        }
    }

    /// Address stable ids by `attribute`, keeping the wait timings
    #[must_use]
    pub fn with_stable_id_attribute(mut self, attribute: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).stable_id_attribute = attribute.into();
        self
    }

    /// Options used by `should` and `should_not`: the session's own timings,
    /// or the process-wide defaults when it has none
    #[must_use]
    pub fn wait_options(&self) -> WaitOptions {
        self.wait.clone().unwrap_or_default()
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    /// Engine configuration
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Widget markers
    #[must_use]
    pub fn markers(&self) -> &Markers {
        &self.config.markers
    }

    /// Every element matching `locator`.
    ///
    /// # Errors
    /// `StructuralLocatorMisuse` if a structural step reaches this point,
    /// otherwise driver errors.
    pub fn find_all(&self, locator: &CompositeLocator) -> PagewireResult<Vec<DomRef>> {
        locator.ensure_resolvable()?;
        Ok(self
            .driver
            .find_all(locator, &self.config.stable_id_attribute)?)
    }

    /// First element matching `locator`, if any.
    ///
    /// # Errors
    /// Same as [`Session::find_all`].
    pub fn find_first(&self, locator: &CompositeLocator) -> PagewireResult<Option<DomRef>> {
        Ok(self.find_all(locator)?.into_iter().next())
    }

    /// Resolve a typed component. Never touches the driver.
    ///
    /// ```rust,ignore
    /// let remember: CheckBox = session.resolve(["form", "rememberMe"])?;
    /// ```
    ///
    /// # Errors
    /// `EmptyLocator` for an empty path.
    pub fn resolve<T: Component>(&self, target: impl Into<Target>) -> PagewireResult<T> {
        let locator = target.into().into_locator()?;
        Ok(self.bind(locator))
    }

    /// Bind a component to an already-built locator
    #[must_use]
    pub fn bind<T: Component>(&self, locator: CompositeLocator) -> T {
        let mut core = ComponentCore::new(self.clone(), T::KIND, locator);
        if let Some(input) = T::input_locator(core.locator(), self.markers()) {
            core = core.with_input(input);
        }
        tracing::debug!(kind = T::KIND, locator = %core.locator(), "resolved component");
        T::bind(core)
    }

    /// Wire a composite at the top level of the page
    #[must_use]
    pub fn resolve_composite<C: Composite>(&self) -> C {
        C::wire(WireContext::new(self.clone(), None, C::schema()))
    }

    /// Wire a composite with every field scoped under `target`.
    ///
    /// # Errors
    /// `EmptyLocator` for an empty path.
    pub fn resolve_composite_at<C: Composite>(
        &self,
        target: impl Into<Target>,
    ) -> PagewireResult<C> {
        let scope = target.into().into_locator()?;
        Ok(C::wire(WireContext::new(
            self.clone(),
            Some(scope),
            C::schema(),
        )))
    }

    /// Wrap a hand-built schema; fields resolve on demand
    #[must_use]
    pub fn resolve_schema(&self, schema: CompositeSchema) -> ResolvedComposite {
        ResolvedComposite::new(WireContext::new(self.clone(), None, schema))
    }

    /// Wrap a hand-built schema scoped under `target`.
    ///
    /// # Errors
    /// `EmptyLocator` for an empty path.
    pub fn resolve_schema_at(
        &self,
        schema: CompositeSchema,
        target: impl Into<Target>,
    ) -> PagewireResult<ResolvedComposite> {
        let scope = target.into().into_locator()?;
        Ok(ResolvedComposite::new(WireContext::new(
            self.clone(),
            Some(scope),
            schema,
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::components::{CheckBox, TextField};
    use crate::locator::chain;
    use crate::mock::{MockElement, MockPage};
    use crate::result::PagewireError;

    mod target_tests {
        use super::*;

        #[test]
        fn test_path_targets_compile_to_stable_ids() {
            let expected = chain([
                LocatorStep::stable_id("form"),
                LocatorStep::stable_id("rememberMe"),
            ])
            .unwrap();
            assert_eq!(
                Target::from(["form", "rememberMe"]).into_locator().unwrap(),
                expected
            );
            assert_eq!(
                Target::from(vec!["form".to_string(), "rememberMe".to_string()])
                    .into_locator()
                    .unwrap(),
                expected
            );
        }

        #[test]
        fn test_empty_path_fails() {
            let empty: [&str; 0] = [];
            assert!(matches!(
                Target::from(empty).into_locator(),
                Err(PagewireError::EmptyLocator)
            ));
        }
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_resolve_never_touches_driver() {
            let page = MockPage::new();
            let session = page.session();
            let field: TextField = session.resolve(["form", "name"]).unwrap();
            assert_eq!(field.locator().to_string(), "By.stableId: form > By.stableId: name");
            assert!(page.history().is_empty());
        }

        #[test]
        fn test_resolve_sets_input_locator() {
            let session = MockPage::new().session();
            let field: TextField = session.resolve("name").unwrap();
            assert_eq!(
                field.core().input_locator().map(ToString::to_string).as_deref(),
                Some("By.stableId: name > By.tag: input")
            );
        }

        #[test]
        fn test_structural_step_rejected_before_driver() {
            let page = MockPage::new();
            let session = page.session();
            let bogus: CheckBox = session.resolve(LocatorStep::row_index(2)).unwrap();
            let err = bogus.exists().unwrap_err();
            assert!(matches!(err, PagewireError::StructuralLocatorMisuse { .. }));
            assert!(!page.was_called("find_all"));
        }

        #[test]
        fn test_find_first_in_document_order() {
            let page = MockPage::new();
            page.root(MockElement::span("one").with_class("item"));
            page.root(MockElement::span("two").with_class("item"));
            let first = page
                .session()
                .find_first(&CompositeLocator::new(LocatorStep::css_class("item")))
                .unwrap()
                .unwrap();
            assert_eq!(first.text().unwrap(), "one");
        }
    }

    mod config_tests {
        use super::*;
        use crate::components::Untyped;
        use crate::condition::visible;
        use crate::result::LastObserved;
        use std::time::{Duration, Instant};

        #[test]
        fn test_stable_id_attribute_reaches_driver() {
            let page = MockPage::new();
            let login = page.root(MockElement::div());
            page.set_attribute(login, "data-qa", "login");

            let config = EngineConfig::default().with_stable_id_attribute("data-qa");
            let found: Untyped = page.session_with(config).resolve("login").unwrap();
            assert!(found.exists().unwrap());

            let missing: Untyped = page.session().resolve("login").unwrap();
            assert!(!missing.exists().unwrap());
        }

        #[test]
        fn test_page_attribute_is_session_default() {
            let page = MockPage::with_stable_id_attribute("data-qa");
            page.root(MockElement::div().with_test_id("login"));
            let session = page.session();
            assert_eq!(session.config().stable_id_attribute, "data-qa");
            let login: Untyped = session.resolve("login").unwrap();
            assert!(login.exists().unwrap());
        }

        #[test]
        fn test_configured_session_uses_its_own_timings() {
            let page = MockPage::new();
            let session = page.session_with(
                EngineConfig::default()
                    .with_timeout_ms(150)
                    .with_poll_interval_ms(10),
            );
            assert_eq!(
                session.wait_options(),
                WaitOptions::new().with_timeout(150).with_poll_interval(10)
            );

            let ghost: Untyped = session.resolve("ghost").unwrap();
            let start = Instant::now();
            let err = ghost.should(&visible()).unwrap_err();
            assert!(start.elapsed() < Duration::from_millis(1_500));
            assert!(matches!(
                err,
                PagewireError::ConditionTimeout {
                    timeout_ms: 150,
                    last_observed: LastObserved::Evaluated(false),
                    ..
                }
            ));
        }

        #[test]
        fn test_attribute_override_keeps_timings() {
            let page = MockPage::new();
            let session = page
                .session_with(EngineConfig::default().with_timeout_ms(250))
                .with_stable_id_attribute("data-qa");
            assert_eq!(session.wait_options().timeout_ms, 250);
            assert_eq!(session.config().stable_id_attribute, "data-qa");
        }
    }
}
