//! In-memory page for tests.
//!
//! [`MockPage`] implements [`Driver`] over a small arena DOM so components,
//! conditions and waits can be exercised without a browser:
//!
//! ```rust,ignore
//! use pagewire::mock::{MockElement, MockPage};
//!
//! let page = MockPage::new();
//! let form = page.root(MockElement::div().with_test_id("form"));
//! let remember = page.child(form, MockElement::div().with_test_id("rememberMe"));
//! page.child(remember, MockElement::checkbox(false));
//!
//! let session = page.session();
//! ```
//!
//! Click hooks model page behavior (menus opening, rows selecting). They run
//! with the document locked and receive it mutably.

mod dom;

pub use dom::{ClickHook, MockDom, MockElement, NodeId};

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::EngineConfig;
use crate::driver::{DomHandle, DomRef, Driver, DriverError, DriverResult};
use crate::locator::CompositeLocator;
use crate::session::Session;

/// Shared in-memory page implementing [`Driver`]
#[derive(Debug, Clone)]
pub struct MockPage {
    dom: Arc<Mutex<MockDom>>,
}

impl Default for MockPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPage {
    /// Page using the default `data-testid` attribute
    #[must_use]
    pub fn new() -> Self {
        Self::with_stable_id_attribute(crate::config::DEFAULT_STABLE_ID_ATTRIBUTE)
    }

    /// Page storing test ids under a custom attribute
    #[must_use]
    pub fn with_stable_id_attribute(attribute: impl Into<String>) -> Self {
        Self {
            dom: Arc::new(Mutex::new(MockDom::new(attribute))),
        }
    }

    /// Session over this page, addressing stable ids by the page's attribute
    #[must_use]
    pub fn session(&self) -> Session {
        let attribute = self.with_dom(|dom| dom.stable_id_attribute().to_string());
        Session::new(Arc::new(self.clone())).with_stable_id_attribute(attribute)
    }

    /// Session over this page with the given configuration
    #[must_use]
    pub fn session_with(&self, config: EngineConfig) -> Session {
        Session::with_config(Arc::new(self.clone()), config)
    }

    /// Run `f` with the document locked
    pub fn with_dom<R>(&self, f: impl FnOnce(&mut MockDom) -> R) -> R {
        let mut dom = self.dom.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut dom)
    }

    /// Append a top-level element
    pub fn root(&self, element: MockElement) -> NodeId {
        self.with_dom(|dom| dom.append(None, element))
    }

    /// Append an element under `parent`
    pub fn child(&self, parent: NodeId, element: MockElement) -> NodeId {
        self.with_dom(|dom| dom.append(Some(parent), element))
    }

    /// Detach a subtree
    pub fn remove(&self, node: NodeId) {
        self.with_dom(|dom| dom.remove(node));
    }

    /// Register a click hook on `node`
    pub fn on_click<F>(&self, node: NodeId, hook: F)
    where
        F: Fn(&mut MockDom) + Send + Sync + 'static,
    {
        self.with_dom(|dom| dom.on_click(node, Arc::new(hook)));
    }

    /// Add a CSS class
    pub fn add_class(&self, node: NodeId, class: &str) {
        self.with_dom(|dom| dom.add_class(node, class));
    }

    /// Remove a CSS class
    pub fn remove_class(&self, node: NodeId, class: &str) {
        self.with_dom(|dom| dom.remove_class(node, class));
    }

    /// Show or hide an element
    pub fn set_displayed(&self, node: NodeId, displayed: bool) {
        self.with_dom(|dom| dom.set_displayed(node, displayed));
    }

    /// Replace an element's own text
    pub fn set_text(&self, node: NodeId, text: &str) {
        self.with_dom(|dom| dom.set_text(node, text));
    }

    /// Replace a form control's value
    pub fn set_value(&self, node: NodeId, value: &str) {
        self.with_dom(|dom| dom.set_value(node, value));
    }

    /// Current form control value
    #[must_use]
    pub fn value(&self, node: NodeId) -> Option<String> {
        self.with_dom(|dom| dom.value(node))
    }

    /// Set an attribute
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        self.with_dom(|dom| dom.set_attribute(node, name, value));
    }

    /// Attribute value
    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.with_dom(|dom| dom.attribute(node, name))
    }

    /// Whether an element carries a class
    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.with_dom(|dom| dom.has_class(node, class))
    }

    /// Make the next `find_all` fail with `error`
    pub fn fail_next(&self, error: DriverError) {
        self.with_dom(|dom| dom.fail_next(error));
    }

    /// Recorded driver calls
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.with_dom(|dom| dom.history().to_vec())
    }

    /// Check if a driver call was recorded
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.with_dom(|dom| dom.history().iter().any(|c| c.starts_with(method)))
    }

    /// Number of recorded calls starting with `method`
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.with_dom(|dom| {
            dom.history()
                .iter()
                .filter(|c| c.starts_with(method))
                .count()
        })
    }

    /// Forget recorded calls
    pub fn clear_history(&self) {
        self.with_dom(MockDom::clear_history);
    }
}

impl Driver for MockPage {
    fn find_all(
        &self,
        locator: &CompositeLocator,
        stable_id_attribute: &str,
    ) -> DriverResult<Vec<DomRef>> {
        let mut dom = lock(&self.dom)?;
        dom.record(format!("find_all:{locator}"));
        if let Some(error) = dom.take_failure() {
            return Err(error);
        }
        let nodes = dom.query_with(locator.steps(), stable_id_attribute)?;
        Ok(nodes
            .into_iter()
            .map(|node| {
                Arc::new(MockHandle {
                    dom: Arc::clone(&self.dom),
                    node,
                    reference: dom.reference(node),
                }) as DomRef
            })
            .collect())
    }
}

fn lock(dom: &Mutex<MockDom>) -> DriverResult<MutexGuard<'_, MockDom>> {
    dom.lock()
        .map_err(|_| DriverError::session("mock page lock poisoned"))
}

/// Live handle into a [`MockPage`]
pub struct MockHandle {
    dom: Arc<Mutex<MockDom>>,
    node: NodeId,
    reference: String,
}

impl fmt::Debug for MockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockHandle")
            .field("node", &self.node)
            .field("reference", &self.reference)
            .finish()
    }
}

impl MockHandle {
    /// Lock the document, failing if this element was detached
    fn attached(&self) -> DriverResult<MutexGuard<'_, MockDom>> {
        let dom = lock(&self.dom)?;
        if dom.is_attached(self.node) {
            Ok(dom)
        } else {
            Err(DriverError::stale(&self.reference))
        }
    }
}

impl DomHandle for MockHandle {
    fn reference(&self) -> String {
        self.reference.clone()
    }

    fn attribute(&self, name: &str) -> DriverResult<Option<String>> {
        Ok(self.attached()?.attribute(self.node, name))
    }

    fn css_value(&self, name: &str) -> DriverResult<Option<String>> {
        Ok(self.attached()?.css_value(self.node, name))
    }

    fn text(&self) -> DriverResult<String> {
        Ok(self.attached()?.rendered_text(self.node))
    }

    fn value(&self) -> DriverResult<Option<String>> {
        Ok(self.attached()?.value(self.node))
    }

    fn click(&self) -> DriverResult<()> {
        let mut dom = self.attached()?;
        dom.record(format!("click:{}", self.reference));
        dom.default_click(self.node);
        for hook in dom.hooks_for(self.node) {
            hook(&mut *dom);
        }
        Ok(())
    }

    fn send_keys(&self, text: &str) -> DriverResult<()> {
        let mut dom = self.attached()?;
        dom.record(format!("send_keys:{}", self.reference));
        dom.type_keys(self.node, text);
        Ok(())
    }

    fn exists(&self) -> DriverResult<bool> {
        Ok(lock(&self.dom)?.is_attached(self.node))
    }

    fn is_displayed(&self) -> DriverResult<bool> {
        Ok(self.attached()?.is_displayed(self.node))
    }
}
