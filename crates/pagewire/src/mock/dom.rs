//! Arena-backed DOM tree behind [`super::MockPage`].
//!
//! Nodes are never freed: removing an element detaches its subtree, so
//! handles obtained earlier report stale instead of pointing at a reused slot.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::driver::{keys, DriverError, DriverResult};
use crate::locator::{normalize_text, LocatorStep};

/// Index of a node in the mock document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Callback run when a node (or one of its descendants) is clicked
pub type ClickHook = Arc<dyn Fn(&mut MockDom) + Send + Sync>;

/// Element description used to build the mock document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockElement {
    tag: String,
    test_id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    value: Option<String>,
    hidden: bool,
}

impl MockElement {
    /// Create an element with the given tag
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// `<div>`
    #[must_use]
    pub fn div() -> Self {
        Self::new("div")
    }

    /// `<span>` carrying text
    #[must_use]
    pub fn span(text: impl Into<String>) -> Self {
        Self::new("span").with_text(text)
    }

    /// Text `<input>` with an initial value
    #[must_use]
    pub fn input(value: impl Into<String>) -> Self {
        let mut element = Self::new("input").with_attr("type", "text");
        element.value = Some(value.into());
        element
    }

    /// `<textarea>` with an initial value
    #[must_use]
    pub fn textarea(value: impl Into<String>) -> Self {
        let mut element = Self::new("textarea");
        element.value = Some(value.into());
        element
    }

    /// Checkbox `<input>`
    #[must_use]
    pub fn checkbox(checked: bool) -> Self {
        let element = Self::new("input").with_attr("type", "checkbox");
        if checked {
            element.with_attr("checked", "true")
        } else {
            element
        }
    }

    /// Set the stable test id
    #[must_use]
    pub fn with_test_id(mut self, id: impl Into<String>) -> Self {
        self.test_id = Some(id.into());
        self
    }

    /// Add a CSS class
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set a computed style property
    #[must_use]
    pub fn with_style(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.insert(name.into(), value.into());
        self
    }

    /// Set the element's own text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Render the element invisible
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    fn is_checkbox(&self) -> bool {
        self.tag.eq_ignore_ascii_case("input")
            && self.attributes.get("type").is_some_and(|t| t == "checkbox")
    }
}

struct MockNode {
    element: MockElement,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attached: bool,
    reference: String,
    select_all: bool,
}

/// The mock document. Click hooks receive it mutably.
pub struct MockDom {
    nodes: Vec<MockNode>,
    roots: Vec<NodeId>,
    by_reference: HashMap<String, NodeId>,
    stable_id_attribute: String,
    hooks: HashMap<NodeId, Vec<ClickHook>>,
    failures: VecDeque<DriverError>,
    history: Vec<String>,
}

impl fmt::Debug for MockDom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockDom")
            .field("nodes", &self.nodes.len())
            .field("roots", &self.roots)
            .field("stable_id_attribute", &self.stable_id_attribute)
            .field("pending_failures", &self.failures.len())
            .finish_non_exhaustive()
    }
}

impl MockDom {
    pub(crate) fn new(stable_id_attribute: impl Into<String>) -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            by_reference: HashMap::new(),
            stable_id_attribute: stable_id_attribute.into(),
            hooks: HashMap::new(),
            failures: VecDeque::new(),
            history: Vec::new(),
        }
    }

    /// Attribute `MockElement::with_test_id` writes to
    #[must_use]
    pub fn stable_id_attribute(&self) -> &str {
        &self.stable_id_attribute
    }

    /// Insert `element` under `parent`, or at the top level
    pub fn append(&mut self, parent: Option<NodeId>, mut element: MockElement) -> NodeId {
        if let Some(id) = element.test_id.take() {
            element
                .attributes
                .insert(self.stable_id_attribute.clone(), id);
        }
        let node = NodeId(self.nodes.len());
        let reference = Uuid::new_v4().to_string();
        let attached = parent.map_or(true, |p| self.is_attached(p));
        self.by_reference.insert(reference.clone(), node);
        self.nodes.push(MockNode {
            element,
            parent,
            children: Vec::new(),
            attached,
            reference,
            select_all: false,
        });
        match parent.and_then(|p| self.nodes.get_mut(p.0)) {
            Some(parent_node) => parent_node.children.push(node),
            None => self.roots.push(node),
        }
        node
    }

    /// Detach `node` and its subtree from the document
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes.get(node.0).and_then(|n| n.parent) {
            if let Some(parent_node) = self.nodes.get_mut(parent.0) {
                parent_node.children.retain(|c| *c != node);
            }
        } else {
            self.roots.retain(|r| *r != node);
        }
        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            if let Some(n) = self.nodes.get_mut(current.0) {
                n.attached = false;
                pending.extend(n.children.iter().copied());
            }
        }
    }

    /// Run `hook` whenever `node` or a descendant is clicked
    pub fn on_click(&mut self, node: NodeId, hook: ClickHook) {
        self.hooks.entry(node).or_default().push(hook);
    }

    /// Add a CSS class if absent
    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            if !n.element.classes.iter().any(|c| c == class) {
                n.element.classes.push(class.to_string());
            }
        }
    }

    /// Remove a CSS class
    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.element.classes.retain(|c| c != class);
        }
    }

    /// Flip a CSS class
    pub fn toggle_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            self.remove_class(node, class);
        } else {
            self.add_class(node, class);
        }
    }

    /// Whether the node carries `class`
    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(node.0)
            .is_some_and(|n| n.element.classes.iter().any(|c| c == class))
    }

    /// Show or hide the node
    pub fn set_displayed(&mut self, node: NodeId, displayed: bool) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.element.hidden = !displayed;
        }
    }

    /// Replace the node's own text
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.element.text = text.to_string();
        }
    }

    /// Replace a form control's value
    pub fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.element.value = Some(value.to_string());
        }
    }

    /// Current form control value
    #[must_use]
    pub fn value(&self, node: NodeId) -> Option<String> {
        self.nodes.get(node.0).and_then(|n| n.element.value.clone())
    }

    /// Set an attribute
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.element
                .attributes
                .insert(name.to_string(), value.to_string());
        }
    }

    /// Remove an attribute
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.element.attributes.remove(name);
        }
    }

    /// Attribute value; `class` is synthesized from the class list
    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let n = self.nodes.get(node.0)?;
        if name == "class" {
            return (!n.element.classes.is_empty()).then(|| n.element.classes.join(" "));
        }
        n.element.attributes.get(name).cloned()
    }

    /// Whether the node is still part of the document
    #[must_use]
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.nodes.get(node.0).is_some_and(|n| n.attached)
    }

    /// Rendered text: own text followed by descendants' text, normalized
    #[must_use]
    pub fn rendered_text(&self, node: NodeId) -> String {
        let Some(n) = self.nodes.get(node.0) else {
            return String::new();
        };
        let mut parts = vec![normalize_text(&n.element.text)];
        parts.extend(n.children.iter().map(|c| self.rendered_text(*c)));
        parts.retain(|p| !p.is_empty());
        parts.join(" ")
    }

    /// Attached, not hidden, and every ancestor displayed
    #[must_use]
    pub fn is_displayed(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            match self.nodes.get(id.0) {
                Some(n) if n.attached && !n.element.hidden => current = n.parent,
                _ => return false,
            }
        }
        true
    }

    /// Queue an error for the next `find_all`
    pub fn fail_next(&mut self, error: DriverError) {
        self.failures.push_back(error);
    }

    pub(crate) fn take_failure(&mut self) -> Option<DriverError> {
        self.failures.pop_front()
    }

    pub(crate) fn record(&mut self, entry: String) {
        self.history.push(entry);
    }

    pub(crate) fn history(&self) -> &[String] {
        &self.history
    }

    pub(crate) fn clear_history(&mut self) {
        self.history.clear();
    }

    pub(crate) fn reference(&self, node: NodeId) -> String {
        self.nodes
            .get(node.0)
            .map(|n| n.reference.clone())
            .unwrap_or_default()
    }

    /// Node behind a reference, failing when it has been detached
    pub(crate) fn resolve_reference(&self, reference: &str) -> DriverResult<NodeId> {
        match self.by_reference.get(reference) {
            Some(node) if self.is_attached(*node) => Ok(*node),
            Some(_) => Err(DriverError::stale(reference)),
            None => Err(DriverError::not_attached(reference)),
        }
    }

    pub(crate) fn css_value(&self, node: NodeId, name: &str) -> Option<String> {
        let n = self.nodes.get(node.0)?;
        if let Some(value) = n.element.styles.get(name) {
            return Some(value.clone());
        }
        (name == "display").then(|| {
            if self.is_displayed(node) {
                "block".to_string()
            } else {
                "none".to_string()
            }
        })
    }

    /// Click hooks of `node` and its ancestors, innermost first
    pub(crate) fn hooks_for(&self, node: NodeId) -> Vec<ClickHook> {
        let mut out = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(hooks) = self.hooks.get(&id) {
                out.extend(hooks.iter().cloned());
            }
            current = self.nodes.get(id.0).and_then(|n| n.parent);
        }
        out
    }

    /// Browser default action of a click
    pub(crate) fn default_click(&mut self, node: NodeId) {
        let is_checkbox = self
            .nodes
            .get(node.0)
            .is_some_and(|n| n.element.is_checkbox());
        if is_checkbox {
            self.toggle_checked(node);
        }
    }

    fn toggle_checked(&mut self, node: NodeId) {
        if self.attribute(node, "checked").is_some() {
            self.remove_attribute(node, "checked");
        } else {
            self.set_attribute(node, "checked", "true");
        }
    }

    /// Apply typed keys to a form control.
    ///
    /// Supports CTRL+A selection, DELETE of a selection, SPACE toggling
    /// checkboxes, and HOME clearing masked inputs before they are retyped.
    pub(crate) fn type_keys(&mut self, node: NodeId, text: &str) {
        let Some(n) = self.nodes.get(node.0) else {
            return;
        };
        if n.element.is_checkbox() {
            for _ in text.chars().filter(|c| *c == keys::SPACE) {
                self.toggle_checked(node);
            }
            return;
        }
        let mut value = n.element.value.clone().unwrap_or_default();
        let mut select_all = n.select_all;
        let mut control = false;
        for c in text.chars() {
            match c {
                keys::CONTROL => control = true,
                keys::NULL => control = false,
                'a' | 'A' if control => select_all = true,
                keys::DELETE | keys::HOME => {
                    if select_all || c == keys::HOME {
                        value.clear();
                    }
                    select_all = false;
                }
                keys::SPACE => value.push(' '),
                c if keys::is_special(c) => {}
                c => {
                    if select_all {
                        value.clear();
                        select_all = false;
                    }
                    value.push(c);
                }
            }
        }
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.element.value = Some(value);
            n.select_all = select_all;
        }
    }

    /// Attached nodes in document order
    fn document_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut pending: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(node) = pending.pop() {
            out.push(node);
            if let Some(n) = self.nodes.get(node.0) {
                pending.extend(n.children.iter().rev().copied());
            }
        }
        out
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes.get(node.0).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id.0).and_then(|n| n.parent);
        }
        false
    }

    /// Whether the node itself satisfies a predicate step
    fn satisfies(&self, node: NodeId, step: &LocatorStep, stable_id_attribute: &str) -> bool {
        let Some(n) = self.nodes.get(node.0) else {
            return false;
        };
        match step {
            LocatorStep::ByStableId(id) => n
                .element
                .attributes
                .get(stable_id_attribute)
                .is_some_and(|v| v == id),
            LocatorStep::ByCssClass(class) => n.element.classes.iter().any(|c| c == class),
            LocatorStep::ByTag(tag) => n.element.tag.eq_ignore_ascii_case(tag),
            LocatorStep::ByExactText(_) | LocatorStep::ByTextContains(_) => step
                .matches_text(&self.rendered_text(node))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Descend semantics: text steps select the innermost matching elements
    fn selects(&self, node: NodeId, step: &LocatorStep, stable_id_attribute: &str) -> bool {
        if !self.satisfies(node, step, stable_id_attribute) {
            return false;
        }
        match step {
            LocatorStep::ByExactText(_) | LocatorStep::ByTextContains(_) => {
                self.nodes.get(node.0).is_some_and(|n| {
                    !n.children
                        .iter()
                        .any(|c| self.satisfies(*c, step, stable_id_attribute))
                })
            }
            _ => true,
        }
    }

    /// Resolve locator steps, matching stable ids on the page's own attribute
    #[cfg(test)]
    pub(crate) fn query(&self, steps: &[LocatorStep]) -> DriverResult<Vec<NodeId>> {
        self.query_with(steps, &self.stable_id_attribute)
    }

    /// Resolve locator steps, matching stable ids on `stable_id_attribute`
    pub(crate) fn query_with(
        &self,
        steps: &[LocatorStep],
        stable_id_attribute: &str,
    ) -> DriverResult<Vec<NodeId>> {
        self.query_from(None, steps, stable_id_attribute)
    }

    /// Resolve steps starting below `scope`, or at the document when `None`
    fn query_from(
        &self,
        mut scope: Option<Vec<NodeId>>,
        steps: &[LocatorStep],
        stable_id_attribute: &str,
    ) -> DriverResult<Vec<NodeId>> {
        let order = self.document_order();
        for step in steps {
            let current = scope.clone().unwrap_or_else(|| order.clone());
            let next = match step {
                LocatorStep::Nth(n) => current.get(*n).copied().into_iter().collect(),
                LocatorStep::Where(inner) => current
                    .into_iter()
                    .filter(|id| self.satisfies(*id, inner, stable_id_attribute))
                    .collect(),
                LocatorStep::Has(inner) => {
                    let mut kept = Vec::new();
                    for id in current {
                        let found =
                            self.query_from(Some(vec![id]), inner.steps(), stable_id_attribute)?;
                        if !found.is_empty() {
                            kept.push(id);
                        }
                    }
                    kept
                }
                LocatorStep::ByReference(handle) => {
                    vec![self.resolve_reference(&handle.reference())?]
                }
                step if step.is_predicate() => order
                    .iter()
                    .copied()
                    .filter(|id| {
                        scope
                            .as_ref()
                            .map_or(true, |s| s.iter().any(|a| self.is_ancestor(*a, *id)))
                    })
                    .filter(|id| self.selects(*id, step, stable_id_attribute))
                    .collect(),
                other => {
                    return Err(DriverError::unsupported(format!("mock query of {other}")));
                }
            };
            scope = Some(next);
        }
        Ok(scope.unwrap_or_default())
    }
}
