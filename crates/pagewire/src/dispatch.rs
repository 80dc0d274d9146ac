//! Condition dispatch.
//!
//! Every component kind owns a [`HandlerTable`]: a stack of
//! [`HandlerLayer`]s, each mapping [`ConditionKind`]s to handler functions.
//! Layers are pushed base first; lookup walks them from the most recently
//! pushed (most derived) to the base, and the first layer claiming the kind
//! wins. A widget overrides a shared behavior by pushing a layer that claims
//! the same kind.
//!
//! Handlers only read. They receive a [`Probe`], which re-resolves the
//! component's locators on every call.

use std::fmt;

use crate::component::{Component, ComponentCore};
use crate::condition::{Condition, ConditionKind};
use crate::config::Markers;
use crate::driver::{DomRef, DriverError};
use crate::locator::{CompositeLocator, LocatorStep};
use crate::result::{PagewireError, PagewireResult};
use crate::session::Session;

/// Decides whether a condition holds for the probed component
pub type Handler = fn(&Probe<'_>, &Condition) -> PagewireResult<bool>;

/// Named set of handlers keyed by condition kind
#[derive(Clone)]
pub struct HandlerLayer {
    name: &'static str,
    handlers: Vec<(ConditionKind, Handler)>,
}

impl fmt::Debug for HandlerLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerLayer")
            .field("name", &self.name)
            .field("kinds", &self.kinds().collect::<Vec<_>>())
            .finish()
    }
}

impl HandlerLayer {
    /// Create an empty layer
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            handlers: Vec::new(),
        }
    }

    /// Claim `kind`; a later registration for the same kind replaces this one
    #[must_use]
    pub fn on(mut self, kind: ConditionKind, handler: Handler) -> Self {
        self.handlers.retain(|(k, _)| *k != kind);
        self.handlers.push((kind, handler));
        self
    }

    /// Layer name used in diagnostics
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Handler for `kind`, if this layer claims it
    #[must_use]
    pub fn get(&self, kind: ConditionKind) -> Option<Handler> {
        self.handlers
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, handler)| *handler)
    }

    /// Kinds claimed by this layer
    pub fn kinds(&self) -> impl Iterator<Item = ConditionKind> + '_ {
        self.handlers.iter().map(|(k, _)| *k)
    }
}

/// Ordered stack of layers for one component kind
#[derive(Debug, Clone)]
pub struct HandlerTable {
    component: &'static str,
    layers: Vec<HandlerLayer>,
}

impl HandlerTable {
    /// Create an empty table for a component kind
    #[must_use]
    pub const fn new(component: &'static str) -> Self {
        Self {
            component,
            layers: Vec::new(),
        }
    }

    /// Push a layer more derived than every layer already present
    #[must_use]
    pub fn layer(mut self, layer: HandlerLayer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Component kind this table serves
    #[must_use]
    pub const fn component(&self) -> &'static str {
        self.component
    }

    /// First handler claiming `kind`, most derived layer first
    #[must_use]
    pub fn lookup(&self, kind: ConditionKind) -> Option<(&'static str, Handler)> {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.get(kind).map(|handler| (layer.name(), handler)))
    }

    /// Whether some layer claims `kind`
    #[must_use]
    pub fn supports(&self, kind: ConditionKind) -> bool {
        kind == ConditionKind::Custom || self.lookup(kind).is_some()
    }

    /// Layer names, base first
    #[must_use]
    pub fn layer_names(&self) -> Vec<&'static str> {
        self.layers.iter().map(HandlerLayer::name).collect()
    }
}

/// Read-only view of a component handed to condition handlers
#[derive(Debug, Clone, Copy)]
pub struct Probe<'a> {
    core: &'a ComponentCore,
}

impl<'a> Probe<'a> {
    /// Probe a component core
    #[must_use]
    pub const fn new(core: &'a ComponentCore) -> Self {
        Self { core }
    }

    /// Probed component
    #[must_use]
    pub const fn core(&self) -> &'a ComponentCore {
        self.core
    }

    /// Session the component belongs to
    #[must_use]
    pub fn session(&self) -> &'a Session {
        self.core.session()
    }

    /// Configured widget markers
    #[must_use]
    pub fn markers(&self) -> &'a Markers {
        self.core.session().markers()
    }

    /// Root locator
    #[must_use]
    pub fn locator(&self) -> &'a CompositeLocator {
        self.core.locator()
    }

    /// Root element if currently present
    pub fn try_root(&self) -> PagewireResult<Option<DomRef>> {
        self.session().find_first(self.core.locator())
    }

    /// Root element; `NotAttached` when absent
    pub fn root(&self) -> PagewireResult<DomRef> {
        self.require(self.core.locator())
    }

    /// Input element, which is the root for components without one
    pub fn input(&self) -> PagewireResult<DomRef> {
        self.require(self.core.input_locator().unwrap_or(self.core.locator()))
    }

    /// Element below the root matching `step`, if present
    pub fn find(&self, step: LocatorStep) -> PagewireResult<Option<DomRef>> {
        self.session().find_first(&self.core.locator().then(step))
    }

    /// Element below the root matching `step`; `NotAttached` when absent
    pub fn child(&self, step: LocatorStep) -> PagewireResult<DomRef> {
        self.require(&self.core.locator().then(step))
    }

    /// Whether the root carries `class`
    pub fn root_has_class(&self, class: &str) -> PagewireResult<bool> {
        Ok(self.root()?.has_class(class)?)
    }

    fn require(&self, locator: &CompositeLocator) -> PagewireResult<DomRef> {
        self.session()
            .find_first(locator)?
            .ok_or_else(|| DriverError::not_attached(locator.to_string()).into())
    }
}

/// Decide whether `condition` currently holds for `component`.
///
/// `Custom` conditions run their predicate directly; every other condition
/// goes through the component's handler table.
///
/// # Errors
/// `UnsupportedCondition` when no layer claims the condition, or whatever the
/// handler reports (driver errors included).
pub fn evaluate<C: Component>(component: &C, condition: &Condition) -> PagewireResult<bool> {
    let core = component.core();
    let probe = Probe::new(core);
    if let Condition::Custom(custom) = condition {
        tracing::trace!(component = %core, condition = %condition, "custom predicate");
        return custom.test(&probe);
    }
    match C::handlers().lookup(condition.kind()) {
        Some((layer, handler)) => {
            tracing::trace!(component = %core, condition = %condition, layer, "dispatch");
            handler(&probe, condition)
        }
        None => {
            tracing::debug!(component = %core, condition = %condition, "no handler");
            Err(PagewireError::UnsupportedCondition {
                component: core.to_string(),
                condition: condition.to_string(),
            })
        }
    }
}

/// Shared capability layers
pub mod layers {
    use super::{HandlerLayer, Probe};
    use crate::condition::{Condition, ConditionKind};
    use crate::locator::{normalize_text, text_contains, text_equals};
    use crate::result::PagewireResult;

    /// Root displayed (absent counts as not displayed)
    pub fn is_visible(probe: &Probe<'_>) -> PagewireResult<bool> {
        match probe.try_root()? {
            Some(root) => Ok(root.is_displayed()?),
            None => Ok(false),
        }
    }

    fn visible(probe: &Probe<'_>, _: &Condition) -> PagewireResult<bool> {
        is_visible(probe)
    }

    fn hidden(probe: &Probe<'_>, _: &Condition) -> PagewireResult<bool> {
        Ok(!is_visible(probe)?)
    }

    fn enabled(probe: &Probe<'_>, _: &Condition) -> PagewireResult<bool> {
        Ok(!probe.root_has_class(&probe.markers().disabled)?)
    }

    fn disabled(probe: &Probe<'_>, _: &Condition) -> PagewireResult<bool> {
        probe.root_has_class(&probe.markers().disabled)
    }

    fn required(probe: &Probe<'_>, _: &Condition) -> PagewireResult<bool> {
        probe.root_has_class(&probe.markers().required)
    }

    fn readonly(probe: &Probe<'_>, _: &Condition) -> PagewireResult<bool> {
        probe.root_has_class(&probe.markers().readonly)
    }

    fn editable(probe: &Probe<'_>, _: &Condition) -> PagewireResult<bool> {
        Ok(!probe.root_has_class(&probe.markers().readonly)?)
    }

    /// Current value of the input element; absent reads as empty.
    ///
    /// `None` when the input is not displayed.
    pub fn visible_input_value(probe: &Probe<'_>) -> PagewireResult<Option<String>> {
        let input = probe.input()?;
        if !input.is_displayed()? {
            return Ok(None);
        }
        Ok(Some(input.value()?.unwrap_or_default()))
    }

    fn value(probe: &Probe<'_>, condition: &Condition) -> PagewireResult<bool> {
        let expected = condition.payload().unwrap_or_default();
        Ok(visible_input_value(probe)?.is_some_and(|actual| {
            if normalize_text(expected).is_empty() {
                normalize_text(&actual).is_empty()
            } else {
                text_equals(&actual, expected)
            }
        }))
    }

    fn value_contains(probe: &Probe<'_>, condition: &Condition) -> PagewireResult<bool> {
        let expected = condition.payload().unwrap_or_default();
        Ok(visible_input_value(probe)?.is_some_and(|actual| {
            if normalize_text(expected).is_empty() {
                normalize_text(&actual).is_empty()
            } else {
                text_contains(&actual, expected)
            }
        }))
    }

    fn caption(probe: &Probe<'_>, condition: &Condition) -> PagewireResult<bool> {
        let text = probe.root()?.text()?;
        Ok(text_equals(&text, condition.payload().unwrap_or_default()))
    }

    fn caption_contains(probe: &Probe<'_>, condition: &Condition) -> PagewireResult<bool> {
        let text = probe.root()?.text()?;
        Ok(text_contains(&text, condition.payload().unwrap_or_default()))
    }

    /// Visible / Hidden, Enabled / Disabled
    #[must_use]
    pub fn element() -> HandlerLayer {
        HandlerLayer::new("element")
            .on(ConditionKind::Visible, visible)
            .on(ConditionKind::Hidden, hidden)
            .on(ConditionKind::Enabled, enabled)
            .on(ConditionKind::Disabled, disabled)
    }

    /// Value / ValueContains on the input, field state markers on the root
    #[must_use]
    pub fn input() -> HandlerLayer {
        HandlerLayer::new("input")
            .on(ConditionKind::Value, value)
            .on(ConditionKind::ValueContains, value_contains)
            .on(ConditionKind::Enabled, enabled)
            .on(ConditionKind::Disabled, disabled)
            .on(ConditionKind::Required, required)
            .on(ConditionKind::Readonly, readonly)
            .on(ConditionKind::Editable, editable)
    }

    /// Caption / CaptionContains on the root's rendered text
    #[must_use]
    pub fn caption_text() -> HandlerLayer {
        HandlerLayer::new("caption")
            .on(ConditionKind::Caption, caption)
            .on(ConditionKind::CaptionContains, caption_contains)
    }

    /// Readonly / Editable markers on the root
    #[must_use]
    pub fn read_only() -> HandlerLayer {
        HandlerLayer::new("readonly")
            .on(ConditionKind::Readonly, readonly)
            .on(ConditionKind::Editable, editable)
    }
}
