use std::sync::OnceLock;

use super::input_below;
use crate::component::{Checkable, Clickable, Component, ComponentCore, HasCaption};
use crate::condition::{Condition, ConditionKind};
use crate::config::Markers;
use crate::dispatch::{layers, HandlerLayer, HandlerTable, Probe};
use crate::driver::keys;
use crate::locator::{normalize_text, text_contains, text_equals, CompositeLocator, LocatorStep};
use crate::result::PagewireResult;

/// Checkbox with an optional `<label>` caption
#[derive(Debug, Clone)]
pub struct CheckBox {
    core: ComponentCore,
}

fn input_checked(probe: &Probe<'_>) -> PagewireResult<bool> {
    Ok(probe.input()?.attribute(&probe.markers().checked)?.is_some())
}

fn label_text(probe: &Probe<'_>) -> PagewireResult<String> {
    let text = match probe.find(LocatorStep::tag("label"))? {
        Some(label) => label.text()?,
        None => probe.root()?.text()?,
    };
    Ok(normalize_text(&text))
}

fn checked(probe: &Probe<'_>, _: &Condition) -> PagewireResult<bool> {
    input_checked(probe)
}

fn caption(probe: &Probe<'_>, condition: &Condition) -> PagewireResult<bool> {
    Ok(text_equals(
        &label_text(probe)?,
        condition.payload().unwrap_or_default(),
    ))
}

fn caption_contains(probe: &Probe<'_>, condition: &Condition) -> PagewireResult<bool> {
    Ok(text_contains(
        &label_text(probe)?,
        condition.payload().unwrap_or_default(),
    ))
}

impl Component for CheckBox {
    const KIND: &'static str = "CheckBox";

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
                .layer(layers::read_only())
                .layer(
                    HandlerLayer::new("checkbox")
                        .on(ConditionKind::Checked, checked)
                        .on(ConditionKind::Selected, checked)
                        .on(ConditionKind::Caption, caption)
                        .on(ConditionKind::CaptionContains, caption_contains),
                )
        })
    }

    fn input_locator(root: &CompositeLocator, _markers: &Markers) -> Option<CompositeLocator> {
        Some(input_below(root))
    }
}

impl Checkable for CheckBox {
    /// Press SPACE on the input when the state differs
    fn set_checked(&self, checked: bool) -> PagewireResult<&Self> {
        self.should(&Condition::Visible)?
            .should(&Condition::Enabled)?;
        if input_checked(&self.probe())? != checked {
            self.probe().input()?.send_keys(&keys::SPACE.to_string())?;
        }
        Ok(self)
    }
}

impl Clickable for CheckBox {}

impl HasCaption for CheckBox {
    fn caption(&self) -> PagewireResult<String> {
        label_text(&self.probe())
    }
}
