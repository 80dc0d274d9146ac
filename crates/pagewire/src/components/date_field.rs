use std::sync::OnceLock;

use super::{input_below, read_input, replace_input};
use crate::component::{Component, ComponentCore, HasValue};
use crate::condition::{Condition, ConditionKind};
use crate::config::Markers;
use crate::dispatch::{layers, HandlerLayer, HandlerTable, Probe};
use crate::driver::{keys, DomRef};
use crate::locator::{CompositeLocator, LocatorStep};
use crate::result::PagewireResult;

/// Masked date input. The date part carries the `date_part` marker class.
#[derive(Debug, Clone)]
pub struct DateField {
    core: ComponentCore,
}

fn date_part(probe: &Probe<'_>) -> PagewireResult<DomRef> {
    probe.child(LocatorStep::css_class(probe.markers().date_part.clone()))
}

fn date_value(probe: &Probe<'_>, condition: &Condition) -> PagewireResult<bool> {
    let actual = date_part(probe)?.value()?.unwrap_or_default();
    Ok(actual == condition.payload().unwrap_or_default())
}

impl DateField {
    /// Current text of the date part
    pub fn date_value(&self) -> PagewireResult<String> {
        self.should(&Condition::Visible)?;
        Ok(date_part(&self.probe())?.value()?.unwrap_or_default())
    }

    /// Overwrite the date part from its first position
    pub fn set_date_value(&self, value: &str) -> PagewireResult<&Self> {
        self.should(&Condition::Visible)?
            .should(&Condition::Enabled)?
            .should(&Condition::Editable)?;
        let part = date_part(&self.probe())?;
        part.click()?;
        part.send_keys(&format!("{}{value}", keys::HOME))?;
        Ok(self)
    }
}

impl Component for DateField {
    const KIND: &'static str = "DateField";

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
                .layer(layers::input())
                .layer(HandlerLayer::new("date").on(ConditionKind::DateValue, date_value))
        })
    }

    fn input_locator(root: &CompositeLocator, _markers: &Markers) -> Option<CompositeLocator> {
        Some(input_below(root))
    }
}

impl HasValue for DateField {
    fn value(&self) -> PagewireResult<String> {
        read_input(self)
    }

    fn set_value(&self, value: &str) -> PagewireResult<&Self> {
        replace_input(self, value)?;
        Ok(self)
    }
}

/// Masked time input; the editable part carries the `time_part` marker class
#[derive(Debug, Clone)]
pub struct TimeField {
    core: ComponentCore,
}

impl Component for TimeField {
    const KIND: &'static str = "TimeField";

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
                .layer(layers::input())
        })
    }

    fn input_locator(root: &CompositeLocator, markers: &Markers) -> Option<CompositeLocator> {
        Some(root.then(LocatorStep::css_class(markers.time_part.clone())))
    }
}

impl HasValue for TimeField {
    fn value(&self) -> PagewireResult<String> {
        read_input(self)
    }

    fn set_value(&self, value: &str) -> PagewireResult<&Self> {
        replace_input(self, value)?;
        Ok(self)
    }
}
