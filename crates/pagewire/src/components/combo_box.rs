use std::sync::OnceLock;

use super::{clear_input, input_below, read_input, Untyped};
use crate::component::{Clickable, Component, ComponentCore, HasValue};
use crate::condition::Condition;
use crate::config::Markers;
use crate::dispatch::{layers, HandlerTable};
use crate::locator::{normalize_text, CompositeLocator, LocatorStep};
use crate::page_object::Composite;
use crate::result::{PagewireError, PagewireResult};

/// Filterable drop-down
#[derive(Debug, Clone)]
pub struct ComboBox {
    core: ComponentCore,
}

impl ComboBox {
    /// Replace the filter text without choosing an option
    pub fn set_filter(&self, filter: &str) -> PagewireResult<&Self> {
        self.should(&Condition::Visible)?
            .should(&Condition::Enabled)?
            .should(&Condition::Editable)?;
        self.probe().input()?.click()?;
        clear_input(self)?;
        if !filter.is_empty() {
            self.probe().input()?.send_keys(filter)?;
        }
        Ok(self)
    }

    /// Options list scoped under this combo box
    #[must_use]
    pub fn options_popup(&self) -> OptionsPopup {
        let markers = self.core.session().markers();
        self.core.child(
            self.core
                .scoped(LocatorStep::css_class(markers.options_list.clone())),
        )
    }

    /// Open the options list and wait for it
    pub fn open_options_popup(&self) -> PagewireResult<OptionsPopup> {
        let popup = self.options_popup();
        if !popup.is(&Condition::Visible)? {
            self.toggle_button().click()?;
            popup.should(&Condition::Visible)?;
        }
        Ok(popup)
    }

    /// Close the options list if it is open
    pub fn close_options_popup(&self) -> PagewireResult<&Self> {
        let popup = self.options_popup();
        if popup.is(&Condition::Visible)? {
            self.toggle_button().click()?;
            popup.should(&Condition::Hidden)?;
        }
        Ok(self)
    }

    /// Click the action button with stable id `id` inside the combo box,
    /// once it is visible and enabled
    pub fn trigger_action(&self, id: &str) -> PagewireResult<&Self> {
        let action: Untyped = self.core.child(self.core.scoped(LocatorStep::stable_id(id)));
        action.click()?;
        Ok(self)
    }

    /// Trigger an action, then wire the composite it opens
    pub fn trigger_action_as<C: Composite>(&self, id: &str) -> PagewireResult<C> {
        self.trigger_action(id)?;
        Ok(self.core.session().resolve_composite::<C>())
    }

    fn toggle_button(&self) -> Untyped {
        let markers = self.core.session().markers();
        self.core.child(
            self.core
                .scoped(LocatorStep::css_class(markers.combo_button.clone())),
        )
    }
}

impl Component for ComboBox {
    const KIND: &'static str = "ComboBox";

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

    fn input_locator(root: &CompositeLocator, _markers: &Markers) -> Option<CompositeLocator> {
        Some(input_below(root))
    }
}

impl HasValue for ComboBox {
    fn value(&self) -> PagewireResult<String> {
        read_input(self)
    }

    /// Filter by `value`, then pick the option with exactly that text
    fn set_value(&self, value: &str) -> PagewireResult<&Self> {
        self.set_filter(value)?;
        self.open_options_popup()?.select(value)?;
        Ok(self)
    }
}

/// Options list of a [`ComboBox`]
#[derive(Debug, Clone)]
pub struct OptionsPopup {
    core: ComponentCore,
}

impl OptionsPopup {
    fn items(&self) -> CompositeLocator {
        let markers = self.core.session().markers();
        self.core
            .scoped(LocatorStep::css_class(markers.option_item.clone()))
    }

    /// One option. Understands `ByIndex`, `Nth` and predicate steps.
    ///
    /// # Errors
    /// `InvalidLocator` for any other step.
    pub fn option(&self, step: LocatorStep) -> PagewireResult<Untyped> {
        let filter = match step {
            LocatorStep::ByIndex(n) | LocatorStep::Nth(n) => LocatorStep::Nth(n),
            step if step.is_predicate() => LocatorStep::matching(step),
            other => {
                return Err(PagewireError::invalid_locator(format!(
                    "options popup cannot select an option by {other}"
                )))
            }
        };
        Ok(self.core.child(self.items().then(filter)))
    }

    /// Click the option whose text equals `text`; empty selects the blank option
    pub fn select(&self, text: &str) -> PagewireResult<&Self> {
        self.should(&Condition::Visible)?;
        self.option(LocatorStep::exact_text(text))?.click()?;
        Ok(self)
    }

    /// Normalized text of every option
    pub fn options(&self) -> PagewireResult<Vec<String>> {
        self.should(&Condition::Visible)?;
        self.core
            .session()
            .find_all(&self.items())?
            .iter()
            .map(|item| -> PagewireResult<String> { Ok(normalize_text(&item.text()?)) })
            .collect()
    }
}

impl Component for OptionsPopup {
    const KIND: &'static str = "OptionsPopup";

    fn bind(core: ComponentCore) -> Self {
        Self { core }
    }

    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn handlers() -> &'static HandlerTable {
        static TABLE: OnceLock<HandlerTable> = OnceLock::new();
        TABLE.get_or_init(|| HandlerTable::new(Self::KIND).layer(layers::element()))
    }
}
