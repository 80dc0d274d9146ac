use std::sync::OnceLock;

use super::Untyped;
use crate::component::{Clickable, Component, ComponentCore, HasCaption};
use crate::condition::Condition;
use crate::dispatch::{layers, HandlerTable};
use crate::locator::{normalize_text, CompositeLocator, LocatorStep};
use crate::result::{PagewireError, PagewireResult};

/// Button that opens a panel of actions
#[derive(Debug, Clone)]
pub struct PopupButton {
    core: ComponentCore,
}

impl PopupButton {
    /// Popup panel scoped under this button
    #[must_use]
    pub fn popup_content(&self) -> PopupContent {
        let markers = self.core.session().markers();
        self.core.child(
            self.core
                .scoped(LocatorStep::css_class(markers.popup_content.clone())),
        )
    }

    /// Open the popup unless it is already shown, then wait for it
    pub fn open_popup_content(&self) -> PagewireResult<PopupContent> {
        let content = self.popup_content();
        if !content.is(&Condition::Visible)? {
            self.click()?;
            content.should(&Condition::Visible)?;
        }
        Ok(content)
    }

    /// Open the popup and pick the entry whose text equals `text`
    pub fn click_option(&self, text: &str) -> PagewireResult<&Self> {
        self.open_popup_content()?.select(text)?;
        Ok(self)
    }
}

impl Component for PopupButton {
    const KIND: &'static str = "PopupButton";

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
                .layer(layers::caption_text())
        })
    }
}

impl Clickable for PopupButton {}
impl HasCaption for PopupButton {}

/// Panel opened by a [`PopupButton`]
#[derive(Debug, Clone)]
pub struct PopupContent {
    core: ComponentCore,
}

impl PopupContent {
    fn items(&self) -> CompositeLocator {
        let markers = self.core.session().markers();
        self.core
            .scoped(LocatorStep::css_class(markers.popup_item.clone()))
    }

    /// Entry addressed by exact text, contained text or stable id.
    ///
    /// # Errors
    /// `InvalidLocator` for any other step.
    pub fn action(&self, step: LocatorStep) -> PagewireResult<Untyped> {
        match step {
            step @ (LocatorStep::ByExactText(_)
            | LocatorStep::ByTextContains(_)
            | LocatorStep::ByStableId(_)) => {
                Ok(self.core.child(self.items().then(LocatorStep::matching(step))))
            }
            other => Err(PagewireError::invalid_locator(format!(
                "popup content cannot trigger an action by {other}"
            ))),
        }
    }

    /// Click the entry matched by `step`
    pub fn trigger(&self, step: LocatorStep) -> PagewireResult<&Self> {
        self.should(&Condition::Visible)?;
        self.action(step)?.click()?;
        Ok(self)
    }

    /// Click the entry carrying stable id `id`
    pub fn trigger_id(&self, id: &str) -> PagewireResult<&Self> {
        self.trigger(LocatorStep::stable_id(id))
    }

    /// Click the entry whose text equals `text`
    pub fn select(&self, text: &str) -> PagewireResult<&Self> {
        self.trigger(LocatorStep::exact_text(text))
    }

    /// Normalized text of every entry
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

impl Component for PopupContent {
    const KIND: &'static str = "PopupContent";

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
