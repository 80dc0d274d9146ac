use std::sync::OnceLock;

use super::Untyped;
use crate::component::{Clickable, Component, ComponentCore, HasCaption};
use crate::condition::{Condition, ConditionKind};
use crate::dispatch::{layers, HandlerLayer, HandlerTable, Probe};
use crate::locator::{normalize_text, text_contains, text_equals, CompositeLocator, LocatorStep};
use crate::result::{PagewireError, PagewireResult};

/// Container of [`Tab`]s
#[derive(Debug, Clone)]
pub struct TabSheet {
    core: ComponentCore,
}

impl TabSheet {
    fn items(&self) -> CompositeLocator {
        let markers = self.core.session().markers();
        self.core
            .scoped(LocatorStep::css_class(markers.tab_item.clone()))
    }

    /// One tab of this sheet.
    ///
    /// Text and stable-id steps filter the tab items, `ByIndex`/`Nth` pick by
    /// position and `ByIsSelected` picks the selected tab.
    ///
    /// # Errors
    /// `InvalidLocator` for any other step.
    pub fn tab(&self, step: LocatorStep) -> PagewireResult<Tab> {
        let filter = match step {
            LocatorStep::ByIndex(n) | LocatorStep::Nth(n) => LocatorStep::Nth(n),
            LocatorStep::ByIsSelected => LocatorStep::matching(LocatorStep::css_class(
                self.core.session().markers().tab_selected.clone(),
            )),
            step @ (LocatorStep::ByExactText(_)
            | LocatorStep::ByTextContains(_)
            | LocatorStep::ByStableId(_)) => LocatorStep::matching(step),
            other => {
                return Err(PagewireError::invalid_locator(format!(
                    "tab sheet cannot select a tab by {other}"
                )))
            }
        };
        Ok(self.core.child(self.items().then(filter)))
    }

    /// Tabs currently displayed, in document order
    pub fn visible_tabs(&self) -> PagewireResult<Vec<Tab>> {
        let items = self.items();
        let mut tabs = Vec::new();
        for (i, item) in self.core.session().find_all(&items)?.iter().enumerate() {
            if item.is_displayed()? {
                tabs.push(self.core.child(items.then(LocatorStep::Nth(i))));
            }
        }
        Ok(tabs)
    }
}

impl Component for TabSheet {
    const KIND: &'static str = "TabSheet";

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

/// One tab; its caption sits in a child carrying the caption marker
#[derive(Debug, Clone)]
pub struct Tab {
    core: ComponentCore,
}

fn caption_of(probe: &Probe<'_>) -> PagewireResult<String> {
    let text = match probe.find(LocatorStep::css_class(probe.markers().caption_text.clone()))? {
        Some(caption) => caption.text()?,
        None => probe.root()?.text()?,
    };
    Ok(normalize_text(&text))
}

fn selected(probe: &Probe<'_>, _: &Condition) -> PagewireResult<bool> {
    probe.root_has_class(&probe.markers().tab_selected)
}

fn caption(probe: &Probe<'_>, condition: &Condition) -> PagewireResult<bool> {
    Ok(text_equals(
        &caption_of(probe)?,
        condition.payload().unwrap_or_default(),
    ))
}

fn caption_contains(probe: &Probe<'_>, condition: &Condition) -> PagewireResult<bool> {
    Ok(text_contains(
        &caption_of(probe)?,
        condition.payload().unwrap_or_default(),
    ))
}

impl Tab {
    fn part(&self, class: &str) -> Untyped {
        self.core
            .child(self.core.scoped(LocatorStep::css_class(class)))
    }

    /// Bring the tab to front by clicking its caption
    pub fn select(&self) -> PagewireResult<&Self> {
        self.should(&Condition::Visible)?;
        if self.is(&Condition::Selected)? {
            return Ok(self);
        }
        let caption = self.part(&self.core.session().markers().caption_text);
        if caption.exists()? {
            caption.click()?;
        } else {
            self.click()?;
        }
        Ok(self)
    }

    /// Click the close button
    pub fn close(&self) -> PagewireResult<()> {
        self.should(&Condition::Visible)?;
        self.part(&self.core.session().markers().tab_close).click()?;
        Ok(())
    }
}

impl Component for Tab {
    const KIND: &'static str = "Tab";

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
                    HandlerLayer::new("tab")
                        .on(ConditionKind::Selected, selected)
                        .on(ConditionKind::Caption, caption)
                        .on(ConditionKind::CaptionContains, caption_contains),
                )
        })
    }
}

impl Clickable for Tab {}

impl HasCaption for Tab {
    fn caption(&self) -> PagewireResult<String> {
        caption_of(&self.probe())
    }
}
