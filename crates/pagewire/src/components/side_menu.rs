use std::sync::OnceLock;

use tracing::debug;

use super::Untyped;
use crate::component::{Clickable, Collapsible, Component, ComponentCore};
use crate::condition::{Condition, ConditionKind};
use crate::dispatch::{layers, HandlerLayer, HandlerTable, Probe};
use crate::locator::LocatorStep;
use crate::page_object::Composite;
use crate::result::{PagewireError, PagewireResult};

/// Navigation menu with nested items and a collapse toggle
#[derive(Debug, Clone)]
pub struct SideMenu {
    core: ComponentCore,
}

/// The container if rendered, else nothing; collapsed only when it is shown
/// and carries the collapsed marker
fn collapsed(probe: &Probe<'_>, _: &Condition) -> PagewireResult<bool> {
    let markers = probe.markers();
    match probe.find(LocatorStep::css_class(markers.side_menu_container.clone()))? {
        Some(container) => {
            Ok(container.is_displayed()? && container.has_class(&markers.collapsed)?)
        }
        None => Ok(false),
    }
}

fn expanded(probe: &Probe<'_>, condition: &Condition) -> PagewireResult<bool> {
    Ok(!collapsed(probe, condition)?)
}

impl SideMenu {
    /// Open each item of `path` in turn. Items already open are left alone.
    ///
    /// # Errors
    /// `EmptyLocator` for an empty path, `ConditionTimeout` when an item never
    /// becomes visible and enabled.
    pub fn open_item<S: AsRef<str>>(&self, path: &[S]) -> PagewireResult<&Self> {
        if path.is_empty() {
            return Err(PagewireError::EmptyLocator);
        }
        let markers = self.core.session().markers();
        for segment in path {
            let item: Untyped = self.core.child(
                self.core
                    .scoped(LocatorStep::css_class(markers.side_menu_item.clone()))
                    .then(LocatorStep::matching(LocatorStep::stable_id(segment.as_ref()))),
            );
            item.should(&Condition::Visible)?.should(&Condition::Enabled)?;
            if item.probe().root_has_class(&markers.side_menu_item_open)? {
                debug!(item = segment.as_ref(), "menu item already open");
            } else {
                item.click()?;
            }
        }
        Ok(self)
    }

    /// Open `path`, then wire the composite the navigation leads to
    pub fn open_item_as<C: Composite, S: AsRef<str>>(&self, path: &[S]) -> PagewireResult<C> {
        self.open_item(path)?;
        Ok(self.core.session().resolve_composite::<C>())
    }

    fn toggle(&self) -> PagewireResult<()> {
        let markers = self.core.session().markers();
        let button: Untyped = self.core.child(
            self.core
                .scoped(LocatorStep::css_class(markers.side_menu_toggle.clone())),
        );
        if button.exists()? {
            button.click()?;
        }
        Ok(())
    }
}

impl Component for SideMenu {
    const KIND: &'static str = "SideMenu";

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
                    HandlerLayer::new("collapsible")
                        .on(ConditionKind::Collapsed, collapsed)
                        .on(ConditionKind::Expanded, expanded),
                )
        })
    }
}

impl Collapsible for SideMenu {
    fn expand(&self) -> PagewireResult<&Self> {
        if self.is_collapsed()? {
            self.toggle()?;
        }
        Ok(self)
    }

    fn collapse(&self) -> PagewireResult<&Self> {
        if !self.is_collapsed()? {
            self.toggle()?;
        }
        Ok(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::condition::{collapsed, expanded};
    use crate::mock::{MockElement, MockPage, NodeId};

    struct Menu {
        page: MockPage,
        container: NodeId,
        settings: NodeId,
        users: NodeId,
    }

    /// Menu with a "settings" group holding a hidden "users" item
    fn menu() -> Menu {
        let page = MockPage::new();
        let root = page.root(MockElement::div().with_test_id("menu"));
        let container = page.child(root, MockElement::div().with_class("side-menu-container"));
        let toggle = page.child(root, MockElement::span("").with_class("side-menu-toggle"));
        page.on_click(toggle, move |dom| dom.toggle_class(container, "collapsed"));
        let settings = page.child(
            container,
            MockElement::div()
                .with_class("side-menu-item")
                .with_test_id("settings")
                .with_text("Settings"),
        );
        let users = page.child(
            settings,
            MockElement::div()
                .with_class("side-menu-item")
                .with_test_id("users")
                .with_text("Users")
                .hidden(),
        );
        page.on_click(settings, move |dom| {
            dom.add_class(settings, "side-menu-item-open");
            dom.set_displayed(users, true);
        });
        Menu {
            page,
            container,
            settings,
            users,
        }
    }

    #[test]
    fn test_collapse_and_expand() {
        let m = menu();
        let side: SideMenu = m.page.session().resolve("menu").unwrap();
        assert!(side.is(&expanded()).unwrap());

        side.collapse().unwrap();
        assert!(m.page.has_class(m.container, "collapsed"));
        assert!(side.is(&collapsed()).unwrap());

        side.collapse().unwrap();
        assert_eq!(m.page.call_count("click:"), 1);

        side.expand().unwrap();
        assert!(side.is(&expanded()).unwrap());
    }

    #[test]
    fn test_missing_container_is_expanded() {
        let page = MockPage::new();
        page.root(MockElement::div().with_test_id("menu"));
        let side: SideMenu = page.session().resolve("menu").unwrap();
        assert!(!side.is_collapsed().unwrap());
    }

    #[test]
    fn test_open_item_walks_path() {
        let m = menu();
        let side: SideMenu = m.page.session().resolve("menu").unwrap();
        side.open_item(&["settings", "users"]).unwrap();
        assert!(m.page.has_class(m.settings, "side-menu-item-open"));
        assert_eq!(m.page.call_count("click:"), 2);

        m.page.clear_history();
        m.page.add_class(m.users, "side-menu-item-open");
        side.open_item(&["settings", "users"]).unwrap();
        assert!(!m.page.was_called("click:"));
    }

    #[test]
    fn test_open_item_rejects_empty_path() {
        let m = menu();
        let side: SideMenu = m.page.session().resolve("menu").unwrap();
        let empty: [&str; 0] = [];
        assert!(matches!(side.open_item(&empty), Err(PagewireError::EmptyLocator)));
    }
}
