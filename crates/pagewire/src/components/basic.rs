use std::sync::OnceLock;

use crate::component::{Clickable, Component, ComponentCore, HasCaption};
use crate::dispatch::{layers, HandlerTable};

/// Any element, with visibility and enabled state only
#[derive(Debug, Clone)]
pub struct Untyped {
    core: ComponentCore,
}

impl Component for Untyped {
    const KIND: &'static str = "Untyped";

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

impl Clickable for Untyped {}

/// Static text
#[derive(Debug, Clone)]
pub struct Label {
    core: ComponentCore,
}

impl Component for Label {
    const KIND: &'static str = "Label";

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

impl HasCaption for Label {}

/// Push button
#[derive(Debug, Clone)]
pub struct Button {
    core: ComponentCore,
}

impl Component for Button {
    const KIND: &'static str = "Button";

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

impl Clickable for Button {}
impl HasCaption for Button {}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::condition::{caption, caption_contains, disabled, enabled, Condition};
    use crate::mock::{MockElement, MockPage};
    use crate::result::PagewireError;

    fn page() -> MockPage {
        let page = MockPage::new();
        let toolbar = page.root(MockElement::div().with_test_id("toolbar"));
        page.child(
            toolbar,
            MockElement::new("button")
                .with_test_id("save")
                .with_text("  Save\u{00A0}changes "),
        );
        page.child(
            toolbar,
            MockElement::new("button")
                .with_test_id("delete")
                .with_class("disabled")
                .with_text("Delete"),
        );
        page.child(toolbar, MockElement::span("3 items").with_test_id("count"));
        page
    }

    #[test]
    fn test_caption_conditions_normalize() {
        let session = page().session();
        let save: Button = session.resolve(["toolbar", "save"]).unwrap();
        assert!(save.has(&caption("Save changes")).unwrap());
        assert!(save.has(&caption_contains("changes")).unwrap());
        assert!(!save.has(&caption("Save")).unwrap());
        assert_eq!(save.caption().unwrap(), "Save changes");
    }

    #[test]
    fn test_label_caption() {
        let count: Label = page().session().resolve(["toolbar", "count"]).unwrap();
        assert!(count.has(&caption("3 items")).unwrap());
    }

    #[test]
    fn test_disabled_marker() {
        let session = page().session();
        let delete: Button = session.resolve(["toolbar", "delete"]).unwrap();
        assert!(delete.is(&disabled()).unwrap());
        assert!(!delete.is(&enabled()).unwrap());
    }

    #[test]
    fn test_click_records_driver_call() {
        let page = page();
        let save: Button = page.session().resolve(["toolbar", "save"]).unwrap();
        save.click().unwrap();
        assert_eq!(page.call_count("click:"), 1);
    }

    #[test]
    fn test_untyped_has_no_caption_handler() {
        let toolbar: Untyped = page().session().resolve("toolbar").unwrap();
        assert!(matches!(
            toolbar.is(&Condition::Caption("x".into())),
            Err(PagewireError::UnsupportedCondition { .. })
        ));
    }
}
