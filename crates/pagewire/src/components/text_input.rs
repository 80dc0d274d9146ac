use std::sync::OnceLock;

use super::{clear_input, input_below, read_input, replace_input};
use crate::component::{Component, ComponentCore, HasValue};
use crate::config::Markers;
use crate::dispatch::{layers, HandlerTable};
use crate::locator::CompositeLocator;
use crate::result::PagewireResult;

fn input_table(kind: &'static str) -> HandlerTable {
    HandlerTable::new(kind)
        .layer(layers::element())
        .layer(layers::input())
}

/// Single-line text field; the `<input>` sits below the root
#[derive(Debug, Clone)]
pub struct TextField {
    core: ComponentCore,
}

impl TextField {
    /// Clear the field
    pub fn clear(&self) -> PagewireResult<&Self> {
        self.set_value("")
    }
}

impl Component for TextField {
    const KIND: &'static str = "TextField";

    fn bind(core: ComponentCore) -> Self {
        Self { core }
    }

    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn handlers() -> &'static HandlerTable {
        static TABLE: OnceLock<HandlerTable> = OnceLock::new();
        TABLE.get_or_init(|| input_table(Self::KIND))
    }

    fn input_locator(root: &CompositeLocator, _markers: &Markers) -> Option<CompositeLocator> {
        Some(input_below(root))
    }
}

impl HasValue for TextField {
    fn value(&self) -> PagewireResult<String> {
        read_input(self)
    }

    fn set_value(&self, value: &str) -> PagewireResult<&Self> {
        replace_input(self, value)?;
        Ok(self)
    }
}

/// Multi-line text area; the root is the input
#[derive(Debug, Clone)]
pub struct TextArea {
    core: ComponentCore,
}

impl TextArea {
    /// Clear the area
    pub fn clear(&self) -> PagewireResult<&Self> {
        clear_input(self)?;
        Ok(self)
    }
}

impl Component for TextArea {
    const KIND: &'static str = "TextArea";

    fn bind(core: ComponentCore) -> Self {
        Self { core }
    }

    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn handlers() -> &'static HandlerTable {
        static TABLE: OnceLock<HandlerTable> = OnceLock::new();
        TABLE.get_or_init(|| input_table(Self::KIND))
    }

    fn input_locator(root: &CompositeLocator, _markers: &Markers) -> Option<CompositeLocator> {
        Some(root.clone())
    }
}

impl HasValue for TextArea {
    fn value(&self) -> PagewireResult<String> {
        read_input(self)
    }

    fn set_value(&self, value: &str) -> PagewireResult<&Self> {
        replace_input(self, value)?;
        Ok(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::condition::{editable, readonly, required, value, value_contains};
    use crate::mock::{MockElement, MockPage, NodeId};

    fn field(initial: &str) -> (MockPage, NodeId, NodeId) {
        let page = MockPage::new();
        let root = page.root(MockElement::div().with_test_id("name").with_class("required"));
        let input = page.child(root, MockElement::input(initial));
        (page, root, input)
    }

    mod value_tests {
        use super::*;

        #[test]
        fn test_value_conditions() {
            let (page, _, _) = field("Ada  Lovelace");
            let name: TextField = page.session().resolve("name").unwrap();
            assert!(name.has(&value("Ada Lovelace")).unwrap());
            assert!(name.has(&value_contains("Love")).unwrap());
            assert!(!name.has(&value("Ada")).unwrap());
        }

        #[test]
        fn test_empty_expected_matches_only_empty() {
            let (page, _, input) = field("");
            let name: TextField = page.session().resolve("name").unwrap();
            assert!(name.has(&value("")).unwrap());
            assert!(name.has(&value_contains("")).unwrap());

            page.set_value(input, "x");
            assert!(!name.has(&value("")).unwrap());
            assert!(!name.has(&value_contains("")).unwrap());
        }

        #[test]
        fn test_whitespace_only_value_counts_as_empty() {
            let (page, _, input) = field(" \u{00A0}\t ");
            let name: TextField = page.session().resolve("name").unwrap();
            assert!(name.has(&value("")).unwrap());
            assert!(name.has(&value_contains("  ")).unwrap());

            page.set_value(input, " x ");
            assert!(!name.has(&value("")).unwrap());
            assert!(name.has(&value("x")).unwrap());
        }

        #[test]
        fn test_hidden_input_never_matches() {
            let (page, _, input) = field("Ada");
            page.set_displayed(input, false);
            let name: TextField = page.session().resolve("name").unwrap();
            assert!(!name.has(&value("Ada")).unwrap());
        }

        #[test]
        fn test_set_value_replaces_text() {
            let (page, _, input) = field("Ada");
            let name: TextField = page.session().resolve("name").unwrap();
            name.set_value("Grace").unwrap();
            assert_eq!(page.value(input).as_deref(), Some("Grace"));
            assert_eq!(name.value().unwrap(), "Grace");

            name.clear().unwrap();
            assert_eq!(page.value(input).as_deref(), Some(""));
        }
    }

    mod state_tests {
        use super::*;

        #[test]
        fn test_field_markers() {
            let (page, root, _) = field("");
            let name: TextField = page.session().resolve("name").unwrap();
            assert!(name.is(&required()).unwrap());
            assert!(name.is(&editable()).unwrap());
            page.add_class(root, "readonly");
            assert!(name.is(&readonly()).unwrap());
            assert!(!name.is(&editable()).unwrap());
        }

        #[test]
        fn test_text_area_input_is_root() {
            let page = MockPage::new();
            let area = page.root(MockElement::textarea("line one\nline two").with_test_id("notes"));
            let notes: TextArea = page.session().resolve("notes").unwrap();
            assert!(notes.has(&value("line one line two")).unwrap());
            notes.set_value("rewritten").unwrap();
            assert_eq!(page.value(area).as_deref(), Some("rewritten"));
        }
    }
}
