//! Locator algebra for addressing elements.
//!
//! A [`CompositeLocator`] is an ordered, non-empty list of [`LocatorStep`]s.
//! Steps compose left to right: each one is scoped to the elements produced
//! by the previous step. Locators are pure descriptions; nothing here talks
//! to a driver.
//!
//! # Step families
//!
//! - **Descend** steps select descendants of the current scope:
//!   [`ByStableId`](LocatorStep::ByStableId), text steps, CSS class, tag.
//! - **Filter** steps refine the previous result set:
//!   [`Nth`](LocatorStep::Nth), [`Where`](LocatorStep::Where) and
//!   [`Has`](LocatorStep::Has).
//! - **Anchor**: [`ByReference`](LocatorStep::ByReference) yields one
//!   already-resolved handle.
//! - **Structural** steps (index, row, selection, cells) only mean something
//!   to a component that knows its own rows and items. They must be
//!   translated by that component before reaching the driver.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::driver::DomRef;
use crate::result::{PagewireError, PagewireResult};

/// Collapse whitespace runs (space, tab, CR, LF, NBSP) to one space and trim.
///
/// Idempotent: normalizing a normalized string returns it unchanged.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE
        .get_or_init(|| Regex::new(r"[ \t\r\n\u{00A0}]+").expect("static whitespace pattern"));
    re.replace_all(text, " ").trim_matches(' ').to_string()
}

/// Exact text match after normalization.
#[must_use]
pub fn text_equals(actual: &str, expected: &str) -> bool {
    normalize_text(actual) == normalize_text(expected)
}

/// Substring match after normalization.
#[must_use]
pub fn text_contains(actual: &str, substring: &str) -> bool {
    normalize_text(actual).contains(&normalize_text(substring))
}

/// One step of a locator
#[derive(Debug, Clone)]
pub enum LocatorStep {
    /// Descendants carrying the stable test id
    ByStableId(String),
    /// Descendants whose rendered text equals the value
    ByExactText(String),
    /// Descendants whose rendered text contains the value
    ByTextContains(String),
    /// Descendants with a CSS class
    ByCssClass(String),
    /// Descendants with a tag name
    ByTag(String),
    /// Keep only the n-th element (0-based) of the previous result
    Nth(usize),
    /// Keep previous results that themselves satisfy a descend step
    Where(Box<LocatorStep>),
    /// Keep previous results with at least one descendant matching the locator
    Has(Box<CompositeLocator>),
    /// An already-resolved element, regardless of scope
    ByReference(DomRef),
    /// n-th item of a component (structural)
    ByIndex(usize),
    /// n-th row of a component (structural)
    ByRowIndex(usize),
    /// Cell of a component at row and column (structural)
    ByRowColIndex {
        /// Row index
        row: usize,
        /// Column index
        col: usize,
    },
    /// Selected item or row of a component (structural)
    ByIsSelected,
    /// Row whose cells contain every value (structural)
    ByCells(Vec<String>),
    /// Rows currently rendered as visible (structural)
    ByVisibleRows,
}

impl LocatorStep {
    /// Create a stable id step
    #[must_use]
    pub fn stable_id(id: impl Into<String>) -> Self {
        Self::ByStableId(id.into())
    }

    /// Create an exact text step
    #[must_use]
    pub fn exact_text(text: impl Into<String>) -> Self {
        Self::ByExactText(text.into())
    }

    /// Create a text-contains step
    #[must_use]
    pub fn text_contains(text: impl Into<String>) -> Self {
        Self::ByTextContains(text.into())
    }

    /// Create a CSS class step
    #[must_use]
    pub fn css_class(name: impl Into<String>) -> Self {
        Self::ByCssClass(name.into())
    }

    /// Create a tag step
    #[must_use]
    pub fn tag(name: impl Into<String>) -> Self {
        Self::ByTag(name.into())
    }

    /// Create a positional filter
    #[must_use]
    pub const fn nth(n: usize) -> Self {
        Self::Nth(n)
    }

    /// Keep previous matches satisfying `step`
    #[must_use]
    pub fn matching(step: LocatorStep) -> Self {
        Self::Where(Box::new(step))
    }

    /// Keep previous matches containing an element matched by `inner`
    #[must_use]
    pub fn has(inner: CompositeLocator) -> Self {
        Self::Has(Box::new(inner))
    }

    /// Anchor on a resolved handle
    #[must_use]
    pub fn reference(handle: DomRef) -> Self {
        Self::ByReference(handle)
    }

    /// Create an item index step
    #[must_use]
    pub const fn index(n: usize) -> Self {
        Self::ByIndex(n)
    }

    /// Create a row index step
    #[must_use]
    pub const fn row_index(n: usize) -> Self {
        Self::ByRowIndex(n)
    }

    /// Create a cell step
    #[must_use]
    pub const fn row_col(row: usize, col: usize) -> Self {
        Self::ByRowColIndex { row, col }
    }

    /// Create a selected-item step
    #[must_use]
    pub const fn selected() -> Self {
        Self::ByIsSelected
    }

    /// Create a cells step
    #[must_use]
    pub fn cells<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ByCells(values.into_iter().map(Into::into).collect())
    }

    /// Create a visible-rows step
    #[must_use]
    pub const fn visible_rows() -> Self {
        Self::ByVisibleRows
    }

    /// Whether only a component implementation can resolve this step
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::ByIndex(_)
                | Self::ByRowIndex(_)
                | Self::ByRowColIndex { .. }
                | Self::ByIsSelected
                | Self::ByCells(_)
                | Self::ByVisibleRows
        )
    }

    /// Whether the step is a predicate over a single element, usable inside `Where`
    #[must_use]
    pub const fn is_predicate(&self) -> bool {
        matches!(
            self,
            Self::ByStableId(_)
                | Self::ByExactText(_)
                | Self::ByTextContains(_)
                | Self::ByCssClass(_)
                | Self::ByTag(_)
        )
    }

    /// Check rendered text against a text step. `None` for non-text steps.
    #[must_use]
    pub fn matches_text(&self, rendered: &str) -> Option<bool> {
        match self {
            Self::ByExactText(expected) => Some(text_equals(rendered, expected)),
            Self::ByTextContains(substring) => Some(text_contains(rendered, substring)),
            _ => None,
        }
    }

    /// Render as a CSS fragment for adapters that speak CSS.
    ///
    /// Only id, class and tag steps have a CSS form.
    #[must_use]
    pub fn to_css(&self, stable_id_attribute: &str) -> Option<String> {
        match self {
            Self::ByStableId(id) => Some(format!("[{stable_id_attribute}={id:?}]")),
            Self::ByCssClass(name) => Some(format!(".{name}")),
            Self::ByTag(name) => Some(name.clone()),
            _ => None,
        }
    }
}

impl PartialEq for LocatorStep {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::ByStableId(a), Self::ByStableId(b))
            | (Self::ByExactText(a), Self::ByExactText(b))
            | (Self::ByTextContains(a), Self::ByTextContains(b))
            | (Self::ByCssClass(a), Self::ByCssClass(b))
            | (Self::ByTag(a), Self::ByTag(b)) => a == b,
            (Self::Nth(a), Self::Nth(b))
            | (Self::ByIndex(a), Self::ByIndex(b))
            | (Self::ByRowIndex(a), Self::ByRowIndex(b)) => a == b,
            (Self::Where(a), Self::Where(b)) => a == b,
            (Self::Has(a), Self::Has(b)) => a == b,
            (Self::ByReference(a), Self::ByReference(b)) => a.reference() == b.reference(),
            (
                Self::ByRowColIndex { row: r1, col: c1 },
                Self::ByRowColIndex { row: r2, col: c2 },
            ) => r1 == r2 && c1 == c2,
            (Self::ByIsSelected, Self::ByIsSelected)
            | (Self::ByVisibleRows, Self::ByVisibleRows) => true,
            (Self::ByCells(a), Self::ByCells(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for LocatorStep {}

impl fmt::Display for LocatorStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByStableId(id) => write!(f, "By.stableId: {id}"),
            Self::ByExactText(text) => write!(f, "By.exactText: {text}"),
            Self::ByTextContains(text) => write!(f, "By.textContains: {text}"),
            Self::ByCssClass(name) => write!(f, "By.cssClass: {name}"),
            Self::ByTag(name) => write!(f, "By.tag: {name}"),
            Self::Nth(n) => write!(f, "By.nth: {n}"),
            Self::Where(step) => write!(f, "By.where({step})"),
            Self::Has(inner) => write!(f, "By.has({inner})"),
            Self::ByReference(handle) => write!(f, "By.reference: {}", handle.reference()),
            Self::ByIndex(n) => write!(f, "By.index: {n}"),
            Self::ByRowIndex(n) => write!(f, "By.rowIndex: {n}"),
            Self::ByRowColIndex { row, col } => write!(f, "By.rowColIndex: {row},{col}"),
            Self::ByIsSelected => write!(f, "By.selected"),
            Self::ByCells(values) => write!(f, "By.cells: {}", values.join(",")),
            Self::ByVisibleRows => write!(f, "By.visibleRows"),
        }
    }
}

/// Anything `chain` accepts: a single step or a whole locator.
#[derive(Debug, Clone)]
pub enum LocatorPart {
    /// One step
    Step(LocatorStep),
    /// A locator, flattened into the result
    Locator(CompositeLocator),
}

impl From<LocatorStep> for LocatorPart {
    fn from(step: LocatorStep) -> Self {
        Self::Step(step)
    }
}

impl From<CompositeLocator> for LocatorPart {
    fn from(locator: CompositeLocator) -> Self {
        Self::Locator(locator)
    }
}

impl From<&CompositeLocator> for LocatorPart {
    fn from(locator: &CompositeLocator) -> Self {
        Self::Locator(locator.clone())
    }
}

/// Ordered, non-empty sequence of steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeLocator {
    steps: Vec<LocatorStep>,
}

/// Concatenate steps and locators into one flat locator.
///
/// Nested locators are flattened, so `chain` is associative.
///
/// # Errors
///
/// Returns [`PagewireError::EmptyLocator`] when the result has no steps.
pub fn chain<I, P>(parts: I) -> PagewireResult<CompositeLocator>
where
    I: IntoIterator<Item = P>,
    P: Into<LocatorPart>,
{
    let mut steps = Vec::new();
    for part in parts {
        match part.into() {
            LocatorPart::Step(step) => steps.push(step),
            LocatorPart::Locator(locator) => steps.extend(locator.steps),
        }
    }
    CompositeLocator::from_steps(steps)
}

/// Build a locator from stable id segments: `["a", "b"]` is
/// `chain([ByStableId("a"), ByStableId("b")])`.
pub fn path<I, S>(segments: I) -> PagewireResult<CompositeLocator>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    CompositeLocator::from_steps(
        segments
            .into_iter()
            .map(|segment| LocatorStep::stable_id(segment.as_ref()))
            .collect(),
    )
}

impl CompositeLocator {
    /// Single-step locator
    #[must_use]
    pub fn new(step: LocatorStep) -> Self {
        Self { steps: vec![step] }
    }

    /// Locator from an explicit step list
    ///
    /// # Errors
    ///
    /// Returns [`PagewireError::EmptyLocator`] for an empty list.
    pub fn from_steps(steps: Vec<LocatorStep>) -> PagewireResult<Self> {
        if steps.is_empty() {
            return Err(PagewireError::EmptyLocator);
        }
        Ok(Self { steps })
    }

    /// Single stable id step
    #[must_use]
    pub fn stable_id(id: impl Into<String>) -> Self {
        Self::new(LocatorStep::stable_id(id))
    }

    /// The steps in order
    #[must_use]
    pub fn steps(&self) -> &[LocatorStep] {
        &self.steps
    }

    /// Final step, which decides leaf semantics
    #[must_use]
    pub fn last(&self) -> &LocatorStep {
        // Non-empty by construction.
        &self.steps[self.steps.len() - 1]
    }

    /// Number of steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false; kept for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// New locator with one more step
    #[must_use]
    pub fn then(&self, step: LocatorStep) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self { steps }
    }

    /// New locator with all of `other`'s steps appended
    #[must_use]
    pub fn join(&self, other: &CompositeLocator) -> Self {
        let mut steps = self.steps.clone();
        steps.extend(other.steps.iter().cloned());
        Self { steps }
    }

    /// First structural-only step, if any
    #[must_use]
    pub fn first_structural(&self) -> Option<&LocatorStep> {
        self.steps.iter().find(|step| step.is_structural())
    }

    /// Verify the locator can be handed to a driver as-is.
    ///
    /// # Errors
    ///
    /// [`PagewireError::StructuralLocatorMisuse`] for structural steps,
    /// [`PagewireError::InvalidLocator`] for `Where` around a non-predicate.
    /// `Has` locators are checked the same way.
    pub fn ensure_resolvable(&self) -> PagewireResult<()> {
        if let Some(step) = self.first_structural() {
            return Err(PagewireError::StructuralLocatorMisuse {
                step: step.to_string(),
                locator: self.to_string(),
            });
        }
        for step in &self.steps {
            match step {
                LocatorStep::Where(inner) if !inner.is_predicate() => {
                    return Err(PagewireError::invalid_locator(format!(
                        "{inner} cannot be used as a filter"
                    )));
                }
                LocatorStep::Has(inner) => inner.ensure_resolvable()?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Render as a descendant CSS selector, if every step has a CSS form
    #[must_use]
    pub fn to_css(&self, stable_id_attribute: &str) -> Option<String> {
        let parts: Option<Vec<String>> = self
            .steps
            .iter()
            .map(|step| step.to_css(stable_id_attribute))
            .collect();
        parts.map(|p| p.join(" "))
    }
}

impl From<LocatorStep> for CompositeLocator {
    fn from(step: LocatorStep) -> Self {
        Self::new(step)
    }
}

impl<'a> IntoIterator for &'a CompositeLocator {
    type Item = &'a LocatorStep;
    type IntoIter = std::slice::Iter<'a, LocatorStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl fmt::Display for CompositeLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, " > ")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod normalize_tests {
        use super::*;

        #[test]
        fn test_collapses_mixed_whitespace() {
            assert_eq!(normalize_text("a \t\n\u{00A0} b"), "a b");
            assert_eq!(normalize_text("  Submit "), "Submit");
            assert_eq!(normalize_text(""), "");
        }

        #[test]
        fn test_exact_text_ignores_whitespace_shape() {
            let step = LocatorStep::exact_text("a  b");
            assert_eq!(step.matches_text("a\nb"), Some(true));
            assert_eq!(step.matches_text("a b c"), Some(false));
        }

        #[test]
        fn test_exact_text_trailing_space() {
            let step = LocatorStep::exact_text("Submit");
            assert_eq!(step.matches_text("Submit "), Some(true));
            assert_eq!(step.matches_text("Submit now"), Some(false));
        }

        #[test]
        fn test_contains_text() {
            let step = LocatorStep::text_contains("now\tplease");
            assert_eq!(step.matches_text("Submit now please"), Some(true));
            assert_eq!(step.matches_text("Submit later"), Some(false));
            assert_eq!(LocatorStep::tag("div").matches_text("x"), None);
        }
    }

    mod chain_tests {
        use super::*;

        #[test]
        fn test_chain_rejects_empty() {
            let parts: Vec<LocatorStep> = Vec::new();
            assert!(matches!(chain(parts), Err(PagewireError::EmptyLocator)));
            assert!(matches!(path(Vec::<&str>::new()), Err(PagewireError::EmptyLocator)));
        }

        #[test]
        fn test_chain_flattens_nested_locators() {
            let a = LocatorStep::stable_id("a");
            let b = LocatorStep::css_class("b");
            let c = LocatorStep::tag("input");

            let left = chain([
                LocatorPart::from(chain([a.clone(), b.clone()]).unwrap()),
                LocatorPart::from(c.clone()),
            ])
            .unwrap();
            let right = chain([
                LocatorPart::from(a.clone()),
                LocatorPart::from(chain([b.clone(), c.clone()]).unwrap()),
            ])
            .unwrap();
            let flat = chain([a, b, c]).unwrap();

            assert_eq!(left, flat);
            assert_eq!(right, flat);
            assert_eq!(flat.len(), 3);
        }

        #[test]
        fn test_path_is_chain_of_stable_ids() {
            let from_path = path(["form", "rememberMe"]).unwrap();
            let explicit = chain([
                LocatorStep::stable_id("form"),
                LocatorStep::stable_id("rememberMe"),
            ])
            .unwrap();
            assert_eq!(from_path, explicit);
            assert_eq!(from_path.last(), &LocatorStep::stable_id("rememberMe"));
        }

        #[test]
        fn test_then_and_join_leave_original_untouched() {
            let root = CompositeLocator::stable_id("sheet");
            let tab = root.then(LocatorStep::nth(1));
            assert_eq!(root.len(), 1);
            assert_eq!(tab.len(), 2);

            let joined = root.join(&tab);
            assert_eq!(joined.len(), 3);
        }
    }

    mod resolvability_tests {
        use super::*;

        #[test]
        fn test_structural_step_is_misuse() {
            let locator = CompositeLocator::stable_id("grid").then(LocatorStep::row_index(2));
            match locator.ensure_resolvable() {
                Err(PagewireError::StructuralLocatorMisuse { step, locator }) => {
                    assert_eq!(step, "By.rowIndex: 2");
                    assert!(locator.starts_with("By.stableId: grid"));
                }
                other => panic!("expected misuse, got {other:?}"),
            }
        }

        #[test]
        fn test_where_requires_predicate() {
            let bad =
                CompositeLocator::stable_id("x").then(LocatorStep::matching(LocatorStep::nth(0)));
            assert!(matches!(
                bad.ensure_resolvable(),
                Err(PagewireError::InvalidLocator { .. })
            ));

            let good = CompositeLocator::stable_id("x")
                .then(LocatorStep::matching(LocatorStep::css_class("selected")));
            assert!(good.ensure_resolvable().is_ok());
        }

        #[test]
        fn test_has_checks_inner_locator() {
            let cell = CompositeLocator::new(LocatorStep::css_class("grid-cell"))
                .then(LocatorStep::matching(LocatorStep::exact_text("Ada")));
            let rows = CompositeLocator::stable_id("grid")
                .then(LocatorStep::css_class("grid-row"))
                .then(LocatorStep::has(cell));
            assert!(rows.ensure_resolvable().is_ok());
            assert_eq!(
                rows.to_string(),
                "By.stableId: grid > By.cssClass: grid-row > \
                 By.has(By.cssClass: grid-cell > By.where(By.exactText: Ada))"
            );

            let nested = CompositeLocator::stable_id("grid")
                .then(LocatorStep::has(CompositeLocator::new(LocatorStep::row_index(1))));
            assert!(matches!(
                nested.ensure_resolvable(),
                Err(PagewireError::StructuralLocatorMisuse { .. })
            ));
        }

        #[test]
        fn test_structural_classification() {
            assert!(LocatorStep::index(0).is_structural());
            assert!(LocatorStep::selected().is_structural());
            assert!(LocatorStep::cells(["a"]).is_structural());
            assert!(LocatorStep::visible_rows().is_structural());
            assert!(!LocatorStep::nth(0).is_structural());
            assert!(!LocatorStep::stable_id("a").is_structural());
        }
    }

    mod display_tests {
        use super::*;

        #[test]
        fn test_locator_display() {
            let locator = chain([
                LocatorStep::stable_id("username"),
                LocatorStep::tag("input"),
            ])
            .unwrap();
            assert_eq!(locator.to_string(), "By.stableId: username > By.tag: input");
        }

        #[test]
        fn test_structural_display() {
            assert_eq!(LocatorStep::row_col(1, 2).to_string(), "By.rowColIndex: 1,2");
            assert_eq!(LocatorStep::cells(["a", "b"]).to_string(), "By.cells: a,b");
            assert_eq!(
                LocatorStep::matching(LocatorStep::css_class("on")).to_string(),
                "By.where(By.cssClass: on)"
            );
        }

        #[test]
        fn test_to_css() {
            let locator = chain([
                LocatorStep::stable_id("form"),
                LocatorStep::css_class("field"),
                LocatorStep::tag("input"),
            ])
            .unwrap();
            assert_eq!(
                locator.to_css("data-testid").as_deref(),
                Some("[data-testid=\"form\"] .field input")
            );
            assert!(locator.then(LocatorStep::nth(0)).to_css("data-testid").is_none());
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_step() -> impl Strategy<Value = LocatorStep> {
            prop_oneof![
                "[a-z]{1,8}".prop_map(LocatorStep::stable_id),
                "[a-z ]{0,8}".prop_map(LocatorStep::exact_text),
                "[a-z]{1,8}".prop_map(LocatorStep::css_class),
                (0usize..10).prop_map(LocatorStep::nth),
                (0usize..10).prop_map(LocatorStep::row_index),
                Just(LocatorStep::selected()),
            ]
        }

        proptest! {
            #[test]
            fn prop_chain_is_associative(
                a in prop::collection::vec(any_step(), 1..4),
                b in prop::collection::vec(any_step(), 1..4),
                c in prop::collection::vec(any_step(), 1..4),
            ) {
                let la = CompositeLocator::from_steps(a.clone()).unwrap();
                let lb = CompositeLocator::from_steps(b.clone()).unwrap();
                let lc = CompositeLocator::from_steps(c.clone()).unwrap();

                let left = chain([chain([la.clone(), lb.clone()]).unwrap(), lc.clone()]).unwrap();
                let right = chain([la, chain([lb, lc]).unwrap()]).unwrap();
                let flat: Vec<LocatorStep> = a.into_iter().chain(b).chain(c).collect();

                prop_assert_eq!(&left, &right);
                prop_assert_eq!(left.steps(), flat.as_slice());
            }

            #[test]
            fn prop_normalize_is_idempotent(text in "[ a-zA-Z\t\n\u{00A0}]{0,32}") {
                let once = normalize_text(&text);
                prop_assert_eq!(normalize_text(&once), once.clone());
                prop_assert!(!once.starts_with(' ') && !once.ends_with(' '));
                prop_assert!(!once.contains("  "));
            }
        }
    }
}
