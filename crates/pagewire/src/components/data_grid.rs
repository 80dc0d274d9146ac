use std::sync::OnceLock;

use super::Label;
use crate::component::{Clickable, Component, ComponentCore};
use crate::condition::{Condition, ConditionKind};
use crate::dispatch::{layers, HandlerLayer, HandlerTable, Probe};
use crate::driver::DriverError;
use crate::locator::{normalize_text, CompositeLocator, LocatorStep};
use crate::result::{PagewireError, PagewireResult};

/// Tabular data; rows and cells carry the grid marker classes
#[derive(Debug, Clone)]
pub struct DataGrid {
    core: ComponentCore,
}

impl DataGrid {
    fn rows_locator(&self) -> CompositeLocator {
        let markers = self.core.session().markers();
        self.core
            .scoped(LocatorStep::css_class(markers.grid_row.clone()))
    }

    /// Translate a row-addressing step into filters over the grid rows
    fn row_filters(&self, step: LocatorStep) -> PagewireResult<Vec<LocatorStep>> {
        let markers = self.core.session().markers();
        let filters = match step {
            LocatorStep::ByRowIndex(n) | LocatorStep::ByIndex(n) | LocatorStep::Nth(n) => {
                vec![LocatorStep::Nth(n)]
            }
            LocatorStep::ByIsSelected => vec![LocatorStep::matching(LocatorStep::css_class(
                markers.selected_row.clone(),
            ))],
            LocatorStep::ByCells(values) => values
                .into_iter()
                .map(|v| {
                    LocatorStep::has(
                        CompositeLocator::new(LocatorStep::css_class(markers.grid_cell.clone()))
                            .then(LocatorStep::matching(LocatorStep::exact_text(v))),
                    )
                })
                .collect(),
            step if step.is_predicate() => vec![LocatorStep::matching(step)],
            other => {
                return Err(PagewireError::invalid_locator(format!(
                    "data grid cannot select rows by {other}"
                )))
            }
        };
        Ok(filters)
    }

    fn filtered(&self, step: LocatorStep) -> PagewireResult<CompositeLocator> {
        Ok(self
            .row_filters(step)?
            .into_iter()
            .fold(self.rows_locator(), |locator, filter| locator.then(filter)))
    }

    /// First row matching `step`.
    ///
    /// Understands `ByRowIndex`, `ByIndex`, `ByIsSelected`, `ByCells` and
    /// `ByVisibleRows` (first visible row), plus plain predicate steps.
    /// `ByCells` needs one cell whose whole text equals each value.
    ///
    /// # Errors
    /// `InvalidLocator` for other steps; `NotAttached` when `ByVisibleRows`
    /// finds no visible row.
    pub fn row(&self, step: LocatorStep) -> PagewireResult<Row> {
        if matches!(step, LocatorStep::ByVisibleRows) {
            return self.visible_rows()?.into_iter().next().ok_or_else(|| {
                DriverError::not_attached(format!("{} > visible row", self.locator())).into()
            });
        }
        Ok(self.core.child(self.filtered(step)?.then(LocatorStep::Nth(0))))
    }

    /// Every row currently matching `step`, each bound by position
    pub fn rows(&self, step: LocatorStep) -> PagewireResult<Vec<Row>> {
        if matches!(step, LocatorStep::ByVisibleRows) {
            return self.visible_rows();
        }
        let filtered = self.filtered(step)?;
        let count = self.core.session().find_all(&filtered)?.len();
        Ok((0..count)
            .map(|i| self.core.child(filtered.then(LocatorStep::Nth(i))))
            .collect())
    }

    /// Rows that are displayed and not marked as filtered out
    pub fn visible_rows(&self) -> PagewireResult<Vec<Row>> {
        let rows = self.rows_locator();
        let hidden = &self.core.session().markers().hidden_row;
        let mut visible = Vec::new();
        for (i, row) in self.core.session().find_all(&rows)?.iter().enumerate() {
            if row.is_displayed()? && !row.has_class(hidden)? {
                visible.push(self.core.child(rows.then(LocatorStep::Nth(i))));
            }
        }
        Ok(visible)
    }

    /// Cell at `ByRowColIndex`.
    ///
    /// # Errors
    /// `InvalidLocator` for any other step.
    pub fn cell(&self, step: LocatorStep) -> PagewireResult<Label> {
        let LocatorStep::ByRowColIndex { row, col } = step else {
            return Err(PagewireError::invalid_locator(format!(
                "data grid cells are addressed by row and column, not {step}"
            )));
        };
        let markers = self.core.session().markers();
        Ok(self.core.child(
            self.rows_locator()
                .then(LocatorStep::Nth(row))
                .then(LocatorStep::css_class(markers.grid_cell.clone()))
                .then(LocatorStep::Nth(col)),
        ))
    }
}

impl Component for DataGrid {
    const KIND: &'static str = "DataGrid";

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

/// One grid row
#[derive(Debug, Clone)]
pub struct Row {
    core: ComponentCore,
}

fn row_selected(probe: &Probe<'_>, _: &Condition) -> PagewireResult<bool> {
    probe.root_has_class(&probe.markers().selected_row)
}

impl Row {
    /// Cell in column `col`
    #[must_use]
    pub fn cell(&self, col: usize) -> Label {
        let markers = self.core.session().markers();
        self.core.child(
            self.core
                .scoped(LocatorStep::css_class(markers.grid_cell.clone()))
                .then(LocatorStep::Nth(col)),
        )
    }

    /// Normalized text of every cell
    pub fn cells(&self) -> PagewireResult<Vec<String>> {
        let markers = self.core.session().markers();
        self.core
            .session()
            .find_all(&self.core.scoped(LocatorStep::css_class(markers.grid_cell.clone())))?
            .iter()
            .map(|cell| -> PagewireResult<String> { Ok(normalize_text(&cell.text()?)) })
            .collect()
    }

    /// Click the row unless it is already selected
    pub fn select(&self) -> PagewireResult<&Self> {
        if !self.is(&Condition::Selected)? {
            self.click()?;
        }
        Ok(self)
    }
}

impl Component for Row {
    const KIND: &'static str = "Row";

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
                .layer(HandlerLayer::new("row").on(ConditionKind::Selected, row_selected))
        })
    }
}

impl Clickable for Row {}
