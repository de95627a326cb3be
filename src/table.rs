//! Table view engine: search filtering, column sorting and display formatting.
//!
//! Holds the canonical row set (set once per load) plus the current sort
//! state and search term. `render` is a full deterministic recomputation
//! from canonical data on every call; the canonical order is never mutated,
//! and the sort key lives in explicit state, never read back from rendered
//! output.

use std::cmp::Ordering;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::{display_string, Row, RowSet};

/// Message shown when the canonical set itself is empty.
pub const MSG_EMPTY_DATASET: &str = "Nenhum dado encontrado ou CSV vazio.";

/// Message shown when the search term filtered out every row.
pub const MSG_NO_RESULTS: &str = "Nenhum resultado encontrado para a busca.";

/// Column whose `YYYY-MM-DD` values are reformatted for display.
const DATE_COLUMN: &str = "Data";

static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date shape regex"));

/// Sort direction for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Current sort configuration. Default is unsorted; reset only by reload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    pub column: Option<String>,
    pub direction: Option<SortDirection>,
}

/// A rendered header cell: column name plus its sort tag, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub name: String,
    pub sort: Option<SortDirection>,
}

/// Which of the three distinct display states the body is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// At least one row survived the filter.
    Populated,
    /// The canonical set matched, but the filter excluded everything.
    NoResults,
    /// The canonical set itself has zero rows or zero columns.
    EmptyDataset,
}

/// Output of one render pass: header row plus formatted body rows.
#[derive(Debug, Clone, PartialEq)]
pub struct TableViewModel {
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<Vec<String>>,
    pub state: ViewState,
}

impl TableViewModel {
    /// The single explanatory message for non-populated states.
    pub fn message(&self) -> Option<&'static str> {
        match self.state {
            ViewState::Populated => None,
            ViewState::NoResults => Some(MSG_NO_RESULTS),
            ViewState::EmptyDataset => Some(MSG_EMPTY_DATASET),
        }
    }
}

/// The table view engine.
#[derive(Debug, Clone, Default)]
pub struct TableView {
    canonical: RowSet,
    sort: SortState,
    search: String,
}

impl TableView {
    /// Create a view over a freshly ingested row set.
    pub fn new(canonical: RowSet) -> Self {
        Self { canonical, sort: SortState::default(), search: String::new() }
    }

    /// The canonical, unfiltered row set.
    pub fn canonical(&self) -> &RowSet {
        &self.canonical
    }

    /// Current sort state.
    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    /// Current search term.
    pub fn search_term(&self) -> &str {
        &self.search
    }

    /// Set the free-text search term. Empty matches everything.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Sort by `column`, flipping direction when it is already the sort key.
    pub fn toggle_sort(&mut self, column: &str) {
        if self.sort.column.as_deref() == Some(column) {
            self.sort.direction = Some(
                self.sort
                    .direction
                    .unwrap_or(SortDirection::Ascending)
                    .flipped(),
            );
        } else {
            self.sort.column = Some(column.to_string());
            self.sort.direction = Some(SortDirection::Ascending);
        }
    }

    /// Recompute the visible table from canonical data and current state.
    pub fn render(&self) -> TableViewModel {
        let headers: Vec<HeaderCell> = self
            .canonical
            .headers
            .iter()
            .map(|name| HeaderCell {
                name: name.clone(),
                sort: match &self.sort.column {
                    Some(c) if c == name => self.sort.direction,
                    _ => None,
                },
            })
            .collect();

        if self.canonical.is_empty() {
            return TableViewModel { headers, rows: vec![], state: ViewState::EmptyDataset };
        }

        let term = self.search.to_lowercase();
        let mut filtered: Vec<&Row> = self
            .canonical
            .rows
            .iter()
            .filter(|row| row_matches(row, &term))
            .collect();

        if let (Some(column), Some(direction)) = (&self.sort.column, self.sort.direction) {
            // Stable sort; descending reverses the ascending comparison
            // rather than using a separate comparator.
            filtered.sort_by(|a, b| {
                let ordering = compare_cells(cell(a, column), cell(b, column));
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        let state = if filtered.is_empty() { ViewState::NoResults } else { ViewState::Populated };

        let rows = filtered
            .iter()
            .map(|row| {
                self.canonical
                    .headers
                    .iter()
                    .map(|column| format_cell(column, cell(row, column)))
                    .collect()
            })
            .collect();

        TableViewModel { headers, rows, state }
    }
}

fn cell<'a>(row: &'a Row, column: &str) -> &'a Value {
    row.get(column).unwrap_or(&Value::Null)
}

/// A row matches when any field's string form contains the lowercase term.
fn row_matches(row: &Row, lowercase_term: &str) -> bool {
    if lowercase_term.is_empty() {
        return true;
    }
    row.values()
        .any(|v| display_string(v).to_lowercase().contains(lowercase_term))
}

/// Numeric comparison when both values are numbers, otherwise
/// case-insensitive string comparison.
fn compare_cells(a: &Value, b: &Value) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    display_string(a)
        .to_lowercase()
        .cmp(&display_string(b).to_lowercase())
}

/// Display formatting. The single special rule: a `Data` column holding a
/// string of the exact shape `YYYY-MM-DD` renders as `DD/MM/YYYY`. Values
/// failing the shape check (or naming an impossible date) pass through.
fn format_cell(column: &str, value: &Value) -> String {
    if column == DATE_COLUMN {
        if let Value::String(s) = value {
            if DATE_SHAPE.is_match(s) {
                if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    return date.format("%d/%m/%Y").to_string();
                }
            }
        }
    }
    display_string(value)
}
