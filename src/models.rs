//! Row model shared by the table view and the chart adapter.
//!
//! A [`Row`] is an ordered mapping from column name to a typed cell value
//! (`serde_json::Value` with the `preserve_order` feature, so every row keeps
//! the header key order). A [`RowSet`] is the canonical, insertion-ordered
//! sequence of rows for one loaded dataset. The canonical set is never
//! reordered in place; filtering and sorting always produce projections.

use serde_json::Value;

/// A single parsed CSV row: column name -> string | number | null.
pub type Row = serde_json::Map<String, Value>;

/// The full set of ingested rows for one dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    /// Column names in source order, uniform across all rows.
    pub headers: Vec<String>,
    /// Rows in parse order.
    pub rows: Vec<Row>,
}

impl RowSet {
    /// An empty row set (zero columns, zero rows).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the set has zero rows or zero columns.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.headers.is_empty()
    }
}

/// String form of a cell value: null renders as the empty string,
/// strings render verbatim, numbers render in their JSON form.
pub fn display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numeric form of a cell value: numbers pass through, numeric-looking
/// strings are parsed, everything else (including null) is `None`.
///
/// Rows whose value has no numeric form are excluded from aggregation,
/// never coerced to zero.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}
