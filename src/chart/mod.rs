//! Aggregation and chart adapter.
//!
//! Derives a label/value column pair per chart slot (see [`rules`]), sums
//! values grouped by label in first-encountered order, and emits a
//! [`ChartSpec`] describing the visual for the external charting renderer.
//! Series are recomputed in full on every data load, never patched.

pub mod registry;
pub mod rules;

pub use registry::{ChartInstance, ChartRegistry, ChartRenderer};

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::models::{display_string, numeric_value, RowSet};

/// Accent color for the primary bar chart.
pub const ACCENT_COLOR: &str = "rgba(54, 162, 235, 0.7)";

/// Fixed palette cycled across the secondary chart's categories.
pub const PALETTE: &[&str] = &[
    "rgba(255, 99, 132, 0.7)",
    "rgba(54, 162, 235, 0.7)",
    "rgba(255, 206, 86, 0.7)",
    "rgba(75, 192, 192, 0.7)",
    "rgba(153, 102, 255, 0.7)",
    "rgba(255, 159, 64, 0.7)",
];

/// The two fixed chart roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Primary,
    Secondary,
}

impl Slot {
    /// Slot order used for rendering and export.
    pub const ALL: [Slot; 2] = [Slot::Primary, Slot::Secondary];

    /// Export caption for this slot.
    pub fn caption(&self) -> &'static str {
        match self {
            Slot::Primary => "Primary chart",
            Slot::Secondary => "Secondary chart",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Primary => write!(f, "primary"),
            Slot::Secondary => write!(f, "secondary"),
        }
    }
}

/// Kind of visual the renderer should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Donut,
}

/// An aggregated series: categories and totals aligned by index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub label_column: String,
    pub value_column: String,
    /// Distinct labels in first-encountered order.
    pub categories: Vec<String>,
    /// Per-category sums, aligned with `categories`.
    pub totals: Vec<f64>,
}

/// Everything the external charting capability needs for one slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub slot: Slot,
    pub kind: ChartKind,
    pub series: ChartSeries,
    /// Dataset label shown by the renderer.
    pub dataset_label: String,
    /// Chart title.
    pub title: String,
    /// One color per category (primary repeats the accent color).
    pub colors: Vec<String>,
    /// Only the secondary slot shows a legend.
    pub show_legend: bool,
}

/// Build the aggregated series for a slot, or `None` to skip the slot.
///
/// Skips when the slot's selection rules find no usable column pair, or
/// when fewer than 2 rows are present.
pub fn build_series(rows: &RowSet, dataset_id: &str, slot: Slot) -> Option<ChartSeries> {
    if rows.len() < 2 || rows.headers.is_empty() {
        return None;
    }

    let (label_column, value_column) = rules::select_columns(slot, dataset_id, &rows.headers)?;
    let (categories, totals) = aggregate(rows, &label_column, &value_column);

    debug!(
        dataset = dataset_id,
        %slot,
        label = %label_column,
        value = %value_column,
        categories = categories.len(),
        "built chart series"
    );

    Some(ChartSeries { label_column, value_column, categories, totals })
}

/// Attach the slot's presentation hints to a series.
pub fn chart_spec(slot: Slot, series: ChartSeries) -> ChartSpec {
    let kind = match slot {
        Slot::Primary => ChartKind::Bar,
        Slot::Secondary => ChartKind::Donut,
    };
    let colors = match slot {
        Slot::Primary => vec![ACCENT_COLOR.to_string(); series.categories.len()],
        Slot::Secondary => series
            .categories
            .iter()
            .enumerate()
            .map(|(i, _)| PALETTE[i % PALETTE.len()].to_string())
            .collect(),
    };

    ChartSpec {
        slot,
        kind,
        dataset_label: format!("Total Agregado: {}", series.value_column),
        title: format!(
            "Visualização Agregada: {} por {}",
            series.value_column, series.label_column
        ),
        colors,
        show_legend: slot == Slot::Secondary,
        series,
    }
}

/// Group rows by the label column's string form and sum the value column's
/// numeric form. Rows with an empty label or a non-numeric value are
/// excluded. Category order is first-encountered order.
fn aggregate(rows: &RowSet, label_column: &str, value_column: &str) -> (Vec<String>, Vec<f64>) {
    let mut categories: Vec<String> = Vec::new();
    let mut totals: Vec<f64> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in &rows.rows {
        let label = row.get(label_column).map(display_string).unwrap_or_default();
        if label.is_empty() {
            continue;
        }
        let Some(value) = row.get(value_column).and_then(numeric_value) else {
            continue;
        };

        match index.get(&label) {
            Some(&i) => totals[i] += value,
            None => {
                index.insert(label.clone(), categories.len());
                categories.push(label);
                totals.push(value);
            }
        }
    }

    (categories, totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::tokenize;

    fn marketing() -> RowSet {
        tokenize(
            "Campanha,Cliques,Custo,Conversoes\n\
             Google Ads Q1,5500,3200,120\n\
             Facebook Ads Q1,7800,2500,95\n\
             SEO Orgânico,12000,0,250\n\
             Email Mkt,4500,150,60",
        )
        .unwrap()
    }

    #[test]
    fn test_primary_series_for_marketing() {
        let series = build_series(&marketing(), "marketing", Slot::Primary).unwrap();
        assert_eq!(series.label_column, "Campanha");
        assert_eq!(series.value_column, "Cliques");
        assert_eq!(series.categories.len(), 4);
        assert_eq!(series.totals.iter().sum::<f64>(), 5500.0 + 7800.0 + 12000.0 + 4500.0);
    }

    #[test]
    fn test_aggregation_sums_repeated_labels_in_first_seen_order() {
        let set = tokenize("Regiao,Valor\nSul,10\nNorte,5\nSul,7\nLeste,1\nNorte,2").unwrap();
        let series = build_series(&set, "qualquer", Slot::Primary).unwrap();
        assert_eq!(series.categories, vec!["Sul", "Norte", "Leste"]);
        assert_eq!(series.totals, vec![17.0, 7.0, 1.0]);
    }

    #[test]
    fn test_aggregation_excludes_uncountable_rows() {
        let set = tokenize("Regiao,Valor\nSul,10\n,99\nNorte,indisponivel\nSul,5").unwrap();
        let series = build_series(&set, "qualquer", Slot::Primary).unwrap();
        // Empty label and non-numeric value are excluded, never zeroed:
        // the Norte row contributes no category at all.
        assert_eq!(series.categories, vec!["Sul"]);
        assert_eq!(series.totals, vec![15.0]);
    }

    #[test]
    fn test_single_row_skips() {
        let set = tokenize("A,B\n1,2").unwrap();
        assert!(build_series(&set, "qualquer", Slot::Primary).is_none());
    }

    #[test]
    fn test_spec_presentation_hints() {
        let rows = marketing();
        let primary = chart_spec(Slot::Primary, build_series(&rows, "marketing", Slot::Primary).unwrap());
        assert_eq!(primary.kind, ChartKind::Bar);
        assert!(!primary.show_legend);
        assert!(primary.colors.iter().all(|c| c == ACCENT_COLOR));

        let secondary =
            chart_spec(Slot::Secondary, build_series(&rows, "marketing", Slot::Secondary).unwrap());
        assert_eq!(secondary.kind, ChartKind::Donut);
        assert!(secondary.show_legend);
        assert_eq!(secondary.colors[0], PALETTE[0]);
        assert_eq!(secondary.series.value_column, "Custo");
    }
}
