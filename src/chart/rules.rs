//! Declarative column-selection rules for the two chart slots.
//!
//! Each slot carries an ordered rule list; the first rule whose predicate
//! holds picks the label/value columns, so the heuristic stays testable
//! and easy to extend.
//!
//! The sales dataset's expected columns (`Valor`, `Produto`, `Regiao`) are
//! asserted by name only: when the remote file lacks them, selection falls
//! through to the generic positional rule.

use crate::chart::Slot;
use crate::registry::SALES_DATASET_ID;

/// How a rule picks a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPick {
    /// Column with this exact name.
    Named(&'static str),
    /// Column at this position in header order.
    Index(usize),
}

impl ColumnPick {
    fn resolve(&self, headers: &[String]) -> Option<String> {
        match self {
            Self::Named(name) => headers.iter().find(|h| h == name).cloned(),
            Self::Index(i) => headers.get(*i).cloned(),
        }
    }
}

/// One selection rule: predicate plus label/value picks.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRule {
    /// Only applies to this dataset id, if set.
    pub dataset: Option<&'static str>,
    /// Named columns that must all be present.
    pub requires: &'static [&'static str],
    /// Minimum number of columns the dataset must have.
    pub min_columns: usize,
    pub label: ColumnPick,
    pub value: ColumnPick,
}

impl SelectionRule {
    fn applies(&self, dataset_id: &str, headers: &[String]) -> bool {
        if let Some(required_id) = self.dataset {
            if dataset_id != required_id {
                return false;
            }
        }
        if headers.len() < self.min_columns {
            return false;
        }
        self.requires
            .iter()
            .all(|required| headers.iter().any(|h| h == required))
    }
}

const PRIMARY_RULES: &[SelectionRule] = &[
    SelectionRule {
        dataset: Some(SALES_DATASET_ID),
        requires: &["Valor", "Produto"],
        min_columns: 2,
        label: ColumnPick::Named("Produto"),
        value: ColumnPick::Named("Valor"),
    },
    SelectionRule {
        dataset: None,
        requires: &[],
        min_columns: 2,
        label: ColumnPick::Index(0),
        value: ColumnPick::Index(1),
    },
];

const SECONDARY_RULES: &[SelectionRule] = &[
    SelectionRule {
        dataset: Some(SALES_DATASET_ID),
        requires: &["Valor", "Regiao"],
        min_columns: 2,
        label: ColumnPick::Named("Regiao"),
        value: ColumnPick::Named("Valor"),
    },
    // A meaningful secondary view needs a third column.
    SelectionRule {
        dataset: None,
        requires: &[],
        min_columns: 3,
        label: ColumnPick::Index(0),
        value: ColumnPick::Index(2),
    },
];

/// Evaluate the slot's rules in order; first match wins.
/// `None` means the slot is skipped for this dataset.
pub fn select_columns(slot: Slot, dataset_id: &str, headers: &[String]) -> Option<(String, String)> {
    let rules = match slot {
        Slot::Primary => PRIMARY_RULES,
        Slot::Secondary => SECONDARY_RULES,
    };

    rules
        .iter()
        .find(|rule| rule.applies(dataset_id, headers))
        .and_then(|rule| {
            let label = rule.label.resolve(headers)?;
            let value = rule.value.resolve(headers)?;
            Some((label, value))
        })
}
