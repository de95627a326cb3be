//! Slot-keyed chart instance registry.
//!
//! Chart instances are owned here with an explicit create/destroy lifecycle
//! instead of free-floating mutable handles. On every fresh data load the
//! previous instance for a slot is destroyed before a new one is created,
//! so visuals never overlap and nothing accumulates across reloads.

use std::collections::HashMap;

use tracing::debug;

use crate::chart::{build_series, chart_spec, ChartSpec, Slot};
use crate::models::RowSet;

/// External charting capability: turns a [`ChartSpec`] into a live chart.
pub trait ChartRenderer {
    type Chart: ChartInstance;

    fn create(&mut self, spec: &ChartSpec) -> Self::Chart;
}

/// A live chart produced by the renderer.
///
/// The responsive flag and container shadow are mutable because the export
/// orchestrator snapshots and temporarily overrides them to get a
/// pixel-stable capture.
pub trait ChartInstance {
    /// Release the visual. Called exactly once, before replacement or drop.
    fn destroy(&mut self);

    /// Re-layout after a sizing change.
    fn resize(&mut self);

    fn responsive(&self) -> bool;
    fn set_responsive(&mut self, on: bool);

    /// Container shadow styling, read back during export.
    fn shadow(&self) -> String;
    fn set_shadow(&mut self, style: &str);
}

/// Owns the chart instances for both slots.
pub struct ChartRegistry<R: ChartRenderer> {
    renderer: R,
    charts: HashMap<Slot, R::Chart>,
}

impl<R: ChartRenderer> ChartRegistry<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer, charts: HashMap::new() }
    }

    /// Rebuild both slots from a freshly loaded row set.
    ///
    /// Each slot's previous instance is destroyed first; slots whose
    /// selection rules skip the dataset end up with no instance.
    pub fn rebuild(&mut self, rows: &RowSet, dataset_id: &str) {
        for slot in Slot::ALL {
            self.destroy_slot(slot);
            if let Some(series) = build_series(rows, dataset_id, slot) {
                let spec = chart_spec(slot, series);
                let chart = self.renderer.create(&spec);
                self.charts.insert(slot, chart);
                debug!(%slot, "chart created");
            }
        }
    }

    /// Destroy every instance (used when a load fails and the page resets).
    pub fn clear(&mut self) {
        for slot in Slot::ALL {
            self.destroy_slot(slot);
        }
    }

    fn destroy_slot(&mut self, slot: Slot) {
        if let Some(mut chart) = self.charts.remove(&slot) {
            chart.destroy();
            debug!(%slot, "chart destroyed");
        }
    }

    /// True when no slot has a chart instance.
    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn get(&self, slot: Slot) -> Option<&R::Chart> {
        self.charts.get(&slot)
    }

    pub fn get_mut(&mut self, slot: Slot) -> Option<&mut R::Chart> {
        self.charts.get_mut(&slot)
    }

    /// Slots that currently hold an instance, in slot order.
    pub fn rendered_slots(&self) -> Vec<Slot> {
        Slot::ALL
            .into_iter()
            .filter(|slot| self.charts.contains_key(slot))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::tokenize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Renderer that counts create/destroy calls.
    struct CountingRenderer {
        created: Arc<AtomicUsize>,
        destroyed: Arc<AtomicUsize>,
    }

    struct CountingChart {
        destroyed: Arc<AtomicUsize>,
        responsive: bool,
        shadow: String,
    }

    impl ChartInstance for CountingChart {
        fn destroy(&mut self) {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
        }
        fn resize(&mut self) {}
        fn responsive(&self) -> bool {
            self.responsive
        }
        fn set_responsive(&mut self, on: bool) {
            self.responsive = on;
        }
        fn shadow(&self) -> String {
            self.shadow.clone()
        }
        fn set_shadow(&mut self, style: &str) {
            self.shadow = style.to_string();
        }
    }

    impl ChartRenderer for CountingRenderer {
        type Chart = CountingChart;

        fn create(&mut self, _spec: &ChartSpec) -> CountingChart {
            self.created.fetch_add(1, Ordering::SeqCst);
            CountingChart {
                destroyed: self.destroyed.clone(),
                responsive: true,
                shadow: "0 4px 8px rgba(0,0,0,0.2)".into(),
            }
        }
    }

    #[test]
    fn test_rebuild_destroys_before_creating() {
        let created = Arc::new(AtomicUsize::new(0));
        let destroyed = Arc::new(AtomicUsize::new(0));
        let renderer =
            CountingRenderer { created: created.clone(), destroyed: destroyed.clone() };
        let mut registry = ChartRegistry::new(renderer);

        let rows = tokenize("Campanha,Cliques,Custo\nA,1,2\nB,3,4").unwrap();
        registry.rebuild(&rows, "marketing");
        assert_eq!(created.load(Ordering::SeqCst), 2, "primary and secondary");
        assert_eq!(destroyed.load(Ordering::SeqCst), 0);

        registry.rebuild(&rows, "marketing");
        assert_eq!(created.load(Ordering::SeqCst), 4);
        assert_eq!(destroyed.load(Ordering::SeqCst), 2, "old instances discarded first");
    }

    #[test]
    fn test_two_column_dataset_has_no_secondary() {
        let created = Arc::new(AtomicUsize::new(0));
        let destroyed = Arc::new(AtomicUsize::new(0));
        let renderer = CountingRenderer { created, destroyed };
        let mut registry = ChartRegistry::new(renderer);

        let rows = tokenize("Nome,Valor\nA,1\nB,2").unwrap();
        registry.rebuild(&rows, "qualquer");
        assert_eq!(registry.rendered_slots(), vec![Slot::Primary]);
        assert!(registry.get(Slot::Secondary).is_none());
    }

    #[test]
    fn test_clear_empties_registry() {
        let created = Arc::new(AtomicUsize::new(0));
        let destroyed = Arc::new(AtomicUsize::new(0));
        let renderer =
            CountingRenderer { created, destroyed: destroyed.clone() };
        let mut registry = ChartRegistry::new(renderer);

        let rows = tokenize("Campanha,Cliques,Custo\nA,1,2\nB,3,4").unwrap();
        registry.rebuild(&rows, "marketing");
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(destroyed.load(Ordering::SeqCst), 2);
    }
}
