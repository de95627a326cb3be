//! Export orchestrator: chart capture, document composition and saving.
//!
//! One export invocation walks `Idle → Preparing → Capturing → Composing →
//! Saved`, with `Failed` reachable from the three middle phases and a
//! `Restoring` step that always runs on the way to either terminal phase:
//! whatever happens, every chart's responsive flag and container shadow end
//! up exactly as they were before the export.

pub mod layout;
pub mod ready;

pub use layout::{Block, ComposedDocument, Page};
pub use ready::ReadinessGate;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::chart::{ChartInstance, ChartRegistry, ChartRenderer, Slot};
use crate::error::{ExportError, ExportResult};
use crate::table::TableViewModel;

/// Background color applied during rasterization.
pub const CAPTURE_BACKGROUND: &str = "#ffffff";

/// Errors surfaced by capability implementations.
pub type CapabilityError = Box<dyn std::error::Error + Send + Sync>;

/// A rasterized chart: encoded image bytes plus pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub bytes: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
}

/// External rasterization capability: chart element -> image buffer.
pub trait Rasterizer<C: ChartInstance> {
    async fn capture(&self, chart: &C, background: &str) -> Result<CapturedImage, CapabilityError>;
}

/// External document capability: renders a composed document and saves it.
pub trait DocumentSink {
    /// File extension (without dot) appended to the sanitized filename.
    fn extension(&self) -> &'static str;

    fn save(&self, document: &ComposedDocument, filename: &str) -> Result<(), CapabilityError>;
}

/// Phases of one export invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    Idle,
    Preparing,
    Capturing,
    Composing,
    Restoring,
    Saved,
    Failed,
}

impl fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Preparing => "preparing",
            Self::Capturing => "capturing",
            Self::Composing => "composing",
            Self::Restoring => "restoring",
            Self::Saved => "saved",
            Self::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub filename: String,
    pub pages: usize,
}

/// Pre-capture visual state of one chart, restored unconditionally.
struct VisualSnapshot {
    slot: Slot,
    responsive: bool,
    shadow: String,
}

/// Drives the export state machine over the capability seams.
pub struct ExportOrchestrator<Z, S> {
    rasterizer: Z,
    sink: S,
    in_flight: AtomicBool,
}

impl<Z, S: DocumentSink> ExportOrchestrator<Z, S> {
    pub fn new(rasterizer: Z, sink: S) -> Self {
        Self { rasterizer, sink, in_flight: AtomicBool::new(false) }
    }

    /// Run one export against the currently rendered charts and table view.
    ///
    /// Fails fast with `ChartNotReady` (no state touched) when no chart
    /// exists, and with `ExportInProgress` when another export still holds
    /// the charts.
    pub async fn export<R>(
        &self,
        registry: &mut ChartRegistry<R>,
        title: &str,
        view: &TableViewModel,
    ) -> ExportResult<ExportReceipt>
    where
        R: ChartRenderer,
        Z: Rasterizer<R::Chart>,
    {
        if registry.is_empty() {
            return Err(ExportError::ChartNotReady);
        }
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        debug!(phase = %ExportPhase::Preparing, "export started");
        let snapshots = prepare(registry);

        let result = self.capture_and_compose(registry, title, view).await;

        debug!(phase = %ExportPhase::Restoring, "restoring chart state");
        restore(registry, snapshots);

        match &result {
            Ok(receipt) => {
                debug!(phase = %ExportPhase::Saved, filename = %receipt.filename, pages = receipt.pages, "export finished")
            }
            Err(e) => warn!(phase = %ExportPhase::Failed, error = %e, "export failed"),
        }
        result
    }

    async fn capture_and_compose<R>(
        &self,
        registry: &ChartRegistry<R>,
        title: &str,
        view: &TableViewModel,
    ) -> ExportResult<ExportReceipt>
    where
        R: ChartRenderer,
        Z: Rasterizer<R::Chart>,
    {
        // Sequential on purpose: each chart must see the final layout of
        // the capture canvas before the next capture starts.
        debug!(phase = %ExportPhase::Capturing, "capturing charts");
        let mut captures: Vec<(Slot, CapturedImage)> = Vec::new();
        for slot in registry.rendered_slots() {
            let Some(chart) = registry.get(slot) else {
                continue;
            };
            let image = self
                .rasterizer
                .capture(chart, CAPTURE_BACKGROUND)
                .await
                .map_err(|e| ExportError::CaptureFailure { reason: e.to_string() })?;
            captures.push((slot, image));
        }

        debug!(phase = %ExportPhase::Composing, "composing document");
        let document = layout::compose(title, &captures, view);
        let filename = export_filename(title, self.sink.extension());
        self.sink
            .save(&document, &filename)
            .map_err(|e| ExportError::ComposeFailure { reason: e.to_string() })?;

        Ok(ExportReceipt { filename, pages: document.pages.len() })
    }
}

/// Snapshot each rendered chart's visual state, then force the
/// capture-stable configuration: fixed sizing, no shadow.
fn prepare<R: ChartRenderer>(registry: &mut ChartRegistry<R>) -> Vec<VisualSnapshot> {
    let mut snapshots = Vec::new();
    for slot in registry.rendered_slots() {
        if let Some(chart) = registry.get_mut(slot) {
            snapshots.push(VisualSnapshot {
                slot,
                responsive: chart.responsive(),
                shadow: chart.shadow(),
            });
            chart.set_responsive(false);
            chart.resize();
            chart.set_shadow("none");
        }
    }
    snapshots
}

/// Reapply every snapshot, success or failure.
fn restore<R: ChartRenderer>(registry: &mut ChartRegistry<R>, snapshots: Vec<VisualSnapshot>) {
    for snapshot in snapshots {
        if let Some(chart) = registry.get_mut(snapshot.slot) {
            chart.set_responsive(snapshot.responsive);
            chart.resize();
            chart.set_shadow(&snapshot.shadow);
        }
    }
}

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s").expect("valid whitespace regex"));
static NON_ALNUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("valid filename regex"));

/// Sanitize a dataset title into a filename stem: whitespace becomes `_`,
/// then everything outside `[A-Za-z0-9_]` is stripped. Idempotent.
pub fn sanitize_stem(title: &str) -> String {
    let underscored = WHITESPACE.replace_all(title, "_");
    NON_ALNUM.replace_all(&underscored, "").to_string()
}

/// Full export filename for a dataset title.
pub fn export_filename(title: &str, extension: &str) -> String {
    format!("{}.{}", sanitize_stem(title), extension)
}

/// RAII guard enforcing the single-export-in-flight invariant.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> ExportResult<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| ExportError::ExportInProgress)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_stem_is_idempotent() {
        let once = sanitize_stem("Relatório de Vendas - Dados de Teste");
        let twice = sanitize_stem(&once);
        assert_eq!(once, twice);
        assert_eq!(once, "Relatrio_de_Vendas__Dados_de_Teste");
    }

    #[test]
    fn test_export_filename_strips_accents_and_spaces() {
        // Accented characters are outside [A-Za-z0-9_] and get stripped.
        assert_eq!(export_filename("Inventário de Estoque", "pdf"), "Inventrio_de_Estoque.pdf");
        assert_eq!(
            export_filename("Base de Clientes (Top 5)", "pdf"),
            "Base_de_Clientes_Top_5.pdf"
        );
    }

    #[test]
    fn test_in_flight_guard_is_exclusive_and_releases() {
        let flag = AtomicBool::new(false);
        let guard = InFlightGuard::acquire(&flag).unwrap();
        assert!(matches!(
            InFlightGuard::acquire(&flag),
            Err(ExportError::ExportInProgress)
        ));
        drop(guard);
        assert!(InFlightGuard::acquire(&flag).is_ok());
    }
}
