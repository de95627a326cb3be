//! # Relatório - CSV report pipeline with chart aggregation and export
//!
//! Relatório turns a named CSV dataset into an interactive tabular report:
//! a searchable, sortable table plus two aggregated chart slots, with a
//! paginated document export of the whole view.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Registry  │────▶│   Ingest    │────▶│ Table View  │────▶│   Export    │
//! │ (named CSV) │     │ (auto-enc)  │     │ + 2 Charts  │     │ (A4 pages)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use relatorio::{Config, HeadlessChartRenderer, ReportPage};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut page = ReportPage::new(Config::from_env(), HeadlessChartRenderer);
//!     page.load(Some("estoque")).await.unwrap();
//!     println!("{} linhas", page.render().unwrap().rows.len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`registry`] - The fixed dataset dictionary
//! - [`ingest`] - CSV fetch, decode and tokenize
//! - [`table`] - Search, sort and display formatting
//! - [`chart`] - Column selection, aggregation and chart specs
//! - [`export`] - Capture, pagination and document saving
//! - [`pipeline`] - The report page tying the stages together
//! - [`headless`] - Browserless capability adapters

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Data stages
pub mod ingest;
pub mod registry;

// Presentation
pub mod chart;
pub mod table;

// Export
pub mod export;

// Orchestration
pub mod pipeline;

// Headless capabilities
pub mod headless;

// Observability
pub mod logging;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    ExportError,
    IngestError,
    RegistryError,
    ReportError,
    ReportResult,
};

// =============================================================================
// Re-exports - Core types
// =============================================================================

pub use config::Config;
pub use models::{Row, RowSet};
pub use registry::{DatasetDescriptor, DatasetSource};

// =============================================================================
// Re-exports - Table view
// =============================================================================

pub use table::{
    SortDirection,
    SortState,
    TableView,
    TableViewModel,
    ViewState,
};

// =============================================================================
// Re-exports - Charts
// =============================================================================

pub use chart::{
    build_series,
    chart_spec,
    ChartInstance,
    ChartKind,
    ChartRegistry,
    ChartRenderer,
    ChartSeries,
    ChartSpec,
    Slot,
};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{
    export_filename,
    CapturedImage,
    ComposedDocument,
    DocumentSink,
    ExportOrchestrator,
    ExportReceipt,
    Rasterizer,
    ReadinessGate,
};

// =============================================================================
// Re-exports - Pipeline and headless adapters
// =============================================================================

pub use headless::{HeadlessChart, HeadlessChartRenderer, HeadlessRasterizer, TextReportSink};
pub use pipeline::ReportPage;
