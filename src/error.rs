//! Error types for the report pipeline.
//!
//! This module defines a hierarchy of error types, one per pipeline stage:
//!
//! - [`RegistryError`] - dataset lookup errors
//! - [`IngestError`] - CSV fetching and tokenization errors
//! - [`ExportError`] - document export errors
//! - [`ReportError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Empty filter results are deliberately NOT errors: an empty table is a
//! display state handled by the table view engine.

use thiserror::Error;

// =============================================================================
// Dataset Registry Errors
// =============================================================================

/// Errors when resolving a dataset identifier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No dataset identifier was supplied at all.
    #[error("No dataset selected")]
    NotSelected,

    /// An identifier was supplied but is not in the registry.
    #[error("Dataset not found: {id}")]
    NotFound { id: String },
}

// =============================================================================
// Ingestion Errors
// =============================================================================

/// Errors while loading and tokenizing CSV content.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Remote fetch failed: transport error or non-success status.
    #[error("CSV source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    /// The tokenizer reported a structural error in the CSV body.
    #[error("Malformed CSV content: {reason}")]
    MalformedContent { reason: String },
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors during document export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Export was attempted before any chart instance existed.
    #[error("No chart is ready for export")]
    ChartNotReady,

    /// Another export is still in flight for the same chart instances.
    #[error("An export is already in progress")]
    ExportInProgress,

    /// Rasterization of a chart element failed.
    #[error("Chart capture failed: {reason}")]
    CaptureFailure { reason: String },

    /// Document assembly or saving failed.
    #[error("Document composition failed: {reason}")]
    ComposeFailure { reason: String },
}

// =============================================================================
// Report Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the main error type returned by [`crate::pipeline::ReportPage::load`].
/// It wraps all stage-level errors.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Dataset lookup error.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Ingestion error.
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for registry lookups.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for top-level report operations.
pub type ReportResult<T> = Result<T, ReportError>;
