// =============================================================================
// Error types for indicator computation and report export
// =============================================================================

use thiserror::Error;

use crate::types::{ExportFormat, ReportKind};

/// Errors raised by the indicator and risk computations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("insufficient data: need at least {required} bars, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("non-finite price in bar {index}")]
    NonFinitePrice { index: usize },
}

/// Errors raised by [`crate::report::ReportExportController`].
///
/// Collaborator failures (generator, converter) are kept as the error source
/// so callers can walk the full chain.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("report generation failed for {kind} {entity_id}")]
    GenerationFailed {
        entity_id: String,
        kind: ReportKind,
        #[source]
        source: anyhow::Error,
    },

    #[error("no report cached for {kind} {entity_id}")]
    NoArtifactCached { entity_id: String, kind: ReportKind },

    #[error("conversion to {format} failed for {kind} {entity_id}")]
    ConversionFailed {
        entity_id: String,
        kind: ReportKind,
        format: ExportFormat,
        #[source]
        source: anyhow::Error,
    },
}
