// =============================================================================
// Report Module
// =============================================================================
//
// - Artifact / download payload types
// - Export controller (generation cache + format conversion)
// - Built-in Markdown templates

pub mod artifact;
pub mod controller;
pub mod template;

pub use artifact::{ArtifactKey, BatchProgress, ExportOutcome, ExportedReport, ReportArtifact};
pub use controller::{FormatConverter, ReportExportController};
pub use template::{render_market_report, render_stock_report, ReportContext};
