use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{ExportFormat, ReportKind};

/// Cache key: one artifact per (report kind, entity).
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct ArtifactKey {
    pub kind: ReportKind,
    pub entity_id: String,
}

impl ArtifactKey {
    pub fn new(kind: ReportKind, entity_id: impl Into<String>) -> Self {
        Self {
            kind,
            entity_id: entity_id.into(),
        }
    }
}

impl std::fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.entity_id)
    }
}

/// A generated report as held in the export cache.  Content is always the
/// Markdown source; other formats are rendered from it on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportArtifact {
    pub entity_id: String,
    pub report_kind: ReportKind,
    pub content: String,
    pub format: ExportFormat,
    pub mime_type: String,
    pub filename: String,
    pub generated_at: DateTime<Utc>,
}

/// Download payload produced by a conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedReport {
    pub entity_id: String,
    pub report_kind: ReportKind,
    pub format: ExportFormat,
    pub mime_type: String,
    pub filename: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Per-entity result of a batch export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportOutcome {
    pub entity_id: String,
    pub success: bool,
    pub error: Option<String>,
    #[serde(skip)]
    pub export: Option<ExportedReport>,
}

/// Progress of a running batch export, reported after each entity.
#[derive(Debug, Clone, Copy)]
pub struct BatchProgress<'a> {
    /// Entities finished so far, including this one.
    pub completed: usize,
    pub total: usize,
    pub outcome: &'a ExportOutcome,
}

impl BatchProgress<'_> {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// `{prefix}_{entity_id}.{ext}`
pub fn export_filename(prefix: &str, entity_id: &str, format: ExportFormat) -> String {
    format!("{prefix}_{entity_id}.{}", format.extension())
}
