// =============================================================================
// Shared types used across the market insight core
// =============================================================================

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily OHLCV session as delivered by the upstream market-data
/// fetcher.  Series are always ordered oldest-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Which kind of entity a report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Stock,
    Market,
    Portfolio,
}

impl ReportKind {
    /// Filename prefix used when no override has been configured.
    pub fn default_filename_prefix(&self) -> &'static str {
        match self {
            Self::Stock => "stock_report",
            Self::Market => "market_report",
            Self::Portfolio => "portfolio_report",
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stock => write!(f, "stock"),
            Self::Market => write!(f, "market"),
            Self::Portfolio => write!(f, "portfolio"),
        }
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stock" => Ok(Self::Stock),
            "market" => Ok(Self::Market),
            "portfolio" => Ok(Self::Portfolio),
            other => Err(format!("unknown report kind: {other}")),
        }
    }
}

/// Output format a cached Markdown report can be exported to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Markdown,
    Pdf,
    Docx,
    Html,
}

impl ExportFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Markdown => "text/markdown",
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Html => "text/html",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Html => "html",
        }
    }
}

impl Default for ExportFormat {
    fn default() -> Self {
        Self::Markdown
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Markdown => write!(f, "markdown"),
            Self::Pdf => write!(f, "pdf"),
            Self::Docx => write!(f, "docx"),
            Self::Html => write!(f, "html"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "html" | "htm" => Ok(Self::Html),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}
