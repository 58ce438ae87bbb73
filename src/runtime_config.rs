// =============================================================================
// Runtime Configuration — typed dashboard settings
// =============================================================================
//
// The dashboard's settings file is organised in named sections (LLM_OPENAI,
// LLM_CACHE, ANALYSIS, USER_PROFILE, EXPORT).  Each section is an explicit
// struct here so a typo in a key is a compile error rather than a silent miss.
//
// All fields carry `#[serde(default)]` so older files missing new keys still
// load.  The core only reads this file; the settings page owns writing it.
// =============================================================================

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{ExportFormat, ReportKind};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_temperature() -> f64 {
    0.7
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_symbols() -> Vec<String> {
    vec!["000001".to_string(), "000002".to_string(), "600519".to_string()]
}

fn default_history_sessions() -> usize {
    120
}

// =============================================================================
// Sections
// =============================================================================

/// `LLM_OPENAI` — connection settings for the report-writing model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct LlmOpenAiSection {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub default_model: String,

    /// Model used for the long-form "inference" reports.
    #[serde(default = "default_model")]
    pub inference_model: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
}

impl Default for LlmOpenAiSection {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            default_model: default_model(),
            inference_model: default_model(),
            timeout: default_timeout_secs(),
            max_retries: default_max_retries(),
            default_temperature: default_temperature(),
        }
    }
}

/// `LLM_CACHE` — whether generated reports may be served from cache, and for
/// how long (`CACHE_TTL`, seconds) a cached report stays fresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct LlmCacheSection {
    #[serde(default = "default_true")]
    pub enable_cache: bool,

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl: u64,
}

impl Default for LlmCacheSection {
    fn default() -> Self {
        Self {
            enable_cache: true,
            cache_ttl: default_cache_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskPreference {
    Conservative,
    Neutral,
    Aggressive,
}

impl Default for RiskPreference {
    fn default() -> Self {
        Self::Neutral
    }
}

/// `ANALYSIS` — investor preferences fed into report prompts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AnalysisSection {
    #[serde(default)]
    pub risk_preference: RiskPreference,

    #[serde(default)]
    pub custom_principles: String,
}

/// `USER_PROFILE` — free-form self description and known bad habits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct UserProfileSection {
    #[serde(default)]
    pub raw: String,

    #[serde(default)]
    pub mistakes: Vec<String>,
}

/// `EXPORT` — what the batch exporter produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ExportSection {
    #[serde(default)]
    pub default_format: ExportFormat,

    /// Filename prefix overrides per report kind.
    #[serde(default)]
    pub filename_prefixes: HashMap<ReportKind, String>,

    /// Entities exported by a batch run.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Sessions of price history used per entity.
    #[serde(default = "default_history_sessions")]
    pub history_sessions: usize,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            default_format: ExportFormat::Markdown,
            filename_prefixes: HashMap::new(),
            symbols: default_symbols(),
            history_sessions: default_history_sessions(),
        }
    }
}

// =============================================================================
// DashboardConfig
// =============================================================================

/// Top-level settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(rename = "LLM_OPENAI", default)]
    pub llm_openai: LlmOpenAiSection,

    #[serde(rename = "LLM_CACHE", default)]
    pub llm_cache: LlmCacheSection,

    #[serde(rename = "ANALYSIS", default)]
    pub analysis: AnalysisSection,

    #[serde(rename = "USER_PROFILE", default)]
    pub user_profile: UserProfileSection,

    #[serde(rename = "EXPORT", default)]
    pub export: ExportSection,
}

impl DashboardConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dashboard config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse dashboard config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = ?config.export.symbols,
            cache_enabled = config.llm_cache.enable_cache,
            "dashboard config loaded"
        );

        Ok(config)
    }

    /// Apply a comma-separated symbol override (e.g. from the environment).
    /// Blank entries are dropped; an override with no symbols is ignored.
    pub fn override_symbols(&mut self, raw: &str) {
        let symbols: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !symbols.is_empty() {
            self.export.symbols = symbols;
        }
    }
}
