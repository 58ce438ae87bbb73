// =============================================================================
// Report Export Controller — generate, cache, convert
// =============================================================================
//
// Per cache key (report kind, entity id) the controller walks:
//
//   Empty --generate--> Generating --ok--> Cached --convert(fmt)--> Converting
//     ^                     |                 ^                         |
//     +-------err-----------+                 +-----------ok/err--------+
//
// Guarantees:
//   - A failed generation never touches the cache; an older artifact for the
//     same key survives.
//   - Conversion only reads the cached Markdown, so a failed conversion can be
//     retried without regenerating.
//   - At most one generation or conversion runs per key at a time.  Different
//     keys never wait on each other: every key has its own mutex and the
//     artifact map lock is only held for the lookup / insert itself.
//
// The generator and converters are injected collaborators.  The controller
// imposes no timeout of its own.
//
// With a TTL set, an artifact older than the TTL no longer counts as a cache
// hit: the next `generate` replaces it and `purge_expired` drops it.
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::artifact::{
    export_filename, ArtifactKey, BatchProgress, ExportOutcome, ExportedReport, ReportArtifact,
};
use crate::error::ExportError;
use crate::types::{ExportFormat, ReportKind};

/// Renders Markdown into another document format.
pub trait FormatConverter: Send + Sync {
    fn convert(&self, markdown: &str) -> anyhow::Result<Vec<u8>>;
}

impl<F> FormatConverter for F
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    fn convert(&self, markdown: &str) -> anyhow::Result<Vec<u8>> {
        self(markdown)
    }
}

/// Owns the report artifact cache.  Share it behind an `Arc`.
pub struct ReportExportController {
    artifacts: RwLock<HashMap<ArtifactKey, ReportArtifact>>,
    key_locks: Mutex<HashMap<ArtifactKey, Arc<Mutex<()>>>>,
    converters: HashMap<ExportFormat, Arc<dyn FormatConverter>>,
    filename_prefixes: HashMap<ReportKind, String>,
    /// When false every `generate` call behaves as `force_refresh`.
    cache_enabled: bool,
    /// Maximum artifact age served as a cache hit; `None` never expires.
    cache_ttl: Option<Duration>,
}

impl Default for ReportExportController {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportExportController {
    pub fn new() -> Self {
        Self {
            artifacts: RwLock::new(HashMap::new()),
            key_locks: Mutex::new(HashMap::new()),
            converters: HashMap::new(),
            filename_prefixes: HashMap::new(),
            cache_enabled: true,
            cache_ttl: None,
        }
    }

    /// Register the converter used for `format`.  Markdown never goes through
    /// a converter, so registering one for it has no effect.
    pub fn with_converter(mut self, format: ExportFormat, converter: impl FormatConverter + 'static) -> Self {
        if format == ExportFormat::Markdown {
            warn!("ignoring converter registered for markdown (identity export)");
            return self;
        }
        self.converters.insert(format, Arc::new(converter));
        self
    }

    pub fn with_filename_prefix(mut self, kind: ReportKind, prefix: impl Into<String>) -> Self {
        self.filename_prefixes.insert(kind, prefix.into());
        self
    }

    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    // -------------------------------------------------------------------------
    // Generation
    // -------------------------------------------------------------------------

    /// Produce the Markdown artifact for `entity_id`.
    ///
    /// Returns the cached artifact without calling `generator` when a fresh one
    /// exists, unless `force_refresh` is set or caching is disabled.  On success
    /// the new artifact replaces any previous one for the same key.
    pub fn generate<G>(
        &self,
        entity_id: &str,
        kind: ReportKind,
        generator: G,
        force_refresh: bool,
    ) -> Result<ReportArtifact, ExportError>
    where
        G: FnOnce(&str) -> anyhow::Result<String>,
    {
        let key = ArtifactKey::new(kind, entity_id);
        let lock = self.key_lock(&key);
        let _in_flight = lock.lock();

        let bypass = force_refresh || !self.cache_enabled;
        if !bypass {
            if let Some(hit) = self.artifacts.read().get(&key) {
                if self.is_fresh(hit) {
                    debug!(key = %key, "report cache hit");
                    return Ok(hit.clone());
                }
                debug!(key = %key, "cached report expired");
            }
        }

        let content = generator(entity_id).map_err(|source| {
            warn!(key = %key, error = %source, "report generation failed");
            ExportError::GenerationFailed {
                entity_id: entity_id.to_string(),
                kind,
                source,
            }
        })?;

        let format = ExportFormat::Markdown;
        let artifact = ReportArtifact {
            entity_id: entity_id.to_string(),
            report_kind: kind,
            filename: export_filename(self.prefix_for(kind), entity_id, format),
            mime_type: format.mime_type().to_string(),
            format,
            content,
            generated_at: Utc::now(),
        };

        self.artifacts.write().insert(key.clone(), artifact.clone());
        info!(
            key = %key,
            bytes = artifact.content.len(),
            force_refresh = bypass,
            "report generated and cached"
        );

        Ok(artifact)
    }

    // -------------------------------------------------------------------------
    // Conversion
    // -------------------------------------------------------------------------

    /// Render the cached artifact for `entity_id` as `format`.
    ///
    /// Markdown is returned verbatim.  The cached artifact is never modified,
    /// whatever the converter does.
    pub fn convert(
        &self,
        entity_id: &str,
        kind: ReportKind,
        format: ExportFormat,
    ) -> Result<ExportedReport, ExportError> {
        let key = ArtifactKey::new(kind, entity_id);
        let lock = self.key_lock(&key);
        let _in_flight = lock.lock();

        let markdown = self
            .artifacts
            .read()
            .get(&key)
            .map(|a| a.content.clone())
            .ok_or_else(|| ExportError::NoArtifactCached {
                entity_id: entity_id.to_string(),
                kind,
            })?;

        let conversion_failed = |source: anyhow::Error| {
            warn!(key = %key, format = %format, error = %source, "report conversion failed");
            ExportError::ConversionFailed {
                entity_id: entity_id.to_string(),
                kind,
                format,
                source,
            }
        };

        let bytes = match format {
            ExportFormat::Markdown => markdown.into_bytes(),
            other => {
                let converter = self
                    .converters
                    .get(&other)
                    .ok_or_else(|| conversion_failed(anyhow::anyhow!("no converter registered for {other}")))?;
                converter.convert(&markdown).map_err(conversion_failed)?
            }
        };

        debug!(key = %key, format = %format, bytes = bytes.len(), "report converted");

        Ok(ExportedReport {
            entity_id: entity_id.to_string(),
            report_kind: kind,
            format,
            mime_type: format.mime_type().to_string(),
            filename: export_filename(self.prefix_for(kind), entity_id, format),
            bytes,
        })
    }

    // -------------------------------------------------------------------------
    // Quick / batch export
    // -------------------------------------------------------------------------

    /// Generate then convert a single entity.
    pub fn quick_export<G>(
        &self,
        entity_id: &str,
        kind: ReportKind,
        format: ExportFormat,
        generator: G,
        force_refresh: bool,
    ) -> Result<ExportedReport, ExportError>
    where
        G: FnOnce(&str) -> anyhow::Result<String>,
    {
        self.generate(entity_id, kind, generator, force_refresh)?;
        self.convert(entity_id, kind, format)
    }

    /// Export every entity, continuing past individual failures.
    ///
    /// Never fails as a whole; each entity gets an [`ExportOutcome`] in input
    /// order.
    pub fn export_batch<S, G>(
        &self,
        entity_ids: &[S],
        kind: ReportKind,
        format: ExportFormat,
        generator: &G,
        force_refresh: bool,
    ) -> Vec<ExportOutcome>
    where
        S: AsRef<str>,
        G: Fn(&str) -> anyhow::Result<String>,
    {
        self.export_batch_with_progress(entity_ids, kind, format, generator, force_refresh, |_| {})
    }

    /// [`export_batch`](Self::export_batch) that calls `on_progress` after
    /// each entity finishes, successful or not.
    pub fn export_batch_with_progress<S, G, P>(
        &self,
        entity_ids: &[S],
        kind: ReportKind,
        format: ExportFormat,
        generator: &G,
        force_refresh: bool,
        mut on_progress: P,
    ) -> Vec<ExportOutcome>
    where
        S: AsRef<str>,
        G: Fn(&str) -> anyhow::Result<String>,
        P: FnMut(BatchProgress<'_>),
    {
        let total = entity_ids.len();
        let outcomes: Vec<ExportOutcome> = entity_ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let entity_id = id.as_ref();
                let outcome = match self.quick_export(entity_id, kind, format, generator, force_refresh) {
                    Ok(export) => ExportOutcome {
                        entity_id: entity_id.to_string(),
                        success: true,
                        error: None,
                        export: Some(export),
                    },
                    Err(e) => ExportOutcome {
                        entity_id: entity_id.to_string(),
                        success: false,
                        error: Some(format!("{:#}", anyhow::Error::new(e))),
                        export: None,
                    },
                };
                on_progress(BatchProgress {
                    completed: i + 1,
                    total,
                    outcome: &outcome,
                });
                outcome
            })
            .collect();

        let succeeded = outcomes.iter().filter(|o| o.success).count();
        info!(
            kind = %kind,
            format = %format,
            total = outcomes.len(),
            succeeded,
            failed = outcomes.len() - succeeded,
            "batch export finished"
        );

        outcomes
    }

    // -------------------------------------------------------------------------
    // Cache access
    // -------------------------------------------------------------------------

    /// Pure lookup; never triggers generation.
    pub fn get_cached(&self, entity_id: &str, kind: ReportKind) -> Option<ReportArtifact> {
        self.artifacts
            .read()
            .get(&ArtifactKey::new(kind, entity_id))
            .cloned()
    }

    /// Drop the artifact for one key.  Returns whether one was cached.
    pub fn evict(&self, entity_id: &str, kind: ReportKind) -> bool {
        self.evict_if(&ArtifactKey::new(kind, entity_id), |_| true)
    }

    /// Drop every artifact older than the TTL.  Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        if self.cache_ttl.is_none() {
            return 0;
        }
        let stale: Vec<ArtifactKey> = self
            .artifacts
            .read()
            .iter()
            .filter(|(_, a)| !self.is_fresh(a))
            .map(|(k, _)| k.clone())
            .collect();

        // Re-checked under the key lock: a regeneration may have landed since.
        let mut removed = 0;
        for key in &stale {
            if self.evict_if(key, |a| !self.is_fresh(a)) {
                removed += 1;
            }
        }
        if removed > 0 {
            info!(removed, "expired reports purged");
        }
        removed
    }

    pub fn clear_cache(&self) {
        let removed = {
            let mut map = self.artifacts.write();
            let n = map.len();
            map.clear();
            n
        };
        info!(removed, "report cache cleared");
    }

    pub fn cached_len(&self) -> usize {
        self.artifacts.read().len()
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    fn is_fresh(&self, artifact: &ReportArtifact) -> bool {
        match self.cache_ttl {
            None => true,
            Some(ttl) => {
                // A timestamp in the future (clock step) counts as age zero.
                let age = (Utc::now() - artifact.generated_at)
                    .to_std()
                    .unwrap_or(Duration::ZERO);
                age < ttl
            }
        }
    }

    fn evict_if(&self, key: &ArtifactKey, pred: impl Fn(&ReportArtifact) -> bool) -> bool {
        let lock = self.key_lock(key);
        let _in_flight = lock.lock();
        let mut map = self.artifacts.write();
        let matched = map.get(key).is_some_and(|a| pred(a));
        if matched {
            map.remove(key);
        }
        matched
    }

    fn key_lock(&self, key: &ArtifactKey) -> Arc<Mutex<()>> {
        self.key_locks
            .lock()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn prefix_for(&self, kind: ReportKind) -> &str {
        self.filename_prefixes
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_filename_prefix())
    }
}

impl std::fmt::Debug for ReportExportController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportExportController")
            .field("cached", &self.cached_len())
            .field("converters", &self.converters.keys().collect::<Vec<_>>())
            .field("filename_prefixes", &self.filename_prefixes)
            .field("cache_enabled", &self.cache_enabled)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}
