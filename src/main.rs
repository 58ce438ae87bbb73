// =============================================================================
// Market Insight — Main Entry Point
// =============================================================================
//
// Batch-exports analysis reports for the configured symbols plus one market
// report.  Price history comes from the synthetic series generator; wiring a
// real market-data fetcher or AI report writer means swapping the generator
// closure handed to the export controller.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod error;
mod indicators;
mod report;
mod risk;
mod runtime_config;
mod sample_data;
mod types;

use std::time::Duration;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::indicators::compute_indicators;
use crate::report::{render_market_report, render_stock_report, ReportContext, ReportExportController};
use crate::risk::compute_risk_metrics;
use crate::runtime_config::DashboardConfig;
use crate::sample_data::{generate_price_bars, SampleSeriesSpec};
use crate::types::{ExportFormat, ReportKind};

const DEFAULT_CONFIG_PATH: &str = "dashboard_config.json";
const MARKET_ENTITY: &str = "market";

fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("INSIGHT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = DashboardConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        DashboardConfig::default()
    });

    if let Ok(syms) = std::env::var("INSIGHT_SYMBOLS") {
        config.override_symbols(&syms);
    }

    let format = match std::env::var("INSIGHT_FORMAT") {
        Ok(raw) => raw
            .parse::<ExportFormat>()
            .map_err(anyhow::Error::msg)
            .context("invalid INSIGHT_FORMAT")?,
        Err(_) => config.export.default_format,
    };

    info!(
        symbols = ?config.export.symbols,
        format = %format,
        cache_enabled = config.llm_cache.enable_cache,
        "Starting batch export"
    );

    // ── 2. Export controller ─────────────────────────────────────────────
    let controller = config.export.filename_prefixes.iter().fold(
        ReportExportController::new()
            .with_cache_enabled(config.llm_cache.enable_cache)
            .with_cache_ttl(Duration::from_secs(config.llm_cache.cache_ttl)),
        |ctl, (kind, prefix)| ctl.with_filename_prefix(*kind, prefix.clone()),
    );

    let as_of = Local::now().date_naive();
    let sessions = config.export.history_sessions;

    // ── 3. Stock reports ─────────────────────────────────────────────────
    let stock_generator = |entity_id: &str| -> anyhow::Result<String> {
        analyse(entity_id, as_of, sessions, ReportKind::Stock)
    };
    let outcomes = controller.export_batch_with_progress(
        config.export.symbols.as_slice(),
        ReportKind::Stock,
        format,
        &stock_generator,
        false,
        |p| {
            info!(
                entity_id = %p.outcome.entity_id,
                completed = p.completed,
                total = p.total,
                percent = (p.fraction() * 100.0).round() as u32,
                "batch progress"
            );
        },
    );

    for outcome in &outcomes {
        match (&outcome.export, &outcome.error) {
            (Some(export), _) => info!(
                entity_id = %outcome.entity_id,
                filename = %export.filename,
                mime = %export.mime_type,
                bytes = export.bytes.len(),
                "report exported"
            ),
            (None, Some(err)) => warn!(entity_id = %outcome.entity_id, error = %err, "report export failed"),
            (None, None) => {}
        }
    }

    // ── 4. Market report ─────────────────────────────────────────────────
    match controller.quick_export(
        MARKET_ENTITY,
        ReportKind::Market,
        format,
        |entity_id: &str| analyse(entity_id, as_of, sessions, ReportKind::Market),
        false,
    ) {
        Ok(export) => info!(filename = %export.filename, bytes = export.bytes.len(), "market report exported"),
        Err(e) => {
            let err = format!("{:#}", anyhow::Error::new(e));
            warn!(error = %err, "market report export failed");
        }
    }

    // ── 5. Summary ───────────────────────────────────────────────────────
    println!("{}", serde_json::to_string_pretty(&outcomes)?);

    if let Some(artifact) = controller.get_cached(MARKET_ENTITY, ReportKind::Market) {
        println!("\n{}", artifact.content);
    }

    let purged = controller.purge_expired();
    info!(cached = controller.cached_len(), purged, "Batch export complete");
    Ok(())
}

/// Build the Markdown report for one entity from its price history.
fn analyse(entity_id: &str, as_of: NaiveDate, sessions: usize, kind: ReportKind) -> anyhow::Result<String> {
    let start_price = match kind {
        ReportKind::Market => 3200.0,
        _ => 10.0,
    };
    let spec = SampleSeriesSpec::new(sessions, start_price, as_of, seed_for(entity_id));
    let bars = generate_price_bars(&spec)?;

    let indicators = compute_indicators(&bars)
        .with_context(|| format!("indicator computation failed for {entity_id}"))?;
    let risk = compute_risk_metrics(&bars)
        .with_context(|| format!("risk computation failed for {entity_id}"))?;
    let last = bars
        .last()
        .with_context(|| format!("no price history for {entity_id}"))?;

    let ctx = ReportContext {
        entity_id,
        display_name: entity_id,
        as_of: last.timestamp,
        last_close: last.close,
        indicators: &indicators,
        risk: &risk,
    };

    Ok(match kind {
        ReportKind::Market => render_market_report(&ctx),
        _ => render_stock_report(&ctx),
    })
}

/// Stable per-entity seed so reruns reproduce the same series.
fn seed_for(entity_id: &str) -> u64 {
    entity_id
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |h, b| (h ^ b as u64).wrapping_mul(0x0100_0000_01b3))
}
