// =============================================================================
// Markdown report templates
// =============================================================================
//
// Deterministic report bodies built from an indicator snapshot and the risk
// panel.  These are the default generators for the export controller when no
// AI backend is wired in.
// =============================================================================

use std::fmt::Write;

use chrono::NaiveDate;

use crate::indicators::{rsi_zone, IndicatorSnapshot};
use crate::risk::{RiskLevel, RiskMetrics};

/// Everything a report body needs to know about one entity.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub entity_id: &'a str,
    pub display_name: &'a str,
    pub as_of: NaiveDate,
    pub last_close: f64,
    pub indicators: &'a IndicatorSnapshot,
    pub risk: &'a RiskMetrics,
}

pub fn render_stock_report(ctx: &ReportContext<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {} ({}) Analysis Report", ctx.display_name, ctx.entity_id);
    let _ = writeln!(out);
    let _ = writeln!(out, "## Overview");
    let _ = writeln!(out, "- As of: {}", ctx.as_of);
    let _ = writeln!(out, "- Last close: {:.2}", ctx.last_close);
    let _ = writeln!(out);
    write_technical_section(&mut out, ctx);
    write_risk_section(&mut out, ctx.risk);
    let _ = writeln!(out, "## Summary");
    let _ = writeln!(out, "{}", trend_summary(ctx.indicators));
    out
}

pub fn render_market_report(ctx: &ReportContext<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Market Analysis Report: {}", ctx.display_name);
    let _ = writeln!(out);
    let _ = writeln!(out, "## Market Overview");
    let _ = writeln!(out, "- As of: {}", ctx.as_of);
    let _ = writeln!(out, "- {}: {:.2}", ctx.display_name, ctx.last_close);
    let _ = writeln!(out);
    write_technical_section(&mut out, ctx);
    write_risk_section(&mut out, ctx.risk);
    let _ = writeln!(out, "## Outlook");
    let _ = writeln!(out, "{}", trend_summary(ctx.indicators));
    out
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn write_technical_section(out: &mut String, ctx: &ReportContext<'_>) {
    let ind = ctx.indicators;
    let _ = writeln!(out, "## Technical Indicators");
    let _ = writeln!(out, "| Indicator | Value |");
    let _ = writeln!(out, "|-----------|-------|");
    for (name, value) in ind.entries() {
        let _ = match name {
            "MACD" | "Signal" | "Histogram" => writeln!(out, "| {name} | {value:.4} |"),
            _ => writeln!(out, "| {name} | {value:.2} |"),
        };
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "RSI zone: **{}**", rsi_zone(ind.rsi));
    let _ = writeln!(out);
}

fn write_risk_section(out: &mut String, risk: &RiskMetrics) {
    let _ = writeln!(out, "## Risk Analysis");
    let _ = writeln!(out, "- Risk level: {}", risk.risk_level);
    let _ = writeln!(out, "- Annualised volatility: {:.2}%", risk.volatility * 100.0);
    let _ = writeln!(out, "- Max drawdown: {:.2}%", risk.max_drawdown * 100.0);
    let _ = writeln!(out, "- Sharpe ratio: {:.2}", risk.sharpe_ratio);
    let _ = writeln!(out, "- VaR (95%, 1 day): {:.2}%", risk.var_95 * 100.0);
    if risk.risk_level == RiskLevel::High {
        let _ = writeln!(out, "\n> Elevated volatility: size positions conservatively.");
    }
    let _ = writeln!(out);
}

fn trend_summary(ind: &IndicatorSnapshot) -> &'static str {
    let bullish = ind.ma5 > ind.ma10 && ind.ma10 > ind.ma20;
    let bearish = ind.ma5 < ind.ma10 && ind.ma10 < ind.ma20;
    match (bullish, bearish, ind.macd > 0.0) {
        (true, _, true) => "Moving averages are in bullish alignment and MACD is positive.",
        (true, _, false) => "Moving averages are in bullish alignment; MACD has not confirmed.",
        (_, true, false) => "Moving averages are in bearish alignment and MACD is negative.",
        (_, true, true) => "Moving averages are in bearish alignment; MACD is diverging upward.",
        _ => "Moving averages are mixed; no clear trend.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(ma5: f64, ma10: f64, ma20: f64, macd: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            ma5,
            ma10,
            ma20,
            ma60: 10.0,
            rsi: 72.5,
            macd,
            signal: macd * 0.9,
            histogram: macd * 0.1,
            k: 75.3,
            d: 70.1,
            j: 85.7,
        }
    }

    fn risk(level: RiskLevel) -> RiskMetrics {
        RiskMetrics {
            risk_level: level,
            volatility: 0.25,
            max_drawdown: -0.15,
            sharpe_ratio: 1.2,
            var_95: -0.03,
        }
    }

    #[test]
    fn stock_report_contains_sections() {
        let ind = snapshot(10.5, 10.45, 10.4, 0.05);
        let r = risk(RiskLevel::Medium);
        let ctx = ReportContext {
            entity_id: "000001",
            display_name: "Ping An Bank",
            as_of: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
            last_close: 12.5,
            indicators: &ind,
            risk: &r,
        };
        let md = render_stock_report(&ctx);

        assert!(md.starts_with("# Ping An Bank (000001) Analysis Report"));
        assert!(md.contains("| MA5 | 10.50 |"));
        assert!(md.contains("| MACD | 0.0500 |"));
        assert!(md.contains("RSI zone: **OVERBOUGHT**"));
        assert!(md.contains("- Risk level: Medium"));
        assert!(md.contains("bullish alignment and MACD is positive"));
        assert!(!md.contains("Elevated volatility"));
    }

    #[test]
    fn market_report_warns_on_high_risk() {
        let ind = snapshot(3100.0, 3150.0, 3200.0, -12.0);
        let r = risk(RiskLevel::High);
        let ctx = ReportContext {
            entity_id: "market",
            display_name: "SSE Composite",
            as_of: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
            last_close: 3088.0,
            indicators: &ind,
            risk: &r,
        };
        let md = render_market_report(&ctx);

        assert!(md.starts_with("# Market Analysis Report: SSE Composite"));
        assert!(md.contains("Elevated volatility"));
        assert!(md.contains("bearish alignment and MACD is negative"));
    }

    #[test]
    fn templates_are_deterministic() {
        let ind = snapshot(10.0, 10.0, 10.0, 0.0);
        let r = risk(RiskLevel::Low);
        let ctx = ReportContext {
            entity_id: "000002",
            display_name: "Vanke A",
            as_of: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            last_close: 10.0,
            indicators: &ind,
            risk: &r,
        };
        assert_eq!(render_stock_report(&ctx), render_stock_report(&ctx));
        assert!(render_stock_report(&ctx).contains("no clear trend"));
    }
}
