// =============================================================================
// Risk Metrics — the "risk analysis" panel of the stock page
// =============================================================================
//
// All metrics derive from simple daily close-to-close returns:
//   1. Volatility   — sample standard deviation, annualised by sqrt(252).
//   2. Max Drawdown — worst close-to-running-peak decline (<= 0).
//   3. Sharpe Ratio — annualised mean / volatility, risk-free rate 0.
//   4. VaR 95%      — historical 5th percentile of daily returns (<= 0).
//
// The risk level is bucketed from volatility alone.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::IndicatorError;
use crate::indicators::round_to;
use crate::types::PriceBar;

/// Trading sessions per year used for annualisation.
pub const TRADING_DAYS: f64 = 252.0;

/// Annualised volatility below which a series counts as low risk.
const LOW_RISK_VOLATILITY: f64 = 0.20;
/// Annualised volatility at or above which a series counts as high risk.
const HIGH_RISK_VOLATILITY: f64 = 0.35;

const METRIC_DECIMALS: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_volatility(volatility: f64) -> Self {
        if volatility < LOW_RISK_VOLATILITY {
            Self::Low
        } else if volatility < HIGH_RISK_VOLATILITY {
            Self::Medium
        } else {
            Self::High
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Snapshot of the risk panel for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub risk_level: RiskLevel,
    pub volatility: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub var_95: f64,
}

/// Compute the risk panel from an oldest-first bar series.
///
/// Needs at least two bars (one return).
pub fn compute_risk_metrics(bars: &[PriceBar]) -> Result<RiskMetrics, IndicatorError> {
    if bars.len() < 2 {
        return Err(IndicatorError::InsufficientData {
            required: 2,
            available: bars.len(),
        });
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect();

    let mean = if returns.is_empty() {
        0.0
    } else {
        returns.iter().sum::<f64>() / returns.len() as f64
    };
    let daily_std = sample_std(&returns, mean);
    let volatility = daily_std * TRADING_DAYS.sqrt();

    let sharpe_ratio = if daily_std > 0.0 {
        mean / daily_std * TRADING_DAYS.sqrt()
    } else {
        0.0
    };

    let metrics = RiskMetrics {
        risk_level: RiskLevel::from_volatility(volatility),
        volatility: round_to(volatility, METRIC_DECIMALS),
        max_drawdown: round_to(max_drawdown(&closes), METRIC_DECIMALS),
        sharpe_ratio: round_to(sharpe_ratio, METRIC_DECIMALS),
        var_95: round_to(percentile(&returns, 0.05).min(0.0), METRIC_DECIMALS),
    };

    Ok(metrics)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Sample standard deviation (n - 1 denominator); 0 with fewer than 2 values.
fn sample_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Largest peak-to-trough decline as a non-positive fraction.
fn max_drawdown(closes: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &c in closes {
        peak = peak.max(c);
        if peak > 0.0 {
            worst = worst.min(c / peak - 1.0);
        }
    }
    worst
}

/// Linear-interpolated percentile, `q` in [0, 1].  0 for an empty slice.
fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
