// =============================================================================
// Relative Strength Index (RSI) — trailing-mean variant
// =============================================================================
//
// Step 1 — Split consecutive close deltas into gains and losses:
//            gain_i = max(delta, 0),  loss_i = max(-delta, 0)
// Step 2 — Average the last `period` gains and the last `period` losses
//          (all of them when fewer are available).
// Step 3 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// This is a plain trailing mean, not Wilder's smoothing.  Dashboard values
// and stored fixtures were produced with it, so it must stay this way.
//
// Thresholds:  RSI >= 70 => OVERBOUGHT,  RSI <= 30 => OVERSOLD.
// =============================================================================

use serde::Serialize;

use super::moving_average::trailing_mean;

/// Default look-back used by the dashboard.
pub const RSI_PERIOD: usize = 14;

/// Compute the latest RSI value over the trailing `period` deltas.
///
/// # Edge cases
/// - Fewer than two closes => no deltas; both averages are zero and the
///   zero-loss rule applies (100.0).
/// - Average loss exactly zero => 100.0, regardless of average gain.
/// - Returns `None` for an empty slice or a non-finite result.
pub fn trailing_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if closes.is_empty() || period == 0 {
        return None;
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let delta = w[1] - w[0];
            (delta.max(0.0), (-delta).max(0.0))
        })
        .unzip();

    let avg_gain = trailing_mean(&gains, period).unwrap_or(0.0);
    let avg_loss = trailing_mean(&losses, period).unwrap_or(0.0);

    rsi_from_averages(avg_gain, avg_loss)
}

/// Human-readable RSI zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

impl std::fmt::Display for RsiZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overbought => write!(f, "OVERBOUGHT"),
            Self::Oversold => write!(f, "OVERSOLD"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Classify an RSI value into its zone.
pub fn rsi_zone(value: f64) -> RsiZone {
    if value >= 70.0 {
        RsiZone::Overbought
    } else if value <= 30.0 {
        RsiZone::Oversold
    } else {
        RsiZone::Neutral
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    if rsi.is_finite() {
        Some(rsi)
    } else {
        None
    }
}
