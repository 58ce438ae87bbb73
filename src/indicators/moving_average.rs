// =============================================================================
// Simple Moving Average (SMA) — trailing window with short-history fallback
// =============================================================================
//
// MA_n = mean of the last `n` closes.
//
// When the series holds fewer than `n` values the mean of everything that is
// available is used instead.  A 3-day-old listing therefore still reports an
// MA60; it simply equals its MA3.  This is the short-window fallback policy
// shared by every mean-based indicator in this module (MA, RSI averages, and
// the simplified MACD legs).
// =============================================================================

/// Mean of the trailing `window` values of `values`, or of all values when
/// fewer than `window` are available.
///
/// Returns `None` only for an empty slice or a zero window.
pub fn trailing_mean(values: &[f64], window: usize) -> Option<f64> {
    if values.is_empty() || window == 0 {
        return None;
    }

    let start = values.len().saturating_sub(window);
    let tail = &values[start..];
    let mean = tail.iter().sum::<f64>() / tail.len() as f64;

    if mean.is_finite() {
        Some(mean)
    } else {
        None
    }
}
