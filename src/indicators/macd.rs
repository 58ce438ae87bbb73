// =============================================================================
// MACD — simplified mean-based variant
// =============================================================================
//
//   fast      = mean(close[-12:])
//   slow      = mean(close[-26:])
//   macd      = fast - slow
//   signal    = macd * 0.9
//   histogram = macd - signal
//
// Neither leg is a true exponential moving average and the signal line is a
// fixed fraction of MACD.  Stored reports and fixtures depend on these exact
// numbers; do not swap in a textbook EMA here.
// =============================================================================

use super::moving_average::trailing_mean;

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const SIGNAL_RATIO: f64 = 0.9;

/// Latest MACD triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdResult {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Compute the simplified MACD from the trailing closes.
///
/// Returns `None` for an empty slice.
pub fn simplified_macd(closes: &[f64]) -> Option<MacdResult> {
    let fast = trailing_mean(closes, MACD_FAST)?;
    let slow = trailing_mean(closes, MACD_SLOW)?;

    let macd = fast - slow;
    let signal = macd * SIGNAL_RATIO;
    let histogram = macd - signal;

    Some(MacdResult {
        macd,
        signal,
        histogram,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_empty_input() {
        assert!(simplified_macd(&[]).is_none());
    }

    #[test]
    fn short_series_collapses_to_zero() {
        // Fewer than 12 closes: both legs average the whole series.
        let closes = [10.0, 11.0, 12.0];
        let r = simplified_macd(&closes).unwrap();
        assert_eq!(r.macd, 0.0);
        assert_eq!(r.signal, 0.0);
        assert_eq!(r.histogram, 0.0);
    }

    #[test]
    fn ascending_series_has_positive_macd() {
        let closes: Vec<f64> = (1..=40).map(|x| x as f64).collect();
        let r = simplified_macd(&closes).unwrap();
        // fast = mean(29..=40) = 34.5, slow = mean(15..=40) = 27.5
        assert!((r.macd - 7.0).abs() < 1e-10);
        assert!((r.signal - 6.3).abs() < 1e-10);
        assert!((r.histogram - 0.7).abs() < 1e-10);
    }

    #[test]
    fn signal_is_fixed_fraction() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64 * 1.5).collect();
        let r = simplified_macd(&closes).unwrap();
        assert!(r.macd < 0.0);
        assert!((r.signal - r.macd * SIGNAL_RATIO).abs() < 1e-12);
        assert!((r.histogram - (r.macd - r.signal)).abs() < 1e-12);
    }
}
