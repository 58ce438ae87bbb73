// =============================================================================
// KDJ Stochastic — fixed-smoothing variant
// =============================================================================
//
//   RSV = (close_last - lowest_low_9) / (highest_high_9 - lowest_low_9) * 100
//   K   = RSV / 3 + 50 * 2 / 3
//   D   = K   / 3 + 50 * 2 / 3
//   J   = 3K - 2D
//
// The standard KDJ feeds the previous K/D back in; this one always smooths
// against a neutral 50.  When the 9-bar range is flat RSV is pinned to 50,
// which yields K = D = 50 and therefore J = 3*50 - 2*50 = 50.
// =============================================================================

use crate::types::PriceBar;

pub const KDJ_WINDOW: usize = 9;
const NEUTRAL: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KdjResult {
    pub rsv: f64,
    pub k: f64,
    pub d: f64,
    pub j: f64,
}

/// Compute the simplified KDJ over the trailing [`KDJ_WINDOW`] bars (all bars
/// when fewer).  Returns `None` for an empty slice.
pub fn simplified_kdj(bars: &[PriceBar]) -> Option<KdjResult> {
    let last = bars.last()?;
    let window = &bars[bars.len().saturating_sub(KDJ_WINDOW)..];

    let high = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let low = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

    let rsv = if high == low {
        NEUTRAL
    } else {
        (last.close - low) / (high - low) * 100.0
    };

    let k = rsv / 3.0 + NEUTRAL * 2.0 / 3.0;
    let d = k / 3.0 + NEUTRAL * 2.0 / 3.0;
    let j = 3.0 * k - 2.0 * d;

    Some(KdjResult { rsv, k, d, j })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(high: f64, low: f64, close: f64) -> PriceBar {
        PriceBar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 1_000_000,
        }
    }

    #[test]
    fn kdj_empty_input() {
        assert!(simplified_kdj(&[]).is_none());
    }

    #[test]
    fn flat_range_pins_to_neutral() {
        let bars: Vec<PriceBar> = (0..12).map(|_| bar(10.0, 10.0, 10.0)).collect();
        let r = simplified_kdj(&bars).unwrap();
        assert_eq!(r.rsv, 50.0);
        assert!((r.k - 50.0).abs() < 1e-12);
        assert!((r.d - 50.0).abs() < 1e-12);
        assert!((r.j - 50.0).abs() < 1e-12);
    }

    #[test]
    fn close_at_range_top() {
        let mut bars: Vec<PriceBar> = (0..8).map(|_| bar(12.0, 8.0, 10.0)).collect();
        bars.push(bar(12.0, 8.0, 12.0));
        let r = simplified_kdj(&bars).unwrap();
        assert!((r.rsv - 100.0).abs() < 1e-12);
        // K = 100/3 + 100/3, D = K/3 + 100/3
        let k = 200.0 / 3.0;
        let d = k / 3.0 + 100.0 / 3.0;
        assert!((r.k - k).abs() < 1e-10);
        assert!((r.d - d).abs() < 1e-10);
        assert!((r.j - (3.0 * k - 2.0 * d)).abs() < 1e-10);
    }

    #[test]
    fn only_last_nine_bars_count() {
        // An extreme low ten bars back must not widen the range.
        let mut bars = vec![bar(100.0, 1.0, 50.0)];
        bars.extend((0..9).map(|_| bar(20.0, 10.0, 15.0)));
        let r = simplified_kdj(&bars).unwrap();
        assert!((r.rsv - 50.0).abs() < 1e-12);
    }
}
