// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators shown on the stock
// and market pages.  Building blocks return `Option<T>` so callers are forced
// to handle empty input; `compute_indicators` turns that into a typed error.
//
// MACD and KDJ are the dashboard's simplified variants (see their modules),
// kept verbatim so recomputed values match previously exported reports.

pub mod kdj;
pub mod macd;
pub mod moving_average;
pub mod rsi;
pub mod snapshot;

pub use rsi::{rsi_zone, RsiZone};
pub use snapshot::{compute_indicators, IndicatorSnapshot};

/// Decimal places for price-scale outputs (MA, RSI, K, D, J).
pub const PRICE_DECIMALS: i32 = 2;
/// Decimal places for the MACD family.
pub const MACD_DECIMALS: i32 = 4;

/// Round to `decimals` places, ties to even, so stored fixtures and recomputed
/// values agree on half-way cases.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_precision() {
        assert_eq!(round_to(1.23456, PRICE_DECIMALS), 1.23);
        assert_eq!(round_to(-0.123456, MACD_DECIMALS), -0.1235);
        assert_eq!(round_to(42.0, PRICE_DECIMALS), 42.0);
    }

    #[test]
    fn half_way_rounds_to_even() {
        assert_eq!(round_to(10.125, PRICE_DECIMALS), 10.12);
        assert_eq!(round_to(10.375, PRICE_DECIMALS), 10.38);
        assert_eq!(round_to(-2.5, 0), -2.0);
        assert_eq!(round_to(0.00125, MACD_DECIMALS), 0.0012);
    }
}
