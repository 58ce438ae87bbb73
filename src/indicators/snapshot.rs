// =============================================================================
// Indicator Snapshot — the full indicator set at the latest bar
// =============================================================================

use serde::{Deserialize, Serialize};

use super::kdj::simplified_kdj;
use super::macd::simplified_macd;
use super::moving_average::trailing_mean;
use super::rsi::{trailing_rsi, RSI_PERIOD};
use super::{round_to, MACD_DECIMALS, PRICE_DECIMALS};
use crate::error::IndicatorError;
use crate::types::PriceBar;

/// Point-in-time indicator values computed from the trailing window of a
/// price series.  Serialises with the dashboard's indicator names
/// (`MA5`, `RSI`, `Histogram`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    #[serde(rename = "MA5")]
    pub ma5: f64,
    #[serde(rename = "MA10")]
    pub ma10: f64,
    #[serde(rename = "MA20")]
    pub ma20: f64,
    #[serde(rename = "MA60")]
    pub ma60: f64,
    #[serde(rename = "RSI")]
    pub rsi: f64,
    #[serde(rename = "MACD")]
    pub macd: f64,
    #[serde(rename = "Signal")]
    pub signal: f64,
    #[serde(rename = "Histogram")]
    pub histogram: f64,
    #[serde(rename = "K")]
    pub k: f64,
    #[serde(rename = "D")]
    pub d: f64,
    #[serde(rename = "J")]
    pub j: f64,
}

impl IndicatorSnapshot {
    /// Indicator names in display order.
    pub const NAMES: [&'static str; 11] = [
        "MA5", "MA10", "MA20", "MA60", "RSI", "MACD", "Signal", "Histogram", "K", "D", "J",
    ];

    /// Look up a value by its dashboard name.
    pub fn get(&self, name: &str) -> Option<f64> {
        let value = match name {
            "MA5" => self.ma5,
            "MA10" => self.ma10,
            "MA20" => self.ma20,
            "MA60" => self.ma60,
            "RSI" => self.rsi,
            "MACD" => self.macd,
            "Signal" => self.signal,
            "Histogram" => self.histogram,
            "K" => self.k,
            "D" => self.d,
            "J" => self.j,
            _ => return None,
        };
        Some(value)
    }

    /// `(name, value)` pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        Self::NAMES
            .iter()
            .filter_map(|name| self.get(name).map(|v| (*name, v)))
            .collect()
    }
}

/// Compute every indicator for the latest bar of `bars`.
///
/// Bars must be ordered oldest-first.  Any history length of at least one bar
/// is accepted; windows longer than the history fall back to the full series.
/// A NaN or infinite high, low or close is rejected with
/// [`IndicatorError::NonFinitePrice`] naming the first offending bar.
pub fn compute_indicators(bars: &[PriceBar]) -> Result<IndicatorSnapshot, IndicatorError> {
    let insufficient = || IndicatorError::InsufficientData {
        required: 1,
        available: bars.len(),
    };

    if bars.is_empty() {
        return Err(insufficient());
    }

    if let Some(index) = bars
        .iter()
        .position(|b| !(b.close.is_finite() && b.high.is_finite() && b.low.is_finite()))
    {
        return Err(IndicatorError::NonFinitePrice { index });
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let ma = |n: usize| trailing_mean(&closes, n).ok_or_else(insufficient);
    let ma5 = ma(5)?;
    let ma10 = ma(10)?;
    let ma20 = ma(20)?;
    let ma60 = ma(60)?;

    let rsi = trailing_rsi(&closes, RSI_PERIOD).ok_or_else(insufficient)?;
    let macd = simplified_macd(&closes).ok_or_else(insufficient)?;
    let kdj = simplified_kdj(bars).ok_or_else(insufficient)?;

    Ok(IndicatorSnapshot {
        ma5: round_to(ma5, PRICE_DECIMALS),
        ma10: round_to(ma10, PRICE_DECIMALS),
        ma20: round_to(ma20, PRICE_DECIMALS),
        ma60: round_to(ma60, PRICE_DECIMALS),
        rsi: round_to(rsi, PRICE_DECIMALS),
        macd: round_to(macd.macd, MACD_DECIMALS),
        signal: round_to(macd.signal, MACD_DECIMALS),
        histogram: round_to(macd.histogram, MACD_DECIMALS),
        k: round_to(kdj.k, PRICE_DECIMALS),
        d: round_to(kdj.d, PRICE_DECIMALS),
        j: round_to(kdj.j, PRICE_DECIMALS),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                timestamp: start + Duration::days(i as i64),
                open: close,
                high: close + 0.05,
                low: close - 0.05,
                close,
                volume: 1_000_000,
            })
            .collect()
    }

    #[test]
    fn empty_series_is_insufficient() {
        let err = compute_indicators(&[]).unwrap_err();
        assert_eq!(
            err,
            IndicatorError::InsufficientData {
                required: 1,
                available: 0
            }
        );
    }

    #[test]
    fn linear_uptrend_orders_moving_averages() {
        // 10.0, 10.1, ..., 11.9
        let closes: Vec<f64> = (0..20).map(|i| 10.0 + i as f64 * 0.1).collect();
        let snap = compute_indicators(&bars_from_closes(&closes)).unwrap();

        assert!(snap.ma5 > snap.ma10, "{} <= {}", snap.ma5, snap.ma10);
        assert!(snap.ma10 > snap.ma20, "{} <= {}", snap.ma10, snap.ma20);
        assert!(snap.rsi > 50.0);
        assert_eq!(snap.ma5, 11.7);
        assert_eq!(snap.ma10, 11.45);
        assert_eq!(snap.ma20, 10.95);
        // Under 60 bars MA60 falls back to the full series.
        assert_eq!(snap.ma60, snap.ma20);
        assert_eq!(snap.rsi, 100.0);
    }

    #[test]
    fn single_bar_degrades_gracefully() {
        let snap = compute_indicators(&bars_from_closes(&[12.34])).unwrap();
        assert_eq!(snap.ma5, 12.34);
        assert_eq!(snap.ma60, 12.34);
        assert_eq!(snap.rsi, 100.0);
        assert_eq!(snap.macd, 0.0);
        assert_eq!(snap.histogram, 0.0);
    }

    #[test]
    fn non_finite_close_is_reported_by_index() {
        let mut bars = bars_from_closes(&[10.0, 10.2, 10.4]);
        bars[1].close = f64::NAN;
        assert_eq!(
            compute_indicators(&bars).unwrap_err(),
            IndicatorError::NonFinitePrice { index: 1 }
        );

        let mut bars = bars_from_closes(&[10.0, 10.2]);
        bars[0].high = f64::INFINITY;
        assert_eq!(
            compute_indicators(&bars).unwrap_err(),
            IndicatorError::NonFinitePrice { index: 0 }
        );
    }

    #[test]
    fn half_way_averages_round_to_even() {
        // mean(10.0, 10.25) = 10.125 exactly
        let snap = compute_indicators(&bars_from_closes(&[10.0, 10.25])).unwrap();
        assert_eq!(snap.ma5, 10.12);
        assert_eq!(snap.ma60, 10.12);
    }

    #[test]
    fn flat_series_gives_neutral_kdj() {
        let closes = vec![10.0; 15];
        let bars: Vec<PriceBar> = bars_from_closes(&closes)
            .into_iter()
            .map(|mut b| {
                b.high = 10.0;
                b.low = 10.0;
                b
            })
            .collect();
        let snap = compute_indicators(&bars).unwrap();
        assert_eq!(snap.k, 50.0);
        assert_eq!(snap.d, 50.0);
        assert_eq!(snap.j, 50.0);
    }

    #[test]
    fn values_are_rounded() {
        let closes: Vec<f64> = (0..40).map(|i| 10.0 + (i as f64 * 0.37).sin()).collect();
        let snap = compute_indicators(&bars_from_closes(&closes)).unwrap();

        for (name, value) in snap.entries() {
            let decimals = match name {
                "MACD" | "Signal" | "Histogram" => 4,
                _ => 2,
            };
            let scale = 10f64.powi(decimals);
            assert!(
                ((value * scale).round() - value * scale).abs() < 1e-6,
                "{name} = {value} not rounded to {decimals} decimals"
            );
        }
    }

    #[test]
    fn rsi_and_moving_averages_stay_in_bounds() {
        let closes: Vec<f64> = (0..80)
            .map(|i| 20.0 + ((i * 7919) % 113) as f64 / 10.0)
            .map(|c: f64| (c * 100.0).round() / 100.0)
            .collect();
        let snap = compute_indicators(&bars_from_closes(&closes)).unwrap();

        assert!((0.0..=100.0).contains(&snap.rsi));
        for (window, value) in [(5, snap.ma5), (10, snap.ma10), (20, snap.ma20), (60, snap.ma60)] {
            let tail = &closes[closes.len() - window..];
            let lo = tail.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = tail.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            assert!(value >= lo && value <= hi, "MA{window} {value} outside [{lo}, {hi}]");
        }
    }

    #[test]
    fn lookup_by_name() {
        let closes: Vec<f64> = (0..20).map(|i| 10.0 + i as f64 * 0.1).collect();
        let snap = compute_indicators(&bars_from_closes(&closes)).unwrap();
        assert_eq!(snap.get("MA5"), Some(snap.ma5));
        assert_eq!(snap.get("J"), Some(snap.j));
        assert_eq!(snap.get("BOLL"), None);
        assert_eq!(snap.entries().len(), 11);
    }

    #[test]
    fn serialises_with_dashboard_names() {
        let snap = compute_indicators(&bars_from_closes(&[10.0, 10.5])).unwrap();
        let json = serde_json::to_value(snap).unwrap();
        for name in IndicatorSnapshot::NAMES {
            assert!(json.get(name).is_some(), "missing {name}");
        }
    }
}
