// =============================================================================
// Synthetic Price Series — reproducible daily bars for demos and tests
// =============================================================================
//
// Geometric random walk over weekday sessions:
//   close_t = close_{t-1} * exp(r_t),   r_t ~ N(0.001, 0.02)
//   open    = close * (1 + N(0, 0.005))
//   high    = close * (1 + |N(0, 0.01)|)
//   low     = close * (1 - |N(0, 0.01)|)
//   volume  ~ U[1_000_000, 10_000_000)
//
// High / low are widened to contain open and close so every bar is a valid
// OHLC range.  A fixed seed reproduces the same series.
// =============================================================================

use anyhow::{ensure, Context, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::types::PriceBar;

/// Parameters of a synthetic series.
#[derive(Debug, Clone)]
pub struct SampleSeriesSpec {
    /// Number of trading sessions to generate.
    pub sessions: usize,
    pub start_price: f64,
    /// Last session date; earlier sessions skip weekends.
    pub end_date: NaiveDate,
    pub seed: u64,
    pub drift: f64,
    pub volatility: f64,
}

impl SampleSeriesSpec {
    pub fn new(sessions: usize, start_price: f64, end_date: NaiveDate, seed: u64) -> Self {
        Self {
            sessions,
            start_price,
            end_date,
            seed,
            drift: 0.001,
            volatility: 0.02,
        }
    }
}

/// Generate an oldest-first series of daily bars.
pub fn generate_price_bars(spec: &SampleSeriesSpec) -> Result<Vec<PriceBar>> {
    ensure!(
        spec.volatility.is_finite() && spec.volatility >= 0.0,
        "volatility must be finite and non-negative, got {}",
        spec.volatility
    );
    ensure!(
        spec.start_price.is_finite() && spec.start_price > 0.0,
        "start price must be finite and positive, got {}",
        spec.start_price
    );

    let returns: Normal<f64> = Normal::new(spec.drift, spec.volatility)
        .context("invalid drift/volatility for return distribution")?;
    let open_noise: Normal<f64> =
        Normal::new(0.0, 0.005).context("invalid open noise distribution")?;
    let range_noise: Normal<f64> =
        Normal::new(0.0, 0.01).context("invalid range noise distribution")?;

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let dates = trading_days_ending(spec.end_date, spec.sessions);

    let mut bars = Vec::with_capacity(dates.len());
    let mut close = spec.start_price;
    for timestamp in dates {
        close *= returns.sample(&mut rng).exp();

        let open = close * (1.0 + open_noise.sample(&mut rng));
        let high = close * (1.0 + range_noise.sample(&mut rng).abs());
        let low = close * (1.0 - range_noise.sample(&mut rng).abs());

        bars.push(PriceBar {
            timestamp,
            open,
            high: high.max(open).max(close),
            low: low.min(open).min(close),
            close,
            volume: rng.gen_range(1_000_000..10_000_000),
        });
    }

    Ok(bars)
}

/// The `count` most recent weekdays up to and including `end`, oldest-first.
fn trading_days_ending(end: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut day = end;
    while days.len() < count {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(day);
        }
        day -= Duration::days(1);
    }
    days.reverse();
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(seed: u64) -> SampleSeriesSpec {
        SampleSeriesSpec::new(120, 100.0, NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(), seed)
    }

    #[test]
    fn generates_requested_sessions() {
        let bars = generate_price_bars(&spec(7)).unwrap();
        assert_eq!(bars.len(), 120);
        assert_eq!(bars.last().unwrap().timestamp, NaiveDate::from_ymd_opt(2024, 6, 28).unwrap());
    }

    #[test]
    fn skips_weekends_and_ascends() {
        let bars = generate_price_bars(&spec(7)).unwrap();
        for w in bars.windows(2) {
            assert!(w[0].timestamp < w[1].timestamp);
        }
        assert!(bars
            .iter()
            .all(|b| !matches!(b.timestamp.weekday(), Weekday::Sat | Weekday::Sun)));
    }

    #[test]
    fn bars_are_valid_ohlc() {
        for b in generate_price_bars(&spec(11)).unwrap() {
            assert!(b.high >= b.open && b.high >= b.close, "{b:?}");
            assert!(b.low <= b.open && b.low <= b.close, "{b:?}");
            assert!(b.low > 0.0);
            assert!((1_000_000..10_000_000).contains(&b.volume));
        }
    }

    #[test]
    fn same_seed_same_series() {
        let a = generate_price_bars(&spec(42)).unwrap();
        let b = generate_price_bars(&spec(42)).unwrap();
        let c = generate_price_bars(&spec(43)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn zero_sessions_is_empty() {
        let mut s = spec(1);
        s.sessions = 0;
        assert!(generate_price_bars(&s).unwrap().is_empty());
    }

    #[test]
    fn negative_volatility_is_rejected() {
        let mut s = spec(1);
        s.volatility = -1.0;
        let err = generate_price_bars(&s).unwrap_err();
        assert!(err.to_string().contains("volatility"), "{err}");

        s.volatility = f64::NAN;
        assert!(generate_price_bars(&s).is_err());
    }

    #[test]
    fn non_positive_start_price_is_rejected() {
        let mut s = spec(1);
        s.start_price = 0.0;
        assert!(generate_price_bars(&s).is_err());
    }

    #[test]
    fn zero_volatility_is_a_pure_drift() {
        let mut s = spec(3);
        s.volatility = 0.0;
        let bars = generate_price_bars(&s).unwrap();
        let expected = 100.0 * (0.001_f64 * 120.0).exp();
        assert!((bars.last().unwrap().close - expected).abs() < 1e-9);
    }
}
