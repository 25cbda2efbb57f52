//! Property tests for the indicator engine.

use chrono::NaiveDate;
use proptest::prelude::*;

use zero_valuation::indicators::{
    compute_indicators, math, BandPosition, MacdTrend, PricePosition, RsiSignal,
};
use zero_valuation::PriceSeries;

fn series(closes: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    PriceSeries::from_closes(start, closes).unwrap()
}

fn closes_strategy(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.01f64..10_000.0, 0..max_len)
}

proptest! {
    #[test]
    fn rsi_always_within_bounds(closes in closes_strategy(300)) {
        let snapshot = compute_indicators(&series(&closes));
        prop_assert!((0.0..=100.0).contains(&snapshot.rsi.value));

        if let Some(value) = math::rsi(&closes, 14) {
            prop_assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn indicators_are_deterministic(closes in closes_strategy(260)) {
        let s = series(&closes);
        prop_assert_eq!(compute_indicators(&s), compute_indicators(&s));
    }

    #[test]
    fn short_series_fall_back(closes in prop::collection::vec(1.0f64..500.0, 0..20)) {
        let snapshot = compute_indicators(&series(&closes));

        let sma = &snapshot.moving_averages.sma_20;
        prop_assert!(!sma.sufficient_history);
        prop_assert_eq!(sma.value, 0.0);
        prop_assert_eq!(sma.price_position, PricePosition::Unavailable);

        prop_assert_eq!(snapshot.bollinger.upper, 0.0);
        prop_assert_eq!(snapshot.bollinger.middle, 0.0);
        prop_assert_eq!(snapshot.bollinger.lower, 0.0);
        prop_assert_eq!(snapshot.bollinger.position, BandPosition::Middle);

        prop_assert_eq!(snapshot.macd.trend, MacdTrend::Neutral);
        if closes.len() < 15 {
            prop_assert_eq!(snapshot.rsi.value, 50.0);
            prop_assert_eq!(snapshot.rsi.signal, RsiSignal::Neutral);
        }
    }

    #[test]
    fn bollinger_bands_ordered(closes in prop::collection::vec(1.0f64..500.0, 20..120)) {
        let snapshot = compute_indicators(&series(&closes));
        let b = &snapshot.bollinger;
        prop_assert!(b.sufficient_history);
        prop_assert!(b.lower <= b.middle + 1e-9);
        prop_assert!(b.middle <= b.upper + 1e-9);
    }
}

#[test]
fn constant_series_is_neutral() {
    let snapshot = compute_indicators(&series(&[42.0; 60]));

    assert_eq!(snapshot.rsi.value, 50.0);
    assert_eq!(snapshot.rsi.signal, RsiSignal::Neutral);
    assert_eq!(snapshot.bollinger.position, BandPosition::Middle);
    assert_eq!(
        snapshot.moving_averages.sma_50.price_position,
        PricePosition::Below
    );
    assert!(snapshot.macd.value.abs() < 1e-9);
}
