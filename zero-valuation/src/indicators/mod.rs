//! Technical Indicator Engine.
//!
//! Turns a [`PriceSeries`] into an [`IndicatorSnapshot`] at its last bar:
//!
//! - **SMA 20/50/200** with the last close classified above/below each average
//! - **RSI(14)** over a simple rolling mean of gains and losses
//! - **MACD(12, 26, 9)** with mean-seeded EMAs
//! - **Bollinger Bands(20, 2)** using the sample standard deviation
//!
//! Every indicator is computed on its own. When the series is too short for
//! one window, that reading falls back to a fixed neutral value and
//! `sufficient_history = false`; the rest of the snapshot is unaffected.

pub mod math;
pub mod types;

use crate::market::PriceSeries;

pub use types::{
    BandPosition, BollingerReading, IndicatorParams, IndicatorSnapshot, MacdReading, MacdTrend,
    MovingAverage, MovingAverages, PricePosition, RsiReading, RsiSignal,
};

/// Fallback RSI value when history is insufficient.
const NEUTRAL_RSI: f64 = 50.0;

/// Compute the default indicator snapshot for a series.
pub fn compute_indicators(series: &PriceSeries) -> IndicatorSnapshot {
    IndicatorEngine::new().compute(series)
}

/// Indicator engine with configurable parameters.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    params: IndicatorParams,
}

impl IndicatorEngine {
    /// Create an engine with the standard parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom parameters.
    pub fn with_params(params: IndicatorParams) -> Self {
        Self { params }
    }

    /// Parameters in use.
    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// Compute all indicators at the last bar of the series.
    pub fn compute(&self, series: &PriceSeries) -> IndicatorSnapshot {
        let closes = series.closes();
        let last_close = series.latest_close();

        let snapshot = IndicatorSnapshot {
            bar_count: series.len(),
            last_close,
            moving_averages: MovingAverages {
                sma_20: self.moving_average(&closes, last_close, 20),
                sma_50: self.moving_average(&closes, last_close, 50),
                sma_200: self.moving_average(&closes, last_close, 200),
            },
            rsi: self.rsi(&closes),
            macd: self.macd(&closes),
            bollinger: self.bollinger(&closes, last_close),
        };

        tracing::debug!(
            bars = snapshot.bar_count,
            closes = closes.len(),
            rsi = snapshot.rsi.value,
            macd_trend = %snapshot.macd.trend,
            band = %snapshot.bollinger.position,
            "Computed indicator snapshot"
        );

        snapshot
    }

    fn moving_average(&self, closes: &[f64], last_close: Option<f64>, window: usize) -> MovingAverage {
        match (math::sma(closes, window), last_close) {
            (Some(value), Some(price)) => MovingAverage {
                window,
                value,
                sufficient_history: true,
                price_position: if price > value {
                    PricePosition::Above
                } else {
                    PricePosition::Below
                },
            },
            _ => MovingAverage {
                window,
                value: 0.0,
                sufficient_history: false,
                price_position: PricePosition::Unavailable,
            },
        }
    }

    fn rsi(&self, closes: &[f64]) -> RsiReading {
        match math::rsi(closes, self.params.rsi_period) {
            Some(value) => RsiReading {
                value,
                signal: self.classify_rsi(value),
                sufficient_history: true,
            },
            None => RsiReading {
                value: NEUTRAL_RSI,
                signal: RsiSignal::Neutral,
                sufficient_history: false,
            },
        }
    }

    /// Classify an RSI value against the configured thresholds.
    pub fn classify_rsi(&self, value: f64) -> RsiSignal {
        if value > self.params.rsi_overbought {
            RsiSignal::Overbought
        } else if value < self.params.rsi_oversold {
            RsiSignal::Oversold
        } else {
            RsiSignal::Neutral
        }
    }

    fn macd(&self, closes: &[f64]) -> MacdReading {
        let p = &self.params;
        match math::macd(closes, p.macd_fast, p.macd_slow, p.macd_signal) {
            Some(values) => MacdReading {
                value: values.macd,
                signal: values.signal,
                histogram: values.histogram,
                trend: if values.macd > values.signal {
                    MacdTrend::Bullish
                } else {
                    MacdTrend::Bearish
                },
                sufficient_history: true,
            },
            None => MacdReading {
                value: 0.0,
                signal: 0.0,
                histogram: 0.0,
                trend: MacdTrend::Neutral,
                sufficient_history: false,
            },
        }
    }

    fn bollinger(&self, closes: &[f64], last_close: Option<f64>) -> BollingerReading {
        let bands = math::bollinger(closes, self.params.bollinger_window, self.params.bollinger_k);
        match (bands, last_close) {
            (Some(bands), Some(price)) => BollingerReading {
                upper: bands.upper,
                middle: bands.middle,
                lower: bands.lower,
                position: if price > bands.upper {
                    BandPosition::Upper
                } else if price < bands.lower {
                    BandPosition::Lower
                } else {
                    BandPosition::Middle
                },
                sufficient_history: true,
            },
            _ => BollingerReading {
                upper: 0.0,
                middle: 0.0,
                lower: 0.0,
                position: BandPosition::Middle,
                sufficient_history: false,
            },
        }
    }
}
