//! Technical indicator types.

use serde::{Deserialize, Serialize};

// ============================================================================
// Parameters
// ============================================================================

/// Indicator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    /// RSI lookback period
    pub rsi_period: usize,
    /// RSI level above which the reading is overbought
    pub rsi_overbought: f64,
    /// RSI level below which the reading is oversold
    pub rsi_oversold: f64,
    /// MACD fast EMA span
    pub macd_fast: usize,
    /// MACD slow EMA span
    pub macd_slow: usize,
    /// MACD signal EMA span
    pub macd_signal: usize,
    /// Bollinger window
    pub bollinger_window: usize,
    /// Bollinger band width in standard deviations
    pub bollinger_k: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_window: 20,
            bollinger_k: 2.0,
        }
    }
}

// ============================================================================
// Classifications
// ============================================================================

/// Last close relative to a moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PricePosition {
    Above,
    Below,
    /// Not enough history to compute the average
    Unavailable,
}

impl std::fmt::Display for PricePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Above => write!(f, "Above"),
            Self::Below => write!(f, "Below"),
            Self::Unavailable => write!(f, "Unavailable"),
        }
    }
}

/// RSI interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RsiSignal {
    Overbought,
    Oversold,
    Neutral,
}

impl std::fmt::Display for RsiSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overbought => write!(f, "Overbought"),
            Self::Oversold => write!(f, "Oversold"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

/// MACD interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MacdTrend {
    /// MACD line above signal line
    Bullish,
    /// MACD line at or below signal line
    Bearish,
    /// Not enough history for a signal line
    Neutral,
}

impl std::fmt::Display for MacdTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "Bullish"),
            Self::Bearish => write!(f, "Bearish"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Last close relative to the Bollinger bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BandPosition {
    Upper,
    Middle,
    Lower,
}

impl std::fmt::Display for BandPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upper => write!(f, "Upper"),
            Self::Middle => write!(f, "Middle"),
            Self::Lower => write!(f, "Lower"),
        }
    }
}

// ============================================================================
// Readings
// ============================================================================

/// Simple moving average reading. `value` is 0 when history is insufficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverage {
    /// Window length in bars
    pub window: usize,
    /// Average of the last `window` closes
    pub value: f64,
    /// Whether the series covered the window
    pub sufficient_history: bool,
    /// Last close versus the average
    pub price_position: PricePosition,
}

/// The three standard moving averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverages {
    pub sma_20: MovingAverage,
    pub sma_50: MovingAverage,
    pub sma_200: MovingAverage,
}

/// RSI reading. `value` is 50 when history is insufficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiReading {
    pub value: f64,
    pub signal: RsiSignal,
    pub sufficient_history: bool,
}

/// MACD reading. All values are 0 when history is insufficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdReading {
    pub value: f64,
    pub signal: f64,
    pub histogram: f64,
    pub trend: MacdTrend,
    pub sufficient_history: bool,
}

/// Bollinger reading. Bands are 0 when history is insufficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerReading {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub position: BandPosition,
    pub sufficient_history: bool,
}

/// Indicator values at the last bar of a price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    /// Bars in the series, including bars with a missing close
    pub bar_count: usize,
    /// Most recent present close
    pub last_close: Option<f64>,
    pub moving_averages: MovingAverages,
    pub rsi: RsiReading,
    pub macd: MacdReading,
    pub bollinger: BollingerReading,
}
