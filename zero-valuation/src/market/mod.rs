//! Market data model consumed by the valuation engine.
//!
//! Price bars and financial statements arrive from external data providers in
//! whatever order the provider chose. Everything in this module normalizes that
//! input once, at construction, so the engines can rely on a single ordering:
//!
//! - [`PriceSeries`] is always **ascending** by date (oldest bar first).
//! - [`FinancialStatement`] columns are always **most-recent period first**.

pub mod statement;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValuationError};

pub use statement::{FinancialStatement, LineItem};

/// One trading day of OHLCV data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading date
    pub date: NaiveDate,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price, absent for a missing bar
    #[serde(default)]
    pub close: Option<f64>,
    /// Volume
    #[serde(default)]
    pub volume: f64,
}

impl PriceBar {
    /// Create a bar with a close price.
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close: Some(close),
            volume,
        }
    }
}

/// Chronologically ascending series of daily bars.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series from provider bars in any order.
    ///
    /// Bars are sorted ascending by date. Duplicate dates and closes that are
    /// negative or non-finite are rejected as degenerate input.
    pub fn new(mut bars: Vec<PriceBar>) -> Result<Self> {
        bars.sort_by_key(|bar| bar.date);

        if let Some(pair) = bars.windows(2).find(|pair| pair[0].date == pair[1].date) {
            return Err(ValuationError::degenerate(format!(
                "duplicate price bar for {}",
                pair[0].date
            )));
        }

        for bar in &bars {
            if let Some(close) = bar.close {
                if !close.is_finite() || close < 0.0 {
                    return Err(ValuationError::degenerate(format!(
                        "invalid close {} on {}",
                        close, bar.date
                    )));
                }
            }
        }

        Ok(Self { bars })
    }

    /// Build a series from closing prices only, one synthetic day apart.
    ///
    /// Used by tests and callers that only hold a close vector.
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Result<Self> {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let date = start + chrono::Duration::days(i as i64);
                PriceBar::new(date, close, close, close, close, 0.0)
            })
            .collect();
        Self::new(bars)
    }

    /// All bars, oldest first.
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// Number of bars, including missing ones.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Whether the series has no bars.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Present closing prices, oldest first. Missing bars are skipped.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().filter_map(|bar| bar.close).collect()
    }

    /// Most recent present close.
    pub fn latest_close(&self) -> Option<f64> {
        self.bars.iter().rev().find_map(|bar| bar.close)
    }

    /// Whether any bar carries a strictly positive close.
    pub fn has_positive_close(&self) -> bool {
        self.bars
            .iter()
            .any(|bar| bar.close.map(|c| c > 0.0).unwrap_or(false))
    }

    /// Date of the first and last bar.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.bars.first(), self.bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }
}
