//! DCF model types.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValuationError};

pub use zero_common::config::MAX_PROJECTION_YEARS;

/// Default explicit projection horizon in years.
pub const DEFAULT_PROJECTION_YEARS: u32 = 5;

/// Growth and discount assumptions for a DCF run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcfAssumptions {
    /// Annual free cash flow growth (fraction, 0.05 = 5%)
    pub growth_rate: f64,
    /// Annual discount rate (fraction)
    pub discount_rate: f64,
    /// Explicit projection horizon before the terminal value
    #[serde(default = "default_projection_years")]
    pub projection_years: u32,
}

fn default_projection_years() -> u32 {
    DEFAULT_PROJECTION_YEARS
}

impl Default for DcfAssumptions {
    fn default() -> Self {
        Self::new(0.05, 0.10)
    }
}

impl DcfAssumptions {
    /// Create assumptions with the default projection horizon.
    pub fn new(growth_rate: f64, discount_rate: f64) -> Self {
        Self {
            growth_rate,
            discount_rate,
            projection_years: DEFAULT_PROJECTION_YEARS,
        }
    }

    /// Derive the discount rate from CAPM: `rf + beta * market_risk_premium`.
    pub fn from_capm(growth_rate: f64, risk_free_rate: f64, beta: f64, market_risk_premium: f64) -> Self {
        Self::new(growth_rate, risk_free_rate + beta * market_risk_premium)
    }

    /// Override the projection horizon.
    pub fn with_projection_years(mut self, years: u32) -> Self {
        self.projection_years = years;
        self
    }

    /// Check that the perpetuity converges.
    ///
    /// The terminal value divides by `discount - growth`, so the discount rate
    /// must be strictly greater than the growth rate.
    pub fn validate(&self) -> Result<()> {
        if !self.growth_rate.is_finite() || !self.discount_rate.is_finite() {
            return Err(ValuationError::invalid_assumption(format!(
                "rates must be finite (growth {}, discount {})",
                self.growth_rate, self.discount_rate
            )));
        }
        if self.discount_rate <= -1.0 {
            return Err(ValuationError::invalid_assumption(format!(
                "discount rate {} must be greater than -100%",
                self.discount_rate
            )));
        }
        if self.discount_rate <= self.growth_rate {
            return Err(ValuationError::invalid_assumption(format!(
                "discount rate {} must exceed growth rate {}",
                self.discount_rate, self.growth_rate
            )));
        }
        if self.projection_years == 0 || self.projection_years > MAX_PROJECTION_YEARS {
            return Err(ValuationError::invalid_assumption(format!(
                "projection horizon {} must be between 1 and {} years",
                self.projection_years, MAX_PROJECTION_YEARS
            )));
        }
        Ok(())
    }
}

/// Result of a discounted cash flow valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfResult {
    /// Equity value per share
    pub value_per_share: f64,
    /// Present value of projected cash flows plus discounted terminal value
    pub enterprise_value: f64,
    /// Enterprise value less debt plus cash
    pub equity_value: f64,
    /// Base-year free cash flow
    pub free_cash_flow: f64,
    /// Projected free cash flow for each year of the horizon
    pub projected_cash_flows: Vec<f64>,
    /// Present value of the projected cash flows
    pub present_value_of_cash_flows: f64,
    /// Undiscounted terminal value at the end of the horizon
    pub terminal_value: f64,
    /// Market price used for the upside calculation
    pub current_price: Option<f64>,
    /// (value per share - price) / price, absent without a positive price
    pub upside_fraction: Option<f64>,
    /// Assumptions used
    pub assumptions: DcfAssumptions,
}

/// Value per share over a growth x discount grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityMatrix {
    /// Row axis
    pub growth_rates: Vec<f64>,
    /// Column axis
    pub discount_rates: Vec<f64>,
    /// `values[row][col]`, `None` where discount <= growth
    pub values: Vec<Vec<Option<f64>>>,
}

impl SensitivityMatrix {
    /// Value for a growth/discount pair by grid index.
    pub fn get(&self, growth_index: usize, discount_index: usize) -> Option<f64> {
        self.values
            .get(growth_index)
            .and_then(|row| row.get(discount_index))
            .copied()
            .flatten()
    }

    /// Number of cells holding a value.
    pub fn valid_cells(&self) -> usize {
        self.values.iter().flatten().filter(|v| v.is_some()).count()
    }
}
