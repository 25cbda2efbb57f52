//! Year-over-year growth from the income statement.
//!
//! ```text
//! growth = (latest - prior) / prior        (0 when prior == 0)
//! ```
//!
//! Needs the two most recent periods of a line; with fewer, or with either
//! value missing, the metric is absent rather than an error.

use serde::{Deserialize, Serialize};

use crate::market::{FinancialStatement, LineItem};

/// One-year growth of revenue and earnings, as fractions (0.2 = 20%).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthMetrics {
    pub revenue_growth_1y: Option<f64>,
    pub earnings_growth_1y: Option<f64>,
}

impl GrowthMetrics {
    /// Whether neither metric could be computed.
    pub fn is_empty(&self) -> bool {
        self.revenue_growth_1y.is_none() && self.earnings_growth_1y.is_none()
    }
}

fn one_year_growth(statement: &FinancialStatement, item: LineItem) -> Option<f64> {
    let values = statement.line(item)?;
    let latest = values.first().copied().flatten().filter(|v| v.is_finite())?;
    let prior = values.get(1).copied().flatten().filter(|v| v.is_finite())?;

    if prior == 0.0 {
        return Some(0.0);
    }
    Some((latest - prior) / prior)
}

/// Revenue and net income growth over the latest year.
///
/// Expects columns most-recent first, as [`FinancialStatement`] normalizes
/// them.
pub fn compute_growth_metrics(income_statement: &FinancialStatement) -> GrowthMetrics {
    let metrics = GrowthMetrics {
        revenue_growth_1y: one_year_growth(income_statement, LineItem::TotalRevenue),
        earnings_growth_1y: one_year_growth(income_statement, LineItem::NetIncome),
    };

    tracing::debug!(
        revenue = ?metrics.revenue_growth_1y,
        earnings = ?metrics.earnings_growth_1y,
        "Computed growth metrics"
    );

    metrics
}
