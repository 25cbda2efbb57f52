//! Discounted Cash Flow Engine.
//!
//! Values a company from its most recent free cash flow:
//!
//! ```text
//! FCF        = operating cash flow - |capital expenditure|
//! PV         = sum over y = 1..N of FCF(1+g)^y / (1+d)^y
//! TV         = FCF(1+g) / (d - g)                       (requires d > g)
//! EV         = PV + TV / (1+d)^N
//! equity     = EV - total debt + cash
//! per share  = equity / shares outstanding
//! ```
//!
//! Statements are expected most-recent period first (see
//! [`FinancialStatement`]); only the latest column is used.

pub mod types;

use crate::error::{Result, ValuationError};
use crate::market::{FinancialStatement, LineItem};

pub use types::{
    DcfAssumptions, DcfResult, SensitivityMatrix, DEFAULT_PROJECTION_YEARS, MAX_PROJECTION_YEARS,
};

/// Default growth-rate axis for sensitivity analysis.
pub const DEFAULT_GROWTH_GRID: [f64; 4] = [0.02, 0.05, 0.08, 0.10];

/// Default discount-rate axis for sensitivity analysis.
pub const DEFAULT_DISCOUNT_GRID: [f64; 4] = [0.08, 0.10, 0.12, 0.15];

/// Statement-derived inputs shared by every DCF run on the same company.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DcfInputs {
    free_cash_flow: f64,
    total_debt: f64,
    cash: f64,
    shares_outstanding: f64,
}

impl DcfInputs {
    fn extract(
        cash_flow: &FinancialStatement,
        balance_sheet: &FinancialStatement,
        shares_outstanding: Option<f64>,
    ) -> Result<Self> {
        if cash_flow.is_empty()
            || !(cash_flow.has_line(LineItem::OperatingCashFlow)
                || cash_flow.has_line(LineItem::CapitalExpenditure))
        {
            return Err(ValuationError::insufficient("no cash flow data available"));
        }

        let shares_outstanding = match shares_outstanding {
            Some(shares) if shares.is_finite() && shares > 0.0 => shares,
            other => {
                return Err(ValuationError::insufficient(format!(
                    "shares outstanding must be positive, got {:?}",
                    other
                )))
            }
        };

        let operating = cash_flow.latest_or_zero(LineItem::OperatingCashFlow);
        let capex = cash_flow.latest_or_zero(LineItem::CapitalExpenditure).abs();

        Ok(Self {
            free_cash_flow: operating - capex,
            total_debt: balance_sheet.latest_or_zero(LineItem::TotalDebt),
            cash: balance_sheet.latest_or_zero(LineItem::Cash),
            shares_outstanding,
        })
    }

    fn value(&self, assumptions: &DcfAssumptions, current_price: Option<f64>) -> Result<DcfResult> {
        assumptions.validate()?;

        let g = assumptions.growth_rate;
        let d = assumptions.discount_rate;
        let years = i32::try_from(assumptions.projection_years).map_err(|_| {
            ValuationError::invalid_assumption(format!(
                "projection horizon {} is out of range",
                assumptions.projection_years
            ))
        })?;

        let projected_cash_flows: Vec<f64> = (1..=years)
            .map(|year| self.free_cash_flow * (1.0 + g).powi(year))
            .collect();

        let present_value_of_cash_flows: f64 = projected_cash_flows
            .iter()
            .zip(1..=years)
            .map(|(fcf, year)| fcf / (1.0 + d).powi(year))
            .sum();

        let terminal_value = self.free_cash_flow * (1.0 + g) / (d - g);
        let enterprise_value = present_value_of_cash_flows + terminal_value / (1.0 + d).powi(years);
        let equity_value = enterprise_value - self.total_debt + self.cash;
        let value_per_share = equity_value / self.shares_outstanding;

        let current_price = current_price.filter(|p| p.is_finite());
        let upside_fraction = current_price
            .filter(|p| *p > 0.0)
            .map(|price| (value_per_share - price) / price);

        Ok(DcfResult {
            value_per_share,
            enterprise_value,
            equity_value,
            free_cash_flow: self.free_cash_flow,
            projected_cash_flows,
            present_value_of_cash_flows,
            terminal_value,
            current_price,
            upside_fraction,
            assumptions: *assumptions,
        })
    }
}

/// Run a DCF valuation.
///
/// # Errors
///
/// - `InvalidAssumption` when the discount rate does not exceed the growth rate
/// - `InsufficientData` when the cash flow statement carries neither operating
///   cash flow nor capital expenditure, or shares outstanding is missing or
///   not positive
///
/// A missing balance sheet (empty statement) counts as zero debt and zero cash.
pub fn compute_dcf(
    cash_flow: &FinancialStatement,
    balance_sheet: &FinancialStatement,
    shares_outstanding: Option<f64>,
    current_price: Option<f64>,
    assumptions: &DcfAssumptions,
) -> Result<DcfResult> {
    assumptions.validate()?;
    let inputs = DcfInputs::extract(cash_flow, balance_sheet, shares_outstanding)?;
    let result = inputs.value(assumptions, current_price)?;

    tracing::debug!(
        fcf = result.free_cash_flow,
        enterprise_value = result.enterprise_value,
        value_per_share = result.value_per_share,
        growth = assumptions.growth_rate,
        discount = assumptions.discount_rate,
        "DCF valuation computed"
    );

    Ok(result)
}

/// Tabulate value per share over a growth x discount grid.
///
/// Cells where the discount rate does not exceed the growth rate are `None`.
/// Data problems fail every cell the same way, so they fail the whole call.
pub fn compute_sensitivity(
    cash_flow: &FinancialStatement,
    balance_sheet: &FinancialStatement,
    shares_outstanding: Option<f64>,
    growth_rates: &[f64],
    discount_rates: &[f64],
) -> Result<SensitivityMatrix> {
    let inputs = DcfInputs::extract(cash_flow, balance_sheet, shares_outstanding)?;

    let values = growth_rates
        .iter()
        .map(|&g| {
            discount_rates
                .iter()
                .map(|&d| {
                    inputs
                        .value(&DcfAssumptions::new(g, d), None)
                        .ok()
                        .map(|r| r.value_per_share)
                })
                .collect()
        })
        .collect();

    let matrix = SensitivityMatrix {
        growth_rates: growth_rates.to_vec(),
        discount_rates: discount_rates.to_vec(),
        values,
    };

    tracing::debug!(
        rows = growth_rates.len(),
        cols = discount_rates.len(),
        valid = matrix.valid_cells(),
        "Sensitivity grid computed"
    );

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cash_flow(ocf: f64, capex: f64) -> FinancialStatement {
        FinancialStatement::from_lines([
            ("Operating Cash Flow", vec![Some(ocf), Some(ocf * 0.9)]),
            ("Capital Expenditure", vec![Some(capex), Some(capex)]),
        ])
    }

    fn balance_sheet(debt: f64, cash: f64) -> FinancialStatement {
        FinancialStatement::from_lines([
            ("Total Debt", vec![Some(debt)]),
            ("Cash", vec![Some(cash)]),
        ])
    }

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_reference_valuation() {
        // FCF = 150 - |-50| = 100, g = 5%, d = 10%
        let result = compute_dcf(
            &cash_flow(150.0, -50.0),
            &FinancialStatement::default(),
            Some(1.0),
            None,
            &DcfAssumptions::new(0.05, 0.10),
        )
        .unwrap();

        assert!(approx(result.free_cash_flow, 100.0, 1e-9));
        assert!(approx(result.terminal_value, 2100.0, 1e-9));
        assert!(approx(result.present_value_of_cash_flows, 435.812, 0.001));
        assert!(approx(result.enterprise_value, 1739.747, 0.001));
        assert!(approx(result.value_per_share, result.enterprise_value, 1e-9));
        assert_eq!(result.projected_cash_flows.len(), 5);
        assert!(approx(result.projected_cash_flows[0], 105.0, 1e-9));
        assert_eq!(result.upside_fraction, None);
    }

    #[test]
    fn test_equity_bridge_and_upside() {
        let result = compute_dcf(
            &cash_flow(150.0, 50.0),
            &balance_sheet(200.0, 60.0),
            Some(10.0),
            Some(100.0),
            &DcfAssumptions::default(),
        )
        .unwrap();

        let expected_equity = result.enterprise_value - 200.0 + 60.0;
        assert!(approx(result.equity_value, expected_equity, 1e-9));
        assert!(approx(result.value_per_share, expected_equity / 10.0, 1e-9));

        let upside = result.upside_fraction.unwrap();
        assert!(approx(upside, (result.value_per_share - 100.0) / 100.0, 1e-12));
    }

    #[test]
    fn test_capex_sign_ignored() {
        let a = compute_dcf(
            &cash_flow(150.0, -50.0),
            &FinancialStatement::default(),
            Some(1.0),
            None,
            &DcfAssumptions::default(),
        )
        .unwrap();
        let b = compute_dcf(
            &cash_flow(150.0, 50.0),
            &FinancialStatement::default(),
            Some(1.0),
            None,
            &DcfAssumptions::default(),
        )
        .unwrap();
        assert_eq!(a.value_per_share, b.value_per_share);
    }

    #[test]
    fn test_invalid_assumptions_rejected() {
        for (g, d) in [(0.10, 0.10), (0.12, 0.08), (0.05, -0.01)] {
            let err = compute_dcf(
                &cash_flow(150.0, 50.0),
                &FinancialStatement::default(),
                Some(1.0),
                Some(10.0),
                &DcfAssumptions::new(g, d),
            )
            .unwrap_err();
            assert!(err.is_invalid_assumption(), "g={} d={} -> {:?}", g, d, err);
        }
    }

    #[test]
    fn test_projection_horizon_bounded() {
        let run = |years: u32| {
            compute_dcf(
                &cash_flow(150.0, 50.0),
                &FinancialStatement::default(),
                Some(1.0),
                None,
                &DcfAssumptions::default().with_projection_years(years),
            )
        };

        assert_eq!(run(MAX_PROJECTION_YEARS).unwrap().projected_cash_flows.len(), 100);
        assert!(run(MAX_PROJECTION_YEARS + 1).unwrap_err().is_invalid_assumption());
        assert!(run(u32::MAX).unwrap_err().is_invalid_assumption());
    }

    #[test]
    fn test_missing_cash_flow_is_insufficient() {
        let err = compute_dcf(
            &FinancialStatement::default(),
            &balance_sheet(10.0, 10.0),
            Some(1.0),
            None,
            &DcfAssumptions::default(),
        )
        .unwrap_err();
        assert!(err.is_insufficient_data());

        let unrelated = FinancialStatement::from_lines([("Dividends Paid", vec![Some(-5.0)])]);
        assert!(compute_dcf(
            &unrelated,
            &FinancialStatement::default(),
            Some(1.0),
            None,
            &DcfAssumptions::default()
        )
        .unwrap_err()
        .is_insufficient_data());
    }

    #[test]
    fn test_zero_fcf_is_a_value() {
        let result = compute_dcf(
            &cash_flow(50.0, -50.0),
            &FinancialStatement::default(),
            Some(1.0),
            None,
            &DcfAssumptions::default(),
        )
        .unwrap();
        assert_eq!(result.free_cash_flow, 0.0);
        assert_eq!(result.value_per_share, 0.0);
    }

    #[test]
    fn test_shares_must_be_positive() {
        for shares in [None, Some(0.0), Some(-5.0), Some(f64::NAN)] {
            let err = compute_dcf(
                &cash_flow(150.0, 50.0),
                &FinancialStatement::default(),
                shares,
                None,
                &DcfAssumptions::default(),
            )
            .unwrap_err();
            assert!(err.is_insufficient_data());
        }
    }

    #[test]
    fn test_non_positive_price_has_no_upside() {
        let result = compute_dcf(
            &cash_flow(150.0, 50.0),
            &FinancialStatement::default(),
            Some(1.0),
            Some(0.0),
            &DcfAssumptions::default(),
        )
        .unwrap();
        assert_eq!(result.current_price, Some(0.0));
        assert_eq!(result.upside_fraction, None);
    }

    #[test]
    fn test_sensitivity_grid() {
        let matrix = compute_sensitivity(
            &cash_flow(150.0, 50.0),
            &FinancialStatement::default(),
            Some(1.0),
            &DEFAULT_GROWTH_GRID,
            &DEFAULT_DISCOUNT_GRID,
        )
        .unwrap();

        assert_eq!(matrix.values.len(), 4);
        assert!(matrix.values.iter().all(|row| row.len() == 4));

        // g = 0.10 against d = 0.08 and d = 0.10 diverges
        assert_eq!(matrix.get(3, 0), None);
        assert_eq!(matrix.get(3, 1), None);
        // g = 0.08 against d = 0.08 diverges
        assert_eq!(matrix.get(2, 0), None);
        assert_eq!(matrix.valid_cells(), 13);

        // Cell (g = 0.05, d = 0.10) matches a direct run
        let direct = compute_dcf(
            &cash_flow(150.0, 50.0),
            &FinancialStatement::default(),
            Some(1.0),
            None,
            &DcfAssumptions::new(0.05, 0.10),
        )
        .unwrap();
        assert_eq!(matrix.get(1, 1), Some(direct.value_per_share));

        // Value falls as the discount rate rises
        let row = &matrix.values[0];
        assert!(row[0].unwrap() > row[1].unwrap());
        assert!(row[1].unwrap() > row[2].unwrap());
    }

    #[test]
    fn test_sensitivity_propagates_data_errors() {
        let err = compute_sensitivity(
            &FinancialStatement::default(),
            &FinancialStatement::default(),
            Some(1.0),
            &DEFAULT_GROWTH_GRID,
            &DEFAULT_DISCOUNT_GRID,
        )
        .unwrap_err();
        assert!(err.is_insufficient_data());
    }
}
