//! Financial statement line items.
//!
//! A statement is a table keyed by line-item label ("Operating Cash Flow",
//! "Total Debt", ...) where each row holds one value per reporting period,
//! most-recent period first. Providers disagree on labels, so lookups go
//! through [`LineItem`] alias lists.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known statement line items with the labels providers use for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineItem {
    OperatingCashFlow,
    CapitalExpenditure,
    TotalDebt,
    Cash,
    TotalRevenue,
    NetIncome,
}

impl LineItem {
    /// Labels recognized for this item, in lookup order.
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Self::OperatingCashFlow => &[
                "Operating Cash Flow",
                "Total Cash From Operating Activities",
                "Cash Flow From Continuing Operating Activities",
            ],
            Self::CapitalExpenditure => &["Capital Expenditure", "Capital Expenditures"],
            Self::TotalDebt => &["Total Debt"],
            Self::Cash => &[
                "Cash",
                "Cash And Cash Equivalents",
                "Cash Cash Equivalents And Short Term Investments",
            ],
            Self::TotalRevenue => &["Total Revenue", "Revenue"],
            Self::NetIncome => &["Net Income", "Net Income Common Stockholders"],
        }
    }
}

impl std::fmt::Display for LineItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.labels()[0])
    }
}

/// Raw statement shape as delivered by a provider.
#[derive(Debug, Clone, Default, Deserialize)]
struct StatementRecord {
    #[serde(default)]
    periods: Vec<NaiveDate>,
    #[serde(default)]
    lines: BTreeMap<String, Vec<Option<f64>>>,
}

impl From<StatementRecord> for FinancialStatement {
    fn from(record: StatementRecord) -> Self {
        Self::new(record.periods, record.lines)
    }
}

/// One financial statement (cash flow, balance sheet or income statement).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StatementRecord")]
pub struct FinancialStatement {
    /// Period end dates, one per column, most recent first. May be empty when
    /// the provider does not report dates.
    periods: Vec<NaiveDate>,
    /// Line label to per-period values.
    lines: BTreeMap<String, Vec<Option<f64>>>,
}

impl FinancialStatement {
    /// Build a statement, re-sorting columns most-recent first when period
    /// dates are supplied. Without dates the provider's column order is kept.
    pub fn new(periods: Vec<NaiveDate>, lines: BTreeMap<String, Vec<Option<f64>>>) -> Self {
        if periods.is_empty() {
            return Self { periods, lines };
        }

        let mut order: Vec<usize> = (0..periods.len()).collect();
        order.sort_by(|&a, &b| periods[b].cmp(&periods[a]));

        let sorted_periods = order.iter().map(|&i| periods[i]).collect();
        let sorted_lines = lines
            .into_iter()
            .map(|(label, values)| {
                if values.len() > periods.len() {
                    tracing::warn!(
                        line = %label,
                        values = values.len(),
                        periods = periods.len(),
                        "Dropping statement values beyond the reported periods"
                    );
                }
                let reordered = order
                    .iter()
                    .map(|&i| values.get(i).copied().flatten())
                    .collect();
                (label, reordered)
            })
            .collect();

        Self {
            periods: sorted_periods,
            lines: sorted_lines,
        }
    }

    /// Build an undated statement from `(label, values)` pairs.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<Option<f64>>)>,
        S: Into<String>,
    {
        let lines = lines
            .into_iter()
            .map(|(label, values)| (label.into(), values))
            .collect();
        Self::new(Vec::new(), lines)
    }

    /// Whether the statement carries no line items at all.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Period end dates, most recent first.
    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    /// Values for an item, most recent first.
    pub fn line(&self, item: LineItem) -> Option<&[Option<f64>]> {
        item.labels()
            .iter()
            .find_map(|label| self.lines.get(*label))
            .map(Vec::as_slice)
    }

    /// Whether any alias of the item is present.
    pub fn has_line(&self, item: LineItem) -> bool {
        self.line(item).is_some()
    }

    /// Most recent value of an item, absent when the line or value is missing.
    pub fn latest(&self, item: LineItem) -> Option<f64> {
        self.line(item)
            .and_then(|values| values.first().copied().flatten())
            .filter(|v| v.is_finite())
    }

    /// Most recent value of an item, treating absence as zero.
    pub fn latest_or_zero(&self, item: LineItem) -> f64 {
        self.latest(item).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, 12, 31).unwrap()
    }

    #[test]
    fn test_alias_lookup() {
        let stmt = FinancialStatement::from_lines([
            ("Cash And Cash Equivalents", vec![Some(50.0), Some(40.0)]),
            ("Total Debt", vec![None, Some(10.0)]),
        ]);

        assert_eq!(stmt.latest(LineItem::Cash), Some(50.0));
        assert_eq!(stmt.latest(LineItem::TotalDebt), None);
        assert_eq!(stmt.latest_or_zero(LineItem::TotalDebt), 0.0);
        assert!(!stmt.has_line(LineItem::OperatingCashFlow));
    }

    #[test]
    fn test_dated_columns_resorted_most_recent_first() {
        let mut lines = BTreeMap::new();
        lines.insert(
            "Operating Cash Flow".to_string(),
            vec![Some(100.0), Some(300.0), Some(200.0)],
        );

        let stmt = FinancialStatement::new(vec![date(2021), date(2023), date(2022)], lines);

        assert_eq!(stmt.periods(), &[date(2023), date(2022), date(2021)]);
        assert_eq!(stmt.latest(LineItem::OperatingCashFlow), Some(300.0));
        assert_eq!(
            stmt.line(LineItem::OperatingCashFlow).unwrap(),
            &[Some(300.0), Some(200.0), Some(100.0)]
        );
    }

    #[test]
    fn test_short_line_padded_when_resorting() {
        let mut lines = BTreeMap::new();
        lines.insert("Total Debt".to_string(), vec![Some(5.0)]);

        let stmt = FinancialStatement::new(vec![date(2022), date(2023)], lines);

        assert_eq!(stmt.line(LineItem::TotalDebt).unwrap(), &[None, Some(5.0)]);
        assert_eq!(stmt.latest(LineItem::TotalDebt), None);
    }

    #[test]
    fn test_values_beyond_periods_dropped() {
        let mut lines = BTreeMap::new();
        lines.insert("Cash".to_string(), vec![Some(1.0), Some(2.0), Some(3.0)]);

        let stmt = FinancialStatement::new(vec![date(2022), date(2023)], lines);

        assert_eq!(stmt.line(LineItem::Cash).unwrap(), &[Some(2.0), Some(1.0)]);
    }

    #[test]
    fn test_deserialize_normalizes() {
        let json = r#"{
            "periods": ["2022-12-31", "2023-12-31"],
            "lines": { "Cash": [10.0, 20.0] }
        }"#;

        let stmt: FinancialStatement = serde_json::from_str(json).unwrap();

        assert_eq!(stmt.latest(LineItem::Cash), Some(20.0));
    }
}
