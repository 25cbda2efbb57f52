//! Valuation Aggregator.
//!
//! Combines the per-share values from every method that succeeded into a
//! fair-value range. Methods that failed are simply left out; the range only
//! fails when nothing is left.

use serde::{Deserialize, Serialize};

use crate::dcf::DcfResult;
use crate::error::{Result, ValuationError};
use crate::peers::{PercentileMap, RatioEstimate};

/// Number of distinct methods needed for a high-confidence range.
const HIGH_CONFIDENCE_METHODS: usize = 3;

/// Source of a per-share value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationMethod {
    /// Discounted cash flow
    Dcf,
    /// Peer-average price/earnings times EPS
    PeerPe,
    /// Peer-average price/book times book value per share
    PeerPb,
    /// Peer-average price/sales times sales per share
    PeerPs,
}

impl std::fmt::Display for ValuationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dcf => write!(f, "dcf"),
            Self::PeerPe => write!(f, "peer_pe"),
            Self::PeerPb => write!(f, "peer_pb"),
            Self::PeerPs => write!(f, "peer_ps"),
        }
    }
}

/// How much the range can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
        }
    }
}

/// Fair value range across valuation methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairValueRange {
    pub minimum: f64,
    pub maximum: f64,
    pub average: f64,
    /// Methods that contributed, in contribution order
    pub methods: Vec<ValuationMethod>,
    /// Number of values in the range
    pub valuation_methods: usize,
    pub confidence: Confidence,
    /// Peer standing, carried through for context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_percentiles: Option<PercentileMap>,
}

/// Combine DCF and ratio estimates into a fair value range.
///
/// # Errors
///
/// With no usable value: the DCF error when DCF was the only method offered,
/// `InsufficientData` otherwise.
pub fn aggregate_fair_value(
    dcf: std::result::Result<&DcfResult, &ValuationError>,
    ratio_estimates: &[RatioEstimate],
    percentiles: Option<&PercentileMap>,
) -> Result<FairValueRange> {
    let mut candidates: Vec<(ValuationMethod, f64)> = Vec::new();

    if let Ok(result) = dcf {
        if result.value_per_share.is_finite() {
            candidates.push((ValuationMethod::Dcf, result.value_per_share));
        }
    }

    candidates.extend(
        ratio_estimates
            .iter()
            .filter(|estimate| estimate.value_per_share.is_finite())
            .map(|estimate| (estimate.method, estimate.value_per_share)),
    );

    if candidates.is_empty() {
        return Err(match dcf {
            Err(err) if ratio_estimates.is_empty() => err.clone(),
            _ => ValuationError::insufficient("no valuation method produced a value"),
        });
    }

    let values: Vec<f64> = candidates.iter().map(|(_, v)| *v).collect();
    let minimum = values.iter().copied().fold(f64::INFINITY, f64::min);
    let maximum = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let average = values.iter().sum::<f64>() / values.len() as f64;

    let mut methods: Vec<ValuationMethod> = Vec::with_capacity(candidates.len());
    for (method, _) in &candidates {
        if !methods.contains(method) {
            methods.push(*method);
        }
    }

    let confidence = if methods.len() >= HIGH_CONFIDENCE_METHODS {
        Confidence::High
    } else {
        Confidence::Medium
    };

    tracing::debug!(
        minimum,
        maximum,
        average,
        methods = methods.len(),
        %confidence,
        "Aggregated fair value range"
    );

    Ok(FairValueRange {
        minimum,
        maximum,
        average,
        methods,
        valuation_methods: values.len(),
        confidence,
        peer_percentiles: percentiles.cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcf::DcfAssumptions;
    use crate::peers::PeerMetric;

    fn dcf_result(value_per_share: f64) -> DcfResult {
        DcfResult {
            value_per_share,
            enterprise_value: value_per_share,
            equity_value: value_per_share,
            free_cash_flow: 0.0,
            projected_cash_flows: Vec::new(),
            present_value_of_cash_flows: 0.0,
            terminal_value: 0.0,
            current_price: None,
            upside_fraction: None,
            assumptions: DcfAssumptions::default(),
        }
    }

    fn estimate(method: ValuationMethod, value_per_share: f64) -> RatioEstimate {
        RatioEstimate {
            method,
            multiple: 1.0,
            fundamental: value_per_share,
            value_per_share,
        }
    }

    #[test]
    fn test_single_method_medium_confidence() {
        let dcf = dcf_result(42.0);
        let range = aggregate_fair_value(Ok(&dcf), &[], None).unwrap();

        assert_eq!(range.minimum, 42.0);
        assert_eq!(range.maximum, 42.0);
        assert_eq!(range.average, 42.0);
        assert_eq!(range.valuation_methods, 1);
        assert_eq!(range.confidence, Confidence::Medium);
    }

    #[test]
    fn test_three_methods_high_confidence() {
        let dcf = dcf_result(30.0);
        let estimates = [
            estimate(ValuationMethod::PeerPe, 60.0),
            estimate(ValuationMethod::PeerPb, 45.0),
        ];

        let range = aggregate_fair_value(Ok(&dcf), &estimates, None).unwrap();

        assert_eq!(range.minimum, 30.0);
        assert_eq!(range.maximum, 60.0);
        assert_eq!(range.average, 45.0);
        assert_eq!(
            range.methods,
            vec![ValuationMethod::Dcf, ValuationMethod::PeerPe, ValuationMethod::PeerPb]
        );
        assert_eq!(range.confidence, Confidence::High);
    }

    #[test]
    fn test_failed_dcf_omitted() {
        let err = ValuationError::insufficient("no cash flow");
        let estimates = [estimate(ValuationMethod::PeerPe, 50.0)];

        let range = aggregate_fair_value(Err(&err), &estimates, None).unwrap();

        assert_eq!(range.methods, vec![ValuationMethod::PeerPe]);
        assert_eq!(range.confidence, Confidence::Medium);
    }

    #[test]
    fn test_sole_dcf_failure_propagates() {
        let err = ValuationError::invalid_assumption("discount <= growth");
        let result = aggregate_fair_value(Err(&err), &[], None);
        assert_eq!(result.unwrap_err(), err);
    }

    #[test]
    fn test_all_values_unusable_is_insufficient() {
        let err = ValuationError::invalid_assumption("discount <= growth");
        let estimates = [estimate(ValuationMethod::PeerPe, f64::NAN)];
        let result = aggregate_fair_value(Err(&err), &estimates, None);
        assert!(result.unwrap_err().is_insufficient_data());
    }

    #[test]
    fn test_percentiles_carried_through() {
        let dcf = dcf_result(10.0);
        let mut percentiles = PercentileMap::new();
        percentiles.insert(PeerMetric::PeRatio, 25.0);

        let range = aggregate_fair_value(Ok(&dcf), &[], Some(&percentiles)).unwrap();

        assert_eq!(range.peer_percentiles, Some(percentiles));
    }
}
