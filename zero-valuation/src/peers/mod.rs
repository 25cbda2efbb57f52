//! Peer Percentile Ranker.
//!
//! Places a company's valuation multiples within its peer group and derives
//! per-share estimates from the peer group's average multiples.
//!
//! Percentile semantics: the subject value is inserted into the eligible peer
//! values, the combined list is sorted ascending and the percentile is the
//! index of the subject's first occurrence divided by the list length. Ties
//! therefore rank the subject at the lowest tied position.

pub mod directory;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::aggregate::ValuationMethod;
use crate::error::{Result, ValuationError};

pub use directory::{PeerDirectory, PeerEntry};

// ============================================================================
// Metrics
// ============================================================================

/// Multiples and return ratios compared across peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerMetric {
    PeRatio,
    PbRatio,
    PsRatio,
    EvEbitda,
    Roe,
    Roa,
}

impl PeerMetric {
    /// Every compared metric.
    pub const ALL: [PeerMetric; 6] = [
        Self::PeRatio,
        Self::PbRatio,
        Self::PsRatio,
        Self::EvEbitda,
        Self::Roe,
        Self::Roa,
    ];

    /// Wire name of the metric.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PeRatio => "pe_ratio",
            Self::PbRatio => "pb_ratio",
            Self::PsRatio => "ps_ratio",
            Self::EvEbitda => "ev_ebitda",
            Self::Roe => "roe",
            Self::Roa => "roa",
        }
    }
}

impl std::fmt::Display for PeerMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One company's metric values, any of which may be unreported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeerMetricRecord {
    /// Ticker or other identifier
    pub identifier: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Metric values
    #[serde(default)]
    pub metrics: BTreeMap<PeerMetric, Option<f64>>,
}

impl PeerMetricRecord {
    /// Create a record with no metrics.
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            metrics: BTreeMap::new(),
        }
    }

    /// Set a metric value.
    pub fn with_metric(mut self, metric: PeerMetric, value: impl Into<Option<f64>>) -> Self {
        self.metrics.insert(metric, value.into());
        self
    }

    /// Value of a metric, absent when unreported.
    pub fn get(&self, metric: PeerMetric) -> Option<f64> {
        self.metrics.get(&metric).copied().flatten()
    }
}

/// Metric to percentile rank (0-100) of the subject among its peers.
pub type PercentileMap = BTreeMap<PeerMetric, f64>;

// ============================================================================
// Percentiles
// ============================================================================

/// Peer values usable for a metric: present, finite and strictly positive.
pub fn eligible_values(peers: &[PeerMetricRecord], metric: PeerMetric) -> Vec<f64> {
    peers
        .iter()
        .filter_map(|peer| peer.get(metric))
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect()
}

/// Rank `subject` within `subject + peer_values`, as a 0-100 percentile.
///
/// Returns 0 when there are no peer values.
pub fn percentile_rank(subject: f64, peer_values: &[f64]) -> f64 {
    let mut values = Vec::with_capacity(peer_values.len() + 1);
    values.extend_from_slice(peer_values);
    values.push(subject);
    values.sort_by(f64::total_cmp);

    let index = values.partition_point(|v| *v < subject);
    index as f64 / values.len() as f64 * 100.0
}

/// Compute the subject's percentile for every metric it shares with its peers.
///
/// A metric gets no entry when the subject value is missing or non-finite, or
/// when no peer has an eligible value for it.
///
/// # Errors
///
/// `DegenerateInput` when `peers` is empty.
pub fn compute_percentiles(
    subject: &PeerMetricRecord,
    peers: &[PeerMetricRecord],
) -> Result<PercentileMap> {
    if peers.is_empty() {
        return Err(ValuationError::degenerate(format!(
            "no peers to compare {} against",
            subject.identifier
        )));
    }

    let mut percentiles = PercentileMap::new();
    for metric in PeerMetric::ALL {
        let Some(value) = subject.get(metric).filter(|v| v.is_finite()) else {
            continue;
        };

        let peer_values = eligible_values(peers, metric);
        if peer_values.is_empty() {
            continue;
        }

        percentiles.insert(metric, percentile_rank(value, &peer_values));
    }

    tracing::debug!(
        subject = %subject.identifier,
        peers = peers.len(),
        metrics = percentiles.len(),
        "Computed peer percentiles"
    );

    Ok(percentiles)
}

/// Mean of the eligible peer values for a metric.
pub fn peer_average(peers: &[PeerMetricRecord], metric: PeerMetric) -> Option<f64> {
    let values = eligible_values(peers, metric);
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

// ============================================================================
// Peer-implied estimates
// ============================================================================

/// Per-share fundamentals a peer multiple can be applied to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerShareFundamentals {
    /// Trailing earnings per share
    pub eps: Option<f64>,
    /// Book value per share
    pub book_value_per_share: Option<f64>,
    /// Revenue per share
    pub sales_per_share: Option<f64>,
}

/// Per-share valuation from a single method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioEstimate {
    pub method: ValuationMethod,
    /// Peer-average multiple applied
    pub multiple: f64,
    /// Subject fundamental the multiple was applied to
    pub fundamental: f64,
    pub value_per_share: f64,
}

/// Estimate value per share from peer-average P/E, P/B and P/S.
///
/// An estimate is produced only when the peer average exists and the matching
/// per-share fundamental is present and positive.
pub fn peer_implied_estimates(
    peers: &[PeerMetricRecord],
    per_share: &PerShareFundamentals,
) -> Vec<RatioEstimate> {
    let pairs = [
        (PeerMetric::PeRatio, ValuationMethod::PeerPe, per_share.eps),
        (
            PeerMetric::PbRatio,
            ValuationMethod::PeerPb,
            per_share.book_value_per_share,
        ),
        (
            PeerMetric::PsRatio,
            ValuationMethod::PeerPs,
            per_share.sales_per_share,
        ),
    ];

    pairs
        .into_iter()
        .filter_map(|(metric, method, fundamental)| {
            let fundamental = fundamental.filter(|v| v.is_finite() && *v > 0.0)?;
            let multiple = peer_average(peers, metric)?;
            Some(RatioEstimate {
                method,
                multiple,
                fundamental,
                value_per_share: multiple * fundamental,
            })
        })
        .collect()
}

// ============================================================================
// Comparison bundle
// ============================================================================

/// Subject metrics, peer records and the resulting percentiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerComparison {
    pub subject: PeerMetricRecord,
    pub peers: Vec<PeerMetricRecord>,
    pub percentiles: PercentileMap,
    /// Mean of eligible peer values per metric
    pub peer_averages: BTreeMap<PeerMetric, f64>,
}

impl PeerComparison {
    /// Rank the subject against its peers.
    pub fn build(subject: PeerMetricRecord, peers: Vec<PeerMetricRecord>) -> Result<Self> {
        let percentiles = compute_percentiles(&subject, &peers)?;
        let peer_averages = PeerMetric::ALL
            .into_iter()
            .filter_map(|metric| peer_average(&peers, metric).map(|avg| (metric, avg)))
            .collect();

        Ok(Self {
            subject,
            peers,
            percentiles,
            peer_averages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(id: &str, pe: Option<f64>) -> PeerMetricRecord {
        PeerMetricRecord::new(id, id).with_metric(PeerMetric::PeRatio, pe)
    }

    #[test]
    fn test_percentile_example() {
        let subject = peer("SUBJ", Some(10.0));
        let peers = vec![peer("A", Some(5.0)), peer("B", Some(15.0)), peer("C", Some(20.0))];

        let map = compute_percentiles(&subject, &peers).unwrap();

        assert_eq!(map.get(&PeerMetric::PeRatio), Some(&25.0));
    }

    #[test]
    fn test_empty_peers_is_degenerate() {
        let err = compute_percentiles(&peer("SUBJ", Some(10.0)), &[]).unwrap_err();
        assert!(matches!(err, ValuationError::DegenerateInput(_)));
    }

    #[test]
    fn test_ineligible_peer_values_excluded_per_metric() {
        let subject = PeerMetricRecord::new("SUBJ", "Subject")
            .with_metric(PeerMetric::PeRatio, 10.0)
            .with_metric(PeerMetric::PbRatio, 2.0);

        // A has a negative P/E but a valid P/B; B lacks P/B entirely
        let peers = vec![
            PeerMetricRecord::new("A", "A")
                .with_metric(PeerMetric::PeRatio, -4.0)
                .with_metric(PeerMetric::PbRatio, 1.0),
            PeerMetricRecord::new("B", "B").with_metric(PeerMetric::PeRatio, 20.0),
            PeerMetricRecord::new("C", "C")
                .with_metric(PeerMetric::PeRatio, 0.0)
                .with_metric(PeerMetric::PbRatio, 3.0),
        ];

        let map = compute_percentiles(&subject, &peers).unwrap();

        // P/E: only B is eligible -> [10, 20] -> index 0 of 2
        assert_eq!(map[&PeerMetric::PeRatio], 0.0);
        // P/B: A and C eligible -> [1, 2, 3] -> index 1 of 3
        assert!((map[&PeerMetric::PbRatio] - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_metric_without_eligible_peers_is_absent() {
        let subject = PeerMetricRecord::new("SUBJ", "Subject")
            .with_metric(PeerMetric::PeRatio, 10.0)
            .with_metric(PeerMetric::Roe, 0.2);
        let peers = vec![peer("A", Some(12.0)), peer("B", None)];

        let map = compute_percentiles(&subject, &peers).unwrap();

        assert!(map.contains_key(&PeerMetric::PeRatio));
        assert!(!map.contains_key(&PeerMetric::Roe));
    }

    #[test]
    fn test_missing_subject_value_is_absent() {
        let subject = PeerMetricRecord::new("SUBJ", "Subject")
            .with_metric(PeerMetric::PeRatio, f64::NAN);
        let map = compute_percentiles(&subject, &[peer("A", Some(12.0))]).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_ties_rank_at_first_occurrence() {
        assert_eq!(percentile_rank(10.0, &[10.0, 10.0, 30.0]), 0.0);
        assert_eq!(percentile_rank(10.0, &[5.0, 10.0, 30.0]), 25.0);
        // Highest value never reaches 100
        assert_eq!(percentile_rank(50.0, &[5.0, 10.0, 30.0]), 75.0);
    }

    #[test]
    fn test_negative_subject_still_ranked() {
        let map = compute_percentiles(&peer("SUBJ", Some(-3.0)), &[peer("A", Some(8.0))]).unwrap();
        assert_eq!(map[&PeerMetric::PeRatio], 0.0);
    }

    #[test]
    fn test_peer_implied_estimates() {
        let peers = vec![
            PeerMetricRecord::new("A", "A")
                .with_metric(PeerMetric::PeRatio, 10.0)
                .with_metric(PeerMetric::PbRatio, 2.0),
            PeerMetricRecord::new("B", "B")
                .with_metric(PeerMetric::PeRatio, 20.0)
                .with_metric(PeerMetric::PbRatio, -1.0),
        ];
        let per_share = PerShareFundamentals {
            eps: Some(3.0),
            book_value_per_share: Some(10.0),
            sales_per_share: Some(5.0),
        };

        let estimates = peer_implied_estimates(&peers, &per_share);

        // No peer P/S, so only P/E and P/B
        assert_eq!(estimates.len(), 2);
        assert_eq!(estimates[0].method, ValuationMethod::PeerPe);
        assert_eq!(estimates[0].value_per_share, 45.0);
        assert_eq!(estimates[1].method, ValuationMethod::PeerPb);
        assert_eq!(estimates[1].value_per_share, 20.0);
    }

    #[test]
    fn test_negative_eps_yields_no_pe_estimate() {
        let peers = vec![peer("A", Some(15.0))];
        let per_share = PerShareFundamentals {
            eps: Some(-2.0),
            ..Default::default()
        };
        assert!(peer_implied_estimates(&peers, &per_share).is_empty());
    }

    #[test]
    fn test_comparison_bundle() {
        let comparison = PeerComparison::build(
            peer("SUBJ", Some(10.0)),
            vec![peer("A", Some(5.0)), peer("B", Some(15.0)), peer("C", Some(20.0))],
        )
        .unwrap();

        assert_eq!(comparison.percentiles[&PeerMetric::PeRatio], 25.0);
        assert!((comparison.peer_averages[&PeerMetric::PeRatio] - 40.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_metric_names_serialize_snake_case() {
        let json = serde_json::to_string(&PeerMetric::EvEbitda).unwrap();
        assert_eq!(json, "\"ev_ebitda\"");
        assert_eq!(PeerMetric::PeRatio.to_string(), "pe_ratio");
    }
}
