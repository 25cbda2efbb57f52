//! Zero Valuation Library
//!
//! Quantitative valuation and technical-indicator engine: per-share DCF value,
//! peer-relative standing of valuation multiples, price-series indicators and
//! a combined fair-value range.
//!
//! # Architecture
//!
//! ```text
//!  price bars ──► market::PriceSeries ──► indicators ──► IndicatorSnapshot
//!  statements ──► market::FinancialStatement ──► dcf ──► DcfResult / SensitivityMatrix
//!  peer records ─────────────────────────────► peers ──► PercentileMap / RatioEstimate
//!  income statement ──────────────────────────► growth ──► GrowthMetrics
//!                                                  │
//!                 DcfResult + RatioEstimate + PercentileMap ──► aggregate ──► FairValueRange
//! ```
//!
//! The engines are pure and synchronous. [`service::ValuationService`] pulls
//! data through a [`provider::MarketDataProvider`] and assembles a
//! [`service::ValuationReport`], isolating failures per section.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod aggregate;
pub mod dcf;
pub mod error;
pub mod growth;
pub mod indicators;
pub mod market;
pub mod peers;
pub mod provider;
pub mod service;

pub use aggregate::{aggregate_fair_value, Confidence, FairValueRange, ValuationMethod};
pub use dcf::{compute_dcf, compute_sensitivity, DcfAssumptions, DcfResult, SensitivityMatrix};
pub use error::{ErrorKind, Result, ValuationError};
pub use growth::{compute_growth_metrics, GrowthMetrics};
pub use indicators::{compute_indicators, IndicatorEngine, IndicatorSnapshot};
pub use market::{FinancialStatement, LineItem, PriceBar, PriceSeries};
pub use peers::{compute_percentiles, PeerMetric, PeerMetricRecord, PercentileMap};
pub use provider::{MarketDataProvider, SnapshotProvider};
pub use service::{ValuationReport, ValuationService};
