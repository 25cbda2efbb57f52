//! Valuation orchestration.
//!
//! Fetches everything a report needs concurrently, then runs each section on
//! its own. A failed section is recorded in the report and logged; it never
//! stops the others.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::Instrument;
use zero_common::config::{IndicatorConfig, ValuationConfig};
use zero_common::Config;

use crate::aggregate::{aggregate_fair_value, FairValueRange};
use crate::dcf::{compute_dcf, compute_sensitivity, DcfAssumptions, DcfResult, SensitivityMatrix};
use crate::error::{ErrorKind, ValuationError};
use crate::growth::{compute_growth_metrics, GrowthMetrics};
use crate::indicators::{IndicatorEngine, IndicatorParams, IndicatorSnapshot};
use crate::market::{FinancialStatement, PriceSeries};
use crate::peers::{
    peer_implied_estimates, PeerComparison, PeerDirectory, PeerEntry, PeerMetricRecord,
    RatioEstimate,
};
use crate::provider::{CompanyProfile, MarketDataProvider, ProviderError, StatementKind};

// ============================================================================
// Report
// ============================================================================

/// Report sections that can fail independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Indicators,
    Dcf,
    Sensitivity,
    PeerComparison,
    Growth,
    FairValue,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Indicators => write!(f, "indicators"),
            Self::Dcf => write!(f, "dcf"),
            Self::Sensitivity => write!(f, "sensitivity"),
            Self::PeerComparison => write!(f, "peer_comparison"),
            Self::Growth => write!(f, "growth"),
            Self::FairValue => write!(f, "fair_value"),
        }
    }
}

/// A section that could not be produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionError {
    pub section: Section,
    pub kind: ErrorKind,
    pub message: String,
}

/// Full valuation report for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationReport {
    pub symbol: String,
    pub name: String,
    pub sector: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub current_price: Option<f64>,
    pub indicators: Option<IndicatorSnapshot>,
    pub dcf: Option<DcfResult>,
    pub sensitivity: Option<SensitivityMatrix>,
    pub peer_comparison: Option<PeerComparison>,
    pub ratio_estimates: Vec<RatioEstimate>,
    pub growth: Option<GrowthMetrics>,
    pub fair_value: Option<FairValueRange>,
    pub errors: Vec<SectionError>,
}

impl ValuationReport {
    /// Failure recorded for a section, if any.
    pub fn error_for(&self, section: Section) -> Option<&SectionError> {
        self.errors.iter().find(|e| e.section == section)
    }

    /// Whether every enabled section succeeded.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

// ============================================================================
// Service
// ============================================================================

/// Produces [`ValuationReport`]s from a [`MarketDataProvider`].
pub struct ValuationService {
    provider: Arc<dyn MarketDataProvider>,
    config: ValuationConfig,
    directory: PeerDirectory,
    engine: IndicatorEngine,
}

impl ValuationService {
    /// Create a service from the shared configuration.
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: &Config) -> Self {
        let valuation = config.valuation.clone();

        let overrides = valuation.peer_groups.iter().map(|(sector, members)| {
            let entries = members
                .iter()
                .map(|m| PeerEntry::new(m.symbol.clone(), m.name.clone()))
                .collect();
            (sector.clone(), entries)
        });
        let directory = PeerDirectory::builtin().with_groups(overrides);
        let engine = IndicatorEngine::with_params(indicator_params(&valuation.indicators));

        Self {
            provider,
            config: valuation,
            directory,
            engine,
        }
    }

    /// Override the default growth and discount rates.
    pub fn with_rates(mut self, growth_rate: Option<f64>, discount_rate: Option<f64>) -> Self {
        if let Some(g) = growth_rate {
            self.config.dcf.default_growth_rate = g;
        }
        if let Some(d) = discount_rate {
            self.config.dcf.default_discount_rate = d;
            self.config.dcf.use_capm = false;
        }
        self
    }

    /// DCF assumptions for a company.
    ///
    /// Uses CAPM when enabled and the company reports a finite beta.
    pub fn assumptions_for(&self, profile: &CompanyProfile) -> DcfAssumptions {
        let dcf = &self.config.dcf;
        let assumptions = match profile.beta.filter(|b| b.is_finite()) {
            Some(beta) if dcf.use_capm => DcfAssumptions::from_capm(
                dcf.default_growth_rate,
                dcf.risk_free_rate,
                beta,
                dcf.market_risk_premium,
            ),
            _ => DcfAssumptions::new(dcf.default_growth_rate, dcf.default_discount_rate),
        };
        assumptions.with_projection_years(dcf.projection_years)
    }

    /// Build the full report for a symbol.
    ///
    /// Fails only when the company profile cannot be fetched; every other
    /// problem is recorded as a [`SectionError`].
    pub async fn analyze(&self, symbol: &str) -> anyhow::Result<ValuationReport> {
        let span = tracing::info_span!("valuation", symbol = %symbol);
        self.analyze_inner(symbol).instrument(span).await
    }

    async fn analyze_inner(&self, symbol: &str) -> anyhow::Result<ValuationReport> {
        let features = &self.config.features;
        tracing::info!(provider = self.provider.name(), "Starting valuation");

        let (profile, prices, cash_flow, balance_sheet, income_statement) = futures::join!(
            self.provider.profile(symbol),
            self.provider.price_history(symbol),
            self.provider.statement(symbol, StatementKind::CashFlow),
            self.provider.statement(symbol, StatementKind::BalanceSheet),
            self.provider.statement(symbol, StatementKind::IncomeStatement),
        );

        let profile = profile.map_err(|e| {
            anyhow::anyhow!(e).context(format!("Failed to fetch profile for {}", symbol))
        })?;

        let mut errors = Vec::new();
        let mut record = |section: Section, err: ValuationError| {
            tracing::warn!(%section, kind = %err.kind(), error = %err, "Section failed");
            errors.push(SectionError {
                section,
                kind: err.kind(),
                message: err.to_string(),
            });
        };

        // Indicators
        let indicators = if features.technical_indicators_enabled {
            match self.indicator_section(prices) {
                Ok(snapshot) => Some(snapshot),
                Err(err) => {
                    record(Section::Indicators, err);
                    None
                }
            }
        } else {
            None
        };

        // DCF and sensitivity share the statements
        let cash_flow: Result<FinancialStatement, ValuationError> =
            cash_flow.map_err(ValuationError::from);
        let balance_sheet = balance_sheet.unwrap_or_else(|err| {
            tracing::debug!(error = %err, "No balance sheet, assuming zero debt and cash");
            FinancialStatement::default()
        });

        let assumptions = self.assumptions_for(&profile);
        let dcf_outcome: Result<DcfResult, ValuationError> = if features.dcf_enabled {
            cash_flow.clone().and_then(|cf| {
                compute_dcf(
                    &cf,
                    &balance_sheet,
                    profile.shares_outstanding,
                    profile.current_price,
                    &assumptions,
                )
            })
        } else {
            Err(ValuationError::insufficient("DCF valuation disabled"))
        };
        if features.dcf_enabled {
            if let Err(err) = &dcf_outcome {
                record(Section::Dcf, err.clone());
            }
        }

        let sensitivity = if features.sensitivity_enabled {
            let grid = &self.config.sensitivity;
            match cash_flow.and_then(|cf| {
                compute_sensitivity(
                    &cf,
                    &balance_sheet,
                    profile.shares_outstanding,
                    &grid.growth_rates,
                    &grid.discount_rates,
                )
            }) {
                Ok(matrix) => Some(matrix),
                Err(err) => {
                    record(Section::Sensitivity, err);
                    None
                }
            }
        } else {
            None
        };

        // Peers
        let (peer_comparison, ratio_estimates) = if features.peer_comparison_enabled {
            match self.peer_section(&profile).await {
                Ok((comparison, estimates)) => (Some(comparison), estimates),
                Err(err) => {
                    record(Section::PeerComparison, err);
                    (None, Vec::new())
                }
            }
        } else {
            (None, Vec::new())
        };

        // Growth
        let growth = if features.growth_metrics_enabled {
            match income_statement {
                Ok(statement) => {
                    let metrics = compute_growth_metrics(&statement);
                    if metrics.is_empty() {
                        tracing::debug!("Income statement lacks two usable periods");
                    }
                    Some(metrics)
                }
                Err(err) => {
                    record(Section::Growth, err.into());
                    None
                }
            }
        } else {
            None
        };

        // Fair value
        let fair_value = match aggregate_fair_value(
            dcf_outcome.as_ref(),
            &ratio_estimates,
            peer_comparison.as_ref().map(|c| &c.percentiles),
        ) {
            Ok(range) => Some(range),
            Err(err) => {
                record(Section::FairValue, err);
                None
            }
        };

        let report = ValuationReport {
            symbol: profile.symbol.clone(),
            name: profile.name.clone(),
            sector: profile.sector.clone(),
            generated_at: Utc::now(),
            current_price: profile.current_price,
            indicators,
            dcf: dcf_outcome.ok(),
            sensitivity,
            peer_comparison,
            ratio_estimates,
            growth,
            fair_value,
            errors,
        };

        tracing::info!(
            failed_sections = report.errors.len(),
            fair_value = report.fair_value.as_ref().map(|r| r.average),
            "Valuation complete"
        );

        Ok(report)
    }

    fn indicator_section(
        &self,
        prices: Result<Vec<crate::market::PriceBar>, ProviderError>,
    ) -> Result<IndicatorSnapshot, ValuationError> {
        let series = PriceSeries::new(prices?)?;
        if series.is_empty() {
            return Err(ValuationError::insufficient("no price history"));
        }
        if !series.has_positive_close() {
            return Err(ValuationError::degenerate("price history has no positive close"));
        }
        if let Some((first, last)) = series.date_range() {
            tracing::debug!(bars = series.len(), %first, %last, "Computing indicators");
        }
        Ok(self.engine.compute(&series))
    }

    async fn peer_section(
        &self,
        profile: &CompanyProfile,
    ) -> Result<(PeerComparison, Vec<RatioEstimate>), ValuationError> {
        let sector = profile
            .sector
            .as_deref()
            .ok_or_else(|| ValuationError::insufficient("company sector unknown"))?;

        let entries = self.directory.peers_excluding(sector, &profile.symbol);
        tracing::debug!(sector, peers = entries.len(), "Fetching peer metrics");

        let fetches = entries.iter().map(|entry| async move {
            let result = self.provider.peer_metrics(&entry.symbol).await;
            (entry, result)
        });

        let peers: Vec<PeerMetricRecord> = join_all(fetches)
            .await
            .into_iter()
            .filter_map(|(entry, result)| match result {
                Ok(mut record) => {
                    if record.name.is_empty() {
                        record.name = entry.name.clone();
                    }
                    Some(record)
                }
                Err(err) => {
                    tracing::warn!(peer = %entry.symbol, error = %err, "Skipping peer");
                    None
                }
            })
            .collect();

        let estimates = peer_implied_estimates(&peers, &profile.per_share);
        let comparison = PeerComparison::build(profile.metric_record(), peers)?;
        Ok((comparison, estimates))
    }
}

fn indicator_params(config: &IndicatorConfig) -> IndicatorParams {
    IndicatorParams {
        rsi_period: config.rsi_period,
        rsi_overbought: config.rsi_overbought,
        rsi_oversold: config.rsi_oversold,
        macd_fast: config.macd_fast,
        macd_slow: config.macd_slow,
        macd_signal: config.macd_signal,
        bollinger_window: config.bollinger_window,
        bollinger_k: config.bollinger_k,
    }
}
