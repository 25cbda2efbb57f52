//! Market data provider abstraction.
//!
//! The valuation core never fetches anything itself. A [`MarketDataProvider`]
//! hands it raw price bars, statements and company profiles in whatever order
//! the source uses; normalization happens in [`crate::market`].
//!
//! [`SnapshotProvider`] serves a JSON [`MarketSnapshot`] from disk or memory,
//! which is what the binary and the integration tests use.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use zero_common::ResultExt;

use crate::error::ValuationError;
use crate::market::{FinancialStatement, PriceBar};
use crate::peers::{PeerMetric, PeerMetricRecord, PerShareFundamentals};

// ============================================================================
// Provider Error
// ============================================================================

/// Errors specific to data providers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// The provider does not know the symbol
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// The symbol is known but the requested data is not
    #[error("Data not available: {0}")]
    DataNotAvailable(String),

    /// Provider is temporarily unavailable
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

impl From<ProviderError> for ValuationError {
    fn from(err: ProviderError) -> Self {
        ValuationError::insufficient(err.to_string())
    }
}

// ============================================================================
// Data Model
// ============================================================================

/// Statement kinds a provider serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    CashFlow,
    BalanceSheet,
    IncomeStatement,
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CashFlow => write!(f, "cash flow"),
            Self::BalanceSheet => write!(f, "balance sheet"),
            Self::IncomeStatement => write!(f, "income statement"),
        }
    }
}

/// Company reference data and quote-derived metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyProfile {
    pub symbol: String,
    pub name: String,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub current_price: Option<f64>,
    pub shares_outstanding: Option<f64>,
    /// Equity beta, used for a CAPM discount rate
    pub beta: Option<f64>,
    pub per_share: PerShareFundamentals,
    /// Valuation multiples and return ratios
    pub metrics: BTreeMap<PeerMetric, Option<f64>>,
}

impl CompanyProfile {
    /// Metrics as a record for peer ranking.
    pub fn metric_record(&self) -> PeerMetricRecord {
        PeerMetricRecord {
            identifier: self.symbol.clone(),
            name: self.name.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

// ============================================================================
// Provider Trait
// ============================================================================

/// Trait for market data sources.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &'static str;

    /// Company profile.
    async fn profile(&self, symbol: &str) -> Result<CompanyProfile, ProviderError>;

    /// Daily price bars, in provider order.
    async fn price_history(&self, symbol: &str) -> Result<Vec<PriceBar>, ProviderError>;

    /// One financial statement.
    async fn statement(
        &self,
        symbol: &str,
        kind: StatementKind,
    ) -> Result<FinancialStatement, ProviderError>;

    /// Metrics for a peer company.
    ///
    /// Default implementation derives them from the peer's profile.
    async fn peer_metrics(&self, symbol: &str) -> Result<PeerMetricRecord, ProviderError> {
        self.profile(symbol).await.map(|p| p.metric_record())
    }
}

// ============================================================================
// Snapshot Provider
// ============================================================================

/// Everything known about one company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanySnapshot {
    pub profile: CompanyProfile,
    #[serde(default)]
    pub prices: Vec<PriceBar>,
    #[serde(default)]
    pub cash_flow: Option<FinancialStatement>,
    #[serde(default)]
    pub balance_sheet: Option<FinancialStatement>,
    #[serde(default)]
    pub income_statement: Option<FinancialStatement>,
}

/// A set of companies keyed by symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub companies: BTreeMap<String, CompanySnapshot>,
}

impl MarketSnapshot {
    /// Add a company, keyed by its profile symbol.
    pub fn with_company(mut self, company: CompanySnapshot) -> Self {
        self.companies
            .insert(company.profile.symbol.to_uppercase(), company);
        self
    }
}

/// Provider backed by an in-memory [`MarketSnapshot`].
///
/// Symbol lookup is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct SnapshotProvider {
    companies: BTreeMap<String, CompanySnapshot>,
}

impl SnapshotProvider {
    /// Wrap a snapshot.
    pub fn new(snapshot: MarketSnapshot) -> Self {
        let companies = snapshot
            .companies
            .into_iter()
            .map(|(symbol, company)| (symbol.to_uppercase(), company))
            .collect();
        Self { companies }
    }

    /// Load a snapshot from a JSON file.
    pub async fn from_file(path: &Path) -> zero_common::Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .context(format!("Failed to read snapshot {}", path.display()))?;
        let snapshot: MarketSnapshot = serde_json::from_str(&content)
            .context(format!("Failed to parse snapshot {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            companies = snapshot.companies.len(),
            "Loaded market snapshot"
        );

        Ok(Self::new(snapshot))
    }

    /// Symbols in the snapshot.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.companies.keys().map(String::as_str)
    }

    fn company(&self, symbol: &str) -> Result<&CompanySnapshot, ProviderError> {
        self.companies
            .get(&symbol.to_uppercase())
            .ok_or_else(|| ProviderError::UnknownSymbol(symbol.to_string()))
    }
}

#[async_trait]
impl MarketDataProvider for SnapshotProvider {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn profile(&self, symbol: &str) -> Result<CompanyProfile, ProviderError> {
        let company = self.company(symbol)?;
        let mut profile = company.profile.clone();
        if profile.symbol.is_empty() {
            profile.symbol = symbol.to_uppercase();
        }
        Ok(profile)
    }

    async fn price_history(&self, symbol: &str) -> Result<Vec<PriceBar>, ProviderError> {
        Ok(self.company(symbol)?.prices.clone())
    }

    async fn statement(
        &self,
        symbol: &str,
        kind: StatementKind,
    ) -> Result<FinancialStatement, ProviderError> {
        let company = self.company(symbol)?;
        let statement = match kind {
            StatementKind::CashFlow => &company.cash_flow,
            StatementKind::BalanceSheet => &company.balance_sheet,
            StatementKind::IncomeStatement => &company.income_statement,
        };
        statement
            .clone()
            .ok_or_else(|| ProviderError::DataNotAvailable(format!("{} for {}", kind, symbol)))
    }
}
