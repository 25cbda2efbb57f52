//! Configuration management for the valuation services.
//!
//! Settings live in `~/.codecoder/valuation.json`. A missing file means
//! defaults for everything; a partial file fills the gaps with defaults.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (ZERO_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `ZERO_LOG_LEVEL` → observability.log_level
//! - `ZERO_LOG_FORMAT` → observability.log_format
//! - `ZERO_VALUATION_GROWTH_RATE` → valuation.dcf.default_growth_rate
//! - `ZERO_VALUATION_DISCOUNT_RATE` → valuation.dcf.default_discount_rate

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Longest accepted DCF projection horizon, in years.
pub const MAX_PROJECTION_YEARS: u32 = 100;

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".codecoder"),
        |dirs| dirs.home_dir().join(".codecoder"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("valuation.json")
}

// ============================================================================
// Root
// ============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Valuation engine configuration
    #[serde(default)]
    pub valuation: ValuationConfig,
}

impl Config {
    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration (explicit path or default) with environment overrides.
    ///
    /// Loading usually happens before logging is initialized, so anything
    /// worth reporting comes back as [`LoadNotice`]s for the caller to log.
    pub fn load_with_notices(path: Option<&Path>) -> Result<(Self, Vec<LoadNotice>)> {
        let mut notices = Vec::new();
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = config_path();
                if path.exists() {
                    Self::load_from(&path)?
                } else {
                    notices.push(LoadNotice::DefaultsUsed { path });
                    Self::default()
                }
            }
        };
        notices.extend(config.apply_overrides_from(|key| std::env::var(key).ok()));
        Ok((config, notices))
    }

    /// Apply overrides from an arbitrary variable source.
    ///
    /// Unparseable numeric values are skipped and reported as notices.
    #[must_use]
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Vec<LoadNotice>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("ZERO_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("ZERO_LOG_FORMAT") {
            self.observability.log_format = format;
        }

        let mut notices = Vec::new();
        let rates = [
            (
                "ZERO_VALUATION_GROWTH_RATE",
                &mut self.valuation.dcf.default_growth_rate,
            ),
            (
                "ZERO_VALUATION_DISCOUNT_RATE",
                &mut self.valuation.dcf.default_discount_rate,
            ),
        ];
        for (key, slot) in rates {
            if let Some(raw) = lookup(key) {
                match raw.trim().parse::<f64>() {
                    Ok(value) => *slot = value,
                    Err(_) => notices.push(LoadNotice::IgnoredOverride {
                        key: key.to_string(),
                        value: raw,
                    }),
                }
            }
        }
        notices
    }
}

/// Something noteworthy that happened while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadNotice {
    /// No file at the default path
    DefaultsUsed { path: PathBuf },
    /// An environment override that is not a number
    IgnoredOverride { key: String, value: String },
}

impl LoadNotice {
    /// Emit the notice as a tracing event.
    pub fn log(&self) {
        match self {
            Self::DefaultsUsed { path } => {
                tracing::info!(path = %path.display(), "Config file not found, using defaults")
            }
            Self::IgnoredOverride { key, value } => {
                tracing::warn!(key = %key, value = %value, "Ignoring unparseable override")
            }
        }
    }
}

// ============================================================================
// Observability
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,

    /// Extra module targets pinned to `warn`
    #[serde(default)]
    pub excluded_targets: Vec<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            excluded_targets: Vec::new(),
        }
    }
}

// ============================================================================
// Valuation
// ============================================================================

/// Valuation engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationConfig {
    #[serde(default)]
    pub dcf: DcfConfig,

    #[serde(default)]
    pub sensitivity: SensitivityConfig,

    #[serde(default)]
    pub indicators: IndicatorConfig,

    #[serde(default)]
    pub features: FeatureFlags,

    /// Sector name to peer companies, replacing the built-in group of the
    /// same sector
    #[serde(default)]
    pub peer_groups: BTreeMap<String, Vec<PeerGroupMember>>,
}

/// DCF defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DcfConfig {
    /// Annual free cash flow growth
    pub default_growth_rate: f64,
    /// Annual discount rate, used unless CAPM is enabled and a beta is known
    pub default_discount_rate: f64,
    /// Derive the discount rate from CAPM when the company reports a beta
    pub use_capm: bool,
    /// CAPM risk-free rate
    pub risk_free_rate: f64,
    /// CAPM market risk premium
    pub market_risk_premium: f64,
    /// Explicit projection horizon in years
    pub projection_years: u32,
}

impl Default for DcfConfig {
    fn default() -> Self {
        Self {
            default_growth_rate: 0.05,
            default_discount_rate: 0.10,
            use_capm: false,
            risk_free_rate: 0.04,
            market_risk_premium: 0.06,
            projection_years: 5,
        }
    }
}

/// Sensitivity grid axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityConfig {
    pub growth_rates: Vec<f64>,
    pub discount_rates: Vec<f64>,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            growth_rates: vec![0.02, 0.05, 0.08, 0.10],
            discount_rates: vec![0.08, 0.10, 0.12, 0.15],
        }
    }
}

/// Technical indicator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_window: usize,
    pub bollinger_k: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_window: 20,
            bollinger_k: 2.0,
        }
    }
}

/// Section toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    #[serde(default = "default_true")]
    pub dcf_enabled: bool,
    #[serde(default = "default_true")]
    pub peer_comparison_enabled: bool,
    #[serde(default = "default_true")]
    pub sensitivity_enabled: bool,
    #[serde(default = "default_true")]
    pub technical_indicators_enabled: bool,
    #[serde(default = "default_true")]
    pub growth_metrics_enabled: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            dcf_enabled: true,
            peer_comparison_enabled: true,
            sensitivity_enabled: true,
            technical_indicators_enabled: true,
            growth_metrics_enabled: true,
        }
    }
}

/// A configured peer company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerGroupMember {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

fn default_true() -> bool {
    true
}
