//! Configuration validation.
//!
//! Each section validates itself; [`Config::validate`] collects every
//! section's failure instead of stopping at the first.

use thiserror::Error;

use crate::config::{
    Config, DcfConfig, IndicatorConfig, LoadNotice, ObservabilityConfig, SensitivityConfig,
    ValuationConfig, MAX_PROJECTION_YEARS,
};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Configuration conflict: {reason}")]
    Conflict { reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    if errors.is_empty() {
        Ok(())
    } else if errors.len() == 1 {
        Err(errors.remove(0))
    } else {
        Err(ValidationError::Multiple(errors))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        reason: reason.into(),
    }
}

impl Config {
    /// Validate the entire configuration.
    pub fn validate(&self) -> ValidationResult<()> {
        let errors = [self.observability.validate(), self.valuation.validate()]
            .into_iter()
            .filter_map(Result::err)
            .collect();
        collect(errors)
    }

    /// Load, apply environment overrides and validate.
    ///
    /// Returns the loading notices alongside the config, to be logged once
    /// logging is initialized.
    pub fn load_and_validate(
        path: Option<&std::path::Path>,
    ) -> anyhow::Result<(Self, Vec<LoadNotice>)> {
        let (config, notices) = Self::load_with_notices(path)?;
        config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok((config, notices))
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(invalid(
                "observability.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.log_format.to_lowercase().as_str()) {
            return Err(invalid(
                "observability.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        Ok(())
    }
}

impl Validate for ValuationConfig {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors: Vec<ValidationError> = [
            self.dcf.validate(),
            self.sensitivity.validate(),
            self.indicators.validate(),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        for (sector, members) in &self.peer_groups {
            if members.iter().any(|m| m.symbol.trim().is_empty()) {
                errors.push(ValidationError::MissingField {
                    field: format!("valuation.peer_groups.{}.symbol", sector),
                });
            }
        }

        collect(errors)
    }
}

impl Validate for DcfConfig {
    fn validate(&self) -> ValidationResult<()> {
        let rates = [
            ("valuation.dcf.default_growth_rate", self.default_growth_rate),
            ("valuation.dcf.default_discount_rate", self.default_discount_rate),
            ("valuation.dcf.risk_free_rate", self.risk_free_rate),
            ("valuation.dcf.market_risk_premium", self.market_risk_premium),
        ];
        for (field, value) in rates {
            if !value.is_finite() {
                return Err(invalid(field, "must be a finite number"));
            }
        }

        if self.default_discount_rate <= self.default_growth_rate {
            return Err(ValidationError::Conflict {
                reason: format!(
                    "valuation.dcf.default_discount_rate ({}) must exceed default_growth_rate ({})",
                    self.default_discount_rate, self.default_growth_rate
                ),
            });
        }

        if self.projection_years == 0 || self.projection_years > MAX_PROJECTION_YEARS {
            return Err(invalid(
                "valuation.dcf.projection_years",
                format!("must be between 1 and {}", MAX_PROJECTION_YEARS),
            ));
        }

        Ok(())
    }
}

impl Validate for SensitivityConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.growth_rates.is_empty() {
            return Err(invalid("valuation.sensitivity.growth_rates", "must not be empty"));
        }
        if self.discount_rates.is_empty() {
            return Err(invalid(
                "valuation.sensitivity.discount_rates",
                "must not be empty",
            ));
        }
        if self
            .growth_rates
            .iter()
            .chain(&self.discount_rates)
            .any(|r| !r.is_finite())
        {
            return Err(invalid("valuation.sensitivity", "rates must be finite"));
        }
        Ok(())
    }
}

impl Validate for IndicatorConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.rsi_period == 0 {
            return Err(invalid("valuation.indicators.rsi_period", "must be positive"));
        }
        if !(0.0..=100.0).contains(&self.rsi_oversold)
            || !(0.0..=100.0).contains(&self.rsi_overbought)
            || self.rsi_oversold >= self.rsi_overbought
        {
            return Err(ValidationError::Conflict {
                reason: format!(
                    "RSI thresholds must satisfy 0 <= oversold ({}) < overbought ({}) <= 100",
                    self.rsi_oversold, self.rsi_overbought
                ),
            });
        }
        if self.macd_fast == 0 || self.macd_signal == 0 || self.macd_fast >= self.macd_slow {
            return Err(ValidationError::Conflict {
                reason: format!(
                    "MACD spans must satisfy 0 < fast ({}) < slow ({}) and signal ({}) > 0",
                    self.macd_fast, self.macd_slow, self.macd_signal
                ),
            });
        }
        if self.bollinger_window < 2 {
            return Err(invalid(
                "valuation.indicators.bollinger_window",
                "must be at least 2",
            ));
        }
        if !self.bollinger_k.is_finite() || self.bollinger_k <= 0.0 {
            return Err(invalid("valuation.indicators.bollinger_k", "must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PeerGroupMember;

    #[test]
    fn test_valid_default_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.observability.log_level = "verbose".into();
        match config.validate() {
            Err(ValidationError::InvalidValue { field, .. }) => {
                assert_eq!(field, "observability.log_level")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_discount_not_above_growth() {
        let mut config = Config::default();
        config.valuation.dcf.default_discount_rate = 0.05;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::Conflict { .. })
        ));
    }

    #[test]
    fn test_load_and_validate_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("valuation.json");

        std::fs::write(&path, r#"{ "valuation": { "dcf": { "projection_years": 10 } } }"#)
            .unwrap();
        let (config, _) = Config::load_and_validate(Some(&path)).unwrap();
        assert_eq!(config.valuation.dcf.projection_years, 10);

        std::fs::write(&path, r#"{ "valuation": { "dcf": { "projection_years": 1000 } } }"#)
            .unwrap();
        let err = Config::load_and_validate(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("projection_years"));
    }

    #[test]
    fn test_projection_years_bounds() {
        let mut dcf = DcfConfig::default();
        dcf.projection_years = 0;
        assert!(dcf.validate().is_err());

        dcf.projection_years = MAX_PROJECTION_YEARS;
        assert!(dcf.validate().is_ok());

        dcf.projection_years = u32::MAX;
        match dcf.validate() {
            Err(ValidationError::InvalidValue { field, .. }) => {
                assert_eq!(field, "valuation.dcf.projection_years")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_indicator_conflicts() {
        let mut indicators = IndicatorConfig::default();
        indicators.rsi_oversold = 80.0;
        assert!(indicators.validate().is_err());

        let mut indicators = IndicatorConfig::default();
        indicators.macd_fast = 30;
        assert!(indicators.validate().is_err());

        let mut indicators = IndicatorConfig::default();
        indicators.bollinger_window = 1;
        assert!(indicators.validate().is_err());
    }

    #[test]
    fn test_multiple_errors_collected() {
        let mut config = Config::default();
        config.observability.log_format = "xml".into();
        config.valuation.sensitivity.growth_rates.clear();
        config.valuation.peer_groups.insert(
            "Energy".into(),
            vec![PeerGroupMember {
                symbol: " ".into(),
                name: String::new(),
            }],
        );

        match config.validate() {
            Err(ValidationError::Multiple(errors)) => {
                assert_eq!(errors.len(), 2);
                assert!(matches!(errors[1], ValidationError::Multiple(ref inner) if inner.len() == 2));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
