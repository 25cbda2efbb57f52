//! Zero Common - Shared configuration, validation, errors and logging for the
//! Zero valuation services.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod validation;

pub use config::{
    Config, DcfConfig, FeatureFlags, IndicatorConfig, LoadNotice, ObservabilityConfig,
    PeerGroupMember, SensitivityConfig, ValuationConfig,
};
pub use error::{Error, Result, ResultExt};
pub use validation::{Validate, ValidationError, ValidationResult};
