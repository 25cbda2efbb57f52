//! Error types for the valuation engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using the valuation error type.
pub type Result<T> = std::result::Result<T, ValuationError>;

/// Failure of a single valuation or indicator computation.
///
/// Computations fail independently: callers collect these per section
/// instead of aborting sibling computations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    /// A required statement line, price history or share count is missing or zero
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Assumptions that make the model diverge (discount rate <= growth rate)
    #[error("Invalid assumption: {0}")]
    InvalidAssumption(String),

    /// Input that is present but unusable (empty peer set, all-zero prices, duplicate dates)
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),
}

/// Discriminant of a [`ValuationError`], serialized into reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InsufficientData,
    InvalidAssumption,
    DegenerateInput,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientData => write!(f, "insufficient_data"),
            Self::InvalidAssumption => write!(f, "invalid_assumption"),
            Self::DegenerateInput => write!(f, "degenerate_input"),
        }
    }
}

impl ValuationError {
    /// Create an insufficient-data error.
    pub fn insufficient(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }

    /// Create an invalid-assumption error.
    pub fn invalid_assumption(msg: impl Into<String>) -> Self {
        Self::InvalidAssumption(msg.into())
    }

    /// Create a degenerate-input error.
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateInput(msg.into())
    }

    /// Get the kind of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientData(_) => ErrorKind::InsufficientData,
            Self::InvalidAssumption(_) => ErrorKind::InvalidAssumption,
            Self::DegenerateInput(_) => ErrorKind::DegenerateInput,
        }
    }

    /// Check if this is an insufficient-data error.
    pub const fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData(_))
    }

    /// Check if this is an invalid-assumption error.
    pub const fn is_invalid_assumption(&self) -> bool {
        matches!(self, Self::InvalidAssumption(_))
    }
}
