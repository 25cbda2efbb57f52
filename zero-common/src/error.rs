//! Error types shared by the valuation services.

use thiserror::Error;

/// Result type alias using the shared error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading configuration and input files.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an error with additional context.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Check if this error, or the error it wraps, is a missing resource.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
            Self::WithContext { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to any error type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_with_context() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::from(io).with_context("loading valuation.json");
        assert!(matches!(err, Error::WithContext { .. }));
        assert_eq!(err.to_string(), "loading valuation.json: IO error: denied");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_through_context() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let result: std::result::Result<(), std::io::Error> = Err(io);
        let err = result.context("reading snapshot").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_json_error_converts() {
        let parsed: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err = parsed.context("parsing").unwrap_err();
        assert!(err.to_string().starts_with("parsing: JSON error"));
    }
}
