//! Error types for exprsql

use thiserror::Error;

/// Result type alias for query construction
pub type SqlBuildResult<T> = Result<T, SqlBuildError>;

/// Errors raised while resolving expressions or assembling commands.
///
/// All of them are synchronous failures of the call that triggered them; a
/// failed query-construction attempt should be fixed, not retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlBuildError {
    /// The resolver met an expression shape it has no lowering rule for
    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    /// A builder was requested from a context without a dialect adapter
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A recognized operation received bad arguments
    #[error("Argument error: {0}")]
    Argument(String),

    /// A builder accessor was read under an operation that does not support it
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl SqlBuildError {
    /// Create an unsupported expression error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedExpression(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an argument error
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    /// Create an invalid operation error
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// Check if this is an unsupported expression error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedExpression(_))
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if this is an argument error
    pub fn is_argument(&self) -> bool {
        matches!(self, Self::Argument(_))
    }

    /// Check if this is an invalid operation error
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, Self::InvalidOperation(_))
    }
}

impl From<toml::de::Error> for SqlBuildError {
    fn from(err: toml::de::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}
