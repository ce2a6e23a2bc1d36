//! Domain error model.

use thiserror::Error;

/// Result type used across the domain and service layers.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is recoverable: a failed operation leaves all stores in the
/// state they were in before the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Bad input (negative quantity, non-positive amount, out-of-order timestamp, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The requested material type is not in the store.
    #[error("not found: {0}")]
    NotFound(String),

    /// A forecast was requested for a material type the store has never seen.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A shared lock was poisoned by a panicking writer.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable machine-readable code, used by boundary layers.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation_error",
            DomainError::NotFound(_) => "not_found",
            DomainError::InsufficientData(_) => "insufficient_data",
            DomainError::InvalidId(_) => "invalid_id",
            DomainError::Internal(_) => "internal_error",
        }
    }
}
