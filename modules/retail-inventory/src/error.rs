//! Error taxonomy shared by every ledger component
//!
//! Validation failures and missing rows are caller errors; anything coming
//! out of the driver is an internal failure and is never retried here.

use thiserror::Error;

/// Errors that can occur during inventory ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// True for the recoverable "no such row" class.
    ///
    /// Read enrichment (current price, storage locations) swallows these and
    /// keeps going; primary lookups propagate them.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Stable machine-readable kind, used in HTTP error bodies and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Database(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_recoverable() {
        assert!(LedgerError::not_found("no price for variant 7").is_not_found());
        assert!(!LedgerError::invalid("price must be positive").is_not_found());
        assert!(!LedgerError::Database(sqlx::Error::RowNotFound).is_not_found());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(LedgerError::invalid("x").kind(), "invalid_argument");
        assert_eq!(LedgerError::not_found("x").kind(), "not_found");
        assert_eq!(LedgerError::Conflict("x".into()).kind(), "conflict");
        assert_eq!(LedgerError::Database(sqlx::Error::PoolTimedOut).kind(), "internal");
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::not_found("no price for variant 99");
        assert_eq!(err.to_string(), "Not found: no price for variant 99");
    }
}
