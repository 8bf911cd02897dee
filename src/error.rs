use thiserror::Error;

use crate::source::SourceError;

/// Errors surfaced by the exchange core.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Unknown currency code or empty update ledger.
    #[error("not found: {0}")]
    NotFound(String),

    /// The external rate source could not be reached or returned unusable data.
    #[error("rate source unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A stored rate cannot be used as a conversion denominator.
    #[error("invalid rate for {0}")]
    InvalidRate(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl From<SourceError> for ExchangeError {
    fn from(err: SourceError) -> Self {
        ExchangeError::ServiceUnavailable(err.to_string())
    }
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;
