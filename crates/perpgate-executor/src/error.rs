//! Executor error types.

use perpgate_core::CoreError;
use perpgate_exchange::ExchangeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Malformed intent. Raised before any network call, never retried.
    #[error("Validation failed: {0}")]
    Validation(#[from] CoreError),

    /// The exchange call failed; carries the exchange's own error.
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

impl ExecutorError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;
