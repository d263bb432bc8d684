//! Position crate error types.

use perpgate_exchange::ExchangeError;
use perpgate_executor::ExecutorError;
use thiserror::Error;

/// Errors that abort an unwind before any close is dispatched.
///
/// Per-position close failures are NOT errors at this level; they are
/// recorded in the unwind report's outcomes.
#[derive(Debug, Error)]
pub enum PositionError {
    /// The position fetch itself failed.
    #[error("Failed to fetch open positions: {0}")]
    PositionFetch(#[source] ExchangeError),

    /// Position-mode resolution failed.
    #[error("Failed to resolve position mode: {0}")]
    ModeResolution(#[source] ExecutorError),
}

pub type PositionResult<T> = Result<T, PositionError>;
