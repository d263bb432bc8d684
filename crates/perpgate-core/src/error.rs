//! Error types for perpgate-core.

use thiserror::Error;

/// Core error types.
///
/// Validation errors are raised before any network call is attempted
/// and are never retried.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Limit order requires a price")]
    MissingPrice,

    #[error("Market order price must be omitted or positive, got: {0}")]
    InvalidPrice(String),

    #[error("Hedge-mode order requires a position side (long or short)")]
    MissingPositionSide,

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid instrument: {0}")]
    InvalidInstrument(String),

    #[error("Decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
