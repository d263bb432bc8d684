//! Exchange error taxonomy.
//!
//! Errors keep the exchange's raw code and message so callers can
//! surface them verbatim. Classification matters downstream: auth
//! errors are fatal to a request, rejections are isolated per order,
//! transport errors are transient but never retried here.

use thiserror::Error;

/// Errors from the exchange client.
#[derive(Debug, Clone, Error)]
pub enum ExchangeError {
    /// Credential or environment mismatch. Not retried; the caller
    /// should check API keys and whether they match the
    /// simulated/live environment.
    #[error("Exchange auth error ({code}): {message} (check API credentials and simulated/live environment)")]
    Auth { code: String, message: String },

    /// The exchange declined the request (insufficient margin, invalid
    /// size, etc). Carries the exchange's raw error payload.
    #[error("Exchange rejected request ({code}): {message}")]
    Rejected { code: String, message: String },

    /// Timeout or connection failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("Failed to decode exchange response: {0}")]
    Decode(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// A required credential environment variable is not set.
    #[error("Missing credential: {0} is not set (set PERPGATE_API_KEY, PERPGATE_API_SECRET and PERPGATE_API_PASSPHRASE)")]
    MissingCredential(String),
}

impl ExchangeError {
    /// Classify an exchange error payload by its code.
    ///
    /// OKX reserves the 501xx range for API-key/signature/environment
    /// problems (50101 broker/env mismatch, 50111 invalid key, 50113
    /// invalid sign, ...); everything else is treated as a rejection.
    pub fn from_payload(code: &str, message: &str) -> Self {
        if code.starts_with("501") {
            Self::Auth {
                code: code.to_string(),
                message: message.to_string(),
            }
        } else {
            Self::Rejected {
                code: code.to_string(),
                message: message.to_string(),
            }
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Result type alias for exchange operations.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_code_classification() {
        assert!(ExchangeError::from_payload("50111", "Invalid OK-ACCESS-KEY").is_auth());
        assert!(ExchangeError::from_payload("50113", "Invalid sign").is_auth());
        assert!(!ExchangeError::from_payload("51008", "insufficient balance").is_auth());
    }

    #[test]
    fn test_rejection_keeps_raw_payload() {
        let err = ExchangeError::from_payload("51121", "Order quantity must be a multiple");
        let msg = err.to_string();
        assert!(msg.contains("51121"));
        assert!(msg.contains("Order quantity must be a multiple"));
    }
}
