//! Perpetual-swap instrument identifiers.
//!
//! Instruments are identified by their coin symbol (e.g. "BTC"); the
//! exchange-facing identifier is the `<COIN>/USDT:USDT` perpetual-swap
//! form derived from it.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quote and settlement currency for all supported swaps.
const QUOTE: &str = "USDT";

/// A USDT-margined perpetual-swap instrument, identified by coin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instrument(String);

impl Instrument {
    /// Create an instrument from a coin symbol.
    ///
    /// Accepts "BTC", "btc" or a full "BTC/USDT:USDT" swap symbol;
    /// the coin is stored uppercased.
    pub fn new(symbol: &str) -> Result<Self> {
        let coin = symbol
            .split('/')
            .next()
            .unwrap_or(symbol)
            .trim()
            .to_uppercase();

        if coin.is_empty() || !coin.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CoreError::InvalidInstrument(symbol.to_string()));
        }

        Ok(Self(coin))
    }

    /// The bare coin symbol, e.g. "BTC".
    pub fn coin(&self) -> &str {
        &self.0
    }

    /// The `<COIN>/USDT:USDT` perpetual-swap identifier the exchange
    /// client consumes.
    pub fn swap_symbol(&self) -> String {
        format!("{}/{}:{}", self.0, QUOTE, QUOTE)
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Instrument {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}
