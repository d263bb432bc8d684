//! Raw wire types for the OKX-style v5 REST API.
//!
//! The exchange reports every number as a string; parsing into the
//! core decimal types happens here, at the edge, so nothing above this
//! layer handles raw strings.

use crate::error::{ExchangeError, ExchangeResult};
use perpgate_core::{
    Contracts, Instrument, MarginMode, OpenPosition, PositionDirection, PositionMode,
};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Standard v5 response envelope: `{"code":"0","msg":"","data":[...]}`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> Envelope<T> {
    /// Fail unless the envelope code is "0".
    pub fn into_data(self) -> ExchangeResult<Vec<T>> {
        if self.code != "0" {
            return Err(ExchangeError::from_payload(&self.code, &self.msg));
        }
        Ok(self.data)
    }
}

/// Raw ticker entry from `/api/v5/market/tickers`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTicker {
    #[serde(rename = "instId")]
    pub inst_id: String,
    /// Last traded price as string.
    pub last: String,
}

/// Raw position entry from `/api/v5/account/positions`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPosition {
    #[serde(rename = "instId")]
    pub inst_id: String,
    /// "long" / "short" in hedge mode, "net" in net mode.
    #[serde(rename = "posSide", default)]
    pub pos_side: String,
    /// Contract count. Negative for net-mode shorts.
    #[serde(default)]
    pub pos: String,
    #[serde(rename = "notionalUsd", default)]
    pub notional_usd: String,
    #[serde(default)]
    pub lever: String,
    /// Unrealized PnL.
    #[serde(default)]
    pub upl: String,
    /// "cross" / "isolated".
    #[serde(rename = "mgnMode", default)]
    pub mgn_mode: String,
}

impl RawPosition {
    /// Convert into a core snapshot.
    ///
    /// Returns `None` for flat entries (zero contracts), which the
    /// exchange sometimes includes after a close.
    pub fn into_open_position(self) -> ExchangeResult<Option<OpenPosition>> {
        let pos = parse_decimal_or_zero(&self.pos)?;
        if pos.is_zero() {
            return Ok(None);
        }

        let direction = match self.pos_side.as_str() {
            "long" => PositionDirection::Long,
            "short" => PositionDirection::Short,
            // Net mode: direction comes from the sign of the count.
            _ if pos.is_sign_negative() => PositionDirection::Short,
            _ => PositionDirection::Long,
        };

        let instrument = Instrument::new(coin_of_inst_id(&self.inst_id))
            .map_err(|e| ExchangeError::Decode(e.to_string()))?;

        let margin_mode = match self.mgn_mode.as_str() {
            "cross" => Some(MarginMode::Cross),
            "isolated" => Some(MarginMode::Isolated),
            _ => None,
        };

        Ok(Some(OpenPosition {
            instrument,
            direction,
            contracts: Contracts::new(pos.abs()),
            notional: parse_decimal_or_zero(&self.notional_usd)?,
            leverage: parse_decimal_or_zero(&self.lever)?,
            unrealized_pnl: parse_decimal_or_zero(&self.upl)?,
            margin_mode,
        }))
    }
}

/// Raw account configuration from `/api/v5/account/config`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAccountConfig {
    #[serde(rename = "posMode", default)]
    pub pos_mode: String,
}

/// Account configuration the gateway depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountConfig {
    /// Raw position-mode string as reported by the exchange.
    pub position_mode: String,
}

impl AccountConfig {
    pub fn new(position_mode: impl Into<String>) -> Self {
        Self {
            position_mode: position_mode.into(),
        }
    }

    /// Hedge iff the raw value is `"long_short_mode"`.
    pub fn mode(&self) -> PositionMode {
        PositionMode::from_exchange_value(&self.position_mode)
    }
}

impl From<RawAccountConfig> for AccountConfig {
    fn from(raw: RawAccountConfig) -> Self {
        Self {
            position_mode: raw.pos_mode,
        }
    }
}

/// Raw per-order acknowledgment from `/api/v5/trade/order` (POST).
#[derive(Debug, Clone, Deserialize)]
pub struct RawOrderAck {
    #[serde(rename = "ordId", default)]
    pub ord_id: String,
    #[serde(rename = "sCode", default)]
    pub s_code: String,
    #[serde(rename = "sMsg", default)]
    pub s_msg: String,
}

/// Raw order detail from `/api/v5/trade/order` (GET).
#[derive(Debug, Clone, Deserialize)]
pub struct RawOrderDetail {
    #[serde(rename = "ordId", default)]
    pub ord_id: String,
    /// Accumulated filled size, contract units.
    #[serde(rename = "accFillSz", default)]
    pub acc_fill_sz: String,
    /// Average fill price.
    #[serde(rename = "avgPx", default)]
    pub avg_px: String,
}

/// The coin component of an instrument ID like "BTC-USDT-SWAP".
pub fn coin_of_inst_id(inst_id: &str) -> &str {
    inst_id.split('-').next().unwrap_or(inst_id)
}

/// Parse a string decimal field, treating the empty string the
/// exchange uses for "not applicable" as zero.
pub fn parse_decimal_or_zero(s: &str) -> ExchangeResult<Decimal> {
    if s.is_empty() {
        return Ok(Decimal::ZERO);
    }
    s.parse()
        .map_err(|e: rust_decimal::Error| ExchangeError::Decode(format!("bad decimal {s:?}: {e}")))
}
