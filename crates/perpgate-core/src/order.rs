//! Order-related enums.
//!
//! Provides order side, type, position-side, margin-mode and
//! account position-mode types for the gateway.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account configuration value the exchange reports for hedge mode.
pub const HEDGE_MODE_VALUE: &str = "long_short_mode";

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Market order.
    Market,
    /// Limit order. Must carry a price.
    Limit,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "market"),
            Self::Limit => write!(f, "limit"),
        }
    }
}

/// Position-side tag carried on an intent.
///
/// Closed three-way variant rather than an optional string so that
/// hedge/net-mode branching is exhaustive. `Unset` is what a net-mode
/// caller supplies; in hedge mode an order must name the leg it affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
    #[default]
    Unset,
}

impl PositionSide {
    /// True for `Long` and `Short`, false for `Unset`.
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
            Self::Unset => write!(f, "unset"),
        }
    }
}

/// Margin mode for an order or position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginMode {
    #[default]
    Cross,
    Isolated,
}

impl fmt::Display for MarginMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cross => write!(f, "cross"),
            Self::Isolated => write!(f, "isolated"),
        }
    }
}

/// Account-level position mode.
///
/// Hedge mode tracks long and short exposure on the same instrument as
/// separate legs; net mode nets them into one position. Resolved from
/// account configuration per call path, never cached across trading
/// decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionMode {
    Hedge,
    Net,
}

impl PositionMode {
    /// Map the exchange's account-config string to a mode.
    ///
    /// The hedge-mode value is the literal `"long_short_mode"`; any
    /// other value implies net mode.
    pub fn from_exchange_value(value: &str) -> Self {
        if value == HEDGE_MODE_VALUE {
            Self::Hedge
        } else {
            Self::Net
        }
    }

    pub fn is_hedge(&self) -> bool {
        matches!(self, Self::Hedge)
    }
}

impl fmt::Display for PositionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hedge => write!(f, "hedge"),
            Self::Net => write!(f, "net"),
        }
    }
}

/// Client order ID for idempotency.
///
/// Every submission carries a unique ID so a retried request cannot be
/// double-filled by the exchange. Alphanumeric, under the exchange's
/// 32-character limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientOrderId(String);

impl ClientOrderId {
    /// Create a new unique client order ID.
    ///
    /// Format: `pg{timestamp_ms}{uuid_short}`
    pub fn new() -> Self {
        let ts = chrono::Utc::now().timestamp_millis();
        let uuid_short: String = uuid::Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(8)
            .collect();
        Self(format!("pg{ts}{uuid_short}"))
    }

    /// Create from an existing string (for parsing responses).
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClientOrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite() {
        assert_eq!(OrderSide::Buy.opposite(), OrderSide::Sell);
        assert_eq!(OrderSide::Sell.opposite(), OrderSide::Buy);
    }

    #[test]
    fn test_position_side_default_unset() {
        assert_eq!(PositionSide::default(), PositionSide::Unset);
        assert!(!PositionSide::Unset.is_set());
        assert!(PositionSide::Long.is_set());
        assert!(PositionSide::Short.is_set());
    }

    #[test]
    fn test_position_mode_from_exchange_value() {
        assert_eq!(
            PositionMode::from_exchange_value("long_short_mode"),
            PositionMode::Hedge
        );
        assert_eq!(
            PositionMode::from_exchange_value("net_mode"),
            PositionMode::Net
        );
        // Anything unrecognized implies net mode.
        assert_eq!(PositionMode::from_exchange_value(""), PositionMode::Net);
    }

    #[test]
    fn test_margin_mode_default_cross() {
        assert_eq!(MarginMode::default(), MarginMode::Cross);
    }

    #[test]
    fn test_client_order_id_unique_and_bounded() {
        let a = ClientOrderId::new();
        let b = ClientOrderId::new();
        assert_ne!(a, b);
        assert!(a.as_str().len() <= 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&OrderSide::Buy).unwrap(), "\"buy\"");
        assert_eq!(
            serde_json::to_string(&MarginMode::Isolated).unwrap(),
            "\"isolated\""
        );
        assert_eq!(
            serde_json::from_str::<PositionSide>("\"short\"").unwrap(),
            PositionSide::Short
        );
    }
}
