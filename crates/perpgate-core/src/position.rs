//! Open-position snapshots.
//!
//! An `OpenPosition` is an immutable snapshot produced by the
//! exchange's position query. The gateway only reads it and derives
//! closing intents from it; it never owns or mutates exchange state.

use crate::decimal::Contracts;
use crate::instrument::Instrument;
use crate::order::{MarginMode, OrderSide, PositionSide};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of an existing position.
///
/// Unlike `PositionSide`, an open position always has a direction, so
/// there is no `Unset` here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionDirection {
    Long,
    Short,
}

impl PositionDirection {
    /// The order side that closes a position in this direction.
    pub fn closing_side(&self) -> OrderSide {
        match self {
            Self::Long => OrderSide::Sell,
            Self::Short => OrderSide::Buy,
        }
    }

    /// The position-side tag for orders affecting this leg (hedge mode).
    pub fn as_position_side(&self) -> PositionSide {
        match self {
            Self::Long => PositionSide::Long,
            Self::Short => PositionSide::Short,
        }
    }
}

impl fmt::Display for PositionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
        }
    }
}

/// Snapshot of one open exchange position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    /// Instrument the position is in.
    pub instrument: Instrument,
    /// Long or short.
    pub direction: PositionDirection,
    /// Position size in contract units (always positive).
    pub contracts: Contracts,
    /// Notional USD value.
    pub notional: Decimal,
    /// Leverage multiplier.
    pub leverage: Decimal,
    /// Unrealized profit and loss.
    pub unrealized_pnl: Decimal,
    /// Margin mode the position was opened with, if the exchange
    /// reported one.
    pub margin_mode: Option<MarginMode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closing_side() {
        assert_eq!(PositionDirection::Long.closing_side(), OrderSide::Sell);
        assert_eq!(PositionDirection::Short.closing_side(), OrderSide::Buy);
    }

    #[test]
    fn test_as_position_side() {
        assert_eq!(
            PositionDirection::Long.as_position_side(),
            PositionSide::Long
        );
        assert_eq!(
            PositionDirection::Short.as_position_side(),
            PositionSide::Short
        );
    }
}
