//! Trading intents.
//!
//! A `TradingIntent` is the abstract order description handed down by
//! the decision layer: what to trade, which way, and how much. The
//! coordinator translates it into exchange-specific parameters; the
//! intent itself is exchange-agnostic.

use crate::decimal::{Contracts, Price};
use crate::error::{CoreError, Result};
use crate::instrument::Instrument;
use crate::order::{MarginMode, OrderSide, OrderType, PositionSide};
use serde::{Deserialize, Serialize};

/// An abstract order the gateway should execute.
///
/// Quantity is always in the exchange's native contract units. The
/// gateway performs no unit conversion; base-currency or notional
/// conversion is the responsibility of whoever constructs the intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingIntent {
    /// Instrument to trade.
    pub instrument: Instrument,
    /// Buy or sell.
    pub side: OrderSide,
    /// Market or limit.
    pub order_type: OrderType,
    /// Order size in contract units.
    pub quantity: Contracts,
    /// Limit price. Required iff `order_type` is `Limit`.
    pub price: Option<Price>,
    /// Which leg the order affects. Required in hedge mode, ignored in net mode.
    #[serde(default)]
    pub position_side: PositionSide,
    /// Whether the order may only shrink existing exposure.
    #[serde(default)]
    pub reduce_only: bool,
    /// Margin mode for the order.
    #[serde(default)]
    pub margin_mode: MarginMode,
}

impl TradingIntent {
    /// Create a market-order intent.
    pub fn market(instrument: Instrument, side: OrderSide, quantity: Contracts) -> Self {
        Self {
            instrument,
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
            position_side: PositionSide::Unset,
            reduce_only: false,
            margin_mode: MarginMode::Cross,
        }
    }

    /// Create a limit-order intent.
    pub fn limit(
        instrument: Instrument,
        side: OrderSide,
        quantity: Contracts,
        price: Price,
    ) -> Self {
        Self {
            instrument,
            side,
            order_type: OrderType::Limit,
            quantity,
            price: Some(price),
            position_side: PositionSide::Unset,
            reduce_only: false,
            margin_mode: MarginMode::Cross,
        }
    }

    /// Set the position-side tag.
    #[must_use]
    pub fn with_position_side(mut self, position_side: PositionSide) -> Self {
        self.position_side = position_side;
        self
    }

    /// Set the margin mode.
    #[must_use]
    pub fn with_margin_mode(mut self, margin_mode: MarginMode) -> Self {
        self.margin_mode = margin_mode;
        self
    }

    /// Mark the order reduce-only.
    #[must_use]
    pub fn with_reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = reduce_only;
        self
    }

    /// Validate the intent's internal consistency.
    ///
    /// Limit orders must carry a positive price; market orders must not
    /// require one (a supplied price is tolerated and ignored). Quantity
    /// must be positive. Mode-dependent checks (hedge mode requiring a
    /// position side) live with the coordinator, which knows the mode.
    pub fn validate(&self) -> Result<()> {
        if !self.quantity.is_positive() {
            return Err(CoreError::InvalidQuantity(self.quantity.to_string()));
        }

        match self.order_type {
            OrderType::Limit => match self.price {
                Some(p) if p.is_positive() => Ok(()),
                Some(p) => Err(CoreError::InvalidPrice(p.to_string())),
                None => Err(CoreError::MissingPrice),
            },
            OrderType::Market => Ok(()),
        }
    }
}
