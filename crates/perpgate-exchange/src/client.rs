//! Exchange client trait.
//!
//! Trait-based abstraction over the exchange's REST surface. This
//! allows:
//! - Dependency injection for testing
//! - Separation of order derivation from transport
//! - Swapping the concrete exchange behind one seam

use crate::error::ExchangeResult;
use crate::types::AccountConfig;
use perpgate_core::{
    ClientOrderId, Contracts, Instrument, MarginMode, OpenPosition, OrderResult, OrderSide,
    OrderType, PositionDirection, Price,
};
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Exchange-facing order parameters, fully derived by the coordinator.
///
/// This is the exact shape submitted to the exchange: `position_side`
/// is `None` in net mode (sending one there is itself an error class
/// the exchange rejects), `Some` in hedge mode. Quantity is in
/// contract units, untouched by any conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    /// Perpetual-swap symbol, `<COIN>/USDT:USDT` form.
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    /// Contract units, passed through exactly as the intent carried them.
    pub quantity: Contracts,
    /// Limit price; `None` for market orders.
    pub price: Option<Price>,
    /// Hedge-mode leg tag; must be `None` in net mode.
    pub position_side: Option<PositionDirection>,
    pub reduce_only: bool,
    pub margin_mode: MarginMode,
    /// Idempotency tag attached to the exchange submission.
    pub client_order_id: ClientOrderId,
}

impl OrderRequest {
    /// Coin component of the symbol ("BTC" from "BTC/USDT:USDT").
    pub fn coin(&self) -> &str {
        self.symbol.split('/').next().unwrap_or(&self.symbol)
    }
}

/// Async interface to the exchange's REST surface.
///
/// Every method is one network round-trip; implementations carry their
/// own transport timeout. The mock in [`crate::mock`] implements this
/// for tests.
pub trait ExchangeClient: Send + Sync {
    /// Fetch last prices for the given instruments, keyed by coin.
    fn fetch_tickers<'a>(
        &'a self,
        instruments: &'a [Instrument],
    ) -> BoxFuture<'a, ExchangeResult<HashMap<String, Price>>>;

    /// Fetch all open positions.
    fn fetch_positions(&self) -> BoxFuture<'_, ExchangeResult<Vec<OpenPosition>>>;

    /// Fetch account configuration (position mode).
    fn fetch_account_config(&self) -> BoxFuture<'_, ExchangeResult<AccountConfig>>;

    /// Submit one order and report the exchange's authoritative fill.
    fn create_order(&self, request: OrderRequest) -> BoxFuture<'_, ExchangeResult<OrderResult>>;
}

/// Arc wrapper for ExchangeClient trait objects.
pub type DynExchangeClient = Arc<dyn ExchangeClient>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_request_coin() {
        let request = OrderRequest {
            symbol: "BTC/USDT:USDT".to_string(),
            side: OrderSide::Buy,
            order_type: OrderType::Market,
            quantity: Contracts::new(dec!(1)),
            price: None,
            position_side: None,
            reduce_only: false,
            margin_mode: MarginMode::Cross,
            client_order_id: ClientOrderId::new(),
        };
        assert_eq!(request.coin(), "BTC");
    }
}
