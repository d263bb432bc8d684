//! Order coordinator.
//!
//! Given a trading intent and the resolved position mode, derives the
//! exact exchange-facing order parameters and submits a single order.
//! Ordering is strict: validation first, network second; the
//! cache-free submission path has no side effects before the exchange
//! call.

use crate::error::{ExecutorError, ExecutorResult};
use perpgate_core::{
    ClientOrderId, CoreError, OrderResult, PositionDirection, PositionMode, PositionSide,
    TradingIntent,
};
use perpgate_exchange::{DynExchangeClient, OrderRequest};
use tracing::{info, warn};

/// Translates intents into orders and submits them.
pub struct OrderCoordinator {
    client: DynExchangeClient,
}

impl OrderCoordinator {
    pub fn new(client: DynExchangeClient) -> Self {
        Self { client }
    }

    /// Place one order for `intent` under the given position mode.
    ///
    /// Validation failures return before any network call. Exchange
    /// failures propagate with the exchange's raw payload; there are
    /// no retries here.
    pub async fn place(
        &self,
        intent: &TradingIntent,
        mode: PositionMode,
    ) -> ExecutorResult<OrderResult> {
        intent.validate()?;
        let request = derive_request(intent, mode)?;

        info!(
            symbol = %request.symbol,
            side = %request.side,
            order_type = %request.order_type,
            quantity = %request.quantity,
            %mode,
            reduce_only = request.reduce_only,
            "placing order"
        );

        match self.client.create_order(request).await {
            Ok(result) => {
                info!(
                    order_id = %result.order_id,
                    filled = %result.filled_quantity,
                    average_price = %result.average_price,
                    "order placed"
                );
                Ok(result)
            }
            Err(err) => {
                warn!(error = %err, coin = intent.instrument.coin(), "order submission failed");
                Err(err.into())
            }
        }
    }
}

/// Derive the exchange-facing request from a validated intent.
///
/// Hedge mode: the request must carry the caller-supplied position
/// side; a missing one is a validation error, not something to infer.
/// Net mode: the position-side parameter is omitted entirely even if
/// the caller supplied one (the exchange rejects it in net mode).
/// Quantity passes through in contract units exactly as given.
pub fn derive_request(
    intent: &TradingIntent,
    mode: PositionMode,
) -> Result<OrderRequest, CoreError> {
    let position_side = match mode {
        PositionMode::Hedge => match intent.position_side {
            PositionSide::Long => Some(PositionDirection::Long),
            PositionSide::Short => Some(PositionDirection::Short),
            PositionSide::Unset => return Err(CoreError::MissingPositionSide),
        },
        PositionMode::Net => None,
    };

    Ok(OrderRequest {
        symbol: intent.instrument.swap_symbol(),
        side: intent.side,
        order_type: intent.order_type,
        quantity: intent.quantity,
        price: intent.price,
        position_side,
        reduce_only: intent.reduce_only,
        margin_mode: intent.margin_mode,
        // Fresh per submission: a retried place() is a new order.
        client_order_id: ClientOrderId::new(),
    })
}
