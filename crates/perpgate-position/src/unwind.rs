//! Batch unwind engine.
//!
//! Closing is expressed as an opposite-direction order of matching
//! size rather than a reduce-only flag: reduce-only semantics are
//! exchange-specific, the opposite-order approach works in both hedge
//! and net mode. Re-running an unwind is safe; closing an already
//! closed position is a no-op for the exchange.

use crate::error::{PositionError, PositionResult};
use futures_util::future::join_all;
use perpgate_core::{
    OpenPosition, PositionMode, PositionSide, TradingIntent, UnwindOutcome, UnwindReport,
};
use perpgate_exchange::DynExchangeClient;
use perpgate_executor::{OrderCoordinator, PositionModeResolver};
use std::sync::Arc;
use tracing::{info, warn};

/// Derive the intent that closes `position` under `mode`.
///
/// Side is the arithmetic opposite of the position's side; quantity is
/// the position's full contract count, not a recomputed notional;
/// margin mode is copied from the position, defaulting to cross.
pub fn closing_intent(position: &OpenPosition, mode: PositionMode) -> TradingIntent {
    let position_side = if mode.is_hedge() {
        position.direction.as_position_side()
    } else {
        PositionSide::Unset
    };

    TradingIntent::market(
        position.instrument.clone(),
        position.direction.closing_side(),
        position.contracts,
    )
    .with_position_side(position_side)
    .with_margin_mode(position.margin_mode.unwrap_or_default())
}

/// Closes every open position in parallel and aggregates the outcomes.
pub struct BatchUnwindEngine {
    client: DynExchangeClient,
    coordinator: Arc<OrderCoordinator>,
    resolver: PositionModeResolver,
}

impl BatchUnwindEngine {
    pub fn new(client: DynExchangeClient, coordinator: Arc<OrderCoordinator>) -> Self {
        let resolver = PositionModeResolver::new(client.clone());
        Self {
            client,
            coordinator,
            resolver,
        }
    }

    /// Close all open positions.
    ///
    /// Errors only when the position fetch or mode resolution fails —
    /// before any close is dispatched. Once dispatching begins, every
    /// close settles independently and lands in the report; partial
    /// success is an overall non-failure.
    pub async fn unwind_all(&self) -> PositionResult<UnwindReport> {
        let positions = self
            .client
            .fetch_positions()
            .await
            .map_err(PositionError::PositionFetch)?;

        if positions.is_empty() {
            info!("no open positions, nothing to close");
            return Ok(UnwindReport::nothing_to_close());
        }

        let mode = self
            .resolver
            .resolve()
            .await
            .map_err(PositionError::ModeResolution)?;

        info!(count = positions.len(), %mode, "unwinding all positions");

        // Fire all closes concurrently; join_all waits for every task
        // to settle rather than short-circuiting on first failure.
        let closes = positions
            .iter()
            .map(|position| self.close_one(position, mode));
        let outcomes = join_all(closes).await;

        let report = UnwindReport::from_outcomes(outcomes);
        if report.all_failed() {
            warn!(failed = report.failed, "every close in the unwind failed");
        } else {
            info!(
                succeeded = report.succeeded,
                failed = report.failed,
                "unwind complete"
            );
        }
        Ok(report)
    }

    async fn close_one(&self, position: &OpenPosition, mode: PositionMode) -> UnwindOutcome {
        let coin = position.instrument.coin().to_string();
        let intent = closing_intent(position, mode);

        match self.coordinator.place(&intent, mode).await {
            Ok(result) => UnwindOutcome::closed(coin, result.order_id),
            Err(err) => {
                warn!(coin = position.instrument.coin(), error = %err, "position close failed");
                UnwindOutcome::failed(coin, err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perpgate_core::{
        Contracts, Instrument, MarginMode, OrderSide, OrderType, PositionDirection, Price,
        UnwindResult,
    };
    use perpgate_exchange::{ExchangeError, MockExchange};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn position(coin: &str, direction: PositionDirection, contracts: Decimal) -> OpenPosition {
        OpenPosition {
            instrument: Instrument::new(coin).unwrap(),
            direction,
            contracts: Contracts::new(contracts),
            notional: dec!(1000),
            leverage: dec!(10),
            unrealized_pnl: Decimal::ZERO,
            margin_mode: Some(MarginMode::Cross),
        }
    }

    fn engine(mock: &Arc<MockExchange>) -> BatchUnwindEngine {
        let client: DynExchangeClient = mock.clone();
        let coordinator = Arc::new(OrderCoordinator::new(client.clone()));
        BatchUnwindEngine::new(client, coordinator)
    }

    #[test]
    fn test_closing_intent_long_becomes_sell() {
        let long = position("BTC", PositionDirection::Long, dec!(5));
        let intent = closing_intent(&long, PositionMode::Net);

        assert_eq!(intent.side, OrderSide::Sell);
        assert_eq!(intent.quantity.inner(), dec!(5));
        assert_eq!(intent.order_type, OrderType::Market);
        assert_eq!(intent.position_side, PositionSide::Unset);
        assert!(!intent.reduce_only);
    }

    #[test]
    fn test_closing_intent_short_becomes_buy() {
        let short = position("ETH", PositionDirection::Short, dec!(2));
        let intent = closing_intent(&short, PositionMode::Hedge);

        assert_eq!(intent.side, OrderSide::Buy);
        assert_eq!(intent.position_side, PositionSide::Short);
    }

    #[test]
    fn test_closing_intent_margin_mode_defaults_to_cross() {
        let mut pos = position("SOL", PositionDirection::Long, dec!(1));
        pos.margin_mode = None;
        let intent = closing_intent(&pos, PositionMode::Net);
        assert_eq!(intent.margin_mode, MarginMode::Cross);

        pos.margin_mode = Some(MarginMode::Isolated);
        let intent = closing_intent(&pos, PositionMode::Net);
        assert_eq!(intent.margin_mode, MarginMode::Isolated);
    }

    #[tokio::test]
    async fn test_empty_positions_is_nothing_to_close() {
        let mock = Arc::new(MockExchange::new());
        let report = engine(&mock).unwind_all().await.unwrap();

        assert!(report.is_empty());
        // No mode resolution or order calls when there is nothing to do.
        assert_eq!(mock.config_calls(), 0);
        assert_eq!(mock.order_calls(), 0);
    }

    #[tokio::test]
    async fn test_partial_failure_isolated_per_position() {
        let mock = Arc::new(MockExchange::new());
        mock.set_positions(vec![
            position("BTC", PositionDirection::Long, dec!(5)),
            position("ETH", PositionDirection::Short, dec!(2)),
            position("SOL", PositionDirection::Long, dec!(10)),
        ]);
        mock.fail_orders_for(
            "ETH",
            ExchangeError::Rejected {
                code: "51008".to_string(),
                message: "insufficient balance".to_string(),
            },
        );

        let report = engine(&mock).unwind_all().await.unwrap();

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.outcomes.len(), 3);
        assert!(!report.all_failed());

        let eth = report.outcomes.iter().find(|o| o.coin == "ETH").unwrap();
        match &eth.result {
            UnwindResult::Failed { error } => assert!(error.contains("insufficient balance")),
            other => panic!("expected failure outcome, got {other:?}"),
        }
        for coin in ["BTC", "SOL"] {
            let outcome = report.outcomes.iter().find(|o| o.coin == coin).unwrap();
            assert!(matches!(outcome.result, UnwindResult::Closed { .. }));
        }
    }

    #[tokio::test]
    async fn test_hedge_mode_closes_tag_the_leg() {
        let mock = Arc::new(MockExchange::new());
        mock.set_position_mode("long_short_mode");
        mock.set_positions(vec![
            position("BTC", PositionDirection::Long, dec!(1)),
            position("BTC", PositionDirection::Short, dec!(1)),
        ]);

        let report = engine(&mock).unwind_all().await.unwrap();
        assert_eq!(report.succeeded, 2);

        let orders = mock.recorded_orders();
        let sides: Vec<_> = orders.iter().map(|o| o.position_side).collect();
        assert!(sides.contains(&Some(PositionDirection::Long)));
        assert!(sides.contains(&Some(PositionDirection::Short)));
    }

    #[tokio::test]
    async fn test_net_mode_closes_omit_position_side() {
        let mock = Arc::new(MockExchange::new());
        mock.set_positions(vec![position("BTC", PositionDirection::Short, dec!(4))]);

        engine(&mock).unwind_all().await.unwrap();

        let orders = mock.recorded_orders();
        assert_eq!(orders[0].position_side, None);
        assert_eq!(orders[0].side, OrderSide::Buy);
        assert_eq!(orders[0].quantity.inner(), dec!(4));
    }

    #[tokio::test]
    async fn test_all_failed_is_overall_failure() {
        let mock = Arc::new(MockExchange::new());
        mock.set_positions(vec![position("BTC", PositionDirection::Long, dec!(1))]);
        mock.fail_orders_for("BTC", ExchangeError::Transport("timeout".to_string()));

        let report = engine(&mock).unwind_all().await.unwrap();
        assert!(report.all_failed());
        assert_eq!(report.outcomes.len(), 1);
    }

    #[tokio::test]
    async fn test_mode_resolution_error_aborts_before_dispatch() {
        let mock = Arc::new(MockExchange::new());
        mock.set_positions(vec![position("BTC", PositionDirection::Long, dec!(1))]);
        mock.fail_account_config(ExchangeError::Transport("timeout".to_string()));

        let err = engine(&mock).unwind_all().await.unwrap_err();
        assert!(matches!(err, PositionError::ModeResolution(_)));
        assert_eq!(mock.order_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closes_run_concurrently_not_serially() {
        let mock = Arc::new(MockExchange::new());
        mock.set_positions(vec![
            position("BTC", PositionDirection::Long, dec!(1)),
            position("ETH", PositionDirection::Long, dec!(1)),
            position("SOL", PositionDirection::Long, dec!(1)),
        ]);
        mock.set_order_delay(Duration::from_millis(100));

        let started = tokio::time::Instant::now();
        let report = engine(&mock).unwind_all().await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(report.succeeded, 3);
        // Fan-out: total duration approximates the slowest single call
        // (100ms), not the 300ms a serial loop would take.
        assert!(
            elapsed < Duration::from_millis(200),
            "unwind took {elapsed:?}, closes appear serialized"
        );
    }
}
