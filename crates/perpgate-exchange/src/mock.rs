//! In-memory exchange for tests.
//!
//! Records every order request, serves scripted positions/tickers/
//! account config, and can fail per coin or delay per call. Call
//! counters let tests prove that validation failures made zero
//! network calls.

use crate::client::{BoxFuture, ExchangeClient, OrderRequest};
use crate::error::{ExchangeError, ExchangeResult};
use crate::types::AccountConfig;
use perpgate_core::{Instrument, OpenPosition, OrderResult, Price};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Scriptable in-memory `ExchangeClient`.
#[derive(Debug)]
pub struct MockExchange {
    tickers: parking_lot::Mutex<HashMap<String, Price>>,
    positions: parking_lot::Mutex<Vec<OpenPosition>>,
    /// Raw position-mode string served by `fetch_account_config`.
    position_mode: parking_lot::Mutex<String>,
    /// Error to fail account-config fetches with, if set.
    account_config_error: parking_lot::Mutex<Option<ExchangeError>>,
    /// Recorded order requests, in submission order.
    orders: parking_lot::Mutex<Vec<OrderRequest>>,
    /// Per-coin scripted order failures.
    order_failures: parking_lot::Mutex<HashMap<String, ExchangeError>>,
    /// Artificial latency applied to each create_order call.
    order_delay: parking_lot::Mutex<Option<Duration>>,
    next_order_id: AtomicU64,
    order_calls: AtomicU64,
    position_calls: AtomicU64,
    config_calls: AtomicU64,
    ticker_calls: AtomicU64,
}

impl Default for MockExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExchange {
    /// Create a mock serving net mode and no positions.
    pub fn new() -> Self {
        Self {
            tickers: parking_lot::Mutex::new(HashMap::new()),
            positions: parking_lot::Mutex::new(Vec::new()),
            position_mode: parking_lot::Mutex::new("net_mode".to_string()),
            account_config_error: parking_lot::Mutex::new(None),
            orders: parking_lot::Mutex::new(Vec::new()),
            order_failures: parking_lot::Mutex::new(HashMap::new()),
            order_delay: parking_lot::Mutex::new(None),
            next_order_id: AtomicU64::new(1000),
            order_calls: AtomicU64::new(0),
            position_calls: AtomicU64::new(0),
            config_calls: AtomicU64::new(0),
            ticker_calls: AtomicU64::new(0),
        }
    }

    /// Set the last price served for a coin.
    pub fn set_ticker(&self, coin: &str, price: Price) {
        self.tickers.lock().insert(coin.to_string(), price);
    }

    /// Replace the open-position list.
    pub fn set_positions(&self, positions: Vec<OpenPosition>) {
        *self.positions.lock() = positions;
    }

    /// Set the raw position-mode string ("long_short_mode" for hedge).
    pub fn set_position_mode(&self, mode: &str) {
        *self.position_mode.lock() = mode.to_string();
    }

    /// Make `fetch_account_config` fail with the given error.
    pub fn fail_account_config(&self, error: ExchangeError) {
        *self.account_config_error.lock() = Some(error);
    }

    /// Script order submissions for `coin` to fail.
    pub fn fail_orders_for(&self, coin: &str, error: ExchangeError) {
        self.order_failures.lock().insert(coin.to_string(), error);
    }

    /// Apply an artificial latency to every order submission.
    pub fn set_order_delay(&self, delay: Duration) {
        *self.order_delay.lock() = Some(delay);
    }

    /// All order requests recorded so far.
    pub fn recorded_orders(&self) -> Vec<OrderRequest> {
        self.orders.lock().clone()
    }

    /// Number of create_order calls that reached the mock.
    pub fn order_calls(&self) -> u64 {
        self.order_calls.load(Ordering::SeqCst)
    }

    pub fn position_calls(&self) -> u64 {
        self.position_calls.load(Ordering::SeqCst)
    }

    pub fn config_calls(&self) -> u64 {
        self.config_calls.load(Ordering::SeqCst)
    }

    pub fn ticker_calls(&self) -> u64 {
        self.ticker_calls.load(Ordering::SeqCst)
    }
}

impl ExchangeClient for MockExchange {
    fn fetch_tickers<'a>(
        &'a self,
        instruments: &'a [Instrument],
    ) -> BoxFuture<'a, ExchangeResult<HashMap<String, Price>>> {
        Box::pin(async move {
            self.ticker_calls.fetch_add(1, Ordering::SeqCst);
            let tickers = self.tickers.lock();
            Ok(instruments
                .iter()
                .filter_map(|i| tickers.get(i.coin()).map(|p| (i.coin().to_string(), *p)))
                .collect())
        })
    }

    fn fetch_positions(&self) -> BoxFuture<'_, ExchangeResult<Vec<OpenPosition>>> {
        Box::pin(async move {
            self.position_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.positions.lock().clone())
        })
    }

    fn fetch_account_config(&self) -> BoxFuture<'_, ExchangeResult<AccountConfig>> {
        Box::pin(async move {
            self.config_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(error) = self.account_config_error.lock().clone() {
                return Err(error);
            }
            Ok(AccountConfig::new(self.position_mode.lock().clone()))
        })
    }

    fn create_order(&self, request: OrderRequest) -> BoxFuture<'_, ExchangeResult<OrderResult>> {
        Box::pin(async move {
            self.order_calls.fetch_add(1, Ordering::SeqCst);

            let delay = *self.order_delay.lock();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let coin = request.coin().to_string();
            let quantity = request.quantity;
            let price = request
                .price
                .or_else(|| self.tickers.lock().get(&coin).copied())
                .unwrap_or(Price::ZERO);
            self.orders.lock().push(request);

            if let Some(error) = self.order_failures.lock().get(&coin) {
                return Err(error.clone());
            }

            let order_id = self.next_order_id.fetch_add(1, Ordering::SeqCst);
            Ok(OrderResult {
                order_id: order_id.to_string(),
                filled_quantity: quantity,
                average_price: price,
                cost: quantity.inner() * price.inner(),
            })
        })
    }
}
