//! Application wiring.
//!
//! Owns the per-domain caches (prices, positions), the shared exchange
//! client, and the execution components, and exposes the surface a
//! route layer calls: `quote`, `open_positions`, `place_order`,
//! `unwind_all`. Caches are explicitly constructed members injected
//! into the read paths, with lifecycle tied to the application.

use crate::config::AppConfig;
use crate::error::AppResult;
use perpgate_cache::ResponseCache;
use perpgate_core::{Instrument, OpenPosition, OrderResult, Price, TradingIntent, UnwindReport};
use perpgate_exchange::{DynExchangeClient, OkxClient, OkxCredentials};
use perpgate_executor::{OrderCoordinator, PositionModeResolver};
use perpgate_position::BatchUnwindEngine;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Cache tag for ticker-price entries.
const PRICES_TAG: &str = "prices";
/// Cache tag and key for the open-position list.
const POSITIONS_TAG: &str = "positions";
const POSITIONS_KEY: &str = "positions:all";

/// Main application.
pub struct Application {
    config: AppConfig,
    client: DynExchangeClient,
    price_cache: Arc<ResponseCache<Price>>,
    position_cache: Arc<ResponseCache<Vec<OpenPosition>>>,
    resolver: PositionModeResolver,
    coordinator: Arc<OrderCoordinator>,
    unwind_engine: BatchUnwindEngine,
}

impl Application {
    /// Wire the application around an injected exchange client.
    pub fn new(config: AppConfig, client: DynExchangeClient) -> Self {
        let price_cache = Arc::new(ResponseCache::new(config.cache.max_entries));
        let position_cache = Arc::new(ResponseCache::new(config.cache.max_entries));
        let resolver = PositionModeResolver::new(client.clone());
        let coordinator = Arc::new(OrderCoordinator::new(client.clone()));
        let unwind_engine = BatchUnwindEngine::new(client.clone(), coordinator.clone());

        Self {
            config,
            client,
            price_cache,
            position_cache,
            resolver,
            coordinator,
            unwind_engine,
        }
    }

    /// Build the live exchange client from config and environment
    /// credentials, then wire the application.
    pub fn connect(config: AppConfig) -> AppResult<Self> {
        let credentials = OkxCredentials::from_env()?;
        let client = OkxClient::new(
            &config.exchange.rest_url,
            credentials,
            config.exchange.simulated,
        )?;
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Current prices for `coins`, cache-fronted.
    ///
    /// Misses are fetched in one ticker call and then stored
    /// best-effort; a fetch error propagates, a store never fails.
    pub async fn quote(&self, coins: &[String]) -> AppResult<HashMap<String, Price>> {
        let mut prices = HashMap::new();
        let mut missing = Vec::new();

        for coin in coins {
            let instrument = Instrument::new(coin)?;
            match self.price_cache.get(&price_key(instrument.coin())) {
                Some(price) => {
                    prices.insert(instrument.coin().to_string(), price);
                }
                None => missing.push(instrument),
            }
        }

        if !missing.is_empty() {
            let fetched = self.client.fetch_tickers(&missing).await?;
            // Store only after the fetch succeeded.
            for (coin, price) in &fetched {
                self.price_cache.set(
                    &price_key(coin),
                    *price,
                    self.config.cache.price_ttl(),
                    &[PRICES_TAG],
                );
            }
            prices.extend(fetched);
        }

        Ok(prices)
    }

    /// Open positions, cache-fronted.
    pub async fn open_positions(&self) -> AppResult<Vec<OpenPosition>> {
        if let Some(positions) = self.position_cache.get(POSITIONS_KEY) {
            return Ok(positions);
        }

        let positions = self.client.fetch_positions().await?;
        self.position_cache.set(
            POSITIONS_KEY,
            positions.clone(),
            self.config.cache.position_ttl(),
            &[POSITIONS_TAG],
        );
        Ok(positions)
    }

    /// Execute one trading intent.
    ///
    /// Resolves the account's position mode fresh, places the order,
    /// and invalidates the cached position list on success.
    pub async fn place_order(&self, intent: &TradingIntent) -> AppResult<OrderResult> {
        let mode = self.resolver.resolve().await?;
        let result = self.coordinator.place(intent, mode).await?;
        self.position_cache.invalidate(POSITIONS_TAG);
        Ok(result)
    }

    /// Close every open position; partial success is not an error.
    pub async fn unwind_all(&self) -> AppResult<UnwindReport> {
        let report = self.unwind_engine.unwind_all().await?;
        if report.succeeded > 0 {
            self.position_cache.invalidate(POSITIONS_TAG);
        }
        Ok(report)
    }

    /// Drop all cached reads (both domains).
    pub fn flush_caches(&self) {
        self.price_cache.clear();
        self.position_cache.clear();
    }

    /// Price cache handle for read-path handlers.
    pub fn price_cache(&self) -> &Arc<ResponseCache<Price>> {
        &self.price_cache
    }

    /// Position cache handle for read-path handlers.
    pub fn position_cache(&self) -> &Arc<ResponseCache<Vec<OpenPosition>>> {
        &self.position_cache
    }

    /// Run the heartbeat loop until ctrl-c.
    ///
    /// Each tick refreshes the watch-list quotes through the cache and
    /// logs cache statistics.
    pub async fn run(&self) -> AppResult<()> {
        let config = self.client.fetch_account_config().await?;
        info!(mode = %config.mode(), "account position mode");

        let positions = self.open_positions().await?;
        info!(count = positions.len(), "open positions at startup");

        let mut ticker = tokio::time::interval(self.config.heartbeat());
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !self.config.watch.is_empty() {
                        match self.quote(&self.config.watch).await {
                            Ok(prices) => debug!(count = prices.len(), "refreshed watch quotes"),
                            Err(err) => tracing::warn!(error = %err, "watch quote refresh failed"),
                        }
                    }
                    let prices = self.price_cache.stats();
                    let positions = self.position_cache.stats();
                    debug!(
                        price_hits = prices.hits,
                        price_misses = prices.misses,
                        position_hits = positions.hits,
                        position_misses = positions.misses,
                        "cache stats"
                    );
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown requested");
                    return Ok(());
                }
            }
        }
    }
}

fn price_key(coin: &str) -> String {
    format!("price:{coin}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use perpgate_core::{
        Contracts, MarginMode, OrderSide, PositionDirection, PositionSide,
    };
    use perpgate_exchange::MockExchange;
    use rust_decimal_macros::dec;

    fn mock_app() -> (Arc<MockExchange>, Application) {
        let mock = Arc::new(MockExchange::new());
        let app = Application::new(AppConfig::default(), mock.clone());
        (mock, app)
    }

    fn position(coin: &str) -> OpenPosition {
        OpenPosition {
            instrument: Instrument::new(coin).unwrap(),
            direction: PositionDirection::Long,
            contracts: Contracts::new(dec!(1)),
            notional: dec!(1000),
            leverage: dec!(10),
            unrealized_pnl: dec!(0),
            margin_mode: Some(MarginMode::Cross),
        }
    }

    #[tokio::test]
    async fn test_quote_fetches_once_then_serves_from_cache() {
        let (mock, app) = mock_app();
        mock.set_ticker("BTC", Price::new(dec!(50000)));
        let coins = vec!["BTC".to_string()];

        let first = app.quote(&coins).await.unwrap();
        assert_eq!(first["BTC"], Price::new(dec!(50000)));
        assert_eq!(mock.ticker_calls(), 1);

        // Second read inside the TTL hits the cache.
        let second = app.quote(&coins).await.unwrap();
        assert_eq!(second["BTC"], Price::new(dec!(50000)));
        assert_eq!(mock.ticker_calls(), 1);
    }

    #[tokio::test]
    async fn test_positions_cached_and_invalidated_by_order() {
        let (mock, app) = mock_app();
        mock.set_ticker("BTC", Price::new(dec!(50000)));
        mock.set_positions(vec![position("BTC")]);

        app.open_positions().await.unwrap();
        app.open_positions().await.unwrap();
        assert_eq!(mock.position_calls(), 1);

        // Placing an order invalidates the cached list.
        let intent = TradingIntent::market(
            Instrument::new("BTC").unwrap(),
            OrderSide::Buy,
            Contracts::new(dec!(1)),
        );
        app.place_order(&intent).await.unwrap();

        app.open_positions().await.unwrap();
        assert_eq!(mock.position_calls(), 2);
    }

    #[tokio::test]
    async fn test_place_order_resolves_mode_per_call() {
        let (mock, app) = mock_app();
        mock.set_ticker("BTC", Price::new(dec!(50000)));
        mock.set_position_mode("long_short_mode");

        let intent = TradingIntent::market(
            Instrument::new("BTC").unwrap(),
            OrderSide::Buy,
            Contracts::new(dec!(1)),
        )
        .with_position_side(PositionSide::Long);

        app.place_order(&intent).await.unwrap();
        assert_eq!(mock.config_calls(), 1);
        assert_eq!(
            mock.recorded_orders()[0].position_side,
            Some(PositionDirection::Long)
        );
    }

    #[tokio::test]
    async fn test_unwind_invalidates_position_cache() {
        let (mock, app) = mock_app();
        mock.set_ticker("BTC", Price::new(dec!(50000)));
        mock.set_positions(vec![position("BTC")]);

        app.open_positions().await.unwrap();
        let report = app.unwind_all().await.unwrap();
        assert_eq!(report.succeeded, 1);

        // Cache was invalidated, the next read refetches.
        app.open_positions().await.unwrap();
        assert!(mock.position_calls() >= 3);
    }

    #[tokio::test]
    async fn test_quote_missing_ticker_not_cached() {
        let (mock, app) = mock_app();
        // No ticker configured: the mock returns an empty map, and the
        // quote result simply omits the coin. Nothing is cached for it.
        let coins = vec!["DOGE".to_string()];
        let prices = app.quote(&coins).await.unwrap();
        assert!(prices.is_empty());
        assert_eq!(app.quote(&coins).await.unwrap().len(), 0);
        // Every attempt refetches since nothing was stored.
        assert_eq!(mock.ticker_calls(), 2);
    }
}
