//! Account position-mode resolution.

use crate::error::ExecutorResult;
use perpgate_core::PositionMode;
use perpgate_exchange::DynExchangeClient;
use tracing::debug;

/// Resolves whether the account runs hedge or net mode.
///
/// One account-config read per call, deliberately uncached: mode
/// changes are rare but must never be stale across a trading decision.
/// On failure the underlying error propagates verbatim; callers must
/// not assume a default mode.
pub struct PositionModeResolver {
    client: DynExchangeClient,
}

impl PositionModeResolver {
    pub fn new(client: DynExchangeClient) -> Self {
        Self { client }
    }

    /// Resolve the account's current position mode.
    pub async fn resolve(&self) -> ExecutorResult<PositionMode> {
        let config = self.client.fetch_account_config().await?;
        let mode = config.mode();
        debug!(%mode, raw = %config.position_mode, "resolved account position mode");
        Ok(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perpgate_exchange::{ExchangeError, MockExchange};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_resolves_hedge_mode() {
        let mock = Arc::new(MockExchange::new());
        mock.set_position_mode("long_short_mode");
        let resolver = PositionModeResolver::new(mock.clone());

        assert_eq!(resolver.resolve().await.unwrap(), PositionMode::Hedge);
        assert_eq!(mock.config_calls(), 1);
    }

    #[tokio::test]
    async fn test_resolves_net_mode_for_other_values() {
        let mock = Arc::new(MockExchange::new());
        mock.set_position_mode("net_mode");
        let resolver = PositionModeResolver::new(mock);

        assert_eq!(resolver.resolve().await.unwrap(), PositionMode::Net);
    }

    #[tokio::test]
    async fn test_does_not_cache_between_calls() {
        let mock = Arc::new(MockExchange::new());
        let resolver = PositionModeResolver::new(mock.clone());

        resolver.resolve().await.unwrap();
        mock.set_position_mode("long_short_mode");
        assert_eq!(resolver.resolve().await.unwrap(), PositionMode::Hedge);
        assert_eq!(mock.config_calls(), 2);
    }

    #[tokio::test]
    async fn test_error_propagates_no_default() {
        let mock = Arc::new(MockExchange::new());
        mock.fail_account_config(ExchangeError::Transport("timeout".to_string()));
        let resolver = PositionModeResolver::new(mock);

        let err = resolver.resolve().await.unwrap_err();
        assert!(matches!(
            err,
            crate::ExecutorError::Exchange(ExchangeError::Transport(_))
        ));
    }
}
