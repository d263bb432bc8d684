//! Time-bounded response cache.
//!
//! Shields the exchange's rate-limited query endpoints (price tickers,
//! open positions) behind a short-lived, process-wide key/value store.
//! Deliberately read-through at the call site: callers check, fetch,
//! then populate, so a cache-population problem can never mask the
//! underlying fetch error.

pub mod cache;

pub use cache::{CacheStats, ResponseCache};
