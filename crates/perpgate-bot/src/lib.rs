//! Execution gateway between an automated decision process and a
//! leveraged perpetual-swap exchange.
//!
//! The decision layer hands down trading intents; this crate wires the
//! components that execute them and front the exchange's rate-limited
//! read endpoints with short-lived caches.

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::{AppConfig, CacheConfig, ExchangeConfig};
pub use error::{AppError, AppResult};
