//! Exchange client layer.
//!
//! Defines the `ExchangeClient` trait the rest of the gateway depends
//! on, the OKX-style REST implementation behind it, and an in-memory
//! recording mock for tests. The trait boundary is the only place the
//! gateway touches the network; everything above it is exchange-
//! agnostic.

pub mod client;
pub mod error;
pub mod mock;
pub mod okx;
pub mod types;

pub use client::{BoxFuture, DynExchangeClient, ExchangeClient, OrderRequest};
pub use error::{ExchangeError, ExchangeResult};
pub use mock::MockExchange;
pub use okx::{OkxClient, OkxCredentials};
pub use types::AccountConfig;
