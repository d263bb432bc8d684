//! Core domain types for the perpgate execution gateway.
//!
//! This crate provides fundamental types used throughout the gateway:
//! - `Instrument`: perpetual-swap instrument identifier
//! - `Price`, `Contracts`: precision-safe numeric types
//! - `TradingIntent`: abstract order description handed down by the decision layer
//! - `OpenPosition`: snapshot of an open exchange position
//! - `OrderResult`, `UnwindOutcome`, `UnwindReport`: execution reporting

pub mod decimal;
pub mod error;
pub mod instrument;
pub mod intent;
pub mod order;
pub mod position;
pub mod report;

pub use decimal::{Contracts, Price};
pub use error::{CoreError, Result};
pub use instrument::Instrument;
pub use intent::TradingIntent;
pub use order::{ClientOrderId, MarginMode, OrderSide, OrderType, PositionMode, PositionSide};
pub use position::{OpenPosition, PositionDirection};
pub use report::{OrderResult, UnwindOutcome, UnwindReport, UnwindResult};
