//! Batch position unwind.
//!
//! Fetches every open position, derives a closing order for each, fans
//! the closes out in parallel, and aggregates per-position outcomes.
//! A failure in one closing order never prevents, delays, or rolls
//! back any other.

pub mod error;
pub mod unwind;

pub use error::{PositionError, PositionResult};
pub use unwind::{closing_intent, BatchUnwindEngine};
