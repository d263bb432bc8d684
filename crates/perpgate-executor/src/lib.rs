//! Order execution coordination.
//!
//! Translates abstract trading intents into exchange-facing order
//! parameters, handling the hedge-mode vs net-mode duality, and
//! resolves the account's position mode. Validation happens before any
//! network call; exchange errors propagate unchanged; nothing here
//! retries (retrying a market order is not idempotent, so retries are
//! caller policy).

pub mod coordinator;
pub mod error;
pub mod mode;

pub use coordinator::OrderCoordinator;
pub use error::{ExecutorError, ExecutorResult};
pub use mode::PositionModeResolver;
