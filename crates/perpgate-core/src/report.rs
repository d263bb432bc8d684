//! Execution reporting types.
//!
//! `OrderResult` is the exchange's answer to a single submission;
//! `UnwindOutcome` and `UnwindReport` describe a batch unwind. None of
//! these are persisted by the gateway; persistence is a collaborator's
//! concern.

use crate::decimal::{Contracts, Price};
use serde::{Deserialize, Serialize};

/// Result of a single order submission.
///
/// All fill fields come from the exchange's authoritative response;
/// nothing here is recomputed locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResult {
    /// Exchange-assigned order ID.
    pub order_id: String,
    /// Filled size in contract units.
    pub filled_quantity: Contracts,
    /// Average fill price.
    pub average_price: Price,
    /// Total cost of the fill, derived as `filled_quantity *
    /// average_price`. The venue reports fills and average price but
    /// no direct cost field, so the client computes it from those two.
    pub cost: rust_decimal::Decimal,
}

/// Outcome of closing one position during an unwind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnwindOutcome {
    /// Coin of the position this outcome belongs to.
    pub coin: String,
    /// Order ID on success, error message on failure.
    #[serde(flatten)]
    pub result: UnwindResult,
}

/// Success-or-error payload of one unwind outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnwindResult {
    /// Closing order was accepted; carries the exchange order ID.
    Closed { order_id: String },
    /// Closing order failed; carries the error message.
    Failed { error: String },
}

impl UnwindOutcome {
    /// Build a success outcome.
    pub fn closed(coin: impl Into<String>, order_id: impl Into<String>) -> Self {
        Self {
            coin: coin.into(),
            result: UnwindResult::Closed {
                order_id: order_id.into(),
            },
        }
    }

    /// Build a failure outcome.
    pub fn failed(coin: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            coin: coin.into(),
            result: UnwindResult::Failed {
                error: error.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.result, UnwindResult::Closed { .. })
    }
}

/// Aggregate report of one batch unwind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnwindReport {
    /// Number of positions closed successfully.
    pub succeeded: usize,
    /// Number of positions whose close failed.
    pub failed: usize,
    /// One outcome per position, success or failure.
    pub outcomes: Vec<UnwindOutcome>,
}

impl UnwindReport {
    /// Report for the case of no open positions (not an error).
    pub fn nothing_to_close() -> Self {
        Self::default()
    }

    /// Aggregate a list of per-position outcomes.
    pub fn from_outcomes(outcomes: Vec<UnwindOutcome>) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let failed = outcomes.len() - succeeded;
        Self {
            succeeded,
            failed,
            outcomes,
        }
    }

    /// True when there were no positions to close at all.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// True when every dispatched close failed.
    ///
    /// Partial success is still an overall non-failure: the goal of
    /// reducing open risk was partially achieved.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.succeeded == 0
    }
}
