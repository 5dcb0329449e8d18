//! Rejection taxonomy for engine operations.
//!
//! Every mutating call returns an explicit success/failure result with a
//! machine-readable reason; there is no silent partial success for batched
//! calls. Event-delivery failures are deliberately *not* part of this
//! taxonomy: they are local to the emission step and never roll back a
//! committed mutation (see [`crate::events::EventSinkError`]).

use crate::types::{RaffleId, TicketNumber};
use thiserror::Error;

/// Why an engine operation was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Malformed request: empty owner fields, empty number list, or numbers
    /// outside the raffle's range. Rejected before any lock is taken and
    /// never retried automatically.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with the request
        reason: String,
    },

    /// One or more requested numbers were not in the required source state
    /// (e.g., reserving an already-reserved number). The caller may retry
    /// with a reduced set; the engine never auto-retries.
    #[error("numbers not in the required state: [{}]", join_numbers(numbers))]
    Conflict {
        /// The exact numbers that conflicted
        numbers: Vec<TicketNumber>,
    },

    /// A mutating call was made against a completed raffle. Always fatal to
    /// that call; completed raffles are immutable.
    #[error("raffle {raffle_id} is completed and immutable")]
    RaffleCompleted {
        /// The completed raffle
        raffle_id: RaffleId,
    },

    /// The named raffle is not registered with the engine.
    #[error("raffle {raffle_id} not found")]
    RaffleNotFound {
        /// The unknown raffle id
        raffle_id: RaffleId,
    },

    /// A draw was attempted on a raffle with an empty number range.
    #[error("no eligible numbers to draw from")]
    NoEligibleNumbers,
}

impl Rejection {
    /// Convenience constructor for [`Rejection::InvalidInput`]
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

fn join_numbers(numbers: &[TicketNumber]) -> String {
    numbers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
