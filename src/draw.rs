//! Draw engine: seedable uniform selection over the eligible pool.
//!
//! The random source is injected per call, never a global generator, so a
//! draw is reproducible for the same inventory state and seed. Selection and
//! finalization share one code path regardless of pool size: a one-member
//! pool still goes through `gen_range`.

use crate::error::Rejection;
use crate::inventory::RaffleInventory;
use crate::types::{DrawResult, RaffleLifecycle};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Selects winning numbers and finalizes raffle lifecycles.
///
/// Stateless: callers hold the same exclusive access to the inventory as a
/// reservation batch while drawing.
#[derive(Clone, Copy, Debug, Default)]
pub struct DrawEngine;

impl DrawEngine {
    /// Draws a winner uniformly at random from the inventory's eligible pool
    /// and finalizes the raffle.
    ///
    /// Re-drawing an already-completed raffle is rejected, not silently
    /// re-randomized.
    ///
    /// # Errors
    ///
    /// - [`Rejection::RaffleCompleted`] if the raffle already completed
    /// - [`Rejection::NoEligibleNumbers`] if the number range is empty
    pub fn draw<R: Rng + ?Sized>(
        inventory: &mut RaffleInventory,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<DrawResult, Rejection> {
        if inventory.lifecycle() == RaffleLifecycle::Completed {
            return Err(Rejection::RaffleCompleted {
                raffle_id: inventory.raffle_id(),
            });
        }

        let pool = inventory.eligible_pool();
        if pool.is_empty() {
            return Err(Rejection::NoEligibleNumbers);
        }

        let winner = pool[rng.gen_range(0..pool.len())];
        inventory.finalize(winner, now)
    }

    /// Builds the random source for a draw: seeded and deterministic when a
    /// seed is supplied, OS-entropy otherwise.
    #[must_use]
    pub fn rng_for(seed: Option<u64>) -> StdRng {
        seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
    }
}
