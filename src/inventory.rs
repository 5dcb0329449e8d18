//! Raffle inventory aggregate.
//!
//! [`RaffleInventory`] owns the authoritative state of every number in one
//! raffle and enforces the transition rules. It is a pure, synchronous state
//! machine: validation happens before any mutation, so a batch either applies
//! completely or not at all. Serialization of concurrent access is the
//! [`crate::engine::ReservationEngine`]'s job, not this type's.
//!
//! **Concurrency contract**: the engine is the exclusive owner of mutation
//! rights to this mapping. The draw path writes only the lifecycle flag and
//! winning number, under the same exclusivity guarantee as a reservation
//! batch.

use crate::error::Rejection;
use crate::types::{
    Capacity, DrawResult, NumberEntry, NumberState, RaffleDetails, RaffleId, RaffleLifecycle,
    RaffleSnapshot, ReservationBatch, TicketNumber,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Authoritative state of one raffle's number range.
///
/// Numbers without an entry in the held map are `Available`; the map holds
/// only `Reserved` and `Sold` states, so the mapping always partitions the
/// range `[1, capacity]`.
#[derive(Clone, Debug)]
pub struct RaffleInventory {
    raffle_id: RaffleId,
    details: RaffleDetails,
    capacity: Capacity,
    created_at: DateTime<Utc>,
    held: BTreeMap<TicketNumber, NumberState>,
    lifecycle: RaffleLifecycle,
    draw: Option<DrawResult>,
}

impl RaffleInventory {
    /// Creates a fresh `Active` inventory with every number `Available`
    #[must_use]
    pub const fn new(
        raffle_id: RaffleId,
        details: RaffleDetails,
        capacity: Capacity,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            raffle_id,
            details,
            capacity,
            created_at,
            held: BTreeMap::new(),
            lifecycle: RaffleLifecycle::Active,
            draw: None,
        }
    }

    /// The raffle this inventory belongs to
    #[must_use]
    pub const fn raffle_id(&self) -> RaffleId {
        self.raffle_id
    }

    /// Descriptive raffle metadata
    #[must_use]
    pub const fn details(&self) -> &RaffleDetails {
        &self.details
    }

    /// Size of the number range
    #[must_use]
    pub const fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// When the raffle was registered
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Current lifecycle flag
    #[must_use]
    pub const fn lifecycle(&self) -> RaffleLifecycle {
        self.lifecycle
    }

    /// The draw result, once the raffle completed
    #[must_use]
    pub const fn draw_result(&self) -> Option<&DrawResult> {
        self.draw.as_ref()
    }

    /// State of a single number; `None` if the number is out of range
    #[must_use]
    pub fn state_of(&self, number: TicketNumber) -> Option<NumberState> {
        if !self.capacity.contains(number) {
            return None;
        }
        Some(
            self.held
                .get(&number)
                .cloned()
                .unwrap_or(NumberState::Available),
        )
    }

    /// Consistent point-in-time view of the full number range.
    ///
    /// Callers holding the engine's read access never observe a mutation in
    /// progress; validation-before-apply keeps partially applied batches
    /// unobservable even within this type.
    #[must_use]
    pub fn snapshot(&self) -> RaffleSnapshot {
        let numbers = (1..=self.capacity.value())
            .map(|value| {
                let number = TicketNumber::new(value);
                NumberEntry {
                    number,
                    state: self
                        .held
                        .get(&number)
                        .cloned()
                        .unwrap_or(NumberState::Available),
                }
            })
            .collect();

        RaffleSnapshot {
            raffle_id: self.raffle_id,
            lifecycle: self.lifecycle,
            winning_number: self.draw.as_ref().map(|draw| draw.winning_number),
            draw_date: self.details.draw_date,
            numbers,
        }
    }

    /// Applies a reservation batch all-or-nothing.
    ///
    /// Every requested number transitions to `Reserved` with the batch's
    /// owner metadata and the given timestamp. This is the only path that
    /// creates a `Reserved` state.
    ///
    /// # Errors
    ///
    /// - [`Rejection::RaffleCompleted`] if the raffle already completed
    /// - [`Rejection::InvalidInput`] if any number is out of range
    /// - [`Rejection::Conflict`] if any requested number is not `Available`;
    ///   no number in the batch is mutated in that case
    pub fn apply_reservation(
        &mut self,
        batch: &ReservationBatch,
        now: DateTime<Utc>,
    ) -> Result<(), Rejection> {
        self.ensure_active()?;
        self.ensure_in_range(batch.numbers())?;

        let conflicting: Vec<TicketNumber> = batch
            .numbers()
            .iter()
            .copied()
            .filter(|number| self.held.contains_key(number))
            .collect();

        if !conflicting.is_empty() {
            return Err(Rejection::Conflict {
                numbers: conflicting,
            });
        }

        for number in batch.numbers() {
            self.held.insert(
                *number,
                NumberState::Reserved {
                    owner: batch.owner().clone(),
                    reserved_at: now,
                },
            );
        }

        Ok(())
    }

    /// Confirms purchase of reserved numbers, all-or-nothing.
    ///
    /// Each number transitions `Reserved → Sold`, preserving owner metadata
    /// and stamping the purchase time. Partial success is never observable.
    ///
    /// # Errors
    ///
    /// - [`Rejection::RaffleCompleted`] if the raffle already completed
    /// - [`Rejection::InvalidInput`] on an empty list or out-of-range numbers
    /// - [`Rejection::Conflict`] if any number is not currently `Reserved`
    pub fn confirm_purchase(
        &mut self,
        numbers: &[TicketNumber],
        now: DateTime<Utc>,
    ) -> Result<(), Rejection> {
        self.ensure_active()?;
        if numbers.is_empty() {
            return Err(Rejection::invalid_input(
                "purchase confirmation must list at least one number",
            ));
        }
        self.ensure_in_range(numbers)?;

        let conflicting: Vec<TicketNumber> = numbers
            .iter()
            .copied()
            .filter(|number| {
                !matches!(self.held.get(number), Some(NumberState::Reserved { .. }))
            })
            .collect();

        if !conflicting.is_empty() {
            return Err(Rejection::Conflict {
                numbers: conflicting,
            });
        }

        for number in numbers {
            if let Some(NumberState::Reserved { owner, reserved_at }) =
                self.held.get(number).cloned()
            {
                self.held.insert(
                    *number,
                    NumberState::Sold {
                        owner,
                        reserved_at,
                        purchased_at: now,
                    },
                );
            }
        }

        Ok(())
    }

    /// Releases numbers back to `Available`, discarding owner metadata.
    ///
    /// Best-effort and idempotent per number: numbers that are already
    /// `Available` (or simply not listed in the held map) are silent no-ops,
    /// not batch failures. Returns the numbers actually released so the
    /// caller can emit an accurate event.
    ///
    /// # Errors
    ///
    /// - [`Rejection::RaffleCompleted`] if the raffle already completed
    /// - [`Rejection::InvalidInput`] on an empty list
    pub fn cancel(&mut self, numbers: &[TicketNumber]) -> Result<Vec<TicketNumber>, Rejection> {
        self.ensure_active()?;
        if numbers.is_empty() {
            return Err(Rejection::invalid_input(
                "cancellation must list at least one number",
            ));
        }

        let mut released = Vec::new();
        for number in numbers {
            if self.held.remove(number).is_some() {
                released.push(*number);
            }
        }

        Ok(released)
    }

    /// The numbers a draw may select from: every `Reserved` or `Sold` number,
    /// or the full range as a fallback when nothing is held (so a raffle with
    /// zero reservations can still run a full-range honesty draw).
    ///
    /// Empty only when the raffle's number range itself is empty.
    #[must_use]
    pub fn eligible_pool(&self) -> Vec<TicketNumber> {
        if self.held.is_empty() {
            (1..=self.capacity.value()).map(TicketNumber::new).collect()
        } else {
            self.held.keys().copied().collect()
        }
    }

    /// Records the winning number and flips the lifecycle to `Completed`.
    ///
    /// The winning number is immutable once set; every subsequent mutation
    /// attempt on this inventory fails with [`Rejection::RaffleCompleted`].
    ///
    /// # Errors
    ///
    /// - [`Rejection::RaffleCompleted`] if the raffle already completed
    /// - [`Rejection::InvalidInput`] if the winner is not a member of the
    ///   current eligible pool
    pub fn finalize(
        &mut self,
        winning_number: TicketNumber,
        now: DateTime<Utc>,
    ) -> Result<DrawResult, Rejection> {
        self.ensure_active()?;

        let eligible_pool = self.eligible_pool();
        if !eligible_pool.contains(&winning_number) {
            return Err(Rejection::invalid_input(format!(
                "winning number {winning_number} is not in the eligible pool"
            )));
        }

        let result = DrawResult {
            winning_number,
            drawn_at: now,
            eligible_pool,
        };

        self.lifecycle = RaffleLifecycle::Completed;
        self.draw = Some(result.clone());

        Ok(result)
    }

    fn ensure_active(&self) -> Result<(), Rejection> {
        match self.lifecycle {
            RaffleLifecycle::Active => Ok(()),
            RaffleLifecycle::Completed => Err(Rejection::RaffleCompleted {
                raffle_id: self.raffle_id,
            }),
        }
    }

    fn ensure_in_range(&self, numbers: &[TicketNumber]) -> Result<(), Rejection> {
        let out_of_range: Vec<TicketNumber> = numbers
            .iter()
            .copied()
            .filter(|number| !self.capacity.contains(*number))
            .collect();

        if out_of_range.is_empty() {
            Ok(())
        } else {
            Err(Rejection::invalid_input(format!(
                "numbers out of range [1, {}]: {}",
                self.capacity,
                out_of_range
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            )))
        }
    }
}
