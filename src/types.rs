//! Domain types for the raffle number inventory engine.
//!
//! Value objects and entities shared by the inventory, reservation, and draw
//! components. Numbers are plain integers in a contiguous range fixed at
//! raffle creation; everything that carries ownership metadata lives in
//! [`NumberState`].

use crate::error::Rejection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a raffle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RaffleId(Uuid);

impl RaffleId {
    /// Creates a new random `RaffleId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `RaffleId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RaffleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RaffleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Numbers and Capacity
// ============================================================================

/// A ticket number within a raffle's range `[1, capacity]`.
///
/// Immutable identity; uniqueness within a raffle is enforced by the
/// inventory's state mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketNumber(u32);

impl TicketNumber {
    /// Creates a new `TicketNumber`
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw number
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of tickets in a raffle (the range is `[1, capacity]`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Capacity(u32);

impl Capacity {
    /// Creates a new `Capacity`
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the capacity value
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Checks whether a number falls inside `[1, capacity]`
    #[must_use]
    pub const fn contains(&self, number: TicketNumber) -> bool {
        number.value() >= 1 && number.value() <= self.0
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Owner
// ============================================================================

/// Participant identity attached to a reservation or purchase.
///
/// Both fields are required and non-empty; construction trims surrounding
/// whitespace and rejects blank input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// Display name of the participant
    pub name: String,
    /// Contact email of the participant
    pub email: String,
}

impl Owner {
    /// Creates a validated `Owner`.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::InvalidInput`] if the name or email is empty
    /// after trimming.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Result<Self, Rejection> {
        let name = name.into().trim().to_string();
        let email = email.into().trim().to_string();

        if name.is_empty() {
            return Err(Rejection::InvalidInput {
                reason: "owner name must not be empty".to_string(),
            });
        }
        if email.is_empty() {
            return Err(Rejection::InvalidInput {
                reason: "owner email must not be empty".to_string(),
            });
        }

        Ok(Self { name, email })
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

// ============================================================================
// Number State
// ============================================================================

/// Flat status discriminant for queries and snapshots
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberStatus {
    /// No owner; can be reserved
    Available,
    /// Temporarily held pending payment confirmation
    Reserved,
    /// Confirmed, paid hold
    Sold,
}

/// Ownership state of a single number.
///
/// Every number in a raffle has exactly one `NumberState` at any instant;
/// the state set partitions the number range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberState {
    /// Available for reservation (no owner metadata)
    Available,
    /// Held by a participant pending payment
    Reserved {
        /// Participant holding the number
        owner: Owner,
        /// When the hold was placed
        reserved_at: DateTime<Utc>,
    },
    /// Purchased by a participant
    Sold {
        /// Participant who purchased the number
        owner: Owner,
        /// When the original hold was placed
        reserved_at: DateTime<Utc>,
        /// When the purchase was confirmed
        purchased_at: DateTime<Utc>,
    },
}

impl NumberState {
    /// Returns the flat status discriminant
    #[must_use]
    pub const fn status(&self) -> NumberStatus {
        match self {
            Self::Available => NumberStatus::Available,
            Self::Reserved { .. } => NumberStatus::Reserved,
            Self::Sold { .. } => NumberStatus::Sold,
        }
    }

    /// Returns the owner, if the number is held
    #[must_use]
    pub const fn owner(&self) -> Option<&Owner> {
        match self {
            Self::Available => None,
            Self::Reserved { owner, .. } | Self::Sold { owner, .. } => Some(owner),
        }
    }

    /// Checks whether the number can be reserved
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

// ============================================================================
// Raffle Lifecycle and Metadata
// ============================================================================

/// Raffle lifecycle flag. `Completed` is terminal: no state may change and
/// no new reservations are accepted once a raffle completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaffleLifecycle {
    /// Accepting reservations, purchases, and cancellations
    Active,
    /// Drawn and immutable
    Completed,
}

/// Descriptive metadata carried by a raffle (what the original listing showed)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaffleDetails {
    /// Raffle title (e.g., "Smartphone Raffle")
    pub title: String,
    /// Longer description shown to participants
    pub description: String,
    /// The prize awarded to the winning number's owner
    pub prize: String,
    /// Scheduled draw date announced by the organizer, if any
    pub draw_date: Option<DateTime<Utc>>,
}

impl RaffleDetails {
    /// Creates new `RaffleDetails` without a scheduled draw date
    #[must_use]
    pub const fn new(title: String, description: String, prize: String) -> Self {
        Self {
            title,
            description,
            prize,
            draw_date: None,
        }
    }

    /// Sets the scheduled draw date
    #[must_use]
    pub fn with_draw_date(mut self, draw_date: DateTime<Utc>) -> Self {
        self.draw_date = Some(draw_date);
        self
    }
}

// ============================================================================
// Reservation Batch
// ============================================================================

/// A validated reservation request: one owner plus the numbers they want,
/// applied all-or-nothing.
///
/// Construction enforces the input rules (non-empty owner fields, non-empty
/// number list); duplicates in the requested list are collapsed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationBatch {
    owner: Owner,
    numbers: Vec<TicketNumber>,
}

impl ReservationBatch {
    /// Creates a validated `ReservationBatch`.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::InvalidInput`] if the number list is empty.
    pub fn new(owner: Owner, mut numbers: Vec<TicketNumber>) -> Result<Self, Rejection> {
        numbers.sort_unstable();
        numbers.dedup();

        if numbers.is_empty() {
            return Err(Rejection::InvalidInput {
                reason: "reservation batch must request at least one number".to_string(),
            });
        }

        Ok(Self { owner, numbers })
    }

    /// The participant making the reservation
    #[must_use]
    pub const fn owner(&self) -> &Owner {
        &self.owner
    }

    /// The requested numbers, sorted and deduplicated
    #[must_use]
    pub fn numbers(&self) -> &[TicketNumber] {
        &self.numbers
    }
}

// ============================================================================
// Draw Result
// ============================================================================

/// Outcome of a raffle draw, created exactly once per raffle at the moment
/// the lifecycle transitions `Active → Completed`.
///
/// Carries the eligible-pool snapshot the winner was selected from, for
/// auditability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawResult {
    /// The winning number
    pub winning_number: TicketNumber,
    /// When the draw happened
    pub drawn_at: DateTime<Utc>,
    /// The eligible pool the winner was selected from
    pub eligible_pool: Vec<TicketNumber>,
}

// ============================================================================
// Snapshots
// ============================================================================

/// Point-in-time state of a single number, as exposed by a snapshot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberEntry {
    /// The ticket number
    pub number: TicketNumber,
    /// The number's state at snapshot time
    pub state: NumberState,
}

/// Consistent point-in-time view of a raffle's full number range.
///
/// Never exposes a state mid-mutation: a snapshot is taken under the same
/// serialization discipline as writes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaffleSnapshot {
    /// The raffle this snapshot belongs to
    pub raffle_id: RaffleId,
    /// Lifecycle at snapshot time
    pub lifecycle: RaffleLifecycle,
    /// Winning number, present once the raffle completed
    pub winning_number: Option<TicketNumber>,
    /// Scheduled draw date carried over from the raffle's details
    pub draw_date: Option<DateTime<Utc>>,
    /// One entry per number in `[1, capacity]`, ascending
    pub numbers: Vec<NumberEntry>,
}

impl RaffleSnapshot {
    /// Looks up the state of a number in this snapshot
    #[must_use]
    pub fn state_of(&self, number: TicketNumber) -> Option<&NumberState> {
        self.numbers
            .iter()
            .find(|entry| entry.number == number)
            .map(|entry| &entry.state)
    }

    /// Counts numbers in the given status
    #[must_use]
    pub fn count_with_status(&self, status: NumberStatus) -> usize {
        self.numbers
            .iter()
            .filter(|entry| entry.state.status() == status)
            .count()
    }
}
