//! Domain events and the sink boundary.
//!
//! The engine only *produces* events; rendering, notification display, and
//! audit storage live behind the [`EventSink`] trait. Delivery is
//! at-least-once and strictly best-effort: a committed inventory mutation is
//! the source of truth and is never rolled back because a sink was slow or
//! failed. The engine therefore delivers events only after the raffle lock
//! has been released.
//!
//! # Event Naming Convention
//!
//! [`RaffleEvent::event_type`] returns a stable, versioned identifier
//! (`"NumbersReserved.v1"`, ...) so downstream consumers can evolve schemas
//! over time.

use crate::types::{Owner, RaffleId, TicketNumber};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// A fact about something that happened to a raffle's inventory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaffleEvent {
    /// Numbers were reserved by a participant
    NumbersReserved {
        /// Raffle the numbers belong to
        raffle_id: RaffleId,
        /// Participant holding the reservation
        owner: Owner,
        /// The reserved numbers
        numbers: Vec<TicketNumber>,
        /// When the reservation was applied
        at: DateTime<Utc>,
    },

    /// Reserved numbers were confirmed as purchased
    NumbersSold {
        /// Raffle the numbers belong to
        raffle_id: RaffleId,
        /// The purchased numbers
        numbers: Vec<TicketNumber>,
        /// When the purchase was confirmed
        at: DateTime<Utc>,
    },

    /// Numbers were released back to the available pool
    NumbersReleased {
        /// Raffle the numbers belong to
        raffle_id: RaffleId,
        /// The released numbers
        numbers: Vec<TicketNumber>,
        /// When the release was applied
        at: DateTime<Utc>,
    },

    /// A winning number was drawn and the raffle completed
    RaffleDrawn {
        /// The completed raffle
        raffle_id: RaffleId,
        /// The winning number
        winning_number: TicketNumber,
        /// When the draw happened
        at: DateTime<Utc>,
    },
}

impl RaffleEvent {
    /// Stable, versioned event-type identifier
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::NumbersReserved { .. } => "NumbersReserved.v1",
            Self::NumbersSold { .. } => "NumbersSold.v1",
            Self::NumbersReleased { .. } => "NumbersReleased.v1",
            Self::RaffleDrawn { .. } => "RaffleDrawn.v1",
        }
    }

    /// The raffle this event belongs to
    #[must_use]
    pub const fn raffle_id(&self) -> RaffleId {
        match self {
            Self::NumbersReserved { raffle_id, .. }
            | Self::NumbersSold { raffle_id, .. }
            | Self::NumbersReleased { raffle_id, .. }
            | Self::RaffleDrawn { raffle_id, .. } => *raffle_id,
        }
    }
}

/// Errors that can occur while delivering an event to a sink.
///
/// Local to the emission step: the engine logs the failure and moves on,
/// it never fails the caller's mutation because of it.
#[derive(Error, Debug, Clone)]
pub enum EventSinkError {
    /// The sink could not accept the event
    #[error("event delivery failed: {reason}")]
    DeliveryFailed {
        /// Why delivery failed
        reason: String,
    },
}

/// External collaborator receiving domain events for downstream
/// notification and audit.
///
/// Implementations must tolerate at-least-once delivery. Delivery happens
/// outside the raffle lock, so a slow sink never stalls other participants.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver a single event.
    ///
    /// # Errors
    ///
    /// Returns [`EventSinkError`] if the event could not be delivered; the
    /// engine treats this as non-fatal.
    async fn publish(&self, event: &RaffleEvent) -> Result<(), EventSinkError>;
}

/// Sink that emits events as structured log lines.
///
/// The stand-in for the original system's toast/notification feed.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn publish(&self, event: &RaffleEvent) -> Result<(), EventSinkError> {
        tracing::info!(
            event_type = event.event_type(),
            raffle_id = %event.raffle_id(),
            ?event,
            "domain event"
        );
        Ok(())
    }
}

/// Sink that captures events in memory, for tests and local inspection
#[derive(Debug, Default)]
pub struct InMemoryEventSink {
    events: Mutex<Vec<RaffleEvent>>,
}

impl InMemoryEventSink {
    /// Creates an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every event delivered so far, in delivery order
    #[must_use]
    pub fn published(&self) -> Vec<RaffleEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drains and returns the captured events
    #[must_use]
    pub fn take(&self) -> Vec<RaffleEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[async_trait]
impl EventSink for InMemoryEventSink {
    async fn publish(&self, event: &RaffleEvent) -> Result<(), EventSinkError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        Ok(())
    }
}
