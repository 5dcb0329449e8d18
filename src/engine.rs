//! Reservation engine: per-raffle serialization and event fan-out.
//!
//! The engine owns the raffle registry and is the exclusive owner of
//! mutation rights to every [`RaffleInventory`]. Each raffle sits behind its
//! own `tokio::sync::RwLock`, so:
//!
//! - operations on different raffles never block each other;
//! - within one raffle, every mutating operation is fully serialized;
//! - snapshots take the read side and never observe a partial batch.
//!
//! Input validation (`InvalidInput` cases) is performed before the raffle
//! lock is taken; transitions inside the critical section are small, bounded
//! operations with no I/O. Domain events are delivered to the [`EventSink`]
//! strictly after the lock is released, and a delivery failure is logged,
//! never propagated: the committed mutation is the source of truth.

use crate::config::EngineConfig;
use crate::draw::DrawEngine;
use crate::environment::Clock;
use crate::error::Rejection;
use crate::events::{EventSink, RaffleEvent};
use crate::inventory::RaffleInventory;
use crate::types::{
    Capacity, DrawResult, RaffleDetails, RaffleId, RaffleSnapshot, ReservationBatch, TicketNumber,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// One registered raffle: immutable capacity outside the lock (for pre-lock
/// range checks), mutable inventory behind it.
struct RaffleHandle {
    capacity: Capacity,
    inventory: RwLock<RaffleInventory>,
}

/// Serializes concurrent batch requests per raffle and fans out domain
/// events.
///
/// Two concurrent `reserve` calls requesting overlapping numbers on the same
/// raffle never both succeed for the overlap: the lock totally orders them,
/// and the second observes the conflict as a whole-batch [`Rejection`].
pub struct ReservationEngine {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
    raffles: RwLock<HashMap<RaffleId, Arc<RaffleHandle>>>,
}

impl ReservationEngine {
    /// Creates an engine with the default configuration
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, sink: Arc<dyn EventSink>) -> Self {
        Self::with_config(EngineConfig::default(), clock, sink)
    }

    /// Creates an engine with an explicit configuration
    #[must_use]
    pub fn with_config(
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            clock,
            sink,
            raffles: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a new `Active` raffle and returns its id.
    ///
    /// When `capacity` is `None` the configured default (100) is used.
    pub async fn create_raffle(
        &self,
        details: RaffleDetails,
        capacity: Option<Capacity>,
    ) -> RaffleId {
        let raffle_id = RaffleId::new();
        let capacity = capacity.unwrap_or(self.config.default_capacity);
        let inventory =
            RaffleInventory::new(raffle_id, details, capacity, self.clock.now());

        let handle = Arc::new(RaffleHandle {
            capacity,
            inventory: RwLock::new(inventory),
        });
        self.raffles.write().await.insert(raffle_id, handle);

        tracing::info!(%raffle_id, %capacity, "raffle created");
        raffle_id
    }

    /// Ids of every registered raffle
    pub async fn raffle_ids(&self) -> Vec<RaffleId> {
        self.raffles.read().await.keys().copied().collect()
    }

    /// Reserves a batch of numbers for one owner, all-or-nothing.
    ///
    /// Emits [`RaffleEvent::NumbersReserved`] on success.
    ///
    /// # Errors
    ///
    /// [`Rejection::RaffleNotFound`], [`Rejection::InvalidInput`],
    /// [`Rejection::Conflict`], or [`Rejection::RaffleCompleted`].
    pub async fn reserve(
        &self,
        raffle_id: RaffleId,
        batch: ReservationBatch,
    ) -> Result<(), Rejection> {
        let handle = self.handle(raffle_id).await?;
        ensure_in_range(handle.capacity, batch.numbers())?;

        let event = {
            let mut inventory = handle.inventory.write().await;
            let now = self.clock.now();
            inventory.apply_reservation(&batch, now)?;
            RaffleEvent::NumbersReserved {
                raffle_id,
                owner: batch.owner().clone(),
                numbers: batch.numbers().to_vec(),
                at: now,
            }
        };

        tracing::debug!(%raffle_id, owner = %batch.owner(), count = batch.numbers().len(), "numbers reserved");
        self.publish(event).await;
        Ok(())
    }

    /// Applies a sequence of independent reservation batches (the bulk-import
    /// path), returning a per-item result list.
    ///
    /// No cross-call atomicity: a failure leaves prior successful batches
    /// committed, and the outcome of every batch is reported, never silently
    /// dropped.
    pub async fn reserve_many(
        &self,
        raffle_id: RaffleId,
        batches: Vec<ReservationBatch>,
    ) -> Vec<Result<(), Rejection>> {
        let mut results = Vec::with_capacity(batches.len());
        for batch in batches {
            results.push(self.reserve(raffle_id, batch).await);
        }
        results
    }

    /// Confirms purchase of reserved numbers, all-or-nothing.
    ///
    /// Emits [`RaffleEvent::NumbersSold`] on success.
    ///
    /// # Errors
    ///
    /// [`Rejection::RaffleNotFound`], [`Rejection::InvalidInput`],
    /// [`Rejection::Conflict`], or [`Rejection::RaffleCompleted`].
    pub async fn confirm_purchase(
        &self,
        raffle_id: RaffleId,
        numbers: Vec<TicketNumber>,
    ) -> Result<(), Rejection> {
        let handle = self.handle(raffle_id).await?;
        if numbers.is_empty() {
            return Err(Rejection::invalid_input(
                "purchase confirmation must list at least one number",
            ));
        }
        ensure_in_range(handle.capacity, &numbers)?;

        let event = {
            let mut inventory = handle.inventory.write().await;
            let now = self.clock.now();
            inventory.confirm_purchase(&numbers, now)?;
            RaffleEvent::NumbersSold {
                raffle_id,
                numbers: numbers.clone(),
                at: now,
            }
        };

        tracing::debug!(%raffle_id, count = numbers.len(), "numbers sold");
        self.publish(event).await;
        Ok(())
    }

    /// Releases numbers back to the available pool, best-effort per number.
    ///
    /// Emits [`RaffleEvent::NumbersReleased`] for the numbers actually
    /// released (no event when the call was a complete no-op).
    ///
    /// # Errors
    ///
    /// [`Rejection::RaffleNotFound`], [`Rejection::InvalidInput`] on an empty
    /// list, or [`Rejection::RaffleCompleted`].
    pub async fn cancel(
        &self,
        raffle_id: RaffleId,
        numbers: Vec<TicketNumber>,
    ) -> Result<(), Rejection> {
        let handle = self.handle(raffle_id).await?;
        if numbers.is_empty() {
            return Err(Rejection::invalid_input(
                "cancellation must list at least one number",
            ));
        }

        let event = {
            let mut inventory = handle.inventory.write().await;
            let released = inventory.cancel(&numbers)?;
            if released.is_empty() {
                None
            } else {
                Some(RaffleEvent::NumbersReleased {
                    raffle_id,
                    numbers: released,
                    at: self.clock.now(),
                })
            }
        };

        if let Some(event) = event {
            tracing::debug!(%raffle_id, "numbers released");
            self.publish(event).await;
        }
        Ok(())
    }

    /// Draws a winning number and completes the raffle.
    ///
    /// When `seed` is supplied the outcome is deterministic for the same
    /// inventory state and seed. Emits [`RaffleEvent::RaffleDrawn`] on
    /// success.
    ///
    /// # Errors
    ///
    /// [`Rejection::RaffleNotFound`], [`Rejection::RaffleCompleted`], or
    /// [`Rejection::NoEligibleNumbers`].
    pub async fn draw(
        &self,
        raffle_id: RaffleId,
        seed: Option<u64>,
    ) -> Result<DrawResult, Rejection> {
        let handle = self.handle(raffle_id).await?;

        let (result, event) = {
            let mut inventory = handle.inventory.write().await;
            let mut rng = DrawEngine::rng_for(seed);
            let result = DrawEngine::draw(&mut inventory, &mut rng, self.clock.now())?;
            let event = RaffleEvent::RaffleDrawn {
                raffle_id,
                winning_number: result.winning_number,
                at: result.drawn_at,
            };
            (result, event)
        };

        tracing::info!(%raffle_id, winning_number = %result.winning_number, "raffle drawn");
        self.publish(event).await;
        Ok(result)
    }

    /// Consistent point-in-time view of a raffle.
    ///
    /// Served from the last committed state; never observes a mutation in
    /// progress.
    ///
    /// # Errors
    ///
    /// [`Rejection::RaffleNotFound`].
    pub async fn snapshot(&self, raffle_id: RaffleId) -> Result<RaffleSnapshot, Rejection> {
        let handle = self.handle(raffle_id).await?;
        let inventory = handle.inventory.read().await;
        Ok(inventory.snapshot())
    }

    /// Looks up a raffle handle, holding the registry lock only long enough
    /// to clone the `Arc`.
    async fn handle(&self, raffle_id: RaffleId) -> Result<Arc<RaffleHandle>, Rejection> {
        self.raffles
            .read()
            .await
            .get(&raffle_id)
            .cloned()
            .ok_or(Rejection::RaffleNotFound { raffle_id })
    }

    /// Best-effort event delivery, after the raffle lock is released.
    async fn publish(&self, event: RaffleEvent) {
        if let Err(error) = self.sink.publish(&event).await {
            tracing::warn!(
                %error,
                event_type = event.event_type(),
                raffle_id = %event.raffle_id(),
                "event delivery failed; inventory mutation stays committed"
            );
        }
    }
}

fn ensure_in_range(capacity: Capacity, numbers: &[TicketNumber]) -> Result<(), Rejection> {
    let out_of_range: Vec<String> = numbers
        .iter()
        .filter(|number| !capacity.contains(**number))
        .map(ToString::to_string)
        .collect();

    if out_of_range.is_empty() {
        Ok(())
    } else {
        Err(Rejection::invalid_input(format!(
            "numbers out of range [1, {capacity}]: {}",
            out_of_range.join(", ")
        )))
    }
}
