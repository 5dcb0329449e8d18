//! # Raffle Engine
//!
//! Number inventory and reservation engine for numbered-ticket raffles: a
//! fixed pool of unique numbers per raffle, each independently progressing
//! `Available → Reserved → Sold` under concurrent access, culminating in a
//! seedable random draw that completes the raffle.
//!
//! # Architecture
//!
//! ```text
//!                 ┌─────────────────────┐
//!    requests ───▶│  ReservationEngine  │  per-raffle RwLock,
//!                 │   (serialization)   │  all-or-nothing batches
//!                 └─────────┬───────────┘
//!                           │ exclusive access per raffle
//!            ┌──────────────┼──────────────┐
//!            ▼              ▼              ▼
//!     ┌────────────┐ ┌────────────┐ ┌────────────┐
//!     │  Raffle    │ │  Raffle    │ │  Raffle    │   one inventory
//!     │ Inventory  │ │ Inventory  │ │ Inventory  │   per raffle
//!     └────────────┘ └─────┬──────┘ └────────────┘
//!                          │ eligible pool
//!                          ▼
//!                   ┌────────────┐      ┌────────────┐
//!                   │ DrawEngine │─────▶│ EventSink  │  after the lock
//!                   │ (seedable) │      │ (boundary) │  is released
//!                   └────────────┘      └────────────┘
//! ```
//!
//! # Guarantees
//!
//! - **Uniqueness**: no two participants ever hold the same number; the
//!   state mapping always partitions the number range.
//! - **Atomicity**: a reservation or purchase batch applies completely or
//!   not at all, even under concurrent overlapping submissions.
//! - **Terminal immutability**: a completed raffle rejects every further
//!   mutation; the winning number is recorded exactly once.
//! - **Reproducible draws**: the random source is injected per draw, so a
//!   seeded draw is deterministic for the same inventory state.
//! - **Best-effort events**: domain events are delivered after the raffle
//!   lock is released and never roll back a committed mutation.
//!
//! # Example
//!
//! ```
//! use raffle_engine::{
//!     Capacity, InMemoryEventSink, Owner, RaffleDetails, ReservationBatch,
//!     ReservationEngine, SystemClock, TicketNumber,
//! };
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), raffle_engine::Rejection> {
//! let sink = Arc::new(InMemoryEventSink::new());
//! let engine = ReservationEngine::new(Arc::new(SystemClock), sink);
//!
//! let raffle_id = engine
//!     .create_raffle(
//!         RaffleDetails::new(
//!             "Smartphone Raffle".into(),
//!             "Win a brand-new phone".into(),
//!             "Smartphone".into(),
//!         ),
//!         Some(Capacity::new(10)),
//!     )
//!     .await;
//!
//! let batch = ReservationBatch::new(
//!     Owner::new("Ana", "ana@x.com")?,
//!     vec![TicketNumber::new(3), TicketNumber::new(7)],
//! )?;
//! engine.reserve(raffle_id, batch).await?;
//! engine.confirm_purchase(raffle_id, vec![TicketNumber::new(3)]).await?;
//!
//! let result = engine.draw(raffle_id, Some(42)).await?;
//! assert!(result.eligible_pool.contains(&result.winning_number));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod draw;
pub mod engine;
pub mod environment;
pub mod error;
pub mod events;
pub mod inventory;
pub mod types;

pub use config::EngineConfig;
pub use draw::DrawEngine;
pub use engine::ReservationEngine;
pub use environment::{Clock, FixedClock, SystemClock};
pub use error::Rejection;
pub use events::{EventSink, EventSinkError, InMemoryEventSink, RaffleEvent, TracingEventSink};
pub use inventory::RaffleInventory;
pub use types::{
    Capacity, DrawResult, NumberEntry, NumberState, NumberStatus, Owner, RaffleDetails, RaffleId,
    RaffleLifecycle, RaffleSnapshot, ReservationBatch, TicketNumber,
};
