//! Demo walkthrough of the raffle engine.
//!
//! Creates a raffle, reserves and purchases numbers, cancels a hold, and
//! runs a seeded draw, with every domain event landing in the log via
//! [`TracingEventSink`].

use raffle_engine::{
    Capacity, EngineConfig, NumberStatus, Owner, RaffleDetails, Rejection, ReservationBatch,
    ReservationEngine, SystemClock, TicketNumber, TracingEventSink,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Rejection> {
    let config = EngineConfig::from_env();
    config.init_tracing();

    let engine = ReservationEngine::with_config(
        config,
        Arc::new(SystemClock),
        Arc::new(TracingEventSink),
    );

    let raffle_id = engine
        .create_raffle(
            RaffleDetails::new(
                "Smartphone Raffle".to_string(),
                "Win a brand-new smartphone!".to_string(),
                "Smartphone".to_string(),
            ),
            Some(Capacity::new(10)),
        )
        .await;

    // Ana reserves 3 and 7.
    engine
        .reserve(
            raffle_id,
            ReservationBatch::new(
                Owner::new("Ana", "ana@x.com")?,
                vec![TicketNumber::new(3), TicketNumber::new(7)],
            )?,
        )
        .await?;

    // Bea's overlapping batch is rejected whole.
    let conflict = engine
        .reserve(
            raffle_id,
            ReservationBatch::new(
                Owner::new("Bea", "bea@x.com")?,
                vec![TicketNumber::new(3), TicketNumber::new(5)],
            )?,
        )
        .await;
    match conflict {
        Err(rejection) => tracing::info!(%rejection, "overlapping reservation rejected"),
        Ok(()) => tracing::warn!("expected a conflict for the overlapping batch"),
    }

    // Ana pays for 3 and gives 7 back.
    engine
        .confirm_purchase(raffle_id, vec![TicketNumber::new(3)])
        .await?;
    engine.cancel(raffle_id, vec![TicketNumber::new(7)]).await?;

    let result = engine.draw(raffle_id, Some(42)).await?;
    let snapshot = engine.snapshot(raffle_id).await?;
    tracing::info!(
        raffles = engine.raffle_ids().await.len(),
        winning_number = %result.winning_number,
        sold = snapshot.count_with_status(NumberStatus::Sold),
        available = snapshot.count_with_status(NumberStatus::Available),
        "raffle completed"
    );

    Ok(())
}
