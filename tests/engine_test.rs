//! End-to-end engine behavior tests.
//!
//! Walks the full raffle lifecycle through the `ReservationEngine` boundary:
//! reservation, conflict rejection, purchase, cancellation, seeded draw, and
//! terminal immutability, with domain events captured by an in-memory sink.
//!
//! Run with: `cargo test --test engine_test`

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use raffle_engine::{
    Capacity, EventSink, EventSinkError, FixedClock, InMemoryEventSink, NumberState, NumberStatus,
    Owner, RaffleDetails, RaffleEvent, RaffleId, RaffleLifecycle, Rejection, ReservationBatch,
    ReservationEngine, SystemClock, TicketNumber,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

fn numbers(values: &[u32]) -> Vec<TicketNumber> {
    values.iter().copied().map(TicketNumber::new).collect()
}

fn batch(name: &str, email: &str, values: &[u32]) -> ReservationBatch {
    ReservationBatch::new(Owner::new(name, email).unwrap(), numbers(values)).unwrap()
}

fn test_engine() -> (ReservationEngine, Arc<InMemoryEventSink>) {
    let sink = Arc::new(InMemoryEventSink::new());
    let engine = ReservationEngine::new(Arc::new(SystemClock), sink.clone());
    (engine, sink)
}

async fn ten_number_raffle(engine: &ReservationEngine) -> RaffleId {
    engine
        .create_raffle(
            RaffleDetails::new(
                "Console Raffle".to_string(),
                "PlayStation with two controllers".to_string(),
                "Game console".to_string(),
            ),
            Some(Capacity::new(10)),
        )
        .await
}

/// Reserve, conflict, confirm, cancel, draw, and snapshot as one
/// continuous walkthrough of a ten-number raffle.
#[tokio::test]
async fn full_raffle_lifecycle() {
    let (engine, sink) = test_engine();
    let raffle_id = ten_number_raffle(&engine).await;

    // 1. Reserve {Ana, [3, 7]} → ok.
    engine
        .reserve(raffle_id, batch("Ana", "ana@x.com", &[3, 7]))
        .await
        .unwrap();
    let snapshot = engine.snapshot(raffle_id).await.unwrap();
    for value in [3, 7] {
        let state = snapshot.state_of(TicketNumber::new(value)).unwrap();
        assert_eq!(state.status(), NumberStatus::Reserved);
        assert_eq!(state.owner().unwrap().name, "Ana");
    }

    // 2. Overlapping {Bea, [3, 5]} → rejected whole, conflicting=[3].
    let rejection = engine
        .reserve(raffle_id, batch("Bea", "bea@x.com", &[3, 5]))
        .await
        .unwrap_err();
    assert_eq!(
        rejection,
        Rejection::Conflict {
            numbers: numbers(&[3])
        }
    );
    let snapshot = engine.snapshot(raffle_id).await.unwrap();
    assert!(
        snapshot
            .state_of(TicketNumber::new(5))
            .unwrap()
            .is_available()
    );

    // 3. Confirm purchase of [3] → Sold, owner preserved, purchased_at set.
    engine
        .confirm_purchase(raffle_id, numbers(&[3]))
        .await
        .unwrap();
    let snapshot = engine.snapshot(raffle_id).await.unwrap();
    match snapshot.state_of(TicketNumber::new(3)).unwrap() {
        NumberState::Sold { owner, .. } => assert_eq!(owner.name, "Ana"),
        state => panic!("expected Sold, got {state:?}"),
    }

    // 4. Cancel [7] → available again, owner metadata cleared.
    engine.cancel(raffle_id, numbers(&[7])).await.unwrap();
    let snapshot = engine.snapshot(raffle_id).await.unwrap();
    assert!(
        snapshot
            .state_of(TicketNumber::new(7))
            .unwrap()
            .is_available()
    );

    // 5. Draw with seed 42: only number 3 is held, so it must win.
    let result = engine.draw(raffle_id, Some(42)).await.unwrap();
    assert_eq!(result.winning_number, TicketNumber::new(3));
    assert_eq!(result.eligible_pool, numbers(&[3]));
    let snapshot = engine.snapshot(raffle_id).await.unwrap();
    assert_eq!(snapshot.lifecycle, RaffleLifecycle::Completed);
    assert_eq!(snapshot.winning_number, Some(TicketNumber::new(3)));

    // 6. Every subsequent mutation is rejected with RaffleCompleted.
    let completed = Rejection::RaffleCompleted { raffle_id };
    assert_eq!(
        engine
            .reserve(raffle_id, batch("Cid", "cid@x.com", &[8]))
            .await
            .unwrap_err(),
        completed
    );
    assert_eq!(
        engine
            .confirm_purchase(raffle_id, numbers(&[3]))
            .await
            .unwrap_err(),
        completed
    );
    assert_eq!(
        engine.cancel(raffle_id, numbers(&[3])).await.unwrap_err(),
        completed
    );
    assert_eq!(engine.draw(raffle_id, Some(7)).await.unwrap_err(), completed);

    // Event stream: reserved, sold, released, drawn — in commit order.
    let kinds: Vec<&'static str> = sink
        .published()
        .iter()
        .map(RaffleEvent::event_type)
        .collect();
    assert_eq!(
        kinds,
        vec![
            "NumbersReserved.v1",
            "NumbersSold.v1",
            "NumbersReleased.v1",
            "RaffleDrawn.v1"
        ]
    );
}

#[tokio::test]
async fn unknown_raffle_is_rejected() {
    let (engine, _sink) = test_engine();
    let raffle_id = RaffleId::new();

    assert_eq!(
        engine
            .reserve(raffle_id, batch("Ana", "ana@x.com", &[1]))
            .await
            .unwrap_err(),
        Rejection::RaffleNotFound { raffle_id }
    );
    assert_eq!(
        engine.snapshot(raffle_id).await.unwrap_err(),
        Rejection::RaffleNotFound { raffle_id }
    );
}

#[tokio::test]
async fn invalid_input_is_rejected_before_any_state_change() {
    let (engine, sink) = test_engine();
    let raffle_id = ten_number_raffle(&engine).await;

    // Out-of-range numbers.
    assert!(matches!(
        engine
            .reserve(raffle_id, batch("Ana", "ana@x.com", &[9, 11]))
            .await
            .unwrap_err(),
        Rejection::InvalidInput { .. }
    ));
    // Empty number lists.
    assert!(matches!(
        engine.confirm_purchase(raffle_id, vec![]).await.unwrap_err(),
        Rejection::InvalidInput { .. }
    ));
    assert!(matches!(
        engine.cancel(raffle_id, vec![]).await.unwrap_err(),
        Rejection::InvalidInput { .. }
    ));

    // Nothing mutated, nothing emitted.
    let snapshot = engine.snapshot(raffle_id).await.unwrap();
    assert_eq!(snapshot.count_with_status(NumberStatus::Available), 10);
    assert!(sink.published().is_empty());
}

#[tokio::test]
async fn cancellation_of_unheld_numbers_is_silent_and_emits_nothing() {
    let (engine, sink) = test_engine();
    let raffle_id = ten_number_raffle(&engine).await;

    // Best-effort: nothing held, call still succeeds, no event.
    engine.cancel(raffle_id, numbers(&[2, 4])).await.unwrap();
    assert!(sink.published().is_empty());

    engine
        .reserve(raffle_id, batch("Ana", "ana@x.com", &[2]))
        .await
        .unwrap();
    engine.cancel(raffle_id, numbers(&[2, 4])).await.unwrap();

    // Only the actually-released number appears in the event.
    let released = sink
        .published()
        .into_iter()
        .find_map(|event| match event {
            RaffleEvent::NumbersReleased { numbers, .. } => Some(numbers),
            _ => None,
        })
        .unwrap();
    assert_eq!(released, numbers(&[2]));
}

#[tokio::test]
async fn bulk_import_reports_per_item_results() {
    let (engine, _sink) = test_engine();
    let raffle_id = ten_number_raffle(&engine).await;

    // Rows from a parsed external list become independent reserve calls.
    let results = engine
        .reserve_many(
            raffle_id,
            vec![
                batch("Ana", "ana@x.com", &[1, 2]),
                batch("Bea", "bea@x.com", &[2, 3]), // overlaps Ana's row
                batch("Cid", "cid@x.com", &[4]),
            ],
        )
        .await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert_eq!(
        results[1],
        Err(Rejection::Conflict {
            numbers: numbers(&[2])
        })
    );
    assert!(results[2].is_ok());

    // Prior successes stay committed despite the middle failure.
    let snapshot = engine.snapshot(raffle_id).await.unwrap();
    assert_eq!(snapshot.count_with_status(NumberStatus::Reserved), 3);
    assert!(
        snapshot
            .state_of(TicketNumber::new(3))
            .unwrap()
            .is_available()
    );
}

#[tokio::test]
async fn seeded_draw_is_reproducible_across_identical_inventories() {
    let (engine, _sink) = test_engine();

    let mut winners = Vec::new();
    for _ in 0..3 {
        let raffle_id = ten_number_raffle(&engine).await;
        engine
            .reserve(raffle_id, batch("Ana", "ana@x.com", &[2, 4, 6, 8]))
            .await
            .unwrap();
        winners.push(engine.draw(raffle_id, Some(7)).await.unwrap().winning_number);
    }

    assert_eq!(winners[0], winners[1]);
    assert_eq!(winners[1], winners[2]);
}

#[tokio::test]
async fn snapshot_serializes_for_the_boundary_contract() {
    let clock = FixedClock::new(Utc::now());
    let sink = Arc::new(InMemoryEventSink::new());
    let engine = ReservationEngine::new(Arc::new(clock), sink);

    let scheduled_draw = Utc::now() + chrono::Duration::days(7);
    let raffle_id = engine
        .create_raffle(
            RaffleDetails::new(
                "Charity Raffle".to_string(),
                "All proceeds go to the animal shelter".to_string(),
                "Smart TV".to_string(),
            )
            .with_draw_date(scheduled_draw),
            Some(Capacity::new(3)),
        )
        .await;
    engine
        .reserve(raffle_id, batch("Ana", "ana@x.com", &[2]))
        .await
        .unwrap();

    let snapshot = engine.snapshot(raffle_id).await.unwrap();
    let json = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(json["raffle_id"], serde_json::json!(raffle_id));
    assert_eq!(json["lifecycle"], serde_json::json!("Active"));
    assert_eq!(json["numbers"].as_array().unwrap().len(), 3);
    assert_eq!(json["numbers"][1]["number"], serde_json::json!(2));
    assert_eq!(json["draw_date"], serde_json::json!(scheduled_draw));

    let roundtrip: raffle_engine::RaffleSnapshot = serde_json::from_value(json).unwrap();
    assert_eq!(roundtrip, snapshot);
}

/// A sink that always fails delivery. The engine must log and carry on.
struct FailingSink;

#[async_trait]
impl EventSink for FailingSink {
    async fn publish(&self, _event: &RaffleEvent) -> Result<(), EventSinkError> {
        Err(EventSinkError::DeliveryFailed {
            reason: "sink offline".to_string(),
        })
    }
}

#[tokio::test]
async fn sink_failure_never_rolls_back_the_mutation() {
    let engine = ReservationEngine::new(Arc::new(SystemClock), Arc::new(FailingSink));
    let raffle_id = ten_number_raffle(&engine).await;

    engine
        .reserve(raffle_id, batch("Ana", "ana@x.com", &[3]))
        .await
        .unwrap();

    // The reservation is committed even though delivery failed.
    let snapshot = engine.snapshot(raffle_id).await.unwrap();
    assert_eq!(
        snapshot.state_of(TicketNumber::new(3)).unwrap().status(),
        NumberStatus::Reserved
    );
}
