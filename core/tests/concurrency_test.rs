//! Optimistic concurrency and concurrent writers.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use chrono::Duration;
use flight_schedule_core::{Airline, FlightSchedule, Gate, Record, StoreError};
use flight_schedule_testing::helpers::init_tracing;
use flight_schedule_testing::{fixtures, test_epoch, ManualClock};
use std::collections::BTreeSet;
use std::sync::Arc;

#[tokio::test]
async fn test_stale_update_leaves_record_unchanged() {
    init_tracing();
    let schedule = fixtures::reference_schedule().await.unwrap();
    let loaded_by_alice = schedule.airlines.get(1).await.unwrap();
    let loaded_by_bob = loaded_by_alice.clone();

    let saved = schedule
        .airlines
        .update(loaded_by_alice.with_description("Alice was here"))
        .await
        .unwrap();

    let err = schedule
        .airlines
        .update(loaded_by_bob.with_description("Bob was here"))
        .await
        .unwrap_err();

    assert_eq!(err, StoreError::Conflict { kind: "Airline", id: 1 });
    assert_eq!(schedule.airlines.get(1).await.unwrap(), saved);
}

#[tokio::test]
async fn test_reloaded_record_can_be_saved() {
    init_tracing();
    let schedule = fixtures::reference_schedule().await.unwrap();
    let first = schedule.airlines.get(1).await.unwrap();
    schedule.airlines.update(first.with_description("one")).await.unwrap();

    let reloaded = schedule.airlines.get(1).await.unwrap();
    let saved = schedule.airlines.update(reloaded.with_description("two")).await.unwrap();

    assert_eq!(saved.header.description.as_deref(), Some("two"));
}

#[tokio::test]
async fn test_edit_marker_tracks_clock() {
    init_tracing();
    let clock = Arc::new(ManualClock::new(test_epoch()));
    let schedule = FlightSchedule::new(clock.clone());
    let gate = schedule.gates.create(Gate::new("A1")).await.unwrap();
    assert_eq!(gate.header.created_on, test_epoch());

    clock.advance(Duration::minutes(5));
    let updated = schedule.gates.update(gate).await.unwrap();

    assert_eq!(updated.header.created_on, test_epoch());
    assert_eq!(updated.header.last_edited_on, Some(test_epoch() + Duration::minutes(5)));
}

#[tokio::test]
async fn test_concurrent_creates_get_distinct_ids() {
    init_tracing();
    let schedule = fixtures::reference_schedule().await.unwrap();

    let mut handles = Vec::new();
    for n in 0..20 {
        let airlines = Arc::clone(&schedule.airlines);
        handles.push(tokio::spawn(async move {
            airlines
                .create(Airline::new(format!("Carrier {n}"), format!("{n:02}")).with_sort_destination(1))
                .await
        }));
    }

    let mut ids = BTreeSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap().unwrap().id());
    }

    assert_eq!(ids.len(), 20);
    assert_eq!(schedule.airlines.count_all().await, 22);
}

#[tokio::test]
async fn test_concurrent_duplicate_creates_admit_one() {
    init_tracing();
    let schedule = fixtures::reference_schedule().await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let flights = Arc::clone(&schedule.flights);
        handles.push(tokio::spawn(async move {
            flights.create(fixtures::flight(1, "4444", "ZZZ")).await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 1);
}
