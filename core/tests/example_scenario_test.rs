//! The end to end walk through: airline, duplicate ICAO, flight, duplicate
//! flight, airline delete.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use flight_schedule_core::{Airline, Flight, FlightSchedule, Gate, Record, SortDestination, StoreError};
use flight_schedule_testing::test_clock;
use std::sync::Arc;

#[tokio::test]
async fn test_example_scenario() {
    let schedule = FlightSchedule::new(Arc::new(test_clock()));
    let mu1 = schedule.sort_destinations.create(SortDestination::new("MU1")).await.unwrap();
    let a1 = schedule.gates.create(Gate::new("A1")).await.unwrap();

    let aa = schedule
        .airlines
        .create(
            Airline::new("American Airlines", "AA")
                .with_icao("AAL")
                .with_number_code("001")
                .with_sort_destination(mu1.id()),
        )
        .await
        .unwrap();
    assert_eq!(aa.id(), 1);

    let clash = schedule
        .airlines
        .create(
            Airline::new("Another", "AN")
                .with_icao("AAL")
                .with_sort_destination(mu1.id()),
        )
        .await
        .unwrap_err();
    assert!(clash.validation_errors().unwrap().has_field("ICAO"));

    let flight = Flight::new("AA 1234", aa.id(), "1234", "ZZZ")
        .at_gate(a1.id())
        .sorted_to(mu1.id());
    schedule.flights.create(flight.clone()).await.unwrap();

    let duplicate = schedule.flights.create(flight).await.unwrap_err();
    assert_eq!(
        duplicate
            .validation_errors()
            .unwrap()
            .messages_for("FlightNumber"),
        vec!["The flight already exists in the schedule."]
    );

    schedule.airlines.delete(aa.id()).await.unwrap();
    assert!(schedule.flights.get_all().await.is_empty());
    assert!(matches!(
        schedule.airlines.get(aa.id()).await,
        Err(StoreError::NotFound { .. })
    ));
}
