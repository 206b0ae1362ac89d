//! Reference data for tests.
//!
//! Everything is created through the public store API, so fixtures obey
//! the same rules as client data.

use crate::mocks::test_clock;
use chrono::NaiveTime;
use flight_schedule_core::{
    Airline, CodeShare, Flight, FlightSchedule, Gate, RecordId, Result, SortDestination,
};
use std::sync::Arc;

/// Identity of the first seeded gate, sort destination and airline.
pub const DEFAULT_ID: RecordId = 1;

/// Empty schedule on the fixed test clock.
#[must_use]
pub fn empty_schedule() -> FlightSchedule {
    FlightSchedule::new(Arc::new(test_clock()))
}

/// Schedule holding sort destinations `MU1`..`MU3`, gates `A1`..`A3` and
/// two airlines: American (id 1) and Delta (id 2).
///
/// # Errors
///
/// Returns the store error if any fixture record is rejected.
pub async fn reference_schedule() -> Result<FlightSchedule> {
    let schedule = empty_schedule();
    seed_reference_data(&schedule).await?;
    Ok(schedule)
}

/// Adds the reference records of [`reference_schedule`] to `schedule`.
///
/// # Errors
///
/// Returns the store error if any fixture record is rejected.
pub async fn seed_reference_data(schedule: &FlightSchedule) -> Result<()> {
    for n in 1..=3 {
        schedule
            .sort_destinations
            .create(SortDestination::new(format!("MU{n}")))
            .await?;
        schedule.gates.create(Gate::new(format!("A{n}"))).await?;
    }
    schedule.airlines.create(american()).await?;
    schedule.airlines.create(delta()).await?;
    Ok(())
}

/// American Airlines, unsaved.
#[must_use]
pub fn american() -> Airline {
    Airline::new("American Airlines", "AA")
        .with_icao("AAL")
        .with_number_code("001")
        .with_sort_destination(DEFAULT_ID)
}

/// Delta Air Lines, unsaved.
#[must_use]
pub fn delta() -> Airline {
    Airline::new("Delta Air Lines", "DL")
        .with_icao("DAL")
        .with_number_code("006")
        .with_sort_destination(DEFAULT_ID)
}

/// A valid, unsaved flight for `airline_id` using the default gate and
/// sort destination.
#[must_use]
pub fn flight(airline_id: RecordId, flight_number: &str, destination: &str) -> Flight {
    Flight::new(
        format!("{flight_number} to {destination}"),
        airline_id,
        flight_number,
        destination,
    )
    .at_gate(DEFAULT_ID)
    .sorted_to(DEFAULT_ID)
    .departing_at(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default())
}

/// Like [`flight`] with one codeshare.
#[must_use]
pub fn codeshared_flight(
    airline_id: RecordId,
    flight_number: &str,
    destination: &str,
    partner: CodeShare,
) -> Flight {
    flight(airline_id, flight_number, destination).with_code_share(partner)
}
