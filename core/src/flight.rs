//! Flights, codeshares and the airline cascade.

use crate::airline::{Airline, AirlineStore};
use crate::environment::Clock;
use crate::gate::GateStore;
use crate::record::{Record, RecordHeader, RecordId};
use crate::sort_destination::SortDestinationStore;
use crate::store::{DeletionListener, MemoryStore, Snapshot, StoreOptions, Validator, WriteTicket};
use crate::validation::{self, ValidationErrors};
use chrono::NaiveTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock, Weak};

#[allow(clippy::expect_used)]
static FLIGHT_NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4}|([0-9]{4}[A-Z]{1}))$").expect("flight number: invalid regex pattern")
});

#[allow(clippy::expect_used)]
static DESTINATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("destination: invalid regex pattern"));

/// Another airline's number for the same physical flight.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeShare {
    /// Marketing airline
    #[serde(rename = "airlineID", default)]
    pub airline_id: RecordId,
    /// The marketing airline's flight number
    #[serde(rename = "flightNumber", default)]
    pub flight_number: String,
}

impl CodeShare {
    /// Creates a codeshare entry.
    #[must_use]
    pub fn new(airline_id: RecordId, flight_number: impl Into<String>) -> Self {
        Self {
            airline_id,
            flight_number: flight_number.into(),
        }
    }
}

/// A scheduled departure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    /// Shared header
    #[serde(flatten)]
    pub header: RecordHeader,
    /// Operating airline
    #[serde(rename = "airlineID", default)]
    pub airline_id: RecordId,
    /// Marketing airlines for the same departure
    #[serde(default)]
    pub code_shares: Vec<CodeShare>,
    /// Scheduled time of day
    #[serde(default)]
    pub depart_time: NaiveTime,
    /// Four digits, optionally followed by one capital letter
    #[serde(default)]
    pub flight_number: String,
    /// Assigned gate
    #[serde(rename = "gateID", default)]
    pub gate_id: RecordId,
    /// Next destination as a three letter city code
    #[serde(default)]
    pub destination: String,
    /// Where the flight's bags are sorted
    #[serde(rename = "sortDestinationID", default)]
    pub sort_destination_id: RecordId,
}

impl Flight {
    /// Creates an unsaved flight for `airline_id`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        airline_id: RecordId,
        flight_number: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            header: RecordHeader::named(name),
            airline_id,
            flight_number: flight_number.into(),
            destination: destination.into(),
            ..Self::default()
        }
    }

    /// Sets the gate.
    #[must_use]
    pub const fn at_gate(mut self, gate_id: RecordId) -> Self {
        self.gate_id = gate_id;
        self
    }

    /// Sets the sort destination.
    #[must_use]
    pub const fn sorted_to(mut self, sort_destination_id: RecordId) -> Self {
        self.sort_destination_id = sort_destination_id;
        self
    }

    /// Sets the departure time.
    #[must_use]
    pub const fn departing_at(mut self, depart_time: NaiveTime) -> Self {
        self.depart_time = depart_time;
        self
    }

    /// Adds a codeshare entry.
    #[must_use]
    pub fn with_code_share(mut self, code_share: CodeShare) -> Self {
        self.code_shares.push(code_share);
        self
    }

    /// Returns true when `other` is the same departure: airline, number and destination.
    #[must_use]
    pub fn same_departure(&self, other: &Self) -> bool {
        self.airline_id == other.airline_id
            && self.flight_number == other.flight_number
            && self.destination == other.destination
    }
}

impl Record for Flight {
    const KIND: &'static str = "Flight";

    fn header(&self) -> &RecordHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut RecordHeader {
        &mut self.header
    }

    fn validate_fields(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        self.header.validate_into(&mut errors);

        validation::required_pattern(
            &mut errors,
            "FlightNumber",
            &self.flight_number,
            &FLIGHT_NUMBER_PATTERN,
            "The flight number must be 4 digits or 4 digits and a capital letter.",
        );
        validation::required_pattern(
            &mut errors,
            "Destination",
            &self.destination,
            &DESTINATION_PATTERN,
            "The city must be 3 capital letters.",
        );
        for code_share in &self.code_shares {
            if !FLIGHT_NUMBER_PATTERN.is_match(&code_share.flight_number) {
                errors.push(
                    "FlightNumber",
                    "The codeshare flight number must be 4 digits or 4 digits and a capital letter.",
                );
            }
        }

        errors
    }
}

/// Flight rules that look at other records.
///
/// Airline, gate and sort destination references must exist, every
/// codeshare airline must exist, and no other flight may share the
/// airline, flight number and destination.
#[derive(Debug, Clone)]
pub struct FlightValidator {
    airlines: Arc<AirlineStore>,
    gates: Arc<GateStore>,
    sort_destinations: Arc<SortDestinationStore>,
}

impl FlightValidator {
    /// Creates the validator over the referenced stores.
    #[must_use]
    pub const fn new(
        airlines: Arc<AirlineStore>,
        gates: Arc<GateStore>,
        sort_destinations: Arc<SortDestinationStore>,
    ) -> Self {
        Self {
            airlines,
            gates,
            sort_destinations,
        }
    }
}

impl Validator<Flight> for FlightValidator {
    fn validate(&self, flight: &Flight, existing: Snapshot<'_, Flight>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if !self.airlines.contains(flight.airline_id) {
            errors.push(
                "AirlineID",
                format!(
                    "The {} airline was not found in the data store.",
                    flight.airline_id
                ),
            );
        }

        if !self.gates.contains(flight.gate_id) {
            errors.push(
                "GateID",
                format!("The {} gate was not found in the data store.", flight.gate_id),
            );
        }

        if !self.sort_destinations.contains(flight.sort_destination_id) {
            errors.push(
                "SortDestinationID",
                format!(
                    "The {} sort destination was not found in the data store.",
                    flight.sort_destination_id
                ),
            );
        }

        for code_share in &flight.code_shares {
            if !self.airlines.contains(code_share.airline_id) {
                errors.push(
                    "AirlineID",
                    format!(
                        "The {} airline for the codeshare was not found in the data store.",
                        code_share.airline_id
                    ),
                );
            }
        }

        if existing.any_other(flight.id(), |other| other.same_departure(flight)) {
            errors.push("FlightNumber", "The flight already exists in the schedule.");
        }

        errors
    }
}

/// Removes an airline's flights when the airline is deleted.
///
/// Holds the flight store weakly; once the flight store is dropped the
/// cascade does nothing.
#[derive(Debug)]
pub struct AirlineCascade {
    flights: Weak<FlightStore>,
}

impl DeletionListener<Airline> for AirlineCascade {
    fn records_deleted(&self, removed: &[Airline], ticket: &WriteTicket<'_>) {
        let Some(flights) = self.flights.upgrade() else {
            tracing::warn!("Flight store dropped; airline cascade skipped");
            return;
        };

        let airline_ids: BTreeSet<RecordId> = removed.iter().map(Record::id).collect();
        let deleted = flights.delete_where_with(ticket, |flight| {
            airline_ids.contains(&flight.airline_id)
        });

        tracing::info!(
            airlines = ?airline_ids,
            flights_deleted = deleted.len(),
            "Cascaded airline delete to flights"
        );
    }
}

/// Store of flights.
pub type FlightStore = MemoryStore<Flight, FlightValidator>;

impl MemoryStore<Flight, FlightValidator> {
    /// Creates a flight store wired to its reference stores.
    ///
    /// The store shares the airline store's write gate, allows duplicate
    /// flight names and registers the airline cascade.
    #[must_use]
    pub fn linked(
        airlines: &Arc<AirlineStore>,
        gates: &Arc<GateStore>,
        sort_destinations: &Arc<SortDestinationStore>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let validator = FlightValidator::new(
            Arc::clone(airlines),
            Arc::clone(gates),
            Arc::clone(sort_destinations),
        );
        let flights = Arc::new(
            Self::new(validator, clock)
                .with_gate(airlines.gate())
                .with_options(StoreOptions {
                    unique_names: false,
                    ..StoreOptions::default()
                }),
        );

        airlines.on_deleted(Arc::new(AirlineCascade {
            flights: Arc::downgrade(&flights),
        }));
        flights
    }
}
