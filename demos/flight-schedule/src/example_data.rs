//! Example schedule used when the server starts.
//!
//! Records are created in dependency order through the ordinary store calls,
//! so every seeded record passes the same validation as client data:
//!
//! 1. Sort destinations `MU1`..`MU10`
//! 2. Gates `A1`..`A10`, `B1`..`B10`, `C1`..`C10`
//! 3. American, Delta and Southwest
//! 4. Five departures per airline, some with codeshares

use chrono::NaiveTime;
use flight_schedule_core::{
    Airline, CodeShare, Flight, FlightSchedule, Gate, Record, RecordId, SortDestination,
    StoreError,
};
use thiserror::Error;

const SORT_DESTINATION_COUNT: usize = 10;
const GATES_PER_CONCOURSE: usize = 10;
const CONCOURSES: [char; 3] = ['A', 'B', 'C'];

/// (name, IATA, ICAO, number code)
const AIRLINES: [(&str, &str, &str, &str); 3] = [
    ("American Airlines", "AA", "AAL", "001"),
    ("Delta Air Lines", "DL", "DAL", "006"),
    ("Southwest Airlines", "WN", "SWA", "526"),
];

/// Departure template: flight number, destination, hour, minute and an
/// optional codeshare (partner airline index, partner flight number).
struct Departure {
    number: &'static str,
    destination: &'static str,
    hour: u32,
    minute: u32,
    code_share: Option<(usize, &'static str)>,
}

const fn departure(
    number: &'static str,
    destination: &'static str,
    hour: u32,
    minute: u32,
    code_share: Option<(usize, &'static str)>,
) -> Departure {
    Departure {
        number,
        destination,
        hour,
        minute,
        code_share,
    }
}

/// Departures per airline, indexed like [`AIRLINES`].
const DEPARTURES: [[Departure; 5]; 3] = [
    [
        departure("0100", "DFW", 6, 0, None),
        departure("0235", "ORD", 7, 15, Some((1, "6235"))),
        departure("1412", "MIA", 9, 30, None),
        departure("2210", "LAX", 12, 45, Some((2, "7210"))),
        departure("0487", "PHX", 16, 20, None),
    ],
    [
        departure("0300", "ATL", 6, 30, None),
        departure("1120", "MSP", 8, 5, Some((0, "5120"))),
        departure("0766", "DTW", 11, 40, None),
        departure("2020", "SLC", 15, 10, None),
        departure("0911", "JFK", 18, 55, Some((2, "7911"))),
    ],
    [
        departure("1001", "DAL", 5, 50, None),
        departure("1455", "HOU", 7, 35, None),
        departure("2301", "BWI", 10, 20, Some((0, "5301"))),
        departure("0644", "DEN", 13, 0, None),
        departure("3318", "MDW", 17, 45, None),
    ],
];

/// Errors from seeding the example schedule.
#[derive(Error, Debug)]
pub enum SeedError {
    /// A seeded record was rejected by the store
    #[error("failed to seed {kind} {name}: {source}")]
    Rejected {
        /// Entity kind
        kind: &'static str,
        /// Record name
        name: String,
        /// Store error
        #[source]
        source: StoreError,
    },

    /// A departure time in the template is not a valid time of day
    #[error("invalid departure time {hour:02}:{minute:02} for flight {number}")]
    InvalidTime {
        /// Flight number
        number: &'static str,
        /// Hour
        hour: u32,
        /// Minute
        minute: u32,
    },
}

/// Number of records created per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Sort destinations created
    pub sort_destinations: usize,
    /// Gates created
    pub gates: usize,
    /// Airlines created
    pub airlines: usize,
    /// Flights created
    pub flights: usize,
}

/// Populates `schedule` with the example data.
///
/// # Errors
///
/// Returns [`SeedError`] on the first rejected record; records created
/// before it stay in the stores.
pub async fn seed(schedule: &FlightSchedule) -> Result<SeedSummary, SeedError> {
    let mut sort_destinations = Vec::with_capacity(SORT_DESTINATION_COUNT);
    for n in 1..=SORT_DESTINATION_COUNT {
        let created = schedule
            .sort_destinations
            .create(SortDestination::new(format!("MU{n}")))
            .await
            .map_err(rejected::<SortDestination>(format!("MU{n}")))?;
        sort_destinations.push(created.id());
    }

    let mut gates: Vec<Vec<RecordId>> = Vec::with_capacity(CONCOURSES.len());
    for concourse in CONCOURSES {
        let mut ids = Vec::with_capacity(GATES_PER_CONCOURSE);
        for n in 1..=GATES_PER_CONCOURSE {
            let name = format!("{concourse}{n}");
            let created = schedule
                .gates
                .create(Gate::new(name.clone()))
                .await
                .map_err(rejected::<Gate>(name))?;
            ids.push(created.id());
        }
        gates.push(ids);
    }

    let mut airlines = Vec::with_capacity(AIRLINES.len());
    for (index, (name, iata, icao, number_code)) in AIRLINES.into_iter().enumerate() {
        let airline = Airline::new(name, iata)
            .with_icao(icao)
            .with_number_code(number_code)
            .with_sort_destination(sort_destinations[index % sort_destinations.len()]);
        let created = schedule
            .airlines
            .create(airline)
            .await
            .map_err(rejected::<Airline>(name.to_string()))?;
        airlines.push(created);
    }

    let mut flights = 0;
    for (airline_index, departures) in DEPARTURES.iter().enumerate() {
        let airline = &airlines[airline_index];
        let concourse = &gates[airline_index % gates.len()];

        for (slot, template) in departures.iter().enumerate() {
            let depart_time = NaiveTime::from_hms_opt(template.hour, template.minute, 0).ok_or(
                SeedError::InvalidTime {
                    number: template.number,
                    hour: template.hour,
                    minute: template.minute,
                },
            )?;

            let name = format!("{}{}", airline.iata, template.number);
            let mut flight = Flight::new(
                name.clone(),
                airline.id(),
                template.number,
                template.destination,
            )
            .at_gate(concourse[slot % concourse.len()])
            .sorted_to(sort_destinations[(airline_index * 3 + slot) % sort_destinations.len()])
            .departing_at(depart_time);

            if let Some((partner, number)) = template.code_share {
                flight = flight.with_code_share(CodeShare::new(airlines[partner].id(), number));
            }

            schedule
                .flights
                .create(flight)
                .await
                .map_err(rejected::<Flight>(name))?;
            flights += 1;
        }
    }

    let summary = SeedSummary {
        sort_destinations: sort_destinations.len(),
        gates: gates.iter().map(Vec::len).sum(),
        airlines: airlines.len(),
        flights,
    };
    tracing::info!(?summary, "Example schedule seeded");
    Ok(summary)
}

fn rejected<T: Record>(name: String) -> impl FnOnce(StoreError) -> SeedError {
    move |source| SeedError::Rejected {
        kind: T::KIND,
        name,
        source,
    }
}
