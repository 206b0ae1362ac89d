//! The four stores of one flight schedule, wired together.

use crate::airline::AirlineStore;
use crate::environment::Clock;
use crate::flight::FlightStore;
use crate::gate::GateStore;
use crate::sort_destination::SortDestinationStore;
use crate::store::NoDomainRules;
use std::sync::Arc;

/// Sort destinations, gates, airlines and flights sharing one write gate.
///
/// Cloning is cheap and yields handles to the same stores.
#[derive(Clone, Debug)]
pub struct FlightSchedule {
    /// Sort destination reference data
    pub sort_destinations: Arc<SortDestinationStore>,
    /// Gate reference data
    pub gates: Arc<GateStore>,
    /// Airlines; deleting one removes its flights
    pub airlines: Arc<AirlineStore>,
    /// Flights
    pub flights: Arc<FlightStore>,
}

impl FlightSchedule {
    /// Creates empty, wired stores.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let sort_destinations = Arc::new(SortDestinationStore::new(NoDomainRules, Arc::clone(&clock)));
        let gates = Arc::new(
            GateStore::new(NoDomainRules, Arc::clone(&clock)).with_gate(sort_destinations.gate()),
        );
        let airlines = Arc::new(AirlineStore::linked(&sort_destinations, Arc::clone(&clock)));
        let flights = FlightStore::linked(&airlines, &gates, &sort_destinations, clock);

        Self {
            sort_destinations,
            gates,
            airlines,
            flights,
        }
    }
}
