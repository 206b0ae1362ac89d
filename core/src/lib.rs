//! # Flight Schedule Core
//!
//! In-memory record stores and the validation rules of the flight schedule
//! example: airlines, flights, gates and sort destinations.
//!
//! ## Core Concepts
//!
//! - **Record**: an entity with a [`RecordHeader`] (identity, name, audit timestamps)
//! - **`MemoryStore`**: keyed collection of one record kind with create, read,
//!   update, delete, count and exists
//! - **Validator**: entity specific rules layered on top of the record's own field rules
//! - **Deletion listeners**: explicit wiring used to cascade airline deletes to flights
//! - **Clock**: injected time source so tests can pin timestamps
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   exists?   ┌──────────────────┐
//! │   FlightStore    │────────────►│   AirlineStore   │
//! │ (FlightValidator)│             │(AirlineValidator)│
//! └────────┬─────────┘             └────────┬─────────┘
//!          │ exists?                        │ exists?
//!          ▼                                ▼
//! ┌──────────────────┐             ┌──────────────────────┐
//! │    GateStore     │             │ SortDestinationStore │
//! └──────────────────┘             └──────────────────────┘
//!
//! AirlineStore ──deleted──► AirlineCascade ──delete_where──► FlightStore
//! ```
//!
//! All stores of one [`FlightSchedule`] share a write gate, so at most one
//! mutation is in flight and a cascade completes before the airline delete
//! returns.
//!
//! ## Example
//!
//! ```ignore
//! use flight_schedule_core::{environment::SystemClock, FlightSchedule, Gate};
//! use std::sync::Arc;
//!
//! let schedule = FlightSchedule::new(Arc::new(SystemClock));
//! let gate = schedule.gates.create(Gate::new("A1")).await?;
//! assert_eq!(gate.id(), 1);
//! ```

pub mod airline;
pub mod error;
pub mod flight;
pub mod gate;
pub mod record;
pub mod schedule;
pub mod sort_destination;
pub mod store;
pub mod validation;

/// Environment module - injected dependencies
///
/// Stores never read the system time directly; they ask a [`Clock`](environment::Clock)
/// so tests can run against a fixed or manually advanced time.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

// Re-export commonly used types
pub use airline::{Airline, AirlineStore, AirlineValidator, ZERO_NUMBER_CODE};
pub use error::{Result, StoreError};
pub use flight::{CodeShare, Flight, FlightStore, FlightValidator};
pub use gate::{Gate, GateStore};
pub use record::{ListView, Record, RecordHeader, RecordId};
pub use schedule::FlightSchedule;
pub use sort_destination::{SortDestination, SortDestinationStore};
pub use store::{
    DeletionListener, MemoryStore, NoDomainRules, Snapshot, StoreOptions, Validator, WriteTicket,
};
pub use validation::{ValidationError, ValidationErrors};
