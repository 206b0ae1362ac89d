//! # Flight Schedule Testing
//!
//! Testing utilities for the flight schedule stores.
//!
//! This crate provides:
//! - Deterministic clocks ([`FixedClock`], [`ManualClock`])
//! - [`EqualityComparer`] for comparing records while ignoring identity
//!   or audit fields
//! - Fixture builders that seed reference data through the public store API
//! - proptest strategies for the code formats
//!
//! ## Example
//!
//! ```ignore
//! use flight_schedule_testing::{fixtures, EqualityComparer};
//!
//! #[tokio::test]
//! async fn test_update_keeps_fields() {
//!     let schedule = fixtures::reference_schedule().await?;
//!     let airline = schedule.airlines.get(1).await?;
//!     let updated = schedule.airlines.update(airline.clone()).await?;
//!
//!     assert!(EqualityComparer::ignoring_last_edited_on().equals(&airline, &updated));
//! }
//! ```

use chrono::{DateTime, Duration, Utc};
use flight_schedule_core::environment::Clock;

pub mod comparers;
pub mod fixtures;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Duration, Utc};
    use std::sync::{Mutex, PoisonError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use flight_schedule_testing::mocks::FixedClock;
    /// use flight_schedule_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that only moves when told to.
    #[derive(Debug)]
    pub struct ManualClock {
        time: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        /// Create a clock starting at `time`
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Mutex::new(time),
            }
        }

        /// Move the clock forward by `by`
        pub fn advance(&self, by: Duration) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(test_epoch())
    }

    /// The instant every test clock starts at (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_epoch() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc)
    }
}

/// Test helpers and utilities
pub mod helpers {
    use tracing_subscriber::EnvFilter;

    /// Install a test-friendly tracing subscriber once per test binary.
    ///
    /// Honours `RUST_LOG`; later calls are no-ops.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
///
/// Strategies produce codes that satisfy the record format rules, so
/// properties can focus on the rule under test.
pub mod properties {
    use proptest::prelude::*;

    /// Two characters of `[A-Z0-9]`
    pub fn iata_code() -> impl Strategy<Value = String> {
        "[A-Z0-9]{2}"
    }

    /// Three capital letters
    pub fn icao_code() -> impl Strategy<Value = String> {
        "[A-Z]{3}"
    }

    /// Three digits other than `000`
    pub fn assigned_number_code() -> impl Strategy<Value = String> {
        (1_u16..1000).prop_map(|n| format!("{n:03}"))
    }

    /// Four digits, optionally followed by one capital letter
    pub fn flight_number() -> impl Strategy<Value = String> {
        "[0-9]{4}[A-Z]?"
    }

    /// Three capital letters
    pub fn city_code() -> impl Strategy<Value = String> {
        "[A-Z]{3}"
    }
}

// Re-export commonly used items
pub use comparers::EqualityComparer;
pub use mocks::{FixedClock, ManualClock, test_clock, test_epoch};
