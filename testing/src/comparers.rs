//! Structural record equality with optional exclusions.
//!
//! Records round-trip through the stores with a new identity and fresh
//! audit timestamps. [`EqualityComparer`] compares everything else.

use flight_schedule_core::Record;

/// Compares two records field by field.
///
/// Each flag drops one header field from the comparison. All other fields,
/// codeshares included, must match exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EqualityComparer {
    /// Ignore `created_on`
    pub exclude_created_on: bool,
    /// Ignore the identity
    pub exclude_id: bool,
    /// Ignore `last_edited_on`
    pub exclude_last_edited_on: bool,
}

impl EqualityComparer {
    /// Compares every field.
    #[must_use]
    pub const fn strict() -> Self {
        Self::new(false, false, false)
    }

    /// Compares with the given exclusions.
    #[must_use]
    pub const fn new(exclude_created_on: bool, exclude_id: bool, exclude_last_edited_on: bool) -> Self {
        Self {
            exclude_created_on,
            exclude_id,
            exclude_last_edited_on,
        }
    }

    /// Ignores identity and both audit timestamps; compares what a client sent.
    #[must_use]
    pub const fn content_only() -> Self {
        Self::new(true, true, true)
    }

    /// Ignores only the last-edited marker.
    #[must_use]
    pub const fn ignoring_last_edited_on() -> Self {
        Self::new(false, false, true)
    }

    /// Returns true when `a` and `b` match on every compared field.
    #[must_use]
    pub fn equals<T: Record + PartialEq>(&self, a: &T, b: &T) -> bool {
        self.normalize(a) == self.normalize(b)
    }

    fn normalize<T: Record>(&self, record: &T) -> T {
        let mut record = record.clone();
        let header = record.header_mut();
        if self.exclude_created_on {
            header.created_on = chrono::DateTime::default();
        }
        if self.exclude_id {
            header.id = 0;
        }
        if self.exclude_last_edited_on {
            header.last_edited_on = None;
        }
        record
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::test_epoch;
    use chrono::{Duration, NaiveTime};
    use flight_schedule_core::{Airline, CodeShare, Flight, Gate, SortDestination};

    fn flight() -> Flight {
        Flight::new("Flight", 1, "1234", "ZZZ")
            .at_gate(1)
            .sorted_to(1)
            .departing_at(NaiveTime::from_hms_opt(6, 0, 0).unwrap())
            .with_code_share(CodeShare::new(2, "0235"))
    }

    #[test]
    fn strict_sees_every_field() {
        let a = Gate::new("A1");
        let mut b = a.clone();
        assert!(EqualityComparer::strict().equals(&a, &b));

        b.header.description = Some("East concourse".to_string());
        assert!(!EqualityComparer::strict().equals(&a, &b));
    }

    #[test]
    fn exclusions_drop_header_fields() {
        let a = SortDestination::new("MU1");
        let mut b = a.clone();
        b.header.id = 9;
        b.header.created_on = test_epoch();
        b.header.last_edited_on = Some(test_epoch() + Duration::seconds(1));

        assert!(!EqualityComparer::strict().equals(&a, &b));
        assert!(!EqualityComparer::new(true, true, false).equals(&a, &b));
        assert!(EqualityComparer::content_only().equals(&a, &b));
    }

    #[test]
    fn domain_fields_always_count() {
        let a = Airline::new("American Airlines", "AA").with_icao("AAL");
        let b = a.clone().with_icao("AAX");
        assert!(!EqualityComparer::content_only().equals(&a, &b));
    }

    #[test]
    fn codeshares_compare_in_order() {
        let a = flight();
        let b = flight().with_code_share(CodeShare::new(3, "9000"));
        assert!(!EqualityComparer::content_only().equals(&a, &b));
        assert!(EqualityComparer::content_only().equals(&a, &flight()));

        let mut c = flight();
        c.code_shares[0].flight_number = "0236".to_string();
        assert!(!EqualityComparer::content_only().equals(&a, &c));

        let mut d = flight();
        d.code_shares[0].airline_id = 3;
        assert!(!EqualityComparer::content_only().equals(&a, &d));
    }
}
