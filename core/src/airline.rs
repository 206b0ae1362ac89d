//! Airlines and their validation rules.

use crate::environment::Clock;
use crate::record::{Record, RecordHeader, RecordId};
use crate::sort_destination::SortDestinationStore;
use crate::store::{MemoryStore, Snapshot, Validator};
use crate::validation::{self, ValidationErrors};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

/// Number code shared by any airline without an assigned code.
pub const ZERO_NUMBER_CODE: &str = "000";

#[allow(clippy::expect_used)]
static IATA_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{2}$").expect("IATA: invalid regex pattern"));

#[allow(clippy::expect_used)]
static ICAO_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("ICAO: invalid regex pattern"));

#[allow(clippy::expect_used)]
static NUMBER_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}$").expect("number code: invalid regex pattern"));

/// An airline operating flights in the schedule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airline {
    /// Shared header
    #[serde(flatten)]
    pub header: RecordHeader,
    /// Two character IATA designator, for example `AA`
    #[serde(default)]
    pub iata: String,
    /// Optional three letter ICAO designator; empty when absent
    #[serde(default)]
    pub icao: String,
    /// Three digit accounting code; `000` when unassigned
    #[serde(default = "default_number_code")]
    pub number_code: String,
    /// Default sort destination for the airline's bags
    #[serde(rename = "sortDestinationID", default)]
    pub sort_destination_id: RecordId,
}

fn default_number_code() -> String {
    ZERO_NUMBER_CODE.to_string()
}

impl Default for Airline {
    fn default() -> Self {
        Self {
            header: RecordHeader::default(),
            iata: String::new(),
            icao: String::new(),
            number_code: default_number_code(),
            sort_destination_id: 0,
        }
    }
}

impl Airline {
    /// Creates an unsaved airline with a name and IATA code.
    #[must_use]
    pub fn new(name: impl Into<String>, iata: impl Into<String>) -> Self {
        Self {
            header: RecordHeader::named(name),
            iata: iata.into(),
            ..Self::default()
        }
    }

    /// Sets the ICAO code.
    #[must_use]
    pub fn with_icao(mut self, icao: impl Into<String>) -> Self {
        self.icao = icao.into();
        self
    }

    /// Sets the number code.
    #[must_use]
    pub fn with_number_code(mut self, number_code: impl Into<String>) -> Self {
        self.number_code = number_code.into();
        self
    }

    /// Sets the default sort destination.
    #[must_use]
    pub const fn with_sort_destination(mut self, id: RecordId) -> Self {
        self.sort_destination_id = id;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.header.description = Some(description.into());
        self
    }

    /// Returns true when the airline has an ICAO code.
    #[must_use]
    pub fn has_icao(&self) -> bool {
        !self.icao.is_empty()
    }
}

impl Record for Airline {
    const KIND: &'static str = "Airline";

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
            "IATA",
            &self.iata,
            &IATA_PATTERN,
            "The IATA must be 2 alphanumeric characters; letters must be capitalized.",
        );
        validation::pattern(
            &mut errors,
            "ICAO",
            &self.icao,
            &ICAO_PATTERN,
            "The ICAO must be 3 capital letters.",
        );
        validation::required_pattern(
            &mut errors,
            "NumberCode",
            &self.number_code,
            &NUMBER_CODE_PATTERN,
            "The number code must be 3 digits.",
        );

        errors
    }
}

/// Airline rules that look at other records.
///
/// - ICAO unique among airlines when present
/// - Number code unique among airlines unless it is [`ZERO_NUMBER_CODE`]
/// - The default sort destination exists
#[derive(Debug, Clone)]
pub struct AirlineValidator {
    sort_destinations: Arc<SortDestinationStore>,
}

impl AirlineValidator {
    /// Creates the validator over the sort destination store.
    #[must_use]
    pub const fn new(sort_destinations: Arc<SortDestinationStore>) -> Self {
        Self { sort_destinations }
    }
}

impl Validator<Airline> for AirlineValidator {
    fn validate(&self, airline: &Airline, existing: Snapshot<'_, Airline>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let id = airline.id();

        if airline.has_icao() && existing.any_other(id, |other| other.icao == airline.icao) {
            errors.push("ICAO", "The ICAO must be unique.");
        }

        if airline.number_code != ZERO_NUMBER_CODE
            && existing.any_other(id, |other| other.number_code == airline.number_code)
        {
            errors.push(
                "NumberCode",
                "The number code must be unique unless the code is 000.",
            );
        }

        if !self.sort_destinations.contains(airline.sort_destination_id) {
            errors.push(
                "SortDestinationID",
                format!(
                    "The {} sort destination was not found in the data store.",
                    airline.sort_destination_id
                ),
            );
        }

        errors
    }
}

/// Store of airlines.
pub type AirlineStore = MemoryStore<Airline, AirlineValidator>;

impl MemoryStore<Airline, AirlineValidator> {
    /// Creates an airline store that checks sort destinations in
    /// `sort_destinations` and shares its write gate.
    #[must_use]
    pub fn linked(sort_destinations: &Arc<SortDestinationStore>, clock: Arc<dyn Clock>) -> Self {
        let gate = sort_destinations.gate();
        Self::new(AirlineValidator::new(Arc::clone(sort_destinations)), clock).with_gate(gate)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn number_code_defaults_to_zero() {
        let airline: Airline = serde_json::from_str(r#"{"name":"Test","iata":"TT"}"#).unwrap();
        assert_eq!(airline.number_code, ZERO_NUMBER_CODE);
        assert_eq!(Airline::default().number_code, ZERO_NUMBER_CODE);
    }

    #[test]
    fn field_rules_report_every_failure() {
        let airline = Airline::new("", "aa").with_icao("AA").with_number_code("1");
        let errors = airline.validate_fields();

        assert_eq!(errors.messages_for("Name"), vec!["The Name field is required."]);
        assert_eq!(
            errors.messages_for("IATA"),
            vec!["The IATA must be 2 alphanumeric characters; letters must be capitalized."]
        );
        assert_eq!(errors.messages_for("ICAO"), vec!["The ICAO must be 3 capital letters."]);
        assert_eq!(errors.messages_for("NumberCode"), vec!["The number code must be 3 digits."]);
    }

    #[test]
    fn blank_iata_reports_required_only() {
        let airline = Airline::new("Test", "  ");
        assert_eq!(
            airline.validate_fields().messages_for("IATA"),
            vec!["The IATA field is required."]
        );
    }

    #[test]
    fn icao_is_optional() {
        let airline = Airline::new("Test", "T1");
        assert!(airline.validate_fields().is_empty());
    }

    #[test]
    fn wire_names() {
        let airline = Airline::new("American Airlines", "AA")
            .with_icao("AAL")
            .with_number_code("001")
            .with_sort_destination(1);
        let json = serde_json::to_value(&airline).unwrap();

        assert_eq!(json["iata"], "AA");
        assert_eq!(json["icao"], "AAL");
        assert_eq!(json["numberCode"], "001");
        assert_eq!(json["sortDestinationID"], 1);
        assert_eq!(json["name"], "American Airlines");
    }
}
