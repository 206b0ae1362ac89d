//! The shape shared by every stored entity.
//!
//! Each entity embeds a [`RecordHeader`] (flattened on the wire) and
//! implements [`Record`] so the generic [`MemoryStore`](crate::MemoryStore)
//! can assign identities, stamp audit timestamps and run the base field rules.

use crate::validation::{self, ValidationErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 64-bit record identity. `0` means the record has not been saved yet.
pub type RecordId = i64;

/// Identity, naming and audit fields common to all records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordHeader {
    /// Identity assigned by the store on the first successful create
    #[serde(rename = "integer64ID", default)]
    pub id: RecordId,
    /// Human readable name
    #[serde(default)]
    pub name: String,
    /// Optional free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the record was created; set once by the store
    #[serde(default)]
    pub created_on: DateTime<Utc>,
    /// Optimistic concurrency marker; `None` until the first update
    #[serde(default)]
    pub last_edited_on: Option<DateTime<Utc>>,
}

impl RecordHeader {
    /// Creates an unsaved header with the given name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns true once the store has assigned an identity.
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        self.id != 0
    }

    /// Appends the header's own field rules.
    pub fn validate_into(&self, errors: &mut ValidationErrors) {
        validation::require(errors, "Name", &self.name);
    }
}

/// Identity and name projection used by list and drop-down views.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListView {
    /// Record identity
    #[serde(rename = "integer64ID")]
    pub id: RecordId,
    /// Record name
    pub name: String,
}

/// A storable entity.
///
/// Implementors expose their header and their own field rules (required
/// fields, formats). Rules that need other records live in a
/// [`Validator`](crate::Validator) instead.
pub trait Record: Clone + Send + Sync + 'static {
    /// Entity kind, used in errors, logs and metric labels
    const KIND: &'static str;

    /// Shared header
    fn header(&self) -> &RecordHeader;

    /// Mutable shared header
    fn header_mut(&mut self) -> &mut RecordHeader;

    /// Field level rules that need nothing but the record itself.
    ///
    /// The default only requires a name.
    fn validate_fields(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        self.header().validate_into(&mut errors);
        errors
    }

    /// Record identity
    fn id(&self) -> RecordId {
        self.header().id
    }

    /// Record name
    fn name(&self) -> &str {
        &self.header().name
    }

    /// Identity and name projection
    fn list_view(&self) -> ListView {
        ListView {
            id: self.id(),
            name: self.name().to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn header_uses_wire_names() {
        let header = RecordHeader {
            id: 7,
            name: "MU1".to_string(),
            description: Some("Make-up unit".to_string()),
            ..RecordHeader::default()
        };

        let json = serde_json::to_value(&header).unwrap();
        assert_eq!(json["integer64ID"], 7);
        assert_eq!(json["name"], "MU1");
        assert_eq!(json["description"], "Make-up unit");
        assert!(json.get("createdOn").is_some());
        assert!(json["lastEditedOn"].is_null());
    }

    #[test]
    fn header_deserializes_with_missing_audit_fields() {
        let header: RecordHeader = serde_json::from_str(r#"{"name":"A1"}"#).unwrap();
        assert_eq!(header.id, 0);
        assert!(!header.is_saved());
        assert_eq!(header.last_edited_on, None);
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut errors = ValidationErrors::new();
        RecordHeader::default().validate_into(&mut errors);
        assert_eq!(errors.messages_for("Name"), vec!["The Name field is required."]);
    }
}
