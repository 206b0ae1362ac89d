//! Departure gates.

use crate::record::{Record, RecordHeader};
use crate::store::{MemoryStore, NoDomainRules};
use serde::{Deserialize, Serialize};

/// A departure gate such as `A1`.
///
/// Gates are reference data: only seeding writes them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    /// Shared header
    #[serde(flatten)]
    pub header: RecordHeader,
}

impl Gate {
    /// Creates an unsaved gate.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            header: RecordHeader::named(name),
        }
    }
}

impl Record for Gate {
    const KIND: &'static str = "Gate";

    fn header(&self) -> &RecordHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut RecordHeader {
        &mut self.header
    }
}

/// Store of gates.
pub type GateStore = MemoryStore<Gate, NoDomainRules>;
