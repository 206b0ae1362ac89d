//! Baggage sort destinations (make-up units).

use crate::record::{Record, RecordHeader};
use crate::store::{MemoryStore, NoDomainRules};
use serde::{Deserialize, Serialize};

/// Where checked bags for a flight are sorted, such as `MU1`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDestination {
    /// Shared header
    #[serde(flatten)]
    pub header: RecordHeader,
}

impl SortDestination {
    /// Creates an unsaved sort destination.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            header: RecordHeader::named(name),
        }
    }
}

impl Record for SortDestination {
    const KIND: &'static str = "SortDestination";

    fn header(&self) -> &RecordHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut RecordHeader {
        &mut self.header
    }
}

/// Store of sort destinations.
pub type SortDestinationStore = MemoryStore<SortDestination, NoDomainRules>;
