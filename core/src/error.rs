//! Store error type.

use crate::record::RecordId;
use crate::validation::ValidationErrors;
use thiserror::Error;

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Expected failures of store operations.
///
/// None of these are retried; callers surface them to the client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// One or more rules failed; nothing was written
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// No record with the given identity
    #[error("{kind} {id} was not found")]
    NotFound {
        /// Entity kind
        kind: &'static str,
        /// Requested identity
        id: RecordId,
    },

    /// The caller's last-edited marker no longer matches the stored record
    #[error("{kind} {id} was changed by another user; reload and try again")]
    Conflict {
        /// Entity kind
        kind: &'static str,
        /// Record identity
        id: RecordId,
    },
}

impl StoreError {
    /// Validation errors, when this is a validation failure.
    #[must_use]
    pub const fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Short label used for metrics and logs.
    #[must_use]
    pub const fn outcome(&self) -> &'static str {
        match self {
            Self::Validation(_) => "invalid",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
        }
    }
}

impl From<ValidationErrors> for StoreError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
