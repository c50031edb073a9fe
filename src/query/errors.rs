//! Query error types
//!
//! Error codes:
//! - TAGSIFT_VALIDATION (ERROR): malformed or missing input, never retried
//! - TAGSIFT_STORE_* (ERROR): a full store call failed; the query fails
//! - TAGSIFT_SAVE_INCOMPLETE (ERROR): writes left a residue after retries
//! - TAGSIFT_DECODE (ERROR): a stored item does not decode to a record

use thiserror::Error;

use crate::store::StoreError;

/// Result type for query and record operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Severity levels for query errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller supplied bad input
    Rejected,
    /// Operation failed; nothing about the store is known to be broken
    Error,
}

/// Errors surfaced by the query engine and the record paths
#[derive(Debug, Error)]
pub enum QueryError {
    /// Malformed or missing required input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A store call failed as a whole
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A write left unprocessed items behind; nothing may be assumed durable
    #[error("Save incomplete: {unprocessed} items were not written after retries")]
    SaveIncomplete { unprocessed: usize },

    /// A stored item could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

impl QueryError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "TAGSIFT_VALIDATION",
            Self::Store(e) => e.code(),
            Self::SaveIncomplete { .. } => "TAGSIFT_SAVE_INCOMPLETE",
            Self::Decode(_) => "TAGSIFT_DECODE",
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        match self {
            Self::Validation(_) => Severity::Rejected,
            _ => Severity::Error,
        }
    }

    /// Returns true for errors caused by the caller's input
    pub fn is_validation(&self) -> bool {
        self.severity() == Severity::Rejected
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
