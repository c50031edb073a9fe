//! Store error types
//!
//! Error codes:
//! - TAGSIFT_STORE_UNAVAILABLE
//! - TAGSIFT_STORE_THROTTLED
//! - TAGSIFT_STORE_CEILING_EXCEEDED

use thiserror::Error;

/// Result type for store calls
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a single store call
///
/// A full-call error is never retried by the engine; only partial-item
/// residues are resubmitted by the batch executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached or failed internally
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected the whole call due to throughput limits
    #[error("Store throttled: {0}")]
    Throttled(String),

    /// A bulk call carried more entries than the store accepts per call
    #[error("Batch of {requested} entries exceeds per-call ceiling of {limit}")]
    CeilingExceeded { limit: usize, requested: usize },
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn throttled(msg: impl Into<String>) -> Self {
        Self::Throttled(msg.into())
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "TAGSIFT_STORE_UNAVAILABLE",
            Self::Throttled(_) => "TAGSIFT_STORE_THROTTLED",
            Self::CeilingExceeded { .. } => "TAGSIFT_STORE_CEILING_EXCEEDED",
        }
    }

    /// Whether a caller wrapping the whole request may reasonably try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Throttled(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(StoreError::unavailable("x").code(), "TAGSIFT_STORE_UNAVAILABLE");
        assert_eq!(StoreError::throttled("x").code(), "TAGSIFT_STORE_THROTTLED");
        assert_eq!(
            StoreError::CeilingExceeded { limit: 25, requested: 26 }.code(),
            "TAGSIFT_STORE_CEILING_EXCEEDED"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(StoreError::throttled("busy").is_retryable());
        assert!(!StoreError::CeilingExceeded { limit: 25, requested: 26 }.is_retryable());
    }

    #[test]
    fn test_ceiling_display() {
        let err = StoreError::CeilingExceeded { limit: 100, requested: 101 };
        assert_eq!(
            err.to_string(),
            "Batch of 101 entries exceeds per-call ceiling of 100"
        );
    }
}
