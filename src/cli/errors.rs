//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::query::QueryError;
use crate::store::ConfigError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (files, stdout)
    IoError,
    /// Record data could not be read or parsed
    DataError,
    /// Bad tag, limit or record input
    InvalidInput,
    /// Records could not be loaded into the store
    SaveFailed,
    /// The query failed
    QueryFailed,
    /// Async runtime could not be started
    RuntimeFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "TAGSIFT_CLI_CONFIG_ERROR",
            Self::IoError => "TAGSIFT_CLI_IO_ERROR",
            Self::DataError => "TAGSIFT_CLI_DATA_ERROR",
            Self::InvalidInput => "TAGSIFT_CLI_INVALID_INPUT",
            Self::SaveFailed => "TAGSIFT_CLI_SAVE_FAILED",
            Self::QueryFailed => "TAGSIFT_CLI_QUERY_FAILED",
            Self::RuntimeFailed => "TAGSIFT_CLI_RUNTIME_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn data_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::DataError, msg)
    }

    pub fn runtime_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::RuntimeFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<QueryError> for CliError {
    fn from(e: QueryError) -> Self {
        let code = match &e {
            QueryError::Validation(_) => CliErrorCode::InvalidInput,
            QueryError::SaveIncomplete { .. } => CliErrorCode::SaveFailed,
            QueryError::Store(_) | QueryError::Decode(_) => CliErrorCode::QueryFailed,
        };
        Self::new(code, format!("{} ({})", e, e.code()))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_query_error_mapping() {
        let e = CliError::from(QueryError::validation("bad tag"));
        assert_eq!(e.code(), &CliErrorCode::InvalidInput);
        assert!(e.message().contains("TAGSIFT_VALIDATION"));

        let e = CliError::from(QueryError::SaveIncomplete { unprocessed: 2 });
        assert_eq!(e.code_str(), "TAGSIFT_CLI_SAVE_FAILED");

        let e = CliError::from(QueryError::from(StoreError::unavailable("down")));
        assert_eq!(e.code(), &CliErrorCode::QueryFailed);
    }

    #[test]
    fn test_display() {
        let e = CliError::config_error("missing");
        assert_eq!(e.to_string(), "TAGSIFT_CLI_CONFIG_ERROR: missing");
    }
}
