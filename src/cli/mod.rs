//! CLI module for tagsift
//!
//! Provides command-line interface for:
//! - query: load a record file and list records by tag

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, LogLevel, QueryArgs};
pub use commands::{query, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_records, write_error, write_response};
