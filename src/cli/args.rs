//! CLI argument definitions using clap
//!
//! Commands:
//! - tagsift query --data <path> [--config <path>] [--tag name=value]...

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::observability::Severity;

/// tagsift - find records carrying every one of a set of tags
#[derive(Parser, Debug)]
#[command(name = "tagsift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load records into an in-memory store and list them by tag
    Query(QueryArgs),
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// JSON array of records to load
    #[arg(long)]
    pub data: PathBuf,

    /// Path to store configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Required tag, as name=value; repeat for more
    #[arg(long = "tag", value_name = "NAME=VALUE")]
    pub tags: Vec<String>,

    /// Pagination key from a previous page
    #[arg(long)]
    pub after: Option<String>,

    /// Page size (defaults to the configured page size)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Follow pagination keys until the results are exhausted
    #[arg(long)]
    pub all: bool,

    /// Include counters in the output
    #[arg(long)]
    pub stats: bool,

    /// Lowest severity written to the log
    #[arg(long, value_enum, default_value_t = LogLevel::Error)]
    pub log_level: LogLevel,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Severity {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Severity::Trace,
            LogLevel::Info => Severity::Info,
            LogLevel::Warn => Severity::Warn,
            LogLevel::Error => Severity::Error,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
