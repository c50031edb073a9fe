//! CLI command implementations
//!
//! `query` builds an in-memory store from a record file, loads every record
//! through the write path, then lists by tag through the query engine.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::index::{Tag, TagFilter};
use crate::observability::{Logger, MetricsRegistry};
use crate::query::{Page, QueryEngine, QueryResult};
use crate::records::Record;
use crate::store::{MemoryStore, StoreConfig};

use super::args::{Cli, Command, QueryArgs};
use super::errors::{CliError, CliResult};
use super::io::{read_records, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let result = run_command(cli.command);

    if let Err(e) = &result {
        write_error(e.code_str(), e.message())?;
    }
    result
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Query(args) => {
            Logger::set_min_severity(args.log_level.into());
            let data = query(&args)?;
            write_response(data)
        }
    }
}

/// Execute a query and return the response payload
pub fn query(args: &QueryArgs) -> CliResult<Value> {
    let config = match &args.config {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };
    let records = read_records(&args.data)?;
    let filter = parse_tags(&args.tags)?;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime_failed(format!("Failed to create tokio runtime: {}", e)))?;

    let metrics = Arc::new(MetricsRegistry::new());
    let store = Arc::new(MemoryStore::from_config(&config));
    let engine = QueryEngine::new(store, config, Arc::clone(&metrics));

    let page = runtime.block_on(async {
        engine.writer().save_all(records).await?;
        if args.all {
            list_all_pages(&engine, &filter, args.after.as_deref(), args.limit).await
        } else {
            engine.list(Some(&filter), args.after.as_deref(), args.limit).await
        }
    })?;

    let mut data = json!({
        "records": page.records,
        "next_pagination_key": page.next_pagination_key,
    });
    if args.stats {
        data["metrics"] = serde_json::to_value(metrics.snapshot())?;
    }
    Ok(data)
}

/// Parse repeated `name=value` arguments into a filter
fn parse_tags(raw: &[String]) -> CliResult<TagFilter> {
    let tags = raw
        .iter()
        .map(|s| Tag::parse(s))
        .collect::<QueryResult<Vec<Tag>>>()?;
    Ok(TagFilter::from_pairs(tags.into_iter().map(|t| (t.name, t.value)))?)
}

/// Follow pagination keys until the engine reports no more results
async fn list_all_pages(
    engine: &QueryEngine,
    filter: &TagFilter,
    after: Option<&str>,
    limit: Option<usize>,
) -> QueryResult<Page> {
    let mut records: Vec<Record> = Vec::new();
    let mut key = after.map(str::to_string);

    loop {
        let page = engine.list(Some(filter), key.as_deref(), limit).await?;
        records.extend(page.records);
        match page.next_pagination_key {
            Some(next) => key = Some(next),
            None => break,
        }
    }

    Ok(Page {
        records,
        next_pagination_key: None,
    })
}
