//! Observability events for tagsift
//!
//! Every line the engine logs is named by one of these events.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Query façade
    /// A list request was accepted
    QueryBegin,
    /// A list request produced a page
    QueryComplete,
    /// A list request failed
    QueryFailed,

    // Intersection
    /// One tag's first page was empty; nothing can match
    IntersectShortCircuit,
    /// A posting-list page was fetched from the store
    PostingPageFetch,

    // Batch execution
    /// One chunk was sent to the store
    BatchChunk,
    /// Unprocessed entries were resubmitted
    BatchRetry,
    /// Entries were still unprocessed after the last retry
    BatchResidue,

    // Record paths
    /// Some matched ids could not be expanded into records
    ExpandPartial,
    /// Records were durably written
    SaveComplete,
    /// A write left unprocessed items behind
    SaveIncomplete,

    // Configuration
    /// Store configuration loaded
    ConfigLoaded,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::QueryBegin => "QUERY_BEGIN",
            Event::QueryComplete => "QUERY_COMPLETE",
            Event::QueryFailed => "QUERY_FAILED",

            Event::IntersectShortCircuit => "INTERSECT_SHORT_CIRCUIT",
            Event::PostingPageFetch => "POSTING_PAGE_FETCH",

            Event::BatchChunk => "BATCH_CHUNK",
            Event::BatchRetry => "BATCH_RETRY",
            Event::BatchResidue => "BATCH_RESIDUE",

            Event::ExpandPartial => "EXPAND_PARTIAL",
            Event::SaveComplete => "SAVE_COMPLETE",
            Event::SaveIncomplete => "SAVE_INCOMPLETE",

            Event::ConfigLoaded => "CONFIG_LOADED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::PostingPageFetch | Event::BatchChunk => Severity::Trace,
            Event::BatchRetry | Event::BatchResidue | Event::ExpandPartial => Severity::Warn,
            Event::QueryFailed | Event::SaveIncomplete => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
