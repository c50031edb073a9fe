//! Store subsystem for tagsift
//!
//! The engine talks to a remote sorted key-value store through the
//! [`SortedStore`] trait. Guarantees required of an implementation:
//!
//! - Range queries return items of one partition in ascending
//!   lexicographic sort-key order
//! - Bulk calls accept at most a fixed number of entries per call, with a
//!   larger ceiling for reads than for writes
//! - Bulk calls may leave an unprocessed residue that the caller resubmits

mod backend;
mod config;
mod errors;
mod memory;
mod types;

pub use backend::{SortedStore, StoreFuture};
pub use config::{ConfigError, StoreConfig, MAX_RETRY_BACKOFF_MS};
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use types::{
    entry_count, BatchGetOutput, BatchWriteOutput, ByCollection, Item, Key, QueryPage, RangeQuery,
};
