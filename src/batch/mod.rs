//! Batch subsystem for tagsift
//!
//! Bulk get and bulk write against a store with hard per-call ceilings and
//! partial-failure responses.
//!
//! # Invariants
//!
//! - No call carries more entries than its kind's ceiling
//! - Chunks are sent strictly one after another
//! - Unprocessed entries are retried a bounded number of times, then
//!   returned; they are never dropped
//! - Reads treat a residue as partial success; writes as failure

mod chunk;
mod executor;

pub use chunk::BatchRequest;
pub use executor::{BatchExecutor, BatchKind, BatchOutcome, BatchResponse, Get, Put};
