//! Query subsystem for tagsift
//!
//! The listing façade and the error type shared by the read and write paths.
//!
//! # Invariants
//!
//! - Records come back in match order, ids ascending
//! - A pagination key resumes strictly after the last emitted id
//! - A full store-call failure fails the query; a partial read does not

mod engine;
mod errors;

pub use engine::{Page, QueryEngine};
pub use errors::{QueryError, QueryResult, Severity};
