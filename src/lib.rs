//! tagsift - multi-tag record queries over a sorted key-value store
//!
//! Answers "which records carry ALL of these tags" by merge-joining one
//! paginated posting list per tag, then bulk-fetching the matched records.

pub mod batch;
pub mod cli;
pub mod index;
pub mod observability;
pub mod query;
pub mod records;
pub mod store;
