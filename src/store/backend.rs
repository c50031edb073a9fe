//! # Sorted Store Trait
//!
//! The remote store collaborator: ascending range queries within a
//! partition, plus bulk get and bulk write with per-call ceilings and
//! partial-failure residues.

use std::future::Future;
use std::pin::Pin;

use super::errors::StoreResult;
use super::types::{BatchGetOutput, BatchWriteOutput, ByCollection, Item, Key, QueryPage, RangeQuery};

/// Boxed future returned by store calls
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// Backend trait for a sorted key-value store
pub trait SortedStore: Send + Sync {
    /// Items of one partition in ascending sort-key order, at most
    /// `request.limit` of them.
    fn query(&self, request: RangeQuery) -> StoreFuture<'_, QueryPage>;

    /// Fetch items by key. Missing keys are simply absent from the output.
    fn batch_get(&self, keys: ByCollection<Key>) -> StoreFuture<'_, BatchGetOutput>;

    /// Put items, overwriting any existing item with the same key.
    fn batch_write(&self, items: ByCollection<Item>) -> StoreFuture<'_, BatchWriteOutput>;
}
