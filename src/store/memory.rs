//! In-memory sorted store
//!
//! BTreeMap-backed implementation of [`SortedStore`] with the paging and
//! ceiling behaviour of a hosted key-value store:
//! - range pages hold at most `limit` items and report `last_key` exactly
//!   when the page is full
//! - bulk calls above the configured ceilings are rejected outright
//! - bulk calls never leave a residue

use std::collections::BTreeMap;
use std::future;
use std::ops::Bound;
use std::sync::RwLock;

use super::backend::{SortedStore, StoreFuture};
use super::config::StoreConfig;
use super::errors::{StoreError, StoreResult};
use super::types::{
    entry_count, BatchGetOutput, BatchWriteOutput, ByCollection, Item, Key, QueryPage, RangeQuery,
};

type Table = BTreeMap<Key, Item>;

/// In-memory store keyed by collection, then by (partition, sort) key
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<BTreeMap<String, Table>>,
    read_ceiling: usize,
    write_ceiling: usize,
}

impl MemoryStore {
    /// Create a store with explicit per-call ceilings
    pub fn new(read_ceiling: usize, write_ceiling: usize) -> Self {
        Self {
            tables: RwLock::new(BTreeMap::new()),
            read_ceiling,
            write_ceiling,
        }
    }

    /// Create a store using the ceilings from `config`
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.read_ceiling, config.write_ceiling)
    }

    /// Number of items in a collection
    pub fn len(&self, collection: &str) -> usize {
        self.tables
            .read()
            .map(|t| t.get(collection).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    /// Returns true if the collection holds no items
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Fetch one item directly, bypassing batching
    pub fn get(&self, collection: &str, key: &Key) -> Option<Item> {
        self.tables
            .read()
            .ok()
            .and_then(|t| t.get(collection).and_then(|table| table.get(key).cloned()))
    }

    /// Remove one item directly
    pub fn remove(&self, collection: &str, key: &Key) -> StoreResult<Option<Item>> {
        let mut tables = self.tables.write().map_err(lock_error)?;
        Ok(tables.get_mut(collection).and_then(|table| table.remove(key)))
    }

    fn query_now(&self, request: &RangeQuery) -> StoreResult<QueryPage> {
        if request.limit == 0 {
            return Ok(QueryPage::default());
        }

        let tables = self.tables.read().map_err(lock_error)?;
        let Some(table) = tables.get(&request.collection) else {
            return Ok(QueryPage::default());
        };

        let start = match &request.exclusive_start {
            Some(key) => Bound::Excluded(key.clone()),
            None => Bound::Included(Key::new(&request.partition, &request.sort_prefix)),
        };

        let partition = request.partition.as_str();
        let prefix = request.sort_prefix.as_str();

        let items: Vec<Item> = table
            .range((start, Bound::Unbounded))
            .skip_while(|(k, _)| k.partition == partition && k.sort.as_str() < prefix)
            .take_while(|(k, _)| k.partition == partition && k.sort.starts_with(prefix))
            .take(request.limit)
            .map(|(_, item)| item.clone())
            .collect();

        let last_key = if items.len() == request.limit {
            items.last().map(|item| item.key.clone())
        } else {
            None
        };

        Ok(QueryPage { items, last_key })
    }

    fn batch_get_now(&self, keys: &ByCollection<Key>) -> StoreResult<BatchGetOutput> {
        let requested = entry_count(keys);
        if requested > self.read_ceiling {
            return Err(StoreError::CeilingExceeded {
                limit: self.read_ceiling,
                requested,
            });
        }

        let tables = self.tables.read().map_err(lock_error)?;
        let mut output = BatchGetOutput::default();

        for (collection, keys) in keys {
            let Some(table) = tables.get(collection) else {
                continue;
            };
            let found: Vec<Item> = keys.iter().filter_map(|k| table.get(k).cloned()).collect();
            if !found.is_empty() {
                output.items.insert(collection.clone(), found);
            }
        }

        Ok(output)
    }

    fn batch_write_now(&self, items: ByCollection<Item>) -> StoreResult<BatchWriteOutput> {
        let requested = entry_count(&items);
        if requested > self.write_ceiling {
            return Err(StoreError::CeilingExceeded {
                limit: self.write_ceiling,
                requested,
            });
        }

        let mut tables = self.tables.write().map_err(lock_error)?;
        for (collection, items) in items {
            let table = tables.entry(collection).or_default();
            for item in items {
                table.insert(item.key.clone(), item);
            }
        }

        Ok(BatchWriteOutput::default())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::from_config(&StoreConfig::default())
    }
}

impl SortedStore for MemoryStore {
    fn query(&self, request: RangeQuery) -> StoreFuture<'_, QueryPage> {
        Box::pin(future::ready(self.query_now(&request)))
    }

    fn batch_get(&self, keys: ByCollection<Key>) -> StoreFuture<'_, BatchGetOutput> {
        Box::pin(future::ready(self.batch_get_now(&keys)))
    }

    fn batch_write(&self, items: ByCollection<Item>) -> StoreFuture<'_, BatchWriteOutput> {
        Box::pin(future::ready(self.batch_write_now(items)))
    }
}

fn lock_error<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::unavailable(format!("store lock poisoned: {}", e))
}
