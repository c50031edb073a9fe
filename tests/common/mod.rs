//! Shared test fixtures: a scripted store and record seeding helpers

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tagsift::observability::MetricsRegistry;
use tagsift::query::QueryEngine;
use tagsift::records::Record;
use tagsift::store::{
    entry_count, BatchGetOutput, BatchWriteOutput, ByCollection, Item, Key, MemoryStore,
    QueryPage, RangeQuery, SortedStore, StoreConfig, StoreError, StoreFuture,
};

/// In-memory store whose bulk calls leave a scripted number of entries
/// unprocessed, and whose range queries and bulk gets can be made to fail.
pub struct ScriptedStore {
    inner: MemoryStore,
    withhold: Mutex<VecDeque<usize>>,
    batch_sizes: Mutex<Vec<usize>>,
    range_queries: AtomicUsize,
    queries_allowed: AtomicUsize,
    fail_gets: AtomicBool,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(100, 25),
            withhold: Mutex::new(VecDeque::new()),
            batch_sizes: Mutex::new(Vec::new()),
            range_queries: AtomicUsize::new(0),
            queries_allowed: AtomicUsize::new(usize::MAX),
            fail_gets: AtomicBool::new(false),
        }
    }

    /// Each upcoming bulk call withholds the next count from `plan`
    pub fn script(&self, plan: &[usize]) {
        self.withhold.lock().unwrap().extend(plan.iter().copied());
    }

    pub fn fail_range_queries(&self, fail: bool) {
        let allowed = if fail { 0 } else { usize::MAX };
        self.queries_allowed.store(allowed, Ordering::SeqCst);
    }

    /// Let `count` more range queries through, then fail every one after
    pub fn fail_range_queries_after(&self, count: usize) {
        let allowed = self.range_queries().saturating_add(count);
        self.queries_allowed.store(allowed, Ordering::SeqCst);
    }

    /// Fail bulk gets as a whole
    pub fn fail_batch_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().unwrap().clone()
    }

    pub fn reset_counts(&self) {
        self.batch_sizes.lock().unwrap().clear();
        self.range_queries.store(0, Ordering::SeqCst);
    }

    pub fn range_queries(&self) -> usize {
        self.range_queries.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn next_withhold(&self, size: usize) -> usize {
        self.batch_sizes.lock().unwrap().push(size);
        self.withhold
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(0)
            .min(size)
    }
}

/// Move the last `count` entries, walking collections from the back
fn split_off_tail<T>(groups: &mut ByCollection<T>, mut count: usize) -> ByCollection<T> {
    let mut tail = ByCollection::new();
    for (collection, entries) in groups.iter_mut().rev() {
        if count == 0 {
            break;
        }
        let take = count.min(entries.len());
        let kept = entries.len() - take;
        tail.insert(collection.clone(), entries.split_off(kept));
        count -= take;
    }
    groups.retain(|_, entries| !entries.is_empty());
    tail
}

impl SortedStore for ScriptedStore {
    fn query(&self, request: RangeQuery) -> StoreFuture<'_, QueryPage> {
        let issued = self.range_queries.fetch_add(1, Ordering::SeqCst);
        if issued >= self.queries_allowed.load(Ordering::SeqCst) {
            return Box::pin(async { Err::<QueryPage, _>(StoreError::unavailable("range query refused")) });
        }
        self.inner.query(request)
    }

    fn batch_get(&self, mut keys: ByCollection<Key>) -> StoreFuture<'_, BatchGetOutput> {
        let withhold = self.next_withhold(entry_count(&keys));
        if self.fail_gets.load(Ordering::SeqCst) {
            return Box::pin(async { Err::<BatchGetOutput, _>(StoreError::unavailable("bulk get refused")) });
        }
        let unprocessed = split_off_tail(&mut keys, withhold);
        Box::pin(async move {
            let mut output = self.inner.batch_get(keys).await?;
            output.unprocessed = unprocessed;
            Ok(output)
        })
    }

    fn batch_write(&self, mut items: ByCollection<Item>) -> StoreFuture<'_, BatchWriteOutput> {
        let withhold = self.next_withhold(entry_count(&items));
        let unprocessed = split_off_tail(&mut items, withhold);
        Box::pin(async move {
            self.inner.batch_write(items).await?;
            Ok(BatchWriteOutput { unprocessed })
        })
    }
}

/// Engine over a fresh scripted store with default config
pub fn engine() -> (QueryEngine, Arc<ScriptedStore>, Arc<MetricsRegistry>) {
    let store = Arc::new(ScriptedStore::new());
    let metrics = Arc::new(MetricsRegistry::new());
    let engine = QueryEngine::new(store.clone(), StoreConfig::default(), metrics.clone());
    (engine, store, metrics)
}

/// Record `id` carrying `name=value` for every pair given
pub fn tagged(id: &str, tags: &[(&str, &str)]) -> Record {
    tags.iter()
        .fold(Record::new(format!("record {}", id)).with_id(id), |r, (n, v)| {
            r.with_tag(*n, *v)
        })
}

/// The two-tag example: project=x on 001,003,005,009; priority=high on
/// 001,005,009,013
pub fn scenario_records() -> Vec<Record> {
    vec![
        tagged("001", &[("project", "x"), ("priority", "high")]),
        tagged("003", &[("project", "x")]),
        tagged("005", &[("project", "x"), ("priority", "high")]),
        tagged("009", &[("project", "x"), ("priority", "high")]),
        tagged("013", &[("priority", "high")]),
    ]
}
