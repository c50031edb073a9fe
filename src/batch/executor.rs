//! Batch executor
//!
//! Runs bulk get and bulk write requests against a store that caps entries
//! per call and may leave part of a call unprocessed.
//!
//! Execution rules:
//! 1. Split the request into chunks no larger than the kind's ceiling
//! 2. Send chunks one at a time, in order
//! 3. Merge each call's successes into the running outcome
//! 4. Resubmit only the unprocessed residue, up to `max_retries` times per
//!    chunk, counting attempts on one counter per chunk
//! 5. Hand any residue left after the last attempt back to the caller
//!
//! A call that fails as a whole aborts the batch with its error.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use super::chunk::BatchRequest;
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::store::{
    entry_count, ByCollection, Item, Key, SortedStore, StoreConfig, StoreFuture, StoreResult,
};

/// What one store call reported
#[derive(Debug)]
pub struct BatchResponse<S, E> {
    pub successes: ByCollection<S>,
    pub residue: ByCollection<E>,
}

/// A bulk operation the executor knows how to chunk and retry
pub trait BatchKind {
    /// Entry sent to the store (a key to read, an item to write)
    type Entry: Send + 'static;
    /// What a serviced entry yields
    type Success: Send + 'static;

    /// Short name used in logs
    const NAME: &'static str;

    /// Entries allowed per call
    fn ceiling(config: &StoreConfig) -> usize;

    /// Issue one store call
    fn call(
        store: &dyn SortedStore,
        chunk: ByCollection<Self::Entry>,
    ) -> StoreFuture<'_, BatchResponse<Self::Success, Self::Entry>>;
}

/// Bulk get by key; yields the items found
pub struct Get;

impl BatchKind for Get {
    type Entry = Key;
    type Success = Item;

    const NAME: &'static str = "get";

    fn ceiling(config: &StoreConfig) -> usize {
        config.read_ceiling
    }

    fn call(
        store: &dyn SortedStore,
        chunk: ByCollection<Key>,
    ) -> StoreFuture<'_, BatchResponse<Item, Key>> {
        Box::pin(async move {
            let output = store.batch_get(chunk).await?;
            Ok(BatchResponse {
                successes: output.items,
                residue: output.unprocessed,
            })
        })
    }
}

/// Bulk put; yields the keys of the items written
pub struct Put;

impl BatchKind for Put {
    type Entry = Item;
    type Success = Key;

    const NAME: &'static str = "put";

    fn ceiling(config: &StoreConfig) -> usize {
        config.write_ceiling
    }

    fn call(
        store: &dyn SortedStore,
        chunk: ByCollection<Item>,
    ) -> StoreFuture<'_, BatchResponse<Key, Item>> {
        let sent: ByCollection<Key> = chunk
            .iter()
            .map(|(collection, items)| {
                (collection.clone(), items.iter().map(|i| i.key.clone()).collect())
            })
            .collect();

        Box::pin(async move {
            let output = store.batch_write(chunk).await?;

            let mut successes = ByCollection::new();
            for (collection, keys) in sent {
                let failed: HashSet<&Key> = output
                    .unprocessed
                    .get(&collection)
                    .map(|items| items.iter().map(|i| &i.key).collect())
                    .unwrap_or_default();
                let written: Vec<Key> = keys.into_iter().filter(|k| !failed.contains(k)).collect();
                if !written.is_empty() {
                    successes.insert(collection, written);
                }
            }

            Ok(BatchResponse {
                successes,
                residue: output.unprocessed,
            })
        })
    }
}

/// Accumulated result of one batch execution
#[derive(Debug)]
pub struct BatchOutcome<S, E> {
    /// Everything serviced, grouped by collection, in no particular order
    pub items: ByCollection<S>,
    /// Entries still unprocessed after the last retry
    pub residue: ByCollection<E>,
    /// Store calls issued, retries included
    pub calls: usize,
    /// Store calls that were retries
    pub retries: usize,
}

impl<S, E> BatchOutcome<S, E> {
    fn new() -> Self {
        Self {
            items: ByCollection::new(),
            residue: ByCollection::new(),
            calls: 0,
            retries: 0,
        }
    }

    /// True when nothing was left unprocessed
    pub fn is_complete(&self) -> bool {
        self.residue_count() == 0
    }

    pub fn residue_count(&self) -> usize {
        entry_count(&self.residue)
    }

    pub fn item_count(&self) -> usize {
        entry_count(&self.items)
    }
}

fn merge_into<T>(target: &mut ByCollection<T>, source: ByCollection<T>) {
    for (collection, entries) in source {
        if entries.is_empty() {
            continue;
        }
        target.entry(collection).or_default().extend(entries);
    }
}

/// Chunk-and-retry engine for bulk store calls
pub struct BatchExecutor {
    store: Arc<dyn SortedStore>,
    config: StoreConfig,
    metrics: Arc<MetricsRegistry>,
}

impl BatchExecutor {
    pub fn new(store: Arc<dyn SortedStore>, config: StoreConfig, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            store,
            config,
            metrics,
        }
    }

    /// Bulk get. A residue is a partial read, not a failure.
    pub async fn get(&self, request: BatchRequest<Key>) -> StoreResult<BatchOutcome<Item, Key>> {
        self.execute::<Get>(request).await
    }

    /// Bulk put. Callers must treat a residue as a failed write.
    pub async fn put(&self, request: BatchRequest<Item>) -> StoreResult<BatchOutcome<Key, Item>> {
        self.execute::<Put>(request).await
    }

    /// Execute a request of any kind
    pub async fn execute<K: BatchKind>(
        &self,
        request: BatchRequest<K::Entry>,
    ) -> StoreResult<BatchOutcome<K::Success, K::Entry>> {
        let mut outcome = BatchOutcome::new();
        let chunks = request.into_chunks(K::ceiling(&self.config));
        let chunk_total = chunks.len().to_string();

        for (index, chunk) in chunks.into_iter().enumerate() {
            log_event(
                Event::BatchChunk,
                &[
                    ("kind", K::NAME),
                    ("chunk", index.to_string().as_str()),
                    ("of", chunk_total.as_str()),
                    ("entries", entry_count(&chunk).to_string().as_str()),
                ],
            );

            let mut pending = chunk;
            let mut attempt: u32 = 0;

            loop {
                outcome.calls += 1;
                self.metrics.increment_batch_calls();

                let response = K::call(self.store.as_ref(), pending).await?;
                merge_into(&mut outcome.items, response.successes);

                let unprocessed = entry_count(&response.residue);
                if unprocessed == 0 {
                    break;
                }

                if attempt >= self.config.max_retries {
                    log_event(
                        Event::BatchResidue,
                        &[
                            ("kind", K::NAME),
                            ("unprocessed", unprocessed.to_string().as_str()),
                            ("attempts", (attempt + 1).to_string().as_str()),
                        ],
                    );
                    self.metrics.add_residue_entries(unprocessed as u64);
                    merge_into(&mut outcome.residue, response.residue);
                    break;
                }

                attempt += 1;
                outcome.retries += 1;
                self.metrics.increment_batch_retries();
                log_event(
                    Event::BatchRetry,
                    &[
                        ("kind", K::NAME),
                        ("attempt", attempt.to_string().as_str()),
                        ("unprocessed", unprocessed.to_string().as_str()),
                    ],
                );

                if self.config.retry_backoff_ms > 0 {
                    let delay = self.config.retry_backoff_ms.saturating_mul(u64::from(attempt));
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }

                pending = response.residue;
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{BatchGetOutput, BatchWriteOutput, MemoryStore, QueryPage, RangeQuery};
    use serde_json::json;
    use std::sync::Mutex;

    /// Store that records call sizes and withholds the last `withhold`
    /// entries of each of the first `flaky_calls` calls.
    struct FlakyStore {
        inner: MemoryStore,
        withhold: usize,
        flaky_calls: usize,
        calls: Mutex<Vec<usize>>,
    }

    impl FlakyStore {
        fn new(withhold: usize, flaky_calls: usize) -> Self {
            Self {
                inner: MemoryStore::new(100, 25),
                withhold,
                flaky_calls,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn reliable() -> Self {
            Self::new(0, 0)
        }

        /// Record the call; returns how many entries to withhold
        fn record(&self, size: usize) -> usize {
            let mut calls = self.calls.lock().unwrap();
            calls.push(size);
            if calls.len() <= self.flaky_calls {
                self.withhold.min(size)
            } else {
                0
            }
        }

        fn call_sizes(&self) -> Vec<usize> {
            self.calls.lock().unwrap().clone()
        }
    }

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
        tail
    }

    impl SortedStore for FlakyStore {
        fn query(&self, request: RangeQuery) -> StoreFuture<'_, QueryPage> {
            self.inner.query(request)
        }

        fn batch_get(&self, mut keys: ByCollection<Key>) -> StoreFuture<'_, BatchGetOutput> {
            let withhold = self.record(entry_count(&keys));
            let unprocessed = split_off_tail(&mut keys, withhold);
            Box::pin(async move {
                let mut output = self.inner.batch_get(keys).await?;
                output.unprocessed = unprocessed;
                Ok(output)
            })
        }

        fn batch_write(&self, mut items: ByCollection<Item>) -> StoreFuture<'_, BatchWriteOutput> {
            let withhold = self.record(entry_count(&items));
            let unprocessed = split_off_tail(&mut items, withhold);
            Box::pin(async move {
                self.inner.batch_write(items).await?;
                Ok(BatchWriteOutput { unprocessed })
            })
        }
    }

    fn executor(store: Arc<FlakyStore>) -> BatchExecutor {
        BatchExecutor::new(store, StoreConfig::default(), Arc::new(MetricsRegistry::new()))
    }

    fn item(n: usize) -> Item {
        Item::new(Key::new(format!("p{:03}", n), "meta")).with_attribute("n", json!(n))
    }

    fn put_request(count: usize) -> BatchRequest<Item> {
        let mut request = BatchRequest::new();
        request.extend("t", (0..count).map(item));
        request
    }

    #[tokio::test]
    async fn test_get_chunks_at_read_ceiling() {
        let store = Arc::new(FlakyStore::reliable());
        let executor = executor(store.clone());

        let mut request = BatchRequest::new();
        request.extend("t", (0..101).map(|n| Key::new(format!("p{:03}", n), "meta")));
        let outcome = executor.get(request).await.unwrap();

        assert_eq!(store.call_sizes(), vec![100, 1]);
        assert_eq!(outcome.calls, 2);
        assert!(outcome.is_complete());
    }

    #[tokio::test]
    async fn test_put_chunks_at_write_ceiling() {
        let store = Arc::new(FlakyStore::reliable());
        let executor = executor(store.clone());

        let outcome = executor.put(put_request(30)).await.unwrap();

        assert_eq!(store.call_sizes(), vec![25, 5]);
        assert_eq!(outcome.item_count(), 30);
        assert!(outcome.is_complete());
        assert_eq!(store.inner.len("t"), 30);
    }

    #[tokio::test]
    async fn test_residue_retried_then_surfaced() {
        let store = Arc::new(FlakyStore::new(2, 4));
        let executor = executor(store.clone());

        let outcome = executor.put(put_request(10)).await.unwrap();

        // one first attempt plus three retries, each resending the residue
        assert_eq!(store.call_sizes(), vec![10, 2, 2, 2]);
        assert_eq!(outcome.calls, 4);
        assert_eq!(outcome.retries, 3);
        assert_eq!(outcome.residue_count(), 2);
        assert_eq!(outcome.item_count(), 8);
        assert!(!outcome.is_complete());
    }

    #[tokio::test]
    async fn test_retry_recovers_residue() {
        let store = Arc::new(FlakyStore::new(2, 1));
        let executor = executor(store.clone());

        let outcome = executor.put(put_request(10)).await.unwrap();

        assert_eq!(store.call_sizes(), vec![10, 2]);
        assert!(outcome.is_complete());
        assert_eq!(outcome.item_count(), 10);
    }

    #[tokio::test]
    async fn test_retry_with_backoff() {
        let store = Arc::new(FlakyStore::new(2, 2));
        let config = StoreConfig {
            retry_backoff_ms: 1,
            ..StoreConfig::default()
        };
        let executor = BatchExecutor::new(store.clone(), config, Arc::new(MetricsRegistry::new()));

        let outcome = executor.put(put_request(10)).await.unwrap();

        assert_eq!(store.call_sizes(), vec![10, 2, 2]);
        assert!(outcome.is_complete());
    }

    #[tokio::test]
    async fn test_attempts_counted_per_chunk() {
        // the first five calls are flaky: chunk one exhausts its retries,
        // chunk two still gets a retry chain of its own
        let store = Arc::new(FlakyStore::new(1, 5));
        let executor = executor(store.clone());
        let outcome = executor.put(put_request(30)).await.unwrap();

        assert_eq!(store.call_sizes(), vec![25, 1, 1, 1, 5, 1]);
        assert_eq!(outcome.retries, 4);
        assert_eq!(outcome.residue_count(), 1);
        assert_eq!(outcome.item_count(), 29);
    }

    #[tokio::test]
    async fn test_get_returns_partial_items() {
        let store = Arc::new(FlakyStore::new(1, 10));
        store
            .inner
            .batch_write(ByCollection::from([("t".to_string(), (0..3).map(item).collect())]))
            .await
            .unwrap();
        let executor = executor(store.clone());

        let mut request = BatchRequest::new();
        request.extend("t", (0..3).map(|n| item(n).key));
        let outcome = executor.get(request).await.unwrap();

        assert_eq!(outcome.item_count(), 2);
        assert_eq!(outcome.residue_count(), 1);
        assert_eq!(outcome.calls, 4);
    }

    #[tokio::test]
    async fn test_empty_request_makes_no_calls() {
        let store = Arc::new(FlakyStore::reliable());
        let executor = executor(store.clone());
        let outcome = executor.get(BatchRequest::new()).await.unwrap();
        assert_eq!(outcome.calls, 0);
        assert!(store.call_sizes().is_empty());
    }
}
