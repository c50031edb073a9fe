//! Posting-list cursor
//!
//! Walks one tag's posting list page by page. Holds one page in memory,
//! a position inside it, and the store-issued key to resume from. Once the
//! store reports no resume key, or returns an empty page, the cursor is
//! exhausted for good. No read-ahead: a page is fetched only when the
//! previous one has been consumed.

use std::sync::Arc;

use super::layout::{entity_id, posting_key, posting_partition, ENTITY_PREFIX};
use super::tag::Tag;
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::store::{Key, RangeQuery, SortedStore, StoreResult};

/// Cursor over the ascending entity ids carrying one tag
pub struct PostingCursor {
    store: Arc<dyn SortedStore>,
    metrics: Arc<MetricsRegistry>,
    collection: String,
    partition: String,
    page_size: usize,
    page: Vec<String>,
    position: usize,
    resume_after: Option<Key>,
    exhausted: bool,
    pages_fetched: usize,
}

impl PostingCursor {
    /// Open a cursor and fetch its first page.
    ///
    /// When `start_after` is given, only ids strictly greater than it are
    /// produced.
    pub async fn open(
        store: Arc<dyn SortedStore>,
        metrics: Arc<MetricsRegistry>,
        collection: &str,
        tag: &Tag,
        start_after: Option<&str>,
        page_size: usize,
    ) -> StoreResult<Self> {
        let mut cursor = Self {
            store,
            metrics,
            collection: collection.to_string(),
            partition: posting_partition(tag),
            page_size,
            page: Vec::new(),
            position: 0,
            resume_after: start_after.map(|id| posting_key(tag, id)),
            exhausted: false,
            pages_fetched: 0,
        };
        cursor.fetch_page().await?;
        Ok(cursor)
    }

    /// True when the first page came back empty
    pub fn is_empty(&self) -> bool {
        self.pages_fetched == 1 && self.page.is_empty()
    }

    /// Make sure `current()` has an id to return, fetching the next page
    /// if this one is consumed. Returns false once exhausted.
    pub async fn ready(&mut self) -> StoreResult<bool> {
        while self.position >= self.page.len() {
            if self.exhausted {
                return Ok(false);
            }
            self.fetch_page().await?;
        }
        Ok(true)
    }

    /// The id under the cursor, if the current page still has one
    pub fn current(&self) -> Option<&str> {
        self.page.get(self.position).map(String::as_str)
    }

    /// Move past the current id
    pub fn advance(&mut self) {
        if self.position < self.page.len() {
            self.position += 1;
        }
    }

    /// Return the current id and move past it
    pub async fn next_id(&mut self) -> StoreResult<Option<String>> {
        if !self.ready().await? {
            return Ok(None);
        }
        let id = self.current().map(str::to_string);
        self.advance();
        Ok(id)
    }

    /// Number of store round trips made so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    async fn fetch_page(&mut self) -> StoreResult<()> {
        let request = RangeQuery {
            collection: self.collection.clone(),
            partition: self.partition.clone(),
            sort_prefix: ENTITY_PREFIX.to_string(),
            exclusive_start: self.resume_after.take(),
            limit: self.page_size,
        };

        self.metrics.increment_range_queries();
        let page = self.store.query(request).await?;
        self.pages_fetched += 1;

        self.page = page
            .items
            .iter()
            .filter_map(|item| entity_id(&item.key.sort).map(str::to_string))
            .collect();
        self.position = 0;

        log_event(
            Event::PostingPageFetch,
            &[
                ("partition", self.partition.as_str()),
                ("rows", self.page.len().to_string().as_str()),
                ("more", if page.last_key.is_some() { "true" } else { "false" }),
            ],
        );

        if self.page.is_empty() || page.last_key.is_none() {
            self.exhausted = true;
        }
        self.resume_after = page.last_key;
        Ok(())
    }
}
