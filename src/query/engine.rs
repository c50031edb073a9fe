//! Query engine
//!
//! Entry point for listing records. With tags, the posting lists are
//! intersected and the matched ids expanded into records in match order.
//! Without tags, the catalogue partition is paged directly.
//!
//! The pagination key handed back is the id of the last record position
//! emitted; `None` means there is nothing more to read.

use std::sync::Arc;

use serde::Serialize;

use super::errors::{QueryError, QueryResult};
use crate::batch::BatchExecutor;
use crate::index::{catalogue_key, entity_id, Intersector, TagFilter, CATALOGUE_PARTITION, ENTITY_PREFIX};
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::records::{Record, RecordExpander, RecordWriter};
use crate::store::{RangeQuery, SortedStore, StoreConfig};

/// One page of query results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// Records in match order
    pub records: Vec<Record>,
    /// Pass back to continue; absent when exhausted
    pub next_pagination_key: Option<String>,
}

/// Lists records by tag, page by page
pub struct QueryEngine {
    store: Arc<dyn SortedStore>,
    config: StoreConfig,
    metrics: Arc<MetricsRegistry>,
    intersector: Intersector,
    expander: RecordExpander,
    writer: RecordWriter,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn SortedStore>, config: StoreConfig, metrics: Arc<MetricsRegistry>) -> Self {
        let executor = Arc::new(BatchExecutor::new(
            Arc::clone(&store),
            config.clone(),
            Arc::clone(&metrics),
        ));

        Self {
            intersector: Intersector::new(Arc::clone(&store), &config.table_name, Arc::clone(&metrics)),
            expander: RecordExpander::new(Arc::clone(&executor), &config.table_name, Arc::clone(&metrics)),
            writer: RecordWriter::new(executor, &config.table_name, Arc::clone(&metrics)),
            store,
            config,
            metrics,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Write path for records and their posting entries
    pub fn writer(&self) -> &RecordWriter {
        &self.writer
    }

    /// List records carrying every tag in `tags`.
    ///
    /// No tags (or an empty filter) lists all records by id. Results start
    /// strictly after `pagination_key`. `limit` defaults to the configured
    /// page size and may not exceed the configured maximum.
    pub async fn list(
        &self,
        tags: Option<&TagFilter>,
        pagination_key: Option<&str>,
        limit: Option<usize>,
    ) -> QueryResult<Page> {
        let tags = tags.filter(|f| !f.is_empty());
        let tag_count = tags.map_or(0, TagFilter::len);

        log_event(
            Event::QueryBegin,
            &[
                ("tags", tag_count.to_string().as_str()),
                ("after", pagination_key.unwrap_or("")),
            ],
        );

        let result = match self.resolve_limit(limit) {
            Ok(limit) => match tags {
                Some(filter) => self.list_tagged(filter, pagination_key, limit).await,
                None => self.list_all(pagination_key, limit).await,
            },
            Err(e) => Err(e),
        };

        match &result {
            Ok(page) => log_event(
                Event::QueryComplete,
                &[
                    ("tags", tag_count.to_string().as_str()),
                    ("records", page.records.len().to_string().as_str()),
                    ("more", if page.next_pagination_key.is_some() { "true" } else { "false" }),
                ],
            ),
            Err(e) => log_event(
                Event::QueryFailed,
                &[("code", e.code()), ("error", e.to_string().as_str())],
            ),
        }

        result
    }

    fn resolve_limit(&self, limit: Option<usize>) -> QueryResult<usize> {
        let limit = limit.unwrap_or(self.config.default_limit);
        if limit == 0 {
            return Err(QueryError::validation("limit must be greater than zero"));
        }
        if limit > self.config.max_limit {
            return Err(QueryError::validation(format!(
                "limit {} exceeds maximum {}",
                limit, self.config.max_limit
            )));
        }
        Ok(limit)
    }

    async fn list_tagged(
        &self,
        filter: &TagFilter,
        pagination_key: Option<&str>,
        limit: usize,
    ) -> QueryResult<Page> {
        let matched = self.intersector.intersect(filter, pagination_key, limit).await?;
        let records = self.expander.expand_ordered(&matched.ids).await?;

        Ok(Page {
            records,
            next_pagination_key: matched.continuation,
        })
    }

    async fn list_all(&self, pagination_key: Option<&str>, limit: usize) -> QueryResult<Page> {
        self.metrics.increment_range_queries();
        let page = self
            .store
            .query(RangeQuery {
                collection: self.config.table_name.clone(),
                partition: CATALOGUE_PARTITION.to_string(),
                sort_prefix: ENTITY_PREFIX.to_string(),
                exclusive_start: pagination_key.map(catalogue_key),
                limit,
            })
            .await?;

        let ids: Vec<String> = page
            .items
            .iter()
            .filter_map(|item| entity_id(&item.key.sort).map(str::to_string))
            .collect();

        let next_pagination_key = match page.last_key {
            Some(_) => ids.last().cloned(),
            None => None,
        };
        let records = self.expander.expand_ordered(&ids).await?;

        Ok(Page {
            records,
            next_pagination_key,
        })
    }
}
