//! Record writer
//!
//! Saving a record writes its item, one catalogue entry and one posting
//! entry per tag through the batch executor. A residue left after retries
//! fails the whole save: nothing is assumed durable.

use std::sync::Arc;

use super::record::Record;
use crate::batch::{BatchExecutor, BatchRequest};
use crate::index::{catalogue_key, entity_entry, posting_key};
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::query::{QueryError, QueryResult};
use crate::store::Item;

/// Writes records and their index entries
pub struct RecordWriter {
    executor: Arc<BatchExecutor>,
    collection: String,
    metrics: Arc<MetricsRegistry>,
}

impl RecordWriter {
    pub fn new(
        executor: Arc<BatchExecutor>,
        collection: impl Into<String>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            executor,
            collection: collection.into(),
            metrics,
        }
    }

    /// Save one record, returning it with id and timestamp filled in
    pub async fn save(&self, record: Record) -> QueryResult<Record> {
        let mut saved = self.save_all(vec![record]).await?;
        saved
            .pop()
            .ok_or_else(|| QueryError::validation("nothing to save"))
    }

    /// Save many records in one batch.
    ///
    /// Every record is validated before anything is written.
    pub async fn save_all(&self, records: Vec<Record>) -> QueryResult<Vec<Record>> {
        for record in &records {
            record.validate()?;
        }
        let records: Vec<Record> = records.into_iter().map(Record::normalize).collect();

        let mut request = BatchRequest::new();
        for record in &records {
            request.extend(&self.collection, entries_for(record)?);
        }
        let entries = request.len();

        let outcome = self.executor.put(request).await?;
        if !outcome.is_complete() {
            let unprocessed = outcome.residue_count();
            self.metrics.increment_saves_failed();
            log_event(
                Event::SaveIncomplete,
                &[
                    ("records", records.len().to_string().as_str()),
                    ("unprocessed", unprocessed.to_string().as_str()),
                ],
            );
            return Err(QueryError::SaveIncomplete { unprocessed });
        }

        log_event(
            Event::SaveComplete,
            &[
                ("records", records.len().to_string().as_str()),
                ("entries", entries.to_string().as_str()),
            ],
        );
        Ok(records)
    }
}

/// Record item, catalogue entry, then one posting entry per tag
fn entries_for(record: &Record) -> QueryResult<Vec<Item>> {
    let mut items = Vec::with_capacity(record.tags.len() + 2);
    items.push(record.to_item()?);
    items.push(entity_entry(catalogue_key(&record.id), &record.id));
    for tag in record.tag_list() {
        items.push(entity_entry(posting_key(&tag, &record.id), &record.id));
    }
    Ok(items)
}
