//! Record expander
//!
//! Turns matched ids into records with one bulk get. A record deleted
//! between matching and expansion is simply missing from the result, and a
//! residue the store never serviced is a partial read, not an error.

use std::collections::HashMap;
use std::sync::Arc;

use super::record::Record;
use crate::batch::{BatchExecutor, BatchRequest};
use crate::index::record_key;
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::query::QueryResult;

/// Bulk-fetches records by id
pub struct RecordExpander {
    executor: Arc<BatchExecutor>,
    collection: String,
    metrics: Arc<MetricsRegistry>,
}

impl RecordExpander {
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

    /// Fetch the records for `ids`.
    ///
    /// Order of the result is unspecified and may not match `ids`; ids with
    /// no retrievable record are left out.
    pub async fn expand(&self, ids: &[String]) -> QueryResult<Vec<Record>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut request = BatchRequest::new();
        request.extend(&self.collection, ids.iter().map(|id| record_key(id)));

        let mut outcome = self.executor.get(request).await?;
        let items = outcome.items.remove(&self.collection).unwrap_or_default();

        let records = items
            .into_iter()
            .map(Record::from_item)
            .collect::<QueryResult<Vec<_>>>()?;

        if records.len() < ids.len() {
            log_event(
                Event::ExpandPartial,
                &[
                    ("requested", ids.len().to_string().as_str()),
                    ("returned", records.len().to_string().as_str()),
                    ("unprocessed", outcome.residue_count().to_string().as_str()),
                ],
            );
        }

        self.metrics.add_records_returned(records.len() as u64);
        Ok(records)
    }

    /// Like [`expand`](Self::expand), but ordered as `ids` are.
    pub async fn expand_ordered(&self, ids: &[String]) -> QueryResult<Vec<Record>> {
        let mut by_id: HashMap<String, Record> = self
            .expand(ids)
            .await?
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreConfig};

    async fn seeded(ids: &[&str]) -> (RecordExpander, Arc<MemoryStore>) {
        let config = StoreConfig::default();
        let store = Arc::new(MemoryStore::from_config(&config));
        let metrics = Arc::new(MetricsRegistry::new());
        let executor = Arc::new(BatchExecutor::new(store.clone(), config.clone(), metrics.clone()));

        let mut request = BatchRequest::new();
        for id in ids {
            let record = Record::new(format!("record {}", id)).with_id(*id).normalize();
            request.push(&config.table_name, record.to_item().unwrap());
        }
        executor.put(request).await.unwrap();

        (
            RecordExpander::new(executor, &config.table_name, metrics),
            store,
        )
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_expand_returns_existing_records() {
        let (expander, _) = seeded(&["001", "005", "009"]).await;

        let mut records = expander.expand(&ids(&["009", "001"])).await.unwrap();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        let got: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(got, vec!["001", "009"]);
    }

    #[tokio::test]
    async fn test_expand_skips_deleted_records() {
        let (expander, store) = seeded(&["001", "005", "009"]).await;
        store.remove("records", &record_key("005")).unwrap();

        let records = expander
            .expand_ordered(&ids(&["001", "005", "009"]))
            .await
            .unwrap();
        let got: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(got, vec!["001", "009"]);
    }

    #[tokio::test]
    async fn test_expand_ordered_follows_match_order() {
        let (expander, _) = seeded(&["a", "b", "c"]).await;

        let records = expander.expand_ordered(&ids(&["c", "a", "b"])).await.unwrap();
        let got: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(got, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_expand_nothing() {
        let (expander, store) = seeded(&[]).await;
        assert!(expander.expand(&[]).await.unwrap().is_empty());
        assert!(store.is_empty("records"));
    }
}
