//! Key, item and request/response shapes exchanged with the store

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Entries grouped by collection name.
///
/// Ordering of entries within one group carries no meaning.
pub type ByCollection<T> = BTreeMap<String, Vec<T>>;

/// Total number of entries across all collections
pub fn entry_count<T>(groups: &ByCollection<T>) -> usize {
    groups.values().map(Vec::len).sum()
}

/// Composite primary key: a partition key plus a sort key.
///
/// Keys order by partition, then sort key, both lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key {
    pub partition: String,
    pub sort: String,
}

impl Key {
    pub fn new(partition: impl Into<String>, sort: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            sort: sort.into(),
        }
    }
}

/// A stored item: its key plus free-form attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub key: Key,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Item {
    /// Create an item with no attributes
    pub fn new(key: Key) -> Self {
        Self {
            key,
            attributes: Map::new(),
        }
    }

    /// Add one attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Get a string attribute
    pub fn str_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }
}

/// One page request against a single partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeQuery {
    /// Collection to read from
    pub collection: String,
    /// Partition key; only items in this partition are returned
    pub partition: String,
    /// Only sort keys starting with this prefix are returned
    pub sort_prefix: String,
    /// Resume strictly after this key
    pub exclusive_start: Option<Key>,
    /// Maximum items in the page
    pub limit: usize,
}

/// One page of a range query, ascending by sort key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPage {
    pub items: Vec<Item>,
    /// Where to resume; `None` means the partition is exhausted
    pub last_key: Option<Key>,
}

/// Response of one bulk get call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchGetOutput {
    pub items: ByCollection<Item>,
    /// Keys the store did not service in this call
    pub unprocessed: ByCollection<Key>,
}

/// Response of one bulk write call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchWriteOutput {
    /// Items the store did not write in this call
    pub unprocessed: ByCollection<Item>,
}
