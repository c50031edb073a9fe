//! Record model and its stored form

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::index::{record_key, Tag};
use crate::query::{QueryError, QueryResult};
use crate::store::Item;

/// A tagged record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique id; assigned on save when empty
    #[serde(default)]
    pub id: String,
    /// Human-readable name; required
    #[serde(default)]
    pub name: String,
    /// Tag name to tag value
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Set on save when absent
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Free-form payload
    #[serde(default)]
    pub body: Value,
}

impl Record {
    /// Create an unsaved record with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            tags: BTreeMap::new(),
            created_at: None,
            body: Value::Null,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// The record's tags as [`Tag`] values, ordered by name
    pub fn tag_list(&self) -> Vec<Tag> {
        self.tags.iter().map(|(n, v)| Tag::new(n.as_str(), v.as_str())).collect()
    }

    /// Check the record can be stored and found
    pub fn validate(&self) -> QueryResult<()> {
        if self.name.trim().is_empty() {
            return Err(QueryError::validation("record name must not be empty"));
        }
        for tag in self.tag_list() {
            tag.validate()?;
        }
        Ok(())
    }

    /// Fill in id and creation time where missing
    pub fn normalize(mut self) -> Self {
        if self.id.is_empty() {
            self.id = Uuid::new_v4().to_string();
        }
        self.name = self.name.trim().to_string();
        if self.created_at.is_none() {
            self.created_at = Some(Utc::now());
        }
        self
    }

    /// Stored form of the record
    pub fn to_item(&self) -> QueryResult<Item> {
        match serde_json::to_value(self)? {
            Value::Object(attributes) => Ok(Item {
                key: record_key(&self.id),
                attributes,
            }),
            _ => Err(QueryError::Decode("record did not serialize to an object".into())),
        }
    }

    /// Decode a stored record item
    pub fn from_item(item: Item) -> QueryResult<Self> {
        Ok(serde_json::from_value(Value::Object(item.attributes))?)
    }
}
