//! Tags and tag filters

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::{QueryError, QueryResult};

/// Separator used inside partition keys; forbidden in tag names.
pub const KEY_SEPARATOR: char = '#';

/// A (name, value) label attached to a record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse `name=value`
    pub fn parse(s: &str) -> QueryResult<Self> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| QueryError::validation(format!("tag '{}' is not name=value", s)))?;
        let tag = Self::new(name.trim(), value.trim());
        tag.validate()?;
        Ok(tag)
    }

    /// Check that the tag can be encoded into a posting-list key
    pub fn validate(&self) -> QueryResult<()> {
        if self.name.is_empty() {
            return Err(QueryError::validation("tag name must not be empty"));
        }
        if self.name.contains(KEY_SEPARATOR) {
            return Err(QueryError::validation(format!(
                "tag name '{}' must not contain '{}'",
                self.name, KEY_SEPARATOR
            )));
        }
        if self.value.is_empty() {
            return Err(QueryError::validation(format!(
                "tag '{}' has an empty value",
                self.name
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// The tags a query requires, in caller-chosen order.
///
/// Tag names are unique; every tag must be present on a matching record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    tags: Vec<Tag>,
}

impl TagFilter {
    /// Build a filter from (name, value) pairs, keeping their order.
    ///
    /// Rejects invalid tags and repeated names.
    pub fn from_pairs<I, N, V>(pairs: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let mut tags: Vec<Tag> = Vec::new();
        for (name, value) in pairs {
            let tag = Tag::new(name, value);
            tag.validate()?;
            if tags.iter().any(|t| t.name == tag.name) {
                return Err(QueryError::validation(format!(
                    "tag '{}' given more than once",
                    tag.name
                )));
            }
            tags.push(tag);
        }
        Ok(Self { tags })
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
