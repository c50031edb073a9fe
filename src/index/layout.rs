//! Key layout for records, posting entries and the record catalogue
//!
//! | item            | partition             | sort           |
//! |-----------------|-----------------------|----------------|
//! | record          | `record#<id>`         | `meta`         |
//! | posting entry   | `tag#<name>#<value>`  | `record#<id>`  |
//! | catalogue entry | `records`             | `record#<id>`  |
//!
//! Within one posting partition sort keys share the `record#` prefix, so
//! ascending sort-key order is ascending entity-id order.

use serde_json::Value;

use super::tag::Tag;
use crate::store::{Item, Key};

/// Sort-key prefix of every entry that points at a record
pub const ENTITY_PREFIX: &str = "record#";

/// Sort key of a record item
pub const RECORD_SORT: &str = "meta";

/// Partition listing every record id
pub const CATALOGUE_PARTITION: &str = "records";

/// Attribute carrying the entity id on posting and catalogue entries
pub const ENTITY_ATTRIBUTE: &str = "entity_id";

/// Key of the item holding the record itself
pub fn record_key(id: &str) -> Key {
    Key::new(format!("{}{}", ENTITY_PREFIX, id), RECORD_SORT)
}

/// Partition holding one tag's posting list
pub fn posting_partition(tag: &Tag) -> String {
    format!("tag#{}#{}", tag.name, tag.value)
}

/// Sort key pointing at an entity
pub fn entity_sort(id: &str) -> String {
    format!("{}{}", ENTITY_PREFIX, id)
}

/// Key of the posting entry for (tag, id)
pub fn posting_key(tag: &Tag, id: &str) -> Key {
    Key::new(posting_partition(tag), entity_sort(id))
}

/// Key of the catalogue entry for a record
pub fn catalogue_key(id: &str) -> Key {
    Key::new(CATALOGUE_PARTITION, entity_sort(id))
}

/// Posting or catalogue entry item for an entity
pub fn entity_entry(key: Key, id: &str) -> Item {
    Item::new(key).with_attribute(ENTITY_ATTRIBUTE, Value::String(id.to_string()))
}

/// Recover the entity id from an entry's sort key
pub fn entity_id(sort: &str) -> Option<&str> {
    sort.strip_prefix(ENTITY_PREFIX)
}
