//! Tag index subsystem for tagsift
//!
//! Every (tag, record) pairing is stored as one posting entry. For a fixed
//! tag the store returns entries in ascending entity-id order, and no id
//! appears twice. Multi-tag queries merge-join these lists on the fly.
//!
//! # Invariants
//!
//! - Matched ids are emitted strictly ascending
//! - No posting list is ever loaded whole; cursors hold one page each
//! - Cursor state lives for one intersection call only; resumption is
//!   carried by the continuation id alone

mod cursor;
mod intersect;
mod layout;
mod tag;

pub use cursor::PostingCursor;
pub use intersect::{Intersection, Intersector};
pub use layout::{
    catalogue_key, entity_entry, entity_id, entity_sort, posting_key, posting_partition,
    record_key, CATALOGUE_PARTITION, ENTITY_ATTRIBUTE, ENTITY_PREFIX, RECORD_SORT,
};
pub use tag::{Tag, TagFilter, KEY_SEPARATOR};
