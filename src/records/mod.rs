//! Records subsystem for tagsift
//!
//! The record model, bulk expansion of matched ids, and the write path that
//! keeps posting lists in step with records.

mod expander;
mod record;
mod writer;

pub use expander::RecordExpander;
pub use record::Record;
pub use writer::RecordWriter;
