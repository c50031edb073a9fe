//! Leapfrog intersection of posting lists
//!
//! Produces, in ascending order, the entity ids present in every requested
//! tag's posting list, at most `limit` of them per call, plus a
//! continuation id to resume from.
//!
//! The merge is a chain of pairwise comparisons driven by two states:
//!
//! - `Compare(i)`: compare cursor `i` with cursor `i + 1`. Equal moves on to
//!   `Compare(i + 1)`; otherwise the smaller side advances by one and the
//!   chain restarts at `Compare(0)`. Reaching the last cursor means every
//!   pair in the chain was equal, so the id is common to all lists.
//! - `Matched`: emit the common id, advance every cursor, restart.
//!
//! Each step either emits a match or discards exactly one id that cannot
//! match, so work is bounded by the advances taken. Any cursor running dry
//! ends the intersection.

use std::cmp::Ordering;
use std::sync::Arc;

use futures_util::future::try_join_all;

use super::cursor::PostingCursor;
use super::tag::TagFilter;
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::query::{QueryError, QueryResult};
use crate::store::SortedStore;

/// One page of intersection output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intersection {
    /// Matched ids, strictly ascending
    pub ids: Vec<String>,
    /// Last matched id when the page is full; `None` once the intersection
    /// is known to be exhausted
    pub continuation: Option<String>,
}

impl Intersection {
    fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Compare(usize),
    /// Every cursor sits on this id
    Matched(String),
}

/// Merge-joins posting lists held in a sorted store
pub struct Intersector {
    store: Arc<dyn SortedStore>,
    metrics: Arc<MetricsRegistry>,
    collection: String,
}

impl Intersector {
    pub fn new(
        store: Arc<dyn SortedStore>,
        collection: impl Into<String>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            store,
            metrics,
            collection: collection.into(),
        }
    }

    /// Intersect the posting lists of every tag in `filter`.
    ///
    /// Only ids strictly greater than `continuation` are considered. Each
    /// cursor pages through its list `limit` ids at a time.
    pub async fn intersect(
        &self,
        filter: &TagFilter,
        continuation: Option<&str>,
        limit: usize,
    ) -> QueryResult<Intersection> {
        if filter.is_empty() {
            return Err(QueryError::validation("at least one tag is required"));
        }
        if limit == 0 {
            return Err(QueryError::validation("limit must be greater than zero"));
        }

        // The only fan-out: every first page is requested at once.
        let mut cursors = try_join_all(filter.tags().iter().map(|tag| {
            PostingCursor::open(
                Arc::clone(&self.store),
                Arc::clone(&self.metrics),
                &self.collection,
                tag,
                continuation,
                limit,
            )
        }))
        .await?;

        if let Some(pos) = cursors.iter().position(PostingCursor::is_empty) {
            let tag = filter.tags()[pos].to_string();
            log_event(Event::IntersectShortCircuit, &[("tag", tag.as_str())]);
            return Ok(Intersection::empty());
        }

        let ids = leapfrog(&mut cursors, limit).await?;
        self.metrics.add_ids_matched(ids.len() as u64);

        let continuation = if ids.len() == limit {
            ids.last().cloned()
        } else {
            None
        };

        Ok(Intersection { ids, continuation })
    }
}

/// Run the merge until `limit` ids match or a cursor is exhausted.
async fn leapfrog(cursors: &mut [PostingCursor], limit: usize) -> QueryResult<Vec<String>> {
    let last = cursors.len() - 1;
    let mut matched = Vec::new();
    let mut step = Step::Compare(0);

    while matched.len() < limit {
        step = match step {
            Step::Compare(i) => {
                if !cursors[i].ready().await? {
                    break;
                }
                if i == last {
                    match cursors[i].current() {
                        Some(id) => Step::Matched(id.to_string()),
                        None => break,
                    }
                } else {
                    if !cursors[i + 1].ready().await? {
                        break;
                    }

                    let (left, right) = cursors.split_at_mut(i + 1);
                    let ordering = left[i].current().cmp(&right[0].current());
                    match ordering {
                        Ordering::Equal => Step::Compare(i + 1),
                        Ordering::Less => {
                            left[i].advance();
                            Step::Compare(0)
                        }
                        Ordering::Greater => {
                            right[0].advance();
                            Step::Compare(0)
                        }
                    }
                }
            }
            Step::Matched(id) => {
                matched.push(id);
                for cursor in cursors.iter_mut() {
                    cursor.advance();
                }
                Step::Compare(0)
            }
        };
    }

    Ok(matched)
}
