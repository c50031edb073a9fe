//! Batch requests and chunking
//!
//! A request is an ordered list of (collection, entry) pairs. Chunking cuts
//! that list into consecutive runs of at most `ceiling` entries; a run may
//! cover several collections, and is regrouped by collection for the store
//! call.

use crate::store::ByCollection;

/// Ordered bulk request across one or more collections
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest<E> {
    entries: Vec<(String, E)>,
}

impl<E> BatchRequest<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append one entry for `collection`
    pub fn push(&mut self, collection: impl Into<String>, entry: E) {
        self.entries.push((collection.into(), entry));
    }

    /// Append many entries for the same collection
    pub fn extend<I>(&mut self, collection: &str, entries: I)
    where
        I: IntoIterator<Item = E>,
    {
        self.entries
            .extend(entries.into_iter().map(|e| (collection.to_string(), e)));
    }

    /// Flatten grouped entries, collection by collection
    pub fn from_groups(groups: ByCollection<E>) -> Self {
        let mut request = Self::new();
        for (collection, entries) in groups {
            request.extend(&collection, entries);
        }
        request
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Split into ordered chunks of at most `ceiling` entries each
    pub fn into_chunks(self, ceiling: usize) -> Vec<ByCollection<E>> {
        let ceiling = ceiling.max(1);
        let mut chunks = Vec::with_capacity(self.entries.len().div_ceil(ceiling));
        let mut current = ByCollection::new();
        let mut in_current = 0;

        for (collection, entry) in self.entries {
            if in_current == ceiling {
                chunks.push(std::mem::take(&mut current));
                in_current = 0;
            }
            current.entry(collection).or_insert_with(Vec::new).push(entry);
            in_current += 1;
        }

        if in_current > 0 {
            chunks.push(current);
        }
        chunks
    }
}

impl<E> Default for BatchRequest<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::entry_count;

    fn sizes<E>(chunks: &[ByCollection<E>]) -> Vec<usize> {
        chunks.iter().map(entry_count).collect()
    }

    #[test]
    fn test_chunk_sizes() {
        let mut request = BatchRequest::new();
        request.extend("t", 0..101);
        assert_eq!(sizes(&request.into_chunks(100)), vec![100, 1]);

        let mut request = BatchRequest::new();
        request.extend("t", 0..30);
        assert_eq!(sizes(&request.into_chunks(25)), vec![25, 5]);
    }

    #[test]
    fn test_exact_multiple_has_no_empty_chunk() {
        let mut request = BatchRequest::new();
        request.extend("t", 0..50);
        assert_eq!(sizes(&request.into_chunks(25)), vec![25, 25]);
    }

    #[test]
    fn test_empty_request() {
        let request: BatchRequest<u32> = BatchRequest::new();
        assert!(request.into_chunks(25).is_empty());
    }

    #[test]
    fn test_chunk_spans_collections_in_order() {
        let mut request = BatchRequest::new();
        request.extend("a", [1, 2, 3]);
        request.extend("b", [4, 5]);

        let chunks = request.into_chunks(4);
        assert_eq!(sizes(&chunks), vec![4, 1]);
        assert_eq!(chunks[0]["a"], vec![1, 2, 3]);
        assert_eq!(chunks[0]["b"], vec![4]);
        assert_eq!(chunks[1]["b"], vec![5]);
    }

    #[test]
    fn test_from_groups() {
        let mut groups = ByCollection::new();
        groups.insert("x".to_string(), vec![1, 2]);
        groups.insert("y".to_string(), vec![3]);
        assert_eq!(BatchRequest::from_groups(groups).len(), 3);
    }
}
