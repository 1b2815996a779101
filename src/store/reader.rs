//! DocumentReader - lookups and ordered range scans
//!
//! Every call captures one snapshot at its start and answers entirely from it,
//! so a concurrent writer can never expose a partial state. A missing hash key
//! is an empty result, never an error.

use std::sync::Arc;

use crate::document::{Document, RangeQuery};
use crate::index::{DocumentKey, Index};

/// Read access to a document store.
pub trait DocumentReader<H, R, P> {
    /// Two-level point lookup.
    fn get(&self, hash_key: &H, range_key: &R) -> Option<Arc<Document<H, R, P>>>;

    /// Documents under `hash_key` accepted by `predicate`, in range-key order.
    fn find_where<F>(&self, hash_key: &H, predicate: F) -> Vec<Arc<Document<H, R, P>>>
    where
        F: FnMut(&Document<H, R, P>) -> bool;

    /// Documents under `hash_key` whose range key falls in `range`, in range-key order.
    fn find_range(&self, hash_key: &H, range: &RangeQuery<R>) -> Vec<Arc<Document<H, R, P>>>;
}

/// Lookups for stores whose documents have no range key.
pub trait PointReader<H, P>: DocumentReader<H, (), P> {
    fn find(&self, hash_key: &H) -> Option<Arc<Document<H, (), P>>> {
        self.get(hash_key, &())
    }
}

impl<H, P, T> PointReader<H, P> for T where T: DocumentReader<H, (), P> + ?Sized {}

impl<H: DocumentKey, R: DocumentKey, P> DocumentReader<H, R, P> for Index<H, R, P> {
    fn get(&self, hash_key: &H, range_key: &R) -> Option<Arc<Document<H, R, P>>> {
        self.snapshot().get(hash_key, range_key).cloned()
    }

    fn find_where<F>(&self, hash_key: &H, mut predicate: F) -> Vec<Arc<Document<H, R, P>>>
    where
        F: FnMut(&Document<H, R, P>) -> bool,
    {
        self.snapshot()
            .partition(hash_key)
            .filter(|doc| {
                let doc: &Document<H, R, P> = doc;
                predicate(doc)
            })
            .cloned()
            .collect()
    }

    fn find_range(&self, hash_key: &H, range: &RangeQuery<R>) -> Vec<Arc<Document<H, R, P>>> {
        self.snapshot().range(hash_key, range).cloned().collect()
    }
}

impl<H, R, P, T> DocumentReader<H, R, P> for &T
where
    T: DocumentReader<H, R, P> + ?Sized,
{
    fn get(&self, hash_key: &H, range_key: &R) -> Option<Arc<Document<H, R, P>>> {
        (**self).get(hash_key, range_key)
    }

    fn find_where<F>(&self, hash_key: &H, predicate: F) -> Vec<Arc<Document<H, R, P>>>
    where
        F: FnMut(&Document<H, R, P>) -> bool,
    {
        (**self).find_where(hash_key, predicate)
    }

    fn find_range(&self, hash_key: &H, range: &RangeQuery<R>) -> Vec<Arc<Document<H, R, P>>> {
        (**self).find_range(hash_key, range)
    }
}

impl<H, R, P, T> DocumentReader<H, R, P> for Arc<T>
where
    T: DocumentReader<H, R, P> + ?Sized,
{
    fn get(&self, hash_key: &H, range_key: &R) -> Option<Arc<Document<H, R, P>>> {
        (**self).get(hash_key, range_key)
    }

    fn find_where<F>(&self, hash_key: &H, predicate: F) -> Vec<Arc<Document<H, R, P>>>
    where
        F: FnMut(&Document<H, R, P>) -> bool,
    {
        (**self).find_where(hash_key, predicate)
    }

    fn find_range(&self, hash_key: &H, range: &RangeQuery<R>) -> Vec<Arc<Document<H, R, P>>> {
        (**self).find_range(hash_key, range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Snapshot;

    fn seeded() -> Index<&'static str, &'static str, u64> {
        let snapshot = Snapshot::from_documents(vec![
            Document::new("folder", "a", 1),
            Document::new("folder", "b", 2),
            Document::new("folder", "c", 3),
            Document::new("group", "a", 10),
        ])
        .unwrap();
        Index::from_snapshot(snapshot)
    }

    fn range_keys(docs: Vec<Arc<Document<&'static str, &'static str, u64>>>) -> Vec<&'static str> {
        docs.iter().map(|d| *d.range_key()).collect()
    }

    #[test]
    fn test_get() {
        let index = seeded();
        assert_eq!(*index.get(&"folder", &"b").unwrap().payload(), 2);
        assert!(index.get(&"folder", &"z").is_none());
        assert!(index.get(&"missing", &"a").is_none());
    }

    #[test]
    fn test_find_where() {
        let index = seeded();
        let odd = index.find_where(&"folder", |d| d.payload() % 2 == 1);
        assert_eq!(range_keys(odd), vec!["a", "c"]);
        assert!(index.find_where(&"missing", |_| true).is_empty());
    }

    #[test]
    fn test_find_range_variants() {
        let index = seeded();
        let keys =
            |query: RangeQuery<&'static str>| range_keys(index.find_range(&"folder", &query));
        assert_eq!(keys(RangeQuery::Unbound), vec!["a", "b", "c"]);
        assert_eq!(keys(RangeQuery::Between("a", "b")), vec!["a", "b"]);
        assert_eq!(keys(RangeQuery::LowerBound("b")), vec!["b", "c"]);
        assert_eq!(keys(RangeQuery::UpperBound("a")), vec!["a"]);
        assert!(index.find_range(&"missing", &RangeQuery::Unbound).is_empty());
    }

    #[test]
    fn test_point_reader() {
        let snapshot = Snapshot::from_documents(vec![Document::point("clock", 4)]).unwrap();
        let index: Index<&str, (), u64> = Index::from_snapshot(snapshot);
        assert_eq!(*index.find(&"clock").unwrap().payload(), 4);
        assert!(index.find(&"other").is_none());
    }

    #[test]
    fn test_reader_through_arc() {
        let index = Arc::new(seeded());
        assert_eq!(index.find_range(&"group", &RangeQuery::Unbound).len(), 1);
    }
}
