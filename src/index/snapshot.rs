//! Snapshot - one committed state of an index
//!
//! A snapshot is a persistent two-level ordered map:
//! `hash_key -> (range_key -> Document)`.
//!
//! Snapshots are never mutated in place. Every write builds a new snapshot
//! from an old one; unchanged subtrees are shared structurally, so the old
//! snapshot stays valid for any reader still holding it.

use std::fmt;
use std::sync::Arc;

use im::OrdMap;

use super::DocumentKey;
use crate::document::{Document, RangeQuery};

type Partition<H, R, P> = OrdMap<R, Arc<Document<H, R, P>>>;

/// An immutable, internally consistent view of every document in an index.
pub struct Snapshot<H, R, P> {
    partitions: OrdMap<H, Partition<H, R, P>>,
    len: usize,
}

impl<H: DocumentKey, R: DocumentKey, P> Snapshot<H, R, P> {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self {
            partitions: OrdMap::new(),
            len: 0,
        }
    }

    /// Builds a snapshot from documents, keeping their stored versions.
    ///
    /// Fails with the first document whose identity repeats.
    pub fn from_documents<I>(documents: I) -> Result<Self, Arc<Document<H, R, P>>>
    where
        I: IntoIterator<Item = Document<H, R, P>>,
    {
        documents
            .into_iter()
            .try_fold(Self::new(), |snapshot, document| {
                snapshot.try_insert(Arc::new(document))
            })
    }

    /// Total number of documents.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct hash keys.
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    pub fn get(&self, hash_key: &H, range_key: &R) -> Option<&Arc<Document<H, R, P>>> {
        self.partitions.get(hash_key)?.get(range_key)
    }

    pub fn contains(&self, hash_key: &H, range_key: &R) -> bool {
        self.get(hash_key, range_key).is_some()
    }

    /// Documents under `hash_key` whose range key falls in `range`, in range-key order.
    pub fn range<'a>(
        &'a self,
        hash_key: &H,
        range: &'a RangeQuery<R>,
    ) -> impl Iterator<Item = &'a Arc<Document<H, R, P>>> + 'a {
        let partition = if range.is_empty() {
            None
        } else {
            self.partitions.get(hash_key)
        };
        partition
            .into_iter()
            .flat_map(move |p| p.range::<_, R>(range.bounds()).map(|(_, doc)| doc))
    }

    /// Every document under `hash_key`, in range-key order.
    pub fn partition<'a>(
        &'a self,
        hash_key: &H,
    ) -> impl Iterator<Item = &'a Arc<Document<H, R, P>>> + 'a {
        self.partitions
            .get(hash_key)
            .into_iter()
            .flat_map(|p| p.values())
    }

    /// Every document, ordered by `(hash_key, range_key)`.
    pub fn documents(&self) -> impl Iterator<Item = &Arc<Document<H, R, P>>> + '_ {
        self.partitions.values().flat_map(|p| p.values())
    }

    /// Returns a snapshot with `document` added.
    ///
    /// Fails with the stored document if the identity is already taken.
    pub fn try_insert(
        &self,
        document: Arc<Document<H, R, P>>,
    ) -> Result<Self, Arc<Document<H, R, P>>> {
        if let Some(existing) = self.get(document.hash_key(), document.range_key()) {
            return Err(Arc::clone(existing));
        }
        Ok(self.with_document(document))
    }

    /// Returns a snapshot with `document` stored under its identity,
    /// replacing any previous document there.
    pub fn with_document(&self, document: Arc<Document<H, R, P>>) -> Self {
        let hash_key = document.hash_key().clone();
        let range_key = document.range_key().clone();

        let mut partition = self.partitions.get(&hash_key).cloned().unwrap_or_default();
        let previous = partition.insert(range_key, document);

        let mut partitions = self.partitions.clone();
        partitions.insert(hash_key, partition);

        Self {
            partitions,
            len: if previous.is_some() { self.len } else { self.len + 1 },
        }
    }
}

impl<H: DocumentKey, R: DocumentKey, P> Default for Snapshot<H, R, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: DocumentKey, R: DocumentKey, P> Clone for Snapshot<H, R, P> {
    fn clone(&self) -> Self {
        Self {
            partitions: self.partitions.clone(),
            len: self.len,
        }
    }
}

impl<H: DocumentKey, R: DocumentKey, P> fmt::Debug for Snapshot<H, R, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("partitions", &self.partitions.len())
            .field("documents", &self.len)
            .finish()
    }
}
