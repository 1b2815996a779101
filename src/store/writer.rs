//! DocumentWriter - Insert / Update / InsertOrUpdate
//!
//! All three share one shape: read the current snapshot, compute the next one,
//! try to exchange it in. Losing the exchange means another writer committed
//! first; the writer replays its mutation against the fresher snapshot.
//!
//! - Duplicate, not-found and version mismatch are decided per attempt and
//!   returned immediately, never retried
//! - The only bound on retries is the caller's cancellation token, checked at
//!   the top of every attempt
//! - Under sustained contention a writer may retry indefinitely (livelock);
//!   `BackoffConfig` trades latency for fewer wasted rounds

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::backoff::Backoff;
use super::errors::{describe_key, StoreError, StoreResult};
use crate::document::Document;
use crate::entity::Revision;
use crate::index::{DocumentKey, Index, Snapshot};
use crate::observability::{event_enabled, log_event, Event};

/// Write access to a document store.
pub trait DocumentWriter<H, R, P> {
    /// Adds a document that must not exist yet. The stored version is always
    /// `Revision::ZERO`, whatever the caller passed.
    fn insert(
        &self,
        document: Document<H, R, P>,
        cancel: &CancellationToken,
    ) -> StoreResult<Arc<Document<H, R, P>>>;

    /// Replaces an existing document. `document.version()` must equal the
    /// stored revision; the stored revision is then ticked.
    fn update(
        &self,
        document: Document<H, R, P>,
        cancel: &CancellationToken,
    ) -> StoreResult<Arc<Document<H, R, P>>>;

    /// Inserts if absent, otherwise updates under the same version check.
    fn insert_or_update(
        &self,
        document: Document<H, R, P>,
        cancel: &CancellationToken,
    ) -> StoreResult<Arc<Document<H, R, P>>>;
}

type Attempt<H, R, P> = StoreResult<(Snapshot<H, R, P>, Arc<Document<H, R, P>>)>;

impl<H: DocumentKey, R: DocumentKey, P> Index<H, R, P> {
    /// Runs `attempt` against successive snapshots until one is exchanged in,
    /// `attempt` fails, or `cancel` fires.
    fn commit<F>(
        &self,
        operation: &'static str,
        document: &Document<H, R, P>,
        cancel: &CancellationToken,
        mut attempt: F,
    ) -> StoreResult<Arc<Document<H, R, P>>>
    where
        F: FnMut(&Snapshot<H, R, P>) -> Attempt<H, R, P>,
    {
        let mut backoff = Backoff::new(self.backoff());
        let mut attempts: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                let key = describe_key(document.hash_key(), document.range_key());
                self.metrics().increment_cancellations();
                log_event(
                    Event::WriteCancelled,
                    &[
                        ("operation", operation),
                        ("key", &key),
                        ("attempts", &attempts.to_string()),
                    ],
                );
                return Err(StoreError::Cancelled {
                    key,
                    operation,
                    attempts,
                });
            }

            attempts += 1;
            let current = self.snapshot();
            let (next, written) = attempt(current.as_ref())?;

            if self.exchange(&current, Arc::new(next)) {
                self.metrics().increment_commits();
                return Ok(written);
            }

            self.metrics().increment_cas_retries();
            if event_enabled(Event::CasRetry) {
                log_event(
                    Event::CasRetry,
                    &[
                        ("operation", operation),
                        ("key", &describe_key(document.hash_key(), document.range_key())),
                        ("attempt", &attempts.to_string()),
                    ],
                );
            }
            backoff.wait();
        }
    }

    /// Builds the replacement for `existing`, enforcing the optimistic lock.
    fn replace(
        &self,
        snapshot: &Snapshot<H, R, P>,
        existing: &Document<H, R, P>,
        document: &Document<H, R, P>,
    ) -> Attempt<H, R, P>
    where
        P: Clone,
    {
        if existing.version() != document.version() {
            self.metrics().increment_version_conflicts();
            let key = describe_key(document.hash_key(), document.range_key());
            if event_enabled(Event::VersionConflict) {
                log_event(
                    Event::VersionConflict,
                    &[
                        ("key", &key),
                        ("expected", &document.version().to_string()),
                        ("actual", &existing.version().to_string()),
                    ],
                );
            }
            return Err(StoreError::VersionConflict {
                key,
                expected: document.version(),
                actual: existing.version(),
            });
        }

        let version = existing.version().checked_tick().ok_or_else(|| {
            StoreError::Storage(format!(
                "revision exhausted ({})",
                describe_key(document.hash_key(), document.range_key())
            ))
        })?;

        let written = Arc::new(document.clone().with_version(version));
        Ok((snapshot.with_document(Arc::clone(&written)), written))
    }
}

impl<H: DocumentKey, R: DocumentKey, P: Clone> DocumentWriter<H, R, P> for Index<H, R, P> {
    fn insert(
        &self,
        document: Document<H, R, P>,
        cancel: &CancellationToken,
    ) -> StoreResult<Arc<Document<H, R, P>>> {
        let written = Arc::new(document.with_version(Revision::ZERO));

        self.commit("insert", &written, cancel, |snapshot| {
            match snapshot.try_insert(Arc::clone(&written)) {
                Ok(next) => Ok((next, Arc::clone(&written))),
                Err(existing) => {
                    self.metrics().increment_duplicate_rejections();
                    Err(StoreError::duplicate_key(existing.hash_key(), existing.range_key()))
                }
            }
        })
    }

    fn update(
        &self,
        document: Document<H, R, P>,
        cancel: &CancellationToken,
    ) -> StoreResult<Arc<Document<H, R, P>>> {
        self.commit("update", &document, cancel, |snapshot| {
            let Some(existing) = snapshot.get(document.hash_key(), document.range_key()) else {
                self.metrics().increment_not_found();
                return Err(StoreError::not_found(document.hash_key(), document.range_key()));
            };
            self.replace(snapshot, existing, &document)
        })
    }

    fn insert_or_update(
        &self,
        document: Document<H, R, P>,
        cancel: &CancellationToken,
    ) -> StoreResult<Arc<Document<H, R, P>>> {
        self.commit("insert_or_update", &document, cancel, |snapshot| {
            match snapshot.get(document.hash_key(), document.range_key()) {
                Some(existing) => self.replace(snapshot, existing, &document),
                None => {
                    let written = Arc::new(document.clone().with_version(Revision::ZERO));
                    Ok((snapshot.with_document(Arc::clone(&written)), written))
                }
            }
        })
    }
}

impl<H, R, P, T> DocumentWriter<H, R, P> for &T
where
    T: DocumentWriter<H, R, P> + ?Sized,
{
    fn insert(
        &self,
        document: Document<H, R, P>,
        cancel: &CancellationToken,
    ) -> StoreResult<Arc<Document<H, R, P>>> {
        (**self).insert(document, cancel)
    }

    fn update(
        &self,
        document: Document<H, R, P>,
        cancel: &CancellationToken,
    ) -> StoreResult<Arc<Document<H, R, P>>> {
        (**self).update(document, cancel)
    }

    fn insert_or_update(
        &self,
        document: Document<H, R, P>,
        cancel: &CancellationToken,
    ) -> StoreResult<Arc<Document<H, R, P>>> {
        (**self).insert_or_update(document, cancel)
    }
}

impl<H, R, P, T> DocumentWriter<H, R, P> for Arc<T>
where
    T: DocumentWriter<H, R, P> + ?Sized,
{
    fn insert(
        &self,
        document: Document<H, R, P>,
        cancel: &CancellationToken,
    ) -> StoreResult<Arc<Document<H, R, P>>> {
        (**self).insert(document, cancel)
    }

    fn update(
        &self,
        document: Document<H, R, P>,
        cancel: &CancellationToken,
    ) -> StoreResult<Arc<Document<H, R, P>>> {
        (**self).update(document, cancel)
    }

    fn insert_or_update(
        &self,
        document: Document<H, R, P>,
        cancel: &CancellationToken,
    ) -> StoreResult<Arc<Document<H, R, P>>> {
        (**self).insert_or_update(document, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DocumentReader;

    type TestIndex = Index<&'static str, &'static str, u64>;

    #[test]
    fn test_insert_forces_zero_version() {
        let index = TestIndex::new();
        let cancel = CancellationToken::new();
        let written = index
            .insert(Document::new("folder", "a", 1).with_version(Revision::new(7)), &cancel)
            .unwrap();
        assert_eq!(written.version(), Revision::ZERO);
        assert_eq!(index.get(&"folder", &"a").unwrap().version(), Revision::ZERO);
    }

    #[test]
    fn test_duplicate_insert_rejected_and_unchanged() {
        let index = TestIndex::new();
        let cancel = CancellationToken::new();
        index.insert(Document::new("folder", "a", 1), &cancel).unwrap();

        let err = index.insert(Document::new("folder", "a", 2), &cancel).unwrap_err();
        assert!(err.is_duplicate_key());
        assert_eq!(*index.get(&"folder", &"a").unwrap().payload(), 1);
        assert_eq!(index.metrics().snapshot().duplicate_rejections, 1);
    }

    #[test]
    fn test_update_ticks_version() {
        let index = TestIndex::new();
        let cancel = CancellationToken::new();
        let v0 = index.insert(Document::new("folder", "a", 1), &cancel).unwrap();

        let v1 = index
            .update(Document::new("folder", "a", 2).with_version(v0.version()), &cancel)
            .unwrap();
        assert_eq!(v1.version(), Revision::new(1));
        assert_eq!(*v1.payload(), 2);
    }

    #[test]
    fn test_stale_update_conflicts() {
        let index = TestIndex::new();
        let cancel = CancellationToken::new();
        index.insert(Document::new("folder", "a", 1), &cancel).unwrap();
        index
            .update(Document::new("folder", "a", 2).with_version(Revision::ZERO), &cancel)
            .unwrap();

        let err = index
            .update(Document::new("folder", "a", 3).with_version(Revision::ZERO), &cancel)
            .unwrap_err();
        match err {
            StoreError::VersionConflict { expected, actual, .. } => {
                assert_eq!(expected, Revision::ZERO);
                assert_eq!(actual, Revision::new(1));
            }
            other => panic!("expected version conflict, got {other:?}"),
        }
        assert_eq!(*index.get(&"folder", &"a").unwrap().payload(), 2);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let index = TestIndex::new();
        let err = index
            .update(Document::new("folder", "a", 1), &CancellationToken::new())
            .unwrap_err();
        assert_eq!(err.code(), "STORE_NOT_FOUND");
    }

    #[test]
    fn test_insert_or_update_both_paths() {
        let index = TestIndex::new();
        let cancel = CancellationToken::new();

        let inserted = index
            .insert_or_update(
                Document::new("folder", "a", 1).with_version(Revision::new(5)),
                &cancel,
            )
            .unwrap();
        assert_eq!(inserted.version(), Revision::ZERO);

        let updated = index
            .insert_or_update(Document::new("folder", "a", 2), &cancel)
            .unwrap();
        assert_eq!(updated.version(), Revision::new(1));

        let err = index
            .insert_or_update(Document::new("folder", "a", 3), &cancel)
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_cancelled_before_first_attempt() {
        let index = TestIndex::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = index.insert(Document::new("folder", "a", 1), &cancel).unwrap_err();
        match err {
            StoreError::Cancelled { operation, attempts, .. } => {
                assert_eq!(operation, "insert");
                assert_eq!(attempts, 0);
            }
            other => panic!("expected cancellation, got {other:?}"),
        }
        assert!(index.snapshot().is_empty());
        assert_eq!(index.metrics().snapshot().cancellations, 1);
    }

    #[test]
    fn test_cancelled_after_lost_exchange() {
        let index = TestIndex::new();
        let cancel = CancellationToken::new();
        let document = Document::new("folder", "a", 1);
        let mut calls: u64 = 0;

        let err = index
            .commit("insert", &document, &cancel, |snapshot| {
                calls += 1;
                // Another writer commits while this attempt is in flight, and
                // the caller gives up before the replay.
                let current = index.snapshot();
                let competing = current
                    .try_insert(Arc::new(Document::new("folder", "b", calls)))
                    .unwrap();
                assert!(index.exchange(&current, Arc::new(competing)));
                cancel.cancel();

                let written = Arc::new(document.clone());
                Ok((snapshot.try_insert(Arc::clone(&written)).unwrap(), written))
            })
            .unwrap_err();

        match err {
            StoreError::Cancelled { operation, attempts, .. } => {
                assert_eq!(operation, "insert");
                assert_eq!(attempts, 1);
            }
            other => panic!("expected cancellation, got {other:?}"),
        }
        assert_eq!(calls, 1);
        assert!(index.get(&"folder", &"a").is_none());
        assert!(index.get(&"folder", &"b").is_some());

        let metrics = index.metrics().snapshot();
        assert_eq!(metrics.cas_retries, 1);
        assert_eq!(metrics.cancellations, 1);
        assert_eq!(metrics.commits, 0);
    }

    #[test]
    fn test_revision_exhaustion_is_reported() {
        let snapshot = Snapshot::from_documents(vec![
            Document::new("folder", "a", 1).with_version(Revision::new(u64::MAX)),
        ])
        .unwrap();
        let index: TestIndex = Index::from_snapshot(snapshot);
        let err = index
            .update(
                Document::new("folder", "a", 2).with_version(Revision::new(u64::MAX)),
                &CancellationToken::new(),
            )
            .unwrap_err();
        assert_eq!(err.code(), "STORE_FAILURE");
    }

    #[test]
    fn test_commits_are_counted() {
        let index = TestIndex::new();
        let cancel = CancellationToken::new();
        index.insert(Document::new("h", "a", 1), &cancel).unwrap();
        index.insert(Document::new("h", "b", 1), &cancel).unwrap();
        assert_eq!(index.metrics().snapshot().commits, 2);
        assert_eq!(index.metrics().snapshot().cas_retries, 0);
    }
}
