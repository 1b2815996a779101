//! Clock - persisted monotonic counters
//!
//! A counter is an ordinary point document under hash key `clock/<name>`
//! whose payload is the last value handed out. It is created lazily by the
//! first tick.
//!
//! `tick` is read, increment, write. The write is an insert when the counter
//! is absent and a version-checked update otherwise, so of several racing
//! tickers exactly one wins each value; the losers observe a duplicate key or a
//! version conflict and start over from a fresh read. For `N` concurrent
//! ticks on one name the returned values are exactly `prev+1 ..= prev+N`.
//!
//! Clock has no privileged access: it uses only the public reader and writer
//! contract, so it runs on the same store as application data.

use tokio_util::sync::CancellationToken;

use crate::document::Document;
use crate::entity::Key;
use crate::index::Index;
use crate::observability::{event_enabled, log_event, Event};
use crate::store::{DocumentReader, DocumentWriter, PointReader, StoreError, StoreResult};

const CLOCK_ROOT: &str = "clock";

/// An index holding only counter documents.
pub type CounterIndex = Index<Key, (), u64>;

/// Named monotonic counters over a point-document store.
#[derive(Debug)]
pub struct Clock<S> {
    store: S,
    root: Key,
}

impl<S> Clock<S>
where
    S: DocumentReader<Key, (), u64> + DocumentWriter<Key, (), u64>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            root: Key::from_static(CLOCK_ROOT),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The hash key holding counter `name`.
    pub fn counter_key(&self, name: &Key) -> Key {
        self.root.join(name)
    }

    /// The last value handed out for `name`, zero if it never ticked.
    pub fn current(&self, name: &Key) -> u64 {
        self.store
            .find(&self.counter_key(name))
            .map(|doc| *doc.payload())
            .unwrap_or(0)
    }

    /// Advances counter `name` and returns the new value.
    pub fn tick(&self, name: &Key, cancel: &CancellationToken) -> StoreResult<u64> {
        let key = self.counter_key(name);
        let mut attempts: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(cancelled(&key, "clock_tick", attempts));
            }
            attempts += 1;

            let written = match self.store.find(&key) {
                None => self.store.insert(Document::point(key.clone(), 1), cancel),
                Some(current) => {
                    let next = current.payload().checked_add(1).ok_or_else(|| {
                        StoreError::Storage(format!("counter exhausted ({})", key))
                    })?;
                    self.store.update(
                        Document::point(key.clone(), next).with_version(current.version()),
                        cancel,
                    )
                }
            };

            match written {
                Ok(doc) => {
                    let value = *doc.payload();
                    if event_enabled(Event::ClockTick) {
                        log_event(
                            Event::ClockTick,
                            &[("key", key.as_str()), ("value", &value.to_string())],
                        );
                    }
                    return Ok(value);
                }
                Err(StoreError::DuplicateKey { .. }) | Err(StoreError::VersionConflict { .. }) => {
                    continue
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Moves counter `name` forward to at least `floor` and returns its value.
    ///
    /// A counter already at or past `floor` is left untouched, so the counter
    /// never moves backwards.
    pub fn advance_to(
        &self,
        name: &Key,
        floor: u64,
        cancel: &CancellationToken,
    ) -> StoreResult<u64> {
        let key = self.counter_key(name);
        let mut attempts: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(cancelled(&key, "clock_advance", attempts));
            }
            attempts += 1;

            let written = match self.store.find(&key) {
                Some(current) if *current.payload() >= floor => return Ok(*current.payload()),
                None if floor == 0 => return Ok(0),
                None => self.store.insert(Document::point(key.clone(), floor), cancel),
                Some(current) => self.store.update(
                    Document::point(key.clone(), floor).with_version(current.version()),
                    cancel,
                ),
            };

            match written {
                Ok(doc) => return Ok(*doc.payload()),
                Err(StoreError::DuplicateKey { .. }) | Err(StoreError::VersionConflict { .. }) => {
                    continue
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Same as `tick`.
    pub fn next(&self, name: &Key, cancel: &CancellationToken) -> StoreResult<u64> {
        self.tick(name, cancel)
    }

    /// A handle bound to one counter.
    pub fn sequence(&self, name: Key) -> Sequence<'_, S> {
        Sequence { clock: self, name }
    }
}

fn cancelled(key: &Key, operation: &'static str, attempts: u64) -> StoreError {
    log_event(
        Event::WriteCancelled,
        &[
            ("operation", operation),
            ("key", key.as_str()),
            ("attempts", &attempts.to_string()),
        ],
    );
    StoreError::Cancelled {
        key: key.to_string(),
        operation,
        attempts,
    }
}

/// One named counter of a `Clock`.
#[derive(Debug)]
pub struct Sequence<'a, S> {
    clock: &'a Clock<S>,
    name: Key,
}

impl<'a, S> Sequence<'a, S>
where
    S: DocumentReader<Key, (), u64> + DocumentWriter<Key, (), u64>,
{
    pub fn name(&self) -> &Key {
        &self.name
    }

    pub fn next(&self, cancel: &CancellationToken) -> StoreResult<u64> {
        self.clock.tick(&self.name, cancel)
    }

    pub fn current(&self) -> u64 {
        self.clock.current(&self.name)
    }
}
