//! KeyEncoder - dictionary encoding of resource/relationship pairs
//!
//! Each dictionary maps a domain string to a stable small integer. Entries
//! live in the dictionaries store under hash key `encoding/<dictionary>`,
//! range key = the domain string, payload = the ID. IDs come from the clock
//! counter of the same name and start at 1.
//!
//! The winner of an allocation also writes a reverse entry under hash key
//! `encoding/<dictionary>/<id>` whose range key is the domain string, so
//! `decode` is a point lookup. Stores written without reverse entries still
//! decode, through a scan of the forward partition.
//!
//! Allocation under contention: every racer ticks the clock, then tries to
//! insert its mapping. The first insert wins; the others get a duplicate key,
//! drop their freshly minted ID and adopt the winner's. Abandoned IDs leave
//! permanent gaps, which is acceptable. A mapping, once published, never
//! changes.

use tokio_util::sync::CancellationToken;

use super::errors::EncodingResult;
use super::packing::{Dictionary, EncodedIds, PackedKey};
use crate::clock::{Clock, CounterIndex};
use crate::document::{Document, RangeQuery};
use crate::entity::{InvalidKeyError, Key};
use crate::index::Index;
use crate::observability::{log_event, Event};
use crate::store::{DocumentReader, DocumentWriter, StoreError};

/// An index holding dictionary entries.
pub type DictionaryIndex = Index<Key, Key, u64>;

/// A namespaced resource name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Resource {
    pub namespace: Key,
    pub name: Key,
}

impl Resource {
    pub fn new(namespace: impl AsRef<str>, name: impl AsRef<str>) -> Result<Self, InvalidKeyError> {
        Ok(Self {
            namespace: Key::new(namespace)?,
            name: Key::new(name)?,
        })
    }
}

/// Packs `(resource, relationship)` pairs into 64-bit keys.
#[derive(Debug)]
pub struct KeyEncoder<D, C> {
    dictionaries: D,
    clock: Clock<C>,
}

impl KeyEncoder<DictionaryIndex, CounterIndex> {
    /// An encoder over fresh in-memory stores.
    pub fn in_memory() -> Self {
        Self::new(DictionaryIndex::new(), Clock::new(CounterIndex::new()))
    }
}

impl<D, C> KeyEncoder<D, C>
where
    D: DocumentReader<Key, Key, u64> + DocumentWriter<Key, Key, u64>,
    C: DocumentReader<Key, (), u64> + DocumentWriter<Key, (), u64>,
{
    pub fn new(dictionaries: D, clock: Clock<C>) -> Self {
        Self { dictionaries, clock }
    }

    pub fn dictionaries(&self) -> &D {
        &self.dictionaries
    }

    pub fn clock(&self) -> &Clock<C> {
        &self.clock
    }

    /// The published ID of `value`, if any.
    pub fn lookup_id(&self, dictionary: Dictionary, value: &Key) -> Option<u64> {
        self.dictionaries
            .get(&dictionary.hash_key(), value)
            .map(|doc| *doc.payload())
    }

    /// The ID of `value`, minting and publishing one if it has none yet.
    ///
    /// Concurrent callers for the same value all return the same ID.
    pub fn get_or_create_id(
        &self,
        dictionary: Dictionary,
        value: &Key,
        cancel: &CancellationToken,
    ) -> EncodingResult<u64> {
        if let Some(id) = self.lookup_id(dictionary, value) {
            return Ok(id);
        }

        let hash_key = dictionary.hash_key();
        let minted = self.clock.tick(&hash_key, cancel)?;

        if let Err(err) = dictionary.check(minted) {
            log_event(
                Event::EncodingOverflow,
                &[
                    ("dictionary", dictionary.as_str()),
                    ("value", value.as_str()),
                    ("id", &minted.to_string()),
                ],
            );
            return Err(err);
        }

        match self
            .dictionaries
            .insert(Document::new(hash_key, value.clone(), minted), cancel)
        {
            Ok(doc) => {
                // Best effort: without it decode falls back to a scan.
                let _ = self.dictionaries.insert(
                    Document::new(dictionary.id_key(minted), value.clone(), minted),
                    cancel,
                );
                log_event(
                    Event::IdMinted,
                    &[
                        ("dictionary", dictionary.as_str()),
                        ("value", value.as_str()),
                        ("id", &minted.to_string()),
                    ],
                );
                Ok(*doc.payload())
            }
            Err(StoreError::DuplicateKey { .. }) => {
                let winner = self.lookup_id(dictionary, value).ok_or_else(|| {
                    StoreError::Storage(format!("{} entry for {} vanished", dictionary, value))
                })?;
                log_event(
                    Event::IdAbandoned,
                    &[
                        ("dictionary", dictionary.as_str()),
                        ("value", value.as_str()),
                        ("abandoned", &minted.to_string()),
                        ("id", &winner.to_string()),
                    ],
                );
                Ok(winner)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Dictionary IDs of `(resource, relationship)`, allocating as needed.
    pub fn encode(
        &self,
        resource: &Resource,
        relationship: &Key,
        cancel: &CancellationToken,
    ) -> EncodingResult<EncodedIds> {
        Ok(EncodedIds {
            namespace_id: self.get_or_create_id(
                Dictionary::Namespace,
                &resource.namespace,
                cancel,
            )?,
            relationship_id: self.get_or_create_id(
                Dictionary::Relationship,
                relationship,
                cancel,
            )?,
            resource_id: self.get_or_create_id(Dictionary::Resource, &resource.name, cancel)?,
        })
    }

    /// Packs `(resource, relationship)` into one `u64` key.
    ///
    /// Repeated calls for the same pair return the same key.
    pub fn pack(
        &self,
        resource: &Resource,
        relationship: &Key,
        cancel: &CancellationToken,
    ) -> EncodingResult<PackedKey> {
        PackedKey::pack(self.encode(resource, relationship, cancel)?)
    }

    /// Splits a packed key into its dictionary IDs.
    pub fn unpack(&self, packed: PackedKey) -> EncodedIds {
        packed.unpack()
    }

    /// The domain string mapped to `id`, if published.
    pub fn lookup_value(&self, dictionary: Dictionary, id: u64) -> Option<Key> {
        let reverse = self
            .dictionaries
            .find_range(&dictionary.id_key(id), &RangeQuery::Unbound);
        if let Some(doc) = reverse.first() {
            return Some(doc.range_key().clone());
        }

        self.dictionaries
            .find_where(&dictionary.hash_key(), |doc| *doc.payload() == id)
            .first()
            .map(|doc| doc.range_key().clone())
    }

    /// Highest ID published in `dictionary`, zero if none.
    pub fn max_id(&self, dictionary: Dictionary) -> u64 {
        self.dictionaries
            .find_range(&dictionary.hash_key(), &RangeQuery::Unbound)
            .iter()
            .map(|doc| *doc.payload())
            .max()
            .unwrap_or(0)
    }

    /// Raises every ID counter to at least the highest published ID.
    ///
    /// Dictionaries and counters can be persisted separately; a counter that
    /// fell behind its dictionary would otherwise mint an ID already in use.
    /// Returns the dictionaries whose counter moved.
    pub fn reconcile(&self, cancel: &CancellationToken) -> EncodingResult<Vec<Dictionary>> {
        let mut raised = Vec::new();
        for dictionary in Dictionary::ALL {
            let published = self.max_id(dictionary);
            let counter = self.clock.current(&dictionary.hash_key());
            if counter >= published {
                continue;
            }

            self.clock.advance_to(&dictionary.hash_key(), published, cancel)?;
            log_event(
                Event::CounterRaised,
                &[
                    ("dictionary", dictionary.as_str()),
                    ("from", &counter.to_string()),
                    ("to", &published.to_string()),
                ],
            );
            raised.push(dictionary);
        }
        Ok(raised)
    }

    /// Reverses `pack`. `None` if any of the three IDs is unknown.
    pub fn decode(&self, packed: PackedKey) -> Option<(Resource, Key)> {
        let ids = packed.unpack();
        let namespace = self.lookup_value(Dictionary::Namespace, ids.namespace_id)?;
        let relationship = self.lookup_value(Dictionary::Relationship, ids.relationship_id)?;
        let name = self.lookup_value(Dictionary::Resource, ids.resource_id)?;
        Some((Resource { namespace, name }, relationship))
    }
}
