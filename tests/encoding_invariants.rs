//! Key encoding invariants
//!
//! - Concurrent packs of one pair agree on one key
//! - Distinct names never share an ID
//! - A published mapping never changes
//! - Unpack inverts pack, and decode inverts both

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use rebac_store::clock::{Clock, CounterIndex};
use rebac_store::document::Document;
use rebac_store::encoding::{
    Dictionary, DictionaryIndex, EncodedIds, EncodingError, KeyEncoder, PackedKey, Resource,
};
use rebac_store::entity::Key;
use rebac_store::store::{CancellationToken, DocumentWriter};

const THREADS: usize = 8;

fn key(s: &str) -> Key {
    Key::new(s).unwrap()
}

// =============================================================================
// Concurrency
// =============================================================================

/// Every racer packing the same pair gets the same key.
#[test]
fn test_concurrent_pack_of_one_pair_agrees() {
    let encoder = KeyEncoder::in_memory();
    let cancel = CancellationToken::new();
    let resource = Resource::new("docs", "readme").unwrap();

    let keys: HashSet<PackedKey> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let encoder = &encoder;
                let cancel = &cancel;
                let resource = &resource;
                s.spawn(move || encoder.pack(resource, &key("viewer"), cancel).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(keys.len(), 1);
    let packed = *keys.iter().next().unwrap();
    assert_eq!(encoder.decode(packed), Some((resource, key("viewer"))));

    // Losers may have burned IDs, but only one mapping per name is published.
    for dictionary in Dictionary::ALL {
        let entries = encoder
            .dictionaries()
            .snapshot()
            .partition(&dictionary.hash_key())
            .count();
        assert_eq!(entries, 1);
    }
}

/// Distinct names packed concurrently all get distinct IDs.
#[test]
fn test_concurrent_distinct_names_get_distinct_ids() {
    let dictionaries = Arc::new(DictionaryIndex::new());
    let counters = Arc::new(CounterIndex::new());
    let encoder = KeyEncoder::new(Arc::clone(&dictionaries), Clock::new(Arc::clone(&counters)));
    let cancel = CancellationToken::new();

    let ids: Vec<EncodedIds> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let encoder = &encoder;
                let cancel = &cancel;
                s.spawn(move || {
                    (0..25)
                        .map(|i| {
                            let resource =
                                Resource::new("shared-ns", format!("res:{}:{}", t, i)).unwrap();
                            encoder
                                .encode(&resource, &key("member"), cancel)
                                .unwrap()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    let resource_ids: HashSet<u64> = ids.iter().map(|ids| ids.resource_id).collect();
    assert_eq!(resource_ids.len(), THREADS * 25);

    let namespace_ids: HashSet<u64> = ids.iter().map(|ids| ids.namespace_id).collect();
    assert_eq!(namespace_ids.len(), 1);

    // No collisions on resource names, so no resource ID was abandoned.
    let max = resource_ids.iter().copied().max().unwrap();
    assert_eq!(max, (THREADS * 25) as u64);
    assert_eq!(
        dictionaries
            .snapshot()
            .partition(&Dictionary::Resource.hash_key())
            .count(),
        THREADS * 25
    );
}

// =============================================================================
// Stability
// =============================================================================

#[test]
fn test_published_mapping_is_stable() {
    let encoder = KeyEncoder::in_memory();
    let cancel = CancellationToken::new();
    let resource = Resource::new("ns", "r").unwrap();

    let first = encoder.pack(&resource, &key("rel"), &cancel).unwrap();
    for i in 0..20 {
        let other = Resource::new("ns", format!("other:{}", i)).unwrap();
        encoder.pack(&other, &key("rel"), &cancel).unwrap();
    }
    assert_eq!(encoder.pack(&resource, &key("rel"), &cancel).unwrap(), first);
    assert_eq!(
        encoder.lookup_id(Dictionary::Resource, &key("r")),
        Some(first.unpack().resource_id)
    );
}

#[test]
fn test_lookup_does_not_allocate() {
    let encoder = KeyEncoder::in_memory();
    assert_eq!(encoder.lookup_id(Dictionary::Namespace, &key("ns")), None);
    assert_eq!(encoder.clock().current(&Dictionary::Namespace.hash_key()), 0);
    assert!(encoder.dictionaries().snapshot().is_empty());
}

// =============================================================================
// Packing
// =============================================================================

#[test]
fn test_pack_unpack_decode_agree() {
    let encoder = KeyEncoder::in_memory();
    let cancel = CancellationToken::new();

    let pairs = [
        ("docs", "readme", "viewer"),
        ("docs", "readme", "editor"),
        ("folders", "root", "viewer"),
        ("Groups", "Admins", "Member"),
    ];

    for (namespace, name, relationship) in pairs {
        let resource = Resource::new(namespace, name).unwrap();
        let relationship = key(relationship);

        let ids = encoder.encode(&resource, &relationship, &cancel).unwrap();
        let packed = encoder.pack(&resource, &relationship, &cancel).unwrap();
        assert_eq!(encoder.unpack(packed), ids);
        assert_eq!(PackedKey::pack(ids).unwrap(), packed);
        assert_eq!(encoder.decode(packed), Some((resource, relationship)));
    }
}

#[test]
fn test_overflowing_namespace_id_is_refused() {
    let encoder = KeyEncoder::in_memory();
    let cancel = CancellationToken::new();

    let counter = encoder
        .clock()
        .counter_key(&Dictionary::Namespace.hash_key());
    encoder
        .clock()
        .store()
        .insert(Document::point(counter, Dictionary::Namespace.max_id()), &cancel)
        .unwrap();

    let err = encoder
        .pack(&Resource::new("one-too-many", "r").unwrap(), &key("rel"), &cancel)
        .unwrap_err();
    match err {
        EncodingError::Overflow {
            dictionary, id, max,
        } => {
            assert_eq!(dictionary, Dictionary::Namespace);
            assert_eq!(id, 65536);
            assert_eq!(max, 65535);
        }
        other => panic!("expected overflow, got {:?}", other),
    }
    assert_eq!(encoder.lookup_id(Dictionary::Namespace, &key("one-too-many")), None);
}
