//! Clock linearizability
//!
//! For N concurrent ticks on one counter the returned values are exactly
//! `prev+1 ..= prev+N`, each handed to exactly one caller.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use rebac_store::clock::{Clock, CounterIndex};
use rebac_store::config::BackoffConfig;
use rebac_store::entity::Key;
use rebac_store::store::{CancellationToken, DocumentReader, DocumentWriter};

const THREADS: u64 = 8;
const PER_THREAD: u64 = 100;

fn key(s: &str) -> Key {
    Key::new(s).unwrap()
}

fn tick_concurrently<S>(clock: &Clock<S>, name: &Key) -> Vec<u64>
where
    S: DocumentReader<Key, (), u64> + DocumentWriter<Key, (), u64> + Sync,
{
    let cancel = CancellationToken::new();
    thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let cancel = &cancel;
                s.spawn(move || {
                    (0..PER_THREAD)
                        .map(|_| clock.tick(name, cancel).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    })
}

fn assert_exact_range(values: Vec<u64>, from: u64, to: u64) {
    let count = values.len();
    let unique: BTreeSet<u64> = values.into_iter().collect();
    assert_eq!(unique.len(), count, "a value was handed out twice");
    assert_eq!(unique, (from..=to).collect::<BTreeSet<_>>());
}

#[test]
fn test_concurrent_ticks_from_zero() {
    let clock = Clock::new(CounterIndex::new());
    let values = tick_concurrently(&clock, &key("ids"));

    assert_exact_range(values, 1, THREADS * PER_THREAD);
    assert_eq!(clock.current(&key("ids")), THREADS * PER_THREAD);
}

#[test]
fn test_concurrent_ticks_continue_from_previous() {
    let clock = Clock::new(CounterIndex::new());
    let cancel = CancellationToken::new();
    for _ in 0..5 {
        clock.tick(&key("ids"), &cancel).unwrap();
    }

    let values = tick_concurrently(&clock, &key("ids"));
    assert_exact_range(values, 6, 5 + THREADS * PER_THREAD);
}

#[test]
fn test_concurrent_ticks_with_backoff_over_shared_store() {
    let store = Arc::new(CounterIndex::new().with_backoff(BackoffConfig::enabled()));
    let clock = Clock::new(Arc::clone(&store));

    let values = tick_concurrently(&clock, &key("shared"));
    assert_exact_range(values, 1, THREADS * PER_THREAD);

    // Every value is one committed write to the counter document.
    assert_eq!(
        store.metrics().snapshot().commits,
        THREADS * PER_THREAD
    );
}

#[test]
fn test_counters_do_not_interfere() {
    let clock = Clock::new(CounterIndex::new());
    let cancel = CancellationToken::new();

    thread::scope(|s| {
        for name in ["alpha", "beta", "gamma"] {
            let clock = &clock;
            let cancel = &cancel;
            s.spawn(move || {
                for _ in 0..PER_THREAD {
                    clock.tick(&key(name), cancel).unwrap();
                }
            });
        }
    });

    for name in ["alpha", "beta", "gamma"] {
        assert_eq!(clock.current(&key(name)), PER_THREAD);
    }
}

#[test]
fn test_cancellation_interrupts_ticking() {
    let clock = Clock::new(CounterIndex::new());
    let cancel = CancellationToken::new();
    let seq = clock.sequence(key("jobs"));

    assert_eq!(seq.next(&cancel).unwrap(), 1);
    cancel.cancel();
    let err = seq.next(&cancel).unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(seq.current(), 1);
}
