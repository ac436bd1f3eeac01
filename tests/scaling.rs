//! Concurrency tests: many threads sharing one store.
//!
//! Covers:
//! - Serialized writes never exceeding capacity
//! - Readers and writers interleaving on the same keys
//! - Alert order per writer thread

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Instant;
use typed_store::{
    Alert, AlertChannel, AlertObserver, AlertRules, Color, Store, StoreError, ValueKind,
};

const THREADS: usize = 8;
const OPS_PER_THREAD: usize = 2_000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
}

#[test]
fn test_concurrent_inserts_respect_capacity() {
    init_tracing();
    let capacity = 50;
    let store = Arc::new(Store::new(AlertChannel::detached()));
    store.initialize(capacity).unwrap();
    let barrier = Arc::new(Barrier::new(THREADS));

    let start = Instant::now();
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut accepted = Vec::new();
                for i in 0..OPS_PER_THREAD {
                    let key = format!("t{}-{}", t, i % 20);
                    match store.set_integer(&key, i as i32) {
                        Ok(()) => accepted.push(key),
                        Err(StoreError::StoreFull { .. }) => {}
                        Err(other) => panic!("unexpected error: {other}"),
                    }
                }
                accepted
            })
        })
        .collect();

    let mut accepted = HashSet::new();
    for handle in handles {
        accepted.extend(handle.join().unwrap());
    }
    println!(
        "  {} writes took {:.2}ms",
        THREADS * OPS_PER_THREAD,
        start.elapsed().as_secs_f64() * 1000.0
    );

    assert_eq!(store.len().unwrap(), capacity);
    assert_eq!(accepted.len(), capacity);
    for key in &accepted {
        assert!(store.contains_key(key).unwrap());
    }
}

#[test]
fn test_readers_never_see_torn_values() {
    let store = Arc::new(Store::new(AlertChannel::detached()));
    store.initialize(4).unwrap();
    store.set_integer_array("xs", vec![0; 16]).unwrap();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..OPS_PER_THREAD {
                    if t % 2 == 0 {
                        let n = (t * OPS_PER_THREAD + i) as i32;
                        store.set_integer_array("xs", vec![n; 16]).unwrap();
                    } else {
                        let xs = store.get_integer_array("xs").unwrap();
                        assert_eq!(xs.len(), 16);
                        assert!(xs.iter().all(|x| *x == xs[0]), "torn read: {xs:?}");
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_kind_flips_under_contention() {
    let store = Arc::new(Store::new(AlertChannel::detached()));
    store.initialize(1).unwrap();
    store.set_integer("k", 0).unwrap();

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                if i % 2 == 0 {
                    store.set_string("k", "text").unwrap();
                } else {
                    store.set_color("k", Color::WHITE).unwrap();
                }
            }
        })
    };

    for _ in 0..OPS_PER_THREAD {
        // Whatever kind is current, the matching getter succeeds.
        match store.kind_of("k").unwrap() {
            Some(kind) => match store.get("k", kind) {
                Ok(value) => assert_eq!(value.kind(), kind),
                Err(StoreError::InvalidType { found, .. }) => assert_ne!(found, kind),
                Err(other) => panic!("unexpected error: {other}"),
            },
            None => panic!("key vanished"),
        }
    }
    writer.join().unwrap();
    assert!(matches!(
        store.kind_of("k").unwrap(),
        Some(ValueKind::Text) | Some(ValueKind::Color)
    ));
}

#[derive(Default)]
struct Recorder {
    seen: RefCell<Vec<Alert>>,
}

impl AlertObserver for Recorder {
    fn on_alert_integer(&self, value: i32) {
        self.seen.borrow_mut().push(Alert::Integer(value));
    }

    fn on_alert_text(&self, value: &str) {
        self.seen.borrow_mut().push(Alert::Text(value.to_string()));
    }

    fn on_alert_color(&self, value: Color) {
        self.seen.borrow_mut().push(Alert::Color(value));
    }
}

#[test]
fn test_alert_order_per_writer() {
    let observer = Rc::new(Recorder::default());
    let (store, mut home) = Store::with_observer(&observer);
    let policy = AlertRules::new().allowed_integers(-1..=-1);
    let store = Arc::new(store.with_policy(Arc::new(policy)));
    store.initialize(THREADS).unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..500 {
                    // Encode writer and sequence into the alerted value.
                    store.set_integer(&format!("w{t}"), (t * 1000 + i) as i32).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(home.dispatch_pending(), THREADS * 500);
    let seen = observer.seen.borrow();
    for t in 0..THREADS as i32 {
        let from_writer: Vec<i32> = seen
            .iter()
            .filter_map(|alert| match alert {
                Alert::Integer(v) if v / 1000 == t => Some(*v),
                _ => None,
            })
            .collect();
        let expected: Vec<i32> = (0..500).map(|i| t * 1000 + i).collect();
        assert_eq!(from_writer, expected);
    }
}
