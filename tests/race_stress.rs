//! Race properties (spec.md §8): producer vs. chainer competing for the same
//! `Forward` from different threads with no external synchronization, run
//! at N >= 10^4 to give the `AtomicBool` hand-off protocol (spec §4.2) a
//! real chance to exercise both interleavings.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use pact::core::{Forward, MultiForward};

const ITERATIONS: usize = 10_000;

#[test]
fn producer_and_chainer_race_delivers_exactly_once() {
    for i in 0..ITERATIONS {
        let forward: Arc<Forward<usize>> = Arc::new(Forward::new());
        let delivered = Arc::new(AtomicUsize::new(0));

        let producer = {
            let forward = forward.clone();
            thread::spawn(move || {
                let _ = forward.fulfill(i);
            })
        };
        let chainer = {
            let forward = forward.clone();
            let delivered = delivered.clone();
            thread::spawn(move || {
                let _ = forward.do_chaining(Box::new(move |cell| {
                    delivered.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(cell.into_result().unwrap(), i);
                }));
            })
        };

        producer.join().unwrap();
        chainer.join().unwrap();
        assert_eq!(
            delivered.load(Ordering::SeqCst),
            1,
            "value {i} delivered the wrong number of times"
        );
    }
}

#[test]
fn multi_forward_many_producers_each_value_delivered_exactly_once() {
    for round in 0..(ITERATIONS / 10) {
        let forward: Arc<MultiForward<usize>> = Arc::new(MultiForward::new());
        let delivered = Arc::new(AtomicUsize::new(0));

        let producers: Vec<_> = (0..8)
            .map(|i| {
                let forward = forward.clone();
                thread::spawn(move || {
                    let _ = forward.fulfill(round * 8 + i);
                })
            })
            .collect();
        let chainer = {
            let forward = forward.clone();
            let delivered = delivered.clone();
            thread::spawn(move || {
                let _ = forward.do_chaining(Box::new(move |_cell| {
                    delivered.fetch_add(1, Ordering::SeqCst);
                }));
            })
        };

        for p in producers {
            p.join().unwrap();
        }
        chainer.join().unwrap();
        assert_eq!(delivered.load(Ordering::SeqCst), 8);
    }
}

#[test]
fn abandoning_a_never_chained_forward_drops_its_staged_cell() {
    struct DropCounter(Arc<AtomicUsize>);
    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let drops = Arc::new(AtomicUsize::new(0));
    let forward: Forward<DropCounter> = Forward::new();
    forward.fulfill(DropCounter(drops.clone())).unwrap();
    drop(forward);

    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn abandoning_a_chained_but_never_resolved_forward_does_not_panic() {
    let forward: Forward<usize> = Forward::new();
    forward.do_chaining(Box::new(|_| {})).unwrap();
    drop(forward); // must not panic
}
