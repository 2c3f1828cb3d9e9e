//! spec.md §8 scenario 6: recursion over a fixed sequence, and the
//! iterator-throws-on-first-step edge case.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pact::error::UserError;
use pact::promise::iterate;
use pact::scheduler::{InlineScheduler, Scheduler};
use pact::unit::Unit;

#[test]
fn recursion_over_fixed_sequence_delivers_all_values_once_terminal() {
    let scheduler: Arc<dyn Scheduler> = Arc::new(InlineScheduler);
    let values: Vec<Result<i32, UserError>> = vec![Ok(10), Ok(20), Ok(30)];

    let recursion = iterate(values.into_iter(), scheduler.clone());

    let seen: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(Vec::new()));
    let seen2 = seen.clone();
    recursion
        .then(
            move |v: i32| seen2.lock().unwrap().push(v),
            None::<fn(UserError)>,
            scheduler.clone(),
        )
        .unwrap();

    let terminal_calls = Arc::new(AtomicUsize::new(0));
    let terminal_calls2 = terminal_calls.clone();
    let (tx, rx) = mpsc::channel();
    recursion.finally(
        move |u: Unit| {
            terminal_calls2.fetch_add(1, Ordering::SeqCst);
            tx.send(()).unwrap();
            Ok(u)
        },
        None,
        scheduler,
    );

    rx.recv_timeout(Duration::from_secs(5))
        .expect("terminal signal never arrived");

    let mut collected = seen.lock().unwrap().clone();
    collected.sort_unstable();
    assert_eq!(collected, vec![10, 20, 30]);
    assert_eq!(terminal_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn recursion_iterator_failure_on_first_step_rejects_terminal_without_values() {
    let scheduler: Arc<dyn Scheduler> = Arc::new(InlineScheduler);
    let values: Vec<Result<i32, UserError>> = vec![Err(anyhow::anyhow!("boom"))];

    let recursion = iterate(values.into_iter(), scheduler.clone());

    let per_value_calls = Arc::new(AtomicUsize::new(0));
    let per_value_calls2 = per_value_calls.clone();
    recursion
        .then(
            move |_: i32| {
                per_value_calls2.fetch_add(1, Ordering::SeqCst);
            },
            None::<fn(UserError)>,
            scheduler.clone(),
        )
        .unwrap();

    let captured: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let captured2 = captured.clone();
    let (tx, rx) = mpsc::channel();
    recursion.finally(
        |u| Ok(u),
        Some(Box::new(move |e| {
            *captured2.lock().unwrap() = Some(e.to_string());
            tx.send(()).unwrap();
            pact::promise::Promise::invalid()
        })),
        scheduler,
    );

    rx.recv_timeout(Duration::from_secs(5))
        .expect("terminal rejection never arrived");

    assert_eq!(per_value_calls.load(Ordering::SeqCst), 0);
    assert_eq!(captured.lock().unwrap().as_deref(), Some("boom"));
}
