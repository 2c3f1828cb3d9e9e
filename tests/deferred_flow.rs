//! spec.md §8 scenario 4: a deferred stage resolved from another thread.
#![cfg(feature = "deferred")]

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use pact::defer::Defer;
use pact::node::ErrorHandler;
use pact::promise::Promise;
use pact::scheduler::{Scheduler, ThreadPerTaskScheduler};
use pact::spawn::spawn_deferred;

#[test]
fn deferred_stage_resolves_from_another_thread() {
    let scheduler: Arc<dyn Scheduler> = Arc::new(ThreadPerTaskScheduler);

    let outer = spawn_deferred(
        |defer: Defer<i32>| {
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(50));
                defer.set_result(7).unwrap();
            });
            Ok(())
        },
        None,
        scheduler.clone(),
    );

    // The outer handle is valid immediately, well before its Forward ever
    // resolves (spec scenario 4: "the outer promise is isValid throughout").
    assert!(outer.is_valid());
    assert!(!outer.is_fulfilled().unwrap());

    let fallback: ErrorHandler<i32> = Box::new({
        let scheduler = scheduler.clone();
        move |_| Promise::resolved(0, scheduler.clone())
    });
    let (tx, rx) = mpsc::channel();
    outer
        .then(|x: i32| Ok(x + 1), Some(fallback), scheduler.clone())
        .then(
            move |v| {
                tx.send(v).unwrap();
                Ok(v)
            },
            None,
            scheduler,
        );

    let value = rx.recv_timeout(Duration::from_secs(5)).expect("deferred chain never completed");
    assert_eq!(value, 8);
    assert!(outer.is_valid());
    assert!(outer.is_fulfilled().unwrap());
}

#[test]
fn duplicate_defer_resolution_is_rejected() {
    use pact::error::PromiseError;
    use pact::scheduler::InlineScheduler;

    let scheduler: Arc<dyn Scheduler> = Arc::new(InlineScheduler);
    let captured: Arc<std::sync::Mutex<Option<Defer<i32>>>> = Arc::new(std::sync::Mutex::new(None));
    let captured2 = captured.clone();

    let _ = spawn_deferred(
        move |defer: Defer<i32>| {
            defer.set_result(1).unwrap();
            *captured2.lock().unwrap() = Some(defer);
            Ok(())
        },
        None,
        scheduler,
    );

    let defer = captured.lock().unwrap().take().unwrap();
    assert!(matches!(
        defer.set_result(2),
        Err(PromiseError::DuplicateAssignment)
    ));
}
