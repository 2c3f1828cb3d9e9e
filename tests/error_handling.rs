//! Error-handling path (spec.md §4.8, §7) and the decided Open Questions
//! recorded in DESIGN.md.

use std::sync::{Arc, Mutex};

use pact::error::{PromiseError, UserError};
use pact::node::ErrorHandler;
use pact::promise::Promise;
#[cfg(feature = "implicit-resolve")]
use pact::promise::implicit_resolve;
use pact::scheduler::{InlineScheduler, Scheduler};
use pact::spawn::spawn;

#[cfg(feature = "implicit-resolve")]
#[test]
fn implicit_resolve_adapts_void_rejection_handler() {
    let scheduler: Arc<dyn Scheduler> = Arc::new(InlineScheduler);
    let captured: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let captured2 = captured.clone();

    let handler: ErrorHandler<i32> = implicit_resolve(
        move |e: UserError| {
            *captured2.lock().unwrap() = Some(e.to_string());
        },
        scheduler.clone(),
    );

    let downstream: Promise<i32> =
        Promise::<i32>::rejected(anyhow::anyhow!("nope"), scheduler.clone())
            .then(|x| Ok(x), Some(handler), scheduler);

    assert_eq!(captured.lock().unwrap().as_deref(), Some("nope"));
    assert!(downstream.is_fulfilled().unwrap());
}

#[test]
fn null_error_handler_forwards_rejection_unchanged() {
    let scheduler: Arc<dyn Scheduler> = Arc::new(InlineScheduler);
    let downstream: Promise<i32> =
        Promise::<i32>::rejected(anyhow::anyhow!("boom"), scheduler.clone())
            .then(|x| Ok(x), None, scheduler);

    assert!(downstream.is_rejected().unwrap());
    assert!(!downstream.is_fulfilled().unwrap());
}

#[test]
fn error_handler_returning_invalid_promise_propagates_original_error() {
    let scheduler: Arc<dyn Scheduler> = Arc::new(InlineScheduler);
    let handler: ErrorHandler<i32> = Box::new(|_e| Promise::invalid());

    let downstream: Promise<i32> =
        Promise::<i32>::rejected(anyhow::anyhow!("original"), scheduler.clone())
            .then(|x| Ok(x), Some(handler), scheduler);

    assert!(downstream.is_rejected().unwrap());
}

#[test]
fn a_second_chain_attempt_on_the_same_promise_is_invalid() {
    let scheduler: Arc<dyn Scheduler> = Arc::new(InlineScheduler);
    let root = spawn(|| Ok(1), None, scheduler.clone());

    let first = root.then(|x: i32| Ok(x), None, scheduler.clone());
    assert!(first.is_valid());

    let second = root.then(|x: i32| Ok(x), None, scheduler);
    assert!(!second.is_valid());
}

#[test]
fn observing_predicates_on_an_invalid_promise_is_a_contract_error() {
    let invalid: Promise<i32> = Promise::invalid();
    assert!(!invalid.is_valid());
    assert!(matches!(
        invalid.is_fulfilled(),
        Err(PromiseError::InvalidPromise)
    ));
    assert!(matches!(
        invalid.is_rejected(),
        Err(PromiseError::InvalidPromise)
    ));
}
