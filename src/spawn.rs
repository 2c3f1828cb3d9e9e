//! `Spawn` — the root-node factory (spec §4.9, §6).
//!
//! `Spawn` constructs a root node of the stage kind implied by the task
//! closure's signature and submits its `start` to the scheduler. Rust has
//! no signature-based overload resolution, so the three task shapes
//! (`FnOnce() -> T`, `FnOnce(Defer<T>) -> ()`, `FnOnce() -> Promise<T>`)
//! are exposed as three differently-named functions rather than one
//! overloaded `Spawn`.

use std::sync::Arc;

use crate::error::UserError;
use crate::node::{plain, ErrorHandler, Node};
use crate::promise::Promise;
use crate::scheduler::Scheduler;
use crate::unit::Unit;

/// Spawns a plain root task: `task` runs once, synchronously, producing
/// `T` or a `UserError`.
pub fn spawn<T, F>(
    task: F,
    on_error: Option<ErrorHandler<T>>,
    scheduler: Arc<dyn Scheduler>,
) -> Promise<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, UserError> + Send + 'static,
{
    let node: Arc<Node<Unit, T>> = plain::new(move |_: Unit| task(), on_error, scheduler.clone());
    scheduler.submit(Box::new({
        let node = node.clone();
        move || node.start()
    }));
    Promise::from_node(node)
}

/// Spawns a deferred root task: `task` receives a `Defer<T>` handle and
/// arranges for it to be resolved later, from any context.
#[cfg(feature = "deferred")]
pub fn spawn_deferred<T, F>(
    task: F,
    on_error: Option<ErrorHandler<T>>,
    scheduler: Arc<dyn Scheduler>,
) -> Promise<T>
where
    T: Send + 'static,
    F: FnOnce(crate::defer::Defer<T>) -> Result<(), UserError> + Send + 'static,
{
    let node: Arc<Node<Unit, T>> = crate::node::deferred::new(
        move |defer, _: Unit| task(defer),
        on_error,
        scheduler.clone(),
    );
    scheduler.submit(Box::new({
        let node = node.clone();
        move || node.start()
    }));
    Promise::from_node(node)
}

/// Spawns a nested root task: `task` returns another `Promise<T>` whose
/// outcome is spliced into the root's own forward.
#[cfg(feature = "nested")]
pub fn spawn_nested<T, F>(
    task: F,
    on_error: Option<ErrorHandler<T>>,
    scheduler: Arc<dyn Scheduler>,
) -> Promise<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<Promise<T>, UserError> + Send + 'static,
{
    let node: Arc<Node<Unit, T>> =
        crate::node::nested::new(move |_: Unit| task(), on_error, scheduler.clone());
    scheduler.submit(Box::new({
        let node = node.clone();
        move || node.start()
    }));
    Promise::from_node(node)
}
