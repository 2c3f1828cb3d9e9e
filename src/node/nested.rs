//! Nested stage (spec §4.6): user function returns another promise; its
//! eventual outcome is spliced directly into this node's forward.

use std::sync::Arc;

use crate::core::Forward;
use crate::error::UserError;
use crate::node::{ErrorHandler, Node, StageBody};
use crate::promise::Promise;
use crate::scheduler::Scheduler;

/// Builds a `Node` whose body runs `f`, then splices the returned
/// promise's outcome into this node's forward (spec §4.6 "splice").
pub fn new<Arg, Ret, F>(
    f: F,
    on_error: Option<ErrorHandler<Ret>>,
    scheduler: Arc<dyn Scheduler>,
) -> Arc<Node<Arg, Ret>>
where
    Arg: Send + 'static,
    Ret: Send + 'static,
    F: FnOnce(Arg) -> Result<Promise<Ret>, UserError> + Send + 'static,
{
    let body: StageBody<Arg, Ret> = Box::new(move |arg, forward: &Arc<Forward<Ret>>| {
        let inner = f(arg)?;
        if !inner.is_valid() {
            return Err(UserError::new(crate::error::PromiseError::InvalidPromise));
        }
        inner.splice_into(forward.clone());
        Ok(())
    });
    Node::new(body, on_error, scheduler)
}
