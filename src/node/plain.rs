//! Plain stage (spec §4.4): maps an upstream value through a pure function.

use std::sync::Arc;

use crate::core::Forward;
use crate::error::UserError;
use crate::node::{ErrorHandler, Node, StageBody};
use crate::scheduler::Scheduler;

/// Builds a `Node` whose body runs `f` against the upstream value and
/// fulfills its own forward with the result.
pub fn new<Arg, Ret, F>(
    f: F,
    on_error: Option<ErrorHandler<Ret>>,
    scheduler: Arc<dyn Scheduler>,
) -> Arc<Node<Arg, Ret>>
where
    Arg: Send + 'static,
    Ret: Send + 'static,
    F: FnOnce(Arg) -> Result<Ret, UserError> + Send + 'static,
{
    let body: StageBody<Arg, Ret> = Box::new(move |arg, forward: &Arc<Forward<Ret>>| {
        let value = f(arg)?;
        forward
            .fulfill(value)
            .map_err(|e| UserError::new(e))
    });
    Node::new(body, on_error, scheduler)
}
