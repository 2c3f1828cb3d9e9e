//! Deferred stage (spec §4.5): hands a `Defer` handle to user code, which
//! resolves the stage asynchronously from any later context.

use std::sync::Arc;

use crate::core::Forward;
use crate::defer::Defer;
use crate::error::UserError;
use crate::node::{ErrorHandler, Node, StageBody};
use crate::scheduler::Scheduler;

/// Builds a `Node` whose body constructs a `Defer<Ret>` over its own
/// forward and hands it, along with the upstream value, to `f`. `f` itself
/// must not resolve the stage directly — it arranges for `Defer::set_result`
/// or `Defer::set_error` to be called later; any value it returns other
/// than `Ok(())` is treated as an immediate stage failure.
pub fn new<Arg, Ret, F>(
    f: F,
    on_error: Option<ErrorHandler<Ret>>,
    scheduler: Arc<dyn Scheduler>,
) -> Arc<Node<Arg, Ret>>
where
    Arg: Send + 'static,
    Ret: Send + 'static,
    F: FnOnce(Defer<Ret>, Arg) -> Result<(), UserError> + Send + 'static,
{
    let body: StageBody<Arg, Ret> = Box::new(move |arg, forward: &Arc<Forward<Ret>>| {
        let defer = Defer::new(forward.clone());
        f(defer, arg)
    });
    Node::new(body, on_error, scheduler)
}
