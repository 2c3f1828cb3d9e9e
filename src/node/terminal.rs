//! Terminal nodes (spec §4.9): `Resolved`/`Rejected` produce a node whose
//! forward is pre-filled before any chaining occurs, so attaching a
//! downstream is immediate.

use std::sync::Arc;

use crate::error::UserError;
use crate::node::Node;
use crate::scheduler::Scheduler;

/// Builds a node whose forward is already fulfilled with `value`.
pub fn resolved<Ret>(value: Ret, scheduler: Arc<dyn Scheduler>) -> Arc<Node<(), Ret>>
where
    Ret: Send + 'static,
{
    let node = Node::new(Box::new(|_, _| Ok(())), None, scheduler);
    node.forward.fulfill(value).expect("fresh forward");
    node
}

/// Builds a node whose forward is already rejected with `error`.
pub fn rejected<Ret>(error: UserError, scheduler: Arc<dyn Scheduler>) -> Arc<Node<(), Ret>>
where
    Ret: Send + 'static,
{
    let node = Node::new(Box::new(|_, _| Ok(())), None, scheduler);
    node.forward.reject(error).expect("fresh forward");
    node
}
