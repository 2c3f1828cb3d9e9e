//! `RecursionNode` (spec §4.7): emits a lazy sequence of values through a
//! multi-value forward plus one terminal completion signal.
//!
//! Shaped differently enough from `Node<Arg, Ret>` — it owns two forwards
//! and is driven by an iterator rather than a single upstream `Arg` — that
//! it is its own struct rather than another `Node` stage-kind factory.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use crate::core::{Forward, MultiForward};
use crate::error::UserError;
use crate::unit::Unit;

/// A one-shot entry latch identical in spirit to `node::OnceRun`, kept
/// private to this module to avoid exposing an internal type.
#[derive(Default)]
struct OnceRun(AtomicBool);

impl OnceRun {
    fn enter(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }
}

pub struct RecursionNode<T> {
    pub(crate) id: Uuid,
    pub(crate) values: Arc<MultiForward<T>>,
    pub(crate) terminal: Arc<Forward<Unit>>,
    entered: OnceRun,
    iter: parking_lot::Mutex<Option<Box<dyn Iterator<Item = Result<T, UserError>> + Send>>>,
}

impl<T> RecursionNode<T>
where
    T: Send + 'static,
{
    pub fn new<I>(iter: I) -> Arc<Self>
    where
        I: Iterator<Item = Result<T, UserError>> + Send + 'static,
    {
        Arc::new(Self {
            id: Uuid::new_v4(),
            values: Arc::new(MultiForward::new()),
            terminal: Arc::new(Forward::new()),
            entered: OnceRun::default(),
            iter: parking_lot::Mutex::new(Some(Box::new(iter))),
        })
    }

    pub fn values(&self) -> &Arc<MultiForward<T>> {
        &self.values
    }

    pub fn terminal(&self) -> &Arc<Forward<Unit>> {
        &self.terminal
    }

    /// Drives the iterator to completion, fulfilling `values` once per
    /// item and `terminal` exactly once at the end (or on the first
    /// failing step). Entered at most once.
    pub fn start(self: &Arc<Self>) {
        if !self.entered.enter() {
            return;
        }
        tracing::debug!(node = %self.id, "running recursion node");

        let mut iter = self.iter.lock().take().expect("entered exactly once");
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let mut count = 0usize;
            for item in iter.by_ref() {
                match item {
                    Ok(value) => {
                        let _ = self.values.fulfill(value);
                        count += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok(count)
        }));

        match outcome {
            Ok(Ok(count)) => {
                tracing::debug!(node = %self.id, count, "recursion complete");
                let _ = self.terminal.fulfill(Unit);
            }
            Ok(Err(e)) => {
                let _ = self.terminal.reject(e);
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "recursion body panicked".to_string());
                let _ = self.terminal.reject(UserError::msg(message));
            }
        }
    }
}
