//! `Node<Arg, Ret>` — one link in a promise chain (spec §4.3).
//!
//! A `Node` owns a `Forward<Ret>`, an optional error handler, and a
//! scheduler handle. Four factory functions (`plain`, `deferred`, `nested`,
//! plus the `terminal` constructor used by `Resolved`/`Rejected`) build the
//! boxed closure that gives the node its behavior; `Node` itself does not
//! know which "kind" it is, matching REDESIGN FLAGS §9's instruction to
//! collapse the parallel stage hierarchies into one struct parameterized by
//! a single `run_with`-shaped operation.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use crate::core::{Forward, ValueCell};
use crate::error::UserError;
use crate::promise::Promise;
use crate::scheduler::Scheduler;

pub mod plain;

#[cfg(feature = "deferred")]
pub mod deferred;
#[cfg(feature = "nested")]
pub mod nested;

pub mod recursion;
pub mod terminal;

/// `error → Promise<Ret>` rejection handler, spliced into the node's
/// `Forward` exactly like a nested stage's inner promise (spec §4.8).
pub type ErrorHandler<Ret> = Box<dyn Fn(UserError) -> Promise<Ret> + Send + Sync>;

/// The boxed per-kind body. Built by the `plain`/`deferred`/`nested`
/// factories; on success it has already delivered (or arranged to later
/// deliver) `forward`'s outcome itself. An `Err` means the body failed
/// before any delivery happened and the node must route it through
/// `on_error`.
pub(crate) type StageBody<Arg, Ret> =
    Box<dyn FnOnce(Arg, &Arc<Forward<Ret>>) -> Result<(), UserError> + Send>;

/// A one-shot entry latch: `run_with`/`start` enters at most once, matching
/// spec §4.3 step 1 ("second entry is a no-op").
#[derive(Default)]
struct OnceRun(AtomicBool);

impl OnceRun {
    /// Returns `true` the first time it's called, `false` every time after.
    fn enter(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }
}

/// One stage in a promise chain.
pub struct Node<Arg, Ret> {
    pub(crate) id: Uuid,
    pub(crate) forward: Arc<Forward<Ret>>,
    on_error: Option<ErrorHandler<Ret>>,
    scheduler: Arc<dyn Scheduler>,
    entered: OnceRun,
    body: parking_lot::Mutex<Option<StageBody<Arg, Ret>>>,
}

impl<Arg, Ret> Node<Arg, Ret>
where
    Arg: Send + 'static,
    Ret: Send + 'static,
{
    pub(crate) fn new(
        body: StageBody<Arg, Ret>,
        on_error: Option<ErrorHandler<Ret>>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            forward: Arc::new(Forward::new()),
            on_error,
            scheduler,
            entered: OnceRun::default(),
            body: parking_lot::Mutex::new(Some(body)),
        })
    }

    pub fn forward(&self) -> &Arc<Forward<Ret>> {
        &self.forward
    }

    pub fn is_fulfilled(&self) -> bool {
        self.forward.is_fulfilled()
    }

    pub fn is_rejected(&self) -> bool {
        self.forward.is_rejected()
    }

    /// Root-stage entry point: runs with no upstream value. Only ever
    /// called on a `Node<Unit, Ret>` built by `Spawn`.
    pub fn start(self: &Arc<Self>)
    where
        Arg: Default,
    {
        self.run_with(ValueCell::new_resolved(Arg::default()));
    }

    /// Runs this node against the delivered upstream cell. Entered at most
    /// once; subsequent calls are no-ops (spec §4.3 step 1).
    pub fn run_with(self: &Arc<Self>, upstream: ValueCell<Arg>) {
        if !self.entered.enter() {
            return;
        }
        tracing::debug!(node = %self.id, "running node");

        let body = self.body.lock().take().expect("entered exactly once");
        let arg = upstream.into_result();

        let outcome = match arg {
            Err(e) => Err(e),
            Ok(value) => {
                let forward = self.forward.clone();
                catch_unwind(AssertUnwindSafe(|| body(value, &forward))).unwrap_or_else(|panic| {
                    Err(UserError::msg(panic_message(panic)))
                })
            }
        };

        if let Err(error) = outcome {
            self.route_error(error);
        }
    }

    /// Error-handler routing (spec §4.8). On entry, `error` is the
    /// rejection that would otherwise land on this node's `forward`;
    /// `on_error`, if present, gets first refusal to replace it with a
    /// promise of its own (a panicking or invalid-promise-returning handler
    /// falls back to propagating the original error unchanged, per the
    /// decided Open Question in SPEC_FULL.md §9).
    fn route_error(self: &Arc<Self>, error: UserError) {
        let Some(handler) = &self.on_error else {
            let _ = self.forward.reject(error);
            return;
        };

        let message = error.to_string();
        let handled = catch_unwind(AssertUnwindSafe(|| handler(error)));
        match handled {
            Err(_panic) => {
                let _ = self.forward.reject(UserError::msg(message));
            }
            Ok(replacement) => {
                if replacement.is_valid() {
                    replacement.splice_into(self.forward.clone());
                } else {
                    let _ = self.forward.reject(UserError::msg(message));
                }
            }
        }
    }

    pub(crate) fn scheduler(&self) -> &Arc<dyn Scheduler> {
        &self.scheduler
    }
}

/// A minimal, allocation-free rendering of a caught panic payload.
fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "stage body panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ValueCell;
    use crate::scheduler::InlineScheduler;

    fn plain_node(f: impl FnOnce(i32) -> Result<i32, UserError> + Send + 'static) -> Arc<Node<i32, i32>> {
        plain::new(f, None, Arc::new(InlineScheduler))
    }

    #[test]
    fn run_with_is_entered_at_most_once() {
        let calls = Arc::new(AtomicBool::new(false));
        let calls2 = calls.clone();
        let node = plain_node(move |x| {
            assert!(!calls2.swap(true, Ordering::SeqCst), "body ran twice");
            Ok(x)
        });

        node.run_with(ValueCell::new_resolved(1));
        node.run_with(ValueCell::new_resolved(2)); // no-op per spec §4.3 step 1
        assert!(node.is_fulfilled());
    }

    #[test]
    fn panicking_body_is_trapped_and_rejects() {
        let node = plain_node(|_| panic!("boom"));
        node.run_with(ValueCell::new_resolved(1));
        assert!(node.is_rejected());
    }

    #[test]
    fn guard_failure_on_upstream_routes_through_error_handler_absence() {
        let node = plain_node(|x| Ok(x));
        let upstream: ValueCell<i32> = ValueCell::new(); // never assigned
        node.run_with(upstream);
        assert!(node.is_rejected());
    }
}
