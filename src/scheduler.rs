//! The scheduler abstraction (spec §6) and its companion implementations.
//!
//! The core never depends on a concrete scheduler — only on the
//! `Scheduler` trait's submission contract — mirroring the source's
//! abstract `ThreadContext` (see `original_source/public/PromisePublicAPIs.h`).
//! `InlineScheduler`, `ThreadPerTaskScheduler`, and `TokioScheduler` are
//! companions, not core: the core is equally correct against any type that
//! honors the contract.

use std::sync::Arc;

/// A unit of work submitted to a scheduler.
pub type Work = Box<dyn FnOnce() + Send + 'static>;

/// Accepts work and promises to run it exactly once, eventually, on some
/// thread of its choosing. Implementations may run submissions
/// concurrently; the library assumes no FIFO or fairness property beyond
/// "executed at most once" (spec §5).
pub trait Scheduler: Send + Sync {
    fn submit(&self, work: Work);
}

/// Runs work synchronously on the calling thread, inside `submit` itself.
/// Useful for deterministic tests and for chains that genuinely need no
/// concurrency (spec §8 scenario 1, 2, 5 all use this style of scheduler).
pub struct InlineScheduler;

impl Scheduler for InlineScheduler {
    fn submit(&self, work: Work) {
        work();
    }
}

/// Spawns one detached OS thread per submission, matching
/// `ThreadContextImpl::STL::DetachedThreadContext` in
/// `original_source/ThreadContext_STL.cpp`: a new `std::thread` is created
/// per task and immediately detached.
pub struct ThreadPerTaskScheduler;

impl Scheduler for ThreadPerTaskScheduler {
    fn submit(&self, work: Work) {
        std::thread::spawn(work);
    }
}

/// Submits work to a Tokio runtime's blocking thread pool via
/// `spawn_blocking`, since stage bodies are synchronous closures, never
/// `async fn` (spec §5: "there are [no suspension points] inside the
/// library").
pub struct TokioScheduler {
    handle: tokio::runtime::Handle,
}

impl TokioScheduler {
    pub fn new(handle: tokio::runtime::Handle) -> Arc<Self> {
        Arc::new(Self { handle })
    }

    /// Convenience constructor that captures the handle of the runtime
    /// the caller is currently inside.
    pub fn current() -> Arc<Self> {
        Self::new(tokio::runtime::Handle::current())
    }
}

impl Scheduler for TokioScheduler {
    fn submit(&self, work: Work) {
        self.handle.spawn_blocking(work);
    }
}
