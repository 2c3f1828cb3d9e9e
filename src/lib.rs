//! # pact
//!
//! A typed, chainable deferred-value library with a pluggable `Scheduler`.
//!
//! A producer supplies a computation that eventually yields either a value
//! of a declared result type or an opaque failure; consumers compose
//! downstream stages that transform the value (`then`), handle failure
//! (`catch`, the `on_error` argument to `then`), nest further asynchronous
//! work (`then_nested`), or iterate a lazily-produced sequence
//! (`iterate`/`RecursionPromise`). Every stage runs on whatever thread the
//! caller's `Scheduler` chooses to run it on — the library itself never
//! blocks and never assumes FIFO or single-threaded execution.
//!
//! ## Module map
//!
//! - [`core`] — `ValueCell`/`Forward`/`MultiForward`: the promise-node graph
//!   and the lock-light hand-off protocol. This is the part worth reading
//!   first if you want to understand the concurrency story.
//! - [`node`] — the four stage kinds (`plain`, `deferred`, `nested`,
//!   `recursion`) built on top of [`core`], plus the shared `Node` backbone.
//! - [`promise`] — `Promise<T>`/`RecursionPromise<T>`, the public typed
//!   handles, and the `then`/`catch`/`iterate` chaining surface.
//! - [`spawn`] — root-task factories (`spawn`, `spawn_deferred`,
//!   `spawn_nested`).
//! - [`scheduler`] — the `Scheduler` trait plus three companion
//!   implementations (`InlineScheduler`, `ThreadPerTaskScheduler`,
//!   `TokioScheduler`).
//! - [`defer`] — `Defer<T>`, the handle surrendered to user code by a
//!   deferred stage.
//! - [`unit`] — the zero-size `Unit` marker standing in for `()` inside the
//!   generic node machinery.
//! - [`error`] — the closed `PromiseError` contract-violation taxonomy; the
//!   opaque `UserError` payload is a plain `anyhow::Error`.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use pact::scheduler::InlineScheduler;
//! use pact::spawn::spawn;
//!
//! let scheduler = Arc::new(InlineScheduler);
//! let promise = spawn(|| Ok(5), None, scheduler.clone())
//!     .then(|x: i32| Ok(x * 2), None, scheduler);
//! assert_eq!(promise.is_fulfilled().unwrap(), true);
//! ```

pub mod core;
pub mod defer;
pub mod error;
pub mod node;
pub mod promise;
pub mod scheduler;
pub mod spawn;
pub mod unit;

pub use error::{PromiseError, PromiseResult, UserError};
pub use promise::{Promise, RecursionPromise};
pub use scheduler::Scheduler;
pub use unit::Unit;

/// Convenient re-exports for common types and traits.
pub mod prelude {
    pub use crate::defer::Defer;
    pub use crate::error::{PromiseError, PromiseResult, UserError};
    pub use crate::promise::{Promise, RecursionPromise};
    pub use crate::scheduler::{InlineScheduler, Scheduler, ThreadPerTaskScheduler, TokioScheduler};
    pub use crate::spawn::spawn;
    #[cfg(feature = "deferred")]
    pub use crate::spawn::spawn_deferred;
    #[cfg(feature = "nested")]
    pub use crate::spawn::spawn_nested;
    pub use crate::unit::Unit;
}
