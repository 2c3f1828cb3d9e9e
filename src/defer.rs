//! `Defer<T>` — the handle surrendered to user code by a deferred stage
//! (spec §4.5, GLOSSARY).

use std::sync::Arc;

use crate::core::Forward;
use crate::error::{PromiseResult, UserError};

/// Lets user code resolve a deferred stage from any later context, on any
/// thread. `set_result`/`set_error` translate 1:1 to the underlying
/// forward's `fulfill`/`reject`; a duplicate call surfaces
/// `DuplicateAssignment`, matching `Forward`'s own at-most-once contract.
///
/// A `Defer` that is dropped without ever being resolved leaves its
/// forward eternally pending (SPEC_FULL.md §9 decides this explicitly,
/// following the open question in spec §9): nothing here implicitly
/// rejects on drop.
pub struct Defer<T> {
    forward: Arc<Forward<T>>,
}

impl<T> Clone for Defer<T> {
    fn clone(&self) -> Self {
        Self {
            forward: self.forward.clone(),
        }
    }
}

impl<T> Defer<T> {
    pub(crate) fn new(forward: Arc<Forward<T>>) -> Self {
        Self { forward }
    }

    /// Resolves the stage with a success value.
    pub fn set_result(&self, value: T) -> PromiseResult<()> {
        self.forward.fulfill(value)
    }

    /// Resolves the stage with a failure.
    pub fn set_error(&self, error: UserError) -> PromiseResult<()> {
        self.forward.reject(error)
    }
}
