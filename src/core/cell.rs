//! `ValueCell<T>` — the single-assignment outcome container (spec §4.1).

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::{PromiseError, PromiseResult, UserError};

#[derive(Debug)]
enum Slot<T> {
    Empty,
    Value(T),
    Error(UserError),
}

/// A container that is assigned at most once, holding either a value of `T`
/// or an opaque error.
///
/// Publication happens-before observation: the exclusion latch is a
/// `compare_exchange` (release on success) and `access_guard` takes the
/// backing `Mutex`, which is itself an acquire boundary — no cell ever
/// observes a partially-published payload.
pub struct ValueCell<T> {
    assigned: AtomicBool,
    slot: Mutex<Slot<T>>,
}

impl<T> ValueCell<T> {
    /// Creates a fresh, unassigned cell.
    pub fn new() -> Self {
        Self {
            assigned: AtomicBool::new(false),
            slot: Mutex::new(Slot::Empty),
        }
    }

    /// Creates a cell already assigned to `value`. Used to synthesize the
    /// `Unit` upstream delivered to a root node's `start()`.
    pub fn new_resolved(value: T) -> Self {
        let cell = Self::new();
        cell.set_value(value).expect("fresh cell");
        cell
    }

    fn claim(&self) -> PromiseResult<()> {
        self.assigned
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| PromiseError::DuplicateAssignment)
    }

    /// Assigns the success value. Fails if the cell was already assigned.
    pub fn set_value(&self, value: T) -> PromiseResult<()> {
        self.claim()?;
        *self.slot.lock() = Slot::Value(value);
        Ok(())
    }

    /// Assigns the opaque error payload. Fails if already assigned.
    pub fn set_error(&self, error: UserError) -> PromiseResult<()> {
        self.claim()?;
        *self.slot.lock() = Slot::Error(error);
        Ok(())
    }

    /// `true` once either `set_value` or `set_error` has won the latch.
    pub fn has_assigned(&self) -> bool {
        self.assigned.load(Ordering::Acquire)
    }

    /// `true` if the cell was assigned and holds an error.
    pub fn is_error_case(&self) -> bool {
        matches!(&*self.slot.lock(), Slot::Error(_))
    }

    /// Raises `InvalidState` if unassigned; re-raises the stored error if
    /// this is an error case; otherwise returns cleanly.
    ///
    /// Mirrors the source's `accessGuard`, which either returns normally,
    /// rethrows, or throws `InvalidState`. Both failure shapes land in the
    /// same `Err(UserError)` channel: `InvalidState` is boxed into one the
    /// same way `into_result` boxes it, and a stored error is re-raised as
    /// a fresh `UserError` carrying its original message (the stored
    /// `anyhow::Error` itself can't be moved out of a `&self` method, and
    /// `anyhow::Error` isn't `Clone`).
    pub fn access_guard(&self) -> Result<(), UserError> {
        if !self.has_assigned() {
            return Err(UserError::new(PromiseError::InvalidState));
        }
        if let Slot::Error(e) = &*self.slot.lock() {
            return Err(anyhow::anyhow!("{e}"));
        }
        Ok(())
    }

    /// Consumes the cell, returning the stored value or error.
    ///
    /// An unassigned cell folds into the `Err` arm as an `InvalidState`
    /// payload rather than panicking: spec §4.3 routes a failed
    /// `access_guard` through the very same error-handler path as a stage
    /// body's own exceptions, so it is simplest for callers to have one
    /// `Result` to match on.
    pub fn into_result(self) -> Result<T, UserError> {
        match self.slot.into_inner() {
            Slot::Value(v) => Ok(v),
            Slot::Error(e) => Err(e),
            Slot::Empty => Err(UserError::new(PromiseError::InvalidState)),
        }
    }
}

impl<T> Default for ValueCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ValueCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueCell")
            .field("assigned", &self.has_assigned())
            .finish()
    }
}
