//! `Forward<T>` — the producer→consumer hand-off (spec §4.2).
//!
//! This is the one piece of the crate that earns the "hard engineering"
//! label in spec §1: it must deliver exactly one outcome to exactly one
//! chained receiver, regardless of whether resolution happens before,
//! during, or after chaining, without ever losing a notification or
//! delivering one twice.
//!
//! The arbitration is a single `AtomicBool` ("chained flag") exchanged
//! between whichever side — the producer calling `fulfill`/`reject`, or the
//! chainer calling `do_chaining` — gets there first, exactly as described in
//! spec §4.2's five-step race-resolution rule. The flag only ever gates
//! *who may touch the scratch slots*; the slots themselves (the staged
//! cell(s) and the installed receiver) live behind a `parking_lot::Mutex`
//! so the Rust implementation stays entirely in safe code. Contention is
//! rare by construction (at most two parties ever touch one `Forward`), so
//! the mutex is the "lock-light" primitive the spec calls for, not a
//! general-purpose one guarding a wide critical section.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use parking_lot::Mutex;

use crate::core::cell::ValueCell;
use crate::error::{PromiseError, PromiseResult, UserError};

const RUNNING: u8 = 0;
const FULFILLED: u8 = 1;
const REJECTED: u8 = 2;

/// A one-shot receiver for a resolved `ValueCell<T>`.
pub type Receive<T> = Box<dyn FnOnce(ValueCell<T>) + Send>;
/// A repeatable receiver, used by `MultiForward`'s per-value channel.
pub type ReceiveMany<T> = Box<dyn Fn(ValueCell<T>) + Send + Sync>;

/// Single-value hand-off: used by `PlainNode`, `DeferredNode`, `NestedNode`,
/// and the terminal channel of `RecursionNode`.
pub struct Forward<T> {
    chained: AtomicBool,
    resolved: AtomicBool,
    status: AtomicU8,
    receive: Mutex<Option<Receive<T>>>,
    staged: Mutex<Option<ValueCell<T>>>,
}

impl<T> Forward<T> {
    pub fn new() -> Self {
        Self {
            chained: AtomicBool::new(false),
            resolved: AtomicBool::new(false),
            status: AtomicU8::new(RUNNING),
            receive: Mutex::new(None),
            staged: Mutex::new(None),
        }
    }

    /// Attaches the downstream receiver. Succeeds at most once over this
    /// `Forward`'s lifetime; a second call is `DuplicateChain`.
    ///
    /// The receiver is installed into its slot *before* the arbitration
    /// loop begins, so a producer that wins a concurrent race always finds
    /// a populated slot to call into directly (mirrors the source's "move
    /// the notify before enter the critical section").
    pub fn do_chaining(&self, receive: Receive<T>) -> PromiseResult<()> {
        {
            let mut slot = self.receive.lock();
            if slot.is_some() {
                return Err(PromiseError::DuplicateChain);
            }
            *slot = Some(receive);
        }

        loop {
            if self
                .chained
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                // Ownership acquired: drain whatever was staged and leave
                // the flag permanently `true` — chaining is one-shot.
                if let Some(cell) = self.staged.lock().take() {
                    let cb = self.receive.lock().take().expect("just installed");
                    cb(cell);
                }
                return Ok(());
            }
            // A producer currently holds the flag mid-stage; it always
            // releases it quickly (push then store-false), so a short
            // yielding spin is the right tool, not a blocking wait.
            std::thread::yield_now();
        }
    }

    fn publish(&self, cell: ValueCell<T>, status: u8) -> PromiseResult<()> {
        if self.resolved.swap(true, Ordering::AcqRel) {
            return Err(PromiseError::DuplicateAssignment);
        }
        self.status.store(status, Ordering::Release);

        if self
            .chained
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            // We raced ahead of chaining: stage the cell for later drain.
            *self.staged.lock() = Some(cell);
            self.chained.store(false, Ordering::Release);
        } else {
            // Chaining already completed and is holding the flag
            // permanently — its receiver is already installed.
            let cb = self.receive.lock().take();
            match cb {
                Some(cb) => cb(cell),
                None => {
                    // Receiver was already consumed by a previous delivery;
                    // for a single-value Forward this cannot happen because
                    // `resolved` already rejected the second call above.
                    unreachable!("single-value Forward resolved twice past the latch")
                }
            }
        }
        Ok(())
    }

    /// Delivers a success value. At most one `fulfill`/`reject` call may
    /// succeed over this `Forward`'s lifetime; subsequent calls fail with
    /// `DuplicateAssignment`.
    pub fn fulfill(&self, value: T) -> PromiseResult<()> {
        let cell = ValueCell::new();
        cell.set_value(value).expect("fresh cell");
        self.publish(cell, FULFILLED)
    }

    /// Delivers a failure. Same at-most-once contract as `fulfill`.
    pub fn reject(&self, error: UserError) -> PromiseResult<()> {
        let cell = ValueCell::new();
        cell.set_error(error).expect("fresh cell");
        self.publish(cell, REJECTED)
    }

    pub fn has_chained(&self) -> bool {
        self.chained.load(Ordering::Acquire)
    }

    pub fn is_fulfilled(&self) -> bool {
        self.status.load(Ordering::Acquire) == FULFILLED
    }

    pub fn is_rejected(&self) -> bool {
        self.status.load(Ordering::Acquire) == REJECTED
    }
}

impl<T> Default for Forward<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Multi-value hand-off: used by `RecursionNode`'s per-value channel, where
/// many successful emissions may precede (or race with) chaining.
///
/// Unlike the single-value `Forward`, `fulfill` here carries no at-most-once
/// latch — nothing stops more than one thread from calling it concurrently
/// against the same `MultiForward` (the API only requires `T: Send`). So
/// `chained` cannot double as "chaining has permanently won" the way it does
/// on `Forward`: a producer that loses the `chained` CAS may have lost it to
/// a *sibling producer* mid push, not to the chainer. `committed` is the
/// separate, permanent "chaining has installed its receiver and drained
/// everything staged so far" latch; `chained` stays a short-lived spinlock
/// guarding the staged-Vec/receiver critical section for every party —
/// producers included — until `committed` makes contending for it
/// unnecessary.
pub struct MultiForward<T> {
    chained: AtomicBool,
    committed: AtomicBool,
    status: AtomicU8,
    receive: Mutex<Option<ReceiveMany<T>>>,
    staged: Mutex<Vec<ValueCell<T>>>,
}

impl<T> MultiForward<T> {
    pub fn new() -> Self {
        Self {
            chained: AtomicBool::new(false),
            committed: AtomicBool::new(false),
            status: AtomicU8::new(RUNNING),
            receive: Mutex::new(None),
            staged: Mutex::new(Vec::new()),
        }
    }

    /// Attaches the downstream per-value receiver, draining in insertion
    /// order any cells staged before chaining happened. With concurrent
    /// producers, the only ordering guarantee is that each staged value is
    /// delivered exactly once — relative order across *different* producer
    /// threads is unspecified, per spec §9 / SPEC_FULL.md §9.2.
    pub fn do_chaining(&self, receive: ReceiveMany<T>) -> PromiseResult<()> {
        {
            let mut slot = self.receive.lock();
            if slot.is_some() {
                return Err(PromiseError::DuplicateChain);
            }
            *slot = Some(receive);
        }

        loop {
            if self
                .chained
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                let staged = std::mem::take(&mut *self.staged.lock());
                {
                    let cb = self.receive.lock();
                    let cb = cb.as_ref().expect("just installed");
                    for cell in staged {
                        cb(cell);
                    }
                }
                // Permanent: `chained` is left `true` so no producer ever
                // wins this CAS again, and every future `fulfill` falls
                // straight through to the `committed` fast path below.
                self.committed.store(true, Ordering::Release);
                return Ok(());
            }
            std::thread::yield_now();
        }
    }

    pub fn fulfill(&self, value: T) -> PromiseResult<()> {
        let cell = ValueCell::new();
        cell.set_value(value).expect("fresh cell");
        self.status.store(FULFILLED, Ordering::Release);

        loop {
            if self.committed.load(Ordering::Acquire) {
                let cb = self.receive.lock();
                (cb.as_ref().expect("committed implies an installed receiver"))(cell);
                return Ok(());
            }
            if self
                .chained
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                // Won the spinlock before any chaining committed: safe to
                // stage. Losing this CAS means either a sibling producer is
                // mid-push (retry) or the chainer just committed (the next
                // loop iteration's `committed` check will catch that).
                self.staged.lock().push(cell);
                self.chained.store(false, Ordering::Release);
                return Ok(());
            }
            std::thread::yield_now();
        }
    }

    pub fn is_fulfilled(&self) -> bool {
        self.status.load(Ordering::Acquire) == FULFILLED
    }
}

impl<T> Default for MultiForward<T> {
    fn default() -> Self {
        Self::new()
    }
}
