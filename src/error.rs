//! Contract-violation error taxonomy (spec §7).
//!
//! `PromiseError` covers programmer-error conditions — calling an API in a
//! way its contract forbids. It is distinct from the opaque `UserError`
//! payload (`anyhow::Error`) that flows through a chain's rejection path:
//! a `PromiseError` is returned directly from the offending call, never
//! routed through `onError`.

use thiserror::Error;

/// The opaque error payload carried by a rejected `Forward`.
///
/// Kept as a type alias rather than a newtype so user code can freely use
/// `anyhow`'s `?`-conversion and context helpers when building one.
pub type UserError = anyhow::Error;

/// Contract-violation errors: operating on a handle or hand-off outside the
/// contract its API documents.
#[derive(Debug, Error)]
pub enum PromiseError {
    /// Called `isFulfilled`/`isRejected`/`then`/... on a handle with no node.
    #[error("operation on an invalid promise handle")]
    InvalidPromise,

    /// Accessed a `ValueCell` that was never assigned.
    #[error("value accessed on an unassigned cell")]
    InvalidState,

    /// A `ValueCell` or `Defer` was fulfilled/rejected more than once.
    #[error("cell or defer handle assigned more than once")]
    DuplicateAssignment,

    /// A `Forward` had `do_chaining` invoked on it more than once.
    #[error("forward chained more than once")]
    DuplicateChain,
}

/// Crate-wide result alias for contract-level fallibility.
pub type PromiseResult<T> = Result<T, PromiseError>;
