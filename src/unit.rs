//! The zero-size stand-in for `()` used uniformly through the node machinery.
//!
//! Rust already has a true unit type, so `Unit` exists only at the boundary
//! between "a value the generic machinery can move around like any other T"
//! and "the caller's `()`" — it lets `DeferredNode`/terminal `Forward`s share
//! the exact same code path whether or not the stage actually produces a
//! value, matching the `BoxVoid`/`UnboxVoid` trait from the source design.

/// Zero-sized marker standing in for `void`/`()` inside the node graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Unit;

impl From<()> for Unit {
    fn from(_: ()) -> Self {
        Unit
    }
}

impl From<Unit> for () {
    fn from(_: Unit) -> Self {}
}
