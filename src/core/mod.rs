//! The promise-node graph core: `ValueCell`, `Forward`/`MultiForward`.
//!
//! This module is THE CORE per spec §1 — the state machine that carries a
//! single resolution outcome across a chain, and the concurrent hand-off
//! primitive that couples it to a not-yet-attached consumer.

pub mod cell;
pub mod forward;

pub use cell::ValueCell;
pub use forward::{Forward, MultiForward, Receive, ReceiveMany};
