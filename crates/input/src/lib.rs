//! Input: pointer position in normalized device coordinates and click
//! dispatch keyed by pick tag.
//!
//! # Invariants
//! - Clicks are dispatched by tag, never by object identity.
//! - Pointer coordinates are stored unclamped; off-canvas pointers simply
//!   miss.

pub mod action;
pub mod pointer;

pub use action::{Action, ActionMap};
pub use pointer::{PointerState, Viewport};
