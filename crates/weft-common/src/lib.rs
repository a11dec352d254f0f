//! Common utilities and data structures for Weft.
//!
//! This crate provides foundational types used across the Weft crates:
//! - `Span`: Source code location tracking for rendered diagnostics
//! - `ListenerSet`: Ordered observer registry with snapshot-then-iterate delivery

mod listeners;
mod span;

pub use listeners::{ListenerId, ListenerSet};
pub use span::Span;
