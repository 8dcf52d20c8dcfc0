//! Scratch workspace discovery and lifetime.

/// Writable-root discovery and the `frames`/`result` scratch tree.
pub mod scratch;
