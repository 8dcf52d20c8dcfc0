//! Shared value types and the crate error taxonomy.

/// Validated value types (resolution, frame format, descriptor dialect, playback mode).
pub mod core;
/// Crate-wide error type.
pub mod error;
