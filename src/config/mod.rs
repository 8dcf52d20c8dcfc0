//! Pipeline parameters: raw input, validation rules and external tool lookup.

/// Raw and validated configuration records.
pub mod model;
/// External tool resolution (`ffmpeg`, `zip`).
pub mod tools;
