//! Stage sequencing with guaranteed workspace cleanup.

/// The pipeline state machine and its entry points.
pub mod orchestrator;
