use std::path::{Path, PathBuf};

/// Convenience result type used across bootanim.
pub type BootAnimResult<T> = Result<T, BootAnimError>;

/// Error taxonomy for the boot-animation pipeline.
///
/// Each variant names the stage that failed; the display prefix is stable so callers can report
/// a single descriptive line.
#[derive(thiserror::Error, Debug)]
pub enum BootAnimError {
    /// Missing or invalid user-provided parameter, or a missing external tool.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No usable location for the scratch workspace.
    #[error("environment error: {0}")]
    Environment(String),

    /// The frame extraction adapter reported failure.
    #[error("frame extraction failed: {0}")]
    Extraction(String),

    /// Extraction succeeded but produced no frames.
    #[error("no frames were extracted from the input video")]
    EmptyFrameSequence,

    /// The archiver adapter reported failure.
    #[error("archiving failed: {0}")]
    Archiving(String),

    /// Directory creation, move, write or removal failure.
    #[error("filesystem error: {action} '{}': {source}", path.display())]
    Filesystem {
        /// What was being attempted.
        action: String,
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BootAnimError {
    /// Build a [`BootAnimError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`BootAnimError::Environment`] value.
    pub fn environment(msg: impl Into<String>) -> Self {
        Self::Environment(msg.into())
    }

    /// Build a [`BootAnimError::Extraction`] value.
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    /// Build a [`BootAnimError::Archiving`] value.
    pub fn archiving(msg: impl Into<String>) -> Self {
        Self::Archiving(msg.into())
    }

    /// Build a [`BootAnimError::Filesystem`] value.
    pub fn filesystem(action: impl Into<String>, path: &Path, source: std::io::Error) -> Self {
        Self::Filesystem {
            action: action.into(),
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
