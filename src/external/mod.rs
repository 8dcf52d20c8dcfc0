//! Adapters around the external collaborators: frame extraction, audio slicing and archiving.
//!
//! Both are traits so the pipeline can run against fakes; the default implementations shell out
//! to the system `ffmpeg` and `zip` binaries.

/// Per-part soundtrack slices (`ffmpeg`).
pub mod audio;
/// Archive writers (`zip` tool and in-process store-only zip).
pub mod archiver;
/// Frame extraction (`ffmpeg`).
pub mod extractor;
