//! Building the archive root: frame partitioning and the `desc.txt` descriptor.

/// `desc.txt` rendering.
pub mod descriptor;
/// Splitting the frame sequence into bounded `partN` directories.
pub mod partition;
