//! bootanim turns a video into a device boot-animation archive.
//!
//! The archive is a store-only zip with a `desc.txt` descriptor at its root and the frames split
//! into numbered `partN` directories of at most [`MAX_FRAMES_PER_PART`] frames each.
//!
//! # Pipeline overview
//!
//! 1. **Validate**: [`RawConfig`] -> [`Config`] (resolution, fps, frame format, external tools)
//! 2. **Workspace**: pick a writable root and create `bootanim/{frames,result}`
//! 3. **Extract**: a [`FrameExtractor`] rasterizes the video into `frames/` (`ffmpeg` by default)
//! 4. **Partition**: frames are moved, in order, into `result/part0..partN` (optionally with an
//!    `audio.wav` slice per part)
//! 5. **Describe**: `result/desc.txt` gets the global line and one directive per part
//! 6. **Archive**: an [`Archiver`] packs `result/` into the output zip (`zip` or built-in)
//!
//! The scratch workspace is removed after every run, successful or not.
//!
//! The external tools sit behind traits so the pipeline can be driven with fakes:
//!
//! ```no_run
//! use bootanim::{RawConfig, run};
//!
//! let report = run(RawConfig {
//!     input: Some("intro.mp4".into()),
//!     resolution: Some("1080x2400".into()),
//!     fps: Some("30".into()),
//!     ..RawConfig::default()
//! })?;
//! println!("wrote {} ({} parts)", report.output.display(), report.parts.len());
//! # Ok::<(), bootanim::BootAnimError>(())
//! ```
#![forbid(unsafe_code)]

mod assemble;
mod config;
mod external;
mod foundation;
mod pipeline;
mod workspace;

pub use assemble::descriptor::{DESCRIPTOR_FILE_NAME, Descriptor};
pub use assemble::partition::{
    Part, collect_frames, compare_frame_names, part_dir_name, partition_frames, plan_parts,
};
pub use config::model::{
    ArchiverChoice, Config, DEFAULT_OUTPUT_NAME, RawConfig, resolve_output_path,
};
pub use config::tools::{FFMPEG_TOOL, ZIP_TOOL, locate_tool, locate_tool_in};
pub use external::archiver::{Archiver, StoredZipArchiver, ZipToolArchiver, ensure_parent_dir};
pub use external::audio::{
    AUDIO_FILE_NAME, AudioExtractor, AudioSegment, FfmpegAudioExtractor, segment_timings,
};
pub use external::extractor::{ExtractRequest, FfmpegExtractor, FrameExtractor, frame_pattern};
pub use foundation::core::{
    BackgroundColor, DescriptorVariant, FrameFormat, MAX_FRAMES_PER_PART, Offset, PlaybackMode,
    Resolution,
};
pub use foundation::error::{BootAnimError, BootAnimResult};
pub use pipeline::orchestrator::{
    BuildReport, Stage, assemble, assemble_with_audio, create_bootanimation, run,
};
pub use workspace::scratch::{
    FRAMES_DIR_NAME, RESULT_DIR_NAME, WORKSPACE_DIR_NAME, Workspace, candidate_roots,
    is_writable_dir, scratch_would_contain,
};
