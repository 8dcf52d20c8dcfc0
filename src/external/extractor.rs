use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::foundation::core::{FrameFormat, Resolution};
use crate::foundation::error::{BootAnimError, BootAnimResult};

/// Parameters handed to a [`FrameExtractor`].
#[derive(Clone, Copy, Debug)]
pub struct ExtractRequest<'a> {
    /// Source video.
    pub input: &'a Path,
    /// Output frame size.
    pub resolution: Resolution,
    /// Output frames per second.
    pub fps: u32,
    /// Still-image format of each frame.
    pub format: FrameFormat,
    /// Flat directory to populate.
    pub dest_dir: &'a Path,
}

/// Rasterizes a video into still frames.
///
/// Contract: on success `dest_dir` holds one file per output frame, named so that sorting the
/// names yields temporal order (e.g. `%06d.jpg`). Failure is reported as
/// [`BootAnimError::Extraction`].
pub trait FrameExtractor {
    fn extract(&self, req: &ExtractRequest<'_>) -> BootAnimResult<()>;
}

/// Frame file name pattern understood by `ffmpeg`'s image2 muxer.
pub fn frame_pattern(format: FrameFormat) -> String {
    format!("%06d.{}", format.extension())
}

/// [`FrameExtractor`] backed by the system `ffmpeg` binary.
#[derive(Clone, Debug)]
pub struct FfmpegExtractor {
    program: PathBuf,
    quiet: bool,
}

impl FfmpegExtractor {
    pub fn new(program: impl Into<PathBuf>, quiet: bool) -> Self {
        Self {
            program: program.into(),
            quiet,
        }
    }

    /// Build the `ffmpeg` invocation for `req` without running it.
    pub fn command(&self, req: &ExtractRequest<'_>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.stdin(Stdio::null());
        if self.quiet {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        cmd.args(["-hide_banner", "-nostdin", "-y", "-i"])
            .arg(req.input)
            .arg("-vf")
            .arg(format!(
                "scale={}:{},fps={}",
                req.resolution.width, req.resolution.height, req.fps
            ))
            .args(req.format.quality_args())
            .arg(req.dest_dir.join(frame_pattern(req.format)));
        cmd
    }
}

impl FrameExtractor for FfmpegExtractor {
    fn extract(&self, req: &ExtractRequest<'_>) -> BootAnimResult<()> {
        let status = self.command(req).status().map_err(|e| {
            BootAnimError::extraction(format!(
                "failed to run '{}': {e}",
                self.program.display()
            ))
        })?;

        if !status.success() {
            return Err(BootAnimError::extraction(format!(
                "'{}' exited with {status} while decoding '{}'",
                self.program.display(),
                req.input.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/external/extractor.rs"]
mod tests;
