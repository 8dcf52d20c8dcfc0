use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::foundation::error::{BootAnimError, BootAnimResult};

/// File name of the per-part soundtrack the renderer plays alongside a part.
pub const AUDIO_FILE_NAME: &str = "audio.wav";

/// One soundtrack slice, aligned with the frames of a single part.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioSegment<'a> {
    /// Source video.
    pub input: &'a Path,
    /// Part this slice belongs to.
    pub part_index: usize,
    /// Offset into the source, in seconds.
    pub start_secs: f64,
    /// Slice length, in seconds.
    pub duration_secs: f64,
    /// File to write (`partN/audio.wav`).
    pub dest: &'a Path,
}

/// Cuts soundtrack slices out of the source video.
///
/// Contract: on success `seg.dest` holds a WAV file covering `start_secs..start_secs +
/// duration_secs`. Failure is reported as [`BootAnimError::Extraction`].
pub trait AudioExtractor {
    fn extract_segment(&self, seg: &AudioSegment<'_>) -> BootAnimResult<()>;
}

/// Slice timings for parts of the given frame counts at `fps`: each part starts where the
/// previous one ended.
pub fn segment_timings(frame_counts: &[usize], fps: u32) -> Vec<(f64, f64)> {
    let fps = f64::from(fps.max(1));
    let mut start_frame = 0usize;
    frame_counts
        .iter()
        .map(|&count| {
            let timing = (start_frame as f64 / fps, count as f64 / fps);
            start_frame += count;
            timing
        })
        .collect()
}

/// [`AudioExtractor`] backed by the system `ffmpeg` binary (16-bit PCM, 44.1 kHz stereo).
#[derive(Clone, Debug)]
pub struct FfmpegAudioExtractor {
    program: PathBuf,
    quiet: bool,
}

impl FfmpegAudioExtractor {
    pub fn new(program: impl Into<PathBuf>, quiet: bool) -> Self {
        Self {
            program: program.into(),
            quiet,
        }
    }

    pub fn command(&self, seg: &AudioSegment<'_>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.stdin(Stdio::null());
        if self.quiet {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        cmd.args(["-hide_banner", "-nostdin", "-y", "-i"])
            .arg(seg.input)
            .arg("-ss")
            .arg(format!("{:.3}", seg.start_secs))
            .arg("-t")
            .arg(format!("{:.3}", seg.duration_secs))
            .args(["-vn", "-acodec", "pcm_s16le", "-ar", "44100", "-ac", "2"])
            .arg(seg.dest);
        cmd
    }
}

impl AudioExtractor for FfmpegAudioExtractor {
    fn extract_segment(&self, seg: &AudioSegment<'_>) -> BootAnimResult<()> {
        let status = self.command(seg).status().map_err(|e| {
            BootAnimError::extraction(format!(
                "failed to run '{}': {e}",
                self.program.display()
            ))
        })?;

        if !status.success() {
            return Err(BootAnimError::extraction(format!(
                "'{}' exited with {status} while cutting audio for part{}",
                self.program.display(),
                seg.part_index
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/external/audio.rs"]
mod tests;
