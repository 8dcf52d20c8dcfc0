use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::tools::{FFMPEG_TOOL, ZIP_TOOL, locate_tool_in};
use crate::foundation::core::{
    BackgroundColor, DescriptorVariant, FrameFormat, MAX_FRAMES_PER_PART, Offset, PlaybackMode,
    Resolution,
};
use crate::foundation::error::{BootAnimError, BootAnimResult};

/// File name used when the output path is empty or names a directory.
pub const DEFAULT_OUTPUT_NAME: &str = "bootanimation.zip";

/// Unvalidated parameters as collected from the command line (or any other front end).
#[derive(Clone, Debug, Default)]
pub struct RawConfig {
    /// Input video path.
    pub input: Option<PathBuf>,
    /// Output archive path, or a directory to place `bootanimation.zip` in.
    pub output: Option<PathBuf>,
    /// `<width>x<height>`.
    pub resolution: Option<String>,
    /// Frames per second, as typed.
    pub fps: Option<String>,
    /// `jpg` or `png`; defaults to `jpg`.
    pub frame_format: Option<String>,
    /// Write the offset-annotated (`g ...`) descriptor dialect.
    pub offset_annotated: bool,
    /// Offset pair; only used with `offset_annotated`.
    pub offset: Offset,
    /// Custom extraction tool path.
    pub ffmpeg: Option<PathBuf>,
    /// Custom archiving tool path.
    pub zip: Option<PathBuf>,
    /// Write the archive in-process instead of invoking the archiving tool.
    pub builtin_zip: bool,
    /// Suppress output from external tools.
    pub quiet: bool,
    /// Part playback directive.
    pub playback: PlaybackMode,
    /// Optional part background color.
    pub background: Option<String>,
    /// Part capacity; defaults to [`MAX_FRAMES_PER_PART`].
    pub max_frames_per_part: Option<usize>,
    /// Cut the soundtrack into one `audio.wav` per part.
    pub with_audio: bool,
}

/// How the finished `result` tree becomes an archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArchiverChoice {
    /// Invoke the external `zip` tool at this path.
    External(PathBuf),
    /// Write a store-only zip in-process.
    Builtin,
}

/// Validated, immutable pipeline parameters.
#[derive(Clone, Debug)]
pub struct Config {
    input: PathBuf,
    output: PathBuf,
    resolution: Resolution,
    fps: u32,
    quiet: bool,
    variant: DescriptorVariant,
    frame_format: FrameFormat,
    playback: PlaybackMode,
    background: Option<BackgroundColor>,
    max_frames_per_part: usize,
    with_audio: bool,
    ffmpeg: PathBuf,
    archiver: ArchiverChoice,
}

impl RawConfig {
    /// Validate against the process `PATH`.
    pub fn validate(self) -> BootAnimResult<Config> {
        let path_var = std::env::var_os("PATH");
        self.validate_with_path(path_var)
    }

    /// Validate, resolving external tools against `path_var`.
    ///
    /// Checks run in a fixed order and the first failure is returned: input, output, resolution,
    /// fps, frame format, part capacity, background, then external tools.
    pub fn validate_with_path(self, path_var: Option<OsString>) -> BootAnimResult<Config> {
        let input = match self.input {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => {
                return Err(BootAnimError::configuration(
                    "input video path is required (-i)",
                ));
            }
        };
        if !input.is_file() {
            return Err(BootAnimError::configuration(format!(
                "input video file does not exist: {}",
                input.display()
            )));
        }

        let output = resolve_output_path(self.output.as_deref());

        let resolution = match self.resolution.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.parse::<Resolution>()?,
            _ => {
                return Err(BootAnimError::configuration(
                    "resolution is required (-r <width>x<height>)",
                ));
            }
        };

        let fps = parse_fps(self.fps.as_deref())?;

        let frame_format = match self.frame_format.as_deref() {
            Some(s) => s.parse::<FrameFormat>()?,
            None => FrameFormat::default(),
        };

        let max_frames_per_part = self.max_frames_per_part.unwrap_or(MAX_FRAMES_PER_PART);
        if max_frames_per_part == 0 {
            return Err(BootAnimError::configuration(
                "frames per part must be positive",
            ));
        }

        let background = self
            .background
            .as_deref()
            .map(str::parse::<BackgroundColor>)
            .transpose()?;

        let ffmpeg = locate_tool_in(FFMPEG_TOOL, self.ffmpeg.as_deref(), path_var.as_deref())
            .ok_or_else(|| missing_tool(FFMPEG_TOOL, self.ffmpeg.as_deref()))?;

        let archiver = if self.builtin_zip {
            ArchiverChoice::Builtin
        } else {
            let zip = locate_tool_in(ZIP_TOOL, self.zip.as_deref(), path_var.as_deref())
                .ok_or_else(|| missing_tool(ZIP_TOOL, self.zip.as_deref()))?;
            ArchiverChoice::External(zip)
        };

        let variant = if self.offset_annotated {
            DescriptorVariant::OffsetAnnotated {
                offset: self.offset,
            }
        } else {
            DescriptorVariant::Standard
        };

        Ok(Config {
            input,
            output,
            resolution,
            fps,
            quiet: self.quiet,
            variant,
            frame_format,
            playback: self.playback,
            background,
            max_frames_per_part,
            with_audio: self.with_audio,
            ffmpeg,
            archiver,
        })
    }
}

/// Apply the output path defaults: empty means `./bootanimation.zip`, a path without an
/// extension is treated as a directory.
pub fn resolve_output_path(output: Option<&Path>) -> PathBuf {
    match output {
        None => PathBuf::from(DEFAULT_OUTPUT_NAME),
        Some(p) if p.as_os_str().is_empty() => PathBuf::from(DEFAULT_OUTPUT_NAME),
        Some(p) if p.extension().is_none() => p.join(DEFAULT_OUTPUT_NAME),
        Some(p) => p.to_path_buf(),
    }
}

fn parse_fps(raw: Option<&str>) -> BootAnimResult<u32> {
    let raw = match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return Err(BootAnimError::configuration("fps is required (-f)")),
    };
    match raw.parse::<u32>() {
        Ok(fps) if fps > 0 => Ok(fps),
        _ => Err(BootAnimError::configuration(format!(
            "fps must be a positive integer, got '{raw}'"
        ))),
    }
}

fn missing_tool(name: &str, configured: Option<&Path>) -> BootAnimError {
    match configured {
        Some(p) => BootAnimError::configuration(format!(
            "{name} not found: '{}' does not exist and '{name}' is not on PATH",
            p.display()
        )),
        None => BootAnimError::configuration(format!("{name} not found on PATH")),
    }
}

impl Config {
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Final archive path, after defaults were applied.
    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    pub fn variant(&self) -> DescriptorVariant {
        self.variant
    }

    pub fn frame_format(&self) -> FrameFormat {
        self.frame_format
    }

    pub fn playback(&self) -> PlaybackMode {
        self.playback
    }

    pub fn background(&self) -> Option<&BackgroundColor> {
        self.background.as_ref()
    }

    pub fn max_frames_per_part(&self) -> usize {
        self.max_frames_per_part
    }

    pub fn with_audio(&self) -> bool {
        self.with_audio
    }

    /// Resolved extraction tool.
    pub fn ffmpeg(&self) -> &Path {
        &self.ffmpeg
    }

    pub fn archiver(&self) -> &ArchiverChoice {
        &self.archiver
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
