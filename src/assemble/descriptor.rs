use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use crate::assemble::partition::{Part, part_dir_name};
use crate::config::model::Config;
use crate::foundation::core::{BackgroundColor, DescriptorVariant, PlaybackMode, Resolution};
use crate::foundation::error::{BootAnimError, BootAnimResult};

/// Descriptor file name at the archive root.
pub const DESCRIPTOR_FILE_NAME: &str = "desc.txt";

/// In-memory `desc.txt`: a global parameters line followed by one playback directive per part.
///
/// The descriptor never decides part boundaries; it renders exactly the parts pushed into it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Descriptor {
    resolution: Resolution,
    fps: u32,
    variant: DescriptorVariant,
    playback: PlaybackMode,
    background: Option<BackgroundColor>,
    parts: Vec<usize>,
}

impl Descriptor {
    pub fn new(resolution: Resolution, fps: u32, variant: DescriptorVariant) -> Self {
        Self {
            resolution,
            fps,
            variant,
            playback: PlaybackMode::default(),
            background: None,
            parts: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.resolution(), config.fps(), config.variant())
            .with_playback(config.playback())
            .with_background(config.background().cloned())
    }

    pub fn with_playback(mut self, playback: PlaybackMode) -> Self {
        self.playback = playback;
        self
    }

    pub fn with_background(mut self, background: Option<BackgroundColor>) -> Self {
        self.background = background;
        self
    }

    /// Append directives for `parts`, in the order given.
    pub fn extend_parts<'a>(&mut self, parts: impl IntoIterator<Item = &'a Part>) {
        self.parts.extend(parts.into_iter().map(|p| p.index));
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn header_line(&self) -> String {
        let Resolution { width, height } = self.resolution;
        match self.variant {
            DescriptorVariant::Standard => format!("{width} {height} {}", self.fps),
            DescriptorVariant::OffsetAnnotated { offset } => format!(
                "g {width} {height} {} {} {}",
                offset.x, offset.y, self.fps
            ),
        }
    }

    pub fn directive_line(&self, part_index: usize) -> String {
        let mut line = format!(
            "{} {}",
            self.playback.directive_prefix(),
            part_dir_name(part_index)
        );
        if let Some(bg) = &self.background {
            let _ = write!(line, " {bg}");
        }
        line
    }

    /// Full file contents, newline-terminated.
    pub fn render(&self) -> String {
        let mut out = self.header_line();
        out.push('\n');
        for &index in &self.parts {
            out.push_str(&self.directive_line(index));
            out.push('\n');
        }
        out
    }

    /// Write `desc.txt` into `result_dir`, replacing any existing file.
    pub fn write_to(&self, result_dir: &Path) -> BootAnimResult<PathBuf> {
        let path = result_dir.join(DESCRIPTOR_FILE_NAME);
        let write = || -> std::io::Result<()> {
            let mut w = BufWriter::new(File::create(&path)?);
            w.write_all(self.render().as_bytes())?;
            w.flush()
        };
        write().map_err(|e| BootAnimError::filesystem("write descriptor", &path, e))?;
        Ok(path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assemble/descriptor.rs"]
mod tests;
