use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{BootAnimError, BootAnimResult};

/// Frame capacity of a single `partN` directory.
pub const MAX_FRAMES_PER_PART: usize = 400;

/// Output pixel size, parsed from `<width>x<height>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> BootAnimResult<Self> {
        if width == 0 || height == 0 {
            return Err(BootAnimError::configuration(
                "resolution width and height must be positive",
            ));
        }
        Ok(Self { width, height })
    }
}

impl FromStr for Resolution {
    type Err = BootAnimError;

    fn from_str(s: &str) -> BootAnimResult<Self> {
        let malformed = || {
            BootAnimError::configuration(format!(
                "invalid resolution '{s}': expected <width>x<height> (e.g. 1080x2400)"
            ))
        };

        let (w, h) = s.trim().split_once('x').ok_or_else(malformed)?;
        let width = parse_dimension(w).ok_or_else(malformed)?;
        let height = parse_dimension(h).ok_or_else(malformed)?;
        Self::new(width, height).map_err(|_| malformed())
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// `u32::from_str` tolerates a leading `+`; dimensions must be plain digits.
fn parse_dimension(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Pixel offset used by the offset-annotated descriptor dialect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

/// Descriptor dialect written on the first line of `desc.txt`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorVariant {
    /// `<width> <height> <fps>`
    #[default]
    Standard,
    /// `g <width> <height> <offset_x> <offset_y> <fps>`
    OffsetAnnotated { offset: Offset },
}

/// Still-image format the extractor rasterizes frames into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameFormat {
    #[default]
    Jpeg,
    Png,
}

impl FrameFormat {
    /// File extension used for extracted frames.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// Encoder quality arguments: near-lossless JPEG, moderate PNG compression effort.
    pub fn quality_args(self) -> &'static [&'static str] {
        match self {
            Self::Jpeg => &["-qscale:v", "2"],
            Self::Png => &["-compression_level", "3"],
        }
    }
}

impl FromStr for FrameFormat {
    type Err = BootAnimError;

    fn from_str(s: &str) -> BootAnimResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            other => Err(BootAnimError::configuration(format!(
                "unsupported frame format '{other}': expected 'jpg' or 'png'"
            ))),
        }
    }
}

impl fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Playback directive applied to every part.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Play each part once, to completion, even if boot finishes (`c 1 0`).
    #[default]
    PlayFull,
    /// Play each part once but stop as soon as boot completes (`p 1 0`).
    StopOnBoot,
    /// Loop each part until boot completes (`c 0 0`).
    LoopInfinite,
}

impl PlaybackMode {
    /// `<type> <count> <pause>` prefix of a part directive.
    pub fn directive_prefix(self) -> &'static str {
        match self {
            Self::PlayFull => "c 1 0",
            Self::StopOnBoot => "p 1 0",
            Self::LoopInfinite => "c 0 0",
        }
    }
}

/// Part background color, normalized to `#RGB` or `#RRGGBB`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct BackgroundColor(String);

impl BackgroundColor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for BackgroundColor {
    type Err = BootAnimError;

    fn from_str(s: &str) -> BootAnimResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 3 && hex.len() != 6 {
            return Err(BootAnimError::configuration(format!(
                "invalid background color '{s}': use #RRGGBB or #RGB"
            )));
        }
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(BootAnimError::configuration(format!(
                "invalid background color '{s}': not a hex color code"
            )));
        }
        Ok(Self(format!("#{hex}")))
    }
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
