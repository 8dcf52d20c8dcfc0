use std::cmp::Ordering;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::foundation::error::{BootAnimError, BootAnimResult};

/// One `partN` directory of the archive.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Part {
    /// Zero-based part index.
    pub index: usize,
    /// Frames moved into this part.
    pub frame_count: usize,
}

impl Part {
    /// Directory name, `part<index>`.
    pub fn name(&self) -> String {
        part_dir_name(self.index)
    }
}

pub fn part_dir_name(index: usize) -> String {
    format!("part{index}")
}

/// List the extracted frames in `frames_dir`, sorted into playback order.
///
/// Only regular files are considered. Ordering does not depend on directory enumeration order;
/// see [`compare_frame_names`].
pub fn collect_frames(frames_dir: &Path) -> BootAnimResult<Vec<PathBuf>> {
    let entries = fs::read_dir(frames_dir)
        .map_err(|e| BootAnimError::filesystem("read frames directory", frames_dir, e))?;

    let mut frames = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| BootAnimError::filesystem("read frames directory", frames_dir, e))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| BootAnimError::filesystem("inspect frame", &path, e))?;
        if file_type.is_file() {
            frames.push(path);
        }
    }

    frames.sort_by(|a, b| compare_frame_names(a, b));
    Ok(frames)
}

/// Natural ordering for file names: runs of digits compare by numeric value (so `10.jpg`
/// follows `9.jpg` and `part10` follows `part2`), everything else byte-wise. Ties fall back to
/// the full path.
pub fn compare_frame_names(a: &Path, b: &Path) -> Ordering {
    let an = a.file_name().unwrap_or_default().to_string_lossy();
    let bn = b.file_name().unwrap_or_default().to_string_lossy();
    natural_cmp(&an, &bn).then_with(|| a.cmp(b))
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ac = chunks(a);
    let mut bc = chunks(b);
    loop {
        match (ac.next(), bc.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match compare_chunk(x, y) {
                Ordering::Equal => continue,
                ord => return ord,
            },
        }
    }
}

fn compare_chunk(a: &str, b: &str) -> Ordering {
    let is_num = |s: &str| s.bytes().all(|c| c.is_ascii_digit());
    if is_num(a) && is_num(b) {
        let a = a.trim_start_matches('0');
        let b = b.trim_start_matches('0');
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    } else {
        a.cmp(b)
    }
}

// Splits into alternating runs of ASCII digits and non-digits.
fn chunks(s: &str) -> impl Iterator<Item = &str> {
    let mut rest = s;
    std::iter::from_fn(move || {
        let digit = rest.chars().next()?.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != digit)
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(end);
        rest = tail;
        Some(head)
    })
}

/// Index ranges of each part for `frame_count` frames at `capacity` frames per part.
///
/// Every range is non-empty; all but the last hold exactly `capacity` frames.
pub fn plan_parts(frame_count: usize, capacity: usize) -> Vec<Range<usize>> {
    if capacity == 0 {
        return Vec::new();
    }
    (0..frame_count)
        .step_by(capacity)
        .map(|start| start..(start + capacity).min(frame_count))
        .collect()
}

/// Move `frames` (already in playback order) into `result_dir/partN` directories of at most
/// `capacity` frames each, preserving file names and order.
///
/// A part directory is only created once it receives a frame, so an exact multiple of
/// `capacity` never leaves a trailing empty part.
pub fn partition_frames(
    frames: &[PathBuf],
    result_dir: &Path,
    capacity: usize,
) -> BootAnimResult<Vec<Part>> {
    if frames.is_empty() {
        return Err(BootAnimError::EmptyFrameSequence);
    }
    if capacity == 0 {
        return Err(BootAnimError::configuration(
            "frames per part must be positive",
        ));
    }

    let plan = plan_parts(frames.len(), capacity);
    let mut parts = Vec::with_capacity(plan.len());
    for (index, range) in plan.into_iter().enumerate() {
        let part_dir = result_dir.join(part_dir_name(index));
        fs::create_dir(&part_dir)
            .map_err(|e| BootAnimError::filesystem("create part directory", &part_dir, e))?;

        let chunk = &frames[range];
        for frame in chunk {
            let name = frame.file_name().ok_or_else(|| {
                BootAnimError::filesystem(
                    "move frame",
                    frame,
                    std::io::Error::other("frame path has no file name"),
                )
            })?;
            let dest = part_dir.join(name);
            fs::rename(frame, &dest)
                .map_err(|e| BootAnimError::filesystem("move frame", frame, e))?;
        }

        tracing::debug!(part = index, frames = chunk.len(), "filled part");
        parts.push(Part {
            index,
            frame_count: chunk.len(),
        });
    }

    Ok(parts)
}

#[cfg(test)]
#[path = "../../tests/unit/assemble/partition.rs"]
mod tests;
