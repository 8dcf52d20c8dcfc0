use std::fs;
use std::path::{Path, PathBuf};

use crate::foundation::error::{BootAnimError, BootAnimResult};

/// Name of the scratch root created under the chosen candidate directory.
pub const WORKSPACE_DIR_NAME: &str = "bootanim";
/// Flat directory the extractor writes frames into.
pub const FRAMES_DIR_NAME: &str = "frames";
/// Directory that becomes the archive root.
pub const RESULT_DIR_NAME: &str = "result";

/// Candidate roots for the scratch workspace, in preference order: the current directory, then
/// the output archive's parent directory.
pub fn candidate_roots(current_dir: Option<&Path>, output: &Path) -> Vec<PathBuf> {
    let mut roots = Vec::with_capacity(2);
    if let Some(cwd) = current_dir {
        roots.push(cwd.to_path_buf());
    }
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        roots.push(parent.to_path_buf());
    }
    roots
}

/// Returns `true` if `dir` is an existing directory that accepts new files.
///
/// Probes by creating and removing a marker file rather than trusting permission bits.
pub fn is_writable_dir(dir: &Path) -> bool {
    if !dir.is_dir() {
        return false;
    }
    let probe = dir.join(format!(".bootanim-probe-{}", std::process::id()));
    match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&probe)
    {
        Ok(_) => {
            let _ = fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}

/// Scratch directory tree owned by one pipeline run.
///
/// ```text
/// <root>/bootanim/
///   frames/   flat, populated by the extractor
///   result/   desc.txt + partN/, archived as-is
/// ```
///
/// [`Workspace::release`] removes the tree; if a workspace is dropped without being released
/// (e.g. on panic) the tree is removed on a best-effort basis.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    frames_dir: PathBuf,
    result_dir: PathBuf,
    released: bool,
}

impl Workspace {
    /// Create the scratch tree under the first writable candidate.
    ///
    /// A leftover scratch root from an earlier run is removed first; an existing directory of
    /// the same name that does not look like one is an error and is left untouched.
    pub fn acquire(candidates: &[PathBuf]) -> BootAnimResult<Self> {
        Self::acquire_preserving(candidates, None)
    }

    /// Like [`Workspace::acquire`], but skips any candidate whose scratch root would contain
    /// `preserve` (typically the output archive), since release removes that whole tree.
    pub fn acquire_preserving(
        candidates: &[PathBuf],
        preserve: Option<&Path>,
    ) -> BootAnimResult<Self> {
        let mut skipped_any = false;
        let mut base = None;
        for candidate in candidates {
            if let Some(keep) = preserve
                && scratch_would_contain(candidate, keep)
            {
                tracing::debug!(
                    candidate = %candidate.display(),
                    "skipping workspace root that would contain the output"
                );
                skipped_any = true;
                continue;
            }
            if is_writable_dir(candidate) {
                base = Some(candidate);
                break;
            }
        }

        let Some(base) = base else {
            let tried = candidates
                .iter()
                .map(|c| format!("'{}'", c.display()))
                .collect::<Vec<_>>()
                .join(", ");
            if let Some(keep) = preserve.filter(|_| skipped_any) {
                return Err(BootAnimError::environment(format!(
                    "no usable directory for temporary files: '{}' would be removed with the \
                     scratch directory '{WORKSPACE_DIR_NAME}' (tried: {tried})",
                    keep.display()
                )));
            }
            return Err(BootAnimError::environment(format!(
                "no writable directory found for temporary files (tried: {tried})"
            )));
        };

        let root = base.join(WORKSPACE_DIR_NAME);
        if fs::symlink_metadata(&root).is_ok() {
            if !is_scratch_shaped(&root) {
                return Err(BootAnimError::environment(format!(
                    "'{}' already exists and is not a bootanim scratch directory; \
                     move it or run from another directory",
                    root.display()
                )));
            }
            tracing::warn!(root = %root.display(), "removing stale scratch workspace");
            fs::remove_dir_all(&root).map_err(|e| {
                BootAnimError::filesystem("remove stale workspace", &root, e)
            })?;
        }

        let ws = Self {
            frames_dir: root.join(FRAMES_DIR_NAME),
            result_dir: root.join(RESULT_DIR_NAME),
            root,
            released: false,
        };
        for dir in [&ws.frames_dir, &ws.result_dir] {
            fs::create_dir_all(dir)
                .map_err(|e| BootAnimError::filesystem("create directory", dir, e))?;
        }

        tracing::debug!(root = %ws.root.display(), "acquired scratch workspace");
        Ok(ws)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn frames_dir(&self) -> &Path {
        &self.frames_dir
    }

    pub fn result_dir(&self) -> &Path {
        &self.result_dir
    }

    /// Recursively remove the scratch root.
    pub fn release(mut self) -> BootAnimResult<()> {
        self.released = true;
        remove_tree(&self.root)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = remove_tree(&self.root) {
            tracing::error!(error = %e, "failed to remove scratch workspace");
        }
    }
}

/// Returns `true` if `path` would end up inside `<candidate>/bootanim`.
pub fn scratch_would_contain(candidate: &Path, path: &Path) -> bool {
    let root = candidate.join(WORKSPACE_DIR_NAME);
    let root = std::path::absolute(&root).unwrap_or(root);
    let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    path.starts_with(root)
}

// A real directory holding nothing but `frames/` and `result/` directories.
fn is_scratch_shaped(root: &Path) -> bool {
    let is_real_dir = fs::symlink_metadata(root).is_ok_and(|m| m.is_dir());
    if !is_real_dir {
        return false;
    }
    let Ok(mut entries) = fs::read_dir(root) else {
        return false;
    };
    entries.all(|entry| {
        entry.is_ok_and(|e| {
            let known = e.file_name() == FRAMES_DIR_NAME || e.file_name() == RESULT_DIR_NAME;
            known && e.file_type().is_ok_and(|t| t.is_dir())
        })
    })
}

fn remove_tree(root: &Path) -> BootAnimResult<()> {
    match fs::remove_dir_all(root) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BootAnimError::filesystem("remove workspace", root, e)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/workspace/scratch.rs"]
mod tests;
