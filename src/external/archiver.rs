use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::assemble::descriptor::DESCRIPTOR_FILE_NAME;
use crate::assemble::partition::compare_frame_names;
use crate::foundation::error::{BootAnimError, BootAnimResult};

/// Packs a finished archive root into a zip file.
///
/// Contract: every entry under `source_dir` is stored (no compression) with its path relative
/// to `source_dir`, and a pre-existing file at `dest` is replaced. Failure is reported as
/// [`BootAnimError::Archiving`] (or `Filesystem` for local IO).
pub trait Archiver {
    fn archive(&self, source_dir: &Path, dest: &Path) -> BootAnimResult<()>;
}

pub fn ensure_parent_dir(path: &Path) -> BootAnimResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| BootAnimError::filesystem("create output directory", parent, e))?;
    }
    Ok(())
}

fn remove_existing(dest: &Path) -> BootAnimResult<()> {
    match fs::remove_file(dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BootAnimError::filesystem("replace existing archive", dest, e)),
    }
}

/// [`Archiver`] backed by the system `zip` binary (`zip -r -0`).
#[derive(Clone, Debug)]
pub struct ZipToolArchiver {
    program: PathBuf,
    quiet: bool,
}

impl ZipToolArchiver {
    pub fn new(program: impl Into<PathBuf>, quiet: bool) -> Self {
        Self {
            program: program.into(),
            quiet,
        }
    }

    /// Build the `zip` invocation without running it. `dest` must be absolute since the tool
    /// runs inside `source_dir`.
    pub fn command(&self, source_dir: &Path, dest: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(source_dir).stdin(Stdio::null());
        if self.quiet {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
            cmd.arg("-q");
        }
        cmd.args(["-r", "-0"]).arg(dest).arg(".");
        cmd
    }
}

impl Archiver for ZipToolArchiver {
    fn archive(&self, source_dir: &Path, dest: &Path) -> BootAnimResult<()> {
        let dest = std::path::absolute(dest)
            .map_err(|e| BootAnimError::filesystem("resolve output path", dest, e))?;
        ensure_parent_dir(&dest)?;
        // `zip` updates an existing archive in place instead of replacing it.
        remove_existing(&dest)?;

        let status = self.command(source_dir, &dest).status().map_err(|e| {
            BootAnimError::archiving(format!("failed to run '{}': {e}", self.program.display()))
        })?;
        if !status.success() {
            return Err(BootAnimError::archiving(format!(
                "'{}' exited with {status} while writing '{}'",
                self.program.display(),
                dest.display()
            )));
        }
        Ok(())
    }
}

/// In-process [`Archiver`] writing a store-only zip with the `zip` crate.
///
/// Entry order is deterministic (`desc.txt` first, then directories and files in natural
/// order) and timestamps are fixed, so identical trees produce identical archives.
#[derive(Clone, Copy, Debug, Default)]
pub struct StoredZipArchiver;

impl StoredZipArchiver {
    fn options() -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644)
    }

    fn write_tree<W: Write + Seek>(
        zip: &mut ZipWriter<W>,
        dir: &Path,
        prefix: &str,
    ) -> BootAnimResult<()> {
        for path in sorted_entries(dir)? {
            let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
                BootAnimError::archiving(format!(
                    "entry name is not valid UTF-8: '{}'",
                    path.display()
                ))
            })?;
            let entry_name = format!("{prefix}{name}");

            if path.is_dir() {
                let dir_name = format!("{entry_name}/");
                zip.add_directory(dir_name.as_str(), Self::options().unix_permissions(0o755))
                    .map_err(|e| {
                        BootAnimError::archiving(format!("add directory '{dir_name}': {e}"))
                    })?;
                Self::write_tree(zip, &path, &dir_name)?;
            } else {
                zip.start_file(entry_name.as_str(), Self::options())
                    .map_err(|e| {
                        BootAnimError::archiving(format!("add file '{entry_name}': {e}"))
                    })?;
                let mut src = File::open(&path)
                    .map_err(|e| BootAnimError::filesystem("read archive entry", &path, e))?;
                std::io::copy(&mut src, zip)
                    .map_err(|e| BootAnimError::filesystem("read archive entry", &path, e))?;
            }
        }
        Ok(())
    }
}

impl Archiver for StoredZipArchiver {
    fn archive(&self, source_dir: &Path, dest: &Path) -> BootAnimResult<()> {
        ensure_parent_dir(dest)?;
        let file = File::create(dest)
            .map_err(|e| BootAnimError::filesystem("create archive", dest, e))?;

        let mut zip = ZipWriter::new(BufWriter::new(file));
        let written = Self::write_tree(&mut zip, source_dir, "").and_then(|()| {
            let mut inner = zip
                .finish()
                .map_err(|e| BootAnimError::archiving(format!("finalize archive: {e}")))?;
            inner
                .flush()
                .map_err(|e| BootAnimError::filesystem("write archive", dest, e))
        });

        if written.is_err() {
            let _ = fs::remove_file(dest);
        }
        written
    }
}

/// Children of `dir` with `desc.txt` first and the rest in natural name order.
fn sorted_entries(dir: &Path) -> BootAnimResult<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .and_then(|rd| rd.map(|e| e.map(|e| e.path())).collect::<Result<Vec<_>, _>>())
        .map_err(|e| BootAnimError::filesystem("read directory", dir, e))?;
    entries.sort_by(|a, b| {
        let a_desc = a.file_name().is_some_and(|n| n == DESCRIPTOR_FILE_NAME);
        let b_desc = b.file_name().is_some_and(|n| n == DESCRIPTOR_FILE_NAME);
        b_desc
            .cmp(&a_desc)
            .then_with(|| compare_frame_names(a, b))
    });
    Ok(entries)
}

#[cfg(test)]
#[path = "../../tests/unit/external/archiver.rs"]
mod tests;
