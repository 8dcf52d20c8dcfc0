use std::fmt;
use std::path::PathBuf;

use crate::assemble::descriptor::Descriptor;
use crate::assemble::partition::{Part, collect_frames, partition_frames};
use crate::config::model::{ArchiverChoice, Config, RawConfig};
use crate::external::archiver::{Archiver, StoredZipArchiver, ZipToolArchiver};
use crate::external::audio::{
    AUDIO_FILE_NAME, AudioExtractor, AudioSegment, FfmpegAudioExtractor, segment_timings,
};
use crate::external::extractor::{ExtractRequest, FfmpegExtractor, FrameExtractor};
use crate::foundation::error::{BootAnimError, BootAnimResult};
use crate::workspace::scratch::{Workspace, candidate_roots};

/// Pipeline progress, in execution order. There are no back-edges; any stage may fail, after
/// which the workspace is released and the failure returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Idle,
    Validated,
    WorkspaceAcquired,
    FramesExtracted,
    Partitioned,
    AudioSliced,
    DescriptorWritten,
    Archived,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Validated => "validated",
            Self::WorkspaceAcquired => "workspace-acquired",
            Self::FramesExtracted => "frames-extracted",
            Self::Partitioned => "partitioned",
            Self::AudioSliced => "audio-sliced",
            Self::DescriptorWritten => "descriptor-written",
            Self::Archived => "archived",
        };
        f.write_str(s)
    }
}

/// Outcome of a successful run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct BuildReport {
    /// Archive written.
    pub output: PathBuf,
    /// Frames produced by the extractor.
    pub frame_count: usize,
    /// Parts in archive order.
    pub parts: Vec<Part>,
    /// Parts that received an `audio.wav` slice.
    pub audio_parts: Vec<usize>,
    /// Exact `desc.txt` contents.
    pub descriptor: String,
}

/// Validate `raw` and build the archive with the system tools, using the current directory
/// and the output's parent as workspace candidates.
pub fn run(raw: RawConfig) -> BootAnimResult<BuildReport> {
    let config = raw.validate()?;
    tracing::debug!(stage = %Stage::Validated, "configuration accepted");
    create_bootanimation(&config)
}

/// Build the archive for an already validated `config` with the adapters it selects.
pub fn create_bootanimation(config: &Config) -> BootAnimResult<BuildReport> {
    let cwd = std::env::current_dir().ok();
    let roots = candidate_roots(cwd.as_deref(), config.output());

    let extractor = FfmpegExtractor::new(config.ffmpeg(), config.quiet());
    let audio = FfmpegAudioExtractor::new(config.ffmpeg(), config.quiet());
    let audio = config
        .with_audio()
        .then_some(&audio as &dyn AudioExtractor);
    match config.archiver() {
        ArchiverChoice::External(zip) => {
            let archiver = ZipToolArchiver::new(zip, config.quiet());
            assemble_stages(config, &roots, &extractor, audio, &archiver)
        }
        ArchiverChoice::Builtin => {
            assemble_stages(config, &roots, &extractor, audio, &StoredZipArchiver)
        }
    }
}

/// Run every stage after validation against explicit workspace `roots` and adapters, without
/// the audio step.
///
/// The scratch workspace is released exactly once whether or not a stage fails. A release
/// failure is only returned when everything else succeeded; otherwise the stage failure is
/// returned and the release failure is logged. Roots whose scratch directory would contain the
/// output archive are skipped.
pub fn assemble(
    config: &Config,
    roots: &[PathBuf],
    extractor: &dyn FrameExtractor,
    archiver: &dyn Archiver,
) -> BootAnimResult<BuildReport> {
    assemble_stages(config, roots, extractor, None, archiver)
}

/// [`assemble`] with an audio step: after partitioning, `audio` cuts one slice per part,
/// sized from the part's frame count, into `partN/audio.wav`.
///
/// A slice that fails is logged and skipped; the part then plays without sound.
pub fn assemble_with_audio(
    config: &Config,
    roots: &[PathBuf],
    extractor: &dyn FrameExtractor,
    audio: &dyn AudioExtractor,
    archiver: &dyn Archiver,
) -> BootAnimResult<BuildReport> {
    assemble_stages(config, roots, extractor, Some(audio), archiver)
}

#[tracing::instrument(skip_all, fields(output = %config.output().display()))]
fn assemble_stages(
    config: &Config,
    roots: &[PathBuf],
    extractor: &dyn FrameExtractor,
    audio: Option<&dyn AudioExtractor>,
    archiver: &dyn Archiver,
) -> BootAnimResult<BuildReport> {
    let workspace = Workspace::acquire_preserving(roots, Some(config.output()))?;
    tracing::info!(
        stage = %Stage::WorkspaceAcquired,
        root = %workspace.root().display(),
        "acquired scratch workspace"
    );

    let mut stage = Stage::WorkspaceAcquired;
    let outcome = run_stages(config, &workspace, extractor, audio, archiver, &mut stage);
    let released = workspace.release();

    match (outcome, released) {
        (Ok(report), Ok(())) => Ok(report),
        (Ok(_), Err(cleanup)) => Err(cleanup),
        (Err(e), Ok(())) => {
            tracing::debug!(%stage, error = %e, "pipeline aborted");
            Err(e)
        }
        (Err(e), Err(cleanup)) => {
            tracing::error!(%stage, error = %cleanup, "failed to remove scratch workspace");
            Err(e)
        }
    }
}

fn run_stages(
    config: &Config,
    workspace: &Workspace,
    extractor: &dyn FrameExtractor,
    audio: Option<&dyn AudioExtractor>,
    archiver: &dyn Archiver,
    stage: &mut Stage,
) -> BootAnimResult<BuildReport> {
    tracing::info!(input = %config.input().display(), "extracting frames");
    extractor.extract(&ExtractRequest {
        input: config.input(),
        resolution: config.resolution(),
        fps: config.fps(),
        format: config.frame_format(),
        dest_dir: workspace.frames_dir(),
    })?;
    let frames = collect_frames(workspace.frames_dir())?;
    if frames.is_empty() {
        return Err(BootAnimError::EmptyFrameSequence);
    }
    advance(stage, Stage::FramesExtracted);

    let parts = partition_frames(&frames, workspace.result_dir(), config.max_frames_per_part())?;
    tracing::info!(frames = frames.len(), parts = parts.len(), "organized frames into parts");
    advance(stage, Stage::Partitioned);

    let audio_parts = match audio {
        Some(audio) => {
            let sliced = attach_audio(config, workspace, &parts, audio);
            advance(stage, Stage::AudioSliced);
            sliced
        }
        None => Vec::new(),
    };

    let mut descriptor = Descriptor::from_config(config);
    descriptor.extend_parts(&parts);
    descriptor.write_to(workspace.result_dir())?;
    advance(stage, Stage::DescriptorWritten);

    tracing::info!("creating archive");
    archiver.archive(workspace.result_dir(), config.output())?;
    advance(stage, Stage::Archived);

    Ok(BuildReport {
        output: config.output().to_path_buf(),
        frame_count: frames.len(),
        parts,
        audio_parts,
        descriptor: descriptor.render(),
    })
}

fn attach_audio(
    config: &Config,
    workspace: &Workspace,
    parts: &[Part],
    audio: &dyn AudioExtractor,
) -> Vec<usize> {
    let counts: Vec<usize> = parts.iter().map(|p| p.frame_count).collect();
    let timings = segment_timings(&counts, config.fps());

    let mut attached = Vec::with_capacity(parts.len());
    for (part, (start_secs, duration_secs)) in parts.iter().zip(timings) {
        let dest = workspace.result_dir().join(part.name()).join(AUDIO_FILE_NAME);
        let segment = AudioSegment {
            input: config.input(),
            part_index: part.index,
            start_secs,
            duration_secs,
            dest: &dest,
        };
        match audio.extract_segment(&segment) {
            Ok(()) => attached.push(part.index),
            Err(e) => {
                tracing::warn!(part = part.index, error = %e, "part will play without audio");
                let _ = std::fs::remove_file(&dest);
            }
        }
    }
    tracing::info!(parts = attached.len(), "attached audio slices");
    attached
}

fn advance(stage: &mut Stage, next: Stage) {
    debug_assert!(next > *stage);
    *stage = next;
    tracing::debug!(stage = %next, "stage complete");
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/orchestrator.rs"]
mod tests;
