use std::cell::Cell;
use std::path::Path;

use crate::workspace::scratch::WORKSPACE_DIR_NAME;

use super::*;

struct FakeExtractor {
    frames: usize,
    calls: Cell<usize>,
}

impl FakeExtractor {
    fn new(frames: usize) -> Self {
        Self {
            frames,
            calls: Cell::new(0),
        }
    }
}

impl FrameExtractor for FakeExtractor {
    fn extract(&self, req: &ExtractRequest<'_>) -> BootAnimResult<()> {
        self.calls.set(self.calls.get() + 1);
        for i in 1..=self.frames {
            let name = format!("{i:06}.{}", req.format.extension());
            std::fs::write(req.dest_dir.join(name), i.to_string()).unwrap();
        }
        Ok(())
    }
}

struct FailingExtractor;

impl FrameExtractor for FailingExtractor {
    fn extract(&self, req: &ExtractRequest<'_>) -> BootAnimResult<()> {
        std::fs::write(req.dest_dir.join("000001.jpg"), b"partial").unwrap();
        Err(BootAnimError::extraction("decoder exited with status 1"))
    }
}

struct FailingArchiver;

impl Archiver for FailingArchiver {
    fn archive(&self, source_dir: &Path, _dest: &Path) -> BootAnimResult<()> {
        assert!(source_dir.join("desc.txt").is_file());
        Err(BootAnimError::archiving("zip exited with status 12"))
    }
}

struct Env {
    dir: tempfile::TempDir,
    config: Config,
}

impl Env {
    fn roots(&self) -> Vec<PathBuf> {
        vec![self.dir.path().to_path_buf()]
    }

    fn scratch(&self) -> PathBuf {
        self.dir.path().join(WORKSPACE_DIR_NAME)
    }
}

fn env() -> Env {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("in.mp4");
    let ffmpeg = dir.path().join("ffmpeg");
    std::fs::write(&video, b"").unwrap();
    std::fs::write(&ffmpeg, b"").unwrap();

    let config = RawConfig {
        input: Some(video),
        output: Some(dir.path().join("out/bootanimation.zip")),
        resolution: Some("1080x2400".to_string()),
        fps: Some("30".to_string()),
        ffmpeg: Some(ffmpeg),
        builtin_zip: true,
        ..RawConfig::default()
    }
    .validate_with_path(None)
    .unwrap();

    Env { dir, config }
}

#[test]
fn successful_run_reports_parts_and_cleans_up() {
    let env = env();
    let extractor = FakeExtractor::new(5);
    let report = assemble(&env.config, &env.roots(), &extractor, &StoredZipArchiver).unwrap();

    assert_eq!(extractor.calls.get(), 1);
    assert_eq!(report.output, env.config.output());
    assert_eq!(report.frame_count, 5);
    assert_eq!(
        report.parts,
        vec![Part {
            index: 0,
            frame_count: 5
        }]
    );
    assert_eq!(report.descriptor, "1080 2400 30\nc 1 0 part0\n");
    assert!(env.config.output().is_file());
    assert!(!env.scratch().exists());
}

#[test]
fn extraction_failure_is_surfaced_and_cleaned_up() {
    let env = env();
    let err = assemble(&env.config, &env.roots(), &FailingExtractor, &StoredZipArchiver)
        .unwrap_err();
    assert!(matches!(err, BootAnimError::Extraction(_)), "{err}");
    assert!(!env.scratch().exists());
    assert!(!env.config.output().exists());
}

#[test]
fn empty_frame_sequence_is_surfaced_and_cleaned_up() {
    let env = env();
    let err = assemble(
        &env.config,
        &env.roots(),
        &FakeExtractor::new(0),
        &StoredZipArchiver,
    )
    .unwrap_err();
    assert!(matches!(err, BootAnimError::EmptyFrameSequence), "{err}");
    assert!(!env.scratch().exists());
}

#[test]
fn archiving_failure_is_surfaced_and_cleaned_up() {
    let env = env();
    let err = assemble(
        &env.config,
        &env.roots(),
        &FakeExtractor::new(3),
        &FailingArchiver,
    )
    .unwrap_err();
    assert!(matches!(err, BootAnimError::Archiving(_)), "{err}");
    assert!(err.to_string().contains("status 12"));
    assert!(!env.scratch().exists());
}

#[test]
fn no_writable_root_fails_before_extraction() {
    let env = env();
    let extractor = FakeExtractor::new(3);
    let roots = vec![
        env.dir.path().join("missing-cwd"),
        env.dir.path().join("missing-parent"),
    ];
    let err = assemble(&env.config, &roots, &extractor, &StoredZipArchiver).unwrap_err();

    assert!(matches!(err, BootAnimError::Environment(_)), "{err}");
    assert_eq!(extractor.calls.get(), 0);
}

#[test]
fn stages_are_ordered_and_named() {
    assert!(Stage::Idle < Stage::Validated);
    assert!(Stage::DescriptorWritten < Stage::Archived);
    assert_eq!(Stage::FramesExtracted.to_string(), "frames-extracted");
}

struct SliceRecorder {
    fail_part: Option<usize>,
    seen: std::cell::RefCell<Vec<(usize, f64, f64)>>,
}

impl AudioExtractor for SliceRecorder {
    fn extract_segment(&self, seg: &AudioSegment<'_>) -> BootAnimResult<()> {
        self.seen
            .borrow_mut()
            .push((seg.part_index, seg.start_secs, seg.duration_secs));
        if self.fail_part == Some(seg.part_index) {
            std::fs::write(seg.dest, b"truncated").unwrap();
            return Err(BootAnimError::extraction("no audio stream"));
        }
        assert!(seg.dest.parent().unwrap().is_dir());
        std::fs::write(seg.dest, b"RIFF").unwrap();
        Ok(())
    }
}

fn env_with_capacity(capacity: usize) -> Env {
    let env = env();
    let dir = env.dir.path();
    let config = RawConfig {
        input: Some(dir.join("in.mp4")),
        output: Some(dir.join("out/bootanimation.zip")),
        resolution: Some("1080x2400".to_string()),
        fps: Some("10".to_string()),
        ffmpeg: Some(dir.join("ffmpeg")),
        builtin_zip: true,
        with_audio: true,
        max_frames_per_part: Some(capacity),
        ..RawConfig::default()
    }
    .validate_with_path(None)
    .unwrap();
    Env { config, ..env }
}

#[test]
fn audio_slices_follow_part_frame_counts() {
    let env = env_with_capacity(4);
    let audio = SliceRecorder {
        fail_part: None,
        seen: Default::default(),
    };
    let report = assemble_with_audio(
        &env.config,
        &env.roots(),
        &FakeExtractor::new(10),
        &audio,
        &StoredZipArchiver,
    )
    .unwrap();

    assert_eq!(
        *audio.seen.borrow(),
        vec![(0, 0.0, 0.4), (1, 0.4, 0.4), (2, 0.8, 0.2)]
    );
    assert_eq!(report.audio_parts, vec![0, 1, 2]);

    let zip = zip::ZipArchive::new(std::fs::File::open(env.config.output()).unwrap()).unwrap();
    let names: Vec<&str> = zip.file_names().collect();
    for part in ["part0", "part1", "part2"] {
        assert!(names.contains(&format!("{part}/audio.wav").as_str()), "{names:?}");
    }
}

#[test]
fn failed_audio_slice_is_skipped_not_fatal() {
    let env = env_with_capacity(4);
    let audio = SliceRecorder {
        fail_part: Some(1),
        seen: Default::default(),
    };
    let report = assemble_with_audio(
        &env.config,
        &env.roots(),
        &FakeExtractor::new(10),
        &audio,
        &StoredZipArchiver,
    )
    .unwrap();

    assert_eq!(report.audio_parts, vec![0, 2]);
    let zip = zip::ZipArchive::new(std::fs::File::open(env.config.output()).unwrap()).unwrap();
    assert!(zip.file_names().all(|n| n != "part1/audio.wav"));
    assert!(!env.scratch().exists());
}

#[test]
fn plain_assemble_skips_audio() {
    let env = env_with_capacity(4);
    let report = assemble(
        &env.config,
        &env.roots(),
        &FakeExtractor::new(5),
        &StoredZipArchiver,
    )
    .unwrap();
    assert!(report.audio_parts.is_empty());
}
