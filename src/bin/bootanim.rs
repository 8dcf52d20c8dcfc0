use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{CommandFactory as _, Parser, ValueEnum, error::ErrorKind};

#[derive(Parser, Debug)]
#[command(
    name = "bootanim",
    version,
    about = "Convert a video into a boot animation archive (desc.txt + partN frame folders)"
)]
struct Cli {
    /// Input video path.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output bootanimation.zip path; a path without an extension is treated as a directory.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output resolution as <width>x<height> (e.g. 1080x2400).
    #[arg(short, long)]
    resolution: Option<String>,

    /// Frames per second.
    #[arg(short, long)]
    fps: Option<String>,

    /// Write the offset-annotated descriptor (`g w h x y fps`) used by OxygenOS.
    #[arg(long)]
    oos: bool,

    /// Pixel offset for --oos.
    #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
    offset: Option<Vec<i32>>,

    /// Custom ffmpeg binary path.
    #[arg(long, env = "FFMPEG_PATH")]
    ffmpeg: Option<PathBuf>,

    /// Custom zip binary path.
    #[arg(long, env = "ZIP_PATH")]
    zip: Option<PathBuf>,

    /// Write the archive in-process instead of invoking zip.
    #[arg(long, conflicts_with = "zip")]
    builtin_zip: bool,

    /// Frame image format (jpg or png).
    #[arg(long = "frames", value_name = "FORMAT")]
    frame_format: Option<String>,

    /// Playback directive written for every part.
    #[arg(long, value_enum, default_value_t = ModeChoice::PlayFull)]
    mode: ModeChoice,

    /// Background color for every part (#RRGGBB or #RGB).
    #[arg(long)]
    background: Option<String>,

    /// Cut the soundtrack into an audio.wav per part.
    #[arg(long)]
    with_audio: bool,

    /// Maximum frames per part directory.
    #[arg(long, value_name = "N")]
    max_frames: Option<usize>,

    /// Print the build report as JSON instead of the summary line.
    #[arg(long)]
    json: bool,

    /// Silence ffmpeg/zip output and only log warnings.
    #[arg(short, long)]
    quiet: bool,

    /// Log every pipeline stage.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    /// Play each part once even if boot completes (`c 1 0`).
    PlayFull,
    /// Stop as soon as boot completes (`p 1 0`).
    StopOnBoot,
    /// Loop until boot completes (`c 0 0`).
    Loop,
}

impl Cli {
    fn into_raw(self) -> bootanim::RawConfig {
        let offset = match self.offset.as_deref() {
            Some(&[x, y]) => bootanim::Offset { x, y },
            _ => bootanim::Offset::default(),
        };
        let playback = match self.mode {
            ModeChoice::PlayFull => bootanim::PlaybackMode::PlayFull,
            ModeChoice::StopOnBoot => bootanim::PlaybackMode::StopOnBoot,
            ModeChoice::Loop => bootanim::PlaybackMode::LoopInfinite,
        };

        bootanim::RawConfig {
            input: self.input,
            output: self.output,
            resolution: self.resolution,
            fps: self.fps,
            frame_format: self.frame_format,
            offset_annotated: self.oos,
            offset,
            ffmpeg: self.ffmpeg,
            zip: self.zip,
            builtin_zip: self.builtin_zip,
            quiet: self.quiet,
            playback,
            background: self.background,
            max_frames_per_part: self.max_frames,
            with_audio: self.with_audio,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    init_tracing(cli.quiet, cli.verbose);

    match try_main(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{}", Cli::command().render_usage());
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: Cli) -> anyhow::Result<()> {
    let json = cli.json;
    let report = bootanim::run(cli.into_raw())?;

    if json {
        let out = serde_json::to_string_pretty(&report).context("serialize build report")?;
        println!("{out}");
    } else {
        println!(
            "Bootanimation created successfully at: {}",
            report.output.display()
        );
    }
    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) {
    let level = if quiet {
        tracing::Level::WARN
    } else if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
