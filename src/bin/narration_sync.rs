use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use narration_sync::captions::chunker::chunk_units;
use narration_sync::{
    caption_structure, compute_timeline_report, CaptionConfig, CaptionEngineBuilder,
    ChunkingConfig, WordTiming,
};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[path = "narration_sync/json_formatter.rs"]
mod json_formatter;
#[path = "narration_sync/srt_formatter.rs"]
mod srt_formatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Srt,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Profile {
    /// Short chunks for portrait video.
    Vertical,
    /// Longer chunks for landscape video.
    Widescreen,
}

impl Profile {
    fn chunking(self) -> ChunkingConfig {
        match self {
            Self::Vertical => ChunkingConfig::vertical(),
            Self::Widescreen => ChunkingConfig::widescreen(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Granularity {
    /// Short caption chunks through the timing cascade.
    Captions,
    /// One timeline entry per narration unit, subtitled unit by unit.
    Scenes,
}

#[derive(Debug, Parser)]
#[command(name = "narration_sync")]
#[command(about = "Time narration text against synthesized audio and emit captions")]
struct Args {
    /// Narration text, optionally with `[n]` scene markers.
    #[arg(env = "NARRATION_SYNC_SCRIPT")]
    script: PathBuf,
    /// Duration of the synthesized narration audio, in seconds.
    #[arg(long, env = "NARRATION_SYNC_DURATION")]
    duration: f64,
    /// Recognizer word timings (JSON: `{"words": [...]}` or a bare array).
    #[arg(long, env = "NARRATION_SYNC_WORDS")]
    words: Option<PathBuf>,
    /// Chunking profile; overrides the chunking section of `--config`.
    #[arg(long, env = "NARRATION_SYNC_PROFILE", value_enum)]
    profile: Option<Profile>,
    /// JSON configuration; missing fields keep their defaults.
    #[arg(long, env = "NARRATION_SYNC_CONFIG")]
    config: Option<PathBuf>,
    #[arg(
        long,
        env = "NARRATION_SYNC_FORMAT",
        value_enum,
        default_value_t = OutputFormat::Srt
    )]
    format: OutputFormat,
    #[arg(
        long,
        env = "NARRATION_SYNC_GRANULARITY",
        value_enum,
        default_value_t = Granularity::Captions
    )]
    granularity: Granularity,
    /// Output file; stdout when omitted.
    #[arg(long, env = "NARRATION_SYNC_OUT")]
    out: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecognizerOutput {
    Wrapped { words: Vec<WordTiming> },
    Bare(Vec<WordTiming>),
}

impl RecognizerOutput {
    fn into_words(self) -> Vec<WordTiming> {
        match self {
            Self::Wrapped { words } | Self::Bare(words) => words,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => CaptionConfig::load(path).map_err(|err| err.to_string())?,
        None => CaptionConfig::default(),
    };
    if let Some(profile) = args.profile {
        config.chunking = profile.chunking();
    }
    let engine = CaptionEngineBuilder::new(config)
        .build()
        .map_err(|err| err.to_string())?;

    let text = fs::read_to_string(&args.script)
        .map_err(|err| format!("Failed to read script '{}': {err}", args.script.display()))?;
    let words = args.words.as_deref().map(load_words).transpose()?;

    let rendered = match args.granularity {
        Granularity::Captions => {
            let captions = engine
                .produce_captions(&text, args.duration, words.as_deref())
                .map_err(|err| err.to_string())?;
            tracing::info!(
                tier = captions.tier.as_str(),
                chunks = captions.chunks.len(),
                "captions produced"
            );
            match args.format {
                OutputFormat::Srt => srt_formatter::render_srt(&captions.chunks),
                OutputFormat::Json => {
                    json_formatter::render_json(&json_formatter::CaptionDocument {
                        audio_duration: args.duration,
                        tier: Some(captions.tier),
                        structure: caption_structure(&captions.chunks, args.duration),
                        chunks: &captions.chunks,
                        timeline: None,
                    })?
                }
            }
        }
        Granularity::Scenes => {
            let units = engine
                .time_units(&text, args.duration, words.as_deref())
                .map_err(|err| err.to_string())?;
            let chunks = chunk_units(&units, &engine.config().chunking);
            let timeline = compute_timeline_report(&units, args.duration);
            tracing::info!(
                units = timeline.unit_count,
                aligned = timeline.aligned_unit_count,
                fallback = timeline.fallback_unit_count,
                mean_match_quality = format!("{:.2}", timeline.mean_match_quality),
                "scene timeline produced"
            );
            match args.format {
                OutputFormat::Srt => srt_formatter::render_srt(&chunks),
                OutputFormat::Json => {
                    json_formatter::render_json(&json_formatter::CaptionDocument {
                        audio_duration: args.duration,
                        tier: None,
                        structure: caption_structure(&chunks, args.duration),
                        chunks: &chunks,
                        timeline: Some(timeline),
                    })?
                }
            }
        }
    };

    write_output(args.out.as_deref(), &rendered)
}

fn load_words(path: &Path) -> Result<Vec<WordTiming>, String> {
    let data = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read word timings '{}': {err}", path.display()))?;
    let output: RecognizerOutput = serde_json::from_str(&data)
        .map_err(|err| format!("Failed to parse word timings '{}': {err}", path.display()))?;
    Ok(output.into_words())
}

fn write_output(path: Option<&Path>, contents: &str) -> Result<(), String> {
    let Some(path) = path else {
        let mut stdout = std::io::stdout().lock();
        return stdout
            .write_all(contents.as_bytes())
            .map_err(|err| format!("Failed to write output: {err}"));
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create output directory '{}': {err}",
                parent.display()
            )
        })?;
    }
    fs::write(path, contents)
        .map_err(|err| format!("Failed to write output '{}': {err}", path.display()))
}
