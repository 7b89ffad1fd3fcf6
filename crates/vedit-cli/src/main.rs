//! Command-line driver for the processing orchestrator.
//!
//! Uploads an artifact, runs one operation against it, reports progress to
//! the log, and downloads the result(s) on completion.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vedit_client::{BackendClient, BackendConfig};
use vedit_models::{
    BackgroundMode, BackgroundSettings, BackgroundTarget, GazeSettings, Operation, ScaleFactor,
    SilenceSettings, Stage, SubtitleSettings, UpscaleQuality, UpscaleSettings,
};
use vedit_session::{PollerConfig, ProcessingSession};

#[derive(Parser)]
#[command(name = "vedit", about = "Run a media-processing operation against the vedit backend")]
struct Cli {
    /// Input video file
    input: PathBuf,

    /// Backend base URL (overrides VEDIT_BACKEND_URL)
    #[arg(long)]
    backend_url: Option<String>,

    /// Directory for downloaded results (defaults to the input's directory)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    #[command(subcommand)]
    operation: OperationCommand,
}

#[derive(Subcommand)]
enum OperationCommand {
    /// Cut silent passages out of the audio track
    RemoveSilence {
        /// Silence threshold in dBFS
        #[arg(long, default_value_t = -30.0)]
        threshold_db: f32,
        /// Frames of margin kept around each cut
        #[arg(long, default_value_t = 6)]
        frame_margin: u32,
    },
    /// Segment the speaker out of the background
    RemoveBackground {
        /// Trade quality for speed
        #[arg(long)]
        fast: bool,
        /// Replace the background with a solid color (hex)
        #[arg(long, conflicts_with = "image")]
        color: Option<String>,
        /// Replace the background with an image reference
        #[arg(long)]
        image: Option<String>,
    },
    /// Transcribe speech into a subtitle track
    GenerateSubtitles {
        /// Transcription language tag (e.g. pt, pt-BR, en)
        #[arg(long, default_value = "pt")]
        language: String,
    },
    /// Increase resolution with a super-resolution model
    UpscaleVideo {
        /// Scale factor, 2 or 4
        #[arg(long, default_value_t = 2)]
        factor: u8,
        /// Model name, "auto" lets the backend pick
        #[arg(long, default_value = "auto")]
        model: String,
        /// Output quality: low, medium or high
        #[arg(long, default_value = "high")]
        quality: String,
    },
    /// Re-aim the speaker's gaze
    RedirectGaze {
        /// Horizontal target in [-1.0, 1.0]; 0.0 looks at the camera
        #[arg(long, default_value_t = 0.0)]
        direction: f32,
    },
}

impl OperationCommand {
    fn into_operation(self) -> anyhow::Result<Operation> {
        Ok(match self {
            OperationCommand::RemoveSilence {
                threshold_db,
                frame_margin,
            } => Operation::RemoveSilence(SilenceSettings {
                silence_threshold_db: threshold_db,
                frame_margin,
            }),
            OperationCommand::RemoveBackground { fast, color, image } => {
                let background_target = match (color, image) {
                    (Some(hex), _) => BackgroundTarget::Color(hex),
                    (None, Some(path)) => BackgroundTarget::Image(path),
                    (None, None) => BackgroundTarget::Transparent,
                };
                Operation::RemoveBackground(BackgroundSettings {
                    mode: if fast {
                        BackgroundMode::Fast
                    } else {
                        BackgroundMode::Quality
                    },
                    background_target,
                })
            }
            OperationCommand::GenerateSubtitles { language } => {
                Operation::GenerateSubtitles(SubtitleSettings::new(&language))
            }
            OperationCommand::UpscaleVideo {
                factor,
                model,
                quality,
            } => {
                let scale_factor = match factor {
                    2 => ScaleFactor::X2,
                    4 => ScaleFactor::X4,
                    other => bail!("Unsupported scale factor {} (expected 2 or 4)", other),
                };
                let quality = match quality.as_str() {
                    "low" => UpscaleQuality::Low,
                    "medium" => UpscaleQuality::Medium,
                    "high" => UpscaleQuality::High,
                    other => bail!("Unknown quality '{}' (expected low, medium or high)", other),
                };
                Operation::UpscaleVideo(UpscaleSettings {
                    scale_factor,
                    model,
                    quality,
                })
            }
            OperationCommand::RedirectGaze { direction } => {
                Operation::RedirectGaze(GazeSettings::new(direction))
            }
        })
    }
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("vedit=info".parse().expect("valid directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

fn file_name(path: &Path) -> anyhow::Result<&str> {
    path.file_name()
        .and_then(|n| n.to_str())
        .context("Input path has no usable file name")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let mut config = BackendConfig::from_env();
    if let Some(url) = &cli.backend_url {
        config.base_url = url.clone();
    }
    let client = BackendClient::new(config);
    let mut session = ProcessingSession::new(client, PollerConfig::from_env());

    if !session.check_backend().await {
        bail!("Backend is not available; is the processing server running?");
    }

    let artifact_name = file_name(&cli.input)?.to_string();
    let bytes = tokio::fs::read(&cli.input)
        .await
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    info!(artifact = %artifact_name, size = bytes.len(), "Uploading");
    session.create_session(&artifact_name, bytes).await?;

    let operation = cli.operation.into_operation()?;
    info!(operation = %operation, "Submitting");
    let handle = session.submit(operation).await?;

    let mut updates = handle.subscribe();
    let final_status = loop {
        let status = updates.borrow_and_update().clone();
        info!(
            stage = %status.stage,
            progress = status.progress,
            "{}",
            status.message
        );
        if status.is_terminal() {
            break status;
        }
        if updates.changed().await.is_err() {
            break handle.status();
        }
    };

    if final_status.stage == Stage::Error {
        bail!("Processing failed: {}", final_status.message);
    }

    let result = session
        .result()
        .context("Job completed but no result is available")?;

    let out_dir = cli
        .out_dir
        .clone()
        .or_else(|| cli.input.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    tokio::fs::create_dir_all(&out_dir)
        .await
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let video_out = out_dir.join(format!("processed_{}", artifact_name));
    let client = session.client();
    let written = client.download_to(&result.video_url, &video_out).await?;
    info!(path = %video_out.display(), bytes = written, "Saved processed video");

    if let Some(subtitles_url) = &result.subtitles_url {
        let stem = cli
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("video");
        let srt_out = out_dir.join(format!("subtitles_{}.srt", stem));
        match client.download_to(subtitles_url, &srt_out).await {
            Ok(written) => info!(path = %srt_out.display(), bytes = written, "Saved subtitles"),
            Err(e) => warn!("Failed to download subtitles: {}", e),
        }
    }

    Ok(())
}
