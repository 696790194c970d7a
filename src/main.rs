use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubescript::cli::{Cli, Commands, OutputFormat};
use tubescript::config::Config;
use tubescript::transcript::{normalize_transcript, Transcript, TranscriptOutcome, TranscriptService};
use tubescript::{output, utils, AppError, RawTranscript};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "tubescript=debug" } else { "tubescript=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Fetch {
            video,
            output,
            format,
            timestamps,
        } => {
            let config = Config::load(cli.config.as_deref()).await?;
            let video_id = utils::extract_video_id(&video)
                .map_err(|e| AppError::InvalidVideoReference(e.to_string()))?;
            let service = TranscriptService::from_config(&config)?;

            tracing::info!("Fetching transcript for video: {}", video_id);

            let progress = spinner(cli.quiet, &video_id);
            let outcome = service.get_video_transcript(&video_id).await;

            let transcript = match outcome {
                TranscriptOutcome::Transcript(transcript) => {
                    progress.finish_and_clear();
                    transcript
                }
                TranscriptOutcome::Failure(message) => {
                    progress.finish_and_clear();
                    return Err(AppError::TranscriptUnavailable(message).into());
                }
            };

            let format = format.unwrap_or(config.app.default_output_format);
            let timestamps = timestamps || config.app.timestamps;
            write_transcript(&video_id, &transcript, output.as_deref(), &format, timestamps).await?;

            if !cli.quiet {
                eprintln!(
                    "{} {} records, {}",
                    style("✓").green(),
                    transcript.len(),
                    utils::format_duration(transcript.total_duration())
                );
            }
        }
        Commands::Normalize {
            input,
            output,
            format,
            timestamps,
        } => {
            let content = fs_err::read_to_string(&input)
                .with_context(|| format!("Failed to read payload file {}", input.display()))?;
            let payload: serde_json::Value =
                serde_json::from_str(&content).map_err(|e| AppError::InvalidPayload {
                    path: input.display().to_string(),
                    reason: e.to_string(),
                })?;

            let transcript = normalize_transcript(RawTranscript::Json(payload));
            if transcript.is_empty() {
                tracing::warn!("No caption records could be recovered from {}", input.display());
            }

            let label = payload_label(&input);
            write_transcript(&label, &transcript, output.as_deref(), &format, timestamps).await?;
        }
        Commands::Config { show } => {
            let config = Config::load(cli.config.as_deref()).await?;
            if show {
                config.display();
            } else {
                let path = match cli.config {
                    Some(path) => path,
                    None => Config::config_path()?,
                };
                println!("Configuration file: {}", path.display());
                println!("Edit it to change languages, HTTP settings and client capabilities.");
            }
        }
        Commands::Languages => {
            let config = Config::load(cli.config.as_deref()).await?;
            println!("Languages tried per strategy:");
            println!("  1. Direct fetch:       {}", config.languages.preferred.join(", "));
            println!("  2. List transcripts:   {}", config.languages.listing.join(", "));
            println!("  3. Instance client:    {}", config.languages.listing.join(", "));
            println!("  4. Extended languages: {}", config.languages.extended.join(", "));
        }
    }

    Ok(())
}

fn spinner(quiet: bool, video_id: &str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        progress.set_style(style);
    }
    progress.set_message(format!("Retrieving captions for {}...", video_id));
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

async fn write_transcript(
    video_id: &str,
    transcript: &Transcript,
    output: Option<&Path>,
    format: &OutputFormat,
    timestamps: bool,
) -> Result<()> {
    match output {
        Some(path) => {
            output::save_to_file(video_id, transcript, path, format, timestamps).await?;
            println!("Transcript saved to: {}", path.display());
        }
        None => output::print_to_console(video_id, transcript, format, timestamps)?,
    }
    Ok(())
}

fn payload_label(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}
