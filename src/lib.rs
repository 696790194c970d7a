//! Tubescript - retrieve and normalize YouTube caption transcripts
//!
//! This library fetches a video's captions through several retrieval strategies,
//! normalizes whatever payload shape comes back into timed records, and turns
//! failures into a single readable diagnostic.

pub mod cli;
pub mod config;
pub mod output;
pub mod service;
pub mod transcript;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use service::{RawTranscript, ServiceError, TranscriptApi};
pub use transcript::{get_video_transcript, Transcript, TranscriptOutcome, TranscriptRecord, TranscriptService};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the command line front end
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid video reference: {0}")]
    InvalidVideoReference(String),

    #[error("Transcript unavailable: {0}")]
    TranscriptUnavailable(String),

    #[error("Payload file {path} is not valid JSON: {reason}")]
    InvalidPayload { path: String, reason: String },
}
