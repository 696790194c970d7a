use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod captions;
pub mod youtube;

/// Failure categories reported by the captioning service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The uploader turned captions off for the video
    TranscriptsDisabled,
    /// Captions exist, but not in any of the requested languages
    NoTranscriptFound,
    /// The video has no caption tracks at all
    NoTranscriptAvailable,
    /// The video itself cannot be resolved (removed, private, bad id)
    VideoUnavailable,
    /// Anything else coming out of the network layer
    Unclassified,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::TranscriptsDisabled => "TranscriptsDisabled",
            FailureKind::NoTranscriptFound => "NoTranscriptFound",
            FailureKind::NoTranscriptAvailable => "NoTranscriptAvailable",
            FailureKind::VideoUnavailable => "VideoUnavailable",
            FailureKind::Unclassified => "Unclassified",
        }
    }

    /// Whether asking again (e.g. with another language list) can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::NoTranscriptFound | FailureKind::Unclassified)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by a captioning service client
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("Subtitles are disabled for video {video_id}")]
    TranscriptsDisabled { video_id: String },

    #[error("No transcript found for video {video_id} in languages {requested:?} (available: {available:?})")]
    NoTranscriptFound {
        video_id: String,
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("No transcripts are available for video {video_id}")]
    NoTranscriptAvailable { video_id: String },

    #[error("Video {video_id} is unavailable: {reason}")]
    VideoUnavailable { video_id: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response from captioning service: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Other(String),
}

impl ServiceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ServiceError::TranscriptsDisabled { .. } => FailureKind::TranscriptsDisabled,
            ServiceError::NoTranscriptFound { .. } => FailureKind::NoTranscriptFound,
            ServiceError::NoTranscriptAvailable { .. } => FailureKind::NoTranscriptAvailable,
            ServiceError::VideoUnavailable { .. } => FailureKind::VideoUnavailable,
            ServiceError::Http(_) | ServiceError::InvalidResponse(_) | ServiceError::Other(_) => {
                FailureKind::Unclassified
            }
        }
    }
}

/// Text property of a snippet object
#[derive(Debug, Clone, PartialEq)]
pub enum SnippetText {
    Plain(String),
    /// Some payloads carry the text wrapped in another record
    Nested(Value),
}

/// A caption unit exposed as an object with properties
#[derive(Debug, Clone, PartialEq)]
pub struct Snippet {
    pub text: SnippetText,
    pub start: Option<f64>,
    pub duration: Option<f64>,
}

/// One element of a raw payload, in any of the shapes clients hand back
#[derive(Debug, Clone, PartialEq)]
pub enum RawEntry {
    Map(Map<String, Value>),
    Snippet(Snippet),
    Other(Value),
}

impl From<Value> for RawEntry {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => RawEntry::Map(map),
            other => RawEntry::Other(other),
        }
    }
}

/// Transcript object returned by the instance client
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedTranscript {
    pub video_id: String,
    pub language_code: String,
    pub is_generated: bool,
    pub snippets: Vec<RawEntry>,
}

/// Raw payload returned by a successful retrieval
#[derive(Debug, Clone, PartialEq)]
pub enum RawTranscript {
    /// Plain list of caption records
    Entries(Vec<RawEntry>),
    /// Object wrapping its caption records in `snippets`
    Fetched(FetchedTranscript),
    /// Untyped document, e.g. a payload saved to disk
    Json(Value),
}

impl RawTranscript {
    pub fn is_empty(&self) -> bool {
        match self {
            RawTranscript::Entries(entries) => entries.is_empty(),
            RawTranscript::Fetched(fetched) => fetched.snippets.is_empty(),
            RawTranscript::Json(value) => match value {
                Value::Null => true,
                Value::Bool(b) => !b,
                Value::Number(n) => n.as_f64() == Some(0.0),
                Value::String(s) => s.is_empty(),
                Value::Array(items) => items.is_empty(),
                Value::Object(map) => map.is_empty(),
            },
        }
    }

    /// Short name of the payload shape, used in diagnostics
    pub fn shape_name(&self) -> &'static str {
        match self {
            RawTranscript::Entries(_) => "entries",
            RawTranscript::Fetched(_) => "fetched transcript",
            RawTranscript::Json(Value::Array(_)) => "json array",
            RawTranscript::Json(Value::Object(_)) => "json object",
            RawTranscript::Json(_) => "json scalar",
        }
    }
}

/// Handle to a single caption track of a video
#[async_trait]
pub trait TranscriptTrack: Send + Sync {
    fn language_code(&self) -> &str;

    fn language(&self) -> &str;

    /// True for automatic speech recognition tracks
    fn is_generated(&self) -> bool;

    async fn fetch(&self) -> Result<RawTranscript, ServiceError>;
}

/// All caption tracks available for a video, in service order
pub struct TrackList {
    video_id: String,
    tracks: Vec<Box<dyn TranscriptTrack>>,
}

impl TrackList {
    pub fn new(video_id: impl Into<String>, tracks: Vec<Box<dyn TranscriptTrack>>) -> Self {
        Self {
            video_id: video_id.into(),
            tracks,
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn TranscriptTrack> {
        self.tracks.iter().map(|track| track.as_ref())
    }

    /// Find a track in the first matching language, manual tracks first
    pub fn find_transcript(&self, languages: &[String]) -> Result<&dyn TranscriptTrack, ServiceError> {
        self.find_manually_created_transcript(languages)
            .or_else(|_| self.find_generated_transcript(languages))
    }

    pub fn find_manually_created_transcript(
        &self,
        languages: &[String],
    ) -> Result<&dyn TranscriptTrack, ServiceError> {
        self.find(languages, |track| !track.is_generated())
    }

    pub fn find_generated_transcript(&self, languages: &[String]) -> Result<&dyn TranscriptTrack, ServiceError> {
        self.find(languages, |track| track.is_generated())
    }

    fn find<F>(&self, languages: &[String], accept: F) -> Result<&dyn TranscriptTrack, ServiceError>
    where
        F: Fn(&dyn TranscriptTrack) -> bool,
    {
        languages
            .iter()
            .find_map(|code| {
                self.iter()
                    .find(|track| track.language_code() == code && accept(*track))
            })
            .ok_or_else(|| ServiceError::NoTranscriptFound {
                video_id: self.video_id.clone(),
                requested: languages.to_vec(),
                available: self.iter().map(|t| t.language_code().to_string()).collect(),
            })
    }
}

impl std::fmt::Debug for TrackList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackList")
            .field("video_id", &self.video_id)
            .field(
                "tracks",
                &self
                    .iter()
                    .map(|t| (t.language_code(), t.is_generated()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// "Fetch the transcript for these preferred languages" in one call
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectFetch: Send + Sync {
    async fn get_transcript(&self, video_id: &str, languages: &[String]) -> Result<RawTranscript, ServiceError>;
}

/// "List every caption track for this video"
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListTranscripts: Send + Sync {
    async fn list_transcripts(&self, video_id: &str) -> Result<TrackList, ServiceError>;
}

/// Builds the object-style client that only offers listing
#[cfg_attr(test, mockall::automock)]
pub trait InstanceFactory: Send + Sync {
    fn instantiate(&self) -> Result<Box<dyn ListTranscripts>, ServiceError>;
}

/// A captioning service client, probed for the capabilities it offers.
///
/// Every probe defaults to `None`; callers must skip a capability the
/// client does not expose rather than treating its absence as an error.
pub trait TranscriptApi: Send + Sync {
    fn direct(&self) -> Option<&dyn DirectFetch> {
        None
    }

    fn listing(&self) -> Option<&dyn ListTranscripts> {
        None
    }

    fn instance(&self) -> Option<&dyn InstanceFactory> {
        None
    }
}
