use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;

use crate::config::{Config, LanguageConfig};
use crate::service::youtube::YoutubeTranscriptApi;
use crate::service::TranscriptApi;

pub mod classifier;
pub mod fetcher;
pub mod normalizer;

pub use classifier::classify_failure;
pub use fetcher::{DiagnosticNote, FetchOutcome, Strategy, TranscriptFetcher};
pub use normalizer::normalize_transcript;

/// One timed caption unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    /// Spoken or displayed text
    pub text: String,

    /// Seconds from the beginning of the video
    pub start: f64,

    /// Seconds the unit is shown for
    pub duration: f64,
}

impl TranscriptRecord {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Caption records in the order the service returned them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    records: Vec<TranscriptRecord>,
}

impl Transcript {
    pub fn new(records: Vec<TranscriptRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TranscriptRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Latest end time across all records
    pub fn total_duration(&self) -> f64 {
        self.records.iter().map(TranscriptRecord::end).fold(0.0, f64::max)
    }

    /// All text as one line: records joined by spaces, line breaks flattened
    pub fn cleaned_text(&self) -> String {
        self.records
            .iter()
            .map(|record| record.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .replace('\n', " ")
    }
}

/// Result of a transcript request: records, or one message explaining the failure
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptOutcome {
    Transcript(Transcript),
    Failure(String),
}

impl TranscriptOutcome {
    pub fn is_transcript(&self) -> bool {
        matches!(self, TranscriptOutcome::Transcript(_))
    }
}

/// Fetch, normalize and, on failure, explain a transcript.
///
/// Never fails: expected service failures are folded into a
/// `Failure` message, and a panic anywhere in the pipeline is reported
/// as a `System Error` message.
pub async fn get_video_transcript(
    api: &dyn TranscriptApi,
    languages: &LanguageConfig,
    video_id: &str,
) -> TranscriptOutcome {
    match AssertUnwindSafe(retrieve(api, languages, video_id)).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!("Transcript pipeline panicked for {}: {}", video_id, message);
            TranscriptOutcome::Failure(format!("System Error: {}", message))
        }
    }
}

async fn retrieve(api: &dyn TranscriptApi, languages: &LanguageConfig, video_id: &str) -> TranscriptOutcome {
    let FetchOutcome { payload, notes } = TranscriptFetcher::new(api, languages).fetch(video_id).await;

    let Some(raw) = payload else {
        return TranscriptOutcome::Failure(classify_failure(&notes));
    };

    let shape = raw.shape_name();
    let transcript = normalize_transcript(raw);
    if transcript.is_empty() {
        tracing::warn!("Payload of shape {} produced no records", shape);
        return TranscriptOutcome::Failure(format!(
            "Transcript found but normalization failed. Raw type: {}",
            shape
        ));
    }

    TranscriptOutcome::Transcript(transcript)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Transcript retrieval bound to a configured captioning client
pub struct TranscriptService {
    api: Box<dyn TranscriptApi>,
    languages: LanguageConfig,
}

impl TranscriptService {
    pub fn new(api: Box<dyn TranscriptApi>, languages: LanguageConfig) -> Self {
        Self { api, languages }
    }

    /// Build the YouTube-backed service described by the configuration
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let api = YoutubeTranscriptApi::new(&config.http, &config.capabilities)?;
        Ok(Self::new(Box::new(api), config.languages.clone()))
    }

    pub async fn get_video_transcript(&self, video_id: &str) -> TranscriptOutcome {
        get_video_transcript(self.api.as_ref(), &self.languages, video_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{entries, StaticTrack};
    use crate::service::{
        DirectFetch, ListTranscripts, RawEntry, RawTranscript, ServiceError, TrackList,
    };
    use async_trait::async_trait;
    use serde_json::json;

    type DirectScript = Box<dyn Fn(&[String]) -> Result<RawTranscript, ServiceError> + Send + Sync>;
    type ListingScript = Box<dyn Fn(&str) -> Result<TrackList, ServiceError> + Send + Sync>;

    /// Client whose every capability answers from canned closures
    struct ScriptedApi {
        direct: Option<DirectScript>,
        listing: Option<ListingScript>,
    }

    fn direct_script<F>(f: F) -> Option<DirectScript>
    where
        F: Fn(&[String]) -> Result<RawTranscript, ServiceError> + Send + Sync + 'static,
    {
        Some(Box::new(f))
    }

    fn listing_script<F>(f: F) -> Option<ListingScript>
    where
        F: Fn(&str) -> Result<TrackList, ServiceError> + Send + Sync + 'static,
    {
        Some(Box::new(f))
    }

    impl ScriptedApi {
        fn failing_with(message: &'static str) -> Self {
            Self {
                direct: direct_script(move |_| Err(ServiceError::Other(message.to_string()))),
                listing: listing_script(move |_| Err(ServiceError::Other(message.to_string()))),
            }
        }
    }

    impl TranscriptApi for ScriptedApi {
        fn direct(&self) -> Option<&dyn DirectFetch> {
            self.direct.as_ref().map(|_| self as &dyn DirectFetch)
        }

        fn listing(&self) -> Option<&dyn ListTranscripts> {
            self.listing.as_ref().map(|_| self as &dyn ListTranscripts)
        }
    }

    #[async_trait]
    impl DirectFetch for ScriptedApi {
        async fn get_transcript(&self, _video_id: &str, languages: &[String]) -> Result<RawTranscript, ServiceError> {
            match &self.direct {
                Some(script) => script(languages),
                None => unreachable!("direct capability probed as absent"),
            }
        }
    }

    #[async_trait]
    impl ListTranscripts for ScriptedApi {
        async fn list_transcripts(&self, video_id: &str) -> Result<TrackList, ServiceError> {
            match &self.listing {
                Some(script) => script(video_id),
                None => unreachable!("listing capability probed as absent"),
            }
        }
    }

    #[tokio::test]
    async fn test_direct_payload_is_normalized() {
        let api = ScriptedApi {
            direct: direct_script(|_| {
                Ok(RawTranscript::Entries(vec![RawEntry::from(
                    json!({"text": "Hello", "start": 0, "duration": 1}),
                )]))
            }),
            listing: None,
        };

        let outcome = get_video_transcript(&api, &LanguageConfig::default(), "vid").await;
        assert_eq!(
            outcome,
            TranscriptOutcome::Transcript(Transcript::new(vec![TranscriptRecord {
                text: "Hello".into(),
                start: 0.0,
                duration: 1.0,
            }]))
        );
    }

    #[tokio::test]
    async fn test_disabled_captions_message() {
        let api = ScriptedApi::failing_with("Subtitles are disabled for this video");

        match get_video_transcript(&api, &LanguageConfig::default(), "vid").await {
            TranscriptOutcome::Failure(message) => {
                assert!(message.to_lowercase().contains("captions are disabled"), "{}", message);
                assert!(!message.starts_with("No transcript found"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_typed_disabled_error_uses_transcripts_disabled_message() {
        let disabled = |video_id: &str| ServiceError::TranscriptsDisabled {
            video_id: video_id.to_string(),
        };
        let api = ScriptedApi {
            direct: direct_script(move |_| Err(disabled("vid"))),
            listing: listing_script(move |video_id| Err(disabled(video_id))),
        };

        let outcome = get_video_transcript(&api, &LanguageConfig::default(), "vid").await;
        assert_eq!(
            outcome,
            TranscriptOutcome::Failure(classifier::TRANSCRIPTS_DISABLED_MESSAGE.to_string())
        );
    }

    #[tokio::test]
    async fn test_unclassified_failures_are_listed() {
        let api = ScriptedApi::failing_with("connection reset by peer");

        match get_video_transcript(&api, &LanguageConfig::default(), "vid").await {
            TranscriptOutcome::Failure(message) => {
                assert_eq!(
                    message,
                    "No transcript found. Debug: Direct fetch: connection reset by peer; \
                     List transcripts: connection reset by peer; \
                     Extended languages: connection reset by peer"
                );
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generated_track_found_through_listing() {
        let api = ScriptedApi {
            direct: direct_script(|languages| {
                Err(ServiceError::NoTranscriptFound {
                    video_id: "vid".into(),
                    requested: languages.to_vec(),
                    available: vec!["en".into()],
                })
            }),
            listing: listing_script(|video_id| {
                Ok(TrackList::new(
                    video_id,
                    vec![
                        StaticTrack::failing("en", false, "manual lookup raised"),
                        StaticTrack::ok("en", true, entries(&["only line"])),
                    ],
                ))
            }),
        };

        match get_video_transcript(&api, &LanguageConfig::default(), "vid").await {
            TranscriptOutcome::Transcript(transcript) => {
                assert_eq!(transcript.len(), 1);
                assert_eq!(transcript.records()[0].text, "only line");
            }
            other => panic!("expected transcript, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unnormalizable_payload() {
        let api = ScriptedApi {
            direct: direct_script(|_| Ok(RawTranscript::Json(json!({"events": [1, 2]})))),
            listing: None,
        };

        let outcome = get_video_transcript(&api, &LanguageConfig::default(), "vid").await;
        assert_eq!(
            outcome,
            TranscriptOutcome::Failure("Transcript found but normalization failed. Raw type: json object".into())
        );
    }

    #[tokio::test]
    async fn test_panic_becomes_system_error() {
        let api = ScriptedApi {
            direct: direct_script(|_| panic!("client state corrupted")),
            listing: None,
        };

        let outcome = get_video_transcript(&api, &LanguageConfig::default(), "vid").await;
        assert_eq!(outcome, TranscriptOutcome::Failure("System Error: client state corrupted".into()));
        assert!(!outcome.is_transcript());
    }

    #[test]
    fn test_cleaned_text_and_duration() {
        let transcript = Transcript::new(vec![
            TranscriptRecord { text: "first\nline".into(), start: 0.0, duration: 2.0 },
            TranscriptRecord { text: "second".into(), start: 1.0, duration: 5.5 },
            TranscriptRecord { text: "third".into(), start: 3.0, duration: 1.0 },
        ]);

        assert_eq!(transcript.cleaned_text(), "first line second third");
        assert_eq!(transcript.total_duration(), 6.5);
    }

    #[test]
    fn test_from_config_builds_service() {
        let service = TranscriptService::from_config(&Config::default());
        assert!(service.is_ok());
    }
}
