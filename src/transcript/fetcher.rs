use crate::config::LanguageConfig;
use crate::service::{FailureKind, ListTranscripts, RawTranscript, ServiceError, TrackList, TranscriptApi};
use crate::utils::truncate_chars;

/// Retrieval strategies, in the order they are attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One-call lookup with the preferred languages
    DirectFetch,
    /// List the tracks, then pick manual, generated, or any track
    ListTranscripts,
    /// Same selection through the object-style client
    InstanceClient,
    /// One-call lookup with the extended language list
    ExtendedLanguages,
}

impl Strategy {
    pub const ORDER: [Strategy; 4] = [
        Strategy::DirectFetch,
        Strategy::ListTranscripts,
        Strategy::InstanceClient,
        Strategy::ExtendedLanguages,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::DirectFetch => "Direct fetch",
            Strategy::ListTranscripts => "List transcripts",
            Strategy::InstanceClient => "Instance list",
            Strategy::ExtendedLanguages => "Extended languages",
        }
    }

    /// Longest error message kept in a note
    fn detail_limit(&self) -> usize {
        match self {
            Strategy::DirectFetch | Strategy::ExtendedLanguages => 100,
            Strategy::ListTranscripts | Strategy::InstanceClient => 80,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Short record of why a strategy failed
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticNote {
    pub strategy: Strategy,
    pub kind: FailureKind,
    pub detail: String,
}

impl DiagnosticNote {
    /// Typed failures keep only their kind; anything else keeps a truncated message
    pub fn from_error(strategy: Strategy, error: &ServiceError) -> Self {
        Self::with_limit(strategy, error, strategy.detail_limit())
    }

    fn with_limit(strategy: Strategy, error: &ServiceError, limit: usize) -> Self {
        let kind = error.kind();
        let detail = match kind {
            FailureKind::Unclassified => truncate_chars(&error.to_string(), limit).to_string(),
            typed => typed.to_string(),
        };
        Self { strategy, kind, detail }
    }
}

impl std::fmt::Display for DiagnosticNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.strategy, self.detail)
    }
}

/// First payload found, plus notes from every strategy that failed on the way
#[derive(Debug)]
pub struct FetchOutcome {
    pub payload: Option<RawTranscript>,
    pub notes: Vec<DiagnosticNote>,
}

/// Tries each retrieval strategy in turn until one yields content
pub struct TranscriptFetcher<'a> {
    api: &'a dyn TranscriptApi,
    languages: &'a LanguageConfig,
}

impl<'a> TranscriptFetcher<'a> {
    pub fn new(api: &'a dyn TranscriptApi, languages: &'a LanguageConfig) -> Self {
        Self { api, languages }
    }

    pub async fn fetch(&self, video_id: &str) -> FetchOutcome {
        let mut notes = Vec::new();

        for strategy in Strategy::ORDER {
            match self.attempt(strategy, video_id, &mut notes).await {
                Some(payload) if !payload.is_empty() => {
                    tracing::info!(%strategy, shape = payload.shape_name(), "Transcript retrieved for {}", video_id);
                    return FetchOutcome {
                        payload: Some(payload),
                        notes,
                    };
                }
                Some(_) => tracing::debug!(%strategy, "Strategy returned an empty payload"),
                None => {}
            }
        }

        tracing::warn!("All retrieval strategies failed for {} ({} notes)", video_id, notes.len());
        FetchOutcome { payload: None, notes }
    }

    async fn attempt(
        &self,
        strategy: Strategy,
        video_id: &str,
        notes: &mut Vec<DiagnosticNote>,
    ) -> Option<RawTranscript> {
        match strategy {
            Strategy::DirectFetch => self.direct(strategy, video_id, &self.languages.preferred, notes).await,
            Strategy::ListTranscripts => {
                let Some(listing) = self.api.listing() else {
                    tracing::debug!(%strategy, "Client does not offer track listing, skipping");
                    return None;
                };
                self.listed(strategy, listing, video_id, notes).await
            }
            Strategy::InstanceClient => {
                let Some(factory) = self.api.instance() else {
                    tracing::debug!(%strategy, "Client has no instance interface, skipping");
                    return None;
                };
                let client = match factory.instantiate() {
                    Ok(client) => client,
                    Err(e) => {
                        tracing::warn!(%strategy, "Cannot instantiate client: {}", e);
                        let mut note = DiagnosticNote::with_limit(strategy, &e, 50);
                        note.detail = format!("Cannot instantiate API: {}", note.detail);
                        notes.push(note);
                        return None;
                    }
                };
                self.listed(strategy, client.as_ref(), video_id, notes).await
            }
            Strategy::ExtendedLanguages => self.direct(strategy, video_id, &self.languages.extended, notes).await,
        }
    }

    async fn direct(
        &self,
        strategy: Strategy,
        video_id: &str,
        languages: &[String],
        notes: &mut Vec<DiagnosticNote>,
    ) -> Option<RawTranscript> {
        let Some(direct) = self.api.direct() else {
            tracing::debug!(%strategy, "Client does not offer direct fetch, skipping");
            return None;
        };

        match direct.get_transcript(video_id, languages).await {
            Ok(payload) => Some(payload),
            Err(e) => {
                record_failure(strategy, &e, notes);
                None
            }
        }
    }

    async fn listed(
        &self,
        strategy: Strategy,
        listing: &dyn ListTranscripts,
        video_id: &str,
        notes: &mut Vec<DiagnosticNote>,
    ) -> Option<RawTranscript> {
        let list = match listing.list_transcripts(video_id).await {
            Ok(list) => list,
            Err(e) => {
                record_failure(strategy, &e, notes);
                return None;
            }
        };

        if list.is_empty() {
            return None;
        }

        let found = select_track(&list, &self.languages.listing, strategy).await;
        if found.is_none() {
            notes.push(DiagnosticNote {
                strategy,
                kind: FailureKind::Unclassified,
                detail: format!("none of {} tracks yielded content", list.len()),
            });
        }
        found
    }
}

fn record_failure(strategy: Strategy, error: &ServiceError, notes: &mut Vec<DiagnosticNote>) {
    let kind = error.kind();
    tracing::warn!(%strategy, %kind, retryable = kind.is_retryable(), "Strategy failed: {}", error);
    notes.push(DiagnosticNote::from_error(strategy, error));
}

/// Manual track in a listed language, else generated, else the first track that fetches
async fn select_track(list: &TrackList, languages: &[String], strategy: Strategy) -> Option<RawTranscript> {
    let preferred = [
        ("manual", list.find_manually_created_transcript(languages)),
        ("generated", list.find_generated_transcript(languages)),
    ];

    for (label, lookup) in preferred {
        let track = match lookup {
            Ok(track) => track,
            Err(e) => {
                tracing::debug!(%strategy, "No {} track: {}", label, e);
                continue;
            }
        };
        match track.fetch().await {
            Ok(payload) if !payload.is_empty() => return Some(payload),
            Ok(_) => tracing::debug!(%strategy, "{} track {} is empty", label, track.language_code()),
            Err(e) => tracing::debug!(%strategy, "{} track {} failed: {}", label, track.language_code(), e),
        }
    }

    for track in list.iter() {
        match track.fetch().await {
            Ok(payload) if !payload.is_empty() => {
                tracing::debug!(%strategy, "Falling back to {} track {}", track.language(), track.language_code());
                return Some(payload);
            }
            Ok(_) => {}
            Err(e) => tracing::debug!(%strategy, "Track {} failed: {}", track.language_code(), e),
        }
    }

    None
}
