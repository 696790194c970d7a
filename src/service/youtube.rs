use async_trait::async_trait;
use reqwest::header::ACCEPT_LANGUAGE;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use url::Url;

use super::captions::{self, CaptionEvent, CaptionTrackInfo};
use super::{
    DirectFetch, FetchedTranscript, InstanceFactory, ListTranscripts, RawEntry, RawTranscript, ServiceError,
    Snippet, SnippetText, TrackList, TranscriptApi, TranscriptTrack,
};
use crate::config::{CapabilityConfig, HttpConfig};
use crate::Result;

/// Shape a track hands its content back in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadShape {
    /// List of key/value records
    Records,
    /// Transcript object with typed snippets
    Snippets,
}

/// HTTP plumbing shared by every interface of the client
#[derive(Debug, Clone)]
struct WatchPageSession {
    client: Client,
    base_url: Url,
    accept_language: String,
}

impl WatchPageSession {
    fn new(config: &HttpConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|_| anyhow::anyhow!("Invalid base URL: {}", config.base_url))?;

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            accept_language: config.accept_language.clone(),
        })
    }

    fn watch_url(&self, video_id: &str) -> std::result::Result<Url, ServiceError> {
        let mut url = self
            .base_url
            .join("watch")
            .map_err(|e| ServiceError::Other(format!("Cannot build watch URL: {}", e)))?;
        url.query_pairs_mut().append_pair("v", video_id);
        Ok(url)
    }

    async fn get_text(&self, url: Url) -> std::result::Result<String, ServiceError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT_LANGUAGE, &self.accept_language)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Other(format!(
                "HTTP {} from captioning service",
                response.status()
            )));
        }

        Ok(response.text().await?)
    }

    async fn caption_tracks(&self, video_id: &str) -> std::result::Result<Vec<CaptionTrackInfo>, ServiceError> {
        let html = self.get_text(self.watch_url(video_id)?).await?;
        captions::extract_caption_tracks(&html, video_id)
    }

    /// Track URL resolved against the base, with `fmt` forced to json3
    fn json3_url(&self, base_url: &str) -> std::result::Result<Url, ServiceError> {
        let mut url = self
            .base_url
            .join(base_url)
            .map_err(|e| ServiceError::InvalidResponse(format!("track URL {}: {}", base_url, e)))?;

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != "fmt")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(pairs)
            .append_pair("fmt", "json3");

        Ok(url)
    }

    async fn caption_events(&self, base_url: &str) -> std::result::Result<Vec<CaptionEvent>, ServiceError> {
        let body = self.get_text(self.json3_url(base_url)?).await?;
        captions::parse_json3(&body)
    }

    fn track_list(&self, video_id: &str, infos: Vec<CaptionTrackInfo>, shape: PayloadShape) -> TrackList {
        let tracks = infos
            .into_iter()
            .map(|info| {
                Box::new(CaptionTrack {
                    video_id: video_id.to_string(),
                    info,
                    session: self.clone(),
                    shape,
                }) as Box<dyn TranscriptTrack>
            })
            .collect();

        TrackList::new(video_id, tracks)
    }
}

/// A caption track backed by a timedtext URL
struct CaptionTrack {
    video_id: String,
    info: CaptionTrackInfo,
    session: WatchPageSession,
    shape: PayloadShape,
}

#[async_trait]
impl TranscriptTrack for CaptionTrack {
    fn language_code(&self) -> &str {
        &self.info.language_code
    }

    fn language(&self) -> &str {
        &self.info.language
    }

    fn is_generated(&self) -> bool {
        self.info.is_generated
    }

    async fn fetch(&self) -> std::result::Result<RawTranscript, ServiceError> {
        let events = self.session.caption_events(&self.info.base_url).await?;

        Ok(match self.shape {
            PayloadShape::Records => RawTranscript::Entries(
                events
                    .into_iter()
                    .map(|event| {
                        RawEntry::from(json!({
                            "text": event.text,
                            "start": event.start,
                            "duration": event.duration,
                        }))
                    })
                    .collect(),
            ),
            PayloadShape::Snippets => RawTranscript::Fetched(FetchedTranscript {
                video_id: self.video_id.clone(),
                language_code: self.info.language_code.clone(),
                is_generated: self.info.is_generated,
                snippets: events
                    .into_iter()
                    .map(|event| {
                        RawEntry::Snippet(Snippet {
                            text: SnippetText::Plain(event.text),
                            start: Some(event.start),
                            duration: Some(event.duration),
                        })
                    })
                    .collect(),
            }),
        })
    }
}

/// YouTube captioning client scraping the watch page for caption tracks.
///
/// Serves both interface generations: the direct and listing calls return
/// plain record lists, while the instance client returns transcript objects.
/// Capabilities switched off in the configuration are not exposed.
pub struct YoutubeTranscriptApi {
    session: WatchPageSession,
    capabilities: CapabilityConfig,
}

impl YoutubeTranscriptApi {
    pub fn new(http: &HttpConfig, capabilities: &CapabilityConfig) -> Result<Self> {
        Ok(Self {
            session: WatchPageSession::new(http)?,
            capabilities: capabilities.clone(),
        })
    }
}

impl TranscriptApi for YoutubeTranscriptApi {
    fn direct(&self) -> Option<&dyn DirectFetch> {
        self.capabilities.direct_fetch.then_some(self as &dyn DirectFetch)
    }

    fn listing(&self) -> Option<&dyn ListTranscripts> {
        self.capabilities.list_transcripts.then_some(self as &dyn ListTranscripts)
    }

    fn instance(&self) -> Option<&dyn InstanceFactory> {
        self.capabilities.instance_client.then_some(self as &dyn InstanceFactory)
    }
}

#[async_trait]
impl DirectFetch for YoutubeTranscriptApi {
    async fn get_transcript(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> std::result::Result<RawTranscript, ServiceError> {
        let list = self.list_transcripts(video_id).await?;
        list.find_transcript(languages)?.fetch().await
    }
}

#[async_trait]
impl ListTranscripts for YoutubeTranscriptApi {
    async fn list_transcripts(&self, video_id: &str) -> std::result::Result<TrackList, ServiceError> {
        let infos = self.session.caption_tracks(video_id).await?;
        Ok(self.session.track_list(video_id, infos, PayloadShape::Records))
    }
}

impl InstanceFactory for YoutubeTranscriptApi {
    /// Never fails here: the session was validated when the API was built
    fn instantiate(&self) -> std::result::Result<Box<dyn ListTranscripts>, ServiceError> {
        Ok(Box::new(YoutubeClient {
            session: self.session.clone(),
        }))
    }
}

/// Object-style client: listing only, transcript objects as payload
pub struct YoutubeClient {
    session: WatchPageSession,
}

#[async_trait]
impl ListTranscripts for YoutubeClient {
    async fn list_transcripts(&self, video_id: &str) -> std::result::Result<TrackList, ServiceError> {
        let infos = self.session.caption_tracks(video_id).await?;
        Ok(self.session.track_list(video_id, infos, PayloadShape::Snippets))
    }
}
