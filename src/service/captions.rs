//! Parsing of the watch page caption block and json3 caption bodies.

use regex::Regex;
use serde::Deserialize;

use super::ServiceError;

/// Caption track as advertised on the watch page
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrackInfo {
    pub base_url: String,
    pub language_code: String,
    pub language: String,
    pub is_generated: bool,
}

/// A single timed caption unit decoded from a json3 body
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionEvent {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionsBlock {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<RawCaptionTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCaptionTrack {
    base_url: String,
    language_code: String,
    name: Option<TrackName>,
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackName {
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<TextRun>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

impl TrackName {
    fn display(&self) -> Option<String> {
        if let Some(text) = &self.simple_text {
            return Some(text.clone());
        }
        let joined: String = self.runs.iter().map(|run| run.text.as_str()).collect();
        (!joined.is_empty()).then_some(joined)
    }
}

#[derive(Debug, Deserialize)]
struct Json3Body {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    segs: Option<Vec<Json3Segment>>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Extract the caption tracks advertised in a watch page
pub fn extract_caption_tracks(html: &str, video_id: &str) -> Result<Vec<CaptionTrackInfo>, ServiceError> {
    if html.contains("class=\"g-recaptcha\"") {
        return Err(ServiceError::Other(
            "Too many requests: the service answered with a captcha page".to_string(),
        ));
    }

    let Some((_, after)) = html.split_once("\"captions\":") else {
        return Err(missing_captions_error(html, video_id));
    };
    // Only the first value counts; the rest of the player response follows it
    let captions: CaptionsBlock = serde_json::Deserializer::from_str(after)
        .into_iter::<CaptionsBlock>()
        .next()
        .ok_or_else(|| ServiceError::InvalidResponse("caption block is empty".to_string()))?
        .map_err(|e| ServiceError::InvalidResponse(format!("caption block: {}", e)))?;

    let renderer = captions
        .player_captions_tracklist_renderer
        .ok_or_else(|| ServiceError::TranscriptsDisabled {
            video_id: video_id.to_string(),
        })?;

    if renderer.caption_tracks.is_empty() {
        return Err(ServiceError::NoTranscriptAvailable {
            video_id: video_id.to_string(),
        });
    }

    Ok(renderer
        .caption_tracks
        .into_iter()
        .map(|track| {
            let language = track
                .name
                .as_ref()
                .and_then(TrackName::display)
                .unwrap_or_else(|| track.language_code.clone());
            CaptionTrackInfo {
                base_url: track.base_url,
                is_generated: track.kind.as_deref() == Some("asr"),
                language_code: track.language_code,
                language,
            }
        })
        .collect())
}

/// No caption block: either the video is not playable or captions are off
fn missing_captions_error(html: &str, video_id: &str) -> ServiceError {
    let pattern = r#""playabilityStatus":\{"status":"([A-Z_]+)"(?:,"reason":"([^"]*)")?"#;
    if let Ok(re) = Regex::new(pattern) {
        if let Some(caps) = re.captures(html) {
            let status = caps.get(1).map(|m| m.as_str()).unwrap_or("OK");
            if status != "OK" {
                let reason = caps
                    .get(2)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| status.to_string());
                return ServiceError::VideoUnavailable {
                    video_id: video_id.to_string(),
                    reason,
                };
            }
        }
    }

    ServiceError::TranscriptsDisabled {
        video_id: video_id.to_string(),
    }
}

/// Decode a json3 caption body into timed units
pub fn parse_json3(body: &str) -> Result<Vec<CaptionEvent>, ServiceError> {
    let parsed: Json3Body = serde_json::from_str(body)
        .map_err(|e| ServiceError::InvalidResponse(format!("json3 body: {}", e)))?;

    Ok(parsed
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs?.into_iter().map(|seg| seg.utf8).collect();
            if text.trim().is_empty() {
                return None;
            }
            Some(CaptionEvent {
                text,
                start: event.t_start_ms as f64 / 1000.0,
                duration: event.d_duration_ms as f64 / 1000.0,
            })
        })
        .collect())
}
