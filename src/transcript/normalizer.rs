//! Conversion of raw payloads of any supported shape into a [`Transcript`].

use serde_json::{Map, Value};

use super::{Transcript, TranscriptRecord};
use crate::service::{RawEntry, RawTranscript, Snippet, SnippetText};

/// Why a single entry could not become a record
#[derive(thiserror::Error, Debug, PartialEq)]
enum EntryError {
    #[error("field `{field}` is not a number: {value}")]
    NotANumber { field: &'static str, value: String },

    #[error("value cannot be rendered as text")]
    Unprintable,
}

/// Normalize a raw payload into canonical records.
///
/// Entries that cannot be turned into a complete record are skipped; an
/// un-coercible payload yields an empty transcript.
pub fn normalize_transcript(raw: RawTranscript) -> Transcript {
    let Some(entries) = into_entries(raw) else {
        tracing::debug!("Payload is not a sequence of caption entries");
        return Transcript::default();
    };

    let total = entries.len();
    let records: Vec<TranscriptRecord> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match decode_entry(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("Skipping caption entry {}: {}", index, e);
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::warn!("Dropped {} of {} caption entries during normalization", total - records.len(), total);
    }

    Transcript::new(records)
}

/// Unwrap labelled sub-collections and coerce the payload into a sequence
fn into_entries(raw: RawTranscript) -> Option<Vec<RawEntry>> {
    match raw {
        RawTranscript::Entries(entries) => Some(entries),
        RawTranscript::Fetched(fetched) => Some(fetched.snippets),
        RawTranscript::Json(value) => {
            let value = match value {
                Value::Object(mut map) if map.contains_key("snippets") => map.remove("snippets")?,
                other => other,
            };
            match value {
                Value::Array(items) => Some(items.into_iter().map(RawEntry::from).collect()),
                _ => None,
            }
        }
    }
}

fn decode_entry(entry: RawEntry) -> Result<TranscriptRecord, EntryError> {
    match entry {
        RawEntry::Map(map) => decode_map(&map),
        RawEntry::Snippet(Snippet { text, start, duration }) => {
            let text = match text {
                SnippetText::Plain(text) => text,
                SnippetText::Nested(nested) => stringify(nested.get("text").unwrap_or(&nested))?,
            };
            Ok(TranscriptRecord {
                text,
                start: start.unwrap_or(0.0),
                duration: duration.unwrap_or(0.0),
            })
        }
        RawEntry::Other(value) => Ok(TranscriptRecord {
            text: stringify(&value)?,
            start: 0.0,
            duration: 0.0,
        }),
    }
}

fn decode_map(map: &Map<String, Value>) -> Result<TranscriptRecord, EntryError> {
    let text = match map.get("text") {
        None | Some(Value::Null) => String::new(),
        Some(value) => stringify(value)?,
    };

    Ok(TranscriptRecord {
        text,
        start: coerce_seconds("start", map.get("start"))?,
        duration: coerce_seconds("duration", map.get("duration"))?,
    })
}

fn coerce_seconds(field: &'static str, value: Option<&Value>) -> Result<f64, EntryError> {
    match value {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| EntryError::NotANumber {
            field,
            value: n.to_string(),
        }),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| EntryError::NotANumber {
            field,
            value: s.clone(),
        }),
        Some(other) => Err(EntryError::NotANumber {
            field,
            value: other.to_string(),
        }),
    }
}

/// Strings verbatim, anything else as compact JSON
fn stringify(value: &Value) -> Result<String, EntryError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => serde_json::to_string(other).map_err(|_| EntryError::Unprintable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::FetchedTranscript;
    use serde_json::json;

    fn record(text: &str, start: f64, duration: f64) -> TranscriptRecord {
        TranscriptRecord {
            text: text.to_string(),
            start,
            duration,
        }
    }

    fn snippet(text: SnippetText) -> RawEntry {
        RawEntry::Snippet(Snippet {
            text,
            start: Some(0.0),
            duration: Some(1.0),
        })
    }

    #[test]
    fn test_well_formed_records_are_unchanged() {
        let records = vec![record("Hello", 0.0, 1.0), record("World", 1.0, 2.5)];
        let payload = serde_json::to_value(&records).unwrap();

        let normalized = normalize_transcript(RawTranscript::Json(payload));
        assert_eq!(normalized.records(), records.as_slice());
    }

    #[test]
    fn test_integer_times_become_floats() {
        let raw = RawTranscript::Entries(vec![RawEntry::from(json!({"text": "Hello", "start": 0, "duration": 1}))]);
        assert_eq!(normalize_transcript(raw).records(), &[record("Hello", 0.0, 1.0)]);
    }

    #[test]
    fn test_fetched_transcript_snippets() {
        let raw = RawTranscript::Fetched(FetchedTranscript {
            video_id: "abc".into(),
            language_code: "en".into(),
            is_generated: false,
            snippets: vec![
                snippet(SnippetText::Plain("Hello".into())),
                snippet(SnippetText::Plain("World".into())),
            ],
        });

        let normalized = normalize_transcript(raw);
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized.records()[0].text, "Hello");
        assert_eq!(normalized.records()[1].text, "World");
        assert_eq!(normalized.records()[1].duration, 1.0);
    }

    #[test]
    fn test_json_object_with_snippets_is_unwrapped() {
        let raw = RawTranscript::Json(json!({
            "video_id": "abc",
            "snippets": [{"text": "Hi", "start": "1.5", "duration": 2}],
        }));
        assert_eq!(normalize_transcript(raw).records(), &[record("Hi", 1.5, 2.0)]);
    }

    #[test]
    fn test_nested_text_mapping() {
        let raw = RawTranscript::Entries(vec![
            snippet(SnippetText::Nested(json!({"text": "X"}))),
            snippet(SnippetText::Nested(json!({"content": "Y"}))),
        ]);

        let normalized = normalize_transcript(raw);
        assert_eq!(normalized.records()[0].text, "X");
        assert_eq!(normalized.records()[1].text, r#"{"content":"Y"}"#);
    }

    #[test]
    fn test_opaque_entries_are_stringified() {
        let raw = RawTranscript::Json(json!([42, "plain", {"text": "ok"}]));

        let normalized = normalize_transcript(raw);
        assert_eq!(
            normalized.records(),
            &[record("42", 0.0, 0.0), record("plain", 0.0, 0.0), record("ok", 0.0, 0.0)]
        );
    }

    #[test]
    fn test_malformed_entry_is_skipped_not_fatal() {
        let raw = RawTranscript::Json(json!([
            {"text": "first", "start": 0, "duration": 1},
            {"text": "broken", "start": "soon", "duration": 1},
            {"text": "third", "start": 2, "duration": [1]},
            {"text": "last", "start": 3, "duration": 1},
        ]));

        let normalized = normalize_transcript(raw);
        let texts: Vec<&str> = normalized.records().iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "last"]);
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let raw = RawTranscript::Json(json!([{"start": 4}, {"text": null, "duration": null}]));
        assert_eq!(
            normalize_transcript(raw).records(),
            &[record("", 4.0, 0.0), record("", 0.0, 0.0)]
        );
    }

    #[test]
    fn test_empty_and_uncoercible_payloads() {
        assert!(normalize_transcript(RawTranscript::Entries(vec![])).is_empty());
        assert!(normalize_transcript(RawTranscript::Json(json!("just text"))).is_empty());
        assert!(normalize_transcript(RawTranscript::Json(json!({"events": []}))).is_empty());
        assert!(normalize_transcript(RawTranscript::Json(json!({"snippets": "nope"}))).is_empty());
    }

    #[test]
    fn test_order_and_overlaps_preserved() {
        let raw = RawTranscript::Json(json!([
            {"text": "b", "start": 5, "duration": 3},
            {"text": "a", "start": 1, "duration": 10},
            {"text": "c", "start": 5, "duration": 1},
        ]));
        let texts: Vec<String> = normalize_transcript(raw).records().iter().map(|r| r.text.clone()).collect();
        assert_eq!(texts, vec!["b", "a", "c"]);
    }
}
