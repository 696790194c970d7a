use anyhow::Result;
use serde::Serialize;

use crate::transcript::{Transcript, TranscriptRecord};
use crate::utils::{format_clock, format_cue_timestamp};

/// Transcript plus the metadata written by the JSON format
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptReport<'a> {
    pub video_id: &'a str,
    pub fetched_at: chrono::DateTime<chrono::Utc>,
    pub record_count: usize,
    pub total_duration: f64,
    pub records: &'a [TranscriptRecord],
}

impl<'a> TranscriptReport<'a> {
    pub fn new(video_id: &'a str, transcript: &'a Transcript) -> Self {
        Self {
            video_id,
            fetched_at: chrono::Utc::now(),
            record_count: transcript.len(),
            total_duration: transcript.total_duration(),
            records: transcript.records(),
        }
    }
}

/// Plain text, optionally one `[mm:ss] text` line per record
pub fn format_as_text(transcript: &Transcript, include_timestamps: bool) -> String {
    if !include_timestamps {
        return transcript.cleaned_text();
    }

    transcript
        .records()
        .iter()
        .map(|record| format!("[{}] {}", format_clock(record.start), record.text.replace('\n', " ")))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_as_json(report: &TranscriptReport<'_>) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn format_as_srt(transcript: &Transcript) -> String {
    let mut out = String::new();
    for (index, record) in transcript.records().iter().enumerate() {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_cue_timestamp(record.start, ','),
            format_cue_timestamp(record.end(), ','),
            record.text
        ));
    }
    out
}

pub fn format_as_vtt(transcript: &Transcript) -> String {
    let mut out = String::from("WEBVTT\n\n");
    for record in transcript.records() {
        out.push_str(&format!(
            "{} --> {}\n{}\n\n",
            format_cue_timestamp(record.start, '.'),
            format_cue_timestamp(record.end(), '.'),
            record.text
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transcript {
        Transcript::new(vec![
            TranscriptRecord { text: "Hello there".into(), start: 0.5, duration: 1.25 },
            TranscriptRecord { text: "General\nKenobi".into(), start: 65.0, duration: 2.0 },
        ])
    }

    #[test]
    fn test_text_formats() {
        assert_eq!(format_as_text(&sample(), false), "Hello there General Kenobi");
        assert_eq!(format_as_text(&sample(), true), "[00:00] Hello there\n[01:05] General Kenobi");
    }

    #[test]
    fn test_srt() {
        let srt = format_as_srt(&sample());
        assert!(srt.starts_with("1\n00:00:00,500 --> 00:00:01,750\nHello there\n\n2\n00:01:05,000"));
    }

    #[test]
    fn test_vtt() {
        let vtt = format_as_vtt(&sample());
        assert!(vtt.starts_with("WEBVTT\n\n00:00:00.500 --> 00:00:01.750\nHello there"));
    }

    #[test]
    fn test_json_report() {
        let transcript = sample();
        let json = format_as_json(&TranscriptReport::new("abc", &transcript)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["video_id"], "abc");
        assert_eq!(value["record_count"], 2);
        assert_eq!(value["total_duration"], 67.0);
        assert_eq!(value["records"][1]["text"], "General\nKenobi");
    }
}
