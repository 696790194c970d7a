use super::fetcher::DiagnosticNote;
use crate::service::FailureKind;

pub const CAPTIONS_DISABLED_MESSAGE: &str =
    "Subtitles/Captions are disabled for this video. The video owner has not enabled captions.";

pub const TRANSCRIPTS_DISABLED_MESSAGE: &str = "Transcripts are disabled for this video by the uploader.";

pub const NO_TRANSCRIPT_MESSAGE: &str = "No transcript available for this video in any supported language.";

/// Pick the single message to show when no strategy produced a transcript
pub fn classify_failure(notes: &[DiagnosticNote]) -> String {
    if notes.iter().any(|note| mentions_disabled_captions(&note.detail)) {
        return CAPTIONS_DISABLED_MESSAGE.to_string();
    }

    if notes.iter().any(|note| note.kind == FailureKind::TranscriptsDisabled) {
        return TRANSCRIPTS_DISABLED_MESSAGE.to_string();
    }

    if notes.iter().any(|note| {
        matches!(note.kind, FailureKind::NoTranscriptFound | FailureKind::NoTranscriptAvailable)
            || note.detail.to_lowercase().contains("no transcript")
    }) {
        return NO_TRANSCRIPT_MESSAGE.to_string();
    }

    let debug = if notes.is_empty() {
        "No methods succeeded".to_string()
    } else {
        notes.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
    };

    format!("No transcript found. Debug: {}", debug)
}

/// Free-text notes saying subtitles or captions are switched off
fn mentions_disabled_captions(detail: &str) -> bool {
    let detail = detail.to_lowercase();
    detail.contains("disabled") && (detail.contains("subtitle") || detail.contains("caption"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::fetcher::Strategy;

    fn note(strategy: Strategy, kind: FailureKind, detail: &str) -> DiagnosticNote {
        DiagnosticNote {
            strategy,
            kind,
            detail: detail.to_string(),
        }
    }

    #[test]
    fn test_caption_text_wins_over_kinds() {
        let notes = vec![
            note(Strategy::DirectFetch, FailureKind::NoTranscriptFound, "NoTranscriptFound"),
            note(Strategy::ListTranscripts, FailureKind::Unclassified, "Subtitles are disabled for this video"),
            note(Strategy::InstanceClient, FailureKind::TranscriptsDisabled, "TranscriptsDisabled"),
        ];
        let message = classify_failure(&notes);
        assert!(message.to_lowercase().contains("captions are disabled"));
    }

    #[test]
    fn test_disabled_kind() {
        let notes = vec![note(Strategy::DirectFetch, FailureKind::TranscriptsDisabled, "TranscriptsDisabled")];
        assert_eq!(classify_failure(&notes), TRANSCRIPTS_DISABLED_MESSAGE);
    }

    #[test]
    fn test_no_transcript_by_kind_or_text() {
        let by_kind = vec![note(Strategy::ExtendedLanguages, FailureKind::NoTranscriptAvailable, "NoTranscriptAvailable")];
        assert_eq!(classify_failure(&by_kind), NO_TRANSCRIPT_MESSAGE);

        let by_text = vec![note(Strategy::DirectFetch, FailureKind::Unclassified, "No transcript in response")];
        assert_eq!(classify_failure(&by_text), NO_TRANSCRIPT_MESSAGE);
    }

    #[test]
    fn test_generic_message_joins_notes() {
        let notes = vec![
            note(Strategy::DirectFetch, FailureKind::Unclassified, "HTTP 500"),
            note(Strategy::InstanceClient, FailureKind::VideoUnavailable, "VideoUnavailable"),
        ];
        assert_eq!(
            classify_failure(&notes),
            "No transcript found. Debug: Direct fetch: HTTP 500; Instance list: VideoUnavailable"
        );
    }

    #[test]
    fn test_no_notes() {
        assert_eq!(classify_failure(&[]), "No transcript found. Debug: No methods succeeded");
    }
}
