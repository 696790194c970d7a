use anyhow::Result;
use regex::Regex;
use url::Url;

/// Path prefixes that carry the video id as the next segment
const ID_PATH_PREFIXES: &[&str] = &["embed", "shorts", "live", "v"];

/// Resolve a video URL or bare id to the video id.
///
/// Input that is neither a recognised YouTube URL nor empty is passed
/// through untouched; the captioning service decides whether it is valid.
pub fn extract_video_id(input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        anyhow::bail!("Video reference must not be empty");
    }

    if let Ok(re) = Regex::new(r"^[A-Za-z0-9_-]{11}$") {
        if re.is_match(input) {
            return Ok(input.to_string());
        }
    }

    let Ok(parsed) = Url::parse(input) else {
        return Ok(input.to_string());
    };

    let host = extract_domain(&parsed).unwrap_or_default();
    let mut segments = parsed.path_segments().into_iter().flatten().filter(|s| !s.is_empty());

    let id = match host.as_str() {
        "youtu.be" => segments.next().map(str::to_string),
        "youtube.com" | "m.youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => {
            match segments.next() {
                Some("watch") => parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                Some(prefix) if ID_PATH_PREFIXES.contains(&prefix) => segments.next().map(str::to_string),
                _ => None,
            }
        }
        _ => None,
    };

    match id.filter(|id| !id.is_empty()) {
        Some(id) => Ok(id),
        None => {
            tracing::debug!("No video id recognised in {}, passing it through", input);
            Ok(input.to_string())
        }
    }
}

/// Host of a URL without a leading `www.`
fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|host| host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// `HH:MM:SS<sep>mmm`, as used by subtitle cues
pub fn format_cue_timestamp(seconds: f64, millis_separator: char) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;

    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, secs, millis_separator, millis)
}

/// Short `m:ss` or `h:mm:ss` clock for text output
pub fn format_clock(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0) as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Keep at most `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
