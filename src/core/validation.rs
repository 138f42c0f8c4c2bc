//! YouTube URL validation and video id extraction.
//!
//! Validation happens before any download code runs. Whitelist approach:
//! only http/https and the YouTube domains are accepted, and the video id
//! must have the canonical 11-character shape.

use lazy_regex::regex_is_match;
use thiserror::Error;
use url::Url;

use crate::core::config;

/// Validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Invalid URL format or non-YouTube domain
    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(String),

    /// URL parsed but no video id could be extracted
    #[error("No video id in URL: {0}")]
    NoVideoId(String),
}

/// Checks that a video id has the canonical YouTube shape.
pub fn is_valid_video_id(id: &str) -> bool {
    regex_is_match!(r"^[A-Za-z0-9_-]{11}$", id)
}

/// Validates that a string is a YouTube URL and returns it parsed.
///
/// Accepted hosts: `youtube.com`, `youtu.be`, `youtube-nocookie.com` and
/// their subdomains (`www.`, `m.`, `music.`), over http or https only.
///
/// # Examples
/// ```
/// use tubka::core::validation::validate_youtube_url;
///
/// assert!(validate_youtube_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ").is_ok());
/// assert!(validate_youtube_url("https://youtu.be/dQw4w9WgXcQ").is_ok());
/// assert!(validate_youtube_url("https://evil.com/watch?v=dQw4w9WgXcQ").is_err());
/// assert!(validate_youtube_url("not a url").is_err());
/// ```
pub fn validate_youtube_url(url: &str) -> Result<Url, ValidationError> {
    if url.len() > config::validation::MAX_URL_LENGTH {
        return Err(ValidationError::InvalidUrl(format!(
            "URL longer than {} characters",
            config::validation::MAX_URL_LENGTH
        )));
    }

    let parsed = Url::parse(url).map_err(|_| ValidationError::InvalidUrl(url.to_string()))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ValidationError::InvalidUrl(format!(
            "{} (invalid scheme: {})",
            url,
            parsed.scheme()
        )));
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| ValidationError::InvalidUrl(format!("{} (no host)", url)))?;

    let is_youtube = host == "youtube.com"
        || host.ends_with(".youtube.com")
        || host == "youtu.be"
        || host == "youtube-nocookie.com"
        || host.ends_with(".youtube-nocookie.com");

    if !is_youtube {
        return Err(ValidationError::InvalidUrl(format!(
            "{} (not a YouTube domain: {})",
            url, host
        )));
    }

    Ok(parsed)
}

/// Extracts the 11-character video id from a validated YouTube URL.
///
/// Covers the link shapes users actually paste: `watch?v=`, short
/// `youtu.be/` links, `embed/`, `shorts/`, `live/` and `v/` paths, with or
/// without extra query parameters (`&list=...&index=...`).
pub fn extract_video_id(url: &Url) -> Result<String, ValidationError> {
    // watch?v=ID and any other form carrying a v= query parameter
    if let Some((_, id)) = url.query_pairs().find(|(k, _)| k == "v") {
        if is_valid_video_id(&id) {
            return Ok(id.into_owned());
        }
    }

    let mut segments = url.path_segments().into_iter().flatten();

    if url.host_str() == Some("youtu.be") {
        // https://youtu.be/<id>
        if let Some(id) = segments.next() {
            if is_valid_video_id(id) {
                return Ok(id.to_string());
            }
        }
    } else {
        // /embed/<id>, /shorts/<id>, /live/<id>, /v/<id>
        while let Some(segment) = segments.next() {
            if matches!(segment, "embed" | "shorts" | "live" | "v") {
                if let Some(id) = segments.next() {
                    if is_valid_video_id(id) {
                        return Ok(id.to_string());
                    }
                }
                break;
            }
        }
    }

    Err(ValidationError::NoVideoId(url.to_string()))
}

/// Constructs the canonical short URL for a video id.
pub fn url_from_id(id: &str) -> String {
    format!("https://youtu.be/{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id_of(url: &str) -> String {
        let parsed = validate_youtube_url(url).unwrap();
        extract_video_id(&parsed).unwrap()
    }

    #[test]
    fn accepts_standard_watch_url() {
        assert_eq!(id_of("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), "dQw4w9WgXcQ");
    }

    #[test]
    fn accepts_short_url() {
        assert_eq!(id_of("https://youtu.be/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
    }

    #[test]
    fn accepts_embed_and_nocookie_urls() {
        assert_eq!(id_of("https://www.youtube.com/embed/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(
            id_of("https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ"),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn accepts_shorts_and_mobile_urls() {
        assert_eq!(id_of("https://youtube.com/shorts/aB3_x9YzQ-w"), "aB3_x9YzQ-w");
        assert_eq!(id_of("https://m.youtube.com/watch?v=dQw4w9WgXcQ"), "dQw4w9WgXcQ");
    }

    #[test]
    fn accepts_extra_query_parameters() {
        assert_eq!(
            id_of("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PL123&index=2"),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn rejects_non_youtube_domains() {
        assert!(validate_youtube_url("https://evil.com/watch?v=dQw4w9WgXcQ").is_err());
        assert!(validate_youtube_url("https://notyoutube.com/watch?v=dQw4w9WgXcQ").is_err());
        // Suffix tricks must not pass the whitelist
        assert!(validate_youtube_url("https://fakeyoutu.be/dQw4w9WgXcQ").is_err());
    }

    #[test]
    fn rejects_bad_schemes_and_garbage() {
        assert!(validate_youtube_url("ftp://youtube.com/watch?v=dQw4w9WgXcQ").is_err());
        assert!(validate_youtube_url("not a url").is_err());
        assert!(validate_youtube_url("").is_err());
    }

    #[test]
    fn rejects_overlong_urls() {
        let url = format!("https://youtube.com/watch?v=dQw4w9WgXcQ&x={}", "a".repeat(3000));
        assert!(validate_youtube_url(&url).is_err());
    }

    #[test]
    fn rejects_malformed_video_ids() {
        let parsed = validate_youtube_url("https://youtu.be/short").unwrap();
        assert!(extract_video_id(&parsed).is_err());

        let parsed = validate_youtube_url("https://www.youtube.com/watch?v=has%20space00").unwrap();
        assert!(extract_video_id(&parsed).is_err());
    }

    #[test]
    fn id_roundtrip_through_short_url() {
        let url = url_from_id("dQw4w9WgXcQ");
        assert_eq!(url, "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(id_of(&url), "dQw4w9WgXcQ");
    }

    #[test]
    fn video_id_shape() {
        assert!(is_valid_video_id("dQw4w9WgXcQ"));
        assert!(is_valid_video_id("aB3_x9YzQ-w"));
        assert!(!is_valid_video_id("dQw4w9WgXc"));
        assert!(!is_valid_video_id("dQw4w9WgXcQQ"));
        assert!(!is_valid_video_id("dQw4w9WgXc!"));
    }
}
