//! Video metadata probing via yt-dlp.
//!
//! One `yt-dlp --dump-json` run per user request produces the snapshot of
//! available streams that the selector works on; nothing re-queries
//! mid-selection. The provider sits behind a trait so handler logic can be
//! tested without the binary or the network.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use url::Url;

use crate::core::config::{self, Config};
use crate::download::error::DownloadError;
use crate::download::selector::{StreamDescriptor, StreamKind};

/// Snapshot of a video's identity and available streams.
#[derive(Debug, Clone)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    pub duration_secs: Option<f64>,
    pub streams: Vec<StreamDescriptor>,
}

/// Source of video metadata, keyed by URL.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<VideoMetadata, DownloadError>;
}

/// yt-dlp-backed [`MetadataProvider`].
#[derive(Debug, Clone)]
pub struct YtDlpProvider {
    bin: String,
    cookies_file: Option<String>,
    probe_timeout: Duration,
}

impl YtDlpProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            bin: config.ytdlp_bin.clone(),
            cookies_file: config.cookies_file.clone(),
            probe_timeout: config::download::probe_timeout(),
        }
    }

    fn probe_args(&self, url: &Url) -> Vec<String> {
        let mut args = vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
        ];
        if let Some(ref cookies) = self.cookies_file {
            args.push("--cookies".to_string());
            args.push(cookies.clone());
        }
        args.push(url.as_str().to_string());
        args
    }
}

#[async_trait]
impl MetadataProvider for YtDlpProvider {
    async fn fetch(&self, url: &Url) -> Result<VideoMetadata, DownloadError> {
        log::info!("Probing metadata for {}", url);

        let output = timeout(
            self.probe_timeout,
            TokioCommand::new(&self.bin).args(self.probe_args(url)).output(),
        )
        .await
        .map_err(|_| {
            DownloadError::Timeout(format!(
                "metadata probe exceeded {}s for {}",
                self.probe_timeout.as_secs(),
                url
            ))
        })?
        .map_err(|e| DownloadError::Process(format!("failed to run {}: {}", self.bin, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_ytdlp_stderr(&stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let raw: RawVideoInfo = serde_json::from_str(stdout.trim())
            .map_err(|e| DownloadError::Extraction(format!("unreadable metadata JSON: {}", e)))?;

        let metadata = VideoMetadata {
            streams: descriptors_from_formats(&raw.formats),
            id: raw.id,
            title: raw.title,
            duration_secs: raw.duration,
        };
        log::info!(
            "Metadata for '{}' ({}): {} usable streams",
            metadata.title,
            metadata.id,
            metadata.streams.len()
        );
        Ok(metadata)
    }
}

/// Logs the yt-dlp version at startup, or a loud warning when the binary
/// is missing — without it every request will fail.
pub async fn log_ytdlp_version(bin: &str) {
    match TokioCommand::new(bin).arg("--version").output().await {
        Ok(out) if out.status.success() => {
            log::info!("yt-dlp version: {}", String::from_utf8_lossy(&out.stdout).trim());
        }
        Ok(out) => {
            log::warn!("yt-dlp --version exited with code {:?}", out.status.code());
        }
        Err(e) => {
            log::error!("yt-dlp not found at '{}': {}. Downloads will fail.", bin, e);
        }
    }
}

/// Maps a yt-dlp error output to the error taxonomy.
///
/// Bad input must stay distinguishable from upstream failure: an
/// unsupported URL means "don't retry, tell the user to fix the link",
/// while extraction failures are the provider's problem.
pub fn classify_ytdlp_stderr(stderr: &str) -> DownloadError {
    let summary = stderr
        .lines()
        .find(|l| l.contains("ERROR"))
        .unwrap_or_else(|| stderr.lines().next().unwrap_or("unknown yt-dlp error"))
        .trim()
        .to_string();

    let lowered = stderr.to_lowercase();
    if lowered.contains("is not a valid url")
        || lowered.contains("unsupported url")
        || lowered.contains("truncated id")
        || lowered.contains("incomplete youtube id")
    {
        DownloadError::UnsupportedUrl(summary)
    } else {
        DownloadError::Extraction(summary)
    }
}

/// yt-dlp `--dump-json` payload, reduced to the fields the bot reads.
#[derive(Debug, Deserialize)]
struct RawVideoInfo {
    id: String,
    title: String,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    formats: Vec<RawFormat>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    format_id: String,
    #[serde(default)]
    vcodec: Option<String>,
    #[serde(default)]
    acodec: Option<String>,
    /// Average audio bitrate in kbit/s. Absent or null on storyboard and
    /// some DASH entries.
    #[serde(default)]
    abr: Option<f64>,
    #[serde(default)]
    height: Option<u32>,
}

impl RawFormat {
    fn has_video(&self) -> bool {
        matches!(self.vcodec.as_deref(), Some(c) if c != "none")
    }

    fn has_audio(&self) -> bool {
        matches!(self.acodec.as_deref(), Some(c) if c != "none")
    }
}

/// Converts raw yt-dlp format entries into selector descriptors.
///
/// Audio-only entries must carry a numeric bitrate to survive; video
/// entries must carry a height. Storyboards (neither codec) and metadata
/// rows are dropped here so the selector only ever sees usable streams.
fn descriptors_from_formats(formats: &[RawFormat]) -> Vec<StreamDescriptor> {
    formats
        .iter()
        .filter_map(|f| {
            if f.has_video() {
                let height = f.height?;
                Some(StreamDescriptor {
                    kind: StreamKind::Video,
                    bitrate: None,
                    resolution: Some(format!("{}p", height)),
                    handle: f.format_id.clone(),
                })
            } else if f.has_audio() {
                let abr = f.abr.filter(|b| b.is_finite() && *b > 0.0)?;
                Some(StreamDescriptor {
                    kind: StreamKind::Audio,
                    bitrate: Some(abr.round() as u32),
                    resolution: None,
                    handle: f.format_id.clone(),
                })
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE_DUMP: &str = r#"{
        "id": "dQw4w9WgXcQ",
        "title": "Test Video",
        "duration": 212.0,
        "formats": [
            {"format_id": "sb0", "vcodec": "none", "acodec": "none"},
            {"format_id": "139", "vcodec": "none", "acodec": "mp4a.40.5", "abr": 48.914},
            {"format_id": "140", "vcodec": "none", "acodec": "mp4a.40.2", "abr": 129.478},
            {"format_id": "251", "vcodec": "none", "acodec": "opus", "abr": 141.27},
            {"format_id": "598", "vcodec": "none", "acodec": "opus"},
            {"format_id": "134", "vcodec": "avc1.4d401e", "acodec": "none", "height": 360},
            {"format_id": "136", "vcodec": "avc1.64001f", "acodec": "none", "height": 720},
            {"format_id": "18", "vcodec": "avc1.42001E", "acodec": "mp4a.40.2", "abr": 96.0, "height": 360}
        ]
    }"#;

    fn sample_streams() -> Vec<StreamDescriptor> {
        let raw: RawVideoInfo = serde_json::from_str(SAMPLE_DUMP).unwrap();
        descriptors_from_formats(&raw.formats)
    }

    #[test]
    fn parses_dump_json_identity_fields() {
        let raw: RawVideoInfo = serde_json::from_str(SAMPLE_DUMP).unwrap();
        assert_eq!(raw.id, "dQw4w9WgXcQ");
        assert_eq!(raw.title, "Test Video");
        assert_eq!(raw.duration, Some(212.0));
    }

    #[test]
    fn audio_descriptors_keep_rounded_bitrates() {
        let streams = sample_streams();
        let bitrates: Vec<(String, u32)> = streams
            .iter()
            .filter(|s| s.kind == StreamKind::Audio)
            .map(|s| (s.handle.clone(), s.bitrate.unwrap()))
            .collect();
        assert_eq!(
            bitrates,
            vec![
                ("139".to_string(), 49),
                ("140".to_string(), 129),
                ("251".to_string(), 141),
            ]
        );
    }

    #[test]
    fn storyboards_and_bitrateless_audio_are_dropped() {
        let streams = sample_streams();
        assert!(streams.iter().all(|s| s.handle != "sb0"));
        assert!(streams.iter().all(|s| s.handle != "598"));
    }

    #[test]
    fn video_descriptors_are_labelled_by_height() {
        let streams = sample_streams();
        let labels: Vec<(String, String)> = streams
            .iter()
            .filter(|s| s.kind == StreamKind::Video)
            .map(|s| (s.handle.clone(), s.resolution.clone().unwrap()))
            .collect();
        // Progressive format 18 carries both codecs; it counts as video
        assert_eq!(
            labels,
            vec![
                ("134".to_string(), "360p".to_string()),
                ("136".to_string(), "720p".to_string()),
                ("18".to_string(), "360p".to_string()),
            ]
        );
    }

    #[test]
    fn stderr_classification_separates_bad_input_from_extraction() {
        let err = classify_ytdlp_stderr("ERROR: 'htp://x' is not a valid URL");
        assert!(matches!(err, DownloadError::UnsupportedUrl(_)));

        let err = classify_ytdlp_stderr("ERROR: Unsupported URL: https://example.com");
        assert!(matches!(err, DownloadError::UnsupportedUrl(_)));

        let err = classify_ytdlp_stderr("ERROR: [youtube] abc: Video unavailable");
        assert!(matches!(err, DownloadError::Extraction(_)));

        let err = classify_ytdlp_stderr("some unrecognised failure");
        assert!(matches!(err, DownloadError::Extraction(_)));
    }
}
