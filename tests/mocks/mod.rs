//! Mock metadata provider for exercising the request flow without yt-dlp
//! or the network.

#![allow(dead_code)] // Not every test binary uses every helper

use async_trait::async_trait;
use url::Url;

use tubka::download::metadata::{MetadataProvider, VideoMetadata};
use tubka::download::DownloadError;
use tubka::{StreamDescriptor, StreamKind};

/// Provider that returns a fixed metadata snapshot.
pub struct MockProvider {
    metadata: VideoMetadata,
}

impl MockProvider {
    pub fn with_streams(streams: Vec<StreamDescriptor>) -> Self {
        Self {
            metadata: VideoMetadata {
                id: "dQw4w9WgXcQ".to_string(),
                title: "Mock Video".to_string(),
                duration_secs: Some(212.0),
                streams,
            },
        }
    }
}

#[async_trait]
impl MetadataProvider for MockProvider {
    async fn fetch(&self, _url: &Url) -> Result<VideoMetadata, DownloadError> {
        Ok(self.metadata.clone())
    }
}

/// Provider that always fails, for asserting that transport problems stay
/// errors instead of becoming "unavailable".
pub enum FailingProvider {
    Unsupported,
    Extraction,
}

#[async_trait]
impl MetadataProvider for FailingProvider {
    async fn fetch(&self, url: &Url) -> Result<VideoMetadata, DownloadError> {
        match self {
            FailingProvider::Unsupported => {
                Err(DownloadError::UnsupportedUrl(format!("mock rejected {}", url)))
            }
            FailingProvider::Extraction => {
                Err(DownloadError::Extraction("mock network failure".to_string()))
            }
        }
    }
}

pub fn audio_stream(bitrate: u32, handle: &str) -> StreamDescriptor {
    StreamDescriptor {
        kind: StreamKind::Audio,
        bitrate: Some(bitrate),
        resolution: None,
        handle: handle.to_string(),
    }
}

pub fn video_stream(resolution: &str, handle: &str) -> StreamDescriptor {
    StreamDescriptor {
        kind: StreamKind::Video,
        bitrate: None,
        resolution: Some(resolution.to_string()),
        handle: handle.to_string(),
    }
}
