//! Fetch-then-select flow against a mock provider: the orchestration the
//! callback handler performs, minus Telegram and yt-dlp.

mod mocks;

use mocks::{audio_stream, video_stream, FailingProvider, MockProvider};
use pretty_assertions::assert_eq;
use url::Url;

use tubka::download::metadata::MetadataProvider;
use tubka::download::{select, DownloadError, QualityRequest, SelectionResult};
use tubka::{AudioQuality, VideoQuality};

fn request_url() -> Url {
    Url::parse("https://youtu.be/dQw4w9WgXcQ").unwrap()
}

#[tokio::test]
async fn audio_request_resolves_through_fetched_snapshot() {
    let provider = MockProvider::with_streams(vec![
        audio_stream(64, "a64"),
        audio_stream(128, "a128"),
        video_stream("720p", "v720"),
    ]);

    let metadata = provider.fetch(&request_url()).await.unwrap();
    let result = select(&metadata.streams, QualityRequest::Audio(AudioQuality::Best));
    assert_eq!(result.stream().unwrap().handle, "a128");
}

#[tokio::test]
async fn video_request_degrades_and_reports_the_substitution() {
    let provider = MockProvider::with_streams(vec![
        audio_stream(128, "a128"),
        video_stream("360p", "v360"),
    ]);

    let metadata = provider.fetch(&request_url()).await.unwrap();
    let result = select(&metadata.streams, QualityRequest::Video(VideoQuality::P1080));
    match result {
        SelectionResult::Degraded {
            stream,
            requested,
            substituted,
        } => {
            assert_eq!(stream.handle, "v360");
            assert_eq!(requested, VideoQuality::P1080);
            assert_eq!(substituted, VideoQuality::P360);
        }
        other => panic!("expected a degraded selection, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_kind_is_unavailable_not_an_error() {
    let provider = MockProvider::with_streams(vec![video_stream("480p", "v480")]);

    let metadata = provider.fetch(&request_url()).await.unwrap();
    let result = select(&metadata.streams, QualityRequest::Audio(AudioQuality::Low));
    assert!(result.is_unavailable());
}

#[tokio::test]
async fn provider_failures_stay_errors() {
    // Extraction and bad-URL failures must surface as distinct error
    // conditions, never collapse into "unavailable".
    let err = FailingProvider::Extraction
        .fetch(&request_url())
        .await
        .unwrap_err();
    assert!(matches!(err, DownloadError::Extraction(_)));

    let err = FailingProvider::Unsupported
        .fetch(&request_url())
        .await
        .unwrap_err();
    assert!(matches!(err, DownloadError::UnsupportedUrl(_)));
}

#[tokio::test]
async fn snapshot_is_stable_across_selections() {
    let provider = MockProvider::with_streams(vec![
        audio_stream(96, "a96"),
        audio_stream(160, "a160"),
    ]);

    let metadata = provider.fetch(&request_url()).await.unwrap();
    let first = select(&metadata.streams, QualityRequest::Audio(AudioQuality::Medium));
    let second = select(&metadata.streams, QualityRequest::Audio(AudioQuality::Medium));
    assert_eq!(first, second);
}
