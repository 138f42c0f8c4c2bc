//! File delivery back to the chat.
//!
//! Uploads go through the standard Bot API, which caps files at 50 MB;
//! oversized artifacts are rejected here with a `Transfer` error before any
//! bytes hit the wire. Network hiccups and rate limits are retried.

use std::path::Path;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use teloxide::prelude::*;
use teloxide::types::InputFile;
use teloxide::RequestError;

use crate::core::config;
use crate::download::error::DownloadError;

fn is_retryable_request_error(err: &RequestError) -> bool {
    matches!(
        err,
        RequestError::Network(_) | RequestError::Io(_) | RequestError::RetryAfter(_)
    )
}

fn ensure_sendable(path: &Path) -> Result<(), DownloadError> {
    let size = fs_err::metadata(path)
        .map_err(|e| DownloadError::FileNotFound(format!("{}: {}", path.display(), e)))?
        .len();

    if size > config::validation::MAX_FILE_SIZE_BYTES {
        return Err(DownloadError::Transfer(format!(
            "file is {:.1} MB, above the {} MB Bot API limit",
            size as f64 / (1024.0 * 1024.0),
            config::validation::MAX_FILE_SIZE_BYTES / (1024 * 1024),
        )));
    }
    Ok(())
}

async fn with_send_retry<F, Fut>(send: F) -> Result<(), DownloadError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<(), RequestError>>,
{
    send.retry(
        ExponentialBuilder::default()
            .with_min_delay(config::retry::delay())
            .with_max_times(config::retry::MAX_SEND_ATTEMPTS - 1),
    )
    .when(is_retryable_request_error)
    .notify(|err: &RequestError, dur: Duration| {
        log::warn!("Upload attempt failed ({}); retrying in {:?}", err, dur);
    })
    .await
    .map_err(|e| DownloadError::Transfer(e.to_string()))
}

/// Uploads an audio file to the chat.
pub async fn send_audio_file(
    bot: &Bot,
    chat_id: ChatId,
    path: &Path,
    title: &str,
) -> Result<(), DownloadError> {
    ensure_sendable(path)?;
    log::info!("Sending audio {} to chat {}", path.display(), chat_id);

    with_send_retry(|| async move {
        bot.send_audio(chat_id, InputFile::file(path.to_path_buf()))
            .title(title.to_string())
            .await
            .map(|_| ())
    })
    .await
}

/// Uploads a video file to the chat.
pub async fn send_video_file(bot: &Bot, chat_id: ChatId, path: &Path) -> Result<(), DownloadError> {
    ensure_sendable(path)?;
    log::info!("Sending video {} to chat {}", path.display(), chat_id);

    with_send_retry(|| async move {
        bot.send_video(chat_id, InputFile::file(path.to_path_buf()))
            .await
            .map(|_| ())
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_file_is_rejected_before_upload() {
        let dir = tempfile::tempdir().unwrap();
        let err = ensure_sendable(&dir.path().join("nope.mp4")).unwrap_err();
        assert!(matches!(err, DownloadError::FileNotFound(_)));
    }

    #[test]
    fn small_file_passes_the_size_gate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        fs::write(&path, vec![0u8; 1024]).unwrap();
        assert!(ensure_sendable(&path).is_ok());
    }

    #[test]
    fn network_errors_are_retryable_but_api_rejections_are_not() {
        let io = RequestError::Io(std::sync::Arc::new(std::io::Error::other("boom")));
        assert!(is_retryable_request_error(&io));

        let api = RequestError::Api(teloxide::ApiError::Unknown("bad request".to_string()));
        assert!(!is_retryable_request_error(&api));
    }
}
