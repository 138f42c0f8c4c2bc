use thiserror::Error;

use crate::core::validation::ValidationError;
use crate::download::error::DownloadError;

/// Centralized error type for the application.
///
/// Handler and CLI code converts everything into this enum. Invalid input
/// is `Validation`; extraction/transfer problems arrive as
/// `Download`/`Telegram`. "No stream at that quality" is *not* an error —
/// see [`SelectionResult::Unavailable`](crate::download::selector::SelectionResult).
#[derive(Error, Debug)]
pub enum AppError {
    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Download / yt-dlp errors
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// User input that failed validation before any download work
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
