use thiserror::Error;

/// Structured error type for download operations.
///
/// Keeps the provider-side failures (`UnsupportedUrl`, `Extraction`) apart
/// from delivery failures (`Transfer`) so callers can phrase user messages
/// per category. An empty selection is not represented here at all — that
/// is [`SelectionResult::Unavailable`](crate::download::selector::SelectionResult).
#[derive(Debug, Error)]
pub enum DownloadError {
    /// yt-dlp rejected the URL outright (malformed or not a video page)
    #[error("unsupported URL: {0}")]
    UnsupportedUrl(String),

    /// Metadata extraction failed (network, geo-restriction, removed video)
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// yt-dlp or the OS failed to run the command (spawn, bad exit code)
    #[error("process failure: {0}")]
    Process(String),

    /// Download or probe timed out
    #[error("timed out: {0}")]
    Timeout(String),

    /// Expected file missing after a reported-successful download
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// Failed to deliver the file via the Telegram API
    #[error("transfer failed: {0}")]
    Transfer(String),
}

impl DownloadError {
    /// Returns subcategory for logs
    pub fn subcategory(&self) -> &'static str {
        match self {
            DownloadError::UnsupportedUrl(_) => "unsupported_url",
            DownloadError::Extraction(_) => "extraction",
            DownloadError::Process(_) => "process",
            DownloadError::Timeout(_) => "timeout",
            DownloadError::FileNotFound(_) => "file_not_found",
            DownloadError::Transfer(_) => "transfer",
        }
    }

    /// Whether a retry has any chance of succeeding.
    ///
    /// Unsupported URLs and missing files are deterministic; everything else
    /// can be a flaky network or a slow extractor.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DownloadError::Extraction(_)
                | DownloadError::Timeout(_)
                | DownloadError::Transfer(_)
        )
    }
}
