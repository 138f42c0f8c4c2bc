//! Download engine: stream selection, metadata probing, fetching, sending.
//!
//! No Telegram types below `send` — the selector and downloader can be
//! driven from the CLI or tests without a bot in sight.

pub mod downloader;
pub mod error;
pub mod metadata;
pub mod selector;
pub mod send;

pub use downloader::{DownloadedFile, StreamDownloader};
pub use error::DownloadError;
pub use metadata::{MetadataProvider, VideoMetadata, YtDlpProvider};
pub use selector::{select, select_audio, select_video, QualityRequest, SelectionResult};
