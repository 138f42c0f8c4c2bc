//! Tubka — Telegram bot for downloading YouTube audio and video.
//!
//! The interesting part lives in [`download::selector`]: given the stream
//! list of a video and a requested quality tier, pick the stream to fetch,
//! degrading to the closest available resolution when the exact one is
//! missing. Everything else is glue around teloxide and yt-dlp.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, URL validation
//! - `download`: stream selection, yt-dlp metadata/download, file sending
//! - `telegram`: bot commands, keyboards, and update handlers

pub mod cli;
pub mod core;
pub mod download;
pub mod telegram;

// Re-export commonly used types for convenience
pub use self::core::config::Config;
pub use self::core::error::{AppError, AppResult};
pub use self::download::selector::{
    AudioQuality, SelectionResult, StreamDescriptor, StreamKind, VideoQuality,
};
