//! Bot configuration.
//!
//! Everything read from the environment lands in [`Config`], built once in
//! `main` and passed down explicitly — the download and selection code never
//! touches `std::env`. Fixed tuning knobs that are not expected to change
//! between deployments live in the const submodules below.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use secrecy::SecretString;
use url::Url;

/// Log file written next to the binary, in addition to terminal output.
pub const LOG_FILE_PATH: &str = "tubka.log";

/// Runtime configuration, assembled from the environment at startup.
#[derive(Debug)]
pub struct Config {
    /// Telegram bot token (`BOT_TOKEN`).
    pub bot_token: SecretString,
    /// Custom Bot API server URL (`BOT_API_URL`), e.g. a local server
    /// raising the 50 MB upload limit. Empty means api.telegram.org.
    pub bot_api_url: Option<Url>,
    /// yt-dlp binary path (`YTDL_BIN`), defaults to `yt-dlp` on PATH.
    pub ytdlp_bin: String,
    /// Cookies file passed to yt-dlp (`YTDL_COOKIES_FILE`), for videos that
    /// require a logged-in session.
    pub cookies_file: Option<String>,
    /// Folder downloaded files are written to before sending
    /// (`DOWNLOAD_FOLDER`).
    pub download_folder: String,
}

impl Config {
    /// Builds the configuration from environment variables.
    ///
    /// `BOT_TOKEN` is mandatory; everything else has a default. Call after
    /// `dotenvy::dotenv()` so `.env` values are visible.
    pub fn from_env() -> Result<Self> {
        let bot_token = env::var("BOT_TOKEN")
            .context("BOT_TOKEN environment variable not set")?;

        let bot_api_url = match env::var("BOT_API_URL") {
            Ok(raw) if !raw.trim().is_empty() => {
                let url = Url::parse(raw.trim())
                    .with_context(|| format!("invalid BOT_API_URL: {}", raw))?;
                Some(url)
            }
            _ => None,
        };

        Ok(Self {
            bot_token: SecretString::from(bot_token),
            bot_api_url,
            ..Self::tooling_from_env()
        })
    }

    /// Configuration for the CLI subcommands, which never talk to the
    /// Telegram API: same environment handling, no token requirement.
    pub fn tooling_from_env() -> Self {
        let cookies_file = env::var("YTDL_COOKIES_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Self {
            bot_token: SecretString::from(String::new()),
            bot_api_url: None,
            ytdlp_bin: env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()),
            cookies_file,
            download_folder: env::var("DOWNLOAD_FOLDER")
                .unwrap_or_else(|_| "downloads".to_string()),
        }
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Telegram API calls (in seconds). Generous because
    /// it covers whole video uploads, not just round trips.
    pub const REQUEST_TIMEOUT_SECS: u64 = 900;

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Download configuration
pub mod download {
    use super::Duration;

    /// Timeout for yt-dlp metadata probes (in seconds)
    pub const PROBE_TIMEOUT_SECS: u64 = 30;

    /// Timeout for yt-dlp download commands (in seconds)
    pub const YTDLP_TIMEOUT_SECS: u64 = 300;

    pub fn probe_timeout() -> Duration {
        Duration::from_secs(PROBE_TIMEOUT_SECS)
    }

    pub fn ytdlp_timeout() -> Duration {
        Duration::from_secs(YTDLP_TIMEOUT_SECS)
    }
}

/// Retry configuration
pub mod retry {
    use super::Duration;

    /// Maximum attempts for a stream download
    pub const MAX_DOWNLOAD_ATTEMPTS: usize = 5;

    /// Maximum attempts for sending a file to Telegram
    pub const MAX_SEND_ATTEMPTS: usize = 3;

    /// Minimum delay between retry attempts
    pub const RETRY_DELAY_SECS: u64 = 2;

    pub fn delay() -> Duration {
        Duration::from_secs(RETRY_DELAY_SECS)
    }
}

/// Validation configuration
pub mod validation {
    /// Maximum accepted URL length (RFC 7230 recommends 8000, 2048 is plenty
    /// for YouTube links)
    pub const MAX_URL_LENGTH: usize = 2048;

    /// Maximum file size the standard Bot API accepts for uploads (50 MB)
    pub const MAX_FILE_SIZE_BYTES: u64 = 50 * 1024 * 1024;
}
