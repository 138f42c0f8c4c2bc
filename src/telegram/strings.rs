//! User-facing message templates.

use indoc::indoc;

pub const USAGE_MESSAGE: &str = indoc! {"
    Usage: send me a YouTube link

    Example: https://youtu.be/dQw4w9WgXcQ
"};

pub const HELP_MESSAGE: &str = indoc! {"
    Usage: send me a YouTube link

    Example: https://youtu.be/dQw4w9WgXcQ

    Commands:
    /start - Start the bot
    /help - Show help
"};

pub const START_MESSAGE: &str = indoc! {"
    Hello! I'm a YouTube downloader bot.

    Send me a link and I'll ask whether you want the audio or the video, \
    and at which quality.

    /help - Show help
"};

pub const INVALID_URL_WARNING: &str = indoc! {"
    That doesn't look like a YouTube link.

    Please send a valid YouTube URL.
"};

pub const SOMETHING_WENT_WRONG_MESSAGE: &str =
    "Something went wrong while processing your request.\nPlease try again later.";

pub const CHOOSE_KIND_MESSAGE: &str = "Do you want to download audio or video?";

pub const NO_AUDIO_MESSAGE: &str = "This video has no audio-only stream to download.";

pub const NO_VIDEO_MESSAGE: &str = "No downloadable video stream was found for this video.";

pub fn choose_quality_message(kind: &str) -> String {
    format!("Select {} quality:", kind)
}

pub fn downloading_message(kind: &str, tier: &str) -> String {
    format!("Downloading {} at {} quality...", kind, tier)
}

pub fn uploading_message(kind: &str) -> String {
    format!("Uploading {}...", kind)
}

pub fn degraded_message(requested: &str, substituted: &str) -> String {
    format!(
        "{} isn't available for this video; sending {} instead.",
        requested, substituted
    )
}
