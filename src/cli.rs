use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tubka")]
#[command(author, version, about = "Telegram bot for downloading YouTube audio and video", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (default when no command is given)
    Run,

    /// Download one video from the command line, bypassing Telegram
    Download {
        /// YouTube URL
        url: String,

        /// What to download: audio or video
        #[arg(short, long, default_value = "video")]
        kind: String,

        /// Quality tier: best/medium/low for audio, 240p..1080p for video.
        /// Defaults to best audio or 480p video.
        #[arg(short, long)]
        quality: Option<String>,
    },

    /// Show the usable streams of a video
    Info {
        /// YouTube URL
        url: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
