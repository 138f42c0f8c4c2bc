use anyhow::Result;
use dotenvy::dotenv;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;
use url::Url;

use tubka::cli::{Cli, Commands};
use tubka::core::config::{self, Config};
use tubka::core::init_logger;
use tubka::core::validation::validate_youtube_url;
use tubka::download::metadata::log_ytdlp_version;
use tubka::download::selector::{select, QualityRequest, SelectionResult, StreamKind};
use tubka::download::{MetadataProvider, StreamDownloader, YtDlpProvider};
use tubka::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point.
///
/// Parses CLI arguments and dispatches to the bot or a one-shot command.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logger(config::LOG_FILE_PATH)?;

    // Load environment variables from .env if present
    let _ = dotenv();

    match cli.command {
        Some(Commands::Run) | None => run_bot().await,
        Some(Commands::Download { url, kind, quality }) => run_cli_download(url, kind, quality).await,
        Some(Commands::Info { url }) => run_cli_info(url).await,
    }
}

/// Run the bot in long polling mode.
async fn run_bot() -> Result<()> {
    let config = Config::from_env()?;
    log_ytdlp_version(&config.ytdlp_bin).await;

    let bot = create_bot(&config)?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let deps = HandlerDeps::new(&config);
    let handler = schema(deps);

    log::info!("Starting bot in long polling mode");

    // Drop updates that queued up while the bot was down; answering a
    // day-old "download this" button press surprises nobody pleasantly.
    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    Dispatcher::builder(bot, handler)
        .dependencies(DependencyMap::new())
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Bot stopped");
    Ok(())
}

/// One-shot download from the command line. The file is kept.
async fn run_cli_download(url: String, kind: String, quality: Option<String>) -> Result<()> {
    let config = Config::tooling_from_env();

    let kind: StreamKind = kind
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown kind '{}', use audio or video", kind))?;
    let tier = quality.unwrap_or_else(|| {
        match kind {
            StreamKind::Audio => "best",
            StreamKind::Video => "480p",
        }
        .to_string()
    });
    let request = QualityRequest::parse(kind, &tier)
        .ok_or_else(|| anyhow::anyhow!("unknown {} quality '{}'", kind, tier))?;

    let parsed = validate_youtube_url(&url)?;
    let provider = YtDlpProvider::new(&config);
    let metadata = provider.fetch(&parsed).await?;

    let selection = select(&metadata.streams, request);
    let Some(stream) = selection.stream() else {
        println!("No matching {} stream for '{}'", kind, metadata.title);
        return Ok(());
    };
    if let SelectionResult::Degraded { substituted, .. } = selection {
        println!("Requested {} not available, downloading {} instead", tier, substituted);
    }

    let downloader = StreamDownloader::new(&config);
    let artifact = downloader.download(&parsed, stream).await?;
    let path = artifact.persist();
    println!("Saved '{}' to {}", metadata.title, path.display());
    Ok(())
}

/// Prints the usable streams of a video.
async fn run_cli_info(url: String) -> Result<()> {
    let config = Config::tooling_from_env();

    let parsed: Url = validate_youtube_url(&url)?;
    let provider = YtDlpProvider::new(&config);
    let metadata = provider.fetch(&parsed).await?;

    println!("{} ({})", metadata.title, metadata.id);
    if let Some(duration) = metadata.duration_secs {
        println!("Duration: {:.0}s", duration);
    }
    println!();
    println!("{:<10} {:<8} {}", "format", "kind", "quality");
    for stream in &metadata.streams {
        let quality = match stream.kind {
            StreamKind::Audio => format!("{} kbps", stream.bitrate.unwrap_or(0)),
            StreamKind::Video => stream.resolution.clone().unwrap_or_default(),
        };
        println!("{:<10} {:<8} {}", stream.handle, stream.kind, quality);
    }
    Ok(())
}
