//! Dispatcher schema and update handlers.
//!
//! The flow mirrors the chat UX: a link message yields the audio/video
//! keyboard, the first callback yields the tier keyboard, the second
//! callback runs fetch → select → download → send. Provider and extraction
//! failures never reach the chat verbatim; users get the generic retry
//! message while the details go to the log.

use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;
use url::Url;

use crate::core::config::Config;
use crate::core::error::AppError;
use crate::core::validation::{extract_video_id, url_from_id, validate_youtube_url};
use crate::download::selector::{select, QualityRequest, SelectionResult, StreamKind};
use crate::download::send::{send_audio_file, send_video_file};
use crate::download::{MetadataProvider, StreamDownloader, YtDlpProvider};
use crate::telegram::bot::Command;
use crate::telegram::keyboard::{kind_keyboard, parse_callback, quality_keyboard, Callback};
use crate::telegram::strings;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub provider: Arc<dyn MetadataProvider>,
    pub downloader: Arc<StreamDownloader>,
}

impl HandlerDeps {
    pub fn new(config: &Config) -> Self {
        Self {
            provider: Arc::new(YtDlpProvider::new(config)),
            downloader: Arc::new(StreamDownloader::new(config)),
        }
    }
}

/// Creates the dispatcher handler tree.
///
/// The same schema serves production and tests.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(command_handler())
        .branch(message_handler())
        .branch(callback_handler(deps))
}

/// Handler for bot commands (/start, /help)
fn command_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        |bot: Bot, msg: Message, cmd: Command| async move {
            log::info!("Received command {:?} from chat {}", cmd, msg.chat.id);
            let text = match cmd {
                Command::Start => strings::START_MESSAGE,
                Command::Help => strings::HELP_MESSAGE,
            };
            bot.send_message(msg.chat.id, text).await?;
            Ok(())
        },
    ))
}

/// Handler for regular messages (expected to be YouTube links)
fn message_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some())
        .endpoint(|bot: Bot, msg: Message| async move {
            handle_link_message(&bot, &msg).await?;
            Ok(())
        })
}

/// Handler for callback queries (inline keyboard buttons)
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            handle_callback(&bot, q, &deps).await?;
            Ok(())
        }
    })
}

/// Validates a pasted link and answers with the audio/video keyboard.
pub async fn handle_link_message(bot: &Bot, msg: &Message) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let input = text.trim();
    log::info!("New message in chat {}", msg.chat.id);

    match validate_youtube_url(input).and_then(|url| extract_video_id(&url)) {
        Ok(video_id) => {
            bot.send_message(msg.chat.id, strings::CHOOSE_KIND_MESSAGE)
                .reply_markup(kind_keyboard(&video_id))
                .await?;
        }
        Err(e) => {
            log::info!("Rejected input in chat {}: {}", msg.chat.id, e);
            bot.send_message(
                msg.chat.id,
                format!("{}\n{}", strings::INVALID_URL_WARNING, strings::USAGE_MESSAGE),
            )
            .await?;
        }
    }
    Ok(())
}

/// Routes a callback-query payload to the submenu or the download flow.
pub async fn handle_callback(bot: &Bot, q: CallbackQuery, deps: &HandlerDeps) -> ResponseResult<()> {
    // Always release the button spinner, even for stale payloads
    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();

    match parse_callback(data) {
        Some(Callback::ChooseKind { kind, video_id }) => {
            bot.edit_message_text(
                chat_id,
                message_id,
                strings::choose_quality_message(&kind.to_string()),
            )
            .reply_markup(quality_keyboard(kind, &video_id))
            .await?;
        }
        Some(Callback::Download { request, video_id }) => {
            run_download(bot, chat_id, request, &video_id, deps).await?;
        }
        None => {
            log::warn!("Malformed callback data from chat {}: {:?}", chat_id, data);
            bot.send_message(
                chat_id,
                format!("Invalid request format.\n\n{}", strings::USAGE_MESSAGE),
            )
            .await?;
        }
    }
    Ok(())
}

enum Delivery {
    Sent,
    Unavailable,
}

/// Runs one download request end to end, narrating progress through a
/// status message that is deleted on success.
async fn run_download(
    bot: &Bot,
    chat_id: ChatId,
    request: QualityRequest,
    video_id: &str,
    deps: &HandlerDeps,
) -> ResponseResult<()> {
    let (kind, tier) = match request {
        QualityRequest::Audio(t) => (StreamKind::Audio, t.to_string()),
        QualityRequest::Video(t) => (StreamKind::Video, t.to_string()),
    };
    let status = bot
        .send_message(chat_id, strings::downloading_message(&kind.to_string(), &tier))
        .await?;

    log::info!("Processing {} for video {} in chat {}", request, video_id, chat_id);

    match fetch_and_deliver(bot, chat_id, &status, request, video_id, deps).await {
        Ok(Delivery::Sent) => {
            let _ = bot.delete_message(chat_id, status.id).await;
        }
        Ok(Delivery::Unavailable) => {
            let text = match kind {
                StreamKind::Audio => strings::NO_AUDIO_MESSAGE,
                StreamKind::Video => strings::NO_VIDEO_MESSAGE,
            };
            bot.edit_message_text(chat_id, status.id, text).await?;
        }
        Err(e) => {
            // Internal error text stays in the log; the chat gets the
            // generic retry message.
            log::error!("Request {} for {} failed: {}", request, video_id, e);
            let _ = bot
                .edit_message_text(chat_id, status.id, strings::SOMETHING_WENT_WRONG_MESSAGE)
                .await;
        }
    }
    Ok(())
}

async fn fetch_and_deliver(
    bot: &Bot,
    chat_id: ChatId,
    status: &Message,
    request: QualityRequest,
    video_id: &str,
    deps: &HandlerDeps,
) -> Result<Delivery, AppError> {
    let url = Url::parse(&url_from_id(video_id))?;
    let metadata = deps.provider.fetch(&url).await?;

    let selection = select(&metadata.streams, request);
    let Some(stream) = selection.stream() else {
        return Ok(Delivery::Unavailable);
    };

    if let SelectionResult::Degraded {
        requested,
        substituted,
        ..
    } = selection
    {
        let _ = bot
            .send_message(
                chat_id,
                strings::degraded_message(&requested.to_string(), &substituted.to_string()),
            )
            .await;
    }

    let artifact = deps.downloader.download(&url, stream).await?;

    let kind = match request {
        QualityRequest::Audio(_) => StreamKind::Audio,
        QualityRequest::Video(_) => StreamKind::Video,
    };
    let _ = bot
        .edit_message_text(chat_id, status.id, strings::uploading_message(&kind.to_string()))
        .await;

    let send_result = match request {
        QualityRequest::Audio(_) => {
            send_audio_file(bot, chat_id, artifact.path(), &metadata.title).await
        }
        QualityRequest::Video(_) => send_video_file(bot, chat_id, artifact.path()).await,
    };

    match send_result {
        Ok(()) => {
            // Explicit delete on the success path; the guard's Drop covers
            // every error path above and below.
            if let Err(e) = artifact.cleanup() {
                log::warn!("Temp file cleanup failed: {}", e);
            }
            Ok(Delivery::Sent)
        }
        Err(e) => Err(e.into()),
    }
}
