//! Telegram bot integration and handlers

pub mod bot;
pub mod handlers;
pub mod keyboard;
pub mod strings;

use teloxide::types::InlineKeyboardButton;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use handlers::{handle_callback, handle_link_message, schema, HandlerDeps, HandlerError};

/// Shorthand for a callback button.
pub(crate) fn cb(text: impl Into<String>, data: impl Into<String>) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text.into(), data.into())
}
