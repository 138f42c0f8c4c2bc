//! Bot initialization and command definitions.

use reqwest::ClientBuilder;
use secrecy::ExposeSecret;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config::{self, Config};

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "I can:")]
pub enum Command {
    #[command(description = "start the bot")]
    Start,
    #[command(description = "show help")]
    Help,
}

/// Creates a Bot instance from the configuration.
///
/// The HTTP client gets a long timeout because it carries whole file
/// uploads; a custom Bot API server URL is honored when configured.
pub fn create_bot(config: &Config) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let mut bot = Bot::with_client(config.bot_token.expose_secret(), client);

    if let Some(ref api_url) = config.bot_api_url {
        log::info!("Using custom Bot API URL: {}", api_url);
        bot = bot.set_api_url(api_url.clone());
    }

    Ok(bot)
}

/// Registers the command list shown in the Telegram UI.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![
        BotCommand::new("start", "start the bot"),
        BotCommand::new("help", "show help"),
    ])
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_descriptions_cover_both_commands() {
        let descriptions = Command::descriptions().to_string();
        assert!(descriptions.contains("start"));
        assert!(descriptions.contains("help"));
    }
}
