//! Telegram bootstrap: command registration and the long-polling dispatcher.

use super::{ChatTransport, Command, Controller, Event, Input};
use crate::art::YandexArtClient;
use crate::config::Config;
use crate::state::StateStore;
use crate::Result;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, Me};
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};

/// [`ChatTransport`] backed by the Bot API.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<()> {
        self.bot.send_message(chat, text).await?;
        Ok(())
    }

    async fn send_photo(&self, chat: ChatId, path: &Path, caption: &str) -> Result<()> {
        self.bot
            .send_photo(chat, InputFile::file(path.to_path_buf()))
            .caption(caption)
            .await?;
        Ok(())
    }
}

pub async fn register_commands(bot: &Bot) -> Result<()> {
    bot.set_my_commands(Command::bot_commands()).await?;
    info!("Bot commands registered");
    Ok(())
}

async fn on_message(message: Message, me: Me, controller: Arc<Controller>) -> Result<()> {
    let Some(user) = message.from.as_ref().map(|user| user.id) else {
        warn!("Ignoring message {} without sender", message.id.0);
        return Ok(());
    };

    let event = Event {
        user,
        chat: message.chat.id,
        input: Input::classify(message.text(), me.username()),
    };
    controller.handle(event).await
}

/// Register commands and serve updates until Ctrl-C.
pub async fn run(config: Config) -> Result<()> {
    let bot = Bot::new(config.telegram_bot_token.clone());

    register_commands(&bot).await?;
    if config.drop_pending_updates {
        bot.delete_webhook().drop_pending_updates(true).await?;
        info!("Pending updates dropped");
    }

    let controller = Arc::new(Controller::new(
        Box::new(YandexArtClient::from_config(&config)),
        Box::new(TelegramTransport::new(bot.clone())),
        StateStore::new(),
        config.image_dir.clone(),
    ));

    let handler = Update::filter_message().endpoint(on_message);

    info!("Starting polling...");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![controller])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
    info!("Polling stopped");

    Ok(())
}
