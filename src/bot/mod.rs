//! Telegram conversation handling
//!
//! Inbound messages are classified into an [`Input`], routed against the
//! sender's [`ConversationState`] and executed by the [`Controller`].

pub mod controller;
pub mod mock;
pub mod replies;
pub mod telegram;

pub use controller::Controller;
pub use mock::{MockTransport, Sent};
pub use telegram::TelegramTransport;

use crate::state::ConversationState;
use crate::Result;
use async_trait::async_trait;
use std::path::Path;
use teloxide::types::{ChatId, UserId};
use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Debug, Clone, Copy, PartialEq, Eq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "Начать работу с ботом")]
    Start,
    #[command(description = "Сгенерировать изображение")]
    Pic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Text(String),
    /// Stickers, photos and anything else without text.
    Unsupported,
}

impl Input {
    pub fn classify(text: Option<&str>, bot_username: &str) -> Self {
        match text {
            None => Input::Unsupported,
            Some(text) => {
                // Neither command takes arguments; anything after the name is ignored.
                let head = text.split_whitespace().next().unwrap_or_default();
                match Command::parse(head, bot_username) {
                    Ok(command) => Input::Command(command),
                    Err(_) => Input::Text(text.to_string()),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Greet,
    RequestDescription,
    Generate(String),
    Ignore,
}

/// Transition table of the conversation.
pub fn route(input: Input, state: ConversationState) -> Action {
    match (input, state) {
        (Input::Command(Command::Start), _) => Action::Greet,
        (Input::Command(Command::Pic), _) => Action::RequestDescription,
        (Input::Text(text), ConversationState::AwaitingDescription) => Action::Generate(text),
        (Input::Text(_), ConversationState::Idle) => Action::Ignore,
        (Input::Unsupported, _) => Action::Ignore,
    }
}

/// One inbound message.
#[derive(Debug, Clone)]
pub struct Event {
    pub user: UserId,
    pub chat: ChatId,
    pub input: Input,
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<()>;
    async fn send_photo(&self, chat: ChatId, path: &Path, caption: &str) -> Result<()>;
}
