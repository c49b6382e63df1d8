use super::{replies, route, Action, ChatTransport, Event};
use crate::art::{GeneratedImage, ImageGenerationService};
use crate::state::{ConversationState, StateStore};
use crate::Result;
use std::io;
use std::path::{Path, PathBuf};
use teloxide::types::{ChatId, UserId};
use tracing::{debug, error, info, warn};

/// Runs the conversation: dispatch, generation and replies.
pub struct Controller {
    art: Box<dyn ImageGenerationService>,
    transport: Box<dyn ChatTransport>,
    states: StateStore,
    image_dir: PathBuf,
}

impl Controller {
    pub fn new(
        art: Box<dyn ImageGenerationService>,
        transport: Box<dyn ChatTransport>,
        states: StateStore,
        image_dir: PathBuf,
    ) -> Self {
        Self {
            art,
            transport,
            states,
            image_dir,
        }
    }

    pub fn states(&self) -> &StateStore {
        &self.states
    }

    pub async fn handle(&self, event: Event) -> Result<()> {
        let state = self.states.get(event.user);
        match route(event.input, state) {
            Action::Greet => self.on_start_command(event.user, event.chat).await,
            Action::RequestDescription => self.on_pic_command(event.user, event.chat).await,
            Action::Generate(text) => {
                self.on_text_message(event.user, event.chat, &text).await;
                Ok(())
            }
            Action::Ignore => {
                debug!("Ignoring message from user {} in state {:?}", event.user.0, state);
                Ok(())
            }
        }
    }

    pub async fn on_start_command(&self, user: UserId, chat: ChatId) -> Result<()> {
        info!("Received /start from user {}", user.0);
        self.transport.send_text(chat, replies::GREETING).await
    }

    pub async fn on_pic_command(&self, user: UserId, chat: ChatId) -> Result<()> {
        info!("Received /pic from user {}", user.0);
        self.transport
            .send_text(chat, replies::ASK_DESCRIPTION)
            .await?;
        self.states
            .set(user, ConversationState::AwaitingDescription);
        Ok(())
    }

    /// Generate an image for `text` and deliver it. Always leaves `user` idle.
    pub async fn on_text_message(&self, user: UserId, chat: ChatId, text: &str) {
        info!("Received image description from user {}: {}", user.0, text);

        if let Err(e) = self.generate_and_deliver(chat, text).await {
            error!("Image generation for user {} failed: {}", user.0, e);
            if let Err(send_err) = self
                .transport
                .send_text(chat, &replies::for_error(&e))
                .await
            {
                error!("Failed to report error to user {}: {}", user.0, send_err);
            }
        }

        self.states.clear(user);
        info!("Conversation state cleared for user {}", user.0);
    }

    async fn generate_and_deliver(&self, chat: ChatId, text: &str) -> Result<()> {
        self.transport.send_text(chat, replies::GENERATING).await?;

        let image = self.art.generate(text).await?;
        let file = TempImage::write(&self.image_dir, &image).await?;

        let sent = self
            .transport
            .send_photo(chat, file.path(), &replies::caption(image.seed))
            .await;
        file.remove().await;
        sent?;
        info!("Image {} delivered", image.request_id);
        Ok(())
    }
}

/// Image file on disk until `remove` is awaited. Dropping the guard without
/// it falls back to a blocking delete, which only happens on early exits.
struct TempImage {
    path: PathBuf,
    removed: bool,
}

impl TempImage {
    async fn write(dir: &Path, image: &GeneratedImage) -> Result<Self> {
        let path = dir.join(image.file_name());
        // Guard first so a partial write is removed too.
        let file = Self {
            path,
            removed: false,
        };
        tokio::fs::write(&file.path, &image.bytes).await?;
        debug!("Wrote {} ({} bytes)", file.path.display(), image.bytes.len());
        Ok(file)
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn remove(mut self) {
        self.removed = true;
        log_removal(&self.path, tokio::fs::remove_file(&self.path).await);
    }
}

impl Drop for TempImage {
    fn drop(&mut self) {
        if !self.removed {
            log_removal(&self.path, std::fs::remove_file(&self.path));
        }
    }
}

fn log_removal(path: &Path, result: io::Result<()>) {
    match result {
        Ok(()) => info!("Temporary file {} removed", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
    }
}
