use super::ChatTransport;
use crate::{Error, Result};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use teloxide::types::ChatId;

/// One outbound message recorded by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text(ChatId, String),
    Photo {
        chat: ChatId,
        path: PathBuf,
        caption: String,
        /// File contents at send time, `None` if the file was missing.
        contents: Option<Vec<u8>>,
    },
}

/// Records outbound messages instead of talking to Telegram.
#[derive(Clone, Default)]
pub struct MockTransport {
    sent: Arc<Mutex<Vec<Sent>>>,
    fail_photos: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `send_photo` fail after recording it.
    pub fn failing_photos(mut self) -> Self {
        self.fail_photos = true;
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push(Sent::Text(chat, text.to_string()));
        Ok(())
    }

    async fn send_photo(&self, chat: ChatId, path: &Path, caption: &str) -> Result<()> {
        let contents = tokio::fs::read(path).await.ok();
        self.sent.lock().unwrap().push(Sent::Photo {
            chat,
            path: path.to_path_buf(),
            caption: caption.to_string(),
            contents,
        });

        if self.fail_photos {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::Other,
                "photo upload rejected",
            )));
        }
        Ok(())
    }
}
