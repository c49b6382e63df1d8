//! Error handling and custom error types
//!
//! Provides unified error handling across the bot using thiserror.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generation submit failed: {0}")]
    Submit(String),

    #[error("Generation status poll failed: {0}")]
    Poll(String),

    #[error("Generation finished without an image: {0}")]
    MissingImage(String),

    #[error("No result after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Unexpected(String),
}

pub type Result<T> = std::result::Result<T, Error>;
