//! Telegram bot that turns text descriptions into YandexART images
//!
//! `/pic` arms a per-user conversation state; the next text message is
//! submitted as a generation job, polled to completion and sent back as a photo.

pub mod art;
pub mod bot;
pub mod config;
pub mod error;
pub mod state;

pub use error::{Error, Result};
