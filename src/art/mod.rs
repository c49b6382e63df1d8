//! YandexART image generation
//!
//! Submits asynchronous generation jobs and polls the operation endpoint
//! until an image is ready or the poll budget runs out.

pub mod client;
pub mod clock;
pub mod mock;
pub mod types;

pub use client::YandexArtClient;
pub use clock::{Clock, ManualClock, TokioClock};
pub use mock::MockImageGenerationClient;

use crate::Result;
use async_trait::async_trait;
use rand::Rng;
use std::ops::RangeInclusive;
use std::time::Duration;

pub const SEED_RANGE: RangeInclusive<u64> = 1..=1_000_000;

/// Timing knobs bounding the worst-case latency of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Network timeout applied to every submit and poll call.
    pub request_timeout: Duration,
    /// Pause between two status polls.
    pub poll_interval: Duration,
    /// Total time allowed for the job to report completion.
    pub poll_budget: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(20),
            poll_interval: Duration::from_secs(5),
            poll_budget: Duration::from_secs(60),
        }
    }
}

/// A finished generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub request_id: String,
    pub seed: u64,
    pub bytes: Vec<u8>,
}

impl GeneratedImage {
    /// Name of the transient file the image is written to before delivery.
    pub fn file_name(&self) -> String {
        image_file_name(&self.request_id)
    }
}

pub fn image_file_name(request_id: &str) -> String {
    format!("image_{}.jpeg", request_id)
}

/// Request ids are used as a URL segment and inside a file name.
pub fn is_valid_request_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub fn draw_seed() -> u64 {
    rand::thread_rng().gen_range(SEED_RANGE)
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_seed_stays_in_range() {
        for _ in 0..1000 {
            assert!(SEED_RANGE.contains(&draw_seed()));
        }
    }

    #[test]
    fn test_request_id_validation() {
        assert!(is_valid_request_id("fbveu1sntj4d9u2ivt9g"));
        assert!(is_valid_request_id("op-1_a"));
        assert!(!is_valid_request_id(""));
        assert!(!is_valid_request_id(".."));
        assert!(!is_valid_request_id("a/b"));
        assert!(!is_valid_request_id("a\\b"));
        assert!(!is_valid_request_id("abc 123"));
    }

    #[test]
    fn test_file_name_uses_request_id() {
        let image = GeneratedImage {
            request_id: "abc123".to_string(),
            seed: 7,
            bytes: vec![],
        };
        assert_eq!(image.file_name(), "image_abc123.jpeg");
    }
}
