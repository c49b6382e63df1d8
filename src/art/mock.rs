use super::{GeneratedImage, ImageGenerationService};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Scripted generation outcome.
#[derive(Clone)]
enum Scripted {
    Image(GeneratedImage),
    Failure(fn() -> Error),
}

/// Cycles through scripted outcomes and records prompts.
#[derive(Clone)]
pub struct MockImageGenerationClient {
    responses: Arc<Mutex<Vec<Scripted>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_image(self, request_id: &str, seed: u64, bytes: Vec<u8>) -> Self {
        self.responses.lock().unwrap().push(Scripted::Image(GeneratedImage {
            request_id: request_id.to_string(),
            seed,
            bytes,
        }));
        self
    }

    /// Queue a failure; the constructor runs on every call since `Error` is not `Clone`.
    pub fn with_failure(self, make_error: fn() -> Error) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Scripted::Failure(make_error));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage> {
        let count = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len()
        };

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Tiny JPEG header as default payload
            return Ok(GeneratedImage {
                request_id: format!("mock-{}", count),
                seed: 1,
                bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
            });
        }

        match &responses[(count - 1) % responses.len()] {
            Scripted::Image(image) => Ok(image.clone()),
            Scripted::Failure(make_error) => Err(make_error()),
        }
    }
}
