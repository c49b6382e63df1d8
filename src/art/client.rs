use super::clock::{Clock, TokioClock};
use super::types::{
    AspectRatio, GenerationOptions, ImageGenerationRequest, Operation, PromptMessage,
    SubmittedOperation,
};
use super::{draw_seed, is_valid_request_id, GeneratedImage, ImageGenerationService, PollSettings};
use crate::config::{Config, DEFAULT_API_BASE_URL};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, error, info};

const SUBMIT_PATH: &str = "/foundationModels/v1/imageGenerationAsync";
const OPERATIONS_PATH: &str = "/operations";

/// YandexART client: one submit, then status polls on a fixed cadence.
pub struct YandexArtClient {
    client: Client,
    api_key: String,
    model_uri: String,
    base_url: String,
    settings: PollSettings,
    clock: Arc<dyn Clock>,
}

impl YandexArtClient {
    pub fn new(api_key: String, model_uri: String, settings: PollSettings) -> Self {
        Self::new_with_client(api_key, model_uri, settings, Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model_uri: String,
        settings: PollSettings,
        client: Client,
    ) -> Self {
        Self {
            client,
            api_key,
            model_uri,
            base_url: DEFAULT_API_BASE_URL.to_string(),
            settings,
            clock: Arc::new(TokioClock::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.yandex_api_token.clone(),
            config.model_uri(),
            config.poll,
        )
        .with_base_url(config.api_base_url.clone())
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn send<Resp: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        wrap: fn(String) -> Error,
    ) -> Result<Resp> {
        let response = request
            .bearer_auth(&self.api_key)
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to YandexART: {}", e);
                wrap(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("YandexART API error (status {}): {}", status, error_text);
            return Err(wrap(format!(
                "API error (status {}): {}",
                status, error_text
            )));
        }

        let body = response.text().await.map_err(|e| wrap(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse YandexART response: {}\nBody: {}", e, body);
            wrap(format!("Failed to parse response: {}", e))
        })
    }

    async fn submit(&self, prompt: &str, seed: u64) -> Result<SubmittedOperation> {
        let request = ImageGenerationRequest {
            model_uri: self.model_uri.clone(),
            generation_options: GenerationOptions {
                seed,
                aspect_ratio: AspectRatio::WIDE,
            },
            messages: vec![PromptMessage {
                weight: 1,
                text: prompt.to_string(),
            }],
        };

        info!("Submitting image generation request (seed {})", seed);
        let url = format!("{}{}", self.base_url, SUBMIT_PATH);
        self.send(self.client.post(url).json(&request), Error::Submit)
            .await
    }

    async fn poll(&self, request_id: &str) -> Result<Operation> {
        let url = format!("{}{}/{}", self.base_url, OPERATIONS_PATH, request_id);
        self.send(self.client.get(url), Error::Poll).await
    }

    async fn wait_for_image(&self, request_id: &str) -> Result<Vec<u8>> {
        let started = self.clock.now();
        let mut polls = 0u32;

        while self.clock.now().saturating_sub(started) < self.settings.poll_budget {
            let operation = self.poll(request_id).await?;
            polls += 1;
            debug!(
                "Poll #{} for {}: done={}",
                polls, request_id, operation.done
            );

            if operation.done {
                return match operation.image() {
                    Some(encoded) => {
                        use base64::Engine as _;
                        base64::engine::general_purpose::STANDARD
                            .decode(encoded)
                            .map_err(|e| {
                                Error::Unexpected(format!("Failed to decode base64 image: {}", e))
                            })
                    }
                    None => {
                        let reason = match &operation.error {
                            Some(err) => format!("operation error {}: {}", err.code, err.message),
                            None => "response carries no image".to_string(),
                        };
                        error!("YandexART operation {} finished without image: {}", request_id, reason);
                        Err(Error::MissingImage(reason))
                    }
                };
            }

            self.clock.sleep(self.settings.poll_interval).await;
        }

        error!(
            "Timed out waiting for {} after {} polls",
            request_id, polls
        );
        Err(Error::Timeout(self.settings.poll_budget))
    }
}

#[async_trait]
impl ImageGenerationService for YandexArtClient {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage> {
        let seed = draw_seed();
        let request_id = self.submit(prompt, seed).await?.id;
        // The id becomes a URL segment and a file name.
        if !is_valid_request_id(&request_id) {
            error!("YandexART returned unusable request_id: {:?}", request_id);
            return Err(Error::Submit(format!(
                "invalid request id in response: {:?}",
                request_id
            )));
        }
        info!("Generation request accepted, request_id: {}", request_id);

        let bytes = self.wait_for_image(&request_id).await?;
        info!("Received image for {} ({} bytes)", request_id, bytes.len());

        Ok(GeneratedImage {
            request_id,
            seed,
            bytes,
        })
    }
}
