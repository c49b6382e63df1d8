//! YandexART request/response payloads.

use serde::{Deserialize, Serialize};

/// Body of `POST /foundationModels/v1/imageGenerationAsync`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerationRequest {
    pub model_uri: String,
    pub generation_options: GenerationOptions,
    pub messages: Vec<PromptMessage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    pub seed: u64,
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AspectRatio {
    pub width_ratio: u32,
    pub height_ratio: u32,
}

impl AspectRatio {
    pub const WIDE: AspectRatio = AspectRatio {
        width_ratio: 2,
        height_ratio: 1,
    };
}

#[derive(Debug, Serialize)]
pub struct PromptMessage {
    pub weight: u32,
    pub text: String,
}

/// Submit reply: identifies the long-running operation.
#[derive(Debug, Deserialize)]
pub struct SubmittedOperation {
    pub id: String,
}

/// Status reply of `GET /operations/{id}`.
#[derive(Debug, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub done: bool,
    pub response: Option<OperationResponse>,
    pub error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
pub struct OperationResponse {
    /// Base64-encoded image.
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

impl Operation {
    pub fn image(&self) -> Option<&str> {
        self.response.as_ref().and_then(|r| r.image.as_deref())
    }
}
