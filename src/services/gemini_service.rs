// src/services/gemini_service.rs
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use log::{debug, error};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::GeminiConfig;
use crate::errors::{Operation, StudioError};
use crate::models::{ArtDirection, InlineImage};
use crate::prompt;

pub const GENERATE_ASPECT_RATIO: &str = "1:1";

/// Remote image model. Both calls are single-attempt.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        config: &ArtDirection,
        reference: Option<&InlineImage>,
    ) -> Result<InlineImage, StudioError>;

    async fn edit(&self, source: &InlineImage, instruction: &str)
    -> Result<InlineImage, StudioError>;
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: Option<String>,
    data: String,
}

pub struct GeminiService {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiService {
    pub fn new(config: &GeminiConfig) -> Result<Self, StudioError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| StudioError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn call(&self, operation: Operation, payload: Value) -> Result<InlineImage, StudioError> {
        debug!("Calling {} for {:?}", self.model, operation);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini {:?} request failed: {}", operation, e);
                StudioError::remote(operation, format!("request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini {:?} error: status={} body={}", operation, status, error_text);
            return Err(StudioError::remote(operation, format!("status {}", status)));
        }

        let result: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini {:?} response: {}", operation, e);
            StudioError::remote(operation, format!("unreadable response: {}", e))
        })?;

        first_inline_image(result).ok_or_else(|| {
            error!("Gemini {:?} response carried no image", operation);
            StudioError::NoImageInResponse(operation)
        })
    }
}

#[async_trait]
impl ImageGenerator for GeminiService {
    async fn generate(
        &self,
        prompt: &str,
        config: &ArtDirection,
        reference: Option<&InlineImage>,
    ) -> Result<InlineImage, StudioError> {
        let payload = generate_payload(prompt, config, reference);
        self.call(Operation::Generate, payload).await
    }

    async fn edit(
        &self,
        source: &InlineImage,
        instruction: &str,
    ) -> Result<InlineImage, StudioError> {
        let payload = edit_payload(source, instruction);
        self.call(Operation::Edit, payload).await
    }
}

fn inline_part(image: &InlineImage) -> Value {
    json!({
        "inlineData": {
            "mimeType": image.mime_type,
            "data": image.to_base64()
        }
    })
}

/// Reference image first, then the compiled text.
pub fn generate_payload(
    prompt: &str,
    config: &ArtDirection,
    reference: Option<&InlineImage>,
) -> Value {
    let mut parts = Vec::with_capacity(2);
    if let Some(reference) = reference.filter(|image| !image.data.is_empty()) {
        parts.push(inline_part(reference));
    }
    parts.push(json!({ "text": prompt::compile(prompt, config) }));

    json!({
        "contents": [{ "role": "user", "parts": parts }],
        "generationConfig": {
            "imageConfig": { "aspectRatio": GENERATE_ASPECT_RATIO }
        }
    })
}

pub fn edit_payload(source: &InlineImage, instruction: &str) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [inline_part(source), { "text": instruction }]
        }]
    })
}

// First inline part of the first candidate wins. Undecodable data counts as
// no image.
fn first_inline_image(response: GeminiResponse) -> Option<InlineImage> {
    let part = response
        .candidates?
        .into_iter()
        .next()?
        .content?
        .parts?
        .into_iter()
        .find_map(|part| part.inline_data)?;

    let data = general_purpose::STANDARD.decode(part.data).ok()?;
    if data.is_empty() {
        return None;
    }
    let mime_type = part
        .mime_type
        .filter(|mime| !mime.is_empty())
        .unwrap_or_else(|| "image/png".to_string());
    Some(InlineImage::new(mime_type, data))
}
