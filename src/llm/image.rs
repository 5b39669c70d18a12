//! Image generation provider
//!
//! Talks to the `OpenAI` images endpoint. The backend may answer with an
//! inline base64 payload or with a short-lived URL; URLs are downloaded and
//! re-encoded so callers always receive an [`ImageData`].

use super::types::ImageData;
use super::LlmError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Image generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub size: String,
}

/// Common interface for image providers
#[async_trait]
pub trait ImageService: Send + Sync {
    async fn generate(&self, request: &ImageRequest) -> Result<ImageData, LlmError>;

    fn model_id(&self) -> &str;
}

pub struct OpenAIImageService {
    client: Client,
    api_key: String,
    base_url: String,
    model_id: String,
}

impl OpenAIImageService {
    pub fn new(
        api_key: String,
        model_id: impl Into<String>,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let base = base_url
            .unwrap_or(super::openai::DEFAULT_BASE_URL)
            .trim_end_matches('/');
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: format!("{base}/images/generations"),
            model_id: model_id.into(),
        })
    }

    async fn download(&self, url: &str) -> Result<ImageData, LlmError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LlmError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::from_status(status, "image download failed"));
        }

        let media_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("image/"))
            .unwrap_or("image/png")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read image: {e}")))?;

        Ok(ImageData {
            media_type,
            data: BASE64.encode(&bytes),
        })
    }
}

#[async_trait]
impl ImageService for OpenAIImageService {
    async fn generate(&self, request: &ImageRequest) -> Result<ImageData, LlmError> {
        let body = ImagesRequest {
            model: &self.model_id,
            prompt: &request.prompt,
            n: 1,
            size: &request.size,
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::from_transport(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(
                match serde_json::from_str::<super::openai::OpenAIErrorResponse>(&text) {
                    Ok(error_resp) => LlmError::from_status(status, &error_resp.error.message),
                    Err(_) => LlmError::from_status(status, &text),
                },
            );
        }

        let parsed: ImagesResponse = serde_json::from_str(&text)
            .map_err(|e| LlmError::unknown(format!("Failed to parse image response: {e}")))?;

        match first_image(parsed)? {
            ImagePayload::Inline(data) => Ok(ImageData::png(data)),
            ImagePayload::Url(url) => self.download(&url).await,
        }
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

enum ImagePayload {
    Inline(String),
    Url(String),
}

fn first_image(resp: ImagesResponse) -> Result<ImagePayload, LlmError> {
    let item = resp
        .data
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::unknown("No images in response"))?;

    match (item.b64_json, item.url) {
        (Some(data), _) if !data.is_empty() => Ok(ImagePayload::Inline(data)),
        (_, Some(url)) if !url.is_empty() => Ok(ImagePayload::Url(url)),
        _ => Err(LlmError::unknown("Image response carried neither data nor url")),
    }
}

#[derive(Debug, Serialize)]
struct ImagesRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageItem>,
}

#[derive(Debug, Deserialize)]
struct ImageItem {
    #[serde(default)]
    b64_json: Option<String>,
    #[serde(default)]
    url: Option<String>,
}
