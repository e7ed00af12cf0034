use super::types::*;
use crate::{Error, Result, config::ImageConfig};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait ImageClient: Send + Sync {
    async fn generate(&self, request: &ImageGenerationRequest) -> Result<ImageGenerationResponse>;
}

/// Text-to-image through the Bedrock runtime `invoke` endpoint.
pub struct HttpImageClient {
    invoke_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpImageClient {
    pub fn new(config: ImageConfig) -> Result<Self> {
        // Rendering routinely takes minutes
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let invoke_url = format!(
            "{}/model/{}/invoke",
            config.base_url.trim_end_matches('/'),
            config.model
        );

        debug!(
            "Creating image client for {} (timeout {}s)",
            invoke_url, config.timeout_secs
        );

        Ok(Self {
            invoke_url,
            api_key: config.api_key,
            client,
        })
    }

    pub fn invoke_url(&self) -> &str {
        &self.invoke_url
    }
}

#[async_trait]
impl ImageClient for HttpImageClient {
    async fn generate(&self, request: &ImageGenerationRequest) -> Result<ImageGenerationResponse> {
        let mut req_builder = self
            .client
            .post(&self.invoke_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(request);
        if !self.api_key.is_empty() {
            req_builder = req_builder.bearer_auth(&self.api_key);
        }

        let response = req_builder.send().await.map_err(|e| {
            Error::image_generation(format!("Failed to send image generation request: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::image_generation(format!(
                "Image model returned {}: {}",
                status, body
            )));
        }

        let parsed: ImageGenerationResponse = response.json().await.map_err(|e| {
            Error::image_generation(format!("Failed to parse image generation response: {}", e))
        })?;

        debug!("Received {} generated images", parsed.images.len());
        Ok(parsed)
    }
}
