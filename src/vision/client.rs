use super::types::*;
use crate::{Error, Result, config::VisionConfig};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashMap;
use tracing::debug;

#[async_trait]
pub trait LabelDetector: Send + Sync {
    /// Returns labels in the order the service ranked them.
    async fn detect_labels(&self, image: &[u8], max_labels: u32) -> Result<Vec<DetectedLabel>>;
}

pub struct HttpLabelDetector {
    endpoint: String,
    headers: HashMap<String, String>,
    client: reqwest::Client,
}

impl HttpLabelDetector {
    pub fn new(config: VisionConfig) -> Self {
        debug!("Creating label-detection client for: {}", config.endpoint);

        Self {
            endpoint: config.endpoint,
            headers: config.headers,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LabelDetector for HttpLabelDetector {
    async fn detect_labels(&self, image: &[u8], max_labels: u32) -> Result<Vec<DetectedLabel>> {
        let request = LabelDetectionRequest {
            image: ImagePayload {
                bytes: STANDARD.encode(image),
            },
            max_labels,
        };

        let mut req_builder = self.client.post(&self.endpoint).json(&request);
        for (key, value) in &self.headers {
            req_builder = req_builder.header(key, value);
        }

        debug!(
            "Sending {} image bytes for label detection (max {} labels)",
            image.len(),
            max_labels
        );

        let response = req_builder.send().await.map_err(|e| {
            Error::detection(format!("Failed to send label detection request: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::detection(format!(
                "Label detection service returned {}: {}",
                status, body
            )));
        }

        let parsed: LabelDetectionResponse = response.json().await.map_err(|e| {
            Error::detection(format!("Failed to parse label detection response: {}", e))
        })?;

        debug!("Received {} labels", parsed.labels.len());
        Ok(parsed.labels)
    }
}
