use serde::{Deserialize, Serialize};

/// A single tag returned by the label-detection service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectedLabel {
    pub name: String,
    /// 0-100
    pub confidence: f64,
}

impl DetectedLabel {
    pub fn new(name: impl Into<String>, confidence: f64) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LabelDetectionRequest {
    pub image: ImagePayload,
    pub max_labels: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImagePayload {
    /// Base64 of the raw image bytes.
    pub bytes: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LabelDetectionResponse {
    pub labels: Vec<DetectedLabel>,
}
