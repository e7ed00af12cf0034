use async_trait::async_trait;
use pet_recipe::{
    Error, Result,
    imagegen::{ImageClient, ImageGenerationRequest, ImageGenerationResponse},
    llm::{ChatCompletionRequest, ChatCompletionResponse, LlmClient},
    vision::{DetectedLabel, LabelDetector},
};
use std::sync::{Arc, Mutex};

/// Mock label detector; clones share recorded calls
#[derive(Debug, Clone, Default)]
pub struct MockLabelDetector {
    pub labels: Arc<Mutex<Vec<DetectedLabel>>>,
    pub calls: Arc<Mutex<Vec<(Vec<u8>, u32)>>>,
    pub error: Option<String>,
}

impl MockLabelDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_labels(self, labels: Vec<DetectedLabel>) -> Self {
        *self.labels.lock().unwrap() = labels;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LabelDetector for MockLabelDetector {
    async fn detect_labels(&self, image: &[u8], max_labels: u32) -> Result<Vec<DetectedLabel>> {
        self.calls.lock().unwrap().push((image.to_vec(), max_labels));

        if let Some(ref error) = self.error {
            // Raw transport-style error; the adapter must convert it
            return Err(Error::internal(error.clone()));
        }

        Ok(self.labels.lock().unwrap().clone())
    }
}

/// Mock LLM client for testing
#[derive(Debug, Clone)]
pub struct MockLlmClient {
    pub model: String,
    pub responses: Arc<Mutex<Vec<ChatCompletionResponse>>>,
    pub requests: Arc<Mutex<Vec<ChatCompletionRequest>>>,
    pub error: Option<String>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            model: "amazon.nova-micro-v1:0".to_string(),
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            error: None,
        }
    }

    pub fn with_responses(self, responses: Vec<ChatCompletionResponse>) -> Self {
        *self.responses.lock().unwrap() = responses;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn add_response(&self, response: ChatCompletionResponse) {
        self.responses.lock().unwrap().push(response);
    }

    pub fn get_requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        self.requests.lock().unwrap().push(request);

        if let Some(ref error) = self.error {
            return Err(Error::internal(error.clone()));
        }

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(Error::internal("No more mock responses available"));
        }

        Ok(responses.remove(0))
    }
}

/// Mock image generation client; replays one response for every call
#[derive(Debug, Clone, Default)]
pub struct MockImageClient {
    pub response: Arc<Mutex<ImageGenerationResponse>>,
    pub requests: Arc<Mutex<Vec<ImageGenerationRequest>>>,
    pub error: Option<String>,
}

impl MockImageClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: ImageGenerationResponse) -> Self {
        *self.response.lock().unwrap() = response;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn get_requests(&self) -> Vec<ImageGenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageClient for MockImageClient {
    async fn generate(&self, request: &ImageGenerationRequest) -> Result<ImageGenerationResponse> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(ref error) = self.error {
            return Err(Error::internal(error.clone()));
        }

        Ok(self.response.lock().unwrap().clone())
    }
}
