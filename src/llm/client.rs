use super::types::*;
use crate::{
    Error, Result,
    config::{DEFAULT_BEDROCK_URL, LlmConfig, LlmProvider},
};
use async_openai::{Client, config::OpenAIConfig, types as openai_types};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Model identifier placed in every request.
    fn model(&self) -> &str;

    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse>;
}

pub fn create_llm_client(config: LlmConfig) -> Box<dyn LlmClient> {
    match config.provider {
        LlmProvider::Openai => Box::new(OpenAiClient::new(config)),
        LlmProvider::Bedrock => Box::new(BedrockClient::new(config)),
    }
}

pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(config.api_key);

        if !config.base_url.is_empty() {
            openai_config = openai_config.with_api_base(config.base_url);
        }

        let client = Client::with_config(openai_config);

        Self {
            client,
            model: config.model,
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        debug!(
            "Creating chat completion with {} messages",
            request.messages.len()
        );

        let mut messages = Vec::new();
        for msg in &request.messages {
            messages.push(msg.to_openai_message()?);
        }

        let mut request_builder = openai_types::CreateChatCompletionRequestArgs::default();
        request_builder.model(&request.model).messages(messages);

        if let Some(temperature) = request.temperature {
            request_builder.temperature(temperature);
        }

        if let Some(max_tokens) = request.max_tokens {
            request_builder.max_completion_tokens(max_tokens);
        }

        let openai_request = request_builder.build()?;

        let response = self.client.chat().create(openai_request).await?;

        debug!(
            "Received chat completion response with {} choices",
            response.choices.len()
        );

        let choices = response
            .choices
            .into_iter()
            .map(|choice| Choice {
                index: choice.index,
                message: ChatMessage {
                    role: format!("{:?}", choice.message.role).to_lowercase(),
                    content: choice.message.content.unwrap_or_default(),
                },
                finish_reason: choice.finish_reason.map(|fr| format!("{fr:?}")),
            })
            .collect();

        let usage = response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ChatCompletionResponse {
            id: response.id,
            model: response.model,
            choices,
            usage,
        })
    }
}

/// Text generation through the Bedrock runtime `invoke` endpoint.
pub struct BedrockClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl BedrockClient {
    pub fn new(config: LlmConfig) -> Self {
        let base_url = if config.base_url.is_empty() {
            DEFAULT_BEDROCK_URL
        } else {
            config.base_url.trim_end_matches('/')
        };

        Self {
            base_url: base_url.to_string(),
            api_key: config.api_key,
            model: config.model,
            client: reqwest::Client::new(),
        }
    }

    fn invoke_url(&self, model: &str) -> String {
        format!("{}/model/{}/invoke", self.base_url, model)
    }
}

#[async_trait]
impl LlmClient for BedrockClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        let body = BedrockRequest::from_chat(&request);
        let url = self.invoke_url(&request.model);

        debug!("Invoking text model {} at {}", request.model, url);

        let mut req_builder = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body);
        if !self.api_key.is_empty() {
            req_builder = req_builder.bearer_auth(&self.api_key);
        }

        let response = req_builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::generation(format!(
                "Text model returned {}: {}",
                status, body
            )));
        }

        let response_json: Value = response.json().await?;

        let text = response_json
            .pointer("/output/message/content/0/text")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::generation("Response is missing output.message.content[0].text"))?;

        let role = response_json
            .pointer("/output/message/role")
            .and_then(Value::as_str)
            .unwrap_or("assistant");

        let finish_reason = response_json
            .get("stopReason")
            .and_then(Value::as_str)
            .map(str::to_string);

        let usage = response_json
            .get("usage")
            .cloned()
            .and_then(|u| serde_json::from_value::<BedrockUsage>(u).ok())
            .map(Usage::from);

        Ok(ChatCompletionResponse {
            id: String::new(),
            model: request.model,
            choices: vec![Choice {
                index: 0,
                message: ChatMessage {
                    role: role.to_string(),
                    content: text.to_string(),
                },
                finish_reason,
            }],
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn create_test_config() -> LlmConfig {
        LlmConfig {
            provider: LlmProvider::Bedrock,
            base_url: "https://bedrock.example.com/".to_string(),
            api_key: "test-api-key".to_string(),
            model: "amazon.nova-micro-v1:0".to_string(),
            max_tokens: None,
            temperature: None,
        }
    }

    #[test]
    fn test_openai_client_creation() {
        let mut config = create_test_config();
        config.provider = LlmProvider::Openai;
        config.model = "gpt-4".to_string();
        let client = OpenAiClient::new(config);

        assert_eq!(client.model(), "gpt-4");
    }

    #[test]
    fn test_bedrock_invoke_url_strips_trailing_slash() {
        let client = BedrockClient::new(create_test_config());
        assert_eq!(
            client.invoke_url("amazon.nova-micro-v1:0"),
            "https://bedrock.example.com/model/amazon.nova-micro-v1:0/invoke"
        );
    }

    #[test]
    fn test_bedrock_falls_back_to_public_endpoint() {
        let mut config = create_test_config();
        config.base_url = String::new();
        let client = BedrockClient::new(config);
        assert_eq!(
            client.invoke_url("m"),
            format!("{}/model/m/invoke", DEFAULT_BEDROCK_URL)
        );
    }

    #[test]
    fn test_factory_selects_provider_model() {
        let client = create_llm_client(create_test_config());
        assert_eq!(client.model(), "amazon.nova-micro-v1:0");
    }
}
