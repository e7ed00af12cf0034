mod client;
mod types;

pub use client::{BedrockClient, LlmClient, OpenAiClient, create_llm_client};
pub use types::*;

use crate::{Error, Result};
use tracing::{debug, warn};

/// Optional sampling knobs forwarded with the recipe request.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

pub fn build_recipe_request(
    model: &str,
    prompt: &str,
    options: GenerationOptions,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::user(prompt)],
        max_tokens: options.max_tokens,
        temperature: options.temperature,
    }
}

/// Asks the text model for a recipe. Single attempt; every failure is an
/// [`Error::Generation`].
pub async fn generate_recipe(
    client: &dyn LlmClient,
    prompt: &str,
    options: GenerationOptions,
) -> Result<RecipeDocument> {
    let request = build_recipe_request(client.model(), prompt, options);

    let response = client
        .create_chat_completion(request)
        .await
        .map_err(|e| match e {
            Error::Generation(_) => e,
            other => Error::generation(other.to_string()),
        })
        .inspect_err(|e| warn!("{}", e))?;

    if let Some(usage) = &response.usage {
        debug!(
            "Recipe used {} prompt + {} completion tokens",
            usage.prompt_tokens, usage.completion_tokens
        );
    }

    let text = extract_text(&response).inspect_err(|e| warn!("{}", e))?;
    Ok(RecipeDocument::new(text))
}

/// The generated text lives in the first choice's message.
pub fn extract_text(response: &ChatCompletionResponse) -> Result<String> {
    let choice = response
        .choices
        .first()
        .ok_or_else(|| Error::generation("response contained no choices"))?;

    if choice.message.content.trim().is_empty() {
        return Err(Error::generation("first choice carried no text"));
    }

    Ok(choice.message.content.clone())
}
