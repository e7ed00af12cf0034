use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pet_recipe::{
    imagegen::ImageGenerationResponse,
    llm::{ChatCompletionResponse, ChatMessage, Choice, Usage},
    pipeline::{Pipeline, PipelineSettings},
    vision::DetectedLabel,
};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

use super::mocks::{MockImageClient, MockLabelDetector, MockLlmClient};

pub const SAMPLE_RECIPE: &str = "Recipe Name: Salmon Bowl\n\
Ingredients:\n- 200g salmon\n- 100g rice\n\
Instructions:\n1. Cook the rice.\n2. Steam the salmon.\n\
Nutritional Analysis:\nProtein 28g, Omega-3 1.2g\n";

pub const SAMPLE_IMAGE: &[u8] = b"\x89PNG\r\n\x1a\nfake-image-data";

pub const SAMPLE_PHOTO: &[u8] = b"\xff\xd8\xff\xe0fake-jpeg";

/// The label list from the salmon-and-rice photo
pub fn salmon_labels() -> Vec<DetectedLabel> {
    vec![
        DetectedLabel::new("Salmon", 92.1),
        DetectedLabel::new("Rice", 61.0),
        DetectedLabel::new("Plate", 34.0),
    ]
}

pub fn create_mock_chat_response(content: &str) -> ChatCompletionResponse {
    ChatCompletionResponse {
        id: "resp-123".to_string(),
        model: "amazon.nova-micro-v1:0".to_string(),
        choices: vec![Choice {
            index: 0,
            message: ChatMessage::assistant(content),
            finish_reason: Some("end_turn".to_string()),
        }],
        usage: Some(Usage {
            prompt_tokens: 60,
            completion_tokens: 240,
            total_tokens: 300,
        }),
    }
}

pub fn create_mock_image_response(bytes: &[u8]) -> ImageGenerationResponse {
    serde_json::from_value(json!({ "images": [STANDARD.encode(bytes)], "error": null }))
        .expect("valid image response")
}

pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

pub fn settings_in(dir: &Path) -> PipelineSettings {
    PipelineSettings {
        recipe_path: dir.join("recipe.txt"),
        image_path: dir.join("generated_recipe.png"),
        ..PipelineSettings::default()
    }
}

/// Mocks that succeed at every stage
pub fn happy_mocks() -> (MockLabelDetector, MockLlmClient, MockImageClient) {
    (
        MockLabelDetector::new().with_labels(salmon_labels()),
        MockLlmClient::new().with_responses(vec![create_mock_chat_response(SAMPLE_RECIPE)]),
        MockImageClient::new().with_response(create_mock_image_response(SAMPLE_IMAGE)),
    )
}

pub fn build_pipeline(
    detector: &MockLabelDetector,
    llm: &MockLlmClient,
    image: &MockImageClient,
    settings: PipelineSettings,
) -> Pipeline {
    Pipeline::new(
        Box::new(detector.clone()),
        Box::new(llm.clone()),
        Box::new(image.clone()),
        settings,
    )
}
