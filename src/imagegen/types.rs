use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const TEXT_IMAGE_TASK: &str = "TEXT_IMAGE";
pub const IMAGE_COUNT: u32 = 1;
pub const CFG_SCALE: f32 = 8.0;
pub const IMAGE_SIZE: u32 = 512;
pub const IMAGE_SEED: u64 = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerationRequest {
    pub task_type: String,
    pub text_to_image_params: TextToImageParams,
    pub image_generation_config: ImageGenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextToImageParams {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerationConfig {
    pub number_of_images: u32,
    pub cfg_scale: f32,
    pub height: u32,
    pub width: u32,
    pub seed: u64,
}

impl ImageGenerationRequest {
    /// Text-to-image request with the fixed count, guidance, size and seed.
    pub fn text_to_image(prompt: impl Into<String>) -> Self {
        Self {
            task_type: TEXT_IMAGE_TASK.to_string(),
            text_to_image_params: TextToImageParams {
                text: prompt.into(),
            },
            image_generation_config: ImageGenerationConfig {
                number_of_images: IMAGE_COUNT,
                cfg_scale: CFG_SCALE,
                height: IMAGE_SIZE,
                width: IMAGE_SIZE,
                seed: IMAGE_SEED,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageGenerationResponse {
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub error: Option<Value>,
}
