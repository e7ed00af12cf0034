mod client;
mod types;

pub use client::{HttpImageClient, ImageClient};
pub use types::*;

use crate::{Error, Result, prompt::build_image_prompt};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, warn};

pub fn build_image_request(recipe_title: &str) -> ImageGenerationRequest {
    ImageGenerationRequest::text_to_image(build_image_prompt(recipe_title))
}

/// Renders the finished dish and returns the decoded image bytes.
///
/// Nothing is written here; every failure is an [`Error::ImageGeneration`].
pub async fn generate_recipe_image(client: &dyn ImageClient, recipe_title: &str) -> Result<Vec<u8>> {
    let request = build_image_request(recipe_title);
    debug!(
        "Requesting image for prompt: {}",
        request.text_to_image_params.text
    );

    let response = client
        .generate(&request)
        .await
        .map_err(|e| match e {
            Error::ImageGeneration(_) => e,
            other => Error::image_generation(other.to_string()),
        })
        .inspect_err(|e| warn!("{}", e))?;

    decode_first_image(&response).inspect_err(|e| warn!("{}", e))
}

pub fn decode_first_image(response: &ImageGenerationResponse) -> Result<Vec<u8>> {
    if let Some(error) = response.error.as_ref().filter(|e| !e.is_null()) {
        return Err(Error::image_generation(format!("model reported: {}", error)));
    }

    let encoded = response
        .images
        .first()
        .ok_or_else(|| Error::image_generation("response contained no images"))?;

    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::image_generation(format!("invalid base64 image payload: {}", e)))?;

    if bytes.is_empty() {
        return Err(Error::image_generation("decoded image is empty"));
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = build_image_request("Salmon Bowl");

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "taskType": "TEXT_IMAGE",
                "textToImageParams": {
                    "text": "A appetizing bowl of Salmon Bowl pet food, professional food photography style"
                },
                "imageGenerationConfig": {
                    "numberOfImages": 1,
                    "cfgScale": 8.0,
                    "height": 512,
                    "width": 512,
                    "seed": 0
                }
            })
        );
    }

    #[test]
    fn test_request_is_reproducible() {
        let a = serde_json::to_vec(&build_image_request("Tuna Mash")).unwrap();
        let b = serde_json::to_vec(&build_image_request("Tuna Mash")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_decode_first_image() {
        let response = ImageGenerationResponse {
            images: vec![STANDARD.encode(b"\x89PNG-one"), STANDARD.encode(b"two")],
            error: None,
        };

        assert_eq!(decode_first_image(&response).unwrap(), b"\x89PNG-one".to_vec());
    }

    #[test]
    fn test_null_error_field_is_not_a_failure() {
        let response: ImageGenerationResponse =
            serde_json::from_value(json!({"images": [STANDARD.encode(b"png")], "error": null}))
                .unwrap();

        assert!(decode_first_image(&response).is_ok());
    }

    #[test]
    fn test_error_field_fails() {
        let response: ImageGenerationResponse = serde_json::from_value(
            json!({"images": [STANDARD.encode(b"png")], "error": "content filtered"}),
        )
        .unwrap();

        let err = decode_first_image(&response).unwrap_err();
        assert!(matches!(err, Error::ImageGeneration(_)));
        assert!(err.to_string().contains("content filtered"));
    }

    #[test]
    fn test_missing_images_fails() {
        let response = ImageGenerationResponse::default();
        assert!(matches!(
            decode_first_image(&response).unwrap_err(),
            Error::ImageGeneration(_)
        ));
    }

    #[test]
    fn test_invalid_base64_fails() {
        let response = ImageGenerationResponse {
            images: vec!["not base64 !!!".to_string()],
            error: None,
        };
        assert!(matches!(
            decode_first_image(&response).unwrap_err(),
            Error::ImageGeneration(_)
        ));
    }
}
