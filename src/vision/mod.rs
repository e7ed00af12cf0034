mod client;
mod types;

pub use client::{HttpLabelDetector, LabelDetector};
pub use types::*;

use crate::{Error, Result};
use tracing::{debug, warn};

/// Labels must score strictly above this to count as an ingredient.
pub const CONFIDENCE_THRESHOLD: f64 = 50.0;

pub const DEFAULT_MAX_LABELS: u32 = 10;

/// Keeps the names of labels scoring above [`CONFIDENCE_THRESHOLD`], in input order.
pub fn filter_ingredients(labels: &[DetectedLabel]) -> Vec<String> {
    labels
        .iter()
        .filter(|label| label.confidence > CONFIDENCE_THRESHOLD)
        .map(|label| label.name.clone())
        .collect()
}

/// Detects ingredients in an image.
///
/// Every failure is reported as [`Error::Detection`]; an empty result is a
/// success.
pub async fn detect_ingredients(
    detector: &dyn LabelDetector,
    image: &[u8],
    max_labels: u32,
) -> Result<Vec<String>> {
    let labels = detect(detector, image, max_labels).await?;
    let ingredients = filter_ingredients(&labels);
    debug!(
        "Kept {} of {} labels above confidence {}",
        ingredients.len(),
        labels.len(),
        CONFIDENCE_THRESHOLD
    );
    Ok(ingredients)
}

/// Returns every label name the service reports, unfiltered.
pub async fn detect_labels(
    detector: &dyn LabelDetector,
    image: &[u8],
    max_labels: u32,
) -> Result<Vec<String>> {
    let labels = detect(detector, image, max_labels).await?;
    Ok(labels.into_iter().map(|label| label.name).collect())
}

async fn detect(
    detector: &dyn LabelDetector,
    image: &[u8],
    max_labels: u32,
) -> Result<Vec<DetectedLabel>> {
    if image.is_empty() {
        return Err(Error::detection("image payload is empty"));
    }

    detector
        .detect_labels(image, max_labels)
        .await
        .map_err(|e| match e {
            Error::Detection(_) => e,
            other => Error::detection(other.to_string()),
        })
        .inspect_err(|e| warn!("{}", e))
}
