use super::fsm::PipelineState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// What a single run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub final_state: PipelineState,
    pub ingredients_found: Vec<String>,
    pub recipe_title: Option<String>,
    pub recipe_saved: bool,
    pub recipe_path: Option<PathBuf>,
    pub image_saved: bool,
    pub image_path: Option<PathBuf>,
    pub failures: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunOutcome {
    /// Reached `Done`, possibly without every artifact.
    pub fn completed(&self) -> bool {
        self.final_state == PipelineState::Done
    }

    pub fn aborted(&self) -> bool {
        self.final_state == PipelineState::Aborted
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.aborted() {
            writeln!(f, "Run aborted, nothing was produced.")?;
        } else {
            writeln!(f, "Run complete.")?;
        }

        if self.ingredients_found.is_empty() {
            writeln!(f, "Ingredients: none")?;
        } else {
            writeln!(f, "Ingredients:")?;
            for ingredient in &self.ingredients_found {
                writeln!(f, "- {}", ingredient)?;
            }
        }

        if let Some(title) = &self.recipe_title {
            writeln!(f, "Recipe: {}", title)?;
        }

        match &self.recipe_path {
            Some(path) => writeln!(f, "Recipe saved to {}", path.display())?,
            None => writeln!(f, "Recipe not saved")?,
        }

        match &self.image_path {
            Some(path) => writeln!(f, "Image saved to {}", path.display())?,
            None => writeln!(f, "Image not saved")?,
        }

        for failure in &self.failures {
            writeln!(f, "! {}", failure)?;
        }

        Ok(())
    }
}
