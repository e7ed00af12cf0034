use super::{
    fsm::{PipelineEvent, PipelineState, PipelineStateMachine},
    outcome::RunOutcome,
};
use crate::{
    Error, Result,
    config::Config,
    imagegen::{HttpImageClient, ImageClient, generate_recipe_image},
    llm::{GenerationOptions, LlmClient, create_llm_client, generate_recipe},
    output::{save_bytes, save_text},
    prompt::{SubjectInfo, build_recipe_prompt},
    vision::{DEFAULT_MAX_LABELS, HttpLabelDetector, LabelDetector, detect_ingredients},
};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub max_labels: u32,
    pub generation: GenerationOptions,
    pub recipe_path: PathBuf,
    pub image_path: PathBuf,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_labels: DEFAULT_MAX_LABELS,
            generation: GenerationOptions::default(),
            recipe_path: PathBuf::from("recipe.txt"),
            image_path: PathBuf::from("generated_recipe.png"),
        }
    }
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_labels: config.vision.max_labels,
            generation: GenerationOptions {
                max_tokens: config.llm.max_tokens,
                temperature: config.llm.temperature,
            },
            recipe_path: PathBuf::from(&config.output.recipe_path),
            image_path: PathBuf::from(&config.output.image_path),
        }
    }
}

/// Photo to recipe to rendered dish, one stage at a time.
pub struct Pipeline {
    detector: Box<dyn LabelDetector>,
    llm_client: Box<dyn LlmClient>,
    image_client: Box<dyn ImageClient>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        detector: Box<dyn LabelDetector>,
        llm_client: Box<dyn LlmClient>,
        image_client: Box<dyn ImageClient>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            detector,
            llm_client,
            image_client,
            settings,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        info!(
            "Initializing pipeline (text model: {}, image model: {})",
            config.llm.model, config.image.model
        );

        Ok(Self::new(
            Box::new(HttpLabelDetector::new(config.vision.clone())),
            create_llm_client(config.llm.clone()),
            Box::new(HttpImageClient::new(config.image.clone())?),
            PipelineSettings::from_config(config),
        ))
    }

    /// Runs the pipeline on an image file. An unreadable file aborts the run
    /// the same way a failed detection does.
    pub async fn run(&self, image_path: impl AsRef<Path>, subject: &SubjectInfo) -> RunOutcome {
        let image_path = image_path.as_ref();
        let image = tokio::fs::read(image_path).await.map_err(|e| {
            Error::detection(format!(
                "failed to read image {}: {}",
                image_path.display(),
                e
            ))
        });
        self.execute(image, subject).await
    }

    pub async fn run_with_bytes(&self, image: Vec<u8>, subject: &SubjectInfo) -> RunOutcome {
        self.execute(Ok(image), subject).await
    }

    async fn execute(&self, image: Result<Vec<u8>>, subject: &SubjectInfo) -> RunOutcome {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id);
        let started_at = Utc::now();

        let mut fsm = PipelineStateMachine::new();
        if let Err(e) = self.drive(&mut fsm, image, subject).instrument(span).await {
            // Only the state machine itself can fail here
            error!("Pipeline stopped unexpectedly: {}", e);
            fsm.context.record_failure(&e);
            if !fsm.is_terminal() {
                if let Err(abort_err) = fsm.transition(PipelineEvent::Abort) {
                    warn!("Could not mark run as aborted: {}", abort_err);
                }
            }
        }

        let final_state = fsm.current_state();
        let context = fsm.context;
        RunOutcome {
            run_id,
            final_state,
            ingredients_found: context.ingredients,
            recipe_title: context.recipe_title,
            recipe_saved: context.recipe_saved,
            recipe_path: context
                .recipe_saved
                .then(|| self.settings.recipe_path.clone()),
            image_saved: context.image_saved,
            image_path: context.image_saved.then(|| self.settings.image_path.clone()),
            failures: context.failures,
            started_at,
            finished_at: Utc::now(),
        }
    }

    async fn drive(
        &self,
        fsm: &mut PipelineStateMachine,
        image: Result<Vec<u8>>,
        subject: &SubjectInfo,
    ) -> Result<()> {
        let start_time = std::time::Instant::now();
        fsm.transition(PipelineEvent::Begin)?;

        let mut image = Some(image);
        while !fsm.is_terminal() {
            debug!("Pipeline stage: {:?}", fsm.current_state());

            match fsm.current_state() {
                PipelineState::Detecting => {
                    let image = image
                        .take()
                        .unwrap_or_else(|| Err(Error::internal("image was already consumed")));
                    self.detect_stage(fsm, image).await?;
                }
                PipelineState::RecipeGenerating => self.recipe_stage(fsm, subject).await?,
                PipelineState::RecipeSaving => self.save_recipe_stage(fsm).await?,
                PipelineState::ImageGenerating => self.image_stage(fsm).await?,
                PipelineState::ImageSaving => self.save_image_stage(fsm).await?,
                state @ (PipelineState::Start | PipelineState::Done | PipelineState::Aborted) => {
                    return Err(Error::fsm(format!("unexpected state {:?} in run loop", state)));
                }
            }
        }

        info!(
            "Pipeline finished in {:?} with state {:?}",
            start_time.elapsed(),
            fsm.current_state()
        );
        Ok(())
    }

    async fn detect_stage(
        &self,
        fsm: &mut PipelineStateMachine,
        image: Result<Vec<u8>>,
    ) -> Result<()> {
        info!("Reading image and detecting ingredients...");

        let detected = match image {
            Ok(bytes) => {
                detect_ingredients(self.detector.as_ref(), &bytes, self.settings.max_labels).await
            }
            Err(e) => Err(e),
        };

        match detected {
            Ok(ingredients) => {
                if ingredients.is_empty() {
                    warn!("No ingredients passed the confidence filter, continuing anyway");
                } else {
                    info!("Found these ingredients: {}", ingredients.join(", "));
                }
                fsm.context.ingredients = ingredients;
                fsm.transition(PipelineEvent::IngredientsDetected)
            }
            Err(e) => {
                error!("Error in processing image or detecting ingredients: {}", e);
                fsm.context.record_failure(&e);
                fsm.transition(PipelineEvent::DetectionFailed)
            }
        }
    }

    async fn recipe_stage(
        &self,
        fsm: &mut PipelineStateMachine,
        subject: &SubjectInfo,
    ) -> Result<()> {
        info!("Generating recipe...");

        let prompt = build_recipe_prompt(&fsm.context.ingredients, subject);
        debug!("Recipe prompt: {}", prompt);

        match generate_recipe(
            self.llm_client.as_ref(),
            &prompt,
            self.settings.generation,
        )
        .await
        {
            Ok(recipe) => {
                let title = recipe.title();
                info!("Generated recipe: {}", title);
                fsm.context.recipe_title = Some(title);
                fsm.context.recipe = Some(recipe);
                fsm.transition(PipelineEvent::RecipeGenerated)
            }
            Err(e) => {
                error!("Error in recipe generation: {}", e);
                fsm.context.record_failure(&e);
                fsm.transition(PipelineEvent::GenerationFailed)
            }
        }
    }

    async fn save_recipe_stage(&self, fsm: &mut PipelineStateMachine) -> Result<()> {
        info!("Saving recipe...");

        let Some(recipe) = fsm.context.recipe.as_ref() else {
            let e = Error::internal("no recipe to save");
            fsm.context.record_failure(&e);
            return fsm.transition(PipelineEvent::Abort);
        };

        let path = &self.settings.recipe_path;
        if save_text(&recipe.text, path).await {
            info!("Recipe has been saved to {}", path.display());
            fsm.context.recipe_saved = true;
            fsm.transition(PipelineEvent::RecipeSaved)
        } else {
            warn!("Failed to save recipe to {}", path.display());
            fsm.context.record_failure(&Error::persistence(format!(
                "recipe could not be written to {}",
                path.display()
            )));
            fsm.transition(PipelineEvent::RecipeSaveFailed)
        }
    }

    async fn image_stage(&self, fsm: &mut PipelineStateMachine) -> Result<()> {
        info!("Generating recipe image...");

        let title = fsm.context.recipe_title.clone().unwrap_or_default();
        match generate_recipe_image(self.image_client.as_ref(), &title).await {
            Ok(bytes) => {
                debug!("Decoded {} image bytes", bytes.len());
                fsm.context.image = Some(bytes);
                fsm.transition(PipelineEvent::ImageGenerated)
            }
            Err(e) => {
                warn!("Failed to generate recipe image: {}", e);
                fsm.context.record_failure(&e);
                fsm.transition(PipelineEvent::ImageGenerationFailed)
            }
        }
    }

    async fn save_image_stage(&self, fsm: &mut PipelineStateMachine) -> Result<()> {
        let Some(bytes) = fsm.context.image.take() else {
            let e = Error::internal("no image to save");
            fsm.context.record_failure(&e);
            return fsm.transition(PipelineEvent::ImageSaveFailed);
        };

        let path = &self.settings.image_path;
        if save_bytes(&bytes, path).await {
            info!("Recipe image has been saved to {}", path.display());
            fsm.context.image_saved = true;
            fsm.transition(PipelineEvent::ImageSaved)
        } else {
            warn!("Failed to save recipe image to {}", path.display());
            fsm.context.record_failure(&Error::persistence(format!(
                "image could not be written to {}",
                path.display()
            )));
            fsm.transition(PipelineEvent::ImageSaveFailed)
        }
    }
}
