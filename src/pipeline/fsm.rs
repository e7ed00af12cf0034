use crate::{Error, Result, llm::RecipeDocument};
use serde::Serialize;
use tracing::{debug, info, warn};

// Pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Start,
    Detecting,
    RecipeGenerating,
    RecipeSaving,
    ImageGenerating,
    ImageSaving,
    Done,
    Aborted,
}

// Stage results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent {
    Begin,
    IngredientsDetected,
    DetectionFailed,
    RecipeGenerated,
    GenerationFailed,
    RecipeSaved,
    RecipeSaveFailed,
    ImageGenerated,
    ImageGenerationFailed,
    ImageSaved,
    ImageSaveFailed,
    Abort,
}

/// Data handed forward between stages of a single run.
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    pub ingredients: Vec<String>,
    pub recipe: Option<RecipeDocument>,
    pub recipe_title: Option<String>,
    pub image: Option<Vec<u8>>,
    pub recipe_saved: bool,
    pub image_saved: bool,
    /// Stage failures in the order they happened, fatal or not.
    pub failures: Vec<String>,
}

impl PipelineContext {
    pub fn record_failure(&mut self, error: &Error) {
        self.failures.push(error.to_string());
    }
}

pub struct PipelineStateMachine {
    state: PipelineState,
    pub context: PipelineContext,
}

impl Default for PipelineStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStateMachine {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Start,
            context: PipelineContext::default(),
        }
    }

    pub fn current_state(&self) -> PipelineState {
        self.state
    }

    pub fn transition(&mut self, event: PipelineEvent) -> Result<()> {
        use PipelineEvent as E;
        use PipelineState as S;

        let old_state = self.state;
        debug!("FSM processing event {:?} in state {:?}", event, old_state);

        let new_state = match (old_state, event) {
            (S::Start, E::Begin) => S::Detecting,
            (S::Detecting, E::IngredientsDetected) => S::RecipeGenerating,
            (S::Detecting, E::DetectionFailed) => S::Aborted,
            (S::RecipeGenerating, E::RecipeGenerated) => S::RecipeSaving,
            (S::RecipeGenerating, E::GenerationFailed) => S::Aborted,
            // A recipe that could not be written still gets its picture
            (S::RecipeSaving, E::RecipeSaved | E::RecipeSaveFailed) => S::ImageGenerating,
            (S::ImageGenerating, E::ImageGenerated) => S::ImageSaving,
            (S::ImageGenerating, E::ImageGenerationFailed) => S::Done,
            (S::ImageSaving, E::ImageSaved | E::ImageSaveFailed) => S::Done,
            (state, E::Abort) if !Self::is_terminal_state(state) => S::Aborted,
            _ => {
                warn!(
                    "Invalid FSM transition from {:?} with event {:?}",
                    old_state, event
                );
                return Err(Error::InvalidTransition {
                    current: format!("{:?}", old_state),
                    requested: format!("{:?}", event),
                });
            }
        };

        info!(
            "FSM state transition: {:?} -> {:?} (event: {:?})",
            old_state, new_state, event
        );

        self.state = new_state;
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        Self::is_terminal_state(self.state)
    }

    fn is_terminal_state(state: PipelineState) -> bool {
        matches!(state, PipelineState::Done | PipelineState::Aborted)
    }
}
