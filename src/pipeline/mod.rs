mod executor;
pub mod fsm;
mod outcome;

pub use executor::{Pipeline, PipelineSettings};
pub use fsm::{PipelineContext, PipelineEvent, PipelineState, PipelineStateMachine};
pub use outcome::RunOutcome;
