pub mod config;
pub mod error;
pub mod imagegen;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod vision;

pub use error::{Error, Result};
