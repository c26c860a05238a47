//! Transformation request module.

pub mod prompts;
mod provider;
pub mod providers;
mod types;

pub use provider::Transformer;
pub use types::{GenerationParams, TransformationResult, MAX_RANDOM_SEED};
