//! Scene analysis module.

mod prompt;
mod provider;
pub mod providers;

pub use prompt::PROPERTY_ANALYSIS_PROMPT;
pub use provider::SceneAnalyzer;
