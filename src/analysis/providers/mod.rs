//! Scene analysis providers.

#[cfg(feature = "gemini")]
mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiAnalyzer, GeminiAnalyzerBuilder, GeminiVisionModel};
