//! Generation parameters and results.

use crate::error::{Result, YardVizError};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Seeds are drawn from `0..MAX_RANDOM_SEED` when none is given.
pub const MAX_RANDOM_SEED: u64 = 1_000_000;

/// Knobs passed to the image-to-image provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// How far the output may drift from the input (0, 1].
    pub strength: f32,
    /// Prompt adherence.
    pub guidance_scale: f32,
    /// Denoising steps; more is slower and finer.
    pub num_inference_steps: u32,
    /// Seed; chosen at random per call when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::comprehensive()
    }
}

impl GenerationParams {
    /// Settings for a full single-address makeover.
    pub fn comprehensive() -> Self {
        Self {
            strength: 0.4,
            guidance_scale: 5.0,
            num_inference_steps: 30,
            seed: None,
        }
    }

    /// Subtle settings that keep the original structure nearly intact.
    pub fn conservative() -> Self {
        Self {
            strength: 0.15,
            guidance_scale: 2.0,
            num_inference_steps: 12,
            seed: None,
        }
    }

    /// Sets the strength.
    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    /// Sets the guidance scale.
    pub fn with_guidance_scale(mut self, guidance_scale: f32) -> Self {
        self.guidance_scale = guidance_scale;
        self
    }

    /// Sets the number of inference steps.
    pub fn with_num_inference_steps(mut self, steps: u32) -> Self {
        self.num_inference_steps = steps;
        self
    }

    /// Pins the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns a copy with a concrete seed, drawing one if unset.
    pub fn resolved(&self) -> Self {
        Self {
            seed: Some(
                self.seed
                    .unwrap_or_else(|| rand::thread_rng().gen_range(0..MAX_RANDOM_SEED)),
            ),
            ..*self
        }
    }

    /// Checks value ranges before anything is submitted.
    pub fn validate(&self) -> Result<()> {
        if !(self.strength > 0.0 && self.strength <= 1.0) {
            return Err(YardVizError::InvalidInput(format!(
                "strength must be in (0, 1], got {}",
                self.strength
            )));
        }
        if !self.guidance_scale.is_finite() || self.guidance_scale < 0.0 {
            return Err(YardVizError::InvalidInput(format!(
                "guidance_scale must be a non-negative number, got {}",
                self.guidance_scale
            )));
        }
        if self.num_inference_steps == 0 {
            return Err(YardVizError::InvalidInput(
                "num_inference_steps must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// The generated "after" image and how it was requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationResult {
    /// URL of the generated image.
    pub image_url: String,
    /// Seed actually used.
    pub seed: u64,
    /// Parameters submitted, with the seed filled in.
    pub params: GenerationParams,
    /// Model that produced the image.
    pub model: String,
    /// Provider job id, if the provider has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Wall-clock time from submit to result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}
