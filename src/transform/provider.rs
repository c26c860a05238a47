//! Transformer trait.

use crate::error::Result;
use crate::imagery::AcquiredImage;
use crate::transform::types::{GenerationParams, TransformationResult};
use async_trait::async_trait;

/// Trait for image-to-image generation providers.
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Submits `image` with `instructions` and waits for the generated image.
    ///
    /// Rejected input, job timeouts and jobs finishing without an image all
    /// come back as errors.
    async fn transform(
        &self,
        image: &AcquiredImage,
        instructions: &str,
        params: &GenerationParams,
    ) -> Result<TransformationResult>;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str;
}
