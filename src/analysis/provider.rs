//! Scene analyzer trait.

use crate::error::Result;
use crate::imagery::AcquiredImage;
use async_trait::async_trait;

/// Trait for vision-capable language models that assess a property photo.
#[async_trait]
pub trait SceneAnalyzer: Send + Sync {
    /// Returns the model's free-form assessment of `image`, verbatim.
    async fn analyze(&self, image: &AcquiredImage) -> Result<String>;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str;
}
