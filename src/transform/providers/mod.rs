//! Image-to-image generation providers.

#[cfg(feature = "fal")]
mod fal;

#[cfg(feature = "fal")]
pub use fal::{FalKontextModel, FalTransformer, FalTransformerBuilder};
