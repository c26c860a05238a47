#![warn(missing_docs)]
//! YardViz - street-level property photos in, AI landscaping makeovers out.
//!
//! The crate fetches a "before" photo of an address from a street-level
//! imagery provider (trying several headings until one works), optionally asks
//! a vision model to assess the property, and submits an image-to-image job
//! that produces the "after" image.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use yardviz::{
//!     FalTransformer, GoogleGeocoder, InteractiveOrchestrator, LocationQuery,
//!     StreetViewProvider,
//! };
//!
//! #[tokio::main]
//! async fn main() -> yardviz::Result<()> {
//!     let orchestrator = InteractiveOrchestrator::new(
//!         Arc::new(StreetViewProvider::builder().build()?),
//!         Arc::new(FalTransformer::builder().build()?),
//!     )
//!     .with_geocoder(Arc::new(GoogleGeocoder::builder().build()?));
//!
//!     let query = LocationQuery::address("456 Maple Avenue, Arlington, VA 22201");
//!     let makeover = orchestrator.run(&query).await?;
//!     makeover.before.save("before.jpg")?;
//!     println!("after: {}", makeover.after.image_url);
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `google-maps`: Street View Static API imagery + Geocoding API
//! - `gemini`: Gemini vision scene analysis
//! - `fal`: fal.ai queue image-to-image (Flux Kontext)
//! - `cli`: Command-line interface

pub mod analysis;
pub mod config;
mod error;
pub mod imagery;
pub mod pipeline;
pub mod transform;

// Re-export error types at crate root
pub use error::{ErrorKind, Result, YardVizError, GENERIC_FAILURE_MESSAGE};

pub use analysis::SceneAnalyzer;
pub use imagery::{
    AcquiredImage, Acquirer, AngleSchedule, Coordinates, Geocoder, ImageryResponse,
    LocationQuery, StreetImagery, ViewingAngle,
};
pub use pipeline::{
    BatchOrchestrator, BatchReport, ExampleRecord, InteractiveOrchestrator, Makeover,
    SampleLocation, SessionState, Stage,
};
pub use transform::{GenerationParams, TransformationResult, Transformer};

#[cfg(feature = "google-maps")]
pub use imagery::providers::{
    GoogleGeocoder, GoogleGeocoderBuilder, StreetViewProvider, StreetViewProviderBuilder,
};

#[cfg(feature = "gemini")]
pub use analysis::providers::{GeminiAnalyzer, GeminiAnalyzerBuilder, GeminiVisionModel};

#[cfg(feature = "fal")]
pub use transform::providers::{FalKontextModel, FalTransformer, FalTransformerBuilder};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{ErrorKind, Result, YardVizError};
    pub use crate::imagery::{AcquiredImage, Acquirer, AngleSchedule, LocationQuery};
    pub use crate::pipeline::{BatchOrchestrator, InteractiveOrchestrator, SampleLocation};
    pub use crate::transform::GenerationParams;
    pub use crate::{Geocoder, SceneAnalyzer, StreetImagery, Transformer};

    #[cfg(feature = "google-maps")]
    pub use crate::imagery::providers::{GoogleGeocoder, StreetViewProvider};

    #[cfg(feature = "gemini")]
    pub use crate::analysis::providers::GeminiAnalyzer;

    #[cfg(feature = "fal")]
    pub use crate::transform::providers::FalTransformer;
}
