//! Single-address makeover - fetches the before photo and generates the after image.
//!
//! Run with: `cargo run --example makeover -- "456 Maple Avenue, Arlington, VA 22201"`
//!
//! Requires `GOOGLE_MAPS_API_KEY` and `FAL_KEY` environment variables.

use std::sync::Arc;
use yardviz::{
    FalTransformer, GoogleGeocoder, InteractiveOrchestrator, LocationQuery, StreetViewProvider,
};

#[tokio::main]
async fn main() -> yardviz::Result<()> {
    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "456 Maple Avenue, Arlington, VA 22201".to_string());

    let orchestrator = InteractiveOrchestrator::new(
        Arc::new(StreetViewProvider::builder().build()?),
        Arc::new(FalTransformer::builder().build()?),
    )
    .with_geocoder(Arc::new(GoogleGeocoder::builder().build()?));

    let makeover = orchestrator
        .run_with_observer(&LocationQuery::address(address), |state| {
            println!("stage: {}", state.stage);
        })
        .await?;

    makeover.before.save("before.jpg")?;
    println!(
        "Before saved to before.jpg (heading {}, {} bytes)",
        makeover.before.angle().heading,
        makeover.before.size()
    );
    println!("After: {} (seed {})", makeover.after.image_url, makeover.after.seed);

    Ok(())
}
