//! Batch example generation - runs the built-in sample locations and writes
//! the records as JSON.
//!
//! Run with: `cargo run --example batch_examples`
//!
//! Requires `GOOGLE_MAPS_API_KEY` and `FAL_KEY` environment variables.

use std::sync::Arc;
use yardviz::{BatchOrchestrator, FalTransformer, SampleLocation, StreetViewProvider};

#[tokio::main]
async fn main() -> yardviz::Result<()> {
    let orchestrator = BatchOrchestrator::new(
        Arc::new(StreetViewProvider::builder().build()?),
        Arc::new(FalTransformer::builder().build()?),
    );

    let report = orchestrator
        .run_with_observer(&SampleLocation::defaults(), |state| {
            if state.is_generating {
                println!(
                    "{:>3.0}% {}",
                    state.completion_fraction() * 100.0,
                    state.progress
                );
            }
        })
        .await;

    std::fs::write("examples.json", report.records_json()?)?;
    println!(
        "Wrote {} records to examples.json ({} skipped)",
        report.records.len(),
        report.skipped.len()
    );

    Ok(())
}
