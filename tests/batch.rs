mod common;

use common::{FakeAnalyzer, FakeImagery, FakeTransformer};
use std::sync::Arc;
use std::time::Duration;
use yardviz::imagery::NO_COVERAGE_MESSAGE;
use yardviz::transform::prompts::LANDSCAPE_ONLY_PROMPT;
use yardviz::{BatchOrchestrator, SampleLocation, Stage};

const CHICAGO: &str = "41.8781,-87.6298";

#[tokio::test(start_paused = true)]
async fn test_failed_item_is_skipped() {
    let imagery = Arc::new(FakeImagery::new().failing_location(CHICAGO));
    let transformer = Arc::new(FakeTransformer::new());
    let orchestrator = BatchOrchestrator::new(imagery.clone(), transformer.clone());

    let report = orchestrator.run(&SampleLocation::defaults()).await;

    let ids: Vec<&str> = report.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["example-0", "example-1", "example-3", "example-4"]);
    assert_eq!(report.records[0].title, "Los Angeles Residential Transformation");
    assert_eq!(report.records[3].address, "Phoenix Suburban");
    assert!(report.records[0].before_src.starts_with("data:image/jpeg;base64,"));

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].index, 2);
    assert_eq!(report.skipped[0].label, "Chicago Suburban");
    assert_eq!(report.skipped[0].reason, NO_COVERAGE_MESSAGE);

    let chicago_calls = imagery
        .calls()
        .iter()
        .filter(|c| c.location == CHICAGO)
        .count();
    assert_eq!(chicago_calls, 4);
    assert_eq!(transformer.calls().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_items_are_paced() {
    let imagery = Arc::new(FakeImagery::new().failing_location(CHICAGO));
    let orchestrator = BatchOrchestrator::new(imagery.clone(), Arc::new(FakeTransformer::new()));
    let samples = SampleLocation::defaults();

    orchestrator.run(&samples).await;

    let calls = imagery.calls();
    let starts: Vec<_> = samples
        .iter()
        .map(|s| {
            let location = s.query.to_location_param();
            calls.iter().find(|c| c.location == location).unwrap().at
        })
        .collect();
    for pair in starts.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(2000));
    }

    // Failed headings for the skipped item are paced too.
    let chicago: Vec<_> = calls.iter().filter(|c| c.location == CHICAGO).collect();
    for pair in chicago.windows(2) {
        assert!(pair[1].at - pair[0].at >= Duration::from_millis(500));
    }
}

#[tokio::test(start_paused = true)]
async fn test_uses_conservative_landscape_settings() {
    let transformer = Arc::new(FakeTransformer::new());
    let orchestrator = BatchOrchestrator::new(Arc::new(FakeImagery::new()), transformer.clone());
    let samples = vec![SampleLocation::new(
        "Test",
        yardviz::LocationQuery::coordinates(1.0, 2.0),
    )];

    let report = orchestrator.run(&samples).await;

    assert_eq!(report.records.len(), 1);
    let call = &transformer.calls()[0];
    assert_eq!(call.instructions, LANDSCAPE_ONLY_PROMPT);
    assert_eq!(call.params.strength, 0.15);
    assert_eq!(call.params.guidance_scale, 2.0);
    assert_eq!(call.params.num_inference_steps, 12);
    assert_eq!(report.records[0].seed, call.params.seed.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_assessment_is_appended() {
    let transformer = Arc::new(FakeTransformer::new());
    let orchestrator = BatchOrchestrator::new(Arc::new(FakeImagery::new()), transformer.clone())
        .with_analyzer(Arc::new(FakeAnalyzer::answering("Bare soil by the porch.")));
    let samples = vec![SampleLocation::new(
        "Test",
        yardviz::LocationQuery::coordinates(1.0, 2.0),
    )];

    orchestrator.run(&samples).await;

    let call = &transformer.calls()[0];
    assert!(call.instructions.starts_with(LANDSCAPE_ONLY_PROMPT));
    assert!(call
        .instructions
        .ends_with("Site assessment for reference: Bare soil by the porch."));
}

#[tokio::test(start_paused = true)]
async fn test_observer_sees_partial_results() {
    let imagery = Arc::new(FakeImagery::new().failing_location(CHICAGO));
    let orchestrator = BatchOrchestrator::new(imagery, Arc::new(FakeTransformer::new()))
        .with_item_delay(Duration::from_millis(10));

    let mut progress = Vec::new();
    let mut record_counts = Vec::new();
    let mut final_state = None;
    orchestrator
        .run_with_observer(&SampleLocation::defaults(), |state| {
            if !state.progress.is_empty() && progress.last() != Some(&state.progress) {
                progress.push(state.progress.clone());
            }
            record_counts.push(state.records.len());
            final_state = Some(state.clone());
        })
        .await;

    assert_eq!(progress[0], "Generating example 1/5: Los Angeles Residential");
    assert_eq!(progress[2], "Generating example 3/5: Chicago Suburban");
    assert_eq!(progress.len(), 5);
    assert!(record_counts.windows(2).all(|w| w[0] <= w[1]));

    let final_state = final_state.unwrap();
    assert!(!final_state.is_generating);
    assert_eq!(final_state.records.len(), 4);
    assert_eq!(final_state.stages[2], Stage::Failed);
    assert_eq!(final_state.stages[4], Stage::Completed);
    assert_eq!(final_state.completion_fraction(), 0.8);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_params_skip_items_without_calls() {
    let imagery = Arc::new(FakeImagery::new());
    let transformer = Arc::new(FakeTransformer::new());
    let orchestrator = BatchOrchestrator::new(imagery.clone(), transformer.clone())
        .with_params(yardviz::GenerationParams::conservative().with_num_inference_steps(0));

    let report = orchestrator.run(&SampleLocation::defaults()).await;

    assert!(report.records.is_empty());
    assert_eq!(report.skipped.len(), 5);
    assert_eq!(
        report.skipped[0].reason,
        "num_inference_steps must be at least 1"
    );
    assert!(imagery.calls().is_empty());
    assert!(transformer.calls().is_empty());
}
