//! Serial, paced generation of before/after example pairs.

use crate::analysis::SceneAnalyzer;
use crate::error::{Result, YardVizError};
use crate::imagery::{AcquiredImage, Acquirer, AngleSchedule, LocationQuery, StreetImagery};
use crate::pipeline::state::Stage;
use crate::transform::{prompts, GenerationParams, TransformationResult, Transformer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Pause between consecutive batch items.
pub const DEFAULT_ITEM_DELAY: Duration = Duration::from_millis(2000);

/// A labelled input for the batch generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleLocation {
    /// Human-readable label, e.g. "Chicago Suburban".
    pub label: String,
    /// Where to look.
    pub query: LocationQuery,
}

impl SampleLocation {
    /// Creates a sample location.
    pub fn new(label: impl Into<String>, query: LocationQuery) -> Self {
        Self {
            label: label.into(),
            query,
        }
    }

    /// Residential coordinates used for the homepage examples.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(
                "Los Angeles Residential",
                LocationQuery::coordinates(34.0522, -118.2437),
            ),
            Self::new(
                "NYC Residential",
                LocationQuery::coordinates(40.7128, -74.0060),
            ),
            Self::new(
                "Chicago Suburban",
                LocationQuery::coordinates(41.8781, -87.6298),
            ),
            Self::new(
                "Houston Residential",
                LocationQuery::coordinates(29.7604, -95.3698),
            ),
            Self::new(
                "Phoenix Suburban",
                LocationQuery::coordinates(33.4484, -112.0740),
            ),
        ]
    }
}

/// One finished before/after pair, shaped for static site content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleRecord {
    /// Stable id, `example-<index>`.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Label of the sample location.
    pub address: String,
    /// Before image as a data URI.
    pub before_src: String,
    /// After image URL.
    pub after_src: String,
    /// Heading of the before photo.
    pub heading: u16,
    /// Seed used for generation.
    pub seed: u64,
    /// Parameters used for generation.
    pub params: GenerationParams,
}

impl ExampleRecord {
    fn new(
        index: usize,
        sample: &SampleLocation,
        before: &AcquiredImage,
        after: &TransformationResult,
    ) -> Self {
        Self {
            id: format!("example-{index}"),
            title: format!("{} Transformation", sample.label),
            address: sample.label.clone(),
            before_src: before.to_data_uri(),
            after_src: after.image_url.clone(),
            heading: before.angle().heading,
            seed: after.seed,
            params: after.params,
        }
    }
}

/// An item that was dropped from the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedItem {
    /// Position in the input.
    pub index: usize,
    /// Label of the sample location.
    pub label: String,
    /// User-facing reason.
    pub reason: String,
}

/// Progress of a running batch, handed to observers by reference.
#[derive(Debug, Clone, Default)]
pub struct BatchState {
    /// Number of inputs.
    pub total: usize,
    /// Index of the item in flight.
    pub current: Option<usize>,
    /// "Generating example i/N: label" for the item in flight.
    pub progress: String,
    /// Stage of every item, by input position.
    pub stages: Vec<Stage>,
    /// Completed records so far, in input order.
    pub records: Vec<ExampleRecord>,
    /// True until the last item has been handled.
    pub is_generating: bool,
}

impl BatchState {
    fn new(total: usize) -> Self {
        Self {
            total,
            stages: vec![Stage::Pending; total],
            is_generating: true,
            ..Self::default()
        }
    }

    /// Share of items that produced a record, for progress bars.
    pub fn completion_fraction(&self) -> f32 {
        if self.total == 0 {
            return 1.0;
        }
        self.records.len() as f32 / self.total as f32
    }
}

/// Final output of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Successful records, in input order.
    pub records: Vec<ExampleRecord>,
    /// Items that failed and were left out.
    pub skipped: Vec<SkippedItem>,
}

impl BatchReport {
    /// Pretty JSON of the records, ready to paste into static content.
    pub fn records_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }
}

/// Runs sample locations through acquire, optional analysis and transform,
/// one at a time.
///
/// A failing item is logged and skipped; the batch carries on. A fixed delay
/// separates consecutive items whether or not the previous one succeeded.
pub struct BatchOrchestrator {
    acquirer: Acquirer,
    analyzer: Option<Arc<dyn SceneAnalyzer>>,
    transformer: Arc<dyn Transformer>,
    params: GenerationParams,
    instructions: String,
    item_delay: Duration,
}

impl BatchOrchestrator {
    /// Creates an orchestrator with the batch angle schedule, conservative
    /// generation settings, the landscaping-only prompt and a 2s item delay.
    pub fn new(imagery: Arc<dyn StreetImagery>, transformer: Arc<dyn Transformer>) -> Self {
        Self {
            acquirer: Acquirer::new(imagery, AngleSchedule::batch()),
            analyzer: None,
            transformer,
            params: GenerationParams::conservative(),
            instructions: prompts::LANDSCAPE_ONLY_PROMPT.to_string(),
            item_delay: DEFAULT_ITEM_DELAY,
        }
    }

    /// Replaces the acquirer (schedule and success predicate).
    pub fn with_acquirer(mut self, acquirer: Acquirer) -> Self {
        self.acquirer = acquirer;
        self
    }

    /// Runs scene analysis on each item and appends it to the prompt.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn SceneAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Overrides generation parameters.
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Overrides the generation instruction.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Overrides the pause between items.
    pub fn with_item_delay(mut self, delay: Duration) -> Self {
        self.item_delay = delay;
        self
    }

    /// Runs every sample and returns the successful records.
    pub async fn run(&self, samples: &[SampleLocation]) -> BatchReport {
        self.run_with_observer(samples, |_| {}).await
    }

    /// Runs every sample, calling `observe` after every state change so
    /// partial results can be shown before the batch ends.
    pub async fn run_with_observer(
        &self,
        samples: &[SampleLocation],
        mut observe: impl FnMut(&BatchState),
    ) -> BatchReport {
        let total = samples.len();
        let mut state = BatchState::new(total);
        let mut skipped = Vec::new();

        for (index, sample) in samples.iter().enumerate() {
            state.current = Some(index);
            state.progress = format!(
                "Generating example {}/{}: {}",
                index + 1,
                total,
                sample.label
            );
            tracing::info!("{}", state.progress);

            match self.run_item(index, sample, &mut state, &mut observe).await {
                Ok(record) => {
                    state.stages[index] = Stage::Completed;
                    state.records.push(record);
                }
                Err(e) => {
                    tracing::warn!(
                        index,
                        label = %sample.label,
                        stage = %state.stages[index],
                        "skipping example: {e}"
                    );
                    state.stages[index] = Stage::Failed;
                    skipped.push(SkippedItem {
                        index,
                        label: sample.label.clone(),
                        reason: e.user_message(),
                    });
                }
            }
            observe(&state);

            if index + 1 < total {
                tokio::time::sleep(self.item_delay).await;
            }
        }

        state.current = None;
        state.progress.clear();
        state.is_generating = false;
        observe(&state);

        tracing::info!(
            generated = state.records.len(),
            skipped = skipped.len(),
            "batch complete"
        );

        BatchReport {
            records: state.records,
            skipped,
        }
    }

    async fn run_item(
        &self,
        index: usize,
        sample: &SampleLocation,
        state: &mut BatchState,
        observe: &mut impl FnMut(&BatchState),
    ) -> Result<ExampleRecord> {
        self.params.validate()?;

        state.stages[index] = Stage::Acquiring;
        observe(state);
        let before = self.acquirer.acquire(&sample.query).await?;

        let mut instructions = self.instructions.clone();
        if let Some(analyzer) = &self.analyzer {
            state.stages[index] = Stage::Analyzing;
            observe(state);
            let analysis = analyzer.analyze(&before).await?;
            instructions = prompts::with_assessment(&instructions, &analysis);
        }

        state.stages[index] = Stage::Transforming;
        observe(state);
        let params = self.params.resolved();
        let after = self
            .transformer
            .transform(&before, &instructions, &params)
            .await?;

        if after.image_url.is_empty() {
            return Err(YardVizError::UnexpectedResponse(
                "generation returned an empty image URL".into(),
            ));
        }

        Ok(ExampleRecord::new(index, sample, &before, &after))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_samples() {
        let samples = SampleLocation::defaults();
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0].label, "Los Angeles Residential");
        assert_eq!(samples[0].query.to_location_param(), "34.0522,-118.2437");
        assert_eq!(samples[4].query.to_location_param(), "33.4484,-112.074");
    }

    #[test]
    fn test_completion_fraction() {
        let mut state = BatchState::new(4);
        assert_eq!(state.completion_fraction(), 0.0);
        assert_eq!(state.stages, vec![Stage::Pending; 4]);

        state.records.push(ExampleRecord {
            id: "example-0".into(),
            title: "t".into(),
            address: "a".into(),
            before_src: "data:image/jpeg;base64,".into(),
            after_src: "https://x".into(),
            heading: 0,
            seed: 1,
            params: GenerationParams::conservative().with_seed(1),
        });
        assert_eq!(state.completion_fraction(), 0.25);
        assert_eq!(BatchState::new(0).completion_fraction(), 1.0);
    }

    #[test]
    fn test_record_json_shape() {
        let report = BatchReport {
            records: vec![ExampleRecord {
                id: "example-2".into(),
                title: "Chicago Suburban Transformation".into(),
                address: "Chicago Suburban".into(),
                before_src: "data:image/jpeg;base64,AA==".into(),
                after_src: "https://fal.media/after.jpg".into(),
                heading: 90,
                seed: 5,
                params: GenerationParams::conservative().with_seed(5),
            }],
            skipped: vec![],
        };
        let json: serde_json::Value =
            serde_json::from_str(&report.records_json().unwrap()).unwrap();
        let record = &json[0];
        assert_eq!(record["id"], "example-2");
        assert_eq!(record["beforeSrc"], "data:image/jpeg;base64,AA==");
        assert_eq!(record["afterSrc"], "https://fal.media/after.jpg");
        assert_eq!(record["title"], "Chicago Suburban Transformation");
    }
}
