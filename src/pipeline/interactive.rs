//! Single-address makeover: geocode, acquire, analyze, transform.

use crate::analysis::SceneAnalyzer;
use crate::error::Result;
use crate::imagery::{
    AcquiredImage, Acquirer, AngleSchedule, Coordinates, Geocoder, LocationQuery, StreetImagery,
};
use crate::pipeline::state::{SessionState, Stage};
use crate::transform::{prompts, GenerationParams, TransformationResult, Transformer};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of a successful makeover.
#[derive(Debug, Clone)]
pub struct Makeover {
    /// The street-level photo.
    pub before: AcquiredImage,
    /// Scene analysis, when the step ran.
    pub analysis: Option<String>,
    /// The generated image.
    pub after: TransformationResult,
    /// Coordinates the address resolved to, if geocoded.
    pub resolved_location: Option<Coordinates>,
}

/// Serializable summary of a [`Makeover`] (before image as a data URI).
#[derive(Debug, Clone, Serialize)]
pub struct MakeoverSummary {
    /// Location the photo was requested for.
    pub location: String,
    /// Heading that produced the photo.
    pub heading: u16,
    /// Before image as a data URI.
    pub before_src: String,
    /// After image URL.
    pub after_src: String,
    /// Seed used for generation.
    pub seed: u64,
    /// Scene analysis text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

impl Makeover {
    /// Flattens the makeover for JSON output.
    pub fn summary(&self) -> MakeoverSummary {
        MakeoverSummary {
            location: self.before.location().to_string(),
            heading: self.before.angle().heading,
            before_src: self.before.to_data_uri(),
            after_src: self.after.image_url.clone(),
            seed: self.after.seed,
            analysis: self.analysis.clone(),
        }
    }
}

/// Drives one address through the full pipeline.
///
/// No retries beyond the angle fallback inside acquisition; the first
/// failure from any stage ends the run.
pub struct InteractiveOrchestrator {
    acquirer: Acquirer,
    geocoder: Option<Arc<dyn Geocoder>>,
    analyzer: Option<Arc<dyn SceneAnalyzer>>,
    transformer: Arc<dyn Transformer>,
    params: GenerationParams,
}

impl InteractiveOrchestrator {
    /// Creates an orchestrator with the interactive angle schedule and
    /// comprehensive generation settings. Geocoding and analysis are off
    /// until configured.
    pub fn new(imagery: Arc<dyn StreetImagery>, transformer: Arc<dyn Transformer>) -> Self {
        Self {
            acquirer: Acquirer::new(imagery, AngleSchedule::interactive()),
            geocoder: None,
            analyzer: None,
            transformer,
            params: GenerationParams::comprehensive(),
        }
    }

    /// Replaces the acquirer (schedule and success predicate).
    pub fn with_acquirer(mut self, acquirer: Acquirer) -> Self {
        self.acquirer = acquirer;
        self
    }

    /// Resolves addresses to coordinates before fetching imagery.
    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// Runs scene analysis and folds it into the generation prompt.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn SceneAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Overrides generation parameters.
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Runs the pipeline for `query`.
    pub async fn run(&self, query: &LocationQuery) -> Result<Makeover> {
        self.run_with_observer(query, |_| {}).await
    }

    /// Runs the pipeline, calling `observe` after every state change.
    pub async fn run_with_observer(
        &self,
        query: &LocationQuery,
        mut observe: impl FnMut(&SessionState),
    ) -> Result<Makeover> {
        let mut state = SessionState::default();
        let result = self.drive(query, &mut state, &mut observe).await;

        if let Err(ref e) = result {
            tracing::warn!(location = %query, stage = %state.stage, "makeover failed: {e}");
            state.stage = Stage::Failed;
            state.error = Some(e.user_message());
            observe(&state);
        }
        result
    }

    async fn drive(
        &self,
        query: &LocationQuery,
        state: &mut SessionState,
        observe: &mut impl FnMut(&SessionState),
    ) -> Result<Makeover> {
        query.validate()?;
        self.params.validate()?;

        let location = match (&self.geocoder, query.as_address()) {
            (Some(geocoder), Some(address)) => {
                state.stage = Stage::Geocoding;
                observe(state);
                let coordinates = geocoder.geocode(address).await?;
                state.resolved_location = Some(coordinates);
                LocationQuery::Coordinates(coordinates)
            }
            _ => query.clone(),
        };

        state.stage = Stage::Acquiring;
        observe(state);
        let before = self.acquirer.acquire(&location).await?;
        state.before = Some(before.clone());

        let analysis = match &self.analyzer {
            Some(analyzer) => {
                state.stage = Stage::Analyzing;
                observe(state);
                let text = analyzer.analyze(&before).await?;
                state.analysis = Some(text.clone());
                Some(text)
            }
            None => None,
        };

        state.stage = Stage::Transforming;
        observe(state);
        let instructions = prompts::comprehensive_prompt(analysis.as_deref());
        let params = self.params.resolved();
        let after = self
            .transformer
            .transform(&before, &instructions, &params)
            .await?;

        tracing::info!(
            location = %query,
            heading = before.angle().heading,
            seed = after.seed,
            "makeover complete"
        );

        state.after = Some(after.clone());
        state.stage = Stage::Completed;
        observe(state);

        Ok(Makeover {
            before,
            analysis,
            after,
            resolved_location: state.resolved_location,
        })
    }
}
