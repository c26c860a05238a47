//! Pipeline progress state handed to the presentation layer.

use crate::imagery::{AcquiredImage, Coordinates};
use crate::transform::TransformationResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a single-address pipeline currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Not started.
    #[default]
    Pending,
    /// Resolving the address to coordinates.
    Geocoding,
    /// Fetching the street-level photo.
    Acquiring,
    /// Waiting on the vision model.
    Analyzing,
    /// Waiting on the generation job.
    Transforming,
    /// Finished with an after image.
    Completed,
    /// Aborted; see the accompanying error.
    Failed,
}

impl Stage {
    /// Returns true once no further transitions will happen.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Geocoding => "geocoding",
            Self::Acquiring => "acquiring",
            Self::Analyzing => "analyzing",
            Self::Transforming => "transforming",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Everything a view needs to render one makeover run.
///
/// Owned by the running [`InteractiveOrchestrator`](super::InteractiveOrchestrator)
/// invocation; observers only ever see it by reference.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Current stage.
    pub stage: Stage,
    /// Coordinates the address resolved to, if geocoded.
    pub resolved_location: Option<Coordinates>,
    /// The before photo, once acquired.
    pub before: Option<AcquiredImage>,
    /// Scene analysis, when that step ran.
    pub analysis: Option<String>,
    /// The after image, once generated.
    pub after: Option<TransformationResult>,
    /// User-facing error text if the run failed.
    pub error: Option<String>,
}

impl SessionState {
    /// True while a stage is in flight.
    pub fn is_loading(&self) -> bool {
        !matches!(self.stage, Stage::Pending) && !self.stage.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Transforming.to_string(), "transforming");
        assert_eq!(Stage::default(), Stage::Pending);
    }

    #[test]
    fn test_is_loading() {
        let mut state = SessionState::default();
        assert!(!state.is_loading());
        state.stage = Stage::Acquiring;
        assert!(state.is_loading());
        state.stage = Stage::Failed;
        assert!(!state.is_loading());
    }
}
