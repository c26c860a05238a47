//! First-success-wins imagery acquisition across candidate angles.

use crate::error::{Result, YardVizError};
use crate::imagery::provider::{ImageryResponse, StreetImagery};
use crate::imagery::types::{AcquiredImage, AngleSchedule, LocationQuery};
use std::fmt;
use std::sync::Arc;

/// Message surfaced when every candidate angle failed.
pub const NO_COVERAGE_MESSAGE: &str = "Could not find a Street View image for this address. \
The location may not have Street View coverage. Try a different address.";

/// Decides whether a provider response counts as a usable image.
pub type SuccessPredicate = Arc<dyn Fn(&ImageryResponse) -> bool + Send + Sync>;

/// Acquires a "before" photo by trying each angle of a schedule in order.
///
/// The default predicate accepts any 2xx response. Placeholder
/// "no imagery" images served with a 2xx status are accepted as-is.
#[derive(Clone)]
pub struct Acquirer {
    imagery: Arc<dyn StreetImagery>,
    schedule: AngleSchedule,
    accept: SuccessPredicate,
}

impl fmt::Debug for Acquirer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Acquirer")
            .field("imagery", &self.imagery.name())
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}

impl Acquirer {
    /// Creates an acquirer over `imagery` using `schedule`.
    pub fn new(imagery: Arc<dyn StreetImagery>, schedule: AngleSchedule) -> Self {
        Self {
            imagery,
            schedule,
            accept: Arc::new(ImageryResponse::is_success),
        }
    }

    /// Replaces the success predicate.
    pub fn with_success_predicate(
        mut self,
        accept: impl Fn(&ImageryResponse) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.accept = Arc::new(accept);
        self
    }

    /// The schedule this acquirer walks.
    pub fn schedule(&self) -> &AngleSchedule {
        &self.schedule
    }

    /// Fetches the first acceptable image for `query`.
    ///
    /// Failed attempts (rejected responses or transport errors) move on to the
    /// next angle after the schedule's pacing delay. Fails with `NotFound` once
    /// every angle has been tried.
    pub async fn acquire(&self, query: &LocationQuery) -> Result<AcquiredImage> {
        query.validate()?;

        let angles = self.schedule.angles();
        if angles.is_empty() {
            return Err(YardVizError::Config(
                "No viewing angles configured for imagery acquisition.".into(),
            ));
        }

        for (attempt, angle) in angles.iter().enumerate() {
            match self.imagery.fetch(query, angle).await {
                Ok(response) if (self.accept)(&response) => {
                    tracing::debug!(
                        location = %query,
                        heading = angle.heading,
                        attempt = attempt + 1,
                        "acquired street-level image"
                    );
                    return Ok(AcquiredImage::new(
                        response.body,
                        response.content_type.as_deref(),
                        *angle,
                        query.to_location_param(),
                    ));
                }
                Ok(response) => {
                    tracing::debug!(
                        location = %query,
                        heading = angle.heading,
                        status = response.status,
                        "imagery rejected, trying next heading"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        location = %query,
                        heading = angle.heading,
                        "imagery request failed: {e}"
                    );
                }
            }

            let is_last = attempt + 1 == angles.len();
            if !is_last && !self.schedule.pacing().is_zero() {
                tokio::time::sleep(self.schedule.pacing()).await;
            }
        }

        tracing::warn!(
            location = %query,
            attempts = angles.len(),
            provider = self.imagery.name(),
            "no imagery coverage"
        );
        Err(YardVizError::NotFound(NO_COVERAGE_MESSAGE.into()))
    }
}
