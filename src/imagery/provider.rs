//! Imagery and geocoding provider traits.

use crate::error::Result;
use crate::imagery::types::{Coordinates, LocationQuery, ViewingAngle};
use async_trait::async_trait;

/// A raw response from a street-level imagery provider.
///
/// Non-success statuses are returned as values rather than errors so the
/// acquirer can decide whether to try the next angle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageryResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header, if any.
    pub content_type: Option<String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl ImageryResponse {
    /// Creates a response.
    pub fn new(status: u16, content_type: Option<String>, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type,
            body,
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for street-level photography providers.
#[async_trait]
pub trait StreetImagery: Send + Sync {
    /// Requests one photo of `location` taken at `angle`.
    ///
    /// Transport failures are errors; provider refusals come back as an
    /// [`ImageryResponse`] with a non-success status.
    async fn fetch(&self, location: &LocationQuery, angle: &ViewingAngle)
        -> Result<ImageryResponse>;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str;
}

/// Trait for address-to-coordinate resolution.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolves an address, failing with `NotFound` when it cannot be located.
    async fn geocode(&self, address: &str) -> Result<Coordinates>;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str;
}
