//! Google Street View Static API provider.

use crate::config::{resolve_api_key, GOOGLE_MAPS_ENV_VARS};
use crate::error::Result;
use crate::imagery::provider::{ImageryResponse, StreetImagery};
use crate::imagery::types::{ImageSize, LocationQuery, ViewingAngle};
use async_trait::async_trait;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/streetview";

/// Builder for [`StreetViewProvider`].
#[derive(Debug, Clone, Default)]
pub struct StreetViewProviderBuilder {
    api_key: Option<String>,
    size: ImageSize,
    base_url: Option<String>,
}

impl StreetViewProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_MAPS_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the requested image size (default 800x600).
    pub fn size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    /// Overrides the endpoint URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the provider, resolving the API key.
    pub fn build(self) -> Result<StreetViewProvider> {
        let api_key = resolve_api_key(
            self.api_key,
            GOOGLE_MAPS_ENV_VARS,
            "Google Maps API Key is not configured.",
        )?;

        Ok(StreetViewProvider {
            client: reqwest::Client::new(),
            api_key,
            size: self.size,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

/// Street View Static API imagery provider.
pub struct StreetViewProvider {
    client: reqwest::Client,
    api_key: String,
    size: ImageSize,
    base_url: String,
}

impl StreetViewProvider {
    /// Creates a new [`StreetViewProviderBuilder`].
    pub fn builder() -> StreetViewProviderBuilder {
        StreetViewProviderBuilder::new()
    }

    fn query_params(
        &self,
        location: &LocationQuery,
        angle: &ViewingAngle,
    ) -> Vec<(&'static str, String)> {
        vec![
            ("size", self.size.to_string()),
            ("location", location.to_location_param()),
            ("fov", angle.fov.to_string()),
            ("heading", angle.heading.to_string()),
            ("pitch", angle.pitch.to_string()),
            ("key", self.api_key.clone()),
        ]
    }
}

#[async_trait]
impl StreetImagery for StreetViewProvider {
    async fn fetch(
        &self,
        location: &LocationQuery,
        angle: &ViewingAngle,
    ) -> Result<ImageryResponse> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&self.query_params(location, angle))
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        tracing::debug!(
            heading = angle.heading,
            status,
            bytes = body.len(),
            "street view response"
        );

        Ok(ImageryResponse::new(status, content_type, body))
    }

    fn name(&self) -> &str {
        "Google Street View"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, YardVizError};

    #[test]
    fn test_builder_with_explicit_key() {
        let provider = StreetViewProviderBuilder::new().api_key("test-key").build();
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap().base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_builder_missing_key() {
        std::env::remove_var("GOOGLE_MAPS_API_KEY");

        let err = StreetViewProviderBuilder::new().build().err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(
            matches!(err, YardVizError::Config(ref m) if m == "Google Maps API Key is not configured.")
        );
    }

    #[test]
    fn test_query_params() {
        let provider = StreetViewProviderBuilder::new()
            .api_key("test-key")
            .build()
            .unwrap();
        let params = provider.query_params(
            &LocationQuery::coordinates(40.7128, -74.006),
            &ViewingAngle::new(180, 70, -10),
        );

        let get = |name: &str| {
            params
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("size"), Some("800x600"));
        assert_eq!(get("location"), Some("40.7128,-74.006"));
        assert_eq!(get("fov"), Some("70"));
        assert_eq!(get("heading"), Some("180"));
        assert_eq!(get("pitch"), Some("-10"));
        assert_eq!(get("key"), Some("test-key"));
    }

    #[test]
    fn test_custom_size() {
        let provider = StreetViewProviderBuilder::new()
            .api_key("test-key")
            .size(ImageSize {
                width: 640,
                height: 640,
            })
            .build()
            .unwrap();
        let params = provider.query_params(
            &LocationQuery::address("1 Main St"),
            &ViewingAngle::new(0, 90, 0),
        );
        assert_eq!(params[0], ("size", "640x640".to_string()));
    }
}
