//! Google Geocoding API provider.

use crate::config::{resolve_api_key, GOOGLE_MAPS_ENV_VARS};
use crate::error::{parse_retry_after, sanitize_error_message, Result, YardVizError};
use crate::imagery::provider::Geocoder;
use crate::imagery::types::Coordinates;
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Message surfaced when an address cannot be resolved.
pub const ADDRESS_NOT_FOUND_MESSAGE: &str =
    "Could not find the specified address. Please check the address and try again.";

/// Builder for [`GoogleGeocoder`].
#[derive(Debug, Clone, Default)]
pub struct GoogleGeocoderBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
}

impl GoogleGeocoderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_MAPS_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Overrides the endpoint URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the geocoder, resolving the API key.
    pub fn build(self) -> Result<GoogleGeocoder> {
        let api_key = resolve_api_key(
            self.api_key,
            GOOGLE_MAPS_ENV_VARS,
            "Google Maps API Key is not configured.",
        )?;

        Ok(GoogleGeocoder {
            client: reqwest::Client::new(),
            api_key,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

/// Geocoding API client.
pub struct GoogleGeocoder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleGeocoder {
    /// Creates a new [`GoogleGeocoderBuilder`].
    pub fn builder() -> GoogleGeocoderBuilder {
        GoogleGeocoderBuilder::new()
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinates> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            if status.as_u16() == 429 {
                return Err(YardVizError::RateLimited {
                    retry_after: parse_retry_after(&headers),
                });
            }
            let text = response.text().await.unwrap_or_default();
            return Err(YardVizError::Api {
                status: status.as_u16(),
                message: sanitize_error_message(&text),
            });
        }

        let body: GeocodeResponse = response.json().await?;
        let coordinates = body.into_coordinates()?;
        tracing::debug!(%address, %coordinates, "geocoded address");
        Ok(coordinates)
    }

    fn name(&self) -> &str {
        "Google Geocoding"
    }
}

// -- Response types --

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl GeocodeResponse {
    fn into_coordinates(self) -> Result<Coordinates> {
        let detail = || {
            self.error_message
                .as_deref()
                .map(sanitize_error_message)
                .unwrap_or_else(|| format!("geocoding status {}", self.status))
        };

        match self.status.as_str() {
            "OK" => {}
            "REQUEST_DENIED" => return Err(YardVizError::Auth(detail())),
            "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => {
                return Err(YardVizError::RateLimited { retry_after: None })
            }
            "UNKNOWN_ERROR" => {
                return Err(YardVizError::Api {
                    status: 200,
                    message: detail(),
                })
            }
            _ => return Err(YardVizError::NotFound(ADDRESS_NOT_FOUND_MESSAGE.into())),
        }

        self.results
            .first()
            .map(|r| Coordinates::new(r.geometry.location.lat, r.geometry.location.lng))
            .ok_or_else(|| YardVizError::NotFound(ADDRESS_NOT_FOUND_MESSAGE.into()))
    }
}
