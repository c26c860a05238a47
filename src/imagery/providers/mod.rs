//! Street-level imagery and geocoding providers.

#[cfg(feature = "google-maps")]
mod geocoding;
#[cfg(feature = "google-maps")]
mod street_view;

#[cfg(feature = "google-maps")]
pub use geocoding::{GoogleGeocoder, GoogleGeocoderBuilder, ADDRESS_NOT_FOUND_MESSAGE};

#[cfg(feature = "google-maps")]
pub use street_view::{StreetViewProvider, StreetViewProviderBuilder};
