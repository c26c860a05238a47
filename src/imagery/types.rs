//! Core types for street-level imagery acquisition.

use crate::error::{Result, YardVizError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Compass headings tried in order: north, east, south, west.
pub const CARDINAL_HEADINGS: [u16; 4] = [0, 90, 180, 270];

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    Png,
    /// JPEG format (what Street View returns).
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Maps a MIME type (parameters ignored) to a format.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Coordinates {
    /// Creates a coordinate pair.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Where to look: a free-text address or a coordinate pair.
///
/// Only emptiness is checked locally. Whether an address exists is up to
/// the geocoding and imagery providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationQuery {
    /// Street address, e.g. "456 Maple Avenue, Arlington, VA 22201".
    Address(String),
    /// Explicit coordinates.
    Coordinates(Coordinates),
}

impl LocationQuery {
    /// Creates an address query.
    pub fn address(address: impl Into<String>) -> Self {
        Self::Address(address.into())
    }

    /// Creates a coordinate query.
    pub fn coordinates(lat: f64, lng: f64) -> Self {
        Self::Coordinates(Coordinates::new(lat, lng))
    }

    /// Rejects empty addresses and non-finite coordinates.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Address(address) if address.trim().is_empty() => Err(
                YardVizError::InvalidInput("Please enter an address.".into()),
            ),
            Self::Coordinates(c) if !c.lat.is_finite() || !c.lng.is_finite() => Err(
                YardVizError::InvalidInput(format!("Invalid coordinates: {c}")),
            ),
            _ => Ok(()),
        }
    }

    /// Renders the value for a `location` query parameter.
    pub fn to_location_param(&self) -> String {
        match self {
            Self::Address(address) => address.trim().to_string(),
            Self::Coordinates(c) => c.to_string(),
        }
    }

    /// Returns the address text, if this is an address query.
    pub fn as_address(&self) -> Option<&str> {
        match self {
            Self::Address(address) => Some(address.trim()),
            Self::Coordinates(_) => None,
        }
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_location_param())
    }
}

impl FromStr for LocationQuery {
    type Err = std::convert::Infallible;

    /// `"34.05,-118.24"` parses as coordinates when both values are in
    /// range; anything else is an address.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some((lat, lng)) = s.split_once(',') {
            if let (Ok(lat), Ok(lng)) = (lat.trim().parse::<f64>(), lng.trim().parse::<f64>()) {
                if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) {
                    return Ok(Self::coordinates(lat, lng));
                }
            }
        }
        Ok(Self::address(s))
    }
}

/// Requested image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for ImageSize {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Camera orientation for one imagery request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewingAngle {
    /// Compass heading in degrees (0 = north).
    pub heading: u16,
    /// Horizontal field of view in degrees.
    pub fov: u16,
    /// Up/down angle in degrees relative to the vehicle.
    pub pitch: i16,
}

impl ViewingAngle {
    /// Creates a viewing angle.
    pub fn new(heading: u16, fov: u16, pitch: i16) -> Self {
        Self {
            heading,
            fov,
            pitch,
        }
    }
}

/// Ordered candidate angles plus the pause between failed attempts.
///
/// The first angle whose response passes the success predicate wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AngleSchedule {
    angles: Vec<ViewingAngle>,
    pacing: Duration,
}

impl AngleSchedule {
    /// Creates a schedule with no pacing between attempts.
    pub fn new(angles: Vec<ViewingAngle>) -> Self {
        Self {
            angles,
            pacing: Duration::ZERO,
        }
    }

    /// A single fixed angle.
    pub fn single(angle: ViewingAngle) -> Self {
        Self::new(vec![angle])
    }

    /// Cardinal headings with the given field of view and pitch.
    pub fn cardinal(fov: u16, pitch: i16) -> Self {
        Self::new(
            CARDINAL_HEADINGS
                .iter()
                .map(|&heading| ViewingAngle::new(heading, fov, pitch))
                .collect(),
        )
    }

    /// Wide, level view used for single-address makeovers.
    pub fn interactive() -> Self {
        Self::cardinal(90, 0)
    }

    /// Tighter, slightly downward view used for batch examples, paced at 500ms.
    pub fn batch() -> Self {
        Self::cardinal(70, -10).with_pacing(Duration::from_millis(500))
    }

    /// Sets the pause between a failed attempt and the next one.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Candidate angles in try order.
    pub fn angles(&self) -> &[ViewingAngle] {
        &self.angles
    }

    /// Pause between attempts.
    pub fn pacing(&self) -> Duration {
        self.pacing
    }
}

/// The "before" photo: image bytes, their MIME type, and where they came from.
///
/// Immutable once acquired.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquiredImage {
    data: Vec<u8>,
    mime_type: String,
    angle: ViewingAngle,
    location: String,
}

impl AcquiredImage {
    /// Creates an acquired image.
    ///
    /// When `content_type` is missing or not an image type, the MIME type is
    /// sniffed from the bytes, defaulting to JPEG.
    pub fn new(
        data: Vec<u8>,
        content_type: Option<&str>,
        angle: ViewingAngle,
        location: impl Into<String>,
    ) -> Self {
        let mime_type = content_type
            .map(|ct| ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
            .filter(|ct| ct.starts_with("image/"))
            .or_else(|| ImageFormat::from_magic_bytes(&data).map(|f| f.mime_type().to_string()))
            .unwrap_or_else(|| ImageFormat::Jpeg.mime_type().to_string());

        Self {
            data,
            mime_type,
            angle,
            location: location.into(),
        }
    }

    /// Raw image bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// MIME type, e.g. `image/jpeg`.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The angle that produced this image.
    pub fn angle(&self) -> ViewingAngle {
        self.angle
    }

    /// The location parameter the image was requested with.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Image format, if recognized.
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_mime_type(&self.mime_type)
            .or_else(|| ImageFormat::from_magic_bytes(&self.data))
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Encodes the image data as base64.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the image as a self-contained data URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// Saves the image to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }
}
