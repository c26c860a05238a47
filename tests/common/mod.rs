//! In-memory providers for exercising the pipelines without a network.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use tokio::time::Instant;
use yardviz::{
    AcquiredImage, Coordinates, GenerationParams, Geocoder, ImageryResponse, LocationQuery,
    Result, SceneAnalyzer, StreetImagery, TransformationResult, Transformer, ViewingAngle,
    YardVizError,
};

/// Smallest JPEG prefix the format sniffing recognises.
pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

#[derive(Debug, Clone)]
pub struct FetchCall {
    pub location: String,
    pub heading: u16,
    pub at: Instant,
}

/// Serves a JPEG for every request except the scripted failures.
#[derive(Default)]
pub struct FakeImagery {
    failing_locations: Vec<String>,
    failing_headings: Vec<u16>,
    calls: Mutex<Vec<FetchCall>>,
}

impl FakeImagery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every heading of this location answers 404.
    pub fn failing_location(mut self, location: impl Into<String>) -> Self {
        self.failing_locations.push(location.into());
        self
    }

    /// This heading answers 404 everywhere.
    pub fn failing_heading(mut self, heading: u16) -> Self {
        self.failing_headings.push(heading);
        self
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StreetImagery for FakeImagery {
    async fn fetch(
        &self,
        location: &LocationQuery,
        angle: &ViewingAngle,
    ) -> Result<ImageryResponse> {
        let param = location.to_location_param();
        self.calls.lock().unwrap().push(FetchCall {
            location: param.clone(),
            heading: angle.heading,
            at: Instant::now(),
        });

        if self.failing_locations.contains(&param) || self.failing_headings.contains(&angle.heading)
        {
            return Ok(ImageryResponse::new(404, None, Vec::new()));
        }
        Ok(ImageryResponse::new(
            200,
            Some("image/jpeg".into()),
            JPEG_BYTES.to_vec(),
        ))
    }

    fn name(&self) -> &str {
        "fake imagery"
    }
}

/// Resolves every address to a fixed point, or fails with `NotFound`.
pub struct FakeGeocoder {
    result: Option<Coordinates>,
    calls: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn resolving_to(lat: f64, lng: f64) -> Self {
        Self {
            result: Some(Coordinates::new(lat, lng)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn not_found() -> Self {
        Self {
            result: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinates> {
        self.calls.lock().unwrap().push(address.to_string());
        self.result.ok_or_else(|| {
            YardVizError::NotFound("Could not find that address. Please check and try again.".into())
        })
    }

    fn name(&self) -> &str {
        "fake geocoder"
    }
}

/// Returns a fixed assessment, or a blank provider error.
pub struct FakeAnalyzer {
    text: Option<String>,
    calls: Mutex<usize>,
}

impl FakeAnalyzer {
    pub fn answering(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: None,
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl SceneAnalyzer for FakeAnalyzer {
    async fn analyze(&self, _image: &AcquiredImage) -> Result<String> {
        *self.calls.lock().unwrap() += 1;
        self.text.clone().ok_or(YardVizError::Api {
            status: 500,
            message: String::new(),
        })
    }

    fn name(&self) -> &str {
        "fake analyzer"
    }
}

#[derive(Debug, Clone)]
pub struct TransformCall {
    pub location: String,
    pub instructions: String,
    pub params: GenerationParams,
    pub at: Instant,
}

/// Echoes the request back as a result with a predictable URL.
#[derive(Default)]
pub struct FakeTransformer {
    calls: Mutex<Vec<TransformCall>>,
}

impl FakeTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<TransformCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transformer for FakeTransformer {
    async fn transform(
        &self,
        image: &AcquiredImage,
        instructions: &str,
        params: &GenerationParams,
    ) -> Result<TransformationResult> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(TransformCall {
            location: image.location().to_string(),
            instructions: instructions.to_string(),
            params: *params,
            at: Instant::now(),
        });

        Ok(TransformationResult {
            image_url: format!("https://fal.media/files/fake/after-{}.jpg", calls.len()),
            seed: params.seed.unwrap_or_default(),
            params: *params,
            model: "fake/kontext".into(),
            request_id: None,
            duration_ms: None,
        })
    }

    fn name(&self) -> &str {
        "fake transformer"
    }
}
