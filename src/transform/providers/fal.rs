//! fal.ai image-to-image provider.

use crate::config::{resolve_api_key, FAL_ENV_VARS};
use crate::error::{parse_retry_after, sanitize_error_message, Result, YardVizError};
use crate::imagery::AcquiredImage;
use crate::transform::provider::Transformer;
use crate::transform::types::{GenerationParams, TransformationResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const DEFAULT_QUEUE_URL: &str = "https://queue.fal.run";

/// fal.ai image-to-image model variants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FalKontextModel {
    /// Flux Pro Kontext - instruction-based image editing (default).
    #[default]
    KontextPro,
    /// Flux Pro Kontext Max - higher fidelity, slower.
    KontextMax,
    /// Flux Dev image-to-image.
    FluxDevImageToImage,
    /// Custom fal.ai model by ID (e.g., "fal-ai/some-model").
    Custom(String),
}

impl FalKontextModel {
    /// Returns the fal.ai model identifier string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::KontextPro => "fal-ai/flux-pro/kontext",
            Self::KontextMax => "fal-ai/flux-pro/kontext/max",
            Self::FluxDevImageToImage => "fal-ai/flux/dev/image-to-image",
            Self::Custom(id) => id,
        }
    }
}

/// Builder for [`FalTransformer`].
#[derive(Debug, Clone)]
pub struct FalTransformerBuilder {
    api_key: Option<String>,
    model: FalKontextModel,
    poll_interval: Duration,
    timeout: Duration,
    queue_url: Option<String>,
}

impl Default for FalTransformerBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            model: FalKontextModel::default(),
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(300),
            queue_url: None,
        }
    }
}

impl FalTransformerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `FAL_KEY`, then `FAL_API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the fal.ai model variant.
    pub fn model(mut self, model: FalKontextModel) -> Self {
        self.model = model;
        self
    }

    /// Sets the polling interval for queue status.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the maximum time to wait for a job.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the queue base URL.
    pub fn queue_url(mut self, url: impl Into<String>) -> Self {
        self.queue_url = Some(url.into());
        self
    }

    /// Builds the provider, resolving credentials.
    pub fn build(self) -> Result<FalTransformer> {
        let api_key = resolve_api_key(
            self.api_key,
            FAL_ENV_VARS,
            "fal.ai API Key is not configured.",
        )?;

        Ok(FalTransformer {
            client: reqwest::Client::new(),
            api_key,
            model: self.model,
            poll_interval: self.poll_interval,
            timeout: self.timeout,
            queue_url: self
                .queue_url
                .unwrap_or_else(|| DEFAULT_QUEUE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

/// fal.ai queue-backed image-to-image transformer.
///
/// Submits a job, polls its status (forwarding queue logs to `tracing`),
/// then fetches the result URL.
pub struct FalTransformer {
    client: reqwest::Client,
    api_key: String,
    model: FalKontextModel,
    poll_interval: Duration,
    timeout: Duration,
    queue_url: String,
}

impl FalTransformer {
    /// Creates a new [`FalTransformerBuilder`].
    pub fn builder() -> FalTransformerBuilder {
        FalTransformerBuilder::new()
    }

    fn auth_header(&self) -> String {
        format!("Key {}", self.api_key)
    }

    fn parse_error(
        &self,
        status: u16,
        text: &str,
        headers: &reqwest::header::HeaderMap,
    ) -> YardVizError {
        let message = serde_json::from_str::<FalErrorResponse>(text)
            .ok()
            .and_then(|e| e.message())
            .map(|m| sanitize_error_message(&m))
            .unwrap_or_else(|| sanitize_error_message(text));

        match status {
            401 | 403 => YardVizError::Auth(message),
            429 => YardVizError::RateLimited {
                retry_after: parse_retry_after(headers),
            },
            _ => YardVizError::Api { status, message },
        }
    }

    async fn submit(&self, body: &FalKontextRequest) -> Result<FalSubmitResponse> {
        let url = format!("{}/{}", self.queue_url, self.model.as_str());

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text, &headers));
        }

        Ok(response.json().await?)
    }

    /// Polls the queue until the job completes, forwarding new log lines.
    async fn poll_until_ready(&self, request_id: &str, status_url: &str) -> Result<()> {
        let start = Instant::now();
        let mut logs_seen = 0usize;

        loop {
            check_deadline(start.elapsed(), self.timeout)?;

            let response = self
                .client
                .get(status_url)
                .query(&[("logs", "1")])
                .header("Authorization", self.auth_header())
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let headers = response.headers().clone();
                let text = response.text().await.unwrap_or_default();
                return Err(self.parse_error(status.as_u16(), &text, &headers));
            }

            let poll: FalStatusResponse = response.json().await?;

            for line in poll.new_logs(logs_seen) {
                tracing::info!(request_id = %request_id, "fal.ai: {}", line);
            }
            logs_seen = logs_seen.max(poll.logs.len());

            match poll.step()? {
                PollStep::Ready => return Ok(()),
                PollStep::Wait => {
                    tracing::debug!(
                        request_id = %request_id,
                        status = %poll.status,
                        queue_position = ?poll.queue_position,
                        elapsed_secs = start.elapsed().as_secs(),
                        "polling fal.ai transformation"
                    );
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }

    fn fallback_result_url(&self, request_id: &str) -> String {
        format!(
            "{}/{}/requests/{}",
            self.queue_url,
            self.model.as_str(),
            request_id
        )
    }

    /// Fetches the job result.
    ///
    /// Falls back to a model-id based URL when the returned `response_url`
    /// 404s, which happens for models with nested paths.
    async fn fetch_result(
        &self,
        response_url: &str,
        request_id: &str,
    ) -> Result<FalResultResponse> {
        let response = self
            .client
            .get(response_url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        let response = if needs_fallback_url(response.status().as_u16()) {
            tracing::debug!(
                response_url = %response_url,
                "fal.ai response_url returned {}, falling back to model_id-based URL",
                response.status().as_u16()
            );
            let fallback_url = self.fallback_result_url(request_id);
            self.client
                .get(&fallback_url)
                .header("Authorization", self.auth_header())
                .send()
                .await?
        } else {
            response
        };

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text, &headers));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Transformer for FalTransformer {
    async fn transform(
        &self,
        image: &AcquiredImage,
        instructions: &str,
        params: &GenerationParams,
    ) -> Result<TransformationResult> {
        params.validate()?;
        if instructions.trim().is_empty() {
            return Err(YardVizError::InvalidInput(
                "Transformation instructions must not be empty.".into(),
            ));
        }

        let start = Instant::now();
        let params = params.resolved();
        let body = FalKontextRequest::new(image, instructions, &params);

        let submit = self.submit(&body).await?;
        tracing::debug!(
            request_id = %submit.request_id,
            model = self.model.as_str(),
            seed = ?params.seed,
            "submitted fal.ai transformation"
        );

        self.poll_until_ready(&submit.request_id, &submit.status_url)
            .await?;

        let result = self
            .fetch_result(&submit.response_url, &submit.request_id)
            .await?;

        let seed = result.seed.or(params.seed).unwrap_or_default();
        let image_url = result.into_image_url()?;

        Ok(TransformationResult {
            image_url,
            seed,
            params: GenerationParams {
                seed: Some(seed),
                ..params
            },
            model: self.model.as_str().to_string(),
            request_id: Some(submit.request_id),
            duration_ms: Some(start.elapsed().as_millis() as u64),
        })
    }

    fn name(&self) -> &str {
        "fal.ai"
    }
}

/// Fails once a job has been polled for longer than `timeout`.
fn check_deadline(elapsed: Duration, timeout: Duration) -> Result<()> {
    if elapsed > timeout {
        return Err(YardVizError::Timeout(timeout));
    }
    Ok(())
}

/// Nested model ids make fal.ai's `response_url` answer 404 or 405.
fn needs_fallback_url(status: u16) -> bool {
    matches!(status, 404 | 405)
}

// -- Request types --

#[derive(Debug, Serialize)]
struct FalKontextRequest {
    image_url: String,
    prompt: String,
    strength: f32,
    guidance_scale: f32,
    num_inference_steps: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

impl FalKontextRequest {
    fn new(image: &AcquiredImage, instructions: &str, params: &GenerationParams) -> Self {
        Self {
            image_url: image.to_data_uri(),
            prompt: instructions.to_string(),
            strength: params.strength,
            guidance_scale: params.guidance_scale,
            num_inference_steps: params.num_inference_steps,
            seed: params.seed,
        }
    }
}

// -- Response types --

#[derive(Debug, Deserialize)]
struct FalSubmitResponse {
    request_id: String,
    /// URL to poll for status (provided by fal.ai).
    status_url: String,
    /// URL to fetch completed result (provided by fal.ai).
    response_url: String,
}

#[derive(Debug, Deserialize)]
struct FalStatusResponse {
    status: String,
    #[serde(default)]
    queue_position: Option<u32>,
    #[serde(default)]
    logs: Vec<FalLogEntry>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FalLogEntry {
    message: String,
}

/// What to do after one status poll.
#[derive(Debug, PartialEq, Eq)]
enum PollStep {
    Ready,
    Wait,
}

impl FalStatusResponse {
    fn step(&self) -> Result<PollStep> {
        match self.status.as_str() {
            "COMPLETED" => match &self.error {
                Some(error) => Err(YardVizError::UnexpectedResponse(format!(
                    "fal.ai generation failed: {}",
                    sanitize_error_message(error)
                ))),
                None => Ok(PollStep::Ready),
            },
            "IN_QUEUE" | "IN_PROGRESS" => Ok(PollStep::Wait),
            "FAILED" => Err(YardVizError::UnexpectedResponse(
                "fal.ai generation failed".into(),
            )),
            other => Err(YardVizError::UnexpectedResponse(format!(
                "fal.ai returned unexpected status: {}",
                other
            ))),
        }
    }

    /// Log lines not yet seen; fal.ai returns the full log on every poll.
    fn new_logs(&self, seen: usize) -> impl Iterator<Item = &str> {
        self.logs.iter().skip(seen).map(|log| log.message.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct FalResultResponse {
    #[serde(default)]
    images: Vec<FalImageInfo>,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct FalImageInfo {
    url: String,
}

impl FalResultResponse {
    fn into_image_url(self) -> Result<String> {
        self.images
            .into_iter()
            .map(|i| i.url)
            .find(|url| !url.is_empty())
            .ok_or_else(|| YardVizError::UnexpectedResponse("fal.ai returned no images".into()))
    }
}

/// fal.ai reports errors either as `{"detail": "..."}` or with validation
/// entries `{"detail": [{"msg": "..."}]}`.
#[derive(Debug, Deserialize)]
struct FalErrorResponse {
    detail: serde_json::Value,
}

impl FalErrorResponse {
    fn message(&self) -> Option<String> {
        match &self.detail {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(items) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|i| i.get("msg").and_then(|m| m.as_str()))
                    .collect();
                (!msgs.is_empty()).then(|| msgs.join("; "))
            }
            _ => None,
        }
    }
}
