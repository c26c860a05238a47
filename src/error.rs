//! Error types for the makeover pipeline.

use std::time::Duration;

/// Fallback text shown when a provider failed without a usable message.
pub const GENERIC_FAILURE_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Errors that can occur while acquiring, analyzing or transforming imagery.
#[derive(Debug, thiserror::Error)]
pub enum YardVizError {
    /// A required credential or setting is missing.
    #[error("{0}")]
    Config(String),

    /// The caller supplied an empty or malformed query or parameter.
    #[error("{0}")]
    InvalidInput(String),

    /// Address could not be resolved, or no imagery exists for it.
    #[error("{0}")]
    NotFound(String),

    /// API key rejected by the provider.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Provider error text.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Delay suggested by the provider, if any.
        retry_after: Option<Duration>,
    },

    /// Generation job did not finish in time.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Provider answered with something we could not use.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (e.g., saving an image).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse error categories surfaced to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required credential absent. Raised before any network call.
    Configuration,
    /// Empty or invalid query.
    Input,
    /// Unresolvable address or no imagery coverage.
    NotFound,
    /// Any downstream HTTP, response or job failure.
    Provider,
}

impl YardVizError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::InvalidInput(_) => ErrorKind::Input,
            Self::NotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::Provider,
        }
    }

    /// Renders the message shown to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(msg) | Self::InvalidInput(msg) | Self::NotFound(msg) => msg.clone(),
            Self::Auth(msg)
            | Self::ContentBlocked(msg)
            | Self::UnexpectedResponse(msg)
            | Self::Api { message: msg, .. }
                if !msg.trim().is_empty() =>
            {
                msg.clone()
            }
            Self::RateLimited {
                retry_after: Some(wait),
            } => format!(
                "Too many requests, please try again in {} seconds.",
                wait.as_secs().max(1)
            ),
            Self::Timeout(limit) => format!(
                "The image took longer than {} seconds to generate. Please try again.",
                limit.as_secs().max(1)
            ),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, YardVizError>;

const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Strips echoed credentials and truncates long provider error bodies.
///
/// Map APIs echo the request URL (including `key=...`) in some error pages.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find("key=") {
        let (head, tail) = rest.split_at(pos + 4);
        cleaned.push_str(head);
        cleaned.push_str("[redacted]");
        let end = tail
            .find(|c: char| c == '&' || c == '"' || c == '\'' || c.is_whitespace())
            .unwrap_or(tail.len());
        rest = &tail[end..];
    }
    cleaned.push_str(rest);

    let cleaned = cleaned.trim();
    if cleaned.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let truncated: String = cleaned.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        format!("{truncated}...")
    } else {
        cleaned.to_string()
    }
}

/// Reads a `Retry-After` header expressed in whole seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
