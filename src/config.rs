//! Credential resolution.
//!
//! Providers take an explicit key from their builder, or fall back to the
//! environment variables listed here. The first non-empty value wins.

use crate::error::{Result, YardVizError};
use serde::Serialize;

/// Env var for the Street View Static and Geocoding APIs.
pub const GOOGLE_MAPS_ENV_VARS: &[&str] = &["GOOGLE_MAPS_API_KEY"];

/// Env vars for the Gemini vision model, in precedence order.
pub const GEMINI_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY", "GOOGLE_API_KEY"];

/// Env vars for fal.ai, in precedence order.
pub const FAL_ENV_VARS: &[&str] = &["FAL_KEY", "FAL_API_KEY"];

/// Resolves an API key from an explicit value or the given env vars.
///
/// Blank values are treated as absent. Fails with [`YardVizError::Config`]
/// carrying `missing_message` when nothing usable is found.
pub fn resolve_api_key(
    explicit: Option<String>,
    env_vars: &[&str],
    missing_message: &str,
) -> Result<String> {
    explicit
        .filter(|key| !key.trim().is_empty())
        .or_else(|| first_env(env_vars))
        .ok_or_else(|| YardVizError::Config(missing_message.to_string()))
}

fn first_env(env_vars: &[&str]) -> Option<String> {
    env_vars
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

/// Whether a provider's credential is available in the environment.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialStatus {
    /// Display name of the provider.
    pub provider: &'static str,
    /// What the pipeline uses it for.
    pub role: &'static str,
    /// Env vars consulted, in precedence order.
    pub env_vars: &'static [&'static str],
    /// Name of the env var that supplied the key, if any.
    pub resolved_from: Option<&'static str>,
}

impl CredentialStatus {
    /// Returns true if a key was found.
    pub fn is_configured(&self) -> bool {
        self.resolved_from.is_some()
    }
}

/// Reports which provider credentials are configured.
pub fn credential_status() -> Vec<CredentialStatus> {
    fn probe(
        provider: &'static str,
        role: &'static str,
        env_vars: &'static [&'static str],
    ) -> CredentialStatus {
        CredentialStatus {
            provider,
            role,
            env_vars,
            resolved_from: env_vars
                .iter()
                .copied()
                .find(|name| first_env(&[*name]).is_some()),
        }
    }

    vec![
        probe(
            "Google Maps (Street View + Geocoding)",
            "before image",
            GOOGLE_MAPS_ENV_VARS,
        ),
        probe("Gemini (Google)", "scene analysis", GEMINI_ENV_VARS),
        probe("fal.ai (Flux Kontext)", "after image", FAL_ENV_VARS),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_key_wins() {
        let key = resolve_api_key(Some("explicit".into()), &["YARDVIZ_TEST_UNSET_1"], "missing");
        assert_eq!(key.unwrap(), "explicit");
    }

    #[test]
    fn test_blank_explicit_key_is_ignored() {
        let err = resolve_api_key(Some("  ".into()), &["YARDVIZ_TEST_UNSET_2"], "no key")
            .unwrap_err();
        assert!(matches!(err, YardVizError::Config(ref m) if m == "no key"));
    }

    #[test]
    fn test_env_precedence() {
        std::env::set_var("YARDVIZ_TEST_SECONDARY", "second");
        std::env::remove_var("YARDVIZ_TEST_PRIMARY");
        let vars = &["YARDVIZ_TEST_PRIMARY", "YARDVIZ_TEST_SECONDARY"];

        assert_eq!(resolve_api_key(None, vars, "missing").unwrap(), "second");

        std::env::set_var("YARDVIZ_TEST_PRIMARY", "first");
        assert_eq!(resolve_api_key(None, vars, "missing").unwrap(), "first");

        std::env::remove_var("YARDVIZ_TEST_PRIMARY");
        std::env::remove_var("YARDVIZ_TEST_SECONDARY");
    }

    #[test]
    fn test_credential_status_lists_all_providers() {
        let status = credential_status();
        assert_eq!(status.len(), 3);
        assert_eq!(status[2].env_vars, FAL_ENV_VARS);
    }
}
