//! Shared utility functions for provider adapters.

use briefing_domain::config::ProviderConfig;
use briefing_domain::error::{Error, Result};

/// Convert a [`reqwest::Error`] into the domain [`Error`] type, distinguishing
/// the two retriable kinds from everything else (spec §4.7).
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::LlmTimeout(e.to_string())
    } else if e.is_connect() || e.is_request() {
        Error::LlmTransport(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Resolve the API credential for a provider from its configured environment
/// variable (spec §4.11 "provider endpoints and credentials"). No plaintext
/// or keychain fallback — a missing env var fails provider construction with
/// a clear error, per spec §6 ("required LLM-provider credentials fail
/// startup... with a clear error").
pub fn resolve_api_key(cfg: &ProviderConfig) -> Result<String> {
    let var = cfg.credential_env.as_deref().ok_or_else(|| {
        Error::Auth(format!(
            "provider '{}' has no credential_env configured",
            cfg.id
        ))
    })?;
    std::env::var(var).map_err(|_| {
        Error::Auth(format!(
            "environment variable '{var}' not set for provider '{}'",
            cfg.id
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use briefing_domain::config::ProviderKind;

    #[test]
    fn resolve_api_key_reads_configured_env_var() {
        let var_name = "BRIEFING_TEST_PROVIDER_KEY_1";
        std::env::set_var(var_name, "sk-test-123");
        let cfg = ProviderConfig {
            id: "anthropic".into(),
            kind: ProviderKind::Anthropic,
            base_url: "https://api.anthropic.com".into(),
            credential_env: Some(var_name.into()),
            default_model: None,
        };
        assert_eq!(resolve_api_key(&cfg).unwrap(), "sk-test-123");
        std::env::remove_var(var_name);
    }

    #[test]
    fn resolve_api_key_missing_var_errors() {
        let cfg = ProviderConfig {
            id: "anthropic".into(),
            kind: ProviderKind::Anthropic,
            base_url: "https://api.anthropic.com".into(),
            credential_env: Some("BRIEFING_TEST_DOES_NOT_EXIST".into()),
            default_model: None,
        };
        assert!(resolve_api_key(&cfg).is_err());
    }

    #[test]
    fn resolve_api_key_unset_field_errors() {
        let cfg = ProviderConfig {
            id: "anthropic".into(),
            kind: ProviderKind::Anthropic,
            base_url: "https://api.anthropic.com".into(),
            credential_env: None,
            default_model: None,
        };
        assert!(resolve_api_key(&cfg).is_err());
    }
}
