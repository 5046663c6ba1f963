mod llm;
mod observability;
mod rss;
mod server;
mod sessions;
mod upload;

pub use llm::*;
pub use observability::*;
pub use rss::*;
pub use server::*;
pub use sessions::*;
pub use upload::*;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub rss: RssConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        if self.server.host.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.host".into(),
                message: "host must not be empty".into(),
            });
        }

        // Warn when no LLM providers are configured.
        if self.llm.providers.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "llm.providers".into(),
                message: "no LLM providers configured".into(),
            });
        }

        let mut seen_ids: HashSet<&str> = HashSet::new();

        for (i, provider) in self.llm.providers.iter().enumerate() {
            if provider.id.is_empty() {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: format!("llm.providers[{i}].id"),
                    message: "provider id must not be empty".into(),
                });
            }
            if provider.base_url.is_empty() {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: format!("llm.providers[{i}].base_url"),
                    message: "provider base_url must not be empty".into(),
                });
            }

            if !provider.base_url.is_empty()
                && !provider.base_url.starts_with("http://")
                && !provider.base_url.starts_with("https://")
            {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: format!("llm.providers[{i}].base_url"),
                    message: format!(
                        "base_url must start with http:// or https:// (got \"{}\")",
                        provider.base_url
                    ),
                });
            }

            if !provider.id.is_empty() && !seen_ids.insert(&provider.id) {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Warning,
                    field: format!("llm.providers[{i}].id"),
                    message: format!(
                        "duplicate provider id \"{}\" — later provider will shadow earlier one",
                        provider.id
                    ),
                });
            }

            if provider.kind == ProviderKind::Anthropic || provider.kind == ProviderKind::OpenaiCompat {
                let has_credential = provider
                    .credential_env
                    .as_ref()
                    .is_some_and(|v| !v.is_empty());
                if !has_credential {
                    errors.push(ConfigError {
                        severity: ConfigSeverity::Error,
                        field: format!("llm.providers[{i}].credential_env"),
                        message: format!(
                            "provider \"{}\" requires credential_env to be set",
                            provider.id
                        ),
                    });
                }
            }
        }

        // CORS: warn if wildcard is used.
        if self.server.cors.allowed_origins.len() == 1
            && self.server.cors.allowed_origins[0] == "*"
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "server.cors.allowed_origins".into(),
                message: "wildcard \"*\" allows all origins (not recommended for production)"
                    .into(),
            });
        }

        if self.rss.cache.max_articles == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "rss.cache.max_articles".into(),
                message: "max_articles must be greater than 0".into(),
            });
        }

        if self.rss.fetch.max_workers == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "rss.fetch.max_workers".into(),
                message: "max_workers must be greater than 0".into(),
            });
        }

        if self.sessions.max_history_messages == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "sessions.max_history_messages".into(),
                message: "max_history_messages is 0 — agent loop will see no prior turns".into(),
            });
        }

        if self.llm.max_loop_iterations == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "llm.max_loop_iterations".into(),
                message: "max_loop_iterations must be greater than 0".into(),
            });
        }

        errors
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            server: ServerConfig {
                port: 3210,
                host: "127.0.0.1".into(),
                ..ServerConfig::default()
            },
            llm: LlmConfig {
                providers: vec![ProviderConfig {
                    id: "anthropic".into(),
                    kind: ProviderKind::Anthropic,
                    base_url: "https://api.anthropic.com".into(),
                    credential_env: Some("ANTHROPIC_API_KEY".into()),
                    default_model: None,
                }],
                ..LlmConfig::default()
            },
            ..Config::default()
        }
    }

    fn find_issue<'a>(issues: &'a [ConfigError], field_prefix: &str) -> Option<&'a ConfigError> {
        issues.iter().find(|e| e.field.starts_with(field_prefix))
    }

    #[test]
    fn valid_config_passes() {
        let issues = valid_config().validate();
        let errors: Vec<_> = issues
            .iter()
            .filter(|e| e.severity == ConfigSeverity::Error)
            .collect();
        assert!(errors.is_empty(), "expected no errors, got: {errors:?}");
    }

    #[test]
    fn server_port_zero_is_error() {
        let mut cfg = valid_config();
        cfg.server.port = 0;
        let issues = cfg.validate();
        let issue = find_issue(&issues, "server.port").expect("expected server.port error");
        assert_eq!(issue.severity, ConfigSeverity::Error);
    }

    #[test]
    fn server_host_empty_is_error() {
        let mut cfg = valid_config();
        cfg.server.host = String::new();
        let issues = cfg.validate();
        let issue = find_issue(&issues, "server.host").expect("expected server.host error");
        assert_eq!(issue.severity, ConfigSeverity::Error);
    }

    #[test]
    fn provider_base_url_invalid_scheme_is_error() {
        let mut cfg = valid_config();
        cfg.llm.providers[0].base_url = "ws://localhost:1234".into();
        let issues = cfg.validate();
        let issue = find_issue(&issues, "llm.providers[0].base_url")
            .expect("expected provider base_url error");
        assert_eq!(issue.severity, ConfigSeverity::Error);
    }

    #[test]
    fn provider_without_credential_env_is_error() {
        let mut cfg = valid_config();
        cfg.llm.providers[0].credential_env = None;
        let issues = cfg.validate();
        let issue = find_issue(&issues, "llm.providers[0].credential_env")
            .expect("expected credential_env error");
        assert_eq!(issue.severity, ConfigSeverity::Error);
    }

    #[test]
    fn gateway_provider_does_not_require_credential_env() {
        let mut cfg = valid_config();
        cfg.llm.providers[0].kind = ProviderKind::Gateway;
        cfg.llm.providers[0].credential_env = None;
        let issues = cfg.validate();
        assert!(find_issue(&issues, "llm.providers[0].credential_env").is_none());
    }

    #[test]
    fn duplicate_provider_ids_is_warning() {
        let mut cfg = valid_config();
        let second = ProviderConfig {
            id: "anthropic".into(),
            kind: ProviderKind::Anthropic,
            base_url: "https://api.anthropic.com".into(),
            credential_env: Some("ANTHROPIC_API_KEY_2".into()),
            default_model: None,
        };
        cfg.llm.providers.push(second);
        let issues = cfg.validate();
        let dup_issues: Vec<_> = issues
            .iter()
            .filter(|e| e.message.contains("duplicate provider id"))
            .collect();
        assert_eq!(dup_issues.len(), 1);
        assert_eq!(dup_issues[0].severity, ConfigSeverity::Warning);
    }

    #[test]
    fn cors_wildcard_is_warning() {
        let mut cfg = valid_config();
        cfg.server.cors.allowed_origins = vec!["*".into()];
        let issues = cfg.validate();
        let issue = find_issue(&issues, "server.cors.allowed_origins")
            .expect("expected CORS wildcard warning");
        assert_eq!(issue.severity, ConfigSeverity::Warning);
    }

    #[test]
    fn no_providers_is_warning() {
        let mut cfg = valid_config();
        cfg.llm.providers.clear();
        let issues = cfg.validate();
        let issue = find_issue(&issues, "llm.providers").expect("expected no-providers warning");
        assert_eq!(issue.severity, ConfigSeverity::Warning);
    }

    #[test]
    fn zero_max_articles_is_error() {
        let mut cfg = valid_config();
        cfg.rss.cache.max_articles = 0;
        let issues = cfg.validate();
        assert!(find_issue(&issues, "rss.cache.max_articles").is_some());
    }

    #[test]
    fn zero_max_workers_is_error() {
        let mut cfg = valid_config();
        cfg.rss.fetch.max_workers = 0;
        let issues = cfg.validate();
        assert!(find_issue(&issues, "rss.fetch.max_workers").is_some());
    }

    #[test]
    fn zero_max_loop_iterations_is_error() {
        let mut cfg = valid_config();
        cfg.llm.max_loop_iterations = 0;
        let issues = cfg.validate();
        assert!(find_issue(&issues, "llm.max_loop_iterations").is_some());
    }

    #[test]
    fn config_error_display_format() {
        let err = ConfigError {
            severity: ConfigSeverity::Error,
            field: "server.port".into(),
            message: "port must be greater than 0".into(),
        };
        assert_eq!(
            format!("{err}"),
            "[ERROR] server.port: port must be greater than 0"
        );
    }
}
