use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Observability (structured logging) configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// The `service.name` field attached to every log line.
    #[serde(default = "d_service_name")]
    pub service_name: String,

    /// `RUST_LOG`-style filter directive, e.g. `"info,briefing_gateway=debug"`.
    #[serde(default = "d_log_filter")]
    pub log_filter: String,

    #[serde(default = "d_log_format")]
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: d_service_name(),
            log_filter: d_log_filter(),
            log_format: d_log_format(),
        }
    }
}

fn d_service_name() -> String {
    "briefing-gateway".into()
}

fn d_log_filter() -> String {
    "info".into()
}

fn d_log_format() -> LogFormat {
    LogFormat::Pretty
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
