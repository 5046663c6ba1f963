use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RSS ingestion pipeline
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RssConfig {
    /// Feed sources as `(name, url)` pairs.
    #[serde(default)]
    pub sources: Vec<FeedSource>,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub cache: RssCacheConfig,
}

impl Default for RssConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            fetch: FetchConfig::default(),
            cache: RssCacheConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "d_max_workers")]
    pub max_workers: usize,
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "d_max_retries")]
    pub max_retries: u32,
    #[serde(default = "d_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "d_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_workers: d_max_workers(),
            timeout_ms: d_timeout_ms(),
            max_retries: d_max_retries(),
            retry_delay_ms: d_retry_delay_ms(),
            user_agent: d_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RssCacheConfig {
    #[serde(default = "d_true")]
    pub enabled: bool,
    /// Path the artifact is atomically written to.
    #[serde(default = "d_artifact_path")]
    pub artifact_path: String,
    /// Max articles retained per artifact, globally sorted by `pub_date` desc.
    #[serde(default = "d_max_articles")]
    pub max_articles: usize,
    /// Wall-clock cap for the on-demand generation endpoint.
    #[serde(default = "d_on_demand_timeout_ms")]
    pub on_demand_timeout_ms: u64,
}

impl Default for RssCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            artifact_path: d_artifact_path(),
            max_articles: d_max_articles(),
            on_demand_timeout_ms: d_on_demand_timeout_ms(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_max_workers() -> usize {
    8
}
fn d_timeout_ms() -> u64 {
    10_000
}
fn d_max_retries() -> u32 {
    2
}
fn d_retry_delay_ms() -> u64 {
    500
}
fn d_user_agent() -> String {
    "briefing-rss/0.1".into()
}
fn d_true() -> bool {
    true
}
fn d_artifact_path() -> String {
    "./data/rss-artifact.json".into()
}
fn d_max_articles() -> usize {
    200
}
fn d_on_demand_timeout_ms() -> u64 {
    30_000
}
