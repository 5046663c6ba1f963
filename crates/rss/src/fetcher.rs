//! Parallel feed fetcher (spec §4.2, C2).
//!
//! Issues one GET per configured source, bounded to `max_workers`
//! in-flight requests via a `tokio::sync::Semaphore` rather than an OS
//! thread pool (spec §5, §9 "cooperative concurrency"). No source failure
//! ever aborts the batch — every URL yields exactly one `FetchOutcome`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Semaphore;

use briefing_domain::article::{AggregatedResult, FetchOutcome};
use briefing_domain::config::FetchConfig;

use crate::parser::parse_feed;

/// Fetch all `(name, url)` sources concurrently and collect an
/// `AggregatedResult`. Results may complete in any order; they are
/// collected into one batch once every source has resolved.
pub async fn fetch_all(sources: &[(String, String)], config: &FetchConfig) -> AggregatedResult {
    let client = Arc::new(
        reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_default(),
    );
    let semaphore = Arc::new(Semaphore::new(config.max_workers.max(1)));

    let mut tasks = Vec::with_capacity(sources.len());
    for (name, url) in sources {
        let client = client.clone();
        let semaphore = semaphore.clone();
        let name = name.clone();
        let url = url.clone();
        let max_retries = config.max_retries;
        let retry_delay_ms = config.retry_delay_ms;

        tasks.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            fetch_one(&client, &name, &url, max_retries, retry_delay_ms).await
        }));
    }

    let mut outcomes = Vec::with_capacity(tasks.len());
    for task in tasks {
        match task.await {
            Ok(outcome) => outcomes.push(outcome),
            Err(join_err) => outcomes.push(FetchOutcome::failed(
                "unknown",
                format!("task join error: {join_err}"),
                Utc::now().to_rfc3339(),
            )),
        }
    }

    AggregatedResult::from_outcomes(outcomes, Utc::now().to_rfc3339())
}

/// Fetch, parse and retry a single source. Always returns — never panics
/// and never propagates an error past this boundary (spec §4.2).
async fn fetch_one(
    client: &reqwest::Client,
    name: &str,
    url: &str,
    max_retries: u32,
    retry_delay_ms: u64,
) -> FetchOutcome {
    let mut attempt = 0;
    loop {
        match client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    // Non-transport failure (e.g. 404, 500) — do not retry.
                    return FetchOutcome::failed(
                        url,
                        format!("HTTP {status}"),
                        Utc::now().to_rfc3339(),
                    );
                }
                return match response.bytes().await {
                    Ok(bytes) => {
                        let articles = parse_feed(&bytes, name);
                        FetchOutcome::ok(url, articles, Utc::now().to_rfc3339())
                    }
                    Err(e) => FetchOutcome::failed(
                        url,
                        format!("reading response body: {e}"),
                        Utc::now().to_rfc3339(),
                    ),
                };
            }
            Err(e) => {
                let retriable = e.is_timeout() || e.is_connect() || e.is_request();
                if retriable && attempt < max_retries {
                    attempt += 1;
                    tracing::warn!(
                        source = %name, url = %url, attempt, "feed fetch failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(retry_delay_ms)).await;
                    continue;
                }
                let kind = if e.is_timeout() { "timeout" } else { "transport error" };
                return FetchOutcome::failed(
                    url,
                    format!("{kind}: {e}"),
                    Utc::now().to_rfc3339(),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_url_yields_exactly_one_outcome() {
        let config = FetchConfig {
            max_workers: 2,
            timeout_ms: 500,
            max_retries: 0,
            retry_delay_ms: 1,
            user_agent: "test-agent".into(),
        };
        let sources = vec![
            ("a".to_string(), "http://127.0.0.1:1/not-listening".to_string()),
            ("b".to_string(), "http://127.0.0.1:1/also-not-listening".to_string()),
        ];
        let result = fetch_all(&sources, &config).await;
        assert_eq!(result.total_sources, 2);
        assert_eq!(result.successful_sources + result.failed_sources, result.total_sources);
        assert_eq!(result.outcomes.len(), 2);
    }

    #[tokio::test]
    async fn aggregated_article_count_matches_successful_outcomes() {
        let config = FetchConfig::default();
        let outcomes = vec![
            FetchOutcome::ok("a", vec![], Utc::now().to_rfc3339()),
            FetchOutcome::failed("b", "boom", Utc::now().to_rfc3339()),
        ];
        let _ = config;
        let agg = AggregatedResult::from_outcomes(outcomes, Utc::now().to_rfc3339());
        assert_eq!(agg.total_articles, 0);
        assert_eq!(agg.successful_sources, 1);
        assert_eq!(agg.failed_sources, 1);
    }
}
