//! Cache materialiser (spec §4.3, C3).
//!
//! The scheduled job: fetch every configured source, sort the union of
//! successful articles by parsed `pub_date` descending (unparseable dates
//! sort last), truncate to the configured cap, and write the resulting
//! [`Artifact`] atomically (write-temp-then-rename) to the configured path.
//! Also exposed as an on-demand operation bounded by a hard wall-clock
//! limit; exceeding it yields a distinguished timeout failure.

use std::path::Path;

use chrono::{DateTime, Utc};

use briefing_domain::article::{AggregatedResult, Artifact, ArtifactSummary};
use briefing_domain::config::{FetchConfig, RssCacheConfig};

use crate::fetcher::fetch_all;

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("rss cache generation exceeded its wall-clock limit")]
    Timeout,
    #[error("io error writing artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error serializing artifact: {0}")]
    Json(#[from] serde_json::Error),
}

/// Run one materialisation cycle: fetch, sort, truncate, write atomically.
pub async fn generate_cache(
    sources: &[(String, String)],
    fetch_config: &FetchConfig,
    cache_config: &RssCacheConfig,
) -> Result<Artifact, CacheError> {
    let result = fetch_all(sources, fetch_config).await;
    let artifact = build_artifact(&result, cache_config.max_articles);
    write_atomic(&cache_config.artifact_path, &artifact).await?;
    Ok(artifact)
}

/// On-demand variant with a hard wall-clock cap (spec §4.3, §6
/// `POST /agent/rss-cache/generate`). Exceeding the limit yields
/// [`CacheError::Timeout`] rather than letting the fetch run unbounded.
pub async fn generate_cache_with_deadline(
    sources: &[(String, String)],
    fetch_config: &FetchConfig,
    cache_config: &RssCacheConfig,
) -> Result<Artifact, CacheError> {
    let deadline = std::time::Duration::from_millis(cache_config.on_demand_timeout_ms);
    match tokio::time::timeout(deadline, generate_cache(sources, fetch_config, cache_config)).await
    {
        Ok(inner) => inner,
        Err(_elapsed) => Err(CacheError::Timeout),
    }
}

fn build_artifact(result: &AggregatedResult, cap: usize) -> Artifact {
    let mut articles = result.successful_articles();
    articles.sort_by(|a, b| sort_key(b).cmp(&sort_key(a)));
    articles.truncate(cap);

    let generated_at = Utc::now().to_rfc3339();
    Artifact {
        summary: ArtifactSummary {
            total_sources: result.total_sources,
            successful_sources: result.successful_sources,
            failed_sources: result.failed_sources,
            total_articles: articles.len(),
            generated_at,
            status_message: result.status_message(),
        },
        articles,
    }
}

/// Sort key for descending `pub_date` order. Unparseable or missing dates
/// sort to the very bottom via `DateTime::<Utc>::MIN_UTC`, which becomes
/// the *smallest* key — last once compared in descending order.
fn sort_key(article: &briefing_domain::article::Article) -> DateTime<Utc> {
    article
        .pub_date
        .as_deref()
        .and_then(parse_any_date)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn parse_any_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    None
}

/// Write `value` to `path` atomically: write to a temp file in the same
/// directory, then rename over the final path. Relies on the OS rename
/// guarantee rather than per-write fsync (spec §9).
async fn write_atomic(path: &str, artifact: &Artifact) -> Result<(), CacheError> {
    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let json = serde_json::to_vec_pretty(artifact)?;

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = tempfile::Builder::new()
        .prefix(".rss-artifact-")
        .suffix(".tmp")
        .tempfile_in(dir.unwrap_or_else(|| Path::new(".")))?;
    use std::io::Write;
    tmp.write_all(&json)?;
    tmp.flush()?;
    let (_file, tmp_path) = tmp.keep().map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}

/// Read-only load of the persisted artifact. Returns `Ok(None)` if the
/// cache job has never run (spec §4.5 `CacheMissing`, callers decide how
/// to surface the hint).
pub async fn load_artifact(path: &str) -> Result<Option<Artifact>, CacheError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let artifact: Artifact = serde_json::from_slice(&bytes)?;
            Ok(Some(artifact))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CacheError::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use briefing_domain::article::{Article, FetchOutcome};

    fn article(title: &str, pub_date: Option<&str>) -> Article {
        Article {
            title: title.into(),
            link: format!("https://example.com/{title}"),
            description: String::new(),
            pub_date: pub_date.map(String::from),
            author: None,
            source: "Example Feed".into(),
            categories: vec![],
        }
    }

    #[test]
    fn sorts_by_pub_date_descending_with_unparseable_last() {
        let outcomes = vec![FetchOutcome::ok(
            "a",
            vec![
                article("old", Some("Mon, 01 Jan 2024 00:00:00 GMT")),
                article("new", Some("Wed, 01 Jan 2025 00:00:00 GMT")),
                article("garbled", Some("not a date")),
                article("no-date", None),
            ],
            "t".into(),
        )];
        let result = AggregatedResult::from_outcomes(outcomes, "t".into());
        let artifact = build_artifact(&result, 200);
        let titles: Vec<_> = artifact.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles[0], "new");
        assert_eq!(titles[1], "old");
        assert!(titles[2] == "garbled" || titles[2] == "no-date");
        assert!(titles[3] == "garbled" || titles[3] == "no-date");
    }

    #[test]
    fn truncates_to_cap() {
        let articles: Vec<Article> = (0..10).map(|i| article(&format!("a{i}"), None)).collect();
        let outcomes = vec![FetchOutcome::ok("a", articles, "t".into())];
        let result = AggregatedResult::from_outcomes(outcomes, "t".into());
        let artifact = build_artifact(&result, 3);
        assert_eq!(artifact.articles.len(), 3);
        assert_eq!(artifact.summary.total_articles, 3);
    }

    #[tokio::test]
    async fn write_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.json");
        let path_str = path.to_str().unwrap().to_string();

        let outcomes = vec![FetchOutcome::ok("a", vec![article("x", None)], "t".into())];
        let result = AggregatedResult::from_outcomes(outcomes, "t".into());
        let artifact = build_artifact(&result, 200);
        write_atomic(&path_str, &artifact).await.unwrap();

        let loaded = load_artifact(&path_str).await.unwrap().unwrap();
        assert_eq!(loaded.articles.len(), 1);
        assert_eq!(loaded.articles[0].title, "x");
    }

    #[tokio::test]
    async fn missing_artifact_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let loaded = load_artifact(path.to_str().unwrap()).await.unwrap();
        assert!(loaded.is_none());
    }
}
