//! Wire-format data model for the RSS ingestion pipeline (spec §3).
//!
//! Shared between the producer (`briefing-rss`) and the consumer
//! (`briefing-tools`'s RSS tools) so neither depends on the other.

use serde::{Deserialize, Serialize};

/// A single normalised feed entry (spec §3 "Article").
///
/// `title` and `link` are mandatory — the parser skips entries missing
/// either. `description` is never absent, but may be an empty string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub description: String,
    /// RFC 2822 or ISO-8601, as the feed provided it. Not normalised —
    /// ranking/sorting reparse this lazily.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Human name of the feed this article came from.
    pub source: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Per-source outcome of one fetch attempt (spec §3 "FetchOutcome").
///
/// Invariant: `success == false` implies `articles` is empty and `error`
/// is set; `success == true` implies `error` is `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchOutcome {
    pub url: String,
    pub success: bool,
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub fetch_time: String,
}

impl FetchOutcome {
    pub fn ok(url: impl Into<String>, articles: Vec<Article>, fetch_time: String) -> Self {
        Self {
            url: url.into(),
            success: true,
            articles,
            error: None,
            fetch_time,
        }
    }

    pub fn failed(url: impl Into<String>, error: impl Into<String>, fetch_time: String) -> Self {
        Self {
            url: url.into(),
            success: false,
            articles: Vec::new(),
            error: Some(error.into()),
            fetch_time,
        }
    }
}

/// Result of one parallel fetch batch (spec §3 "AggregatedResult").
///
/// Invariant: `successful_sources + failed_sources == total_sources`;
/// `total_articles` is the sum of article counts over successful outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub total_sources: usize,
    pub successful_sources: usize,
    pub failed_sources: usize,
    pub total_articles: usize,
    pub outcomes: Vec<FetchOutcome>,
    pub fetch_time: String,
}

impl AggregatedResult {
    pub fn from_outcomes(outcomes: Vec<FetchOutcome>, fetch_time: String) -> Self {
        let total_sources = outcomes.len();
        let successful_sources = outcomes.iter().filter(|o| o.success).count();
        let failed_sources = total_sources - successful_sources;
        let total_articles = outcomes
            .iter()
            .filter(|o| o.success)
            .map(|o| o.articles.len())
            .sum();
        Self {
            total_sources,
            successful_sources,
            failed_sources,
            total_articles,
            outcomes,
            fetch_time,
        }
    }

    /// All articles from successful outcomes, in outcome order.
    pub fn successful_articles(&self) -> Vec<Article> {
        self.outcomes
            .iter()
            .filter(|o| o.success)
            .flat_map(|o| o.articles.clone())
            .collect()
    }

    /// A human-readable status line like `"2/3 feeds fetched successfully"`.
    pub fn status_message(&self) -> String {
        format!(
            "{}/{} feeds fetched successfully",
            self.successful_sources, self.total_sources
        )
    }
}

/// Summary block persisted alongside the cached article list (spec §3
/// "Artifact").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub total_sources: usize,
    pub successful_sources: usize,
    pub failed_sources: usize,
    pub total_articles: usize,
    pub generated_at: String,
    pub status_message: String,
}

/// The daily-materialised RSS cache (spec §3, §4.3).
///
/// Rewritten atomically by the cache materialiser once per scheduled run;
/// read-only to the serving path. `articles` is globally sorted by
/// `pub_date` descending and capped at the configured bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub summary: ArtifactSummary,
    pub articles: Vec<Article>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregated_result_invariant_holds() {
        let outcomes = vec![
            FetchOutcome::ok("a", vec![sample_article("x")], "t".into()),
            FetchOutcome::failed("b", "boom", "t".into()),
        ];
        let agg = AggregatedResult::from_outcomes(outcomes, "t".into());
        assert_eq!(agg.successful_sources + agg.failed_sources, agg.total_sources);
        assert_eq!(agg.total_articles, 1);
    }

    #[test]
    fn artifact_roundtrips_through_json() {
        let artifact = Artifact {
            summary: ArtifactSummary {
                total_sources: 1,
                successful_sources: 1,
                failed_sources: 0,
                total_articles: 1,
                generated_at: "2026-01-01T00:00:00Z".into(),
                status_message: "1/1 feeds fetched successfully".into(),
            },
            articles: vec![sample_article("roundtrip")],
        };
        let json = serde_json::to_string(&artifact).unwrap();
        let back: Artifact = serde_json::from_str(&json).unwrap();
        assert_eq!(back.articles, artifact.articles);
        assert_eq!(back.summary.generated_at, artifact.summary.generated_at);
    }

    fn sample_article(title: &str) -> Article {
        Article {
            title: title.into(),
            link: format!("https://example.com/{title}"),
            description: String::new(),
            pub_date: None,
            author: None,
            source: "Example Feed".into(),
            categories: vec![],
        }
    }
}
