//! RSS tool implementations (spec §4.5, C5): `fetch_rss_news`,
//! `filter_rss_news`, `search_rss_by_keywords`. All three read the
//! materialised Artifact written by the cache job (C3) rather than
//! fetching feeds live.

use std::sync::Arc;

use briefing_domain::article::{Article, Artifact};
use briefing_domain::config::RssConfig;
use briefing_domain::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

pub struct RssTools {
    config: RssConfig,
}

impl RssTools {
    pub fn new(config: RssConfig) -> Arc<Self> {
        Arc::new(Self { config })
    }

    async fn load_artifact(&self) -> Result<Artifact> {
        briefing_rss::load_artifact(&self.config.cache.artifact_path)
            .await
            .map_err(|e| Error::Other(e.to_string()))?
            .ok_or_else(|| {
                Error::CacheMissing(
                    "no RSS artifact is available yet; run the cache materialiser job first".into(),
                )
            })
    }

    pub async fn fetch_rss_news(&self, arguments: Value) -> Result<Value> {
        #[derive(Deserialize, Default)]
        struct Args {
            max_articles: Option<usize>,
            sources_limit: Option<usize>,
        }
        let args: Args = parse_args(arguments)?;

        let artifact = match self.load_artifact().await {
            Ok(a) => a,
            Err(Error::CacheMissing(hint)) => {
                return Ok(serde_json::json!({
                    "success": false,
                    "error": "rss cache unavailable",
                    "hint": hint,
                }));
            }
            Err(e) => return Err(e),
        };

        let mut summary = artifact.summary.clone();
        if let Some(limit) = args.sources_limit {
            summary.successful_sources = summary.successful_sources.min(limit);
        }
        let max_articles = args.max_articles.unwrap_or(self.config.cache.max_articles);
        let articles: Vec<&Article> = artifact.articles.iter().take(max_articles).collect();

        Ok(serde_json::json!({
            "success": true,
            "summary": {
                "total_sources": summary.total_sources,
                "successful_sources": summary.successful_sources,
                "failed_sources": summary.failed_sources,
                "total_articles": summary.total_articles,
                "generated_at": summary.generated_at,
                "status_message": summary.status_message,
            },
            "articles": articles,
            "note": "articles served from the last materialised cache snapshot",
        }))
    }

    pub async fn filter_rss_news(&self, arguments: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Args {
            query: String,
            #[serde(default = "d_max_articles")]
            max_articles: usize,
            #[serde(default = "d_top_k")]
            top_k: usize,
        }
        let args: Args = parse_args(arguments)?;

        let artifact = self.load_artifact().await?;
        let pool: Vec<&Article> = artifact.articles.iter().take(args.max_articles).collect();

        let ranked = rank_by_relevance(&pool, &args.query, args.top_k);

        Ok(serde_json::json!({
            "success": true,
            "query": args.query,
            "articles": ranked,
        }))
    }

    pub async fn search_rss_by_keywords(&self, arguments: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Args {
            keywords: Vec<String>,
            #[serde(default = "d_max_articles")]
            max_articles: usize,
        }
        let args: Args = parse_args(arguments)?;

        let artifact = self.load_artifact().await?;
        let pool: Vec<&Article> = artifact.articles.iter().take(args.max_articles).collect();
        let keywords: Vec<String> = args.keywords.iter().map(|k| k.to_lowercase()).collect();

        let matches: Vec<&Article> = pool
            .into_iter()
            .filter(|a| {
                let title = a.title.to_lowercase();
                let description = a.description.to_lowercase();
                keywords.iter().any(|k| title.contains(k.as_str()) || description.contains(k.as_str()))
            })
            .collect();

        Ok(serde_json::json!({
            "success": true,
            "keywords": args.keywords,
            "articles": matches,
        }))
    }
}

fn d_max_articles() -> usize {
    50
}
fn d_top_k() -> usize {
    10
}

fn parse_args<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    let value = if value.is_null() { Value::Object(Default::default()) } else { value };
    serde_json::from_value(value).map_err(|e| Error::SchemaDecodeError(e.to_string()))
}

#[derive(serde::Serialize)]
struct RankedArticle<'a> {
    #[serde(flatten)]
    article: &'a Article,
    relevance_score: u32,
    relevance_reason: &'static str,
}

/// Deterministic relevance ranking (spec §4.5): tokenise the query by
/// whitespace, lowercase; score = 3·(title matches) + 1·(description
/// matches); keep positive scores; ties broken by input order; cap the
/// reported score at 10.
fn rank_by_relevance<'a>(articles: &[&'a Article], query: &str, top_k: usize) -> Vec<RankedArticle<'a>> {
    let tokens: Vec<String> = query.split_whitespace().map(|t| t.to_lowercase()).collect();

    let mut scored: Vec<(usize, u32, &'a Article)> = articles
        .iter()
        .enumerate()
        .filter_map(|(idx, article)| {
            let title = article.title.to_lowercase();
            let description = article.description.to_lowercase();
            let title_matches = tokens.iter().filter(|t| title.contains(t.as_str())).count() as u32;
            let description_matches = tokens.iter().filter(|t| description.contains(t.as_str())).count() as u32;
            let score = 3 * title_matches + description_matches;
            if score > 0 {
                Some((idx, score, *article))
            } else {
                None
            }
        })
        .collect();

    // Stable sort by score descending; ties keep original (input) order
    // since `sort_by_key` over a `Reverse` score is stable.
    scored.sort_by_key(|(idx, score, _)| (std::cmp::Reverse(*score), *idx));

    scored
        .into_iter()
        .take(top_k)
        .map(|(_, score, article)| RankedArticle {
            article,
            relevance_score: score.min(10),
            relevance_reason: "keyword overlap with the query in title and description",
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, description: &str) -> Article {
        Article {
            title: title.into(),
            link: "https://example.com".into(),
            description: description.into(),
            pub_date: None,
            author: None,
            source: "feed".into(),
            categories: Vec::new(),
        }
    }

    #[test]
    fn ranking_weights_title_matches_higher_than_description() {
        let a = article("rust async runtime", "a different topic entirely");
        let b = article("unrelated headline", "covers rust async runtime in depth");
        let articles = vec![&a, &b];
        let ranked = rank_by_relevance(&articles, "rust async", 10);
        assert_eq!(ranked[0].relevance_score, 6); // 3*2 title tokens matched
        assert_eq!(ranked[1].relevance_score, 2); // 1*2 description tokens matched
    }

    #[test]
    fn ranking_drops_zero_score_articles() {
        let a = article("completely unrelated", "nothing matches here");
        let articles = vec![&a];
        let ranked = rank_by_relevance(&articles, "rust", 10);
        assert!(ranked.is_empty());
    }

    #[test]
    fn ranking_caps_score_at_ten() {
        let a = article("rust rust rust rust rust", "rust rust rust rust rust");
        let articles = vec![&a];
        let ranked = rank_by_relevance(&articles, "rust", 10);
        assert_eq!(ranked[0].relevance_score, 10);
    }

    #[test]
    fn ranking_breaks_ties_by_input_order() {
        let a = article("rust news one", "x");
        let b = article("rust news two", "x");
        let articles = vec![&a, &b];
        let ranked = rank_by_relevance(&articles, "rust news", 10);
        assert_eq!(ranked[0].article.title, "rust news one");
        assert_eq!(ranked[1].article.title, "rust news two");
    }

    #[test]
    fn ranking_respects_top_k() {
        let a = article("rust one", "x");
        let b = article("rust two", "x");
        let c = article("rust three", "x");
        let articles = vec![&a, &b, &c];
        let ranked = rank_by_relevance(&articles, "rust", 2);
        assert_eq!(ranked.len(), 2);
    }
}
