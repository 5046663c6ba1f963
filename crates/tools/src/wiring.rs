//! Builds the default [`ToolRegistry`] from configuration — the set of
//! tools every agent turn gets offered (spec §4.4/§4.5).

use briefing_domain::config::RssConfig;

use crate::doc_tools;
use crate::registry::ToolRegistry;
use crate::rss_tools::RssTools;

pub fn build_default_registry(rss_config: RssConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    let rss = RssTools::new(rss_config);

    {
        let rss = rss.clone();
        registry.register(
            "fetch_rss_news",
            "Return cached RSS articles from the last materialised cache run.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "max_articles": {"type": "integer", "minimum": 1},
                    "sources_limit": {"type": "integer", "minimum": 1},
                },
            }),
            std::sync::Arc::new(move |args| {
                let rss = rss.clone();
                Box::pin(async move { rss.fetch_rss_news(args).await })
            }),
        );
    }

    {
        let rss = rss.clone();
        registry.register(
            "filter_rss_news",
            "Rank cached RSS articles by relevance to a query.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string"},
                    "max_articles": {"type": "integer", "minimum": 1},
                    "top_k": {"type": "integer", "minimum": 1},
                },
                "required": ["query"],
            }),
            std::sync::Arc::new(move |args| {
                let rss = rss.clone();
                Box::pin(async move { rss.filter_rss_news(args).await })
            }),
        );
    }

    {
        let rss = rss.clone();
        registry.register(
            "search_rss_by_keywords",
            "Search cached RSS articles for any of the given keywords.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "keywords": {"type": "array", "items": {"type": "string"}},
                    "max_articles": {"type": "integer", "minimum": 1},
                },
                "required": ["keywords"],
            }),
            std::sync::Arc::new(move |args| {
                let rss = rss.clone();
                Box::pin(async move { rss.search_rss_by_keywords(args).await })
            }),
        );
    }

    registry.register(
        "extract_pdf_text",
        "Extract text content from an uploaded PDF file.",
        serde_json::json!({
            "type": "object",
            "properties": { "file_handle": {"type": "string"} },
            "required": ["file_handle"],
        }),
        std::sync::Arc::new(|args| Box::pin(doc_tools::extract_pdf_text(args))),
    );

    registry.register(
        "analyze_csv_file",
        "Analyze an uploaded CSV file and summarize its contents.",
        serde_json::json!({
            "type": "object",
            "properties": { "file_handle": {"type": "string"} },
            "required": ["file_handle"],
        }),
        std::sync::Arc::new(|args| Box::pin(doc_tools::analyze_csv_file(args))),
    );

    registry.register(
        "extract_action_items",
        "Extract action items from an uploaded document.",
        serde_json::json!({
            "type": "object",
            "properties": { "file_handle": {"type": "string"} },
            "required": ["file_handle"],
        }),
        std::sync::Arc::new(|args| Box::pin(doc_tools::extract_action_items(args))),
    );

    registry
}
