//! Feed parsing (spec §4.1, C1).
//!
//! Accepts raw bytes and a source label, returns an ordered list of
//! [`Article`]s. Handles both RSS 2.0 (`rss` crate) and Atom
//! (`atom_syndication` crate) — both thin wrappers over `quick-xml`.
//!
//! Malformed documents that partially parse return whatever entries were
//! extracted; hard parse errors return an empty list without raising —
//! a single bad feed must never abort the batch (spec §4.2).

use std::io::Cursor;

use briefing_domain::article::Article;

/// Parse feed bytes into normalised articles.
///
/// Tries RSS 2.0 first (the more common case in practice), then Atom.
/// Entries missing a mandatory `title` or `link` are skipped individually
/// rather than failing the whole document.
pub fn parse_feed(bytes: &[u8], source: &str) -> Vec<Article> {
    if let Ok(channel) = rss::Channel::read_from(Cursor::new(bytes)) {
        return parse_rss_channel(&channel, source);
    }
    if let Ok(feed) = atom_syndication::Feed::read_from(Cursor::new(bytes)) {
        return parse_atom_feed(&feed, source);
    }
    Vec::new()
}

fn parse_rss_channel(channel: &rss::Channel, source: &str) -> Vec<Article> {
    channel
        .items()
        .iter()
        .filter_map(|item| {
            let title = item.title()?.trim();
            let link = item.link()?.trim();
            if title.is_empty() || link.is_empty() {
                return None;
            }

            let description = item
                .description()
                .or_else(|| item.content())
                .unwrap_or("")
                .to_string();

            let author = item.author().map(|a| a.to_string());

            let categories = item
                .categories()
                .iter()
                .map(|c| c.name().to_string())
                .collect();

            Some(Article {
                title: title.to_string(),
                link: link.to_string(),
                description,
                pub_date: item.pub_date().map(|d| d.to_string()),
                author,
                source: source.to_string(),
                categories,
            })
        })
        .collect()
}

fn parse_atom_feed(feed: &atom_syndication::Feed, source: &str) -> Vec<Article> {
    feed.entries()
        .iter()
        .filter_map(|entry| {
            let title = entry.title().as_str().trim();
            let link = entry
                .links()
                .first()
                .map(|l| l.href().trim())
                .unwrap_or("");
            if title.is_empty() || link.is_empty() {
                return None;
            }

            let description = entry
                .summary()
                .map(|t| t.as_str().to_string())
                .or_else(|| entry.content().and_then(|c| c.value().map(|v| v.to_string())))
                .unwrap_or_default();

            let author = entry
                .authors()
                .first()
                .map(|p| p.name().to_string());

            let categories = entry
                .categories()
                .iter()
                .map(|c| c.term().to_string())
                .collect();

            Some(Article {
                title: title.to_string(),
                link: link.to_string(),
                description,
                pub_date: entry
                    .published()
                    .map(|d| d.to_rfc3339())
                    .or_else(|| Some(entry.updated().to_rfc3339())),
                author,
                source: source.to_string(),
                categories,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example Feed</title>
    <link>https://example.com</link>
    <description>An example feed</description>
    <item>
      <title>First post</title>
      <link>https://example.com/1</link>
      <description>Hello world</description>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
      <author>jane@example.com</author>
      <category>tech</category>
      <category>news</category>
    </item>
    <item>
      <link>https://example.com/no-title</link>
      <description>Missing title, should be skipped</description>
    </item>
  </channel>
</rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Atom Feed</title>
  <updated>2024-01-01T00:00:00Z</updated>
  <id>urn:uuid:1</id>
  <entry>
    <title>Atom entry</title>
    <link href="https://example.com/atom/1"/>
    <id>urn:uuid:2</id>
    <updated>2024-01-02T00:00:00Z</updated>
    <summary>An atom summary</summary>
    <author><name>Jane Doe</name></author>
    <category term="science"/>
  </entry>
</feed>"#;

    #[test]
    fn parses_rss_and_skips_entries_missing_title() {
        let articles = parse_feed(RSS_SAMPLE.as_bytes(), "Example Feed");
        assert_eq!(articles.len(), 1);
        let a = &articles[0];
        assert_eq!(a.title, "First post");
        assert_eq!(a.link, "https://example.com/1");
        assert_eq!(a.categories, vec!["tech", "news"]);
        assert_eq!(a.author.as_deref(), Some("jane@example.com"));
        assert_eq!(a.source, "Example Feed");
    }

    #[test]
    fn parses_atom_feed() {
        let articles = parse_feed(ATOM_SAMPLE.as_bytes(), "Example Atom Feed");
        assert_eq!(articles.len(), 1);
        let a = &articles[0];
        assert_eq!(a.title, "Atom entry");
        assert_eq!(a.link, "https://example.com/atom/1");
        assert_eq!(a.description, "An atom summary");
        assert_eq!(a.author.as_deref(), Some("Jane Doe"));
        assert_eq!(a.categories, vec!["science"]);
    }

    #[test]
    fn hard_parse_error_returns_empty_without_panicking() {
        let articles = parse_feed(b"not xml at all \x00\x01", "broken");
        assert!(articles.is_empty());
    }

    #[test]
    fn empty_bytes_returns_empty() {
        assert!(parse_feed(b"", "empty").is_empty());
    }
}
