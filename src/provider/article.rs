//! The canonical article shape shared across all news providers.
//!
//! Every provider adapter converts its native JSON into [`NewsResponse`] /
//! [`Article`] values so the session and the UI never see provider-specific
//! field names.
//!
//! ## For contributors
//!
//! If you are adding a new provider you do **not** need to modify this file
//! unless the provider exposes data the UI should render.  Build `Article`
//! values in your provider's `normalize()` and run them through
//! [`assign_ids`] so list keys stay unique.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

/// One page of normalized results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsResponse {
    /// Total matches reported by the provider (across all pages).
    pub total: u64,
    /// Articles on the requested page, in provider order.
    pub articles: Vec<Article>,
}

impl NewsResponse {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A single news item, normalized from any provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Identifier unique within one [`NewsResponse`], used as the list key.
    pub id: String,

    /// Headline; `"(untitled)"` when the provider sent none.
    pub title: String,

    pub description: Option<String>,

    /// Body excerpt.  Providers truncate this server-side.
    pub content: Option<String>,

    /// Link to the full story.  Empty when the provider sent none.
    pub url: String,

    pub image: Option<String>,

    /// Publisher name (e.g. "BBC News").
    pub source: String,

    pub author: Option<String>,

    /// Publication timestamp.  `None` when missing or unparseable.
    pub published_at: Option<DateTime<Utc>>,
}

/// Parse an RFC 3339 timestamp; gracefully degrade to `None` on failure.
pub fn parse_published(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|d| DateTime::parse_from_rfc3339(d).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Fill in `Article::id` for a freshly normalized page.
///
/// The URL is the preferred key.  Articles without a URL use their position,
/// and a key already taken in the same page gets its position appended (more
/// than once if that is taken too).
pub fn assign_ids(articles: &mut [Article]) {
    let mut seen = HashSet::new();
    for (idx, article) in articles.iter_mut().enumerate() {
        let mut id = if article.url.is_empty() {
            format!("#{idx}")
        } else {
            article.url.clone()
        };
        while seen.contains(&id) {
            id = format!("{id}#{idx}");
        }
        seen.insert(id.clone());
        article.id = id;
    }
}

/// Render an optional timestamp for display.
pub fn format_date(published: Option<DateTime<Utc>>) -> String {
    published
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "no date".into())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Shorthand constructor for tests.
    pub fn make_article(url: &str, title: &str) -> Article {
        Article {
            id: String::new(),
            title: title.to_string(),
            description: None,
            content: None,
            url: url.to_string(),
            image: None,
            source: "test".to_string(),
            author: None,
            published_at: None,
        }
    }

    #[test]
    fn ids_prefer_url() {
        let mut articles = vec![make_article("https://a", "A"), make_article("https://b", "B")];
        assign_ids(&mut articles);
        assert_eq!(articles[0].id, "https://a");
        assert_eq!(articles[1].id, "https://b");
    }

    #[test]
    fn ids_are_unique_with_duplicate_or_missing_urls() {
        let mut articles = vec![
            make_article("https://a", "A"),
            make_article("https://a", "A again"),
            make_article("", "no url"),
            make_article("", "no url either"),
        ];
        assign_ids(&mut articles);

        let ids: HashSet<_> = articles.iter().map(|a| a.id.clone()).collect();
        assert_eq!(ids.len(), 4);
        assert_eq!(articles[1].id, "https://a#1");
        assert_eq!(articles[2].id, "#2");
    }

    #[test]
    fn ids_stay_unique_when_suffix_collides_with_a_url() {
        let mut articles = vec![
            make_article("https://a", "A"),
            make_article("https://a#2", "fragment"),
            make_article("https://a", "A again"),
            make_article("", "no url"),
            make_article("#3", "odd url"),
        ];
        assign_ids(&mut articles);

        let ids: HashSet<_> = articles.iter().map(|a| a.id.clone()).collect();
        assert_eq!(ids.len(), articles.len());
        assert_eq!(articles[1].id, "https://a#2");
        assert_eq!(articles[2].id, "https://a#2#2");
        assert_eq!(articles[3].id, "#3");
        assert_eq!(articles[4].id, "#3#4");
    }

    #[test]
    fn parse_published_handles_bad_input() {
        assert!(parse_published(None).is_none());
        assert!(parse_published(Some("yesterday")).is_none());
        assert_eq!(
            parse_published(Some("2024-05-01T10:30:00Z")),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn format_date_falls_back() {
        assert_eq!(format_date(None), "no date");
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 12, 5, 0).unwrap();
        assert_eq!(format_date(Some(ts)), "2025-06-01 12:05");
    }
}
