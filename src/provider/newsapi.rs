//! NewsAPI.org adapter (`/v2/top-headlines`).
//!
//! Use this as a template when adding a provider: keep the URL builder and
//! the normalizer free of I/O so tests can run them against literal JSON.

use url::Url;

use super::{
    article::{assign_ids, parse_published},
    articles_field, count_field, source_name, str_field, Article, Country, NewsProvider,
    NewsResponse, ProviderId, RequestParams,
};

pub const NEWSAPI_BASE: &str = "https://newsapi.org/v2/top-headlines";

const CATEGORIES: &[&str] = &[
    "general",
    "business",
    "entertainment",
    "health",
    "science",
    "sports",
    "technology",
];

const COUNTRIES: &[Country] = &[
    Country { code: "us", label: "United States" },
    Country { code: "gb", label: "United Kingdom" },
    Country { code: "ua", label: "Ukraine" },
    Country { code: "de", label: "Germany" },
    Country { code: "fr", label: "France" },
    Country { code: "ca", label: "Canada" },
    Country { code: "au", label: "Australia" },
];

/// Adapter for NewsAPI.org.
#[derive(Debug, Clone)]
pub struct NewsApi {
    base: String,
}

impl NewsApi {
    pub fn new() -> Self {
        Self::with_base(NEWSAPI_BASE)
    }

    /// Point the adapter at a different endpoint (mirrors, mock servers).
    pub fn with_base(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

impl Default for NewsApi {
    fn default() -> Self {
        Self::new()
    }
}

impl NewsProvider for NewsApi {
    fn id(&self) -> ProviderId {
        ProviderId::NewsApi
    }

    fn name(&self) -> &str {
        "NewsAPI.org"
    }

    fn base(&self) -> &str {
        &self.base
    }

    fn categories(&self) -> &[&'static str] {
        CATEGORIES
    }

    fn countries(&self) -> &[Country] {
        COUNTRIES
    }

    fn build_url(&self, params: &RequestParams<'_>) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.base)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("apiKey", params.api_key);
            if let Some(q) = params.query() {
                query.append_pair("q", q);
            }
            if let Some(category) = params.effective_category() {
                query.append_pair("category", category);
            }
            if !params.country.is_empty() {
                query.append_pair("country", params.country);
            }
            query.append_pair("page", &params.page.to_string());
            query.append_pair("pageSize", &params.page_size.to_string());
        }
        Ok(url)
    }

    fn normalize(&self, json: &serde_json::Value) -> NewsResponse {
        let raw = articles_field(json);
        let mut articles: Vec<Article> = raw
            .iter()
            .filter(|item| item.is_object())
            .map(|item| Article {
                id: String::new(),
                title: str_field(item, "title").unwrap_or_else(|| "(untitled)".into()),
                description: str_field(item, "description"),
                content: str_field(item, "content"),
                url: str_field(item, "url").unwrap_or_default(),
                image: str_field(item, "urlToImage"),
                source: source_name(item),
                author: str_field(item, "author"),
                published_at: parse_published(item.get("publishedAt").and_then(|v| v.as_str())),
            })
            .collect();
        assign_ids(&mut articles);

        NewsResponse {
            total: count_field(json, "totalResults", articles.len()),
            articles,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
