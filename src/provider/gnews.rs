//! GNews.io adapter (`/api/v4/top-headlines`).

use url::Url;

use super::{
    article::{assign_ids, parse_published},
    articles_field, count_field, source_name, str_field, Article, Country, NewsProvider,
    NewsResponse, ProviderId, RequestParams,
};

pub const GNEWS_BASE: &str = "https://gnews.io/api/v4/top-headlines";

const CATEGORIES: &[&str] = &[
    "general",
    "world",
    "nation",
    "business",
    "technology",
    "entertainment",
    "sports",
    "science",
    "health",
];

const COUNTRIES: &[Country] = &[
    Country { code: "us", label: "United States" },
    Country { code: "gb", label: "United Kingdom" },
    Country { code: "ua", label: "Ukraine" },
    Country { code: "de", label: "Germany" },
    Country { code: "fr", label: "France" },
    Country { code: "in", label: "India" },
    Country { code: "jp", label: "Japan" },
];

/// Adapter for GNews.io.
#[derive(Debug, Clone)]
pub struct GNews {
    base: String,
}

impl GNews {
    pub fn new() -> Self {
        Self::with_base(GNEWS_BASE)
    }

    pub fn with_base(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

impl Default for GNews {
    fn default() -> Self {
        Self::new()
    }
}

impl NewsProvider for GNews {
    fn id(&self) -> ProviderId {
        ProviderId::GNews
    }

    fn name(&self) -> &str {
        "GNews"
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
            // GNews spells it all lower-case.
            query.append_pair("apikey", params.api_key);
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
            query.append_pair("max", &params.page_size.to_string());
        }
        Ok(url)
    }

    fn normalize(&self, json: &serde_json::Value) -> NewsResponse {
        let mut articles: Vec<Article> = articles_field(json)
            .iter()
            .filter(|item| item.is_object())
            .map(|item| Article {
                id: String::new(),
                title: str_field(item, "title").unwrap_or_else(|| "(untitled)".into()),
                description: str_field(item, "description"),
                content: str_field(item, "content"),
                url: str_field(item, "url").unwrap_or_default(),
                image: str_field(item, "image"),
                source: source_name(item),
                author: None,
                published_at: parse_published(item.get("publishedAt").and_then(|v| v.as_str())),
            })
            .collect();
        assign_ids(&mut articles);

        NewsResponse {
            total: count_field(json, "totalArticles", articles.len()),
            articles,
        }
    }
}
