//! News provider abstraction layer.
//!
//! This module defines the [`NewsProvider`] trait, the [`ProviderId`] of each
//! built-in adapter and the [`ProviderRegistry`] the session looks them up
//! in.  Concrete adapters live in sub-modules ([`newsapi`] and [`gnews`]).
//!
//! ## For contributors — adding a new provider
//!
//! 1. Create a new file in this directory (e.g. `guardian.rs`).
//! 2. Define a struct holding the base URL and implement [`NewsProvider`].
//! 3. Add a [`ProviderId`] variant and register the adapter in
//!    [`ProviderRegistry::builtin`].
//!
//! The session, the fetch runner and the UI are all provider-agnostic.

mod article;
mod gnews;
mod newsapi;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use article::{format_date, Article, NewsResponse};
pub use gnews::GNews;
pub use newsapi::NewsApi;

#[cfg(test)]
pub(crate) use article::tests::make_article;

use url::Url;

/// Identifier of a built-in provider, as written in the `provider` param.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProviderId {
    NewsApi,
    GNews,
}

/// Provider used when none (or an unknown one) is requested.
pub const DEFAULT_PROVIDER: ProviderId = ProviderId::NewsApi;

impl ProviderId {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::NewsApi => "newsapi",
            ProviderId::GNews => "gnews",
        }
    }

    /// The provider the toggle action switches to.
    pub fn toggled(self) -> Self {
        match self {
            ProviderId::NewsApi => ProviderId::GNews,
            ProviderId::GNews => ProviderId::NewsApi,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderId {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newsapi" => Ok(ProviderId::NewsApi),
            "gnews" => Ok(ProviderId::GNews),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// A country filter option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    pub code: &'static str,
    pub label: &'static str,
}

/// Provider-neutral request parameters handed to [`NewsProvider::build_url`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams<'a> {
    pub api_key: &'a str,
    pub q: Option<&'a str>,
    pub category: Option<&'a str>,
    pub country: &'a str,
    pub page: u32,
    pub page_size: u32,
}

impl<'a> RequestParams<'a> {
    /// The trimmed free-text query, if any is left after trimming.
    pub fn query(&self) -> Option<&'a str> {
        self.q.map(str::trim).filter(|q| !q.is_empty())
    }

    /// The category to send.  Both upstream APIs treat free text and
    /// category as mutually exclusive, so a query suppresses it.
    pub fn effective_category(&self) -> Option<&'a str> {
        if self.query().is_some() {
            return None;
        }
        self.category.filter(|c| !c.is_empty())
    }
}

/// Trait that every news provider adapter must implement.
///
/// Both [`build_url`](NewsProvider::build_url) and
/// [`normalize`](NewsProvider::normalize) are pure: no I/O and no shared
/// mutable state, so the fetch runner can call them from any task.
pub trait NewsProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Human-readable name shown in the header.
    fn name(&self) -> &str;

    /// Endpoint the request URL is built on.
    fn base(&self) -> &str;

    /// Categories offered by the category filter.
    fn categories(&self) -> &[&'static str];

    /// Countries offered by the country filter.
    fn countries(&self) -> &[Country];

    /// Build the request URL for one page of results.
    fn build_url(&self, params: &RequestParams<'_>) -> Result<Url, url::ParseError>;

    /// Convert a provider JSON body into the canonical shape.
    ///
    /// Missing or malformed optional fields map to `None`; this never fails.
    fn normalize(&self, json: &serde_json::Value) -> NewsResponse;

    fn has_category(&self, category: &str) -> bool {
        self.categories().contains(&category)
    }

    fn has_country(&self, code: &str) -> bool {
        self.countries().iter().any(|c| c.code == code)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps [`ProviderId`] to its adapter.
#[derive(Clone)]
pub struct ProviderRegistry {
    providers: BTreeMap<ProviderId, Arc<dyn NewsProvider>>,
}

impl ProviderRegistry {
    /// Both built-in adapters pointing at their public endpoints.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.insert(Arc::new(NewsApi::new()));
        registry.insert(Arc::new(GNews::new()));
        registry
    }

    pub fn empty() -> Self {
        Self {
            providers: BTreeMap::new(),
        }
    }

    /// Register (or replace) an adapter under its own id.
    pub fn insert(&mut self, provider: Arc<dyn NewsProvider>) {
        self.providers.insert(provider.id(), provider);
    }

    pub fn get(&self, id: ProviderId) -> Option<Arc<dyn NewsProvider>> {
        self.providers.get(&id).cloned()
    }

    pub fn contains(&self, id: ProviderId) -> bool {
        self.providers.contains_key(&id)
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.providers.keys()).finish()
    }
}

// ---------------------------------------------------------------------------
// Shared JSON helpers for adapters
// ---------------------------------------------------------------------------

/// A non-empty string field, or `None`.
fn str_field(value: &serde_json::Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// `source.name`, falling back to `"Unknown"`.
fn source_name(value: &serde_json::Value) -> String {
    value
        .get("source")
        .and_then(|s| str_field(s, "name"))
        .unwrap_or_else(|| "Unknown".into())
}

/// A non-negative count, or the article count when the field is missing.
fn count_field(value: &serde_json::Value, key: &str, fallback: usize) -> u64 {
    value
        .get(key)
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(fallback as u64)
}

fn articles_field(value: &serde_json::Value) -> &[serde_json::Value] {
    value
        .get("articles")
        .and_then(serde_json::Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
