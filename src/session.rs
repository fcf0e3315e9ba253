//! The news session: every piece of search state and the actions on it.
//!
//! A [`NewsSession`] owns the configuration, the filter store, the search
//! debouncer and the [`Orchestrator`].  The UI calls the action methods on
//! key presses and [`NewsSession::tick`] on every frame; `tick` is the only
//! place fetches are started, which keeps the dependency set in one spot
//! ([`NewsSession::fetch_key`]).
//!
//! ## For contributors
//!
//! Adding a new filter means: a field on [`QueryParams`], a field on
//! [`FetchKey`], and a line in `fetch_key`.  Nothing else needs to know.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::debounce::Debouncer;
use crate::fetch::{FetchDone, FetchRequest};
use crate::location::Location;
use crate::params::{total_pages, QueryParams, DEFAULT_CATEGORY, DEFAULT_COUNTRY, PAGE_SIZES};
use crate::provider::{Article, NewsProvider, ProviderRegistry};
use crate::query_state::QueryState;
use crate::search::{FetchKey, Orchestrator, SearchOutcome};

/// Delay between the last keystroke and the search it triggers.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(600);

pub struct NewsSession<L> {
    config: AppConfig,
    registry: ProviderRegistry,
    provider: Arc<dyn NewsProvider>,
    query: QueryState<QueryParams, L>,
    debounced_q: Debouncer<String>,
    search: Orchestrator,
    selected: Option<usize>,
}

impl<L: Location> NewsSession<L> {
    /// Build a session reading its filters from `location`.
    pub fn new(
        config: AppConfig,
        registry: ProviderRegistry,
        location: L,
        debounce: Duration,
    ) -> Result<Self> {
        let provider = registry
            .get(config.provider)
            .ok_or_else(|| anyhow!("provider {} is not registered", config.provider))?;
        let query = QueryState::new(QueryParams::default(), location);
        let debounced_q = Debouncer::new(query.get().q.clone(), debounce);

        info!(?config, base = provider.base(), params = ?query.get(), "session started");
        Ok(Self {
            config,
            registry,
            provider,
            query,
            debounced_q,
            search: Orchestrator::new(),
            selected: None,
        })
    }

    // -- accessors -----------------------------------------------------------

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn provider(&self) -> &dyn NewsProvider {
        self.provider.as_ref()
    }

    pub fn params(&self) -> &QueryParams {
        self.query.get()
    }

    pub fn location(&self) -> &L {
        self.query.location()
    }

    pub fn outcome(&self) -> &SearchOutcome {
        self.search.outcome()
    }

    /// Whether typed search text is still waiting out the debounce.
    pub fn search_pending(&self) -> bool {
        self.debounced_q.is_pending()
    }

    pub fn total_pages(&self) -> u64 {
        total_pages(self.outcome().data.total, self.params().page_size)
    }

    /// The dependency tuple the orchestrator is keyed on.
    pub fn fetch_key(&self) -> FetchKey {
        let p = self.params();
        FetchKey {
            has_api_key: self.config.has_api_key(),
            provider: self.config.provider,
            q: self.debounced_q.value().clone(),
            category: p.category.clone(),
            country: p.country.clone(),
            page: p.page,
            page_size: p.page_size,
        }
    }

    // -- filter actions ------------------------------------------------------

    /// Update the search text; the search itself waits for the debouncer.
    pub fn set_search(&mut self, text: impl Into<String>, now: Instant) {
        let text = text.into();
        self.debounced_q.schedule(text.clone(), now);
        self.query.update(|p| p.set_search(text));
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        let category = category.into();
        self.query.update(|p| p.set_category(category));
    }

    pub fn set_country(&mut self, country: impl Into<String>) {
        let country = country.into();
        self.query.update(|p| p.set_country(country));
    }

    pub fn set_page(&mut self, page: u32) {
        self.query.update(|p| p.set_page(page));
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.query.update(|p| p.set_page_size(page_size));
    }

    /// Step the category through the active provider's list.
    pub fn cycle_category(&mut self, forward: bool) {
        let next = cycle(self.provider.categories(), &self.params().category, forward);
        self.set_category(next);
    }

    /// Step the country through the active provider's list.
    pub fn cycle_country(&mut self, forward: bool) {
        let codes: Vec<&str> = self.provider.countries().iter().map(|c| c.code).collect();
        let next = cycle(&codes, &self.params().country, forward);
        self.set_country(next);
    }

    pub fn cycle_page_size(&mut self) {
        let current = self.params().page_size;
        let idx = PAGE_SIZES.iter().position(|s| *s == current).unwrap_or(0);
        self.set_page_size(PAGE_SIZES[(idx + 1) % PAGE_SIZES.len()]);
    }

    pub fn next_page(&mut self) {
        let page = self.params().page;
        if u64::from(page) < self.total_pages() {
            self.set_page(page.saturating_add(1));
        }
    }

    pub fn prev_page(&mut self) {
        let page = self.params().page;
        if page > 1 {
            self.set_page(page - 1);
        }
    }

    /// Toggle to the other provider.
    ///
    /// A category or country the new provider does not offer is remapped to
    /// the default, and the page goes back to 1.
    pub fn switch_provider(&mut self) {
        let next_id = self.config.provider.toggled();
        let Some(next) = self.registry.get(next_id) else {
            warn!(provider = %next_id, "cannot switch: provider not registered");
            return;
        };

        let category = if next.has_category(&self.params().category) {
            self.params().category.clone()
        } else {
            DEFAULT_CATEGORY.to_string()
        };
        let country = if next.has_country(&self.params().country) {
            self.params().country.clone()
        } else {
            DEFAULT_COUNTRY.to_string()
        };

        self.query.update(|p| {
            p.category = category;
            p.country = country;
            p.page = 1;
        });
        self.query
            .set_extra_param("provider", Some(next_id.as_str().to_string()));

        info!(from = %self.config.provider, to = %next_id, "switched provider");
        self.config.provider = next_id;
        self.provider = next;
        self.selected = None;
    }

    // -- detail overlay ------------------------------------------------------

    pub fn select(&mut self, index: usize) {
        if index < self.outcome().data.articles.len() {
            self.selected = Some(index);
        }
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }

    pub fn selected_article(&self) -> Option<&Article> {
        self.selected
            .and_then(|i| self.outcome().data.articles.get(i))
    }

    // -- reactive core -------------------------------------------------------

    /// Advance timers and start a search if the dependency tuple changed.
    pub fn tick(&mut self, now: Instant) -> Option<FetchRequest> {
        self.debounced_q.poll(now);
        let key = self.fetch_key();
        self.search
            .sync(&key, self.config.api_key(), self.provider.clone())
    }

    /// Apply a completed fetch.  Stale completions are ignored.
    pub fn on_fetch_done(&mut self, done: FetchDone) -> bool {
        let applied = self.search.complete(done);
        if applied {
            self.selected = None;
        }
        applied
    }

    /// Cancel the pending debounce and any in-flight request.
    pub fn shutdown(&mut self) {
        self.debounced_q.cancel();
        self.search.cancel();
    }
}

/// The neighbour of `current` in `list`, wrapping; the first entry when
/// `current` is not in the list.
fn cycle<'a>(list: &[&'a str], current: &str, forward: bool) -> &'a str {
    let Some(&first) = list.first() else {
        return "";
    };
    let Some(idx) = list.iter().position(|c| *c == current) else {
        return first;
    };
    let len = list.len();
    let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
    list[next]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchError, Ticket};
    use crate::location::{get_param, parse_location, MemoryLocation};
    use crate::provider::{make_article, NewsResponse, ProviderId};

    fn session(query: &str, env_key: Option<&str>) -> NewsSession<MemoryLocation> {
        let registry = ProviderRegistry::builtin();
        let url = parse_location(query).unwrap();
        let config = AppConfig::resolve(&url, env_key, &registry);
        NewsSession::new(config, registry, MemoryLocation::new(url), SEARCH_DEBOUNCE).unwrap()
    }

    fn response(total: u64, n: usize) -> NewsResponse {
        NewsResponse {
            total,
            articles: (0..n).map(|i| make_article(&format!("https://x/{i}"), "t")).collect(),
        }
    }

    #[test]
    fn initial_state_from_location_and_request_omits_category() {
        let mut s = session("?q=ukraine&category=sports&page=3", Some("key"));
        assert_eq!(s.params().q, "ukraine");
        assert_eq!(s.params().category, "sports");
        assert_eq!(s.params().page, 3);
        assert!(s.provider().has_category("sports"));

        let req = s.tick(Instant::now()).expect("initial search");
        assert_eq!(get_param(&req.url, "q").as_deref(), Some("ukraine"));
        assert_eq!(get_param(&req.url, "category"), None);
        assert_eq!(get_param(&req.url, "page").as_deref(), Some("3"));

        // Reading did not rewrite the location.
        assert_eq!(
            s.location().href().query(),
            Some("q=ukraine&category=sports&page=3")
        );
    }

    #[test]
    fn no_api_key_never_fetches() {
        let mut s = session("", None);
        let now = Instant::now();
        assert!(s.tick(now).is_none());
        s.set_category("sports");
        assert!(s.tick(now).is_none());
        assert_eq!(
            s.outcome(),
            &SearchOutcome {
                loading: false,
                error: String::new(),
                data: NewsResponse { total: 0, articles: vec![] },
            }
        );
    }

    #[test]
    fn search_text_is_debounced() {
        let mut s = session("", Some("key"));
        let t0 = Instant::now();
        assert!(s.tick(t0).is_some());

        s.set_search("ukr", t0);
        assert_eq!(s.params().q, "ukr", "filter text updates immediately");
        assert!(s.search_pending());
        assert!(s.tick(t0 + Duration::from_millis(100)).is_none());

        s.set_search("ukraine", t0 + Duration::from_millis(200));
        assert!(s.tick(t0 + Duration::from_millis(700)).is_none());

        let req = s.tick(t0 + Duration::from_millis(800)).expect("debounced search");
        assert_eq!(get_param(&req.url, "q").as_deref(), Some("ukraine"));
        assert_eq!(s.fetch_key().q, "ukraine");
        assert!(!s.search_pending());
    }

    #[test]
    fn filters_reset_page_and_refetch() {
        let mut s = session("?page=4", Some("key"));
        let now = Instant::now();
        s.tick(now);

        s.set_country("gb");
        assert_eq!(s.params().page, 1);
        let req = s.tick(now).expect("refetch");
        assert_eq!(get_param(&req.url, "country").as_deref(), Some("gb"));
        assert_eq!(get_param(s.location().href(), "page").as_deref(), Some("1"));
    }

    #[test]
    fn switch_provider_remaps_missing_category() {
        let mut s = session("?provider=gnews&category=world&page=5", Some("key"));
        assert_eq!(s.config().provider, ProviderId::GNews);

        s.switch_provider();
        assert_eq!(s.config().provider, ProviderId::NewsApi);
        assert_eq!(s.params().category, "general");
        assert_eq!(s.params().page, 1);
        assert_eq!(
            get_param(s.location().href(), "provider").as_deref(),
            Some("newsapi")
        );
    }

    #[test]
    fn switch_provider_keeps_shared_category() {
        let mut s = session("?category=sports&page=2", Some("key"));
        s.switch_provider();
        assert_eq!(s.config().provider, ProviderId::GNews);
        assert_eq!(s.params().category, "sports");
        assert_eq!(s.params().page, 1);
        assert_eq!(s.provider().name(), "GNews");
    }

    #[test]
    fn switch_provider_remaps_missing_country() {
        let mut s = session("?country=ca", Some("key"));
        s.switch_provider();
        assert_eq!(s.params().country, "us");
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut s = session("", Some("key"));
        let now = Instant::now();
        let first = s.tick(now).unwrap();
        s.set_category("sports");
        let second = s.tick(now).unwrap();
        assert!(first.cancel.is_cancelled());

        assert!(!s.on_fetch_done(FetchDone {
            ticket: first.ticket,
            result: Err(FetchError::Http(500)),
        }));
        assert!(s.outcome().error.is_empty());
        assert!(s.outcome().loading);

        assert!(s.on_fetch_done(FetchDone {
            ticket: second.ticket,
            result: Ok(response(30, 12)),
        }));
        assert_eq!(s.outcome().data.articles.len(), 12);
        assert_eq!(s.total_pages(), 3);
    }

    #[test]
    fn http_error_reports_status() {
        let mut s = session("", Some("key"));
        let req = s.tick(Instant::now()).unwrap();
        s.on_fetch_done(FetchDone {
            ticket: req.ticket,
            result: Err(FetchError::Http(429)),
        });
        assert_eq!(
            s.outcome(),
            &SearchOutcome {
                loading: false,
                error: "HTTP 429".into(),
                data: NewsResponse::empty(),
            }
        );
    }

    #[test]
    fn paging_is_clamped_to_total_pages() {
        let mut s = session("", Some("key"));
        let now = Instant::now();
        let req = s.tick(now).unwrap();
        s.on_fetch_done(FetchDone {
            ticket: req.ticket,
            result: Ok(response(20, 12)),
        });

        s.prev_page();
        assert_eq!(s.params().page, 1);
        s.next_page();
        assert_eq!(s.params().page, 2);
        s.next_page();
        assert_eq!(s.params().page, 2);
    }

    #[test]
    fn cycling_filters_walks_provider_lists() {
        let mut s = session("", Some("key"));
        s.cycle_category(true);
        assert_eq!(s.params().category, "business");
        s.cycle_category(false);
        s.cycle_category(false);
        assert_eq!(s.params().category, "technology");

        s.cycle_country(true);
        assert_eq!(s.params().country, "gb");

        s.cycle_page_size();
        assert_eq!(s.params().page_size, 18);
        s.cycle_page_size();
        s.cycle_page_size();
        assert_eq!(s.params().page_size, 36);
        s.cycle_page_size();
        assert_eq!(s.params().page_size, 12);
    }

    #[test]
    fn permalink_page_size_is_kept() {
        let mut s = session("?pageSize=18&page=2", Some("key"));
        assert_eq!(s.params().page_size, 18);
        assert_eq!(s.params().page, 2);

        let req = s.tick(Instant::now()).expect("initial search");
        assert_eq!(get_param(&req.url, "pageSize").as_deref(), Some("18"));
        assert_eq!(get_param(&req.url, "page").as_deref(), Some("2"));
    }

    #[test]
    fn next_page_saturates_at_the_largest_page() {
        let mut s = session(&format!("?page={}", u32::MAX), Some("key"));
        let req = s.tick(Instant::now()).unwrap();
        s.on_fetch_done(FetchDone {
            ticket: req.ticket,
            result: Ok(response(u64::MAX, 1)),
        });
        assert!(s.total_pages() > u64::from(u32::MAX));

        s.next_page();
        assert_eq!(s.params().page, u32::MAX);
    }

    #[test]
    fn selection_follows_results() {
        let mut s = session("", Some("key"));
        let req = s.tick(Instant::now()).unwrap();
        s.select(0);
        assert!(s.selected_article().is_none(), "nothing to select yet");

        s.on_fetch_done(FetchDone {
            ticket: req.ticket,
            result: Ok(response(2, 2)),
        });
        s.select(1);
        assert_eq!(s.selected_article().unwrap().url, "https://x/1");
        s.close_detail();
        assert!(s.selected_article().is_none());
    }

    #[test]
    fn shutdown_cancels_everything() {
        let mut s = session("", Some("key"));
        let t0 = Instant::now();
        let req = s.tick(t0).unwrap();
        s.set_search("late", t0);
        s.shutdown();

        assert!(req.cancel.is_cancelled());
        assert!(!s.outcome().loading);
        assert_eq!(s.fetch_key().q, "");
        assert!(!s.search_pending());
        assert!(!s.on_fetch_done(FetchDone {
            ticket: req.ticket,
            result: Ok(response(1, 1)),
        }));
        assert_eq!(req.ticket, Ticket(1));
    }
}
