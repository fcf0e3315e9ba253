//! Search orchestration: which request is current, and what the user sees.
//!
//! [`Orchestrator::sync`] is called on every tick with the current
//! [`FetchKey`].  When the key differs from the last one it invalidates the
//! live request and returns a new [`FetchRequest`] for the runner; otherwise
//! it does nothing.  [`Orchestrator::complete`] applies a finished request,
//! but only if its ticket is still the current one (last writer wins).
//!
//! The orchestrator owns at most one live [`CancellationToken`].  Tokens are
//! never reused: each attempt gets a fresh one and the previous one is
//! cancelled the moment the key changes.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::fetch::{FetchDone, FetchError, FetchRequest, Ticket};
use crate::provider::{NewsProvider, NewsResponse, ProviderId, RequestParams};

/// The dependency tuple a search reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchKey {
    pub has_api_key: bool,
    pub provider: ProviderId,
    /// Debounced free-text query.
    pub q: String,
    pub category: String,
    pub country: String,
    pub page: u32,
    pub page_size: u32,
}

/// Loading / error / data tri-state of the most recent attempt.
///
/// `error` is empty unless the last attempt failed, in which case `data` is
/// empty too.  Stale results are never shown next to an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    pub loading: bool,
    pub error: String,
    pub data: NewsResponse,
}

#[derive(Debug, Default)]
pub struct Orchestrator {
    key: Option<FetchKey>,
    generation: u64,
    live: Option<CancellationToken>,
    outcome: SearchOutcome,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcome(&self) -> &SearchOutcome {
        &self.outcome
    }

    /// React to the current key; returns the request to start, if any.
    pub fn sync(
        &mut self,
        key: &FetchKey,
        api_key: &str,
        provider: Arc<dyn NewsProvider>,
    ) -> Option<FetchRequest> {
        if self.key.as_ref() == Some(key) {
            return None;
        }
        self.invalidate();
        self.key = Some(key.clone());

        if !key.has_api_key {
            self.outcome = SearchOutcome::default();
            return None;
        }

        self.outcome.loading = true;
        self.outcome.error.clear();

        let params = RequestParams {
            api_key,
            q: Some(key.q.as_str()),
            category: Some(key.category.as_str()),
            country: &key.country,
            page: key.page,
            page_size: key.page_size,
        };
        let url = match provider.build_url(&params) {
            Ok(url) => url,
            Err(e) => {
                self.fail(FetchError::InvalidUrl(e.to_string()));
                return None;
            }
        };

        let cancel = CancellationToken::new();
        self.live = Some(cancel.clone());
        debug!(
            ticket = self.generation,
            provider = %key.provider,
            page = key.page,
            "starting search"
        );

        Some(FetchRequest {
            ticket: Ticket(self.generation),
            url,
            provider,
            cancel,
        })
    }

    /// Apply a completion.  Returns `false` when it was stale and ignored.
    pub fn complete(&mut self, done: FetchDone) -> bool {
        if done.ticket != Ticket(self.generation) || self.live.is_none() {
            debug!(ticket = done.ticket.0, current = self.generation, "ignoring stale completion");
            return false;
        }
        if done.result == Err(FetchError::Cancelled) {
            return false;
        }
        self.live = None;

        match done.result {
            Ok(data) => {
                debug!(ticket = done.ticket.0, articles = data.articles.len(), "search done");
                self.outcome = SearchOutcome {
                    loading: false,
                    error: String::new(),
                    data,
                };
            }
            Err(e) => self.fail(e),
        }
        true
    }

    /// Teardown: drop the live request and settle into idle.
    ///
    /// The next [`sync`](Self::sync) starts from scratch, even with an
    /// unchanged key.
    pub fn cancel(&mut self) {
        self.invalidate();
        self.key = None;
        self.outcome.loading = false;
    }

    fn invalidate(&mut self) {
        if let Some(token) = self.live.take() {
            debug!(ticket = self.generation, "cancelling in-flight search");
            token.cancel();
        }
        self.generation += 1;
    }

    fn fail(&mut self, error: FetchError) {
        warn!(%error, "search failed");
        self.outcome = SearchOutcome {
            loading: false,
            error: error.to_string(),
            data: NewsResponse::empty(),
        };
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
