//! Network side of a search: one HTTP request per [`FetchRequest`].
//!
//! Requests run as tokio tasks and report back to the UI thread over an
//! [`mpsc`] channel, the same way the UI drains every other background event.
//! Each task races the request against its [`CancellationToken`]; when the
//! token fires the request future is dropped, which closes the connection,
//! and the task reports [`FetchError::Cancelled`].
//!
//! ## Outcome rules
//!
//! * Non-2xx status → [`FetchError::Http`], whatever the body says.
//! * 2xx with a truthy `status` field other than `"ok"` → [`FetchError::Api`]
//!   carrying the provider's `message` (or `"API error"`).
//! * Anything else is handed to the provider's `normalize`.

use std::sync::mpsc;
use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::provider::{NewsProvider, NewsResponse, ProviderId};

/// Why a fetch produced no data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Superseded or torn down.  Never shown to the user.
    #[error("request cancelled")]
    Cancelled,
    #[error("HTTP {0}")]
    Http(u16),
    /// The provider answered 2xx but flagged the request as failed.
    #[error("{0}")]
    Api(String),
    #[error("network error: {0}")]
    Transport(String),
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

/// Generation number identifying one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

/// Everything a task needs to perform one fetch.
#[derive(Clone)]
pub struct FetchRequest {
    pub ticket: Ticket,
    pub url: Url,
    pub provider: Arc<dyn NewsProvider>,
    pub cancel: CancellationToken,
}

impl std::fmt::Debug for FetchRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The URL carries the API key; keep it out of logs.
        f.debug_struct("FetchRequest")
            .field("ticket", &self.ticket)
            .field("provider", &self.provider.id())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl FetchRequest {
    pub fn provider_id(&self) -> ProviderId {
        self.provider.id()
    }
}

/// Completion message sent back to the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchDone {
    pub ticket: Ticket,
    pub result: Result<NewsResponse, FetchError>,
}

/// Perform one request and normalize the body.
pub async fn fetch_news(
    client: &reqwest::Client,
    provider: &dyn NewsProvider,
    url: Url,
) -> Result<NewsResponse, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http(status.as_u16()));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| FetchError::Decode(e.to_string()))?;

    check_api_status(&body)?;
    Ok(provider.normalize(&body))
}

/// Fail when the body carries a truthy `status` other than `"ok"`.
fn check_api_status(body: &Value) -> Result<(), FetchError> {
    let failed = match body.get("status") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty() && s != "ok",
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    };
    if !failed {
        return Ok(());
    }
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or("API error");
    Err(FetchError::Api(message.to_string()))
}

/// Run a request to completion or until its token fires.
pub async fn execute(client: &reqwest::Client, request: FetchRequest) -> FetchDone {
    let FetchRequest {
        ticket,
        url,
        provider,
        cancel,
    } = request;

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FetchError::Cancelled),
        result = fetch_news(client, provider.as_ref(), url) => result,
    };
    debug!(ticket = ticket.0, ok = result.is_ok(), "fetch finished");
    FetchDone { ticket, result }
}

/// Spawns fetch tasks and forwards completions to the UI thread.
#[derive(Debug, Clone)]
pub struct FetchRunner {
    client: reqwest::Client,
    runtime: tokio::runtime::Handle,
    tx: mpsc::Sender<FetchDone>,
}

impl FetchRunner {
    /// Returns the runner and the receiver the main loop drains each tick.
    pub fn new(
        client: reqwest::Client,
        runtime: tokio::runtime::Handle,
    ) -> (Self, mpsc::Receiver<FetchDone>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                client,
                runtime,
                tx,
            },
            rx,
        )
    }

    pub fn spawn(&self, request: FetchRequest) {
        debug!(ticket = request.ticket.0, provider = %request.provider_id(), "spawning fetch");
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let done = execute(&client, request).await;
            // If the receiver is gone the UI has exited; nothing to report to.
            let _ = tx.send(done);
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::NewsApi;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(server: &MockServer, ticket: u64) -> FetchRequest {
        let url = Url::parse(&format!("{}/v2/top-headlines?apiKey=k", server.uri())).unwrap();
        FetchRequest {
            ticket: Ticket(ticket),
            url,
            provider: Arc::new(NewsApi::with_base(format!("{}/v2/top-headlines", server.uri()))),
            cancel: CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn success_is_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .and(query_param("apiKey", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "totalResults": 1,
                "articles": [{ "title": "Hi", "url": "https://x/1", "source": { "name": "X" } }]
            })))
            .mount(&server)
            .await;

        let done = execute(&reqwest::Client::new(), request(&server, 7)).await;
        assert_eq!(done.ticket, Ticket(7));
        let resp = done.result.expect("fetch ok");
        assert_eq!(resp.total, 1);
        assert_eq!(resp.articles[0].title, "Hi");
    }

    #[tokio::test]
    async fn non_success_status_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(429).set_body_json(json!({ "status": "ok", "articles": [] })),
            )
            .mount(&server)
            .await;

        let done = execute(&reqwest::Client::new(), request(&server, 1)).await;
        let err = done.result.unwrap_err();
        assert_eq!(err, FetchError::Http(429));
        assert_eq!(err.to_string(), "HTTP 429");
    }

    #[tokio::test]
    async fn status_error_body_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "error",
                "code": "apiKeyInvalid",
                "message": "Your API key is invalid."
            })))
            .mount(&server)
            .await;

        let done = execute(&reqwest::Client::new(), request(&server, 1)).await;
        assert_eq!(
            done.result,
            Err(FetchError::Api("Your API key is invalid.".into()))
        );
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let done = execute(&reqwest::Client::new(), request(&server, 1)).await;
        assert!(matches!(done.result, Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn cancelled_request_reports_cancelled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "articles": [] }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let req = request(&server, 3);
        let token = req.cancel.clone();
        let client = reqwest::Client::new();
        let task = tokio::spawn(async move { execute(&client, req).await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();

        let done = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("cancellation is prompt")
            .unwrap();
        assert_eq!(done.result, Err(FetchError::Cancelled));
    }

    #[tokio::test]
    async fn runner_forwards_completion_over_channel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (runner, rx) =
            FetchRunner::new(reqwest::Client::new(), tokio::runtime::Handle::current());
        runner.spawn(request(&server, 9));

        let done = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)))
            .await
            .unwrap()
            .expect("completion delivered");
        assert_eq!(done.ticket, Ticket(9));
        assert_eq!(done.result, Err(FetchError::Http(500)));
    }

    #[test]
    fn api_status_truthiness() {
        assert!(check_api_status(&json!({})).is_ok());
        assert!(check_api_status(&json!({ "status": "ok" })).is_ok());
        assert!(check_api_status(&json!({ "status": "" })).is_ok());
        assert!(check_api_status(&json!({ "status": null })).is_ok());
        assert_eq!(
            check_api_status(&json!({ "status": "error" })),
            Err(FetchError::Api("API error".into()))
        );
    }
}
