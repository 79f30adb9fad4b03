//! Rate-limit-aware API client
//!
//! One [`ApiClient`] talks to one API (GitHub or Zenhub). It owns the
//! header set for that API and implements the status contract:
//!
//! - 200 on a list page: collect the items and follow the continuation
//! - 403 with the quota exhausted: wait for the reset and send the same
//!   request again
//! - 403 otherwise: fatal
//! - 409 on a list page: the resource is empty (a repository without
//!   commits); stop paging and keep what was collected
//! - anything else: fatal
//!
//! Transport failures are retried a bounded number of times with a fixed
//! pause in between.

use std::sync::Arc;
use std::time::Duration;

use ferry_core::HttpConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::paging::{next_link, FetchOptions, ListBody, LogProgress, ProgressSink};
use crate::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
use crate::{Error, Result};

const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// How a 403 is told apart from a permission failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitStyle {
    /// Rate limited only when `x-ratelimit-remaining` is zero (GitHub)
    Quota,
    /// Every 403 is a rate limit (Zenhub)
    AnyForbidden,
}

/// Fixed settings of one client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Prefix for relative endpoints
    pub base_url: String,
    /// Sent with every request
    pub headers: HeaderMap,
    /// Total attempts per request when the transport fails
    pub max_attempts: u32,
    /// Pause between transport attempts
    pub retry_delay: Duration,
    /// Added past the advertised reset before resuming
    pub rate_limit_margin: Duration,
    pub rate_limit_style: RateLimitStyle,
    /// Extra attempts for a 400 on single requests. Zenhub answers 400
    /// while it has not caught up with a just-created GitHub issue.
    pub bad_request_retries: u32,
    pub bad_request_delay: Duration,
}

impl ClientConfig {
    /// Settings for the GitHub REST API
    pub fn github(api_url: &str, token: &str, http: &HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, sensitive(&format!("token {}", token))?);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        Ok(Self {
            base_url: api_url.trim_end_matches('/').to_string(),
            headers,
            max_attempts: http.max_attempts.max(1),
            retry_delay: http.retry_delay,
            rate_limit_margin: http.rate_limit_margin,
            rate_limit_style: RateLimitStyle::Quota,
            bad_request_retries: 0,
            bad_request_delay: Duration::ZERO,
        })
    }

    /// Settings for the Zenhub API
    pub fn zenhub(api_url: &str, token: &str, http: &HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-authentication-token"),
            sensitive(token)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            base_url: api_url.trim_end_matches('/').to_string(),
            headers,
            max_attempts: http.max_attempts.max(1),
            retry_delay: http.retry_delay,
            rate_limit_margin: http.rate_limit_margin,
            rate_limit_style: RateLimitStyle::AnyForbidden,
            bad_request_retries: 3,
            bad_request_delay: Duration::from_secs(3),
        })
    }
}

fn sensitive(value: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(value)
        .map_err(|_| Error::Auth("Access token contains invalid characters".to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Client for one paginated, rate-limited JSON API
#[derive(Clone)]
pub struct ApiClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    progress: Arc<dyn ProgressSink>,
}

impl ApiClient {
    /// Create a client over an explicit transport and clock
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            transport,
            clock,
            progress: Arc::new(LogProgress),
        }
    }

    /// Create a client that uses reqwest and the system clock
    pub fn connect(config: ClientConfig, timeout: Duration) -> Result<Self> {
        let transport = ReqwestTransport::new(timeout)?;
        Ok(Self::new(config, Arc::new(transport), Arc::new(SystemClock)))
    }

    /// Replace the page progress sink
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Absolute URL for an endpoint. Absolute inputs pass through.
    pub fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!(
                "{}/{}",
                self.config.base_url,
                endpoint.trim_start_matches('/')
            )
        }
    }

    /// GET every page of a list endpoint
    ///
    /// `query` is sent with the first request only; continuation links
    /// already carry it.
    pub async fn fetch(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        options: FetchOptions,
    ) -> Result<Vec<Value>> {
        let mut results: Vec<Value> = Vec::new();
        let mut next = Some(self.url(endpoint));
        let mut query: Vec<(String, String)> = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();

        while let Some(url) = next.take() {
            if options.max_items.is_some_and(|max| results.len() >= max) {
                break;
            }

            let request = ApiRequest::new(Method::GET, url.as_str(), self.config.headers.clone())
                .with_query(std::mem::take(&mut query));
            let response = self.dispatch(&request).await?;

            match response.status {
                StatusCode::OK => {
                    let page = ListBody::parse(&response.body)
                        .map_err(|e| Error::decode(format!("page from {}", url), e))?;
                    let (items, body_next) = page.into_parts();

                    next = next_link(&response.headers)
                        .or(body_next)
                        .map(|n| resolve(&url, &n));

                    if !items.is_empty() {
                        self.progress
                            .page(&url, results.len() + 1, results.len() + items.len());
                    }
                    results.extend(items);
                }
                StatusCode::CONFLICT => {
                    info!(url = %url, "Endpoint returned 409, treating as empty");
                }
                _ => return Err(status_error(&response, &url)),
            }
        }

        if let Some(max) = options.max_items {
            results.truncate(max);
        }

        debug!(endpoint, count = results.len(), "Fetch complete");
        Ok(results)
    }

    /// GET a single object
    pub async fn get(&self, endpoint: &str) -> Result<Value> {
        self.send(Method::GET, endpoint, None).await
    }

    pub async fn post(&self, endpoint: &str, body: &Value) -> Result<Value> {
        self.send(Method::POST, endpoint, Some(body)).await
    }

    pub async fn patch(&self, endpoint: &str, body: &Value) -> Result<Value> {
        self.send(Method::PATCH, endpoint, Some(body)).await
    }

    pub async fn put(&self, endpoint: &str, body: &Value) -> Result<Value> {
        self.send(Method::PUT, endpoint, Some(body)).await
    }

    /// Send one request and decode the response body
    ///
    /// Any 2xx succeeds; an empty body decodes to `Value::Null`.
    pub async fn send(&self, method: Method, endpoint: &str, body: Option<&Value>) -> Result<Value> {
        let url = self.url(endpoint);
        let request = ApiRequest::new(method, url.as_str(), self.config.headers.clone())
            .with_body(body.cloned());
        let mut bad_request_retries = self.config.bad_request_retries;

        loop {
            let response = self.dispatch(&request).await?;

            if response.status.is_success() {
                if response.body.trim().is_empty() {
                    return Ok(Value::Null);
                }
                return serde_json::from_str(&response.body)
                    .map_err(|e| Error::decode(format!("response from {}", url), e));
            }

            if response.status == StatusCode::BAD_REQUEST && bad_request_retries > 0 {
                bad_request_retries -= 1;
                warn!(
                    url = %url,
                    delay_secs = self.config.bad_request_delay.as_secs(),
                    "400 response, service is probably lagging; retrying"
                );
                self.clock.sleep(self.config.bad_request_delay).await;
                continue;
            }

            return Err(status_error(&response, &url));
        }
    }

    /// Send until the response is not a rate-limit refusal
    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse> {
        loop {
            let response = self.execute_with_retry(request).await?;

            match self.rate_limit_wait(&response, &request.url)? {
                Some(wait) => {
                    warn!(
                        url = %request.url,
                        wait_secs = wait.as_secs(),
                        "API limit reached, waiting for reset"
                    );
                    self.clock.sleep(wait).await;
                    info!(url = %request.url, "Rate limit reset, resuming");
                }
                None => return Ok(response),
            }
        }
    }

    /// Send once, retrying transport failures up to `max_attempts` in total
    async fn execute_with_retry(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.transport.execute(request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    warn!(url = %request.url, attempt, error = %e, "Retrying");
                    self.clock.sleep(self.config.retry_delay).await;
                }
                Err(e) => {
                    return Err(Error::Transport {
                        url: request.url.clone(),
                        attempts: attempt,
                        message: e.to_string(),
                    })
                }
            }
        }
    }

    /// How long to wait if `response` is a rate-limit refusal
    fn rate_limit_wait(&self, response: &ApiResponse, url: &str) -> Result<Option<Duration>> {
        if response.status != StatusCode::FORBIDDEN {
            return Ok(None);
        }

        if self.config.rate_limit_style == RateLimitStyle::Quota {
            let remaining = response
                .header(RATE_LIMIT_REMAINING)
                .and_then(|v| v.trim().parse::<u64>().ok());
            if remaining != Some(0) {
                return Ok(None);
            }
        }

        let reset = response
            .header(RATE_LIMIT_RESET)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .ok_or_else(|| Error::MissingHeader {
                url: url.to_string(),
                header: RATE_LIMIT_RESET,
            })?;

        let until_reset = (reset - self.clock.now()).max(0) as u64;
        Ok(Some(
            Duration::from_secs(until_reset) + self.config.rate_limit_margin,
        ))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

fn status_error(response: &ApiResponse, url: &str) -> Error {
    Error::Status {
        status: response.status.as_u16(),
        url: url.to_string(),
        body: response.body.clone(),
    }
}

/// Resolve a continuation against the page it came from
fn resolve(current: &str, next: &str) -> String {
    match url::Url::parse(current).and_then(|base| base.join(next)) {
        Ok(url) => url.to_string(),
        Err(_) => next.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::SilentProgress;
    use crate::testing::{response, FakeClock, ScriptedTransport};
    use crate::transport::TransportError;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;
    const BASE: &str = "https://api.example.com";

    fn config(style: RateLimitStyle) -> ClientConfig {
        ClientConfig {
            base_url: BASE.to_string(),
            headers: HeaderMap::new(),
            max_attempts: 3,
            retry_delay: Duration::from_secs(1),
            rate_limit_margin: Duration::from_secs(1),
            rate_limit_style: style,
            bad_request_retries: 0,
            bad_request_delay: Duration::ZERO,
        }
    }

    fn client(config: ClientConfig) -> (ApiClient, Arc<ScriptedTransport>, Arc<FakeClock>) {
        let clock = FakeClock::starting_at(NOW);
        let transport = ScriptedTransport::new(clock.clone());
        let client = ApiClient::new(config, transport.clone(), clock.clone())
            .with_progress(Arc::new(SilentProgress));
        (client, transport, clock)
    }

    fn items(range: std::ops::Range<u64>) -> Value {
        Value::Array(range.map(|n| json!({ "number": n })).collect())
    }

    fn numbers(values: &[Value]) -> Vec<u64> {
        values.iter().map(|v| v["number"].as_u64().unwrap()).collect()
    }

    fn next_header(page: u32) -> String {
        format!(
            r#"<{}/items?page={}>; rel="next", <{}/items?page=9>; rel="last""#,
            BASE, page, BASE
        )
    }

    /// Serve `total` items in pages of `page_size`
    fn script_pages(transport: &ScriptedTransport, total: u64, page_size: u64) {
        let mut start = 0;
        let mut page = 1;
        loop {
            let end = (start + page_size).min(total);
            let link = next_header(page + 1);
            let headers: Vec<(&str, &str)> = if end < total {
                vec![("link", link.as_str())]
            } else {
                vec![]
            };
            transport.respond(response(200, &headers, items(start..end)));
            if end >= total {
                break;
            }
            start = end;
            page += 1;
        }
    }

    #[tokio::test]
    async fn test_fetch_collects_every_page_in_order() {
        for page_size in [1, 3, 7, 10, 25] {
            let (client, transport, _) = client(config(RateLimitStyle::Quota));
            script_pages(&transport, 10, page_size);

            let result = client
                .fetch("items", &[("per_page", page_size.to_string())], FetchOptions::all())
                .await
                .unwrap();

            assert_eq!(numbers(&result), (0..10).collect::<Vec<_>>(), "page size {}", page_size);
        }
    }

    #[tokio::test]
    async fn test_fetch_sends_query_only_on_first_page() {
        let (client, transport, _) = client(config(RateLimitStyle::Quota));
        script_pages(&transport, 4, 2);

        client
            .fetch("/items", &[("state", "all".to_string())], FetchOptions::all())
            .await
            .unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].1.url, format!("{}/items", BASE));
        assert_eq!(sent[0].1.query, vec![("state".to_string(), "all".to_string())]);
        assert_eq!(sent[1].1.url, format!("{}/items?page=2", BASE));
        assert!(sent[1].1.query.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_truncates_to_max_items() {
        let (client, transport, _) = client(config(RateLimitStyle::Quota));
        script_pages(&transport, 10, 4);

        let result = client
            .fetch("items", &[], FetchOptions::at_most(5))
            .await
            .unwrap();

        assert_eq!(numbers(&result), vec![0, 1, 2, 3, 4]);
        // two pages cover five items; the third is never requested
        assert_eq!(transport.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_waits_for_rate_limit_reset_and_resumes_same_page() {
        let (client, transport, clock) = client(config(RateLimitStyle::Quota));
        let reset = NOW + 30;
        let reset_header = reset.to_string();
        transport
            .respond(response(
                200,
                &[("link", next_header(2).as_str())],
                items(0..2),
            ))
            .respond(response(
                403,
                &[
                    ("x-ratelimit-remaining", "0"),
                    ("x-ratelimit-reset", reset_header.as_str()),
                ],
                json!({"message": "API rate limit exceeded"}),
            ))
            .respond(response(200, &[], items(2..4)));

        let result = client.fetch("items", &[], FetchOptions::all()).await.unwrap();

        assert_eq!(numbers(&result), vec![0, 1, 2, 3]);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(31)]);

        let sent = transport.sent();
        assert_eq!(sent.len(), 3);
        // the refused page is requested again, and not before the reset
        assert_eq!(sent[1].1.url, sent[2].1.url);
        assert!(sent[2].0 >= reset);
    }

    #[tokio::test]
    async fn test_rate_limit_reset_in_the_past_waits_only_the_margin() {
        let (client, transport, clock) = client(config(RateLimitStyle::Quota));
        let reset = (NOW - 100).to_string();
        transport
            .respond(response(
                403,
                &[
                    ("x-ratelimit-remaining", "0"),
                    ("x-ratelimit-reset", reset.as_str()),
                ],
                Value::Null,
            ))
            .respond(response(200, &[], items(0..1)));

        client.fetch("items", &[], FetchOptions::all()).await.unwrap();
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(1)]);
    }

    #[tokio::test]
    async fn test_forbidden_with_quota_left_is_fatal() {
        let (client, transport, clock) = client(config(RateLimitStyle::Quota));
        transport.respond(response(
            403,
            &[("x-ratelimit-remaining", "4321")],
            json!({"message": "Resource not accessible by integration"}),
        ));

        let err = client
            .fetch("items", &[], FetchOptions::all())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(403));
        assert!(err.to_string().contains(&format!("{}/items", BASE)));
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_quota_without_reset_header_is_fatal() {
        let (client, transport, _) = client(config(RateLimitStyle::Quota));
        transport.respond(response(403, &[("x-ratelimit-remaining", "0")], Value::Null));

        let err = client.get("items/1").await.unwrap_err();
        assert!(matches!(err, Error::MissingHeader { header: "x-ratelimit-reset", .. }));
    }

    #[tokio::test]
    async fn test_conflict_ends_pagination_with_collected_items() {
        let (client, transport, _) = client(config(RateLimitStyle::Quota));
        transport
            .respond(response(200, &[("link", next_header(2).as_str())], items(0..3)))
            .respond(response(409, &[], json!({"message": "Git Repository is empty."})));

        let result = client.fetch("items", &[], FetchOptions::all()).await.unwrap();
        assert_eq!(numbers(&result), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_conflict_on_first_page_is_empty_result() {
        let (client, transport, _) = client(config(RateLimitStyle::Quota));
        transport.respond(response(409, &[], Value::Null));

        let result = client.fetch("commits", &[], FetchOptions::all()).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_other_status_is_fatal_with_status_and_url() {
        let (client, transport, _) = client(config(RateLimitStyle::Quota));
        transport.respond(response(404, &[], json!({"message": "Not Found"})));

        let err = client
            .fetch("repos/a/b/issues", &[], FetchOptions::all())
            .await
            .unwrap_err();
        match err {
            Error::Status { status, url, .. } => {
                assert_eq!(status, 404);
                assert_eq!(url, format!("{}/repos/a/b/issues", BASE));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried_with_fixed_delay() {
        let (client, transport, clock) = client(config(RateLimitStyle::Quota));
        transport
            .fail(TransportError::Transient("connection reset".to_string()))
            .fail(TransportError::Transient("timed out".to_string()))
            .respond(response(200, &[], items(0..2)));

        let result = client.fetch("items", &[], FetchOptions::all()).await.unwrap();

        assert_eq!(numbers(&result), vec![0, 1]);
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(1), Duration::from_secs(1)]
        );
    }

    #[tokio::test]
    async fn test_retries_exhausted_names_url() {
        let (client, transport, _) = client(config(RateLimitStyle::Quota));
        for _ in 0..3 {
            transport.fail(TransportError::Transient("connection reset".to_string()));
        }

        let err = client
            .fetch("items", &[], FetchOptions::all())
            .await
            .unwrap_err();

        match err {
            Error::Transport { url, attempts, .. } => {
                assert_eq!(url, format!("{}/items", BASE));
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(transport.sent().len(), 3);
    }

    #[tokio::test]
    async fn test_fatal_transport_error_is_not_retried() {
        let (client, transport, _) = client(config(RateLimitStyle::Quota));
        transport.fail(TransportError::Fatal("bad url".to_string()));

        let err = client.get("x").await.unwrap_err();
        assert!(matches!(err, Error::Transport { attempts: 1, .. }));
    }

    #[tokio::test]
    async fn test_body_continuation_is_followed() {
        let (client, transport, _) = client(config(RateLimitStyle::Quota));
        transport
            .respond(response(
                200,
                &[],
                json!({"Items": [{"number": 1}], "NextPageLink": "/scans?skip=1"}),
            ))
            .respond(response(200, &[], json!({"Items": [{"number": 2}]})));

        let result = client.fetch("scans", &[], FetchOptions::all()).await.unwrap();

        assert_eq!(numbers(&result), vec![1, 2]);
        assert_eq!(transport.sent_urls()[1], format!("{}/scans?skip=1", BASE));
    }

    #[tokio::test]
    async fn test_send_decodes_created_object_and_empty_body() {
        let (client, transport, _) = client(config(RateLimitStyle::Quota));
        transport
            .respond(response(201, &[], json!({"number": 12})))
            .respond(response(204, &[], Value::Null));

        let created = client.post("issues", &json!({"title": "t"})).await.unwrap();
        assert_eq!(created["number"], 12);

        let empty = client.put("issues/12/estimate", &json!({"estimate": 3})).await.unwrap();
        assert!(empty.is_null());

        let sent = transport.sent();
        assert_eq!(sent[0].1.method, Method::POST);
        assert_eq!(sent[0].1.body, Some(json!({"title": "t"})));
        assert_eq!(sent[1].1.method, Method::PUT);
    }

    #[tokio::test]
    async fn test_any_forbidden_style_waits_on_every_403() {
        let (client, transport, clock) = client(config(RateLimitStyle::AnyForbidden));
        let reset = (NOW + 10).to_string();
        transport
            .respond(response(403, &[("x-ratelimit-reset", reset.as_str())], Value::Null))
            .respond(response(200, &[], json!({"pipelines": []})));

        let board = client.get("p1/repositories/1/board").await.unwrap();
        assert_eq!(board, json!({"pipelines": []}));
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(11)]);
    }

    #[tokio::test]
    async fn test_bad_request_retries_then_fails() {
        let mut cfg = config(RateLimitStyle::AnyForbidden);
        cfg.bad_request_retries = 2;
        cfg.bad_request_delay = Duration::from_secs(3);
        let (client, transport, clock) = client(cfg);
        for _ in 0..3 {
            transport.respond(response(400, &[], json!({"message": "lagging"})));
        }

        let err = client
            .post("p1/repositories/1/issues/5/moves", &json!({"position": "bottom"}))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert_eq!(transport.sent().len(), 3);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(3); 2]);
    }

    #[tokio::test]
    async fn test_bad_request_recovers() {
        let mut cfg = config(RateLimitStyle::AnyForbidden);
        cfg.bad_request_retries = 3;
        let (client, transport, _) = client(cfg);
        transport
            .respond(response(400, &[], Value::Null))
            .respond(response(200, &[], json!({"ok": true})));

        let result = client.get("p1/repositories/1/issues/5").await.unwrap();
        assert_eq!(result["ok"], true);
    }

    #[test]
    fn test_url_joins_relative_and_keeps_absolute() {
        let (client, _, _) = client(config(RateLimitStyle::Quota));
        assert_eq!(client.url("repos/a/b"), format!("{}/repos/a/b", BASE));
        assert_eq!(client.url("/repos/a/b"), format!("{}/repos/a/b", BASE));
        assert_eq!(
            client.url("https://other.example.com/x"),
            "https://other.example.com/x"
        );
    }

    #[test]
    fn test_github_config_headers() {
        let config =
            ClientConfig::github("https://ghe.example.com/api/v3/", "abc", &HttpConfig::default())
                .unwrap();
        assert_eq!(config.base_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.headers.get(AUTHORIZATION).unwrap(), "token abc");
        assert!(config.headers.get(AUTHORIZATION).unwrap().is_sensitive());
        assert_eq!(config.rate_limit_style, RateLimitStyle::Quota);
        assert_eq!(config.bad_request_retries, 0);

        assert!(ClientConfig::github("https://x", "bad\ntoken", &HttpConfig::default()).is_err());
    }

    #[test]
    fn test_zenhub_config_headers() {
        let config =
            ClientConfig::zenhub("https://zh.example.com", "zh", &HttpConfig::default()).unwrap();
        assert_eq!(config.headers.get("x-authentication-token").unwrap(), "zh");
        assert_eq!(config.rate_limit_style, RateLimitStyle::AnyForbidden);
        assert_eq!(config.bad_request_retries, 3);
    }
}
