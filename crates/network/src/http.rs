// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Rate-limit-cooperative HTTP client.
//!
//! The client wraps [`reqwest`] and layers on the behaviors every venue
//! connector relies on:
//!
//! - a shared *throttle window*: a future instant until which all outgoing
//!   requests on this client are paused; extend-only semantics so concurrent
//!   writers can never shorten an existing window.
//! - a response-hook chain through which connectors observe responses (e.g.
//!   to read venue weight headers) and may request additional throttling.
//!   Hook panics are contained and logged, never propagated.
//! - `418`/`429` handling: `Retry-After` is honored and the request retried
//!   within a bounded budget; exhaustion surfaces
//!   [`HttpClientError::RateLimited`].

use std::{
    fmt::Debug,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use bytes::Bytes;
use reqwest::{Method, StatusCode, header::HeaderMap};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// User agent attached by venue connectors to outgoing requests.
pub const POLYFEED_USER_AGENT: &str = concat!("polyfeed/", env!("CARGO_PKG_VERSION"));

/// Seconds slept on a `429`/`418` response that carries no `Retry-After`.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// Default total request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of internal retries of a rate-limited request.
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// A response observer; returning `Some(duration)` throttles the client for
/// that long from now.
pub type ResponseHook = Arc<dyn Fn(&HttpResponse) -> Option<Duration> + Send + Sync>;

/// A typed error enumeration for the HTTP client.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// Transport-level failure (connection, timeout, DNS, TLS).
    #[error("Network error: {0}")]
    Network(String),
    /// The internal 429 retry budget was exhausted.
    #[error("Rate limited (retry_after: {retry_after:?})")]
    RateLimited {
        /// Seconds the venue asked us to wait.
        retry_after: Option<u64>,
    },
    /// Any non-success HTTP status other than `418`/`429`.
    #[error("Unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },
    /// Failure decoding a response body.
    #[error("JSON error: {0}")]
    Json(String),
}

/// A decoded HTTP response: status plus raw body bytes.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl HttpResponse {
    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError::Json`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpClientError> {
        serde_json::from_slice(&self.body).map_err(|e| HttpClientError::Json(e.to_string()))
    }
}

/// An HTTP client with connection reuse, throttle-window enforcement and
/// bounded `429` retries.
///
/// The throttle window is scoped to this client instance and shared across
/// all requests issued through it.
pub struct HttpClient {
    base_url: Option<String>,
    client: reqwest::Client,
    default_headers: Vec<(String, String)>,
    hooks: Mutex<Vec<ResponseHook>>,
    throttle_until: Mutex<Option<Instant>>,
    max_retries: u32,
}

impl Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(HttpClient))
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(None, Vec::new(), Some(DEFAULT_TIMEOUT_SECS))
    }
}

impl HttpClient {
    /// Creates a new client.
    ///
    /// `base_url` is prepended to request paths that are not already absolute;
    /// `default_headers` are attached to every request.
    ///
    /// # Panics
    ///
    /// Panics if the underlying TLS backend cannot be initialized.
    #[must_use]
    pub fn new(
        base_url: Option<String>,
        default_headers: Vec<(String, String)>,
        timeout_secs: Option<u64>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            base_url,
            client,
            default_headers,
            hooks: Mutex::new(Vec::new()),
            throttle_until: Mutex::new(None),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Overrides the internal rate-limit retry budget.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Registers a response hook, called with every response in registration
    /// order.
    pub fn add_response_hook(&self, hook: ResponseHook) {
        self.hooks.lock().expect("hook registry poisoned").push(hook);
    }

    /// Pauses outgoing requests until `window` from now.
    ///
    /// Extend-only: a window ending earlier than the current one has no
    /// effect, so the pause can never be shortened concurrently.
    pub fn set_throttle(&self, window: Duration) {
        if window.is_zero() {
            return;
        }
        let end = Instant::now() + window;
        let mut guard = self.throttle_until.lock().expect("throttle window poisoned");
        match *guard {
            Some(existing) if existing >= end => {}
            _ => *guard = Some(end),
        }
    }

    /// Returns the remaining throttle duration, if a window is active.
    #[must_use]
    pub fn throttle_remaining(&self) -> Option<Duration> {
        let guard = self.throttle_until.lock().expect("throttle window poisoned");
        guard.map(|until| until.saturating_duration_since(Instant::now()))
    }

    /// Issues a GET request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError::Network`] on transport failure,
    /// [`HttpClientError::RateLimited`] when the retry budget is exhausted, or
    /// [`HttpClientError::UnexpectedStatus`] for other non-success statuses.
    pub async fn get(
        &self,
        path: &str,
        query: Option<&[(String, String)]>,
        headers: Option<Vec<(String, String)>>,
    ) -> Result<HttpResponse, HttpClientError> {
        self.send(Method::GET, path, query, None, headers).await
    }

    /// Issues a POST request with an optional JSON body.
    ///
    /// # Errors
    ///
    /// Same error conditions as [`HttpClient::get`].
    pub async fn post(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
        headers: Option<Vec<(String, String)>>,
    ) -> Result<HttpResponse, HttpClientError> {
        self.send(Method::POST, path, None, body, headers).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(String, String)]>,
        body: Option<&serde_json::Value>,
        headers: Option<Vec<(String, String)>>,
    ) -> Result<HttpResponse, HttpClientError> {
        let url = self.resolve_url(path);
        let mut attempts: u32 = 0;

        loop {
            self.wait_for_throttle().await;

            let mut request = self.client.request(method.clone(), &url);
            for (name, value) in &self.default_headers {
                request = request.header(name, value);
            }
            if let Some(extra) = &headers {
                for (name, value) in extra {
                    request = request.header(name, value);
                }
            }
            if let Some(query) = query {
                request = request.query(query);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            tracing::debug!(%method, %url, "Sending request");

            let response = request
                .send()
                .await
                .map_err(|e| HttpClientError::Network(e.to_string()))?;
            let status = response.status();
            let retry_after = parse_retry_after(response.headers());
            let body_bytes = response
                .bytes()
                .await
                .map_err(|e| HttpClientError::Network(e.to_string()))?;

            let response = HttpResponse {
                status,
                body: body_bytes,
            };

            self.run_hooks(&response);

            if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::IM_A_TEAPOT {
                let wait_secs = retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                if attempts < self.max_retries {
                    attempts += 1;
                    tracing::warn!(
                        %url,
                        wait_secs,
                        attempt = attempts,
                        "Rate limited, retrying after delay"
                    );
                    tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                    continue;
                }
                return Err(HttpClientError::RateLimited {
                    retry_after: Some(wait_secs),
                });
            }

            if !status.is_success() {
                return Err(HttpClientError::UnexpectedStatus {
                    status,
                    body: String::from_utf8_lossy(&response.body).into_owned(),
                });
            }

            return Ok(response);
        }
    }

    fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        match &self.base_url {
            Some(base) => format!("{base}{path}"),
            None => path.to_string(),
        }
    }

    async fn wait_for_throttle(&self) {
        let wait = {
            let guard = self.throttle_until.lock().expect("throttle window poisoned");
            guard.map(|until| until.saturating_duration_since(Instant::now()))
        };

        if let Some(wait) = wait {
            if !wait.is_zero() {
                tracing::debug!(wait_ms = wait.as_millis() as u64, "Throttle window active");
                tokio::time::sleep(wait).await;
            }
            let mut guard = self.throttle_until.lock().expect("throttle window poisoned");
            if let Some(until) = *guard
                && Instant::now() >= until
            {
                *guard = None;
            }
        }
    }

    fn run_hooks(&self, response: &HttpResponse) {
        let hooks: Vec<ResponseHook> = {
            let guard = self.hooks.lock().expect("hook registry poisoned");
            guard.clone()
        };

        for hook in hooks {
            match catch_unwind(AssertUnwindSafe(|| hook(response))) {
                Ok(Some(window)) => self.set_throttle(window),
                Ok(None) => {}
                Err(_) => tracing::warn!("Response hook panicked, ignoring"),
            }
        }
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[test]
    fn set_throttle_is_extend_only() {
        let client = HttpClient::default();

        client.set_throttle(Duration::from_secs(5));
        let first = client.throttle_remaining().unwrap();

        // An earlier window must not shorten the pause.
        client.set_throttle(Duration::from_secs(1));
        let second = client.throttle_remaining().unwrap();
        assert!(second >= first - Duration::from_millis(50));

        // A later window extends it.
        client.set_throttle(Duration::from_secs(10));
        let third = client.throttle_remaining().unwrap();
        assert!(third > second);
    }

    #[test]
    fn set_throttle_zero_is_noop() {
        let client = HttpClient::default();
        client.set_throttle(Duration::ZERO);
        assert!(client.throttle_remaining().is_none());
    }

    #[test]
    fn hook_panic_is_contained() {
        let client = HttpClient::default();
        let called = Arc::new(AtomicU32::new(0));

        client.add_response_hook(Arc::new(|_| panic!("hook exploded")));
        let called_in_hook = Arc::clone(&called);
        client.add_response_hook(Arc::new(move |_| {
            called_in_hook.fetch_add(1, Ordering::SeqCst);
            Some(Duration::from_secs(3))
        }));

        let response = HttpResponse {
            status: StatusCode::OK,
            body: Bytes::new(),
        };
        client.run_hooks(&response);

        assert_eq!(called.load(Ordering::SeqCst), 1);
        assert!(client.throttle_remaining().is_some());
    }

    #[test]
    fn resolve_url_keeps_absolute_paths() {
        let client = HttpClient::new(Some("https://api.example.com".to_string()), vec![], None);
        assert_eq!(
            client.resolve_url("/v1/time"),
            "https://api.example.com/v1/time"
        );
        assert_eq!(
            client.resolve_url("https://other.example.com/v1/time"),
            "https://other.example.com/v1/time"
        );
    }
}
