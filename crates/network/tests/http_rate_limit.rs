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

//! Integration tests for HTTP rate-limit cooperation against a local mock
//! server.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::{Duration, Instant},
};

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::get,
};
use polyfeed_network::http::{HttpClient, HttpClientError};

#[derive(Clone)]
struct MockState {
    hits: Arc<AtomicU32>,
    /// Number of 429 responses to serve before succeeding.
    rate_limited_responses: u32,
}

async fn limited(State(state): State<MockState>) -> (StatusCode, HeaderMap, &'static str) {
    let hit = state.hits.fetch_add(1, Ordering::SeqCst);
    if hit < state.rate_limited_responses {
        let mut headers = HeaderMap::new();
        headers.insert("Retry-After", "1".parse().unwrap());
        (StatusCode::TOO_MANY_REQUESTS, headers, "slow down")
    } else {
        (StatusCode::OK, HeaderMap::new(), r#"{"ok":true}"#)
    }
}

async fn spawn_server(rate_limited_responses: u32) -> (String, Arc<AtomicU32>) {
    let hits = Arc::new(AtomicU32::new(0));
    let state = MockState {
        hits: Arc::clone(&hits),
        rate_limited_responses,
    };
    let app = Router::new().route("/limited", get(limited)).with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), hits)
}

#[tokio::test]
async fn retries_once_on_429_honoring_retry_after() {
    let (base, hits) = spawn_server(1).await;
    let client = HttpClient::new(Some(base), vec![], Some(5));

    let started = Instant::now();
    let response = client.get("/limited", None, None).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert!(
        started.elapsed() >= Duration::from_secs(1),
        "retry must wait at least Retry-After seconds"
    );
}

#[tokio::test]
async fn surfaces_rate_limited_when_budget_exhausted() {
    let (base, hits) = spawn_server(2).await;
    let client = HttpClient::new(Some(base), vec![], Some(5));

    let result = client.get("/limited", None, None).await;
    match result {
        Err(HttpClientError::RateLimited { retry_after }) => {
            assert_eq!(retry_after, Some(1));
        }
        other => panic!("Expected RateLimited, got {other:?}"),
    }
    // One original attempt plus one retry.
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn response_hook_throttles_next_request() {
    let (base, _hits) = spawn_server(0).await;
    let client = HttpClient::new(Some(base), vec![], Some(5));

    client.add_response_hook(Arc::new(|_response| Some(Duration::from_millis(300))));

    client.get("/limited", None, None).await.unwrap();
    assert!(client.throttle_remaining().is_some());

    // The second request must wait out the hook-imposed window.
    let started = Instant::now();
    client.get("/limited", None, None).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(250));
}

#[tokio::test]
async fn unexpected_status_surfaces_as_error() {
    let (base, _hits) = spawn_server(0).await;
    let client = HttpClient::new(Some(base), vec![], Some(5));

    let result = client.get("/missing", None, None).await;
    match result {
        Err(HttpClientError::UnexpectedStatus { status, .. }) => {
            assert_eq!(status, StatusCode::NOT_FOUND);
        }
        other => panic!("Expected UnexpectedStatus, got {other:?}"),
    }
}
