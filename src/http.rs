//! Outbound HTTP transport.
//!
//! Every network call in the crate goes through the [`HttpClient`] trait so the
//! registry client, the document pipeline and the dashboard client can all be
//! driven by [`MockHttpClient`] in tests.

use crate::error::{DashboardError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// A buffered HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 response carrying a JSON document.
    pub fn json(value: &serde_json::Value) -> Self {
        Self::new(200, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues GET requests.
///
/// A non-empty `api_key` is sent as HTTP basic auth with the key as username
/// and an empty password. Any HTTP status is returned as a response; only
/// transport failures are errors.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str, api_key: &str) -> Result<HttpResponse>;
}

// ============================================================================
// PRODUCTION CLIENT
// ============================================================================

#[derive(Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    #[tracing::instrument(skip(self, api_key))]
    async fn get(&self, url: &str, api_key: &str) -> Result<HttpResponse> {
        let mut req = self.client.get(url);
        if !api_key.is_empty() {
            req = req.basic_auth(api_key, Some(""));
        }

        let response = req.send().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "HTTP request failed");
            e
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        tracing::debug!(url = %url, status, response_len = body.len(), "HTTP request completed");

        Ok(HttpResponse { status, body })
    }
}

// ============================================================================
// MOCK CLIENT
// ============================================================================

/// Record of a call made to the mock client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub url: String,
    pub api_key: String,
}

/// Canned responses keyed by full URL, served in FIFO order.
///
/// A URL with no queued response fails like a refused connection.
#[derive(Clone, Default)]
pub struct MockHttpClient {
    responses: Arc<Mutex<HashMap<String, VecDeque<Result<HttpResponse>>>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_response(&self, url: &str, response: Result<HttpResponse>) {
        self.responses
            .lock()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn add_json(&self, url: &str, value: serde_json::Value) {
        self.add_response(url, Ok(HttpResponse::json(&value)));
    }

    pub fn add_status(&self, url: &str, status: u16) {
        self.add_response(url, Ok(HttpResponse::new(status, Vec::new())));
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn called_urls(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.url.clone()).collect()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, api_key: &str) -> Result<HttpResponse> {
        self.calls.lock().push(MockCall {
            url: url.to_string(),
            api_key: api_key.to_string(),
        });

        let queued = self
            .responses
            .lock()
            .get_mut(url)
            .and_then(|queue| queue.pop_front());

        match queued {
            Some(response) => response,
            None => Err(DashboardError::Other(anyhow::anyhow!(
                "connection refused: no mock response for {url}"
            ))),
        }
    }
}
