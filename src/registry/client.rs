// Upstream Registry Client
// Authenticated GETs against the fixed registry base URL, one attempt per call.

use super::models::{
    Appointment, CompanyOfficer, CompanyProfile, Filing, FilingLinks, FilingLinksRecord, ItemList,
};
use crate::error::{DashboardError, Result};
use crate::http::{HttpClient, HttpResponse};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_API_BASE: &str = "https://api.company-information.service.gov.uk";

#[derive(Clone)]
pub struct RegistryClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
    api_key: String,
    revalidate: Duration,
    cache: Arc<Mutex<HashMap<String, (Instant, Value)>>>,
}

impl RegistryClient {
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            revalidate: Duration::ZERO,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Reuse relative-path JSON responses for `window`. Zero disables reuse.
    pub fn with_revalidate(mut self, window: Duration) -> Self {
        self.revalidate = window;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    // ========================================================================
    // RAW ACCESS
    // ========================================================================

    /// GET a registry path and return its JSON body untouched.
    pub async fn get_value(&self, path: &str) -> Result<Value> {
        let url = self.url_for(path);

        if let Some(value) = self.cached(&url) {
            tracing::debug!(url = %url, "serving registry response from revalidation window");
            return Ok(value);
        }

        let response = self.fetch(&url).await?;
        let value: Value = serde_json::from_slice(&response.body)?;

        if !self.revalidate.is_zero() {
            let window = self.revalidate;
            let mut cache = self.cache.lock();
            cache.retain(|_, (fetched_at, _)| fetched_at.elapsed() < window);
            cache.insert(url, (Instant::now(), value.clone()));
        }

        Ok(value)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.get_value(path).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// GET an absolute URL with the same credential, bypassing the base URL.
    pub async fn get_absolute_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.fetch(url).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// GET an absolute URL with the same credential and return the raw body.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        Ok(self.fetch(url).await?.body)
    }

    async fn fetch(&self, url: &str) -> Result<HttpResponse> {
        let response = self.http.get(url, &self.api_key).await?;
        if !response.is_success() {
            tracing::warn!(url = %url, status = response.status, "registry request failed");
            return Err(DashboardError::Upstream {
                status: response.status,
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    fn cached(&self, url: &str) -> Option<Value> {
        if self.revalidate.is_zero() {
            return None;
        }
        let mut cache = self.cache.lock();
        match cache.get(url) {
            Some((fetched_at, value)) if fetched_at.elapsed() < self.revalidate => Some(value.clone()),
            Some(_) => {
                cache.remove(url);
                None
            }
            None => None,
        }
    }

    // ========================================================================
    // TYPED ENDPOINTS
    // ========================================================================

    pub async fn company_profile(&self, number: &str) -> Result<CompanyProfile> {
        self.get_json(&format!("/company/{number}")).await
    }

    pub async fn company_officers(&self, number: &str) -> Result<ItemList<CompanyOfficer>> {
        self.get_json(&format!("/company/{number}/officers")).await
    }

    pub async fn filing_history(&self, number: &str) -> Result<ItemList<Filing>> {
        self.get_json(&format!("/company/{number}/filing-history")).await
    }

    /// Links of one filing; the rest of the record is not decoded.
    pub async fn filing_links(&self, number: &str, transaction_id: &str) -> Result<FilingLinks> {
        let record: FilingLinksRecord = self
            .get_json(&format!("/company/{number}/filing-history/{transaction_id}"))
            .await?;
        Ok(record.links)
    }

    pub async fn officer_appointments(&self, officer_id: &str) -> Result<ItemList<Appointment>> {
        self.get_json(&format!("/officers/{officer_id}/appointments")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockHttpClient;
    use serde_json::json;

    fn client(mock: &MockHttpClient) -> RegistryClient {
        RegistryClient::new(Arc::new(mock.clone()), "https://registry.test/", "secret")
    }

    #[tokio::test]
    async fn test_get_value_prefixes_base_and_sends_key() {
        let mock = MockHttpClient::new();
        mock.add_json("https://registry.test/company/123", json!({ "company_name": "ACME" }));

        let value = client(&mock).get_value("/company/123").await.unwrap();

        assert_eq!(value["company_name"], "ACME");
        let calls = mock.calls();
        assert_eq!(calls[0].url, "https://registry.test/company/123");
        assert_eq!(calls[0].api_key, "secret");
    }

    #[tokio::test]
    async fn test_non_success_is_upstream_error() {
        let mock = MockHttpClient::new();
        mock.add_status("https://registry.test/company/404", 404);

        let err = client(&mock).get_value("/company/404").await.unwrap_err();
        assert_eq!(err.upstream_status(), Some(404));
    }

    #[tokio::test]
    async fn test_no_retry_on_failure() {
        let mock = MockHttpClient::new();
        mock.add_status("https://registry.test/company/1", 500);
        mock.add_json("https://registry.test/company/1", json!({}));

        assert!(client(&mock).get_value("/company/1").await.is_err());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_revalidation_window_reuses_response() {
        let mock = MockHttpClient::new();
        mock.add_json("https://registry.test/company/1/officers", json!({ "items": [] }));

        let client = client(&mock).with_revalidate(Duration::from_secs(600));
        client.get_value("/company/1/officers").await.unwrap();
        client.get_value("/company/1/officers").await.unwrap();

        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_expired_entries_dropped_on_insert() {
        let mock = MockHttpClient::new();
        mock.add_json("https://registry.test/company/1", json!({}));
        mock.add_json("https://registry.test/company/2", json!({}));

        let client = client(&mock).with_revalidate(Duration::from_millis(50));
        client.get_value("/company/1").await.unwrap();
        assert_eq!(client.cache.lock().len(), 1);

        tokio::time::sleep(Duration::from_millis(120)).await;
        client.get_value("/company/2").await.unwrap();

        let cache = client.cache.lock();
        assert_eq!(cache.len(), 1);
        assert!(cache.contains_key("https://registry.test/company/2"));
    }

    #[tokio::test]
    async fn test_filing_links_ignores_capital_values() {
        let mock = MockHttpClient::new();
        mock.add_json(
            "https://registry.test/company/1/filing-history/SH1",
            json!({
                "transaction_id": "SH1",
                "type": "SH01",
                "description_values": { "capital": [ { "currency": "GBP", "figure": "100" } ] },
                "links": { "document_metadata": "/document/sh1" }
            }),
        );

        let links = client(&mock).filing_links("1", "SH1").await.unwrap();
        assert_eq!(links.document_metadata.as_deref(), Some("/document/sh1"));
    }

    #[tokio::test]
    async fn test_zero_window_always_fetches() {
        let mock = MockHttpClient::new();
        mock.add_json("https://registry.test/company/1", json!({}));
        mock.add_json("https://registry.test/company/1", json!({}));

        let client = client(&mock);
        client.get_value("/company/1").await.unwrap();
        client.get_value("/company/1").await.unwrap();

        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_absolute_fetch_skips_base() {
        let mock = MockHttpClient::new();
        mock.add_json("http://host/meta/123", json!({ "links": { "document": "http://host/doc" } }));

        let meta: crate::registry::DocumentMetadata =
            client(&mock).get_absolute_json("http://host/meta/123").await.unwrap();

        assert_eq!(meta.links.document.as_deref(), Some("http://host/doc"));
        assert_eq!(mock.called_urls(), vec!["http://host/meta/123".to_string()]);
        assert_eq!(mock.calls()[0].api_key, "secret");
    }
}
