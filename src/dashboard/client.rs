// Dashboard-side client for the ch-server endpoints
// No credential: the server holds the registry key.

use crate::document::pdf_filename;
use crate::error::{DashboardError, Result};
use crate::http::HttpClient;
use crate::registry::{Appointment, CompanyOfficer, CompanyProfile, Filing, ItemList};
use serde::de::DeserializeOwned;
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl DashboardClient {
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.get(&url, "").await?;
        if !response.is_success() {
            return Err(DashboardError::Upstream {
                status: response.status,
                url,
            });
        }
        Ok(response.body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.get(path).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn company_profile(&self, number: &str) -> Result<CompanyProfile> {
        self.get_json(&format!("/company/{}", urlencoding::encode(number)))
            .await
    }

    pub async fn officers(&self, number: &str) -> Result<ItemList<CompanyOfficer>> {
        self.get_json(&format!("/company/{}/officers", urlencoding::encode(number)))
            .await
    }

    pub async fn filings(&self, number: &str) -> Result<ItemList<Filing>> {
        self.get_json(&format!("/company/{}/filings", urlencoding::encode(number)))
            .await
    }

    pub async fn appointments(&self, officer_id: &str) -> Result<ItemList<Appointment>> {
        self.get_json(&format!(
            "/officer/{}/appointments",
            urlencoding::encode(officer_id)
        ))
        .await
    }

    /// PDF bytes via `/document?metaPath=...`.
    pub async fn download(&self, meta_path: &str) -> Result<Vec<u8>> {
        self.get(&format!("/document?metaPath={}", urlencoding::encode(meta_path)))
            .await
    }

    /// Download a filing's PDF; returns the save name `{TYPE}_{transaction_id}.pdf` with the bytes.
    pub async fn download_filing(&self, filing: &Filing) -> Result<(String, Vec<u8>)> {
        let meta_path = filing
            .links
            .document_metadata
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                DashboardError::resolution(format!(
                    "filing {} has no document metadata",
                    filing.transaction_id
                ))
            })?;

        let bytes = self.download(meta_path).await?;
        Ok((
            pdf_filename(&filing.transaction_id, Some(&filing.filing_type)),
            bytes,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpResponse, MockHttpClient};
    use serde_json::json;

    #[tokio::test]
    async fn test_download_encodes_meta_path() {
        let mock = MockHttpClient::new();
        mock.add_response(
            "http://dash.test/document?metaPath=https%3A%2F%2Fdocs.test%2Fdocument%2Fabc",
            Ok(HttpResponse::new(200, b"%PDF".to_vec())),
        );

        let client = DashboardClient::new(Arc::new(mock.clone()), "http://dash.test/");
        let filing: Filing = serde_json::from_value(json!({
            "transaction_id": "TX9",
            "type": "CS01",
            "date": "2023-05-05",
            "links": { "document_metadata": "https://docs.test/document/abc" }
        }))
        .unwrap();

        let (name, bytes) = client.download_filing(&filing).await.unwrap();

        assert_eq!(name, "CS01_TX9.pdf");
        assert_eq!(bytes, b"%PDF".to_vec());
        assert_eq!(mock.calls()[0].api_key, "");
    }

    #[tokio::test]
    async fn test_non_success_is_error() {
        let mock = MockHttpClient::new();
        mock.add_status("http://dash.test/company/1", 500);

        let client = DashboardClient::new(Arc::new(mock), "http://dash.test");
        let err = client.company_profile("1").await.unwrap_err();
        assert_eq!(err.upstream_status(), Some(500));
    }

    #[tokio::test]
    async fn test_filing_without_metadata_is_not_requested() {
        let mock = MockHttpClient::new();
        let client = DashboardClient::new(Arc::new(mock.clone()), "http://dash.test");
        let filing: Filing = serde_json::from_value(json!({
            "transaction_id": "TX1", "type": "AA", "date": "2023-05-05"
        }))
        .unwrap();

        assert!(client.download_filing(&filing).await.is_err());
        assert_eq!(mock.call_count(), 0);
    }
}
