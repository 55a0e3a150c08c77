// HTTP-level tests for the dashboard server against a mocked registry

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use ch_dashboard::server::{router, AppState};
use ch_dashboard::{HttpResponse, MockHttpClient, RegistryClient};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const BASE: &str = "https://registry.test";

fn app(mock: &MockHttpClient) -> Router {
    let client = RegistryClient::new(Arc::new(mock.clone()), BASE, "secret");
    router(AppState::new(client))
}

struct Reply {
    status: StatusCode,
    content_type: Option<String>,
    disposition: Option<String>,
    body: Vec<u8>,
}

impl Reply {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

async fn get(app: Router, uri: &str) -> Reply {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let header_str = |name: header::HeaderName| {
        response
            .headers()
            .get(name)
            .map(|v| v.to_str().unwrap().to_string())
    };
    let status = response.status();
    let content_type = header_str(header::CONTENT_TYPE);
    let disposition = header_str(header::CONTENT_DISPOSITION);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();

    Reply {
        status,
        content_type,
        disposition,
        body,
    }
}

fn filing_with_metadata(tid: &str, link: &str) -> Value {
    json!({
        "transaction_id": tid,
        "type": "AA",
        "date": "2024-01-31",
        "links": { "document_metadata": link }
    })
}

fn metadata(tid: &str, document: &str) -> Value {
    json!({ "transaction_id": tid, "links": { "document": document } })
}

// ============================================================================
// FILING DOCUMENT ROUTE
// ============================================================================

#[tokio::test]
async fn test_filing_document_returns_pdf() {
    let mock = MockHttpClient::new();
    mock.add_json(
        &format!("{BASE}/company/123/filing-history/TX1"),
        filing_with_metadata("TX1", "https://docs.test/document/abc"),
    );
    mock.add_json(
        "https://docs.test/document/abc",
        metadata("TX1", "https://docs.test/document/abc/content"),
    );
    mock.add_response(
        "https://docs.test/document/abc/content",
        Ok(HttpResponse::new(200, b"%PDF-1.4".to_vec())),
    );

    let reply = get(app(&mock), "/company/123/filings/TX1/document").await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.content_type.as_deref(), Some("application/pdf"));
    let disposition = reply.disposition.unwrap();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("TX1.pdf"));
    assert_eq!(reply.body, b"%PDF-1.4".to_vec());

    // three sequential hops, all with the credential
    assert_eq!(
        mock.called_urls(),
        vec![
            format!("{BASE}/company/123/filing-history/TX1"),
            "https://docs.test/document/abc".to_string(),
            "https://docs.test/document/abc/content".to_string(),
        ]
    );
    assert!(mock.calls().iter().all(|c| c.api_key == "secret"));
}

#[tokio::test]
async fn test_filing_document_binary_404_passes_through() {
    let mock = MockHttpClient::new();
    mock.add_json(
        &format!("{BASE}/company/123/filing-history/TX2"),
        filing_with_metadata("TX2", "/document/xyz"),
    );
    mock.add_json(&format!("{BASE}/document/xyz"), metadata("TX2", "https://docs.test/xyz/content"));
    mock.add_status("https://docs.test/xyz/content", 404);

    let reply = get(app(&mock), "/company/123/filings/TX2/document").await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json(), json!({ "error": "Unable to download PDF", "status": 404 }));
}

#[tokio::test]
async fn test_filing_document_metadata_failure_is_json_error() {
    let mock = MockHttpClient::new();
    mock.add_json(
        &format!("{BASE}/company/123/filing-history/TX3"),
        filing_with_metadata("TX3", "https://docs.test/document/gone"),
    );
    // no response registered for the metadata URL: the transport fails

    let reply = get(app(&mock), "/company/123/filings/TX3/document").await;

    assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
    let body = reply.json();
    assert_eq!(body["status"], 502);
    assert!(body["error"].as_str().unwrap().contains("Metadata fetch failed"));
}

#[tokio::test]
async fn test_filing_document_with_capital_values() {
    let mock = MockHttpClient::new();
    mock.add_json(
        &format!("{BASE}/company/123/filing-history/SH1"),
        json!({
            "transaction_id": "SH1",
            "type": "SH01",
            "date": "2024-02-10",
            "description": "capital-allotment-shares",
            "description_values": {
                "capital": [ { "currency": "GBP", "figure": "100" } ],
                "date": "2024-02-01"
            },
            "links": { "document_metadata": "/document/sh1" }
        }),
    );
    mock.add_json(&format!("{BASE}/document/sh1"), metadata("SH1", "https://docs.test/sh1/content"));
    mock.add_response(
        "https://docs.test/sh1/content",
        Ok(HttpResponse::new(200, b"%PDF-sh1".to_vec())),
    );

    let reply = get(app(&mock), "/company/123/filings/SH1/document").await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.content_type.as_deref(), Some("application/pdf"));
    assert!(reply.disposition.unwrap().contains("SH1.pdf"));
    assert_eq!(reply.body, b"%PDF-sh1".to_vec());
}

#[tokio::test]
async fn test_filing_document_rejects_bad_params() {
    let mock = MockHttpClient::new();

    let reply = get(app(&mock), "/company/12%2F3/filings/TX1/document").await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["status"], 400);
    assert_eq!(mock.call_count(), 0);
}

// ============================================================================
// METADATA DOCUMENT ROUTE
// ============================================================================

#[tokio::test]
async fn test_meta_document_absolute_url_fetched_directly() {
    let mock = MockHttpClient::new();
    mock.add_json("http://host/meta/123", metadata("123", "http://host/doc/123"));
    mock.add_response("http://host/doc/123", Ok(HttpResponse::new(200, b"%PDF".to_vec())));

    let reply = get(app(&mock), "/document?metaPath=http%3A%2F%2Fhost%2Fmeta%2F123").await;

    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.disposition.unwrap().contains("123.pdf"));
    assert_eq!(mock.called_urls()[0], "http://host/meta/123");
    assert_eq!(mock.calls()[0].api_key, "secret");
}

#[tokio::test]
async fn test_meta_document_relative_path_uses_base_url() {
    let mock = MockHttpClient::new();
    mock.add_json(
        &format!("{BASE}/company/123/filing-history/456/metadata"),
        metadata("456", "https://docs.test/456/content"),
    );
    mock.add_response("https://docs.test/456/content", Ok(HttpResponse::new(200, b"%PDF".to_vec())));

    let reply = get(
        app(&mock),
        "/document?metaPath=%2Fcompany%2F123%2Ffiling-history%2F456%2Fmetadata",
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        mock.called_urls()[0],
        format!("{BASE}/company/123/filing-history/456/metadata")
    );
}

#[tokio::test]
async fn test_meta_document_metadata_failure_is_502_text() {
    let mock = MockHttpClient::new();
    mock.add_status("http://host/meta/404", 404);

    let reply = get(app(&mock), "/document?metaPath=http%3A%2F%2Fhost%2Fmeta%2F404").await;

    assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
    assert!(reply.text().contains("Metadata fetch failed"));
}

#[tokio::test]
async fn test_meta_document_malformed_metadata_is_502_text() {
    let mock = MockHttpClient::new();
    mock.add_response(
        &format!("{BASE}/document/bad"),
        Ok(HttpResponse::new(200, b"not json".to_vec())),
    );

    let reply = get(app(&mock), "/document?metaPath=%2Fdocument%2Fbad").await;

    assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
    assert!(reply.text().starts_with("Metadata fetch failed"));
    assert!(reply.content_type.unwrap().starts_with("text/plain"));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_meta_document_network_error_is_502_text() {
    let mock = MockHttpClient::new();
    // nothing queued for the metadata URL: the transport fails

    let reply = get(app(&mock), "/document?metaPath=http%3A%2F%2Fhost%2Fmeta%2Fdown").await;

    assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
    assert!(reply.text().starts_with("Metadata fetch failed"));
    assert!(reply.content_type.unwrap().starts_with("text/plain"));
    assert_eq!(mock.called_urls(), vec!["http://host/meta/down".to_string()]);
}

#[tokio::test]
async fn test_meta_document_binary_status_passes_through() {
    let mock = MockHttpClient::new();
    mock.add_json("http://host/meta/9", metadata("9", "http://host/doc/9"));
    mock.add_status("http://host/doc/9", 403);

    let reply = get(app(&mock), "/document?metaPath=http%3A%2F%2Fhost%2Fmeta%2F9").await;

    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.text(), "Unable to download PDF");
}

#[tokio::test]
async fn test_meta_document_missing_param() {
    let mock = MockHttpClient::new();

    let reply = get(app(&mock), "/document").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.text(), "Missing metaPath");

    let reply = get(app(&mock), "/document?metaPath=").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(mock.call_count(), 0);
}

// ============================================================================
// READ-THROUGH ROUTES
// ============================================================================

#[tokio::test]
async fn test_read_through_returns_upstream_json_unmodified() {
    let mock = MockHttpClient::new();
    let upstream = json!({
        "items": [ { "name": "DOE, Jane", "officer_role": "director", "extra": { "kept": true } } ],
        "total_results": 1
    });
    mock.add_json(&format!("{BASE}/company/123/officers"), upstream.clone());

    let reply = get(app(&mock), "/company/123/officers").await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), upstream);
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_read_through_route_mapping() {
    let mock = MockHttpClient::new();
    mock.add_json(&format!("{BASE}/company/123"), json!({ "company_name": "ACME" }));
    mock.add_json(&format!("{BASE}/company/123/filing-history"), json!({ "items": [] }));
    mock.add_json(&format!("{BASE}/officers/abc/appointments"), json!({ "items": [] }));

    let router = app(&mock);
    assert_eq!(get(router.clone(), "/company/123").await.status, StatusCode::OK);
    assert_eq!(get(router.clone(), "/company/123/filings").await.status, StatusCode::OK);
    assert_eq!(get(router, "/officer/abc/appointments").await.status, StatusCode::OK);

    assert_eq!(
        mock.called_urls(),
        vec![
            format!("{BASE}/company/123"),
            format!("{BASE}/company/123/filing-history"),
            format!("{BASE}/officers/abc/appointments"),
        ]
    );
}

#[tokio::test]
async fn test_read_through_upstream_failure_is_500() {
    let mock = MockHttpClient::new();
    mock.add_status(&format!("{BASE}/company/999"), 404);

    let reply = get(app(&mock), "/company/999").await;

    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_read_through_reuses_response_inside_window() {
    let mock = MockHttpClient::new();
    mock.add_json(&format!("{BASE}/company/123"), json!({ "company_name": "ACME" }));

    let client = RegistryClient::new(Arc::new(mock.clone()), BASE, "secret")
        .with_revalidate(Duration::from_secs(600));
    let router = router(AppState::new(client));

    assert_eq!(get(router.clone(), "/company/123").await.status, StatusCode::OK);
    assert_eq!(get(router, "/company/123").await.json(), json!({ "company_name": "ACME" }));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_health() {
    let reply = get(app(&MockHttpClient::new()), "/api/health").await;

    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}
