// 🌐 Dashboard HTTP API
// Read-through endpoints + document proxy endpoints over the registry client.

use crate::document::{pdf_filename, DocumentResolver, MetadataSource, Stage, StageError};
use crate::error::DashboardError;
use crate::registry::RegistryClient;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    client: RegistryClient,
    resolver: DocumentResolver,
}

impl AppState {
    pub fn new(client: RegistryClient) -> Self {
        Self {
            resolver: DocumentResolver::new(client.clone()),
            client,
        }
    }
}

/// API response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

// ============================================================================
// ERROR RESPONSES
// ============================================================================

/// Read-through failures: no translation, anything but bad input is a 500.
pub struct ReadThroughError(DashboardError);

impl From<DashboardError> for ReadThroughError {
    fn from(err: DashboardError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ReadThroughError {
    fn into_response(self) -> Response {
        match self.0 {
            DashboardError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            err => {
                tracing::error!(error = %err, "read-through request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            }
        }
    }
}

#[derive(Serialize)]
struct DownloadErrorBody {
    error: String,
    status: u16,
}

fn status_or_bad_gateway(err: &DashboardError) -> StatusCode {
    err.upstream_status()
        .and_then(|s| StatusCode::from_u16(s).ok())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

/// Filing route: upstream status passthrough, JSON body.
fn filing_document_error(err: StageError) -> Response {
    let status = status_or_bad_gateway(&err.error);
    let message = match err.stage {
        Stage::FetchBinary => "Unable to download PDF".to_string(),
        Stage::FetchFiling | Stage::FetchMetadata => format!("Metadata fetch failed: {}", err.error),
    };
    tracing::warn!(stage = %err.stage, status = status.as_u16(), error = %err.error, "filing document request failed");

    (
        status,
        Json(DownloadErrorBody {
            error: message,
            status: status.as_u16(),
        }),
    )
        .into_response()
}

/// Metadata route: any metadata-stage failure is a 502, plain text.
fn meta_document_error(err: StageError) -> Response {
    let (status, message) = match err.stage {
        Stage::FetchFiling | Stage::FetchMetadata => (
            StatusCode::BAD_GATEWAY,
            format!("Metadata fetch failed: {}", err.error),
        ),
        Stage::FetchBinary => (
            status_or_bad_gateway(&err.error),
            "Unable to download PDF".to_string(),
        ),
    };
    tracing::warn!(stage = %err.stage, status = status.as_u16(), error = %err.error, "document request failed");

    (status, message).into_response()
}

fn pdf_response(filename: &str, bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

// ============================================================================
// VALIDATION
// ============================================================================

fn validate_param(kind: &str, value: &str) -> Result<(), DashboardError> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DashboardError::validation(format!("invalid {kind} '{value}'")))
    }
}

/// Filename stem from an upstream-supplied id.
fn filename_stem(id: Option<&str>) -> String {
    let stem: String = id
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if stem.is_empty() {
        "document".to_string()
    } else {
        stem
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok",
        version: crate::VERSION,
    }))
}

async fn read_through(state: &AppState, path: String) -> Result<Json<Value>, ReadThroughError> {
    tracing::debug!(path = %path, "read-through");
    Ok(Json(state.client.get_value(&path).await?))
}

/// GET /company/:number - Company profile
async fn company_profile(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<Value>, ReadThroughError> {
    validate_param("company number", &number)?;
    read_through(&state, format!("/company/{number}")).await
}

/// GET /company/:number/officers
async fn company_officers(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<Value>, ReadThroughError> {
    validate_param("company number", &number)?;
    read_through(&state, format!("/company/{number}/officers")).await
}

/// GET /company/:number/filings
async fn company_filings(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<Value>, ReadThroughError> {
    validate_param("company number", &number)?;
    read_through(&state, format!("/company/{number}/filing-history")).await
}

/// GET /officer/:id/appointments
async fn officer_appointments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ReadThroughError> {
    validate_param("officer id", &id)?;
    read_through(&state, format!("/officers/{id}/appointments")).await
}

/// GET /company/:number/filings/:transaction_id/document - PDF by filing
async fn filing_document(
    State(state): State<AppState>,
    Path((number, transaction_id)): Path<(String, String)>,
) -> Response {
    if let Err(err) = validate_param("company number", &number)
        .and_then(|_| validate_param("transaction id", &transaction_id))
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(DownloadErrorBody {
                error: err.to_string(),
                status: StatusCode::BAD_REQUEST.as_u16(),
            }),
        )
            .into_response();
    }

    let source = MetadataSource::Filing {
        company_number: number,
        transaction_id: transaction_id.clone(),
    };

    match state.resolver.retrieve(&source).await {
        Ok(document) => pdf_response(&pdf_filename(&transaction_id, None), document.bytes),
        Err(err) => filing_document_error(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct DocumentQuery {
    #[serde(rename = "metaPath")]
    meta_path: Option<String>,
}

/// GET /document?metaPath=... - PDF by metadata path or URL
async fn meta_document(
    State(state): State<AppState>,
    Query(query): Query<DocumentQuery>,
) -> Response {
    let meta_path = match query.meta_path.filter(|p| !p.trim().is_empty()) {
        Some(path) => path,
        None => return (StatusCode::BAD_REQUEST, "Missing metaPath").into_response(),
    };

    match state.resolver.retrieve(&MetadataSource::MetaPath(meta_path)).await {
        Ok(document) => {
            let stem = filename_stem(document.resolved.transaction_id.as_deref());
            pdf_response(&pdf_filename(&stem, None), document.bytes)
        }
        Err(err) => meta_document_error(err),
    }
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/company/:number", get(company_profile))
        .route("/company/:number/officers", get(company_officers))
        .route("/company/:number/filings", get(company_filings))
        .route(
            "/company/:number/filings/:transaction_id/document",
            get(filing_document),
        )
        .route("/officer/:id/appointments", get(officer_appointments))
        .route("/document", get(meta_document))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
