// 📄 Document resolution and retrieval
// fetch-filing → fetch-metadata → fetch-binary, strictly in sequence.
//
// The metadata link must be resolved before the binary link is known, so the
// three hops can never collapse into one round trip.

use crate::error::{DashboardError, Result};
use crate::registry::{DocumentMetadata, RegistryClient};
use std::fmt;

// ============================================================================
// PIPELINE INPUT / STAGES
// ============================================================================

/// Where resolution starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataSource {
    /// Look the filing up first, then follow its metadata link
    Filing {
        company_number: String,
        transaction_id: String,
    },
    /// Caller already has the metadata path or URL
    MetaPath(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchFiling,
    FetchMetadata,
    FetchBinary,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::FetchFiling => "fetch-filing",
            Stage::FetchMetadata => "fetch-metadata",
            Stage::FetchBinary => "fetch-binary",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pipeline failure attributed to the stage that produced it.
#[derive(Debug)]
pub struct StageError {
    pub stage: Stage,
    pub error: DashboardError,
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.error)
    }
}

impl std::error::Error for StageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, StageError>;
}

impl<T> AtStage<T> for Result<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, StageError> {
        self.map_err(|error| StageError { stage, error })
    }
}

// ============================================================================
// PIPELINE OUTPUT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDocument {
    /// True location of the binary
    pub document_url: String,
    /// Owning transaction id, when the metadata names one
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub resolved: ResolvedDocument,
    pub bytes: Vec<u8>,
}

/// How a metadata link should be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataLink {
    /// Absolute http(s) URL, fetched directly with the credential
    Absolute(String),
    /// Path routed through the registry client
    Relative(String),
}

/// Classify a metadata link as absolute URL or registry-relative path.
pub fn classify_metadata_link(link: &str) -> Result<MetadataLink> {
    let link = link.trim();
    if link.is_empty() {
        return Err(DashboardError::resolution("metadata link is empty"));
    }

    match reqwest::Url::parse(link) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            Ok(MetadataLink::Absolute(link.to_string()))
        }
        Ok(url) => Err(DashboardError::resolution(format!(
            "unsupported metadata link scheme '{}'",
            url.scheme()
        ))),
        Err(_) if !link.contains("://") => {
            if link.starts_with('/') {
                Ok(MetadataLink::Relative(link.to_string()))
            } else {
                Ok(MetadataLink::Relative(format!("/{link}")))
            }
        }
        Err(e) => Err(DashboardError::resolution(format!(
            "malformed metadata link '{link}': {e}"
        ))),
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

#[derive(Clone)]
pub struct DocumentResolver {
    client: RegistryClient,
}

impl DocumentResolver {
    pub fn new(client: RegistryClient) -> Self {
        Self { client }
    }

    /// Stage 1: filing record → its metadata link.
    pub async fn fetch_filing(
        &self,
        company_number: &str,
        transaction_id: &str,
    ) -> std::result::Result<String, StageError> {
        let links = self
            .client
            .filing_links(company_number, transaction_id)
            .await
            .at(Stage::FetchFiling)?;

        links
            .document_metadata
            .filter(|link| !link.trim().is_empty())
            .ok_or_else(|| {
                DashboardError::resolution(format!(
                    "filing {transaction_id} has no document_metadata link"
                ))
            })
            .at(Stage::FetchFiling)
    }

    /// Stage 2: metadata link → metadata object.
    pub async fn fetch_metadata(
        &self,
        link: &str,
    ) -> std::result::Result<DocumentMetadata, StageError> {
        let metadata = match classify_metadata_link(link).at(Stage::FetchMetadata)? {
            MetadataLink::Absolute(url) => {
                tracing::debug!(url = %url, "fetching absolute metadata URL directly");
                self.client.get_absolute_json(&url).await
            }
            MetadataLink::Relative(path) => {
                tracing::debug!(path = %path, "fetching metadata through registry client");
                self.client.get_json(&path).await
            }
        };
        metadata.at(Stage::FetchMetadata)
    }

    /// Walk the links up to the binary document URL.
    pub async fn resolve(
        &self,
        source: &MetadataSource,
    ) -> std::result::Result<ResolvedDocument, StageError> {
        let link = match source {
            MetadataSource::Filing {
                company_number,
                transaction_id,
            } => self.fetch_filing(company_number, transaction_id).await?,
            MetadataSource::MetaPath(path) => path.clone(),
        };

        let metadata = self.fetch_metadata(&link).await?;

        let document_url = metadata
            .links
            .document
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| DashboardError::resolution("metadata has no document link"))
            .at(Stage::FetchMetadata)?;

        Ok(ResolvedDocument {
            document_url,
            transaction_id: metadata.transaction_id,
        })
    }

    /// Stage 3: resolved URL → bytes.
    pub async fn fetch_binary(&self, document_url: &str) -> std::result::Result<Vec<u8>, StageError> {
        self.client.get_bytes(document_url).await.at(Stage::FetchBinary)
    }

    /// Full pipeline.
    pub async fn retrieve(
        &self,
        source: &MetadataSource,
    ) -> std::result::Result<Document, StageError> {
        let resolved = self.resolve(source).await?;
        let bytes = self.fetch_binary(&resolved.document_url).await?;

        tracing::info!(
            document_url = %resolved.document_url,
            bytes = bytes.len(),
            "document retrieved"
        );

        Ok(Document { resolved, bytes })
    }
}

// ============================================================================
// FILENAMES
// ============================================================================

/// Strip everything but ASCII letters and digits.
pub fn sanitize_type_code(code: &str) -> String {
    code.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// `{TYPE}_{transaction_id}.pdf`, or `{transaction_id}.pdf` without a usable type.
pub fn pdf_filename(transaction_id: &str, filing_type: Option<&str>) -> String {
    match filing_type.map(sanitize_type_code) {
        Some(code) if !code.is_empty() => format!("{code}_{transaction_id}.pdf"),
        _ => format!("{transaction_id}.pdf"),
    }
}
