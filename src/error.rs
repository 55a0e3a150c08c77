// Error taxonomy for the dashboard
// Upstream / Resolution / Validation are the domain errors, the rest is plumbing

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    // ========================================================================
    // DOMAIN ERRORS
    // ========================================================================
    /// Non-success HTTP response from the registry API or the document host
    #[error("upstream returned {status} for {url}")]
    Upstream { status: u16, url: String },

    /// An expected link was absent or malformed in a fetched object
    #[error("resolution failed: {0}")]
    Resolution(String),

    /// Missing or invalid request parameter
    #[error("validation failed: {0}")]
    Validation(String),

    // ========================================================================
    // PLUMBING
    // ========================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to load configuration: {0}")]
    Config(Box<figment::Error>),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<figment::Error> for DashboardError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl DashboardError {
    /// Status of the failing upstream hop, if this error came from one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_only_for_upstream() {
        let err = DashboardError::Upstream {
            status: 404,
            url: "https://example.test/x".to_string(),
        };
        assert_eq!(err.upstream_status(), Some(404));
        assert_eq!(DashboardError::resolution("no link").upstream_status(), None);
    }

    #[test]
    fn test_display_messages() {
        let err = DashboardError::Upstream {
            status: 502,
            url: "/company/1".to_string(),
        };
        assert_eq!(err.to_string(), "upstream returned 502 for /company/1");
        assert_eq!(
            DashboardError::validation("missing metaPath").to_string(),
            "validation failed: missing metaPath"
        );
    }
}
