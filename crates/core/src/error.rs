use thiserror::Error;

pub type ReportResult<T> = Result<T, ReportError>;

/// Error taxonomy for the reporting core. Transient variants are retried
/// internally by the remote client; everything else surfaces to the caller.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Rate limited by remote API (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ReportError {
    /// Transient errors are eligible for retry; fatal ones never are.
    pub fn is_transient(&self) -> bool {
        matches!(self, ReportError::RateLimited { .. } | ReportError::Network(_))
    }

    /// Short machine-readable kind, stable across message wording changes.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::Validation(_) => "validation",
            ReportError::Auth(_) => "auth",
            ReportError::RateLimited { .. } => "rate_limited",
            ReportError::Network(_) => "network",
            ReportError::NotFound(_) => "not_found",
            ReportError::Storage(_) => "storage",
            ReportError::Serialization(_) => "serialization",
            ReportError::Io(_) => "io",
            ReportError::Internal(_) => "internal",
        }
    }
}
