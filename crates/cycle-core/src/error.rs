use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CycleError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Insufficient history for {feature}: need {required} rows, have {available}")]
    InsufficientHistory {
        feature: &'static str,
        required: usize,
        available: usize,
    },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Longest response body excerpt carried in an HTTP error
const MAX_BODY_EXCERPT: usize = 200;

impl CycleError {
    /// Provider failure for a non-2xx HTTP response.
    pub fn http_status(source: &str, status: u16, body: &str) -> Self {
        let excerpt: String = body.trim().chars().take(MAX_BODY_EXCERPT).collect();
        if excerpt.is_empty() {
            CycleError::Provider(format!("{} returned HTTP {}", source, status))
        } else {
            CycleError::Provider(format!("{} returned HTTP {}: {}", source, status, excerpt))
        }
    }

    /// Provider failure for a request that never produced a response.
    pub fn transport(source: &str, timed_out: bool, detail: &str) -> Self {
        if timed_out {
            CycleError::Provider(format!("{} request timed out: {}", source, detail))
        } else {
            CycleError::Provider(format!("{} request failed: {}", source, detail))
        }
    }
}

/// Result alias used by the provider traits
pub type CycleResult<T> = Result<T, CycleError>;
