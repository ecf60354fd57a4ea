use thiserror::Error;

/// Failure to look up the latest version of a package
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Lookup timed out after {0} ms")]
    Timeout(u64),

    #[error("Registry command failed: {0}")]
    Command(String),
}
