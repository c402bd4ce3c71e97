// src/error.rs
// =============================================================================
// Error types for the harvester.
//
// FetchError is what callers of the library see. Every variant keeps enough
// detail for a web service to map it onto a response (see `status()`).
//
// CacheError never leaves the library: a broken cache is logged and treated
// as a miss so fetching keeps working without it.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The GitHub API rejected or failed a call.
    #[error("GitHub API error {status}: {message}")]
    Remote { status: u16, message: String },

    /// The rate budget is exhausted and the throttle policy says fail.
    #[error("Rate limit exceeded. Try again in {wait_seconds} seconds")]
    Throttled { wait_seconds: u64 },

    /// The repository URL could not be turned into owner/repo.
    #[error("Invalid GitHub URL: {0}")]
    InvalidRepositoryUrl(String),

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the shape the contents API promises.
    #[error("unexpected response from {url}: {reason}")]
    Protocol { url: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl FetchError {
    /// HTTP status a surrounding service should answer with.
    pub fn status(&self) -> u16 {
        match self {
            FetchError::Remote { status, .. } => *status,
            FetchError::Throttled { .. } => 429,
            FetchError::InvalidRepositoryUrl(_) => 400,
            FetchError::Transport { .. } | FetchError::Protocol { .. } => 502,
            FetchError::Config(_) => 500,
        }
    }

    pub fn is_throttled(&self) -> bool {
        matches!(self, FetchError::Throttled { .. })
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt cache entry under {key}: {reason}")]
    Corrupt { key: String, reason: String },
}
