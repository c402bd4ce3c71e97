// src/config.rs
// =============================================================================
// Knobs for a RepoHarvester. Everything has a default; the CLI fills these
// in from flags and GITHUB_API_TOKEN.
// =============================================================================

use std::time::Duration;
use url::Url;

use crate::error::FetchError;
use crate::github::DEFAULT_API_BASE;
use crate::rate::ThrottlePolicy;

/// Directory listings and file bodies both go stale when the repo changes,
/// so by default they expire together.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub api_base: String,
    pub token: Option<String>,
    pub user_agent: String,
    pub request_timeout: Duration,
    /// Directory listings in flight at once, and file fetches per listing.
    pub max_concurrency: usize,
    /// `None` keeps listings forever.
    pub listing_ttl: Option<Duration>,
    /// `None` keeps file bodies forever.
    pub content_ttl: Option<Duration>,
    pub throttle: ThrottlePolicy,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token: None,
            user_agent: concat!("repo-harvest/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout: Duration::from_secs(30),
            max_concurrency: 8,
            listing_ttl: Some(DEFAULT_CACHE_TTL),
            content_ttl: Some(DEFAULT_CACHE_TTL),
            throttle: ThrottlePolicy::Suspend,
        }
    }
}

impl HarvestConfig {
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_cache_ttl(mut self, listing: Option<Duration>, content: Option<Duration>) -> Self {
        self.listing_ttl = listing;
        self.content_ttl = content;
        self
    }

    pub fn with_throttle(mut self, throttle: ThrottlePolicy) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn validate(&self) -> Result<(), FetchError> {
        let base = Url::parse(&self.api_base)
            .map_err(|e| FetchError::Config(format!("api base '{}': {}", self.api_base, e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(FetchError::Config(format!(
                "api base must be http(s): {}",
                self.api_base
            )));
        }
        if self.max_concurrency == 0 {
            return Err(FetchError::Config("max_concurrency must be at least 1".to_string()));
        }
        Ok(())
    }
}
