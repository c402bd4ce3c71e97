// src/github/client.rs
// =============================================================================
// The remote content client: one authenticated GET, parsed as JSON.
//
// This is a pure protocol adapter. It never touches the cache or the rate
// gate; the walker decides when to call it and what to do with the rate
// headers it hands back.
//
// Status handling:
// - 2xx: parse JSON, read X-RateLimit-Remaining / X-RateLimit-Reset
// - anything else: read {status, message} from the body and fail with
//   FetchError::Remote (body status wins, HTTP status is the fallback)
// =============================================================================

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

use super::types::{ErrorBody, RateHeaders, RemoteContent};
use crate::error::FetchError;
use crate::rate::epoch_now;

const RATE_REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RATE_RESET_HEADER: &str = "x-ratelimit-reset";

/// Anything that can speak the contents protocol.
#[async_trait]
pub trait ContentClient: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RemoteContent, FetchError>;
}

/// reqwest-backed client for the real API.
#[derive(Debug, Clone)]
pub struct HttpContentClient {
    client: Client,
    token: Option<String>,
}

impl HttpContentClient {
    pub fn new(
        token: Option<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        // GitHub refuses requests without a User-Agent
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            user_agent
                .parse()
                .map_err(|_| FetchError::Config(format!("bad user agent: {user_agent}")))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, token })
    }
}

#[async_trait]
impl ContentClient for HttpContentClient {
    async fn fetch(&self, url: &str) -> Result<RemoteContent, FetchError> {
        debug!(url, "GET");

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let rate = rate_headers(response.headers());
        let bytes = response.bytes().await.map_err(transport)?;

        if !status.is_success() {
            let parsed: Option<ErrorBody> = serde_json::from_slice(&bytes).ok();
            let code = parsed
                .as_ref()
                .and_then(ErrorBody::status_code)
                .unwrap_or(status.as_u16());
            let message = parsed
                .and_then(|body| body.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

            error!(
                status = code,
                message = %message,
                url,
                "GitHub API response error"
            );
            return Err(FetchError::Remote { status: code, message });
        }

        let body = serde_json::from_slice(&bytes).map_err(|e| FetchError::Protocol {
            url: url.to_string(),
            reason: format!("body is not JSON: {e}"),
        })?;

        Ok(RemoteContent { body, rate })
    }
}

// A missing or garbled header counts as 0 remaining / reset now
fn rate_headers(headers: &HeaderMap) -> RateHeaders {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
    };

    RateHeaders {
        remaining: read(RATE_REMAINING_HEADER).unwrap_or(0),
        reset_epoch: read(RATE_RESET_HEADER).unwrap_or_else(epoch_now),
    }
}
