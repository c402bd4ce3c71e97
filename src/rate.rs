// src/rate.rs
// =============================================================================
// The rate limit gate.
//
// GitHub hands out a call budget per token and tells us, on every response,
// how much is left and when it resets. That budget is shared by every branch
// of a walk (and by every process using the same cache), so the state lives
// in the cache store rather than in this struct.
//
// - admit(): read the state, say Allowed or Throttled{wait_seconds}
// - record(): overwrite the state, expiring it when the window resets
// - wait_for_budget(): apply the configured policy before a remote call
// =============================================================================

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::warn;

use crate::cache::CacheStore;
use crate::error::FetchError;
use crate::github::RateHeaders;

/// Cache key holding the serialized RateState.
pub const RATE_STATE_KEY: &str = "rate_limit:github";

/// Seconds since the Unix epoch.
pub fn epoch_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateState {
    pub remaining: u64,
    pub reset_epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Throttled { wait_seconds: u64 },
}

/// What to do when the budget is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThrottlePolicy {
    /// Sleep until the reset time, then carry on.
    #[default]
    Suspend,
    /// Give up with FetchError::Throttled.
    Fail,
}

#[derive(Clone)]
pub struct RateGate {
    cache: Arc<dyn CacheStore>,
    policy: ThrottlePolicy,
}

impl RateGate {
    pub fn new(cache: Arc<dyn CacheStore>, policy: ThrottlePolicy) -> Self {
        Self { cache, policy }
    }

    /// Current state, if any. A cache failure or a corrupt entry reads as none.
    pub async fn state(&self) -> Option<RateState> {
        match self.cache.get(RATE_STATE_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(state) => Some(state),
                Err(e) => {
                    warn!(error = %e, "ignoring corrupt rate state");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "rate state unavailable, admitting call");
                None
            }
        }
    }

    pub async fn admit(&self) -> Admission {
        match self.state().await {
            Some(state) => admission_for(state, epoch_now()),
            None => Admission::Allowed,
        }
    }

    /// Overwrites the state. The entry expires when the window resets.
    pub async fn record(&self, rate: RateHeaders) {
        let state = RateState {
            remaining: rate.remaining,
            reset_epoch: rate.reset_epoch,
        };
        let ttl = Duration::from_secs(rate.reset_epoch.saturating_sub(epoch_now()));

        let raw = match serde_json::to_string(&state) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "failed to serialize rate state");
                return;
            }
        };
        if let Err(e) = self.cache.set(RATE_STATE_KEY, raw, Some(ttl)).await {
            warn!(error = %e, "failed to record rate state");
        }
    }

    /// Blocks (or fails, per policy) until a remote call is allowed.
    pub async fn wait_for_budget(&self) -> Result<(), FetchError> {
        loop {
            match self.admit().await {
                Admission::Allowed => return Ok(()),
                Admission::Throttled { wait_seconds } => match self.policy {
                    ThrottlePolicy::Fail => {
                        warn!(wait_seconds, "rate limit exceeded");
                        return Err(FetchError::Throttled { wait_seconds });
                    }
                    ThrottlePolicy::Suspend => {
                        warn!(wait_seconds, "rate limit exceeded, waiting for reset");
                        tokio::time::sleep(Duration::from_secs(wait_seconds)).await;
                    }
                },
            }
        }
    }
}

// Throttled only when the budget is exactly zero and the reset is ahead of us
fn admission_for(state: RateState, now: u64) -> Admission {
    if state.remaining == 0 && state.reset_epoch > now {
        Admission::Throttled {
            wait_seconds: state.reset_epoch - now,
        }
    } else {
        Admission::Allowed
    }
}
