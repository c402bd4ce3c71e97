// src/cache/mod.rs
// =============================================================================
// The cache capability: get/set strings with an optional TTL.
//
// Two key namespaces share one store and never collide:
//   listing:<url>:<parent path>   -> JSON object of path -> content
//   content:<url>                 -> decoded file text (or name sentinel)
// The rate gate keeps its state here too, under its own key.
//
// A missing key is a miss, never an error.
// =============================================================================

mod memory;

pub use memory::MemoryCache;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::CacheError;
use crate::github::FileMap;

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// `ttl = None` keeps the entry until overwritten.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError>;
}

pub fn listing_key(url: &str, parent_path: Option<&str>) -> String {
    format!("listing:{}:{}", url, parent_path.unwrap_or(""))
}

pub fn content_key(url: &str) -> String {
    format!("content:{url}")
}

/// Serializes a subtree fragment as a JSON object.
pub fn encode_fragment(files: &FileMap) -> String {
    // string keys and values always serialize
    serde_json::to_string(files).unwrap_or_else(|_| "{}".to_string())
}

pub fn decode_fragment(key: &str, raw: &str) -> Result<FileMap, CacheError> {
    serde_json::from_str(raw).map_err(|e| CacheError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
