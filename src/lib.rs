// src/lib.rs
// =============================================================================
// repo-harvest: fetch every file of a GitHub repository through the contents
// API, flatten it into path -> text, and cache what was fetched.
//
// Modules:
// - github: URL translation, protocol types, the HTTP client
// - rate: the shared rate limit gate
// - cache: the cache capability and an in-process store
// - walk: the tree walker and content decoding
// - harvest: RepoHarvester, the public entry point
// =============================================================================

pub mod cache;
pub mod config;
pub mod error;
pub mod github;
pub mod harvest;
pub mod rate;
pub mod walk;

pub use cache::{CacheStore, MemoryCache};
pub use config::HarvestConfig;
pub use error::{CacheError, FetchError};
pub use github::{to_listing_url, ContentClient, FileMap, HttpContentClient, RepositoryRef};
pub use harvest::RepoHarvester;
pub use rate::{Admission, RateGate, ThrottlePolicy};
