// src/harvest.rs
// =============================================================================
// The one operation the rest of a service needs:
//
//   fetch_repository_files("https://github.com/acme/widgets") -> FileMap
//
// A RepoHarvester owns its capabilities (content client, cache store, rate
// gate) instead of reaching for globals. Two harvesters built on the same
// cache share one rate budget and one set of cached listings; harvesters on
// separate caches never see each other.
// =============================================================================

use std::sync::Arc;
use tracing::info;

use crate::cache::{CacheStore, MemoryCache};
use crate::config::HarvestConfig;
use crate::error::FetchError;
use crate::github::{ContentClient, FileMap, HttpContentClient, RepositoryRef};
use crate::rate::RateGate;
use crate::walk::{TreeWalker, WalkOptions};

pub struct RepoHarvester {
    walker: TreeWalker,
    api_base: String,
}

impl RepoHarvester {
    /// Real GitHub client with an in-process cache.
    pub fn new(config: HarvestConfig) -> Result<Self, FetchError> {
        config.validate()?;
        let client = HttpContentClient::new(
            config.token.clone(),
            &config.user_agent,
            config.request_timeout,
        )?;
        Ok(Self::with_capabilities(
            config,
            Arc::new(client),
            Arc::new(MemoryCache::new()),
        ))
    }

    /// Bring your own client and cache (a shared store, a fake for tests).
    pub fn with_capabilities(
        config: HarvestConfig,
        client: Arc<dyn ContentClient>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        let gate = RateGate::new(cache.clone(), config.throttle);
        let options = WalkOptions {
            max_concurrency: config.max_concurrency,
            listing_ttl: config.listing_ttl,
            content_ttl: config.content_ttl,
        };
        Self {
            walker: TreeWalker::new(client, cache, gate, options),
            api_base: config.api_base,
        }
    }

    /// Every file in the repository, keyed by its path from the root.
    pub async fn fetch_repository_files(&self, repo_url: &str) -> Result<FileMap, FetchError> {
        let repo = RepositoryRef::parse(repo_url)?;
        let listing_url = repo.listing_url(&self.api_base);
        info!(repo = %format!("{}/{}", repo.owner, repo.name), "fetching repository tree");

        let files = self.walker.walk(&listing_url, None).await?;
        info!(repo_url, files = files.len(), "got all files");
        Ok(files)
    }
}
