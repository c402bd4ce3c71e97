// src/walk/tree.rs
// =============================================================================
// The tree walker: one listing URL in, a flat path -> text map out.
//
// How it works:
// 1. Every directory is a node in an arena; the root is node 0
// 2. A work queue feeds directory visits into a FuturesUnordered, at most
//    `max_concurrency` at a time
// 3. A visit either hits the listing cache (the whole subtree at once) or
//    lists the directory, resolves its files and hands back its subdirs
// 4. Subdirs become child nodes; when a node's last child finishes, its
//    fragment is cached and folded into the parent, cascading upward
// 5. When the root completes its fragment is the answer
//
// No native recursion, so depth is bounded only by memory. Nothing is
// spawned: dropping the walk future cancels every request still in flight,
// and an error from any branch drops the rest and returns no partial map.
// =============================================================================

use futures::stream::{self, FuturesUnordered, StreamExt, TryStreamExt};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::decode::decode_body;
use crate::cache::{content_key, decode_fragment, encode_fragment, listing_key, CacheStore};
use crate::error::FetchError;
use crate::github::{ContentClient, DirectoryEntry, FileBody, FileMap, RemoteContent};
use crate::rate::RateGate;

#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub max_concurrency: usize,
    pub listing_ttl: Option<Duration>,
    pub content_ttl: Option<Duration>,
}

pub struct TreeWalker {
    client: Arc<dyn ContentClient>,
    cache: Arc<dyn CacheStore>,
    gate: RateGate,
    options: WalkOptions,
}

// A directory waiting to be visited
#[derive(Debug)]
struct PendingDir {
    url: String,
    path: Option<String>,
}

enum Visit {
    Cached(FileMap),
    Listed { files: FileMap, dirs: Vec<PendingDir> },
}

struct Node {
    key: String,
    parent: Option<usize>,
    files: FileMap,
    waiting: usize,
    from_cache: bool,
}

impl TreeWalker {
    pub fn new(
        client: Arc<dyn ContentClient>,
        cache: Arc<dyn CacheStore>,
        gate: RateGate,
        options: WalkOptions,
    ) -> Self {
        Self {
            client,
            cache,
            gate,
            options,
        }
    }

    /// Walks everything under `url`. Paths in the result are prefixed with
    /// `parent_path` when one is given.
    pub async fn walk(&self, url: &str, parent_path: Option<&str>) -> Result<FileMap, FetchError> {
        let limit = self.options.max_concurrency.max(1);

        let mut nodes = vec![Node {
            key: listing_key(url, parent_path),
            parent: None,
            files: FileMap::new(),
            waiting: 0,
            from_cache: false,
        }];
        let mut queue = VecDeque::from([(
            0usize,
            PendingDir {
                url: url.to_string(),
                path: parent_path.map(str::to_string),
            },
        )]);
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < limit {
                let Some((id, dir)) = queue.pop_front() else {
                    break;
                };
                in_flight.push(async move { (id, self.visit(dir).await) });
            }

            let Some((id, visit)) = in_flight.next().await else {
                break;
            };

            match visit? {
                Visit::Cached(files) => {
                    nodes[id].files = files;
                    nodes[id].from_cache = true;
                }
                Visit::Listed { files, dirs } => {
                    nodes[id].files = files;
                    nodes[id].waiting = dirs.len();
                    for dir in dirs {
                        let child = nodes.len();
                        nodes.push(Node {
                            key: listing_key(&dir.url, dir.path.as_deref()),
                            parent: Some(id),
                            files: FileMap::new(),
                            waiting: 0,
                            from_cache: false,
                        });
                        queue.push_back((child, dir));
                    }
                    if nodes[id].waiting > 0 {
                        continue;
                    }
                }
            }

            if let Some(files) = self.complete(&mut nodes, id).await {
                return Ok(files);
            }
        }

        // Every path that empties the queue completes the root first
        Err(FetchError::Protocol {
            url: url.to_string(),
            reason: "walk ended before the root listing completed".to_string(),
        })
    }

    // Caches a finished node and folds it into its parent, walking up while
    // parents become finished too. Returns the root's map once it finishes.
    async fn complete(&self, nodes: &mut [Node], mut id: usize) -> Option<FileMap> {
        loop {
            let files = std::mem::take(&mut nodes[id].files);
            if !nodes[id].from_cache {
                self.store_listing(&nodes[id].key, &files).await;
            }

            let Some(parent) = nodes[id].parent else {
                return Some(files);
            };
            nodes[parent].files.extend(files);
            nodes[parent].waiting -= 1;
            if nodes[parent].waiting > 0 {
                return None;
            }
            id = parent;
        }
    }

    async fn visit(&self, dir: PendingDir) -> Result<Visit, FetchError> {
        self.gate.wait_for_budget().await?;

        let key = listing_key(&dir.url, dir.path.as_deref());
        if let Some(files) = self.cached_listing(&key).await {
            debug!(url = %dir.url, files = files.len(), "listing cache hit");
            return Ok(Visit::Cached(files));
        }

        let remote = self.fetch_remote(&dir.url).await?;
        let entries: Vec<DirectoryEntry> =
            serde_json::from_value(remote.body).map_err(|e| FetchError::Protocol {
                url: dir.url.clone(),
                reason: format!("not a directory listing: {e}"),
            })?;
        debug!(url = %dir.url, entries = entries.len(), "listed directory");

        let mut dirs = Vec::new();
        let mut leaves = Vec::new();
        for entry in entries {
            let path = child_path(dir.path.as_deref(), &entry.name);
            if entry.is_dir() {
                dirs.push(PendingDir {
                    url: entry.url,
                    path: Some(path),
                });
            } else {
                leaves.push((path, entry));
            }
        }

        let files: FileMap = stream::iter(leaves)
            .map(move |(path, entry)| async move {
                let text = self.resolve_file(&entry).await?;
                Ok::<_, FetchError>((path, text))
            })
            .buffer_unordered(self.options.max_concurrency.max(1))
            .try_collect()
            .await?;

        Ok(Visit::Listed { files, dirs })
    }

    /// Text of one file: content cache first, then the API. Undecodable
    /// bodies resolve to the entry's name.
    pub async fn resolve_file(&self, entry: &DirectoryEntry) -> Result<String, FetchError> {
        let key = content_key(&entry.url);
        match self.cache.get(&key).await {
            Ok(Some(text)) => {
                debug!(file = %entry.name, "content cache hit");
                return Ok(text);
            }
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "content cache read failed"),
        }

        self.gate.wait_for_budget().await?;
        let remote = self.fetch_remote(&entry.url).await?;
        let body: FileBody = serde_json::from_value(remote.body).map_err(|e| FetchError::Protocol {
            url: entry.url.clone(),
            reason: format!("not a file payload: {e}"),
        })?;

        let text = decode_body(&body).unwrap_or_else(|| {
            warn!(file = %entry.name, "content is not UTF-8 text, keeping the name only");
            entry.name.clone()
        });

        if let Err(e) = self.cache.set(&key, text.clone(), self.options.content_ttl).await {
            warn!(key = %key, error = %e, "content cache write failed");
        }
        Ok(text)
    }

    async fn fetch_remote(&self, url: &str) -> Result<RemoteContent, FetchError> {
        let remote = self.client.fetch(url).await?;
        self.gate.record(remote.rate).await;
        Ok(remote)
    }

    async fn cached_listing(&self, key: &str) -> Option<FileMap> {
        let raw = match self.cache.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "listing cache read failed");
                return None;
            }
        };
        match decode_fragment(key, &raw) {
            Ok(files) => Some(files),
            Err(e) => {
                warn!(error = %e, "discarding unreadable listing cache entry");
                None
            }
        }
    }

    async fn store_listing(&self, key: &str, files: &FileMap) {
        let raw = encode_fragment(files);
        if let Err(e) = self.cache.set(key, raw, self.options.listing_ttl).await {
            warn!(key, error = %e, "listing cache write failed");
        }
    }
}

fn child_path(parent: Option<&str>, name: &str) -> String {
    match parent {
        Some(parent) if !parent.is_empty() => format!("{parent}/{name}"),
        _ => name.to_string(),
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. FuturesUnordered vs buffer_unordered
//    - Directories use FuturesUnordered because new work shows up while old
//      work is still running (a listing yields more listings)
//    - Files in one listing are known up front, so buffer_unordered is enough
//
// 2. Why the arena?
//    - A cached listing holds the whole subtree under it, so a directory's
//      entry can only be written once all of its children are done
//    - Nodes point at their parent by index; `waiting` counts unfinished
//      children and the last one to finish completes the parent
//
// 3. Sibling order
//    - Siblings finish in any order; the map is a BTreeMap so the result
//      (and its cached form) does not depend on that order
// -----------------------------------------------------------------------------
