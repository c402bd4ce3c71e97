// src/github/mod.rs
// =============================================================================
// Everything that speaks GitHub:
// - repository: repository URL -> contents-API listing endpoint
// - types: listing entries, file bodies, rate headers
// - client: the authenticated GET behind the ContentClient trait
// =============================================================================

mod client;
mod repository;
mod types;

pub use client::{ContentClient, HttpContentClient};
pub use types::{DirectoryEntry, EntryKind, FileBody, FileMap, RateHeaders, RemoteContent};
pub use repository::{to_listing_url, RepositoryRef, DEFAULT_API_BASE};
