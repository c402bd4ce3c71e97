// src/github/types.rs
// =============================================================================
// Shapes of the GitHub contents API.
//
//   GET /repos/{owner}/{repo}/contents/{path}
//
// A directory answers with an array of entries, a file with a single object
// carrying the base64 body. Errors answer with {status, message}.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flattened result of a walk: relative path -> decoded text.
///
/// A BTreeMap so the serialized form is stable for the cache.
pub type FileMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    /// symlink, submodule, ... are resolved like files
    #[serde(other)]
    Other,
}

/// One item of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub name: String,
    pub url: String,
}

impl DirectoryEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// A single file as returned by the contents API.
#[derive(Debug, Clone, Deserialize)]
pub struct FileBody {
    /// base64 with embedded newlines; absent for submodules and huge files
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Budget headers from a successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateHeaders {
    pub remaining: u64,
    pub reset_epoch: u64,
}

/// A parsed successful response plus its rate accounting.
#[derive(Debug, Clone)]
pub struct RemoteContent {
    pub body: serde_json::Value,
    pub rate: RateHeaders,
}

/// `{status, message}` error body. GitHub sometimes sends status as a string.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub status: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub(crate) fn status_code(&self) -> Option<u16> {
        match self.status.as_ref()? {
            serde_json::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}
