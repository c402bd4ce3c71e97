// src/walk/mod.rs
// =============================================================================
// Walking a repository tree.
//
// Submodules:
// - tree: the work-queue walker that drives the client, cache and rate gate
// - decode: base64 file bodies -> text
// =============================================================================

mod decode;
mod tree;

pub use decode::{decode_body, decode_text};
pub use tree::{TreeWalker, WalkOptions};
