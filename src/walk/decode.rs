// src/walk/decode.rs
// =============================================================================
// File bodies come back base64-encoded (wrapped at 60 columns). Text files
// decode to UTF-8; anything else gets its bare name as a stand-in so one
// binary file never sinks a whole walk. The walker picks the stand-in.
// =============================================================================

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::github::FileBody;

/// Decodes a base64 body to text, or None if it is not valid UTF-8 text.
pub fn decode_text(encoded: &str) -> Option<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact).ok()?;
    String::from_utf8(bytes).ok()
}

/// Text of a file payload. None for binary files and payloads without content.
pub fn decode_body(body: &FileBody) -> Option<String> {
    body.content.as_deref().and_then(decode_text)
}
