//! Reversible transform for the embedded markup payload.
//!
//! Markup is stored base64-encoded so it can be embedded opaquely in both
//! the orchestrator state and the generated source. Empty maps to empty in
//! both directions.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// A stored markup payload could not be decoded back to text.
#[derive(thiserror::Error, Debug)]
pub enum MarkupError {
    /// The payload is not valid base64.
    #[error("Invalid base64 markup payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bytes are not valid UTF-8.
    #[error("Markup payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encode markup text for opaque storage.
pub fn encode_markup(plain: &str) -> String {
    if plain.is_empty() {
        return String::new();
    }
    STANDARD.encode(plain.as_bytes())
}

/// Decode a stored markup payload.
///
/// # Errors
///
/// Returns a [`MarkupError`] if the payload is not base64-encoded UTF-8.
pub fn decode_markup(encoded: &str) -> Result<String, MarkupError> {
    if encoded.is_empty() {
        return Ok(String::new());
    }
    let bytes = STANDARD.decode(encoded)?;
    Ok(String::from_utf8(bytes)?)
}
