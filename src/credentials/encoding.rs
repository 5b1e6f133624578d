//! Text encoding for passwords persisted to disk.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Failure to turn persisted text back into a password.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decoded password is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encode raw password bytes as standard (padded) base64.
pub fn encode_secret(secret: &str) -> String {
    STANDARD.encode(secret.as_bytes())
}

/// Decode persisted base64 text.
///
/// Surrounding whitespace (e.g. a trailing newline added by an editor) is ignored.
pub fn decode_secret(encoded: &str) -> Result<String, DecodeError> {
    let bytes = STANDARD.decode(encoded.trim())?;
    Ok(String::from_utf8(bytes)?)
}
