//! Compact serialization framing.
//!
//! # Token format
//!
//! ```text
//! <b64u(header)>.<b64u(encrypted_key)>.<b64u(iv)>.<b64u(ciphertext)>.<b64u(tag)>
//! ```
//!
//! Every segment is unpadded Base64URL (`-`/`_` alphabet). Padding characters
//! and non-canonical trailing bits are rejected on decode.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use common::JweError;

/// Number of dot-separated segments in a compact JWE.
pub const SEGMENT_COUNT: usize = 5;

/// A compact token split into its decoded parts.
///
/// `header_segment` keeps the encoded header exactly as received: it is the
/// AAD for content decryption and must not be re-derived from the JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken<'a> {
    /// The first segment, still Base64URL-encoded.
    pub header_segment: &'a str,
    /// Decoded protected header JSON bytes.
    pub header: Vec<u8>,
    /// Decoded JWE Encrypted Key (empty for `dir`).
    pub encrypted_key: Vec<u8>,
    /// Decoded content encryption IV.
    pub iv: Vec<u8>,
    /// Decoded ciphertext.
    pub ciphertext: Vec<u8>,
    /// Decoded authentication tag.
    pub tag: Vec<u8>,
}

/// Base64URL-encode (no padding).
pub fn b64u_encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Base64URL-decode (no padding), naming `what` in the error.
///
/// # Errors
///
/// Returns [`JweError::Encoding`] if `s` is not canonical unpadded Base64URL.
pub fn b64u_decode(s: &str, what: &str) -> Result<Vec<u8>, JweError> {
    URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|e| JweError::Encoding(format!("{what} is not valid base64url: {e}")))
}

/// Render the five components as a compact token.
pub fn encode(
    header: &[u8],
    encrypted_key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> String {
    [header, encrypted_key, iv, ciphertext, tag]
        .iter()
        .map(b64u_encode)
        .collect::<Vec<_>>()
        .join(".")
}

/// Split and decode a compact token.
///
/// # Errors
///
/// - [`JweError::MalformedToken`] if the token does not have exactly
///   [`SEGMENT_COUNT`] segments, or the IV or tag segment is empty.
/// - [`JweError::Encoding`] if any segment is not valid Base64URL.
pub fn decode(token: &str) -> Result<DecodedToken<'_>, JweError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != SEGMENT_COUNT {
        return Err(JweError::MalformedToken(format!(
            "expected {SEGMENT_COUNT} segments, found {}",
            parts.len()
        )));
    }

    let header = b64u_decode(parts[0], "protected header")?;
    let encrypted_key = b64u_decode(parts[1], "encrypted key")?;
    let iv = b64u_decode(parts[2], "iv")?;
    let ciphertext = b64u_decode(parts[3], "ciphertext")?;
    let tag = b64u_decode(parts[4], "authentication tag")?;

    if header.is_empty() {
        return Err(JweError::MalformedToken("empty protected header".into()));
    }
    if iv.is_empty() {
        return Err(JweError::MalformedToken("empty iv segment".into()));
    }
    if tag.is_empty() {
        return Err(JweError::MalformedToken("empty authentication tag".into()));
    }

    Ok(DecodedToken {
        header_segment: parts[0],
        header,
        encrypted_key,
        iv,
        ciphertext,
        tag,
    })
}
