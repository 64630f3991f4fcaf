//! Common error types shared across crates.

use thiserror::Error;

/// Every failure the engine can report for a single encrypt or decrypt call.
///
/// Variants fall into two groups:
/// - structural failures ([`JweError::MalformedToken`], [`JweError::Encoding`],
///   [`JweError::UnsupportedAlgorithm`]) that are detected before any key
///   material is touched and may be reported to callers in detail;
/// - cryptographic failures that callers must treat as "token invalid or key
///   incorrect" without further distinction.
///
/// Messages never carry key bytes or plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JweError {
    /// The token does not have the compact five-segment shape, or its
    /// protected header is not a usable JSON object.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// A segment is not valid unpadded Base64URL, hex key material is invalid,
    /// or the decrypted payload is not UTF-8.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The `alg`/`enc` identifier is unknown, or not permitted by policy.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Key material does not match the size the algorithm requires.
    #[error("invalid key size: expected {expected} bytes, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    /// An initialisation vector does not match the size the algorithm requires.
    #[error("invalid iv size: expected {expected} bytes, got {actual}")]
    InvalidIvSize { expected: usize, actual: usize },

    /// The content encryption key could not be recovered from the encrypted key.
    #[error("key unwrap failed")]
    Unwrap,

    /// Tag or MAC verification failed (including post-MAC padding failures).
    #[error("authentication failed")]
    Authentication,

    /// A primitive refused to encrypt.
    #[error("encryption failed")]
    Encryption,
}

impl JweError {
    /// Short machine-readable error code (e.g. `"malformed_token"`).
    pub fn code(&self) -> &'static str {
        match self {
            JweError::MalformedToken(_) => "malformed_token",
            JweError::Encoding(_) => "encoding",
            JweError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            JweError::InvalidKeySize { .. } => "invalid_key_size",
            JweError::InvalidIvSize { .. } => "invalid_iv_size",
            JweError::Unwrap => "unwrap",
            JweError::Authentication => "authentication",
            JweError::Encryption => "encryption",
        }
    }

    /// Returns `true` for failures raised before any key material is used.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            JweError::MalformedToken(_)
                | JweError::Encoding(_)
                | JweError::UnsupportedAlgorithm(_)
        )
    }
}
