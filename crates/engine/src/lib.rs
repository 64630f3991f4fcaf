//! Self-contained JWE (RFC 7516) engine, compact serialization only.
//!
//! # Algorithms
//!
//! - key management (`alg`): `dir`, `A128KW`, `A192KW`, `A256KW`,
//!   `A128GCMKW`, `A192GCMKW`, `A256GCMKW`
//! - content encryption (`enc`): `A128CBC-HS256`, `A192CBC-HS384`,
//!   `A256CBC-HS512`, `A128GCM`, `A192GCM`, `A256GCM`
//!
//! Every `alg` combines with every `enc`.
//!
//! # Example
//!
//! ```
//! use jwe_engine::{decrypt, encrypt, generate_key, ContentEncryptionAlg, KeyManagementAlg};
//!
//! let key = generate_key(32);
//! let token = encrypt(
//!     KeyManagementAlg::A256Kw,
//!     ContentEncryptionAlg::A256Gcm,
//!     key.as_bytes(),
//!     "hello",
//! )?;
//! assert_eq!(decrypt(key.as_bytes(), &token)?, "hello");
//! # Ok::<(), jwe_engine::JweError>(())
//! ```
//!
//! The free functions use [`JweEngine::default`], which permits every
//! algorithm. Build a [`JweEngine`] from an [`EngineConfig`] to restrict them.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod engine;
pub mod header;
pub mod key;
pub mod keymgmt;
pub mod telemetry;

pub use common::{Algorithms, ContentEncryptionAlg, JweError, KeyManagementAlg};
pub use crate::config::EngineConfig;
pub use crate::engine::{EncryptOptions, JweEngine};
pub use crate::header::Header;
pub use crate::key::{generate_key, parse_key_from_hex, SecretKey};

/// Encrypt `payload` into a compact token with the default engine.
///
/// # Errors
///
/// See [`JweEngine::encrypt`].
pub fn encrypt(
    alg: KeyManagementAlg,
    enc: ContentEncryptionAlg,
    key: &[u8],
    payload: &str,
) -> Result<String, JweError> {
    JweEngine::default().encrypt(Algorithms::new(alg, enc), key, payload)
}

/// Decrypt a compact token with the default engine.
///
/// # Errors
///
/// See [`JweEngine::decrypt`].
pub fn decrypt(key: &[u8], token: &str) -> Result<String, JweError> {
    JweEngine::default().decrypt(key, token)
}
