//! Key management: producing and recovering the Content Encryption Key (CEK).
//!
//! # Modes
//!
//! - `dir`: the caller's key is the CEK; the encrypted key segment is empty.
//! - `A*KW`: a fresh random CEK is wrapped with AES Key Wrap ([`aes_kw`]).
//! - `A*GCMKW`: a fresh random CEK is encrypted with AES-GCM ([`gcm_kw`]);
//!   the wrap IV and tag are returned as header parameters.
//!
//! # Security invariants
//!
//! - CEKs are generated per call from the OS CSPRNG and held in [`SecretKey`],
//!   which zeroes its buffer on drop.
//! - [`recover_cek`] reports every integrity failure as the single
//!   [`JweError::Unwrap`], whatever the cause.

pub mod aes_kw;
pub mod gcm_kw;

use common::{ContentEncryptionAlg, JweError, KeyManagementAlg};

use crate::key::{generate_key, SecretKey};

/// Key management outputs that travel in the protected header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrapParams {
    /// GCM key wrap IV (`iv` header parameter).
    pub iv: Option<Vec<u8>>,
    /// GCM key wrap tag (`tag` header parameter).
    pub tag: Option<Vec<u8>>,
}

/// Everything the encrypt path needs from key management.
#[derive(Debug)]
pub struct CekMaterial {
    /// The CEK to encrypt the content with.
    pub cek: SecretKey,
    /// The JWE Encrypted Key segment (empty for `dir`).
    pub encrypted_key: Vec<u8>,
    /// Extra header parameters produced by the wrap.
    pub params: WrapParams,
}

/// Check that `key` has the size `alg` requires in combination with `enc`.
///
/// # Errors
///
/// Returns [`JweError::InvalidKeySize`] on mismatch.
pub fn check_key_size(
    alg: KeyManagementAlg,
    enc: ContentEncryptionAlg,
    key: &[u8],
) -> Result<(), JweError> {
    let expected = alg.required_key_len(enc);
    if key.len() != expected {
        return Err(JweError::InvalidKeySize {
            expected,
            actual: key.len(),
        });
    }
    Ok(())
}

/// Produce the CEK (and its encrypted form) for one encryption.
///
/// # Errors
///
/// Returns [`JweError::InvalidKeySize`] if `key` does not match the size
/// required by `alg` (or by `enc`, for `dir`).
pub fn derive_cek_for_encryption(
    alg: KeyManagementAlg,
    enc: ContentEncryptionAlg,
    key: &[u8],
) -> Result<CekMaterial, JweError> {
    check_key_size(alg, enc, key)?;
    let kek_len = alg.required_key_len(enc);

    match alg {
        KeyManagementAlg::Direct => Ok(CekMaterial {
            cek: SecretKey::from_bytes(key),
            encrypted_key: Vec::new(),
            params: WrapParams::default(),
        }),
        KeyManagementAlg::A128Kw | KeyManagementAlg::A192Kw | KeyManagementAlg::A256Kw => {
            let cek = generate_key(enc.cek_len());
            let encrypted_key = aes_kw::wrap(key, kek_len, cek.as_bytes())?;
            Ok(CekMaterial {
                cek,
                encrypted_key,
                params: WrapParams::default(),
            })
        }
        KeyManagementAlg::A128GcmKw | KeyManagementAlg::A192GcmKw | KeyManagementAlg::A256GcmKw => {
            let cek = generate_key(enc.cek_len());
            let wrapped = gcm_kw::wrap(key, kek_len, cek.as_bytes())?;
            Ok(CekMaterial {
                cek,
                encrypted_key: wrapped.encrypted_key,
                params: WrapParams {
                    iv: Some(wrapped.iv),
                    tag: Some(wrapped.tag),
                },
            })
        }
    }
}

/// Recover the CEK on the decrypt path.
///
/// # Errors
///
/// - [`JweError::InvalidKeySize`] if `key` has the wrong size.
/// - [`JweError::MalformedToken`] if `dir` is used with a non-empty encrypted
///   key, or a GCM key wrap header lacks `iv`/`tag`.
/// - [`JweError::InvalidIvSize`] if the GCM key wrap `iv` is not 12 bytes.
/// - [`JweError::Unwrap`] if the CEK cannot be recovered or has the wrong size
///   for `enc`.
pub fn recover_cek(
    alg: KeyManagementAlg,
    enc: ContentEncryptionAlg,
    key: &[u8],
    encrypted_key: &[u8],
    params: &WrapParams,
) -> Result<SecretKey, JweError> {
    check_key_size(alg, enc, key)?;
    let kek_len = alg.required_key_len(enc);

    let cek = match alg {
        KeyManagementAlg::Direct => {
            if !encrypted_key.is_empty() {
                return Err(JweError::MalformedToken(
                    "encrypted key must be empty for direct encryption".into(),
                ));
            }
            return Ok(SecretKey::from_bytes(key));
        }
        KeyManagementAlg::A128Kw | KeyManagementAlg::A192Kw | KeyManagementAlg::A256Kw => {
            SecretKey::from_bytes(aes_kw::unwrap(key, kek_len, encrypted_key)?)
        }
        KeyManagementAlg::A128GcmKw | KeyManagementAlg::A192GcmKw | KeyManagementAlg::A256GcmKw => {
            let (iv, tag) = match (&params.iv, &params.tag) {
                (Some(iv), Some(tag)) => (iv, tag),
                _ => {
                    return Err(JweError::MalformedToken(format!(
                        "{alg} requires iv and tag header parameters"
                    )))
                }
            };
            SecretKey::from_bytes(gcm_kw::unwrap(key, kek_len, encrypted_key, iv, tag)?)
        }
    };

    if cek.len() != enc.cek_len() {
        return Err(JweError::Unwrap);
    }
    Ok(cek)
}
