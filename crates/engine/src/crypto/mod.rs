//! Content encryption: AES-CBC + HMAC-SHA2 and AES-GCM.
//!
//! Both families take a CEK, the AAD (the encoded protected header) and the
//! plaintext, and produce an IV, a ciphertext and an authentication tag. The
//! IV is drawn from the OS CSPRNG on every call and is never reused.
//!
//! # Decryption invariants
//!
//! - The tag is verified before any plaintext is produced.
//! - CBC padding is only checked after the MAC has verified, and a padding
//!   failure is indistinguishable from a MAC failure.

pub mod cbc_hmac;
pub mod gcm;

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use common::{ContentEncryptionAlg, JweError};

/// Output of one content encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentCiphertext {
    /// Fresh initialisation vector.
    pub iv: Vec<u8>,
    /// Encrypted payload.
    pub ciphertext: Vec<u8>,
    /// Authentication tag over AAD, IV and ciphertext.
    pub tag: Vec<u8>,
}

/// Fill a new buffer of `len` bytes from the OS CSPRNG.
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    OsRng.fill_bytes(&mut buf);
    buf
}

/// Encrypt `plaintext` under `cek` with the content encryption algorithm `enc`.
///
/// # Errors
///
/// Returns [`JweError::InvalidKeySize`] if `cek` is not `enc.cek_len()` bytes.
pub fn encrypt(
    enc: ContentEncryptionAlg,
    cek: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<ContentCiphertext, JweError> {
    check_len(cek, enc.cek_len(), |expected, actual| JweError::InvalidKeySize {
        expected,
        actual,
    })?;
    if enc.is_cbc_hmac() {
        cbc_hmac::encrypt(enc, cek, aad, plaintext)
    } else {
        let iv = random_bytes(enc.iv_len());
        let (ciphertext, tag) = gcm::seal(cek, &iv, aad, plaintext)?;
        Ok(ContentCiphertext { iv, ciphertext, tag })
    }
}

/// Verify and decrypt a ciphertext produced by [`encrypt`].
///
/// # Errors
///
/// - [`JweError::InvalidKeySize`] / [`JweError::InvalidIvSize`] on size mismatch.
/// - [`JweError::Authentication`] if the tag does not verify or the recovered
///   plaintext is malformed.
pub fn decrypt(
    enc: ContentEncryptionAlg,
    cek: &[u8],
    aad: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, JweError> {
    check_len(cek, enc.cek_len(), |expected, actual| JweError::InvalidKeySize {
        expected,
        actual,
    })?;
    check_len(iv, enc.iv_len(), |expected, actual| JweError::InvalidIvSize {
        expected,
        actual,
    })?;
    if tag.len() != enc.tag_len() {
        return Err(JweError::Authentication);
    }
    if enc.is_cbc_hmac() {
        cbc_hmac::decrypt(enc, cek, aad, iv, ciphertext, tag)
    } else {
        gcm::open(cek, iv, aad, ciphertext, tag).map_err(|_| JweError::Authentication)
    }
}

pub(crate) fn check_len(
    bytes: &[u8],
    expected: usize,
    err: impl FnOnce(usize, usize) -> JweError,
) -> Result<(), JweError> {
    if bytes.len() == expected {
        Ok(())
    } else {
        Err(err(expected, bytes.len()))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const AAD: &[u8] = b"eyJhbGciOiJkaXIiLCJlbmMiOiJBMTI4R0NNIn0";

    #[test]
    fn round_trip_every_enc() {
        for enc in ContentEncryptionAlg::ALL {
            let cek = random_bytes(enc.cek_len());
            let sealed = encrypt(enc, &cek, AAD, b"attack at dawn").unwrap();
            assert_eq!(sealed.iv.len(), enc.iv_len(), "{enc}");
            assert_eq!(sealed.tag.len(), enc.tag_len(), "{enc}");
            let opened = decrypt(
                enc,
                &cek,
                AAD,
                &sealed.iv,
                &sealed.ciphertext,
                &sealed.tag,
            )
            .unwrap();
            assert_eq!(opened, b"attack at dawn", "{enc}");
        }
    }

    #[test]
    fn empty_plaintext_round_trips() {
        for enc in ContentEncryptionAlg::ALL {
            let cek = random_bytes(enc.cek_len());
            let sealed = encrypt(enc, &cek, AAD, b"").unwrap();
            let opened =
                decrypt(enc, &cek, AAD, &sealed.iv, &sealed.ciphertext, &sealed.tag).unwrap();
            assert!(opened.is_empty(), "{enc}");
        }
    }

    #[test]
    fn wrong_cek_size_rejected() {
        let enc = ContentEncryptionAlg::A256CbcHs512;
        assert_matches!(
            encrypt(enc, &[0u8; 32], AAD, b"x"),
            Err(JweError::InvalidKeySize { expected: 64, actual: 32 })
        );
    }

    #[test]
    fn wrong_iv_size_rejected() {
        let enc = ContentEncryptionAlg::A128Gcm;
        let cek = random_bytes(16);
        let sealed = encrypt(enc, &cek, AAD, b"x").unwrap();
        assert_matches!(
            decrypt(enc, &cek, AAD, &[0u8; 16], &sealed.ciphertext, &sealed.tag),
            Err(JweError::InvalidIvSize { expected: 12, actual: 16 })
        );
    }

    #[test]
    fn truncated_tag_rejected_as_authentication_failure() {
        for enc in ContentEncryptionAlg::ALL {
            let cek = random_bytes(enc.cek_len());
            let sealed = encrypt(enc, &cek, AAD, b"x").unwrap();
            let short = &sealed.tag[..sealed.tag.len() - 1];
            assert_matches!(
                decrypt(enc, &cek, AAD, &sealed.iv, &sealed.ciphertext, short),
                Err(JweError::Authentication),
                "{enc}"
            );
        }
    }

    #[test]
    fn altered_aad_fails_auth() {
        for enc in ContentEncryptionAlg::ALL {
            let cek = random_bytes(enc.cek_len());
            let sealed = encrypt(enc, &cek, AAD, b"bound to header").unwrap();
            assert_matches!(
                decrypt(
                    enc,
                    &cek,
                    b"eyJhbGciOiJkaXIifQ",
                    &sealed.iv,
                    &sealed.ciphertext,
                    &sealed.tag
                ),
                Err(JweError::Authentication),
                "{enc}"
            );
        }
    }

    #[test]
    fn iv_is_fresh_per_call() {
        let enc = ContentEncryptionAlg::A128CbcHs256;
        let cek = random_bytes(enc.cek_len());
        let a = encrypt(enc, &cek, AAD, b"same").unwrap();
        let b = encrypt(enc, &cek, AAD, b"same").unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }
}
