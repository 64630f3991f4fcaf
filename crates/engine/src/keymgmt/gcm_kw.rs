//! Key wrapping with AES-GCM (`A128GCMKW`, `A192GCMKW`, `A256GCMKW`), per
//! RFC 7518 §4.7.
//!
//! The CEK is encrypted under the KEK with a fresh 96-bit IV and empty AAD.
//! The IV and the GCM tag travel in the protected header as `iv` and `tag`.

use common::JweError;

use crate::crypto::{check_len, gcm, random_bytes};

/// Output of a GCM key wrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcmWrapped {
    /// Encrypted CEK.
    pub encrypted_key: Vec<u8>,
    /// IV used for the wrap (header `iv`).
    pub iv: Vec<u8>,
    /// GCM tag over the wrap (header `tag`).
    pub tag: Vec<u8>,
}

/// Encrypt `cek` under `kek`, which must be exactly `kek_len` bytes.
///
/// # Errors
///
/// Returns [`JweError::InvalidKeySize`] if `kek` is not `kek_len` bytes.
pub fn wrap(kek: &[u8], kek_len: usize, cek: &[u8]) -> Result<GcmWrapped, JweError> {
    check_len(kek, kek_len, |expected, actual| JweError::InvalidKeySize {
        expected,
        actual,
    })?;
    let iv = random_bytes(gcm::IV_LEN);
    let (encrypted_key, tag) = gcm::seal(kek, &iv, &[], cek)?;
    Ok(GcmWrapped {
        encrypted_key,
        iv,
        tag,
    })
}

/// Decrypt a CEK wrapped by [`wrap`].
///
/// # Errors
///
/// - [`JweError::InvalidKeySize`] if `kek` is not `kek_len` bytes.
/// - [`JweError::InvalidIvSize`] if `iv` is not 12 bytes.
/// - [`JweError::Unwrap`] if the tag does not verify.
pub fn unwrap(
    kek: &[u8],
    kek_len: usize,
    encrypted_key: &[u8],
    iv: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, JweError> {
    check_len(kek, kek_len, |expected, actual| JweError::InvalidKeySize {
        expected,
        actual,
    })?;
    match gcm::open(kek, iv, &[], encrypted_key, tag) {
        Ok(cek) => Ok(cek),
        Err(JweError::Authentication) => Err(JweError::Unwrap),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn wrap_unwrap_round_trip() {
        for kek_len in [16, 24, 32] {
            let kek = random_bytes(kek_len);
            let cek = random_bytes(64);
            let wrapped = wrap(&kek, kek_len, &cek).unwrap();
            assert_eq!(wrapped.encrypted_key.len(), cek.len());
            assert_eq!(wrapped.iv.len(), 12);
            assert_eq!(wrapped.tag.len(), 16);
            let recovered =
                unwrap(&kek, kek_len, &wrapped.encrypted_key, &wrapped.iv, &wrapped.tag).unwrap();
            assert_eq!(recovered, cek);
        }
    }

    #[test]
    fn fresh_iv_per_wrap() {
        let kek = random_bytes(16);
        let cek = random_bytes(16);
        let a = wrap(&kek, 16, &cek).unwrap();
        let b = wrap(&kek, 16, &cek).unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.encrypted_key, b.encrypted_key);
    }

    #[test]
    fn tampered_tag_is_unwrap_failure() {
        let kek = random_bytes(32);
        let mut wrapped = wrap(&kek, 32, &random_bytes(32)).unwrap();
        wrapped.tag[0] ^= 0x01;
        assert_matches!(
            unwrap(&kek, 32, &wrapped.encrypted_key, &wrapped.iv, &wrapped.tag),
            Err(JweError::Unwrap)
        );
    }

    #[test]
    fn wrong_kek_is_unwrap_failure() {
        let wrapped = wrap(&random_bytes(16), 16, &random_bytes(16)).unwrap();
        assert_matches!(
            unwrap(
                &random_bytes(16),
                16,
                &wrapped.encrypted_key,
                &wrapped.iv,
                &wrapped.tag
            ),
            Err(JweError::Unwrap)
        );
    }

    #[test]
    fn bad_iv_size_reported() {
        let kek = random_bytes(16);
        let wrapped = wrap(&kek, 16, &random_bytes(16)).unwrap();
        assert_matches!(
            unwrap(&kek, 16, &wrapped.encrypted_key, &[0u8; 8], &wrapped.tag),
            Err(JweError::InvalidIvSize { expected: 12, actual: 8 })
        );
    }

    #[test]
    fn kek_size_enforced() {
        assert_matches!(
            wrap(&random_bytes(32), 16, &random_bytes(16)),
            Err(JweError::InvalidKeySize { expected: 16, actual: 32 })
        );
    }
}
