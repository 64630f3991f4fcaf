//! AES Key Wrap per RFC 3394 (`A128KW`, `A192KW`, `A256KW`).
//!
//! The wrapped output is the input length plus an 8-byte integrity check
//! value, so a wrong KEK or a tampered wrapped key is always detected on
//! unwrap.

use aes::cipher::generic_array::GenericArray;
use aes_kw::{KekAes128, KekAes192, KekAes256};
use common::JweError;

/// Length of the RFC 3394 integrity check value prepended to wrapped keys.
pub const ICV_LEN: usize = 8;

enum Kek {
    Aes128(KekAes128),
    Aes192(KekAes192),
    Aes256(KekAes256),
}

impl Kek {
    fn new(kek: &[u8], expected: usize) -> Result<Self, JweError> {
        if kek.len() != expected {
            return Err(JweError::InvalidKeySize {
                expected,
                actual: kek.len(),
            });
        }
        match expected {
            16 => Ok(Kek::Aes128(KekAes128::new(GenericArray::from_slice(kek)))),
            24 => Ok(Kek::Aes192(KekAes192::new(GenericArray::from_slice(kek)))),
            32 => Ok(Kek::Aes256(KekAes256::new(GenericArray::from_slice(kek)))),
            _ => Err(JweError::InvalidKeySize {
                expected: 32,
                actual: kek.len(),
            }),
        }
    }

    fn wrap(&self, data: &[u8], out: &mut [u8]) -> Result<(), aes_kw::Error> {
        match self {
            Kek::Aes128(k) => k.wrap(data, out),
            Kek::Aes192(k) => k.wrap(data, out),
            Kek::Aes256(k) => k.wrap(data, out),
        }
    }

    fn unwrap(&self, data: &[u8], out: &mut [u8]) -> Result<(), aes_kw::Error> {
        match self {
            Kek::Aes128(k) => k.unwrap(data, out),
            Kek::Aes192(k) => k.unwrap(data, out),
            Kek::Aes256(k) => k.unwrap(data, out),
        }
    }
}

/// Wrap `cek` under `kek`, which must be exactly `kek_len` bytes.
///
/// # Errors
///
/// - [`JweError::InvalidKeySize`] if `kek` is not `kek_len` bytes.
/// - [`JweError::Encryption`] if `cek` is not a multiple of 8 bytes of at
///   least 16 bytes.
pub fn wrap(kek: &[u8], kek_len: usize, cek: &[u8]) -> Result<Vec<u8>, JweError> {
    let kek = Kek::new(kek, kek_len)?;
    if cek.len() < 16 || cek.len() % 8 != 0 {
        return Err(JweError::Encryption);
    }
    let mut output = vec![0u8; cek.len() + ICV_LEN];
    kek.wrap(cek, &mut output)
        .map_err(|_| JweError::Encryption)?;
    Ok(output)
}

/// Unwrap `wrapped` under `kek`, verifying the integrity check value.
///
/// # Errors
///
/// - [`JweError::InvalidKeySize`] if `kek` is not `kek_len` bytes.
/// - [`JweError::Unwrap`] if the wrapped key is malformed, was produced under
///   a different KEK, or has been tampered with.
pub fn unwrap(kek: &[u8], kek_len: usize, wrapped: &[u8]) -> Result<Vec<u8>, JweError> {
    let kek = Kek::new(kek, kek_len)?;
    if wrapped.len() < 16 + ICV_LEN || wrapped.len() % 8 != 0 {
        return Err(JweError::Unwrap);
    }
    let mut output = vec![0u8; wrapped.len() - ICV_LEN];
    if kek.unwrap(wrapped, &mut output).is_err() {
        output.iter_mut().for_each(|b| *b = 0);
        return Err(JweError::Unwrap);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn h(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    #[test]
    fn rfc3394_4_1_wrap_128_with_128() {
        let kek = h("000102030405060708090A0B0C0D0E0F");
        let data = h("00112233445566778899AABBCCDDEEFF");
        let wrapped = wrap(&kek, 16, &data).unwrap();
        assert_eq!(
            wrapped,
            h("1FA68B0A8112B447AEF34BD8FB5A7B829D3E862371D2CFE5")
        );
        assert_eq!(unwrap(&kek, 16, &wrapped).unwrap(), data);
    }

    #[test]
    fn rfc3394_4_6_wrap_256_with_256() {
        let kek = h("000102030405060708090A0B0C0D0E0F101112131415161718191A1B1C1D1E1F");
        let data = h("00112233445566778899AABBCCDDEEFF000102030405060708090A0B0C0D0E0F");
        let wrapped = wrap(&kek, 32, &data).unwrap();
        assert_eq!(
            wrapped,
            h("28C9F404C4B810F4CBCCB35CFB87F8263F5786E2D80ED326CBC7F0E71A99F43BFB988B9B7A02DD21")
        );
    }

    #[test]
    fn wrap_192_round_trip() {
        let kek = [0x42u8; 24];
        let cek = [0xABu8; 48];
        let wrapped = wrap(&kek, 24, &cek).unwrap();
        assert_eq!(wrapped.len(), 56);
        assert_eq!(unwrap(&kek, 24, &wrapped).unwrap(), cek);
    }

    #[test]
    fn wrong_kek_fails() {
        let wrapped = wrap(&[0x42u8; 32], 32, &[0xABu8; 32]).unwrap();
        assert_matches!(unwrap(&[0x43u8; 32], 32, &wrapped), Err(JweError::Unwrap));
    }

    #[test]
    fn tampering_detected() {
        let kek = [0x42u8; 16];
        let mut wrapped = wrap(&kek, 16, &[0xABu8; 32]).unwrap();
        wrapped[9] ^= 0x10;
        assert_matches!(unwrap(&kek, 16, &wrapped), Err(JweError::Unwrap));
    }

    #[test]
    fn kek_size_enforced() {
        assert_matches!(
            wrap(&[0u8; 16], 32, &[0u8; 32]),
            Err(JweError::InvalidKeySize { expected: 32, actual: 16 })
        );
        assert_matches!(
            unwrap(&[0u8; 32], 16, &[0u8; 40]),
            Err(JweError::InvalidKeySize { expected: 16, actual: 32 })
        );
    }

    #[test]
    fn malformed_wrapped_length_is_unwrap_failure() {
        assert_matches!(unwrap(&[0u8; 16], 16, &[0u8; 20]), Err(JweError::Unwrap));
        assert_matches!(unwrap(&[0u8; 16], 16, &[0u8; 16]), Err(JweError::Unwrap));
    }
}
