//! AES-GCM with a detached 128-bit tag.
//!
//! Used both for `A*GCM` content encryption and for `A*GCMKW` key wrapping.
//! The AES variant is selected by key length.

use aes_gcm::{
    aead::{self, consts::U12, AeadInPlace, KeyInit},
    aes::Aes192,
    Aes128Gcm, Aes256Gcm, AesGcm,
};
use common::JweError;

type Aes192Gcm = AesGcm<Aes192, U12>;

/// Byte length of a GCM nonce (96 bits).
pub const IV_LEN: usize = 12;

/// Byte length of a GCM authentication tag (128 bits).
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext`, returning `(ciphertext, tag)`.
///
/// # Errors
///
/// - [`JweError::InvalidKeySize`] unless `key` is 16, 24 or 32 bytes.
/// - [`JweError::InvalidIvSize`] unless `iv` is [`IV_LEN`] bytes.
pub fn seal(
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), JweError> {
    check_iv(iv)?;
    match key.len() {
        16 => seal_with::<Aes128Gcm>(key, iv, aad, plaintext),
        24 => seal_with::<Aes192Gcm>(key, iv, aad, plaintext),
        32 => seal_with::<Aes256Gcm>(key, iv, aad, plaintext),
        actual => Err(JweError::InvalidKeySize {
            expected: 32,
            actual,
        }),
    }
}

/// Verify `tag` and decrypt `ciphertext`.
///
/// No plaintext is returned unless the tag verifies.
///
/// # Errors
///
/// - [`JweError::InvalidKeySize`] / [`JweError::InvalidIvSize`] on size mismatch.
/// - [`JweError::Authentication`] if the tag is the wrong length or does not verify.
pub fn open(
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, JweError> {
    check_iv(iv)?;
    if tag.len() != TAG_LEN {
        return Err(JweError::Authentication);
    }
    match key.len() {
        16 => open_with::<Aes128Gcm>(key, iv, aad, ciphertext, tag),
        24 => open_with::<Aes192Gcm>(key, iv, aad, ciphertext, tag),
        32 => open_with::<Aes256Gcm>(key, iv, aad, ciphertext, tag),
        actual => Err(JweError::InvalidKeySize {
            expected: 32,
            actual,
        }),
    }
}

fn check_iv(iv: &[u8]) -> Result<(), JweError> {
    if iv.len() != IV_LEN {
        return Err(JweError::InvalidIvSize {
            expected: IV_LEN,
            actual: iv.len(),
        });
    }
    Ok(())
}

fn seal_with<C>(
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), JweError>
where
    C: AeadInPlace + KeyInit,
{
    let cipher = C::new_from_slice(key).map_err(|_| JweError::InvalidKeySize {
        expected: 32,
        actual: key.len(),
    })?;
    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(aead::Nonce::<C>::from_slice(iv), aad, &mut buffer)
        .map_err(|_| JweError::Encryption)?;
    Ok((buffer, tag.to_vec()))
}

fn open_with<C>(
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, JweError>
where
    C: AeadInPlace + KeyInit,
{
    let cipher = C::new_from_slice(key).map_err(|_| JweError::InvalidKeySize {
        expected: 32,
        actual: key.len(),
    })?;
    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            aead::Nonce::<C>::from_slice(iv),
            aad,
            &mut buffer,
            aead::Tag::<C>::from_slice(tag),
        )
        .map_err(|_| JweError::Authentication)?;
    Ok(buffer)
}
