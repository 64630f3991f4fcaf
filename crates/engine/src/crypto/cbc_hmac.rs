//! AES-CBC + HMAC-SHA2 composite (Encrypt-then-MAC), per RFC 7518 §5.2.
//!
//! The CEK is split in half: the first half keys the HMAC, the second half
//! keys AES-CBC. The MAC input is
//!
//! ```text
//! AAD || IV || ciphertext || AL
//! ```
//!
//! where `AL` is the AAD length in bits as a 64-bit big-endian integer. The
//! tag is the leftmost half of the MAC output.

use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use common::{ContentEncryptionAlg, JweError};
use hmac::{digest::KeyInit, Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

use super::{random_bytes, ContentCiphertext};

/// Byte length of a CBC initialisation vector (one AES block).
pub const IV_LEN: usize = 16;

/// Encrypt and authenticate `plaintext`.
///
/// `cek` must already have been checked against `enc.cek_len()`.
pub(super) fn encrypt(
    enc: ContentEncryptionAlg,
    cek: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<ContentCiphertext, JweError> {
    let (mac_key, enc_key) = cek.split_at(cek.len() / 2);
    let iv = random_bytes(IV_LEN);

    let ciphertext = match enc_key.len() {
        16 => cbc::Encryptor::<Aes128>::new_from_slices(enc_key, &iv)
            .map_err(|_| JweError::Encryption)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        24 => cbc::Encryptor::<Aes192>::new_from_slices(enc_key, &iv)
            .map_err(|_| JweError::Encryption)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        32 => cbc::Encryptor::<Aes256>::new_from_slices(enc_key, &iv)
            .map_err(|_| JweError::Encryption)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        actual => {
            return Err(JweError::InvalidKeySize {
                expected: enc.cek_len(),
                actual: actual * 2,
            })
        }
    };

    let tag = compute_tag(enc, mac_key, aad, &iv, &ciphertext)?;
    Ok(ContentCiphertext {
        iv,
        ciphertext,
        tag,
    })
}

/// Verify the tag in constant time, then decrypt and unpad.
///
/// Sizes of `cek`, `iv` and `tag` must already have been checked. Any failure
/// after that point is reported as [`JweError::Authentication`].
pub(super) fn decrypt(
    enc: ContentEncryptionAlg,
    cek: &[u8],
    aad: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, JweError> {
    let (mac_key, enc_key) = cek.split_at(cek.len() / 2);

    verify_tag(enc, mac_key, aad, iv, ciphertext, tag)?;

    let plaintext = match enc_key.len() {
        16 => cbc::Decryptor::<Aes128>::new_from_slices(enc_key, iv)
            .map_err(|_| JweError::Authentication)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        24 => cbc::Decryptor::<Aes192>::new_from_slices(enc_key, iv)
            .map_err(|_| JweError::Authentication)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        32 => cbc::Decryptor::<Aes256>::new_from_slices(enc_key, iv)
            .map_err(|_| JweError::Authentication)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        _ => return Err(JweError::Authentication),
    };
    // Padding is only inspected after the MAC has verified.
    plaintext.map_err(|_| JweError::Authentication)
}

fn compute_tag(
    enc: ContentEncryptionAlg,
    mac_key: &[u8],
    aad: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, JweError> {
    let mac = match enc {
        ContentEncryptionAlg::A128CbcHs256 => {
            mac_over::<Hmac<Sha256>>(mac_key, aad, iv, ciphertext)?
        }
        ContentEncryptionAlg::A192CbcHs384 => {
            mac_over::<Hmac<Sha384>>(mac_key, aad, iv, ciphertext)?
        }
        ContentEncryptionAlg::A256CbcHs512 => {
            mac_over::<Hmac<Sha512>>(mac_key, aad, iv, ciphertext)?
        }
        other => return Err(JweError::UnsupportedAlgorithm(format!("enc {other}"))),
    };
    Ok(mac[..enc.tag_len()].to_vec())
}

fn verify_tag(
    enc: ContentEncryptionAlg,
    mac_key: &[u8],
    aad: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<(), JweError> {
    // `verify_truncated_left` accepts any prefix length, so pin it first.
    if tag.len() != enc.tag_len() {
        return Err(JweError::Authentication);
    }
    let verified = match enc {
        ContentEncryptionAlg::A128CbcHs256 => {
            keyed::<Hmac<Sha256>>(mac_key, aad, iv, ciphertext)?.verify_truncated_left(tag)
        }
        ContentEncryptionAlg::A192CbcHs384 => {
            keyed::<Hmac<Sha384>>(mac_key, aad, iv, ciphertext)?.verify_truncated_left(tag)
        }
        ContentEncryptionAlg::A256CbcHs512 => {
            keyed::<Hmac<Sha512>>(mac_key, aad, iv, ciphertext)?.verify_truncated_left(tag)
        }
        _ => return Err(JweError::Authentication),
    };
    verified.map_err(|_| JweError::Authentication)
}

fn mac_over<M>(
    mac_key: &[u8],
    aad: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, JweError>
where
    M: Mac + KeyInit,
{
    Ok(keyed::<M>(mac_key, aad, iv, ciphertext)?
        .finalize()
        .into_bytes()
        .to_vec())
}

fn keyed<M>(mac_key: &[u8], aad: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<M, JweError>
where
    M: Mac + KeyInit,
{
    // HMAC accepts keys of any length.
    let mut mac = <M as Mac>::new_from_slice(mac_key).map_err(|_| JweError::Authentication)?;
    let aad_bits = (aad.len() as u64) * 8;
    mac.update(aad);
    mac.update(iv);
    mac.update(ciphertext);
    mac.update(&aad_bits.to_be_bytes());
    Ok(mac)
}
