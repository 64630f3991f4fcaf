//! [`SecretKey`]: owned symmetric key material that is wiped on drop.

use common::JweError;

use crate::crypto::random_bytes;

/// Raw symmetric key bytes: a caller's shared key, a KEK, or a CEK.
///
/// When this type is dropped, the memory is overwritten with zeroes to
/// minimise the window during which plaintext key material lives in RAM.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Wrap existing key bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decode a hex string (either case, no separators) into key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`JweError::Encoding`] if the string is not valid hex.
    pub fn from_hex(hex_key: &str) -> Result<Self, JweError> {
        hex::decode(hex_key.trim())
            .map(Self)
            .map_err(|e| JweError::Encoding(format!("invalid hex key: {e}")))
    }

    /// Borrow the key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the key has no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lower-case hex rendering, for handing generated keys to a human.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl AsRef<[u8]> for SecretKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, even in debug builds.
        write!(f, "SecretKey({} bytes, [REDACTED])", self.0.len())
    }
}

/// Generate `byte_len` bytes of key material from the OS CSPRNG.
pub fn generate_key(byte_len: usize) -> SecretKey {
    SecretKey(random_bytes(byte_len))
}

/// Parse hex-encoded key material, as used for fixed test vectors.
///
/// # Errors
///
/// Returns [`JweError::Encoding`] if the string is not valid hex.
pub fn parse_key_from_hex(hex_key: &str) -> Result<SecretKey, JweError> {
    SecretKey::from_hex(hex_key)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn generated_keys_have_requested_length_and_differ() {
        let a = generate_key(32);
        let b = generate_key(32);
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn hex_parse() {
        let key = parse_key_from_hex("009c1934ee05fd0c655d2604bfe94fd0").unwrap();
        assert_eq!(key.len(), 16);
        assert_eq!(key.as_bytes()[0], 0x00);
        assert_eq!(key.as_bytes()[1], 0x9c);
        assert_eq!(key.to_hex(), "009c1934ee05fd0c655d2604bfe94fd0");
    }

    #[test]
    fn hex_parse_accepts_upper_case() {
        let key = parse_key_from_hex("ABCDEF").unwrap();
        assert_eq!(key.as_bytes(), &[0xab, 0xcd, 0xef]);
    }

    #[test]
    fn hex_parse_rejects_garbage() {
        assert_matches!(parse_key_from_hex("zz"), Err(JweError::Encoding(_)));
        assert_matches!(parse_key_from_hex("abc"), Err(JweError::Encoding(_)));
    }

    #[test]
    fn secret_key_redacted_in_debug() {
        let key = SecretKey::from_bytes(vec![0xFF; 16]);
        let rendered = format!("{key:?}");
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("255"));
        assert!(!rendered.to_lowercase().contains("ff"));
    }
}
