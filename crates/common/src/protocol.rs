//! Algorithm identifiers and their fixed size tables.
//!
//! Identifier strings are the registered JOSE names and appear verbatim in the
//! `alg` and `enc` header parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::JweError;

// ---------------------------------------------------------------------------
// Key management
// ---------------------------------------------------------------------------

/// Key management algorithm (`alg` header parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyManagementAlg {
    /// Direct use of a shared symmetric key as the CEK.
    #[serde(rename = "dir")]
    Direct,
    #[serde(rename = "A128KW")]
    A128Kw,
    #[serde(rename = "A192KW")]
    A192Kw,
    #[serde(rename = "A256KW")]
    A256Kw,
    #[serde(rename = "A128GCMKW")]
    A128GcmKw,
    #[serde(rename = "A192GCMKW")]
    A192GcmKw,
    #[serde(rename = "A256GCMKW")]
    A256GcmKw,
}

impl KeyManagementAlg {
    /// All supported key management algorithms.
    pub const ALL: [KeyManagementAlg; 7] = [
        KeyManagementAlg::Direct,
        KeyManagementAlg::A128Kw,
        KeyManagementAlg::A192Kw,
        KeyManagementAlg::A256Kw,
        KeyManagementAlg::A128GcmKw,
        KeyManagementAlg::A192GcmKw,
        KeyManagementAlg::A256GcmKw,
    ];

    /// The registered `alg` header value.
    pub fn name(self) -> &'static str {
        match self {
            KeyManagementAlg::Direct => "dir",
            KeyManagementAlg::A128Kw => "A128KW",
            KeyManagementAlg::A192Kw => "A192KW",
            KeyManagementAlg::A256Kw => "A256KW",
            KeyManagementAlg::A128GcmKw => "A128GCMKW",
            KeyManagementAlg::A192GcmKw => "A192GCMKW",
            KeyManagementAlg::A256GcmKw => "A256GCMKW",
        }
    }

    /// Size of the key-encryption key, or `None` for [`KeyManagementAlg::Direct`]
    /// (whose key size is set by the content encryption algorithm instead).
    pub fn kek_len(self) -> Option<usize> {
        match self {
            KeyManagementAlg::Direct => None,
            KeyManagementAlg::A128Kw | KeyManagementAlg::A128GcmKw => Some(16),
            KeyManagementAlg::A192Kw | KeyManagementAlg::A192GcmKw => Some(24),
            KeyManagementAlg::A256Kw | KeyManagementAlg::A256GcmKw => Some(32),
        }
    }

    /// Size the caller-supplied key must have when combined with `enc`.
    pub fn required_key_len(self, enc: ContentEncryptionAlg) -> usize {
        self.kek_len().unwrap_or_else(|| enc.cek_len())
    }
}

impl fmt::Display for KeyManagementAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyManagementAlg {
    type Err = JweError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyManagementAlg::ALL
            .into_iter()
            .find(|alg| alg.name() == s)
            .ok_or_else(|| JweError::UnsupportedAlgorithm(format!("alg {s}")))
    }
}

// ---------------------------------------------------------------------------
// Content encryption
// ---------------------------------------------------------------------------

/// Content encryption algorithm (`enc` header parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentEncryptionAlg {
    #[serde(rename = "A128CBC-HS256")]
    A128CbcHs256,
    #[serde(rename = "A192CBC-HS384")]
    A192CbcHs384,
    #[serde(rename = "A256CBC-HS512")]
    A256CbcHs512,
    #[serde(rename = "A128GCM")]
    A128Gcm,
    #[serde(rename = "A192GCM")]
    A192Gcm,
    #[serde(rename = "A256GCM")]
    A256Gcm,
}

impl ContentEncryptionAlg {
    /// All supported content encryption algorithms.
    pub const ALL: [ContentEncryptionAlg; 6] = [
        ContentEncryptionAlg::A128CbcHs256,
        ContentEncryptionAlg::A192CbcHs384,
        ContentEncryptionAlg::A256CbcHs512,
        ContentEncryptionAlg::A128Gcm,
        ContentEncryptionAlg::A192Gcm,
        ContentEncryptionAlg::A256Gcm,
    ];

    /// The registered `enc` header value.
    pub fn name(self) -> &'static str {
        match self {
            ContentEncryptionAlg::A128CbcHs256 => "A128CBC-HS256",
            ContentEncryptionAlg::A192CbcHs384 => "A192CBC-HS384",
            ContentEncryptionAlg::A256CbcHs512 => "A256CBC-HS512",
            ContentEncryptionAlg::A128Gcm => "A128GCM",
            ContentEncryptionAlg::A192Gcm => "A192GCM",
            ContentEncryptionAlg::A256Gcm => "A256GCM",
        }
    }

    /// Returns `true` for the AES-CBC + HMAC-SHA2 composite family.
    pub fn is_cbc_hmac(self) -> bool {
        matches!(
            self,
            ContentEncryptionAlg::A128CbcHs256
                | ContentEncryptionAlg::A192CbcHs384
                | ContentEncryptionAlg::A256CbcHs512
        )
    }

    /// CEK size in bytes. For CBC-HMAC this covers both the MAC and the
    /// encryption halves.
    pub fn cek_len(self) -> usize {
        match self {
            ContentEncryptionAlg::A128CbcHs256 => 32,
            ContentEncryptionAlg::A192CbcHs384 => 48,
            ContentEncryptionAlg::A256CbcHs512 => 64,
            ContentEncryptionAlg::A128Gcm => 16,
            ContentEncryptionAlg::A192Gcm => 24,
            ContentEncryptionAlg::A256Gcm => 32,
        }
    }

    /// IV size in bytes.
    pub fn iv_len(self) -> usize {
        if self.is_cbc_hmac() {
            16
        } else {
            12
        }
    }

    /// Authentication tag size in bytes.
    pub fn tag_len(self) -> usize {
        match self {
            ContentEncryptionAlg::A128CbcHs256 => 16,
            ContentEncryptionAlg::A192CbcHs384 => 24,
            ContentEncryptionAlg::A256CbcHs512 => 32,
            ContentEncryptionAlg::A128Gcm
            | ContentEncryptionAlg::A192Gcm
            | ContentEncryptionAlg::A256Gcm => 16,
        }
    }
}

impl fmt::Display for ContentEncryptionAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContentEncryptionAlg {
    type Err = JweError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentEncryptionAlg::ALL
            .into_iter()
            .find(|enc| enc.name() == s)
            .ok_or_else(|| JweError::UnsupportedAlgorithm(format!("enc {s}")))
    }
}

// ---------------------------------------------------------------------------
// Algorithm pair
// ---------------------------------------------------------------------------

/// The `(alg, enc)` combination used for one encryption.
///
/// Every key management algorithm may be combined with every content
/// encryption algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Algorithms {
    /// Key management algorithm.
    pub alg: KeyManagementAlg,
    /// Content encryption algorithm.
    pub enc: ContentEncryptionAlg,
}

impl Algorithms {
    /// Construct an [`Algorithms`] pair.
    pub fn new(alg: KeyManagementAlg, enc: ContentEncryptionAlg) -> Self {
        Self { alg, enc }
    }

    /// Every supported combination, `alg`-major.
    pub fn all() -> impl Iterator<Item = Algorithms> {
        KeyManagementAlg::ALL.into_iter().flat_map(|alg| {
            ContentEncryptionAlg::ALL
                .into_iter()
                .map(move |enc| Algorithms::new(alg, enc))
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for alg in KeyManagementAlg::ALL {
            assert_eq!(alg.name().parse::<KeyManagementAlg>().unwrap(), alg);
        }
        for enc in ContentEncryptionAlg::ALL {
            assert_eq!(enc.name().parse::<ContentEncryptionAlg>().unwrap(), enc);
        }
    }

    #[test]
    fn unknown_identifiers_rejected() {
        assert_matches!(
            "RSA-OAEP".parse::<KeyManagementAlg>(),
            Err(JweError::UnsupportedAlgorithm(_))
        );
        assert_matches!(
            "a256gcm".parse::<ContentEncryptionAlg>(),
            Err(JweError::UnsupportedAlgorithm(_))
        );
    }

    #[test]
    fn serde_uses_registered_names() {
        let json = serde_json::to_string(&KeyManagementAlg::A256GcmKw).unwrap();
        assert_eq!(json, "\"A256GCMKW\"");
        let enc: ContentEncryptionAlg = serde_json::from_str("\"A128CBC-HS256\"").unwrap();
        assert_eq!(enc, ContentEncryptionAlg::A128CbcHs256);
    }

    #[test]
    fn size_tables() {
        assert_eq!(ContentEncryptionAlg::A256CbcHs512.cek_len(), 64);
        assert_eq!(ContentEncryptionAlg::A256CbcHs512.tag_len(), 32);
        assert_eq!(ContentEncryptionAlg::A128CbcHs256.iv_len(), 16);
        assert_eq!(ContentEncryptionAlg::A256Gcm.iv_len(), 12);
        assert_eq!(ContentEncryptionAlg::A192Gcm.cek_len(), 24);
        assert_eq!(KeyManagementAlg::A256Kw.kek_len(), Some(32));
        assert_eq!(KeyManagementAlg::Direct.kek_len(), None);
    }

    #[test]
    fn direct_key_len_follows_enc() {
        assert_eq!(
            KeyManagementAlg::Direct.required_key_len(ContentEncryptionAlg::A128CbcHs256),
            32
        );
        assert_eq!(
            KeyManagementAlg::A128GcmKw.required_key_len(ContentEncryptionAlg::A256CbcHs512),
            16
        );
    }

    #[test]
    fn all_pairs_enumerated() {
        assert_eq!(Algorithms::all().count(), 42);
    }
}
