//! The JWE protected header.
//!
//! The header serializes to compact JSON with a single fixed key order:
//!
//! ```text
//! alg, enc, kid, typ, cty, iv, tag
//! ```
//!
//! Optional fields are omitted when absent. The Base64URL encoding of that
//! JSON is the AAD for content encryption. On decrypt the received segment
//! is used as-is, never a re-serialization.

use common::{ContentEncryptionAlg, JweError, KeyManagementAlg};
use serde::{Deserialize, Serialize};

use crate::codec::{b64u_decode, b64u_encode};
use crate::keymgmt::WrapParams;

/// Typed protected header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Key management algorithm.
    pub alg: KeyManagementAlg,
    /// Content encryption algorithm.
    pub enc: ContentEncryptionAlg,
    /// Key identifier hint for the recipient.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Media type of the complete JWE.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    /// Media type of the secured payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cty: Option<String>,
    /// Base64URL GCM key wrap IV.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iv: Option<String>,
    /// Base64URL GCM key wrap tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Header as received, before identifiers are validated.
#[derive(Deserialize)]
struct RawHeader {
    alg: Option<String>,
    enc: Option<String>,
    kid: Option<String>,
    typ: Option<String>,
    cty: Option<String>,
    iv: Option<String>,
    tag: Option<String>,
    zip: Option<String>,
    crit: Option<serde_json::Value>,
}

impl Header {
    /// A header carrying only `alg` and `enc`.
    pub fn new(alg: KeyManagementAlg, enc: ContentEncryptionAlg) -> Self {
        Self {
            alg,
            enc,
            kid: None,
            typ: None,
            cty: None,
            iv: None,
            tag: None,
        }
    }

    /// Attach the key management outputs (`iv`, `tag`) to the header.
    pub fn with_wrap_params(mut self, params: &WrapParams) -> Self {
        self.iv = params.iv.as_ref().map(b64u_encode);
        self.tag = params.tag.as_ref().map(b64u_encode);
        self
    }

    /// Canonical compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`JweError::Encoding`] if serialization fails.
    pub fn to_json(&self) -> Result<Vec<u8>, JweError> {
        serde_json::to_vec(self)
            .map_err(|e| JweError::Encoding(format!("header serialization failed: {e}")))
    }

    /// Base64URL of [`Header::to_json`]: the first token segment and the AAD.
    ///
    /// # Errors
    ///
    /// Returns [`JweError::Encoding`] if serialization fails.
    pub fn to_segment(&self) -> Result<String, JweError> {
        Ok(b64u_encode(self.to_json()?))
    }

    /// Parse untrusted header JSON.
    ///
    /// # Errors
    ///
    /// - [`JweError::MalformedToken`] if the bytes are not a JSON object,
    ///   `alg`/`enc` is missing, or a `crit` parameter is present.
    /// - [`JweError::UnsupportedAlgorithm`] for unknown identifiers or a `zip`
    ///   parameter.
    pub fn parse(bytes: &[u8]) -> Result<Self, JweError> {
        let raw: RawHeader = serde_json::from_slice(bytes)
            .map_err(|e| JweError::MalformedToken(format!("invalid protected header: {e}")))?;

        // No extensions are understood, so any critical one must be refused.
        if raw.crit.is_some() {
            return Err(JweError::MalformedToken(
                "unsupported critical header parameters".into(),
            ));
        }
        let alg = raw
            .alg
            .ok_or_else(|| JweError::MalformedToken("protected header has no alg".into()))?;
        let enc = raw
            .enc
            .ok_or_else(|| JweError::MalformedToken("protected header has no enc".into()))?;
        let alg = alg.parse::<KeyManagementAlg>()?;
        let enc = enc.parse::<ContentEncryptionAlg>()?;
        if let Some(zip) = raw.zip {
            return Err(JweError::UnsupportedAlgorithm(format!("zip {zip}")));
        }

        Ok(Self {
            alg,
            enc,
            kid: raw.kid,
            typ: raw.typ,
            cty: raw.cty,
            iv: raw.iv,
            tag: raw.tag,
        })
    }

    /// Decode the `iv`/`tag` header parameters for key management.
    ///
    /// # Errors
    ///
    /// Returns [`JweError::Encoding`] if either is not valid Base64URL.
    pub fn wrap_params(&self) -> Result<WrapParams, JweError> {
        Ok(WrapParams {
            iv: self
                .iv
                .as_deref()
                .map(|s| b64u_decode(s, "iv header parameter"))
                .transpose()?,
            tag: self
                .tag
                .as_deref()
                .map(|s| b64u_decode(s, "tag header parameter"))
                .transpose()?,
        })
    }
}
