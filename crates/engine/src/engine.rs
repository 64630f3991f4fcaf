//! JWE encrypt/decrypt orchestration.
//!
//! # Encrypt
//!
//! policy → CEK derivation → header (+ key wrap `iv`/`tag`) → content
//! encryption with the encoded header as AAD → compact encoding.
//!
//! # Decrypt
//!
//! Checks run in a fixed order and the first failure is returned:
//!
//! 1. token length limit
//! 2. segment count
//! 3. Base64URL of every segment
//! 4. header JSON and required fields
//! 5. algorithm support and policy
//! 6. key size
//! 7. CEK recovery
//! 8. content authentication (tag, then CBC padding)
//! 9. UTF-8 (string payloads only)
//!
//! A CEK that cannot be unwrapped is replaced with a random one so that a
//! wrong key, a tampered encrypted key and a tampered ciphertext all surface
//! as [`JweError::Authentication`].

use common::{Algorithms, JweError};
use tracing::debug;

use crate::codec;
use crate::config::EngineConfig;
use crate::crypto;
use crate::header::Header;
use crate::key::generate_key;
use crate::keymgmt;

/// Optional header parameters for [`JweEngine::encrypt_with_options`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptOptions {
    /// `kid` header parameter.
    pub kid: Option<String>,
    /// `typ` header parameter.
    pub typ: Option<String>,
    /// `cty` header parameter.
    pub cty: Option<String>,
}

/// Stateless JWE engine bound to an algorithm policy.
///
/// Holds no key material; one instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct JweEngine {
    config: EngineConfig,
}

impl JweEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Encrypt a UTF-8 payload into a compact token.
    ///
    /// # Errors
    ///
    /// - [`JweError::UnsupportedAlgorithm`] if `algs` is outside the policy.
    /// - [`JweError::InvalidKeySize`] if `key` does not fit `algs`.
    pub fn encrypt(&self, algs: Algorithms, key: &[u8], payload: &str) -> Result<String, JweError> {
        self.encrypt_with_options(algs, key, payload.as_bytes(), &EncryptOptions::default())
    }

    /// Encrypt an arbitrary byte payload into a compact token.
    ///
    /// # Errors
    ///
    /// As for [`JweEngine::encrypt`].
    pub fn encrypt_bytes(
        &self,
        algs: Algorithms,
        key: &[u8],
        payload: &[u8],
    ) -> Result<String, JweError> {
        self.encrypt_with_options(algs, key, payload, &EncryptOptions::default())
    }

    /// Encrypt with extra `kid`/`typ`/`cty` header parameters.
    ///
    /// # Errors
    ///
    /// As for [`JweEngine::encrypt`].
    pub fn encrypt_with_options(
        &self,
        algs: Algorithms,
        key: &[u8],
        payload: &[u8],
        options: &EncryptOptions,
    ) -> Result<String, JweError> {
        match self.seal(algs, key, payload, options) {
            Ok(token) => {
                debug!(alg = %algs.alg, enc = %algs.enc, "token encrypted");
                Ok(token)
            }
            Err(e) => {
                debug!(alg = %algs.alg, enc = %algs.enc, error = e.code(), "encryption refused");
                Err(e)
            }
        }
    }

    /// Decrypt a compact token whose payload is UTF-8 text.
    ///
    /// # Errors
    ///
    /// The first failing check in the decrypt order; [`JweError::Encoding`] if
    /// the authenticated payload is not UTF-8.
    pub fn decrypt(&self, key: &[u8], token: &str) -> Result<String, JweError> {
        let plaintext = self.decrypt_bytes(key, token)?;
        String::from_utf8(plaintext).map_err(|_| {
            debug!(error = "encoding", "decrypted payload is not UTF-8");
            JweError::Encoding("payload is not valid UTF-8".into())
        })
    }

    /// Decrypt a compact token, returning the raw payload bytes.
    ///
    /// # Errors
    ///
    /// The first failing check in the decrypt order.
    pub fn decrypt_bytes(&self, key: &[u8], token: &str) -> Result<Vec<u8>, JweError> {
        match self.open(key, token) {
            Ok((header, plaintext)) => {
                debug!(alg = %header.alg, enc = %header.enc, "token decrypted");
                Ok(plaintext)
            }
            Err(e) => {
                debug!(error = e.code(), "token rejected");
                Err(e)
            }
        }
    }

    /// Parse and validate a token's protected header without any key.
    ///
    /// # Errors
    ///
    /// Any structural failure (decrypt steps 1–5).
    pub fn inspect(&self, token: &str) -> Result<Header, JweError> {
        let (_, header) = self.parse_structure(token)?;
        Ok(header)
    }

    fn seal(
        &self,
        algs: Algorithms,
        key: &[u8],
        payload: &[u8],
        options: &EncryptOptions,
    ) -> Result<String, JweError> {
        let Algorithms { alg, enc } = algs;
        self.config.check_policy(alg, enc)?;

        let material = keymgmt::derive_cek_for_encryption(alg, enc, key)?;

        let mut header = Header::new(alg, enc).with_wrap_params(&material.params);
        header.kid = options.kid.clone();
        header.typ = options.typ.clone();
        header.cty = options.cty.clone();
        let header_json = header.to_json()?;
        let aad = codec::b64u_encode(&header_json);

        let content = crypto::encrypt(enc, material.cek.as_bytes(), aad.as_bytes(), payload)?;

        Ok(codec::encode(
            &header_json,
            &material.encrypted_key,
            &content.iv,
            &content.ciphertext,
            &content.tag,
        ))
    }

    fn parse_structure<'t>(
        &self,
        token: &'t str,
    ) -> Result<(codec::DecodedToken<'t>, Header), JweError> {
        if token.len() > self.config.max_token_length {
            return Err(JweError::MalformedToken(format!(
                "token exceeds {} bytes",
                self.config.max_token_length
            )));
        }
        let decoded = codec::decode(token)?;
        let header = Header::parse(&decoded.header)?;
        self.config.check_policy(header.alg, header.enc)?;
        Ok((decoded, header))
    }

    fn open(&self, key: &[u8], token: &str) -> Result<(Header, Vec<u8>), JweError> {
        let (decoded, header) = self.parse_structure(token)?;
        let params = header.wrap_params()?;
        keymgmt::check_key_size(header.alg, header.enc, key)?;

        let cek = match keymgmt::recover_cek(
            header.alg,
            header.enc,
            key,
            &decoded.encrypted_key,
            &params,
        ) {
            Ok(cek) => cek,
            Err(JweError::Unwrap) => {
                debug!(alg = %header.alg, "key unwrap failed; continuing with random CEK");
                generate_key(header.enc.cek_len())
            }
            Err(e) => return Err(e),
        };

        let plaintext = crypto::decrypt(
            header.enc,
            cek.as_bytes(),
            decoded.header_segment.as_bytes(),
            &decoded.iv,
            &decoded.ciphertext,
            &decoded.tag,
        )?;
        Ok((header, plaintext))
    }
}
