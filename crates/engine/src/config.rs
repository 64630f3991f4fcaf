//! Engine policy: permitted algorithms and token limits.
//!
//! Values are read from `JWE_`-prefixed environment variables. Every field has
//! a default, so an empty environment yields a policy that permits all
//! supported algorithms.

use anyhow::{Context, Result};
use common::{ContentEncryptionAlg, JweError, KeyManagementAlg};
use serde::Deserialize;

const ENV_PREFIX: &str = "JWE";

/// Validated engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Key management algorithms accepted on encrypt and decrypt.
    #[serde(default = "default_allowed_key_management")]
    pub allowed_key_management: Vec<KeyManagementAlg>,

    /// Content encryption algorithms accepted on encrypt and decrypt.
    #[serde(default = "default_allowed_content_encryption")]
    pub allowed_content_encryption: Vec<ContentEncryptionAlg>,

    /// Longest compact token `decrypt` will look at, in bytes.
    #[serde(default = "default_max_token_length")]
    pub max_token_length: usize,

    /// Level handed to [`crate::telemetry::init_tracing`] (e.g. `"info"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_allowed_key_management() -> Vec<KeyManagementAlg> {
    KeyManagementAlg::ALL.to_vec()
}
fn default_allowed_content_encryption() -> Vec<ContentEncryptionAlg> {
    ContentEncryptionAlg::ALL.to_vec()
}
fn default_max_token_length() -> usize {
    1024 * 1024
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allowed_key_management: default_allowed_key_management(),
            allowed_content_encryption: default_allowed_content_encryption(),
            max_token_length: default_max_token_length(),
            log_level: default_log_level(),
        }
    }
}

impl EngineConfig {
    /// Load and validate configuration from environment variables.
    ///
    /// | Variable                          | Default  |
    /// |-----------------------------------|----------|
    /// | `JWE_ALLOWED_KEY_MANAGEMENT`      | all      |
    /// | `JWE_ALLOWED_CONTENT_ENCRYPTION`  | all      |
    /// | `JWE_MAX_TOKEN_LENGTH`            | 1048576  |
    /// | `JWE_LOG_LEVEL`                   | `info`   |
    ///
    /// Allow-lists are comma separated, e.g. `A256KW,A256GCMKW`.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed, names an unknown
    /// algorithm, or fails validation.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    fn load(source: Option<config::Map<String, String>>) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("allowed_key_management")
                    .with_list_parse_key("allowed_content_encryption")
                    .source(source),
            )
            .build()
            .context("failed to build configuration from environment")?;

        let c: EngineConfig = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    pub fn validate(&self) -> Result<()> {
        if self.allowed_key_management.is_empty() {
            anyhow::bail!("JWE_ALLOWED_KEY_MANAGEMENT must name at least one algorithm");
        }
        if self.allowed_content_encryption.is_empty() {
            anyhow::bail!("JWE_ALLOWED_CONTENT_ENCRYPTION must name at least one algorithm");
        }
        if self.max_token_length == 0 {
            anyhow::bail!("JWE_MAX_TOKEN_LENGTH must be > 0");
        }
        if self.log_level.trim().is_empty() {
            anyhow::bail!("JWE_LOG_LEVEL must not be empty");
        }
        Ok(())
    }

    /// Check an `(alg, enc)` pair against the allow-lists.
    ///
    /// # Errors
    ///
    /// Returns [`JweError::UnsupportedAlgorithm`] naming the refused identifier.
    pub fn check_policy(
        &self,
        alg: KeyManagementAlg,
        enc: ContentEncryptionAlg,
    ) -> Result<(), JweError> {
        if !self.allowed_key_management.contains(&alg) {
            return Err(JweError::UnsupportedAlgorithm(format!(
                "alg {alg} is not permitted"
            )));
        }
        if !self.allowed_content_encryption.contains(&enc) {
            return Err(JweError::UnsupportedAlgorithm(format!(
                "enc {enc} is not permitted"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> config::Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_allowed_key_management().len(), 7);
        assert_eq!(default_allowed_content_encryption().len(), 6);
        assert_eq!(default_max_token_length(), 1_048_576);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let cfg = EngineConfig::load(Some(env(&[]))).unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn allow_lists_parsed_from_comma_list() {
        let cfg = EngineConfig::load(Some(env(&[
            ("JWE_ALLOWED_KEY_MANAGEMENT", "A256KW,A256GCMKW"),
            ("JWE_ALLOWED_CONTENT_ENCRYPTION", "A256GCM"),
            ("JWE_MAX_TOKEN_LENGTH", "4096"),
            ("JWE_LOG_LEVEL", "debug"),
        ])))
        .unwrap();
        assert_eq!(
            cfg.allowed_key_management,
            vec![KeyManagementAlg::A256Kw, KeyManagementAlg::A256GcmKw]
        );
        assert_eq!(
            cfg.allowed_content_encryption,
            vec![ContentEncryptionAlg::A256Gcm]
        );
        assert_eq!(cfg.max_token_length, 4096);
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn unknown_algorithm_rejected() {
        assert!(EngineConfig::load(Some(env(&[("JWE_ALLOWED_KEY_MANAGEMENT", "RSA1_5")]))).is_err());
    }

    #[test]
    fn validate_rejects_zero_length_limit() {
        let cfg = EngineConfig {
            max_token_length: 0,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_allow_list() {
        let cfg = EngineConfig {
            allowed_content_encryption: Vec::new(),
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn policy_names_refused_identifier() {
        let cfg = EngineConfig {
            allowed_key_management: vec![KeyManagementAlg::A256Kw],
            allowed_content_encryption: vec![ContentEncryptionAlg::A256Gcm],
            ..EngineConfig::default()
        };
        assert!(cfg
            .check_policy(KeyManagementAlg::A256Kw, ContentEncryptionAlg::A256Gcm)
            .is_ok());
        assert_matches!(
            cfg.check_policy(KeyManagementAlg::Direct, ContentEncryptionAlg::A256Gcm),
            Err(JweError::UnsupportedAlgorithm(msg)) if msg.contains("dir")
        );
        assert_matches!(
            cfg.check_policy(KeyManagementAlg::A256Kw, ContentEncryptionAlg::A128Gcm),
            Err(JweError::UnsupportedAlgorithm(msg)) if msg.contains("A128GCM")
        );
    }
}
