//! Seal/unseal configuration.
//!
//! `Options` is built once and handed to a [`Sealer`](crate::Sealer); nothing
//! in the pipelines mutates it. It can be assembled in code, starting from
//! `Options::default()`, or loaded from a JSON document whose keys follow the
//! camelCase names of the wire protocol's reference configuration
//! (`saltBits`, `minPasswordLength`, `timestampSkewSec`, ...). Missing
//! top-level keys fall back to the defaults.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SealError};

fn default_iterations() -> u32 {
    1
}

fn default_min_password_length() -> usize {
    32
}

fn default_salt_bits() -> Option<u32> {
    Some(256)
}

/// Key derivation settings for one half of the protocol (encryption or
/// integrity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyOptions {
    /// Cipher name for encryption (`aes-256-cbc`, `aes-128-ctr`) or digest
    /// name for integrity (`sha256`).
    pub algorithm: String,

    /// PBKDF2 rounds. Must be positive.
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Minimum password length in bytes.
    #[serde(default = "default_min_password_length", alias = "minPasswordlength")]
    pub min_password_length: usize,

    /// Explicit salt, used verbatim. Takes precedence over `salt_bits`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,

    /// Size of a freshly generated random salt, in bits.
    #[serde(default = "default_salt_bits", skip_serializing_if = "Option::is_none")]
    pub salt_bits: Option<u32>,

    /// Explicit IV. Only set internally when reopening a token.
    #[serde(skip)]
    pub iv: Option<Vec<u8>>,
}

impl KeyOptions {
    /// Defaults for the encryption half: AES-256-CBC, 256-bit salt.
    pub fn encryption() -> Self {
        Self::with_algorithm("aes-256-cbc")
    }

    /// Defaults for the integrity half: HMAC-SHA256, 256-bit salt.
    pub fn integrity() -> Self {
        Self::with_algorithm("sha256")
    }

    fn with_algorithm(algorithm: &str) -> Self {
        Self {
            algorithm: algorithm.to_string(),
            iterations: default_iterations(),
            min_password_length: default_min_password_length(),
            salt: None,
            salt_bits: default_salt_bits(),
            iv: None,
        }
    }

    /// A copy of these options pinned to the salt (and IV) a token carries.
    pub(crate) fn reopen(&self, salt: &str, iv: Option<Vec<u8>>) -> Self {
        Self {
            salt: Some(salt.to_string()),
            iv,
            ..self.clone()
        }
    }
}

/// Full configuration for sealing and unsealing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    pub encryption: KeyOptions,
    pub integrity: KeyOptions,
    /// Token lifetime in milliseconds. 0 means the token never expires.
    pub ttl: u64,
    /// Permitted clock skew, in seconds, when checking expiration.
    pub timestamp_skew_sec: u64,
    /// Correction applied to the local clock, in milliseconds.
    pub localtime_offset_msec: i64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            encryption: KeyOptions::encryption(),
            integrity: KeyOptions::integrity(),
            ttl: 0,
            timestamp_skew_sec: 60,
            localtime_offset_msec: 0,
        }
    }
}

impl Options {
    /// Parse options from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SealError::Validation(format!("Bad options: {e}")))
    }

    pub fn with_ttl(mut self, ttl_msec: u64) -> Self {
        self.ttl = ttl_msec;
        self
    }

    pub fn with_timestamp_skew_sec(mut self, skew_sec: u64) -> Self {
        self.timestamp_skew_sec = skew_sec;
        self
    }

    pub fn with_localtime_offset_msec(mut self, offset_msec: i64) -> Self {
        self.localtime_offset_msec = offset_msec;
        self
    }
}
