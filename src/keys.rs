//! Key derivation and ownership.
//!
//! This module owns two responsibilities:
//! 1. Resolving algorithm names to their key and IV sizes.
//! 2. Stretching a password into key material with PBKDF2, and holding that
//!    material in a type that is zeroised on drop.
//!
//! ## Derivation structure
//!
//! ```text
//! PBKDF2-HMAC-<digest>(
//!     password   = secret,
//!     salt       = hex salt string (the text itself, not its decoded bytes),
//!     iterations = options.iterations,
//!     length     = algorithm key size
//! )
//! ```
//!
//! The digest is fixed by the protocol version, never by the target cipher
//! or MAC algorithm.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::error::{Result, SealError};
use crate::options::KeyOptions;

// ---------------------------------------------------------------------------
// Algorithms
// ---------------------------------------------------------------------------

/// The named algorithms a key can be derived for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// AES-128 in counter mode. 128-bit key, 128-bit IV.
    Aes128Ctr,
    /// AES-256 in CBC mode with PKCS#7 padding. 256-bit key, 128-bit IV.
    Aes256Cbc,
    /// HMAC-SHA256. 256-bit key, no IV.
    Sha256,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Self::Aes128Ctr => "aes-128-ctr",
            Self::Aes256Cbc => "aes-256-cbc",
            Self::Sha256 => "sha256",
        }
    }

    pub fn key_bits(self) -> usize {
        match self {
            Self::Aes128Ctr => 128,
            Self::Aes256Cbc | Self::Sha256 => 256,
        }
    }

    /// IV size in bits, or `None` for algorithms that take no IV.
    pub fn iv_bits(self) -> Option<usize> {
        match self {
            Self::Aes128Ctr | Self::Aes256Cbc => Some(128),
            Self::Sha256 => None,
        }
    }

    pub fn is_cipher(self) -> bool {
        self.iv_bits().is_some()
    }
}

impl FromStr for Algorithm {
    type Err = SealError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "aes-128-ctr" => Ok(Self::Aes128Ctr),
            "aes-256-cbc" => Ok(Self::Aes256Cbc),
            "sha256" => Ok(Self::Sha256),
            other => Err(SealError::Validation(format!("Unknown algorithm: {other}"))),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The PBKDF2 digest used to stretch passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDerivation {
    Sha1,
    Sha256,
}

impl KeyDerivation {
    fn pbkdf2(self) -> pbkdf2::Algorithm {
        match self {
            Self::Sha1 => pbkdf2::PBKDF2_HMAC_SHA1,
            Self::Sha256 => pbkdf2::PBKDF2_HMAC_SHA256,
        }
    }
}

// ---------------------------------------------------------------------------
// Derived key
// ---------------------------------------------------------------------------

/// Key material derived from a password, plus the salt and IV that go with it.
///
/// - Not `Clone`. Each derived key belongs to one encrypt, decrypt or MAC call.
/// - Key bytes are zeroised on drop.
pub struct DerivedKey {
    algorithm: Algorithm,
    bytes: Zeroizing<Vec<u8>>,
    salt: String,
    iv: Option<Vec<u8>>,
}

impl DerivedKey {
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Borrow the raw key bytes.
    pub fn key(&self) -> &[u8] {
        &self.bytes
    }

    /// The salt the key was derived with, as the hex text that travels in
    /// the token.
    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn iv(&self) -> Option<&[u8]> {
        self.iv.as_deref()
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("algorithm", &self.algorithm)
            .field("key", &"<redacted>")
            .field("salt", &self.salt)
            .field("iv", &self.iv)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Fill a buffer of `len` bytes from the system CSPRNG.
pub(crate) fn random_bytes(len: usize) -> std::result::Result<Vec<u8>, ring::error::Unspecified> {
    let mut buf = vec![0u8; len];
    SystemRandom::new().fill(&mut buf)?;
    Ok(buf)
}

/// Derive a key for `options.algorithm` from `secret`.
///
/// Checks run in a fixed order: empty secret, malformed options, unknown
/// algorithm, short secret, then salt. A salt given in `options` is used
/// verbatim; otherwise `salt_bits / 8` random bytes are hex-encoded. An IV
/// given in `options` is used verbatim; otherwise one is generated when the
/// algorithm takes an IV.
pub fn derive_key(
    secret: &str,
    options: &KeyOptions,
    derivation: KeyDerivation,
) -> Result<DerivedKey> {
    if secret.is_empty() {
        return Err(SealError::validation("Empty password"));
    }

    let iterations =
        NonZeroU32::new(options.iterations).ok_or_else(|| SealError::validation("Bad options"))?;

    let algorithm: Algorithm = options.algorithm.parse()?;

    if secret.len() < options.min_password_length {
        return Err(SealError::Validation(format!(
            "Password string too short (min {} characters required)",
            options.min_password_length
        )));
    }

    let salt = match options.salt.as_deref().filter(|s| !s.is_empty()) {
        Some(salt) => salt.to_string(),
        None => {
            let bits = options
                .salt_bits
                .filter(|&bits| bits > 0)
                .ok_or_else(|| SealError::validation("Missing salt or saltBits options"))?;
            let len = (bits / 8) as usize;
            if len == 0 {
                return Err(SealError::crypto("Failed to generate salt"));
            }
            let random =
                random_bytes(len).map_err(|_| SealError::crypto("Failed to generate salt"))?;
            hex::encode(random)
        }
    };

    let mut bytes = Zeroizing::new(vec![0u8; algorithm.key_bits() / 8]);
    pbkdf2::derive(
        derivation.pbkdf2(),
        iterations,
        salt.as_bytes(),
        secret.as_bytes(),
        &mut bytes,
    );

    let iv = match (&options.iv, algorithm.iv_bits()) {
        (Some(iv), _) => Some(iv.clone()),
        (None, Some(bits)) => {
            Some(random_bytes(bits / 8).map_err(|_| SealError::crypto("Failed to generate IV"))?)
        }
        (None, None) => None,
    };

    Ok(DerivedKey {
        algorithm,
        bytes,
        salt,
        iv,
    })
}
