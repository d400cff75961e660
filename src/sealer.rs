//! Seal and unseal pipelines.
//!
//! Both pipelines are strictly linear: each step either succeeds or aborts
//! the whole call with a typed error. There is no retry and no partial
//! result.
//!
//! ```text
//! seal:   now -> serialize -> normalize password -> encrypt -> MAC -> join
//! unseal: now -> split -> prefix -> expiration -> resolve password
//!             -> MAC check -> decrypt -> deserialize
//! ```

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};

use crate::codec::{self, SealedParts};
use crate::crypto;
use crate::error::{Result, SealError};
use crate::keys::KeyDerivation;
use crate::mac;
use crate::options::Options;
use crate::password::{self, Password, Passwords};

/// Protocol variants. Each fixes the MAC prefix written into tokens and the
/// PBKDF2 digest used to derive keys. Tokens never verify across variants.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Version {
    /// `Fe26.2`: PBKDF2-HMAC-SHA1.
    #[default]
    V2,
    /// `Fe26.2.1`: PBKDF2-HMAC-SHA256.
    V2_1,
}

impl Version {
    pub fn mac_prefix(self) -> &'static str {
        match self {
            Self::V2 => "Fe26.2",
            Self::V2_1 => "Fe26.2.1",
        }
    }

    pub fn key_derivation(self) -> KeyDerivation {
        match self {
            Self::V2 => KeyDerivation::Sha1,
            Self::V2_1 => KeyDerivation::Sha256,
        }
    }
}

/// Seals values into tokens and unseals them again.
///
/// Holds only immutable configuration, so one instance can be shared freely
/// across threads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sealer {
    options: Options,
    version: Version,
}

impl Sealer {
    pub fn new(options: Options, version: Version) -> Self {
        Self { options, version }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Current epoch milliseconds, corrected by the configured offset.
    fn now_msec(&self) -> i64 {
        Utc::now()
            .timestamp_millis()
            .saturating_add(self.options.localtime_offset_msec)
    }

    /// Serialize, encrypt and sign `value` into a token.
    pub fn seal<T: Serialize + ?Sized>(&self, value: &T, password: &Password) -> Result<String> {
        let now = self.now_msec();

        let serialized = serde_json::to_vec(value)
            .map_err(|e| SealError::Serialization(format!("Failed to stringify object: {e}")))?;

        let password = password::normalize(password)?;
        let password_id = match password.id {
            Some(id) if !password::is_valid_id(id) => {
                return Err(SealError::validation("Invalid password id"));
            }
            Some(id) => id,
            None => "",
        };

        let derivation = self.version.key_derivation();
        let encrypted = crypto::encrypt(
            password.encryption,
            &self.options.encryption,
            derivation,
            &serialized,
        )?;

        let ciphertext = codec::base64url_encode(&encrypted.ciphertext);
        let iv = codec::base64url_encode(encrypted.key.iv().unwrap_or_default());

        let expiration = if self.options.ttl > 0 {
            (i128::from(now) + i128::from(self.options.ttl)).to_string()
        } else {
            String::new()
        };

        let mac_base = codec::join(&[
            self.version.mac_prefix(),
            password_id,
            encrypted.key.salt(),
            &iv,
            &ciphertext,
            &expiration,
        ]);

        let mac = mac::hmac_with_password(
            password.integrity,
            &self.options.integrity,
            derivation,
            mac_base.as_bytes(),
        )?;

        let sealed = codec::join(&[&mac_base, &mac.salt, &mac.digest]);
        trace!(password_id, len = sealed.len(), "sealed value");
        Ok(sealed)
    }

    /// Verify, decrypt and deserialize a token produced by [`Sealer::seal`].
    ///
    /// `passwords` is either the password the token was sealed with, or a
    /// [`PasswordSet`](crate::PasswordSet) holding it under the token's id.
    pub fn unseal<'p, T: DeserializeOwned>(
        &self,
        sealed: &str,
        passwords: impl Into<Passwords<'p>>,
    ) -> Result<T> {
        let now = self.now_msec();

        let parts = SealedParts::split(sealed).inspect_err(|_| {
            debug!("rejected seal: wrong number of components");
        })?;

        if parts.prefix != self.version.mac_prefix() {
            debug!(prefix = parts.prefix, "rejected seal: wrong MAC prefix");
            return Err(SealError::validation("Wrong MAC prefix"));
        }

        self.check_expiration(parts.expiration, now)?;

        let password = password::resolve(passwords.into(), parts.password_id).inspect_err(|_| {
            debug!(password_id = parts.password_id, "rejected seal: unknown password id");
        })?;
        let password = password::normalize(password)?;

        let derivation = self.version.key_derivation();
        let mac_options = self.options.integrity.reopen(parts.mac_salt, None);
        let mac = mac::hmac_with_password(
            password.integrity,
            &mac_options,
            derivation,
            parts.mac_base().as_bytes(),
        )?;

        if !mac::verify_digest(&mac.digest, parts.mac_digest) {
            debug!(password_id = parts.password_id, "rejected seal: bad HMAC");
            return Err(SealError::Integrity("Bad HMAC value".into()));
        }

        let ciphertext = codec::base64url_decode(parts.ciphertext)?;
        let iv = codec::base64url_decode(parts.encryption_iv)?;
        let decrypt_options = self
            .options
            .encryption
            .reopen(parts.encryption_salt, Some(iv));
        let decrypted = crypto::decrypt(
            password.encryption,
            &decrypt_options,
            derivation,
            &ciphertext,
        )?;

        let value = serde_json::from_slice(&decrypted).map_err(|e| {
            SealError::Serialization(format!("Failed parsing sealed object JSON: {e}"))
        })?;

        trace!(password_id = parts.password_id, "unsealed value");
        Ok(value)
    }

    fn check_expiration(&self, expiration: &str, now: i64) -> Result<()> {
        if expiration.is_empty() {
            return Ok(());
        }

        if !expiration.bytes().all(|b| b.is_ascii_digit()) {
            debug!("rejected seal: invalid expiration");
            return Err(SealError::validation("Invalid expiration"));
        }

        // All digits, so the only possible parse failure is overflow; such a
        // timestamp lies beyond any clock this code will run against.
        let exp = expiration.parse::<u64>().unwrap_or(u64::MAX);
        let skew = i128::from(self.options.timestamp_skew_sec) * 1000;

        if i128::from(exp) <= i128::from(now) - skew {
            debug!(expiration = exp, now, "rejected seal: expired");
            return Err(SealError::Expired);
        }

        Ok(())
    }
}
