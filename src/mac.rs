//! Token integrity: HMAC over the MAC base string.
//!
//! The MAC key is derived from the integrity secret with its own salt, so the
//! encryption and integrity keys are independent even when both halves of
//! the password are the same string.

use ring::hmac;
use subtle::ConstantTimeEq;

use crate::codec;
use crate::error::{Result, SealError};
use crate::keys::{self, Algorithm, KeyDerivation};
use crate::options::KeyOptions;

/// An HMAC digest (unpadded URL-safe base64) and the salt of its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacResult {
    pub digest: String,
    pub salt: String,
}

/// Derive a key from `secret` and compute the HMAC of `data`.
pub fn hmac_with_password(
    secret: &str,
    options: &KeyOptions,
    derivation: KeyDerivation,
    data: &[u8],
) -> Result<MacResult> {
    // Check the role before deriving. Unknown names fall through to
    // `derive_key`, which reports them.
    let algorithm = match options.algorithm.parse::<Algorithm>() {
        Ok(Algorithm::Sha256) | Err(_) => hmac::HMAC_SHA256,
        Ok(other) => {
            return Err(SealError::Validation(format!(
                "Algorithm is not a digest: {other}"
            )))
        }
    };

    let key = keys::derive_key(secret, options, derivation)?;
    let tag = hmac::sign(&hmac::Key::new(algorithm, key.key()), data);

    Ok(MacResult {
        digest: codec::base64url_encode(tag.as_ref()),
        salt: key.salt().to_string(),
    })
}

/// Compare two encoded digests without short-circuiting on the first
/// mismatching byte. Only the length comparison is variable-time.
pub fn verify_digest(expected: &str, actual: &str) -> bool {
    expected.len() == actual.len() && bool::from(expected.as_bytes().ct_eq(actual.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSWORD: &str = "some_not_random_password_that_is_at_least_32_characters";

    fn fixed_salt() -> KeyOptions {
        let mut options = KeyOptions::integrity();
        options.salt = Some("0123456789abcdef".into());
        options
    }

    #[test]
    fn test_digest_is_deterministic_for_fixed_salt() {
        let a = hmac_with_password(PASSWORD, &fixed_salt(), KeyDerivation::Sha1, b"data").unwrap();
        let b = hmac_with_password(PASSWORD, &fixed_salt(), KeyDerivation::Sha1, b"data").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.salt, "0123456789abcdef");
        // 32 digest bytes -> 43 unpadded base64 characters.
        assert_eq!(a.digest.len(), 43);
    }

    #[test]
    fn test_digest_depends_on_data_salt_and_derivation() {
        let base =
            hmac_with_password(PASSWORD, &fixed_salt(), KeyDerivation::Sha1, b"data").unwrap();

        let other_data =
            hmac_with_password(PASSWORD, &fixed_salt(), KeyDerivation::Sha1, b"dat4").unwrap();
        assert_ne!(base.digest, other_data.digest);

        let mut salted = fixed_salt();
        salted.salt = Some("fedcba9876543210".into());
        let other_salt =
            hmac_with_password(PASSWORD, &salted, KeyDerivation::Sha1, b"data").unwrap();
        assert_ne!(base.digest, other_salt.digest);

        let other_digest =
            hmac_with_password(PASSWORD, &fixed_salt(), KeyDerivation::Sha256, b"data").unwrap();
        assert_ne!(base.digest, other_digest.digest);
    }

    #[test]
    fn test_generated_salt_varies() {
        let a = hmac_with_password(PASSWORD, &KeyOptions::integrity(), KeyDerivation::Sha1, b"x")
            .unwrap();
        let b = hmac_with_password(PASSWORD, &KeyOptions::integrity(), KeyDerivation::Sha1, b"x")
            .unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.digest, b.digest);
    }

    #[test]
    fn test_cipher_is_not_a_digest() {
        let err = hmac_with_password(PASSWORD, &KeyOptions::encryption(), KeyDerivation::Sha1, b"x")
            .unwrap_err();
        assert_eq!(
            err,
            SealError::Validation("Algorithm is not a digest: aes-256-cbc".into())
        );
    }

    #[test]
    fn test_empty_password() {
        let err = hmac_with_password("", &KeyOptions::integrity(), KeyDerivation::Sha1, b"x")
            .unwrap_err();
        assert_eq!(err, SealError::Validation("Empty password".into()));
    }

    #[test]
    fn test_verify_digest() {
        assert!(verify_digest("abc", "abc"));
        assert!(!verify_digest("abc", "abd"));
        assert!(!verify_digest("abc", "abcd"));
        assert!(!verify_digest("", "a"));
    }

    #[test]
    fn test_role_is_checked_before_derivation() {
        let mut options = KeyOptions::encryption();
        options.iterations = 0;

        // Zero iterations would fail derivation with "Bad options".
        let err = hmac_with_password("", &options, KeyDerivation::Sha1, b"x").unwrap_err();
        assert_eq!(
            err,
            SealError::Validation("Algorithm is not a digest: aes-256-cbc".into())
        );
    }

}
