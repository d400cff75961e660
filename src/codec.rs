//! The sealed-string wire format.
//!
//! A sealed token is eight fields joined by `*`:
//!
//! ```text
//! prefix*[password-id]*encryption-salt*encryption-iv*ciphertext*[expiration]*mac-salt*mac
//! ```
//!
//! Binary fields (IV, ciphertext, MAC digest) use the RFC 4648 URL-safe
//! base64 alphabet with the `=` padding stripped, so the token can travel in
//! cookies and query strings without further escaping.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::{Result, SealError};

/// Separator between token fields.
pub const DELIMITER: char = '*';

/// Number of fields in a well-formed token.
pub const SEALED_COMPONENTS: usize = 8;

/// Encode bytes as unpadded URL-safe base64.
pub fn base64url_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode unpadded URL-safe base64.
///
/// Anything outside `[A-Za-z0-9_-]` is rejected before decoding, which also
/// rules out `=` padding and the standard alphabet's `+` and `/`.
pub fn base64url_decode(data: &str) -> Result<Vec<u8>> {
    if !data
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(SealError::validation("Invalid character"));
    }

    URL_SAFE_NO_PAD
        .decode(data)
        .map_err(|_| SealError::validation("Invalid base64 encoding"))
}

/// Join fields with the token delimiter.
pub fn join(fields: &[&str]) -> String {
    fields.join("*")
}

/// A token split into its eight named fields. Borrows from the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SealedParts<'a> {
    pub prefix: &'a str,
    pub password_id: &'a str,
    pub encryption_salt: &'a str,
    pub encryption_iv: &'a str,
    pub ciphertext: &'a str,
    pub expiration: &'a str,
    pub mac_salt: &'a str,
    pub mac_digest: &'a str,
}

impl<'a> SealedParts<'a> {
    /// Split a token on `*`. Exactly eight fields are required.
    pub fn split(sealed: &'a str) -> Result<Self> {
        let fields: Vec<&str> = sealed.split(DELIMITER).collect();
        let &[
            prefix,
            password_id,
            encryption_salt,
            encryption_iv,
            ciphertext,
            expiration,
            mac_salt,
            mac_digest,
        ] = fields.as_slice()
        else {
            return Err(SealError::validation(
                "Incorrect number of sealed components",
            ));
        };

        Ok(Self {
            prefix,
            password_id,
            encryption_salt,
            encryption_iv,
            ciphertext,
            expiration,
            mac_salt,
            mac_digest,
        })
    }

    /// The string the MAC covers: the first six fields, re-joined.
    pub fn mac_base(&self) -> String {
        join(&[
            self.prefix,
            self.password_id,
            self.encryption_salt,
            self.encryption_iv,
            self.ciphertext,
            self.expiration,
        ])
    }
}
