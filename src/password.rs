//! Passwords, password sets, and their resolution.
//!
//! A password is either one secret shared by both protocol halves, or a
//! secret tagged with an id, or an id with distinct encryption and integrity
//! secrets. The id travels in clear text inside the token, which lets the
//! unsealer pick the right entry out of a [`PasswordSet`] when secrets are
//! rotated.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use zeroize::Zeroize;

use crate::error::{Result, SealError};

/// Set key used for tokens sealed without a password id.
pub const DEFAULT_PASSWORD_ID: &str = "default";

/// A sealing password.
///
/// Deserializes from either a bare JSON string or an object with `id` and
/// `secret`, or `id`, `encryption` and `integrity`. Secrets are zeroised on
/// drop.
#[derive(Clone, PartialEq, Eq, Deserialize, Zeroize)]
#[serde(untagged)]
pub enum Password {
    /// One secret for both halves, no id.
    Bare(String),
    /// One secret for both halves, with an optional id.
    Keyed {
        #[serde(default)]
        id: Option<String>,
        secret: String,
    },
    /// Distinct encryption and integrity secrets, with an optional id.
    Split {
        #[serde(default)]
        id: Option<String>,
        encryption: String,
        integrity: String,
    },
}

impl Password {
    pub fn new(secret: impl Into<String>) -> Self {
        Self::Bare(secret.into())
    }

    pub fn with_id(id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::Keyed {
            id: Some(id.into()),
            secret: secret.into(),
        }
    }

    pub fn split(
        id: Option<String>,
        encryption: impl Into<String>,
        integrity: impl Into<String>,
    ) -> Self {
        Self::Split {
            id,
            encryption: encryption.into(),
            integrity: integrity.into(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Bare(_) => None,
            Self::Keyed { id, .. } | Self::Split { id, .. } => id.as_deref(),
        }
    }
}

impl Drop for Password {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Bare(_) => "Bare",
            Self::Keyed { .. } => "Keyed",
            Self::Split { .. } => "Split",
        };
        f.debug_struct(kind)
            .field("id", &self.id())
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl From<&str> for Password {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

impl From<String> for Password {
    fn from(secret: String) -> Self {
        Self::Bare(secret)
    }
}

/// A password reduced to its id and the two secrets the pipelines consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NormalizedPassword<'a> {
    pub id: Option<&'a str>,
    pub encryption: &'a str,
    pub integrity: &'a str,
}

/// Reduce any password shape to `{id, encryption, integrity}`.
pub(crate) fn normalize(password: &Password) -> Result<NormalizedPassword<'_>> {
    let normalized = match password {
        Password::Bare(secret) => NormalizedPassword {
            id: None,
            encryption: secret,
            integrity: secret,
        },
        Password::Keyed { id, secret } => NormalizedPassword {
            id: id.as_deref(),
            encryption: secret,
            integrity: secret,
        },
        Password::Split {
            id,
            encryption,
            integrity,
        } => NormalizedPassword {
            id: id.as_deref(),
            encryption,
            integrity,
        },
    };

    if normalized.encryption.is_empty() || normalized.integrity.is_empty() {
        return Err(SealError::validation("Empty password"));
    }

    Ok(normalized)
}

/// Whether `id` is usable as a password id: non-empty ASCII word characters.
pub(crate) fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Passwords keyed by id, for unsealing tokens sealed under rotated secrets.
///
/// An entry may be `null` in JSON. A retired id stays listed but resolves as
/// not found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct PasswordSet {
    passwords: HashMap<String, Option<Password>>,
}

impl PasswordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the password stored under `id`.
    pub fn insert(&mut self, id: impl Into<String>, password: impl Into<Password>) -> &mut Self {
        self.passwords.insert(id.into(), Some(password.into()));
        self
    }

    /// Keep `id` listed without a password, so it no longer resolves.
    pub fn retire(&mut self, id: impl Into<String>) -> &mut Self {
        self.passwords.insert(id.into(), None);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Password> {
        self.passwords.get(id).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.passwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passwords.is_empty()
    }

    /// Parse a set from a JSON object of id to password.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SealError::Validation(format!("Bad password set: {e}")))
    }
}

impl<K: Into<String>, P: Into<Password>> FromIterator<(K, P)> for PasswordSet {
    fn from_iter<I: IntoIterator<Item = (K, P)>>(iter: I) -> Self {
        Self {
            passwords: iter
                .into_iter()
                .map(|(id, password)| (id.into(), Some(password.into())))
                .collect(),
        }
    }
}

/// What `unseal` checks a token against: one password, or a set to pick from.
#[derive(Debug, Clone, Copy)]
pub enum Passwords<'a> {
    Single(&'a Password),
    Set(&'a PasswordSet),
}

impl<'a> From<&'a Password> for Passwords<'a> {
    fn from(password: &'a Password) -> Self {
        Self::Single(password)
    }
}

impl<'a> From<&'a PasswordSet> for Passwords<'a> {
    fn from(set: &'a PasswordSet) -> Self {
        Self::Set(set)
    }
}

/// Pick the password for a token carrying `token_password_id`.
///
/// A single password is used as-is. A set is searched by id, or by
/// [`DEFAULT_PASSWORD_ID`] when the token has no id. A miss reports the id
/// carried by the token, which is empty for an id-less token.
pub(crate) fn resolve<'a>(
    passwords: Passwords<'a>,
    token_password_id: &str,
) -> Result<&'a Password> {
    match passwords {
        Passwords::Single(password) => Ok(password),
        Passwords::Set(set) => {
            let key = if token_password_id.is_empty() {
                DEFAULT_PASSWORD_ID
            } else {
                token_password_id
            };
            set.get(key)
                .ok_or_else(|| SealError::PasswordNotFound(token_password_id.to_string()))
        }
    }
}
