//! Error types for ironseal.
//!
//! Every variant is a distinct failure mode of the seal/unseal pipelines.
//! Messages signal *what* failed without echoing secrets, keys or
//! plaintext back to the caller.

use thiserror::Error;

/// The single error type for all ironseal operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SealError {
    /// Malformed input: bad token shape, bad password id, bad options,
    /// too-short password, unknown algorithm.
    #[error("{0}")]
    Validation(String),

    /// A primitive failed: salt/IV generation, encryption, decryption.
    #[error("{0}")]
    Crypto(String),

    /// The token carried an expiration that has already passed.
    #[error("Expired seal")]
    Expired,

    /// The token named a password id that the supplied set does not hold.
    #[error("Cannot find password: {0}")]
    PasswordNotFound(String),

    /// The recomputed MAC did not match the one carried by the token.
    #[error("{0}")]
    Integrity(String),

    /// The value could not be encoded to, or decoded from, JSON.
    #[error("{0}")]
    Serialization(String),
}

impl SealError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto(message.into())
    }
}

/// Shorthand for results produced by this crate.
pub type Result<T> = std::result::Result<T, SealError>;
