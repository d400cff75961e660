//! # ironseal
//!
//! Password-based sealing of structured values.
//!
//! A value is serialized to JSON, encrypted with a key stretched from a
//! password, and signed with a second, independently salted key. The result
//! is one self-contained, URL-safe string that can be handed to an untrusted
//! party (a cookie, a query parameter) and later verified and opened again
//! with the same password, without any server-side state.
//!
//! ```text
//! Fe26.2*[password-id]*encryption-salt*encryption-iv*ciphertext*[expiration]*mac-salt*mac
//! ```
//!
//! ## Public API
//!
//! [`Sealer`] is the main entry point: build it once from [`Options`] and a
//! protocol [`Version`], then call [`Sealer::seal`] and [`Sealer::unseal`].
//! [`seal`] and [`unseal`] are shorthands for the default `Fe26.2` variant.
//! The building blocks (key derivation, cipher, MAC, codec) are public too,
//! for callers that need to interoperate at a lower level.

pub mod codec;
pub mod crypto;
pub mod error;
pub mod keys;
pub mod mac;
pub mod options;
pub mod password;
pub mod sealer;

pub use error::{Result, SealError};
pub use keys::{derive_key, Algorithm, DerivedKey, KeyDerivation};
pub use options::{KeyOptions, Options};
pub use password::{Password, PasswordSet, Passwords, DEFAULT_PASSWORD_ID};
pub use sealer::{Sealer, Version};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Seal `value` under the `Fe26.2` protocol variant.
pub fn seal<T: Serialize + ?Sized>(
    value: &T,
    password: &Password,
    options: &Options,
) -> Result<String> {
    Sealer::new(options.clone(), Version::V2).seal(value, password)
}

/// Unseal a token produced by [`seal`].
pub fn unseal<'p, T: DeserializeOwned>(
    sealed: &str,
    passwords: impl Into<Passwords<'p>>,
    options: &Options,
) -> Result<T> {
    Sealer::new(options.clone(), Version::V2).unseal(sealed, passwords)
}
