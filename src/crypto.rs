//! Symmetric encryption with password-derived keys.
//!
//! Primitive choices:
//! - **aes-256-cbc**: AES-256 in CBC mode, PKCS#7 padding
//! - **aes-128-ctr**: AES-128 in counter mode (128-bit big-endian counter)
//! - **Key and IV**: derived/generated by [`keys::derive_key`](crate::keys::derive_key)
//!
//! Neither mode authenticates. Callers must verify the token MAC before
//! decrypting anything.

use aes::{Aes128, Aes256};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, StreamCipher};

use crate::error::{Result, SealError};
use crate::keys::{self, Algorithm, DerivedKey, KeyDerivation};
use crate::options::KeyOptions;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type Aes128Ctr = ctr::Ctr128BE<Aes128>;

/// Ciphertext together with the key (salt, IV) that produced it.
#[derive(Debug)]
pub struct Encrypted {
    pub ciphertext: Vec<u8>,
    pub key: DerivedKey,
}

fn not_a_cipher(algorithm: Algorithm) -> SealError {
    SealError::Validation(format!("Algorithm is not a cipher: {algorithm}"))
}

/// Reject a digest configured for encryption before any key is derived.
/// Unknown names are left to `derive_key`, which reports them.
fn check_cipher(options: &KeyOptions) -> Result<()> {
    match options.algorithm.parse::<Algorithm>() {
        Ok(algorithm) if !algorithm.is_cipher() => Err(not_a_cipher(algorithm)),
        _ => Ok(()),
    }
}

/// Derive a key from `secret` and encrypt `plaintext` with it.
pub fn encrypt(
    secret: &str,
    options: &KeyOptions,
    derivation: KeyDerivation,
    plaintext: &[u8],
) -> Result<Encrypted> {
    check_cipher(options)?;
    let key = keys::derive_key(secret, options, derivation)?;
    let failed = || SealError::crypto("Encryption failed");

    let ciphertext = match key.algorithm() {
        Algorithm::Aes256Cbc => {
            let iv = key.iv().ok_or_else(failed)?;
            Aes256CbcEnc::new_from_slices(key.key(), iv)
                .map_err(|_| failed())?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext)
        }
        Algorithm::Aes128Ctr => {
            let iv = key.iv().ok_or_else(failed)?;
            let mut cipher = Aes128Ctr::new_from_slices(key.key(), iv).map_err(|_| failed())?;
            let mut buf = plaintext.to_vec();
            cipher.apply_keystream(&mut buf);
            buf
        }
        other => return Err(not_a_cipher(other)),
    };

    Ok(Encrypted { ciphertext, key })
}

/// Derive a key from `secret` and decrypt `ciphertext` with it.
///
/// `options` must carry the salt and IV the ciphertext was produced with.
/// Bad padding, a truncated block or a wrong-length IV all surface as the
/// same `Crypto` error.
pub fn decrypt(
    secret: &str,
    options: &KeyOptions,
    derivation: KeyDerivation,
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    check_cipher(options)?;
    let key = keys::derive_key(secret, options, derivation)?;
    let failed = || SealError::crypto("Decryption failed");

    match key.algorithm() {
        Algorithm::Aes256Cbc => {
            let iv = key.iv().ok_or_else(failed)?;
            Aes256CbcDec::new_from_slices(key.key(), iv)
                .map_err(|_| failed())?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                .map_err(|_| failed())
        }
        Algorithm::Aes128Ctr => {
            let iv = key.iv().ok_or_else(failed)?;
            let mut cipher = Aes128Ctr::new_from_slices(key.key(), iv).map_err(|_| failed())?;
            let mut buf = ciphertext.to_vec();
            cipher.apply_keystream(&mut buf);
            Ok(buf)
        }
        other => Err(not_a_cipher(other)),
    }
}
