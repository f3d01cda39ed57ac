//! Password-based key derivation.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::error::{CryptoError, Result};

/// PBKDF2 iteration count.
pub const ITERATIONS: u32 = 100_000;

/// Length of the random salt stored at the front of every encrypted file.
pub const SALT_LEN: usize = 16;

/// Length of the derived key material.
pub const KEY_LEN: usize = 32;

/// 32 bytes of key material: the first half signs, the second half encrypts.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Decode the URL-safe base64 form produced by [`DerivedKey::to_base64`].
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = URL_SAFE
            .decode(encoded.trim())
            .map_err(|_| CryptoError::InvalidToken)?;
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|_| CryptoError::InvalidToken)?;
        Ok(Self(key))
    }

    pub fn to_base64(&self) -> String {
        URL_SAFE.encode(self.0)
    }

    pub(crate) fn signing_key(&self) -> &[u8] {
        &self.0[..KEY_LEN / 2]
    }

    pub(crate) fn encryption_key(&self) -> &[u8] {
        &self.0[KEY_LEN / 2..]
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

/// Derive a key from a password and salt with PBKDF2-HMAC-SHA256.
pub fn derive_key(password: &str, salt: &[u8]) -> Result<DerivedKey> {
    if password.is_empty() {
        return Err(CryptoError::EmptyPassword);
    }
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, ITERATIONS, &mut key);
    Ok(DerivedKey(key))
}

/// A fresh random salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let salt = [7u8; SALT_LEN];
        let a = derive_key("secret", &salt).unwrap();
        let b = derive_key("secret", &salt).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, derive_key("Secret", &salt).unwrap());
        assert_ne!(a, derive_key("secret", &[8u8; SALT_LEN]).unwrap());
    }

    #[test]
    fn base64_form_round_trips() {
        let key = derive_key("secret", &[1u8; SALT_LEN]).unwrap();
        let encoded = key.to_base64();
        assert_eq!(encoded.len(), 44);
        assert_eq!(DerivedKey::from_base64(&encoded).unwrap(), key);
        assert!(DerivedKey::from_base64("short").is_err());
    }

    #[test]
    fn empty_password_rejected() {
        assert!(matches!(
            derive_key("", &[0u8; SALT_LEN]),
            Err(CryptoError::EmptyPassword)
        ));
    }

    #[test]
    fn salts_differ() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
