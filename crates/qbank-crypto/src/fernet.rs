//! Authenticated token cipher.
//!
//! Tokens use the Fernet layout so files written by earlier tooling stay
//! readable:
//!
//! ```text
//! 0x80 | timestamp (u64 BE) | IV (16) | AES-128-CBC ciphertext | HMAC-SHA256 (32)
//! ```
//!
//! The whole token is URL-safe base64 with padding. The HMAC covers every
//! byte before it and is checked before any decryption happens.

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Block as AesBlock};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::error::{CryptoError, Result};
use crate::kdf::DerivedKey;

type HmacSha256 = Hmac<Sha256>;

const VERSION: u8 = 0x80;
const BLOCK: usize = 16;
const MAC_LEN: usize = 32;
/// version + timestamp + IV
const HEADER_LEN: usize = 1 + 8 + BLOCK;

/// Encrypts and authenticates byte payloads under one derived key.
pub struct TokenCipher {
    key: DerivedKey,
}

impl TokenCipher {
    pub fn new(key: DerivedKey) -> Self {
        Self { key }
    }

    /// Encrypt `plaintext` with a fresh IV and the current time.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut iv = [0u8; BLOCK];
        OsRng.fill_bytes(&mut iv);
        let timestamp = chrono::Utc::now().timestamp().max(0) as u64;
        self.encrypt_with(plaintext, timestamp, iv)
    }

    fn encrypt_with(&self, plaintext: &[u8], timestamp: u64, iv: [u8; BLOCK]) -> Result<Vec<u8>> {
        let cipher = Aes128::new_from_slice(self.key.encryption_key())
            .map_err(|_| CryptoError::InvalidToken)?;

        let mut body = Vec::with_capacity(HEADER_LEN + plaintext.len() + BLOCK + MAC_LEN);
        body.push(VERSION);
        body.extend_from_slice(&timestamp.to_be_bytes());
        body.extend_from_slice(&iv);

        // PKCS#7: always at least one byte of padding
        let pad = BLOCK - plaintext.len() % BLOCK;
        let mut padded = plaintext.to_vec();
        padded.resize(plaintext.len() + pad, pad as u8);

        let mut prev = iv;
        for chunk in padded.chunks_exact(BLOCK) {
            let mut xored = [0u8; BLOCK];
            for (out, (p, c)) in xored.iter_mut().zip(chunk.iter().zip(prev.iter())) {
                *out = p ^ c;
            }
            let mut block = AesBlock::from(xored);
            cipher.encrypt_block(&mut block);
            prev.copy_from_slice(block.as_slice());
            body.extend_from_slice(&prev);
        }

        let mut mac = self.mac()?;
        mac.update(&body);
        body.extend_from_slice(&mac.finalize().into_bytes());

        Ok(URL_SAFE.encode(body).into_bytes())
    }

    /// Verify and decrypt a token produced by [`TokenCipher::encrypt`].
    ///
    /// Every failure, from bad base64 to a wrong key, is reported as
    /// [`CryptoError::InvalidToken`].
    pub fn decrypt(&self, token: &[u8]) -> Result<Vec<u8>> {
        let raw = URL_SAFE
            .decode(trim_ascii(token))
            .map_err(|_| CryptoError::InvalidToken)?;

        if raw.len() < HEADER_LEN + BLOCK + MAC_LEN || raw[0] != VERSION {
            return Err(CryptoError::InvalidToken);
        }
        let (signed, tag) = raw.split_at(raw.len() - MAC_LEN);
        let ciphertext = &signed[HEADER_LEN..];
        if ciphertext.len() % BLOCK != 0 {
            return Err(CryptoError::InvalidToken);
        }

        let mut mac = self.mac()?;
        mac.update(signed);
        mac.verify_slice(tag).map_err(|_| CryptoError::InvalidToken)?;

        let cipher = Aes128::new_from_slice(self.key.encryption_key())
            .map_err(|_| CryptoError::InvalidToken)?;

        let mut prev = [0u8; BLOCK];
        prev.copy_from_slice(&signed[HEADER_LEN - BLOCK..HEADER_LEN]);
        let mut plaintext = Vec::with_capacity(ciphertext.len());
        for chunk in ciphertext.chunks_exact(BLOCK) {
            let mut block = *AesBlock::from_slice(chunk);
            cipher.decrypt_block(&mut block);
            for (b, p) in block.iter().zip(prev.iter()) {
                plaintext.push(b ^ p);
            }
            prev.copy_from_slice(chunk);
        }

        strip_padding(&mut plaintext)?;
        Ok(plaintext)
    }

    fn mac(&self) -> Result<HmacSha256> {
        <HmacSha256 as Mac>::new_from_slice(self.key.signing_key())
            .map_err(|_| CryptoError::InvalidToken)
    }
}

fn strip_padding(data: &mut Vec<u8>) -> Result<()> {
    let pad = *data.last().ok_or(CryptoError::InvalidToken)? as usize;
    if pad == 0 || pad > BLOCK || pad > data.len() {
        return Err(CryptoError::InvalidToken);
    }
    if !data[data.len() - pad..].iter().all(|&b| b as usize == pad) {
        return Err(CryptoError::InvalidToken);
    }
    data.truncate(data.len() - pad);
    Ok(())
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |i| i + 1);
    &bytes[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::derive_key;

    fn cipher(password: &str) -> TokenCipher {
        TokenCipher::new(derive_key(password, &[3u8; 16]).unwrap())
    }

    #[test]
    fn round_trip_various_lengths() {
        let c = cipher("pw");
        for len in [0usize, 1, 15, 16, 17, 100] {
            let data: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let token = c.encrypt(&data).unwrap();
            assert_eq!(c.decrypt(&token).unwrap(), data);
        }
    }

    #[test]
    fn token_layout() {
        let c = cipher("pw");
        let token = c.encrypt_with(b"hello", 1_700_000_000, [9u8; 16]).unwrap();
        let raw = URL_SAFE.decode(&token).unwrap();
        assert_eq!(raw[0], VERSION);
        assert_eq!(&raw[1..9], &1_700_000_000u64.to_be_bytes());
        assert_eq!(&raw[9..25], &[9u8; 16]);
        // one ciphertext block plus the tag
        assert_eq!(raw.len(), HEADER_LEN + BLOCK + MAC_LEN);
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let token = cipher("right").encrypt(b"secret").unwrap();
        let err = cipher("wrong").decrypt(&token).unwrap_err();
        assert!(err.is_authentication_failure());
    }

    #[test]
    fn tampering_detected() {
        let c = cipher("pw");
        let token = c.encrypt(b"some question data").unwrap();
        let mut raw = URL_SAFE.decode(&token).unwrap();
        raw[HEADER_LEN] ^= 0x01;
        let tampered = URL_SAFE.encode(raw).into_bytes();
        assert!(matches!(c.decrypt(&tampered), Err(CryptoError::InvalidToken)));
    }

    #[test]
    fn garbage_rejected() {
        let c = cipher("pw");
        assert!(c.decrypt(b"").is_err());
        assert!(c.decrypt(b"not base64 !!").is_err());
        assert!(c.decrypt(URL_SAFE.encode([0x80u8; 40]).as_bytes()).is_err());
    }

    #[test]
    fn trailing_newline_tolerated() {
        let c = cipher("pw");
        let mut token = c.encrypt(b"x").unwrap();
        token.push(b'\n');
        assert_eq!(c.decrypt(&token).unwrap(), b"x");
    }
}
