//! # qbank-crypto
//!
//! Password-based encryption for question bank files, so banks can be
//! committed to a repository without exposing their contents.
//!
//! Keys are derived with PBKDF2-HMAC-SHA256 from a password and a per-file
//! random salt. Payloads are sealed as Fernet-style tokens (AES-128-CBC with
//! an HMAC-SHA256 tag).

pub mod batch;
pub mod codec;
pub mod error;
pub mod fernet;
pub mod kdf;

pub use batch::{
    decrypt_directory, encrypt_directory, verify_decrypted, BatchReporter, BatchSummary,
    NoopReporter,
};
pub use codec::{decrypt_file, encrypt_file, open, seal, Placement};
pub use error::CryptoError;
pub use kdf::{derive_key, DerivedKey};
