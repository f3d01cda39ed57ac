//! Encryption error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by key derivation, the token cipher, and the file codec.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Authentication failed: wrong password, or the data was modified.
    #[error("incorrect password or corrupted file")]
    InvalidToken,

    /// The encrypted blob is shorter than its salt header.
    #[error("invalid encrypted file (too small: {0} bytes)")]
    TooSmall(usize),

    /// An empty password was supplied.
    #[error("password cannot be empty")]
    EmptyPassword,

    /// The directory to process does not exist.
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// No file in the directory matched the expected pattern.
    #[error("no {pattern} files found in {}", .dir.display())]
    NoMatchingFiles { dir: PathBuf, pattern: &'static str },

    /// Underlying I/O failure.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CryptoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CryptoError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this error means the password was wrong or the data
    /// was tampered with.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, CryptoError::InvalidToken)
    }
}

pub type Result<T> = std::result::Result<T, CryptoError>;
