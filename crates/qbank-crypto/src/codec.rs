//! File-level encryption.
//!
//! An encrypted file is the 16-byte PBKDF2 salt followed by a token from
//! [`TokenCipher`]. Output is only written after the operation succeeds, so a
//! wrong password never leaves a partial file behind.

use std::path::{Path, PathBuf};

use crate::error::{CryptoError, Result};
use crate::fernet::TokenCipher;
use crate::kdf::{derive_key, generate_salt, SALT_LEN};

/// Extension given to encrypted files.
pub const ENCRYPTED_EXTENSION: &str = "encrypted";

const CATEGORY_PREFIX: &str = "cat_";
const MAPPINGS_STEM: &str = "mappings";

/// Where an output file goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Next to the input, which is deleted afterwards.
    InPlace,
    /// Into this directory (created if needed); the input is kept.
    Directory(PathBuf),
}

/// Encrypt a byte payload into a self-describing blob.
pub fn seal(plaintext: &[u8], password: &str) -> Result<Vec<u8>> {
    let salt = generate_salt();
    let key = derive_key(password, &salt)?;
    let token = TokenCipher::new(key).encrypt(plaintext)?;

    let mut blob = Vec::with_capacity(SALT_LEN + token.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&token);
    Ok(blob)
}

/// Decrypt a blob produced by [`seal`].
pub fn open(blob: &[u8], password: &str) -> Result<Vec<u8>> {
    if blob.len() < SALT_LEN {
        return Err(CryptoError::TooSmall(blob.len()));
    }
    let (salt, token) = blob.split_at(SALT_LEN);
    let key = derive_key(password, salt)?;
    TokenCipher::new(key).decrypt(token)
}

/// Output path for encrypting `input`.
///
/// In place, the extension is replaced with `.encrypted`; into a directory,
/// the output is `<dir>/<stem>.encrypted`.
pub fn encrypted_path(input: &Path, placement: &Placement) -> PathBuf {
    match placement {
        Placement::InPlace => input.with_extension(ENCRYPTED_EXTENSION),
        Placement::Directory(dir) => dir.join(format!("{}.{ENCRYPTED_EXTENSION}", stem(input))),
    }
}

/// Output path for decrypting `input`.
///
/// `.encrypted` files get their original name back: `cat_*` stems gain
/// `.csv`, `mappings` becomes `mappings.yaml`, anything else keeps the bare
/// stem. Other inputs become `<stem>.decrypted` in place or
/// `<dir>/<stem>_decrypted`.
pub fn decrypted_path(input: &Path, placement: &Placement) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new(""));
    let base = stem(input);

    if !is_encrypted_file(input) {
        return match placement {
            Placement::InPlace => input.with_extension("decrypted"),
            Placement::Directory(dir) => dir.join(format!("{base}_decrypted")),
        };
    }

    let name = restored_name(&base);
    match placement {
        Placement::InPlace => parent.join(name),
        Placement::Directory(dir) => dir.join(name),
    }
}

fn restored_name(stem: &str) -> String {
    if stem.starts_with(CATEGORY_PREFIX) && !stem.ends_with(".csv") {
        format!("{stem}.csv")
    } else if stem == MAPPINGS_STEM {
        format!("{stem}.yaml")
    } else {
        stem.to_string()
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whether `path` carries the `.encrypted` extension.
pub fn is_encrypted_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == ENCRYPTED_EXTENSION)
}

/// Encrypt one file, returning the path written.
pub fn encrypt_file(input: &Path, password: &str, placement: &Placement) -> Result<PathBuf> {
    let data = std::fs::read(input).map_err(|e| CryptoError::io(input, e))?;
    let blob = seal(&data, password)?;
    let output = encrypted_path(input, placement);
    write_output(&output, &blob)?;

    if *placement == Placement::InPlace {
        std::fs::remove_file(input).map_err(|e| CryptoError::io(input, e))?;
    }
    tracing::debug!("encrypted {} -> {}", input.display(), output.display());
    Ok(output)
}

/// Decrypt one file, returning the path written.
pub fn decrypt_file(input: &Path, password: &str, placement: &Placement) -> Result<PathBuf> {
    let blob = std::fs::read(input).map_err(|e| CryptoError::io(input, e))?;
    let data = open(&blob, password)?;
    let output = decrypted_path(input, placement);
    write_output(&output, &data)?;

    if *placement == Placement::InPlace {
        std::fs::remove_file(input).map_err(|e| CryptoError::io(input, e))?;
    }
    tracing::debug!("decrypted {} -> {}", input.display(), output.display());
    Ok(output)
}

fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CryptoError::io(parent, e))?;
    }
    std::fs::write(path, data).map_err(|e| CryptoError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_round_trip() {
        let blob = seal(b"hash,question\n", "pw").unwrap();
        assert_eq!(open(&blob, "pw").unwrap(), b"hash,question\n");
    }

    #[test]
    fn same_input_gives_different_blobs() {
        assert_ne!(seal(b"x", "pw").unwrap(), seal(b"x", "pw").unwrap());
    }

    #[test]
    fn short_blob_is_too_small() {
        assert!(matches!(open(&[0u8; 10], "pw"), Err(CryptoError::TooSmall(10))));
    }

    #[test]
    fn encrypted_names() {
        let out = Path::new("out");
        assert_eq!(
            encrypted_path(Path::new("q/cat_loops.csv"), &Placement::InPlace),
            PathBuf::from("q/cat_loops.encrypted")
        );
        assert_eq!(
            encrypted_path(Path::new("q/mappings.yaml"), &Placement::Directory(out.into())),
            PathBuf::from("out/mappings.encrypted")
        );
    }

    #[test]
    fn decrypted_names() {
        let out = Placement::Directory("out".into());
        assert_eq!(
            decrypted_path(Path::new("q/cat_loops.encrypted"), &Placement::InPlace),
            PathBuf::from("q/cat_loops.csv")
        );
        assert_eq!(
            decrypted_path(Path::new("q/mappings.encrypted"), &out),
            PathBuf::from("out/mappings.yaml")
        );
        assert_eq!(
            decrypted_path(Path::new("q/notes.encrypted"), &out),
            PathBuf::from("out/notes")
        );
        assert_eq!(
            decrypted_path(Path::new("q/blob.bin"), &Placement::InPlace),
            PathBuf::from("q/blob.decrypted")
        );
        assert_eq!(
            decrypted_path(Path::new("q/blob.bin"), &out),
            PathBuf::from("out/blob_decrypted")
        );
    }
}
