//! Whole-directory encryption and decryption.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::codec::{decrypt_file, encrypt_file, is_encrypted_file, Placement};
use crate::error::{CryptoError, Result};

/// Receives per-file progress from a batch operation.
pub trait BatchReporter {
    fn on_file_ok(&self, input: &Path, output: &Path);
    fn on_file_error(&self, input: &Path, error: &CryptoError);
}

/// Reporter that ignores everything.
pub struct NoopReporter;

impl BatchReporter for NoopReporter {
    fn on_file_ok(&self, _: &Path, _: &Path) {}
    fn on_file_error(&self, _: &Path, _: &CryptoError) {}
}

/// Result of processing a single file.
#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub result: Result<PathBuf>,
}

/// Outcome of a batch operation.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub outcomes: Vec<FileOutcome>,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.total
    }

    fn record(&mut self, input: PathBuf, result: Result<PathBuf>, reporter: &dyn BatchReporter) {
        match &result {
            Ok(output) => {
                self.succeeded += 1;
                reporter.on_file_ok(&input, output);
            }
            Err(e) => {
                tracing::warn!("failed to process {}: {e}", input.display());
                reporter.on_file_error(&input, e);
            }
        }
        self.total += 1;
        self.outcomes.push(FileOutcome { input, result });
    }
}

/// Encrypt every `cat_*.csv` file in `dir`, plus `mappings.yaml` when
/// `include_mappings` is set.
///
/// Per-file failures are collected in the summary; a missing directory or
/// an empty match set is an error.
pub fn encrypt_directory(
    dir: &Path,
    password: &str,
    placement: &Placement,
    include_mappings: bool,
    reporter: &dyn BatchReporter,
) -> Result<BatchSummary> {
    let mut files = matching_files(dir, |name| {
        name.starts_with("cat_") && name.ends_with(".csv")
    })?;
    if files.is_empty() {
        return Err(CryptoError::NoMatchingFiles {
            dir: dir.to_path_buf(),
            pattern: "cat_*.csv",
        });
    }
    if include_mappings {
        let mappings = dir.join("mappings.yaml");
        if mappings.is_file() {
            files.push(mappings);
        } else {
            tracing::warn!("{} not found, skipping", mappings.display());
        }
    }

    tracing::info!("encrypting {} files from {}", files.len(), dir.display());
    let mut summary = BatchSummary::default();
    for file in files {
        let result = encrypt_file(&file, password, placement);
        summary.record(file, result, reporter);
    }
    Ok(summary)
}

/// Decrypt every `*.encrypted` file in `dir`.
pub fn decrypt_directory(
    dir: &Path,
    password: &str,
    placement: &Placement,
    reporter: &dyn BatchReporter,
) -> Result<BatchSummary> {
    let files = matching_files(dir, |name| is_encrypted_file(Path::new(name)))?;
    if files.is_empty() {
        return Err(CryptoError::NoMatchingFiles {
            dir: dir.to_path_buf(),
            pattern: "*.encrypted",
        });
    }

    tracing::info!("decrypting {} files from {}", files.len(), dir.display());
    let mut summary = BatchSummary::default();
    for file in files {
        let result = decrypt_file(&file, password, placement);
        summary.record(file, result, reporter);
    }
    Ok(summary)
}

/// Sanity-check a directory of decrypted files.
///
/// The first `cat_*.csv` file (in name order) must have a header line
/// mentioning `category`. Returns `false` when there is nothing to check.
pub fn verify_decrypted(dir: &Path) -> Result<bool> {
    let files = matching_files(dir, |name| name.starts_with("cat_") && name.ends_with(".csv"))?;
    let Some(first) = files.first() else {
        tracing::warn!("no CSV files found in {}", dir.display());
        return Ok(false);
    };

    let file = std::fs::File::open(first).map_err(|e| CryptoError::io(first, e))?;
    let mut header = String::new();
    if std::io::BufReader::new(file).read_line(&mut header).is_err() {
        tracing::warn!("{} is not valid UTF-8", first.display());
        return Ok(false);
    }
    let header = header.trim();
    if header.is_empty() || !header.contains("category") {
        tracing::warn!("decrypted file may be corrupted: {}", first.display());
        return Ok(false);
    }
    Ok(true)
}

fn matching_files(dir: &Path, matches: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CryptoError::DirectoryNotFound(dir.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| CryptoError::io(dir, e))? {
        let path = entry.map_err(|e| CryptoError::io(dir, e))?.path();
        let is_match = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(&matches);
        if path.is_file() && is_match {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
