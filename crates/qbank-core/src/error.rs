//! Question bank error types.
//!
//! Configuration and input-availability failures are fatal: they abort a run
//! before any question is selected or any file is written.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading configuration, mappings, or question files.
#[derive(Debug, Error)]
pub enum BankError {
    /// The configuration document could not be parsed or failed validation.
    #[error("invalid configuration {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// A required configuration section or key is absent.
    #[error("missing required configuration key: {0}")]
    MissingSection(&'static str),

    /// The category mapping file is missing or malformed.
    #[error("invalid category mapping {path}: {message}")]
    Mapping { path: PathBuf, message: String },

    /// The questions directory does not exist.
    #[error("questions directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// No `cat_*.csv` files were found in the questions directory.
    #[error("no question CSV files found in {}", .0.display())]
    NoQuestionFiles(PathBuf),

    /// A question file could not be parsed.
    #[error("failed to read questions from {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Underlying I/O failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BankError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BankError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        BankError::Csv {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, BankError>;
