//! Content hashing of question text.
//!
//! A question's `hash` is derived from its text so that the same question
//! written as several types (multiple choice, free text, ...) shares one
//! identity. [`rehash_file`] rewrites the hash column of a category file.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use md5::{Digest, Md5};
use regex::Regex;

use crate::bank::category_files;
use crate::error::{BankError, Result};

/// Number of hex digits kept from the digest.
pub const HASH_LEN: usize = 8;

fn punctuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]").expect("static regex"))
}

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Fingerprint of a question's text.
///
/// Case, punctuation, and whitespace runs do not affect the result.
pub fn content_hash(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let stripped = punctuation().replace_all(&lowered, "");
    let cleaned = whitespace().replace_all(&stripped, " ");

    let digest = Md5::digest(cleaned.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex[..HASH_LEN].to_string()
}

/// One hash that changed during a rehash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashChange {
    pub old: String,
    pub new: String,
    pub question: String,
}

/// Result of rehashing a single file.
#[derive(Debug, Clone)]
pub struct RehashReport {
    pub path: PathBuf,
    pub rows: usize,
    pub changes: Vec<HashChange>,
}

/// Recompute the `hash` column of a CSV file in place.
///
/// The header and every other column are written back unchanged. Files
/// without `hash` and `question` columns are left untouched.
pub fn rehash_file(path: &Path) -> Result<RehashReport> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| BankError::csv(path, e))?;
    let headers = reader.headers().map_err(|e| BankError::csv(path, e))?.clone();
    let rows = reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| BankError::csv(path, e))?;

    let hash_col = headers.iter().position(|h| h == "hash");
    let question_col = headers.iter().position(|h| h == "question");
    let (Some(hash_col), Some(question_col)) = (hash_col, question_col) else {
        tracing::warn!("{} has no hash/question columns, skipping", path.display());
        return Ok(RehashReport {
            path: path.to_path_buf(),
            rows: rows.len(),
            changes: Vec::new(),
        });
    };

    let mut changes = Vec::new();
    let mut rewritten = Vec::with_capacity(rows.len());
    for record in &rows {
        let question = record.get(question_col).unwrap_or_default();
        let old = record.get(hash_col).unwrap_or_default();
        let new = content_hash(question);

        let fields: Vec<&str> = record
            .iter()
            .enumerate()
            .map(|(i, field)| if i == hash_col { new.as_str() } else { field })
            .collect();
        rewritten.push(csv::StringRecord::from(fields));

        if old != new {
            changes.push(HashChange {
                old: old.to_string(),
                new: new.clone(),
                question: question.to_string(),
            });
        }
    }

    // Serialize in memory, then replace the file with a single write.
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&headers)
        .map_err(|e| BankError::csv(path, e))?;
    for record in &rewritten {
        writer
            .write_record(record)
            .map_err(|e| BankError::csv(path, e))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| BankError::io(path, e.into_error()))?;
    std::fs::write(path, bytes).map_err(|e| BankError::io(path, e))?;

    Ok(RehashReport {
        path: path.to_path_buf(),
        rows: rows.len(),
        changes,
    })
}

/// Rehash every `cat_*.csv` file in `dir`.
pub fn rehash_directory(dir: &Path) -> Result<Vec<RehashReport>> {
    if !dir.is_dir() {
        return Err(BankError::DirectoryNotFound(dir.to_path_buf()));
    }
    let files = category_files(dir)?;
    if files.is_empty() {
        return Err(BankError::NoQuestionFiles(dir.to_path_buf()));
    }
    files.iter().map(|path| rehash_file(path)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_ignores_case_punctuation_and_spacing() {
        let a = content_hash("What is a pointer?");
        let b = content_hash("  what   is a POINTER ");
        assert_eq!(a, b);
        assert_eq!(a.len(), HASH_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, content_hash("What is a reference?"));
    }

    #[test]
    fn hash_known_value() {
        // md5("hello world") = 5eb63bbbe01eeed093cb22bb8f5acdc3
        assert_eq!(content_hash("Hello, World!"), "5eb63bbb");
    }

    #[test]
    fn hash_keeps_unicode_letters() {
        assert_ne!(content_hash("Ce este o funcție?"), content_hash("Ce este o funcie?"));
    }

    #[test]
    fn rehash_rewrites_only_hash_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat_basics.csv");
        let expected = content_hash("What is 2+2?");
        std::fs::write(
            &path,
            format!(
                "hash,question,type,difficulty,category,options,correct_answer\n\
                 old1,What is 2+2?,multiple_choice,easy,basics,\"[\"\"3\"\",\"\"4\"\"]\",4\n\
                 {expected},What is 2+2?,short_answer,easy,basics,,4\n"
            ),
        )
        .unwrap();

        let report = rehash_file(&path).unwrap();
        assert_eq!(report.rows, 2);
        assert_eq!(report.changes.len(), 1);
        assert_eq!(report.changes[0].old, "old1");
        assert_eq!(report.changes[0].new, expected);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(&records[0][0], expected.as_str());
        assert_eq!(&records[0][5], r#"["3","4"]"#);
        assert_eq!(&records[1][0], expected.as_str());
    }

    #[test]
    fn rehash_keeps_header_and_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat_basics.csv");
        std::fs::write(
            &path,
            "hash,question,type,difficulty,category,options,correct_answer,notes\n\
             x,\"Say \"\"hi\"\"\",short_answer,easy,basics,,hi,keep me\n",
        )
        .unwrap();

        rehash_file(&path).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            first.lines().next(),
            Some("hash,question,type,difficulty,category,options,correct_answer,notes")
        );
        assert!(first.trim_end().ends_with(",keep me"));

        let report = rehash_file(&path).unwrap();
        assert!(report.changes.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn rehash_leaves_malformed_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat_broken.csv");
        let content = "hash,question,type\nold,What is 2+2?,short_answer\nold,too,many,fields\n";
        std::fs::write(&path, content).unwrap();

        assert!(rehash_file(&path).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn rehash_directory_requires_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            rehash_directory(dir.path()),
            Err(BankError::NoQuestionFiles(_))
        ));
    }
}
