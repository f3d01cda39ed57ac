//! Question repository loader.
//!
//! A questions directory holds a `mappings.yaml` category mapping and one
//! `cat_*.csv` file per category. Loading unions every category file into a
//! single in-memory table, in sorted file-name order.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{BankError, Result};
use crate::model::Question;

/// File name of the category mapping inside a questions directory.
pub const MAPPINGS_FILE: &str = "mappings.yaml";

/// File-name prefix of per-category question files.
pub const CATEGORY_FILE_PREFIX: &str = "cat_";

/// Category key -> human-readable label, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap {
    categories: IndexMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct MappingFile {
    categories: Option<IndexMap<String, String>>,
}

impl CategoryMap {
    pub fn new(categories: IndexMap<String, String>) -> Self {
        Self { categories }
    }

    /// Load the `categories` section of a mapping file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| BankError::Mapping {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse_str(&content, path)
    }

    pub fn parse_str(content: &str, source_path: &Path) -> Result<Self> {
        let parsed: MappingFile =
            serde_yaml::from_str(content).map_err(|e| BankError::Mapping {
                path: source_path.to_path_buf(),
                message: e.to_string(),
            })?;
        let categories = parsed.categories.ok_or_else(|| BankError::Mapping {
            path: source_path.to_path_buf(),
            message: "missing `categories` section".into(),
        })?;
        Ok(Self { categories })
    }

    /// Display label for a key, falling back to the key itself.
    pub fn label_for<'a>(&'a self, key: &'a str) -> &'a str {
        self.categories.get(key).map(String::as_str).unwrap_or(key)
    }

    /// Resolve a category given either as a label or as a key to its key.
    ///
    /// Names that match neither are returned unchanged.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.categories
            .iter()
            .find(|(_, label)| label.as_str() == name)
            .map(|(key, _)| key.as_str())
            .unwrap_or(name)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.categories.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Every question of a questions directory plus its category mapping.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    pub categories: CategoryMap,
    pub questions: Vec<Question>,
    /// Category files that were read, in load order.
    pub sources: Vec<PathBuf>,
}

impl QuestionBank {
    pub fn new(categories: CategoryMap, questions: Vec<Question>) -> Self {
        Self {
            categories,
            questions,
            sources: Vec::new(),
        }
    }

    /// Load the mapping and every `cat_*.csv` file from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(BankError::DirectoryNotFound(dir.to_path_buf()));
        }

        let categories = CategoryMap::load(&dir.join(MAPPINGS_FILE))?;

        let files = category_files(dir)?;
        if files.is_empty() {
            return Err(BankError::NoQuestionFiles(dir.to_path_buf()));
        }

        let mut questions = Vec::new();
        for path in &files {
            let loaded = read_question_file(path)?;
            tracing::debug!("loaded {} questions from {}", loaded.len(), path.display());
            questions.extend(loaded);
        }

        tracing::info!(
            "loaded {} questions from {} categories",
            questions.len(),
            files.len()
        );

        Ok(Self {
            categories,
            questions,
            sources: files,
        })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Sorted list of `cat_*.csv` files directly inside `dir`.
pub fn category_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| BankError::io(dir, e))? {
        let path = entry.map_err(|e| BankError::io(dir, e))?.path();
        if path.is_file() && is_category_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Whether `path` names a per-category question file (`cat_*.csv`).
pub fn is_category_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.starts_with(CATEGORY_FILE_PREFIX) && name.ends_with(".csv")
}

/// Read every record of one category CSV file.
pub fn read_question_file(path: &Path) -> Result<Vec<Question>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| BankError::csv(path, e))?;
    reader
        .deserialize::<Question>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| BankError::csv(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionType;

    const MAPPINGS: &str = r#"
categories:
  control_flow: "Control Flow"
  pointers: "Pointers & Memory"
"#;

    const CONTROL_FLOW_CSV: &str = "\
hash,question,type,difficulty,category,options,correct_answer
a1,What does `break` do?,short_answer,Easy,control_flow,,Exits the loop
a2,Pick the loop keyword,multiple_choice,easy,control_flow,\"[\"\"for\"\",\"\"if\"\"]\",for
";

    const POINTERS_CSV: &str = "\
hash,question,type,difficulty,category,options,correct_answer
b1,Explain dangling pointers,free_text,Very Hard,pointers,,
";

    fn write_bank(dir: &Path) {
        std::fs::write(dir.join(MAPPINGS_FILE), MAPPINGS).unwrap();
        std::fs::write(dir.join("cat_pointers.csv"), POINTERS_CSV).unwrap();
        std::fs::write(dir.join("cat_control_flow.csv"), CONTROL_FLOW_CSV).unwrap();
        std::fs::write(dir.join("notes.csv"), "ignored").unwrap();
    }

    #[test]
    fn category_map_lookup() {
        let map = CategoryMap::parse_str(MAPPINGS, Path::new("mappings.yaml")).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.label_for("pointers"), "Pointers & Memory");
        assert_eq!(map.label_for("unknown"), "unknown");
        assert_eq!(map.resolve("Control Flow"), "control_flow");
        assert_eq!(map.resolve("control_flow"), "control_flow");
        assert_eq!(map.resolve("Graphs"), "Graphs");
    }

    #[test]
    fn mapping_without_categories_is_error() {
        let err = CategoryMap::parse_str("other: 1\n", Path::new("m.yaml")).unwrap_err();
        assert!(matches!(err, BankError::Mapping { .. }));
    }

    #[test]
    fn load_bank_concatenates_sorted_files() {
        let dir = tempfile::tempdir().unwrap();
        write_bank(dir.path());

        let bank = QuestionBank::load(dir.path()).unwrap();
        assert_eq!(bank.len(), 3);
        assert_eq!(bank.sources.len(), 2);
        let hashes: Vec<_> = bank.questions.iter().map(|q| q.hash.as_str()).collect();
        assert_eq!(hashes, vec!["a1", "a2", "b1"]);

        let first = &bank.questions[0];
        assert_eq!(first.kind, QuestionType::ShortAnswer);
        assert_eq!(first.options, None);
        assert_eq!(first.correct_answer.as_deref(), Some("Exits the loop"));

        let mc = &bank.questions[1];
        assert_eq!(
            mc.parse_options().unwrap(),
            Some(vec!["for".to_string(), "if".to_string()])
        );

        assert_eq!(bank.questions[2].correct_answer, None);
        assert_eq!(bank.questions[2].difficulty_key(), "very_hard");
    }

    #[test]
    fn load_missing_directory() {
        let err = QuestionBank::load(Path::new("/nonexistent/questions")).unwrap_err();
        assert!(matches!(err, BankError::DirectoryNotFound(_)));
    }

    #[test]
    fn load_missing_mapping_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cat_a.csv"), POINTERS_CSV).unwrap();
        let err = QuestionBank::load(dir.path()).unwrap_err();
        assert!(matches!(err, BankError::Mapping { .. }));
    }

    #[test]
    fn load_without_category_files_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MAPPINGS_FILE), MAPPINGS).unwrap();
        let err = QuestionBank::load(dir.path()).unwrap_err();
        assert!(matches!(err, BankError::NoQuestionFiles(_)));
    }

    #[test]
    fn category_file_names() {
        assert!(is_category_file(Path::new("q/cat_loops.csv")));
        assert!(!is_category_file(Path::new("q/loops.csv")));
        assert!(!is_category_file(Path::new("q/cat_loops.encrypted")));
    }
}
