//! Question bank validation.
//!
//! Reports issues that would silently degrade a generated exam: stale hashes,
//! unknown categories, rows the type-preference step would drop, broken
//! option lists, and tiers that cannot be filled.

use std::collections::HashSet;

use crate::bank::QuestionBank;
use crate::config::ExamConfig;
use crate::hashing::content_hash;
use crate::model::{normalize_difficulty, QuestionType};
use crate::selector::{dedup_by_type_preference, filter_by_categories};

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Hash of the offending question (if applicable).
    pub hash: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn for_question(hash: &str, message: impl Into<String>) -> Self {
        Self {
            hash: Some(hash.to_string()),
            message: message.into(),
        }
    }
}

/// Validate a bank, optionally against the exam configuration that will use it.
pub fn validate_bank(bank: &QuestionBank, config: Option<&ExamConfig>) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Stale content hashes
    for q in &bank.questions {
        let expected = content_hash(&q.question);
        if q.hash != expected {
            warnings.push(ValidationWarning::for_question(
                &q.hash,
                format!("hash does not match question text (expected {expected}); run `qbank rehash`"),
            ));
        }
    }

    // Categories missing from the mapping
    if !bank.categories.is_empty() {
        let mut reported = HashSet::new();
        for q in &bank.questions {
            if !bank.categories.contains_key(&q.category) && reported.insert(q.category.as_str()) {
                warnings.push(ValidationWarning::for_question(
                    &q.hash,
                    format!("category '{}' is not in the mapping", q.category),
                ));
            }
        }
    }

    // Option lists
    for q in &bank.questions {
        match q.parse_options() {
            Err(e) => warnings.push(ValidationWarning::for_question(
                &q.hash,
                format!("options are not a valid JSON list: {e}"),
            )),
            Ok(None) if q.kind == QuestionType::MultipleChoice => {
                warnings.push(ValidationWarning::for_question(
                    &q.hash,
                    "multiple-choice question has no options",
                ));
            }
            Ok(Some(options)) if q.kind == QuestionType::MultipleChoice => {
                if let Some(correct) = q.correct_answer.as_deref() {
                    if !options.iter().any(|o| o == correct) {
                        warnings.push(ValidationWarning::for_question(
                            &q.hash,
                            format!("correct answer '{correct}' is not among the options"),
                        ));
                    }
                }
            }
            Ok(_) => {}
        }
    }

    if let Some(config) = config {
        let selection = &config.question_selection;
        let preference = &selection.preferred_question_types;

        for q in &bank.questions {
            if !preference.contains(&q.kind) {
                warnings.push(ValidationWarning::for_question(
                    &q.hash,
                    format!(
                        "type '{}' is not in preferred_question_types and will never be selected",
                        q.kind
                    ),
                ));
            }
        }

        let filtered = filter_by_categories(&bank.questions, &selection.categories, &bank.categories);
        let unique = dedup_by_type_preference(&filtered, preference);
        for (tier, &requested) in &selection.difficulty_distribution {
            let key = normalize_difficulty(tier);
            let available = unique.iter().filter(|q| q.difficulty_key() == key).count();
            if available < requested as usize {
                warnings.push(ValidationWarning {
                    hash: None,
                    message: format!(
                        "tier '{tier}' requests {requested} questions but only {available} are available"
                    ),
                });
            }
        }
    }

    warnings
}
