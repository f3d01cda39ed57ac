//! Core data model types for qbank.
//!
//! A [`Question`] is one row of a category CSV file. Selection annotates it
//! into a [`SelectedQuestion`] carrying the tier it was drawn for and the
//! points it is worth.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of answer a question expects.
///
/// Unrecognized type names are preserved in [`QuestionType::Other`] so that
/// the type-preference step can decide what to do with them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionType {
    MultipleChoice,
    ShortAnswer,
    FreeText,
    Code,
    Essay,
    Other(String),
}

impl QuestionType {
    /// The default preference order used when the configuration has none.
    pub fn default_preference() -> Vec<QuestionType> {
        vec![
            QuestionType::MultipleChoice,
            QuestionType::ShortAnswer,
            QuestionType::FreeText,
            QuestionType::Code,
            QuestionType::Essay,
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::ShortAnswer => "short_answer",
            QuestionType::FreeText => "free_text",
            QuestionType::Code => "code",
            QuestionType::Essay => "essay",
            QuestionType::Other(name) => name,
        }
    }
}

impl From<String> for QuestionType {
    fn from(s: String) -> Self {
        match s.trim() {
            "multiple_choice" => QuestionType::MultipleChoice,
            "short_answer" => QuestionType::ShortAnswer,
            "free_text" | "free_text_answer" => QuestionType::FreeText,
            "code" => QuestionType::Code,
            "essay" => QuestionType::Essay,
            other => QuestionType::Other(other.to_string()),
        }
    }
}

impl From<QuestionType> for String {
    fn from(t: QuestionType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a difficulty label for matching: lowercase, spaces become `_`.
pub fn normalize_difficulty(label: &str) -> String {
    label.trim().to_lowercase().replace(' ', "_")
}

/// The fixed difficulty ladder, easiest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Trivial,
    Easy,
    Medium,
    Hard,
    VeryHard,
}

impl Difficulty {
    /// Rank used to order a selection when shuffling is off.
    pub fn rank(self) -> u32 {
        match self {
            Difficulty::Trivial => 1,
            Difficulty::Easy => 2,
            Difficulty::Medium => 3,
            Difficulty::Hard => 4,
            Difficulty::VeryHard => 5,
        }
    }

    /// Rank of an arbitrary tier label; unknown labels sort last.
    pub fn rank_of_label(label: &str) -> u32 {
        label
            .parse::<Difficulty>()
            .map(Difficulty::rank)
            .unwrap_or(UNKNOWN_RANK)
    }
}

/// Rank given to tier labels outside the difficulty ladder.
pub const UNKNOWN_RANK: u32 = 999;

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Trivial => write!(f, "trivial"),
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
            Difficulty::VeryHard => write!(f, "very_hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_difficulty(s).as_str() {
            "trivial" => Ok(Difficulty::Trivial),
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "very_hard" => Ok(Difficulty::VeryHard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// A single question record as stored in a category CSV file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Content fingerprint used as the deduplication identity.
    pub hash: String,
    /// Question text; may contain inline code and `$...$` math.
    pub question: String,
    /// Answer type.
    #[serde(rename = "type")]
    pub kind: QuestionType,
    /// Difficulty as written in the file (case and spacing vary).
    pub difficulty: String,
    /// Category key (snake_case) into the category mapping.
    pub category: String,
    /// JSON-encoded option list, present for multiple-choice questions.
    #[serde(default)]
    pub options: Option<String>,
    /// Expected answer, if any.
    #[serde(default)]
    pub correct_answer: Option<String>,
}

impl Question {
    /// Difficulty normalized for tier matching.
    pub fn difficulty_key(&self) -> String {
        normalize_difficulty(&self.difficulty)
    }

    /// Parse the JSON option list.
    ///
    /// Returns `Ok(None)` when the row has no options. Non-string JSON values
    /// are rendered with their JSON text.
    pub fn parse_options(&self) -> Result<Option<Vec<String>>, serde_json::Error> {
        let Some(raw) = self.options.as_deref().filter(|s| !s.trim().is_empty()) else {
            return Ok(None);
        };
        let values: Vec<serde_json::Value> = serde_json::from_str(raw)?;
        Ok(Some(
            values
                .into_iter()
                .map(|v| match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
        ))
    }
}

/// A question chosen for an exam, annotated with its tier and point value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedQuestion {
    #[serde(flatten)]
    pub question: Question,
    /// Points for this question (the tier's points-per-question).
    pub calculated_points: u32,
    /// Tier label exactly as written in the configuration.
    pub original_difficulty: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mc(options: Option<&str>) -> Question {
        Question {
            hash: "abcd1234".into(),
            question: "What is 1 + 2?".into(),
            kind: QuestionType::MultipleChoice,
            difficulty: "Easy".into(),
            category: "arithmetic".into(),
            options: options.map(str::to_string),
            correct_answer: Some("3".into()),
        }
    }

    #[test]
    fn question_type_parse() {
        assert_eq!(
            QuestionType::from("multiple_choice".to_string()),
            QuestionType::MultipleChoice
        );
        assert_eq!(
            QuestionType::from("free_text_answer".to_string()),
            QuestionType::FreeText
        );
        assert_eq!(
            QuestionType::from("matching".to_string()),
            QuestionType::Other("matching".into())
        );
        assert_eq!(QuestionType::ShortAnswer.to_string(), "short_answer");
    }

    #[test]
    fn difficulty_parse_is_case_and_space_insensitive() {
        assert_eq!("Very Hard".parse::<Difficulty>().unwrap(), Difficulty::VeryHard);
        assert_eq!(" EASY ".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("very_hard".parse::<Difficulty>().unwrap(), Difficulty::VeryHard);
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn difficulty_rank_order() {
        assert!(Difficulty::Trivial.rank() < Difficulty::Easy.rank());
        assert!(Difficulty::Hard.rank() < Difficulty::VeryHard.rank());
        assert_eq!(Difficulty::rank_of_label("Medium"), 3);
        assert_eq!(Difficulty::rank_of_label("bonus"), UNKNOWN_RANK);
    }

    #[test]
    fn parse_options_variants() {
        assert_eq!(
            mc(Some(r#"["2","3","4"]"#)).parse_options().unwrap(),
            Some(vec!["2".to_string(), "3".to_string(), "4".to_string()])
        );
        assert_eq!(
            mc(Some("[1, 2.5, true]")).parse_options().unwrap(),
            Some(vec!["1".to_string(), "2.5".to_string(), "true".to_string()])
        );
        assert_eq!(mc(None).parse_options().unwrap(), None);
        assert_eq!(mc(Some("  ")).parse_options().unwrap(), None);
        assert!(mc(Some("[not json")).parse_options().is_err());
    }
}
