//! Exam configuration.
//!
//! The configuration document (YAML, or TOML when the file ends in `.toml`)
//! is read once into [`ExamConfig`] and validated before any work starts.
//! Required sections produce [`BankError::MissingSection`]; everything else
//! falls back to documented defaults. Unknown keys are ignored.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{BankError, Result};
use crate::model::QuestionType;

/// Fully validated exam configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ExamConfig {
    pub question_selection: QuestionSelection,
    pub test_settings: TestSettings,
    pub question_format: QuestionFormat,
    pub header: TextBlock,
    pub footer: TextBlock,
    pub advanced: Advanced,
    pub labels: Labels,
    pub assets: Assets,
}

/// Which categories to draw from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CategoryFilter {
    /// The wildcard `"*"`: every category.
    All,
    /// Category keys or human-readable labels.
    Only(Vec<String>),
}

/// The `question_selection` section.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionSelection {
    pub categories: CategoryFilter,
    /// Tier label -> requested count, in document order.
    pub difficulty_distribution: IndexMap<String, u32>,
    pub points_per_question: u32,
    pub preferred_question_types: Vec<QuestionType>,
}

/// Requested output artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[serde(alias = "md")]
    Markdown,
    Pdf,
    Both,
}

impl OutputFormat {
    pub fn wants_markdown(self) -> bool {
        matches!(self, OutputFormat::Markdown | OutputFormat::Both)
    }

    pub fn wants_print(self) -> bool {
        matches!(self, OutputFormat::Pdf | OutputFormat::Both)
    }
}

/// The `test_settings` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TestSettings {
    pub shuffle_questions: bool,
    pub shuffle_options: bool,
    pub output_format: OutputFormat,
    pub output_filename: String,
    pub output_directory: PathBuf,
    pub title: String,
    pub subtitle: String,
    pub time_limit_minutes: u32,
    pub include_answers: bool,
}

impl Default for TestSettings {
    fn default() -> Self {
        Self {
            shuffle_questions: false,
            shuffle_options: false,
            output_format: OutputFormat::Markdown,
            output_filename: "test.md".into(),
            output_directory: PathBuf::from("out"),
            title: "Test".into(),
            subtitle: String::new(),
            time_limit_minutes: 60,
            include_answers: false,
        }
    }
}

/// How questions are numbered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberingStyle {
    #[default]
    Numeric,
    Alphabetic,
    Roman,
}

/// The `question_format` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionFormat {
    pub numbering_style: NumberingStyle,
    pub include_difficulty_label: bool,
    pub include_category_label: bool,
}

/// A `header` or `footer` block of Markdown text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextBlock {
    pub include: bool,
    pub content: String,
}

impl TextBlock {
    /// The block content when it is enabled.
    pub fn enabled(&self) -> Option<&str> {
        self.include.then_some(self.content.as_str())
    }
}

/// The `advanced` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Advanced {
    pub random_seed: Option<u64>,
    pub generate_variants: bool,
    pub num_variants: u32,
    /// Filename suffix template; `{n}` is replaced by the variant number.
    pub variant_suffix: String,
}

impl Default for Advanced {
    fn default() -> Self {
        Self {
            random_seed: None,
            generate_variants: false,
            num_variants: 3,
            variant_suffix: "_variant_{n}".into(),
        }
    }
}

impl Advanced {
    pub fn suffix_for(&self, n: u32) -> String {
        self.variant_suffix.replace("{n}", &n.to_string())
    }
}

/// Localized strings used by the renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub points: String,
    pub time_limit: String,
    pub minutes: String,
    pub total_points: String,
    pub answer: String,
    pub answer_key_title: String,
    pub open_answer: String,
    pub student_name: String,
    pub student_group: String,
    pub student_date: String,
    pub code_hint: String,
    pub free_text_hint: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            points: "puncte".into(),
            time_limit: "Timp de lucru".into(),
            minutes: "minute".into(),
            total_points: "Total puncte".into(),
            answer: "Răspuns".into(),
            answer_key_title: "Answer Key".into(),
            open_answer: "Open answer".into(),
            student_name: "Nume și Prenume:".into(),
            student_group: "Grupă:".into(),
            student_date: "Data:".into(),
            code_hint: "Scrie codul pentru rezolvarea exercițiului".into(),
            free_text_hint: "Scrie în propriile cuvinte (sau cod) cum ai rezolva exercițiul".into(),
        }
    }
}

/// Optional rendering assets for the print document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Assets {
    pub logo: Option<PathBuf>,
    /// Candidate Unicode fonts; the first one that exists is embedded.
    pub fonts: Vec<PathBuf>,
}

impl Default for Assets {
    fn default() -> Self {
        Self {
            logo: None,
            fonts: [
                "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
                "/System/Library/Fonts/Supplemental/Arial.ttf",
                "/System/Library/Fonts/Arial.ttf",
                "C:/Windows/Fonts/DejaVuSans.ttf",
                "C:/Windows/Fonts/Arial.ttf",
                "C:/Windows/Fonts/calibri.ttf",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw document shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawConfig {
    question_selection: Option<RawQuestionSelection>,
    test_settings: Option<TestSettings>,
    question_format: Option<QuestionFormat>,
    #[serde(default)]
    header: TextBlock,
    #[serde(default)]
    footer: TextBlock,
    #[serde(default)]
    advanced: Advanced,
    #[serde(default)]
    labels: Labels,
    #[serde(default)]
    assets: Assets,
}

#[derive(Debug, Deserialize)]
struct RawQuestionSelection {
    categories: Option<RawCategories>,
    difficulty_config: Option<RawDifficultyConfig>,
    #[serde(default)]
    preferred_question_types: Option<Vec<QuestionType>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCategories {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawDifficultyConfig {
    difficulty_distribution: Option<IndexMap<String, u32>>,
    #[serde(default = "default_points")]
    points_per_question: u32,
}

fn default_points() -> u32 {
    5
}

/// Document syntax of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        if path.extension().is_some_and(|ext| ext == "toml") {
            ConfigFormat::Toml
        } else {
            ConfigFormat::Yaml
        }
    }
}

impl ExamConfig {
    /// Load and validate a configuration file.
    ///
    /// A relative `assets.logo` path is resolved against the directory that
    /// holds the configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| BankError::io(path, e))?;
        let mut config = Self::parse_str(&content, ConfigFormat::from_path(path), path)?;

        if let (Some(logo), Some(base)) = (config.assets.logo.as_mut(), path.parent()) {
            if logo.is_relative() {
                *logo = base.join(&*logo);
            }
        }

        Ok(config)
    }

    /// Parse and validate a configuration string (useful for testing).
    pub fn parse_str(content: &str, format: ConfigFormat, source_path: &Path) -> Result<Self> {
        let raw: RawConfig = match format {
            ConfigFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| BankError::Config {
                    path: source_path.to_path_buf(),
                    message: e.to_string(),
                })?
            }
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| BankError::Config {
                path: source_path.to_path_buf(),
                message: e.to_string(),
            })?,
        };

        let config = Self::from_raw(raw)?;
        config.validate().map_err(|message| BankError::Config {
            path: source_path.to_path_buf(),
            message,
        })?;
        Ok(config)
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        let selection = raw
            .question_selection
            .ok_or(BankError::MissingSection("question_selection"))?;

        let categories = match selection
            .categories
            .ok_or(BankError::MissingSection("question_selection.categories"))?
        {
            RawCategories::One(s) if s.trim() == "*" => CategoryFilter::All,
            RawCategories::One(s) => CategoryFilter::Only(vec![s]),
            RawCategories::Many(list) if list.iter().any(|c| c.trim() == "*") => {
                CategoryFilter::All
            }
            RawCategories::Many(list) => CategoryFilter::Only(list),
        };

        let difficulty = selection
            .difficulty_config
            .ok_or(BankError::MissingSection("question_selection.difficulty_config"))?;
        let difficulty_distribution = difficulty.difficulty_distribution.ok_or(
            BankError::MissingSection("question_selection.difficulty_config.difficulty_distribution"),
        )?;

        Ok(ExamConfig {
            question_selection: QuestionSelection {
                categories,
                difficulty_distribution,
                points_per_question: difficulty.points_per_question,
                preferred_question_types: selection
                    .preferred_question_types
                    .unwrap_or_else(QuestionType::default_preference),
            },
            test_settings: raw
                .test_settings
                .ok_or(BankError::MissingSection("test_settings"))?,
            question_format: raw
                .question_format
                .ok_or(BankError::MissingSection("question_format"))?,
            header: raw.header,
            footer: raw.footer,
            advanced: raw.advanced,
            labels: raw.labels,
            assets: raw.assets,
        })
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let selection = &self.question_selection;
        if selection.difficulty_distribution.is_empty() {
            return Err("difficulty_distribution must list at least one tier".into());
        }
        if selection.preferred_question_types.is_empty() {
            return Err("preferred_question_types must not be empty".into());
        }
        if let CategoryFilter::Only(list) = &selection.categories {
            if list.is_empty() {
                return Err("categories must not be empty (use \"*\" for all)".into());
            }
        }
        if self.test_settings.output_filename.trim().is_empty() {
            return Err("output_filename must not be empty".into());
        }
        if self.advanced.generate_variants && self.advanced.num_variants == 0 {
            return Err("num_variants must be at least 1 when generate_variants is set".into());
        }
        Ok(())
    }

    /// Output filename without its `.md` extension.
    pub fn output_base_name(&self) -> &str {
        let name = self.test_settings.output_filename.as_str();
        name.strip_suffix(".md").unwrap_or(name)
    }
}
