//! Backend-independent exam layout.
//!
//! [`ExamDocument`] is built once per exam from a [`Selection`]: numbering,
//! labels, point values, and the final option order of every multiple-choice
//! question are fixed here, so every renderer and the answer key agree.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use qbank_core::bank::CategoryMap;
use qbank_core::config::{ExamConfig, Labels, NumberingStyle};
use qbank_core::model::QuestionType;
use qbank_core::selector::Selection;

const ROMAN: [&str; 10] = ["i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix", "x"];

/// Label of the `n`-th item (1-based) in a numbering style.
///
/// Alphabetic numbering continues `z)`, `aa)`, `ab)`; roman numbering stops
/// at `x`.
pub fn number_label(style: NumberingStyle, n: usize) -> String {
    match style {
        NumberingStyle::Numeric => format!("{n}."),
        NumberingStyle::Alphabetic => format!("{})", letters(n)),
        NumberingStyle::Roman => ROMAN[n.clamp(1, ROMAN.len()) - 1].to_string(),
    }
}

/// Bijective base-26 letters: 1 -> a, 26 -> z, 27 -> aa.
pub fn letters(mut n: usize) -> String {
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Letter of the option at `index` (0-based).
pub fn option_letter(index: usize) -> String {
    letters(index + 1)
}

/// Space left for the student's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSpace {
    /// Multiple choice: the options are the answer space.
    None,
    /// A one-line strip.
    Short,
    /// A medium box for code, essays, and unrecognized types.
    Medium,
    /// A large box for free-text explanations.
    Large,
}

impl AnswerSpace {
    pub fn for_type(kind: &QuestionType) -> Self {
        match kind {
            QuestionType::MultipleChoice => AnswerSpace::None,
            QuestionType::ShortAnswer => AnswerSpace::Short,
            QuestionType::FreeText => AnswerSpace::Large,
            QuestionType::Code | QuestionType::Essay | QuestionType::Other(_) => AnswerSpace::Medium,
        }
    }

    /// Box size in centimetres (width, height).
    pub fn dimensions_cm(self) -> Option<(f32, f32)> {
        match self {
            AnswerSpace::None => None,
            AnswerSpace::Short => Some((15.0, 1.5)),
            AnswerSpace::Medium => Some((15.0, 5.0)),
            AnswerSpace::Large => Some((15.0, 6.0)),
        }
    }
}

/// One question, ready to be rendered.
#[derive(Debug, Clone, Serialize)]
pub struct FormattedQuestion {
    /// Display number, e.g. `3.`, `c)`, or `iii`.
    pub number: String,
    pub hash: String,
    pub text: String,
    /// Inline labels shown after the text (difficulty, category).
    pub labels: Vec<String>,
    pub points: u32,
    pub kind: QuestionType,
    /// Options in display order; `None` for non-multiple-choice questions
    /// and for option lists that could not be parsed.
    pub options: Option<Vec<String>>,
    pub correct_answer: Option<String>,
    pub answer_space: AnswerSpace,
}

/// A complete exam in render-ready form.
#[derive(Debug, Clone, Serialize)]
pub struct ExamDocument {
    pub title: String,
    pub subtitle: Option<String>,
    pub time_limit_minutes: u32,
    pub total_points: u32,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub questions: Vec<FormattedQuestion>,
    #[serde(skip)]
    pub labels: Labels,
}

impl ExamDocument {
    /// Lay out `selection` according to `config`.
    ///
    /// Options are shuffled here when `shuffle_options` is set, drawing from
    /// `rng`.
    pub fn build<R: Rng + ?Sized>(
        selection: &Selection,
        config: &ExamConfig,
        categories: &CategoryMap,
        rng: &mut R,
    ) -> Self {
        let format = &config.question_format;
        let settings = &config.test_settings;

        let questions = selection
            .questions
            .iter()
            .enumerate()
            .map(|(i, selected)| {
                let q = &selected.question;

                let mut labels = Vec::new();
                if format.include_difficulty_label {
                    labels.push(selected.original_difficulty.clone());
                }
                if format.include_category_label {
                    labels.push(categories.label_for(&q.category).to_string());
                }

                let options = if q.kind == QuestionType::MultipleChoice {
                    match q.parse_options() {
                        Ok(Some(mut options)) => {
                            if settings.shuffle_options {
                                options.shuffle(rng);
                            }
                            Some(options)
                        }
                        Ok(None) => None,
                        Err(e) => {
                            tracing::warn!("could not parse options for question {}: {e}", q.hash);
                            None
                        }
                    }
                } else {
                    None
                };

                FormattedQuestion {
                    number: number_label(format.numbering_style, i + 1),
                    hash: q.hash.clone(),
                    text: q.question.clone(),
                    labels,
                    points: selected.calculated_points,
                    kind: q.kind.clone(),
                    options,
                    correct_answer: q.correct_answer.clone(),
                    answer_space: AnswerSpace::for_type(&q.kind),
                }
            })
            .collect();

        Self {
            title: settings.title.clone(),
            subtitle: Some(settings.subtitle.clone()).filter(|s| !s.is_empty()),
            time_limit_minutes: settings.time_limit_minutes,
            total_points: selection.total_points(),
            header: config.header.enabled().map(str::to_string),
            footer: config.footer.enabled().map(str::to_string),
            questions,
            labels: config.labels.clone(),
        }
    }
}

/// One line of the answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerKeyEntry {
    pub number: usize,
    pub answer: String,
    pub points: u32,
}

/// Correct answers of an exam, in question order.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerKey {
    pub title: String,
    pub points_label: String,
    pub entries: Vec<AnswerKeyEntry>,
}

impl AnswerKey {
    /// Resolve the answers of `document`.
    ///
    /// Multiple-choice answers are located in the displayed option order and
    /// shown as `b) value`; when that fails the raw answer (or `N/A`) is used.
    /// Other questions show their answer text or the open-answer label.
    pub fn build(document: &ExamDocument) -> Self {
        let entries = document
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let answer = if q.kind == QuestionType::MultipleChoice {
                    let correct = q.correct_answer.as_deref();
                    let position = correct.and_then(|c| {
                        q.options
                            .as_ref()
                            .and_then(|options| options.iter().position(|o| o == c))
                    });
                    match (position, correct) {
                        (Some(index), Some(c)) => format!("{}) {c}", option_letter(index)),
                        (None, Some(c)) => c.to_string(),
                        _ => "N/A".to_string(),
                    }
                } else {
                    q.correct_answer
                        .clone()
                        .unwrap_or_else(|| document.labels.open_answer.clone())
                };

                AnswerKeyEntry {
                    number: i + 1,
                    answer,
                    points: q.points,
                }
            })
            .collect();

        Self {
            title: document.labels.answer_key_title.clone(),
            points_label: document.labels.points.clone(),
            entries,
        }
    }
}
