//! The `qbank init` command.

use std::path::Path;

use anyhow::{Context, Result};
use qbank_core::hashing::content_hash;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("exam.yaml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("questions").context("failed to create questions/")?;
    write_if_missing(Path::new("questions/mappings.yaml"), SAMPLE_MAPPINGS)?;
    write_if_missing(Path::new("questions/cat_basics.csv"), &sample_questions()?)?;

    println!("\nNext steps:");
    println!("  1. Add questions to questions/cat_*.csv");
    println!("  2. Run: qbank validate --config exam.yaml");
    println!("  3. Run: qbank generate --config exam.yaml");
    println!("  4. Run: qbank encrypt before committing the bank");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

/// The sample category file, with hashes computed from the question text.
fn sample_questions() -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "hash",
        "question",
        "type",
        "difficulty",
        "category",
        "options",
        "correct_answer",
    ])?;
    for (question, kind, difficulty, options, answer) in SAMPLE_QUESTIONS {
        let hash = content_hash(question);
        writer.write_record([
            hash.as_str(),
            question,
            kind,
            difficulty,
            "basics",
            options,
            answer,
        ])?;
    }
    let bytes = writer.into_inner().context("failed to serialize sample questions")?;
    Ok(String::from_utf8(bytes)?)
}

/// (question, type, difficulty, options, correct_answer)
const SAMPLE_QUESTIONS: &[(&str, &str, &str, &str, &str)] = &[
    (
        "What does `printf(\"%d\", 7 / 2)` print?",
        "multiple_choice",
        "easy",
        r#"["3", "3.5", "4", "3.0"]"#,
        "3",
    ),
    (
        "What does `printf(\"%d\", 7 / 2)` print?",
        "short_answer",
        "easy",
        "",
        "3",
    ),
    (
        "Which keyword exits the innermost loop?",
        "multiple_choice",
        "easy",
        r#"["return", "break", "continue", "exit"]"#,
        "break",
    ),
    (
        "What is the value of $2^{10}$?",
        "short_answer",
        "medium",
        "",
        "1024",
    ),
    (
        "Explain the difference between `while` and `do-while` loops.",
        "free_text",
        "medium",
        "",
        "",
    ),
    (
        "Write a function that returns the largest element of an integer array.",
        "code",
        "hard",
        "",
        "",
    ),
];

const SAMPLE_CONFIG: &str = r#"# qbank exam configuration

question_selection:
  # category keys or labels from questions/mappings.yaml, or "*" for all
  categories: "*"
  difficulty_config:
    difficulty_distribution:
      easy: 2
      medium: 2
      hard: 1
    points_per_question: 5
  preferred_question_types:
    - multiple_choice
    - short_answer
    - free_text
    - code
    - essay

test_settings:
  title: "Programming Basics"
  subtitle: "Practice test"
  time_limit_minutes: 30
  output_format: both
  output_filename: test.md
  output_directory: out
  shuffle_questions: false
  shuffle_options: false
  include_answers: true

question_format:
  numbering_style: numeric
  include_difficulty_label: false
  include_category_label: false

header:
  include: false
  content: ""

footer:
  include: true
  content: "**Good luck!**"

advanced:
  # random_seed: 42
  generate_variants: false
  num_variants: 3
  variant_suffix: "_variant_{n}"
"#;

const SAMPLE_MAPPINGS: &str = r#"categories:
  basics: "Programming Basics"
"#;
