//! The `qbank validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use qbank_core::validate::validate_bank;
use qbank_core::{ExamConfig, QuestionBank};

pub fn execute(config_path: Option<PathBuf>, questions_dir: PathBuf) -> Result<()> {
    let bank = QuestionBank::load(&questions_dir)?;
    let config = config_path
        .map(|path| {
            ExamConfig::load(&path).with_context(|| format!("failed to load config {}", path.display()))
        })
        .transpose()?;

    println!(
        "Question bank: {} questions in {} files ({} categories mapped)",
        bank.len(),
        bank.sources.len(),
        bank.categories.len()
    );

    let warnings = validate_bank(&bank, config.as_ref());
    for w in &warnings {
        let prefix = w
            .hash
            .as_ref()
            .map(|hash| format!("  [{hash}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Question bank valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }
    Ok(())
}
