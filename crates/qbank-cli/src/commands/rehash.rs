//! The `qbank rehash` command.

use std::path::PathBuf;

use anyhow::Result;
use qbank_core::hashing::rehash_directory;

pub fn execute(questions_dir: PathBuf) -> Result<()> {
    let reports = rehash_directory(&questions_dir)?;

    let mut total_changes = 0;
    for report in &reports {
        let name = report
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!(
            "{name}: {} rows, {} hashes updated",
            report.rows,
            report.changes.len()
        );
        for change in &report.changes {
            println!("  {} -> {}  {}", change.old, change.new, change.question);
        }
        total_changes += report.changes.len();
    }

    if total_changes == 0 {
        println!("All hashes up to date.");
    } else {
        println!("\n{total_changes} hash(es) updated.");
    }
    Ok(())
}
