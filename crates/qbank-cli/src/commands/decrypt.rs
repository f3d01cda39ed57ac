//! The `qbank decrypt` command.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use qbank_crypto::{decrypt_directory, verify_decrypted, CryptoError, Placement};

use super::{print_tally, read_password, ConsoleReporter};

pub fn execute(
    password: Option<String>,
    encrypted_dir: PathBuf,
    output_dir: PathBuf,
    in_place: bool,
    overwrite: bool,
    verify: bool,
) -> Result<()> {
    let password = read_password(password, false)?;

    if !encrypted_dir.is_dir() {
        return Err(CryptoError::DirectoryNotFound(encrypted_dir).into());
    }

    let placement = if in_place {
        println!("Decrypting files in place in {}", encrypted_dir.display());
        Placement::InPlace
    } else {
        let existing = count_entries(&output_dir)?;
        if existing > 0 && !overwrite {
            println!(
                "Output directory {} contains {existing} files",
                output_dir.display()
            );
            if !confirm("Continue and potentially overwrite files? (y/N): ")? {
                bail!("operation cancelled");
            }
        }
        println!(
            "Decrypting question bank from {} to {}",
            encrypted_dir.display(),
            output_dir.display()
        );
        Placement::Directory(output_dir.clone())
    };

    let reporter = ConsoleReporter { verb: "Decrypted" };
    let summary = decrypt_directory(&encrypted_dir, &password, &placement, &reporter)?;
    print_tally(&summary, "Decrypted");

    if !summary.all_succeeded() {
        bail!(
            "{} of {} files failed to decrypt; this usually means the password is incorrect",
            summary.failed(),
            summary.total
        );
    }
    println!("All files decrypted successfully.");

    if verify && !in_place {
        if verify_decrypted(&output_dir)? {
            println!("Decrypted files appear to be valid.");
        } else {
            println!("WARNING: some decrypted files may be corrupted.");
        }
    }
    Ok(())
}

fn count_entries(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }
    let entries = std::fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    Ok(entries.count())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
