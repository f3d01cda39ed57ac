//! The `qbank encrypt` command.

use std::path::PathBuf;

use anyhow::{bail, Result};
use qbank_crypto::{encrypt_directory, Placement};

use super::{print_tally, read_password, ConsoleReporter};

pub fn execute(
    password: Option<String>,
    questions_dir: PathBuf,
    output_dir: PathBuf,
    in_place: bool,
    include_mappings: bool,
) -> Result<()> {
    let password = read_password(password, true)?;

    let placement = if in_place {
        println!("Encrypting question bank in place in {}", questions_dir.display());
        Placement::InPlace
    } else {
        println!(
            "Encrypting question bank from {} to {}",
            questions_dir.display(),
            output_dir.display()
        );
        Placement::Directory(output_dir.clone())
    };

    let reporter = ConsoleReporter { verb: "Encrypted" };
    let summary = encrypt_directory(&questions_dir, &password, &placement, include_mappings, &reporter)?;
    print_tally(&summary, "Encrypted");

    if !summary.all_succeeded() {
        bail!("{} of {} files failed to encrypt", summary.failed(), summary.total);
    }

    println!("All files encrypted successfully.");
    if in_place {
        println!("Original files have been replaced with encrypted versions.");
    } else {
        println!("Encrypted files saved to {}", output_dir.display());
    }
    println!("Keep your password safe: without it the files cannot be decrypted.");
    Ok(())
}
