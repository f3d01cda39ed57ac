pub mod decrypt;
pub mod encrypt;
pub mod generate;
pub mod init;
pub mod rehash;
pub mod validate;

use std::path::Path;

use anyhow::{bail, Context, Result};
use qbank_crypto::{BatchReporter, BatchSummary, CryptoError};

/// Use the password given on the command line, or prompt for it.
pub fn read_password(provided: Option<String>, confirm: bool) -> Result<String> {
    let password = match provided {
        Some(password) => password,
        None => {
            let password =
                rpassword::prompt_password("Enter password: ").context("failed to read password")?;
            if confirm {
                let again = rpassword::prompt_password("Confirm password: ")
                    .context("failed to read password")?;
                if password != again {
                    bail!("passwords do not match");
                }
            }
            password
        }
    };

    if password.is_empty() {
        bail!("password cannot be empty");
    }
    Ok(password)
}

/// Prints one line per processed file.
pub struct ConsoleReporter {
    pub verb: &'static str,
}

impl BatchReporter for ConsoleReporter {
    fn on_file_ok(&self, input: &Path, output: &Path) {
        println!("[OK] {}: {} -> {}", self.verb, file_name(input), file_name(output));
    }

    fn on_file_error(&self, input: &Path, error: &CryptoError) {
        println!("[ERROR] {} failed for {}: {error}", self.verb, file_name(input));
    }
}

pub fn print_tally(summary: &BatchSummary, verb: &str) {
    println!("{}", "=".repeat(60));
    println!("{verb}: {}/{} files", summary.succeeded, summary.total);
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
