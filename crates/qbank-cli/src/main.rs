//! qbank CLI: encrypt question banks and generate exams from them.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "qbank", version, about = "Question bank encryption and exam generation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt question files with a password
    Encrypt {
        /// Encryption password (prompted for if omitted)
        #[arg(short, long)]
        password: Option<String>,

        /// Directory containing cat_*.csv files
        #[arg(short, long, default_value = "questions")]
        questions_dir: PathBuf,

        /// Directory to write encrypted files to
        #[arg(short, long, default_value = "encrypted_questions")]
        output_dir: PathBuf,

        /// Replace the original files with their encrypted versions
        #[arg(short, long)]
        in_place: bool,

        /// Also encrypt mappings.yaml
        #[arg(long)]
        include_mappings: bool,
    },

    /// Decrypt encrypted question files
    Decrypt {
        /// Decryption password (prompted for if omitted)
        #[arg(short, long)]
        password: Option<String>,

        /// Directory containing *.encrypted files
        #[arg(short, long, default_value = "encrypted_questions")]
        encrypted_dir: PathBuf,

        /// Directory to write decrypted files to
        #[arg(short, long, default_value = "questions")]
        output_dir: PathBuf,

        /// Replace the encrypted files with their decrypted versions
        #[arg(short, long)]
        in_place: bool,

        /// Overwrite files in a non-empty output directory without asking
        #[arg(long)]
        overwrite: bool,

        /// Skip the sanity check of decrypted files
        #[arg(long)]
        no_verify: bool,

        /// Answer yes to every confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Generate an exam from a question bank
    Generate {
        /// Exam configuration (YAML, or TOML with a .toml extension)
        #[arg(short, long, default_value = "exam.yaml")]
        config: PathBuf,

        /// Question bank directory
        #[arg(short, long, default_value = "questions")]
        questions_dir: PathBuf,

        /// Output directory (overrides test_settings.output_directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Random seed (overrides advanced.random_seed)
        #[arg(long)]
        seed: Option<u64>,

        /// Print the generation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Recompute content hashes of question files
    Rehash {
        /// Question bank directory
        #[arg(short, long, default_value = "questions")]
        questions_dir: PathBuf,
    },

    /// Check a question bank for problems
    Validate {
        /// Exam configuration to check the bank against
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Question bank directory
        #[arg(short, long, default_value = "questions")]
        questions_dir: PathBuf,
    },

    /// Create a starter exam configuration and question bank
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("qbank=info".parse().expect("static directive")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Encrypt {
            password,
            questions_dir,
            output_dir,
            in_place,
            include_mappings,
        } => commands::encrypt::execute(password, questions_dir, output_dir, in_place, include_mappings),
        Commands::Decrypt {
            password,
            encrypted_dir,
            output_dir,
            in_place,
            overwrite,
            no_verify,
            yes,
        } => commands::decrypt::execute(
            password,
            encrypted_dir,
            output_dir,
            in_place,
            overwrite || yes,
            !no_verify,
        ),
        Commands::Generate {
            config,
            questions_dir,
            output_dir,
            seed,
            json,
        } => commands::generate::execute(config, questions_dir, output_dir, seed, json),
        Commands::Rehash { questions_dir } => commands::rehash::execute(questions_dir),
        Commands::Validate {
            config,
            questions_dir,
        } => commands::validate::execute(config, questions_dir),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
