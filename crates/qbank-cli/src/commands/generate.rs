//! The `qbank generate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use qbank_core::{ExamConfig, QuestionBank};
use qbank_render::{ExamGenerator, GenerationReport};

pub fn execute(
    config_path: PathBuf,
    questions_dir: PathBuf,
    output_dir: Option<PathBuf>,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut config = ExamConfig::load(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    tracing::debug!("loaded config from {}", config_path.display());
    if seed.is_some() {
        config.advanced.random_seed = seed;
    }

    let bank = QuestionBank::load(&questions_dir)?;
    let output_dir = output_dir.unwrap_or_else(|| config.test_settings.output_directory.clone());

    let report = ExamGenerator::new(&config, &bank).generate(&output_dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Generated files:");
    for artifact in &report.artifacts {
        println!("  {}: {}", artifact.label(), artifact.path.display());
    }
    print_summary(&report);
    Ok(())
}

fn print_summary(report: &GenerationReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Variant", "Tier", "Questions", "Points"]);

    for variant in &report.variants {
        for tier in &variant.tiers {
            table.add_row(vec![
                Cell::new(variant.variant),
                Cell::new(&tier.tier),
                Cell::new(tier.count),
                Cell::new(tier.points),
            ]);
        }
        table.add_row(vec![
            Cell::new(variant.variant),
            Cell::new("total"),
            Cell::new(variant.questions),
            Cell::new(variant.total_points),
        ]);
    }

    eprintln!("\n{table}");
}
