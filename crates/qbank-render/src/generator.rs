//! Exam generation pipeline.
//!
//! Runs selection, layout, and every requested renderer, then writes the
//! resulting documents. In variant mode the whole pipeline is repeated per
//! variant with its own random source.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use qbank_core::bank::QuestionBank;
use qbank_core::config::ExamConfig;
use qbank_core::selector::{QuestionSelector, Selection, TierStats};

use crate::format::{AnswerKey, ExamDocument};
use crate::markdown::MarkdownRenderer;
use crate::print::{PrintAssets, PrintRenderer};
use crate::renderer::Renderer;

/// What a generated file contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Exam,
    AnswerKey,
}

/// A file written by the generator.
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    /// Variant number, when generating variants.
    pub variant: Option<u32>,
    pub kind: ArtifactKind,
    /// Renderer that produced the file (`markdown` or `print`).
    pub format: &'static str,
    pub path: PathBuf,
}

impl Artifact {
    /// Short identifier such as `variant_2_answers_markdown`.
    pub fn label(&self) -> String {
        let mut label = match self.variant {
            Some(n) => format!("variant_{n}_"),
            None => String::new(),
        };
        label.push_str(match self.kind {
            ArtifactKind::Exam => "test",
            ArtifactKind::AnswerKey => "answers",
        });
        label.push('_');
        label.push_str(self.format);
        label
    }
}

/// Statistics of one generated exam.
#[derive(Debug, Clone, Serialize)]
pub struct VariantSummary {
    pub variant: u32,
    pub questions: usize,
    pub total_points: u32,
    pub tiers: Vec<TierStats>,
    pub warnings: Vec<String>,
}

/// Everything a generation run produced.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub generated_at: DateTime<Utc>,
    pub seed: Option<u64>,
    pub artifacts: Vec<Artifact>,
    pub variants: Vec<VariantSummary>,
}

/// A laid-out exam together with the selection it came from.
#[derive(Debug, Clone)]
pub struct PreparedExam {
    pub selection: Selection,
    pub document: ExamDocument,
    pub answer_key: AnswerKey,
}

/// Generates exams from a bank according to a configuration.
pub struct ExamGenerator<'a> {
    config: &'a ExamConfig,
    bank: &'a QuestionBank,
}

impl<'a> ExamGenerator<'a> {
    pub fn new(config: &'a ExamConfig, bank: &'a QuestionBank) -> Self {
        Self { config, bank }
    }

    /// Random source for variant `n` (1-based).
    ///
    /// With a configured seed, variant `n` uses `seed + n - 1`, so variant 1
    /// matches a run without variants and every variant can be reproduced on
    /// its own.
    pub fn rng_for_variant(&self, n: u32) -> StdRng {
        match self.config.advanced.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(u64::from(n.saturating_sub(1)))),
            None => StdRng::from_entropy(),
        }
    }

    /// Select and lay out one exam.
    pub fn prepare(&self, rng: &mut StdRng) -> PreparedExam {
        let selection = QuestionSelector::new(self.config).select(self.bank, rng);
        let document = ExamDocument::build(&selection, self.config, &self.bank.categories, rng);
        let answer_key = AnswerKey::build(&document);
        PreparedExam {
            selection,
            document,
            answer_key,
        }
    }

    fn renderers(&self) -> Vec<Box<dyn Renderer>> {
        let format = self.config.test_settings.output_format;
        let mut renderers: Vec<Box<dyn Renderer>> = Vec::new();
        if format.wants_markdown() {
            renderers.push(Box::new(MarkdownRenderer));
        }
        if format.wants_print() {
            tracing::info!(
                "print output is an HTML document laid out for A4; open it in a browser to print or save as PDF"
            );
            renderers.push(Box::new(PrintRenderer::new(PrintAssets::load(&self.config.assets))));
        }
        renderers
    }

    /// Generate every requested document into `output_dir`.
    pub fn generate(&self, output_dir: &Path) -> Result<GenerationReport> {
        let advanced = &self.config.advanced;
        let renderers = self.renderers();

        let variants: Vec<Option<u32>> = if advanced.generate_variants {
            (1..=advanced.num_variants).map(Some).collect()
        } else {
            vec![None]
        };

        let mut report = GenerationReport {
            generated_at: Utc::now(),
            seed: advanced.random_seed,
            artifacts: Vec::new(),
            variants: Vec::new(),
        };

        for variant in variants {
            let n = variant.unwrap_or(1);
            let mut rng = self.rng_for_variant(n);
            let exam = self.prepare(&mut rng);

            tracing::info!(
                "variant {n}: selected {} questions ({} points)",
                exam.selection.questions.len(),
                exam.selection.total_points()
            );

            for renderer in &renderers {
                let path = output_dir.join(self.file_name(variant, ArtifactKind::Exam, renderer.as_ref()));
                write_document(&path, &renderer.render_exam(&exam.document))?;
                report.artifacts.push(Artifact {
                    variant,
                    kind: ArtifactKind::Exam,
                    format: renderer.name(),
                    path,
                });

                if self.config.test_settings.include_answers {
                    let path =
                        output_dir.join(self.file_name(variant, ArtifactKind::AnswerKey, renderer.as_ref()));
                    write_document(&path, &renderer.render_answer_key(&exam.answer_key))?;
                    report.artifacts.push(Artifact {
                        variant,
                        kind: ArtifactKind::AnswerKey,
                        format: renderer.name(),
                        path,
                    });
                }
            }

            report.variants.push(VariantSummary {
                variant: n,
                questions: exam.selection.questions.len(),
                total_points: exam.selection.total_points(),
                tiers: exam.selection.tier_breakdown(),
                warnings: exam.selection.warnings.iter().map(ToString::to_string).collect(),
            });
        }

        Ok(report)
    }

    /// Output file name for one document.
    ///
    /// Without variants the Markdown exam keeps `output_filename` verbatim;
    /// every other file is `<base>[<suffix>][_answers].<ext>`.
    fn file_name(&self, variant: Option<u32>, kind: ArtifactKind, renderer: &dyn Renderer) -> String {
        let settings = &self.config.test_settings;
        if variant.is_none() && kind == ArtifactKind::Exam && renderer.extension() == "md" {
            return settings.output_filename.clone();
        }

        let suffix = variant
            .map(|n| self.config.advanced.suffix_for(n))
            .unwrap_or_default();
        let answers = match kind {
            ArtifactKind::Exam => "",
            ArtifactKind::AnswerKey => "_answers",
        };
        format!(
            "{}{suffix}{answers}.{}",
            self.config.output_base_name(),
            renderer.extension()
        )
    }
}

/// Write a rendered document, creating parent directories.
pub fn write_document(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbank_core::config::ConfigFormat;

    fn config(extra: &str) -> ExamConfig {
        let yaml = format!(
            r#"
question_selection:
  categories: "*"
  difficulty_config:
    difficulty_distribution: {{easy: 1}}
test_settings:
  output_filename: exam.md
{extra}
question_format: {{}}
advanced:
  random_seed: 9
  num_variants: 2
"#
        );
        ExamConfig::parse_str(&yaml, ConfigFormat::Yaml, Path::new("exam.yaml")).unwrap()
    }

    #[test]
    fn file_names() {
        let config = config("  include_answers: true");
        let bank = QuestionBank::default();
        let generator = ExamGenerator::new(&config, &bank);
        let md = MarkdownRenderer;
        let print = PrintRenderer::default();

        assert_eq!(generator.file_name(None, ArtifactKind::Exam, &md), "exam.md");
        assert_eq!(generator.file_name(None, ArtifactKind::AnswerKey, &md), "exam_answers.md");
        assert_eq!(generator.file_name(None, ArtifactKind::Exam, &print), "exam.html");
        assert_eq!(
            generator.file_name(Some(2), ArtifactKind::AnswerKey, &print),
            "exam_variant_2_answers.html"
        );
        assert_eq!(generator.file_name(Some(1), ArtifactKind::Exam, &md), "exam_variant_1.md");
    }

    #[test]
    fn variant_seeds_are_offset() {
        use rand::RngCore;
        let config = config("");
        let bank = QuestionBank::default();
        let generator = ExamGenerator::new(&config, &bank);

        assert_eq!(
            generator.rng_for_variant(2).next_u64(),
            StdRng::seed_from_u64(10).next_u64()
        );
        assert_ne!(
            generator.rng_for_variant(1).next_u64(),
            generator.rng_for_variant(2).next_u64()
        );
    }

    #[test]
    fn artifact_labels() {
        let artifact = Artifact {
            variant: Some(2),
            kind: ArtifactKind::AnswerKey,
            format: "markdown",
            path: PathBuf::from("x"),
        };
        assert_eq!(artifact.label(), "variant_2_answers_markdown");
    }
}
