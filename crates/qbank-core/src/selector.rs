//! Question selection.
//!
//! Selection runs four steps in order:
//!
//! 1. keep the requested categories (keys or labels, or everything for `"*"`),
//! 2. collapse rows sharing a content hash, walking the type-preference list
//!    and keeping the first row of each hash; types missing from the list are
//!    dropped,
//! 3. sample each difficulty tier uniformly without replacement, shrinking a
//!    tier to what is available,
//! 4. order the result by difficulty rank (stable) or shuffle it.
//!
//! All randomness comes from the `Rng` passed in by the caller.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::bank::{CategoryMap, QuestionBank};
use crate::config::{CategoryFilter, ExamConfig};
use crate::model::{normalize_difficulty, Difficulty, Question, QuestionType, SelectedQuestion};

/// A non-fatal condition met while selecting questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SelectionWarning {
    /// Fewer candidates than requested; all of them were taken.
    Shortfall {
        tier: String,
        requested: u32,
        available: usize,
    },
    /// No candidates at all; the tier was skipped.
    EmptyTier { tier: String },
}

impl std::fmt::Display for SelectionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionWarning::Shortfall {
                tier,
                requested,
                available,
            } => write!(
                f,
                "only {available} questions available for difficulty '{tier}', requested {requested}"
            ),
            SelectionWarning::EmptyTier { tier } => {
                write!(f, "no questions found for difficulty '{tier}'")
            }
        }
    }
}

/// The outcome of one selection run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Selection {
    pub questions: Vec<SelectedQuestion>,
    pub warnings: Vec<SelectionWarning>,
}

impl Selection {
    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(|q| q.calculated_points).sum()
    }

    /// Count and points per tier label, in first-seen order.
    pub fn tier_breakdown(&self) -> Vec<TierStats> {
        let mut stats: Vec<TierStats> = Vec::new();
        for q in &self.questions {
            match stats.iter_mut().find(|s| s.tier == q.original_difficulty) {
                Some(s) => {
                    s.count += 1;
                    s.points += q.calculated_points;
                }
                None => stats.push(TierStats {
                    tier: q.original_difficulty.clone(),
                    count: 1,
                    points: q.calculated_points,
                }),
            }
        }
        stats
    }
}

/// Per-tier totals of a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierStats {
    pub tier: String,
    pub count: usize,
    pub points: u32,
}

/// Selects exam questions from a bank according to a configuration.
pub struct QuestionSelector<'a> {
    config: &'a ExamConfig,
}

impl<'a> QuestionSelector<'a> {
    pub fn new(config: &'a ExamConfig) -> Self {
        Self { config }
    }

    /// Run the full selection pipeline against `bank`.
    pub fn select<R: Rng + ?Sized>(&self, bank: &QuestionBank, rng: &mut R) -> Selection {
        let selection = &self.config.question_selection;

        let filtered = filter_by_categories(&bank.questions, &selection.categories, &bank.categories);
        let unique = dedup_by_type_preference(&filtered, &selection.preferred_question_types);
        tracing::debug!(
            "{} questions after category filter, {} after type-preference dedup",
            filtered.len(),
            unique.len()
        );

        let tiers: Vec<(&str, u32)> = selection
            .difficulty_distribution
            .iter()
            .map(|(tier, count)| (tier.as_str(), *count))
            .collect();
        let (mut questions, warnings) =
            sample_tiers(&unique, &tiers, selection.points_per_question, rng);

        order_selection(&mut questions, self.config.test_settings.shuffle_questions, rng);

        Selection {
            questions,
            warnings,
        }
    }
}

/// Keep the questions whose category is requested.
///
/// Requested names may be category keys or their display labels.
pub fn filter_by_categories<'q>(
    questions: &'q [Question],
    filter: &CategoryFilter,
    categories: &CategoryMap,
) -> Vec<&'q Question> {
    match filter {
        CategoryFilter::All => questions.iter().collect(),
        CategoryFilter::Only(names) => {
            let keys: HashSet<&str> = names.iter().map(|n| categories.resolve(n)).collect();
            questions
                .iter()
                .filter(|q| keys.contains(q.category.as_str()))
                .collect()
        }
    }
}

/// Keep one question per content hash, preferring earlier types in
/// `preference`.
///
/// For each preferred type in turn, rows of that type are scanned in table
/// order and a row is kept when its hash has not been seen yet. Rows whose type
/// is not listed never make it into the output.
pub fn dedup_by_type_preference<'q>(
    questions: &[&'q Question],
    preference: &[QuestionType],
) -> Vec<&'q Question> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut unique = Vec::new();

    for kind in preference {
        for q in questions.iter().copied().filter(|q| &q.kind == kind) {
            if seen.insert(q.hash.as_str()) {
                unique.push(q);
            }
        }
    }

    unique
}

/// Sample every tier from `candidates`.
///
/// Tier labels and question difficulties are matched after normalization;
/// the configured label is kept verbatim on each sampled question. A hash
/// taken by one tier is never offered to a later one, so labels that
/// normalize alike (`easy`, `Easy`) share a single pool.
pub fn sample_tiers<R: Rng + ?Sized>(
    candidates: &[&Question],
    tiers: &[(&str, u32)],
    points_per_question: u32,
    rng: &mut R,
) -> (Vec<SelectedQuestion>, Vec<SelectionWarning>) {
    let mut selected = Vec::new();
    let mut warnings = Vec::new();
    let mut taken: HashSet<&str> = HashSet::new();

    for &(tier, requested) in tiers {
        let key = normalize_difficulty(tier);
        let pool: Vec<&Question> = candidates
            .iter()
            .copied()
            .filter(|q| q.difficulty_key() == key && !taken.contains(q.hash.as_str()))
            .collect();

        if pool.is_empty() {
            tracing::warn!("no questions found for difficulty '{tier}'");
            warnings.push(SelectionWarning::EmptyTier {
                tier: tier.to_string(),
            });
            continue;
        }

        let mut count = requested as usize;
        if pool.len() < count {
            tracing::warn!(
                "only {} questions available for difficulty '{tier}', requested {requested}",
                pool.len()
            );
            warnings.push(SelectionWarning::Shortfall {
                tier: tier.to_string(),
                requested,
                available: pool.len(),
            });
            count = pool.len();
        }

        for index in rand::seq::index::sample(rng, pool.len(), count) {
            let picked = pool[index];
            taken.insert(picked.hash.as_str());
            selected.push(SelectedQuestion {
                question: picked.clone(),
                calculated_points: points_per_question,
                original_difficulty: tier.to_string(),
            });
        }
    }

    (selected, warnings)
}

/// Order a selection: shuffled, or by difficulty rank with ties kept in
/// their current relative order.
pub fn order_selection<R: Rng + ?Sized>(questions: &mut [SelectedQuestion], shuffle: bool, rng: &mut R) {
    if shuffle {
        questions.shuffle(rng);
    } else {
        questions.sort_by_key(|q| Difficulty::rank_of_label(&q.original_difficulty));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;
    use indexmap::IndexMap;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::path::Path;

    fn q(hash: &str, kind: QuestionType, difficulty: &str, category: &str) -> Question {
        Question {
            hash: hash.into(),
            question: format!("Question {hash}"),
            kind,
            difficulty: difficulty.into(),
            category: category.into(),
            options: None,
            correct_answer: None,
        }
    }

    fn categories() -> CategoryMap {
        let mut map = IndexMap::new();
        map.insert("loops".to_string(), "Loops".to_string());
        map.insert("pointers".to_string(), "Pointers".to_string());
        CategoryMap::new(map)
    }

    fn config(dist: &str, shuffle: bool) -> ExamConfig {
        let yaml = format!(
            r#"
question_selection:
  categories: "*"
  difficulty_config:
    difficulty_distribution: {dist}
    points_per_question: 5
test_settings:
  shuffle_questions: {shuffle}
question_format: {{}}
"#
        );
        ExamConfig::parse_str(&yaml, ConfigFormat::Yaml, Path::new("t.yaml")).unwrap()
    }

    fn scenario_bank() -> QuestionBank {
        let mut questions = Vec::new();
        for i in 0..5 {
            questions.push(q(&format!("e{i}"), QuestionType::ShortAnswer, "easy", "loops"));
        }
        questions.push(q("h0", QuestionType::Code, "Hard", "pointers"));
        QuestionBank::new(categories(), questions)
    }

    #[test]
    fn category_filter_accepts_keys_and_labels() {
        let bank = scenario_bank();
        let by_label = filter_by_categories(
            &bank.questions,
            &CategoryFilter::Only(vec!["Pointers".into()]),
            &bank.categories,
        );
        assert_eq!(by_label.len(), 1);
        assert_eq!(by_label[0].hash, "h0");

        let by_key = filter_by_categories(
            &bank.questions,
            &CategoryFilter::Only(vec!["loops".into()]),
            &bank.categories,
        );
        assert_eq!(by_key.len(), 5);

        let all = filter_by_categories(&bank.questions, &CategoryFilter::All, &bank.categories);
        assert_eq!(all.len(), 6);
    }

    #[test]
    fn dedup_prefers_earlier_types_and_drops_unlisted() {
        let rows = [
            q("x", QuestionType::FreeText, "easy", "loops"),
            q("x", QuestionType::MultipleChoice, "easy", "loops"),
            q("y", QuestionType::FreeText, "easy", "loops"),
            q("y", QuestionType::FreeText, "hard", "loops"),
            q("z", QuestionType::Other("matching".into()), "easy", "loops"),
        ];
        let refs: Vec<&Question> = rows.iter().collect();
        let unique = dedup_by_type_preference(
            &refs,
            &[QuestionType::MultipleChoice, QuestionType::FreeText],
        );

        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].hash, "x");
        assert_eq!(unique[0].kind, QuestionType::MultipleChoice);
        assert_eq!(unique[1].hash, "y");
        assert_eq!(unique[1].difficulty, "easy");

        let hashes: HashSet<&str> = unique.iter().map(|q| q.hash.as_str()).collect();
        assert_eq!(hashes.len(), unique.len());
    }

    #[test]
    fn sampling_never_exceeds_available() {
        let bank = scenario_bank();
        let refs: Vec<&Question> = bank.questions.iter().collect();
        let mut rng = StdRng::seed_from_u64(7);

        let (selected, warnings) =
            sample_tiers(&refs, &[("easy", 2), ("hard", 4), ("medium", 1)], 3, &mut rng);

        let easy = selected.iter().filter(|s| s.original_difficulty == "easy").count();
        let hard = selected.iter().filter(|s| s.original_difficulty == "hard").count();
        assert_eq!(easy, 2);
        assert_eq!(hard, 1);
        assert!(selected.iter().all(|s| s.calculated_points == 3));
        assert_eq!(
            warnings,
            vec![
                SelectionWarning::Shortfall {
                    tier: "hard".into(),
                    requested: 4,
                    available: 1
                },
                SelectionWarning::EmptyTier {
                    tier: "medium".into()
                },
            ]
        );
    }

    #[test]
    fn tiers_normalizing_alike_never_repeat_a_hash() {
        let rows = [
            q("h0", QuestionType::ShortAnswer, "easy", "loops"),
            q("h1", QuestionType::ShortAnswer, "Easy", "loops"),
            q("v0", QuestionType::Code, "very_hard", "loops"),
        ];
        let refs: Vec<&Question> = rows.iter().collect();
        let mut rng = StdRng::seed_from_u64(5);

        let (selected, warnings) = sample_tiers(
            &refs,
            &[("easy", 2), ("Easy", 2), ("very_hard", 1), ("Very Hard", 1)],
            5,
            &mut rng,
        );

        let hashes: Vec<&str> = selected.iter().map(|s| s.question.hash.as_str()).collect();
        let unique: HashSet<&str> = hashes.iter().copied().collect();
        assert_eq!(hashes.len(), 3);
        assert_eq!(unique.len(), hashes.len());
        assert_eq!(
            warnings,
            vec![
                SelectionWarning::EmptyTier { tier: "Easy".into() },
                SelectionWarning::EmptyTier { tier: "Very Hard".into() },
            ]
        );
    }

    #[test]
    fn selector_keeps_hashes_unique_across_colliding_labels() {
        let bank = QuestionBank::new(
            categories(),
            vec![
                q("h0", QuestionType::ShortAnswer, "easy", "loops"),
                q("h1", QuestionType::ShortAnswer, "easy", "loops"),
            ],
        );
        let config = config("{easy: 2, Easy: 2}", true);
        let selection = QuestionSelector::new(&config).select(&bank, &mut StdRng::seed_from_u64(11));

        let mut hashes: Vec<&str> = selection
            .questions
            .iter()
            .map(|s| s.question.hash.as_str())
            .collect();
        hashes.sort();
        assert_eq!(hashes, vec!["h0", "h1"]);
        assert_eq!(selection.total_points(), 10);
    }

    #[test]
    fn tier_label_kept_verbatim() {
        let rows = [q("v", QuestionType::Essay, "very_hard", "loops")];
        let refs: Vec<&Question> = rows.iter().collect();
        let mut rng = StdRng::seed_from_u64(1);
        let (selected, warnings) = sample_tiers(&refs, &[("Very Hard", 1)], 5, &mut rng);
        assert!(warnings.is_empty());
        assert_eq!(selected[0].original_difficulty, "Very Hard");
        assert_eq!(selected[0].question.difficulty, "very_hard");
    }

    #[test]
    fn scenario_easy_three_hard_two() {
        let bank = scenario_bank();
        let config = config("{easy: 3, hard: 2}", false);
        let mut rng = StdRng::seed_from_u64(2024);

        let selection = QuestionSelector::new(&config).select(&bank, &mut rng);

        assert_eq!(selection.questions.len(), 4);
        assert_eq!(selection.total_points(), 20);
        assert_eq!(selection.warnings.len(), 1);
        assert!(matches!(
            &selection.warnings[0],
            SelectionWarning::Shortfall { tier, .. } if tier == "hard"
        ));
        let tiers: Vec<&str> = selection
            .questions
            .iter()
            .map(|q| q.original_difficulty.as_str())
            .collect();
        assert_eq!(tiers, vec!["easy", "easy", "easy", "hard"]);
        assert_eq!(
            selection.tier_breakdown(),
            vec![
                TierStats { tier: "easy".into(), count: 3, points: 15 },
                TierStats { tier: "hard".into(), count: 1, points: 5 },
            ]
        );
    }

    #[test]
    fn unshuffled_order_sorts_by_rank_stably() {
        let bank = scenario_bank();
        // Distribution lists hard first; output must still start with easy.
        let config = config("{hard: 1, easy: 2}", false);
        let mut rng = StdRng::seed_from_u64(3);
        let selection = QuestionSelector::new(&config).select(&bank, &mut rng);
        let tiers: Vec<&str> = selection
            .questions
            .iter()
            .map(|q| q.original_difficulty.as_str())
            .collect();
        assert_eq!(tiers, vec!["easy", "easy", "hard"]);
    }

    #[test]
    fn unknown_tier_labels_sort_last() {
        let make = |tier: &str| SelectedQuestion {
            question: q(tier, QuestionType::Code, tier, "loops"),
            calculated_points: 1,
            original_difficulty: tier.into(),
        };
        let mut items = vec![make("bonus"), make("Very Hard"), make("trivial")];
        let mut rng = StdRng::seed_from_u64(0);
        order_selection(&mut items, false, &mut rng);
        let tiers: Vec<&str> = items.iter().map(|q| q.original_difficulty.as_str()).collect();
        assert_eq!(tiers, vec!["trivial", "Very Hard", "bonus"]);
    }

    #[test]
    fn same_seed_same_selection() {
        let mut questions = Vec::new();
        for i in 0..40 {
            let diff = if i % 2 == 0 { "easy" } else { "medium" };
            questions.push(q(&format!("q{i}"), QuestionType::ShortAnswer, diff, "loops"));
        }
        let bank = QuestionBank::new(categories(), questions);

        for shuffle in [false, true] {
            let config = config("{easy: 5, medium: 5}", shuffle);
            let selector = QuestionSelector::new(&config);
            let a = selector.select(&bank, &mut StdRng::seed_from_u64(99));
            let b = selector.select(&bank, &mut StdRng::seed_from_u64(99));
            assert_eq!(a.questions, b.questions);
        }
    }
}
