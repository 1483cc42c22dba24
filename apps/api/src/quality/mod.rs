//! Quality control: deterministic repair and validation of generated question sets.
//!
//! The pipeline is an ordered list of pure passes folded over the question set.
//! Content problems are repaired or recorded in `Diagnostics`; only a shape violation
//! (not 10 questions, not 4 options each) aborts with `QualityError`.
//!
//! Order matters: the answer key is re-verified before redistribution, because
//! redistribution moves option text around and the explanation check reads meaning.

pub mod diagnostics;
pub mod distribution;
pub mod duplicates;
pub mod format;
pub mod length;
pub mod relevance;
pub mod reverify;
pub mod rewrite;
pub mod rules;
pub mod text;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::question::{JobPosting, Question, OPTION_COUNT, QUESTION_COUNT};
use crate::quality::diagnostics::Diagnostics;
use crate::quality::rules::{Language, QualityRules};

/// Inputs every pass may read. `seed` feeds the only randomised pass (redistribution).
/// `language` selects the replacement banks so repairs match the posting's language.
pub struct PassContext<'a> {
    pub job: &'a JobPosting,
    pub allowed_terms: &'a [String],
    pub rules: &'a QualityRules,
    pub language: Language,
    pub seed: u64,
}

/// One QC step: takes ownership of the set, returns the repaired set.
pub type QualityPass = fn(Vec<Question>, &PassContext<'_>, &mut Diagnostics) -> Vec<Question>;

/// The fixed pass order.
pub const PASSES: &[(&str, QualityPass)] = &[
    ("distribution_check", distribution::check_initial),
    ("relevance", relevance::score_relevance),
    ("generic_questions", relevance::flag_generic),
    ("advanced_topics", rewrite::strip_advanced_topics),
    ("absolutist_language", rewrite::strip_absolutist_language),
    ("silly_options", rewrite::replace_silly_options),
    ("option_length", length::balance_option_lengths),
    ("near_duplicates", duplicates::flag_near_duplicates),
    ("quote_marks", format::remove_quote_marks),
    ("answer_reverification", reverify::reverify_correct_answers),
    ("capitalization", format::capitalize_options),
    ("redistribution", distribution::redistribute),
    ("final_validation", distribution::validate_final),
];

#[derive(Debug, Error, PartialEq)]
pub enum QualityError {
    #[error("expected {expected} questions, got {actual}")]
    WrongQuestionCount { expected: usize, actual: usize },

    #[error("question {question_id} has {actual} options (expected 4) or an out-of-range answer")]
    MalformedQuestion { question_id: u8, actual: usize },
}

/// Repaired questions plus everything the passes observed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub questions: Vec<Question>,
    pub diagnostics: Diagnostics,
}

/// Runs the QC passes in order over a raw question set.
#[derive(Debug, Clone)]
pub struct QualityPipeline {
    rules: QualityRules,
}

impl QualityPipeline {
    pub fn new(rules: QualityRules) -> Self {
        Self { rules }
    }

    pub fn run<R: Rng + ?Sized>(
        &self,
        questions: Vec<Question>,
        job: &JobPosting,
        allowed_terms: &[String],
        rng: &mut R,
    ) -> Result<QualityReport, QualityError> {
        check_shape(&questions)?;

        let language = Language::detect(&language_sample(job, &questions));
        debug!("QC language: {:?}", language);
        let ctx = PassContext {
            job,
            allowed_terms,
            rules: &self.rules,
            language,
            seed: rng.next_u64(),
        };
        let mut diagnostics = Diagnostics::default();

        let questions = PASSES.iter().fold(questions, |set, (name, pass)| {
            debug!("QC pass '{}' starting", name);
            pass(set, &ctx, &mut diagnostics)
        });

        // Passes never change shape; re-check so a broken pass cannot leak a bad set.
        check_shape(&questions)?;

        diagnostics.quality_score = diagnostics.compute_quality_score();
        if diagnostics.errors.is_empty() {
            info!(
                "QC complete: score={}, relevance={:.2}, warnings={}",
                diagnostics.quality_score,
                diagnostics.relevance_average,
                diagnostics.warnings.len()
            );
        } else {
            warn!(
                "QC complete with {} errors: {:?}",
                diagnostics.errors.len(),
                diagnostics.errors
            );
        }

        Ok(QualityReport {
            questions,
            diagnostics,
        })
    }
}

/// Posting text plus every stem, so a short or missing posting still yields a language.
fn language_sample(job: &JobPosting, questions: &[Question]) -> String {
    let mut sample = job.full_text();
    for q in questions {
        sample.push('\n');
        sample.push_str(&q.question);
    }
    sample
}

/// Fatal shape check: exactly 10 questions, each with 4 options and an in-range answer.
pub fn check_shape(questions: &[Question]) -> Result<(), QualityError> {
    if questions.len() != QUESTION_COUNT {
        return Err(QualityError::WrongQuestionCount {
            expected: QUESTION_COUNT,
            actual: questions.len(),
        });
    }
    if let Some(bad) = questions.iter().find(|q| !q.is_well_formed()) {
        return Err(QualityError::MalformedQuestion {
            question_id: bad.id,
            actual: bad.options.len(),
        });
    }
    debug_assert!(questions.iter().all(|q| q.options.len() == OPTION_COUNT));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::fixtures::sample_questions;
    use crate::quality::text::char_len;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn job() -> JobPosting {
        JobPosting {
            title: "Warehouse Specialist".to_string(),
            department: "Logistics".to_string(),
            details: "stock tracking and shipment planning in warehouse operations".to_string(),
        }
    }

    fn pipeline() -> QualityPipeline {
        QualityPipeline::new(QualityRules::standard().unwrap())
    }

    fn terms() -> Vec<String> {
        vec!["stock tracking".to_string(), "shipment planning".to_string()]
    }

    #[test]
    fn test_rejects_wrong_question_count() {
        let mut questions = sample_questions();
        questions.pop();
        let err = pipeline()
            .run(questions, &job(), &terms(), &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert_eq!(
            err,
            QualityError::WrongQuestionCount {
                expected: 10,
                actual: 9
            }
        );
    }

    #[test]
    fn test_rejects_three_option_question() {
        let mut questions = sample_questions();
        questions[4].options.truncate(3);
        let err = pipeline()
            .run(questions, &job(), &terms(), &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert!(matches!(
            err,
            QualityError::MalformedQuestion {
                question_id: 5,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_all_zero_answers_end_balanced_without_long_runs() {
        let report = pipeline()
            .run(
                sample_questions(),
                &job(),
                &terms(),
                &mut StdRng::seed_from_u64(42),
            )
            .unwrap();

        let stats = report.diagnostics.final_distribution;
        assert!(stats.is_balanced(), "counts: {:?}", stats.counts);
        assert_eq!(stats.counts.iter().sum::<usize>(), 10);
        assert!(stats.longest_run <= 2);
        assert_eq!(report.diagnostics.initial_distribution.counts, [10, 0, 0, 0]);
        assert!(report.diagnostics.errors.is_empty());
        assert_eq!(report.diagnostics.quality_score, 100);
    }

    #[test]
    fn test_redistribution_keeps_correct_text_attached() {
        let original = sample_questions();
        let report = pipeline()
            .run(
                original.clone(),
                &job(),
                &terms(),
                &mut StdRng::seed_from_u64(7),
            )
            .unwrap();

        for (before, after) in original.iter().zip(&report.questions) {
            let correct_text = &after.options[after.correct_index()];
            assert!(
                correct_text.starts_with("Record stock movements"),
                "question {} now keys {:?}",
                after.id,
                correct_text
            );
            assert_eq!(before.id, after.id);
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let a = pipeline()
            .run(sample_questions(), &job(), &terms(), &mut StdRng::seed_from_u64(9))
            .unwrap();
        let b = pipeline()
            .run(sample_questions(), &job(), &terms(), &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(a.questions, b.questions);
    }

    #[test]
    fn test_options_are_capitalized_and_quote_free() {
        let mut questions = sample_questions();
        questions[2].options[1] = "\"wait\" for the weekly report".to_string();
        let report = pipeline()
            .run(questions, &job(), &terms(), &mut StdRng::seed_from_u64(3))
            .unwrap();
        for q in &report.questions {
            for option in &q.options {
                assert!(!option.contains('"'));
                let first = option.chars().next().unwrap();
                assert!(!first.is_lowercase(), "{option:?}");
            }
        }
    }

    fn turkish_questions() -> Vec<Question> {
        sample_questions()
            .into_iter()
            .enumerate()
            .map(|(i, mut q)| {
                let correct = format!(
                    "Sayım farkını sistem kayıtlarıyla karşılaştırır, eksik ürünleri raporlayarak \
                     stok kayıtlarını güncellerim {i}"
                );
                q.question = format!("Depoda sayım sırasında fark çıktığında ne yaparsınız? {i}");
                q.options = vec![
                    correct.clone(),
                    "bekle".to_string(),
                    format!("Ay sonunu beklerim {i}"),
                    "Sorunu görmezden gelirim".to_string(),
                ];
                q.explanation = correct;
                q
            })
            .collect()
    }

    #[test]
    fn test_turkish_set_is_repaired_with_turkish_text_only() {
        let rules = QualityRules::standard().unwrap();
        let job = JobPosting {
            title: "Depo Sorumlusu".to_string(),
            department: "Lojistik".to_string(),
            details: "Stok takibi ve sevkiyat planlaması yapacak çalışma arkadaşı".to_string(),
        };
        let allowed = vec!["stok takibi".to_string(), "sevkiyat planlaması".to_string()];

        for seed in 0..20 {
            let report = pipeline()
                .run(turkish_questions(), &job, &allowed, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            let options: Vec<&String> =
                report.questions.iter().flat_map(|q| &q.options).collect();

            for option in &options {
                assert!(!option.contains("görmezden"), "{option:?}");
                assert!(
                    !rules.distractor_bank.english.iter().any(|e| option.contains(e.as_str())),
                    "{option:?}"
                );
                assert!(
                    !rules
                        .filler_clauses
                        .english
                        .iter()
                        .any(|c| option.contains(c.trim())),
                    "{option:?}"
                );
            }
            assert!(options
                .iter()
                .any(|o| rules.distractor_bank.turkish.contains(o)));
            assert!(options.iter().any(|o| o.starts_with("Bekle")
                && rules.filler_clauses.turkish.iter().any(|c| o.ends_with(c.as_str()))));
        }
    }

    #[test]
    fn test_relevance_average_reported() {
        let report = pipeline()
            .run(sample_questions(), &job(), &terms(), &mut StdRng::seed_from_u64(5))
            .unwrap();
        assert_eq!(report.diagnostics.relevance_scores.len(), 10);
        assert!(report.diagnostics.relevance_average > 0.0);
        assert!(report.questions.iter().all(|q| q
            .options
            .iter()
            .all(|o| char_len(o) > 0)));
    }
}
