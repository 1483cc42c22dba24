use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::question::OPTION_COUNT;

/// Answer-index tally across a question set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionStats {
    /// How many questions have each option index (A..D) as the correct answer.
    pub counts: [usize; OPTION_COUNT],
    /// Longest stretch of consecutive questions sharing the same correct index.
    pub longest_run: usize,
}

impl DistributionStats {
    /// Every index is correct for 2 or 3 questions.
    pub fn is_balanced(&self) -> bool {
        self.counts.iter().all(|c| (2..=3).contains(c))
    }

    /// More than two consecutive identical correct indices.
    pub fn has_long_run(&self) -> bool {
        self.longest_run > 2
    }
}

/// A single in-place repair, kept for manual review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repair {
    pub question_id: u8,
    pub pass: String,
    pub detail: String,
}

/// Option pair that looks copy-pasted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearDuplicate {
    pub question_id: u8,
    pub first_option: usize,
    pub second_option: usize,
    pub similarity: f64,
}

/// Correct-answer flip made by the explanation-overlap check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerReassignment {
    pub question_id: u8,
    pub from: usize,
    pub to: usize,
    pub from_overlap: usize,
    pub to_overlap: usize,
}

/// Everything the QC passes observed, returned alongside the repaired set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub relevance_scores: Vec<f32>,
    pub relevance_average: f32,
    pub initial_distribution: DistributionStats,
    pub final_distribution: DistributionStats,
    pub generic_questions: Vec<u8>,
    pub near_duplicates: Vec<NearDuplicate>,
    pub reassigned_answers: Vec<AnswerReassignment>,
    pub repairs: Vec<Repair>,
    pub quality_score: u32,
}

impl Diagnostics {
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn repaired(&mut self, question_id: u8, pass: &str, detail: impl Into<String>) {
        let detail = detail.into();
        debug!("Question {question_id} repaired by {pass}: {detail}");
        self.repairs.push(Repair {
            question_id,
            pass: pass.to_string(),
            detail,
        });
    }

    /// `max(0, 100 - 10 * errors)`.
    pub fn compute_quality_score(&self) -> u32 {
        100u32.saturating_sub(10 * self.errors.len() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_score_drops_ten_per_error() {
        let mut diag = Diagnostics::default();
        assert_eq!(diag.compute_quality_score(), 100);
        diag.error("a");
        diag.error("b");
        assert_eq!(diag.compute_quality_score(), 80);
    }

    #[test]
    fn test_quality_score_floors_at_zero() {
        let mut diag = Diagnostics::default();
        for i in 0..12 {
            diag.error(format!("error {i}"));
        }
        assert_eq!(diag.compute_quality_score(), 0);
    }

    #[test]
    fn test_distribution_stats_balance_rules() {
        let stats = DistributionStats {
            counts: [3, 2, 3, 2],
            longest_run: 2,
        };
        assert!(stats.is_balanced());
        assert!(!stats.has_long_run());

        let skewed = DistributionStats {
            counts: [10, 0, 0, 0],
            longest_run: 10,
        };
        assert!(!skewed.is_balanced());
        assert!(skewed.has_long_run());
    }
}
