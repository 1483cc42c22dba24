//! Correct-answer re-verification against the explanation text.
//!
//! Known risk: when the explanation shares more words with a distractor than with the
//! real answer, this flips the key to the distractor. Every flip is reported as a warning
//! so it can be reviewed; the minimum margin limits how often it fires.

use std::collections::HashSet;

use tracing::warn;

use crate::models::question::Question;
use crate::quality::diagnostics::{AnswerReassignment, Diagnostics};
use crate::quality::text::tokenize;
use crate::quality::PassContext;

/// The best option must beat the marked one by at least this many shared tokens.
pub const REASSIGN_MIN_MARGIN: usize = 2;

fn content_tokens(text: &str, stopwords: &HashSet<String>) -> HashSet<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| !stopwords.contains(t))
        .collect()
}

/// Shared-token count between each option and the explanation.
pub fn explanation_overlap(question: &Question, stopwords: &HashSet<String>) -> Vec<usize> {
    let explanation = content_tokens(&question.explanation, stopwords);
    question
        .options
        .iter()
        .map(|o| content_tokens(o, stopwords).intersection(&explanation).count())
        .collect()
}

/// Pass 10: moves the answer key to the option the explanation actually describes.
pub fn reverify_correct_answers(
    mut questions: Vec<Question>,
    ctx: &PassContext<'_>,
    diag: &mut Diagnostics,
) -> Vec<Question> {
    for q in questions.iter_mut() {
        if q.explanation.trim().is_empty() {
            diag.warn(format!("Question {} has no explanation to verify against", q.id));
            continue;
        }

        let overlaps = explanation_overlap(q, &ctx.rules.overlap_stopwords);
        let current = q.correct_index();
        // first index wins ties
        let best = overlaps
            .iter()
            .enumerate()
            .fold(current, |best, (i, &o)| if o > overlaps[best] { i } else { best });

        if best != current && overlaps[best] >= overlaps[current] + REASSIGN_MIN_MARGIN {
            warn!(
                "Question {}: explanation matches option {} ({} tokens) over marked option {} ({} tokens); reassigning",
                q.id, best, overlaps[best], current, overlaps[current]
            );
            diag.reassigned_answers.push(AnswerReassignment {
                question_id: q.id,
                from: current,
                to: best,
                from_overlap: overlaps[current],
                to_overlap: overlaps[best],
            });
            diag.warn(format!(
                "Question {} correct answer reassigned from option {} to {} by explanation overlap; review",
                q.id, current, best
            ));
            q.correct_answer = best as u8;
        }
    }
    questions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::fixtures::sample_questions;
    use crate::models::question::JobPosting;
    use crate::quality::rules::{Language, QualityRules};

    fn run(questions: Vec<Question>) -> (Vec<Question>, Diagnostics) {
        let rules = QualityRules::standard().unwrap();
        let job = JobPosting::default();
        let ctx = PassContext {
            job: &job,
            allowed_terms: &[],
            rules: &rules,
            language: Language::English,
            seed: 0,
        };
        let mut diag = Diagnostics::default();
        let out = reverify_correct_answers(questions, &ctx, &mut diag);
        (out, diag)
    }

    #[test]
    fn test_consistent_key_is_kept() {
        let (out, diag) = run(sample_questions());
        assert!(out.iter().all(|q| q.correct_answer == 0));
        assert!(diag.reassigned_answers.is_empty());
    }

    #[test]
    fn test_key_moves_to_option_explanation_describes() {
        let mut questions = sample_questions();
        questions[0].correct_answer = 2;
        let (out, diag) = run(questions);
        assert_eq!(out[0].correct_answer, 0);
        assert_eq!(diag.reassigned_answers.len(), 1);
        assert_eq!(diag.reassigned_answers[0].from, 2);
        assert_eq!(diag.reassigned_answers[0].to, 0);
        assert_eq!(diag.warnings.len(), 1);
    }

    #[test]
    fn test_small_margin_does_not_flip() {
        let mut questions = sample_questions();
        questions[0].options = vec![
            "Count pallets daily".to_string(),
            "Count boxes weekly".to_string(),
            "Ignore pallets".to_string(),
            "Order more stock".to_string(),
        ];
        questions[0].correct_answer = 1;
        questions[0].explanation = "Daily pallets checks".to_string();
        // option 0 shares {daily, pallets}=2, option 1 shares {}=0 -> margin 2 flips
        let (out, _) = run(questions.clone());
        assert_eq!(out[0].correct_answer, 0);

        questions[0].explanation = "Pallets matter".to_string();
        // option 0 shares {pallets}=1 -> margin 1 keeps the key
        let (out, diag) = run(questions);
        assert_eq!(out[0].correct_answer, 1);
        assert!(diag.reassigned_answers.is_empty());
    }

    #[test]
    fn test_missing_explanation_is_warned() {
        let mut questions = sample_questions();
        questions[5].explanation = "   ".to_string();
        let (_, diag) = run(questions);
        assert_eq!(diag.warnings.len(), 1);
    }
}
