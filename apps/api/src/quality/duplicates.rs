use tracing::warn;

use crate::models::question::Question;
use crate::quality::diagnostics::{Diagnostics, NearDuplicate};
use crate::quality::text::{normalize, trigram_similarity};
use crate::quality::PassContext;

/// Option pairs above this 3-gram Jaccard similarity are reported as copy-paste defects.
pub const NEAR_DUPLICATE_THRESHOLD: f64 = 0.8;

/// Pass 8: flags near-identical option pairs within each question. Diagnostic only.
pub fn flag_near_duplicates(
    questions: Vec<Question>,
    _ctx: &PassContext<'_>,
    diag: &mut Diagnostics,
) -> Vec<Question> {
    for q in &questions {
        let normalized: Vec<String> = q
            .options
            .iter()
            .map(|o| normalize(o).split_whitespace().collect::<Vec<_>>().join(" "))
            .collect();
        for a in 0..normalized.len() {
            for b in (a + 1)..normalized.len() {
                let similarity = trigram_similarity(&normalized[a], &normalized[b]);
                if similarity > NEAR_DUPLICATE_THRESHOLD {
                    warn!(
                        "Question {}: options {} and {} are {:.0}% similar",
                        q.id,
                        a,
                        b,
                        similarity * 100.0
                    );
                    diag.near_duplicates.push(NearDuplicate {
                        question_id: q.id,
                        first_option: a,
                        second_option: b,
                        similarity,
                    });
                    diag.warn(format!(
                        "Question {} options {} and {} are near-duplicates",
                        q.id, a, b
                    ));
                }
            }
        }
    }
    questions
}
