//! Relevance scoring against the allowed-term list, and generic-question detection.

use tracing::{debug, warn};

use crate::models::question::Question;
use crate::quality::diagnostics::Diagnostics;
use crate::quality::text::mentions_term;
use crate::quality::PassContext;

/// Average relevance below which the set is reported as weakly tied to the posting.
pub const RELEVANCE_TARGET: f32 = 0.75;

const MIN_ROLE_NAME_CHARS: usize = 4;

/// Distinct allowed terms mentioned by the question stem or its options.
pub fn term_hits(question: &Question, allowed_terms: &[String]) -> usize {
    let text = format!("{} {}", question.question, question.options.join(" "));
    allowed_terms
        .iter()
        .filter(|term| mentions_term(&text, term))
        .count()
}

/// Maps a distinct-term hit count onto the 0–1 relevance scale.
pub fn relevance_for_hits(hits: usize) -> f32 {
    match hits {
        0 | 1 => 0.15,
        2 => 0.60,
        3 => 0.75,
        _ => 0.85,
    }
}

/// Pass 2: per-question relevance and the set average (diagnostic only).
pub fn score_relevance(
    questions: Vec<Question>,
    ctx: &PassContext<'_>,
    diag: &mut Diagnostics,
) -> Vec<Question> {
    if ctx.allowed_terms.is_empty() {
        diag.warn("No allowed terms extracted from the job posting; relevance is a floor estimate");
    }

    let scores: Vec<f32> = questions
        .iter()
        .map(|q| {
            let hits = term_hits(q, ctx.allowed_terms);
            let score = relevance_for_hits(hits);
            debug!("Question {} relevance {:.2} ({} term hits)", q.id, score, hits);
            score
        })
        .collect();

    let average = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f32>() / scores.len() as f32
    };

    if average < RELEVANCE_TARGET {
        warn!("Average relevance {:.2} below target {:.2}", average, RELEVANCE_TARGET);
        diag.warn(format!(
            "Average relevance {average:.2} is below the {RELEVANCE_TARGET:.2} target"
        ));
    }

    diag.relevance_scores = scores;
    diag.relevance_average = average;
    questions
}

/// Pass 3: flags generic workplace questions that mention no job-specific term and
/// neither the posting's title nor its department. Flagged questions stay in the set.
pub fn flag_generic(
    questions: Vec<Question>,
    ctx: &PassContext<'_>,
    diag: &mut Diagnostics,
) -> Vec<Question> {
    let role_names: Vec<&str> = [ctx.job.title.as_str(), ctx.job.department.as_str()]
        .into_iter()
        .map(str::trim)
        // "IT" and the like would match inside ordinary words
        .filter(|name| name.chars().count() >= MIN_ROLE_NAME_CHARS)
        .collect();

    for q in &questions {
        let generic = ctx
            .rules
            .generic_patterns
            .iter()
            .any(|re| re.is_match(&q.question));
        if !generic {
            continue;
        }
        let names_role = role_names
            .iter()
            .any(|name| mentions_term(&q.question, name));
        if !names_role && term_hits(q, ctx.allowed_terms) == 0 {
            diag.generic_questions.push(q.id);
            diag.warn(format!(
                "Question {} reads as a generic workplace question with no job-specific task",
                q.id
            ));
        }
    }
    questions
}
