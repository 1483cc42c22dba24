//! Textual rewrites: out-of-level jargon, absolutist clauses, implausible options.

use std::borrow::Cow;

use tracing::debug;

use crate::models::question::{Question, OPTION_COUNT};
use crate::quality::diagnostics::Diagnostics;
use crate::quality::text::char_len;
use crate::quality::PassContext;

/// An option shorter than this after clause removal is restored to its original text.
const MIN_OPTION_CHARS: usize = 3;

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pass 4: replaces management/strategy jargon with neutral wording.
///
/// Applied to the question, the options and the explanation so the explanation keeps
/// sharing vocabulary with the option it justifies.
pub fn strip_advanced_topics(
    mut questions: Vec<Question>,
    ctx: &PassContext<'_>,
    diag: &mut Diagnostics,
) -> Vec<Question> {
    let topics = &ctx.rules.advanced_topics;
    let rewrite = |text: &str| -> Option<String> {
        let mut current: Cow<str> = Cow::Borrowed(text);
        for (re, replacement) in topics {
            if re.is_match(&current) {
                current = Cow::Owned(re.replace_all(&current, replacement.as_str()).into_owned());
            }
        }
        match current {
            Cow::Owned(s) => Some(s),
            Cow::Borrowed(_) => None,
        }
    };

    for q in questions.iter_mut() {
        let mut changed = false;
        if let Some(text) = rewrite(&q.question) {
            q.question = text;
            changed = true;
        }
        for option in q.options.iter_mut() {
            if let Some(text) = rewrite(option) {
                *option = text;
                changed = true;
            }
        }
        if let Some(text) = rewrite(&q.explanation) {
            q.explanation = text;
        }
        if changed {
            diag.repaired(q.id, "advanced_topics", "replaced out-of-level jargon");
        }
    }
    questions
}

/// Pass 5: removes "only/just X is sufficient" clauses from options.
pub fn strip_absolutist_language(
    mut questions: Vec<Question>,
    ctx: &PassContext<'_>,
    diag: &mut Diagnostics,
) -> Vec<Question> {
    for q in questions.iter_mut() {
        for (index, option) in q.options.iter_mut().enumerate() {
            let mut stripped = option.clone();
            for re in &ctx.rules.absolutist_patterns {
                stripped = re.replace_all(&stripped, "").into_owned();
            }
            if stripped == *option {
                continue;
            }
            let cleaned = collapse_whitespace(&stripped)
                .trim_matches(|c: char| c == ',' || c == ';' || c.is_whitespace())
                .to_string();
            if char_len(&cleaned) < MIN_OPTION_CHARS {
                diag.warn(format!(
                    "Question {} option {} is only an absolutist clause; left for manual review",
                    q.id, index
                ));
                continue;
            }
            debug!("Question {} option {}: absolutist clause removed", q.id, index);
            *option = cleaned;
            diag.repaired(q.id, "absolutist_language", format!("option {index} trimmed"));
        }
    }
    questions
}

/// Pass 6: swaps implausible distractors for professional ones from the template bank.
///
/// The bank slot is `question_index * 4 + option_index`, skipping templates already
/// present in the question. A silly *correct* option is only flagged.
pub fn replace_silly_options(
    mut questions: Vec<Question>,
    ctx: &PassContext<'_>,
    diag: &mut Diagnostics,
) -> Vec<Question> {
    let bank = ctx.rules.distractor_bank.get(ctx.language);
    if bank.is_empty() {
        return questions;
    }

    for (qi, q) in questions.iter_mut().enumerate() {
        for oi in 0..q.options.len() {
            let silly = ctx
                .rules
                .silly_patterns
                .iter()
                .any(|re| re.is_match(&q.options[oi]));
            if !silly {
                continue;
            }
            if oi == q.correct_index() {
                diag.warn(format!(
                    "Question {} has an implausible correct answer; left for manual review",
                    q.id
                ));
                continue;
            }

            let start = qi * OPTION_COUNT + oi;
            let replacement = (0..bank.len())
                .map(|k| &bank[(start + k) % bank.len()])
                .find(|candidate| !q.options.contains(candidate));
            if let Some(replacement) = replacement {
                debug!(
                    "Question {} option {}: replacing {:?}",
                    q.id, oi, q.options[oi]
                );
                q.options[oi] = replacement.clone();
                diag.repaired(q.id, "silly_options", format!("option {oi} replaced"));
            }
        }
    }
    questions
}
