//! Formatting normalisation: quote removal and option capitalisation.

use crate::models::question::Question;
use crate::quality::diagnostics::Diagnostics;
use crate::quality::PassContext;

/// Quotation characters removed from all candidate-visible text. The ASCII apostrophe is
/// kept: it carries Turkish case suffixes ("Ankara'da") and English contractions.
const QUOTE_CHARS: &[char] = &['"', '“', '”', '„', '‟', '«', '»', '‹', '›', '`', '´'];

fn strip_quotes(text: &str) -> Option<String> {
    if !text.contains(QUOTE_CHARS) {
        return None;
    }
    let stripped: String = text.chars().filter(|c| !QUOTE_CHARS.contains(c)).collect();
    Some(stripped.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Pass 9: strips quotation marks from question, options and explanation.
pub fn remove_quote_marks(
    mut questions: Vec<Question>,
    _ctx: &PassContext<'_>,
    diag: &mut Diagnostics,
) -> Vec<Question> {
    for q in questions.iter_mut() {
        let mut changed = false;
        for text in std::iter::once(&mut q.question)
            .chain(q.options.iter_mut())
            .chain(std::iter::once(&mut q.explanation))
        {
            if let Some(stripped) = strip_quotes(text) {
                *text = stripped;
                changed = true;
            }
        }
        if changed {
            diag.repaired(q.id, "quote_marks", "quotation marks removed");
        }
    }
    questions
}

/// Uppercases the first letter (Unicode-aware); leading non-letters are left alone.
pub fn capitalize_first(text: &str) -> String {
    let trimmed = text.trim_start();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() => first.to_uppercase().chain(chars).collect(),
        _ => trimmed.to_string(),
    }
}

/// Pass 11: every option starts with a capital letter.
pub fn capitalize_options(
    mut questions: Vec<Question>,
    _ctx: &PassContext<'_>,
    _diag: &mut Diagnostics,
) -> Vec<Question> {
    for q in questions.iter_mut() {
        for option in q.options.iter_mut() {
            *option = capitalize_first(option);
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

    #[test]
    fn test_capitalize_first_unicode() {
        assert_eq!(capitalize_first("şube müdürüne bildir"), "Şube müdürüne bildir");
        assert_eq!(capitalize_first("çalışma planı"), "Çalışma planı");
        assert_eq!(capitalize_first("  check counts"), "Check counts");
        assert_eq!(capitalize_first("3 pallets"), "3 pallets");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn test_strip_quotes_keeps_apostrophe() {
        assert_eq!(
            strip_quotes("“Ankara'da” \"depo\" «sayımı»").as_deref(),
            Some("Ankara'da depo sayımı")
        );
        assert_eq!(strip_quotes("no quotes here"), None);
    }

    #[test]
    fn test_remove_quote_marks_covers_all_fields() {
        let rules = QualityRules::standard().unwrap();
        let job = JobPosting::default();
        let ctx = PassContext {
            job: &job,
            allowed_terms: &[],
            rules: &rules,
            language: Language::English,
            seed: 0,
        };
        let mut questions = sample_questions();
        questions[0].question = "What does \"FIFO\" mean?".to_string();
        questions[0].options[3] = "“Last in, first out”".to_string();
        questions[0].explanation = "«FIFO» means first in, first out".to_string();

        let mut diag = Diagnostics::default();
        let out = remove_quote_marks(questions, &ctx, &mut diag);
        assert_eq!(out[0].question, "What does FIFO mean?");
        assert_eq!(out[0].options[3], "Last in, first out");
        assert_eq!(out[0].explanation, "FIFO means first in, first out");
        assert_eq!(diag.repairs.len(), 1);
    }
}
