//! Option-length balancing, so the correct answer cannot be spotted by its length.

use tracing::debug;

use crate::models::question::Question;
use crate::quality::diagnostics::Diagnostics;
use crate::quality::rules::QualityRules;
use crate::quality::text::char_len;
use crate::quality::PassContext;

/// Correct option longer than this multiple of the mean gets shortened...
const SHORTEN_TRIGGER: f64 = 1.2;
/// ...down to this multiple of the mean.
const SHORTEN_TARGET: f64 = 1.15;
/// Options shorter than this multiple of the mean (and the floor below) get lengthened.
const LENGTHEN_TRIGGER: f64 = 0.5;
const LENGTHEN_FLOOR_CHARS: usize = 25;
/// Allowed `max - min` spread, as a fraction of the mean, before a warning is recorded.
const SPREAD_TOLERANCE: f64 = 0.2;
/// Truncation never cuts an option below this many words.
const MIN_WORDS: usize = 3;

const DANGLING_WORDS: &[&str] = &["and", "or", "to", "for", "with", "the", "a", "ve", "veya", "ile"];

fn mean_len(options: &[String]) -> f64 {
    if options.is_empty() {
        return 0.0;
    }
    options.iter().map(|o| char_len(o)).sum::<usize>() as f64 / options.len() as f64
}

/// `max - min` over option lengths.
pub fn length_spread(options: &[String]) -> usize {
    let lens = options.iter().map(|o| char_len(o));
    let max = lens.clone().max().unwrap_or(0);
    let min = lens.min().unwrap_or(0);
    max - min
}

/// Drops trailing punctuation and dangling conjunctions left behind by truncation.
fn tidy_tail(mut words: Vec<&str>) -> String {
    while words.len() > MIN_WORDS {
        let last = words[words.len() - 1].to_lowercase();
        if DANGLING_WORDS.contains(&last.as_str()) {
            words.pop();
        } else {
            break;
        }
    }
    words
        .join(" ")
        .trim_end_matches(|c: char| matches!(c, ',' | ';' | ':' | '-'))
        .to_string()
}

/// Removes filler words, then trailing words, until `text` fits in `limit` characters
/// (never below `MIN_WORDS` words).
pub fn shorten_to(text: &str, rules: &QualityRules, limit: usize) -> String {
    let mut current = text.to_string();
    for re in &rules.filler_words {
        current = re.replace_all(&current, "").into_owned();
    }
    let current = current.split_whitespace().collect::<Vec<_>>().join(" ");
    if char_len(&current) <= limit {
        return current;
    }

    let mut words: Vec<&str> = current.split_whitespace().collect();
    while words.len() > MIN_WORDS && char_len(&words.join(" ")) > limit {
        words.pop();
    }
    tidy_tail(words)
}

/// Pass 7: shortens an over-long correct option and pads very short options.
pub fn balance_option_lengths(
    mut questions: Vec<Question>,
    ctx: &PassContext<'_>,
    diag: &mut Diagnostics,
) -> Vec<Question> {
    let clauses = ctx.rules.filler_clauses.get(ctx.language);

    for (qi, q) in questions.iter_mut().enumerate() {
        let correct = q.correct_index();
        let mean = mean_len(&q.options);

        let correct_len = char_len(&q.options[correct]);
        if correct_len as f64 > SHORTEN_TRIGGER * mean {
            let limit = (SHORTEN_TARGET * mean).floor() as usize;
            let shortened = shorten_to(&q.options[correct], ctx.rules, limit);
            debug!(
                "Question {}: correct option {} -> {} chars (limit {})",
                q.id,
                correct_len,
                char_len(&shortened),
                limit
            );
            q.options[correct] = shortened;
            diag.repaired(q.id, "option_length", "correct option shortened");
        }

        if !clauses.is_empty() {
            let mean = mean_len(&q.options);
            for oi in 0..q.options.len() {
                let len = char_len(&q.options[oi]);
                if (len as f64) < LENGTHEN_TRIGGER * mean && len < LENGTHEN_FLOOR_CHARS {
                    let clause = &clauses[(qi + oi) % clauses.len()];
                    let base = q.options[oi].trim_end_matches(['.', '!', ' ']).to_string();
                    q.options[oi] = format!("{base}{clause}");
                    diag.repaired(q.id, "option_length", format!("option {oi} lengthened"));
                }
            }
        }

        let mean = mean_len(&q.options);
        let spread = length_spread(&q.options);
        if spread as f64 > SPREAD_TOLERANCE * mean {
            diag.warn(format!(
                "Question {} option lengths still differ by {} chars (mean {:.0})",
                q.id, spread, mean
            ));
        }
    }
    questions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::fixtures::sample_questions;
    use crate::models::question::JobPosting;
    use crate::quality::rules::Language;

    /// ASCII text of exactly `n` chars made of repeated words.
    fn text_of_len(n: usize) -> String {
        let mut s: String = "counts ".repeat(n / 7 + 1).chars().take(n).collect();
        if s.ends_with(' ') {
            s.pop();
            s.push('s');
        }
        s
    }

    fn run(questions: Vec<Question>) -> (Vec<Question>, Diagnostics) {
        run_in(Language::English, questions)
    }

    fn run_in(language: Language, questions: Vec<Question>) -> (Vec<Question>, Diagnostics) {
        let rules = QualityRules::standard().unwrap();
        let job = JobPosting::default();
        let ctx = PassContext {
            job: &job,
            allowed_terms: &[],
            rules: &rules,
            language,
            seed: 0,
        };
        let mut diag = Diagnostics::default();
        let out = balance_option_lengths(questions, &ctx, &mut diag);
        (out, diag)
    }

    #[test]
    fn test_text_of_len_helper() {
        for n in [5, 20, 25, 30, 90] {
            assert_eq!(char_len(&text_of_len(n)), n);
        }
    }

    #[test]
    fn test_long_correct_option_is_shortened_to_target() {
        // lengths [20, 90, 30, 25], mean 41.25 -> correct must end at or under 47
        let mut questions = sample_questions();
        questions[0].options = vec![
            text_of_len(20),
            text_of_len(90),
            text_of_len(30),
            text_of_len(25),
        ];
        questions[0].correct_answer = 1;
        let original = questions[0].options[1].clone();

        let (out, diag) = run(questions);
        let shortened = &out[0].options[1];
        assert!(char_len(shortened) <= 47, "got {}", char_len(shortened));
        assert!(original.starts_with(shortened.as_str()));
        assert_eq!(out[0].options[0], text_of_len(20));
        assert_eq!(out[0].options[2], text_of_len(30));
        assert_eq!(diag.repairs[0].pass, "option_length");
    }

    #[test]
    fn test_short_option_is_lengthened_with_clause() {
        let mut questions = sample_questions();
        questions[0].options = vec![
            "Leave".to_string(),
            text_of_len(50),
            text_of_len(50),
            text_of_len(50),
        ];
        questions[0].correct_answer = 0;
        let (out, _) = run(questions);
        assert_eq!(out[0].options[0], "Leave in line with standard procedures");
    }

    #[test]
    fn test_short_turkish_option_gets_turkish_clause() {
        let mut questions = sample_questions();
        questions[0].options = vec![
            "Beklerim".to_string(),
            text_of_len(50),
            text_of_len(50),
            text_of_len(50),
        ];
        questions[0].correct_answer = 1;
        let (out, _) = run_in(Language::Turkish, questions);
        assert_eq!(out[0].options[0], "Beklerim, standart prosedürlere uygun şekilde");
    }

    #[test]
    fn test_balanced_options_untouched() {
        let (out, diag) = run(sample_questions());
        assert_eq!(out, sample_questions());
        assert!(diag.repairs.is_empty());
    }

    #[test]
    fn test_shorten_removes_filler_words_first() {
        let rules = QualityRules::standard().unwrap();
        let out = shorten_to("Check the counts and also really verify them", &rules, 40);
        assert_eq!(out, "Check the counts and verify them");
    }

    #[test]
    fn test_shorten_drops_dangling_conjunction() {
        let rules = QualityRules::standard().unwrap();
        let out = shorten_to("Verify the stock records and update the system", &rules, 28);
        assert_eq!(out, "Verify the stock records");
    }

    #[test]
    fn test_length_spread() {
        let options = vec![
            "abcd".to_string(),
            "ab".to_string(),
            "abcdef".to_string(),
            "abc".to_string(),
        ];
        assert_eq!(length_spread(&options), 4);
    }
}
