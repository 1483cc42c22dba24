//! Phrase extraction: frequency-ranked two-word terms from a job posting.
//!
//! Pure and deterministic. The output is a hint for the generator and the vocabulary
//! for relevance scoring; an empty list is a valid result.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::quality::rules::PHRASE_STOPWORDS;
use crate::quality::text::{char_len, tokenize};

/// At most this many terms are kept.
pub const MAX_ALLOWED_TERMS: usize = 24;
/// Phrases shorter than this (in chars, including the space) are too vague to keep.
pub const MIN_TERM_CHARS: usize = 7;

/// A phrase from the posting with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedTerm {
    pub phrase: String,
    pub frequency: u32,
}

struct Candidate {
    frequency: u32,
    first_seen: usize,
}

/// Extracts up to 24 stopword-free bigrams, most frequent first.
///
/// Ties keep first occurrence in the text.
pub fn extract_allowed_terms(text: &str) -> Vec<AllowedTerm> {
    let stopwords: HashSet<&str> = PHRASE_STOPWORDS.iter().copied().collect();
    let tokens = tokenize(text);

    let mut candidates: HashMap<String, Candidate> = HashMap::new();
    for (position, pair) in tokens.windows(2).enumerate() {
        if pair.iter().any(|t| stopwords.contains(t.as_str())) {
            continue;
        }
        candidates
            .entry(pair.join(" "))
            .and_modify(|c| c.frequency += 1)
            .or_insert(Candidate {
                frequency: 1,
                first_seen: position,
            });
    }

    let mut ranked: Vec<(String, Candidate)> = candidates
        .into_iter()
        .filter(|(phrase, _)| char_len(phrase) >= MIN_TERM_CHARS)
        .collect();
    ranked.sort_by(|(_, a), (_, b)| {
        b.frequency
            .cmp(&a.frequency)
            .then(a.first_seen.cmp(&b.first_seen))
    });

    ranked
        .into_iter()
        .take(MAX_ALLOWED_TERMS)
        .map(|(phrase, c)| AllowedTerm {
            phrase,
            frequency: c.frequency,
        })
        .collect()
}

/// Just the phrases, in rank order.
pub fn term_phrases(terms: &[AllowedTerm]) -> Vec<String> {
    terms.iter().map(|t| t.phrase.clone()).collect()
}
