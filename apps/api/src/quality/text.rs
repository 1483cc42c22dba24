//! Text primitives shared by phrase extraction and the QC passes.
//!
//! Everything here works on `char`s, never bytes, so Turkish and other extended Latin
//! letters (ç, ğ, ı, ö, ş, ü) survive lowercasing, tokenising and n-gram slicing.

use std::collections::HashSet;

/// Suffixes removed by the light stemmer, longest first. Turkish inflections and a few
/// English endings; this is a similarity aid, not a morphological analyser.
const STEM_SUFFIXES: &[&str] = &[
    "ları", "leri", "ması", "mesi", "ında", "inde", "ing", "lar", "ler", "nın", "nin", "ını",
    "ini", "dan", "den", "tan", "ten", "ed", "es", "ın", "in", "un", "ün", "da", "de", "ı",
    "i", "u", "ü", "s",
];

/// Minimum stem length left after suffix removal.
const MIN_STEM_CHARS: usize = 3;

/// Similarity at or above which two stemmed strings count as a fuzzy match.
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.38;

/// Lowercases and replaces every non-alphanumeric character with a space.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect()
}

/// Normalised whitespace tokens longer than one character.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .filter(|t| t.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

/// Strips the first (longest listed) matching suffix, keeping at least three characters.
pub fn stem(word: &str) -> String {
    let char_len = word.chars().count();
    for suffix in STEM_SUFFIXES {
        if let Some(base) = word.strip_suffix(suffix) {
            if char_len - suffix.chars().count() >= MIN_STEM_CHARS {
                return base.to_string();
            }
        }
    }
    word.to_string()
}

/// Tokenises and stems each word, joined with single spaces.
pub fn stem_phrase(text: &str) -> String {
    tokenize(text)
        .iter()
        .map(|t| stem(t))
        .collect::<Vec<_>>()
        .join(" ")
}

fn trigrams(text: &str) -> HashSet<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < 3 {
        let mut set = HashSet::new();
        if !chars.is_empty() {
            set.insert(text.to_string());
        }
        return set;
    }
    chars.windows(3).map(|w| w.iter().collect()).collect()
}

/// Jaccard similarity of the character 3-gram sets of `a` and `b` (0.0–1.0).
/// Two empty strings are identical.
pub fn trigram_similarity(a: &str, b: &str) -> f64 {
    let ta = trigrams(a);
    let tb = trigrams(b);
    if ta.is_empty() && tb.is_empty() {
        return 1.0;
    }
    let intersection = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    intersection as f64 / union as f64
}

/// True if `term` occurs in `text` verbatim (after normalisation) or fuzzily.
///
/// Fuzzy: every window of the text with the same word count as the term is stemmed and
/// compared to the stemmed term by 3-gram Jaccard.
pub fn mentions_term(text: &str, term: &str) -> bool {
    let text_norm = normalize(text);
    let term_norm = normalize(term);
    let term_norm = term_norm.split_whitespace().collect::<Vec<_>>().join(" ");
    if term_norm.is_empty() {
        return false;
    }
    let text_joined = text_norm.split_whitespace().collect::<Vec<_>>().join(" ");
    if text_joined.contains(&term_norm) {
        return true;
    }

    let term_stem = stem_phrase(&term_norm);
    let width = term_stem.split(' ').count().max(1);
    let tokens: Vec<String> = tokenize(text).iter().map(|t| stem(t)).collect();
    if tokens.len() < width {
        return trigram_similarity(&tokens.join(" "), &term_stem) >= FUZZY_MATCH_THRESHOLD;
    }
    tokens
        .windows(width)
        .any(|w| trigram_similarity(&w.join(" "), &term_stem) >= FUZZY_MATCH_THRESHOLD)
}

/// Length in characters, which is what option balancing measures.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
