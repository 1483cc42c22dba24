//! Rule banks for the QC passes: word lists, patterns and replacement templates.
//!
//! Kept as data so passes stay small and tests can swap in their own banks.

use std::collections::HashSet;

use regex::Regex;

/// Words that disqualify a bigram from the allowed-term list (Turkish and English).
pub const PHRASE_STOPWORDS: &[&str] = &[
    "ve", "veya", "ile", "ya", "da", "de", "ki", "bir", "bu", "şu", "o", "için", "gibi", "olan",
    "olarak", "olmak", "en", "çok", "daha", "her", "tüm", "ise", "ama", "fakat", "ancak", "hem",
    "ne", "mi", "mı", "biz", "siz", "sizin", "bizim", "kadar", "sonra", "önce", "üzere", "göre",
    "iyi", "yıl", "the", "and", "or", "of", "to", "in", "for", "with", "on", "at", "by", "an",
    "is", "are", "be", "as", "our", "your", "we", "you", "will", "from", "this", "that", "who",
    "all", "can", "has", "have", "their", "they", "it", "its",
];

/// Short list removed before explanation/option overlap scoring.
pub const OVERLAP_STOPWORDS: &[&str] = &[
    "ve", "ile", "bir", "bu", "için", "da", "de", "the", "and", "of", "to", "in", "is", "it",
    "that", "for", "on", "this", "be", "an", "or", "as", "with",
];

/// Generic workplace phrasing with no tie to a job-specific task.
const GENERIC_PATTERNS: &[&str] = &[
    r"(?i)\b(in|within|as part of) a team\b.*\bhow would you\b",
    r"(?i)\bhow (do|would) you (handle|deal with|manage) (stress|pressure|conflict)\b",
    r"(?i)\bwhat would you do if a (colleague|coworker|co-worker|team member)\b",
    r"(?i)\bhow would you (describe|rate) your (communication|teamwork) skills\b",
    r"(?i)\bwhat motivates you\b",
    r"(?i)\bbir ekip(te|in içinde)\b.*\bnasıl\b",
    r"(?i)\b(stres|baskı)(le|yla|i) nasıl başa çıkar",
    r"(?i)\biş arkadaşınızla (bir )?(anlaşmazlık|çatışma)",
];

/// Out-of-level management jargon and the neutral wording that replaces it.
const ADVANCED_TOPICS: &[(&str, &str)] = &[
    (r"(?i)\bKPIs?\b", "performance targets"),
    (r"(?i)\bOKRs?\b", "team goals"),
    (r"(?i)\bROI\b", "expected benefit"),
    (r"(?i)\bSWOT( analysis| analizi)?\b", "situation review"),
    (r"(?i)\bP&L\b", "budget"),
    (r"(?i)\bEBITDA\b", "profit"),
    (r"(?i)\bSix Sigma\b", "quality methods"),
    (r"(?i)\bBalanced Scorecard\b", "performance tracking"),
    (r"(?i)\bstakeholder management\b", "coordination with colleagues"),
    (r"(?i)\bchange management\b", "handling changes"),
];

/// "only/just X is sufficient" style absolutes, matched to the end of the clause.
const ABSOLUTIST_PATTERNS: &[&str] = &[
    r"(?i)\b(only|just)\s+[^,.;]*?\s+(is|are)\s+(sufficient|enough)\b[^,.;]*[,.;]?",
    r"(?i)\b(sadece|yalnızca)\s+[^,.;]*?\s*(yeterlidir|yeterli olur|yeter)\b[,.;]?",
];

/// Implausible or unprofessional answer options.
const SILLY_PATTERNS: &[&str] = &[
    r"(?i)\bi (would )?(just )?ignore (it|this|the problem|them|the issue)\b",
    r"(?i)\bi (would )?do nothing\b",
    r"(?i)\bi (would )?(quit|resign)\b",
    r"(?i)\bblame (my |the )?(colleague|coworker|team|customer)",
    r"(?i)\b(go|going) home early\b",
    r"(?i)\bshout at\b",
    r"(?i)görmezden gel",
    r"(?i)hiçbir şey yapma",
    r"(?i)istifa eder",
];

/// Professional-sounding distractors used when a silly option is replaced.
const DISTRACTOR_BANK_TR: &[&str] = &[
    "Daha fazla bilgi gelene kadar işi ertelerim",
    "Herhangi bir adım atmadan önce konuyu amirime iletirim",
    "Durumu gözden geçirmeden önceki yöntemle devam ederim",
    "Bir iş arkadaşımdan ilgilenmesini ister, sonucu daha sonra kontrol ederim",
    "Sorunu not eder ve bir sonraki planlı toplantıyı beklerim",
    "Hızlı bir geçici çözüm uygular, asıl nedene sonra dönerim",
];

const DISTRACTOR_BANK_EN: &[&str] = &[
    "Postpone the task until more information becomes available",
    "Escalate the matter to a supervisor before taking any action",
    "Continue with the previous approach without reviewing the situation",
    "Ask a colleague to handle it and check on the result later",
    "Document the issue and wait for the next scheduled meeting",
    "Apply a quick workaround and revisit the root cause afterwards",
];

/// Filler words dropped first when an over-long correct option is shortened.
const FILLER_WORDS: &[&str] = &[
    "also", "additionally", "furthermore", "moreover", "basically", "actually", "really", "very",
    "ayrıca", "bunun yanında", "aslında", "gerçekten", "oldukça",
];

/// Neutral clauses appended to options that are much shorter than their siblings.
const FILLER_CLAUSES_TR: &[&str] = &[
    ", standart prosedürlere uygun şekilde",
    ", ekibin mevcut planına göre",
    ", eldeki bilgileri kontrol ettikten sonra",
    ", mevcut önceliklere göre",
];

const FILLER_CLAUSES_EN: &[&str] = &[
    " in line with standard procedures",
    " according to the team's current plan",
    " after checking the available information",
    " based on the current priorities",
];

/// Function words that mark a text as Turkish or English during detection.
const TURKISH_MARKERS: &[&str] = &[
    "ve", "ile", "bir", "bu", "için", "olarak", "veya", "gibi", "daha", "çok", "ne", "nasıl",
];
const ENGLISH_MARKERS: &[&str] = &[
    "the", "and", "of", "to", "with", "for", "in", "is", "what", "how", "you", "your",
];
const TURKISH_LETTERS: &[char] = &[
    'ç', 'ğ', 'ı', 'ö', 'ş', 'ü', 'Ç', 'Ğ', 'İ', 'Ö', 'Ş', 'Ü',
];

/// Language the replacement banks are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    Turkish,
    #[default]
    English,
}

impl Language {
    /// Turkish when Turkish marker words and words with Turkish letters outnumber
    /// English marker words. Anything else, including empty text, is English.
    pub fn detect(text: &str) -> Self {
        let mut turkish = 0usize;
        let mut english = 0usize;
        for word in text.split_whitespace() {
            let lower = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if TURKISH_MARKERS.contains(&lower.as_str())
                || word.chars().any(|c| TURKISH_LETTERS.contains(&c))
            {
                turkish += 1;
            } else if ENGLISH_MARKERS.contains(&lower.as_str()) {
                english += 1;
            }
        }
        if turkish > english {
            Language::Turkish
        } else {
            Language::English
        }
    }
}

/// One bank per supported language.
#[derive(Debug, Clone)]
pub struct Localized<T> {
    pub turkish: T,
    pub english: T,
}

impl<T> Localized<T> {
    pub fn get(&self, language: Language) -> &T {
        match language {
            Language::Turkish => &self.turkish,
            Language::English => &self.english,
        }
    }
}

fn localized(turkish: &[&str], english: &[&str]) -> Localized<Vec<String>> {
    Localized {
        turkish: turkish.iter().map(|s| s.to_string()).collect(),
        english: english.iter().map(|s| s.to_string()).collect(),
    }
}

/// Valid answer-index count templates: every index appears 2 or 3 times, summing to 10.
pub const DISTRIBUTION_TEMPLATES: &[[usize; 4]] = &[
    [3, 3, 2, 2],
    [3, 2, 3, 2],
    [3, 2, 2, 3],
    [2, 3, 3, 2],
    [2, 3, 2, 3],
    [2, 2, 3, 3],
];

/// Compiled rule set consumed by the QC pipeline.
#[derive(Debug, Clone)]
pub struct QualityRules {
    pub generic_patterns: Vec<Regex>,
    pub advanced_topics: Vec<(Regex, String)>,
    pub absolutist_patterns: Vec<Regex>,
    pub silly_patterns: Vec<Regex>,
    pub distractor_bank: Localized<Vec<String>>,
    pub filler_words: Vec<Regex>,
    pub filler_clauses: Localized<Vec<String>>,
    pub overlap_stopwords: HashSet<String>,
    pub distribution_templates: Vec<[usize; 4]>,
}

impl QualityRules {
    /// Compiles the built-in banks.
    pub fn standard() -> Result<Self, regex::Error> {
        Ok(Self {
            generic_patterns: compile_all(GENERIC_PATTERNS)?,
            advanced_topics: ADVANCED_TOPICS
                .iter()
                .map(|(p, r)| Ok((Regex::new(p)?, r.to_string())))
                .collect::<Result<_, regex::Error>>()?,
            absolutist_patterns: compile_all(ABSOLUTIST_PATTERNS)?,
            silly_patterns: compile_all(SILLY_PATTERNS)?,
            distractor_bank: localized(DISTRACTOR_BANK_TR, DISTRACTOR_BANK_EN),
            filler_words: FILLER_WORDS
                .iter()
                .map(|w| Regex::new(&format!(r"(?i)\s*\b{}\b,?", regex::escape(w))))
                .collect::<Result<_, regex::Error>>()?,
            filler_clauses: localized(FILLER_CLAUSES_TR, FILLER_CLAUSES_EN),
            overlap_stopwords: OVERLAP_STOPWORDS.iter().map(|s| s.to_string()).collect(),
            distribution_templates: DISTRIBUTION_TEMPLATES.to_vec(),
        })
    }
}

fn compile_all(patterns: &[&str]) -> Result<Vec<Regex>, regex::Error> {
    patterns.iter().map(|p| Regex::new(p)).collect()
}
