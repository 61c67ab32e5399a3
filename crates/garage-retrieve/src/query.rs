//! Query analysis: tokens, literal part numbers, procedure intent.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

pub use garage_index::normalize_part_no;

/// Words that appear in nearly every workshop query and do not discriminate.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // articles, conjunctions, prepositions
        "a", "an", "the", "and", "or", "of", "to", "in", "on", "at", "for", "with", "from", "by",
        "as", "into", "onto", "off", "up", "out", "about", "via",
        // pronouns and auxiliaries
        "i", "me", "my", "we", "our", "you", "your", "it", "its", "this", "that", "these",
        "those", "is", "are", "was", "be", "been", "do", "does", "did", "can", "could",
        "should", "would", "will", "am",
        // question words
        "how", "what", "which", "where", "when", "why", "who",
        // request filler
        "please", "show", "need", "want", "tell", "find", "give", "get", "help", "replace",
    ]
    .into_iter()
    .collect()
});

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("static pattern"));
static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("static pattern"));

/// Substrings of the raw query that signal a repair procedure.
const INTENT_PHRASES: &[&str] = &["replace", "remove", "install", "change"];
/// Tokens that signal a repair procedure.
const INTENT_TOKENS: &[&str] = &["replace", "remove", "install", "change", "repair"];

const MIN_PART_DIGITS: usize = 6;
const MAX_PART_DIGITS: usize = 9;

/// Lowercase, split on non-alphanumerics, drop short tokens and stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_ALNUM
        .replace_all(&lowered, " ")
        .split(' ')
        .map(str::trim)
        .filter(|t| t.len() >= 2 && !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Digit runs of 6 to 9 characters, normalized, first-seen order, no repeats.
///
/// Longer runs (VINs, serials) are not part numbers and are skipped whole.
pub fn extract_part_numbers(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    DIGIT_RUN
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|run| (MIN_PART_DIGITS..=MAX_PART_DIGITS).contains(&run.len()))
        .map(normalize_part_no)
        .filter(|n| seen.insert(n.clone()))
        .collect()
}

/// Whether the query asks for a remove/install/replace style procedure.
///
/// Checks raw substrings ("replacement" still counts) and whole tokens.
pub fn detect_procedure_intent(query: &str, tokens: &[String]) -> bool {
    let lowered = query.to_lowercase();
    INTENT_PHRASES.iter().any(|p| lowered.contains(p))
        || tokens.iter().any(|t| INTENT_TOKENS.contains(&t.as_str()))
}

/// A query broken down for scoring.
#[derive(Debug, Clone)]
pub struct AnalyzedQuery {
    pub raw: String,
    /// Trimmed, lowercased query used for exact-phrase checks.
    pub lowered: String,
    /// Distinct scoring tokens in query order.
    pub tokens: Vec<String>,
    pub part_numbers: Vec<String>,
    pub procedure_intent: bool,
}

impl AnalyzedQuery {
    pub fn analyze(query: &str) -> Self {
        let mut seen = HashSet::new();
        let tokens: Vec<String> = tokenize(query)
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect();
        let procedure_intent = detect_procedure_intent(query, &tokens);

        Self {
            raw: query.to_string(),
            lowered: query.trim().to_lowercase(),
            part_numbers: extract_part_numbers(query),
            tokens,
            procedure_intent,
        }
    }
}
