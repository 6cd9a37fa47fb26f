//! Title-case normalization with word-level overrides
//!
//! Applies standard title casing to a title string: major words get their
//! first letter capitalized, minor words (articles, short prepositions,
//! conjunctions) stay lowercase, and the first and last words are always
//! capitalized. Three override lists take precedence over the baseline,
//! strongest first: preserve (verbatim), uppercase, lowercase. Override
//! matching is case-insensitive, but the replacement text comes from the
//! list entry, not from the input token.
//!
//! Tokens wrapped in braces are BibTeX case protection and pass through
//! untouched. Hyphenated tokens are handled segment by segment.
//!
//! The function is idempotent: normalizing an already-normalized title
//! returns it unchanged.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

lazy_static! {
    /// Minor words left lowercase under baseline title-case rules
    static ref MINOR_WORDS: HashSet<&'static str> = [
        "a", "an", "and", "as", "at", "but", "by", "en", "for", "if", "in",
        "nor", "of", "on", "or", "the", "to", "v", "via", "vs",
    ]
    .into_iter()
    .collect();

    /// Brace-protected token, e.g. {DNA} or {LaTeX}
    static ref BRACE_PROTECTED: Regex = Regex::new(r"\{\w+\}").unwrap();
}

/// Word lists controlling title casing, read-only for the duration of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordOverrides {
    /// Words forced to all-lowercase
    pub lowercase: Vec<String>,
    /// Words forced to all-uppercase
    pub uppercase: Vec<String>,
    /// Words reproduced exactly as listed
    pub preserve: Vec<String>,
}

/// Normalize a title to title case
pub fn normalize_title(raw: &str, overrides: &WordOverrides) -> String {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    let last = tokens.len().saturating_sub(1);

    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| normalize_token(token, i == 0 || i == last, overrides))
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_token(token: &str, is_edge: bool, overrides: &WordOverrides) -> String {
    if BRACE_PROTECTED.is_match(token) {
        return token.to_string();
    }

    let (prefix, core, suffix) = split_token(token);
    if core.is_empty() {
        return token.to_string();
    }

    if let Some(replacement) = apply_overrides(core, overrides) {
        return format!("{prefix}{replacement}{suffix}");
    }

    if core.contains('-') {
        let joined = core
            .split('-')
            .map(|segment| {
                apply_overrides(segment, overrides).unwrap_or_else(|| capitalize(segment))
            })
            .collect::<Vec<_>>()
            .join("-");
        return format!("{prefix}{joined}{suffix}");
    }

    if !is_edge && MINOR_WORDS.contains(core.to_lowercase().as_str()) {
        return token.to_lowercase();
    }

    format!("{prefix}{}{suffix}", capitalize(core))
}

/// Override lookup in precedence order: preserve > uppercase > lowercase
fn apply_overrides(word: &str, overrides: &WordOverrides) -> Option<String> {
    if let Some(entry) = find_word(&overrides.preserve, word) {
        return Some(entry.to_string());
    }
    if let Some(entry) = find_word(&overrides.uppercase, word) {
        return Some(entry.to_uppercase());
    }
    if let Some(entry) = find_word(&overrides.lowercase, word) {
        return Some(entry.to_lowercase());
    }
    None
}

fn find_word<'a>(list: &'a [String], word: &str) -> Option<&'a str> {
    let lowered = word.to_lowercase();
    list.iter()
        .find(|entry| entry.to_lowercase() == lowered)
        .map(String::as_str)
}

/// Split off non-alphanumeric punctuation attached to either end
fn split_token(token: &str) -> (&str, &str, &str) {
    let core_chars: Vec<(usize, char)> = token
        .char_indices()
        .filter(|(_, c)| c.is_alphanumeric() || *c == '-')
        .collect();

    match (core_chars.first(), core_chars.last()) {
        (Some(&(start, _)), Some(&(end, last_char))) => {
            let end = end + last_char.len_utf8();
            (&token[..start], &token[start..end], &token[end..])
        }
        _ => (token, "", ""),
    }
}

/// Uppercase the first character, leave the rest as written
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(lower: &[&str], upper: &[&str], preserve: &[&str]) -> WordOverrides {
        WordOverrides {
            lowercase: lower.iter().map(|s| s.to_string()).collect(),
            uppercase: upper.iter().map(|s| s.to_string()).collect(),
            preserve: preserve.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_basic_title_case() {
        let result = normalize_title("a study of mice", &WordOverrides::default());
        assert_eq!(result, "A Study of Mice");
    }

    #[test]
    fn test_dna_scenario() {
        let ov = overrides(&["of", "the"], &["DNA"], &[]);
        let result = normalize_title("a study of the DNA of mice", &ov);
        assert_eq!(result, "A Study of the DNA of Mice");
    }

    #[test]
    fn test_uppercase_matches_any_input_casing() {
        let ov = overrides(&[], &["DNA"], &[]);
        assert_eq!(normalize_title("the dna code", &ov), "The DNA Code");
        assert_eq!(normalize_title("the Dna code", &ov), "The DNA Code");
    }

    #[test]
    fn test_preserve_beats_uppercase() {
        let ov = overrides(&[], &["ff19SB"], &["ff19SB"]);
        assert_eq!(
            normalize_title("simulations with ff19sb applied", &ov),
            "Simulations With ff19SB Applied"
        );
    }

    #[test]
    fn test_uppercase_beats_lowercase() {
        let ov = overrides(&["rna"], &["RNA"], &[]);
        assert_eq!(normalize_title("the rna world", &ov), "The RNA World");
    }

    #[test]
    fn test_first_and_last_words_capitalized() {
        let result = normalize_title("the cell and the gene", &WordOverrides::default());
        assert_eq!(result, "The Cell and the Gene");
    }

    #[test]
    fn test_override_beats_edge_rule() {
        let ov = overrides(&["the"], &[], &[]);
        assert_eq!(normalize_title("the cell", &ov), "the Cell");
    }

    #[test]
    fn test_punctuation_stays_attached() {
        let ov = overrides(&[], &["DNA"], &[]);
        assert_eq!(
            normalize_title("mice, dna, and more", &ov),
            "Mice, DNA, and More"
        );
    }

    #[test]
    fn test_hyphenated_segments() {
        let result = normalize_title("a state-of-the-art method", &WordOverrides::default());
        assert_eq!(result, "A State-Of-The-Art Method");
    }

    #[test]
    fn test_hyphen_segment_override() {
        let ov = overrides(&[], &["DNA"], &[]);
        assert_eq!(
            normalize_title("the dna-binding domain", &ov),
            "The DNA-Binding Domain"
        );
    }

    #[test]
    fn test_braced_tokens_untouched() {
        let result = normalize_title("the {DNA} of {LaTeX}", &WordOverrides::default());
        assert_eq!(result, "The {DNA} of {LaTeX}");
    }

    #[test]
    fn test_idempotence() {
        let ov = overrides(&["of", "the"], &["DNA", "RNA"], &["ff19SB"]);
        let inputs = [
            "a study of the DNA of mice",
            "the rna world: ff19sb and {LaTeX}",
            "state-of-the-art DNA-binding",
            "ALL CAPS SHOUTING TITLE",
        ];
        for input in inputs {
            let once = normalize_title(input, &ov);
            let twice = normalize_title(&once, &ov);
            assert_eq!(once, twice, "drift on {input:?}");
        }
    }

    #[test]
    fn test_empty_title() {
        assert_eq!(normalize_title("", &WordOverrides::default()), "");
    }
}
