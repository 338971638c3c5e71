//! Finding an expected value in the raw text of a label image.
//!
//! The search is an ordered cascade; the first strategy that finds the value
//! decides the confidence.

use std::collections::BTreeSet;

use float_ord::FloatOrd;
use regex::Regex;

use crate::text::{
    ampersand_to_and, bigram_similarity, collapse_whitespace, fold, normalize, remove_spaces,
    strip_sentence_punctuation,
};

/// Minimum similarity for the sliding-window fuzzy search.
pub const WINDOW_SIMILARITY_THRESHOLD: f32 = 0.70;
/// Share of significant tokens that must be present for a token-overlap hit.
pub const TOKEN_OVERLAP_THRESHOLD: f32 = 0.75;
/// Values need at least this many significant tokens for the overlap check.
pub const MIN_SIGNIFICANT_TOKENS: usize = 3;
/// Tokens shorter than this (after stripping punctuation) are ignored.
pub const MIN_SIGNIFICANT_TOKEN_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    /// The value as it reads on the label, or the expected value when the
    /// match was made on a transformed text.
    pub value: String,
    pub confidence: f32,
    pub method: &'static str,
}

type Strategy = fn(&str, &str) -> Option<Located>;

/// The cascade, tried in order.
pub const CASCADE: &[Strategy] = &[
    exact_substring,
    ampersand_substring,
    spaceless_substring,
    punctuation_free_substring,
    spaceless_punctuation_free_substring,
    fuzzy_window,
    ampersand_fuzzy_window,
    token_overlap,
];

/// Run the cascade of `text` against `target`.
pub fn locate(text: &str, target: &str) -> Option<Located> {
    if target.trim().is_empty() || text.trim().is_empty() {
        return None;
    }
    CASCADE.iter().find_map(|strategy| strategy(text, target))
}

fn substring_with(
    text: &str,
    target: &str,
    transform: impl Fn(&str) -> String,
    confidence: f32,
    method: &'static str,
) -> Option<Located> {
    let haystack = transform(&fold(text));
    let needle = transform(&fold(target));
    (!needle.is_empty() && haystack.contains(&needle)).then(|| Located {
        value: target.trim().to_string(),
        confidence,
        method,
    })
}

/// Case-insensitive substring, whitespace runs equivalent. Reports the text
/// as it appears on the label.
pub fn exact_substring(text: &str, target: &str) -> Option<Located> {
    let pattern = target
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    if pattern.is_empty() {
        return None;
    }
    let re = Regex::new(&format!("(?i){pattern}")).ok()?;
    re.find(text).map(|found| Located {
        value: collapse_whitespace(found.as_str()),
        confidence: 95.0,
        method: "exact substring",
    })
}

pub fn ampersand_substring(text: &str, target: &str) -> Option<Located> {
    substring_with(text, target, ampersand_to_and, 93.0, "substring with & as and")
}

pub fn spaceless_substring(text: &str, target: &str) -> Option<Located> {
    substring_with(text, target, remove_spaces, 90.0, "substring ignoring spaces")
}

pub fn punctuation_free_substring(text: &str, target: &str) -> Option<Located> {
    substring_with(
        text,
        target,
        strip_sentence_punctuation,
        88.0,
        "substring ignoring punctuation",
    )
}

pub fn spaceless_punctuation_free_substring(text: &str, target: &str) -> Option<Located> {
    substring_with(
        text,
        target,
        |it| remove_spaces(&strip_sentence_punctuation(it)),
        85.0,
        "substring ignoring spaces and punctuation",
    )
}

/// Best bigram similarity of `target` over word windows of `text`, trying the
/// target's own word count and a padded width.
pub fn best_window(text: &str, target: &str) -> Option<(String, f32)> {
    let words = text.split_whitespace().collect::<Vec<_>>();
    let target_norm = normalize(target);
    let target_words = target_norm.split_whitespace().count();
    if words.is_empty() || target_words == 0 {
        return None;
    }
    let padding = 2.max((target_words as f32 * 0.2).ceil() as usize);
    let sizes = [target_words, target_words + padding];

    sizes
        .iter()
        .map(|size| (*size).min(words.len()))
        .flat_map(|size| words.windows(size))
        .map(|window| {
            let joined = window.join(" ");
            let similarity = bigram_similarity(&normalize(&joined), &target_norm);
            (joined, similarity)
        })
        // first window wins on ties
        .rev()
        .max_by_key(|(_, similarity)| FloatOrd(*similarity))
}

fn window_with(text: &str, target: &str, method: &'static str) -> Option<Located> {
    let (window, similarity) = best_window(text, target)?;
    log::trace!("Best window {window:?} at {similarity:.2} for {target:?}");
    (similarity >= WINDOW_SIMILARITY_THRESHOLD).then(|| Located {
        value: window,
        confidence: similarity * 90.0,
        method,
    })
}

pub fn fuzzy_window(text: &str, target: &str) -> Option<Located> {
    window_with(text, target, "fuzzy window")
}

pub fn ampersand_fuzzy_window(text: &str, target: &str) -> Option<Located> {
    window_with(
        &ampersand_to_and(text),
        &ampersand_to_and(target),
        "fuzzy window with & as and",
    )
}

/// Significant tokens of `value`: the words of its normalized form that are
/// at least [`MIN_SIGNIFICANT_TOKEN_CHARS`] long.
pub fn significant_tokens(value: &str) -> Vec<String> {
    normalize(value)
        .split_whitespace()
        .filter(|it| it.chars().count() >= MIN_SIGNIFICANT_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

/// Multi-word values the OCR scattered over several lines: enough of their
/// tokens appear as whole words somewhere in the text. Both sides go through
/// [`normalize`] so apostrophes and hyphens split words the same way.
pub fn token_overlap(text: &str, target: &str) -> Option<Located> {
    let tokens = significant_tokens(target)
        .into_iter()
        .collect::<BTreeSet<_>>();
    if tokens.len() < MIN_SIGNIFICANT_TOKENS {
        return None;
    }
    let normalized = normalize(text);
    let haystack = normalized.split_whitespace().collect::<BTreeSet<_>>();
    let found = tokens
        .iter()
        .filter(|token| haystack.contains(token.as_str()))
        .count();
    let ratio = found as f32 / tokens.len() as f32;
    (ratio >= TOKEN_OVERLAP_THRESHOLD).then(|| Located {
        value: target.trim().to_string(),
        confidence: ratio * 80.0,
        method: "token overlap",
    })
}
