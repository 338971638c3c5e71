//! String normalization and similarity helpers shared by the matcher,
//! comparator and classifier.

use std::collections::HashMap;

/// Canonical form used for span matching.
///
/// Lowercases, keeps a period only when it sits between two digits, turns
/// every other punctuation character into a space, then collapses and trims
/// whitespace. Idempotent.
pub fn normalize(input: &str) -> String {
    // Lowercase first: some expansions emit combining marks that must be
    // classified like any other non-alphanumeric character.
    let chars = input.to_lowercase().chars().collect::<Vec<_>>();
    let mut replaced = String::with_capacity(input.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == '.' {
            let prev_digit = i > 0 && chars[i - 1].is_ascii_digit();
            let next_digit = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
            replaced.push(if prev_digit && next_digit { '.' } else { ' ' });
        } else if c.is_alphanumeric() {
            replaced.push(c);
        } else {
            replaced.push(' ');
        }
    }
    collapse_whitespace(&replaced)
}

/// Single-space every whitespace run and trim both ends.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase plus whitespace collapse, nothing else.
pub fn fold(input: &str) -> String {
    collapse_whitespace(&input.to_lowercase())
}

/// Drop all whitespace.
pub fn remove_spaces(input: &str) -> String {
    input.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Replace ampersands with the word `and`.
pub fn ampersand_to_and(input: &str) -> String {
    collapse_whitespace(&input.replace('&', " and "))
}

/// Remove the punctuation that separates sentences and clauses.
pub fn strip_sentence_punctuation(input: &str) -> String {
    let stripped = input
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '\'' | '"' | '(' | ')'))
        .collect::<String>();
    collapse_whitespace(&stripped)
}

pub fn char_len(input: &str) -> usize {
    input.chars().count()
}

fn bigrams(input: &str) -> HashMap<(char, char), usize> {
    let chars = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect::<Vec<_>>();
    let mut counts = HashMap::new();
    for pair in chars.windows(2) {
        *counts.entry((pair[0], pair[1])).or_insert(0) += 1;
    }
    counts
}

/// Dice coefficient over character bigrams, ignoring case and whitespace.
pub fn bigram_similarity(a: &str, b: &str) -> f32 {
    let left = bigrams(a);
    let right = bigrams(b);
    let left_total = left.values().sum::<usize>();
    let right_total = right.values().sum::<usize>();
    if left_total == 0 || right_total == 0 {
        let same = remove_spaces(&a.to_lowercase()) == remove_spaces(&b.to_lowercase());
        return if same && !a.trim().is_empty() { 1.0 } else { 0.0 };
    }
    let shared = left
        .iter()
        .map(|(pair, count)| (*count).min(right.get(pair).copied().unwrap_or(0)))
        .sum::<usize>();
    (2 * shared) as f32 / (left_total + right_total) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_keeps_decimal_points() {
        assert_eq!(normalize("ALC. 12.5% BY VOL."), "alc 12.5 by vol");
        assert_eq!(normalize("Jack's (Old-No./7)"), "jack s old no 7");
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in [
            "12.5%",
            "  Bulleit   Bourbon ",
            "1.2.3 . 4.",
            "GOVERNMENT WARNING: (1) ACCORDING",
            "Café & Co.",
            ".5 .",
            "İSTANBUL",
        ] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn bigram_similarity_bounds() {
        assert_eq!(bigram_similarity("Bourbon", "bourbon"), 1.0);
        assert_eq!(bigram_similarity("abc", "xyz"), 0.0);
        let sim = bigram_similarity("Cabernet Sauvignon", "Cabernet Sauvignen");
        assert!(sim > 0.8 && sim < 1.0);
    }

    #[test]
    fn sentence_punctuation_is_removed() {
        assert_eq!(strip_sentence_punctuation("Bottled by: Foo, Inc."), "Bottled by Foo Inc");
    }
}
