//! Pass two: brand and fanciful names by elimination.
//!
//! Everything pass one recognised, plus regulatory boilerplate, is removed
//! from the label text. The remaining lines are scored and the best one is
//! taken as the name.

use float_ord::FloatOrd;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::instrument;

use crate::{
    fields::{BRAND_NAME, FANCIFUL_NAME},
    text::collapse_whitespace,
};

/// Confidence of a brand name found by elimination.
pub const BRAND_CONFIDENCE: f32 = 70.0;
/// Confidence of a fanciful name found by elimination.
pub const FANCIFUL_CONFIDENCE: f32 = 60.0;

const POSITION_WEIGHT: f32 = 3.0;
const IDEAL_LENGTH_BONUS: f32 = 2.0;
const LONG_LINE_PENALTY: f32 = 3.0;
const ALL_CAPS_BONUS: f32 = 1.5;
const TITLE_CASE_BONUS: f32 = 1.0;
const ADDRESS_PENALTY: f32 = 4.0;
const NUMERIC_PENALTY: f32 = 2.0;

const BOILERPLATE: &[&str] = &[
    r"government\s+warning",
    r"according\s+to\s+the\s+surgeon\s+general",
    r"women\s+should\s+not\s+drink\s+alcoholic\s+beverages",
    r"during\s+pregnancy",
    r"because\s+of\s+the\s+risk\s+of\s+birth\s+defects",
    r"consumption\s+of\s+alcoholic\s+beverages",
    r"impairs\s+your\s+ability\s+to\s+drive\s+a\s+car\s+or\s+operate\s+machinery",
    r"and\s+may\s+cause\s+health\s+problems",
    r"contains\s+sulf?phites?",
    r"contains\s+sulfites?",
    r"please\s+(?:enjoy|drink)\s+responsibly",
    r"\(\s*[12]\s*\)",
    r"\b(?:alc(?:ohol)?|vol(?:ume)?|abv|proof|net\s+contents|contents)\b",
    r"\b(?:product\s+of|made\s+in|imported\s+by|bottled\s+by|distilled\s+by|produced\s+by|brewed\s+by)\b",
    r"\bwww\.\S+|\S+\.com\b",
    r"\b(?:ca|me|vt|ia|ma|mi|ny|or|ct|hi)\s+(?:redemption|cash\s+refund|deposit)\S*",
    r"\brecycl\w*",
];

static BOILERPLATE_RE: Lazy<Vec<Regex>> = Lazy::new(|| {
    BOILERPLATE
        .iter()
        .map(|it| Regex::new(&format!("(?i){it}")).unwrap())
        .collect()
});

static REGION_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z]{2}\b").unwrap());

/// A value claimed by pass one, removed wherever it occurs.
fn claimed_pattern(value: &str) -> Option<Regex> {
    let pattern = value
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    if pattern.is_empty() {
        return None;
    }
    Regex::new(&format!("(?i){pattern}")).ok()
}

/// `text` with every claimed value and all boilerplate blanked out.
pub fn strip_claimed(text: &str, claimed: &[&str]) -> String {
    let mut remaining = text.to_string();
    for re in claimed.iter().filter_map(|it| claimed_pattern(it)) {
        remaining = re.replace_all(&remaining, " ").into_owned();
    }
    for re in BOILERPLATE_RE.iter() {
        remaining = re.replace_all(&remaining, " ").into_owned();
    }
    remaining
}

fn is_all_caps(line: &str) -> bool {
    let letters = line.chars().filter(|c| c.is_alphabetic());
    letters.clone().count() > 1 && letters.clone().all(char::is_uppercase)
}

fn is_title_case(line: &str) -> bool {
    let words = line
        .split_whitespace()
        .filter(|it| it.chars().next().is_some_and(char::is_alphabetic))
        .collect::<Vec<_>>();
    !words.is_empty()
        && words
            .iter()
            .all(|it| it.chars().next().is_some_and(char::is_uppercase))
}

fn is_address_like(line: &str) -> bool {
    line.contains(',') && REGION_CODE_RE.is_match(line)
}

/// Score of a candidate line at `position` out of `total` lines.
pub fn score_line(line: &str, position: usize, total: usize) -> f32 {
    let words = line.split_whitespace().count();
    let mut score = POSITION_WEIGHT * (1.0 - position as f32 / total.max(1) as f32);
    score += match words {
        1..=4 => IDEAL_LENGTH_BONUS,
        5..=6 => 0.0,
        _ => -LONG_LINE_PENALTY,
    };
    if is_all_caps(line) {
        score += ALL_CAPS_BONUS;
    } else if is_title_case(line) {
        score += TITLE_CASE_BONUS;
    }
    if is_address_like(line) {
        score -= ADDRESS_PENALTY;
    }
    let digits = line.chars().filter(char::is_ascii_digit).count();
    let letters = line.chars().filter(|c| c.is_alphabetic()).count();
    if digits > letters {
        score -= NUMERIC_PENALTY;
    }
    score
}

/// Candidate lines left after elimination, trimmed of stray punctuation.
pub fn candidate_lines(remaining: &str) -> Vec<String> {
    remaining
        .lines()
        .map(|line| {
            collapse_whitespace(line.trim_matches(|c: char| !c.is_alphanumeric()))
        })
        .filter(|line| line.chars().filter(|c| c.is_alphabetic()).count() >= 2)
        .collect()
}

/// Best-scoring remaining line, or `None` when nothing scores at least zero.
fn best_line(remaining: &str) -> Option<(String, f32)> {
    let lines = candidate_lines(remaining);
    let total = lines.len();
    let (line, score) = lines
        .into_iter()
        .enumerate()
        .map(|(position, line)| {
            let score = score_line(&line, position, total);
            log::trace!("Elimination candidate {line:?} scored {score:.2}");
            (line, score)
        })
        // earlier line wins on ties
        .rev()
        .max_by_key(|(_, score)| FloatOrd(*score))?;
    if score < 0.0 {
        log::debug!("Best remaining line {line:?} scored {score:.2}, rejected");
        return None;
    }
    Some((line, score))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Eliminated {
    pub field_name: &'static str,
    pub value: String,
    pub confidence: f32,
    pub reasoning: String,
}

#[instrument(level = "debug", skip(text, claimed))]
pub fn extract_brand_name(text: &str, claimed: &[&str]) -> Option<Eliminated> {
    let remaining = strip_claimed(text, claimed);
    let (value, score) = best_line(&remaining)?;
    Some(Eliminated {
        field_name: BRAND_NAME,
        value,
        confidence: BRAND_CONFIDENCE,
        reasoning: format!(
            "{BRAND_NAME}: best unclaimed line after elimination (score {score:.2})"
        ),
    })
}

/// Like [`extract_brand_name`], with the brand itself also eliminated.
#[instrument(level = "debug", skip(text, claimed))]
pub fn extract_fanciful_name(
    text: &str,
    claimed: &[&str],
    brand_name: Option<&str>,
) -> Option<Eliminated> {
    let mut claimed = claimed.to_vec();
    claimed.extend(brand_name);
    let remaining = strip_claimed(text, &claimed);
    let (value, score) = best_line(&remaining)?;
    Some(Eliminated {
        field_name: FANCIFUL_NAME,
        value,
        confidence: FANCIFUL_CONFIDENCE,
        reasoning: format!(
            "{FANCIFUL_NAME}: best unclaimed line once the brand is removed (score {score:.2})"
        ),
    })
}
