//! Per-field comparison of an expected value against the value read off the
//! label.
//!
//! Each field has a fixed strategy; callers may override it per comparison.
//! Every verdict carries a reasoning string naming the field and the basis of
//! the decision.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    fields::{
        AGE_STATEMENT, ALCOHOL_CONTENT, APPELLATION_OF_ORIGIN, BRAND_NAME, CLASS_TYPE,
        COUNTRY_OF_ORIGIN, GRAPE_VARIETAL, HEALTH_WARNING, NAME_AND_ADDRESS, NET_CONTENTS,
        QUALIFYING_PHRASE, STATE_OF_DISTILLATION, VINTAGE_YEAR,
    },
    text::{bigram_similarity, char_len, collapse_whitespace, normalize},
    units, ComparisonResult, Dictionaries,
};

/// Similarity at or above which two values are a fuzzy match.
pub const FUZZY_MATCH_THRESHOLD: f32 = 0.80;
/// Similarity at or above which two health warnings are considered equal.
pub const HEALTH_WARNING_SIMILARITY_THRESHOLD: f32 = 0.90;
/// Share of expected words that must appear for a `contains` match.
pub const WORD_OVERLAP_THRESHOLD: f32 = 0.5;
/// Allowed absolute difference between alcohol percentages.
pub const ALCOHOL_TOLERANCE_PERCENT: f64 = 0.5;
/// Allowed net contents difference, relative to the expected volume.
pub const NET_CONTENTS_TOLERANCE_RATIO: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Fuzzy,
    Normalized,
    Contains,
    Enum,
}

/// Default strategy for a field. Unknown fields compare fuzzily.
pub fn match_type_for(field_name: &str) -> MatchType {
    match field_name {
        HEALTH_WARNING | VINTAGE_YEAR => MatchType::Exact,
        BRAND_NAME | CLASS_TYPE | NAME_AND_ADDRESS | GRAPE_VARIETAL | APPELLATION_OF_ORIGIN
        | STATE_OF_DISTILLATION => MatchType::Fuzzy,
        ALCOHOL_CONTENT | NET_CONTENTS | AGE_STATEMENT => MatchType::Normalized,
        COUNTRY_OF_ORIGIN => MatchType::Contains,
        QUALIFYING_PHRASE => MatchType::Enum,
        _ => MatchType::Fuzzy,
    }
}

pub struct FieldComparator<'a> {
    dictionaries: &'a Dictionaries,
}

impl<'a> FieldComparator<'a> {
    pub fn new(dictionaries: &'a Dictionaries) -> Self {
        Self { dictionaries }
    }

    /// Compare `expected` with `extracted` for `field_name`. A missing or blank
    /// extracted value is always `not_found` with zero confidence.
    #[instrument(level = "debug", skip(self))]
    pub fn compare_field(
        &self,
        field_name: &str,
        expected: &str,
        extracted: Option<&str>,
        match_type: Option<MatchType>,
    ) -> ComparisonResult {
        let Some(extracted) = extracted.filter(|it| !it.trim().is_empty()) else {
            return ComparisonResult::not_found(format!(
                "{field_name}: no value was found on the label"
            ));
        };
        let match_type = match_type.unwrap_or_else(|| match_type_for(field_name));
        let result = match match_type {
            MatchType::Exact => exact(field_name, expected, extracted),
            MatchType::Fuzzy => fuzzy(field_name, expected, extracted),
            MatchType::Normalized => self.normalized(field_name, expected, extracted),
            MatchType::Contains => contains(field_name, expected, extracted),
            MatchType::Enum => self.enumerated(field_name, expected, extracted),
        };
        log::debug!(
            "{field_name} ({match_type:?}): {:?} at {:.1}",
            result.status,
            result.confidence
        );
        result
    }

    fn normalized(&self, field_name: &str, expected: &str, extracted: &str) -> ComparisonResult {
        match field_name {
            ALCOHOL_CONTENT => {
                match (
                    units::normalize_alcohol_content(expected),
                    units::normalize_alcohol_content(extracted),
                ) {
                    (Some(want), Some(got)) if (want - got).abs() <= ALCOHOL_TOLERANCE_PERCENT => {
                        ComparisonResult::matched(
                            95.0,
                            format!(
                                "{field_name}: {got}% is within {ALCOHOL_TOLERANCE_PERCENT}% of expected {want}%"
                            ),
                        )
                    }
                    (Some(want), Some(got)) => ComparisonResult::mismatch(
                        90.0,
                        format!(
                            "{field_name}: {got}% differs from expected {want}% by more than {ALCOHOL_TOLERANCE_PERCENT}%"
                        ),
                    ),
                    _ => unparsable(field_name, "alcohol percentage", expected, extracted),
                }
            }
            NET_CONTENTS => {
                match (
                    units::normalize_net_contents(expected, self.dictionaries),
                    units::normalize_net_contents(extracted, self.dictionaries),
                ) {
                    (Some(want), Some(got))
                        if (want - got).abs() <= want * NET_CONTENTS_TOLERANCE_RATIO =>
                    {
                        ComparisonResult::matched(
                            95.0,
                            format!(
                                "{field_name}: {got:.1} mL is within 1% of expected {want:.1} mL"
                            ),
                        )
                    }
                    (Some(want), Some(got)) => ComparisonResult::mismatch(
                        90.0,
                        format!("{field_name}: {got:.1} mL differs from expected {want:.1} mL"),
                    ),
                    _ => unparsable(field_name, "volume", expected, extracted),
                }
            }
            AGE_STATEMENT => {
                match (
                    units::normalize_age_statement(expected),
                    units::normalize_age_statement(extracted),
                ) {
                    (Some(want), Some(got)) if want == got => ComparisonResult::matched(
                        95.0,
                        format!("{field_name}: both state {got} years"),
                    ),
                    (Some(want), Some(got)) => ComparisonResult::mismatch(
                        90.0,
                        format!("{field_name}: label states {got} years, expected {want}"),
                    ),
                    _ => unparsable(field_name, "age in years", expected, extracted),
                }
            }
            _ => fuzzy(field_name, expected, extracted),
        }
    }

    fn enumerated(&self, field_name: &str, expected: &str, extracted: &str) -> ComparisonResult {
        let resolved = (
            self.dictionaries.resolve_qualifying_phrase(expected),
            self.dictionaries.resolve_qualifying_phrase(extracted),
        );
        match resolved {
            (Some(want), Some(got)) if want == got => ComparisonResult::matched(
                95.0,
                format!("{field_name}: both resolve to the phrase \"{got}\""),
            ),
            (Some(want), Some(got)) => ComparisonResult::mismatch(
                90.0,
                format!("{field_name}: label phrase \"{got}\" differs from expected \"{want}\""),
            ),
            _ => {
                let mut result = fuzzy(field_name, expected, extracted);
                result.reasoning = format!(
                    "{field_name}: not a known phrase, compared fuzzily; {}",
                    result.reasoning
                );
                result
            }
        }
    }
}

fn unparsable(field_name: &str, quantity: &str, expected: &str, extracted: &str) -> ComparisonResult {
    log::debug!("{field_name}: no {quantity} in {expected:?} / {extracted:?}, falling back to fuzzy");
    let mut result = fuzzy(field_name, expected, extracted);
    result.reasoning = format!(
        "{field_name}: could not parse a {quantity}, compared fuzzily; {}",
        result.reasoning
    );
    result
}

fn exact(field_name: &str, expected: &str, extracted: &str) -> ComparisonResult {
    let want = collapse_whitespace(expected);
    let got = collapse_whitespace(extracted);
    if want == got {
        return ComparisonResult::matched(100.0, format!("{field_name}: exact match"));
    }
    match field_name {
        VINTAGE_YEAR => {
            let want_digits = want.chars().filter(char::is_ascii_digit).collect::<String>();
            let got_digits = got.chars().filter(char::is_ascii_digit).collect::<String>();
            if !want_digits.is_empty() && want_digits == got_digits {
                ComparisonResult::matched(95.0, format!("{field_name}: year {got_digits} matches"))
            } else {
                ComparisonResult::mismatch(
                    90.0,
                    format!("{field_name}: year \"{got}\" differs from expected \"{want}\""),
                )
            }
        }
        HEALTH_WARNING => {
            if want.to_lowercase() == got.to_lowercase() {
                return ComparisonResult::matched(
                    85.0,
                    format!("{field_name}: matches ignoring case"),
                );
            }
            let similarity = bigram_similarity(&want, &got);
            if similarity >= HEALTH_WARNING_SIMILARITY_THRESHOLD {
                ComparisonResult::matched(
                    similarity * 80.0,
                    format!(
                        "{field_name}: near-identical text (similarity {similarity:.2})"
                    ),
                )
            } else {
                ComparisonResult::mismatch(
                    (1.0 - similarity) * 90.0,
                    format!(
                        "{field_name}: text differs from the required wording (similarity {similarity:.2})"
                    ),
                )
            }
        }
        _ => ComparisonResult::mismatch(
            90.0,
            format!("{field_name}: \"{got}\" is not exactly \"{want}\""),
        ),
    }
}

fn fuzzy(field_name: &str, expected: &str, extracted: &str) -> ComparisonResult {
    let want = normalize(expected);
    let got = normalize(extracted);
    let similarity = bigram_similarity(&want, &got);
    if similarity >= FUZZY_MATCH_THRESHOLD {
        return ComparisonResult::matched(
            similarity * 100.0,
            format!(
                "{field_name}: similarity {similarity:.2} meets threshold {FUZZY_MATCH_THRESHOLD:.2}"
            ),
        );
    }
    if !want.is_empty() && !got.is_empty() && (want.contains(&got) || got.contains(&want)) {
        let (shorter, longer) = if char_len(&want) <= char_len(&got) {
            (&want, &got)
        } else {
            (&got, &want)
        };
        let ratio = char_len(shorter) as f32 / char_len(longer) as f32;
        return ComparisonResult::matched(
            ratio * 85.0,
            format!(
                "{field_name}: \"{shorter}\" is contained in \"{longer}\" (length ratio {ratio:.2})"
            ),
        );
    }
    ComparisonResult::mismatch(
        (1.0 - similarity) * 90.0,
        format!(
            "{field_name}: similarity {similarity:.2} is below threshold {FUZZY_MATCH_THRESHOLD:.2}"
        ),
    )
}

fn contains(field_name: &str, expected: &str, extracted: &str) -> ComparisonResult {
    let want = normalize(expected);
    let got = normalize(extracted);
    if !want.is_empty() && !got.is_empty() && (want.contains(&got) || got.contains(&want)) {
        return ComparisonResult::matched(
            90.0,
            format!("{field_name}: \"{got}\" and \"{want}\" contain one another"),
        );
    }
    let wanted_words = want.split_whitespace().collect::<BTreeSet<_>>();
    let found_words = got.split_whitespace().collect::<BTreeSet<_>>();
    let overlap = if wanted_words.is_empty() {
        0.0
    } else {
        wanted_words.intersection(&found_words).count() as f32 / wanted_words.len() as f32
    };
    if overlap >= WORD_OVERLAP_THRESHOLD {
        ComparisonResult::matched(
            overlap * 80.0,
            format!("{field_name}: {:.0}% of expected words found", overlap * 100.0),
        )
    } else {
        ComparisonResult::mismatch(
            80.0,
            format!(
                "{field_name}: \"{got}\" does not contain \"{want}\" ({:.0}% word overlap)",
                overlap * 100.0
            ),
        )
    }
}
