//! Pass-one extractors: per-field heuristics that read a value straight off
//! the label text without a reference value.

use float_ord::FloatOrd;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    fields::{
        AGE_STATEMENT, ALCOHOL_CONTENT, APPELLATION_OF_ORIGIN, CLASS_TYPE, COUNTRY_OF_ORIGIN,
        GRAPE_VARIETAL, HEALTH_WARNING, NAME_AND_ADDRESS, NET_CONTENTS, QUALIFYING_PHRASE,
        STATE_OF_DISTILLATION, SULFITE_DECLARATION, VINTAGE_YEAR,
    },
    locate,
    text::collapse_whitespace,
    Dictionaries,
};

/// Similarity needed for a fuzzy qualifying-phrase hit.
pub const PHRASE_WINDOW_THRESHOLD: f32 = 0.80;
/// Characters captured after "government warning" when no `(2)` section ends it.
pub const HEALTH_WARNING_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub value: String,
    pub confidence: f32,
    pub reasoning: String,
}

impl Extraction {
    fn new(value: impl Into<String>, confidence: f32, reasoning: impl Into<String>) -> Self {
        Self {
            value: collapse_whitespace(&value.into()),
            confidence,
            reasoning: reasoning.into(),
        }
    }
}

pub type Extractor = fn(&str, &Dictionaries) -> Option<Extraction>;

/// Extractor for a field, `None` for fields only found by elimination.
pub fn extractor_for(field_name: &str) -> Option<Extractor> {
    let extractor: Extractor = match field_name {
        HEALTH_WARNING => extract_health_warning,
        QUALIFYING_PHRASE => extract_qualifying_phrase,
        SULFITE_DECLARATION => extract_sulfite_declaration,
        ALCOHOL_CONTENT => extract_alcohol_content,
        NET_CONTENTS => extract_net_contents,
        AGE_STATEMENT => extract_age_statement,
        COUNTRY_OF_ORIGIN => extract_country_of_origin,
        STATE_OF_DISTILLATION => extract_state_of_distillation,
        CLASS_TYPE => extract_class_type,
        GRAPE_VARIETAL => extract_grape_varietal,
        APPELLATION_OF_ORIGIN => extract_appellation,
        NAME_AND_ADDRESS => extract_name_and_address,
        VINTAGE_YEAR => extract_vintage_year,
        _ => return None,
    };
    Some(extractor)
}

struct Pattern {
    re: Regex,
    confidence: f32,
    label: &'static str,
}

fn patterns(specs: &[(&str, f32, &'static str)]) -> Vec<Pattern> {
    specs
        .iter()
        .map(|(re, confidence, label)| Pattern {
            re: Regex::new(re).unwrap(),
            confidence: *confidence,
            label: *label,
        })
        .collect()
}

/// First pattern that matches wins; group 1 when present, else the match.
fn first_match(text: &str, patterns: &[Pattern], field_name: &str) -> Option<Extraction> {
    patterns.iter().find_map(|pattern| {
        let caps = pattern.re.captures(text)?;
        let found = caps.get(1).or_else(|| caps.get(0))?;
        Some(Extraction::new(
            found.as_str().trim(),
            pattern.confidence,
            format!("{field_name}: matched {} pattern", pattern.label),
        ))
    })
}

/// Case-insensitive, word-bounded search for each entry, in the given order.
fn first_entry<'a>(text: &'a str, entries: &[&str]) -> Option<(&'a str, usize)> {
    entries.iter().enumerate().find_map(|(rank, entry)| {
        let pattern = entry
            .split_whitespace()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(r"[\s,]+");
        if pattern.is_empty() {
            return None;
        }
        let re = Regex::new(&format!(r"(?i)\b{pattern}\b")).ok()?;
        re.find(text).map(|found| (found.as_str(), rank))
    })
}

static WARNING_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)government\s+warning").unwrap());
static SECTION_ONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*1\s*\)").unwrap());
static SECTION_TWO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*2\s*\)").unwrap());

pub fn extract_health_warning(text: &str, _: &Dictionaries) -> Option<Extraction> {
    let start = WARNING_START_RE.find(text)?.start();
    let rest = &text[start..];
    let capped = rest
        .char_indices()
        .nth(HEALTH_WARNING_MAX_CHARS)
        .map_or(rest, |(end, _)| &rest[..end]);

    let section_one = SECTION_ONE_RE.is_match(capped);
    let section_two = SECTION_TWO_RE.find(capped);
    let warning = match section_two {
        Some(two) => match capped[two.end()..].find('.') {
            Some(period) => &capped[..two.end() + period + 1],
            None => capped,
        },
        None => capped,
    };
    let (confidence, detail) = match (section_one, section_two.is_some()) {
        (true, true) => (90.0, "both numbered sections present"),
        (true, false) | (false, true) => (75.0, "one numbered section present"),
        (false, false) => (60.0, "numbered sections not found"),
    };
    Some(Extraction::new(
        warning.trim(),
        confidence,
        format!("{HEALTH_WARNING}: government warning located, {detail}"),
    ))
}

pub fn extract_qualifying_phrase(text: &str, dictionaries: &Dictionaries) -> Option<Extraction> {
    let phrases = dictionaries.qualifying_phrases_longest_first();
    if let Some((_, rank)) = first_entry(text, &phrases) {
        return Some(Extraction::new(
            phrases[rank],
            90.0,
            format!("{QUALIFYING_PHRASE}: dictionary phrase found"),
        ));
    }

    let ampersand_variants = phrases
        .iter()
        .map(|it| it.replace(" and ", " & "))
        .collect::<Vec<_>>();
    let ampersand_refs = ampersand_variants.iter().map(String::as_str).collect::<Vec<_>>();
    if let Some((_, rank)) = first_entry(text, &ampersand_refs) {
        return Some(Extraction::new(
            phrases[rank],
            85.0,
            format!("{QUALIFYING_PHRASE}: dictionary phrase found with & for and"),
        ));
    }

    phrases
        .iter()
        .filter_map(|phrase| {
            let (_, similarity) = locate::best_window(text, phrase)?;
            (similarity >= PHRASE_WINDOW_THRESHOLD).then_some((*phrase, similarity))
        })
        // longest phrase wins on ties
        .rev()
        .max_by_key(|(_, similarity)| FloatOrd(*similarity))
        .map(|(phrase, similarity)| {
            Extraction::new(
                phrase,
                similarity * 85.0,
                format!("{QUALIFYING_PHRASE}: fuzzy phrase match ({similarity:.2})"),
            )
        })
}

static SULFITE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)contains\s+(?:sulfites|sulphites)").unwrap());

pub fn extract_sulfite_declaration(text: &str, _: &Dictionaries) -> Option<Extraction> {
    SULFITE_RE.find(text).map(|found| {
        Extraction::new(
            found.as_str(),
            95.0,
            format!("{SULFITE_DECLARATION}: declaration phrase found"),
        )
    })
}

static ALCOHOL_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    patterns(&[
        (
            r"(?i)(\d{1,2}(?:[.,]\d{1,2})?\s*%\s*alc(?:ohol)?\.?\s*(?:/|by)\s*vol(?:ume)?\.?)",
            95.0,
            "percent alc/vol",
        ),
        (
            r"(?i)(alc(?:ohol)?\.?\s*\d{1,2}(?:[.,]\d{1,2})?\s*%?\s*(?:/|by)\s*vol(?:ume)?\.?)",
            90.0,
            "alc percent by vol",
        ),
        (r"(?i)(\d{1,2}(?:[.,]\d{1,2})?\s*%\s*abv)\b", 90.0, "percent ABV"),
        (r"(?i)(\d{2,3}(?:\.\d)?\s*proof)\b", 85.0, "proof"),
        (r"(\d{1,2}(?:[.,]\d{1,2})?\s*%)", 60.0, "bare percentage"),
    ])
});

pub fn extract_alcohol_content(text: &str, _: &Dictionaries) -> Option<Extraction> {
    first_match(text, &ALCOHOL_PATTERNS, ALCOHOL_CONTENT)
}

static NET_CONTENTS_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    patterns(&[
        (
            r"(?i)(\d+(?:[.,]\d+)?\s*(?:ml|milliliters?|millilitres?)\.?)(?:\s|$|[^a-z])",
            95.0,
            "metric milliliters",
        ),
        (
            r"(?i)(\d+(?:[.,]\d+)?\s*(?:cl|centiliters?|centilitres?|l|lt|ltr|liters?|litres?)\.?)(?:\s|$|[^a-z])",
            90.0,
            "metric liters",
        ),
        (
            r"(?i)(\d+(?:\.\d+)?\s*(?:fl\.?\s*oz\.?|fluid\s+ounces?))",
            90.0,
            "fluid ounces",
        ),
        (
            r"(?i)(\d+(?:\.\d+)?\s*(?:pints?|pt\.?|quarts?|qt\.?|gallons?|gal\.?))(?:\s|$|[^a-z])",
            80.0,
            "US customary volume",
        ),
    ])
});

pub fn extract_net_contents(text: &str, _: &Dictionaries) -> Option<Extraction> {
    first_match(text, &NET_CONTENTS_PATTERNS, NET_CONTENTS)
}

static AGE_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    patterns(&[
        (r"(?i)(aged\s+(?:for\s+)?\w+\s+years?)", 90.0, "aged N years"),
        (r"(?i)(\d{1,2}\s+years?\s+old)", 90.0, "N years old"),
        (r"(?i)(\d{1,2}[\s-]*(?:years?|yrs?)\b)", 70.0, "N years"),
    ])
});

pub fn extract_age_statement(text: &str, _: &Dictionaries) -> Option<Extraction> {
    first_match(text, &AGE_PATTERNS, AGE_STATEMENT)
}

static COUNTRY_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    patterns(&[
        (r"(?i)\bproduct\s+of\s+([a-z][a-z ]{1,30}?)\s*(?:[.,\n]|$)", 90.0, "product of"),
        (r"(?i)\bproduced\s+in\s+([a-z][a-z ]{1,30}?)\s*(?:[.,\n]|$)", 85.0, "produced in"),
        (r"(?i)\bmade\s+in\s+([a-z][a-z ]{1,30}?)\s*(?:[.,\n]|$)", 85.0, "made in"),
        (r"(?i)\bimported\s+from\s+([a-z][a-z ]{1,30}?)\s*(?:[.,\n]|$)", 80.0, "imported from"),
    ])
});

pub fn extract_country_of_origin(text: &str, _: &Dictionaries) -> Option<Extraction> {
    first_match(text, &COUNTRY_PATTERNS, COUNTRY_OF_ORIGIN)
}

const US_STATES: &str = "alabama|alaska|arizona|arkansas|california|colorado|connecticut|delaware|florida|georgia|hawaii|idaho|illinois|indiana|iowa|kansas|kentucky|louisiana|maine|maryland|massachusetts|michigan|minnesota|mississippi|missouri|montana|nebraska|nevada|new hampshire|new jersey|new mexico|new york|north carolina|north dakota|ohio|oklahoma|oregon|pennsylvania|rhode island|south carolina|south dakota|tennessee|texas|utah|vermont|virginia|washington|west virginia|wisconsin|wyoming";

static STATE_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    patterns(&[
        (
            format!(r"(?i)\bdistilled\s+in\s+(?:the\s+state\s+of\s+)?({US_STATES})\b").as_str(),
            90.0,
            "distilled in",
        ),
        (
            format!(r"(?i)\b({US_STATES})\s+straight\b").as_str(),
            80.0,
            "state straight whiskey",
        ),
        (
            format!(r"(?i)\b({US_STATES})\s+(?:bourbon|whiske?y|rye)\b").as_str(),
            70.0,
            "state whiskey",
        ),
    ])
});

pub fn extract_state_of_distillation(text: &str, _: &Dictionaries) -> Option<Extraction> {
    first_match(text, &STATE_PATTERNS, STATE_OF_DISTILLATION)
}

pub fn extract_class_type(text: &str, dictionaries: &Dictionaries) -> Option<Extraction> {
    let descriptions = dictionaries.class_types_longest_first();
    if let Some((found, rank)) = first_entry(text, &descriptions) {
        let code = dictionaries.class_code(descriptions[rank]).unwrap_or("?");
        return Some(Extraction::new(
            found,
            85.0,
            format!("{CLASS_TYPE}: class/type {code} \"{}\" found", descriptions[rank]),
        ));
    }
    let designations = dictionaries
        .common_designations
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>();
    first_entry(text, &designations).map(|(found, _)| {
        Extraction::new(
            found,
            60.0,
            format!("{CLASS_TYPE}: generic designation found"),
        )
    })
}

fn dictionary_lookup(text: &str, entries: &[String], field_name: &str) -> Option<Extraction> {
    let mut entries = entries.iter().map(String::as_str).collect::<Vec<_>>();
    entries.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    first_entry(text, &entries).map(|(found, _)| {
        Extraction::new(
            found,
            85.0,
            format!("{field_name}: reference list entry found"),
        )
    })
}

pub fn extract_grape_varietal(text: &str, dictionaries: &Dictionaries) -> Option<Extraction> {
    dictionary_lookup(text, &dictionaries.grape_varietals, GRAPE_VARIETAL)
}

pub fn extract_appellation(text: &str, dictionaries: &Dictionaries) -> Option<Extraction> {
    dictionary_lookup(text, &dictionaries.appellations, APPELLATION_OF_ORIGIN)
}

static NAME_AND_ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:bottled|distilled|produced|imported|brewed|vinted|cellared|made|blended|manufactured|packed|canned|rectified)\s+(?:(?:and|&)\s+\w+\s+)?by:?[ \t]+([^\n]+)(?:\n([^\n]+))?",
    )
    .unwrap()
});

pub fn extract_name_and_address(text: &str, _: &Dictionaries) -> Option<Extraction> {
    let caps = NAME_AND_ADDRESS_RE.captures(text)?;
    let first = caps.get(1)?.as_str().trim();
    let value = match caps.get(2) {
        Some(next) if first.ends_with(',') => format!("{first} {}", next.as_str().trim()),
        _ => first.to_string(),
    };
    Some(Extraction::new(
        value.trim_end_matches([',', '.']),
        70.0,
        format!("{NAME_AND_ADDRESS}: text following the bottler statement"),
    ))
}

static VINTAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(19[5-9]\d|20[0-4]\d)\b").unwrap());

pub fn extract_vintage_year(text: &str, _: &Dictionaries) -> Option<Extraction> {
    VINTAGE_RE.find(text).map(|found| {
        Extraction::new(
            found.as_str(),
            70.0,
            format!("{VINTAGE_YEAR}: four-digit year found"),
        )
    })
}
