//! Numeric extraction for the unit-normalized fields.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::Dictionaries;

static PERCENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").unwrap());

static PROOF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:°\s*)?proof\b").unwrap());

static ABV_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:(\d+(?:\.\d+)?)\s*(?:abv|alc\b))|(?:alc(?:ohol)?\.?\s*(\d+(?:\.\d+)?))")
        .unwrap()
});

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?|\.\d+").unwrap());

static COMMA_GROUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",(\d+)").unwrap());

static AGE_YEARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b([\w-]+?)[\s-]*(?:years?|yrs?)\b").unwrap());

static AGED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\baged\s+(?:for\s+|at\s+least\s+|a\s+minimum\s+of\s+)?([\w-]+)").unwrap());

const NUMBER_WORDS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen", "nineteen",
    "twenty", "twenty-one", "twenty-two", "twenty-three", "twenty-four", "twenty-five",
];

/// Resolve commas inside numbers: a comma followed by exactly three digits
/// groups thousands (`1,750` is `1750`), one or two digits make a decimal
/// comma (`12,5` is `12.5`).
fn fix_number_commas(value: &str) -> String {
    let mut fixed = String::with_capacity(value.len());
    let mut last = 0;
    for found in COMMA_GROUP_RE.find_iter(value) {
        let after_digit = value[..found.start()]
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_digit());
        let digits = &found.as_str()[1..];
        fixed.push_str(&value[last..found.start()]);
        match (after_digit, digits.len()) {
            (true, 3) => fixed.push_str(digits),
            (true, 1 | 2) => {
                fixed.push('.');
                fixed.push_str(digits);
            }
            _ => fixed.push_str(found.as_str()),
        }
        last = found.end();
    }
    fixed.push_str(&value[last..]);
    fixed
}

/// Alcohol by volume in percent.
///
/// Accepts `45% Alc./Vol.`, `45% ABV`, `Alc. 45 by vol` and `90 Proof`
/// (halved). An explicit percentage wins over a proof statement.
pub fn normalize_alcohol_content(value: &str) -> Option<f64> {
    let value = fix_number_commas(value);
    if let Some(caps) = PERCENT_RE.captures(&value) {
        return caps[1].parse().ok();
    }
    if let Some(caps) = PROOF_RE.captures(&value) {
        return caps[1].parse::<f64>().ok().map(|proof| proof / 2.0);
    }
    ABV_RE
        .captures(&value)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .and_then(|it| it.as_str().parse().ok())
}

/// Net contents in milliliters, using the dictionary's unit table.
pub fn normalize_net_contents(value: &str, dictionaries: &Dictionaries) -> Option<f64> {
    let value = fix_number_commas(value).to_lowercase();
    NUMBER_RE.find_iter(&value).find_map(|number| {
        let amount = number.as_str().parse::<f64>().ok()?;
        let (factor, _) = dictionaries.unit_at(&value[number.end()..])?;
        Some(amount * factor)
    })
}

fn parse_count(token: &str) -> Option<u32> {
    let token = token.trim_matches('-').to_lowercase();
    token.parse().ok().or_else(|| {
        NUMBER_WORDS
            .iter()
            .position(|it| *it == token)
            .map(|it| it as u32)
    })
}

/// Age statement in whole years. Understands `12 Years Old`, `Aged 4 Years`,
/// `Aged Twelve Years` and `6 yrs`.
pub fn normalize_age_statement(value: &str) -> Option<u32> {
    // The spelled tens ("twenty-one") must survive as a single token.
    let value = value.replace("twenty ", "twenty-").replace("Twenty ", "Twenty-");
    AGED_RE
        .captures(&value)
        .and_then(|caps| parse_count(&caps[1]))
        .or_else(|| {
            AGE_YEARS_RE
                .captures_iter(&value)
                .find_map(|caps| parse_count(&caps[1]))
        })
}
