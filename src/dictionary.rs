//! Read-only lookup tables used by the extractors and comparators.
//!
//! The built-in tables cover the common US label vocabulary. Any table can be
//! replaced from JSON; keys left out of the document keep their defaults.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{text, Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassType {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Dictionaries {
    pub qualifying_phrases: Vec<String>,
    /// Unit spelling (lowercase, no periods) to milliliters per unit.
    pub units: BTreeMap<String, f64>,
    pub class_types: Vec<ClassType>,
    /// Generic designations tried when no class/type description matches.
    pub common_designations: Vec<String>,
    pub grape_varietals: Vec<String>,
    pub appellations: Vec<String>,
}

const QUALIFYING_PHRASES: &[&str] = &[
    "Bottled by",
    "Distilled by",
    "Distilled and bottled by",
    "Blended by",
    "Blended and bottled by",
    "Produced by",
    "Produced and bottled by",
    "Made by",
    "Manufactured by",
    "Prepared by",
    "Prepared and bottled by",
    "Imported by",
    "Imported and bottled by",
    "Packed by",
    "Brewed by",
    "Brewed and bottled by",
    "Brewed and canned by",
    "Canned by",
    "Vinted by",
    "Vinted and bottled by",
    "Cellared by",
    "Cellared and bottled by",
    "Grown, produced and bottled by",
    "Estate bottled",
    "Rectified by",
    "Rectified and bottled by",
];

const UNITS: &[(&str, f64)] = &[
    ("ml", 1.0),
    ("milliliter", 1.0),
    ("milliliters", 1.0),
    ("millilitre", 1.0),
    ("millilitres", 1.0),
    ("cl", 10.0),
    ("centiliter", 10.0),
    ("centiliters", 10.0),
    ("centilitre", 10.0),
    ("centilitres", 10.0),
    ("l", 1000.0),
    ("lt", 1000.0),
    ("ltr", 1000.0),
    ("liter", 1000.0),
    ("liters", 1000.0),
    ("litre", 1000.0),
    ("litres", 1000.0),
    ("fl oz", 29.5735),
    ("floz", 29.5735),
    ("fl ounce", 29.5735),
    ("fl ounces", 29.5735),
    ("fluid ounce", 29.5735),
    ("fluid ounces", 29.5735),
    ("oz", 29.5735),
    ("pt", 473.176),
    ("pint", 473.176),
    ("pints", 473.176),
    ("qt", 946.353),
    ("quart", 946.353),
    ("quarts", 946.353),
    ("gal", 3785.41),
    ("gallon", 3785.41),
    ("gallons", 3785.41),
];

const CLASS_TYPES: &[(&str, &str)] = &[
    ("101", "Straight Bourbon Whisky"),
    ("101", "Straight Bourbon Whiskey"),
    ("101", "Kentucky Straight Bourbon Whiskey"),
    ("102", "Straight Rye Whisky"),
    ("102", "Straight Rye Whiskey"),
    ("104", "Straight Corn Whisky"),
    ("107", "Bourbon Whisky"),
    ("107", "Bourbon Whiskey"),
    ("108", "Rye Whisky"),
    ("108", "Rye Whiskey"),
    ("110", "Corn Whiskey"),
    ("120", "Tennessee Whiskey"),
    ("141", "Blended Whiskey"),
    ("150", "Blended Scotch Whisky"),
    ("151", "Single Malt Scotch Whisky"),
    ("152", "Scotch Whisky"),
    ("160", "Irish Whiskey"),
    ("170", "Canadian Whisky"),
    ("200", "London Dry Gin"),
    ("201", "Distilled Gin"),
    ("202", "Old Tom Gin"),
    ("203", "Gin"),
    ("300", "Vodka"),
    ("301", "Flavored Vodka"),
    ("400", "Rum"),
    ("401", "Spiced Rum"),
    ("402", "Dark Rum"),
    ("403", "White Rum"),
    ("500", "Brandy"),
    ("501", "Grape Brandy"),
    ("502", "Cognac"),
    ("503", "Armagnac"),
    ("504", "Apple Brandy"),
    ("600", "Tequila"),
    ("601", "Tequila Blanco"),
    ("602", "Tequila Reposado"),
    ("603", "Tequila Anejo"),
    ("610", "Mezcal"),
    ("700", "Liqueur"),
    ("701", "Cordial"),
    ("80", "Table Red Wine"),
    ("80", "Red Table Wine"),
    ("81", "Table White Wine"),
    ("81", "White Table Wine"),
    ("82", "Rose Table Wine"),
    ("83", "Sparkling Wine"),
    ("84", "Champagne"),
    ("85", "Dessert Wine"),
    ("86", "Port"),
    ("87", "Sherry"),
    ("88", "Hard Cider"),
    ("900", "India Pale Ale"),
    ("901", "Pale Ale"),
    ("902", "Lager"),
    ("903", "Pilsner"),
    ("904", "Stout"),
    ("905", "Porter"),
    ("906", "Malt Liquor"),
    ("907", "Wheat Beer"),
    ("908", "Hard Seltzer"),
];

const COMMON_DESIGNATIONS: &[&str] = &[
    "Whiskey", "Whisky", "Bourbon", "Scotch", "Gin", "Vodka", "Rum", "Tequila", "Mezcal", "Brandy",
    "Liqueur", "Wine", "Ale", "Beer", "Lager", "Cider", "Mead",
];

const GRAPE_VARIETALS: &[&str] = &[
    "Cabernet Sauvignon",
    "Cabernet Franc",
    "Merlot",
    "Pinot Noir",
    "Pinot Grigio",
    "Pinot Gris",
    "Pinot Blanc",
    "Chardonnay",
    "Sauvignon Blanc",
    "Syrah",
    "Shiraz",
    "Petite Sirah",
    "Zinfandel",
    "Malbec",
    "Grenache",
    "Tempranillo",
    "Sangiovese",
    "Nebbiolo",
    "Riesling",
    "Gewurztraminer",
    "Chenin Blanc",
    "Viognier",
    "Moscato",
    "Muscat",
    "Semillon",
    "Petit Verdot",
    "Carmenere",
    "Barbera",
    "Mourvedre",
    "Gamay",
    "Albarino",
    "Gruner Veltliner",
];

const APPELLATIONS: &[&str] = &[
    "Napa Valley",
    "Sonoma County",
    "Sonoma Coast",
    "Russian River Valley",
    "Alexander Valley",
    "Dry Creek Valley",
    "Carneros",
    "Los Carneros",
    "Paso Robles",
    "Santa Barbara County",
    "Santa Rita Hills",
    "Central Coast",
    "Lodi",
    "Mendocino County",
    "Willamette Valley",
    "Columbia Valley",
    "Walla Walla Valley",
    "Yakima Valley",
    "Finger Lakes",
    "North Fork of Long Island",
    "Texas Hill Country",
    "California",
    "Oregon",
    "Washington",
    "New York",
    "Virginia",
];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|it| it.to_string()).collect()
}

impl Default for Dictionaries {
    fn default() -> Self {
        Self {
            qualifying_phrases: owned(QUALIFYING_PHRASES),
            units: UNITS
                .iter()
                .map(|(alias, factor)| (alias.to_string(), *factor))
                .collect(),
            class_types: CLASS_TYPES
                .iter()
                .map(|(code, description)| ClassType {
                    code: code.to_string(),
                    description: description.to_string(),
                })
                .collect(),
            common_designations: owned(COMMON_DESIGNATIONS),
            grape_varietals: owned(GRAPE_VARIETALS),
            appellations: owned(APPELLATIONS),
        }
    }
}

/// Longest entries first, ties broken alphabetically.
fn longest_first<'a>(items: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut items = items.collect::<Vec<_>>();
    items.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    items
}

impl Dictionaries {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let dictionaries: Self = serde_json::from_str(json)?;
        dictionaries.validate()?;
        Ok(dictionaries)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.units.is_empty() {
            return Err(Error::InvalidDictionary("unit table is empty".into()));
        }
        if let Some((alias, factor)) = self.units.iter().find(|(_, factor)| **factor <= 0.0) {
            return Err(Error::InvalidDictionary(format!(
                "unit {alias:?} has non-positive factor {factor}"
            )));
        }
        if self.qualifying_phrases.iter().all(|it| it.trim().is_empty()) {
            return Err(Error::InvalidDictionary(
                "qualifying phrase list is empty".into(),
            ));
        }
        Ok(())
    }

    pub fn qualifying_phrases_longest_first(&self) -> Vec<&str> {
        longest_first(self.qualifying_phrases.iter().map(String::as_str))
    }

    pub fn class_types_longest_first(&self) -> Vec<&str> {
        longest_first(self.class_types.iter().map(|it| it.description.as_str()))
    }

    pub fn class_code(&self, description: &str) -> Option<&str> {
        self.class_types
            .iter()
            .find(|it| it.description.eq_ignore_ascii_case(description))
            .map(|it| it.code.as_str())
    }

    /// Resolve the unit at the start of `rest` (already lowercased), returning
    /// milliliters per unit and the matched spelling's length. Periods are
    /// ignored, the longest spelling wins and it must end on a word boundary.
    pub fn unit_at(&self, rest: &str) -> Option<(f64, usize)> {
        let rest = rest.trim_start();
        let cleaned = rest.replace('.', "");
        let cleaned = text::collapse_whitespace(&cleaned);
        self.units
            .iter()
            .filter(|(alias, _)| {
                cleaned.starts_with(alias.as_str())
                    && !cleaned[alias.len()..]
                        .chars()
                        .next()
                        .is_some_and(char::is_alphabetic)
            })
            .max_by_key(|(alias, _)| alias.len())
            .map(|(alias, factor)| (*factor, alias.len()))
    }

    /// Resolve free text to a qualifying phrase: exact match after `&`/`and`
    /// folding first, then the longest phrase contained in the text.
    pub fn resolve_qualifying_phrase(&self, value: &str) -> Option<&str> {
        let folded = text::normalize(&text::ampersand_to_and(value));
        if folded.is_empty() {
            return None;
        }
        let phrases = self.qualifying_phrases_longest_first();
        phrases
            .iter()
            .find(|phrase| text::normalize(&text::ampersand_to_and(phrase)) == folded)
            .or_else(|| {
                phrases.iter().find(|phrase| {
                    let phrase = text::normalize(&text::ampersand_to_and(phrase));
                    !phrase.is_empty() && format!(" {folded} ").contains(&format!(" {phrase} "))
                })
            })
            .copied()
    }
}
