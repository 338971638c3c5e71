//! Rule-based field classification.
//!
//! With expected values, each value is searched for in the label text. Without
//! them, per-field extractors run first and brand/fanciful names are derived
//! afterwards by elimination. Mandatory fields missing from the expected set
//! are filled by the same two passes.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::instrument;

use crate::{
    eliminate,
    extract::{self, Extraction},
    fields::{BeverageType, FieldVocabulary, BRAND_NAME, ELIMINATION_FIELDS, FANCIFUL_NAME},
    image_role,
    index::words_of_image,
    locate, span, Dictionaries, ExpectedValue, ImageClassification, ImageType, IndexedWord,
    OcrResult, RuleClassificationResult, RuleClassifiedField,
};

static BEVERAGE_KEYWORDS: Lazy<Vec<(BeverageType, Regex)>> = Lazy::new(|| {
    [
        (
            BeverageType::DistilledSpirits,
            r"whiske?y|bourbon|scotch|vodka|gin|rum|tequila|mezcal|brandy|cognac|liqueur|proof|distilled|distillery|spirits?",
        ),
        (
            BeverageType::Wine,
            r"wines?|winery|vintage|vineyards?|vinted|cellared|sulfites|sulphites|estate\s+bottled|red\s+table|white\s+table|champagne",
        ),
        (
            BeverageType::MaltBeverage,
            r"beer|ale|lager|stout|porter|pilsner|ipa|malt|brewed|brewery|brewing|hops",
        ),
    ]
    .into_iter()
    .map(|(beverage_type, keywords)| {
        (
            beverage_type,
            Regex::new(&format!(r"(?i)\b(?:{keywords})\b")).unwrap(),
        )
    })
    .collect()
});

/// Guess the beverage category from distinct keyword hits. `None` when no
/// keyword matches or the top categories tie.
pub fn detect_beverage_type(text: &str) -> Option<BeverageType> {
    let mut scores = BEVERAGE_KEYWORDS
        .iter()
        .map(|(beverage_type, re)| {
            let hits = re
                .find_iter(text)
                .map(|it| it.as_str().to_lowercase())
                .collect::<BTreeSet<_>>();
            (*beverage_type, hits.len())
        })
        .collect::<Vec<_>>();
    scores.sort_by(|a, b| b.1.cmp(&a.1));
    log::debug!("Beverage keyword hits: {scores:?}");
    match scores.as_slice() {
        [(_, 0), ..] => None,
        [(first, top), (_, second), ..] if top > second => Some(*first),
        [(first, _)] => Some(*first),
        _ => None,
    }
}

/// Global indices of the words spelling `value` on `image_index`.
fn word_indices(value: &str, words: &[IndexedWord], image_index: usize) -> Vec<usize> {
    span::locate_span(value, words_of_image(words, image_index))
        .iter()
        .map(|it| it.global_index)
        .collect()
}

pub struct RuleClassifier<'a> {
    dictionaries: &'a Dictionaries,
    vocabulary: &'a FieldVocabulary,
}

impl<'a> RuleClassifier<'a> {
    pub fn new(dictionaries: &'a Dictionaries, vocabulary: &'a FieldVocabulary) -> Self {
        Self {
            dictionaries,
            vocabulary,
        }
    }

    /// Pick the flow by whether any expected values were supplied.
    pub fn classify(
        &self,
        ocr_results: &[OcrResult],
        words: &[IndexedWord],
        expected: &[ExpectedValue],
        beverage_type: Option<BeverageType>,
    ) -> RuleClassificationResult {
        if expected.is_empty() {
            self.classify_without_application_data(ocr_results, words, beverage_type)
        } else {
            self.classify_with_application_data(ocr_results, words, expected, beverage_type)
        }
    }

    #[instrument(level = "debug", skip_all, fields(expected = expected.len()))]
    pub fn classify_with_application_data(
        &self,
        ocr_results: &[OcrResult],
        words: &[IndexedWord],
        expected: &[ExpectedValue],
        beverage_type: Option<BeverageType>,
    ) -> RuleClassificationResult {
        let detected = detect_beverage_type(&combined_text(ocr_results));
        let image_classifications = image_role::classify_images_from_ocr(ocr_results);

        let mut fields = expected
            .iter()
            .map(|it| self.locate_expected(ocr_results, words, it))
            .collect::<Vec<_>>();

        let missing = beverage_type
            .or(detected)
            .map(|it| {
                self.vocabulary
                    .fields(Some(it))
                    .into_iter()
                    .filter(|name| self.vocabulary.is_mandatory(it, name))
                    .filter(|name| !expected.iter().any(|e| e.field_name == *name))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        if !missing.is_empty() {
            log::debug!("Filling fields without expected values: {missing:?}");
            let claimed = fields
                .iter()
                .filter_map(|it| it.value.clone())
                .collect::<Vec<_>>();
            fields.extend(self.run_passes(
                ocr_results,
                words,
                &image_classifications,
                &missing,
                claimed,
            ));
        }

        RuleClassificationResult {
            fields,
            image_classifications,
            detected_beverage_type: detected,
        }
    }

    #[instrument(level = "debug", skip_all)]
    pub fn classify_without_application_data(
        &self,
        ocr_results: &[OcrResult],
        words: &[IndexedWord],
        beverage_type: Option<BeverageType>,
    ) -> RuleClassificationResult {
        let detected = detect_beverage_type(&combined_text(ocr_results));
        let image_classifications = image_role::classify_images_from_ocr(ocr_results);
        let field_names = self.vocabulary.fields(beverage_type.or(detected));
        let fields = self.run_passes(
            ocr_results,
            words,
            &image_classifications,
            &field_names,
            Vec::new(),
        );
        RuleClassificationResult {
            fields,
            image_classifications,
            detected_beverage_type: detected,
        }
    }

    /// Search every image for `expected`, keeping the most confident hit.
    fn locate_expected(
        &self,
        ocr_results: &[OcrResult],
        words: &[IndexedWord],
        expected: &ExpectedValue,
    ) -> RuleClassifiedField {
        let field_name = expected.field_name.as_str();
        let mut best: Option<(usize, locate::Located)> = None;
        for (image_index, result) in ocr_results.iter().enumerate() {
            let Some(located) = locate::locate(&result.full_text, &expected.value) else {
                continue;
            };
            if best
                .as_ref()
                .map_or(true, |(_, top)| located.confidence > top.confidence)
            {
                best = Some((image_index, located));
            }
        }

        match best {
            Some((image_index, located)) => {
                log::debug!(
                    "{field_name}: {:?} via {} on image {image_index}",
                    located.value,
                    located.method
                );
                RuleClassifiedField {
                    field_name: field_name.to_string(),
                    word_indices: word_indices(&located.value, words, image_index),
                    reasoning: Some(format!(
                        "{field_name}: expected value found by {} on image {image_index}",
                        located.method
                    )),
                    value: Some(located.value),
                    confidence: located.confidence,
                    image_index,
                }
            }
            None => RuleClassifiedField::not_found(
                field_name,
                format!("{field_name}: expected value not found in the label text"),
            ),
        }
    }

    /// Pass one over `field_names`, then pass two for the elimination fields
    /// among them. `claimed` holds values already attributed elsewhere.
    fn run_passes(
        &self,
        ocr_results: &[OcrResult],
        words: &[IndexedWord],
        image_classifications: &[ImageClassification],
        field_names: &[&str],
        mut claimed: Vec<String>,
    ) -> Vec<RuleClassifiedField> {
        let mut fields = field_names
            .iter()
            .filter(|name| !ELIMINATION_FIELDS.contains(*name))
            .map(|name| self.extract_field(ocr_results, words, name))
            .collect::<Vec<_>>();
        claimed.extend(fields.iter().filter_map(|it| it.value.clone()));

        let mut brand_name = None;
        if field_names.contains(&BRAND_NAME) {
            let field = self.eliminate(BRAND_NAME, ocr_results, words, image_classifications, |text| {
                let claimed = claimed.iter().map(String::as_str).collect::<Vec<_>>();
                eliminate::extract_brand_name(text, &claimed)
            });
            brand_name = field.value.clone();
            fields.push(field);
        }
        if field_names.contains(&FANCIFUL_NAME) {
            fields.push(
                self.eliminate(FANCIFUL_NAME, ocr_results, words, image_classifications, |text| {
                    let claimed = claimed.iter().map(String::as_str).collect::<Vec<_>>();
                    eliminate::extract_fanciful_name(text, &claimed, brand_name.as_deref())
                }),
            );
        }

        // keep the requested order
        fields.sort_by_key(|field| {
            field_names
                .iter()
                .position(|name| *name == field.field_name)
                .unwrap_or(usize::MAX)
        });
        fields
    }

    /// Run a pass-one extractor on every image, keeping the most confident hit.
    fn extract_field(
        &self,
        ocr_results: &[OcrResult],
        words: &[IndexedWord],
        field_name: &str,
    ) -> RuleClassifiedField {
        let Some(extractor) = extract::extractor_for(field_name) else {
            return RuleClassifiedField::not_found(
                field_name,
                format!("{field_name}: no extractor for this field"),
            );
        };
        let mut best: Option<(usize, Extraction)> = None;
        for (image_index, result) in ocr_results.iter().enumerate() {
            let Some(extraction) = extractor(&result.full_text, self.dictionaries) else {
                continue;
            };
            if best
                .as_ref()
                .map_or(true, |(_, top)| extraction.confidence > top.confidence)
            {
                best = Some((image_index, extraction));
            }
        }

        match best {
            Some((image_index, extraction)) => RuleClassifiedField {
                field_name: field_name.to_string(),
                word_indices: word_indices(&extraction.value, words, image_index),
                value: Some(extraction.value),
                confidence: extraction.confidence,
                reasoning: Some(extraction.reasoning),
                image_index,
            },
            None => RuleClassifiedField::not_found(
                field_name,
                format!("{field_name}: no matching text on the label"),
            ),
        }
    }

    /// Elimination over the front image first, then the remaining images.
    fn eliminate(
        &self,
        field_name: &str,
        ocr_results: &[OcrResult],
        words: &[IndexedWord],
        image_classifications: &[ImageClassification],
        extract: impl Fn(&str) -> Option<eliminate::Eliminated>,
    ) -> RuleClassifiedField {
        let front = image_classifications
            .iter()
            .find(|it| it.image_type == ImageType::Front)
            .map(|it| it.image_index);
        let order = front
            .into_iter()
            .chain((0..ocr_results.len()).filter(|it| Some(*it) != front));

        for image_index in order {
            let Some(found) = extract(&ocr_results[image_index].full_text) else {
                continue;
            };
            return RuleClassifiedField {
                field_name: found.field_name.to_string(),
                word_indices: word_indices(&found.value, words, image_index),
                value: Some(found.value),
                confidence: found.confidence,
                reasoning: Some(found.reasoning),
                image_index,
            };
        }
        RuleClassifiedField::not_found(
            field_name,
            format!("{field_name}: no unclaimed line scored high enough"),
        )
    }
}

fn combined_text(ocr_results: &[OcrResult]) -> String {
    ocr_results
        .iter()
        .map(|it| it.full_text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
