use std::path::Path;

use classify::RuleClassifier;
use compare::FieldComparator;
use status::{DispositionPolicy, FieldStatus};
use tracing::instrument;

pub mod classify;
pub mod compare;
pub mod dictionary;
pub mod eliminate;
mod error;
pub mod extract;
pub mod fields;
pub mod image_role;
pub mod index;
pub mod locate;
mod result;
pub mod span;
pub mod status;
pub mod text;
pub mod units;
pub mod util;

pub use compare::MatchType;
pub use dictionary::Dictionaries;
pub use error::{Error, Result};
pub use fields::{BeverageType, FieldVocabulary};
pub use result::*;

pub struct LabelMatcherBuilder {
    dictionaries: Option<Dictionaries>,
    vocabulary: Option<FieldVocabulary>,
    disposition_policy: Option<Box<dyn DispositionPolicy>>,
    resolve_boxes: bool,
}

impl LabelMatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dictionaries(mut self, dictionaries: Dictionaries) -> Self {
        self.dictionaries = Some(dictionaries);
        self
    }

    pub fn dictionaries_from_file(self, path: impl AsRef<Path>) -> Result<Self> {
        Ok(self.dictionaries(Dictionaries::from_json_file(path)?))
    }

    pub fn vocabulary(mut self, vocabulary: FieldVocabulary) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    pub fn vocabulary_from_file(self, path: impl AsRef<Path>) -> Result<Self> {
        Ok(self.vocabulary(FieldVocabulary::from_json_file(path)?))
    }

    pub fn disposition_policy(mut self, policy: impl DispositionPolicy + 'static) -> Self {
        self.disposition_policy = Some(Box::new(policy));
        self
    }

    /// Whether classified fields get a bounding box. On by default.
    pub fn resolve_boxes(mut self, resolve_boxes: bool) -> Self {
        self.resolve_boxes = resolve_boxes;
        self
    }

    #[instrument(skip(self))]
    pub fn build(self) -> Result<LabelMatcher> {
        let dictionaries = self.dictionaries.unwrap_or_default();
        let vocabulary = self.vocabulary.unwrap_or_default();
        dictionaries.validate()?;
        vocabulary.validate()?;
        Ok(LabelMatcher {
            dictionaries,
            vocabulary,
            disposition_policy: self.disposition_policy,
            resolve_boxes: self.resolve_boxes,
        })
    }
}

impl Default for LabelMatcherBuilder {
    fn default() -> Self {
        Self {
            dictionaries: None,
            vocabulary: None,
            disposition_policy: None,
            resolve_boxes: true,
        }
    }
}

/// Per-request options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationOptions {
    /// Known beverage category; detected from the text when absent.
    pub beverage_type: Option<BeverageType>,
    /// Container size, forwarded to the disposition policy.
    pub container_ml: Option<f64>,
}

/// Field extraction and comparison engine. Holds only read-only tables, so a
/// single instance can serve concurrent requests.
pub struct LabelMatcher {
    dictionaries: Dictionaries,
    vocabulary: FieldVocabulary,
    disposition_policy: Option<Box<dyn DispositionPolicy>>,
    resolve_boxes: bool,
}

impl LabelMatcher {
    pub fn builder() -> LabelMatcherBuilder {
        LabelMatcherBuilder::new()
    }

    pub fn dictionaries(&self) -> &Dictionaries {
        &self.dictionaries
    }

    pub fn vocabulary(&self) -> &FieldVocabulary {
        &self.vocabulary
    }

    /// Classify the label fields, searching for `expected` values when any are
    /// given and extracting them from scratch otherwise.
    #[instrument(skip_all, fields(images = ocr_results.len()))]
    pub fn classify(
        &self,
        ocr_results: &[OcrResult],
        expected: &[ExpectedValue],
        options: ValidationOptions,
    ) -> RuleClassificationResult {
        let words = index::index_words(ocr_results);
        RuleClassifier::new(&self.dictionaries, &self.vocabulary).classify(
            ocr_results,
            &words,
            expected,
            options.beverage_type,
        )
    }

    pub fn compare_field(
        &self,
        field_name: &str,
        expected: &str,
        extracted: Option<&str>,
        match_type: Option<MatchType>,
    ) -> ComparisonResult {
        FieldComparator::new(&self.dictionaries).compare_field(
            field_name,
            expected,
            extracted,
            match_type,
        )
    }

    /// Classify, locate each field on its image and compare every expected
    /// value against what was read off the label.
    #[instrument(skip_all, fields(images = ocr_results.len(), expected = expected.len()))]
    pub fn validate(
        &self,
        ocr_results: &[OcrResult],
        expected: &[ExpectedValue],
        options: ValidationOptions,
    ) -> ValidationReport {
        let words = index::index_words(ocr_results);
        let classification = RuleClassifier::new(&self.dictionaries, &self.vocabulary).classify(
            ocr_results,
            &words,
            expected,
            options.beverage_type,
        );

        let fields = classification
            .fields
            .iter()
            .map(|field| self.extracted_field(field, &words, ocr_results))
            .collect::<Vec<_>>();

        let comparator = FieldComparator::new(&self.dictionaries);
        let comparisons = expected
            .iter()
            .map(|it| {
                let extracted = classification
                    .field(&it.field_name)
                    .and_then(|field| field.value.clone());
                FieldComparison {
                    result: comparator.compare_field(
                        &it.field_name,
                        &it.value,
                        extracted.as_deref(),
                        it.match_type,
                    ),
                    field_name: it.field_name.clone(),
                    expected: it.value.clone(),
                    extracted,
                }
            })
            .collect::<Vec<_>>();

        let disposition = self.disposition_policy.as_ref().map(|policy| {
            let statuses = comparisons
                .iter()
                .map(|it| FieldStatus {
                    field_name: &it.field_name,
                    status: it.result.status,
                })
                .collect::<Vec<_>>();
            policy.decide(
                &statuses,
                options.beverage_type.or(classification.detected_beverage_type),
                options.container_ml,
            )
        });

        ValidationReport {
            fields,
            comparisons,
            image_classifications: classification.image_classifications,
            detected_beverage_type: classification.detected_beverage_type,
            disposition,
        }
    }

    fn extracted_field(
        &self,
        field: &RuleClassifiedField,
        words: &[IndexedWord],
        ocr_results: &[OcrResult],
    ) -> ExtractedField {
        let located = self
            .resolve_boxes
            .then(|| {
                let matched = field
                    .word_indices
                    .iter()
                    .filter_map(|index| words.get(*index).cloned())
                    .collect::<Vec<_>>();
                span::resolve_bounding_box(&matched, ocr_results)
            })
            .flatten();
        ExtractedField {
            field_name: field.field_name.clone(),
            value: field.value.clone(),
            confidence: field.confidence,
            reasoning: field.reasoning.clone(),
            image_index: located.map_or(field.image_index, |(image_index, _)| image_index),
            bounding_box: located.map(|(_, bounding_box)| bounding_box),
        }
    }
}
