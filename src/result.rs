use geo::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

use crate::{compare::MatchType, fields::BeverageType};

/// One recognized token as delivered by the OCR service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrWord {
    pub text: String,
    /// Pixel coordinates, clockwise from the top-left corner.
    pub bounding_polygon: [Coord<f32>; 4],
    pub confidence: f32,
}

impl OcrWord {
    pub fn new(text: impl Into<String>, bounding_polygon: [Coord<f32>; 4], confidence: f32) -> Self {
        Self {
            text: text.into(),
            bounding_polygon,
            confidence,
        }
    }

    pub fn polygon(&self) -> Polygon<f32> {
        Polygon::new(LineString::new(self.bounding_polygon.to_vec()), vec![])
    }
}

/// Recognition output for a single image. `0` dimensions mean "unknown".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrResult {
    pub words: Vec<OcrWord>,
    pub full_text: String,
    #[serde(default)]
    pub image_width: u32,
    #[serde(default)]
    pub image_height: u32,
}

impl OcrResult {
    pub fn word_count(&self) -> usize {
        if self.words.is_empty() {
            self.full_text.split_whitespace().count()
        } else {
            self.words.len()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedWord {
    pub global_index: usize,
    pub image_index: usize,
    pub local_word_index: usize,
    pub word: OcrWord,
}

impl IndexedWord {
    pub fn text(&self) -> &str {
        &self.word.text
    }
}

/// Axis-aligned box relative to the image, all components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedField {
    pub field_name: String,
    pub value: Option<String>,
    pub confidence: f32,
    pub reasoning: Option<String>,
    pub bounding_box: Option<NormalizedBox>,
    pub image_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Match,
    Mismatch,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub status: MatchStatus,
    pub confidence: f32,
    pub reasoning: String,
}

impl ComparisonResult {
    pub(crate) fn matched(confidence: f32, reasoning: impl Into<String>) -> Self {
        Self::new(MatchStatus::Match, confidence, reasoning)
    }

    pub(crate) fn mismatch(confidence: f32, reasoning: impl Into<String>) -> Self {
        Self::new(MatchStatus::Mismatch, confidence, reasoning)
    }

    pub(crate) fn not_found(reasoning: impl Into<String>) -> Self {
        Self::new(MatchStatus::NotFound, 0.0, reasoning)
    }

    fn new(status: MatchStatus, confidence: f32, reasoning: impl Into<String>) -> Self {
        Self {
            status,
            confidence: confidence.clamp(0.0, 100.0),
            reasoning: reasoning.into(),
        }
    }
}

/// A field value produced by the rule-based classifier, before box resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleClassifiedField {
    pub field_name: String,
    pub value: Option<String>,
    pub confidence: f32,
    pub reasoning: Option<String>,
    pub image_index: usize,
    /// Global indices into the indexed word sequence, empty when unknown.
    pub word_indices: Vec<usize>,
}

impl RuleClassifiedField {
    pub(crate) fn not_found(field_name: &str, reasoning: impl Into<String>) -> Self {
        Self {
            field_name: field_name.to_string(),
            value: None,
            confidence: 0.0,
            reasoning: Some(reasoning.into()),
            image_index: 0,
            word_indices: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageType {
    Front,
    Back,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageClassification {
    pub image_index: usize,
    pub image_type: ImageType,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleClassificationResult {
    pub fields: Vec<RuleClassifiedField>,
    pub image_classifications: Vec<ImageClassification>,
    pub detected_beverage_type: Option<BeverageType>,
}

impl RuleClassificationResult {
    pub fn field(&self, field_name: &str) -> Option<&RuleClassifiedField> {
        self.fields.iter().find(|it| it.field_name == field_name)
    }
}

/// A reference value the label is checked against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedValue {
    pub field_name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<MatchType>,
}

impl ExpectedValue {
    pub fn new(field_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            value: value.into(),
            match_type: None,
        }
    }

    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = Some(match_type);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldComparison {
    pub field_name: String,
    pub expected: String,
    pub extracted: Option<String>,
    pub result: ComparisonResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub fields: Vec<ExtractedField>,
    pub comparisons: Vec<FieldComparison>,
    pub image_classifications: Vec<ImageClassification>,
    pub detected_beverage_type: Option<BeverageType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disposition: Option<crate::status::Disposition>,
}
