//! Deciding which submitted image is the front label.

use float_ord::FloatOrd;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::instrument;

use crate::{ImageClassification, ImageType, OcrResult};

/// Signal lost per recognized word; shorter text leans front.
pub const WORD_COUNT_PENALTY: f32 = 0.01;
/// Back keyword hits needed to call a non-front image `back`.
pub const MIN_BACK_KEYWORDS: usize = 2;

const FRONT_KEYWORDS: &[&str] = &[
    "premium",
    "finest",
    "smooth",
    "handcrafted",
    "hand crafted",
    "small batch",
    "single barrel",
    "reserve",
    "select",
    "special",
    "limited edition",
    "original",
    "classic",
    "legendary",
    "authentic",
    "crafted",
    "award winning",
    "since",
    "established",
    "est.",
];

const BACK_KEYWORDS: &[&str] = &[
    "government warning",
    "surgeon general",
    "pregnancy",
    "birth defects",
    "operate machinery",
    "health problems",
    "contains sulfites",
    "bottled by",
    "distilled by",
    "produced by",
    "imported by",
    "brewed by",
    "vinted by",
    "www.",
    ".com",
    "recycle",
    "refund",
    "ingredients",
    "net contents",
];

/// Case-insensitive patterns for `keywords`, word-bounded at every end that
/// is alphanumeric, any whitespace run between words.
fn keyword_patterns(keywords: &[&str]) -> Vec<Regex> {
    keywords
        .iter()
        .map(|keyword| {
            let body = keyword
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+");
            let start = if keyword.starts_with(char::is_alphanumeric) { r"\b" } else { "" };
            let end = if keyword.ends_with(char::is_alphanumeric) { r"\b" } else { "" };
            Regex::new(&format!("(?i){start}{body}{end}")).unwrap()
        })
        .collect()
}

static FRONT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| keyword_patterns(FRONT_KEYWORDS));
static BACK_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| keyword_patterns(BACK_KEYWORDS));

fn keyword_hits(text: &str, patterns: &[Regex]) -> usize {
    patterns.iter().filter(|it| it.is_match(text)).count()
}

#[derive(Debug, Clone, Copy)]
struct ImageSignal {
    front_hits: usize,
    back_hits: usize,
    words: usize,
}

impl ImageSignal {
    fn of(result: &OcrResult) -> Self {
        Self {
            front_hits: keyword_hits(&result.full_text, &FRONT_PATTERNS),
            back_hits: keyword_hits(&result.full_text, &BACK_PATTERNS),
            words: result.word_count(),
        }
    }

    fn score(&self) -> f32 {
        self.front_hits as f32 - self.back_hits as f32 - WORD_COUNT_PENALTY * self.words as f32
    }
}

/// Label each image `front`, `back` or `other`.
///
/// A lone image is the front. Otherwise the image with the strongest front
/// signal wins; when no image hits any keyword, the one with the fewest words
/// is taken as the front.
#[instrument(level = "debug", skip(ocr_results), fields(images = ocr_results.len()))]
pub fn classify_images_from_ocr(ocr_results: &[OcrResult]) -> Vec<ImageClassification> {
    match ocr_results.len() {
        0 => return Vec::new(),
        1 => {
            return vec![ImageClassification {
                image_index: 0,
                image_type: ImageType::Front,
                confidence: 90.0,
            }]
        }
        _ => {}
    }

    let signals = ocr_results.iter().map(ImageSignal::of).collect::<Vec<_>>();
    let no_keywords = signals
        .iter()
        .all(|it| it.front_hits == 0 && it.back_hits == 0);
    // the lowest index wins on ties
    let front = if no_keywords {
        signals
            .iter()
            .enumerate()
            .min_by_key(|(_, it)| it.words)
            .map(|(index, _)| index)
    } else {
        signals
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|(_, it)| FloatOrd(it.score()))
            .map(|(index, _)| index)
    }
    .unwrap_or(0);
    log::debug!("Image signals {signals:?}, front is {front}");

    signals
        .iter()
        .enumerate()
        .map(|(image_index, signal)| {
            let (image_type, confidence) = if image_index == front {
                (ImageType::Front, 80.0)
            } else if signal.back_hits >= MIN_BACK_KEYWORDS {
                (ImageType::Back, 80.0)
            } else {
                (ImageType::Other, 60.0)
            };
            ImageClassification {
                image_index,
                image_type,
                confidence,
            }
        })
        .collect()
}
