//! Locating a target string in the indexed OCR word sequence.

use std::collections::BTreeMap;

use tracing::instrument;

use crate::{
    text::{char_len, normalize},
    util, IndexedWord, NormalizedBox, OcrResult, OcrWord,
};

/// Longest window considered from a single start token.
pub const MAX_SPAN_WORDS: usize = 60;
/// Minimum share of the target a partial match must cover.
pub const MIN_COVERAGE_RATIO: f32 = 0.60;
/// Normalized length above which a failed match is retried on a prefix.
pub const LONG_VALUE_THRESHOLD: usize = 80;
/// Words of a long value used for the prefix probe.
pub const PREFIX_PROBE_WORDS: usize = 8;

/// Whether `next` should be glued to `accumulated` without a space, repairing
/// numbers OCR split apart (`"12."` + `"5%"`).
fn smart_join(accumulated: &str, next: &str) -> bool {
    let tail = accumulated.strip_suffix('.').unwrap_or(accumulated);
    tail.chars().last().is_some_and(|c| c.is_ascii_digit())
        && next
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == '.' || c == '%')
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    start: usize,
    end: usize,
    coverage: f32,
}

impl Candidate {
    fn beats(&self, other: &Option<Candidate>) -> bool {
        match other {
            None => true,
            Some(other) => {
                self.coverage > other.coverage
                    || (self.coverage == other.coverage
                        && self.end - self.start < other.end - other.start)
            }
        }
    }
}

/// Find the contiguous run of words whose normalized text best covers
/// `target`. An empty slice means no acceptable match.
///
/// An exact normalized match returns immediately. Otherwise the best window
/// that either fully contains the target or is contained in it is kept,
/// provided it covers at least [`MIN_COVERAGE_RATIO`] of the target.
#[instrument(level = "debug", skip(words), fields(words = words.len()))]
pub fn find_matching_words<'a>(target: &str, words: &'a [IndexedWord]) -> &'a [IndexedWord] {
    let target = normalize(target);
    if target.is_empty() {
        return &[];
    }
    let target_len = char_len(&target);
    let max_len = target_len as f32 * 1.5 + 20.0;

    let mut best: Option<Candidate> = None;
    for start in 0..words.len() {
        if normalize(words[start].text()).is_empty() {
            continue;
        }
        let mut accumulated = String::new();
        for end in start..words.len().min(start + MAX_SPAN_WORDS) {
            let next = words[end].text();
            if end > start && !smart_join(&accumulated, next) {
                accumulated.push(' ');
            }
            accumulated.push_str(next);

            let normalized = normalize(&accumulated);
            if normalized == target {
                log::trace!("Exact span {start}..={end} for {target:?}");
                return &words[start..=end];
            }
            let normalized_len = char_len(&normalized);
            if !normalized.is_empty() && target.contains(&normalized) {
                let candidate = Candidate {
                    start,
                    end,
                    coverage: normalized_len as f32 / target_len as f32,
                };
                if candidate.beats(&best) {
                    best = Some(candidate);
                }
            } else if normalized.contains(&target) {
                let candidate = Candidate {
                    start,
                    end,
                    coverage: 1.0,
                };
                if candidate.beats(&best) {
                    best = Some(candidate);
                }
                break;
            }
            if normalized_len as f32 > max_len {
                break;
            }
        }
    }

    match best {
        Some(Candidate {
            start,
            end,
            coverage,
        }) if coverage >= MIN_COVERAGE_RATIO => {
            log::trace!("Best span {start}..={end} covers {coverage:.2} of {target:?}");
            &words[start..=end]
        }
        _ => {
            log::trace!("No span covers {target:?}");
            &[]
        }
    }
}

/// [`find_matching_words`], retrying long values (regulatory warnings and
/// the like) on their first few words when the whole value is not found.
#[instrument(level = "debug", skip(words))]
pub fn locate_span<'a>(target: &str, words: &'a [IndexedWord]) -> &'a [IndexedWord] {
    let found = find_matching_words(target, words);
    if !found.is_empty() || char_len(&normalize(target)) <= LONG_VALUE_THRESHOLD {
        return found;
    }
    let prefix = target
        .split_whitespace()
        .take(PREFIX_PROBE_WORDS)
        .collect::<Vec<_>>()
        .join(" ");
    log::debug!("Long value not matched whole, probing prefix {prefix:?}");
    find_matching_words(&prefix, words)
}

/// Image holding most of the matched words. Ties go to the lower index.
pub fn majority_image(matched: &[IndexedWord]) -> Option<usize> {
    let mut votes = BTreeMap::new();
    for word in matched {
        *votes.entry(word.image_index).or_insert(0usize) += 1;
    }
    votes
        .into_iter()
        .rev()
        .max_by_key(|(_, count)| *count)
        .map(|(image_index, _)| image_index)
}

/// Box around the matched words on their majority image.
///
/// Words that normalize to nothing are left out: stray punctuation carries
/// unreliable coordinates on curved labels.
#[instrument(level = "debug", skip(matched, ocr_results))]
pub fn resolve_bounding_box(
    matched: &[IndexedWord],
    ocr_results: &[OcrResult],
) -> Option<(usize, NormalizedBox)> {
    let image_index = majority_image(matched)?;
    let image = ocr_results.get(image_index)?;
    let words = matched
        .iter()
        .filter(|it| it.image_index == image_index)
        .filter(|it| !normalize(it.text()).is_empty())
        .map(|it| &it.word)
        .collect::<Vec<&OcrWord>>();
    let bounding_box = util::normalized_box(&words, image.image_width, image.image_height)?;
    Some((image_index, bounding_box))
}
