use tracing::instrument;

use crate::{IndexedWord, OcrResult};

/// Flatten per-image word lists into one globally indexed sequence.
///
/// Images keep their input order and words their reading order; nothing is
/// filtered or normalized here.
#[instrument(level = "debug", skip(ocr_results), fields(images = ocr_results.len()))]
pub fn index_words(ocr_results: &[OcrResult]) -> Vec<IndexedWord> {
    let words = ocr_results
        .iter()
        .enumerate()
        .flat_map(|(image_index, result)| {
            result
                .words
                .iter()
                .enumerate()
                .map(move |(local_word_index, word)| (image_index, local_word_index, word))
        })
        .enumerate()
        .map(|(global_index, (image_index, local_word_index, word))| IndexedWord {
            global_index,
            image_index,
            local_word_index,
            word: word.clone(),
        })
        .collect::<Vec<_>>();
    log::trace!("Indexed {} words", words.len());
    words
}

/// Words of a single image, still carrying their global indices. Relies on
/// the image-major ordering produced by [`index_words`].
pub fn words_of_image(words: &[IndexedWord], image_index: usize) -> &[IndexedWord] {
    let start = words.partition_point(|it| it.image_index < image_index);
    let end = words.partition_point(|it| it.image_index <= image_index);
    &words[start..end]
}
