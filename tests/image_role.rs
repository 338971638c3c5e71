mod common;

use common::{bourbon_back, bourbon_front, init_logging};
use labelmatch::{
    image_role::classify_images_from_ocr, ImageClassification, ImageType, OcrResult,
};

fn text_image(text: &str) -> OcrResult {
    OcrResult {
        words: Vec::new(),
        full_text: text.to_string(),
        image_width: 0,
        image_height: 0,
    }
}

fn types(classifications: &[ImageClassification]) -> Vec<ImageType> {
    classifications.iter().map(|it| it.image_type).collect()
}

#[test]
fn no_images_no_classifications() {
    assert!(classify_images_from_ocr(&[]).is_empty());
}

#[test]
fn single_image_is_the_front() {
    init_logging();

    let classifications = classify_images_from_ocr(&[text_image("GOVERNMENT WARNING")]);
    assert_eq!(
        classifications,
        vec![ImageClassification {
            image_index: 0,
            image_type: ImageType::Front,
            confidence: 90.0,
        }]
    );
}

#[test]
fn warning_heavy_image_is_the_back() {
    init_logging();

    let back = format!(
        "Government Warning surgeon general pregnancy {}",
        vec!["lorem"; 35].join(" ")
    );
    let front = "aurora ridge wild mountain spring water blend cask oak kindred";
    let ocr = [text_image(&back), text_image(front)];
    assert_eq!(ocr[0].word_count(), 40);
    assert_eq!(ocr[1].word_count(), 10);

    let classifications = classify_images_from_ocr(&ocr);
    assert_eq!(types(&classifications), vec![ImageType::Back, ImageType::Front]);
    assert_eq!(classifications[0].confidence, 80.0);
    assert_eq!(classifications[1].confidence, 80.0);
}

#[test]
fn without_keywords_the_shortest_image_is_the_front() {
    init_logging();

    let ocr = [
        text_image("aurora ridge wild mountain spring"),
        text_image("kindred oak cask"),
        text_image("kindred oak cask"),
    ];
    let classifications = classify_images_from_ocr(&ocr);
    assert_eq!(
        types(&classifications),
        vec![ImageType::Other, ImageType::Front, ImageType::Other]
    );
    assert_eq!(classifications[0].confidence, 60.0);
}

#[test]
fn marketing_copy_marks_the_front() {
    init_logging();

    let ocr = [
        text_image("Net contents 750 mL"),
        text_image("Small batch reserve, since 1870"),
        text_image("Bottled by Old Forester Distilling Co. www.oldforester.com"),
    ];
    let classifications = classify_images_from_ocr(&ocr);
    assert_eq!(
        types(&classifications),
        vec![ImageType::Other, ImageType::Front, ImageType::Back]
    );
}

#[test]
fn bourbon_label_roles() {
    init_logging();

    let classifications = classify_images_from_ocr(&[bourbon_back(), bourbon_front()]);
    assert_eq!(types(&classifications), vec![ImageType::Back, ImageType::Front]);
}

#[test]
fn keywords_match_whole_words_only() {
    init_logging();

    let ocr = [
        text_image("Selected casks from the harvest."),
        text_image("kindred oak"),
    ];
    let classifications = classify_images_from_ocr(&ocr);
    assert_eq!(types(&classifications), vec![ImageType::Other, ImageType::Front]);

    let ocr = [
        text_image("kindred oak cask"),
        text_image("Est. 1870, small\nbatch"),
    ];
    let classifications = classify_images_from_ocr(&ocr);
    assert_eq!(types(&classifications), vec![ImageType::Other, ImageType::Front]);
}
