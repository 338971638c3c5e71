#![allow(dead_code)]

use geo::Coord;
use labelmatch::{OcrResult, OcrWord};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn word_at(text: &str, x: f32, y: f32, width: f32, height: f32) -> OcrWord {
    OcrWord::new(
        text,
        [
            Coord { x, y },
            Coord { x: x + width, y },
            Coord {
                x: x + width,
                y: y + height,
            },
            Coord { x, y: y + height },
        ],
        0.98,
    )
}

/// Lay `lines` out top to bottom, one word per whitespace-separated token.
pub fn label_image(lines: &[&str]) -> OcrResult {
    let mut words = Vec::new();
    for (row, line) in lines.iter().enumerate() {
        let y = 10.0 + row as f32 * 40.0;
        let mut x = 10.0;
        for token in line.split_whitespace() {
            let width = 12.0 * token.chars().count() as f32;
            words.push(word_at(token, x, y, width, 30.0));
            x += width + 10.0;
        }
    }
    OcrResult {
        words,
        full_text: lines.join("\n"),
        image_width: 1200,
        image_height: 40 * lines.len().max(1) as u32 + 20,
    }
}

/// Single-line image from loose tokens.
pub fn token_image(tokens: &[&str]) -> OcrResult {
    label_image(&[tokens.join(" ").as_str()])
}

pub const HEALTH_WARNING: &str = "GOVERNMENT WARNING: (1) According to the Surgeon General, women should not drink alcoholic beverages during pregnancy because of the risk of birth defects. (2) Consumption of alcoholic beverages impairs your ability to drive a car or operate machinery, and may cause health problems.";

pub fn bourbon_front() -> OcrResult {
    label_image(&[
        "BULLEIT",
        "BOURBON",
        "FRONTIER WHISKEY",
        "Kentucky Straight Bourbon Whiskey",
        "Aged 10 Years",
        "45% Alc./Vol. (90 Proof)",
        "750 mL",
    ])
}

pub fn bourbon_back() -> OcrResult {
    label_image(&[
        "GOVERNMENT WARNING: (1) ACCORDING TO THE SURGEON GENERAL, WOMEN SHOULD NOT DRINK",
        "ALCOHOLIC BEVERAGES DURING PREGNANCY BECAUSE OF THE RISK OF BIRTH DEFECTS. (2)",
        "CONSUMPTION OF ALCOHOLIC BEVERAGES IMPAIRS YOUR ABILITY TO DRIVE A CAR OR",
        "OPERATE MACHINERY, AND MAY CAUSE HEALTH PROBLEMS.",
        "Distilled by Bulleit Distilling Co.,",
        "Louisville, KY",
    ])
}
