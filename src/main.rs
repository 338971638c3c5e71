use std::time::Instant;

use labelmatch::{BeverageType, ExpectedValue, LabelMatcher, OcrResult, ValidationOptions};
use serde::Deserialize;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// One submission as produced by the upload layer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Submission {
    ocr_results: Vec<OcrResult>,
    #[serde(default)]
    expected: Vec<ExpectedValue>,
    beverage_type: Option<BeverageType>,
    container_ml: Option<f64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let submission_path = args
        .next()
        .expect("Usage: labelmatch <submission.json> [dictionaries.json]");
    let json = std::fs::read_to_string(&submission_path).expect("Failed to read submission");
    let submission: Submission = serde_json::from_str(&json).expect("Invalid submission JSON");

    let mut builder = LabelMatcher::builder();
    if let Some(path) = args.next() {
        builder = builder
            .dictionaries_from_file(path)
            .expect("Failed to load dictionaries");
    }
    let matcher = builder.build().expect("Failed to build matcher");

    let start = Instant::now();
    let report = matcher.validate(
        &submission.ocr_results,
        &submission.expected,
        ValidationOptions {
            beverage_type: submission.beverage_type,
            container_ml: submission.container_ml,
        },
    );
    log::debug!("Validated in {:?}", start.elapsed());

    println!(
        "{}",
        serde_json::to_string_pretty(&report).expect("Failed to serialize report")
    );
}
