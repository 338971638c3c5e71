mod common;

use common::{bourbon_back, bourbon_front, init_logging, HEALTH_WARNING};
use labelmatch::{
    status::{Disposition, DispositionPolicy, FieldStatus, LabelStatus},
    BeverageType, Dictionaries, Error, ExpectedValue, FieldVocabulary, LabelMatcher, MatchStatus,
    OcrResult, ValidationOptions, ValidationReport,
};

/// Reject on any mismatch, ask for a correction when something is missing.
struct StrictPolicy;

impl DispositionPolicy for StrictPolicy {
    fn decide(
        &self,
        statuses: &[FieldStatus<'_>],
        _: Option<BeverageType>,
        _: Option<f64>,
    ) -> Disposition {
        let any = |status| statuses.iter().any(|it| it.status == status);
        if any(MatchStatus::Mismatch) {
            Disposition {
                status: LabelStatus::Rejected,
                deadline_days: None,
            }
        } else if any(MatchStatus::NotFound) {
            Disposition {
                status: LabelStatus::NeedsCorrection,
                deadline_days: Some(30),
            }
        } else {
            Disposition {
                status: LabelStatus::Approved,
                deadline_days: None,
            }
        }
    }
}

fn bourbon() -> Vec<OcrResult> {
    vec![bourbon_front(), bourbon_back()]
}

fn application() -> Vec<ExpectedValue> {
    vec![
        ExpectedValue::new("brand_name", "Bulleit Bourbon"),
        ExpectedValue::new("class_type", "Kentucky Straight Bourbon Whiskey"),
        ExpectedValue::new("alcohol_content", "45% Alc./Vol."),
        ExpectedValue::new("net_contents", "750 mL"),
        ExpectedValue::new("health_warning", HEALTH_WARNING),
        ExpectedValue::new("name_and_address", "Bulleit Distilling Co., Louisville, KY"),
    ]
}

fn options() -> ValidationOptions {
    ValidationOptions {
        beverage_type: Some(BeverageType::DistilledSpirits),
        container_ml: Some(750.0),
    }
}

fn matcher() -> LabelMatcher {
    LabelMatcher::builder()
        .disposition_policy(StrictPolicy)
        .build()
        .expect("default tables are valid")
}

fn status_of(report: &ValidationReport, field_name: &str) -> MatchStatus {
    report
        .comparisons
        .iter()
        .find(|it| it.field_name == field_name)
        .map(|it| it.result.status)
        .unwrap_or_else(|| panic!("no comparison for {field_name}"))
}

#[test]
fn matching_label_is_approved() {
    init_logging();

    let report = matcher().validate(&bourbon(), &application(), options());

    assert_eq!(report.comparisons.len(), 6);
    for comparison in &report.comparisons {
        assert_eq!(
            comparison.result.status,
            MatchStatus::Match,
            "{}: {}",
            comparison.field_name,
            comparison.result.reasoning
        );
    }
    assert_eq!(report.detected_beverage_type, Some(BeverageType::DistilledSpirits));
    assert_eq!(
        report.disposition.map(|it| it.status),
        Some(LabelStatus::Approved)
    );
}

#[test]
fn mismatch_and_missing_values_are_reported() {
    init_logging();

    let mut expected = application();
    expected.push(ExpectedValue::new("age_statement", "Aged 12 Years"));
    expected.push(ExpectedValue::new("country_of_origin", "Mexico"));
    let report = matcher().validate(&bourbon(), &expected, options());

    let age = report
        .comparisons
        .iter()
        .find(|it| it.field_name == "age_statement")
        .unwrap();
    assert_eq!(age.extracted.as_deref(), Some("Aged 10 Years"));
    assert_eq!(age.result.status, MatchStatus::Mismatch);
    assert_eq!(status_of(&report, "country_of_origin"), MatchStatus::NotFound);
    assert_eq!(status_of(&report, "brand_name"), MatchStatus::Match);
    assert_eq!(
        report.disposition,
        Some(Disposition {
            status: LabelStatus::Rejected,
            deadline_days: None,
        })
    );
}

#[test]
fn missing_value_needs_correction() {
    init_logging();

    let mut expected = application();
    expected.push(ExpectedValue::new("country_of_origin", "Mexico"));
    let report = matcher().validate(&bourbon(), &expected, options());
    assert_eq!(
        report.disposition,
        Some(Disposition {
            status: LabelStatus::NeedsCorrection,
            deadline_days: Some(30),
        })
    );
}

#[test]
fn fields_carry_bounding_boxes() {
    init_logging();

    let report = matcher().validate(&bourbon(), &application(), options());
    assert_eq!(report.fields.len(), 6);

    let brand = report
        .fields
        .iter()
        .find(|it| it.field_name == "brand_name")
        .unwrap();
    assert_eq!(brand.image_index, 0);
    let bounding_box = brand.bounding_box.expect("brand box");
    assert!((bounding_box.x - 10.0 / 1200.0).abs() < 1e-4);
    assert!((bounding_box.y - 10.0 / 300.0).abs() < 1e-4);
    assert!((bounding_box.width - 84.0 / 1200.0).abs() < 1e-4);
    assert!((bounding_box.height - 70.0 / 300.0).abs() < 1e-4);

    let warning = report
        .fields
        .iter()
        .find(|it| it.field_name == "health_warning")
        .unwrap();
    assert_eq!(warning.image_index, 1);
    assert!(warning.bounding_box.is_some());

    let report = LabelMatcher::builder()
        .resolve_boxes(false)
        .build()
        .unwrap()
        .validate(&bourbon(), &application(), options());
    assert!(report.fields.iter().all(|it| it.bounding_box.is_none()));
    assert!(report.disposition.is_none());
}

#[test]
fn without_application_data_only_fields_are_reported() {
    init_logging();

    let report = matcher().validate(&bourbon(), &[], ValidationOptions::default());
    assert!(report.comparisons.is_empty());
    assert_eq!(report.detected_beverage_type, Some(BeverageType::DistilledSpirits));

    let brand = report
        .fields
        .iter()
        .find(|it| it.field_name == "brand_name")
        .unwrap();
    assert_eq!(brand.value.as_deref(), Some("BULLEIT"));
    assert_eq!(brand.image_index, 0);
}

#[test]
fn validation_is_deterministic() {
    init_logging();

    let mut expected = application();
    expected.push(ExpectedValue::new("age_statement", "Aged 12 Years"));
    let first = matcher().validate(&bourbon(), &expected, options());
    let second = matcher().validate(&bourbon(), &expected, options());
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn report_serializes_in_camel_case() {
    init_logging();

    let mut expected = application();
    expected.push(ExpectedValue::new("country_of_origin", "Mexico"));
    let report = matcher().validate(&bourbon(), &expected, options());
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["detectedBeverageType"], "distilled_spirits");
    assert_eq!(json["imageClassifications"][0]["imageType"], "front");
    assert_eq!(json["comparisons"][6]["fieldName"], "country_of_origin");
    assert_eq!(json["comparisons"][6]["result"]["status"], "not_found");
    assert_eq!(json["disposition"]["status"], "needs_correction");
    assert_eq!(json["disposition"]["deadlineDays"], 30);
}

#[test]
fn submission_json_round_trips_through_serde() {
    let json = r#"{
        "fieldName": "alcohol_content",
        "value": "45% Alc./Vol.",
        "matchType": "normalized"
    }"#;
    let expected: ExpectedValue = serde_json::from_str(json).unwrap();
    assert_eq!(
        expected,
        ExpectedValue::new("alcohol_content", "45% Alc./Vol.")
            .with_match_type(labelmatch::MatchType::Normalized)
    );

    let ocr: OcrResult = serde_json::from_str(
        r#"{"words": [{"text": "OLD", "boundingPolygon": [{"x": 0, "y": 0}, {"x": 10, "y": 0}, {"x": 10, "y": 5}, {"x": 0, "y": 5}], "confidence": 0.9}], "fullText": "OLD"}"#,
    )
    .unwrap();
    assert_eq!(ocr.word_count(), 1);
    assert_eq!(ocr.image_width, 0);
}

#[test]
fn configuration_errors_are_reported() {
    init_logging();

    assert!(matches!(
        Dictionaries::from_json_str(r#"{"units": {}}"#),
        Err(Error::InvalidDictionary(_))
    ));
    assert!(matches!(
        Dictionaries::from_json_str(r#"{"units": {"ml": 1.0, "jug": -1.0}}"#),
        Err(Error::InvalidDictionary(_))
    ));
    assert!(matches!(
        FieldVocabulary::from_json_str("not json"),
        Err(Error::Json(_))
    ));
    assert!(matches!(
        LabelMatcher::builder().dictionaries_from_file("/nonexistent/dictionaries.json"),
        Err(Error::Io { .. })
    ));

    let mut vocabulary = FieldVocabulary::default();
    vocabulary.wine.mandatory.clear();
    assert!(matches!(
        LabelMatcher::builder().vocabulary(vocabulary).build(),
        Err(Error::InvalidVocabulary(_))
    ));

    let mut vocabulary = FieldVocabulary::default();
    vocabulary.wine.optional.push("brand_name".into());
    assert!(matches!(
        LabelMatcher::builder().vocabulary(vocabulary).build(),
        Err(Error::InvalidVocabulary(_))
    ));
}

#[test]
fn partial_dictionary_keeps_defaults() {
    init_logging();

    let dictionaries =
        Dictionaries::from_json_str(r#"{"qualifyingPhrases": ["Crafted by", "Bottled by"]}"#)
            .unwrap();
    assert_eq!(dictionaries.units, Dictionaries::default().units);

    let matcher = LabelMatcher::builder()
        .dictionaries(dictionaries)
        .build()
        .unwrap();
    let result = matcher.compare_field("qualifying_phrase", "Crafted by", Some("CRAFTED BY"), None);
    assert_eq!(result.status, MatchStatus::Match);
    assert!(result.reasoning.contains("both resolve"));
}
