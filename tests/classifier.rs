mod common;

use common::{bourbon_back, bourbon_front, init_logging, label_image, HEALTH_WARNING};
use labelmatch::{
    classify::detect_beverage_type,
    eliminate::{candidate_lines, extract_brand_name, score_line, strip_claimed},
    locate::locate,
    BeverageType, ExpectedValue, FieldVocabulary, LabelMatcher, ValidationOptions,
};

fn matcher() -> LabelMatcher {
    LabelMatcher::builder().build().expect("default tables are valid")
}

fn spirits() -> ValidationOptions {
    ValidationOptions {
        beverage_type: Some(BeverageType::DistilledSpirits),
        ..Default::default()
    }
}

#[test]
fn locate_cascade_reports_the_first_strategy_that_hits() {
    init_logging();

    let cases = [
        (
            "Bottled by Heaven Hill Distillery\nBardstown, KY",
            "heaven hill distillery",
            "exact substring",
            "Heaven Hill Distillery",
        ),
        (
            "Smith and Sons Distillery",
            "Smith & Sons",
            "substring with & as and",
            "Smith & Sons",
        ),
        (
            "Old Forester 1870",
            "OldForester",
            "substring ignoring spaces",
            "OldForester",
        ),
        (
            "Jack Daniels Old No 7",
            "Jack Daniel's Old No. 7",
            "substring ignoring punctuation",
            "Jack Daniel's Old No. 7",
        ),
        (
            "JackDaniels",
            "Jack Daniel's",
            "substring ignoring spaces and punctuation",
            "Jack Daniel's",
        ),
        (
            "Bottled by BUFFAL0 TRACE DISTILLERY Frankfort",
            "Buffalo Trace Distillery",
            "fuzzy window",
            "BUFFAL0 TRACE DISTILLERY",
        ),
        (
            "A and B Farnns",
            "A & B Farms",
            "fuzzy window with & as and",
            "A and B Farnns",
        ),
    ];
    for (text, target, method, value) in cases {
        let located = locate(text, target).unwrap_or_else(|| panic!("{target:?} not located"));
        assert_eq!(located.method, method, "{target:?}");
        assert_eq!(located.value, value, "{target:?}");
    }
}

#[test]
fn locate_confidence_drops_down_the_cascade() {
    init_logging();

    let exact = locate("Heaven Hill Distillery", "Heaven Hill Distillery").unwrap();
    let spaceless = locate("HeavenHill Distillery", "Heaven Hill Distillery").unwrap();
    let fuzzy = locate("Heaven HiII Distilery", "Heaven Hill Distillery").unwrap();
    assert_eq!(exact.confidence, 95.0);
    assert_eq!(spaceless.confidence, 90.0);
    assert!(fuzzy.confidence < spaceless.confidence);
}

#[test]
fn locate_falls_back_to_scattered_tokens() {
    init_logging();

    let text = "Heaven Hill lorem ipsum dolor sit amet consectetur\nDistillery adipiscing elit sed do\nBardstown tempor incididunt";
    let located = locate(text, "Heaven Hill Distillery Bardstown Kentucky").unwrap();
    assert_eq!(located.method, "token overlap");
    assert!((located.confidence - 64.0).abs() < 1e-3);

    assert!(locate("Vodka", "Tequila Blanco").is_none());
    assert!(locate("", "Tequila").is_none());
    assert!(locate("Tequila", "  ").is_none());
}

#[test]
fn scattered_tokens_split_on_apostrophes_and_hyphens() {
    init_logging();

    let text = "Jack Daniel's\nCharcoal mellowed drop by\nOld-Time\nLynchburg Tennessee since 1866\nDistillery";
    let located = locate(text, "Jack Daniel's Old-Time Distillery").unwrap();
    assert_eq!(located.method, "token overlap");
    assert!((located.confidence - 80.0).abs() < 1e-3);

    // tokens only count as whole words
    let text = "Bourbonville Tavern pours daily specials\nKentuckyan horses race each spring\nDistillerys tour";
    assert!(locate(text, "Bourbon Kentucky Distillery").is_none());
}

#[test]
fn detects_beverage_type_from_keywords() {
    init_logging();

    assert_eq!(
        detect_beverage_type("Napa Valley Cabernet Sauvignon\nRed Wine\nContains Sulfites"),
        Some(BeverageType::Wine)
    );
    assert_eq!(
        detect_beverage_type("Brewed and canned by Hop Valley Brewing\nIndia Pale Ale"),
        Some(BeverageType::MaltBeverage)
    );
    assert_eq!(
        detect_beverage_type("Kentucky Straight Bourbon Whiskey\n90 Proof"),
        Some(BeverageType::DistilledSpirits)
    );
    assert_eq!(detect_beverage_type("Grape juice"), None);
    assert_eq!(detect_beverage_type("Bourbon barrel aged wine"), None);
}

#[test]
fn elimination_scores_favour_short_prominent_lines() {
    assert!(score_line("Louisville, KY", 0, 2) < score_line("EVAN WILLIAMS", 1, 2));
    assert!(score_line("OLD TOM", 0, 3) > score_line("OLD TOM", 2, 3));
    assert!(
        score_line("a very long sentence that keeps going on and on", 0, 1)
            < score_line("Short Name", 0, 1)
    );
}

#[test]
fn elimination_strips_claimed_values_and_boilerplate() {
    let remaining = strip_claimed(
        "Buffalo Trace\n45% Alc./Vol.\nGOVERNMENT WARNING",
        &["45% Alc./Vol."],
    );
    assert_eq!(candidate_lines(&remaining), vec!["Buffalo Trace"]);
}

#[test]
fn elimination_rejects_lines_scoring_below_zero() {
    init_logging();

    let text = "distributed throughout the united states by acme, chicago, IL 60601 usa";
    assert_eq!(extract_brand_name(text, &[]), None);
}

#[test]
fn brand_name_by_elimination() {
    init_logging();

    let ocr = [label_image(&[HEALTH_WARNING, "45% Alc./Vol.", "750 mL", "OLD TOM"])];
    let result = matcher().classify(&ocr, &[], spirits());

    let alcohol = result.field("alcohol_content").unwrap();
    assert_eq!(alcohol.value.as_deref(), Some("45% Alc./Vol."));
    let net = result.field("net_contents").unwrap();
    assert_eq!(net.value.as_deref(), Some("750 mL"));

    let brand = result.field("brand_name").unwrap();
    assert_eq!(brand.value.as_deref(), Some("OLD TOM"));
    assert_eq!(brand.confidence, 70.0);
    assert_eq!(brand.word_indices.len(), 2);

    let fanciful = result.field("fanciful_name").unwrap();
    assert_eq!(fanciful.value, None);
    assert_eq!(fanciful.confidence, 0.0);
}

#[test]
fn fields_follow_the_vocabulary_order() {
    init_logging();

    let ocr = [label_image(&[HEALTH_WARNING, "45% Alc./Vol.", "750 mL", "OLD TOM"])];
    let matcher = matcher();
    let result = matcher.classify(&ocr, &[], spirits());
    let names = result
        .fields
        .iter()
        .map(|it| it.field_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        matcher.vocabulary().fields(Some(BeverageType::DistilledSpirits))
    );
}

#[test]
fn wine_label_without_application_data() {
    init_logging();

    let ocr = [label_image(&[
        "CHATEAU MONTVIEW",
        "2018",
        "Napa Valley",
        "Cabernet Sauvignon",
        "Produced and bottled by Montview Cellars, Napa, CA",
        "Contains Sulfites",
        "13.5% Alc./Vol.",
        "750 mL",
    ])];
    let result = matcher().classify(&ocr, &[], ValidationOptions::default());

    assert_eq!(result.detected_beverage_type, Some(BeverageType::Wine));
    let value = |name: &str| result.field(name).and_then(|it| it.value.clone());
    assert_eq!(value("brand_name").as_deref(), Some("CHATEAU MONTVIEW"));
    assert_eq!(value("vintage_year").as_deref(), Some("2018"));
    assert_eq!(value("appellation_of_origin").as_deref(), Some("Napa Valley"));
    assert_eq!(value("grape_varietal").as_deref(), Some("Cabernet Sauvignon"));
    assert_eq!(value("sulfite_declaration").as_deref(), Some("Contains Sulfites"));
    assert_eq!(
        value("qualifying_phrase").as_deref(),
        Some("Produced and bottled by")
    );
    assert_eq!(
        value("name_and_address").as_deref(),
        Some("Montview Cellars, Napa, CA")
    );
    assert_eq!(value("health_warning"), None);
    assert_eq!(value("alcohol_content").as_deref(), Some("13.5% Alc./Vol."));
}

#[test]
fn expected_values_are_located_and_mandatory_fields_filled() {
    init_logging();

    let ocr = [bourbon_front(), bourbon_back()];
    let expected = [ExpectedValue::new("brand_name", "Bulleit Bourbon")];
    let result = matcher().classify(&ocr, &expected, spirits());

    assert_eq!(result.fields.len(), 6);
    let brand = result.field("brand_name").unwrap();
    assert_eq!(brand.value.as_deref(), Some("BULLEIT BOURBON"));
    assert_eq!(brand.confidence, 95.0);
    assert_eq!(brand.image_index, 0);
    assert_eq!(brand.word_indices, vec![0, 1]);

    let class_type = result.field("class_type").unwrap();
    assert_eq!(
        class_type.value.as_deref(),
        Some("Kentucky Straight Bourbon Whiskey")
    );
    assert_eq!(class_type.word_indices.len(), 4);

    let warning = result.field("health_warning").unwrap();
    assert_eq!(warning.image_index, 1);
    assert_eq!(warning.confidence, 90.0);
    assert!(warning
        .value
        .as_deref()
        .is_some_and(|it| it.starts_with("GOVERNMENT WARNING") && it.ends_with("PROBLEMS.")));

    let address = result.field("name_and_address").unwrap();
    assert_eq!(
        address.value.as_deref(),
        Some("Bulleit Distilling Co., Louisville, KY")
    );
    assert_eq!(address.image_index, 1);

    // optional fields are only located when an expected value names them
    assert!(result.field("age_statement").is_none());
    assert!(result.field("state_of_distillation").is_none());
}

#[test]
fn mandatory_fields_depend_on_beverage_type() {
    let vocabulary = FieldVocabulary::default();
    assert!(vocabulary.is_mandatory(BeverageType::Wine, "sulfite_declaration"));
    assert!(!vocabulary.is_mandatory(BeverageType::DistilledSpirits, "sulfite_declaration"));
    assert!(vocabulary.is_mandatory(BeverageType::DistilledSpirits, "alcohol_content"));
    assert!(!vocabulary.is_mandatory(BeverageType::MaltBeverage, "alcohol_content"));
    assert!(!vocabulary.is_mandatory(BeverageType::Wine, "vintage_year"));
}

#[test]
fn expected_value_missing_from_the_label_is_not_found() {
    init_logging();

    let ocr = [bourbon_front(), bourbon_back()];
    let expected = [ExpectedValue::new("country_of_origin", "Mexico")];
    let result = matcher().classify(&ocr, &expected, spirits());

    let country = result.field("country_of_origin").unwrap();
    assert_eq!(country.value, None);
    assert_eq!(country.confidence, 0.0);
    assert!(country.word_indices.is_empty());
}
