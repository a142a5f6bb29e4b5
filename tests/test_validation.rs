use std::collections::HashMap;

use enzymeml::prelude::*;
use enzymeml::validation::report::{ErrorKind, ReportEntry};
use enzymeml::validation::schema::validate_json;
use pretty_assertions::assert_eq;

fn document(k_value: f64) -> EnzymeMLDocument {
    let mut doc = EnzymeMLDocument::new("Validation");
    doc.add_vessel(
        VesselBuilder::default()
            .name("Cuvette")
            .volume(1.0)
            .unit("ml")
            .build()
            .unwrap(),
    )
    .unwrap();
    doc.add_species(Species::small_molecule("Substrate", "v0").build().unwrap())
        .unwrap();
    doc.add_species(Species::small_molecule("Product", "v0").build().unwrap())
        .unwrap();

    let r0 = doc
        .add_reaction_from_equation("Conversion", "Substrate -> Product")
        .unwrap();

    let mut model = mass_action()
        .generate(
            &HashMap::from([
                ("educts".to_string(), Binding::from("s0")),
                ("products".to_string(), Binding::from("s1")),
            ]),
            &HashMap::new(),
        )
        .unwrap();
    model.parameter_mut("k_f").unwrap().value = Some(k_value);
    model.parameter_mut("k_r").unwrap().value = Some(500.0);
    doc.set_kinetic_model(&r0, model).unwrap();

    doc
}

fn parameter_spec() -> ValidationSpec {
    ValidationSpec::from_json(
        r#"{
            "name": { "mandatory": true },
            "reactions": {
                "model": { "parameters": { "value": { "mandatory": true, "range": [400, 600] } } }
            }
        }"#,
    )
    .unwrap()
}

#[test]
fn test_out_of_range_parameter_is_reported() {
    // Arrange
    let doc = document(20.0);
    let spec = parameter_spec();

    // Act
    let outcome = Validator::new(&spec).validate(&doc);

    // Assert
    assert!(!outcome.is_valid);

    let errors = outcome
        .report
        .errors(&["reactions", "r0", "model", "parameters", "k_f", "value"])
        .unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors.contains_key(&ErrorKind::RangeError));

    assert!(outcome
        .report
        .get(&["reactions", "r0", "model", "parameters", "k_r"])
        .is_none());
}

#[test]
fn test_parameter_within_range_is_valid() {
    let doc = document(450.0);
    let outcome = Validator::new(&parameter_spec()).validate(&doc);

    assert!(outcome.is_valid);
    assert!(outcome.report.is_empty());
}

#[test]
fn test_empty_spec_accepts_everything() {
    let doc = document(20.0);
    let spec = ValidationSpec::new();

    let outcome = Validator::new(&spec).validate(&doc);

    assert!(outcome.is_valid);
}

#[test]
fn test_template_flags_missing_fields() {
    // Arrange
    let doc = document(450.0);
    let spec = ValidationSpec::template();

    // Act
    let outcome = Validator::new(&spec).validate(&doc);

    // Assert
    assert!(!outcome.is_valid);
    assert!(matches!(
        outcome.report.get(&["description"]),
        Some(ReportEntry::Field(errors)) if errors.contains_key(&ErrorKind::MandatoryError)
    ));
    assert!(outcome.report.get(&["name"]).is_none());
}

#[test]
fn test_vocabulary_is_checked() {
    let mut doc = document(450.0);
    doc.add_measurement(
        MeasurementBuilder::default()
            .name("Hot")
            .temperature(80.0)
            .temperature_unit("C")
            .build()
            .unwrap(),
    )
    .unwrap();

    let mut spec = ValidationSpec::new();
    spec.set_rule(
        &["measurements", "temperature_unit"],
        FieldRule::default().with_vocabulary(["K"]),
    )
    .unwrap();

    let outcome = Validator::new(&spec).validate(&doc);

    let errors = outcome
        .report
        .errors(&["measurements", "m0", "temperature_unit"])
        .unwrap();
    assert!(errors.contains_key(&ErrorKind::EnumError));
}

#[test]
fn test_report_serializes_nested() {
    let doc = document(20.0);
    let outcome = Validator::new(&parameter_spec()).validate(&doc);

    let json: serde_json::Value =
        serde_json::from_str(&outcome.report.to_json().unwrap()).unwrap();

    assert!(json["reactions"]["r0"]["model"]["parameters"]["k_f"]["value"]["range_error"].is_string());
}

#[test]
fn test_consistency_of_valid_document() {
    let doc = document(450.0);
    let report = check_consistency(&doc);

    assert!(report.is_valid);
    assert_eq!(report.count(Severity::Error), 0);
}

#[test]
fn test_integrity_guard_blocks_saving() {
    // Arrange
    let doc = document(450.0);
    let json = to_json_string(&doc).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["reactions"][0]["educts"][0]["species_id"] = serde_json::Value::from("s9");
    let broken: EnzymeMLDocument = serde_json::from_value(value).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");

    // Act
    let result = save_enzmldoc(&path, &broken);

    // Assert
    assert!(result.is_err());
    assert!(!path.exists());
    assert!(!check_consistency(&broken).is_valid);
}

#[test]
fn test_schema_rejects_malformed_document() {
    let report = validate_json(r#"{ "name": 42, "vessels": "none" }"#).unwrap();

    assert!(!report.valid);
    assert!(!report.errors.is_empty());
    assert!(from_json_str(r#"{ "name": 42 }"#).is_err());
}
