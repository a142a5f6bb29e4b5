//! Checks a document against a [`ValidationSpec`].
//!
//! A [`Validator`] is created from a spec and consumed by [`Validator::validate`],
//! which walks every entity reachable from the document along the spec's rules and
//! returns the finished [`ValidationOutcome`]. Each field runs the mandatory, range and
//! vocabulary checks independently, so one field can fail several of them at once.
//!
//! The walk only reads the document. Several validators may inspect the same document
//! concurrently as long as nobody mutates it meanwhile.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use serde::Serialize;

use crate::units::UnitRegistry;
use crate::versions::v2::EnzymeMLDocument;

use super::report::{ErrorKind, ReportEntry, ValidationReport};
use super::shape::{FieldValue, Node, Validatable};
use super::spec::{FieldRule, RuleNode, RuleSet, ValidationSpec};

/// Validator holding a spec, ready to walk a document.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'s> {
    spec: &'s ValidationSpec,
}

/// Result of a validation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub report: ValidationReport,
    pub is_valid: bool,
}

impl<'s> Validator<'s> {
    pub fn new(spec: &'s ValidationSpec) -> Self {
        Self { spec }
    }

    /// Walks the document and reports every field that fails a rule.
    ///
    /// `is_valid` is true exactly when no check failed, i.e. when the report is empty.
    pub fn validate(self, enzmldoc: &EnzymeMLDocument) -> ValidationOutcome {
        let walk = Walk {
            units: enzmldoc.units(),
        };

        let (entries, is_valid) = walk.entity(Some(enzmldoc as &dyn Validatable), self.spec.rules());
        debug!(
            "Validated document '{}': {} failing top-level fields",
            enzmldoc.name,
            entries.len()
        );

        ValidationOutcome {
            report: ValidationReport::new(entries),
            is_valid,
        }
    }
}

struct Walk<'a> {
    units: &'a UnitRegistry,
}

impl<'a> Walk<'a> {
    /// Applies `rules` to an entity. An absent entity reports all of its fields as missing.
    fn entity(
        &self,
        entity: Option<&'a dyn Validatable>,
        rules: &RuleSet,
    ) -> (BTreeMap<String, ReportEntry>, bool) {
        let mut entries = BTreeMap::new();
        let mut is_valid = true;

        for (field, rule) in rules.iter() {
            let node = match entity {
                Some(entity) => entity.node(field, self.units),
                None => Some(Node::Value(FieldValue::Missing)),
            };

            let entry = match (rule, node) {
                (RuleNode::Field(rule), Some(Node::Value(value))) => {
                    let errors = check_field(rule, &value);
                    (!errors.is_empty()).then_some(ReportEntry::Field(errors))
                }
                (RuleNode::Nested(rules), Some(Node::Object(object))) => {
                    let (nested, valid) = self.entity(object, rules);
                    is_valid &= valid;
                    (!nested.is_empty()).then_some(ReportEntry::Nested(nested))
                }
                (RuleNode::Nested(rules), Some(Node::Collection(items))) => {
                    let mut collection = BTreeMap::new();
                    for (key, item) in items {
                        let (nested, valid) = self.entity(Some(item), rules);
                        is_valid &= valid;
                        if !nested.is_empty() {
                            collection.insert(key, ReportEntry::Nested(nested));
                        }
                    }
                    (!collection.is_empty()).then_some(ReportEntry::Nested(collection))
                }
                // Not a field of this entity, or nested rules of an absent object
                _ => None,
            };

            if let Some(entry) = entry {
                if matches!(entry, ReportEntry::Field(_)) {
                    is_valid = false;
                }
                entries.insert(field.clone(), entry);
            }
        }

        (entries, is_valid)
    }
}

/// Runs the mandatory, range and vocabulary checks of a rule on a value.
pub(crate) fn check_field(rule: &FieldRule, value: &FieldValue) -> BTreeMap<ErrorKind, String> {
    let mut errors = BTreeMap::new();

    if matches!(value, FieldValue::Missing) {
        if rule.mandatory {
            errors.insert(
                ErrorKind::MandatoryError,
                "Mandatory attribute is not given.".to_string(),
            );
        }
        return errors;
    }

    if let Some([min, max]) = rule.range {
        if let Some(message) = check_range(value, min, max) {
            errors.insert(ErrorKind::RangeError, message);
        }
    }

    if let Some(vocabulary) = &rule.vocabulary {
        if let Some(message) = check_vocabulary(value, vocabulary) {
            errors.insert(ErrorKind::EnumError, message);
        }
    }

    errors
}

fn check_range(value: &FieldValue, min: f64, max: f64) -> Option<String> {
    let out_of_range = |x: f64| !(min..=max).contains(&x);

    match value {
        FieldValue::Number(x) if out_of_range(*x) => Some(format!(
            "Value of '{x}' is out of range for [{min}, {max}]"
        )),
        FieldValue::Number(_) => None,
        FieldValue::Numbers(values) => values.iter().find(|x| out_of_range(**x)).map(|x| {
            format!("Value of '{x}' is out of range for [{min}, {max}]")
        }),
        other => Some(format!("Value '{other}' is not numeric.")),
    }
}

fn check_vocabulary(value: &FieldValue, vocabulary: &[String]) -> Option<String> {
    let allowed = |candidate: &str| vocabulary.iter().any(|v| v == candidate);

    let offending = match value {
        FieldValue::Missing => None,
        FieldValue::Text(text) => (!allowed(&**text)).then(|| text.to_string()),
        FieldValue::Number(x) => (!allowed(&x.to_string())).then(|| x.to_string()),
        FieldValue::Boolean(b) => (!allowed(&b.to_string())).then(|| b.to_string()),
        FieldValue::Texts(values) => values.iter().find(|v| !allowed(v.as_str())).cloned(),
        FieldValue::Numbers(values) => values
            .iter()
            .map(|x| x.to_string())
            .find(|x| !allowed(x.as_str())),
    };

    offending.map(|value| {
        format!(
            "Value of '{value}' does not comply with vocabulary [{}]",
            vocabulary.join(", ")
        )
    })
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Missing => write!(f, "None"),
            FieldValue::Text(text) => write!(f, "{text}"),
            FieldValue::Number(x) => write!(f, "{x}"),
            FieldValue::Boolean(b) => write!(f, "{b}"),
            FieldValue::Texts(values) => write!(f, "[{}]", values.join(", ")),
            FieldValue::Numbers(values) => {
                let values = values.iter().map(|x| x.to_string()).collect::<Vec<_>>();
                write!(f, "[{}]", values.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;
    use crate::versions::v2::{
        KineticModel, KineticParameterBuilder, Species, VesselBuilder,
    };
    use pretty_assertions::assert_eq;

    fn document() -> EnzymeMLDocument {
        let mut doc = EnzymeMLDocument::new("Validation");
        doc.add_vessel(
            VesselBuilder::default()
                .name("Cuvette")
                .volume(20.0)
                .unit("ml")
                .build()
                .unwrap(),
        )
        .unwrap();
        doc.add_species(Species::small_molecule("Substrate", "v0").build().unwrap())
            .unwrap();
        doc.add_species(Species::small_molecule("Product", "v0").build().unwrap())
            .unwrap();
        let r0 = doc.add_reaction_from_equation("R", "s0 -> s1").unwrap();
        doc.set_kinetic_model(
            &r0,
            KineticModel {
                name: "Linear".to_string(),
                equation: "k * s0".to_string(),
                parameters: vec![KineticParameterBuilder::default()
                    .name("k")
                    .value(20.0)
                    .build()
                    .unwrap()],
            },
        )
        .unwrap();
        doc
    }

    #[test]
    fn test_range_violation_is_reported() {
        // Arrange
        let doc = document();
        let spec = ValidationSpec::from_json(
            r#"{ "reactions": { "model": { "parameters": { "value": { "mandatory": true, "range": [400, 600] } } } } }"#,
        )
        .unwrap();

        // Act
        let outcome = Validator::new(&spec).validate(&doc);

        // Assert
        assert!(!outcome.is_valid);
        let errors = outcome
            .report
            .errors(&["reactions", "r0", "model", "parameters", "k", "value"])
            .unwrap();
        assert_eq!(
            errors.get(&ErrorKind::RangeError).map(String::as_str),
            Some("Value of '20' is out of range for [400, 600]")
        );
        assert!(!errors.contains_key(&ErrorKind::MandatoryError));
    }

    #[test]
    fn test_missing_field_without_rule_is_ignored() {
        let doc = document();
        let spec = ValidationSpec::from_json(r#"{ "vessels": { "volume": { "mandatory": true } } }"#)
            .unwrap();

        let outcome = Validator::new(&spec).validate(&doc);

        assert!(outcome.is_valid);
        assert!(outcome.report.is_empty());
    }

    #[test]
    fn test_mandatory_error() {
        let doc = document();
        let spec = ValidationSpec::from_json(
            r#"{ "description": { "mandatory": true }, "small_molecules": { "inchi": { "mandatory": true } } }"#,
        )
        .unwrap();

        let outcome = Validator::new(&spec).validate(&doc);

        assert!(!outcome.is_valid);
        assert!(outcome.report.errors(&["description"]).is_some());
        assert!(outcome.report.errors(&["small_molecules", "s0", "inchi"]).is_some());
        assert!(outcome.report.errors(&["small_molecules", "s1", "inchi"]).is_some());
    }

    #[test]
    fn test_range_and_vocabulary_skip_missing_values() {
        let doc = document();
        let spec = ValidationSpec::from_json(
            r#"{ "small_molecules": { "init_conc": { "range": [0, 1] }, "chebi_id": { "vocabulary": ["CHEBI:1"] } } }"#,
        )
        .unwrap();

        let outcome = Validator::new(&spec).validate(&doc);
        assert!(outcome.is_valid);
    }

    #[test]
    fn test_vocabulary_uses_unit_expressions() {
        let doc = document();
        let spec = ValidationSpec::from_json(r#"{ "vessels": { "unit": { "vocabulary": ["l"] } } }"#)
            .unwrap();

        let outcome = Validator::new(&spec).validate(&doc);

        let errors = outcome.report.errors(&["vessels", "v0", "unit"]).unwrap();
        assert_eq!(
            errors[&ErrorKind::EnumError],
            "Value of 'ml' does not comply with vocabulary [l]"
        );
    }

    #[test]
    fn test_absent_model_reports_mandatory_fields() {
        let mut doc = document();
        doc.add_reaction_from_equation("Bare", "s1 -> s0").unwrap();
        let spec = ValidationSpec::from_json(r#"{ "reactions": { "model": { "name": { "mandatory": true } } } }"#)
            .unwrap();

        let outcome = Validator::new(&spec).validate(&doc);

        assert!(!outcome.is_valid);
        assert!(outcome.report.get(&["reactions", "r0"]).is_none());
        assert!(outcome.report.errors(&["reactions", "r1", "model", "name"]).is_some());
    }

    #[test]
    fn test_checks_are_independent() {
        let rule = FieldRule::mandatory()
            .with_range(0.0, 1.0)
            .with_vocabulary(["a"]);

        let errors = check_field(&rule, &FieldValue::Text(Cow::Borrowed("b")));

        assert_eq!(
            errors.keys().copied().collect::<Vec<_>>(),
            vec![ErrorKind::RangeError, ErrorKind::EnumError]
        );
        assert_eq!(errors[&ErrorKind::RangeError], "Value 'b' is not numeric.");
    }

    #[test]
    fn test_empty_spec_accepts_everything() {
        let outcome = Validator::new(&ValidationSpec::new()).validate(&document());
        assert!(outcome.is_valid);
        assert!(outcome.report.is_empty());
    }
}
