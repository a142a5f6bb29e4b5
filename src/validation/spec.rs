//! Validation specs: per-field constraints a document is checked against.
//!
//! A spec mirrors the document layout declared in [`DOCUMENT_SHAPE`]. Leaves are
//! [`FieldRule`]s, everything else nests by field name:
//!
//! ```json
//! {
//!     "name": { "mandatory": true },
//!     "vessels": { "volume": { "mandatory": true, "range": [0.1, 10.0] } },
//!     "reactions": {
//!         "model": { "parameters": { "value": { "range": [400, 600] } } }
//!     },
//!     "measurements": { "temperature_unit": { "vocabulary": ["K", "C"] } }
//! }
//! ```
//!
//! Fields without a rule are never checked.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ValidationError;
use super::shape::{FieldShape, Shape, DOCUMENT_SHAPE};

/// Constraints for a single field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldRule {
    /// The field has to be present.
    #[serde(default)]
    pub mandatory: bool,

    /// Closed interval numeric values have to lie in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,

    /// Allowed values of the field.
    #[serde(default, alias = "enum", skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<Vec<String>>,
}

impl FieldRule {
    pub fn mandatory() -> Self {
        Self {
            mandatory: true,
            ..Default::default()
        }
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some([min, max]);
        self
    }

    pub fn with_vocabulary<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vocabulary = Some(values.into_iter().map(Into::into).collect());
        self
    }

    fn check(&self, path: &[String]) -> Result<(), ValidationError> {
        if let Some([min, max]) = self.range {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(ValidationError::malformed(
                    path,
                    format!("invalid range [{min}, {max}]"),
                ));
            }
        }

        if self.vocabulary.as_ref().is_some_and(|v| v.is_empty()) {
            return Err(ValidationError::malformed(path, "empty vocabulary"));
        }

        Ok(())
    }
}

/// Either a rule for a primitive field or the rules of a nested object/collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleNode {
    Field(FieldRule),
    Nested(RuleSet),
}

/// Rules keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: BTreeMap<String, RuleNode>,
}

impl RuleSet {
    pub fn get(&self, field: &str) -> Option<&RuleNode> {
        self.rules.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RuleNode)> {
        self.rules.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// A complete validation spec that conforms to the document layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationSpec {
    rules: RuleSet,
}

impl ValidationSpec {
    /// An empty spec. Validating against it always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a spec from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Json` for invalid JSON and
    /// `ValidationError::MalformedSpec` if the spec does not mirror the document layout.
    pub fn from_json(content: &str) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    /// Builds a spec from an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        let mut rules: RuleSet = serde_json::from_value(value)
            .map_err(|e| ValidationError::malformed(&[], e.to_string()))?;

        conform(&mut rules, &DOCUMENT_SHAPE, &mut Vec::new())?;
        Ok(Self { rules })
    }

    /// Reads a spec from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, ValidationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// A spec listing every field of the document, each marked mandatory.
    ///
    /// Meant as a starting point for hand-written specs.
    pub fn template() -> Self {
        Self {
            rules: template_rules(&DOCUMENT_SHAPE),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Returns the rule at the given field path, e.g. `["vessels", "volume"]`.
    pub fn rule(&self, path: &[&str]) -> Option<&FieldRule> {
        let (last, parents) = path.split_last()?;
        let mut rules = &self.rules;

        for field in parents {
            match rules.get(field)? {
                RuleNode::Nested(nested) => rules = nested,
                RuleNode::Field(_) => return None,
            }
        }

        match rules.get(last)? {
            RuleNode::Field(rule) => Some(rule),
            RuleNode::Nested(_) => None,
        }
    }

    /// Sets the rule at the given field path.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MalformedSpec` if the path does not end in a primitive
    /// field of the document layout or the rule is invalid.
    pub fn set_rule(&mut self, path: &[&str], rule: FieldRule) -> Result<(), ValidationError> {
        let owned = path.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let Some((last, parents)) = path.split_last() else {
            return Err(ValidationError::malformed(&owned, "empty field path"));
        };

        let mut shape: &Shape = &DOCUMENT_SHAPE;
        let mut rules = &mut self.rules;

        for field in parents {
            shape = match shape.field(field) {
                Some(FieldShape::Object(inner) | FieldShape::Collection(inner)) => inner,
                _ => return Err(ValidationError::malformed(&owned, "not a nested field")),
            };

            let node = rules
                .rules
                .entry(field.to_string())
                .or_insert_with(|| RuleNode::Nested(RuleSet::default()));

            if matches!(node, RuleNode::Field(_)) {
                *node = RuleNode::Nested(RuleSet::default());
            }

            rules = match node {
                RuleNode::Nested(nested) => nested,
                RuleNode::Field(_) => return Err(ValidationError::malformed(&owned, "not a nested field")),
            };
        }

        if !matches!(shape.field(last), Some(FieldShape::Value { .. })) {
            return Err(ValidationError::malformed(&owned, "not a primitive field"));
        }

        rule.check(&owned)?;
        rules.rules.insert(last.to_string(), RuleNode::Field(rule));
        Ok(())
    }

    /// All leaf rules with their field paths, in document layout order.
    pub fn rows(&self) -> Vec<SpecRow<'_>> {
        let mut rows = Vec::new();
        collect_rows(&DOCUMENT_SHAPE, Some(&self.rules), &mut Vec::new(), &mut rows);
        rows
    }
}

/// One primitive field of the document layout together with its rule, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecRow<'a> {
    pub path: Vec<&'static str>,
    /// Entity type owning the field
    pub object: &'static str,
    pub description: &'static str,
    pub rule: Option<&'a FieldRule>,
}

fn collect_rows<'a>(
    shape: &'static Shape,
    rules: Option<&'a RuleSet>,
    path: &mut Vec<&'static str>,
    rows: &mut Vec<SpecRow<'a>>,
) {
    for (field, field_shape) in &shape.fields {
        let node = rules.and_then(|rules| rules.get(field));
        path.push(*field);

        match field_shape {
            FieldShape::Value { description, .. } => {
                let rule = match node {
                    Some(RuleNode::Field(rule)) => Some(rule),
                    _ => None,
                };
                rows.push(SpecRow {
                    path: path.clone(),
                    object: shape.object,
                    description: *description,
                    rule,
                });
            }
            FieldShape::Object(inner) | FieldShape::Collection(inner) => {
                let nested = match node {
                    Some(RuleNode::Nested(nested)) => Some(nested),
                    _ => None,
                };
                collect_rows(inner, nested, path, rows);
            }
        }

        path.pop();
    }
}

/// Checks that `rules` mirror `shape` and normalizes empty placeholders.
fn conform(rules: &mut RuleSet, shape: &Shape, path: &mut Vec<String>) -> Result<(), ValidationError> {
    for (field, node) in rules.rules.iter_mut() {
        path.push(field.clone());

        let Some(field_shape) = shape.field(field) else {
            return Err(ValidationError::malformed(
                path,
                format!("'{}' has no field '{field}'", shape.object),
            ));
        };

        let nested_shape = match field_shape {
            FieldShape::Value { .. } => None,
            FieldShape::Object(inner) | FieldShape::Collection(inner) => Some(inner),
        };

        // `{}` parses as an empty field rule
        let placeholder = matches!(node, RuleNode::Field(rule) if *rule == FieldRule::default());
        if nested_shape.is_some() && placeholder {
            *node = RuleNode::Nested(RuleSet::default());
        }

        match (nested_shape, node) {
            (None, RuleNode::Field(rule)) => rule.check(path)?,
            (None, RuleNode::Nested(_)) => {
                return Err(ValidationError::malformed(
                    path,
                    "expected a field rule, found nested rules",
                ))
            }
            (Some(inner), RuleNode::Nested(nested)) => conform(nested, inner, path)?,
            (Some(_), RuleNode::Field(_)) => {
                return Err(ValidationError::malformed(
                    path,
                    "expected nested rules, found a field rule",
                ))
            }
        }

        path.pop();
    }

    Ok(())
}

fn template_rules(shape: &Shape) -> RuleSet {
    let rules = shape
        .fields
        .iter()
        .map(|(field, field_shape)| {
            let node = match field_shape {
                FieldShape::Value { .. } => RuleNode::Field(FieldRule::mandatory()),
                FieldShape::Object(inner) | FieldShape::Collection(inner) => {
                    RuleNode::Nested(template_rules(inner))
                }
            };
            (field.to_string(), node)
        })
        .collect();

    RuleSet { rules }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_json() {
        // Arrange
        let content = r#"{
            "name": { "mandatory": true },
            "reactions": {
                "model": { "parameters": { "value": { "range": [400, 600] } } }
            },
            "measurements": { "temperature_unit": { "enum": ["K", "C"] } }
        }"#;

        // Act
        let spec = ValidationSpec::from_json(content).unwrap();

        // Assert
        assert_eq!(spec.rule(&["name"]), Some(&FieldRule::mandatory()));
        assert_eq!(
            spec.rule(&["reactions", "model", "parameters", "value"]),
            Some(&FieldRule::default().with_range(400.0, 600.0))
        );
        assert_eq!(
            spec.rule(&["measurements", "temperature_unit"])
                .and_then(|r| r.vocabulary.clone()),
            Some(vec!["K".to_string(), "C".to_string()])
        );
        assert_eq!(spec.rule(&["description"]), None);
    }

    #[test]
    fn test_unknown_field_is_malformed() {
        let result = ValidationSpec::from_json(r#"{ "vessels": { "colour": { "mandatory": true } } }"#);
        assert!(matches!(result, Err(ValidationError::MalformedSpec { path, .. }) if path == "vessels.colour"));
    }

    #[test]
    fn test_rule_on_collection_is_malformed() {
        let result = ValidationSpec::from_json(r#"{ "vessels": { "mandatory": true } }"#);
        assert!(matches!(result, Err(ValidationError::MalformedSpec { .. })));
    }

    #[test]
    fn test_nested_rules_on_primitive_are_malformed() {
        let result = ValidationSpec::from_json(r#"{ "name": { "first": { "mandatory": true } } }"#);
        assert!(matches!(result, Err(ValidationError::MalformedSpec { .. })));
    }

    #[test]
    fn test_inverted_range_is_malformed() {
        let result = ValidationSpec::from_json(r#"{ "vessels": { "volume": { "range": [10, 1] } } }"#);
        assert!(matches!(result, Err(ValidationError::MalformedSpec { .. })));
    }

    #[test]
    fn test_empty_placeholder_for_collection() {
        let spec = ValidationSpec::from_json(r#"{ "vessels": {} }"#).unwrap();
        assert!(matches!(spec.rules().get("vessels"), Some(RuleNode::Nested(rules)) if rules.is_empty()));
    }

    #[test]
    fn test_set_rule() {
        let mut spec = ValidationSpec::new();
        spec.set_rule(&["vessels", "volume"], FieldRule::mandatory())
            .unwrap();

        assert_eq!(spec.rule(&["vessels", "volume"]), Some(&FieldRule::mandatory()));
        assert!(spec.set_rule(&["vessels"], FieldRule::mandatory()).is_err());
        assert!(spec.set_rule(&["vessels", "colour"], FieldRule::mandatory()).is_err());
    }

    #[test]
    fn test_template_round_trips() {
        let template = ValidationSpec::template();
        let json = template.to_json().unwrap();
        let parsed = ValidationSpec::from_json(&json).unwrap();

        assert_eq!(parsed, template);
        assert_eq!(
            template.rule(&["measurements", "species_data", "replicates", "data_type"]),
            Some(&FieldRule::mandatory())
        );
    }

    #[test]
    fn test_rows_cover_layout() {
        let spec = ValidationSpec::from_json(r#"{ "vessels": { "volume": { "mandatory": true } } }"#)
            .unwrap();
        let rows = spec.rows();

        let row = rows
            .iter()
            .find(|row| row.path == ["vessels", "volume"])
            .unwrap();

        assert_eq!(row.object, "Vessel");
        assert_eq!(row.rule, Some(&FieldRule::mandatory()));
        assert!(!row.description.is_empty());
        assert!(rows.iter().any(|row| row.path == ["name"] && row.rule.is_none()));
    }
}
