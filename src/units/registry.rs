//! Registry of the unit definitions used within a document.
//!
//! Quantities never store a unit inline. They hold the id of a [`UnitDefinition`]
//! registered here. Registration is keyed by the exact expression text: `"mM"` and
//! `"mmol / l"` describe the same quantity but are two distinct definitions.

use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::units::parser::parse_unit;
use crate::units::UnitError;
use crate::versions::v2::UnitDefinition;

const UNIT_PREFIX: &str = "u";

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(transparent)]
pub struct UnitRegistry {
    definitions: Vec<UnitDefinition>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a unit expression to the id of its definition.
    ///
    /// The first time an expression is seen it is parsed and registered under a fresh
    /// id; subsequent calls with the same text return that id without registering again.
    ///
    /// # Errors
    ///
    /// Returns `UnitError::MalformedUnit` if the expression cannot be decomposed.
    pub fn resolve(&mut self, expression: &str) -> Result<String, UnitError> {
        if let Some(existing) = self.find_by_name(expression) {
            return Ok(existing.id.clone());
        }

        let base_units = parse_unit(expression)?;
        let id = self.next_id();

        debug!("Registered unit '{expression}' as '{id}'");
        self.definitions.push(UnitDefinition {
            id: id.clone(),
            name: expression.to_string(),
            base_units,
        });

        Ok(id)
    }

    /// Resolves a unit field value that may either be a registered id or an expression.
    pub fn resolve_ref(&mut self, unit: &str) -> Result<String, UnitError> {
        if self.get(unit).is_some() {
            return Ok(unit.to_string());
        }

        self.resolve(unit)
    }

    /// Inserts a fully specified definition, keeping its id.
    ///
    /// Used when reading documents whose definitions already carry identifiers.
    pub fn insert(&mut self, definition: UnitDefinition) -> Result<String, UnitError> {
        if self.get(&definition.id).is_some() {
            return Err(UnitError::DuplicateUnitId(definition.id));
        }

        let id = definition.id.clone();
        self.definitions.push(definition);
        Ok(id)
    }

    pub fn get(&self, id: &str) -> Option<&UnitDefinition> {
        self.definitions.iter().find(|definition| definition.id == id)
    }

    /// Looks up a definition by the exact expression it was registered with.
    pub fn find_by_name(&self, expression: &str) -> Option<&UnitDefinition> {
        self.definitions
            .iter()
            .find(|definition| definition.name == expression)
    }

    /// Returns the expression of a registered unit, or the reference itself if unknown.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|definition| definition.name.as_str()).unwrap_or(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn next_id(&self) -> String {
        let mut index = self.definitions.len();
        loop {
            let candidate = format!("{UNIT_PREFIX}{index}");
            if self.get(&candidate).is_none() {
                return candidate;
            }
            index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_idempotent() {
        let mut registry = UnitRegistry::new();
        let first = registry.resolve("mM").expect("Failed to resolve unit");
        let second = registry.resolve("mM").expect("Failed to resolve unit");

        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_dedup_by_exact_text_only() {
        let mut registry = UnitRegistry::new();
        let molar = registry.resolve("mM").expect("Failed to resolve unit");
        let fraction = registry.resolve("mmol / l").expect("Failed to resolve unit");

        assert_ne!(molar, fraction);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_malformed_unit_is_not_registered() {
        let mut registry = UnitRegistry::new();
        let result = registry.resolve("mol / l / s");

        assert!(matches!(result, Err(UnitError::MalformedUnit(_, _))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_resolve_ref_accepts_ids() {
        let mut registry = UnitRegistry::new();
        let id = registry.resolve("s").expect("Failed to resolve unit");
        let again = registry.resolve_ref(&id).expect("Failed to resolve unit ref");

        assert_eq!(id, again);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.display_name(&id), "s");
    }

    #[test]
    fn test_insert_skips_taken_ids() {
        let mut registry = UnitRegistry::new();
        registry
            .insert(UnitDefinition {
                id: "u0".to_string(),
                name: "K".to_string(),
                base_units: vec![],
            })
            .expect("Failed to insert unit");

        let id = registry.resolve("s").expect("Failed to resolve unit");
        assert_eq!(id, "u1");

        let duplicate = registry.insert(UnitDefinition {
            id: "u1".to_string(),
            name: "h".to_string(),
            base_units: vec![],
        });
        assert!(matches!(duplicate, Err(UnitError::DuplicateUnitId(_))));
    }
}
