//! Schema module for validating serialized EnzymeML documents.
//!
//! This module checks JSON content against the JSON schema derived from the
//! `EnzymeMLDocument` type before it is decoded, so that structural problems are
//! reported with their location instead of as a single decoding error.

use std::fmt;

use colored::Colorize;
use jsonschema::validator_for;
use schemars::schema_for;
use serde_json::Value;

use crate::validation::error::ValidationError;
use crate::versions::v2::EnzymeMLDocument;

/// Report containing schema violations
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct SchemaReport {
    /// Whether the document is valid
    pub valid: bool,
    /// List of violations if any
    pub errors: Vec<SchemaViolation>,
}

/// Individual schema violation
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct SchemaViolation {
    /// JSON path where the violation occurred
    pub location: String,
    /// Description of the violation
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n\t└── {}",
            self.location.bold(),
            self.message.bold().red()
        )
    }
}

/// Returns the JSON schema of an EnzymeML document.
pub fn document_schema() -> Result<Value, ValidationError> {
    Ok(serde_json::to_value(schema_for!(EnzymeMLDocument))?)
}

/// Validates an EnzymeML document against its JSON schema
///
/// # Arguments
/// * `content` - JSON string containing the EnzymeML document
///
/// # Returns
/// * `Result<SchemaReport, ValidationError>` - Schema report, or an error if the content
///   is no JSON at all or the schema cannot be compiled
pub fn validate_json(content: &str) -> Result<SchemaReport, ValidationError> {
    let json: Value = serde_json::from_str(content)?;
    validate_value(&json)
}

/// Validates an already parsed JSON value against the document schema
pub fn validate_value(json: &Value) -> Result<SchemaReport, ValidationError> {
    let schema = document_schema()?;
    let validator = validator_for(&schema).map_err(|e| ValidationError::Schema(e.to_string()))?;

    let errors = validator
        .iter_errors(json)
        .map(|error| SchemaViolation {
            location: error.instance_path.to_string(),
            message: error.to_string().replace('"', "'"),
        })
        .collect::<Vec<_>>();

    Ok(SchemaReport {
        valid: errors.is_empty(),
        errors,
    })
}
