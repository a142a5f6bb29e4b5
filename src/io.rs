use std::path::PathBuf;

use log::debug;
use thiserror::Error;

use crate::document::DocumentError;
use crate::prelude::EnzymeMLDocument;
use crate::validation::error::ValidationError;
use crate::validation::schema::validate_json;

/// Loads and parses an EnzymeML document from a JSON file.
///
/// The file content is checked against the JSON schema of the document before it is
/// decoded, so that structural problems are reported with their location.
///
/// # Arguments
///
/// * `path` - Path to the JSON file containing the EnzymeML document
///
/// # Returns
///
/// Returns a `Result` containing either:
/// * `Ok(EnzymeMLDocument)` - The successfully parsed EnzymeML document
/// * `Err(IOError)` - An error that occurred during file reading or JSON parsing
///
/// # Errors
///
/// This function will return an error if:
/// * The file cannot be found or opened (`IOError::FileNotFound`)
/// * The file contents do not match the document schema (`IOError::SchemaViolation`)
/// * The file contents cannot be parsed as valid JSON (`IOError::JsonParseError`)
pub fn load_enzmldoc(path: impl Into<PathBuf>) -> Result<EnzymeMLDocument, IOError> {
    let path = path.into();
    debug!("Loading EnzymeML document from {}", path.display());
    let content = std::fs::read_to_string(path).map_err(IOError::FileNotFound)?;
    from_json_str(&content)
}

/// Saves an EnzymeML document to a JSON file.
///
/// The document has to pass [`EnzymeMLDocument::check_integrity`] first; a document
/// with dangling references is never written.
///
/// # Arguments
///
/// * `path` - Path to the JSON file to save the EnzymeML document to
/// * `doc` - A reference to the EnzymeML document to save
///
/// # Returns
///
/// Returns a `Result` containing either:
/// * `Ok(())` - The successfully saved EnzymeML document
/// * `Err(IOError)` - An error that occurred during the integrity check, file writing or JSON serialization
pub fn save_enzmldoc(path: impl Into<PathBuf>, doc: &EnzymeMLDocument) -> Result<(), IOError> {
    let path = path.into();
    let content = to_json_string(doc)?;
    debug!("Saving EnzymeML document to {}", path.display());
    std::fs::write(path, content).map_err(IOError::FileNotFound)
}

/// Serializes a document to pretty printed JSON after checking its integrity.
pub fn to_json_string(doc: &EnzymeMLDocument) -> Result<String, IOError> {
    doc.check_integrity()?;
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Parses a document from JSON, checking it against the document schema first.
pub fn from_json_str(content: &str) -> Result<EnzymeMLDocument, IOError> {
    let report = validate_json(content)?;

    if !report.valid {
        let violations = report
            .errors
            .iter()
            .map(|violation| format!("{}: {}", violation.location, violation.message))
            .collect::<Vec<_>>();
        return Err(IOError::SchemaViolation(violations.join("; ")));
    }

    Ok(serde_json::from_str(content)?)
}

/// Represents errors that can occur during EnzymeML document I/O operations.
///
/// This enum encapsulates the various error conditions that may arise when reading
/// and writing EnzymeML documents.
#[derive(Error, Debug)]
pub enum IOError {
    /// Indicates that the specified file could not be found or opened.
    ///
    /// This variant wraps the underlying std::io::Error that provides more details
    /// about the specific file system error that occurred.
    #[error("File not found: {0}")]
    FileNotFound(#[from] std::io::Error),

    /// Indicates that the file contents could not be parsed as valid JSON.
    ///
    /// This variant wraps the underlying serde_json::Error that provides more details
    /// about the specific JSON parsing error that occurred.
    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    /// The JSON content does not match the document schema.
    #[error("Document does not match the EnzymeML schema: {0}")]
    SchemaViolation(String),

    /// The schema check itself could not be performed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The document failed its integrity check and was not written.
    #[error(transparent)]
    Integrity(#[from] DocumentError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versions::v2::{Species, VesselBuilder};

    #[test]
    fn test_save_and_load() {
        let mut doc = EnzymeMLDocument::new("Test");
        doc.add_vessel(
            VesselBuilder::default()
                .name("Cuvette")
                .volume(1.0)
                .unit("ml")
                .build()
                .unwrap(),
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");

        save_enzmldoc(&path, &doc).unwrap();
        let loaded = load_enzmldoc(&path).unwrap();

        assert_eq!(doc, loaded);
    }

    #[test]
    fn test_missing_file() {
        let result = load_enzmldoc("does/not/exist.json");
        assert!(matches!(result, Err(IOError::FileNotFound(_))));
    }

    #[test]
    fn test_schema_violation() {
        let result = from_json_str(r#"{ "name": "Test", "vessels": [ { "name": 1 } ] }"#);
        assert!(matches!(result, Err(IOError::SchemaViolation(_))));
    }

    #[test]
    fn test_dangling_reference_is_not_written() {
        let mut doc = EnzymeMLDocument::new("Test");
        let mut species = Species::small_molecule("Substrate", "v5").build().unwrap();
        species.id = "s0".to_string();
        doc.store.species.push(species);

        let result = to_json_string(&doc);
        assert!(matches!(result, Err(IOError::Integrity(_))));
    }
}
