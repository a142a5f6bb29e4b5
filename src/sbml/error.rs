use thiserror::Error;

use crate::document::DocumentError;
use crate::units::UnitError;

/// Errors that can occur during SBML parsing, serialization, and conversion
#[derive(Debug, Error)]
pub enum SBMLError {
    /// Error when reading or writing an SBML file fails
    #[error("Failed to read SBML file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Error when an invalid SBOTerm is encountered
    #[error("Invalid SBOTerm: {0}")]
    InvalidSBOTerm(String),

    /// Error when the annotation of a species does not match its SBO term
    #[error("Species '{0}' is missing its {1} annotation")]
    MissingSpeciesAnnotation(String, String),

    /// Error when a number list of a replicate cannot be read
    #[error("Invalid number '{value}' in replicate '{replicate}'")]
    InvalidNumber { replicate: String, value: String },

    /// Error when a unit definition cannot be registered
    #[error(transparent)]
    Unit(#[from] UnitError),

    /// Error when the document fails its integrity check before writing
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Error when serializing the document fails
    #[error("Failed to serialize SBML: {0}")]
    SerializeError(#[from] quick_xml::SeError),

    /// Error when deserializing the document fails
    #[error("Failed to deserialize SBML: {0}")]
    DeserializeError(#[from] quick_xml::DeError),
}
