use thiserror::Error;

/// Errors raised while loading validation specs or checking documents against the
/// JSON schema. Findings of a validation run are reported, not raised.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The spec does not mirror the document layout or carries invalid rules
    #[error("Malformed validation spec at '{path}': {reason}")]
    MalformedSpec { path: String, reason: String },

    /// The spec or document is not valid JSON
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON schema of the document could not be compiled
    #[error("Failed to compile the document schema: {0}")]
    Schema(String),

    /// Reading or writing a file failed
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A spec spreadsheet could not be read or written
    #[cfg(feature = "tabular")]
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),
}

impl ValidationError {
    pub(crate) fn malformed(path: &[String], reason: impl Into<String>) -> Self {
        ValidationError::MalformedSpec {
            path: if path.is_empty() {
                "/".to_string()
            } else {
                path.join(".")
            },
            reason: reason.into(),
        }
    }
}
