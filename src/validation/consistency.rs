//! Consistency checks for EnzymeML documents.
//!
//! This module checks a document for referential and structural integrity:
//! - Species reside in existing vessels and complexes are well formed
//! - Reactions and kinetic laws only reference known species and parameters
//! - Measurement data is complete and consistent in its units
//! - Parameters carry units and sensible bounds
//!
//! The main entry point is the `check_consistency` function which runs all checks and
//! returns a `Report` with the results. Documents built exclusively through the
//! document API are consistent by construction; the checks matter for documents that
//! were deserialized or edited in place.

use std::collections::HashSet;
use std::fmt;

use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::validation::measurements::check_measurements;
use crate::validation::parameters::check_parameters;
use crate::validation::reactions::check_reactions;
use crate::validation::species::check_species;
use crate::versions::v2::EnzymeMLDocument;

/// The `check_consistency` function is used to check the consistency of an `EnzymeMLDocument`.
/// It returns a `Report` containing the results of the checks.
///
/// # Arguments
///
/// * `enzmldoc` - A reference to the `EnzymeMLDocument` to be checked.
///
/// # Returns
///
/// Returns a `Report` containing the results of the consistency checks.
pub fn check_consistency(enzmldoc: &EnzymeMLDocument) -> Report {
    let mut report = Report::new();

    check_species(enzmldoc, &mut report);
    check_reactions(enzmldoc, &mut report);
    check_measurements(enzmldoc, &mut report);
    check_parameters(enzmldoc, &mut report);

    report
}

/// The `Report` struct is used to store the results of the consistency checks.
///
/// The document is considered invalid if any result has Error severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Whether the document is valid overall. False if any errors were found.
    pub is_valid: bool,
    /// Individual results found during checks.
    pub errors: Vec<ValidationResult>,
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

impl Report {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    /// Adds a result to the report.
    ///
    /// If the result has Error severity, marks the overall report as invalid.
    pub fn add_result(&mut self, result: ValidationResult) {
        if result.severity == Severity::Error {
            self.is_valid = false;
        }
        self.errors.push(result);
    }

    /// Filters the results by the identifier of the offending object.
    pub fn filter_results(&self, identifier: &str) -> Vec<&ValidationResult> {
        self.errors
            .iter()
            .filter(|result| result.identifier.as_deref() == Some(identifier))
            .collect()
    }

    /// Number of results with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.errors
            .iter()
            .filter(|result| result.severity == severity)
            .count()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.errors {
            writeln!(f, "{result}")?;
        }
        Ok(())
    }
}

/// A single issue found during checking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// JSON pointer path to the location of the issue
    location: String,
    /// Human readable description of the issue
    message: String,
    /// Severity level of the issue
    severity: Severity,
    /// The identifier of the object, if any
    identifier: Option<String>,
}

impl ValidationResult {
    pub fn new(
        location: String,
        message: String,
        severity: Severity,
        identifier: Option<String>,
    ) -> Self {
        Self {
            location,
            message,
            severity,
            identifier,
        }
    }

    pub(crate) fn error(location: String, message: String, identifier: &str) -> Self {
        Self::new(location, message, Severity::Error, Some(identifier.to_string()))
    }

    pub(crate) fn warning(location: String, message: String, identifier: &str) -> Self {
        Self::new(location, message, Severity::Warning, Some(identifier.to_string()))
    }

    /// JSON pointer path to the issue within the serialized document.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> &Severity {
        &self.severity
    }

    /// The identifier of the object the issue relates to, if any.
    pub fn identifier(&self) -> &Option<String> {
        &self.identifier
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self.severity {
            Severity::Error => self.message.bold().red(),
            Severity::Warning => self.message.bold().yellow(),
            Severity::Info => self.message.bold().green(),
        };

        let severity = match self.severity {
            Severity::Error => "Error".bold().red(),
            Severity::Warning => "Warning".bold().yellow(),
            Severity::Info => "Info".bold().green(),
        };

        write!(
            f,
            "[{}] {}:\n\t└── {}",
            self.location.bold(),
            severity,
            message
        )
    }
}

/// Severity levels for issues.
///
/// - Error: The document is invalid and should not be serialized
/// - Warning: The document may have issues but is still valid
/// - Info: Informational message about potential improvements
#[derive(Debug, Clone, PartialEq, Eq, Copy, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "Error"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Info => write!(f, "Info"),
        }
    }
}

/// Identifiers of all species of the document.
pub(crate) fn get_species_ids(enzmldoc: &EnzymeMLDocument) -> HashSet<&str> {
    enzmldoc
        .all_species()
        .iter()
        .map(|species| species.id.as_str())
        .collect()
}
