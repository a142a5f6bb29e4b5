//! Nested discrepancy report produced by the [`Validator`](super::validator::Validator).
//!
//! The report mirrors the document: collections are keyed by entity id (measurement
//! data by species id, parameters by name, creators by index) and only entities that
//! failed at least one check appear. Leaves map the kind of failure to a message:
//!
//! ```json
//! { "vessels": { "v0": { "volume": { "range_error": "Value of '20' is out of range for [400, 600]" } } } }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use colored::Colorize;
use serde::{Deserialize, Serialize};

/// The check a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MandatoryError,
    RangeError,
    EnumError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::MandatoryError => write!(f, "mandatory_error"),
            ErrorKind::RangeError => write!(f, "range_error"),
            ErrorKind::EnumError => write!(f, "enum_error"),
        }
    }
}

/// A node of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportEntry {
    /// Failures of a single field.
    Field(BTreeMap<ErrorKind, String>),
    /// Failing fields of a nested object, or failing entities of a collection.
    Nested(BTreeMap<String, ReportEntry>),
}

/// A single failed check, flattened out of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding<'a> {
    pub path: Vec<&'a str>,
    pub kind: ErrorKind,
    pub message: &'a str,
}

impl fmt::Display for Finding<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}:\n\t└── {}",
            self.path.join("/").bold(),
            self.kind.to_string().bold().red(),
            self.message.bold().red()
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationReport {
    entries: BTreeMap<String, ReportEntry>,
}

impl ValidationReport {
    pub(crate) fn new(entries: BTreeMap<String, ReportEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<String, ReportEntry> {
        &self.entries
    }

    /// Returns the entry at a path such as `["vessels", "v0", "volume"]`.
    pub fn get(&self, path: &[&str]) -> Option<&ReportEntry> {
        let (first, rest) = path.split_first()?;
        let mut entry = self.entries.get(*first)?;

        for key in rest {
            match entry {
                ReportEntry::Nested(children) => entry = children.get(*key)?,
                ReportEntry::Field(_) => return None,
            }
        }

        Some(entry)
    }

    /// Returns the failures of the field at `path`.
    pub fn errors(&self, path: &[&str]) -> Option<&BTreeMap<ErrorKind, String>> {
        match self.get(path)? {
            ReportEntry::Field(errors) => Some(errors),
            ReportEntry::Nested(_) => None,
        }
    }

    /// All failed checks in report order.
    pub fn findings(&self) -> Vec<Finding<'_>> {
        let mut findings = Vec::new();
        let mut path = Vec::new();

        for (key, entry) in &self.entries {
            path.push(key.as_str());
            collect(entry, &mut path, &mut findings);
            path.pop();
        }

        findings
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn collect<'a>(entry: &'a ReportEntry, path: &mut Vec<&'a str>, findings: &mut Vec<Finding<'a>>) {
    match entry {
        ReportEntry::Field(errors) => {
            findings.extend(errors.iter().map(|(kind, message)| Finding {
                path: path.clone(),
                kind: *kind,
                message,
            }));
        }
        ReportEntry::Nested(children) => {
            for (key, child) in children {
                path.push(key);
                collect(child, path, findings);
                path.pop();
            }
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for finding in self.findings() {
            writeln!(f, "{finding}")?;
        }
        Ok(())
    }
}
