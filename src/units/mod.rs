//! Unit handling: expression parsing and the per-document unit registry.

use thiserror::Error;

pub mod maps;
pub mod parser;
pub mod registry;

pub use parser::parse_unit;
pub use registry::UnitRegistry;

/// Errors that can occur when parsing or registering units
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UnitError {
    /// The expression cannot be decomposed into known base factors
    #[error("Malformed unit '{0}': {1}")]
    MalformedUnit(String, String),

    /// A unit definition with the same id is already registered
    #[error("Unit id '{0}' is already registered")]
    DuplicateUnitId(String),
}
