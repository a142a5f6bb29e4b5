//! EnzymeML Rust Library
//!
//! This library provides functionality for working with EnzymeML documents, including:
//! - Building documents with referentially consistent entities and units
//! - Parsing reaction equations and generating kinetic models from templates
//! - Validating documents against user supplied specs and a JSON schema
//! - Reading/writing JSON and SBML-flavored XML
//! - Exporting measurement data for fitting engines

#![warn(unused_imports)]

pub mod versions {
    pub use crate::versions::v2 as latest;
    pub mod v2;
}

/// Commonly used types and functionality re-exported for convenience
pub mod prelude {
    pub use crate::io::*;
    pub use crate::versions::latest::*;

    pub use crate::document::DocumentError;
    pub use crate::equation::EquationError;
    pub use crate::export::MeasurementTable;
    pub use crate::kinetics::{
        mass_action, michaelis_menten, michaelis_menten_vmax, Binding, KineticModelError,
        ModelGenerator,
    };
    pub use crate::store::{EntityKind, StoreError};
    pub use crate::units::{UnitError, UnitRegistry};
    pub use crate::validation::consistency::{check_consistency, Report, Severity};
    pub use crate::validation::error::ValidationError;
    pub use crate::validation::report::ValidationReport;
    pub use crate::validation::spec::{FieldRule, ValidationSpec};
    pub use crate::validation::validator::{ValidationOutcome, Validator};

    #[cfg(feature = "sbml")]
    pub use crate::sbml::{from_sbml, read_sbml, to_sbml, write_sbml, SBMLError};
}

/// Unit expressions and the per-document unit registry
pub mod units;

/// Identifier generation and entity storage
pub mod store;

/// Reaction equation parsing
pub mod equation;

/// Kinetic rate laws and model generation
pub mod kinetics;

/// Operations on the document aggregate
pub mod document;

/// Validation of EnzymeML documents and components
pub mod validation {
    /// Referential consistency checks
    pub mod consistency;
    /// Errors raised while loading specs or schemas
    pub mod error;
    /// Checks of measurement data
    mod measurements;
    /// Checks of kinetic parameters
    mod parameters;
    /// Checks of reactions
    mod reactions;
    /// Nested validation reports
    pub mod report;
    /// JSON schema validation
    pub mod schema;
    /// Field layout of the document
    pub mod shape;
    /// Checks of species
    mod species;
    /// Validation specs
    pub mod spec;
    /// Spec driven document validation
    pub mod validator;
}

/// IO functionality
pub mod io;

/// SBML-flavored XML reading and writing
#[cfg(feature = "sbml")]
pub mod sbml {
    pub use crate::sbml::error::SBMLError;
    pub use crate::sbml::reader::{from_sbml, read_sbml};
    pub use crate::sbml::writer::{to_sbml, write_sbml};

    pub mod error;
    pub mod reader;
    pub mod schema;
    pub(crate) mod speciestype;
    pub mod writer;
}

/// Measurement data export
pub mod export;

/// Human readable document display
pub mod info;

/// Validation specs as spreadsheets
#[cfg(feature = "tabular")]
pub mod tabular {
    /// Reading specs from spreadsheets
    pub mod reader;
    /// Writing specs to spreadsheets
    pub mod writer;
}
