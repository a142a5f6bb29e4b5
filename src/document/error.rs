use thiserror::Error;

use crate::equation::EquationError;
use crate::kinetics::KineticModelError;
use crate::store::StoreError;
use crate::units::UnitError;

/// Errors that can occur when modifying or querying an EnzymeML document
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DocumentError {
    /// Lookup or insertion into the entity store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A unit expression could not be resolved
    #[error(transparent)]
    Unit(#[from] UnitError),

    /// A reaction equation could not be parsed
    #[error(transparent)]
    Equation(#[from] EquationError),

    /// A kinetic model is invalid
    #[error(transparent)]
    KineticModel(#[from] KineticModelError),

    /// The identifier or name is already in use
    #[error("The identifier '{0}' is already in use")]
    DuplicateIdentifier(String),

    /// The entity is still referenced and cannot be removed
    #[error("Cannot remove '{id}': it is still referenced by {referrer}")]
    ReferencedEntity { id: String, referrer: String },

    /// A complex must consist of at least one participant
    #[error("Complex '{0}' has no participants")]
    EmptyComplex(String),

    /// A complex would contain itself
    #[error("Complex '{0}' would contain itself")]
    CyclicComplex(String),

    /// A symbol of a kinetic law resolves to nothing
    #[error("Symbol '{symbol}' of the kinetic law of '{reaction}' is neither a species, a model parameter nor a global parameter")]
    UnresolvedSymbol { reaction: String, symbol: String },

    /// A replicate's time and data vectors differ in length
    #[error("Replicate '{id}' has {time} time points but {data} data points")]
    ReplicateLengthMismatch { id: String, time: usize, data: usize },

    /// A replicate references a species that the measurement has no data for
    #[error("Measurement '{measurement}' has no data for species '{species}'")]
    MissingSpeciesData { measurement: String, species: String },

    /// A measurement lists data for the same species twice
    #[error("Measurement '{measurement}' has more than one data entry for species '{species}'")]
    DuplicateSpeciesData { measurement: String, species: String },

    /// Measurements to export disagree on their time axes
    #[error("Inconsistent time axes in measurement '{0}'")]
    InconsistentTimeAxes(String),

    /// A fitted value was given for a parameter that does not exist
    #[error("Unknown parameter '{0}'")]
    UnknownParameter(String),

    /// The document violates referential or structural integrity
    #[error("Document integrity check failed:\n{0}")]
    IntegrityViolation(String),
}
