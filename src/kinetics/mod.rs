//! Kinetic rate laws: expression trees, reusable templates and the model type helpers.

use thiserror::Error;

pub mod expr;
pub mod generator;
pub mod model;

pub use expr::Expr;
pub use generator::{mass_action, michaelis_menten, michaelis_menten_vmax, Binding, ModelGenerator};

/// Errors that can occur when building or evaluating kinetic models
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KineticModelError {
    /// The rate law could not be parsed
    #[error("Invalid expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },

    /// A numeric literal could not be read
    #[error("Invalid number '{0}'")]
    InvalidNumber(String),

    /// A parameter specification names a symbol that does not occur in the template
    #[error("Parameter '{0}' does not occur in the template")]
    ParameterNotInTemplate(String),

    /// A free variable of the template was not bound
    #[error("Variable '{0}' has not been bound. Bind every free variable of the template: [{1}]")]
    UnboundVariable(String, String),

    /// A binding was given for a name that is not a free variable of the template
    #[error("'{0}' is not a free variable of the template")]
    UnknownVariable(String),

    /// A mapping renames a parameter the template does not define
    #[error("Cannot rename '{0}': the template has no such parameter")]
    UnknownParameterOverride(String),

    /// A mapping renames a parameter to a name the model already uses
    #[error("Cannot rename '{parameter}' to '{target}': the name is already used by the model")]
    ParameterNameCollision { parameter: String, target: String },

    /// A symbol of the equation matches the names of several species
    #[error("Symbol '{0}' matches more than one species; use the id instead")]
    AmbiguousSymbol(String),

    /// Numerical evaluation of the rate law failed
    #[error("Failed to evaluate '{equation}': {reason}")]
    EvaluationError { equation: String, reason: String },
}
