//! Helpers on [`KineticModel`]: construction from a plain equation and evaluation.

use std::collections::{BTreeSet, HashMap};

use meval::Context;

use crate::kinetics::expr::Expr;
use crate::kinetics::KineticModelError;
use crate::store::StoreError;
use crate::versions::v2::{EnzymeMLDocument, KineticModel, KineticParameter};

impl KineticModel {
    /// Creates a model from an equation written against a document.
    ///
    /// Symbols naming species (by id or unique name) are rewritten to species ids.
    /// Global parameters of the document are left as they are. Every remaining symbol
    /// becomes a local parameter without value.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the kinetic law.
    /// * `equation` - The rate equation, e.g. `"vmax * Glucose / (K_m + Glucose)"`.
    /// * `enzmldoc` - The document whose species the equation refers to.
    ///
    /// # Errors
    ///
    /// Returns an error if the equation cannot be parsed or a symbol is ambiguous.
    pub fn from_equation(
        name: impl Into<String>,
        equation: &str,
        enzmldoc: &EnzymeMLDocument,
    ) -> Result<KineticModel, KineticModelError> {
        let expr = Expr::parse(equation)?;
        let mut renames = HashMap::new();
        let mut parameters = Vec::new();

        for symbol in expr.identifiers() {
            match enzmldoc.store.species(&symbol) {
                Ok(species) => {
                    renames.insert(symbol, species.id.clone());
                }
                Err(StoreError::AmbiguousName { .. }) => {
                    return Err(KineticModelError::AmbiguousSymbol(symbol))
                }
                Err(_) if enzmldoc.global_parameter(&symbol).is_some() => {}
                Err(_) => parameters.push(KineticParameter {
                    name: symbol,
                    ..Default::default()
                }),
            }
        }

        let expr = expr.substitute(&|symbol: &str| renames.get(symbol).cloned().map(Expr::Ident));

        Ok(KineticModel {
            name: name.into(),
            equation: expr.to_string(),
            parameters,
        })
    }

    /// Returns the local parameter with the given name.
    pub fn parameter(&self, name: &str) -> Option<&KineticParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut KineticParameter> {
        self.parameters.iter_mut().find(|p| p.name == name)
    }

    /// All symbols used by the equation.
    pub fn symbols(&self) -> Result<BTreeSet<String>, KineticModelError> {
        Ok(Expr::parse(&self.equation)?.identifiers())
    }

    /// Evaluates the rate for the given symbol values.
    ///
    /// Local parameters contribute their `value` when set; entries of `values` take
    /// precedence and typically hold species concentrations and global parameters.
    pub fn evaluate(&self, values: &HashMap<String, f64>) -> Result<f64, KineticModelError> {
        let evaluation_error = |reason: String| KineticModelError::EvaluationError {
            equation: self.equation.clone(),
            reason,
        };

        let expr: meval::Expr = self
            .equation
            .parse()
            .map_err(|e: meval::Error| evaluation_error(e.to_string()))?;

        let mut ctx = Context::new();
        for parameter in &self.parameters {
            if let Some(value) = parameter.value {
                ctx.var(parameter.name.clone(), value);
            }
        }
        for (name, value) in values {
            ctx.var(name.clone(), *value);
        }

        expr.eval_with_context(ctx)
            .map_err(|e| evaluation_error(e.to_string()))
    }
}
