//! Reusable rate-law templates.
//!
//! A [`ModelGenerator`] holds a parsed template such as
//! `k_cat * protein * substrate / (k_m + substrate)` together with specifications for
//! its parameters. Every other symbol of the template is a free variable that has to be
//! bound to one species id, or to a list of ids that is rendered as their product.

use std::collections::{BTreeSet, HashMap};

use crate::kinetics::expr::Expr;
use crate::kinetics::KineticModelError;
use crate::versions::v2::{KineticModel, KineticParameter};

/// Species bound to a free template variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Single(String),
    Multiple(Vec<String>),
}

impl From<&str> for Binding {
    fn from(id: &str) -> Self {
        Binding::Single(id.to_string())
    }
}

impl From<String> for Binding {
    fn from(id: String) -> Self {
        Binding::Single(id)
    }
}

impl From<Vec<String>> for Binding {
    fn from(ids: Vec<String>) -> Self {
        Binding::Multiple(ids)
    }
}

impl From<Vec<&str>> for Binding {
    fn from(ids: Vec<&str>) -> Self {
        Binding::Multiple(ids.into_iter().map(String::from).collect())
    }
}

impl Binding {
    fn to_expr(&self) -> Option<Expr> {
        match self {
            Binding::Single(id) => Some(Expr::Ident(id.clone())),
            Binding::Multiple(ids) => Expr::product(ids.as_slice()),
        }
    }

    fn contains(&self, id: &str) -> bool {
        match self {
            Binding::Single(bound) => bound == id,
            Binding::Multiple(ids) => ids.iter().any(|bound| bound == id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelGenerator {
    name: String,
    template: Expr,
    parameters: Vec<KineticParameter>,
    variables: BTreeSet<String>,
}

impl ModelGenerator {
    /// Parses the template and splits its symbols into parameters and free variables.
    ///
    /// # Errors
    ///
    /// * `KineticModelError::InvalidExpression` if the template cannot be parsed
    /// * `KineticModelError::ParameterNotInTemplate` if a parameter does not occur in it
    pub fn new(
        name: impl Into<String>,
        template: &str,
        parameters: Vec<KineticParameter>,
    ) -> Result<Self, KineticModelError> {
        let template = Expr::parse(template)?;
        let mut variables = template.identifiers();

        for parameter in &parameters {
            if !variables.remove(&parameter.name) {
                return Err(KineticModelError::ParameterNotInTemplate(
                    parameter.name.clone(),
                ));
            }
        }

        Ok(Self {
            name: name.into(),
            template,
            parameters,
            variables,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free variables of the template, in sorted order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(String::as_str)
    }

    pub fn parameters(&self) -> &[KineticParameter] {
        &self.parameters
    }

    /// Instantiates the template.
    ///
    /// # Arguments
    ///
    /// * `bindings` - Species per free variable. Lists are rendered as `(a * b * c)`.
    /// * `mapping` - Renames parameters, e.g. `k_m` to `K_glucose`.
    ///
    /// # Errors
    ///
    /// * `KineticModelError::UnboundVariable` if a free variable has no binding
    /// * `KineticModelError::UnknownVariable` if a binding names no free variable
    /// * `KineticModelError::UnknownParameterOverride` if a mapping key is not a parameter
    /// * `KineticModelError::ParameterNameCollision` if a mapping target is the name of
    ///   another parameter, a free variable or a bound species
    pub fn generate(
        &self,
        bindings: &HashMap<String, Binding>,
        mapping: &HashMap<String, String>,
    ) -> Result<KineticModel, KineticModelError> {
        for variable in bindings.keys() {
            if !self.variables.contains(variable) {
                return Err(KineticModelError::UnknownVariable(variable.clone()));
            }
        }

        for parameter in mapping.keys() {
            if !self.parameters.iter().any(|p| &p.name == parameter) {
                return Err(KineticModelError::UnknownParameterOverride(
                    parameter.clone(),
                ));
            }
        }

        let renamed: Vec<&str> = self
            .parameters
            .iter()
            .map(|p| mapping.get(&p.name).unwrap_or(&p.name).as_str())
            .collect();

        for (old, new) in mapping {
            let collides = self.variables.contains(new)
                || bindings.values().any(|binding| binding.contains(new))
                || renamed.iter().filter(|name| **name == new.as_str()).count() > 1;

            if collides {
                return Err(KineticModelError::ParameterNameCollision {
                    parameter: old.clone(),
                    target: new.clone(),
                });
            }
        }

        let mut replacements = HashMap::new();
        for variable in &self.variables {
            let expr = bindings
                .get(variable)
                .and_then(Binding::to_expr)
                .ok_or_else(|| {
                    KineticModelError::UnboundVariable(
                        variable.clone(),
                        self.variables.iter().cloned().collect::<Vec<_>>().join(", "),
                    )
                })?;
            replacements.insert(variable.as_str(), expr);
        }

        for (old, new) in mapping {
            replacements.insert(old.as_str(), Expr::Ident(new.clone()));
        }

        let equation = self
            .template
            .substitute(&|name: &str| replacements.get(name).cloned());

        let parameters = self
            .parameters
            .iter()
            .map(|parameter| {
                let mut parameter = parameter.clone();
                if let Some(new) = mapping.get(&parameter.name) {
                    parameter.name = new.clone();
                }
                parameter
            })
            .collect();

        Ok(KineticModel {
            name: self.name.clone(),
            equation: equation.to_string(),
            parameters,
        })
    }
}

fn parameter(name: &str) -> KineticParameter {
    KineticParameter {
        name: name.to_string(),
        ..Default::default()
    }
}

/// Reversible mass-action kinetics, `k_f * educts - k_r * products`.
pub fn mass_action() -> ModelGenerator {
    build_predefined(
        "Mass Action Rate Law",
        "k_f * educts - k_r * products",
        &["k_f", "k_r"],
    )
}

/// Henri-Michaelis-Menten kinetics in k_cat form.
pub fn michaelis_menten() -> ModelGenerator {
    build_predefined(
        "Michaelis-Menten Rate Law",
        "k_cat * protein * substrate / (k_m + substrate)",
        &["k_cat", "k_m"],
    )
}

/// Henri-Michaelis-Menten kinetics in v_max form.
pub fn michaelis_menten_vmax() -> ModelGenerator {
    build_predefined(
        "Michaelis-Menten Rate Law",
        "vmax * substrate / (k_m + substrate)",
        &["vmax", "k_m"],
    )
}

fn build_predefined(name: &str, template: &str, parameters: &[&str]) -> ModelGenerator {
    ModelGenerator::new(name, template, parameters.iter().map(|p| parameter(p)).collect())
        .expect("Predefined rate law templates are valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bindings(pairs: &[(&str, Binding)]) -> HashMap<String, Binding> {
        pairs
            .iter()
            .map(|(name, binding)| (name.to_string(), binding.clone()))
            .collect()
    }

    #[test]
    fn test_michaelis_menten() {
        // Arrange
        let generator = michaelis_menten();

        // Act
        let model = generator
            .generate(
                &bindings(&[("protein", "p0".into()), ("substrate", "s0".into())]),
                &HashMap::new(),
            )
            .expect("Failed to generate model");

        // Assert
        assert_eq!(model.equation, "k_cat * p0 * s0 / (k_m + s0)");
        assert_eq!(model.name, "Michaelis-Menten Rate Law");
        assert_eq!(
            model.parameters.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["k_cat", "k_m"]
        );
    }

    #[test]
    fn test_list_binding_and_mapping() {
        let generator = mass_action();
        let mapping = HashMap::from([("k_f".to_string(), "k_on".to_string())]);

        let model = generator
            .generate(
                &bindings(&[
                    ("educts", vec!["s0", "p0"].into()),
                    ("products", "c0".into()),
                ]),
                &mapping,
            )
            .expect("Failed to generate model");

        assert_eq!(model.equation, "k_on * (s0 * p0) - k_r * c0");
        assert_eq!(model.parameters[0].name, "k_on");
        assert_eq!(model.parameters[1].name, "k_r");
    }

    #[test]
    fn test_generator_is_pure() {
        let generator = michaelis_menten_vmax();
        let first = generator
            .generate(&bindings(&[("substrate", "s0".into())]), &HashMap::new())
            .unwrap();
        let second = generator
            .generate(&bindings(&[("substrate", "s1".into())]), &HashMap::new())
            .unwrap();
        let third = generator
            .generate(&bindings(&[("substrate", "s0".into())]), &HashMap::new())
            .unwrap();

        assert_eq!(first, third);
        assert_eq!(second.equation, "vmax * s1 / (k_m + s1)");
    }

    #[test]
    fn test_substitution_does_not_touch_substrings() {
        let generator = ModelGenerator::new("Test", "k * S + k * SS", vec![parameter("k")])
            .expect("Failed to create generator");

        let model = generator
            .generate(
                &bindings(&[("S", "s0".into()), ("SS", "s1".into())]),
                &HashMap::new(),
            )
            .unwrap();

        assert_eq!(model.equation, "k * s0 + k * s1");
    }

    #[test]
    fn test_mapping_onto_another_parameter_is_rejected() {
        // Arrange
        let generator = michaelis_menten();
        let mapping = HashMap::from([("k_cat".to_string(), "k_m".to_string())]);

        // Act
        let result = generator.generate(
            &bindings(&[("protein", "p0".into()), ("substrate", "s0".into())]),
            &mapping,
        );

        // Assert
        assert_eq!(
            result,
            Err(KineticModelError::ParameterNameCollision {
                parameter: "k_cat".to_string(),
                target: "k_m".to_string(),
            })
        );
    }

    #[test]
    fn test_mapping_onto_a_variable_or_species_is_rejected() {
        let generator = michaelis_menten();
        let bound = bindings(&[("protein", "p0".into()), ("substrate", "s0".into())]);

        for target in ["s0", "substrate"] {
            let mapping = HashMap::from([("k_cat".to_string(), target.to_string())]);

            let result = generator.generate(&bound, &mapping);

            assert!(matches!(
                result,
                Err(KineticModelError::ParameterNameCollision { target: ref name, .. }) if name == target
            ));
        }
    }

    #[test]
    fn test_swapping_parameter_names_is_allowed() {
        let generator = michaelis_menten();
        let mapping = HashMap::from([
            ("k_cat".to_string(), "k_m".to_string()),
            ("k_m".to_string(), "k_cat".to_string()),
        ]);

        let model = generator
            .generate(
                &bindings(&[("protein", "p0".into()), ("substrate", "s0".into())]),
                &mapping,
            )
            .unwrap();

        assert_eq!(model.equation, "k_m * p0 * s0 / (k_cat + s0)");
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            ModelGenerator::new("Test", "k * S", vec![parameter("kcat")]),
            Err(KineticModelError::ParameterNotInTemplate("kcat".to_string()))
        );

        let generator = michaelis_menten();
        let result = generator.generate(&bindings(&[("protein", "p0".into())]), &HashMap::new());
        assert!(matches!(
            result,
            Err(KineticModelError::UnboundVariable(ref name, _)) if name == "substrate"
        ));

        let result = generator.generate(
            &bindings(&[
                ("protein", "p0".into()),
                ("substrate", "s0".into()),
                ("inhibitor", "s1".into()),
            ]),
            &HashMap::new(),
        );
        assert_eq!(
            result,
            Err(KineticModelError::UnknownVariable("inhibitor".to_string()))
        );

        let result = generator.generate(
            &bindings(&[("protein", "p0".into()), ("substrate", "s0".into())]),
            &HashMap::from([("vmax".to_string(), "V".to_string())]),
        );
        assert_eq!(
            result,
            Err(KineticModelError::UnknownParameterOverride("vmax".to_string()))
        );
    }
}
