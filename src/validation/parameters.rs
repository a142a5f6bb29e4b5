use crate::versions::v2::{EnzymeMLDocument, KineticParameter};

use super::consistency::{Report, Severity, ValidationResult};

/// Validates kinetic parameters in an EnzymeML document by checking:
/// - Parameters carry a registered unit
/// - Bounds are ordered and contain the value
/// - Local parameters shadowing a global parameter of the same name
///
/// # Arguments
/// * `enzmldoc` - The EnzymeML document containing parameters to validate
/// * `report` - Validation report to add any validation results to
pub(super) fn check_parameters(enzmldoc: &EnzymeMLDocument, report: &mut Report) {
    for (param_idx, parameter) in enzmldoc.global_parameters().iter().enumerate() {
        let location = format!("/global_parameters/{param_idx}");
        check_parameter(enzmldoc, report, &location, &parameter.name, parameter);
    }

    for (reaction_idx, reaction) in enzmldoc.reactions().iter().enumerate() {
        let Some(model) = &reaction.model else {
            continue;
        };

        for (param_idx, parameter) in model.parameters.iter().enumerate() {
            let location = format!("/reactions/{reaction_idx}/model/parameters/{param_idx}");
            check_parameter(enzmldoc, report, &location, &reaction.id, parameter);

            if enzmldoc.global_parameter(&parameter.name).is_some() {
                report.add_result(ValidationResult::new(
                    location,
                    format!(
                        "Parameter '{}' of reaction '{}' shadows the global parameter of the same name.",
                        parameter.name, reaction.id
                    ),
                    Severity::Info,
                    Some(reaction.id.clone()),
                ));
            }
        }
    }
}

fn check_parameter(
    enzmldoc: &EnzymeMLDocument,
    report: &mut Report,
    location: &str,
    identifier: &str,
    parameter: &KineticParameter,
) {
    check_parameter_unit(enzmldoc, report, location, identifier, parameter);
    check_parameter_bounds(report, location, identifier, parameter);
}

/// Validates that a parameter has a registered unit
///
/// A missing unit is only a warning, an unknown unit reference is an error.
fn check_parameter_unit(
    enzmldoc: &EnzymeMLDocument,
    report: &mut Report,
    location: &str,
    identifier: &str,
    parameter: &KineticParameter,
) {
    match &parameter.unit {
        None => report.add_result(ValidationResult::warning(
            location.to_string(),
            format!(
                "Parameter '{}' has no unit. It is advisable to equip parameters with a unit.",
                parameter.name
            ),
            identifier,
        )),
        Some(unit) if enzmldoc.unit(unit).is_none() => report.add_result(ValidationResult::error(
            location.to_string(),
            format!(
                "Unit '{unit}' of parameter '{}' is not defined in the document.",
                parameter.name
            ),
            identifier,
        )),
        Some(_) => {}
    }
}

fn check_parameter_bounds(
    report: &mut Report,
    location: &str,
    identifier: &str,
    parameter: &KineticParameter,
) {
    if let (Some(lower), Some(upper)) = (parameter.lower, parameter.upper) {
        if lower > upper {
            report.add_result(ValidationResult::error(
                location.to_string(),
                format!(
                    "Lower bound {lower} of parameter '{}' exceeds its upper bound {upper}.",
                    parameter.name
                ),
                identifier,
            ));
            return;
        }
    }

    let Some(value) = parameter.value else {
        return;
    };

    let below = parameter.lower.is_some_and(|lower| value < lower);
    let above = parameter.upper.is_some_and(|upper| value > upper);

    if below || above {
        report.add_result(ValidationResult::warning(
            location.to_string(),
            format!(
                "Value {value} of parameter '{}' lies outside of its bounds.",
                parameter.name
            ),
            identifier,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versions::v2::KineticParameterBuilder;

    /// Test that a parameter with no unit only warns
    #[test]
    fn test_parameter_no_unit() {
        let mut report = Report::new();
        let mut enzmldoc = EnzymeMLDocument::new("test");
        enzmldoc
            .add_global_parameter(KineticParameterBuilder::default().name("k").build().unwrap())
            .unwrap();

        check_parameters(&enzmldoc, &mut report);

        assert!(report.is_valid);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].severity(), &Severity::Warning);
    }

    #[test]
    fn test_inverted_bounds() {
        let mut report = Report::new();
        let mut enzmldoc = EnzymeMLDocument::new("test");
        enzmldoc
            .add_global_parameter(
                KineticParameterBuilder::default()
                    .name("k")
                    .unit("1 / s")
                    .lower(10.0)
                    .upper(1.0)
                    .build()
                    .unwrap(),
            )
            .unwrap();

        check_parameters(&enzmldoc, &mut report);

        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_value_outside_bounds() {
        let mut report = Report::new();
        let mut enzmldoc = EnzymeMLDocument::new("test");
        enzmldoc
            .add_global_parameter(
                KineticParameterBuilder::default()
                    .name("k")
                    .unit("1 / s")
                    .value(20.0)
                    .lower(0.0)
                    .upper(10.0)
                    .build()
                    .unwrap(),
            )
            .unwrap();

        check_parameters(&enzmldoc, &mut report);

        assert!(report.is_valid);
        assert_eq!(report.count(Severity::Warning), 1);
    }
}
