use std::collections::HashSet;

use crate::versions::v2::{EnzymeMLDocument, KineticModel, Reaction};

use super::consistency::{get_species_ids, Report, ValidationResult};

/// Validates reactions by checking:
/// - Educts, products and modifiers reference existing species
/// - Reactions have at least one educt and one product
/// - Kinetic laws parse and only use species, their own parameters or global parameters
pub(super) fn check_reactions(enzmldoc: &EnzymeMLDocument, report: &mut Report) {
    let all_species = get_species_ids(enzmldoc);

    for (reaction_idx, reaction) in enzmldoc.reactions().iter().enumerate() {
        check_reaction_species(report, reaction, &all_species, reaction_idx);
        check_reaction_sides(report, reaction, reaction_idx);

        if let Some(model) = &reaction.model {
            check_kinetic_model(enzmldoc, report, reaction, model, &all_species, reaction_idx);
        }
    }
}

fn check_reaction_species(
    report: &mut Report,
    reaction: &Reaction,
    all_species: &HashSet<&str>,
    reaction_idx: usize,
) {
    let elements = [
        ("educts", reaction.educts.iter().map(|e| &e.species_id).collect::<Vec<_>>()),
        ("products", reaction.products.iter().map(|e| &e.species_id).collect()),
        ("modifiers", reaction.modifiers.iter().map(|m| &m.species_id).collect()),
    ];

    for (side, species_ids) in elements {
        for (elem_idx, species_id) in species_ids.into_iter().enumerate() {
            if !all_species.contains(species_id.as_str()) {
                report.add_result(ValidationResult::error(
                    format!("/reactions/{reaction_idx}/{side}/{elem_idx}"),
                    format!("Species '{species_id}' in reaction is not defined in the document."),
                    &reaction.id,
                ));
            }
        }
    }
}

fn check_reaction_sides(report: &mut Report, reaction: &Reaction, reaction_idx: usize) {
    if reaction.educts.is_empty() || reaction.products.is_empty() {
        report.add_result(ValidationResult::warning(
            format!("/reactions/{reaction_idx}"),
            format!(
                "Reaction '{}' has no educts or no products.",
                reaction.id
            ),
            &reaction.id,
        ));
    }
}

fn check_kinetic_model(
    enzmldoc: &EnzymeMLDocument,
    report: &mut Report,
    reaction: &Reaction,
    model: &KineticModel,
    all_species: &HashSet<&str>,
    reaction_idx: usize,
) {
    let location = format!("/reactions/{reaction_idx}/model");

    let symbols = match model.symbols() {
        Ok(symbols) => symbols,
        Err(e) => {
            report.add_result(ValidationResult::error(
                location,
                format!("Kinetic law of reaction '{}' is invalid: {e}", reaction.id),
                &reaction.id,
            ));
            return;
        }
    };

    for symbol in symbols {
        let resolves = all_species.contains(symbol.as_str())
            || model.parameter(&symbol).is_some()
            || enzmldoc.global_parameter(&symbol).is_some();

        if !resolves {
            report.add_result(ValidationResult::error(
                location.clone(),
                format!(
                    "Symbol '{symbol}' in the kinetic law of reaction '{}' is neither a species nor a parameter.",
                    reaction.id
                ),
                &reaction.id,
            ));
        }
    }
}
