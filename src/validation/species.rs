use std::collections::{HashMap, HashSet};

use crate::versions::v2::{EnzymeMLDocument, Species};

use super::consistency::{get_species_ids, Report, ValidationResult};

/// Validates species by checking:
/// - The vessel a species resides in exists
/// - Units of initial concentrations are registered
/// - Complex participants exist and complexes do not contain themselves
pub(super) fn check_species(enzmldoc: &EnzymeMLDocument, report: &mut Report) {
    let all_species = get_species_ids(enzmldoc);

    for (idx, species) in enzmldoc.all_species().iter().enumerate() {
        check_vessel(enzmldoc, report, idx, species);
        check_unit(enzmldoc, report, idx, species);
        check_participants(report, idx, species, &all_species);
    }

    check_cycles(enzmldoc, report);
}

fn check_vessel(enzmldoc: &EnzymeMLDocument, report: &mut Report, idx: usize, species: &Species) {
    if enzmldoc.vessel(&species.vessel_id).is_err() {
        report.add_result(ValidationResult::error(
            format!("/species/{idx}"),
            format!(
                "Vessel '{}' of species '{}' is not defined in the document.",
                species.vessel_id, species.id
            ),
            &species.id,
        ));
    }
}

fn check_unit(enzmldoc: &EnzymeMLDocument, report: &mut Report, idx: usize, species: &Species) {
    let Some(unit) = &species.unit else {
        return;
    };

    if enzmldoc.unit(unit).is_none() {
        report.add_result(ValidationResult::error(
            format!("/species/{idx}"),
            format!(
                "Unit '{unit}' of species '{}' is not defined in the document.",
                species.id
            ),
            &species.id,
        ));
    }
}

fn check_participants(report: &mut Report, idx: usize, species: &Species, all_species: &HashSet<&str>) {
    let Some(participants) = species.participants() else {
        return;
    };

    if participants.is_empty() {
        report.add_result(ValidationResult::error(
            format!("/species/{idx}"),
            format!("Complex '{}' has no participants.", species.id),
            &species.id,
        ));
    }

    for participant in participants {
        if !all_species.contains(participant.as_str()) {
            report.add_result(ValidationResult::error(
                format!("/species/{idx}"),
                format!(
                    "Participant '{participant}' of complex '{}' is not defined in the document.",
                    species.id
                ),
                &species.id,
            ));
        }
    }
}

/// Reports every complex that reaches itself through its participants.
fn check_cycles(enzmldoc: &EnzymeMLDocument, report: &mut Report) {
    let graph = enzmldoc
        .complexes()
        .filter_map(|c| c.participants().map(|p| (c.id.as_str(), p)))
        .collect::<HashMap<_, _>>();

    for (idx, species) in enzmldoc.all_species().iter().enumerate() {
        let Some(participants) = graph.get(species.id.as_str()) else {
            continue;
        };

        let mut stack = participants.iter().map(String::as_str).collect::<Vec<_>>();
        let mut visited = HashSet::new();
        let mut cyclic = false;

        while let Some(id) = stack.pop() {
            if id == species.id {
                cyclic = true;
                break;
            }
            if visited.insert(id) {
                if let Some(next) = graph.get(id) {
                    stack.extend(next.iter().map(String::as_str));
                }
            }
        }

        if cyclic {
            report.add_result(ValidationResult::error(
                format!("/species/{idx}"),
                format!("Complex '{}' contains itself.", species.id),
                &species.id,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versions::v2::{SpeciesKind, VesselBuilder};

    fn document() -> EnzymeMLDocument {
        let mut doc = EnzymeMLDocument::new("Test");
        doc.add_vessel(
            VesselBuilder::default()
                .name("Cuvette")
                .volume(1.0)
                .unit("ml")
                .build()
                .unwrap(),
        )
        .unwrap();
        doc.add_species(Species::small_molecule("A", "v0").build().unwrap())
            .unwrap();
        doc.add_species(Species::complex("C", "v0", ["A"]).build().unwrap())
            .unwrap();
        doc
    }

    #[test]
    fn test_valid_species() {
        let mut report = Report::new();
        check_species(&document(), &mut report);
        assert!(report.is_valid);
    }

    #[test]
    fn test_missing_participant() {
        let mut report = Report::new();
        let mut doc = document();
        if let SpeciesKind::Complex(complex) = &mut doc.store.species[1].kind {
            complex.participants.push("s7".to_string());
        }

        check_species(&doc, &mut report);

        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_cyclic_complex() {
        let mut report = Report::new();
        let mut doc = document();
        if let SpeciesKind::Complex(complex) = &mut doc.store.species[1].kind {
            complex.participants.push("c0".to_string());
        }

        check_species(&doc, &mut report);

        assert!(!report.is_valid);
        assert_eq!(report.errors[0].message(), "Complex 'c0' contains itself.");
    }

    #[test]
    fn test_unregistered_unit() {
        let mut report = Report::new();
        let mut doc = document();
        doc.store.species[0].unit = Some("u42".to_string());

        check_species(&doc, &mut report);

        assert!(!report.is_valid);
        assert_eq!(report.filter_results("s0").len(), 1);
    }
}
