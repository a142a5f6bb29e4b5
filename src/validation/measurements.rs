use std::collections::HashSet;

use crate::versions::v2::{DataTypes, EnzymeMLDocument, MeasurementData, Replicate};

use super::consistency::{get_species_ids, Report, ValidationResult};

/// Validates measurements in an EnzymeML document by checking:
/// - Referenced species exist in the document
/// - Each species has at most one data entry per measurement
/// - Replicates belong to the species of their measurement data
/// - Time and data vectors have consistent lengths
/// - Initial concentrations match the first data point at t=0
/// - Units are registered and consistent with the species unit
///
/// # Arguments
/// * `enzmldoc` - The EnzymeML document containing measurements to validate
/// * `report` - Validation report to add any validation errors to
pub(super) fn check_measurements(enzmldoc: &EnzymeMLDocument, report: &mut Report) {
    let all_species = get_species_ids(enzmldoc);

    for (meas_idx, measurement) in enzmldoc.measurements().iter().enumerate() {
        let meas_id = &measurement.id;

        if let Some(unit) = &measurement.temperature_unit {
            check_unit_defined(enzmldoc, report, meas_id, format!("/measurements/{meas_idx}"), unit);
        }

        let mut measured = HashSet::new();
        for (data_idx, meas_data) in measurement.species_data.iter().enumerate() {
            let location = format!("/measurements/{meas_idx}/species_data/{data_idx}");

            if !measured.insert(meas_data.species_id.as_str()) {
                report.add_result(ValidationResult::error(
                    location.clone(),
                    format!(
                        "Species '{}' has more than one data entry in this measurement.",
                        meas_data.species_id
                    ),
                    meas_id,
                ));
            }

            check_species_consistency(report, meas_id, &location, meas_data, &all_species);
            check_unit_defined(enzmldoc, report, meas_id, location.clone(), &meas_data.unit);
            check_species_unit(enzmldoc, report, meas_id, &location, meas_data);

            for (repl_idx, replicate) in meas_data.replicates.iter().enumerate() {
                let location = format!("{location}/replicates/{repl_idx}");

                check_replicate_species(report, meas_id, &location, meas_data, replicate);
                check_time_data_consistency(report, meas_id, &location, replicate);
                check_initial_concentration(report, meas_id, &location, meas_data, replicate);
                check_unit_defined(enzmldoc, report, meas_id, location.clone(), &replicate.time_unit);
                check_unit_defined(enzmldoc, report, meas_id, location.clone(), &replicate.data_unit);
                check_replicate_unit(enzmldoc, report, meas_id, &location, meas_data, replicate);
            }
        }
    }
}

/// Validates that the species of the measurement data exists in the document
fn check_species_consistency(
    report: &mut Report,
    meas_id: &str,
    location: &str,
    meas_data: &MeasurementData,
    all_species: &HashSet<&str>,
) {
    if !all_species.contains(meas_data.species_id.as_str()) {
        report.add_result(ValidationResult::error(
            location.to_string(),
            format!(
                "Species '{}' in measurement is not defined in the document.",
                meas_data.species_id
            ),
            meas_id,
        ));
    }
}

fn check_replicate_species(
    report: &mut Report,
    meas_id: &str,
    location: &str,
    meas_data: &MeasurementData,
    replicate: &Replicate,
) {
    if replicate.species_id != meas_data.species_id {
        report.add_result(ValidationResult::error(
            location.to_string(),
            format!(
                "Replicate '{}' measures species '{}' but is filed under '{}'.",
                replicate.id, replicate.species_id, meas_data.species_id
            ),
            meas_id,
        ));
    }
}

/// Validates that time and data vectors have matching lengths
fn check_time_data_consistency(
    report: &mut Report,
    meas_id: &str,
    location: &str,
    replicate: &Replicate,
) {
    let message = match (replicate.time.is_empty(), replicate.data.is_empty()) {
        (true, false) => format!("Time vector is missing for replicate '{}'.", replicate.id),
        (false, true) => format!("Data vector is missing for replicate '{}'.", replicate.id),
        _ if replicate.time.len() != replicate.data.len() => format!(
            "Data and time vectors have different lengths for replicate '{}'. \
            Got {} data points and {} time points.",
            replicate.id,
            replicate.data.len(),
            replicate.time.len()
        ),
        _ => return,
    };

    report.add_result(ValidationResult::error(location.to_string(), message, meas_id));
}

/// Warns if the first data point at t=0 deviates from the initial concentration.
///
/// Only applies to concentration data; skipped if the series does not start at t=0.
fn check_initial_concentration(
    report: &mut Report,
    meas_id: &str,
    location: &str,
    meas_data: &MeasurementData,
    replicate: &Replicate,
) {
    if replicate.data_type != DataTypes::Concentration {
        return;
    }

    let (Some(time), Some(first)) = (replicate.time.first(), replicate.data.first()) else {
        return;
    };

    if *time == 0.0 && *first != meas_data.init_conc {
        report.add_result(ValidationResult::warning(
            location.to_string(),
            format!(
                "Initial concentration does not match first data point at t=0 for species '{}'.",
                meas_data.species_id
            ),
            meas_id,
        ));
    }
}

fn check_unit_defined(
    enzmldoc: &EnzymeMLDocument,
    report: &mut Report,
    meas_id: &str,
    location: String,
    unit: &str,
) {
    if enzmldoc.unit(unit).is_none() {
        report.add_result(ValidationResult::error(
            location,
            format!("Unit '{unit}' is not defined in the document."),
            meas_id,
        ));
    }
}

/// Warns if the measurement data uses a different unit than its species.
fn check_species_unit(
    enzmldoc: &EnzymeMLDocument,
    report: &mut Report,
    meas_id: &str,
    location: &str,
    meas_data: &MeasurementData,
) {
    let Ok(species) = enzmldoc.species(&meas_data.species_id) else {
        return;
    };

    let Some(expected) = &species.unit else {
        return;
    };

    if !same_unit(enzmldoc, expected, &meas_data.unit) {
        report.add_result(ValidationResult::warning(
            location.to_string(),
            format!(
                "Inconsistent concentration units for species '{}': expected '{}', given '{}'.",
                species.id,
                enzmldoc.units().display_name(expected),
                enzmldoc.units().display_name(&meas_data.unit),
            ),
            meas_id,
        ));
    }
}

/// Warns if concentration replicates use a different unit than their measurement data.
fn check_replicate_unit(
    enzmldoc: &EnzymeMLDocument,
    report: &mut Report,
    meas_id: &str,
    location: &str,
    meas_data: &MeasurementData,
    replicate: &Replicate,
) {
    if replicate.data_type != DataTypes::Concentration {
        return;
    }

    if !same_unit(enzmldoc, &meas_data.unit, &replicate.data_unit) {
        report.add_result(ValidationResult::warning(
            location.to_string(),
            format!(
                "Inconsistent concentration units for replicate '{}': expected '{}', given '{}'.",
                replicate.id,
                enzmldoc.units().display_name(&meas_data.unit),
                enzmldoc.units().display_name(&replicate.data_unit),
            ),
            meas_id,
        ));
    }
}

/// Two unit references are the same if they are equal ids or share their base units.
fn same_unit(enzmldoc: &EnzymeMLDocument, a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }

    match (enzmldoc.unit(a), enzmldoc.unit(b)) {
        (Some(a), Some(b)) => a.base_units == b.base_units,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versions::v2::{
        MeasurementBuilder, MeasurementDataBuilder, ReplicateBuilder, Species, VesselBuilder,
    };

    fn document(time: Vec<f64>, data: Vec<f64>) -> EnzymeMLDocument {
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
        doc.add_species(
            Species::small_molecule("S1", "v0")
                .unit("mM")
                .build()
                .unwrap(),
        )
        .unwrap();

        let replicate = ReplicateBuilder::default()
            .species_id("s0")
            .time_unit("s")
            .data_unit("mM")
            .time(time)
            .data(data)
            .build()
            .unwrap();

        doc.add_measurement(
            MeasurementBuilder::default()
                .name("M1")
                .to_species_data(
                    MeasurementDataBuilder::default()
                        .species_id("s0")
                        .init_conc(1.0)
                        .unit("mM")
                        .to_replicates(replicate)
                        .build()
                        .unwrap(),
                )
                .build()
                .unwrap(),
        )
        .unwrap();

        doc
    }

    /// Test that a valid measurement is valid
    #[test]
    fn test_valid_measurement() {
        let mut report = Report::new();
        let doc = document(vec![0.0, 1.0], vec![1.0, 2.0]);

        check_measurements(&doc, &mut report);

        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }

    /// Test that a measurement of an undefined species is invalid
    #[test]
    fn test_invalid_measurement_undefined_species() {
        let mut report = Report::new();
        let mut doc = document(vec![0.0, 1.0], vec![1.0, 2.0]);
        doc.measurements[0].species_data[0].species_id = "s9".to_string();
        doc.measurements[0].species_data[0].replicates.clear();

        check_measurements(&doc, &mut report);

        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_duplicate_species_data_is_invalid() {
        let mut report = Report::new();
        let mut doc = document(vec![0.0, 1.0], vec![1.0, 2.0]);
        let mut duplicate = doc.measurements[0].species_data[0].clone();
        duplicate.replicates.clear();
        doc.measurements[0].species_data.push(duplicate);

        check_measurements(&doc, &mut report);

        assert!(!report.is_valid);
        assert!(report
            .errors
            .iter()
            .any(|e| e.location() == "/measurements/0/species_data/1"
                && e.message().contains("more than one data entry")));
    }

    /// Test that a replicate with inconsistent time and data vectors is invalid
    #[test]
    fn test_invalid_measurement_inconsistent_time_and_data_vectors() {
        let mut report = Report::new();
        let mut doc = document(vec![0.0, 1.0], vec![1.0, 2.0]);
        doc.measurements[0].species_data[0].replicates[0].data.push(3.0);

        check_measurements(&doc, &mut report);

        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].location(),
            "/measurements/0/species_data/0/replicates/0"
        );
    }

    /// Test that a replicate with a missing time vector is invalid
    #[test]
    fn test_invalid_measurement_missing_time_vector() {
        let mut report = Report::new();
        let mut doc = document(vec![0.0, 1.0], vec![1.0, 2.0]);
        doc.measurements[0].species_data[0].replicates[0].time.clear();

        check_measurements(&doc, &mut report);

        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
    }

    /// Test that a deviating first data point only warns
    #[test]
    fn test_initial_concentration_mismatch_warns() {
        let mut report = Report::new();
        let doc = document(vec![0.0, 1.0], vec![5.0, 2.0]);

        check_measurements(&doc, &mut report);

        assert!(report.is_valid);
        assert_eq!(report.errors.len(), 1);
    }

    /// Test that differing concentration units only warn
    #[test]
    fn test_inconsistent_units_warn() {
        let mut report = Report::new();
        let mut doc = document(vec![0.0, 1.0], vec![1.0, 2.0]);
        let molar = doc.resolve_unit("M").unwrap();
        doc.measurements[0].species_data[0].replicates[0].data_unit = molar;

        check_measurements(&doc, &mut report);

        assert!(report.is_valid);
        assert_eq!(report.errors.len(), 1);
    }

    /// Test that equivalent unit expressions are considered consistent
    #[test]
    fn test_equivalent_units_are_consistent() {
        let mut report = Report::new();
        let mut doc = document(vec![0.0, 1.0], vec![1.0, 2.0]);
        let equivalent = doc.resolve_unit("mmol / l").unwrap();
        doc.measurements[0].species_data[0].unit = equivalent;

        check_measurements(&doc, &mut report);

        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }
}
