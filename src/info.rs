//! Information display module for EnzymeML documents
//!
//! This module provides functionality for displaying EnzymeML documents and their components
//! in a human-readable format. It implements the `Display` trait for `EnzymeMLDocument` and
//! provides helper functions to format various components as tables.

use std::{
    collections::BTreeSet,
    fmt::{self, Display},
};

use tabled::{builder::Builder, settings::Style};

use crate::prelude::{
    EnzymeMLDocument, KineticParameter, Measurement, Reaction, ReactionElement, Species,
    SpeciesKind, UnitRegistry, Vessel,
};

/// Trait for converting model components to table records
///
/// This trait defines methods that allow model components to be displayed
/// as rows in a formatted table. Implementors must provide column headers
/// and a way to convert their data to string values for each column.
/// Units are rendered through the registry of the document.
trait TableRecord {
    /// Get the column headers for the table
    fn columns() -> Vec<String>;

    /// Convert the instance to a record for display in a table
    fn to_record(&self, units: &UnitRegistry) -> Vec<String>;
}

impl Display for EnzymeMLDocument {
    /// Formats an EnzymeML document for display
    ///
    /// Creates a formatted table representation of the document, including all its
    /// components (vessels, species, reactions, measurements and global parameters)
    /// if they are present.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(vec![format!("EnzymeML Document: {}", self.name)]);

        let units = self.units();

        if !self.vessels().is_empty() {
            builder.push_record(vec!["Vessels"]);
            builder.push_record(vec![to_table(self.vessels(), units)]);
        }

        let small_molecules = self.small_molecules().cloned().collect::<Vec<_>>();
        if !small_molecules.is_empty() {
            builder.push_record(vec!["Small Molecules"]);
            builder.push_record(vec![to_table(&small_molecules, units)]);
        }

        let proteins = self.proteins().cloned().collect::<Vec<_>>();
        if !proteins.is_empty() {
            builder.push_record(vec!["Proteins"]);
            builder.push_record(vec![to_table(&proteins, units)]);
        }

        let complexes = self.complexes().cloned().collect::<Vec<_>>();
        if !complexes.is_empty() {
            builder.push_record(vec!["Complexes"]);
            builder.push_record(vec![to_table(&complexes, units)]);
        }

        if !self.reactions().is_empty() {
            builder.push_record(vec!["Reactions"]);
            builder.push_record(vec![to_table(self.reactions(), units)]);
        }

        if !self.measurements().is_empty() {
            builder.push_record(vec!["Measurements"]);
            builder.push_record(vec![measurement_table(self.measurements())]);
        }

        if !self.global_parameters().is_empty() {
            builder.push_record(vec!["Global Parameters"]);
            builder.push_record(vec![to_table(self.global_parameters(), units)]);
        }

        let mut table = builder.build();
        table.with(Style::sharp());
        write!(f, "{table}")
    }
}

/// Converts a collection of TableRecord implementors to a formatted table string
fn to_table<T: TableRecord>(records: &[T], units: &UnitRegistry) -> String {
    let mut builder = Builder::default();
    builder.push_record(T::columns());

    for record in records {
        builder.push_record(record.to_record(units));
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or("-".to_string())
}

fn optional_unit(unit: &Option<String>, units: &UnitRegistry) -> String {
    unit.as_deref()
        .map(|unit| units.display_name(unit).to_string())
        .unwrap_or("-".to_string())
}

impl TableRecord for Vessel {
    fn columns() -> Vec<String> {
        vec![
            "ID".to_string(),
            "Name".to_string(),
            "Volume".to_string(),
            "Unit".to_string(),
        ]
    }

    fn to_record(&self, units: &UnitRegistry) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.to_string(),
            self.volume.to_string(),
            units.display_name(&self.unit).to_string(),
        ]
    }
}

impl TableRecord for Species {
    /// Returns column headers for species tables
    ///
    /// # Returns
    /// * Vector of column names: ID, Name, Constant, Vessel ID, Initial, Unit, Details
    fn columns() -> Vec<String> {
        vec![
            "ID".to_string(),
            "Name".to_string(),
            "Constant".to_string(),
            "Vessel ID".to_string(),
            "Initial".to_string(),
            "Unit".to_string(),
            "Details".to_string(),
        ]
    }

    /// Converts a species to a table record
    ///
    /// The details column shows the kind specific key information: the InChIKey of a
    /// small molecule, the EC number of a protein or the participants of a complex.
    fn to_record(&self, units: &UnitRegistry) -> Vec<String> {
        let details = match &self.kind {
            SpeciesKind::SmallMolecule(small_molecule) => optional(small_molecule.inchikey.as_ref()),
            SpeciesKind::Protein(protein) => optional(protein.ecnumber.as_ref()),
            SpeciesKind::Complex(complex) => complex.participants.join(", "),
        };

        vec![
            self.id.to_string(),
            self.name.to_string(),
            self.constant.to_string(),
            self.vessel_id.to_string(),
            optional(self.init_conc),
            optional_unit(&self.unit, units),
            details,
        ]
    }
}

impl TableRecord for Reaction {
    /// Returns column headers for reaction tables
    ///
    /// # Returns
    /// * Vector of column names: ID, Name, Reversible, Scheme, Rate Law
    fn columns() -> Vec<String> {
        vec![
            "ID".to_string(),
            "Name".to_string(),
            "Reversible".to_string(),
            "Scheme".to_string(),
            "Rate Law".to_string(),
        ]
    }

    fn to_record(&self, _units: &UnitRegistry) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.to_string(),
            self.reversible.to_string(),
            self.reaction_scheme(),
            self.model
                .as_ref()
                .map(|model| model.equation.clone())
                .unwrap_or("-".to_string()),
        ]
    }
}

impl TableRecord for KineticParameter {
    /// Returns column headers for parameter tables
    ///
    /// # Returns
    /// * Vector of column names: Name, Value, Unit, Initial, Lower Bound, Upper Bound
    fn columns() -> Vec<String> {
        vec![
            "Name".to_string(),
            "Value".to_string(),
            "Unit".to_string(),
            "Initial".to_string(),
            "Lower Bound".to_string(),
            "Upper Bound".to_string(),
        ]
    }

    fn to_record(&self, units: &UnitRegistry) -> Vec<String> {
        vec![
            self.name.to_string(),
            optional(self.value),
            optional_unit(&self.unit, units),
            optional(self.initial_value),
            optional(self.lower),
            optional(self.upper),
        ]
    }
}

/// Creates a formatted table displaying measurement data for species
///
/// This function generates a table where:
/// - Each row represents a measurement
/// - Columns include measurement ID, name, and all measured species
/// - Cell values show initial concentrations for each species in each measurement
fn measurement_table(measurements: &[Measurement]) -> String {
    let measured_species = measurements
        .iter()
        .flat_map(|m| m.species_data.iter().map(|s| s.species_id.clone()))
        .collect::<BTreeSet<_>>();

    let mut builder = Builder::default();
    let mut header = vec!["id".to_string(), "name".to_string()];
    header.extend(measured_species.iter().cloned());
    builder.push_record(header);

    for measurement in measurements {
        let mut row = vec![measurement.id.to_string(), measurement.name.to_string()];

        for species_id in &measured_species {
            let value = measurement
                .species_data
                .iter()
                .find(|data| &data.species_id == species_id)
                .map_or("-".to_string(), |data| data.init_conc.to_string());

            row.push(value);
        }

        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

impl Reaction {
    /// Converts a reaction to a human-readable reaction scheme string
    ///
    /// Creates a formatted string representation of the reaction in the form:
    /// "educt1 + educt2 → product1 + product2" for irreversible reactions, or
    /// "educt1 + educt2 ⇄ product1 + product2" for reversible reactions.
    /// Stoichiometric coefficients other than one are written in front of the species.
    pub fn reaction_scheme(&self) -> String {
        let arrow = if self.reversible { "⇄" } else { "→" };
        format!(
            "{} {} {}",
            scheme_side(&self.educts),
            arrow,
            scheme_side(&self.products)
        )
    }
}

fn scheme_side(elements: &[ReactionElement]) -> String {
    elements
        .iter()
        .map(|element| {
            if element.stoichiometry == 1.0 {
                element.species_id.clone()
            } else {
                format!("{} {}", element.stoichiometry, element.species_id)
            }
        })
        .collect::<Vec<_>>()
        .join(" + ")
}
