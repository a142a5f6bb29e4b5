//! SBML Document Reader for EnzymeML Conversion
//!
//! This module reads the SBML-flavored XML produced by [`crate::sbml::writer`] back
//! into an [`EnzymeMLDocument`]. Identifiers are taken over verbatim, so reading a
//! written document yields a document equal to the one that was written.
//!
//! Species kinds are recovered from their SBO terms; the kind specific payload, the
//! parameter metadata and the measurements come from the EnzymeML annotations.

use std::path::Path;

use log::debug;

use crate::sbml::error::SBMLError;
use crate::sbml::schema::{
    self, DocumentAnnot, KineticLaw, ListOfSpeciesReferences, MeasurementAnnot, ParameterElement,
    ReplicateAnnot, SbmlDocument, SpeciesElement, UnitDefinitionElement,
};
use crate::sbml::speciestype::SpeciesType;
use crate::versions::v2::{
    default_version, BaseUnit, Complex, Creator, EnzymeMLDocument, KineticModel,
    KineticParameter, Measurement, MeasurementData, ModifierElement, Protein, Reaction,
    ReactionElement, Replicate, SmallMolecule, Species, SpeciesKind, UnitDefinition, Vessel,
};

/// Reads an EnzymeML document from an SBML XML string.
///
/// # Arguments
/// * `xml` - The SBML document
///
/// # Returns
/// * `Result<EnzymeMLDocument, SBMLError>` - The document or a conversion error
///
/// # Errors
/// * `SBMLError::DeserializeError` if the XML does not match the expected structure
/// * `SBMLError::InvalidSBOTerm` if a species carries an unknown SBO term
/// * `SBMLError::InvalidNumber` if replicate data cannot be read
pub fn from_sbml(xml: &str) -> Result<EnzymeMLDocument, SBMLError> {
    let sbml: SbmlDocument = quick_xml::de::from_str(xml)?;
    let model = sbml.model;

    let mut enzmldoc = EnzymeMLDocument::new(model.name);

    if let Some(annotation) = model.annotation {
        apply_document_annotation(&mut enzmldoc, annotation.enzymeml)?;
    }

    for definition in model.unit_definitions.unwrap_or_default().definitions {
        enzmldoc.units.insert(map_unit_definition(definition))?;
    }

    enzmldoc.store.vessels = model
        .compartments
        .unwrap_or_default()
        .compartments
        .into_iter()
        .map(|compartment| Vessel {
            id: compartment.id,
            name: compartment.name,
            volume: compartment.size,
            unit: compartment.units,
            constant: compartment.constant,
        })
        .collect();

    enzmldoc.store.species = model
        .species
        .unwrap_or_default()
        .species
        .into_iter()
        .map(map_species)
        .collect::<Result<_, _>>()?;

    enzmldoc.global_parameters = model
        .parameters
        .unwrap_or_default()
        .parameters
        .into_iter()
        .map(map_parameter)
        .collect();

    enzmldoc.reactions = model
        .reactions
        .unwrap_or_default()
        .reactions
        .into_iter()
        .map(map_reaction)
        .collect();

    debug!(
        "Read document '{}' from SBML: {} species, {} reactions, {} measurements",
        enzmldoc.name,
        enzmldoc.store.species.len(),
        enzmldoc.reactions.len(),
        enzmldoc.measurements.len()
    );

    Ok(enzmldoc)
}

/// Reads an EnzymeML document from an SBML file.
pub fn read_sbml(path: impl AsRef<Path>) -> Result<EnzymeMLDocument, SBMLError> {
    let xml = std::fs::read_to_string(path)?;
    from_sbml(&xml)
}

/// Takes over metadata and measurements from the model annotation.
fn apply_document_annotation(
    enzmldoc: &mut EnzymeMLDocument,
    annotation: DocumentAnnot,
) -> Result<(), SBMLError> {
    enzmldoc.version = if annotation.version.is_empty() {
        default_version()
    } else {
        annotation.version
    };
    enzmldoc.description = annotation.description;
    enzmldoc.created = annotation.created;
    enzmldoc.modified = annotation.modified;
    enzmldoc.doi = annotation.doi;
    enzmldoc.pubmed_id = annotation.pubmed_id;
    enzmldoc.url = annotation.url;
    enzmldoc.creators = annotation
        .creators
        .into_iter()
        .map(|creator| Creator {
            given_name: creator.given_name,
            family_name: creator.family_name,
            mail: creator.mail,
        })
        .collect();

    enzmldoc.measurements = annotation
        .data
        .unwrap_or_default()
        .measurements
        .into_iter()
        .map(map_measurement)
        .collect::<Result<_, _>>()?;

    Ok(())
}

fn map_unit_definition(definition: UnitDefinitionElement) -> UnitDefinition {
    UnitDefinition {
        id: definition.id,
        name: definition.name,
        base_units: definition
            .units
            .unwrap_or_default()
            .units
            .into_iter()
            .map(|unit| BaseUnit {
                kind: unit.kind,
                exponent: unit.exponent,
                scale: unit.scale,
                multiplier: unit.multiplier,
            })
            .collect(),
    }
}

/// Rebuilds a species from its SBO term and kind annotation.
fn map_species(element: SpeciesElement) -> Result<Species, SBMLError> {
    let species_type = SpeciesType::try_from(element.sbo_term.as_str())?;
    let annotation = element.annotation.unwrap_or_default();

    let missing = || SBMLError::MissingSpeciesAnnotation(element.id.clone(), species_type.to_string());

    let kind = match species_type {
        SpeciesType::SmallMolecule => {
            let annot = annotation.small_molecule.ok_or_else(missing)?;
            SpeciesKind::SmallMolecule(SmallMolecule {
                canonical_smiles: annot.canonical_smiles,
                inchi: annot.inchi,
                inchikey: annot.inchikey,
                chebi_id: annot.chebi_id,
                synonymous_names: annot.synonymous_names,
                references: annot.references,
            })
        }
        SpeciesType::Protein => {
            let annot = annotation.protein.ok_or_else(missing)?;
            SpeciesKind::Protein(Protein {
                sequence: annot.sequence,
                ecnumber: annot.ecnumber,
                organism: annot.organism,
                organism_tax_id: annot.organism_tax_id,
                uniprot_id: annot.uniprot_id,
                references: annot.references,
            })
        }
        SpeciesType::Complex => {
            let annot = annotation.complex.ok_or_else(missing)?;
            SpeciesKind::Complex(Complex {
                participants: annot.participants,
            })
        }
    };

    Ok(Species {
        id: element.id,
        name: element.name,
        vessel_id: element.compartment,
        constant: element.constant,
        init_conc: element.initial_concentration,
        unit: element.substance_units,
        kind,
    })
}

fn map_parameter(element: ParameterElement) -> KineticParameter {
    let annot = element.annotation.unwrap_or_default().parameter;

    KineticParameter {
        name: element.id,
        value: element.value,
        unit: element.units,
        initial_value: annot.initial_value,
        upper: annot.upper_bound,
        lower: annot.lower_bound,
        is_global: annot.is_global,
        constant: element.constant,
        stdev: annot.stdev,
    }
}

fn map_species_references(references: Option<ListOfSpeciesReferences>) -> Vec<ReactionElement> {
    references
        .unwrap_or_default()
        .references
        .into_iter()
        .map(|reference| ReactionElement {
            species_id: reference.species,
            stoichiometry: reference.stoichiometry,
        })
        .collect()
}

fn map_kinetic_law(law: KineticLaw) -> KineticModel {
    KineticModel {
        name: law.name,
        equation: law.formula,
        parameters: law
            .parameters
            .unwrap_or_default()
            .parameters
            .into_iter()
            .map(map_parameter)
            .collect(),
    }
}

fn map_reaction(element: schema::ReactionElement) -> Reaction {
    let modifiers = element
        .modifiers
        .unwrap_or_default()
        .modifiers
        .into_iter()
        .map(|modifier| ModifierElement {
            species_id: modifier.species,
            role: modifier
                .annotation
                .map(|annotation| annotation.modifier.modifier_role)
                .unwrap_or_default(),
        })
        .collect();

    Reaction {
        id: element.id,
        name: element.name,
        reversible: element.reversible,
        educts: map_species_references(element.reactants),
        products: map_species_references(element.products),
        modifiers,
        model: element.kinetic_law.map(map_kinetic_law),
    }
}

fn map_measurement(annotation: MeasurementAnnot) -> Result<Measurement, SBMLError> {
    let conditions = annotation.conditions.unwrap_or_default();
    let (temperature, temperature_unit) = match conditions.temperature {
        Some(temperature) => (temperature.value, temperature.unit),
        None => (None, None),
    };

    let species_data = annotation
        .species_data
        .into_iter()
        .map(|data| -> Result<MeasurementData, SBMLError> {
            Ok(MeasurementData {
                species_id: data.species_id,
                init_conc: data.init_conc,
                unit: data.unit,
                replicates: data
                    .replicates
                    .into_iter()
                    .map(map_replicate)
                    .collect::<Result<_, _>>()?,
            })
        })
        .collect::<Result<_, _>>()?;

    Ok(Measurement {
        id: annotation.id,
        name: annotation.name,
        temperature,
        temperature_unit,
        ph: conditions.ph.map(|ph| ph.value),
        species_data,
    })
}

fn map_replicate(annotation: ReplicateAnnot) -> Result<Replicate, SBMLError> {
    let time = parse_numbers(&annotation.id, &annotation.time)?;
    let data = parse_numbers(&annotation.id, &annotation.data)?;

    Ok(Replicate {
        id: annotation.id,
        species_id: annotation.species_id,
        data_type: annotation.data_type,
        time_unit: annotation.time_unit,
        data_unit: annotation.data_unit,
        time,
        data,
        is_calculated: annotation.is_calculated,
    })
}

/// Parses a whitespace separated number list.
pub(crate) fn parse_numbers(replicate: &str, text: &str) -> Result<Vec<f64>, SBMLError> {
    text.split_whitespace()
        .map(|value| {
            value.parse::<f64>().map_err(|_| SBMLError::InvalidNumber {
                replicate: replicate.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_numbers("repl0", " 0 1.5\n10 ").unwrap(), vec![0.0, 1.5, 10.0]);
        assert!(parse_numbers("repl0", "").unwrap().is_empty());
        assert!(matches!(
            parse_numbers("repl0", "0 one"),
            Err(SBMLError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_read_minimal_model() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <sbml xmlns="http://www.sbml.org/sbml/level3/version2/core" level="3" version="2">
            <model id="enzymeml" name="Minimal">
                <listOfUnitDefinitions>
                    <unitDefinition id="u0" name="ml">
                        <listOfUnits>
                            <unit kind="litre" exponent="1" scale="-3" multiplier="1"/>
                        </listOfUnits>
                    </unitDefinition>
                </listOfUnitDefinitions>
                <listOfCompartments>
                    <compartment id="v0" name="Cuvette" spatialDimensions="3" size="1" units="u0" constant="true"/>
                </listOfCompartments>
                <listOfSpecies>
                    <species id="s0" name="Substrate" sboTerm="SBO:0000247" compartment="v0"
                             hasOnlySubstanceUnits="false" boundaryCondition="false" constant="false">
                        <annotation>
                            <smallMolecule xmlns="https://www.enzymeml.org/v2">
                                <inchiKey>WQZGKKKJIJFFOK-GASJEMHNSA-N</inchiKey>
                            </smallMolecule>
                        </annotation>
                    </species>
                </listOfSpecies>
            </model>
        </sbml>
        "#;

        let doc = from_sbml(xml).unwrap();

        assert_eq!(doc.name, "Minimal");
        assert_eq!(doc.vessels()[0].unit, "u0");
        assert_eq!(doc.unit("u0").unwrap().base_units[0].scale, -3);

        let species = doc.species("s0").unwrap();
        assert_eq!(species.vessel_id, "v0");
        assert_eq!(
            species.kind,
            SpeciesKind::SmallMolecule(SmallMolecule {
                inchikey: Some("WQZGKKKJIJFFOK-GASJEMHNSA-N".to_string()),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_unknown_sbo_term() {
        let xml = r#"
        <sbml xmlns="http://www.sbml.org/sbml/level3/version2/core" level="3" version="2">
            <model id="enzymeml" name="Broken">
                <listOfSpecies>
                    <species id="s0" name="S" sboTerm="SBO:0000000" compartment="v0"/>
                </listOfSpecies>
            </model>
        </sbml>
        "#;

        assert!(matches!(from_sbml(xml), Err(SBMLError::InvalidSBOTerm(_))));
    }
}
