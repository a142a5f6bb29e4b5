//! SBML Document Writer for EnzymeML Conversion
//!
//! This module converts EnzymeML documents to their SBML-flavored XML form. Entities
//! SBML has a native element for are mapped onto that element; everything else is
//! carried in EnzymeML annotations so that reading the XML back yields the same
//! document.
//!
//! ## Supported EnzymeML → SBML Mappings
//!
//! - **Units** → Unit definitions (ids are kept verbatim)
//! - **Vessels** → Compartments
//! - **Small molecules, proteins, complexes** → Species (SBO term plus kind annotation)
//! - **Global parameters** → Parameters
//! - **Reactions** → Reactions with kinetic laws and local parameters
//! - **Measurements** → Data annotation of the model, replicate data inline
//!
//! The document has to pass its integrity check before it is written.

use std::path::Path;

use log::debug;

use crate::sbml::error::SBMLError;
use crate::sbml::schema::{
    self, Compartment, ComplexAnnot, ConditionsAnnot, CreatorAnnot, DataAnnot, DocumentAnnot,
    KineticLaw, ListOfCompartments, ListOfLocalParameters, ListOfModifiers, ListOfParameters,
    ListOfReactions, ListOfSpecies, ListOfSpeciesReferences, ListOfUnitDefinitions, ListOfUnits,
    MeasurementAnnot, Model, ModelAnnotation, ModifierAnnot, ModifierAnnotation,
    ModifierReference, PHAnnot, ParameterAnnot, ParameterAnnotation, ParameterElement,
    ProteinAnnot, ReplicateAnnot, SbmlDocument, SmallMoleculeAnnot, SpeciesAnnotation,
    SpeciesDataAnnot, SpeciesElement, SpeciesReference, TemperatureAnnot, UnitDefinitionElement,
    UnitElement, ENZYMEML_V2_NS, SBML_L3V2_NS,
};
use crate::sbml::speciestype::SpeciesType;
use crate::versions::v2::{
    EnzymeMLDocument, KineticModel, KineticParameter, Measurement, Reaction, ReactionElement,
    Replicate, Species, SpeciesKind, UnitDefinition, Vessel,
};

const MODEL_ID: &str = "enzymeml";

/// Converts an EnzymeML document to an SBML XML string.
///
/// # Arguments
/// * `enzmldoc` - The EnzymeML document to convert
///
/// # Returns
/// * `Result<String, SBMLError>` - The XML document or a conversion error
///
/// # Errors
/// * `SBMLError::Document` if the document fails its integrity check
/// * `SBMLError::SerializeError` if the XML cannot be produced
pub fn to_sbml(enzmldoc: &EnzymeMLDocument) -> Result<String, SBMLError> {
    enzmldoc.check_integrity()?;

    let document = map_document(enzmldoc);
    let body = quick_xml::se::to_string(&document)?;

    debug!(
        "Serialized document '{}' to SBML ({} bytes)",
        enzmldoc.name,
        body.len()
    );

    Ok(format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{body}"
    ))
}

/// Writes an EnzymeML document as SBML XML to the given path.
pub fn write_sbml(enzmldoc: &EnzymeMLDocument, path: impl AsRef<Path>) -> Result<(), SBMLError> {
    let xml = to_sbml(enzmldoc)?;
    std::fs::write(path, xml)?;
    Ok(())
}

/// Maps the whole document onto the SBML structures.
fn map_document(enzmldoc: &EnzymeMLDocument) -> SbmlDocument {
    let units = enzmldoc.units().iter().map(map_unit_definition).collect::<Vec<_>>();
    let compartments = enzmldoc.vessels().iter().map(map_vessel).collect::<Vec<_>>();
    let species = enzmldoc.all_species().iter().map(map_species).collect::<Vec<_>>();
    let parameters = enzmldoc
        .global_parameters()
        .iter()
        .map(map_parameter)
        .collect::<Vec<_>>();
    let reactions = enzmldoc.reactions().iter().map(map_reaction).collect::<Vec<_>>();

    SbmlDocument {
        xmlns: SBML_L3V2_NS.to_string(),
        level: 3,
        version: 2,
        model: Model {
            id: MODEL_ID.to_string(),
            name: enzmldoc.name.clone(),
            annotation: Some(map_document_annotation(enzmldoc)),
            unit_definitions: non_empty(units).map(|definitions| ListOfUnitDefinitions { definitions }),
            compartments: non_empty(compartments).map(|compartments| ListOfCompartments { compartments }),
            species: non_empty(species).map(|species| ListOfSpecies { species }),
            parameters: non_empty(parameters).map(|parameters| ListOfParameters { parameters }),
            reactions: non_empty(reactions).map(|reactions| ListOfReactions { reactions }),
        },
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn map_unit_definition(definition: &UnitDefinition) -> UnitDefinitionElement {
    let units = definition
        .base_units
        .iter()
        .map(|base| UnitElement {
            kind: base.kind,
            exponent: base.exponent,
            scale: base.scale,
            multiplier: base.multiplier,
        })
        .collect::<Vec<_>>();

    UnitDefinitionElement {
        id: definition.id.clone(),
        name: definition.name.clone(),
        units: non_empty(units).map(|units| ListOfUnits { units }),
    }
}

/// Converts an EnzymeML vessel to an SBML compartment.
fn map_vessel(vessel: &Vessel) -> Compartment {
    Compartment {
        id: vessel.id.clone(),
        name: vessel.name.clone(),
        spatial_dimensions: 3,
        size: vessel.volume,
        units: vessel.unit.clone(),
        constant: vessel.constant,
    }
}

/// Converts a species of any kind to an SBML species.
///
/// The SBO term classifies the species, the annotation carries the kind specific
/// payload.
fn map_species(species: &Species) -> SpeciesElement {
    let species_type = SpeciesType::from(&species.kind);

    let annotation = match &species.kind {
        SpeciesKind::SmallMolecule(small_molecule) => SpeciesAnnotation {
            small_molecule: Some(SmallMoleculeAnnot {
                xmlns: ENZYMEML_V2_NS.to_string(),
                inchi: small_molecule.inchi.clone(),
                inchikey: small_molecule.inchikey.clone(),
                canonical_smiles: small_molecule.canonical_smiles.clone(),
                chebi_id: small_molecule.chebi_id.clone(),
                synonymous_names: small_molecule.synonymous_names.clone(),
                references: small_molecule.references.clone(),
            }),
            ..Default::default()
        },
        SpeciesKind::Protein(protein) => SpeciesAnnotation {
            protein: Some(ProteinAnnot {
                xmlns: ENZYMEML_V2_NS.to_string(),
                sequence: protein.sequence.clone(),
                ecnumber: protein.ecnumber.clone(),
                organism: protein.organism.clone(),
                organism_tax_id: protein.organism_tax_id.clone(),
                uniprot_id: protein.uniprot_id.clone(),
                references: protein.references.clone(),
            }),
            ..Default::default()
        },
        SpeciesKind::Complex(complex) => SpeciesAnnotation {
            complex: Some(ComplexAnnot {
                xmlns: ENZYMEML_V2_NS.to_string(),
                participants: complex.participants.clone(),
            }),
            ..Default::default()
        },
    };

    SpeciesElement {
        id: species.id.clone(),
        name: species.name.clone(),
        sbo_term: species_type.sbo_term().to_string(),
        compartment: species.vessel_id.clone(),
        initial_concentration: species.init_conc,
        substance_units: species.unit.clone(),
        has_only_substance_units: false,
        boundary_condition: false,
        constant: species.constant,
        annotation: Some(annotation),
    }
}

/// Converts a kinetic parameter. Estimation metadata goes into the annotation.
fn map_parameter(parameter: &KineticParameter) -> ParameterElement {
    let annot = ParameterAnnot {
        xmlns: ENZYMEML_V2_NS.to_string(),
        is_global: parameter.is_global,
        initial_value: parameter.initial_value,
        lower_bound: parameter.lower,
        upper_bound: parameter.upper,
        stdev: parameter.stdev,
    };

    ParameterElement {
        id: parameter.name.clone(),
        value: parameter.value,
        units: parameter.unit.clone(),
        constant: parameter.constant,
        annotation: (!annot.is_empty()).then_some(ParameterAnnotation { parameter: annot }),
    }
}

fn map_species_references(elements: &[ReactionElement]) -> Option<ListOfSpeciesReferences> {
    let references = elements
        .iter()
        .map(|element| SpeciesReference {
            species: element.species_id.clone(),
            stoichiometry: element.stoichiometry,
            constant: true,
        })
        .collect::<Vec<_>>();

    non_empty(references).map(|references| ListOfSpeciesReferences { references })
}

fn map_kinetic_law(model: &KineticModel) -> KineticLaw {
    let parameters = model.parameters.iter().map(map_parameter).collect::<Vec<_>>();

    KineticLaw {
        name: model.name.clone(),
        formula: model.equation.clone(),
        parameters: non_empty(parameters).map(|parameters| ListOfLocalParameters { parameters }),
    }
}

/// Converts an EnzymeML reaction to an SBML reaction.
fn map_reaction(reaction: &Reaction) -> schema::ReactionElement {
    let modifiers = reaction
        .modifiers
        .iter()
        .map(|modifier| ModifierReference {
            species: modifier.species_id.clone(),
            annotation: Some(ModifierAnnotation {
                modifier: ModifierAnnot {
                    xmlns: ENZYMEML_V2_NS.to_string(),
                    modifier_role: modifier.role,
                },
            }),
        })
        .collect::<Vec<_>>();

    schema::ReactionElement {
        id: reaction.id.clone(),
        name: reaction.name.clone(),
        reversible: reaction.reversible,
        reactants: map_species_references(&reaction.educts),
        products: map_species_references(&reaction.products),
        modifiers: non_empty(modifiers).map(|modifiers| ListOfModifiers { modifiers }),
        kinetic_law: reaction.model.as_ref().map(map_kinetic_law),
    }
}

/// Collects the document metadata and all measurements into the model annotation.
fn map_document_annotation(enzmldoc: &EnzymeMLDocument) -> ModelAnnotation {
    let creators = enzmldoc
        .creators
        .iter()
        .map(|creator| CreatorAnnot {
            given_name: creator.given_name.clone(),
            family_name: creator.family_name.clone(),
            mail: creator.mail.clone(),
        })
        .collect();

    let measurements = enzmldoc
        .measurements()
        .iter()
        .map(map_measurement)
        .collect::<Vec<_>>();

    ModelAnnotation {
        enzymeml: DocumentAnnot {
            xmlns: ENZYMEML_V2_NS.to_string(),
            version: enzmldoc.version.clone(),
            description: enzmldoc.description.clone(),
            created: enzmldoc.created.clone(),
            modified: enzmldoc.modified.clone(),
            doi: enzmldoc.doi.clone(),
            pubmed_id: enzmldoc.pubmed_id.clone(),
            url: enzmldoc.url.clone(),
            creators,
            data: non_empty(measurements).map(|measurements| DataAnnot { measurements }),
        },
    }
}

fn map_measurement(measurement: &Measurement) -> MeasurementAnnot {
    let temperature = match (measurement.temperature, &measurement.temperature_unit) {
        (None, None) => None,
        (value, unit) => Some(TemperatureAnnot {
            value,
            unit: unit.clone(),
        }),
    };

    let ph = measurement.ph.map(|value| PHAnnot { value });

    let conditions = match (&ph, &temperature) {
        (None, None) => None,
        _ => Some(ConditionsAnnot { ph, temperature }),
    };

    let species_data = measurement
        .species_data
        .iter()
        .map(|data| SpeciesDataAnnot {
            species_id: data.species_id.clone(),
            init_conc: data.init_conc,
            unit: data.unit.clone(),
            replicates: data.replicates.iter().map(map_replicate).collect(),
        })
        .collect();

    MeasurementAnnot {
        id: measurement.id.clone(),
        name: measurement.name.clone(),
        conditions,
        species_data,
    }
}

fn map_replicate(replicate: &Replicate) -> ReplicateAnnot {
    ReplicateAnnot {
        id: replicate.id.clone(),
        species_id: replicate.species_id.clone(),
        data_type: replicate.data_type,
        time_unit: replicate.time_unit.clone(),
        data_unit: replicate.data_unit.clone(),
        is_calculated: replicate.is_calculated,
        time: join_numbers(&replicate.time),
        data: join_numbers(&replicate.data),
    }
}

/// Renders numbers separated by single spaces. `f64` display output reads back exactly.
pub(crate) fn join_numbers(values: &[f64]) -> String {
    values
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versions::v2::VesselBuilder;

    #[test]
    fn test_join_numbers() {
        assert_eq!(join_numbers(&[0.0, 1.5, 10.0]), "0 1.5 10");
        assert_eq!(join_numbers(&[]), "");
    }

    #[test]
    fn test_vessel_becomes_compartment() {
        let mut doc = EnzymeMLDocument::new("Test");
        doc.add_vessel(
            VesselBuilder::default()
                .name("Cuvette")
                .volume(10.0)
                .unit("ml")
                .build()
                .unwrap(),
        )
        .unwrap();

        let xml = to_sbml(&doc).unwrap();

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<compartment id=\"v0\" name=\"Cuvette\""));
        assert!(xml.contains("<unitDefinition id=\"u0\" name=\"ml\">"));
    }

    #[test]
    fn test_species_carry_sbo_terms() {
        let mut doc = EnzymeMLDocument::new("Test");
        doc.add_vessel(
            VesselBuilder::default()
                .name("Cuvette")
                .volume(10.0)
                .unit("ml")
                .build()
                .unwrap(),
        )
        .unwrap();
        doc.add_species(Species::small_molecule("Substrate", "v0").build().unwrap())
            .unwrap();
        doc.add_species(Species::protein("Enzyme", "v0", "MKL").build().unwrap())
            .unwrap();

        let xml = to_sbml(&doc).unwrap();

        assert!(xml.contains("sboTerm=\"SBO:0000247\""));
        assert!(xml.contains("sboTerm=\"SBO:0000252\""));
        assert!(xml.contains("<sequence>MKL</sequence>"));
    }
}
