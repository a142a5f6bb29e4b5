//! XML structures of the SBML-flavored document format.
//!
//! The structures mirror the subset of SBML Level 3 Version 2 needed to carry an
//! EnzymeML document: unit definitions, compartments, species, parameters and
//! reactions with kinetic laws. Everything SBML has no slot for lives in EnzymeML
//! annotations attached to the model, the species, the parameters and the modifiers.
//!
//! Measurement data is embedded inline in the data annotation of the model as
//! whitespace separated number lists.

use serde::{Deserialize, Serialize};

use crate::versions::v2::{DataTypes, ModifierRole, UnitType};

pub(crate) const SBML_L3V2_NS: &str = "http://www.sbml.org/sbml/level3/version2/core";
pub(crate) const ENZYMEML_V2_NS: &str = "https://www.enzymeml.org/v2";

fn default_xmlns() -> String {
    ENZYMEML_V2_NS.to_string()
}

fn default_true() -> bool {
    true
}

fn default_stoichiometry() -> f64 {
    1.0
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_dimensions() -> u8 {
    3
}

/// Root element of an SBML document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename = "sbml")]
pub struct SbmlDocument {
    #[serde(rename = "@xmlns", default)]
    pub xmlns: String,

    #[serde(rename = "@level")]
    pub level: u8,

    #[serde(rename = "@version")]
    pub version: u8,

    #[serde(rename = "model")]
    pub model: Model,
}

/// The model holding all components of the experiment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Model {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@name", default)]
    pub name: String,

    #[serde(rename = "annotation", default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<ModelAnnotation>,

    #[serde(
        rename = "listOfUnitDefinitions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub unit_definitions: Option<ListOfUnitDefinitions>,

    #[serde(
        rename = "listOfCompartments",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub compartments: Option<ListOfCompartments>,

    #[serde(rename = "listOfSpecies", default, skip_serializing_if = "Option::is_none")]
    pub species: Option<ListOfSpecies>,

    #[serde(
        rename = "listOfParameters",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub parameters: Option<ListOfParameters>,

    #[serde(
        rename = "listOfReactions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reactions: Option<ListOfReactions>,
}

//
// Units
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ListOfUnitDefinitions {
    #[serde(rename = "unitDefinition", default)]
    pub definitions: Vec<UnitDefinitionElement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnitDefinitionElement {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@name", default)]
    pub name: String,

    #[serde(rename = "listOfUnits", default, skip_serializing_if = "Option::is_none")]
    pub units: Option<ListOfUnits>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ListOfUnits {
    #[serde(rename = "unit", default)]
    pub units: Vec<UnitElement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnitElement {
    #[serde(rename = "@kind")]
    pub kind: UnitType,

    #[serde(rename = "@exponent")]
    pub exponent: i64,

    #[serde(rename = "@scale", default)]
    pub scale: i64,

    #[serde(rename = "@multiplier", default = "default_multiplier")]
    pub multiplier: f64,
}

//
// Compartments
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ListOfCompartments {
    #[serde(rename = "compartment", default)]
    pub compartments: Vec<Compartment>,
}

/// A vessel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Compartment {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@name", default)]
    pub name: String,

    #[serde(rename = "@spatialDimensions", default = "default_dimensions")]
    pub spatial_dimensions: u8,

    #[serde(rename = "@size")]
    pub size: f64,

    #[serde(rename = "@units")]
    pub units: String,

    #[serde(rename = "@constant", default = "default_true")]
    pub constant: bool,
}

//
// Species
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ListOfSpecies {
    #[serde(rename = "species", default)]
    pub species: Vec<SpeciesElement>,
}

/// A species of any kind. The kind is given by the SBO term.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeciesElement {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@name", default)]
    pub name: String,

    #[serde(rename = "@sboTerm")]
    pub sbo_term: String,

    #[serde(rename = "@compartment")]
    pub compartment: String,

    #[serde(
        rename = "@initialConcentration",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub initial_concentration: Option<f64>,

    #[serde(
        rename = "@substanceUnits",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub substance_units: Option<String>,

    #[serde(rename = "@hasOnlySubstanceUnits", default)]
    pub has_only_substance_units: bool,

    #[serde(rename = "@boundaryCondition", default)]
    pub boundary_condition: bool,

    #[serde(rename = "@constant", default)]
    pub constant: bool,

    #[serde(rename = "annotation", default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<SpeciesAnnotation>,
}

/// Kind specific payload of a species.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SpeciesAnnotation {
    #[serde(
        rename = "smallMolecule",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub small_molecule: Option<SmallMoleculeAnnot>,

    #[serde(rename = "protein", default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<ProteinAnnot>,

    #[serde(rename = "complex", default, skip_serializing_if = "Option::is_none")]
    pub complex: Option<ComplexAnnot>,
}

/// Chemical identifiers of a small molecule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SmallMoleculeAnnot {
    #[serde(rename = "@xmlns", default = "default_xmlns")]
    pub xmlns: String,

    #[serde(rename = "inchi", default, skip_serializing_if = "Option::is_none")]
    pub inchi: Option<String>,

    #[serde(rename = "inchiKey", default, skip_serializing_if = "Option::is_none")]
    pub inchikey: Option<String>,

    #[serde(rename = "smiles", default, skip_serializing_if = "Option::is_none")]
    pub canonical_smiles: Option<String>,

    #[serde(rename = "chebiId", default, skip_serializing_if = "Option::is_none")]
    pub chebi_id: Option<String>,

    #[serde(rename = "synonym", default)]
    pub synonymous_names: Vec<String>,

    #[serde(rename = "reference", default)]
    pub references: Vec<String>,
}

/// Biological information of a protein.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProteinAnnot {
    #[serde(rename = "@xmlns", default = "default_xmlns")]
    pub xmlns: String,

    #[serde(rename = "sequence", default)]
    pub sequence: String,

    #[serde(rename = "ecnumber", default, skip_serializing_if = "Option::is_none")]
    pub ecnumber: Option<String>,

    #[serde(rename = "organism", default, skip_serializing_if = "Option::is_none")]
    pub organism: Option<String>,

    #[serde(
        rename = "organismTaxId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub organism_tax_id: Option<String>,

    #[serde(rename = "uniprotId", default, skip_serializing_if = "Option::is_none")]
    pub uniprot_id: Option<String>,

    #[serde(rename = "reference", default)]
    pub references: Vec<String>,
}

/// Ordered participants of a complex.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComplexAnnot {
    #[serde(rename = "@xmlns", default = "default_xmlns")]
    pub xmlns: String,

    #[serde(rename = "participant", default)]
    pub participants: Vec<String>,
}

//
// Parameters
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ListOfParameters {
    #[serde(rename = "parameter", default)]
    pub parameters: Vec<ParameterElement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ListOfLocalParameters {
    #[serde(rename = "localParameter", default)]
    pub parameters: Vec<ParameterElement>,
}

/// A global or local parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterElement {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@value", default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    #[serde(rename = "@units", default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,

    #[serde(rename = "@constant", default)]
    pub constant: bool,

    #[serde(rename = "annotation", default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<ParameterAnnotation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ParameterAnnotation {
    #[serde(rename = "parameter", default)]
    pub parameter: ParameterAnnot,
}

/// Estimation metadata of a parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterAnnot {
    #[serde(rename = "@xmlns", default = "default_xmlns")]
    pub xmlns: String,

    #[serde(rename = "@isGlobal", default)]
    pub is_global: bool,

    #[serde(
        rename = "initialValue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub initial_value: Option<f64>,

    #[serde(
        rename = "lowerBound",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub lower_bound: Option<f64>,

    #[serde(
        rename = "upperBound",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub upper_bound: Option<f64>,

    #[serde(
        rename = "stdDeviation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub stdev: Option<f64>,
}

impl Default for ParameterAnnot {
    fn default() -> Self {
        Self {
            xmlns: default_xmlns(),
            is_global: false,
            initial_value: None,
            lower_bound: None,
            upper_bound: None,
            stdev: None,
        }
    }
}

impl ParameterAnnot {
    pub fn is_empty(&self) -> bool {
        !self.is_global
            && self.initial_value.is_none()
            && self.lower_bound.is_none()
            && self.upper_bound.is_none()
            && self.stdev.is_none()
    }
}

//
// Reactions
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ListOfReactions {
    #[serde(rename = "reaction", default)]
    pub reactions: Vec<ReactionElement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReactionElement {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@name", default)]
    pub name: String,

    #[serde(rename = "@reversible", default)]
    pub reversible: bool,

    #[serde(
        rename = "listOfReactants",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reactants: Option<ListOfSpeciesReferences>,

    #[serde(
        rename = "listOfProducts",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub products: Option<ListOfSpeciesReferences>,

    #[serde(
        rename = "listOfModifiers",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub modifiers: Option<ListOfModifiers>,

    #[serde(rename = "kineticLaw", default, skip_serializing_if = "Option::is_none")]
    pub kinetic_law: Option<KineticLaw>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ListOfSpeciesReferences {
    #[serde(rename = "speciesReference", default)]
    pub references: Vec<SpeciesReference>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeciesReference {
    #[serde(rename = "@species")]
    pub species: String,

    #[serde(rename = "@stoichiometry", default = "default_stoichiometry")]
    pub stoichiometry: f64,

    #[serde(rename = "@constant", default = "default_true")]
    pub constant: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ListOfModifiers {
    #[serde(rename = "modifierSpeciesReference", default)]
    pub modifiers: Vec<ModifierReference>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModifierReference {
    #[serde(rename = "@species")]
    pub species: String,

    #[serde(rename = "annotation", default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<ModifierAnnotation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModifierAnnotation {
    #[serde(rename = "modifier")]
    pub modifier: ModifierAnnot,
}

/// Role of a modifier in its reaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModifierAnnot {
    #[serde(rename = "@xmlns", default = "default_xmlns")]
    pub xmlns: String,

    #[serde(rename = "@modifierRole")]
    pub modifier_role: ModifierRole,
}

/// Rate law of a reaction in infix notation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KineticLaw {
    #[serde(rename = "@name", default)]
    pub name: String,

    #[serde(rename = "@formula")]
    pub formula: String,

    #[serde(
        rename = "listOfLocalParameters",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub parameters: Option<ListOfLocalParameters>,
}

//
// Model annotation
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelAnnotation {
    #[serde(rename = "enzymeml")]
    pub enzymeml: DocumentAnnot,
}

/// Document metadata and measurements.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentAnnot {
    #[serde(rename = "@xmlns", default = "default_xmlns")]
    pub xmlns: String,

    #[serde(rename = "@version")]
    pub version: String,

    #[serde(rename = "description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "created", default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    #[serde(rename = "modified", default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,

    #[serde(rename = "doi", default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,

    #[serde(rename = "pubmedId", default, skip_serializing_if = "Option::is_none")]
    pub pubmed_id: Option<String>,

    #[serde(rename = "url", default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(rename = "creator", default)]
    pub creators: Vec<CreatorAnnot>,

    #[serde(rename = "data", default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DataAnnot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatorAnnot {
    #[serde(rename = "@givenName")]
    pub given_name: String,

    #[serde(rename = "@familyName")]
    pub family_name: String,

    #[serde(rename = "@mail")]
    pub mail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DataAnnot {
    #[serde(rename = "measurement", default)]
    pub measurements: Vec<MeasurementAnnot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasurementAnnot {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@name", default)]
    pub name: String,

    #[serde(rename = "conditions", default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<ConditionsAnnot>,

    #[serde(rename = "speciesData", default)]
    pub species_data: Vec<SpeciesDataAnnot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ConditionsAnnot {
    #[serde(rename = "ph", default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<PHAnnot>,

    #[serde(
        rename = "temperature",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub temperature: Option<TemperatureAnnot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PHAnnot {
    #[serde(rename = "@value")]
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemperatureAnnot {
    #[serde(rename = "@value", default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    #[serde(rename = "@unit", default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeciesDataAnnot {
    #[serde(rename = "@species")]
    pub species_id: String,

    #[serde(rename = "@value")]
    pub init_conc: f64,

    #[serde(rename = "@unit")]
    pub unit: String,

    #[serde(rename = "replicate", default)]
    pub replicates: Vec<ReplicateAnnot>,
}

/// A raw time course. `time` and `data` are whitespace separated numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplicateAnnot {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@species")]
    pub species_id: String,

    #[serde(rename = "@type", default)]
    pub data_type: DataTypes,

    #[serde(rename = "@timeUnit")]
    pub time_unit: String,

    #[serde(rename = "@dataUnit")]
    pub data_unit: String,

    #[serde(rename = "@isCalculated", default)]
    pub is_calculated: bool,

    #[serde(rename = "time", default)]
    pub time: String,

    #[serde(rename = "data", default)]
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_protein_annotation() {
        let xml = r#"
        <annotation>
            <protein xmlns="https://www.enzymeml.org/v2">
                <sequence>MKLLVL</sequence>
                <ecnumber>1.1.1.1</ecnumber>
                <organism>E. coli</organism>
                <organismTaxId>511145</organismTaxId>
            </protein>
        </annotation>
        "#;

        let annotation: SpeciesAnnotation = quick_xml::de::from_str(xml).unwrap();
        let protein = annotation.protein.unwrap();

        assert_eq!(protein.sequence, "MKLLVL");
        assert_eq!(protein.ecnumber, Some("1.1.1.1".to_string()));
        assert_eq!(protein.organism_tax_id, Some("511145".to_string()));
        assert!(annotation.small_molecule.is_none());
    }

    #[test]
    fn test_parse_complex_annotation() {
        let xml = r#"
        <annotation>
            <complex xmlns="https://www.enzymeml.org/v2">
                <participant>p0</participant>
                <participant>s0</participant>
            </complex>
        </annotation>
        "#;

        let annotation: SpeciesAnnotation = quick_xml::de::from_str(xml).unwrap();
        let complex = annotation.complex.unwrap();

        assert_eq!(complex.participants, vec!["p0".to_string(), "s0".to_string()]);
    }

    #[test]
    fn test_parse_parameter_annotation() {
        let xml = r#"
        <annotation>
            <parameter xmlns="https://www.enzymeml.org/v2" isGlobal="true">
                <lowerBound>0.1</lowerBound>
                <upperBound>10.0</upperBound>
                <stdDeviation>0.5</stdDeviation>
            </parameter>
        </annotation>
        "#;

        let annotation: ParameterAnnotation = quick_xml::de::from_str(xml).unwrap();

        assert!(annotation.parameter.is_global);
        assert_eq!(annotation.parameter.lower_bound, Some(0.1));
        assert_eq!(annotation.parameter.upper_bound, Some(10.0));
        assert_eq!(annotation.parameter.stdev, Some(0.5));
    }
}
