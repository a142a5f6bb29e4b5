//! EnzymeML v2 object model.
//!
//! The types in this module describe a single enzymatic experiment: the vessels it
//! was conducted in, the species involved, the reactions that connect them, kinetic
//! models attached to those reactions and the time-course measurements taken.
//!
//! Every quantity carries a unit reference (the id of a [`UnitDefinition`] held by
//! the document's unit registry) instead of an inline unit. Entities are created
//! empty-handed by the caller and receive their identifiers from the document on
//! insertion, see [`crate::document`].

use derive_builder::Builder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use variantly::Variantly;

use crate::store::EntityStore;
use crate::units::registry::UnitRegistry;

//
// Type definitions
//

/// The EnzymeMLDocument is the root object that serves as a container
/// for all components of an enzymatic experiment. It includes
/// essential metadata about the document itself, such as its
/// title and creation/modification dates, as well as references to
/// related publications. Additionally, it owns the unit registry,
/// the entity store (vessels and species), reactions, measurements
/// and global parameters.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct EnzymeMLDocument {
    /// Title of the EnzymeML Document.
    #[builder(setter(into))]
    pub name: String,

    /// The version of the EnzymeML Document.
    #[serde(default = "default_version")]
    #[builder(default = "default_version()", setter(into))]
    pub version: String,

    /// Description of the EnzymeML Document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub description: Option<String>,

    /// Date the EnzymeML Document was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub created: Option<String>,

    /// Date the EnzymeML Document was modified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub modified: Option<String>,

    /// Digital object identifier of the referenced publication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub doi: Option<String>,

    /// PubMed identifier of the referenced publication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub pubmed_id: Option<String>,

    /// Arbitrary link to the web.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub url: Option<String>,

    /// Contains descriptions of all authors that are part of the experiment.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_creators")))]
    pub creators: Vec<Creator>,

    /// Registry of all unit definitions referenced by quantities in the document.
    #[serde(default)]
    #[builder(default, setter(skip))]
    pub(crate) units: UnitRegistry,

    /// Vessels and species of the document.
    #[serde(flatten)]
    #[builder(default, setter(skip))]
    pub(crate) store: EntityStore,

    /// Reactions of the experiment.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(skip))]
    pub(crate) reactions: Vec<Reaction>,

    /// Measurements of the experiment.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(skip))]
    pub(crate) measurements: Vec<Measurement>,

    /// Parameters shared by name across the kinetic models of several reactions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(skip))]
    pub(crate) global_parameters: Vec<KineticParameter>,
}

pub(crate) fn default_version() -> String {
    "2.0".to_string()
}

/// The Creator object represents an individual author or contributor who
/// has participated in creating or modifying the EnzymeML Document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct Creator {
    /// Given name of the author or contributor.
    #[builder(setter(into))]
    pub given_name: String,

    /// Family name of the author or contributor.
    #[builder(setter(into))]
    pub family_name: String,

    /// Email address of the author or contributor.
    #[builder(setter(into))]
    pub mail: String,
}

/// The Vessel object represents containers used to conduct experiments,
/// such as reaction vessels, microplates, or bioreactors.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct Vessel {
    /// Unique identifier of the vessel. Left empty to have one assigned.
    #[serde(default)]
    #[builder(default, setter(into))]
    pub id: String,

    /// Name of the used vessel.
    #[builder(setter(into))]
    pub name: String,

    /// Volumetric value of the vessel.
    #[builder(setter(into))]
    pub volume: f64,

    /// Volumetric unit of the vessel. Either a unit id or a unit expression
    /// that is resolved on insertion.
    #[builder(setter(into))]
    pub unit: String,

    /// Whether the volume of the vessel is constant or not. Default is True.
    #[serde(default = "default_true")]
    #[builder(default = "true", setter(into))]
    pub constant: bool,
}

fn default_true() -> bool {
    true
}

/// A chemical entity that can take part in reactions and measurements.
///
/// All species share a common set of fields. What distinguishes a small molecule from
/// a protein or a complex lives in the [`SpeciesKind`] payload.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, PartialEq)]
pub struct Species {
    /// Unique identifier of the species. Left empty to have one assigned.
    #[serde(default)]
    #[builder(default, setter(into))]
    pub id: String,

    /// Name of the species.
    #[builder(setter(into))]
    pub name: String,

    /// Identifier of the vessel this species resides in.
    #[builder(setter(into))]
    pub vessel_id: String,

    /// Whether the concentration of the species is constant through the experiment.
    #[serde(default)]
    #[builder(default, setter(into))]
    pub constant: bool,

    /// Initial concentration of the species.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub init_conc: Option<f64>,

    /// Unit of the initial concentration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub unit: Option<String>,

    /// Kind specific information.
    #[builder(setter(into))]
    pub kind: SpeciesKind,
}

impl Species {
    /// Starts a small molecule living in the given vessel.
    pub fn small_molecule(name: impl Into<String>, vessel_id: impl Into<String>) -> SpeciesBuilder {
        let mut builder = SpeciesBuilder::default();
        builder
            .name(name)
            .vessel_id(vessel_id)
            .kind(SpeciesKind::SmallMolecule(SmallMolecule::default()));
        builder
    }

    /// Starts a protein living in the given vessel. Proteins are constant by default.
    pub fn protein(
        name: impl Into<String>,
        vessel_id: impl Into<String>,
        sequence: impl Into<String>,
    ) -> SpeciesBuilder {
        let mut builder = SpeciesBuilder::default();
        builder
            .name(name)
            .vessel_id(vessel_id)
            .constant(true)
            .kind(SpeciesKind::Protein(Protein {
                sequence: sequence.into(),
                ..Default::default()
            }));
        builder
    }

    /// Starts a complex made of the given participants.
    pub fn complex<I, S>(name: impl Into<String>, vessel_id: impl Into<String>, participants: I) -> SpeciesBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builder = SpeciesBuilder::default();
        builder
            .name(name)
            .vessel_id(vessel_id)
            .kind(SpeciesKind::Complex(Complex {
                participants: participants.into_iter().map(Into::into).collect(),
            }));
        builder
    }

    /// Returns the SBO term that classifies this species.
    pub fn ontology(&self) -> &'static str {
        self.kind.ontology()
    }

    /// Returns the participants if the species is a complex.
    pub fn participants(&self) -> Option<&[String]> {
        match &self.kind {
            SpeciesKind::Complex(complex) => Some(&complex.participants),
            _ => None,
        }
    }
}

/// Kind specific payload of a [`Species`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Variantly)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpeciesKind {
    SmallMolecule(SmallMolecule),
    Protein(Protein),
    Complex(Complex),
}

impl SpeciesKind {
    /// Returns the SBO term of the kind.
    pub fn ontology(&self) -> &'static str {
        match self {
            SpeciesKind::SmallMolecule(_) => "SBO:0000247",
            SpeciesKind::Protein(_) => "SBO:0000252",
            SpeciesKind::Complex(_) => "SBO:0000296",
        }
    }
}

/// Small chemical compounds that participate in the experiment as substrates,
/// products, or modifiers.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct SmallMolecule {
    /// Canonical Simplified Molecular-Input Line-Entry System (SMILES)
    /// encoding of the small molecule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub canonical_smiles: Option<String>,

    /// International Chemical Identifier (InChI) encoding of the small
    /// molecule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub inchi: Option<String>,

    /// Hashed International Chemical Identifier (InChIKey) encoding of the
    /// small molecule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub inchikey: Option<String>,

    /// ChEBI identifier of the small molecule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub chebi_id: Option<String>,

    /// List of synonymous names for the small molecule.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_synonymous_names")))]
    pub synonymous_names: Vec<String>,

    /// References to publications, database entries, etc.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_references")))]
    pub references: Vec<String>,
}

/// Enzymes and other proteins involved in the experiment.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct Protein {
    /// Amino acid sequence of the protein
    #[builder(setter(into))]
    pub sequence: String,

    /// EC number of the protein.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub ecnumber: Option<String>,

    /// Expression host organism of the protein.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub organism: Option<String>,

    /// Taxonomy identifier of the expression host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub organism_tax_id: Option<String>,

    /// UniProt accession of the protein.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub uniprot_id: Option<String>,

    /// References to publications, database entries, etc.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_references")))]
    pub references: Vec<String>,
}

/// Groups multiple species into one, e.g. an enzyme-substrate complex.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct Complex {
    /// Ordered identifiers of the species the complex is made of.
    #[builder(default, setter(into, each(name = "to_participants")))]
    pub participants: Vec<String>,
}

/// The Reaction object represents a chemical or enzymatic reaction and
/// holds the different species and modifiers that are part of the
/// reaction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct Reaction {
    /// Unique identifier of the reaction. Left empty to have one assigned.
    #[serde(default)]
    #[builder(default, setter(into))]
    pub id: String,

    /// Name of the reaction.
    #[builder(setter(into))]
    pub name: String,

    /// Whether the reaction is reversible or irreversible.
    #[builder(default, setter(into))]
    pub reversible: bool,

    /// Species consumed by the reaction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_educts")))]
    pub educts: Vec<ReactionElement>,

    /// Species produced by the reaction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_products")))]
    pub products: Vec<ReactionElement>,

    /// Species that are not part of the reaction but influence it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_modifiers")))]
    pub modifiers: Vec<ModifierElement>,

    /// Rate law of the reaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub model: Option<KineticModel>,
}

/// A species participating in a reaction together with its stoichiometry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct ReactionElement {
    /// Internal identifier of a species defined in the document.
    #[builder(setter(into))]
    pub species_id: String,

    /// Float number representing the associated stoichiometry.
    #[serde(default = "default_stoichiometry")]
    #[builder(default = "1.0", setter(into))]
    pub stoichiometry: f64,
}

fn default_stoichiometry() -> f64 {
    1.0
}

/// The ModifierElement object represents a species that is not part of
/// the reaction but influences it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct ModifierElement {
    /// Internal identifier of a species defined in the document.
    #[builder(setter(into))]
    pub species_id: String,

    /// Role of the modifier in the reaction.
    #[serde(default)]
    #[builder(default, setter(into))]
    pub role: ModifierRole,
}

/// A rate law with named, unit-bearing parameters.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct KineticModel {
    /// Name of the kinetic law.
    #[builder(setter(into))]
    pub name: String,

    /// Rate equation over species identifiers and parameter names.
    #[builder(setter(into))]
    pub equation: String,

    /// Parameters appearing in the equation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_parameters")))]
    pub parameters: Vec<KineticParameter>,
}

/// This object describes parameters used in kinetic models, including
/// estimated values, bounds, and associated uncertainties.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct KineticParameter {
    /// Name of the parameter, as used in equations.
    #[builder(setter(into))]
    pub name: String,

    /// Numerical value of the estimated parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub value: Option<f64>,

    /// Unit of the estimated parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub unit: Option<String>,

    /// Initial value that was used for the parameter estimation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub initial_value: Option<f64>,

    /// Upper bound of the estimated parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub upper: Option<f64>,

    /// Lower bound of the estimated parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub lower: Option<f64>,

    /// Specifies if this parameter is a global parameter.
    #[serde(default)]
    #[builder(default, setter(into))]
    pub is_global: bool,

    /// Specifies if this parameter is constant.
    #[serde(default)]
    #[builder(default, setter(into))]
    pub constant: bool,

    /// Standard deviation of the estimated parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub stdev: Option<f64>,
}

/// This object describes a single measurement, which includes time
/// course data for the species involved in the experiment.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct Measurement {
    /// Unique identifier of the measurement. Left empty to have one assigned.
    #[serde(default)]
    #[builder(default, setter(into))]
    pub id: String,

    /// Name of the measurement
    #[builder(setter(into))]
    pub name: String,

    /// Temperature of the measurement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub temperature: Option<f64>,

    /// Unit of the temperature of the measurement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub temperature_unit: Option<String>,

    /// pH value of the measurement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(into, strip_option))]
    pub ph: Option<f64>,

    /// Measurement data of all species that were part of the measurement.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_species_data")))]
    pub species_data: Vec<MeasurementData>,
}

/// Initial concentration and raw data of a single species within a measurement.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct MeasurementData {
    /// The identifier for the described species.
    #[builder(setter(into))]
    pub species_id: String,

    /// Initial concentration of the species.
    #[builder(setter(into))]
    pub init_conc: f64,

    /// Unit of the initial concentration.
    #[builder(setter(into))]
    pub unit: String,

    /// Raw time courses of the species.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_replicates")))]
    pub replicates: Vec<Replicate>,
}

/// A single raw time course of one species.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct Replicate {
    /// Unique identifier of the replicate. Left empty to have one assigned.
    #[serde(default)]
    #[builder(default, setter(into))]
    pub id: String,

    /// Identifier of the measured species.
    #[builder(setter(into))]
    pub species_id: String,

    /// Type of data that was measured.
    #[serde(default)]
    #[builder(default, setter(into))]
    pub data_type: DataTypes,

    /// Unit of the time points.
    #[builder(setter(into))]
    pub time_unit: String,

    /// Unit of the data points.
    #[builder(setter(into))]
    pub data_unit: String,

    /// Time points of the time course.
    #[serde(default)]
    #[builder(default, setter(into))]
    pub time: Vec<f64>,

    /// Measured values, one per time point.
    #[serde(default)]
    #[builder(default, setter(into))]
    pub data: Vec<f64>,

    /// Whether the data has been calculated (e.g. simulated) rather than measured.
    #[serde(default)]
    #[builder(default, setter(into))]
    pub is_calculated: bool,
}

/// Represents a unit definition that is based on the SI unit system.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct UnitDefinition {
    /// Unique identifier of the unit definition.
    #[builder(setter(into))]
    pub id: String,

    /// Expression the unit was registered with.
    #[builder(setter(into))]
    pub name: String,

    /// Base units that define the unit.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default, setter(into, each(name = "to_base_units")))]
    pub base_units: Vec<BaseUnit>,
}

/// Represents a base unit in the unit definition.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Builder, Default, PartialEq)]
pub struct BaseUnit {
    /// Kind of the base unit (e.g., metre, gram, second).
    #[builder(setter(into))]
    pub kind: UnitType,

    /// Exponent of the base unit in the unit definition.
    #[builder(setter(into))]
    pub exponent: i64,

    /// Decimal scale of the base unit (e.g. -3 for milli).
    #[serde(default)]
    #[builder(default, setter(into))]
    pub scale: i64,

    /// Multiplier of the base unit (e.g. 60 for minutes).
    #[serde(default = "default_multiplier")]
    #[builder(default = "1.0", setter(into))]
    pub multiplier: f64,
}

fn default_multiplier() -> f64 {
    1.0
}

//
// Enum definitions
//
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
pub enum ModifierRole {
    #[serde(rename = "activator")]
    Activator,

    #[serde(rename = "additive")]
    Additive,

    #[serde(rename = "biocatalyst")]
    Biocatalyst,

    #[serde(rename = "buffer")]
    Buffer,

    #[default]
    #[serde(rename = "catalyst")]
    Catalyst,

    #[serde(rename = "inhibitor")]
    Inhibitor,

    #[serde(rename = "solvent")]
    Solvent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
pub enum DataTypes {
    #[serde(rename = "absorbance")]
    Absorbance,

    #[serde(rename = "amount")]
    Amount,

    #[default]
    #[serde(rename = "concentration")]
    Concentration,

    #[serde(rename = "conversion")]
    Conversion,

    #[serde(rename = "fluorescence")]
    Fluorescence,

    #[serde(rename = "peakarea")]
    PeakArea,

    #[serde(rename = "transmittance")]
    Transmittance,

    #[serde(rename = "turnover")]
    Turnover,

    #[serde(rename = "yield")]
    Yield,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq, Hash)]
pub enum UnitType {
    #[serde(rename = "celsius")]
    Celsius,

    #[default]
    #[serde(rename = "dimensionless")]
    Dimensionless,

    #[serde(rename = "gram")]
    Gram,

    #[serde(rename = "kelvin")]
    Kelvin,

    #[serde(rename = "litre")]
    Litre,

    #[serde(rename = "metre")]
    Metre,

    #[serde(rename = "mole")]
    Mole,

    #[serde(rename = "second")]
    Second,
}
