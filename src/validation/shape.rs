//! Static field layout of an EnzymeML document as seen by the validator.
//!
//! [`DOCUMENT_SHAPE`] declares, once, which fields every entity exposes to validation
//! and how they nest. Validation specs are checked against it, templates are generated
//! from it and the [`Validatable`] implementations below provide the values the walk
//! inspects. Identifiers are not part of the shape, they key the entities instead.

use std::borrow::Cow;

use lazy_static::lazy_static;

use crate::units::UnitRegistry;
use crate::versions::v2::{
    Creator, DataTypes, EnzymeMLDocument, KineticModel, KineticParameter, Measurement,
    MeasurementData, ModifierElement, ModifierRole, ReactionElement, Reaction, Replicate,
    Species, SpeciesKind, Vessel,
};

lazy_static! {
    /// Field layout of the whole document.
    pub static ref DOCUMENT_SHAPE: Shape = document_shape();
}

/// Type of a leaf value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Number,
    Boolean,
    TextList,
    NumberList,
}

/// A single field within a [`Shape`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldShape {
    /// A primitive value (or a list of them).
    Value {
        kind: ValueKind,
        description: &'static str,
    },
    /// A single, optional nested object.
    Object(Shape),
    /// A collection of entities keyed by their identifier.
    Collection(Shape),
}

/// The fields of one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Name of the entity type, used in templates.
    pub object: &'static str,
    pub fields: Vec<(&'static str, FieldShape)>,
}

impl Shape {
    pub fn field(&self, name: &str) -> Option<&FieldShape> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, shape)| shape)
    }
}

fn value(kind: ValueKind, description: &'static str) -> FieldShape {
    FieldShape::Value { kind, description }
}

fn document_shape() -> Shape {
    use ValueKind::*;

    Shape {
        object: "EnzymeMLDocument",
        fields: vec![
            ("name", value(Text, "Title of the EnzymeML Document.")),
            ("description", value(Text, "Description of the EnzymeML Document.")),
            ("created", value(Text, "Date the EnzymeML Document was created.")),
            ("modified", value(Text, "Date the EnzymeML Document was modified.")),
            ("doi", value(Text, "DOI of the referenced publication.")),
            ("pubmed_id", value(Text, "PubMed identifier of the referenced publication.")),
            ("url", value(Text, "Arbitrary link to the web.")),
            ("creators", FieldShape::Collection(creator_shape())),
            ("vessels", FieldShape::Collection(vessel_shape())),
            ("small_molecules", FieldShape::Collection(small_molecule_shape())),
            ("proteins", FieldShape::Collection(protein_shape())),
            ("complexes", FieldShape::Collection(complex_shape())),
            ("reactions", FieldShape::Collection(reaction_shape())),
            ("measurements", FieldShape::Collection(measurement_shape())),
            (
                "global_parameters",
                FieldShape::Collection(parameter_shape("GlobalParameter")),
            ),
        ],
    }
}

fn creator_shape() -> Shape {
    use ValueKind::*;

    Shape {
        object: "Creator",
        fields: vec![
            ("given_name", value(Text, "Given name of the author.")),
            ("family_name", value(Text, "Family name of the author.")),
            ("mail", value(Text, "Email address of the author.")),
        ],
    }
}

fn vessel_shape() -> Shape {
    use ValueKind::*;

    Shape {
        object: "Vessel",
        fields: vec![
            ("name", value(Text, "Name of the vessel.")),
            ("volume", value(Number, "Volumetric value of the vessel.")),
            ("unit", value(Text, "Volumetric unit of the vessel.")),
            ("constant", value(Boolean, "Whether the volume is constant.")),
        ],
    }
}

fn species_fields() -> Vec<(&'static str, FieldShape)> {
    use ValueKind::*;

    vec![
        ("name", value(Text, "Name of the species.")),
        ("vessel_id", value(Text, "Vessel the species resides in.")),
        ("constant", value(Boolean, "Whether the concentration is constant.")),
        ("init_conc", value(Number, "Initial concentration.")),
        ("unit", value(Text, "Unit of the initial concentration.")),
    ]
}

fn small_molecule_shape() -> Shape {
    use ValueKind::*;

    let mut fields = species_fields();
    fields.extend([
        ("canonical_smiles", value(Text, "Canonical SMILES encoding.")),
        ("inchi", value(Text, "InChI encoding.")),
        ("inchikey", value(Text, "Hashed InChI encoding.")),
        ("chebi_id", value(Text, "ChEBI identifier.")),
        ("synonymous_names", value(TextList, "Synonymous names.")),
        ("references", value(TextList, "References to publications or databases.")),
    ]);

    Shape {
        object: "SmallMolecule",
        fields,
    }
}

fn protein_shape() -> Shape {
    use ValueKind::*;

    let mut fields = species_fields();
    fields.extend([
        ("sequence", value(Text, "Amino acid sequence.")),
        ("ecnumber", value(Text, "EC number.")),
        ("organism", value(Text, "Expression host organism.")),
        ("organism_tax_id", value(Text, "Taxonomy identifier of the host.")),
        ("uniprot_id", value(Text, "UniProt accession.")),
        ("references", value(TextList, "References to publications or databases.")),
    ]);

    Shape {
        object: "Protein",
        fields,
    }
}

fn complex_shape() -> Shape {
    let mut fields = species_fields();
    fields.push((
        "participants",
        value(ValueKind::TextList, "Species the complex is made of."),
    ));

    Shape {
        object: "Complex",
        fields,
    }
}

fn element_shape() -> Shape {
    Shape {
        object: "ReactionElement",
        fields: vec![(
            "stoichiometry",
            value(ValueKind::Number, "Stoichiometric coefficient."),
        )],
    }
}

fn reaction_shape() -> Shape {
    use ValueKind::*;

    Shape {
        object: "Reaction",
        fields: vec![
            ("name", value(Text, "Name of the reaction.")),
            ("reversible", value(Boolean, "Whether the reaction is reversible.")),
            ("educts", FieldShape::Collection(element_shape())),
            ("products", FieldShape::Collection(element_shape())),
            (
                "modifiers",
                FieldShape::Collection(Shape {
                    object: "ModifierElement",
                    fields: vec![("role", value(Text, "Role of the modifier."))],
                }),
            ),
            ("model", FieldShape::Object(model_shape())),
        ],
    }
}

fn model_shape() -> Shape {
    use ValueKind::*;

    Shape {
        object: "KineticModel",
        fields: vec![
            ("name", value(Text, "Name of the kinetic law.")),
            ("equation", value(Text, "Rate equation.")),
            (
                "parameters",
                FieldShape::Collection(parameter_shape("KineticParameter")),
            ),
        ],
    }
}

fn parameter_shape(object: &'static str) -> Shape {
    use ValueKind::*;

    Shape {
        object,
        fields: vec![
            ("value", value(Number, "Estimated value.")),
            ("unit", value(Text, "Unit of the parameter.")),
            ("initial_value", value(Number, "Initial value of the estimation.")),
            ("upper", value(Number, "Upper bound.")),
            ("lower", value(Number, "Lower bound.")),
            ("constant", value(Boolean, "Whether the parameter is constant.")),
            ("stdev", value(Number, "Standard deviation of the estimate.")),
        ],
    }
}

fn measurement_shape() -> Shape {
    use ValueKind::*;

    Shape {
        object: "Measurement",
        fields: vec![
            ("name", value(Text, "Name of the measurement.")),
            ("temperature", value(Number, "Temperature of the measurement.")),
            ("temperature_unit", value(Text, "Unit of the temperature.")),
            ("ph", value(Number, "pH value of the measurement.")),
            (
                "species_data",
                FieldShape::Collection(Shape {
                    object: "MeasurementData",
                    fields: vec![
                        ("init_conc", value(Number, "Initial concentration.")),
                        ("unit", value(Text, "Unit of the initial concentration.")),
                        ("replicates", FieldShape::Collection(replicate_shape())),
                    ],
                }),
            ),
        ],
    }
}

fn replicate_shape() -> Shape {
    use ValueKind::*;

    Shape {
        object: "Replicate",
        fields: vec![
            ("data_type", value(Text, "Type of the measured data.")),
            ("time_unit", value(Text, "Unit of the time points.")),
            ("data_unit", value(Text, "Unit of the data points.")),
            ("time", value(NumberList, "Time points.")),
            ("data", value(NumberList, "Measured values.")),
            ("is_calculated", value(Boolean, "Whether the data was calculated.")),
        ],
    }
}

//
// Values
//

/// A leaf value handed to the field checks.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Missing,
    Text(Cow<'a, str>),
    Number(f64),
    Boolean(bool),
    Texts(&'a [String]),
    Numbers(&'a [f64]),
}

/// What a field of an entity resolves to during the walk.
pub enum Node<'a> {
    Value(FieldValue<'a>),
    /// A nested object, `None` if it is absent.
    Object(Option<&'a dyn Validatable>),
    /// Keyed child entities.
    Collection(Vec<(String, &'a dyn Validatable)>),
}

/// Gives the validator access to the fields declared in [`DOCUMENT_SHAPE`].
pub trait Validatable {
    /// Returns the node of `field`, or `None` if the entity has no such field.
    ///
    /// Unit references are reported by their expression rather than their id.
    fn node<'a>(&'a self, field: &str, units: &'a UnitRegistry) -> Option<Node<'a>>;
}

fn text(value: &str) -> FieldValue<'_> {
    FieldValue::Text(Cow::Borrowed(value))
}

fn optional_text(value: Option<&str>) -> FieldValue<'_> {
    value.map_or(FieldValue::Missing, text)
}

fn optional_number(value: Option<f64>) -> FieldValue<'static> {
    value.map_or(FieldValue::Missing, FieldValue::Number)
}

fn texts(values: &[String]) -> FieldValue<'_> {
    if values.is_empty() {
        FieldValue::Missing
    } else {
        FieldValue::Texts(values)
    }
}

fn numbers(values: &[f64]) -> FieldValue<'_> {
    if values.is_empty() {
        FieldValue::Missing
    } else {
        FieldValue::Numbers(values)
    }
}

fn unit<'a>(id: Option<&'a str>, units: &'a UnitRegistry) -> FieldValue<'a> {
    id.map_or(FieldValue::Missing, |id| text(units.display_name(id)))
}

fn keyed<'a, T, I, K>(items: I, key: K) -> Node<'a>
where
    T: Validatable + 'a,
    I: IntoIterator<Item = &'a T>,
    K: Fn(&'a T) -> String,
{
    Node::Collection(
        items
            .into_iter()
            .map(|item| (key(item), item as &dyn Validatable))
            .collect(),
    )
}

pub(crate) fn role_name(role: &ModifierRole) -> &'static str {
    match role {
        ModifierRole::Activator => "activator",
        ModifierRole::Additive => "additive",
        ModifierRole::Biocatalyst => "biocatalyst",
        ModifierRole::Buffer => "buffer",
        ModifierRole::Catalyst => "catalyst",
        ModifierRole::Inhibitor => "inhibitor",
        ModifierRole::Solvent => "solvent",
    }
}

pub(crate) fn data_type_name(data_type: &DataTypes) -> &'static str {
    match data_type {
        DataTypes::Absorbance => "absorbance",
        DataTypes::Amount => "amount",
        DataTypes::Concentration => "concentration",
        DataTypes::Conversion => "conversion",
        DataTypes::Fluorescence => "fluorescence",
        DataTypes::PeakArea => "peakarea",
        DataTypes::Transmittance => "transmittance",
        DataTypes::Turnover => "turnover",
        DataTypes::Yield => "yield",
    }
}

impl Validatable for EnzymeMLDocument {
    fn node<'a>(&'a self, field: &str, _units: &'a UnitRegistry) -> Option<Node<'a>> {
        let node = match field {
            "name" => Node::Value(text(&self.name)),
            "description" => Node::Value(optional_text(self.description.as_deref())),
            "created" => Node::Value(optional_text(self.created.as_deref())),
            "modified" => Node::Value(optional_text(self.modified.as_deref())),
            "doi" => Node::Value(optional_text(self.doi.as_deref())),
            "pubmed_id" => Node::Value(optional_text(self.pubmed_id.as_deref())),
            "url" => Node::Value(optional_text(self.url.as_deref())),
            "creators" => Node::Collection(
                self.creators
                    .iter()
                    .enumerate()
                    .map(|(index, creator)| (index.to_string(), creator as &dyn Validatable))
                    .collect(),
            ),
            "vessels" => keyed(self.store.vessels(), |v: &Vessel| v.id.clone()),
            "small_molecules" => keyed(self.store.small_molecules(), |s: &Species| s.id.clone()),
            "proteins" => keyed(self.store.proteins(), |s: &Species| s.id.clone()),
            "complexes" => keyed(self.store.complexes(), |s: &Species| s.id.clone()),
            "reactions" => keyed(&self.reactions, |r: &Reaction| r.id.clone()),
            "measurements" => keyed(&self.measurements, |m: &Measurement| m.id.clone()),
            "global_parameters" => {
                keyed(&self.global_parameters, |p: &KineticParameter| p.name.clone())
            }
            _ => return None,
        };

        Some(node)
    }
}

impl Validatable for Creator {
    fn node<'a>(&'a self, field: &str, _units: &'a UnitRegistry) -> Option<Node<'a>> {
        let value = match field {
            "given_name" => text(&self.given_name),
            "family_name" => text(&self.family_name),
            "mail" => text(&self.mail),
            _ => return None,
        };

        Some(Node::Value(value))
    }
}

impl Validatable for Vessel {
    fn node<'a>(&'a self, field: &str, units: &'a UnitRegistry) -> Option<Node<'a>> {
        let value = match field {
            "name" => text(&self.name),
            "volume" => FieldValue::Number(self.volume),
            "unit" => unit(Some(self.unit.as_str()), units),
            "constant" => FieldValue::Boolean(self.constant),
            _ => return None,
        };

        Some(Node::Value(value))
    }
}

impl Validatable for Species {
    fn node<'a>(&'a self, field: &str, units: &'a UnitRegistry) -> Option<Node<'a>> {
        let value = match (field, &self.kind) {
            ("name", _) => text(&self.name),
            ("vessel_id", _) => text(&self.vessel_id),
            ("constant", _) => FieldValue::Boolean(self.constant),
            ("init_conc", _) => optional_number(self.init_conc),
            ("unit", _) => unit(self.unit.as_deref(), units),

            ("canonical_smiles", SpeciesKind::SmallMolecule(m)) => {
                optional_text(m.canonical_smiles.as_deref())
            }
            ("inchi", SpeciesKind::SmallMolecule(m)) => optional_text(m.inchi.as_deref()),
            ("inchikey", SpeciesKind::SmallMolecule(m)) => optional_text(m.inchikey.as_deref()),
            ("chebi_id", SpeciesKind::SmallMolecule(m)) => optional_text(m.chebi_id.as_deref()),
            ("synonymous_names", SpeciesKind::SmallMolecule(m)) => texts(&m.synonymous_names),
            ("references", SpeciesKind::SmallMolecule(m)) => texts(&m.references),

            ("sequence", SpeciesKind::Protein(p)) => text(&p.sequence),
            ("ecnumber", SpeciesKind::Protein(p)) => optional_text(p.ecnumber.as_deref()),
            ("organism", SpeciesKind::Protein(p)) => optional_text(p.organism.as_deref()),
            ("organism_tax_id", SpeciesKind::Protein(p)) => {
                optional_text(p.organism_tax_id.as_deref())
            }
            ("uniprot_id", SpeciesKind::Protein(p)) => optional_text(p.uniprot_id.as_deref()),
            ("references", SpeciesKind::Protein(p)) => texts(&p.references),

            ("participants", SpeciesKind::Complex(c)) => texts(&c.participants),

            _ => return None,
        };

        Some(Node::Value(value))
    }
}

impl Validatable for Reaction {
    fn node<'a>(&'a self, field: &str, _units: &'a UnitRegistry) -> Option<Node<'a>> {
        let node = match field {
            "name" => Node::Value(text(&self.name)),
            "reversible" => Node::Value(FieldValue::Boolean(self.reversible)),
            "educts" => keyed(&self.educts, |e: &ReactionElement| e.species_id.clone()),
            "products" => keyed(&self.products, |e: &ReactionElement| e.species_id.clone()),
            "modifiers" => keyed(&self.modifiers, |m: &ModifierElement| m.species_id.clone()),
            "model" => Node::Object(self.model.as_ref().map(|m| m as &dyn Validatable)),
            _ => return None,
        };

        Some(node)
    }
}

impl Validatable for ReactionElement {
    fn node<'a>(&'a self, field: &str, _units: &'a UnitRegistry) -> Option<Node<'a>> {
        match field {
            "stoichiometry" => Some(Node::Value(FieldValue::Number(self.stoichiometry))),
            _ => None,
        }
    }
}

impl Validatable for ModifierElement {
    fn node<'a>(&'a self, field: &str, _units: &'a UnitRegistry) -> Option<Node<'a>> {
        match field {
            "role" => Some(Node::Value(text(role_name(&self.role)))),
            _ => None,
        }
    }
}

impl Validatable for KineticModel {
    fn node<'a>(&'a self, field: &str, _units: &'a UnitRegistry) -> Option<Node<'a>> {
        let node = match field {
            "name" => Node::Value(text(&self.name)),
            "equation" => Node::Value(text(&self.equation)),
            "parameters" => keyed(&self.parameters, |p: &KineticParameter| p.name.clone()),
            _ => return None,
        };

        Some(node)
    }
}

impl Validatable for KineticParameter {
    fn node<'a>(&'a self, field: &str, units: &'a UnitRegistry) -> Option<Node<'a>> {
        let value = match field {
            "value" => optional_number(self.value),
            "unit" => unit(self.unit.as_deref(), units),
            "initial_value" => optional_number(self.initial_value),
            "upper" => optional_number(self.upper),
            "lower" => optional_number(self.lower),
            "constant" => FieldValue::Boolean(self.constant),
            "stdev" => optional_number(self.stdev),
            _ => return None,
        };

        Some(Node::Value(value))
    }
}

impl Validatable for Measurement {
    fn node<'a>(&'a self, field: &str, units: &'a UnitRegistry) -> Option<Node<'a>> {
        let node = match field {
            "name" => Node::Value(text(&self.name)),
            "temperature" => Node::Value(optional_number(self.temperature)),
            "temperature_unit" => Node::Value(unit(self.temperature_unit.as_deref(), units)),
            "ph" => Node::Value(optional_number(self.ph)),
            "species_data" => keyed(&self.species_data, |d: &MeasurementData| d.species_id.clone()),
            _ => return None,
        };

        Some(node)
    }
}

impl Validatable for MeasurementData {
    fn node<'a>(&'a self, field: &str, units: &'a UnitRegistry) -> Option<Node<'a>> {
        let node = match field {
            "init_conc" => Node::Value(FieldValue::Number(self.init_conc)),
            "unit" => Node::Value(unit(Some(self.unit.as_str()), units)),
            "replicates" => keyed(&self.replicates, |r: &Replicate| r.id.clone()),
            _ => return None,
        };

        Some(node)
    }
}

impl Validatable for Replicate {
    fn node<'a>(&'a self, field: &str, units: &'a UnitRegistry) -> Option<Node<'a>> {
        let value = match field {
            "data_type" => text(data_type_name(&self.data_type)),
            "time_unit" => unit(Some(self.time_unit.as_str()), units),
            "data_unit" => unit(Some(self.data_unit.as_str()), units),
            "time" => numbers(&self.time),
            "data" => numbers(&self.data),
            "is_calculated" => FieldValue::Boolean(self.is_calculated),
            _ => return None,
        };

        Some(Node::Value(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_lookup() {
        let reactions = DOCUMENT_SHAPE.field("reactions").unwrap();
        let FieldShape::Collection(reaction) = reactions else {
            panic!("reactions should be a collection");
        };

        assert!(matches!(reaction.field("model"), Some(FieldShape::Object(_))));
        assert!(DOCUMENT_SHAPE.field("id").is_none());
        assert!(DOCUMENT_SHAPE.field("unknown").is_none());
    }

    #[test]
    fn test_every_document_field_is_exposed() {
        let doc = EnzymeMLDocument::new("Test");
        let units = UnitRegistry::default();

        for (field, _) in &DOCUMENT_SHAPE.fields {
            assert!(doc.node(field, &units).is_some(), "missing field '{field}'");
        }
    }

    #[test]
    fn test_species_fields_follow_kind() {
        let units = UnitRegistry::default();
        let protein = Species::protein("Enzyme", "v0", "MKV").build().unwrap();

        assert!(protein.node("sequence", &units).is_some());
        assert!(protein.node("inchi", &units).is_none());
        assert!(matches!(
            protein.node("init_conc", &units),
            Some(Node::Value(FieldValue::Missing))
        ));
    }
}
