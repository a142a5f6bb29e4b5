//! Ordered, typed collections of the vessels and species of a document.
//!
//! The store hands out sequential identifiers per entity kind. Counters only ever
//! grow during a session, so an identifier that was handed out once is never handed
//! out again, even after the entity it named was removed.

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::versions::v2::{Measurement, Reaction, Species, SpeciesKind, Vessel};

/// The kinds of entities that receive generated identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Vessel,
    SmallMolecule,
    Protein,
    Complex,
    Reaction,
    Measurement,
    Replicate,
}

impl EntityKind {
    /// Identifier prefix of the kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::Vessel => "v",
            EntityKind::SmallMolecule => "s",
            EntityKind::Protein => "p",
            EntityKind::Complex => "c",
            EntityKind::Reaction => "r",
            EntityKind::Measurement => "m",
            EntityKind::Replicate => "repl",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Vessel => "vessel",
            EntityKind::SmallMolecule => "small molecule",
            EntityKind::Protein => "protein",
            EntityKind::Complex => "complex",
            EntityKind::Reaction => "reaction",
            EntityKind::Measurement => "measurement",
            EntityKind::Replicate => "replicate",
        };
        write!(f, "{name}")
    }
}

impl From<&SpeciesKind> for EntityKind {
    fn from(kind: &SpeciesKind) -> Self {
        match kind {
            SpeciesKind::SmallMolecule(_) => EntityKind::SmallMolecule,
            SpeciesKind::Protein(_) => EntityKind::Protein,
            SpeciesKind::Complex(_) => EntityKind::Complex,
        }
    }
}

/// Errors raised by lookups and insertions into the store
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// No entity matches the given id or name
    #[error("No {kind} with id or name '{key}'")]
    NotFound { kind: String, key: String },

    /// More than one entity carries the given name
    #[error("The name '{key}' matches more than one {kind}; use the id instead")]
    AmbiguousName { kind: String, key: String },

    /// The explicit id is already taken
    #[error("The identifier '{0}' is already in use")]
    DuplicateIdentifier(String),
}

/// Anything addressable by id or by name.
pub trait Identifiable {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

macro_rules! impl_identifiable {
    ($($t:ty),*) => {
        $(
            impl Identifiable for $t {
                fn id(&self) -> &str {
                    &self.id
                }

                fn name(&self) -> &str {
                    &self.name
                }
            }
        )*
    };
}

impl_identifiable!(Vessel, Species, Reaction, Measurement);

/// Finds the position of the candidate whose id equals `key` or, failing that, whose
/// name uniquely equals `key`.
pub(crate) fn locate<'a, T, I>(candidates: I, kind: &str, key: &str) -> Result<usize, StoreError>
where
    T: Identifiable + 'a,
    I: IntoIterator<Item = (usize, &'a T)>,
{
    let mut by_name = Vec::new();
    for (index, item) in candidates {
        if item.id() == key {
            return Ok(index);
        }
        if item.name() == key {
            by_name.push(index);
        }
    }

    match by_name.as_slice() {
        [] => Err(StoreError::NotFound {
            kind: kind.to_string(),
            key: key.to_string(),
        }),
        [index] => Ok(*index),
        _ => Err(StoreError::AmbiguousName {
            kind: kind.to_string(),
            key: key.to_string(),
        }),
    }
}

/// Monotonic per-kind counters used to generate identifiers.
///
/// Counters are not serialized. A fresh counter resumes after the highest numbered
/// identifier of its kind that is present, so a loaded document continues the
/// numbering of the one that was saved.
#[derive(Debug, Clone, Default)]
pub struct IdCounters {
    next: HashMap<EntityKind, usize>,
}

impl IdCounters {
    /// Returns the next free identifier of the given kind and advances the counter.
    ///
    /// `existing` holds the identifiers currently in use. Generated identifiers are
    /// greater than every numbered identifier of the kind among them.
    pub fn next_id<'a>(
        &mut self,
        kind: EntityKind,
        existing: impl IntoIterator<Item = &'a str>,
    ) -> String {
        let taken: HashSet<&str> = existing.into_iter().collect();
        let highest = taken.iter().filter_map(|id| id_index(kind, id)).max();

        let counter = self.next.entry(kind).or_default();
        if let Some(highest) = highest {
            *counter = (*counter).max(highest + 1);
        }

        loop {
            let candidate = format!("{}{}", kind.prefix(), counter);
            *counter += 1;
            if !taken.contains(candidate.as_str()) {
                return candidate;
            }
        }
    }

    /// Moves the counter past a removed identifier so it cannot be handed out again.
    pub fn retire(&mut self, kind: EntityKind, id: &str) {
        if let Some(index) = id_index(kind, id) {
            let counter = self.next.entry(kind).or_default();
            *counter = (*counter).max(index + 1);
        }
    }
}

/// Numeric suffix of an identifier carrying the prefix of `kind`.
fn id_index(kind: EntityKind, id: &str) -> Option<usize> {
    id.strip_prefix(kind.prefix())
        .filter(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|rest| rest.parse::<usize>().ok())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct EntityStore {
    /// Vessels used in the experiment.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) vessels: Vec<Vessel>,

    /// Species of all kinds, in insertion order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) species: Vec<Species>,

    #[serde(skip)]
    pub(crate) counters: IdCounters,
}

impl PartialEq for EntityStore {
    fn eq(&self, other: &Self) -> bool {
        self.vessels == other.vessels && self.species == other.species
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vessel, assigning the next vessel id if its id is empty.
    pub fn add_vessel(&mut self, mut vessel: Vessel) -> Result<String, StoreError> {
        vessel.id = self.claim_id(EntityKind::Vessel, vessel.id)?;
        let id = vessel.id.clone();

        debug!("Added vessel '{}' as '{}'", vessel.name, id);
        self.vessels.push(vessel);
        Ok(id)
    }

    /// Adds a species, assigning the next id of its kind if its id is empty.
    pub fn add_species(&mut self, mut species: Species) -> Result<String, StoreError> {
        let kind = EntityKind::from(&species.kind);
        species.id = self.claim_id(kind, species.id)?;
        let id = species.id.clone();

        debug!("Added {} '{}' as '{}'", kind, species.name, id);
        self.species.push(species);
        Ok(id)
    }

    pub fn vessel(&self, key: &str) -> Result<&Vessel, StoreError> {
        let index = locate(self.vessels.iter().enumerate(), "vessel", key)?;
        Ok(&self.vessels[index])
    }

    pub fn vessel_mut(&mut self, key: &str) -> Result<&mut Vessel, StoreError> {
        let index = locate(self.vessels.iter().enumerate(), "vessel", key)?;
        Ok(&mut self.vessels[index])
    }

    /// Looks up a species of any kind by id or unique name.
    pub fn species(&self, key: &str) -> Result<&Species, StoreError> {
        let index = locate(self.species.iter().enumerate(), "species", key)?;
        Ok(&self.species[index])
    }

    pub fn species_mut(&mut self, key: &str) -> Result<&mut Species, StoreError> {
        let index = locate(self.species.iter().enumerate(), "species", key)?;
        Ok(&mut self.species[index])
    }

    /// Looks up a species of a specific kind by id or unique name.
    pub fn species_of(&self, kind: EntityKind, key: &str) -> Result<&Species, StoreError> {
        let candidates = self
            .species
            .iter()
            .enumerate()
            .filter(|(_, species)| EntityKind::from(&species.kind) == kind);

        let index = locate(candidates, &kind.to_string(), key)?;
        Ok(&self.species[index])
    }

    pub fn vessels(&self) -> &[Vessel] {
        &self.vessels
    }

    pub fn all_species(&self) -> &[Species] {
        &self.species
    }

    pub fn small_molecules(&self) -> impl Iterator<Item = &Species> {
        self.species.iter().filter(|s| s.kind.is_small_molecule())
    }

    pub fn proteins(&self) -> impl Iterator<Item = &Species> {
        self.species.iter().filter(|s| s.kind.is_protein())
    }

    pub fn complexes(&self) -> impl Iterator<Item = &Species> {
        self.species.iter().filter(|s| s.kind.is_complex())
    }

    pub fn contains_species(&self, id: &str) -> bool {
        self.species.iter().any(|s| s.id == id)
    }

    pub fn contains_vessel(&self, id: &str) -> bool {
        self.vessels.iter().any(|v| v.id == id)
    }

    /// Removes a vessel by id. Reference checks are the caller's responsibility.
    pub(crate) fn remove_vessel(&mut self, id: &str) -> Option<Vessel> {
        let index = self.vessels.iter().position(|v| v.id == id)?;
        self.counters.retire(EntityKind::Vessel, id);
        Some(self.vessels.remove(index))
    }

    /// Removes a species by id. Reference checks are the caller's responsibility.
    pub(crate) fn remove_species(&mut self, id: &str) -> Option<Species> {
        let index = self.species.iter().position(|s| s.id == id)?;
        let species = self.species.remove(index);
        self.counters.retire(EntityKind::from(&species.kind), id);
        Some(species)
    }

    fn contains_id(&self, id: &str) -> bool {
        self.contains_vessel(id) || self.contains_species(id)
    }

    fn claim_id(&mut self, kind: EntityKind, id: String) -> Result<String, StoreError> {
        if id.is_empty() {
            let existing = self
                .vessels
                .iter()
                .map(|v| v.id.as_str())
                .chain(self.species.iter().map(|s| s.id.as_str()));
            return Ok(self.counters.next_id(kind, existing));
        }

        if self.contains_id(&id) {
            return Err(StoreError::DuplicateIdentifier(id));
        }

        Ok(id)
    }
}
