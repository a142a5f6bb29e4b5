//! Operations on the [`EnzymeMLDocument`] aggregate.
//!
//! All mutations go through the methods in this module so that the document stays
//! referentially consistent: every species, vessel and unit an entity points to exists,
//! complexes are acyclic, and entities that are still referenced cannot be removed.
//! Lookups accept either an identifier or a unique name.
//!
//! Every `add_*` method validates its input completely before touching the document,
//! so a failed call leaves the document unchanged.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::equation::parse_reaction;
use crate::store::{locate, EntityKind, StoreError};
use crate::units::{parse_unit, UnitRegistry};
use crate::validation::consistency::{check_consistency, Severity};
use crate::versions::v2::{
    default_version, Creator, EnzymeMLDocument, KineticModel, KineticParameter, Measurement,
    ModifierElement, ModifierRole, Reaction, ReactionElement, Replicate, Species, SpeciesKind,
    UnitDefinition, Vessel,
};

pub use error::DocumentError;

mod error;

impl EnzymeMLDocument {
    /// Creates an empty document with the given title.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: default_version(),
            ..Default::default()
        }
    }

    //
    // Units
    //

    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    pub fn unit(&self, id: &str) -> Option<&UnitDefinition> {
        self.units.get(id)
    }

    /// Resolves a unit expression (or a registered unit id) to a unit id.
    pub fn resolve_unit(&mut self, unit: &str) -> Result<String, DocumentError> {
        Ok(self.units.resolve_ref(unit)?)
    }

    /// Checks that a unit reference would resolve without registering it.
    fn check_unit(&self, unit: &str) -> Result<(), DocumentError> {
        if self.units.get(unit).is_some() || self.units.find_by_name(unit).is_some() {
            return Ok(());
        }
        parse_unit(unit)?;
        Ok(())
    }

    fn check_optional_unit(&self, unit: &Option<String>) -> Result<(), DocumentError> {
        match unit {
            Some(unit) => self.check_unit(unit),
            None => Ok(()),
        }
    }

    fn resolve_optional_unit(&mut self, unit: &mut Option<String>) -> Result<(), DocumentError> {
        if let Some(value) = unit {
            *value = self.units.resolve_ref(value)?;
        }
        Ok(())
    }

    //
    // Identifiers
    //

    /// Whether any vessel, species, reaction or measurement carries this id.
    pub fn contains_id(&self, id: &str) -> bool {
        self.store.contains_vessel(id)
            || self.store.contains_species(id)
            || self.reactions.iter().any(|r| r.id == id)
            || self.measurements.iter().any(|m| m.id == id)
    }

    fn check_explicit_id(&self, id: &str) -> Result<(), DocumentError> {
        if !id.is_empty() && self.contains_id(id) {
            return Err(DocumentError::DuplicateIdentifier(id.to_string()));
        }
        Ok(())
    }

    fn assign_id(&mut self, kind: EntityKind, id: String) -> String {
        if !id.is_empty() {
            return id;
        }

        let mut counters = std::mem::take(&mut self.store.counters);
        let existing = self
            .store
            .vessels()
            .iter()
            .map(|v| v.id.as_str())
            .chain(self.store.all_species().iter().map(|s| s.id.as_str()))
            .chain(self.reactions.iter().map(|r| r.id.as_str()))
            .chain(self.measurements.iter().map(|m| m.id.as_str()));
        let id = counters.next_id(kind, existing);
        self.store.counters = counters;
        id
    }

    fn replicate_id_taken(&self, id: &str) -> bool {
        self.measurements
            .iter()
            .flat_map(|m| &m.species_data)
            .flat_map(|d| &d.replicates)
            .any(|r| r.id == id)
    }

    //
    // Vessels
    //

    /// Adds a vessel and returns its id.
    ///
    /// The vessel's unit may be a registered unit id or a unit expression.
    pub fn add_vessel(&mut self, mut vessel: Vessel) -> Result<String, DocumentError> {
        self.check_explicit_id(&vessel.id)?;
        self.check_unit(&vessel.unit)?;

        vessel.unit = self.units.resolve_ref(&vessel.unit)?;
        vessel.id = self.assign_id(EntityKind::Vessel, vessel.id);
        Ok(self.store.add_vessel(vessel)?)
    }

    pub fn vessel(&self, key: &str) -> Result<&Vessel, DocumentError> {
        Ok(self.store.vessel(key)?)
    }

    pub fn vessel_mut(&mut self, key: &str) -> Result<&mut Vessel, DocumentError> {
        Ok(self.store.vessel_mut(key)?)
    }

    pub fn vessels(&self) -> &[Vessel] {
        self.store.vessels()
    }

    /// Removes a vessel that no species resides in.
    pub fn remove_vessel(&mut self, key: &str) -> Result<Vessel, DocumentError> {
        let id = self.store.vessel(key)?.id.clone();

        if let Some(species) = self.store.all_species().iter().find(|s| s.vessel_id == id) {
            return Err(DocumentError::ReferencedEntity {
                id,
                referrer: format!("species '{}'", species.id),
            });
        }

        debug!("Removing vessel '{id}'");
        self.store
            .remove_vessel(&id)
            .ok_or_else(|| not_found("vessel", &id))
    }

    //
    // Species
    //

    /// Adds a species of any kind and returns its id.
    ///
    /// The vessel and complex participants may be given by id or unique name; they are
    /// stored as ids.
    pub fn add_species(&mut self, mut species: Species) -> Result<String, DocumentError> {
        self.check_explicit_id(&species.id)?;
        species.vessel_id = self.store.vessel(&species.vessel_id)?.id.clone();
        self.check_optional_unit(&species.unit)?;

        if let SpeciesKind::Complex(complex) = &mut species.kind {
            if complex.participants.is_empty() {
                return Err(DocumentError::EmptyComplex(species.name.clone()));
            }

            let mut participants = Vec::with_capacity(complex.participants.len());
            for key in &complex.participants {
                let id = self.store.species(key)?.id.clone();
                if id == species.id {
                    return Err(DocumentError::CyclicComplex(species.id.clone()));
                }
                participants.push(id);
            }
            complex.participants = participants;
        }

        self.resolve_optional_unit(&mut species.unit)?;
        let kind = EntityKind::from(&species.kind);
        species.id = self.assign_id(kind, species.id);
        Ok(self.store.add_species(species)?)
    }

    /// Looks up a species of any kind by id or unique name.
    pub fn species(&self, key: &str) -> Result<&Species, DocumentError> {
        Ok(self.store.species(key)?)
    }

    pub fn species_mut(&mut self, key: &str) -> Result<&mut Species, DocumentError> {
        Ok(self.store.species_mut(key)?)
    }

    pub fn small_molecule(&self, key: &str) -> Result<&Species, DocumentError> {
        Ok(self.store.species_of(EntityKind::SmallMolecule, key)?)
    }

    pub fn protein(&self, key: &str) -> Result<&Species, DocumentError> {
        Ok(self.store.species_of(EntityKind::Protein, key)?)
    }

    pub fn complex(&self, key: &str) -> Result<&Species, DocumentError> {
        Ok(self.store.species_of(EntityKind::Complex, key)?)
    }

    pub fn all_species(&self) -> &[Species] {
        self.store.all_species()
    }

    pub fn small_molecules(&self) -> impl Iterator<Item = &Species> {
        self.store.small_molecules()
    }

    pub fn proteins(&self) -> impl Iterator<Item = &Species> {
        self.store.proteins()
    }

    pub fn complexes(&self) -> impl Iterator<Item = &Species> {
        self.store.complexes()
    }

    /// Identifiers of all species, in insertion order.
    pub fn species_ids(&self) -> Vec<String> {
        self.store.all_species().iter().map(|s| s.id.clone()).collect()
    }

    /// Replaces the participants of a complex.
    ///
    /// # Errors
    ///
    /// * `DocumentError::EmptyComplex` if no participants are given
    /// * `DocumentError::CyclicComplex` if the complex would contain itself, directly
    ///   or through nested complexes
    pub fn set_complex_participants<S: AsRef<str>>(
        &mut self,
        key: &str,
        participants: &[S],
    ) -> Result<(), DocumentError> {
        let complex_id = self.complex(key)?.id.clone();

        if participants.is_empty() {
            return Err(DocumentError::EmptyComplex(complex_id));
        }

        let ids = participants
            .iter()
            .map(|key| Ok(self.store.species(key.as_ref())?.id.clone()))
            .collect::<Result<Vec<_>, DocumentError>>()?;

        if self.reaches(&ids, &complex_id) {
            return Err(DocumentError::CyclicComplex(complex_id));
        }

        let complex = self.store.species_mut(&complex_id)?;
        if let SpeciesKind::Complex(inner) = &mut complex.kind {
            inner.participants = ids;
        }

        debug!("Updated participants of complex '{complex_id}'");
        Ok(())
    }

    /// Whether `target` is reachable from `start` through complex participation.
    fn reaches(&self, start: &[String], target: &str) -> bool {
        let mut stack = start.to_vec();
        let mut visited = HashSet::new();

        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if !visited.insert(id.clone()) {
                continue;
            }
            if let Some(participants) = self
                .store
                .species(&id)
                .ok()
                .and_then(|species| species.participants())
            {
                stack.extend(participants.iter().cloned());
            }
        }

        false
    }

    /// Removes a species that is no longer referenced by complexes, reactions or
    /// measurements.
    pub fn remove_species(&mut self, key: &str) -> Result<Species, DocumentError> {
        let id = self.store.species(key)?.id.clone();

        if let Some(referrer) = self.species_referrer(&id) {
            return Err(DocumentError::ReferencedEntity { id, referrer });
        }

        debug!("Removing species '{id}'");
        self.store
            .remove_species(&id)
            .ok_or_else(|| not_found("species", &id))
    }

    fn species_referrer(&self, id: &str) -> Option<String> {
        if let Some(complex) = self
            .store
            .complexes()
            .find(|c| c.participants().is_some_and(|p| p.iter().any(|p| p == id)))
        {
            return Some(format!("complex '{}'", complex.id));
        }

        for reaction in &self.reactions {
            let in_elements = reaction
                .educts
                .iter()
                .chain(&reaction.products)
                .any(|e| e.species_id == id)
                || reaction.modifiers.iter().any(|m| m.species_id == id);

            let in_model = reaction
                .model
                .as_ref()
                .and_then(|model| model.symbols().ok())
                .is_some_and(|symbols| symbols.contains(id));

            if in_elements || in_model {
                return Some(format!("reaction '{}'", reaction.id));
            }
        }

        self.measurements
            .iter()
            .find(|m| {
                m.species_data.iter().any(|d| {
                    d.species_id == id || d.replicates.iter().any(|r| r.species_id == id)
                })
            })
            .map(|m| format!("measurement '{}'", m.id))
    }

    //
    // Reactions
    //

    /// Adds a reaction and returns its id.
    ///
    /// Species references may be ids or unique names. An attached kinetic model is
    /// checked like in [`EnzymeMLDocument::set_kinetic_model`].
    pub fn add_reaction(&mut self, mut reaction: Reaction) -> Result<String, DocumentError> {
        self.check_explicit_id(&reaction.id)?;

        for element in reaction.educts.iter_mut().chain(reaction.products.iter_mut()) {
            element.species_id = self.store.species(&element.species_id)?.id.clone();
        }
        for modifier in reaction.modifiers.iter_mut() {
            modifier.species_id = self.store.species(&modifier.species_id)?.id.clone();
        }

        if let Some(model) = &mut reaction.model {
            self.check_kinetic_model(&reaction.name, model)?;
            self.resolve_model_units(model)?;
        }

        reaction.id = self.assign_id(EntityKind::Reaction, reaction.id);
        let id = reaction.id.clone();

        debug!("Added reaction '{}' as '{}'", reaction.name, id);
        self.reactions.push(reaction);
        Ok(id)
    }

    /// Parses an equation such as `"2 A + B <=> C"` and adds the resulting reaction.
    pub fn add_reaction_from_equation(
        &mut self,
        name: &str,
        equation: &str,
    ) -> Result<String, DocumentError> {
        let reaction = parse_reaction(equation, name, self)?;
        self.add_reaction(reaction)
    }

    /// Adds several reactions given as `(name, equation)` pairs.
    ///
    /// All equations are parsed before the first reaction is inserted; if any of them
    /// fails, no reaction is added.
    ///
    /// # Returns
    ///
    /// A map from reaction name to the assigned id.
    pub fn add_reactions<N, E>(
        &mut self,
        reactions: &[(N, E)],
    ) -> Result<HashMap<String, String>, DocumentError>
    where
        N: AsRef<str>,
        E: AsRef<str>,
    {
        let mut names = HashSet::new();
        let mut parsed = Vec::with_capacity(reactions.len());

        for (name, equation) in reactions {
            if !names.insert(name.as_ref()) {
                return Err(DocumentError::DuplicateIdentifier(name.as_ref().to_string()));
            }
            parsed.push(parse_reaction(equation.as_ref(), name.as_ref(), self)?);
        }

        let mut ids = HashMap::with_capacity(parsed.len());
        for reaction in parsed {
            let name = reaction.name.clone();
            let id = self.add_reaction(reaction)?;
            ids.insert(name, id);
        }

        Ok(ids)
    }

    pub fn reaction(&self, key: &str) -> Result<&Reaction, DocumentError> {
        let index = locate(self.reactions.iter().enumerate(), "reaction", key)?;
        Ok(&self.reactions[index])
    }

    pub fn reaction_mut(&mut self, key: &str) -> Result<&mut Reaction, DocumentError> {
        let index = locate(self.reactions.iter().enumerate(), "reaction", key)?;
        Ok(&mut self.reactions[index])
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    pub fn remove_reaction(&mut self, key: &str) -> Result<Reaction, DocumentError> {
        let index = locate(self.reactions.iter().enumerate(), "reaction", key)?;
        let reaction = self.reactions.remove(index);
        self.store.counters.retire(EntityKind::Reaction, &reaction.id);

        debug!("Removed reaction '{}'", reaction.id);
        Ok(reaction)
    }

    /// Adds an educt to a reaction. Repeated educts accumulate their stoichiometry.
    pub fn add_educt(
        &mut self,
        reaction: &str,
        species: &str,
        stoichiometry: f64,
    ) -> Result<(), DocumentError> {
        let species_id = self.store.species(species)?.id.clone();
        let reaction = self.reaction_mut(reaction)?;
        accumulate(&mut reaction.educts, species_id, stoichiometry);
        Ok(())
    }

    /// Adds a product to a reaction. Repeated products accumulate their stoichiometry.
    pub fn add_product(
        &mut self,
        reaction: &str,
        species: &str,
        stoichiometry: f64,
    ) -> Result<(), DocumentError> {
        let species_id = self.store.species(species)?.id.clone();
        let reaction = self.reaction_mut(reaction)?;
        accumulate(&mut reaction.products, species_id, stoichiometry);
        Ok(())
    }

    /// Adds a modifier to a reaction, or updates the role of an existing one.
    pub fn add_modifier(
        &mut self,
        reaction: &str,
        species: &str,
        role: ModifierRole,
    ) -> Result<(), DocumentError> {
        let species_id = self.store.species(species)?.id.clone();
        let reaction = self.reaction_mut(reaction)?;

        match reaction
            .modifiers
            .iter_mut()
            .find(|m| m.species_id == species_id)
        {
            Some(existing) => existing.role = role,
            None => reaction.modifiers.push(ModifierElement { species_id, role }),
        }

        Ok(())
    }

    /// Attaches a kinetic model to a reaction.
    ///
    /// Parameter units are resolved against the unit registry. Every symbol of the
    /// equation has to be a species id, a parameter of the model or a global parameter.
    pub fn set_kinetic_model(
        &mut self,
        reaction: &str,
        mut model: KineticModel,
    ) -> Result<(), DocumentError> {
        let index = locate(self.reactions.iter().enumerate(), "reaction", reaction)?;
        let reaction_id = self.reactions[index].id.clone();

        self.check_kinetic_model(&reaction_id, &model)?;
        self.resolve_model_units(&mut model)?;

        debug!("Set kinetic model '{}' on reaction '{}'", model.name, reaction_id);
        self.reactions[index].model = Some(model);
        Ok(())
    }

    fn check_kinetic_model(&self, reaction: &str, model: &KineticModel) -> Result<(), DocumentError> {
        for parameter in &model.parameters {
            self.check_optional_unit(&parameter.unit)?;
        }

        for symbol in model.symbols()? {
            let resolves = self.store.contains_species(&symbol)
                || model.parameter(&symbol).is_some()
                || self.global_parameter(&symbol).is_some();

            if !resolves {
                return Err(DocumentError::UnresolvedSymbol {
                    reaction: reaction.to_string(),
                    symbol,
                });
            }
        }

        Ok(())
    }

    fn resolve_model_units(&mut self, model: &mut KineticModel) -> Result<(), DocumentError> {
        for parameter in model.parameters.iter_mut() {
            self.resolve_optional_unit(&mut parameter.unit)?;
        }
        Ok(())
    }

    //
    // Measurements
    //

    /// Adds a measurement and returns its id.
    ///
    /// Species references may be ids or unique names. Replicates without a species id
    /// inherit the one of their measurement data, and replicates without an id are
    /// numbered document-wide.
    pub fn add_measurement(&mut self, mut measurement: Measurement) -> Result<String, DocumentError> {
        self.check_explicit_id(&measurement.id)?;
        self.check_optional_unit(&measurement.temperature_unit)?;

        let mut replicate_ids = HashSet::new();
        let mut measured = HashSet::new();
        for data in measurement.species_data.iter_mut() {
            data.species_id = self.store.species(&data.species_id)?.id.clone();
            if !measured.insert(data.species_id.clone()) {
                return Err(DocumentError::DuplicateSpeciesData {
                    measurement: measurement.name.clone(),
                    species: data.species_id.clone(),
                });
            }
            self.check_unit(&data.unit)?;

            for replicate in data.replicates.iter_mut() {
                if replicate.species_id.is_empty() {
                    replicate.species_id = data.species_id.clone();
                } else {
                    replicate.species_id = self.store.species(&replicate.species_id)?.id.clone();
                }

                if replicate.species_id != data.species_id {
                    return Err(DocumentError::MissingSpeciesData {
                        measurement: measurement.name.clone(),
                        species: replicate.species_id.clone(),
                    });
                }

                self.check_replicate(replicate)?;
                if !replicate.id.is_empty() && !replicate_ids.insert(replicate.id.clone()) {
                    return Err(DocumentError::DuplicateIdentifier(replicate.id.clone()));
                }
            }
        }

        self.resolve_optional_unit(&mut measurement.temperature_unit)?;
        for data in measurement.species_data.iter_mut() {
            data.unit = self.units.resolve_ref(&data.unit)?;
            for replicate in data.replicates.iter_mut() {
                self.resolve_replicate_units(replicate)?;
            }
        }

        for data in measurement.species_data.iter_mut() {
            for replicate in data.replicates.iter_mut() {
                if replicate.id.is_empty() {
                    replicate.id = self.next_replicate_id(&replicate_ids);
                    replicate_ids.insert(replicate.id.clone());
                }
            }
        }

        measurement.id = self.assign_id(EntityKind::Measurement, measurement.id);
        let id = measurement.id.clone();

        debug!("Added measurement '{}' as '{}'", measurement.name, id);
        self.measurements.push(measurement);
        Ok(id)
    }

    /// Adds a replicate to the measurement data of its species and returns its id.
    pub fn add_replicate(
        &mut self,
        measurement: &str,
        mut replicate: Replicate,
    ) -> Result<String, DocumentError> {
        let index = locate(self.measurements.iter().enumerate(), "measurement", measurement)?;
        replicate.species_id = self.store.species(&replicate.species_id)?.id.clone();

        let data_index = self.measurements[index]
            .species_data
            .iter()
            .position(|d| d.species_id == replicate.species_id)
            .ok_or_else(|| DocumentError::MissingSpeciesData {
                measurement: self.measurements[index].id.clone(),
                species: replicate.species_id.clone(),
            })?;

        self.check_replicate(&replicate)?;
        self.resolve_replicate_units(&mut replicate)?;

        if replicate.id.is_empty() {
            replicate.id = self.next_replicate_id(&HashSet::new());
        }

        let id = replicate.id.clone();
        debug!("Added replicate '{}' to measurement '{}'", id, self.measurements[index].id);
        self.measurements[index].species_data[data_index]
            .replicates
            .push(replicate);

        Ok(id)
    }

    fn check_replicate(&self, replicate: &Replicate) -> Result<(), DocumentError> {
        if replicate.time.len() != replicate.data.len() {
            return Err(DocumentError::ReplicateLengthMismatch {
                id: replicate.id.clone(),
                time: replicate.time.len(),
                data: replicate.data.len(),
            });
        }

        if !replicate.id.is_empty() && self.replicate_id_taken(&replicate.id) {
            return Err(DocumentError::DuplicateIdentifier(replicate.id.clone()));
        }

        self.check_unit(&replicate.time_unit)?;
        self.check_unit(&replicate.data_unit)
    }

    fn resolve_replicate_units(&mut self, replicate: &mut Replicate) -> Result<(), DocumentError> {
        replicate.time_unit = self.units.resolve_ref(&replicate.time_unit)?;
        replicate.data_unit = self.units.resolve_ref(&replicate.data_unit)?;
        Ok(())
    }

    fn next_replicate_id(&mut self, pending: &HashSet<String>) -> String {
        let mut counters = std::mem::take(&mut self.store.counters);
        let existing = self
            .measurements
            .iter()
            .flat_map(|m| &m.species_data)
            .flat_map(|d| &d.replicates)
            .map(|r| r.id.as_str())
            .chain(pending.iter().map(String::as_str));
        let id = counters.next_id(EntityKind::Replicate, existing);
        self.store.counters = counters;
        id
    }

    pub fn measurement(&self, key: &str) -> Result<&Measurement, DocumentError> {
        let index = locate(self.measurements.iter().enumerate(), "measurement", key)?;
        Ok(&self.measurements[index])
    }

    pub fn measurement_mut(&mut self, key: &str) -> Result<&mut Measurement, DocumentError> {
        let index = locate(self.measurements.iter().enumerate(), "measurement", key)?;
        Ok(&mut self.measurements[index])
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn remove_measurement(&mut self, key: &str) -> Result<Measurement, DocumentError> {
        let index = locate(self.measurements.iter().enumerate(), "measurement", key)?;
        let measurement = self.measurements.remove(index);
        self.store
            .counters
            .retire(EntityKind::Measurement, &measurement.id);

        for replicate in measurement.species_data.iter().flat_map(|d| &d.replicates) {
            self.store
                .counters
                .retire(EntityKind::Replicate, &replicate.id);
        }

        debug!("Removed measurement '{}'", measurement.id);
        Ok(measurement)
    }

    //
    // Global parameters
    //

    /// Adds a parameter shared by all kinetic models. Names must be unique.
    pub fn add_global_parameter(&mut self, mut parameter: KineticParameter) -> Result<(), DocumentError> {
        if self.global_parameter(&parameter.name).is_some() {
            return Err(DocumentError::DuplicateIdentifier(parameter.name));
        }

        self.check_optional_unit(&parameter.unit)?;
        self.resolve_optional_unit(&mut parameter.unit)?;
        parameter.is_global = true;

        debug!("Added global parameter '{}'", parameter.name);
        self.global_parameters.push(parameter);
        Ok(())
    }

    pub fn global_parameter(&self, name: &str) -> Option<&KineticParameter> {
        self.global_parameters.iter().find(|p| p.name == name)
    }

    pub fn global_parameter_mut(&mut self, name: &str) -> Option<&mut KineticParameter> {
        self.global_parameters.iter_mut().find(|p| p.name == name)
    }

    pub fn global_parameters(&self) -> &[KineticParameter] {
        &self.global_parameters
    }

    /// Removes a global parameter that no kinetic law depends on.
    pub fn remove_global_parameter(&mut self, name: &str) -> Result<KineticParameter, DocumentError> {
        let index = self
            .global_parameters
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| not_found("global parameter", name))?;

        for reaction in &self.reactions {
            let Some(model) = &reaction.model else {
                continue;
            };

            let uses_global = model.parameter(name).is_none()
                && model.symbols().is_ok_and(|symbols| symbols.contains(name));

            if uses_global {
                return Err(DocumentError::ReferencedEntity {
                    id: name.to_string(),
                    referrer: format!("reaction '{}'", reaction.id),
                });
            }
        }

        Ok(self.global_parameters.remove(index))
    }

    //
    // Creators
    //

    pub fn add_creator(&mut self, creator: Creator) {
        self.creators.push(creator);
    }

    pub fn remove_creator(&mut self, index: usize) -> Option<Creator> {
        (index < self.creators.len()).then(|| self.creators.remove(index))
    }

    //
    // Collaborator hand-off
    //

    /// Writes fitted parameter values back into the document.
    ///
    /// A name updates the global parameter of that name and every local model
    /// parameter of that name. No value is written unless all names are known.
    pub fn apply_fitted_parameters(
        &mut self,
        values: &HashMap<String, f64>,
    ) -> Result<(), DocumentError> {
        for name in values.keys() {
            let known = self.global_parameter(name).is_some()
                || self
                    .reactions
                    .iter()
                    .filter_map(|r| r.model.as_ref())
                    .any(|m| m.parameter(name).is_some());

            if !known {
                return Err(DocumentError::UnknownParameter(name.clone()));
            }
        }

        for (name, value) in values {
            if let Some(parameter) = self.global_parameter_mut(name) {
                parameter.value = Some(*value);
            }

            for model in self.reactions.iter_mut().filter_map(|r| r.model.as_mut()) {
                if let Some(parameter) = model.parameter_mut(name) {
                    parameter.value = Some(*value);
                }
            }
        }

        debug!("Applied {} fitted parameter values", values.len());
        Ok(())
    }

    /// Fails if the document violates referential or structural integrity.
    ///
    /// Warnings of the consistency check are logged but do not fail the check.
    pub fn check_integrity(&self) -> Result<(), DocumentError> {
        let report = check_consistency(self);

        for result in report.errors.iter().filter(|r| r.severity() == &Severity::Warning) {
            warn!("{}: {}", result.location(), result.message());
        }

        if report.is_valid {
            return Ok(());
        }

        let errors = report
            .errors
            .iter()
            .filter(|r| r.severity() == &Severity::Error)
            .map(|r| format!("{}: {}", r.location(), r.message()))
            .collect::<Vec<_>>();

        Err(DocumentError::IntegrityViolation(errors.join("\n")))
    }
}

fn accumulate(elements: &mut Vec<ReactionElement>, species_id: String, stoichiometry: f64) {
    match elements.iter_mut().find(|e| e.species_id == species_id) {
        Some(existing) => existing.stoichiometry += stoichiometry,
        None => elements.push(ReactionElement {
            species_id,
            stoichiometry,
        }),
    }
}

fn not_found(kind: &str, key: &str) -> DocumentError {
    DocumentError::Store(StoreError::NotFound {
        kind: kind.to_string(),
        key: key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinetics::{mass_action, Binding};
    use crate::versions::v2::{
        KineticParameterBuilder, MeasurementBuilder, MeasurementDataBuilder, ReplicateBuilder,
        VesselBuilder,
    };
    use pretty_assertions::assert_eq;

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
        doc.add_species(
            Species::small_molecule("Substrate", "Cuvette")
                .init_conc(10.0)
                .unit("mM")
                .build()
                .unwrap(),
        )
        .unwrap();
        doc.add_species(Species::small_molecule("Product", "v0").build().unwrap())
            .unwrap();
        doc.add_species(Species::protein("Enzyme", "v0", "MKV").build().unwrap())
            .unwrap();
        doc
    }

    fn replicate(id: &str, species: &str) -> Replicate {
        ReplicateBuilder::default()
            .id(id)
            .species_id(species)
            .time_unit("s")
            .data_unit("mM")
            .time(vec![0.0, 1.0, 2.0])
            .data(vec![10.0, 8.0, 6.5])
            .build()
            .unwrap()
    }

    #[test]
    fn test_units_are_normalized_and_deduplicated() {
        let doc = document();

        let vessel = doc.vessel("v0").unwrap();
        assert_eq!(vessel.unit, "u0");
        assert_eq!(doc.species("s0").unwrap().unit.as_deref(), Some("u1"));
        assert_eq!(doc.units().len(), 2);
        assert_eq!(doc.unit("u1").unwrap().name, "mM");
    }

    #[test]
    fn test_vessel_name_is_stored_as_id() {
        let doc = document();
        assert_eq!(doc.species("Substrate").unwrap().vessel_id, "v0");
    }

    #[test]
    fn test_species_requires_existing_vessel() {
        let mut doc = document();
        let result = doc.add_species(Species::small_molecule("X", "v9").build().unwrap());
        assert!(matches!(result, Err(DocumentError::Store(StoreError::NotFound { .. }))));
        assert_eq!(doc.all_species().len(), 3);
    }

    #[test]
    fn test_explicit_id_collides_across_kinds() {
        let mut doc = document();
        let mut species = Species::small_molecule("X", "v0").build().unwrap();
        species.id = "v0".to_string();

        let result = doc.add_species(species);
        assert_eq!(result, Err(DocumentError::DuplicateIdentifier("v0".to_string())));
    }

    #[test]
    fn test_complex_rules() {
        let mut doc = document();
        let empty: Vec<String> = vec![];

        let result = doc.add_species(Species::complex("Empty", "v0", empty).build().unwrap());
        assert!(matches!(result, Err(DocumentError::EmptyComplex(_))));

        let c0 = doc
            .add_species(
                Species::complex("ES", "v0", ["Substrate", "Enzyme"])
                    .build()
                    .unwrap(),
            )
            .unwrap();
        assert_eq!(
            doc.complex(&c0).unwrap().participants().unwrap(),
            &["s0".to_string(), "p0".to_string()]
        );

        let c1 = doc
            .add_species(Species::complex("ESP", "v0", [c0.as_str(), "s1"]).build().unwrap())
            .unwrap();

        // c0 -> c1 -> c0 would be a cycle
        let result = doc.set_complex_participants(&c0, &[c1.as_str()]);
        assert_eq!(result, Err(DocumentError::CyclicComplex(c0.clone())));

        let result = doc.set_complex_participants(&c0, &[c0.as_str()]);
        assert_eq!(result, Err(DocumentError::CyclicComplex(c0.clone())));

        doc.set_complex_participants(&c0, &["s1"]).unwrap();
        assert_eq!(
            doc.complex(&c0).unwrap().participants().unwrap(),
            &["s1".to_string()]
        );
    }

    #[test]
    fn test_referential_integrity_guard() {
        // Arrange
        let mut doc = document();
        let r0 = doc
            .add_reaction_from_equation("Conversion", "Substrate -> Product")
            .unwrap();

        // Act
        let result = doc.remove_species("s0");

        // Assert
        assert_eq!(
            result,
            Err(DocumentError::ReferencedEntity {
                id: "s0".to_string(),
                referrer: format!("reaction '{r0}'"),
            })
        );
        assert!(doc.species("s0").is_ok());

        doc.remove_reaction(&r0).unwrap();
        doc.remove_species("s0").unwrap();
        assert!(doc.species("s0").is_err());
    }

    #[test]
    fn test_vessel_removal_guard() {
        let mut doc = document();
        assert!(matches!(
            doc.remove_vessel("v0"),
            Err(DocumentError::ReferencedEntity { .. })
        ));
    }

    #[test]
    fn test_ids_not_reused_after_reaction_removal() {
        let mut doc = document();
        let r0 = doc.add_reaction_from_equation("R", "s0 -> s1").unwrap();
        doc.remove_reaction(&r0).unwrap();
        let r1 = doc.add_reaction_from_equation("R", "s0 -> s1").unwrap();

        assert_eq!(r0, "r0");
        assert_eq!(r1, "r1");
    }

    #[test]
    fn test_add_reactions_is_atomic() {
        let mut doc = document();
        let result = doc.add_reactions(&[("R1", "s0 -> s1"), ("R2", "s0 -> Unknown")]);

        assert!(matches!(result, Err(DocumentError::Equation(_))));
        assert!(doc.reactions().is_empty());

        let ids = doc
            .add_reactions(&[("R1", "s0 -> s1"), ("R2", "s1 = s0")])
            .unwrap();
        assert_eq!(ids["R1"], "r0");
        assert_eq!(ids["R2"], "r1");
    }

    #[test]
    fn test_direct_reaction_construction() {
        let mut doc = document();
        let r0 = doc
            .add_reaction(Reaction {
                name: "Manual".to_string(),
                ..Default::default()
            })
            .unwrap();

        doc.add_educt(&r0, "Substrate", 1.0).unwrap();
        doc.add_educt(&r0, "s0", 1.0).unwrap();
        doc.add_product(&r0, "Product", 1.0).unwrap();
        doc.add_modifier(&r0, "Enzyme", ModifierRole::Biocatalyst).unwrap();

        let reaction = doc.reaction("Manual").unwrap();
        assert_eq!(reaction.educts[0].stoichiometry, 2.0);
        assert_eq!(reaction.modifiers[0].species_id, "p0");
        assert_eq!(reaction.modifiers[0].role, ModifierRole::Biocatalyst);
    }

    #[test]
    fn test_set_kinetic_model() {
        let mut doc = document();
        let r0 = doc.add_reaction_from_equation("R", "s0 -> s1").unwrap();

        let mut model = mass_action()
            .generate(
                &HashMap::from([
                    ("educts".to_string(), Binding::from("s0")),
                    ("products".to_string(), Binding::from("s1")),
                ]),
                &HashMap::new(),
            )
            .unwrap();
        model.parameter_mut("k_f").unwrap().unit = Some("1 / s".to_string());

        doc.set_kinetic_model(&r0, model).unwrap();

        let model = doc.reaction(&r0).unwrap().model.as_ref().unwrap();
        let unit = model.parameter("k_f").unwrap().unit.as_deref().unwrap();
        assert_eq!(doc.unit(unit).unwrap().name, "1 / s");
    }

    #[test]
    fn test_set_kinetic_model_rejects_unresolved_symbols() {
        let mut doc = document();
        let r0 = doc.add_reaction_from_equation("R", "s0 -> s1").unwrap();

        let model = KineticModel {
            name: "Broken".to_string(),
            equation: "k * s0 * s9".to_string(),
            parameters: vec![KineticParameterBuilder::default().name("k").build().unwrap()],
        };

        let result = doc.set_kinetic_model(&r0, model);
        assert_eq!(
            result,
            Err(DocumentError::UnresolvedSymbol {
                reaction: r0.clone(),
                symbol: "s9".to_string(),
            })
        );

        // Global parameters resolve symbols as well
        doc.add_global_parameter(KineticParameterBuilder::default().name("K").build().unwrap())
            .unwrap();
        let model = KineticModel {
            name: "Global".to_string(),
            equation: "K * s0".to_string(),
            parameters: vec![],
        };
        doc.set_kinetic_model(&r0, model).unwrap();

        assert!(matches!(
            doc.remove_global_parameter("K"),
            Err(DocumentError::ReferencedEntity { .. })
        ));
    }

    #[test]
    fn test_measurements_and_replicates() {
        let mut doc = document();
        let measurement = MeasurementBuilder::default()
            .name("Run 1")
            .temperature(30.0)
            .temperature_unit("C")
            .ph(7.4)
            .to_species_data(
                MeasurementDataBuilder::default()
                    .species_id("Substrate")
                    .init_conc(10.0)
                    .unit("mM")
                    .to_replicates(replicate("", ""))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();

        let m0 = doc.add_measurement(measurement).unwrap();
        assert_eq!(m0, "m0");

        let data = &doc.measurement(&m0).unwrap().species_data[0];
        assert_eq!(data.species_id, "s0");
        assert_eq!(data.replicates[0].id, "repl0");
        assert_eq!(data.replicates[0].species_id, "s0");

        let id = doc.add_replicate("Run 1", replicate("", "s0")).unwrap();
        assert_eq!(id, "repl1");

        let result = doc.add_replicate(&m0, replicate("", "s1"));
        assert!(matches!(result, Err(DocumentError::MissingSpeciesData { .. })));

        let result = doc.add_replicate(&m0, replicate("repl0", "s0"));
        assert_eq!(result, Err(DocumentError::DuplicateIdentifier("repl0".to_string())));

        let mut uneven = replicate("", "s0");
        uneven.data.pop();
        assert!(matches!(
            doc.add_replicate(&m0, uneven),
            Err(DocumentError::ReplicateLengthMismatch { .. })
        ));
    }

    #[test]
    fn test_apply_fitted_parameters() {
        let mut doc = document();
        let r0 = doc.add_reaction_from_equation("R", "s0 -> s1").unwrap();
        let model = KineticModel::from_equation("MM", "vmax * s0 / (K_m + s0)", &doc).unwrap();
        doc.set_kinetic_model(&r0, model).unwrap();

        let result = doc.apply_fitted_parameters(&HashMap::from([
            ("vmax".to_string(), 2.0),
            ("nope".to_string(), 1.0),
        ]));
        assert_eq!(result, Err(DocumentError::UnknownParameter("nope".to_string())));

        doc.apply_fitted_parameters(&HashMap::from([("vmax".to_string(), 2.0)]))
            .unwrap();

        let model = doc.reaction(&r0).unwrap().model.as_ref().unwrap();
        assert_eq!(model.parameter("vmax").unwrap().value, Some(2.0));
        assert_eq!(model.parameter("K_m").unwrap().value, None);
    }

    #[test]
    fn test_malformed_unit_leaves_document_unchanged() {
        let mut doc = document();
        let units_before = doc.units().len();

        let result = doc.add_vessel(
            VesselBuilder::default()
                .name("Flask")
                .volume(1.0)
                .unit("mol / l / s")
                .build()
                .unwrap(),
        );

        assert!(matches!(result, Err(DocumentError::Unit(_))));
        assert_eq!(doc.vessels().len(), 1);
        assert_eq!(doc.units().len(), units_before);
    }

    #[test]
    fn test_check_integrity() {
        let mut doc = document();
        doc.add_reaction_from_equation("R", "s0 -> s1").unwrap();
        assert!(doc.check_integrity().is_ok());

        doc.reactions[0].educts[0].species_id = "s9".to_string();
        assert!(matches!(
            doc.check_integrity(),
            Err(DocumentError::IntegrityViolation(_))
        ));
    }
}
