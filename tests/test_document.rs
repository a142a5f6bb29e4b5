use std::collections::HashMap;

use approx::assert_relative_eq;
use enzymeml::prelude::*;
use pretty_assertions::assert_eq;

/// Builds a binding experiment: substrate and enzyme forming a complex.
fn binding_document() -> EnzymeMLDocument {
    let mut doc = EnzymeMLDocument::new("Binding Experiment");

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
        Species::protein("E", "Cuvette", "MTEYKLVVVG")
            .init_conc(0.5)
            .unit("mM")
            .build()
            .unwrap(),
    )
    .unwrap();

    doc.add_species(
        Species::small_molecule("S", "v0")
            .init_conc(10.0)
            .unit("mM")
            .build()
            .unwrap(),
    )
    .unwrap();

    doc.add_species(Species::small_molecule("P", "v0").build().unwrap())
        .unwrap();

    doc.add_species(Species::complex("ES", "v0", ["S", "E"]).build().unwrap())
        .unwrap();

    doc
}

fn with_mass_action(doc: &mut EnzymeMLDocument) -> String {
    let r0 = doc.add_reaction_from_equation("Binding", "S + E = ES").unwrap();

    let bindings = HashMap::from([
        ("educts".to_string(), Binding::from(vec!["s0", "p0"])),
        ("products".to_string(), Binding::from("c0")),
    ]);

    let mut model = mass_action().generate(&bindings, &HashMap::new()).unwrap();
    model.parameter_mut("k_f").unwrap().unit = Some("1 / mM s".to_string());
    model.parameter_mut("k_r").unwrap().unit = Some("1 / s".to_string());

    doc.set_kinetic_model(&r0, model).unwrap();
    r0
}

#[test]
fn test_identifiers_are_assigned_per_kind() {
    // Arrange
    let doc = binding_document();

    // Act
    let ids = doc.species_ids();

    // Assert
    assert_eq!(ids.len(), 4);
    assert!(ids.contains(&"p0".to_string()));
    assert!(ids.contains(&"s0".to_string()));
    assert!(ids.contains(&"s1".to_string()));
    assert!(ids.contains(&"c0".to_string()));
    assert_eq!(doc.vessels()[0].id, "v0");
    assert_eq!(doc.species("E").unwrap().vessel_id, "v0");
}

#[test]
fn test_complex_participants_are_resolved() {
    let doc = binding_document();
    let complex = doc.complex("ES").unwrap();

    assert_eq!(
        complex.participants().unwrap(),
        &["s0".to_string(), "p0".to_string()]
    );
}

#[test]
fn test_reaction_from_equation() {
    // Arrange
    let mut doc = binding_document();

    // Act
    let r0 = doc.add_reaction_from_equation("Binding", "S + E = ES").unwrap();

    // Assert
    let reaction = doc.reaction(&r0).unwrap();
    assert_eq!(r0, "r0");
    assert!(reaction.reversible);
    assert_eq!(
        reaction
            .educts
            .iter()
            .map(|e| e.species_id.as_str())
            .collect::<Vec<_>>(),
        vec!["s0", "p0"]
    );
    assert_eq!(reaction.products[0].species_id, "c0");
    assert_eq!(reaction.products[0].stoichiometry, 1.0);
}

#[test]
fn test_mass_action_model() {
    // Arrange
    let mut doc = binding_document();

    // Act
    let r0 = with_mass_action(&mut doc);

    // Assert
    let model = doc.reaction(&r0).unwrap().model.clone().unwrap();
    let symbols = model.symbols().unwrap();
    for symbol in ["k_f", "k_r", "s0", "p0", "c0"] {
        assert!(symbols.contains(symbol), "missing symbol {symbol}");
    }

    let values = HashMap::from([
        ("k_f".to_string(), 2.0),
        ("k_r".to_string(), 0.5),
        ("s0".to_string(), 3.0),
        ("p0".to_string(), 4.0),
        ("c0".to_string(), 1.0),
    ]);
    assert_relative_eq!(model.evaluate(&values).unwrap(), 2.0 * 3.0 * 4.0 - 0.5 * 1.0);

    let unit = model.parameter("k_f").unwrap().unit.clone().unwrap();
    assert_eq!(doc.unit(&unit).unwrap().name, "1 / mM s");
}

#[test]
fn test_json_round_trip() {
    // Arrange
    let mut doc = binding_document();
    with_mass_action(&mut doc);
    doc.add_measurement(
        MeasurementBuilder::default()
            .name("Binding kinetics")
            .to_species_data(
                MeasurementDataBuilder::default()
                    .species_id("s0")
                    .init_conc(10.0)
                    .unit("mM")
                    .to_replicates(
                        ReplicateBuilder::default()
                            .species_id("s0")
                            .time_unit("s")
                            .data_unit("mM")
                            .time(vec![0.0, 10.0, 20.0])
                            .data(vec![10.0, 7.5, 6.0])
                            .build()
                            .unwrap(),
                    )
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap(),
    )
    .unwrap();

    // Act
    let json = to_json_string(&doc).unwrap();
    let loaded = from_json_str(&json).unwrap();

    // Assert
    assert_eq!(loaded, doc);
    assert_eq!(
        loaded.measurement("m0").unwrap().species_data[0].replicates[0].id,
        "repl0"
    );
}

#[test]
fn test_json_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("binding.json");

    let mut doc = binding_document();
    with_mass_action(&mut doc);

    save_enzmldoc(&path, &doc).unwrap();
    let loaded = load_enzmldoc(&path).unwrap();

    assert_eq!(loaded, doc);
}

#[test]
fn test_loaded_document_continues_numbering() {
    // Arrange
    let doc = binding_document();
    let json = to_json_string(&doc).unwrap();
    let mut loaded = from_json_str(&json).unwrap();

    // Act
    let id = loaded
        .add_species(Species::small_molecule("Q", "v0").build().unwrap())
        .unwrap();

    // Assert
    assert_eq!(id, "s2");
}

#[test]
fn test_loaded_document_skips_past_id_gaps() {
    // Arrange
    let mut doc = binding_document();
    let q = doc
        .add_species(Species::small_molecule("Q", "v0").build().unwrap())
        .unwrap();
    doc.add_species(Species::small_molecule("R", "v0").build().unwrap())
        .unwrap();
    doc.remove_species(&q).unwrap();

    let json = to_json_string(&doc).unwrap();
    let mut loaded = from_json_str(&json).unwrap();

    // Act
    let id = loaded
        .add_species(Species::small_molecule("T", "v0").build().unwrap())
        .unwrap();

    // Assert
    assert_eq!(q, "s2");
    assert_eq!(id, "s4");
}

#[test]
fn test_duplicate_species_data_is_rejected() {
    let mut doc = binding_document();
    let data = MeasurementDataBuilder::default()
        .species_id("s0")
        .init_conc(10.0)
        .unit("mM")
        .build()
        .unwrap();

    let result = doc.add_measurement(
        MeasurementBuilder::default()
            .name("Twice")
            .to_species_data(data.clone())
            .to_species_data(MeasurementData {
                species_id: "S".to_string(),
                ..data
            })
            .build()
            .unwrap(),
    );

    assert!(matches!(
        result,
        Err(DocumentError::DuplicateSpeciesData { ref species, .. }) if species == "s0"
    ));
    assert!(doc.measurements().is_empty());
}

#[test]
fn test_removing_a_referenced_species_fails() {
    let mut doc = binding_document();
    with_mass_action(&mut doc);

    let result = doc.remove_species("S");

    assert!(matches!(result, Err(DocumentError::ReferencedEntity { .. })));
    assert!(doc.species("s0").is_ok());
}

#[test]
fn test_apply_fitted_parameters() {
    let mut doc = binding_document();
    let r0 = with_mass_action(&mut doc);

    doc.apply_fitted_parameters(&HashMap::from([("k_f".to_string(), 1.25)]))
        .unwrap();

    let model = doc.reaction(&r0).unwrap().model.as_ref().unwrap();
    assert_eq!(model.parameter("k_f").unwrap().value, Some(1.25));

    let result = doc.apply_fitted_parameters(&HashMap::from([("k_x".to_string(), 1.0)]));
    assert!(matches!(result, Err(DocumentError::UnknownParameter(_))));
}

#[test]
fn test_export_measurement_data() {
    let mut doc = binding_document();
    doc.add_measurement(
        MeasurementBuilder::default()
            .name("M")
            .to_species_data(
                MeasurementDataBuilder::default()
                    .species_id("s0")
                    .init_conc(10.0)
                    .unit("mM")
                    .to_replicates(
                        ReplicateBuilder::default()
                            .species_id("s0")
                            .time_unit("s")
                            .data_unit("mM")
                            .time(vec![0.0, 1.0])
                            .data(vec![10.0, 9.0])
                            .build()
                            .unwrap(),
                    )
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap(),
    )
    .unwrap();

    let tables = doc.export_measurement_data(&["M"]).unwrap();

    assert_eq!(tables[0].columns(), vec!["time", "s0"]);
    assert_eq!(tables[0].data.shape(), &[2, 2]);
    assert_eq!(tables[0].data[[1, 1]], 9.0);
}

#[test]
fn test_display_lists_components() {
    let mut doc = binding_document();
    with_mass_action(&mut doc);

    let display = doc.to_string();

    assert!(display.contains("Binding Experiment"));
    assert!(display.contains("Proteins"));
    assert!(display.contains("Complexes"));
    assert!(display.contains("s0 + p0 ⇄ c0"));
}
