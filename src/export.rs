//! Export of measurement data to ndarray tables.
//!
//! This module hands the time courses of a document to numerical collaborators such
//! as fitting engines. Every measurement becomes one [`MeasurementTable`]:
//!
//! - Column 0 holds the time points, followed by one column per measured species
//! - Replicate `k` of every species forms block `k`; blocks are stacked along axis 0
//!
//! Fitted values are handed back through
//! [`EnzymeMLDocument::apply_fitted_parameters`].

use ndarray::{concatenate, Array2, Axis};

use crate::document::DocumentError;
use crate::prelude::{EnzymeMLDocument, Measurement, MeasurementData};

/// The time courses of a single measurement in matrix form.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementTable {
    /// Identifier of the exported measurement
    pub measurement_id: String,
    /// Species of the data columns, in column order after the time column
    pub species: Vec<String>,
    /// Time column followed by one column per species
    pub data: Array2<f64>,
}

impl MeasurementTable {
    /// Column headers: `time` followed by the species ids.
    pub fn columns(&self) -> Vec<String> {
        std::iter::once("time".to_string())
            .chain(self.species.iter().cloned())
            .collect()
    }

    /// Index of the column holding the given species.
    pub fn column(&self, species_id: &str) -> Option<usize> {
        self.species
            .iter()
            .position(|species| species == species_id)
            .map(|index| index + 1)
    }
}

impl EnzymeMLDocument {
    /// Exports the measurements with the given ids or names as tables.
    ///
    /// An empty list exports every measurement of the document.
    ///
    /// # Errors
    ///
    /// * `DocumentError::Store` if a measurement does not exist
    /// * `DocumentError::InconsistentTimeAxes` if the species of a measurement differ in
    ///   their number of replicates or in the time points of a replicate block
    pub fn export_measurement_data<S: AsRef<str>>(
        &self,
        measurements: &[S],
    ) -> Result<Vec<MeasurementTable>, DocumentError> {
        if measurements.is_empty() {
            return self.measurements().iter().map(measurement_table).collect();
        }

        measurements
            .iter()
            .map(|key| self.measurement(key.as_ref()).and_then(measurement_table))
            .collect()
    }
}

/// Converts a single measurement into a table.
///
/// Species without replicates are not part of the table.
fn measurement_table(measurement: &Measurement) -> Result<MeasurementTable, DocumentError> {
    let measured = measurement
        .species_data
        .iter()
        .filter(|data| !data.replicates.is_empty())
        .collect::<Vec<_>>();

    let species = measured
        .iter()
        .map(|data| data.species_id.clone())
        .collect::<Vec<_>>();

    let Some(reference) = measured.first() else {
        return Ok(MeasurementTable {
            measurement_id: measurement.id.clone(),
            species,
            data: Array2::zeros((0, 1)),
        });
    };

    let n_blocks = reference.replicates.len();
    if measured.iter().any(|data| data.replicates.len() != n_blocks) {
        return Err(DocumentError::InconsistentTimeAxes(measurement.id.clone()));
    }

    let blocks = (0..n_blocks)
        .map(|block| replicate_block(measurement, &measured, block))
        .collect::<Result<Vec<_>, _>>()?;

    let views = blocks.iter().map(|block| block.view()).collect::<Vec<_>>();
    let data = concatenate(Axis(0), &views)
        .map_err(|_| DocumentError::InconsistentTimeAxes(measurement.id.clone()))?;

    Ok(MeasurementTable {
        measurement_id: measurement.id.clone(),
        species,
        data,
    })
}

/// Builds the rows of replicate block `block`, all species sharing one time axis.
fn replicate_block(
    measurement: &Measurement,
    measured: &[&MeasurementData],
    block: usize,
) -> Result<Array2<f64>, DocumentError> {
    let replicates = measured
        .iter()
        .map(|data| &data.replicates[block])
        .collect::<Vec<_>>();

    let time = &replicates[0].time;
    let consistent = replicates
        .iter()
        .all(|replicate| replicate.time == *time && replicate.data.len() == time.len());

    if !consistent {
        return Err(DocumentError::InconsistentTimeAxes(measurement.id.clone()));
    }

    let ncols = replicates.len() + 1;
    Ok(Array2::from_shape_fn((time.len(), ncols), |(i, j)| {
        if j == 0 {
            time[i]
        } else {
            replicates[j - 1].data[i]
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::{
        MeasurementBuilder, MeasurementDataBuilder, ReplicateBuilder, Species, VesselBuilder,
    };

    fn replicate(species: &str, time: Vec<f64>, data: Vec<f64>) -> crate::prelude::Replicate {
        ReplicateBuilder::default()
            .species_id(species)
            .time_unit("s")
            .data_unit("mM")
            .time(time)
            .data(data)
            .build()
            .unwrap()
    }

    fn document(second_time: Vec<f64>) -> EnzymeMLDocument {
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
        doc.add_species(Species::small_molecule("S", "v0").build().unwrap())
            .unwrap();
        doc.add_species(Species::small_molecule("P", "v0").build().unwrap())
            .unwrap();

        let substrate = MeasurementDataBuilder::default()
            .species_id("s0")
            .init_conc(10.0)
            .unit("mM")
            .to_replicates(replicate("s0", vec![0.0, 1.0, 2.0], vec![10.0, 8.0, 6.0]))
            .to_replicates(replicate("s0", vec![0.0, 1.0, 2.0], vec![10.0, 7.5, 5.5]))
            .build()
            .unwrap();

        let product = MeasurementDataBuilder::default()
            .species_id("s1")
            .init_conc(0.0)
            .unit("mM")
            .to_replicates(replicate("s1", vec![0.0, 1.0, 2.0], vec![0.0, 2.0, 4.0]))
            .to_replicates(replicate("s1", second_time, vec![0.0, 2.5, 4.5]))
            .build()
            .unwrap();

        doc.add_measurement(
            MeasurementBuilder::default()
                .name("M1")
                .to_species_data(substrate)
                .to_species_data(product)
                .build()
                .unwrap(),
        )
        .unwrap();

        doc
    }

    #[test]
    fn test_export_stacks_replicate_blocks() {
        // Arrange
        let doc = document(vec![0.0, 1.0, 2.0]);

        // Act
        let tables = doc.export_measurement_data::<&str>(&[]).unwrap();

        // Assert
        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.measurement_id, "m0");
        assert_eq!(table.columns(), vec!["time", "s0", "s1"]);
        assert_eq!(table.data.shape(), &[6, 3]);
        assert_eq!(table.data[[4, 0]], 1.0);
        assert_eq!(table.data[[4, 1]], 7.5);
        assert_eq!(table.data[[4, 2]], 2.5);
        assert_eq!(table.column("s1"), Some(2));
    }

    #[test]
    fn test_export_by_name() {
        let doc = document(vec![0.0, 1.0, 2.0]);
        let tables = doc.export_measurement_data(&["M1"]).unwrap();
        assert_eq!(tables[0].measurement_id, "m0");
    }

    #[test]
    fn test_inconsistent_time_axes() {
        let doc = document(vec![0.0, 1.5, 2.0]);
        let result = doc.export_measurement_data(&["m0"]);
        assert_eq!(
            result,
            Err(DocumentError::InconsistentTimeAxes("m0".to_string()))
        );
    }

    #[test]
    fn test_unknown_measurement() {
        let doc = document(vec![0.0, 1.0, 2.0]);
        assert!(doc.export_measurement_data(&["m7"]).is_err());
    }
}
