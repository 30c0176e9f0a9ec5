//! JSON persistence of whole populations.
//!
//! The document mirrors the in-memory layout: one record per bird with its
//! fitness and brain, weight matrices as nested row arrays and biases as
//! single-column matrices. Alive flags are never stored; every loaded bird
//! starts alive.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::bird::Bird;
use super::brain::Brain;
use super::error::{EvoError, Result};
use super::population::Population;

/// Top-level saved population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationDocument {
    /// One record per bird, in population order.
    pub birds: Vec<BirdRecord>,
}

/// A single saved bird.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirdRecord {
    /// Fitness at the time of saving.
    pub fitness: f64,
    /// The bird's network parameters.
    pub brain: BrainRecord,
}

/// Saved network parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainRecord {
    /// Layer widths, input first.
    pub layer_sizes: Vec<usize>,
    /// `weights[i][row][col]`, shape `layer_sizes[i+1] × layer_sizes[i]`.
    pub weights: Vec<Vec<Vec<f64>>>,
    /// `biases[i][row][0]`, shape `layer_sizes[i+1] × 1`.
    pub biases: Vec<Vec<Vec<f64>>>,
}

/// Converts a population into its document form.
pub fn serialize(population: &Population) -> PopulationDocument {
    PopulationDocument {
        birds: population
            .iter()
            .map(|bird| BirdRecord {
                fitness: bird.fitness(),
                brain: brain_record(bird.brain()),
            })
            .collect(),
    }
}

fn brain_record(brain: &Brain) -> BrainRecord {
    BrainRecord {
        layer_sizes: brain.layer_sizes().to_vec(),
        weights: brain
            .layers()
            .iter()
            .map(|layer| layer.weights().outer_iter().map(|row| row.to_vec()).collect::<Vec<_>>())
            .collect(),
        biases: brain
            .layers()
            .iter()
            .map(|layer| layer.biases().iter().map(|&b| vec![b]).collect::<Vec<_>>())
            .collect(),
    }
}

/// Rebuilds a population from its document form.
pub fn deserialize(document: &PopulationDocument) -> Result<Population> {
    document
        .birds
        .iter()
        .enumerate()
        .map(|(i, record)| {
            restore_bird(record).map_err(|e| match e {
                EvoError::MalformedDocument(msg) => {
                    EvoError::MalformedDocument(format!("bird {i}: {msg}"))
                }
                other => other,
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(Population::from_birds)
}

fn restore_bird(record: &BirdRecord) -> Result<Bird> {
    if !record.fitness.is_finite() || record.fitness < 0.0 {
        return Err(malformed(format!(
            "fitness {} must be a non-negative number",
            record.fitness
        )));
    }
    Ok(Bird::restored(restore_brain(&record.brain)?, record.fitness))
}

fn restore_brain(record: &BrainRecord) -> Result<Brain> {
    if record.weights.is_empty() {
        return Err(malformed("brain has no weight matrices"));
    }
    if record.weights.len() != record.biases.len() {
        return Err(malformed(format!(
            "{} weight matrices but {} bias vectors",
            record.weights.len(),
            record.biases.len()
        )));
    }

    let mut weights = Vec::with_capacity(record.weights.len());
    let mut biases = Vec::with_capacity(record.biases.len());
    let mut inferred: Vec<usize> = Vec::with_capacity(record.weights.len() + 1);

    for (layer, (w, b)) in record.weights.iter().zip(&record.biases).enumerate() {
        let matrix = to_matrix(w).map_err(|msg| malformed(format!("weights[{layer}]: {msg}")))?;

        match inferred.last().copied() {
            None => inferred.push(matrix.ncols()),
            Some(previous) if previous != matrix.ncols() => {
                return Err(malformed(format!(
                    "weights[{layer}] has {} columns but the previous layer has {previous} outputs",
                    matrix.ncols()
                )));
            }
            Some(_) => {}
        }
        inferred.push(matrix.nrows());

        if b.len() != matrix.nrows() {
            return Err(malformed(format!(
                "biases[{layer}] has {} rows but weights[{layer}] has {}",
                b.len(),
                matrix.nrows()
            )));
        }
        if let Some(row) = b.iter().position(|row| row.len() != 1) {
            return Err(malformed(format!("biases[{layer}][{row}] must hold exactly one value")));
        }

        weights.push(matrix);
        biases.push(b.iter().map(|row| row[0]).collect::<Array1<f64>>());
    }

    if record.layer_sizes != inferred {
        return Err(malformed(format!(
            "layer_sizes {:?} disagree with matrix shapes {inferred:?}",
            record.layer_sizes
        )));
    }

    Brain::from_parameters(weights, biases).map_err(|e| malformed(e.to_string()))
}

fn to_matrix(rows: &[Vec<f64>]) -> std::result::Result<Array2<f64>, String> {
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, Vec::len);
    if n_rows == 0 || n_cols == 0 {
        return Err("matrix is empty".into());
    }
    if let Some(row) = rows.iter().position(|row| row.len() != n_cols) {
        return Err(format!("row {row} is ragged (expected {n_cols} columns)"));
    }

    let flat = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((n_rows, n_cols), flat).map_err(|e| e.to_string())
}

fn malformed(msg: impl Into<String>) -> EvoError {
    EvoError::MalformedDocument(msg.into())
}

/// Serialises a population to a JSON string.
///
/// Fails with [`EvoError::MalformedDocument`] when a fitness, weight or bias
/// is not a finite number (JSON would write it as `null`), or a fitness is
/// negative: such a file could not be loaded back.
pub fn to_json(population: &Population) -> Result<String> {
    check_storable(population)?;
    serde_json::to_string(&serialize(population)).map_err(|e| malformed(e.to_string()))
}

fn check_storable(population: &Population) -> Result<()> {
    for (i, bird) in population.iter().enumerate() {
        let fitness = bird.fitness();
        if !fitness.is_finite() || fitness < 0.0 {
            return Err(malformed(format!(
                "bird {i}: fitness {fitness} cannot be saved"
            )));
        }
        for (layer, mlp) in bird.brain().layers().iter().enumerate() {
            let finite = mlp.weights().iter().chain(mlp.biases()).all(|v| v.is_finite());
            if !finite {
                return Err(malformed(format!(
                    "bird {i}: layer {layer} holds a non-finite parameter"
                )));
            }
        }
    }
    Ok(())
}

/// Parses a JSON string into a population.
pub fn from_json(json: &str) -> Result<Population> {
    let document: PopulationDocument =
        serde_json::from_str(json).map_err(|e| malformed(e.to_string()))?;
    deserialize(&document)
}

/// Saves a population to a JSON file.
pub fn save_population(population: &Population, path: &str) -> Result<()> {
    let json = to_json(population)?;
    std::fs::write(path, json)?;
    info!(path, birds = population.len(), "population saved");
    Ok(())
}

/// Loads a population from a JSON file.
pub fn load_population(path: &str) -> Result<Population> {
    let json = std::fs::read_to_string(path)?;
    let population = from_json(&json)?;
    info!(path, birds = population.len(), "population loaded");
    Ok(population)
}
