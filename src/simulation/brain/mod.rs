//! Neural network implementation for bird brains.
//!
//! A fixed-topology feed-forward network with sigmoid activation on every
//! layer, plus the genetic operators (mutation and uniform crossover) the
//! evolution engine applies to it.

use ndarray::{Array1, Array2};
use rand::Rng;

use super::error::{EvoError, Result};

pub mod mlp;

pub use mlp::Mlp;

/// Logistic activation, `1 / (1 + e^-x)`.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Checks that `layer_sizes` describes a usable network.
pub fn validate_topology(layer_sizes: &[usize]) -> Result<()> {
    if layer_sizes.len() < 2 {
        return Err(EvoError::InvalidTopology {
            layer_sizes: layer_sizes.to_vec(),
            reason: "at least an input and an output layer are required",
        });
    }
    if layer_sizes.contains(&0) {
        return Err(EvoError::InvalidTopology {
            layer_sizes: layer_sizes.to_vec(),
            reason: "layer sizes must be positive",
        });
    }
    Ok(())
}

/// A multi-layer perceptron neural network.
///
/// Used as the "brain" that decides when a bird flaps. The layer sizes are
/// fixed at construction; only the parameters change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Brain {
    layer_sizes: Vec<usize>,
    layers: Vec<Mlp>,
}

impl Brain {
    /// Creates a new brain with standard normal weights and biases.
    pub fn new_random<R: Rng>(layer_sizes: &[usize], rng: &mut R) -> Result<Self> {
        validate_topology(layer_sizes)?;

        let layers = layer_sizes
            .windows(2)
            .map(|pair| Mlp::new_random(pair[0], pair[1], rng))
            .collect();

        Ok(Self {
            layer_sizes: layer_sizes.to_vec(),
            layers,
        })
    }

    /// Builds a brain from explicit parameters.
    ///
    /// `weights[i]` must be `(n_{i+1} × n_i)` and `biases[i]` must hold
    /// `n_{i+1}` values. The topology is inferred from the matrix shapes.
    pub fn from_parameters(weights: Vec<Array2<f64>>, biases: Vec<Array1<f64>>) -> Result<Self> {
        let Some(first) = weights.first() else {
            return Err(EvoError::InvalidTopology {
                layer_sizes: Vec::new(),
                reason: "no weight matrices supplied",
            });
        };

        let mut layer_sizes = Vec::with_capacity(weights.len() + 1);
        layer_sizes.push(first.ncols());
        layer_sizes.extend(weights.iter().map(Array2::nrows));

        if weights.len() != biases.len() {
            return Err(EvoError::InvalidTopology {
                layer_sizes,
                reason: "weight and bias counts differ",
            });
        }
        validate_topology(&layer_sizes)?;

        for (i, (w, b)) in weights.iter().zip(&biases).enumerate() {
            if w.ncols() != layer_sizes[i] {
                return Err(EvoError::InvalidTopology {
                    layer_sizes,
                    reason: "weight matrix columns do not match the previous layer",
                });
            }
            if b.len() != w.nrows() {
                return Err(EvoError::InvalidTopology {
                    layer_sizes,
                    reason: "bias length does not match weight rows",
                });
            }
        }

        let layers = weights
            .into_iter()
            .zip(biases)
            .map(|(weights, biases)| Mlp { weights, biases })
            .collect();

        Ok(Self {
            layer_sizes,
            layers,
        })
    }

    /// Ordered layer widths, input first.
    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    /// Width of the input layer.
    pub fn input_size(&self) -> usize {
        self.layer_sizes[0]
    }

    /// Width of the output layer.
    pub fn output_size(&self) -> usize {
        self.layer_sizes[self.layer_sizes.len() - 1]
    }

    /// Ordered layers from input to output.
    pub fn layers(&self) -> &[Mlp] {
        &self.layers
    }

    /// Total number of weights and biases.
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.weights.len() + layer.biases.len())
            .sum()
    }

    /// Runs a forward pass through all layers.
    pub fn think(&self, inputs: &[f64]) -> Result<Array1<f64>> {
        if inputs.len() != self.input_size() {
            return Err(EvoError::DimensionMismatch {
                expected: self.input_size(),
                actual: inputs.len(),
            });
        }

        let mut output = Array1::from(inputs.to_vec());
        for layer in &self.layers {
            output = layer.forward(&output);
        }

        Ok(output)
    }

    /// Mutates all layers in place.
    pub fn mutate<R: Rng>(&mut self, rate: f64, rng: &mut R) {
        for layer in &mut self.layers {
            layer.mutate(rate, rng);
        }
    }

    /// Creates a child brain by uniform per-scalar crossover of two parents.
    pub fn crossover<R: Rng>(parent1: &Brain, parent2: &Brain, rng: &mut R) -> Result<Self> {
        if parent1.layer_sizes != parent2.layer_sizes {
            return Err(EvoError::TopologyMismatch {
                left: parent1.layer_sizes.clone(),
                right: parent2.layer_sizes.clone(),
            });
        }

        let layers = parent1
            .layers
            .iter()
            .zip(&parent2.layers)
            .map(|(layer1, layer2)| Mlp::crossover(layer1, layer2, rng))
            .collect();

        Ok(Self {
            layer_sizes: parent1.layer_sizes.clone(),
            layers,
        })
    }

    /// Flattens all weights and biases into a single vector.
    ///
    /// Each layer contributes its weights in row-major order followed by
    /// its biases.
    pub fn to_flat_vector(&self) -> Vec<f64> {
        let mut flat = Vec::with_capacity(self.parameter_count());

        for layer in &self.layers {
            flat.extend(layer.weights.iter().copied());
            flat.extend(layer.biases.iter().copied());
        }

        flat
    }
}
