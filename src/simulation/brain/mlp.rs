//! Single fully connected layer with sigmoid activation.

use ndarray::{Array1, Array2, Zip};
use rand::Rng;
use rand_distr::StandardNormal;

use super::sigmoid;

/// A single layer of a multi-layer perceptron.
#[derive(Debug, Clone, PartialEq)]
pub struct Mlp {
    /// Weight matrix (`output_size` × `input_size`).
    pub(crate) weights: Array2<f64>,
    /// Bias vector (`output_size`).
    pub(crate) biases: Array1<f64>,
}

impl Mlp {
    /// Creates a new layer with weights and biases drawn from a standard normal distribution.
    pub fn new_random<R: Rng>(input_size: usize, output_size: usize, rng: &mut R) -> Self {
        let weights = Array2::from_shape_simple_fn((output_size, input_size), || {
            rng.sample::<f64, _>(StandardNormal)
        });
        let biases = Array1::from_shape_simple_fn(output_size, || rng.sample::<f64, _>(StandardNormal));

        Self { weights, biases }
    }

    /// Weight matrix (`output_size` × `input_size`).
    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    /// Bias vector (`output_size`).
    pub fn biases(&self) -> &Array1<f64> {
        &self.biases
    }

    /// Number of inputs this layer consumes.
    pub fn input_size(&self) -> usize {
        self.weights.ncols()
    }

    /// Number of outputs this layer produces.
    pub fn output_size(&self) -> usize {
        self.weights.nrows()
    }

    /// Performs forward pass with sigmoid activation.
    #[inline]
    pub fn forward(&self, inputs: &Array1<f64>) -> Array1<f64> {
        let mut output = self.weights.dot(inputs);
        output += &self.biases;
        output.mapv_inplace(sigmoid);
        output
    }

    /// Adds standard normal noise to each scalar independently with probability `rate`.
    pub fn mutate<R: Rng>(&mut self, rate: f64, rng: &mut R) {
        let mut perturb = |value: &mut f64| {
            if rng.random::<f64>() < rate {
                *value += rng.sample::<f64, _>(StandardNormal);
            }
        };
        self.weights.iter_mut().for_each(&mut perturb);
        self.biases.iter_mut().for_each(&mut perturb);
    }

    /// Creates a new layer taking every scalar from one parent or the other by a fair coin flip.
    ///
    /// Callers must ensure both parents have the same shape.
    pub fn crossover<R: Rng>(parent1: &Mlp, parent2: &Mlp, rng: &mut R) -> Self {
        let weights = Zip::from(&parent1.weights)
            .and(&parent2.weights)
            .map_collect(|&a, &b| if rng.random_bool(0.5) { a } else { b });
        let biases = Zip::from(&parent1.biases)
            .and(&parent2.biases)
            .map_collect(|&a, &b| if rng.random_bool(0.5) { a } else { b });

        Self { weights, biases }
    }
}
