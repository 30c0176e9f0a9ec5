//! Birds: one brain plus the per-generation state the course updates.

use rand::Rng;

use super::brain::Brain;
use super::error::Result;

/// Output value above which a bird flaps.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// A bird controlled by its own neural network.
///
/// Fitness and the alive flag only live for one generation: offspring
/// always start at zero fitness and alive.
#[derive(Debug, Clone)]
pub struct Bird {
    brain: Brain,
    fitness: f64,
    alive: bool,
}

impl Bird {
    /// Creates a bird with a freshly randomised brain.
    pub fn new_random<R: Rng>(layer_sizes: &[usize], rng: &mut R) -> Result<Self> {
        Ok(Self::with_brain(Brain::new_random(layer_sizes, rng)?))
    }

    /// Creates a bird whose brain is a deep copy of `brain`.
    pub fn from_brain(brain: &Brain) -> Self {
        Self::with_brain(brain.clone())
    }

    /// Creates a bird that takes ownership of `brain`.
    pub fn with_brain(brain: Brain) -> Self {
        Self {
            brain,
            fitness: 0.0,
            alive: true,
        }
    }

    pub(crate) fn restored(brain: Brain, fitness: f64) -> Self {
        Self {
            brain,
            fitness,
            alive: true,
        }
    }

    /// The bird's neural network.
    pub fn brain(&self) -> &Brain {
        &self.brain
    }

    /// Fitness accumulated so far in this generation.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Whether the bird is still in play this generation.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Returns the brain's first output for `observation`.
    pub fn think(&self, observation: &[f64]) -> Result<f64> {
        let output = self.brain.think(observation)?;
        Ok(output[0])
    }

    /// Decides whether to flap: `true` iff the network output exceeds 0.5.
    pub fn decide(&self, observation: &[f64]) -> Result<bool> {
        Ok(self.think(observation)? > DECISION_THRESHOLD)
    }

    /// Adds `delta` to the fitness accumulator.
    ///
    /// This does not check [`Bird::is_alive`]; only living birds should be charged.
    pub fn accumulate_fitness(&mut self, delta: f64) {
        self.fitness += delta;
    }

    /// Takes the bird out of play for the rest of the generation.
    pub fn mark_dead(&mut self) {
        self.alive = false;
    }

    /// Mutates the bird's brain in place.
    pub fn mutate<R: Rng>(&mut self, rate: f64, rng: &mut R) {
        self.brain.mutate(rate, rng);
    }
}
