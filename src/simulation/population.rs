//! An ordered generation of birds.

use rand::Rng;

use super::bird::Bird;
use super::error::Result;

/// All birds of one generation, in a stable order.
#[derive(Debug, Clone, Default)]
pub struct Population {
    birds: Vec<Bird>,
}

impl Population {
    /// Creates `size` birds with random brains of the given topology.
    pub fn new_random<R: Rng>(size: usize, layer_sizes: &[usize], rng: &mut R) -> Result<Self> {
        let birds = (0..size)
            .map(|_| Bird::new_random(layer_sizes, rng))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { birds })
    }

    /// Wraps an existing list of birds.
    pub fn from_birds(birds: Vec<Bird>) -> Self {
        Self { birds }
    }

    /// Number of birds.
    pub fn len(&self) -> usize {
        self.birds.len()
    }

    /// Whether the population holds no birds.
    pub fn is_empty(&self) -> bool {
        self.birds.is_empty()
    }

    /// Birds in population order.
    pub fn birds(&self) -> &[Bird] {
        &self.birds
    }

    /// Mutable access for the simulation driving this generation.
    pub fn birds_mut(&mut self) -> &mut [Bird] {
        &mut self.birds
    }

    /// Iterates over the birds in population order.
    pub fn iter(&self) -> std::slice::Iter<'_, Bird> {
        self.birds.iter()
    }

    /// Highest fitness in the population, or 0 when empty.
    pub fn best_fitness(&self) -> f64 {
        self.best_index().map_or(0.0, |i| self.birds[i].fitness())
    }

    /// Index of the fittest bird; ties go to the earliest one.
    pub fn best_index(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, bird) in self.birds.iter().enumerate() {
            match best {
                Some(b) if self.birds[b].fitness() >= bird.fitness() => {}
                _ => best = Some(i),
            }
        }
        best
    }

    /// The fittest bird (first on ties).
    pub fn best(&self) -> Option<&Bird> {
        self.best_index().map(|i| &self.birds[i])
    }

    /// Sum of all fitness values.
    pub fn total_fitness(&self) -> f64 {
        self.birds.iter().map(Bird::fitness).sum()
    }

    /// Mean fitness, or 0 when empty.
    pub fn mean_fitness(&self) -> f64 {
        if self.birds.is_empty() {
            0.0
        } else {
            self.total_fitness() / self.birds.len() as f64
        }
    }

    /// Number of birds still alive.
    pub fn alive_count(&self) -> usize {
        self.birds.iter().filter(|bird| bird.is_alive()).count()
    }

    /// Generation boundary: one or no birds left alive.
    pub fn at_most_one_alive(&self) -> bool {
        self.alive_count() <= 1
    }

    /// Whether every bird has died.
    pub fn all_dead(&self) -> bool {
        self.birds.iter().all(|bird| !bird.is_alive())
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a Bird;
    type IntoIter = std::slice::Iter<'a, Bird>;

    fn into_iter(self) -> Self::IntoIter {
        self.birds.iter()
    }
}
