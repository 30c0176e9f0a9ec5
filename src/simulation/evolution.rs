//! Generational evolution: roulette selection, crossover, mutation and elitism.

use rand::Rng;
use tracing::debug;

use super::bird::Bird;
use super::brain::Brain;
use super::error::Result;
use super::params::{self, Params, ReproductionStrategy};
use super::population::Population;

/// Turns one generation into the next.
///
/// The engine holds no birds itself: [`GeneticAlgorithm::evolve`] consumes
/// the finished generation and hands back its replacement.
#[derive(Debug, Clone)]
pub struct GeneticAlgorithm {
    mutation_rate: f64,
    population_size: usize,
    strategy: ReproductionStrategy,
}

impl GeneticAlgorithm {
    /// Creates an engine producing generations of `population_size` birds.
    pub fn new(mutation_rate: f64, population_size: usize) -> Result<Self> {
        params::validate_mutation_rate(mutation_rate)?;
        Ok(Self {
            mutation_rate,
            population_size,
            strategy: ReproductionStrategy::EliteOnly,
        })
    }

    /// Creates an engine from training parameters.
    pub fn from_params(params: &Params) -> Result<Self> {
        Ok(Self::new(params.mutation_rate, params.population_size)?.with_strategy(params.strategy))
    }

    /// Selects how non-elite offspring are produced.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ReproductionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Current per-scalar mutation probability.
    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    /// Changes the mutation probability used by later generations.
    pub fn set_mutation_rate(&mut self, rate: f64) -> Result<()> {
        params::validate_mutation_rate(rate)?;
        self.mutation_rate = rate;
        Ok(())
    }

    /// Size of every generation this engine produces.
    pub fn population_size(&self) -> usize {
        self.population_size
    }

    /// Offspring strategy in use.
    pub fn strategy(&self) -> ReproductionStrategy {
        self.strategy
    }

    /// Highest fitness in `population`, 0 when empty.
    pub fn best_fitness(&self, population: &Population) -> f64 {
        population.best_fitness()
    }

    /// Fitness-proportionate (roulette wheel) parent selection.
    ///
    /// With zero total fitness every bird is equally likely. Returns `None`
    /// only for an empty population.
    pub fn select_parent<'a, R: Rng>(
        &self,
        population: &'a Population,
        rng: &mut R,
    ) -> Option<&'a Bird> {
        let birds = population.birds();
        if birds.is_empty() {
            return None;
        }

        let total_fitness = population.total_fitness();
        if total_fitness <= 0.0 {
            return Some(&birds[rng.random_range(0..birds.len())]);
        }

        let selection_point = rng.random_range(0.0..total_fitness);
        let mut current_sum = 0.0;
        for bird in birds {
            current_sum += bird.fitness();
            if current_sum >= selection_point {
                return Some(bird);
            }
        }

        // Rounding can leave the running sum just short of the point.
        birds.last()
    }

    /// Creates a child bird with brain scalars drawn from either parent.
    pub fn crossover<R: Rng>(&self, parent1: &Bird, parent2: &Bird, rng: &mut R) -> Result<Bird> {
        let brain = Brain::crossover(parent1.brain(), parent2.brain(), rng)?;
        Ok(Bird::with_brain(brain))
    }

    /// Produces the next generation from a finished one.
    ///
    /// Slot 0 is an unmutated copy of the fittest bird (first on ties). With
    /// [`ReproductionStrategy::EliteOnly`] every other slot is a mutated copy
    /// of that same bird. All offspring start alive with zero fitness.
    ///
    /// # Panics
    ///
    /// Panics if `population` is empty.
    pub fn evolve<R: Rng>(&self, population: Population, rng: &mut R) -> Population {
        let elite_index = population
            .best_index()
            .expect("cannot evolve an empty population");
        let elite = &population.birds()[elite_index];

        debug!(
            elite_index,
            best_fitness = elite.fitness(),
            mutation_rate = self.mutation_rate,
            strategy = ?self.strategy,
            "evolving generation"
        );

        let mut next = Vec::with_capacity(self.population_size);
        next.push(Bird::from_brain(elite.brain()));

        while next.len() < self.population_size {
            let mut child = match self.strategy {
                ReproductionStrategy::EliteOnly => Bird::from_brain(elite.brain()),
                ReproductionStrategy::Roulette => self.roulette_child(&population, elite, rng),
            };
            child.mutate(self.mutation_rate, rng);
            next.push(child);
        }

        Population::from_birds(next)
    }

    fn roulette_child<R: Rng>(&self, population: &Population, elite: &Bird, rng: &mut R) -> Bird {
        let parent1 = self.select_parent(population, rng).unwrap_or(elite);
        let parent2 = self.select_parent(population, rng).unwrap_or(elite);

        // Parents with foreign topologies (e.g. a hand-edited save) fall back to the elite.
        self.crossover(parent1, parent2, rng)
            .unwrap_or_else(|_| Bird::from_brain(elite.brain()))
    }
}
