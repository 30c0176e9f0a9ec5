//! Generation loop tying the course to the evolution engine.
//!
//! The trainer is the only owner of the current population. At every
//! generation boundary it hands the finished population to
//! [`GeneticAlgorithm::evolve`] and keeps the returned one, so there is never
//! a second reference that could observe a stale generation.

use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use super::course::Course;
use super::error::{EvoError, Result};
use super::evolution::GeneticAlgorithm;
use super::params::{OBSERVATION_SIZE, Params};
use super::persistence;
use super::population::Population;
use super::rng;
use super::stats::GenerationSummary;

/// Runs generations of birds through the course and evolves them.
#[derive(Debug, Clone)]
pub struct Trainer {
    params: Params,
    engine: GeneticAlgorithm,
    population: Population,
    course: Course,
    rng: ChaCha8Rng,
    generation: u32,
    ticks: u64,
    history: Vec<GenerationSummary>,
}

impl Trainer {
    /// Creates a trainer with a fresh random population.
    pub fn new(params: Params) -> Result<Self> {
        params.validate()?;
        let seed = rng::resolve_seed(params.seed);
        let mut rng = rng::create_rng(seed);
        let population = Population::new_random(params.population_size, &params.layer_sizes, &mut rng)?;
        info!(seed, birds = population.len(), "starting with a new population");
        Self::assemble(params, population, rng)
    }

    /// Creates a trainer continuing from an existing population, e.g. one loaded from disk.
    pub fn with_population(params: Params, population: Population) -> Result<Self> {
        params.validate()?;
        if population.is_empty() {
            return Err(EvoError::InvalidParams("population has no birds".into()));
        }
        for bird in &population {
            let brain = bird.brain();
            if brain.input_size() != OBSERVATION_SIZE {
                return Err(EvoError::DimensionMismatch {
                    expected: OBSERVATION_SIZE,
                    actual: brain.input_size(),
                });
            }
            if brain.output_size() != 1 {
                return Err(EvoError::DimensionMismatch {
                    expected: 1,
                    actual: brain.output_size(),
                });
            }
        }
        let seed = rng::resolve_seed(params.seed);
        info!(seed, birds = population.len(), "continuing from an existing population");
        Self::assemble(params, population, rng::create_rng(seed))
    }

    fn assemble(params: Params, population: Population, rng: ChaCha8Rng) -> Result<Self> {
        let engine = GeneticAlgorithm::from_params(&params)?;
        let course = Course::new(params.course.clone(), population.len())?;
        Ok(Self {
            params,
            engine,
            population,
            course,
            rng,
            generation: 1,
            ticks: 0,
            history: Vec::new(),
        })
    }

    /// The current generation's birds.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// 1-based number of the generation currently being played.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Summaries of all finished generations.
    pub fn history(&self) -> &[GenerationSummary] {
        &self.history
    }

    /// The course the current generation is playing.
    pub fn course(&self) -> &Course {
        &self.course
    }

    /// The evolution engine.
    pub fn engine(&self) -> &GeneticAlgorithm {
        &self.engine
    }

    /// Changes the mutation rate applied from the next generation on.
    pub fn set_mutation_rate(&mut self, rate: f64) -> Result<()> {
        self.engine.set_mutation_rate(rate)?;
        self.params.mutation_rate = rate;
        Ok(())
    }

    /// Whether the current generation is over (at most one bird alive).
    pub fn generation_finished(&self) -> bool {
        self.population.at_most_one_alive()
    }

    /// Advances the course by one tick.
    pub fn tick(&mut self) -> Result<()> {
        self.course.step(&mut self.population, &mut self.rng)?;
        self.ticks += 1;
        Ok(())
    }

    /// Plays the current generation to its end, then evolves the next one.
    ///
    /// The generation ends when at most one bird is alive or after
    /// `max_ticks_per_generation` ticks.
    pub fn run_generation(&mut self) -> Result<GenerationSummary> {
        while !self.generation_finished() && self.ticks < self.params.max_ticks_per_generation {
            self.tick()?;
        }
        if !self.generation_finished() {
            debug!(
                generation = self.generation,
                alive = self.population.alive_count(),
                "tick limit reached"
            );
        }

        let summary = GenerationSummary::from_population(
            self.generation,
            &self.population,
            self.ticks,
            self.course.score(),
        );
        info!(
            generation = summary.generation,
            best_fitness = summary.best_fitness,
            mean_fitness = summary.mean_fitness,
            score = summary.score,
            ticks = summary.ticks,
            "generation complete"
        );

        let finished = std::mem::take(&mut self.population);
        self.population = self.engine.evolve(finished, &mut self.rng);
        self.course.reset(self.population.len());
        self.ticks = 0;
        self.generation += 1;
        self.history.push(summary.clone());

        Ok(summary)
    }

    /// Runs `generations` full generations.
    pub fn run(&mut self, generations: u32) -> Result<()> {
        for _ in 0..generations {
            self.run_generation()?;
        }
        Ok(())
    }

    /// Saves the current population to a JSON file.
    pub fn save(&self, path: &str) -> Result<()> {
        persistence::save_population(&self.population, path)
    }
}
