use serde::{Deserialize, Serialize};

use super::population::Population;

/// Outcome of one finished generation, captured just before evolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// 1-based generation number.
    pub generation: u32,
    /// Highest fitness reached.
    pub best_fitness: f64,
    /// Mean fitness over all birds.
    pub mean_fitness: f64,
    /// Birds still alive when the generation ended.
    pub survivors: usize,
    /// Ticks the generation lasted.
    pub ticks: u64,
    /// Pipes passed during the generation.
    pub score: u32,
}

impl GenerationSummary {
    /// Summarises `population` at the end of a generation.
    pub fn from_population(generation: u32, population: &Population, ticks: u64, score: u32) -> Self {
        Self {
            generation,
            best_fitness: population.best_fitness(),
            mean_fitness: population.mean_fitness(),
            survivors: population.alive_count(),
            ticks,
            score,
        }
    }
}

/// Best fitness per generation over the history, in order.
pub fn best_fitness_curve(history: &[GenerationSummary]) -> Vec<f64> {
    history.iter().map(|summary| summary.best_fitness).collect()
}
