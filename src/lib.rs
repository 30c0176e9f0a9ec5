//! # Flapevo - Neuro-evolution for obstacle-course birds
//!
//! A population of small feed-forward networks learns to steer birds through
//! a side-scrolling pipe course. There is no gradient descent: every
//! generation the fittest bird is kept and mutated copies of it fill the
//! rest of the flock.
//!
//! ## Features
//!
//! - Neural network brains (MLP with sigmoid activation)
//! - Genetic algorithm evolution (roulette selection, uniform crossover, mutation, elitism)
//! - Seedable random source for reproducible runs
//! - Headless obstacle course for training without a renderer
//! - Save/load populations as JSON
//!
//! ## Core Modules
//!
//! - [`simulation::brain`] - Neural network implementation
//! - [`simulation::bird`] - Bird state and decisions
//! - [`simulation::population`] - One generation of birds
//! - [`simulation::evolution`] - Selection, crossover, mutation and elitism
//! - [`simulation::persistence`] - Population file format
//! - [`simulation::trainer`] - Generation loop

/// Core simulation logic and data structures.
pub mod simulation {
    /// Birds and their per-generation state.
    pub mod bird;
    /// Neural network implementation for bird brains.
    pub mod brain;
    /// Headless obstacle course driving the birds.
    pub mod course;
    /// Error type for the whole crate.
    pub mod error;
    /// Generational evolution engine.
    pub mod evolution;
    /// Training and course parameters.
    pub mod params;
    /// JSON persistence of populations.
    pub mod persistence;
    /// Ordered collection of birds forming one generation.
    pub mod population;
    /// Seedable random sources.
    pub mod rng;
    /// Per-generation statistics.
    pub mod stats;
    /// Generation loop owning the population.
    pub mod trainer;
}
