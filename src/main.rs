use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use flapevo::simulation::params::Params;
use flapevo::simulation::persistence;
use flapevo::simulation::stats;
use flapevo::simulation::trainer::Trainer;

/// Evolve neural-network birds on a headless obstacle course.
#[derive(Debug, Parser)]
#[command(name = "flapevo", version)]
struct Args {
    /// Number of generations to run.
    #[arg(short, long, default_value_t = 50)]
    generations: u32,

    /// JSON file with training parameters (missing fields use defaults).
    #[arg(long)]
    params: Option<String>,

    /// Population file to resume from; a fresh population is used if it cannot be loaded.
    #[arg(long, default_value = "population.json")]
    population: String,

    /// Where to save the final population.
    #[arg(long)]
    save: Option<String>,

    /// Seed for the random source.
    #[arg(long)]
    seed: Option<u64>,

    /// Per-weight mutation probability, overriding the parameters file.
    #[arg(long)]
    mutation_rate: Option<f64>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut params = match &args.params {
        Some(path) => Params::load_from_file(path)
            .with_context(|| format!("failed to load parameters from {path}"))?,
        None => Params::default(),
    };
    if args.seed.is_some() {
        params.seed = args.seed;
    }
    if let Some(rate) = args.mutation_rate {
        params.mutation_rate = rate;
    }

    let mut trainer = bootstrap_trainer(params, &args.population)?;

    info!(generations = args.generations, "Starting neuro-evolution run");
    trainer.run(args.generations)?;

    let curve = stats::best_fitness_curve(trainer.history());
    let best = curve.iter().copied().fold(0.0, f64::max);
    info!(best_fitness = best, generations = curve.len(), "Run finished");

    if let Some(path) = &args.save {
        trainer
            .save(path)
            .with_context(|| format!("failed to save population to {path}"))?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn bootstrap_trainer(params: Params, population_path: &str) -> Result<Trainer> {
    if Path::new(population_path).exists() {
        match persistence::load_population(population_path) {
            Ok(population) => {
                match Trainer::with_population(params.clone(), population) {
                    Ok(trainer) => return Ok(trainer),
                    Err(e) => warn!(path = population_path, error = %e, "saved population does not fit the course"),
                }
            }
            Err(e) => warn!(path = population_path, error = %e, "could not load saved population"),
        }
    }

    Trainer::new(params).context("failed to create a new population")
}
