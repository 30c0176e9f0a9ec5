use serde::{Deserialize, Serialize};

use super::brain;
use super::error::{EvoError, Result};

/// Number of values in a course observation.
pub const OBSERVATION_SIZE: usize = 4;

/// How the non-elite slots of the next generation are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReproductionStrategy {
    /// Every offspring is a mutated clone of the elite.
    #[default]
    EliteOnly,
    /// Offspring come from crossover of two roulette-selected parents, then mutation.
    Roulette,
}

/// Evolution and training parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Birds per generation.
    pub population_size: usize,
    /// Neural network layer dimensions.
    pub layer_sizes: Vec<usize>,
    /// Per-scalar probability of perturbing a weight or bias.
    pub mutation_rate: f64,
    /// Offspring strategy used by the evolution step.
    pub strategy: ReproductionStrategy,
    /// Seed for the random source. A random seed is chosen when absent.
    pub seed: Option<u64>,
    /// Ticks after which a generation is ended even with several birds alive.
    pub max_ticks_per_generation: u64,
    /// Obstacle course settings.
    pub course: CourseParams,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            population_size: 15,
            layer_sizes: vec![OBSERVATION_SIZE, 6, 1],
            mutation_rate: 0.1,
            strategy: ReproductionStrategy::EliteOnly,
            seed: None,
            max_ticks_per_generation: 10_000,
            course: CourseParams::default(),
        }
    }
}

impl Params {
    /// Loads parameters from a JSON file; missing fields take their defaults.
    pub fn load_from_file(path: &str) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&json)
            .map_err(|e| EvoError::InvalidParams(format!("{path}: {e}")))?;
        params.validate()?;
        Ok(params)
    }

    /// Checks that the parameters can drive a training run.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(EvoError::InvalidParams(
                "population_size must be at least 1".into(),
            ));
        }
        validate_mutation_rate(self.mutation_rate)?;
        brain::validate_topology(&self.layer_sizes)?;
        if self.layer_sizes[0] != OBSERVATION_SIZE {
            return Err(EvoError::InvalidParams(format!(
                "input layer must have {OBSERVATION_SIZE} neurons, got {}",
                self.layer_sizes[0]
            )));
        }
        if self.layer_sizes[self.layer_sizes.len() - 1] != 1 {
            return Err(EvoError::InvalidParams(
                "output layer must have exactly one neuron".into(),
            ));
        }
        self.course.validate()
    }
}

/// Rejects mutation rates outside `[0, 1]`.
pub fn validate_mutation_rate(rate: f64) -> Result<()> {
    if (0.0..=1.0).contains(&rate) {
        Ok(())
    } else {
        Err(EvoError::InvalidParams(format!(
            "mutation rate {rate} must lie in [0, 1]"
        )))
    }
}

/// Geometry, physics and rewards of the headless obstacle course.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseParams {
    /// Width used to normalise horizontal distances; pipes spawn here.
    pub screen_width: f64,
    /// Height of the playfield.
    pub screen_height: f64,
    /// Vertical opening between the top and bottom pipe.
    pub pipe_gap: f64,
    /// A new pipe appears every this many frames.
    pub pipe_frequency: u64,
    /// Horizontal size of a pipe.
    pub pipe_width: f64,
    /// Pixels a pipe moves left per tick.
    pub pipe_speed: f64,
    /// Minimum distance between a gap and the top or bottom edge.
    pub pipe_margin: f64,
    /// Fixed horizontal position of every bird.
    pub bird_x: f64,
    /// Side length of a bird's square hitbox.
    pub bird_size: f64,
    /// Downward acceleration per tick.
    pub gravity: f64,
    /// Velocity set by a flap (negative is up).
    pub jump_force: f64,
    /// Fitness charged per tick survived.
    pub survival_reward: f64,
    /// Fitness charged for passing a pipe.
    pub pass_reward: f64,
}

impl Default for CourseParams {
    fn default() -> Self {
        Self {
            screen_width: 1000.0,
            screen_height: 600.0,
            pipe_gap: 150.0,
            pipe_frequency: 50,
            pipe_width: 60.0,
            pipe_speed: 5.0,
            pipe_margin: 100.0,
            bird_x: 100.0,
            bird_size: 30.0,
            gravity: 0.6,
            jump_force: -10.0,
            survival_reward: 0.1,
            pass_reward: 5.0,
        }
    }
}

impl CourseParams {
    /// Checks that a course built from these settings can be stepped.
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("screen_width", self.screen_width),
            ("screen_height", self.screen_height),
            ("pipe_gap", self.pipe_gap),
            ("pipe_width", self.pipe_width),
            ("pipe_speed", self.pipe_speed),
            ("pipe_margin", self.pipe_margin),
            ("bird_x", self.bird_x),
            ("bird_size", self.bird_size),
            ("gravity", self.gravity),
            ("jump_force", self.jump_force),
            ("survival_reward", self.survival_reward),
            ("pass_reward", self.pass_reward),
        ];
        if let Some((name, value)) = values.iter().find(|(_, value)| !value.is_finite()) {
            return Err(EvoError::InvalidParams(format!(
                "{name} must be a finite number, got {value}"
            )));
        }
        if self.pipe_frequency == 0 {
            return Err(EvoError::InvalidParams(
                "pipe_frequency must be at least 1".into(),
            ));
        }
        if self.screen_width <= 0.0 || self.screen_height <= 0.0 {
            return Err(EvoError::InvalidParams(
                "screen dimensions must be positive".into(),
            ));
        }
        if self.pipe_speed <= 0.0 {
            return Err(EvoError::InvalidParams(
                "pipe_speed must be positive".into(),
            ));
        }
        if self.pipe_gap < 0.0 || self.pipe_margin < 0.0 {
            return Err(EvoError::InvalidParams(
                "pipe_gap and pipe_margin must not be negative".into(),
            ));
        }
        if self.screen_height - 2.0 * self.pipe_margin - self.pipe_gap < 0.0 {
            return Err(EvoError::InvalidParams(
                "pipe gap and margins do not fit on screen".into(),
            ));
        }
        Ok(())
    }
}
