//! Headless side-scrolling obstacle course.
//!
//! Stands in for the rendered game: it owns bird positions and pipes, asks
//! each living bird for a decision every tick, applies gravity, kills birds
//! that collide and charges fitness to the survivors. Nothing here is part
//! of the evolution engine; any driver producing observations and fitness
//! the same way can replace it.

use rand::Rng;

use super::error::Result;
use super::params::{CourseParams, OBSERVATION_SIZE};
use super::population::Population;

/// A pair of pipes with a gap between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pipe {
    /// Left edge.
    pub x: f64,
    /// Top of the gap.
    pub gap_y: f64,
    /// Whether birds have already been rewarded for this pipe.
    pub passed: bool,
}

#[derive(Debug, Clone, Copy)]
struct Body {
    y: f64,
    velocity: f64,
}

/// Obstacle course state for one generation.
#[derive(Debug, Clone)]
pub struct Course {
    params: CourseParams,
    pipes: Vec<Pipe>,
    bodies: Vec<Body>,
    frame_counter: u64,
    score: u32,
}

impl Course {
    /// Creates an empty course for `bird_count` birds.
    ///
    /// Fails with [`EvoError::InvalidParams`](super::error::EvoError::InvalidParams)
    /// when the settings could not be stepped, e.g. a zero pipe frequency or
    /// a gap that does not fit on screen.
    pub fn new(params: CourseParams, bird_count: usize) -> Result<Self> {
        params.validate()?;
        let mut course = Self {
            params,
            pipes: Vec::new(),
            bodies: Vec::new(),
            frame_counter: 0,
            score: 0,
        };
        course.reset(bird_count);
        Ok(course)
    }

    /// Clears pipes and score and puts `bird_count` birds back at the start.
    pub fn reset(&mut self, bird_count: usize) {
        self.pipes.clear();
        self.frame_counter = 0;
        self.score = 0;
        self.bodies = vec![self.start_body(); bird_count];
    }

    fn start_body(&self) -> Body {
        Body {
            y: (self.params.screen_height / 2.0).floor(),
            velocity: 0.0,
        }
    }

    /// Pipes currently on screen, oldest first.
    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    /// Pipes passed so far in this generation.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Ticks elapsed since the last reset.
    pub fn frame(&self) -> u64 {
        self.frame_counter
    }

    /// Vertical position of bird `index`.
    pub fn bird_y(&self, index: usize) -> Option<f64> {
        self.bodies.get(index).map(|body| body.y)
    }

    /// Nearest pipe whose right edge is still ahead of the birds.
    pub fn nearest_pipe_ahead(&self) -> Option<&Pipe> {
        let bird_x = self.params.bird_x;
        self.pipes
            .iter()
            .filter(|pipe| pipe.x + self.params.pipe_width > bird_x)
            .min_by(|a, b| a.x.total_cmp(&b.x))
    }

    /// Observation for a bird at height `y`: its height, the nearest pipe's
    /// position and the gap's top and bottom, all normalised to the screen.
    pub fn observation(&self, y: f64) -> Option<[f64; OBSERVATION_SIZE]> {
        let p = &self.params;
        self.nearest_pipe_ahead().map(|pipe| {
            [
                y / p.screen_height,
                pipe.x / p.screen_width,
                pipe.gap_y / p.screen_height,
                (pipe.gap_y + p.pipe_gap) / p.screen_height,
            ]
        })
    }

    /// Advances the course by one tick.
    pub fn step<R: Rng>(&mut self, population: &mut Population, rng: &mut R) -> Result<()> {
        if self.bodies.len() != population.len() {
            let start = self.start_body();
            self.bodies.resize(population.len(), start);
        }

        if self.frame_counter % self.params.pipe_frequency == 0 {
            self.spawn_pipe(rng);
        }

        let passed_this_tick = self.move_pipes();

        let observations: Vec<_> = self.bodies.iter().map(|body| self.observation(body.y)).collect();
        let p = &self.params;
        let mut survivors = 0;

        for ((bird, body), observation) in population
            .birds_mut()
            .iter_mut()
            .zip(self.bodies.iter_mut())
            .zip(observations)
        {
            if !bird.is_alive() {
                continue;
            }

            if let Some(observation) = observation {
                if bird.decide(&observation)? {
                    body.velocity = p.jump_force;
                }
            }

            body.velocity += p.gravity;
            body.y += body.velocity;

            if collides(p, &self.pipes, body.y) {
                bird.mark_dead();
            } else {
                survivors += 1;
                bird.accumulate_fitness(p.survival_reward);
                bird.accumulate_fitness(p.pass_reward * f64::from(passed_this_tick));
            }
        }

        if survivors > 0 {
            self.score += passed_this_tick;
        }
        self.frame_counter += 1;
        Ok(())
    }

    fn spawn_pipe<R: Rng>(&mut self, rng: &mut R) {
        let p = &self.params;
        let low = p.pipe_margin;
        let high = p.screen_height - p.pipe_margin - p.pipe_gap;
        self.pipes.push(Pipe {
            x: p.screen_width,
            gap_y: rng.random_range(low..=high),
            passed: false,
        });
    }

    /// Moves pipes left, drops the ones off screen and returns how many had
    /// their centre cross the birds' column this tick.
    fn move_pipes(&mut self) -> u32 {
        let p = &self.params;
        let mut passed = 0;

        for pipe in &mut self.pipes {
            pipe.x -= p.pipe_speed;
            if !pipe.passed && pipe.x + p.pipe_width / 2.0 < p.bird_x {
                pipe.passed = true;
                passed += 1;
            }
        }

        self.pipes.retain(|pipe| pipe.x > -p.pipe_width);
        passed
    }
}

fn collides(p: &CourseParams, pipes: &[Pipe], y: f64) -> bool {
    if y <= 0.0 || y >= p.screen_height - p.bird_size {
        return true;
    }

    pipes.iter().any(|pipe| {
        let overlaps_x = p.bird_x < pipe.x + p.pipe_width && p.bird_x + p.bird_size > pipe.x;
        overlaps_x && (y < pipe.gap_y || y + p.bird_size > pipe.gap_y + p.pipe_gap)
    })
}
