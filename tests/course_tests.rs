#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use flapevo::simulation::bird::Bird;
use flapevo::simulation::brain::Brain;
use flapevo::simulation::course::Course;
use flapevo::simulation::error::EvoError;
use flapevo::simulation::params::CourseParams;
use flapevo::simulation::population::Population;
use flapevo::simulation::rng::create_rng;
use ndarray::{Array1, Array2, array};

/// A bird whose output is a constant `sigmoid(output_bias)`.
fn constant_bird(output_bias: f64) -> Bird {
    let brain = Brain::from_parameters(
        vec![Array2::zeros((2, 4)), Array2::zeros((1, 2))],
        vec![Array1::zeros(2), array![output_bias]],
    )
    .unwrap();
    Bird::with_brain(brain)
}

fn never_flaps() -> Bird {
    constant_bird(-10.0)
}

fn always_flaps() -> Bird {
    constant_bird(10.0)
}

#[test]
fn test_first_tick_spawns_pipe() {
    let params = CourseParams::default();
    let mut population = Population::from_birds(vec![never_flaps()]);
    let mut course = Course::new(params.clone(), population.len()).unwrap();
    let mut rng = create_rng(30);

    assert!(course.pipes().is_empty());
    course.step(&mut population, &mut rng).unwrap();

    assert_eq!(course.frame(), 1);
    assert_eq!(course.pipes().len(), 1);
    let pipe = course.pipes()[0];
    assert_eq!(pipe.x, params.screen_width - params.pipe_speed);
    assert!(pipe.gap_y >= params.pipe_margin);
    assert!(pipe.gap_y <= params.screen_height - params.pipe_margin - params.pipe_gap);
}

#[test]
fn test_pipe_frequency() {
    let params = CourseParams::default();
    let mut population = Population::from_birds(vec![never_flaps()]);
    let mut course = Course::new(params, population.len()).unwrap();
    let mut rng = create_rng(31);

    for _ in 0..50 {
        course.step(&mut population, &mut rng).unwrap();
    }
    assert_eq!(course.pipes().len(), 1);

    course.step(&mut population, &mut rng).unwrap();
    assert_eq!(course.pipes().len(), 2);
}

#[test]
fn test_observation_is_normalised() {
    let params = CourseParams::default();
    let mut population = Population::from_birds(vec![never_flaps()]);
    let mut course = Course::new(params.clone(), population.len()).unwrap();
    let mut rng = create_rng(32);

    assert!(course.observation(300.0).is_none());
    course.step(&mut population, &mut rng).unwrap();

    let pipe = course.pipes()[0];
    let observation = course.observation(300.0).unwrap();
    assert_eq!(observation[0], 0.5);
    assert_eq!(observation[1], pipe.x / params.screen_width);
    assert_eq!(observation[2], pipe.gap_y / params.screen_height);
    assert_eq!(observation[3], (pipe.gap_y + params.pipe_gap) / params.screen_height);
}

#[test]
fn test_falling_bird_hits_the_floor() {
    let mut population = Population::from_birds(vec![never_flaps(), never_flaps()]);
    let mut course = Course::new(CourseParams::default(), population.len()).unwrap();
    let mut rng = create_rng(33);

    // From y = 300 with gravity 0.6 the floor (y >= 570) is reached on tick 30.
    for _ in 0..29 {
        course.step(&mut population, &mut rng).unwrap();
    }
    assert_eq!(population.alive_count(), 2);

    course.step(&mut population, &mut rng).unwrap();
    assert!(population.all_dead());
    for bird in &population {
        assert!((bird.fitness() - 2.9).abs() < 1e-9);
    }

    // Dead birds are not charged any more.
    course.step(&mut population, &mut rng).unwrap();
    for bird in &population {
        assert!((bird.fitness() - 2.9).abs() < 1e-9);
    }
}

#[test]
fn test_flapping_bird_hits_the_ceiling() {
    let mut population = Population::from_birds(vec![always_flaps(), never_flaps()]);
    let mut course = Course::new(CourseParams::default(), population.len()).unwrap();
    let mut rng = create_rng(34);

    // Each flap leaves a net velocity of -9.4: y <= 0 on tick 32.
    for _ in 0..31 {
        course.step(&mut population, &mut rng).unwrap();
    }
    assert!(population.birds()[0].is_alive());
    assert!(course.bird_y(0).unwrap() < 10.0);

    course.step(&mut population, &mut rng).unwrap();
    assert!(!population.birds()[0].is_alive());
}

#[test]
fn test_passing_a_pipe_is_rewarded() {
    // An open screen where the gap spans the full height: no pipe can be hit.
    let params = CourseParams {
        screen_height: 100_000.0,
        pipe_gap: 100_000.0,
        pipe_margin: 0.0,
        ..CourseParams::default()
    };
    let mut population = Population::from_birds(vec![never_flaps(), never_flaps()]);
    let mut course = Course::new(params, population.len()).unwrap();
    let mut rng = create_rng(35);

    // The first pipe's centre crosses x = 100 on tick 187.
    for _ in 0..186 {
        course.step(&mut population, &mut rng).unwrap();
    }
    assert_eq!(course.score(), 0);
    assert!((population.birds()[0].fitness() - 18.6).abs() < 1e-9);

    course.step(&mut population, &mut rng).unwrap();
    assert_eq!(course.score(), 1);
    assert!(course.pipes()[0].passed);
    for bird in &population {
        assert!((bird.fitness() - 23.7).abs() < 1e-9);
    }
}

#[test]
fn test_reset_clears_state() {
    let mut population = Population::from_birds(vec![always_flaps()]);
    let mut course = Course::new(CourseParams::default(), population.len()).unwrap();
    let mut rng = create_rng(36);

    for _ in 0..10 {
        course.step(&mut population, &mut rng).unwrap();
    }
    course.reset(3);

    assert_eq!(course.frame(), 0);
    assert_eq!(course.score(), 0);
    assert!(course.pipes().is_empty());
    assert_eq!(course.bird_y(2), Some(300.0));
    assert_eq!(course.bird_y(3), None);
}

#[test]
fn test_unsteppable_settings_are_rejected() {
    let cases = [
        CourseParams {
            pipe_frequency: 0,
            ..CourseParams::default()
        },
        CourseParams {
            pipe_gap: 500.0,
            ..CourseParams::default()
        },
        CourseParams {
            pipe_speed: 0.0,
            ..CourseParams::default()
        },
        CourseParams {
            screen_height: f64::NAN,
            ..CourseParams::default()
        },
        CourseParams {
            gravity: f64::INFINITY,
            ..CourseParams::default()
        },
    ];

    for params in cases {
        assert!(
            matches!(Course::new(params.clone(), 3), Err(EvoError::InvalidParams(_))),
            "{params:?} should be rejected"
        );
    }
}
