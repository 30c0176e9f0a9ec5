#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use flapevo::simulation::bird::Bird;
use flapevo::simulation::brain::Brain;
use flapevo::simulation::error::EvoError;
use flapevo::simulation::persistence::{self, PopulationDocument};
use flapevo::simulation::population::Population;
use flapevo::simulation::rng::create_rng;
use ndarray::array;
use serde_json::json;
use std::fs;

fn create_test_population() -> Population {
    let mut rng = create_rng(42);
    let mut population = Population::new_random(5, &[4, 6, 1], &mut rng).unwrap();
    for (i, bird) in population.birds_mut().iter_mut().enumerate() {
        bird.accumulate_fitness(i as f64 * 1.7 + 0.1);
        if i % 2 == 0 {
            bird.mark_dead();
        }
    }
    population
}

fn temp_path(name: &str) -> String {
    std::env::temp_dir()
        .join(format!("flapevo_{}_{name}", std::process::id()))
        .to_string_lossy()
        .into_owned()
}

fn valid_bird() -> serde_json::Value {
    json!({
        "fitness": 2.5,
        "brain": {
            "layer_sizes": [2, 2, 1],
            "weights": [[[0.5, -0.25], [1.0, 2.0]], [[1.5, -0.5]]],
            "biases": [[[0.1], [-0.3]], [[0.2]]]
        }
    })
}

fn load_value(value: serde_json::Value) -> Result<Population, EvoError> {
    persistence::from_json(&value.to_string())
}

fn assert_malformed(value: serde_json::Value) {
    let result = load_value(value);
    assert!(
        matches!(result, Err(EvoError::MalformedDocument(_))),
        "expected MalformedDocument, got {result:?}"
    );
}

#[test]
fn test_round_trip_preserves_parameters() {
    let population = create_test_population();

    let loaded = persistence::deserialize(&persistence::serialize(&population)).unwrap();

    assert_eq!(loaded.len(), population.len());
    for (original, loaded) in population.iter().zip(loaded.iter()) {
        assert_eq!(original.fitness(), loaded.fitness());
        assert_eq!(original.brain(), loaded.brain());
        assert!(loaded.is_alive(), "alive is always reset on load");
    }
}

#[test]
fn test_json_round_trip() {
    let population = create_test_population();

    let json = persistence::to_json(&population).unwrap();
    let loaded = persistence::from_json(&json).unwrap();

    for (original, loaded) in population.iter().zip(loaded.iter()) {
        assert!((original.fitness() - loaded.fitness()).abs() < 1e-12);
        for (a, b) in original
            .brain()
            .to_flat_vector()
            .iter()
            .zip(loaded.brain().to_flat_vector())
        {
            assert!((a - b).abs() < 1e-12);
        }
        assert!(loaded.is_alive());
    }
}

#[test]
fn test_document_layout() {
    let population = create_test_population();

    let json = persistence::to_json(&population).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).expect("Invalid JSON");

    let birds = parsed["birds"].as_array().unwrap();
    assert_eq!(birds.len(), 5);
    let brain = &birds[0]["brain"];
    assert_eq!(brain["layer_sizes"], json!([4, 6, 1]));
    assert_eq!(brain["weights"][0].as_array().unwrap().len(), 6);
    assert_eq!(brain["weights"][0][0].as_array().unwrap().len(), 4);
    assert_eq!(brain["biases"][0].as_array().unwrap().len(), 6);
    assert_eq!(brain["biases"][0][0].as_array().unwrap().len(), 1);
    assert_eq!(brain["weights"][1].as_array().unwrap().len(), 1);
    assert!(birds[0].get("alive").is_none());
    assert!(birds[0]["fitness"].is_number());
}

#[test]
fn test_topology_inferred_from_shapes() {
    let population = load_value(json!({ "birds": [valid_bird()] })).unwrap();

    let bird = &population.birds()[0];
    assert_eq!(bird.brain().layer_sizes(), &[2, 2, 1]);
    assert_eq!(bird.fitness(), 2.5);
    assert!(bird.is_alive());
    assert_eq!(bird.brain().layers()[1].weights()[[0, 1]], -0.5);
    assert_eq!(bird.brain().layers()[0].biases()[1], -0.3);
}

#[test]
fn test_empty_population_document() {
    let population = load_value(json!({ "birds": [] })).unwrap();
    assert!(population.is_empty());

    let document = persistence::serialize(&Population::default());
    assert_eq!(document, PopulationDocument { birds: vec![] });
}

#[test]
fn test_missing_fields_are_malformed() {
    assert_malformed(json!({}));
    assert_malformed(json!({ "birds": [{ "brain": valid_bird()["brain"] }] }));
    assert_malformed(json!({ "birds": [{ "fitness": 1.0 }] }));

    let mut bird = valid_bird();
    bird["brain"].as_object_mut().unwrap().remove("biases");
    assert_malformed(json!({ "birds": [bird] }));
}

#[test]
fn test_inconsistent_shapes_are_malformed() {
    // Bias rows disagree with weight rows.
    let mut bird = valid_bird();
    bird["brain"]["biases"][0] = json!([[0.1], [-0.3], [0.9]]);
    assert_malformed(json!({ "birds": [bird] }));

    // Ragged weight matrix.
    let mut bird = valid_bird();
    bird["brain"]["weights"][0] = json!([[0.5, -0.25], [1.0]]);
    assert_malformed(json!({ "birds": [bird] }));

    // Layers that do not chain.
    let mut bird = valid_bird();
    bird["brain"]["weights"][1] = json!([[1.5, -0.5, 0.3]]);
    assert_malformed(json!({ "birds": [bird] }));

    // Bias entries must be single-value rows.
    let mut bird = valid_bird();
    bird["brain"]["biases"][1] = json!([[0.2, 0.4]]);
    assert_malformed(json!({ "birds": [bird] }));

    // Different numbers of weight and bias matrices.
    let mut bird = valid_bird();
    bird["brain"]["biases"] = json!([[[0.1], [-0.3]]]);
    assert_malformed(json!({ "birds": [bird] }));

    // No layers at all.
    let mut bird = valid_bird();
    bird["brain"]["weights"] = json!([]);
    bird["brain"]["biases"] = json!([]);
    assert_malformed(json!({ "birds": [bird] }));

    // Declared layer sizes that contradict the matrices.
    let mut bird = valid_bird();
    bird["brain"]["layer_sizes"] = json!([2, 3, 1]);
    assert_malformed(json!({ "birds": [bird] }));
}

#[test]
fn test_negative_fitness_is_malformed() {
    let mut bird = valid_bird();
    bird["fitness"] = json!(-1.0);
    assert_malformed(json!({ "birds": [bird] }));
}

#[test]
fn test_non_finite_fitness_is_not_saved() {
    let mut population = create_test_population();
    population.birds_mut()[1].accumulate_fitness(f64::INFINITY);

    assert!(matches!(
        persistence::to_json(&population),
        Err(EvoError::MalformedDocument(_))
    ));

    let save_path = temp_path("non_finite.json");
    assert!(persistence::save_population(&population, &save_path).is_err());
    assert!(!std::path::Path::new(&save_path).exists());
}

#[test]
fn test_non_finite_weight_is_not_saved() {
    let brain = Brain::from_parameters(vec![array![[f64::NAN, 0.0]]], vec![array![0.0]]).unwrap();
    let population = Population::from_birds(vec![Bird::with_brain(brain)]);

    assert!(matches!(
        persistence::to_json(&population),
        Err(EvoError::MalformedDocument(_))
    ));
}

#[test]
fn test_invalid_json_is_malformed() {
    let result = persistence::from_json("{ this is not valid json }");
    assert!(matches!(result, Err(EvoError::MalformedDocument(_))));
}

#[test]
fn test_save_and_load_file() {
    let population = create_test_population();
    let save_path = temp_path("save_and_load.json");

    persistence::save_population(&population, &save_path).expect("Failed to save population");
    let loaded = persistence::load_population(&save_path).expect("Failed to load population");

    assert_eq!(loaded.len(), population.len());
    assert_eq!(loaded.alive_count(), loaded.len());
    for (original, loaded) in population.iter().zip(loaded.iter()) {
        assert_eq!(original.fitness(), loaded.fitness());
        assert_eq!(original.brain(), loaded.brain());
    }

    fs::remove_file(save_path).ok();
}

#[test]
fn test_load_nonexistent_file() {
    let result = persistence::load_population(&temp_path("does_not_exist.json"));
    assert!(
        matches!(result, Err(EvoError::Io(_))),
        "Loading nonexistent file should return an I/O error"
    );
}

#[test]
fn test_load_invalid_file() {
    let invalid_path = temp_path("invalid.json");
    fs::write(&invalid_path, "{ \"birds\": 3 }").expect("Failed to write test file");

    let result = persistence::load_population(&invalid_path);
    assert!(matches!(result, Err(EvoError::MalformedDocument(_))));

    fs::remove_file(invalid_path).ok();
}
