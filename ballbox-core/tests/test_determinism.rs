//! Determinism tests - same scene, same bits

use ballbox_core::tests::test_helpers::{results_approx_equal, run_scene_source};
use ballbox_core::{build_simulation_context_from_source, step_simulation};
use std::path::PathBuf;

fn test_data_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("data");
    path.push(filename);
    path
}

#[test]
fn test_gas_determinism() {
    let source = std::fs::read_to_string(test_data_path("gas.scene")).expect("Failed to read file");

    let (mut a, _) = build_simulation_context_from_source(&source).unwrap();
    let (mut b, _) = build_simulation_context_from_source(&source).unwrap();
    assert_eq!(a.ensemble, b.ensemble);

    while !step_simulation(&mut a) {}
    while !step_simulation(&mut b) {}

    assert_eq!(a.ensemble, b.ensemble);
    assert_eq!(a.totals, b.totals);
}

#[test]
fn test_multiple_runs_determinism() {
    let source = r#"
box 5 5
radius 0.25
simulate dt = 0.02 frames = 500
particle at (1, 1) velocity (2, 1)
scatter 15 speed 1.5 seed 11
detect e = energy
detect hits = collisions
detect x0 = position(0).x
"#;

    let results: Vec<_> = (0..5)
        .map(|_| run_scene_source(source).expect("Run failed"))
        .collect();

    for i in 1..results.len() {
        assert!(
            results_approx_equal(&results[0], &results[i], 0.0),
            "Run {} should match run 0",
            i
        );
    }
}

#[test]
fn test_different_seeds_differ() {
    let scene = |seed: u64| {
        format!(
            "box 5 5\nradius 0.1\nsimulate dt = 0.01 frames = 1\nscatter 5 speed 1 seed {}\n",
            seed
        )
    };
    let (a, _) = build_simulation_context_from_source(&scene(1)).unwrap();
    let (b, _) = build_simulation_context_from_source(&scene(2)).unwrap();
    assert_ne!(a.ensemble, b.ensemble);
}
