//! End-to-end runs of the scene fixtures

use ballbox_core::tests::test_helpers::{approx_eq, detector, run_scene_file};
use std::path::PathBuf;

fn test_data_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("data");
    path.push(filename);
    path
}

#[test]
fn test_head_on_swap() {
    let result = run_scene_file(test_data_path("head_on.scene")).expect("Failed to run scene");
    assert_eq!(result.frames, 20);

    // contact on frame 15, then five frames moving apart
    let x0 = detector(&result, "x0").unwrap();
    let x1 = detector(&result, "x1").unwrap();
    assert!(approx_eq(x0, 4.05, 1e-9), "x0 = {}", x0);
    assert!(approx_eq(x1, 6.0, 1e-9), "x1 = {}", x1);

    assert_eq!(detector(&result, "hits"), Some(1.0));
    assert!(approx_eq(detector(&result, "px").unwrap(), 0.0, 1e-9));
    assert!(approx_eq(detector(&result, "e").unwrap(), 1.0, 1e-9));
}

#[test]
fn test_wall_bounce() {
    let result =
        run_scene_file(test_data_path("wall_bounce.scene")).expect("Failed to run scene");

    // leaves on frame 6 at x = -0.05, comes back with the whole velocity reversed
    assert_eq!(detector(&result, "walls"), Some(1.0));
    assert!(approx_eq(detector(&result, "x").unwrap(), 0.35, 1e-9));
    assert!(approx_eq(detector(&result, "y").unwrap(), 5.1, 1e-9));
    assert!(approx_eq(detector(&result, "s").unwrap(), 1.25f64.sqrt(), 1e-12));
}

#[test]
fn test_gas_energy_is_conserved() {
    let result = run_scene_file(test_data_path("gas.scene")).expect("Failed to run scene");

    // 40 unit-mass particles at speed 1
    let e = detector(&result, "e").unwrap();
    assert!(approx_eq(e, 20.0, 1e-9), "energy drifted to {}", e);
}
