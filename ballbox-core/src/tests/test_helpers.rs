//! Test helper utilities for ballbox tests

use crate::runtime::{SceneError, SimulationResult};
use glam::DVec2;
use std::fs;
use std::path::Path;

/// Check if two floating point values are approximately equal within tolerance
pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

/// Component-wise approximate equality for vectors
pub fn approx_eq_vec(a: DVec2, b: DVec2, tol: f64) -> bool {
    approx_eq(a.x, b.x, tol) && approx_eq(a.y, b.y, tol)
}

/// Run a scene from a file path
pub fn run_scene_file(path: impl AsRef<Path>) -> Result<SimulationResult, Box<dyn std::error::Error>> {
    let src = fs::read_to_string(path)?;
    Ok(crate::run_scene(&src)?)
}

/// Run a scene from source string
pub fn run_scene_source(source: &str) -> Result<SimulationResult, SceneError> {
    crate::run_scene(source)
}

/// Look up a detector value by name
pub fn detector(result: &SimulationResult, name: &str) -> Option<f64> {
    result
        .detectors
        .iter()
        .find(|d| d.name == name)
        .map(|d| d.value)
}

/// Compare two simulation results with tolerance
pub fn results_approx_equal(a: &SimulationResult, b: &SimulationResult, tol: f64) -> bool {
    if a.detectors.len() != b.detectors.len() || a.frames != b.frames {
        return false;
    }

    // Sort by name for comparison
    let mut a_sorted: Vec<_> = a.detectors.iter().collect();
    let mut b_sorted: Vec<_> = b.detectors.iter().collect();
    a_sorted.sort_by_key(|d| &d.name);
    b_sorted.sort_by_key(|d| &d.name);

    a_sorted
        .iter()
        .zip(b_sorted.iter())
        .all(|(x, y)| x.name == y.name && approx_eq(x.value, y.value, tol))
}
