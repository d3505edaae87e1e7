//! Static checks on parsed scenes
//!
//! Catches parameter mistakes before a run starts. The kernel itself never validates its
//! inputs, so anything that would make a run meaningless is reported here.

use crate::ast::{Scene, SpawnKind};
use crate::diagnostics::{Diagnostic, Diagnostics};
use glam::DVec2;
use std::collections::HashMap;

/// Largest particle count a scene may request
pub const MAX_PARTICLES: usize = 1_000_000;

/// Analyze a scene and return diagnostics
pub fn analyze_scene(scene: &Scene) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    let max = scene.bounds.max;
    if !(max.x.is_finite() && max.y.is_finite() && max.x > 0.0 && max.y > 0.0) {
        diagnostics.push(Diagnostic::error(
            format!("box extents must be finite and > 0, got ({}, {})", max.x, max.y),
            scene.bounds.span,
        ));
    }

    let radius = scene.radius.value;
    let radius_ok = radius.is_finite() && radius > 0.0;
    if !radius_ok {
        diagnostics.push(Diagnostic::error(
            format!("radius must be finite and > 0, got {}", radius),
            scene.radius.span,
        ));
    }

    let dt = scene.simulate.dt;
    if !(dt.is_finite() && dt > 0.0) {
        diagnostics.push(Diagnostic::error(
            format!("dt must be finite and > 0, got {}", dt),
            scene.simulate.span,
        ));
    }
    if scene.simulate.frames == 0 {
        diagnostics.push(Diagnostic::error(
            "frames must be > 0",
            scene.simulate.span,
        ));
    }

    check_spawns(scene, radius_ok, &mut diagnostics);

    let total = scene.requested_particles();
    if total > MAX_PARTICLES {
        diagnostics.push(Diagnostic::error(
            format!(
                "scene requests {} particles, the limit is {}",
                total, MAX_PARTICLES
            ),
            None,
        ));
    }

    // Detectors: duplicate names and particle indices
    let mut names = HashMap::new();
    for (idx, detector) in scene.detectors.iter().enumerate() {
        if names.insert(detector.name.clone(), idx).is_some() {
            diagnostics.push(Diagnostic::error(
                format!("duplicate detector name '{}'", detector.name),
                detector.span,
            ));
        }
        if let Some(index) = detector.kind.particle_index() {
            if index >= total {
                diagnostics.push(Diagnostic::error(
                    format!(
                        "detector '{}' reads particle {} but the scene has {} particle(s)",
                        detector.name, index, total
                    ),
                    detector.span,
                ));
            }
        }
    }

    diagnostics
}

fn check_spawns(scene: &Scene, radius_ok: bool, diagnostics: &mut Diagnostics) {
    let max = scene.bounds.max;
    let radius = scene.radius.value;
    let threshold = 4.0 * radius * radius;

    if scene.spawns.is_empty() {
        diagnostics.push(Diagnostic::warning("scene declares no particles", None));
        return;
    }

    let mut explicit: Vec<DVec2> = Vec::new();
    for spawn in &scene.spawns {
        match spawn.kind {
            SpawnKind::Particle { position, velocity } => {
                if !(position.is_finite() && velocity.is_finite()) {
                    diagnostics.push(Diagnostic::error(
                        "particle position and velocity must be finite",
                        spawn.span,
                    ));
                    continue;
                }
                if position.x < 0.0 || position.y < 0.0 || position.x > max.x || position.y > max.y
                {
                    diagnostics.push(Diagnostic::warning(
                        format!(
                            "particle at ({}, {}) starts outside the box",
                            position.x, position.y
                        ),
                        spawn.span,
                    ));
                }
                if radius_ok
                    && explicit
                        .iter()
                        .any(|other| other.distance_squared(position) < threshold)
                {
                    diagnostics.push(Diagnostic::warning(
                        format!(
                            "particle at ({}, {}) overlaps an earlier particle",
                            position.x, position.y
                        ),
                        spawn.span,
                    ));
                }
                explicit.push(position);
            }
            SpawnKind::Scatter { count, speed, .. } => {
                if count > MAX_PARTICLES {
                    diagnostics.push(Diagnostic::error(
                        format!("scatter count {} exceeds the limit of {}", count, MAX_PARTICLES),
                        spawn.span,
                    ));
                }
                if !(speed.is_finite() && speed >= 0.0) {
                    diagnostics.push(Diagnostic::error(
                        format!("scatter speed must be finite and >= 0, got {}", speed),
                        spawn.span,
                    ));
                }
                if count > 0 && radius_ok && (max.x < 2.0 * radius || max.y < 2.0 * radius) {
                    diagnostics.push(Diagnostic::error(
                        "box must be at least 2 * radius wide on each axis to scatter particles",
                        spawn.span,
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_scene;

    fn analyze(src: &str) -> Diagnostics {
        analyze_scene(&parse_scene(src).unwrap())
    }

    const HEADER: &str = "box 10 10\nradius 0.5\nsimulate dt = 0.01 frames = 10\n";

    #[test]
    fn test_valid_scene_is_clean() {
        let diags = analyze(&format!(
            "{}particle at (1, 1) velocity (1, 0)\nscatter 5 speed 1 seed 1\ndetect x = position(5).x\n",
            HEADER
        ));
        assert!(diags.is_empty(), "{}", diags);
    }

    #[test]
    fn test_bad_parameters() {
        let diags = analyze("box 0 10\nradius -1\nsimulate dt = 0 frames = 10\nparticle at (1, 1)\n");
        assert_eq!(diags.errors().count(), 3);
    }

    #[test]
    fn test_detector_index_out_of_range() {
        let diags = analyze(&format!(
            "{}particle at (1, 1)\ndetect x = position(1).x\n",
            HEADER
        ));
        assert!(diags.has_errors());
        assert!(diags.errors().any(|d| d.message.contains("particle 1")));
    }

    #[test]
    fn test_duplicate_detector() {
        let diags = analyze(&format!(
            "{}particle at (1, 1)\ndetect e = energy\ndetect e = collisions\n",
            HEADER
        ));
        assert!(diags.errors().any(|d| d.message.contains("duplicate detector")));
    }

    #[test]
    fn test_overlap_and_outside_are_warnings() {
        let diags = analyze(&format!(
            "{}particle at (1, 1)\nparticle at (1.5, 1)\nparticle at (11, 5)\n",
            HEADER
        ));
        assert!(!diags.has_errors());
        assert_eq!(diags.warnings().count(), 2);
    }

    #[test]
    fn test_empty_scene_warns() {
        let diags = analyze(HEADER);
        assert!(!diags.has_errors());
        assert!(diags.warnings().any(|d| d.message.contains("no particles")));
    }

    #[test]
    fn test_zero_frames_is_error() {
        let diags = analyze("box 10 10\nradius 0.5\nsimulate dt = 0.01 frames = 0\nparticle at (1, 1)\n");
        assert_eq!(diags.errors().count(), 1);
        assert!(diags.errors().any(|d| d.message.contains("frames")));
    }

    #[test]
    fn test_huge_scatter_counts_do_not_overflow() {
        let diags = analyze(&format!(
            "{}particle at (1, 1)\nscatter {} speed 1 seed 0\nscatter 5 speed 1 seed 1\n",
            HEADER,
            usize::MAX
        ));
        assert!(diags.errors().any(|d| d.message.contains("scatter count")));
        assert!(diags.errors().any(|d| d.message.contains("the limit is")));
    }

    #[test]
    fn test_scatter_in_tiny_box() {
        let diags = analyze("box 0.5 10\nradius 0.5\nsimulate dt = 0.01 frames = 1\nscatter 3 speed 1 seed 0\n");
        assert!(diags.has_errors());
    }
}
