use crate::collision::{detect_collisions, resolve_collisions};
use crate::engine::SimParams;
use crate::integrator;
use glam::DVec2;

/// Counts describing what happened during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Particles whose velocity was reflected at a wall
    pub reflected: usize,
    /// Pairs whose velocities were exchanged
    pub collisions: usize,
    /// Overlapping pairs skipped because their centers coincide
    pub coincident: usize,
}

/// Advance the ensemble by one frame: integrate and reflect, then detect and resolve.
///
/// The colliding pair set is taken from post-integration positions and fixed before any
/// velocity is changed by resolution. Only `position` is meaningful to a renderer afterwards.
pub fn advance_frame(
    position: &mut [DVec2],
    velocity: &mut [DVec2],
    params: &SimParams,
) -> FrameReport {
    let reflected = integrator::step(position, velocity, params);

    let pairs = detect_collisions(position, params.radius);
    let resolution = resolve_collisions(&pairs, position, velocity);

    if resolution.resolved > 0 {
        log::debug!("resolved {} collision(s)", resolution.resolved);
    }

    FrameReport {
        reflected,
        collisions: resolution.resolved,
        coincident: resolution.coincident,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_integrates_before_detecting() {
        // 0.3 apart before the move, 0.1 apart after it; threshold is 0.2
        let params = SimParams::new(0.1, DVec2::new(10.0, 10.0), 0.1);
        let mut pos = vec![DVec2::new(1.0, 1.0), DVec2::new(1.3, 1.0)];
        let mut vel = vec![DVec2::new(1.0, 0.0), DVec2::new(-1.0, 0.0)];
        let report = advance_frame(&mut pos, &mut vel, &params);

        assert_eq!(report.collisions, 1);
        assert!((vel[0] - DVec2::new(-1.0, 0.0)).length() < 1e-9);
        assert!((vel[1] - DVec2::new(1.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_single_particle_still_integrates() {
        let params = SimParams::new(1.0, DVec2::new(10.0, 10.0), 0.5);
        let mut pos = vec![DVec2::new(2.0, 2.0)];
        let mut vel = vec![DVec2::new(1.0, 1.0)];
        let report = advance_frame(&mut pos, &mut vel, &params);

        assert_eq!(report, FrameReport::default());
        assert_eq!(pos[0], DVec2::new(3.0, 3.0));
    }
}
