use crate::engine::{BoundaryPolicy, SimParams};
use glam::DVec2;

/// Advance every position by `delta_time * velocity`, then reflect velocities of particles
/// that ended up outside the box.
///
/// Positions are never clamped: a reflected particle stays where integration put it and
/// walks back in on the next frame. Returns how many particles had their velocity reflected.
pub fn step(position: &mut [DVec2], velocity: &mut [DVec2], params: &SimParams) -> usize {
    debug_assert_eq!(position.len(), velocity.len());

    let dt = params.delta_time;
    for (pos, vel) in position.iter_mut().zip(velocity.iter()) {
        *pos += dt * *vel;
    }

    let mut reflected = 0;
    for (pos, vel) in position.iter().zip(velocity.iter_mut()) {
        if reflect(*pos, vel, params.bounds, params.boundary) {
            reflected += 1;
        }
    }

    if reflected > 0 {
        log::trace!("reflected {} particle(s) at the walls", reflected);
    }
    reflected
}

/// Apply the boundary policy to a single particle; true when `vel` changed
fn reflect(pos: DVec2, vel: &mut DVec2, bounds: DVec2, policy: BoundaryPolicy) -> bool {
    match policy {
        BoundaryPolicy::Literal => {
            if out_of_bounds_literal(pos, bounds) {
                *vel = -*vel;
                true
            } else {
                false
            }
        }
        BoundaryPolicy::PerAxis => {
            let mut hit = false;
            if pos.x < 0.0 || pos.x > bounds.x {
                vel.x = -vel.x;
                hit = true;
            }
            if pos.y < 0.0 || pos.y > bounds.y {
                vel.y = -vel.y;
                hit = true;
            }
            hit
        }
    }
}

/// Negative on either axis, or past both maxima at once
#[inline]
pub fn out_of_bounds_literal(pos: DVec2, bounds: DVec2) -> bool {
    pos.x < 0.0 || pos.y < 0.0 || (pos.x > bounds.x && pos.y > bounds.y)
}
