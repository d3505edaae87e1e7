//! Pairwise collision detection and elastic resolution
//!
//! Detection and resolution are two separate passes: the set of colliding pairs is fixed
//! from the current positions before any velocity is touched.

use glam::DVec2;

/// Two overlapping particles, `i < j`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionPair {
    pub i: usize,
    pub j: usize,
    /// Squared center distance at detection time
    pub dist_sq: f64,
}

/// Outcome of a resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolution {
    pub resolved: usize,
    /// Pairs skipped because both centers coincide
    pub coincident: usize,
}

/// Find every pair whose squared distance is strictly below `(2 * radius)^2`.
///
/// All `n * (n - 1) / 2` pairs are checked. Pairs come out in lexicographic `(i, j)` order.
pub fn detect_collisions(position: &[DVec2], radius: f64) -> Vec<CollisionPair> {
    let threshold = 4.0 * radius * radius;
    let mut pairs = Vec::new();

    for (i, &pi) in position.iter().enumerate() {
        for (offset, &pj) in position[i + 1..].iter().enumerate() {
            let dist_sq = pi.distance_squared(pj);
            if dist_sq < threshold {
                pairs.push(CollisionPair {
                    i,
                    j: i + 1 + offset,
                    dist_sq,
                });
            }
        }
    }

    pairs
}

/// Exchange the normal component of relative velocity for each pair (equal unit masses).
///
/// Pairs are applied one after another in the given order. When a particle sits in more than
/// one pair, later pairs see the velocity left by earlier ones, so three-or-more-body contacts
/// depend on pair order and are not physically exact.
///
/// A pair with `dist_sq == 0` has no collision normal; it is skipped and counted in
/// [`Resolution::coincident`].
pub fn resolve_collisions(
    pairs: &[CollisionPair],
    position: &[DVec2],
    velocity: &mut [DVec2],
) -> Resolution {
    let mut out = Resolution::default();

    for pair in pairs {
        if pair.dist_sq == 0.0 {
            log::warn!(
                "particles {} and {} share a position; skipping collision",
                pair.i,
                pair.j
            );
            out.coincident += 1;
            continue;
        }

        let impulse = pair_impulse(
            position[pair.i] - position[pair.j],
            velocity[pair.i] - velocity[pair.j],
            pair.dist_sq,
        );
        velocity[pair.i] -= impulse;
        velocity[pair.j] += impulse;
        out.resolved += 1;
    }

    out
}

/// Velocity change removed from `i` and added to `j`
#[inline]
pub fn pair_impulse(diff: DVec2, rel_vel: DVec2, dist_sq: f64) -> DVec2 {
    diff.dot(rel_vel) / dist_sq * diff
}
