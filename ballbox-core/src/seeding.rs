use crate::engine::Ensemble;
use glam::DVec2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f64::consts::TAU;

/// Placement attempts per particle before giving up on it
const MAX_ATTEMPTS: usize = 1000;

/// Append `count` non-overlapping particles with random positions inside the box.
///
/// Centers are drawn uniformly from `[radius, max - radius]` on each axis and rejected if
/// they overlap any particle already in `ensemble`. Each velocity has magnitude `speed` and a
/// uniformly random direction. The same `seed` always yields the same particles.
///
/// Returns how many particles were placed; fewer than `count` means the box got too crowded.
pub fn scatter(
    ensemble: &mut Ensemble,
    count: usize,
    bounds: DVec2,
    radius: f64,
    speed: f64,
    seed: u64,
) -> usize {
    let lo = DVec2::splat(radius);
    let hi = bounds - DVec2::splat(radius);
    if hi.x < lo.x || hi.y < lo.y {
        log::warn!("box {:?} cannot hold particles of radius {}", bounds, radius);
        return 0;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let threshold = 4.0 * radius * radius;
    let mut placed = 0;

    for _ in 0..count {
        let mut spot = None;
        for _ in 0..MAX_ATTEMPTS {
            let candidate = DVec2::new(
                sample_axis(&mut rng, lo.x, hi.x),
                sample_axis(&mut rng, lo.y, hi.y),
            );
            if ensemble
                .position
                .iter()
                .all(|p| p.distance_squared(candidate) >= threshold)
            {
                spot = Some(candidate);
                break;
            }
        }

        let Some(position) = spot else {
            log::warn!(
                "placed {} of {} scattered particles; box is too crowded",
                placed,
                count
            );
            break;
        };

        let angle = rng.gen_range(0.0..TAU);
        ensemble.push(position, speed * DVec2::new(angle.cos(), angle.sin()));
        placed += 1;
    }

    log::debug!("scattered {} particle(s) with seed {}", placed, seed);
    placed
}

fn sample_axis(rng: &mut StdRng, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scatter_inside_and_apart() {
        let mut ens = Ensemble::new();
        let bounds = DVec2::new(10.0, 5.0);
        let placed = scatter(&mut ens, 30, bounds, 0.2, 2.0, 7);

        assert_eq!(placed, 30);
        assert_eq!(ens.len(), 30);
        for (k, p) in ens.position.iter().enumerate() {
            assert!(p.x >= 0.2 && p.x <= 9.8 && p.y >= 0.2 && p.y <= 4.8);
            for q in &ens.position[k + 1..] {
                assert!(p.distance_squared(*q) >= 0.16);
            }
        }
        for v in &ens.velocity {
            assert!((v.length() - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_scatter_is_seeded() {
        let mut a = Ensemble::new();
        let mut b = Ensemble::new();
        scatter(&mut a, 10, DVec2::new(4.0, 4.0), 0.1, 1.0, 99);
        scatter(&mut b, 10, DVec2::new(4.0, 4.0), 0.1, 1.0, 99);
        assert_eq!(a, b);
    }

    #[test]
    fn test_scatter_stops_when_crowded() {
        // room for a single disk only
        let mut ens = Ensemble::new();
        let placed = scatter(&mut ens, 5, DVec2::new(1.0, 1.0), 0.5, 1.0, 3);
        assert_eq!(placed, 1);
    }

    #[test]
    fn test_scatter_respects_existing_particles() {
        let mut ens = Ensemble::new();
        ens.push(DVec2::new(1.0, 1.0), DVec2::ZERO);
        scatter(&mut ens, 10, DVec2::new(6.0, 6.0), 0.3, 0.0, 5);
        for p in &ens.position[1..] {
            assert!(p.distance_squared(DVec2::new(1.0, 1.0)) >= 0.36);
        }
    }
}
