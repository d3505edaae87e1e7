use glam::DVec2;

/// How the integrator decides that a particle has left the box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// Negate the whole velocity when `x < 0 || y < 0 || (x > max_x && y > max_y)`.
    ///
    /// The upper-bound test only fires when both axes overshoot at once, so a particle
    /// leaving through the right or top wall alone keeps going.
    #[default]
    Literal,
    /// Check each axis against `[0, bound]` independently and negate only the offending
    /// velocity component.
    PerAxis,
}

/// Fixed parameters of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimParams {
    pub delta_time: f64,
    /// Upper corner of the box `[0, max_x] x [0, max_y]`
    pub bounds: DVec2,
    pub radius: f64,
    pub boundary: BoundaryPolicy,
}

impl SimParams {
    pub fn new(delta_time: f64, bounds: DVec2, radius: f64) -> Self {
        Self {
            delta_time,
            bounds,
            radius,
            boundary: BoundaryPolicy::Literal,
        }
    }

    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    /// Squared center distance below which two disks touch: `(2r)^2`
    #[inline]
    pub fn collision_threshold_sq(&self) -> f64 {
        4.0 * self.radius * self.radius
    }
}

/// Index-aligned particle buffers
///
/// `position[k]` and `velocity[k]` always describe the same particle. The kernel never
/// inserts, removes or reorders entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ensemble {
    pub position: Vec<DVec2>,
    pub velocity: Vec<DVec2>,
}

impl Ensemble {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            position: Vec::with_capacity(n),
            velocity: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, position: DVec2, velocity: DVec2) {
        self.position.push(position);
        self.velocity.push(velocity);
    }

    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    /// Advance both buffers by one frame
    pub fn advance(&mut self, params: &SimParams) -> crate::frame::FrameReport {
        crate::frame::advance_frame(&mut self.position, &mut self.velocity, params)
    }

    /// Sum of velocities (unit mass per particle)
    pub fn total_momentum(&self) -> DVec2 {
        self.velocity.iter().copied().sum()
    }

    /// Sum of `|v|^2 / 2` over all particles (unit mass)
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self
            .velocity
            .iter()
            .map(|v| v.length_squared())
            .sum::<f64>()
    }
}
