use crate::diagnostics::Span;
use crate::engine::BoundaryPolicy;
use glam::DVec2;

/// A parsed scene description
#[derive(Debug, Clone)]
pub struct Scene {
    pub bounds: BoxDecl,
    pub radius: RadiusDecl,
    pub simulate: SimulateDecl,
    pub boundary: BoundaryPolicy,
    /// Particle sources in file order
    pub spawns: Vec<SpawnDecl>,
    pub detectors: Vec<DetectorDecl>,
}

impl Scene {
    /// Number of particles the scene asks for (scatter counts included)
    ///
    /// Saturates at `usize::MAX` instead of overflowing.
    pub fn requested_particles(&self) -> usize {
        self.spawns
            .iter()
            .map(|spawn| match spawn.kind {
                SpawnKind::Particle { .. } => 1,
                SpawnKind::Scatter { count, .. } => count,
            })
            .fold(0usize, |total, n| total.saturating_add(n))
    }
}

/// Box declaration: `box max_x max_y`
#[derive(Debug, Clone, Copy)]
pub struct BoxDecl {
    pub max: DVec2,
    pub span: Option<Span>,
}

/// Radius declaration: `radius r`
#[derive(Debug, Clone, Copy)]
pub struct RadiusDecl {
    pub value: f64,
    pub span: Option<Span>,
}

/// Simulation timing: `simulate dt = x frames = n`
#[derive(Debug, Clone, Copy)]
pub struct SimulateDecl {
    pub dt: f64,
    pub frames: usize,
    pub span: Option<Span>,
}

#[derive(Debug, Clone)]
pub struct SpawnDecl {
    pub kind: SpawnKind,
    pub span: Option<Span>,
}

/// Ways of putting particles in the box
#[derive(Debug, Clone)]
pub enum SpawnKind {
    /// `particle at (x, y) velocity (vx, vy)`
    Particle { position: DVec2, velocity: DVec2 },
    /// `scatter n speed s seed k`
    Scatter { count: usize, speed: f64, seed: u64 },
}

/// Detector declaration: `detect name = kind`
#[derive(Debug, Clone)]
pub struct DetectorDecl {
    pub name: String,
    pub kind: DetectorKind,
    pub span: Option<Span>,
}

/// Observables evaluated at the end of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorKind {
    Energy,
    MomentumX,
    MomentumY,
    /// Total resolved pair collisions over the run
    Collisions,
    /// Total wall reflections over the run
    Reflections,
    PositionX(usize),
    PositionY(usize),
    Speed(usize),
}

impl DetectorKind {
    /// Particle index the detector reads, if any
    pub fn particle_index(&self) -> Option<usize> {
        match self {
            Self::PositionX(i) | Self::PositionY(i) | Self::Speed(i) => Some(*i),
            _ => None,
        }
    }
}
