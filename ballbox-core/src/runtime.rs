use crate::analyzer::{analyze_scene, MAX_PARTICLES};
use crate::ast::{DetectorDecl, DetectorKind, Scene, SpawnKind};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::engine::{Ensemble, SimParams};
use crate::frame::FrameReport;
use crate::parser::{parse_scene, ParseError};
use crate::seeding::scatter;
use glam::DVec2;
use thiserror::Error;

/// Errors raised while turning a scene into a running simulation
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("invalid scene:\n{0}")]
    Invalid(Diagnostics),
    #[error("detector '{name}' reads particle {index}, but only {len} exist")]
    UnknownParticle {
        name: String,
        index: usize,
        len: usize,
    },
}

/// Result of a detector evaluation
#[derive(Debug, Clone)]
pub struct DetectorResult {
    pub name: String,
    pub value: f64,
}

/// Final result of running a scene
#[derive(Debug)]
pub struct SimulationResult {
    pub detectors: Vec<DetectorResult>,
    pub frames: usize,
}

/// Running totals of frame reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub reflections: usize,
    pub collisions: usize,
    pub coincident: usize,
}

impl RunTotals {
    fn record(&mut self, report: &FrameReport) {
        self.reflections += report.reflected;
        self.collisions += report.collisions;
        self.coincident += report.coincident;
    }
}

/// A seeded ensemble plus everything needed to step it frame by frame
#[derive(Debug, Clone)]
pub struct SimulationContext {
    pub ensemble: Ensemble,
    pub params: SimParams,
    pub detectors: Vec<DetectorDecl>,
    pub current_frame: usize,
    pub max_frames: usize,
    pub totals: RunTotals,
}

/// Main entry point: parse, build and run a scene to completion
pub fn run_scene(source: &str) -> Result<SimulationResult, SceneError> {
    let (mut ctx, _diagnostics) = build_simulation_context_from_source(source)?;

    while !step_simulation(&mut ctx) {}

    let detectors = evaluate_detectors(&ctx)?;
    Ok(SimulationResult {
        detectors,
        frames: ctx.current_frame,
    })
}

/// Parse and build a context; warnings come back alongside it
pub fn build_simulation_context_from_source(
    source: &str,
) -> Result<(SimulationContext, Diagnostics), SceneError> {
    let scene = parse_scene(source)?;
    build_simulation_context(&scene)
}

/// Analyze a scene and seed its ensemble
///
/// Fails with [`SceneError::Invalid`] when the analyzer reports any error, and with
/// [`SceneError::UnknownParticle`] when a detector reads a particle that seeding could not place.
pub fn build_simulation_context(
    scene: &Scene,
) -> Result<(SimulationContext, Diagnostics), SceneError> {
    let mut diagnostics = analyze_scene(scene);
    if diagnostics.has_errors() {
        return Err(SceneError::Invalid(diagnostics));
    }

    let bounds = scene.bounds.max;
    let radius = scene.radius.value;
    let mut ensemble = Ensemble::with_capacity(scene.requested_particles().min(MAX_PARTICLES));

    for spawn in &scene.spawns {
        match spawn.kind {
            SpawnKind::Particle { position, velocity } => ensemble.push(position, velocity),
            SpawnKind::Scatter { count, speed, seed } => {
                let placed = scatter(&mut ensemble, count, bounds, radius, speed, seed);
                if placed < count {
                    diagnostics.push(Diagnostic::warning(
                        format!("only {} of {} scattered particles fit in the box", placed, count),
                        spawn.span,
                    ));
                }
            }
        }
    }

    // A crowded scatter can place fewer particles than the analyzer counted on
    for detector in &scene.detectors {
        if let Some(index) = detector.kind.particle_index() {
            if index >= ensemble.len() {
                return Err(SceneError::UnknownParticle {
                    name: detector.name.clone(),
                    index,
                    len: ensemble.len(),
                });
            }
        }
    }

    let params = SimParams::new(scene.simulate.dt, bounds, radius).with_boundary(scene.boundary);
    log::info!(
        "built scene: {} particle(s), box {}x{}, radius {}, {} frame(s)",
        ensemble.len(),
        bounds.x,
        bounds.y,
        radius,
        scene.simulate.frames
    );

    let ctx = SimulationContext {
        ensemble,
        params,
        detectors: scene.detectors.clone(),
        current_frame: 0,
        max_frames: scene.simulate.frames,
        totals: RunTotals::default(),
    };
    Ok((ctx, diagnostics))
}

/// Advance one frame; returns true once the run is finished (no frame is taken then)
pub fn step_simulation(ctx: &mut SimulationContext) -> bool {
    if ctx.current_frame >= ctx.max_frames {
        return true;
    }

    let report = ctx.ensemble.advance(&ctx.params);
    ctx.totals.record(&report);
    ctx.current_frame += 1;

    log::trace!("frame {}: {:?}", ctx.current_frame, report);
    false
}

/// Current positions, the only state a renderer should read
pub fn particle_positions(ctx: &SimulationContext) -> &[DVec2] {
    &ctx.ensemble.position
}

/// Evaluate all detectors on the current state
pub fn evaluate_detectors(ctx: &SimulationContext) -> Result<Vec<DetectorResult>, SceneError> {
    let ensemble = &ctx.ensemble;
    let mut results = Vec::with_capacity(ctx.detectors.len());

    for detector in &ctx.detectors {
        let particle = |index: usize| {
            if index < ensemble.len() {
                Ok(index)
            } else {
                Err(SceneError::UnknownParticle {
                    name: detector.name.clone(),
                    index,
                    len: ensemble.len(),
                })
            }
        };

        let value = match detector.kind {
            DetectorKind::Energy => ensemble.kinetic_energy(),
            DetectorKind::MomentumX => ensemble.total_momentum().x,
            DetectorKind::MomentumY => ensemble.total_momentum().y,
            DetectorKind::Collisions => ctx.totals.collisions as f64,
            DetectorKind::Reflections => ctx.totals.reflections as f64,
            DetectorKind::PositionX(i) => ensemble.position[particle(i)?].x,
            DetectorKind::PositionY(i) => ensemble.position[particle(i)?].y,
            DetectorKind::Speed(i) => ensemble.velocity[particle(i)?].length(),
        };

        results.push(DetectorResult {
            name: detector.name.clone(),
            value,
        });
    }

    Ok(results)
}
