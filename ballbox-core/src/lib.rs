pub mod analyzer;
pub mod ast;
pub mod collision;
pub mod diagnostics;
pub mod engine;
pub mod frame;
pub mod integrator;
pub mod parser;
pub mod runtime;
pub mod seeding;

pub use analyzer::analyze_scene;
pub use collision::{detect_collisions, resolve_collisions, CollisionPair};
pub use diagnostics::{Diagnostic, DiagnosticSeverity, Diagnostics, SourceLocation, Span};
pub use engine::{BoundaryPolicy, Ensemble, SimParams};
pub use frame::{advance_frame, FrameReport};
pub use parser::parse_scene;
pub use runtime::{
    build_simulation_context, build_simulation_context_from_source, evaluate_detectors,
    particle_positions, run_scene, step_simulation, DetectorResult, SceneError,
    SimulationContext, SimulationResult,
};

// Test helpers module (public for integration tests)
// Always compiled - integration tests are separate crates and need access
pub mod tests;
