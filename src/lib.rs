//! # pipeflow
//!
//! A transient two-fluid solver for gas-liquid flow in pipelines.
//!
//! This crate provides the building blocks of a 1-D finite-volume model:
//! - Pipe discretisation over an elevation profile
//! - Per-phase numerical fluxes (AUSM+, upwind, Rusanov)
//! - MUSCL reconstruction with TVD slope limiters
//! - Primitive recovery through a pluggable thermodynamic provider
//! - Explicit time integration (SSP-RK3, RK4, forward Euler) under a CFL check
//! - Terrain-induced liquid accumulation and slug release
//! - Run-time stability and inventory diagnostics

pub mod analysis;
pub mod boundary;
pub mod equations;
pub mod error;
pub mod flux;
pub mod mesh;
pub mod simulation;
pub mod solver;
pub mod source;
pub mod terrain;
pub mod time;
pub mod types;

// Re-export main types for convenience
pub use error::{ConfigError, SolverError, ThermoError};
pub use types::{CellIndex, FaceIndex, ZoneIndex};

// Geometry and fluids
pub use equations::{Composition, DriftFluxClosure, FluidState, Phase, PolytropicFluids, ThermoProvider};
pub use mesh::{FlowRegime, PipeSection, PipeSegment, Pipeline};

// Numerics
pub use flux::{AusmConfig, PhaseFlux, PhaseFluxScheme, PhaseState, StandardFlux};
pub use solver::{
    BoundaryTotals, ConservedState, MusclReconstructor, PipeSolution, RecoveryConfig,
    RegimeClassifier, SlopeLimiter,
};
pub use time::{CflLimit, StandardIntegrator, TimeIntegrator, check_cfl, compute_dt};

// Boundaries and sources
pub use boundary::{InletBoundary, OutletBoundary};
pub use source::{FrictionConfig, SoilHeatTransfer, SourceTerm};

// Terrain
pub use terrain::{
    AccumulationStrategy, AccumulationZone, LiquidAccumulationTracker, SlugCharacteristics,
    TrackerConfig, ZoneKind, ZoneState,
};

// Driver and diagnostics
pub use analysis::{InventoryTracker, PipeDiagnostics, StabilityMonitor, StabilityThresholds};
pub use simulation::{BoundaryConditions, RunSummary, SolverConfig, StepReport, TransientPipe};
