//! Error types for pipe-flow simulations.
//!
//! Three families are kept apart:
//! - [`ConfigError`]: the setup is invalid; nothing is retried.
//! - [`ThermoError`]: the thermodynamic provider could not deliver a state.
//! - [`SolverError`]: a time step failed, with the step and cell that failed.
//!
//! Near-zero denominators, vanishing phases and similar degeneracies are
//! clamped where they occur and never surface here.

use thiserror::Error;

use crate::equations::Phase;
use crate::types::{CellIndex, ZoneIndex};

/// Invalid configuration or geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Requested time step exceeds the CFL limit.
    #[error(
        "CFL violation: dt={dt:.3e}s exceeds limit {dt_max:.3e}s (cell {cell}, wave speed {wave_speed:.3} m/s)"
    )]
    CflViolation {
        dt: f64,
        dt_max: f64,
        cell: CellIndex,
        wave_speed: f64,
    },

    /// Non-physical section geometry.
    #[error("Invalid geometry in section {section}: {field}={value}")]
    InvalidGeometry {
        section: usize,
        field: &'static str,
        value: f64,
    },

    /// A zone references sections outside the pipeline or out of order.
    #[error("Malformed topology: zone {zone} references section {section} of {n_sections}")]
    MalformedTopology {
        zone: ZoneIndex,
        section: usize,
        n_sections: usize,
    },

    /// Pipeline with no sections.
    #[error("Pipeline has no sections")]
    EmptyPipeline,

    /// Slope limiter name not recognised.
    #[error("Unknown slope limiter: {0}")]
    UnknownLimiter(String),

    /// Flux scheme name not recognised.
    #[error("Unknown flux scheme: {0}")]
    UnknownFlux(String),

    /// Parameter outside its admissible range.
    #[error("Invalid parameter {name}={value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Failure reported by a thermodynamic provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThermoError {
    /// Flash could not produce a state at the given conditions.
    #[error("{phase} flash failed at P={pressure:.1} Pa, T={temperature:.2} K: {reason}")]
    FlashFailed {
        phase: Phase,
        pressure: f64,
        temperature: f64,
        reason: &'static str,
    },

    /// Flash returned a non-physical property.
    #[error("{phase} flash returned invalid {property}={value}")]
    InvalidState {
        phase: Phase,
        property: &'static str,
        value: f64,
    },
}

/// Fatal failure of a simulation step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Thermodynamic flash failed for a cell.
    #[error("Step {step}, cell {cell}: {source}")]
    Flash {
        step: usize,
        cell: CellIndex,
        #[source]
        source: ThermoError,
    },

    /// An iterative sub-solve ran out of iterations.
    #[error(
        "Step {step}, cell {cell}: {quantity} did not converge in {iterations} iterations (residual {residual:.3e})"
    )]
    NonConvergence {
        step: usize,
        cell: CellIndex,
        quantity: &'static str,
        iterations: usize,
        residual: f64,
    },

    /// The solution left its admissible range.
    #[error("Step {step}, cell {cell}: solution diverged, {field}={value}")]
    Diverged {
        step: usize,
        cell: CellIndex,
        field: &'static str,
        value: f64,
    },
}

impl SolverError {
    /// Cell that triggered the error, when there is one.
    pub fn cell(&self) -> Option<CellIndex> {
        match self {
            Self::Config(ConfigError::CflViolation { cell, .. }) => Some(*cell),
            Self::Config(_) => None,
            Self::Flash { cell, .. }
            | Self::NonConvergence { cell, .. }
            | Self::Diverged { cell, .. } => Some(*cell),
        }
    }

    /// Whether the error stems from invalid configuration.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
