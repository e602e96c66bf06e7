//! Solver configuration.

use crate::analysis::StabilityThresholds;
use crate::equations::DriftFluxClosure;
use crate::error::ConfigError;
use crate::flux::StandardFlux;
use crate::solver::{RecoveryConfig, RegimeClassifier, SlopeLimiter};
use crate::source::{FrictionConfig, STANDARD_GRAVITY, SoilHeatTransfer};
use crate::terrain::{AccumulationStrategy, TrackerConfig};
use crate::time::StandardIntegrator;

/// Configuration of a transient pipe simulation.
///
/// # Example
/// ```
/// use pipeflow::simulation::SolverConfig;
/// use pipeflow::solver::SlopeLimiter;
/// use pipeflow::flux::StandardFlux;
///
/// let config = SolverConfig::default()
///     .with_cfl(0.4)
///     .with_flux(StandardFlux::Rusanov)
///     .with_limiter("minmod".parse::<SlopeLimiter>().unwrap());
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// CFL number bounding the admissible time step
    pub cfl: f64,
    pub flux: StandardFlux,
    pub limiter: SlopeLimiter,
    pub integrator: StandardIntegrator,
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
    /// Recover temperature from the energy content
    pub energy_equation: bool,
    pub pressure_tolerance: f64,
    pub max_pressure_iterations: usize,
    /// Temperature tolerance of the energy coupling (K)
    pub temperature_tolerance: f64,
    pub max_temperature_iterations: usize,
    pub friction: FrictionConfig,
    /// Soil heat loss, applied with the energy equation only
    pub heat_transfer: Option<SoilHeatTransfer>,
    pub tracker: TrackerConfig,
    pub accumulation: AccumulationStrategy,
    pub stability: StabilityThresholds,
    pub regime: RegimeClassifier,
    pub drift_flux: DriftFluxClosure,
}

impl Default for SolverConfig {
    fn default() -> Self {
        let recovery = RecoveryConfig::default();
        Self {
            cfl: 0.5,
            flux: StandardFlux::default(),
            limiter: SlopeLimiter::default(),
            integrator: StandardIntegrator::default(),
            gravity: STANDARD_GRAVITY,
            energy_equation: recovery.energy_equation,
            pressure_tolerance: recovery.pressure_tolerance,
            max_pressure_iterations: recovery.max_pressure_iterations,
            temperature_tolerance: recovery.temperature_tolerance,
            max_temperature_iterations: recovery.max_temperature_iterations,
            friction: FrictionConfig::default(),
            heat_transfer: None,
            tracker: TrackerConfig::default(),
            accumulation: AccumulationStrategy::default(),
            stability: StabilityThresholds::default(),
            regime: RegimeClassifier::default(),
            drift_flux: DriftFluxClosure::default(),
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cfl(mut self, cfl: f64) -> Self {
        self.cfl = cfl;
        self
    }

    pub fn with_flux(mut self, flux: StandardFlux) -> Self {
        self.flux = flux;
        self
    }

    pub fn with_limiter(mut self, limiter: SlopeLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_integrator(mut self, integrator: StandardIntegrator) -> Self {
        self.integrator = integrator;
        self
    }

    pub fn with_friction(mut self, friction: FrictionConfig) -> Self {
        self.friction = friction;
        self
    }

    /// Enable the energy equation, optionally with soil heat loss.
    pub fn with_energy_equation(mut self, heat_transfer: Option<SoilHeatTransfer>) -> Self {
        self.energy_equation = true;
        self.heat_transfer = heat_transfer;
        self
    }

    pub fn with_tracker(mut self, tracker: TrackerConfig) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn with_accumulation(mut self, strategy: AccumulationStrategy) -> Self {
        self.accumulation = strategy;
        self
    }

    pub fn with_stability(mut self, stability: StabilityThresholds) -> Self {
        self.stability = stability;
        self
    }

    /// Iteration controls of the primitive recovery.
    pub fn recovery(&self) -> RecoveryConfig {
        RecoveryConfig {
            pressure_tolerance: self.pressure_tolerance,
            max_pressure_iterations: self.max_pressure_iterations,
            temperature_tolerance: self.temperature_tolerance,
            max_temperature_iterations: self.max_temperature_iterations,
            energy_equation: self.energy_equation,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |name, value, reason| ConfigError::InvalidParameter {
            name,
            value,
            reason,
        };
        if !self.cfl.is_finite() || self.cfl <= 0.0 || self.cfl > 1.0 {
            return Err(invalid("cfl", self.cfl, "must lie in (0, 1]"));
        }
        if !self.gravity.is_finite() || self.gravity < 0.0 {
            return Err(invalid("gravity", self.gravity, "must be non-negative"));
        }
        let tolerances = [
            ("pressure_tolerance", self.pressure_tolerance),
            ("temperature_tolerance", self.temperature_tolerance),
            ("max_velocity", self.stability.max_velocity),
        ];
        for (name, value) in tolerances {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(name, value, "must be positive"));
            }
        }
        let iterations = [
            ("max_pressure_iterations", self.max_pressure_iterations),
            ("max_temperature_iterations", self.max_temperature_iterations),
        ];
        for (name, value) in iterations {
            if value == 0 {
                return Err(invalid(name, 0.0, "at least one iteration is required"));
            }
        }
        if let StandardFlux::AusmPlus(ausm) = self.flux
            && (!ausm.min_sound_speed.is_finite() || ausm.min_sound_speed <= 0.0)
        {
            return Err(invalid(
                "min_sound_speed",
                ausm.min_sound_speed,
                "must be positive",
            ));
        }
        self.friction.validate()?;
        if let Some(heat) = &self.heat_transfer {
            heat.validate()?;
        }
        self.tracker.validate()
    }
}
