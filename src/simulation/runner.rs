//! Transient pipe simulation driver.
//!
//! One call to [`TransientPipe::step`] runs, in order:
//!
//! 1. CFL check of the requested `dt` (a violation is fatal)
//! 2. MUSCL reconstruction, fluxes and sources through [`PipeRhs`],
//!    integrated with the configured explicit scheme
//! 3. primitive recovery and divergence monitoring
//! 4. terrain accumulation update and slug-release checks
//! 5. flow-regime classification

use std::time::Instant;

use tracing::{debug, info};

use crate::analysis::{PipeDiagnostics, StabilityMonitor, gas_inventory, liquid_inventory};
use crate::boundary::BoundaryConditions;
use crate::equations::{Composition, Phase, PolytropicFluids, ThermoProvider};
use crate::error::{ConfigError, SolverError};
use crate::flux::PhaseFluxScheme;
use crate::mesh::{PipeSection, Pipeline};
use crate::simulation::SolverConfig;
use crate::solver::{
    BoundaryTotals, MusclReconstructor, PipeRhs, PipeSolution, PrimitiveSolver,
    RecoveryContext,
};
use crate::source::{
    CombinedSource, GravitySource, InterfacialFriction, SourceTerm, WallFriction,
};
use crate::terrain::{LiquidAccumulationTracker, SlugCharacteristics};
use crate::time::{CflLimit, IntegratorInfo, TimeIntegrator, check_cfl, compute_dt};
use crate::types::{CellIndex, ZoneIndex};

/// Outcome of one time step.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StepReport {
    /// Index of the completed step, starting at 0
    pub step: usize,
    /// Time at the end of the step (s)
    pub time: f64,
    pub dt: f64,
    /// Terrain slugs released during the step
    pub slugs: Vec<SlugCharacteristics>,
    /// Mass that crossed the pipe ends during the step (kg)
    pub boundary: BoundaryTotals,
    /// Liquid tracked by all accumulation zones (m³)
    pub total_accumulated_volume: f64,
    pub overflowing_zones: Vec<ZoneIndex>,
    /// Fastest characteristic speed at the start of the step (m/s)
    pub max_wave_speed: f64,
}

/// Result of [`TransientPipe::run_until`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub final_time: f64,
    pub n_steps: usize,
    /// Smallest time step taken (s)
    pub dt_min: f64,
    /// Largest time step taken (s)
    pub dt_max: f64,
    /// Slugs released over the run
    pub n_slugs: usize,
    /// Mass that crossed the pipe ends over the run (kg)
    pub boundary: BoundaryTotals,
    pub wall_time: f64,
}

/// A pipeline advanced in time by the two-fluid model.
///
/// # Example
/// ```
/// use pipeflow::mesh::Pipeline;
/// use pipeflow::simulation::{BoundaryConditions, SolverConfig, TransientPipe};
///
/// let pipeline = Pipeline::horizontal(10, 100.0, 0.2, 0.0).unwrap();
/// let boundary = BoundaryConditions::mass_flow_to_pressure(0.5, 2.0, 300.0, 5e6);
/// let mut pipe = TransientPipe::new(pipeline, boundary, SolverConfig::default()).unwrap();
/// pipe.initialize_uniform(5e6, 300.0, 0.2, 1.0, 1.0).unwrap();
///
/// let dt = pipe.stable_time_step();
/// let report = pipe.step(dt).unwrap();
/// assert_eq!(report.step, 0);
/// ```
pub struct TransientPipe {
    config: SolverConfig,
    sections: Vec<PipeSection>,
    boundary: BoundaryConditions,
    thermo: Box<dyn ThermoProvider>,
    composition: Composition,
    tracker: LiquidAccumulationTracker,
    monitor: StabilityMonitor,
    time: f64,
    step: usize,
    transferred: BoundaryTotals,
}

impl TransientPipe {
    /// Simulation over `pipeline` with the polytropic fluid stub.
    ///
    /// Accumulation zones are identified here, once.
    pub fn new(
        pipeline: Pipeline,
        boundary: BoundaryConditions,
        config: SolverConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        boundary.validate()?;
        if pipeline.sections.is_empty() {
            return Err(ConfigError::EmptyPipeline);
        }

        let mut tracker =
            LiquidAccumulationTracker::with_model(config.tracker, config.accumulation.create_model());
        tracker.identify_zones(&pipeline.sections);

        info!(
            sections = pipeline.sections.len(),
            length = pipeline.total_length(),
            flux = config.flux.name(),
            limiter = %config.limiter,
            integrator = config.integrator.name(),
            accumulation = tracker.model_name(),
            "transient pipe created"
        );

        Ok(Self {
            config,
            sections: pipeline.sections,
            boundary,
            thermo: Box::new(PolytropicFluids::default()),
            composition: Composition::default(),
            tracker,
            monitor: StabilityMonitor::new(config.stability),
            time: 0.0,
            step: 0,
            transferred: BoundaryTotals::default(),
        })
    }

    /// Replace the thermodynamic provider.
    pub fn with_thermo(mut self, thermo: Box<dyn ThermoProvider>) -> Self {
        self.thermo = thermo;
        self
    }

    pub fn with_composition(mut self, composition: Composition) -> Self {
        self.composition = composition;
        self
    }

    /// Fill every section with the same state.
    pub fn initialize_uniform(
        &mut self,
        pressure: f64,
        temperature: f64,
        liquid_holdup: f64,
        gas_velocity: f64,
        liquid_velocity: f64,
    ) -> Result<(), SolverError> {
        if !(0.0..=1.0).contains(&liquid_holdup) {
            return Err(ConfigError::InvalidParameter {
                name: "liquid_holdup",
                value: liquid_holdup,
                reason: "must lie in [0, 1]",
            }
            .into());
        }
        self.initialize_with(pressure, temperature, |_, _, _| {
            (liquid_holdup, gas_velocity, liquid_velocity)
        })
    }

    /// Fill the sections with drift-flux steady holdups for the given
    /// superficial velocities.
    pub fn initialize_steady_state(
        &mut self,
        pressure: f64,
        temperature: f64,
        superficial_gas: f64,
        superficial_liquid: f64,
    ) -> Result<(), SolverError> {
        let closure = self.config.drift_flux;
        self.initialize_with(pressure, temperature, |section, rho_g, rho_l| {
            let (liquid_holdup, gas_holdup) = closure.holdups(
                superficial_gas,
                superficial_liquid,
                rho_g,
                rho_l,
                section.diameter,
                section.inclination,
            );
            (
                liquid_holdup,
                superficial_gas / gas_holdup,
                superficial_liquid / liquid_holdup,
            )
        })
    }

    /// Flash every section at `(pressure, temperature)` and set holdup and
    /// velocities from `state(section, rho_g, rho_l)`.
    fn initialize_with<F>(&mut self, pressure: f64, temperature: f64, state: F) -> Result<(), SolverError>
    where
        F: Fn(&PipeSection, f64, f64) -> (f64, f64, f64),
    {
        let solver = PrimitiveSolver::new(&*self.thermo, &self.composition, self.config.recovery());
        for (i, section) in self.sections.iter_mut().enumerate() {
            let ctx = RecoveryContext {
                step: self.step,
                cell: CellIndex::new(i),
            };
            let gas = solver.flash(ctx, Phase::Gas, pressure, temperature)?;
            let liquid = solver.flash(ctx, Phase::Liquid, pressure, temperature)?;
            let (liquid_holdup, gas_velocity, liquid_velocity) =
                state(section, gas.density, liquid.density);

            section.pressure = pressure;
            section.temperature = temperature;
            section.gas = gas;
            section.liquid = liquid;
            section.set_liquid_holdup(liquid_holdup);
            section.gas_velocity = gas_velocity;
            section.liquid_velocity = liquid_velocity;
            section.accumulated_liquid_volume = 0.0;
        }
        self.config.regime.classify_all(&mut self.sections);
        Ok(())
    }

    /// Largest admissible time step for the current state.
    pub fn stable_time_step(&self) -> f64 {
        compute_dt(&self.sections, self.config.cfl).dt_max
    }

    /// Advance the pipeline by `dt`.
    pub fn step(&mut self, dt: f64) -> Result<StepReport, SolverError> {
        let limit: CflLimit = check_cfl(&self.sections, dt, self.config.cfl)?;
        let step = self.step;
        let cfg = self.config;

        let gravity = GravitySource::new(cfg.gravity);
        let interfacial = InterfacialFriction::new(cfg.friction.interfacial_factor);
        let mut terms: Vec<&dyn SourceTerm> = vec![&gravity];
        if cfg.friction.wall {
            terms.push(&WallFriction);
        }
        if cfg.friction.interfacial {
            terms.push(&interfacial);
        }
        if cfg.energy_equation
            && let Some(heat) = &cfg.heat_transfer
        {
            terms.push(heat);
        }
        let sources = CombinedSource::new(terms);

        let rhs = PipeRhs {
            scheme: &cfg.flux,
            reconstructor: MusclReconstructor::new(cfg.limiter),
            recovery: PrimitiveSolver::new(&*self.thermo, &self.composition, cfg.recovery()),
            boundary: &self.boundary,
            sources: &sources,
            step,
        };

        let mut u = PipeSolution::from_sections(&self.sections);
        let guess = &self.sections;
        cfg.integrator
            .step(&mut u, dt, self.time, |state, t| rhs.evaluate(state, guess, t))?;
        let mut sections = rhs.primitive_sections(&u, guess)?;

        self.monitor.ensure_stable(step, &sections, dt)?;

        self.tracker.update(&mut sections, dt)?;
        let slugs = self.tracker.release_slugs(&sections);
        cfg.regime.classify_all(&mut sections);

        self.sections = sections;
        self.time += dt;
        self.step += 1;
        self.transferred.accumulate(&u.boundary);

        debug!(
            step,
            time = self.time,
            dt,
            max_wave_speed = limit.wave_speed,
            slugs = slugs.len(),
            "step complete"
        );

        Ok(StepReport {
            step,
            time: self.time,
            dt,
            slugs,
            boundary: u.boundary,
            total_accumulated_volume: self.tracker.total_accumulated_volume(),
            overflowing_zones: self.tracker.overflowing_zones(),
            max_wave_speed: limit.wave_speed,
        })
    }

    /// Step until `t_end` with the largest stable step, capped at `max_dt`.
    ///
    /// `callback` sees every step report.
    pub fn run_until<C>(&mut self, t_end: f64, max_dt: f64, mut callback: C) -> Result<RunSummary, SolverError>
    where
        C: FnMut(&StepReport),
    {
        if !max_dt.is_finite() || max_dt <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_dt",
                value: max_dt,
                reason: "time step must be positive and finite",
            }
            .into());
        }
        let start_wall = Instant::now();
        let mut summary = RunSummary {
            final_time: self.time,
            n_steps: 0,
            dt_min: f64::INFINITY,
            dt_max: 0.0,
            n_slugs: 0,
            boundary: BoundaryTotals::default(),
            wall_time: 0.0,
        };

        while self.time < t_end {
            let dt = self.stable_time_step().min(max_dt).min(t_end - self.time);
            let report = self.step(dt)?;
            summary.n_steps += 1;
            summary.dt_min = summary.dt_min.min(dt);
            summary.dt_max = summary.dt_max.max(dt);
            summary.n_slugs += report.slugs.len();
            summary.boundary.accumulate(&report.boundary);
            callback(&report);
        }

        summary.final_time = self.time;
        summary.wall_time = start_wall.elapsed().as_secs_f64();
        info!(
            final_time = summary.final_time,
            steps = summary.n_steps,
            slugs = summary.n_slugs,
            wall_time = summary.wall_time,
            "run complete"
        );
        Ok(summary)
    }

    /// Change the boundary conditions, e.g. to step the inlet rates.
    pub fn set_boundary(&mut self, boundary: BoundaryConditions) -> Result<(), ConfigError> {
        boundary.validate()?;
        self.boundary = boundary;
        Ok(())
    }

    pub fn sections(&self) -> &[PipeSection] {
        &self.sections
    }

    /// Mutable sections, for setting up custom initial states.
    pub fn sections_mut(&mut self) -> &mut [PipeSection] {
        &mut self.sections
    }

    pub fn boundary(&self) -> &BoundaryConditions {
        &self.boundary
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn tracker(&self) -> &LiquidAccumulationTracker {
        &self.tracker
    }

    pub fn monitor(&self) -> &StabilityMonitor {
        &self.monitor
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of completed steps.
    pub fn step_count(&self) -> usize {
        self.step
    }

    /// Mass that crossed the pipe ends since the start (kg).
    pub fn transferred(&self) -> &BoundaryTotals {
        &self.transferred
    }

    /// Liquid mass in the pipe (kg).
    pub fn liquid_inventory(&self) -> f64 {
        liquid_inventory(&self.sections)
    }

    /// Gas mass in the pipe (kg).
    pub fn gas_inventory(&self) -> f64 {
        gas_inventory(&self.sections)
    }

    pub fn diagnostics(&self, dt: f64) -> PipeDiagnostics {
        PipeDiagnostics::compute(&self.sections, dt)
    }

    pub fn thermo_name(&self) -> &'static str {
        self.thermo.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{InletBoundary, OutletBoundary};
    use crate::equations::FluidState;
    use crate::error::ThermoError;
    use crate::flux::StandardFlux;
    use crate::mesh::FlowRegime;
    use crate::source::FrictionConfig;

    fn pipe(n: usize, boundary: BoundaryConditions) -> TransientPipe {
        let pipeline = Pipeline::horizontal(n, 10.0 * n as f64, 0.2, 0.0).unwrap();
        let config = SolverConfig::default().with_friction(FrictionConfig::frictionless());
        let mut pipe = TransientPipe::new(pipeline, boundary, config).unwrap();
        pipe.initialize_uniform(5e6, 300.0, 0.2, 0.0, 0.0).unwrap();
        pipe
    }

    #[test]
    fn test_initialize_uniform() {
        let p = pipe(4, BoundaryConditions::closed());
        for s in p.sections() {
            assert_eq!(s.pressure, 5e6);
            assert_eq!(s.liquid_holdup, 0.2);
            assert!(s.gas.density > 0.0 && s.liquid.density > s.gas.density);
            assert_eq!(s.regime, FlowRegime::Intermittent);
        }
        assert_eq!(p.thermo_name(), "polytropic");
    }

    #[test]
    fn test_initialize_steady_state() {
        let pipeline = Pipeline::horizontal(4, 40.0, 0.2, 0.0).unwrap();
        let mut p = TransientPipe::new(pipeline, BoundaryConditions::closed(), SolverConfig::default())
            .unwrap();
        p.initialize_steady_state(5e6, 300.0, 3.0, 0.5).unwrap();
        for s in p.sections() {
            assert!((s.superficial_gas_velocity() - 3.0).abs() < 1e-12);
            assert!((s.superficial_liquid_velocity() - 0.5).abs() < 1e-12);
            // slip holds back liquid
            assert!(s.liquid_holdup > 0.5 / 3.5);
        }
    }

    #[test]
    fn test_rejects_invalid_setup() {
        let pipeline = Pipeline::horizontal(4, 40.0, 0.2, 0.0).unwrap();
        let config = SolverConfig::default().with_cfl(2.0);
        assert!(TransientPipe::new(pipeline.clone(), BoundaryConditions::closed(), config).is_err());

        let bad = BoundaryConditions::new(InletBoundary::Closed, OutletBoundary::Pressure(-1.0));
        assert!(TransientPipe::new(pipeline, bad, SolverConfig::default()).is_err());

        let mut p = pipe(4, BoundaryConditions::closed());
        assert!(p.initialize_uniform(5e6, 300.0, 1.5, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_closed_pipe_at_rest_stays_at_rest() {
        let mut p = pipe(6, BoundaryConditions::closed());
        let before = p.liquid_inventory();
        let dt = p.stable_time_step();
        for _ in 0..5 {
            let report = p.step(dt).unwrap();
            assert!(report.slugs.is_empty());
            assert_eq!(report.boundary, BoundaryTotals::default());
        }
        assert_eq!(p.step_count(), 5);
        assert!((p.time() - 5.0 * dt).abs() < 1e-12);
        for s in p.sections() {
            assert!((s.pressure - 5e6).abs() < 1e-3);
            assert!(s.liquid_velocity.abs() < 1e-9);
            assert!((s.liquid_holdup - 0.2).abs() < 1e-9);
        }
        assert!((p.liquid_inventory() - before).abs() < 1e-9 * before);
    }

    #[test]
    fn test_cfl_violation_is_fatal() {
        let mut p = pipe(4, BoundaryConditions::closed());
        let dt = 10.0 * p.stable_time_step();
        let err = p.step(dt).unwrap_err();
        assert!(err.is_config());
        assert!(matches!(
            err,
            SolverError::Config(ConfigError::CflViolation { .. })
        ));
        // nothing advanced
        assert_eq!(p.step_count(), 0);
        assert_eq!(p.time(), 0.0);
    }

    struct FailingThermo;

    impl ThermoProvider for FailingThermo {
        fn flash_state(
            &self,
            phase: Phase,
            pressure: f64,
            temperature: f64,
            _composition: &Composition,
        ) -> Result<FluidState, ThermoError> {
            if pressure > 6e6 {
                return Err(ThermoError::FlashFailed {
                    phase,
                    pressure,
                    temperature,
                    reason: "outside table",
                });
            }
            PolytropicFluids::default().flash_state(phase, pressure, temperature, &Composition::default())
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[test]
    fn test_flash_failure_aborts_step() {
        let pipeline = Pipeline::horizontal(4, 40.0, 0.2, 0.0).unwrap();
        let mut p = TransientPipe::new(pipeline, BoundaryConditions::closed(), SolverConfig::default())
            .unwrap()
            .with_thermo(Box::new(FailingThermo));
        assert!(matches!(
            p.initialize_uniform(7e6, 300.0, 0.2, 0.0, 0.0),
            Err(SolverError::Flash { cell, .. }) if cell == CellIndex::new(0)
        ));
    }

    #[test]
    fn test_run_until_reaches_end_time() {
        let boundary = BoundaryConditions::mass_flow_to_pressure(0.5, 5.0, 300.0, 5e6);
        let pipeline = Pipeline::horizontal(5, 50.0, 0.2, 0.0).unwrap();
        let config = SolverConfig::default().with_flux(StandardFlux::Rusanov);
        let mut p = TransientPipe::new(pipeline, boundary, config).unwrap();
        p.initialize_uniform(5e6, 300.0, 0.2, 1.0, 0.2).unwrap();

        let mut seen = 0;
        let summary = p.run_until(0.05, 0.01, |_| seen += 1).unwrap();
        assert!((summary.final_time - 0.05).abs() < 1e-12);
        assert_eq!(summary.n_steps, seen);
        assert!(summary.dt_max <= 0.01);
        assert!(summary.boundary.inlet_liquid > 0.0);
        assert_eq!(p.transferred(), &summary.boundary);
        assert!(p.run_until(1.0, 0.0, |_| {}).is_err());
    }
}
