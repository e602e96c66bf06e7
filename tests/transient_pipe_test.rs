//! End-to-end tests of the transient pipe driver.
//!
//! Verifies mass conservation against the boundary transfers, preservation
//! of a uniform flowing state, and the fatal CFL check.

use pipeflow::analysis::{InventoryTracker, PipeDiagnostics};
use pipeflow::boundary::{InletBoundary, OutletBoundary};
use pipeflow::mesh::Pipeline;
use pipeflow::simulation::{BoundaryConditions, SolverConfig, TransientPipe};
use pipeflow::source::FrictionConfig;
use pipeflow::{ConfigError, SolverError, StandardFlux, StandardIntegrator};

const PRESSURE: f64 = 5e6;
const TEMPERATURE: f64 = 300.0;
const HOLDUP: f64 = 0.2;
const VELOCITY: f64 = 1.0;

fn config(flux: StandardFlux) -> SolverConfig {
    SolverConfig::default()
        .with_cfl(0.5)
        .with_flux(flux)
        .with_friction(FrictionConfig::frictionless())
}

/// Pipe in uniform no-slip flow, fed at `liquid_factor` times its own
/// liquid rate.
fn flowing_pipe(config: SolverConfig, liquid_factor: f64) -> TransientPipe {
    let pipeline = Pipeline::horizontal(10, 100.0, 0.2, 0.0).unwrap();
    let mut pipe = TransientPipe::new(pipeline, BoundaryConditions::closed(), config).unwrap();
    pipe.initialize_uniform(PRESSURE, TEMPERATURE, HOLDUP, VELOCITY, VELOCITY)
        .unwrap();

    let first = &pipe.sections()[0];
    let gas_rate = first.gas_mass_per_length() * VELOCITY;
    let liquid_rate = first.liquid_mass_per_length() * VELOCITY;
    pipe.set_boundary(BoundaryConditions::mass_flow_to_pressure(
        gas_rate,
        liquid_factor * liquid_rate,
        TEMPERATURE,
        PRESSURE,
    ))
    .unwrap();
    pipe
}

#[test]
fn test_mass_conservation_with_open_ends() {
    let mut pipe = flowing_pipe(config(StandardFlux::Rusanov), 2.0);
    let mut tracker = InventoryTracker::new(PipeDiagnostics::compute(pipe.sections(), 0.0));

    for _ in 0..40 {
        let dt = pipe.stable_time_step();
        let report = pipe.step(dt).unwrap();
        tracker.update(report.time, pipe.diagnostics(dt), &report.boundary);
    }

    // extra liquid has entered
    assert!(tracker.transferred().net_liquid() > 0.0);
    assert!(tracker.current().liquid_mass > tracker.initial().liquid_mass);

    assert!(
        tracker.liquid_balance_error() < 1e-9,
        "liquid imbalance {:.3e}",
        tracker.liquid_balance_error()
    );
    assert!(
        tracker.gas_balance_error() < 1e-9,
        "gas imbalance {:.3e}",
        tracker.gas_balance_error()
    );
    assert!(tracker.max_cfl_seen() < 0.55);
}

#[test]
fn test_liquid_rich_inlet_runs_and_conserves_mass() {
    // feed holdup differs from the first cell's
    let cases = [
        (StandardFlux::default(), 1.1),
        (StandardFlux::default(), 2.0),
        (StandardFlux::Rusanov, 2.0),
        (StandardFlux::Upwind, 2.0),
    ];
    for (flux, factor) in cases {
        let mut pipe = flowing_pipe(SolverConfig::default().with_flux(flux), factor);
        let mut tracker = InventoryTracker::new(PipeDiagnostics::compute(pipe.sections(), 0.0));

        for _ in 0..400 {
            let dt = pipe.stable_time_step();
            let report = pipe
                .step(dt)
                .unwrap_or_else(|e| panic!("{:?} at {}x liquid: {}", flux, factor, e));
            tracker.update(report.time, pipe.diagnostics(dt), &report.boundary);
        }

        assert!(tracker.current().liquid_mass > tracker.initial().liquid_mass);
        assert!(
            tracker.liquid_balance_error() < 1e-9,
            "{:?} at {}x: liquid imbalance {:.3e}",
            flux,
            factor,
            tracker.liquid_balance_error()
        );
        assert!(tracker.gas_balance_error() < 1e-9);
        for s in pipe.sections() {
            assert!(s.liquid_velocity.abs() < 10.0 && s.gas_velocity.abs() < 10.0);
            assert!(s.liquid_holdup > 0.0 && s.liquid_holdup < 1.0);
        }
    }
}

#[test]
fn test_uniform_flow_is_preserved() {
    for flux in [
        StandardFlux::default(),
        StandardFlux::Upwind,
        StandardFlux::Rusanov,
    ] {
        let mut pipe = flowing_pipe(config(flux), 1.0);
        let summary = pipe.run_until(0.1, 0.01, |_| {}).unwrap();
        assert!(summary.n_steps > 0);

        for (i, s) in pipe.sections().iter().enumerate() {
            assert!(
                (s.liquid_holdup - HOLDUP).abs() < 1e-8,
                "{:?}: holdup drifted in cell {}: {}",
                flux,
                i,
                s.liquid_holdup
            );
            assert!((s.liquid_velocity - VELOCITY).abs() < 1e-6);
            assert!((s.gas_velocity - VELOCITY).abs() < 1e-6);
            assert!((s.pressure - PRESSURE).abs() / PRESSURE < 1e-8);
        }
    }
}

#[test]
fn test_integrators_agree_at_rest() {
    for integrator in [
        StandardIntegrator::SSPRK3,
        StandardIntegrator::RK4,
        StandardIntegrator::ForwardEuler,
    ] {
        let pipeline = Pipeline::horizontal(8, 80.0, 0.3, 0.0).unwrap();
        let cfg = config(StandardFlux::default()).with_integrator(integrator);
        let mut pipe = TransientPipe::new(pipeline, BoundaryConditions::closed(), cfg).unwrap();
        pipe.initialize_uniform(PRESSURE, TEMPERATURE, 0.4, 0.0, 0.0)
            .unwrap();
        let before = pipe.liquid_inventory();
        pipe.run_until(0.05, 0.01, |_| {}).unwrap();
        assert!((pipe.liquid_inventory() - before).abs() < 1e-9 * before);
        assert!(pipe.sections().iter().all(|s| s.liquid_velocity.abs() < 1e-9));
    }
}

#[test]
fn test_cfl_violation_reports_limiting_cell() {
    let mut pipe = flowing_pipe(config(StandardFlux::default()), 1.0);
    let dt_max = pipe.stable_time_step();
    assert!(dt_max.is_finite() && dt_max > 0.0);

    let err = pipe.step(2.0 * dt_max).unwrap_err();
    assert!(err.to_string().contains("CFL violation"));
    assert!(err.cell().is_some());
    match err {
        SolverError::Config(ConfigError::CflViolation {
            dt,
            dt_max: limit,
            cell,
            wave_speed,
        }) => {
            assert_eq!(dt, 2.0 * dt_max);
            assert!((limit - dt_max).abs() < 1e-15);
            assert!(cell.get() < 10);
            assert!(wave_speed > VELOCITY);
        }
        other => panic!("expected CFL violation, got {other}"),
    }
    assert_eq!(pipe.step_count(), 0);

    // a step at the limit is accepted
    assert!(pipe.step(dt_max).is_ok());
}

#[test]
fn test_pressure_inlet_drives_flow() {
    let pipeline = Pipeline::horizontal(10, 100.0, 0.2, 0.0).unwrap();
    let boundary = BoundaryConditions::new(
        InletBoundary::Pressure {
            pressure: 1.01 * PRESSURE,
            temperature: TEMPERATURE,
            liquid_holdup: HOLDUP,
        },
        OutletBoundary::Pressure(PRESSURE),
    );
    let mut pipe = TransientPipe::new(pipeline, boundary, config(StandardFlux::Rusanov)).unwrap();
    pipe.initialize_uniform(PRESSURE, TEMPERATURE, HOLDUP, 0.0, 0.0)
        .unwrap();

    let summary = pipe.run_until(0.05, 0.01, |_| {}).unwrap();
    assert!(summary.boundary.inlet_gas > 0.0);
    assert!(pipe.sections()[0].pressure > PRESSURE);
    assert!(pipe.sections()[0].gas_velocity > 0.0);
}
