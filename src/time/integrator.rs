//! Trait-based time integrator abstraction.
//!
//! This module provides traits for time integration that enable:
//! - Generic time integrators that work with any solution type
//! - Fallible right-hand sides, so a failed flash or pressure solve inside
//!   any stage aborts the step
//! - Both compile-time and runtime dispatch options
//!
//! # Example
//! ```
//! use pipeflow::solver::PipeSolution;
//! use pipeflow::time::{Integrable, TimeIntegrator, SSPRK3};
//!
//! let mut u = PipeSolution::zeros(4);
//! for c in &mut u.cells { c.liquid_mass = 1.0; }
//!
//! // du/dt = -u
//! SSPRK3
//!     .step(&mut u, 0.01, 0.0, |state, _time| {
//!         let mut rhs = state.clone();
//!         rhs.scale(-1.0);
//!         Ok::<_, std::convert::Infallible>(rhs)
//!     })
//!     .unwrap();
//! assert!(u.cells[0].liquid_mass < 1.0);
//! ```

use crate::solver::PipeSolution;

// =============================================================================
// Integrable Trait
// =============================================================================

/// Trait for solution types that can be time-integrated.
///
/// This provides the vector space operations needed by explicit time integrators:
/// - `scale`: Multiply by scalar (x <- c * x)
/// - `axpy`: Add scaled vector (x <- x + c * y)
pub trait Integrable: Clone + Send + Sized {
    /// Scale the solution by a constant: self <- c * self
    fn scale(&mut self, c: f64);

    /// Add a scaled vector: self <- self + c * other
    fn axpy(&mut self, c: f64, other: &Self);

    /// Create a zero-initialized solution with the same shape.
    fn zeros_like(&self) -> Self {
        let mut result = self.clone();
        result.scale(0.0);
        result
    }
}

// =============================================================================
// IntegratorInfo Trait (non-generic, dyn-compatible)
// =============================================================================

/// Non-generic information about a time integrator.
///
/// Separate from [`TimeIntegrator`] so it can be queried without a solution
/// type and used behind `dyn`.
pub trait IntegratorInfo: Send + Sync {
    /// Name for logging.
    fn name(&self) -> &'static str;

    /// Order of accuracy.
    fn order(&self) -> usize;

    /// Number of RHS evaluations per step.
    fn n_stages(&self) -> usize;

    /// Whether the integrator is strong stability preserving (SSP).
    fn is_ssp(&self) -> bool;

    /// Times at which the RHS is evaluated, relative to the step start.
    fn stage_times(&self, dt: f64) -> Vec<f64>;
}

// =============================================================================
// TimeIntegrator Trait
// =============================================================================

/// Trait for explicit time integrators.
///
/// Advances the solution from `t` to `t + dt`. The RHS receives the stage
/// state and time and returns the time derivative, or an error that aborts
/// the step. On error the state is left untouched.
pub trait TimeIntegrator<S: Integrable>: IntegratorInfo {
    /// Advance the solution by one time step.
    ///
    /// # Arguments
    /// * `state` - Solution to advance (modified in place on success)
    /// * `dt` - Time step size
    /// * `t` - Current time
    /// * `rhs` - f(state, time) -> time derivative
    fn step<F, E>(&self, state: &mut S, dt: f64, t: f64, rhs: F) -> Result<(), E>
    where
        F: FnMut(&S, f64) -> Result<S, E>;
}

// =============================================================================
// SSP-RK3 Implementation
// =============================================================================

/// Strong Stability Preserving Runge-Kutta 3rd order integrator.
///
/// Shu-Osher form; keeps the TVD property of the MUSCL discretisation.
///
/// ```text
/// u1 = u + dt * L(u, t)
/// u2 = 3/4 * u + 1/4 * u1 + 1/4 * dt * L(u1, t + dt)
/// u_new = 1/3 * u + 2/3 * u2 + 2/3 * dt * L(u2, t + dt/2)
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct SSPRK3;

impl IntegratorInfo for SSPRK3 {
    fn name(&self) -> &'static str {
        "ssp-rk3"
    }

    fn order(&self) -> usize {
        3
    }

    fn n_stages(&self) -> usize {
        3
    }

    fn is_ssp(&self) -> bool {
        true
    }

    fn stage_times(&self, dt: f64) -> Vec<f64> {
        vec![0.0, dt, 0.5 * dt]
    }
}

impl<S: Integrable> TimeIntegrator<S> for SSPRK3 {
    fn step<F, E>(&self, state: &mut S, dt: f64, t: f64, mut rhs: F) -> Result<(), E>
    where
        F: FnMut(&S, f64) -> Result<S, E>,
    {
        // Stage 1: u1 = u + dt * L(u, t)
        let l_u = rhs(state, t)?;
        let mut u1 = state.clone();
        u1.axpy(dt, &l_u);

        // Stage 2: u2 = 3/4 * u + 1/4 * u1 + 1/4 * dt * L(u1, t + dt)
        let l_u1 = rhs(&u1, t + dt)?;
        let mut u2 = state.clone();
        u2.scale(0.75);
        u2.axpy(0.25, &u1);
        u2.axpy(0.25 * dt, &l_u1);

        // Stage 3: u_new = 1/3 * u + 2/3 * u2 + 2/3 * dt * L(u2, t + dt/2)
        let l_u2 = rhs(&u2, t + 0.5 * dt)?;
        state.scale(1.0 / 3.0);
        state.axpy(2.0 / 3.0, &u2);
        state.axpy(2.0 / 3.0 * dt, &l_u2);
        Ok(())
    }
}

// =============================================================================
// Classical RK4
// =============================================================================

/// Classical fourth-order Runge-Kutta.
///
/// Not SSP; use with a conservative CFL number.
///
/// ```text
/// k1 = L(u, t)
/// k2 = L(u + dt/2 k1, t + dt/2)
/// k3 = L(u + dt/2 k2, t + dt/2)
/// k4 = L(u + dt k3, t + dt)
/// u_new = u + dt/6 (k1 + 2 k2 + 2 k3 + k4)
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct RK4;

impl IntegratorInfo for RK4 {
    fn name(&self) -> &'static str {
        "rk4"
    }

    fn order(&self) -> usize {
        4
    }

    fn n_stages(&self) -> usize {
        4
    }

    fn is_ssp(&self) -> bool {
        false
    }

    fn stage_times(&self, dt: f64) -> Vec<f64> {
        vec![0.0, 0.5 * dt, 0.5 * dt, dt]
    }
}

impl<S: Integrable> TimeIntegrator<S> for RK4 {
    fn step<F, E>(&self, state: &mut S, dt: f64, t: f64, mut rhs: F) -> Result<(), E>
    where
        F: FnMut(&S, f64) -> Result<S, E>,
    {
        let k1 = rhs(state, t)?;

        let mut stage = state.clone();
        stage.axpy(0.5 * dt, &k1);
        let k2 = rhs(&stage, t + 0.5 * dt)?;

        let mut stage = state.clone();
        stage.axpy(0.5 * dt, &k2);
        let k3 = rhs(&stage, t + 0.5 * dt)?;

        let mut stage = state.clone();
        stage.axpy(dt, &k3);
        let k4 = rhs(&stage, t + dt)?;

        state.axpy(dt / 6.0, &k1);
        state.axpy(dt / 3.0, &k2);
        state.axpy(dt / 3.0, &k3);
        state.axpy(dt / 6.0, &k4);
        Ok(())
    }
}

// =============================================================================
// Forward Euler
// =============================================================================

/// Forward Euler integrator (1st order).
///
/// ```text
/// u_new = u + dt * L(u, t)
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ForwardEuler;

impl IntegratorInfo for ForwardEuler {
    fn name(&self) -> &'static str {
        "forward-euler"
    }

    fn order(&self) -> usize {
        1
    }

    fn n_stages(&self) -> usize {
        1
    }

    fn is_ssp(&self) -> bool {
        true
    }

    fn stage_times(&self, _dt: f64) -> Vec<f64> {
        vec![0.0]
    }
}

impl<S: Integrable> TimeIntegrator<S> for ForwardEuler {
    fn step<F, E>(&self, state: &mut S, dt: f64, t: f64, mut rhs: F) -> Result<(), E>
    where
        F: FnMut(&S, f64) -> Result<S, E>,
    {
        let l_u = rhs(state, t)?;
        state.axpy(dt, &l_u);
        Ok(())
    }
}

// =============================================================================
// Standard Integrator Enum (Zero-Cost Dispatch)
// =============================================================================

/// Enum wrapper for built-in integrators, selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StandardIntegrator {
    /// SSP-RK3 (default)
    #[default]
    SSPRK3,
    /// Classical RK4
    RK4,
    /// Forward Euler (1st order)
    ForwardEuler,
}

impl IntegratorInfo for StandardIntegrator {
    fn name(&self) -> &'static str {
        match self {
            StandardIntegrator::SSPRK3 => SSPRK3.name(),
            StandardIntegrator::RK4 => RK4.name(),
            StandardIntegrator::ForwardEuler => ForwardEuler.name(),
        }
    }

    fn order(&self) -> usize {
        match self {
            StandardIntegrator::SSPRK3 => 3,
            StandardIntegrator::RK4 => 4,
            StandardIntegrator::ForwardEuler => 1,
        }
    }

    fn n_stages(&self) -> usize {
        match self {
            StandardIntegrator::SSPRK3 => 3,
            StandardIntegrator::RK4 => 4,
            StandardIntegrator::ForwardEuler => 1,
        }
    }

    fn is_ssp(&self) -> bool {
        !matches!(self, StandardIntegrator::RK4)
    }

    fn stage_times(&self, dt: f64) -> Vec<f64> {
        match self {
            StandardIntegrator::SSPRK3 => SSPRK3.stage_times(dt),
            StandardIntegrator::RK4 => RK4.stage_times(dt),
            StandardIntegrator::ForwardEuler => ForwardEuler.stage_times(dt),
        }
    }
}

impl<S: Integrable> TimeIntegrator<S> for StandardIntegrator {
    fn step<F, E>(&self, state: &mut S, dt: f64, t: f64, rhs: F) -> Result<(), E>
    where
        F: FnMut(&S, f64) -> Result<S, E>,
    {
        match self {
            StandardIntegrator::SSPRK3 => SSPRK3.step(state, dt, t, rhs),
            StandardIntegrator::RK4 => RK4.step(state, dt, t, rhs),
            StandardIntegrator::ForwardEuler => ForwardEuler.step(state, dt, t, rhs),
        }
    }
}

// =============================================================================
// Boxed Integrator Info (Runtime Polymorphism for Info Only)
// =============================================================================

/// Boxed integrator info.
///
/// `TimeIntegrator` itself is not dyn-compatible because `step` is generic
/// over the closure; use [`StandardIntegrator`] for runtime selection.
pub type BoxedIntegratorInfo = Box<dyn IntegratorInfo>;

pub fn create_integrator_info(integrator: StandardIntegrator) -> BoxedIntegratorInfo {
    match integrator {
        StandardIntegrator::SSPRK3 => Box::new(SSPRK3),
        StandardIntegrator::RK4 => Box::new(RK4),
        StandardIntegrator::ForwardEuler => Box::new(ForwardEuler),
    }
}

// =============================================================================
// Integrable Implementations
// =============================================================================

impl Integrable for PipeSolution {
    fn scale(&mut self, c: f64) {
        self.scale(c);
    }

    fn axpy(&mut self, c: f64, other: &Self) {
        self.axpy(c, other);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn ones(n: usize) -> PipeSolution {
        let mut u = PipeSolution::zeros(n);
        for c in &mut u.cells {
            c.liquid_mass = 1.0;
        }
        u
    }

    fn run<I: TimeIntegrator<PipeSolution>>(integrator: &I, rate: f64, dt: f64, n_steps: usize) -> f64 {
        let mut u = ones(1);
        for i in 0..n_steps {
            let t = dt * i as f64;
            integrator
                .step(&mut u, dt, t, |state, _time| {
                    let mut rhs = state.clone();
                    rhs.scale(rate);
                    Ok::<_, Infallible>(rhs)
                })
                .unwrap();
        }
        u.cells[0].liquid_mass
    }

    #[test]
    fn test_ssprk3_order() {
        // du/dt = u, u(0) = 1
        let v = run(&SSPRK3, 1.0, 0.01, 10);
        let expected = 0.1_f64.exp();
        assert!((v - expected).abs() < 1e-6, "Expected {}, got {}", expected, v);
    }

    #[test]
    fn test_rk4_order() {
        let v = run(&RK4, 1.0, 0.1, 10);
        let expected = 1.0_f64.exp();
        assert!((v - expected).abs() < 1e-5, "Expected {}, got {}", expected, v);
    }

    #[test]
    fn test_forward_euler_order() {
        // du/dt = -u, u(0) = 1
        let v = run(&ForwardEuler, -1.0, 0.001, 100);
        let expected = (-0.1_f64).exp();
        assert!((v - expected).abs() < 1e-3, "Expected {}, got {}", expected, v);
    }

    #[test]
    fn test_standard_integrator_dispatch() {
        for integrator in [
            StandardIntegrator::SSPRK3,
            StandardIntegrator::RK4,
            StandardIntegrator::ForwardEuler,
        ] {
            assert!(run(&integrator, 1.0, 0.01, 1) > 1.0, "{}", integrator.name());
        }
    }

    #[test]
    fn test_failing_rhs_leaves_state_untouched() {
        let mut u = ones(2);
        let before = u.clone();
        let mut calls = 0;
        let result = SSPRK3.step(&mut u, 0.1, 0.0, |state, _t| {
            calls += 1;
            if calls == 3 {
                Err("flash failed")
            } else {
                Ok(state.clone())
            }
        });
        assert_eq!(result, Err("flash failed"));
        assert_eq!(calls, 3);
        assert_eq!(u, before);
    }

    #[test]
    fn test_boundary_totals_integrate_exactly() {
        // Constant inflow rate of 2 kg/s over dt = 0.5 must add exactly 1 kg
        // regardless of the stage weights.
        for integrator in [
            StandardIntegrator::SSPRK3,
            StandardIntegrator::RK4,
            StandardIntegrator::ForwardEuler,
        ] {
            let mut u = PipeSolution::zeros(1);
            integrator
                .step(&mut u, 0.5, 0.0, |state, _t| {
                    let mut rhs = state.zeros_like();
                    rhs.boundary.inlet_liquid = 2.0;
                    Ok::<_, Infallible>(rhs)
                })
                .unwrap();
            assert!((u.boundary.inlet_liquid - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_stage_times() {
        let dt = 0.1;
        let times = SSPRK3.stage_times(dt);
        assert_eq!(times.len(), 3);
        assert!((times[1] - dt).abs() < 1e-14);
        assert!((times[2] - 0.5 * dt).abs() < 1e-14);
        assert_eq!(RK4.stage_times(dt).len(), RK4.n_stages());
    }

    #[test]
    fn test_info() {
        assert_eq!(StandardIntegrator::default().name(), "ssp-rk3");
        assert!(!StandardIntegrator::RK4.is_ssp());
        let info = create_integrator_info(StandardIntegrator::RK4);
        assert_eq!(info.order(), 4);
        assert!(!info.is_ssp());
    }
}
