//! Recovery of primitive variables from conserved cell states.
//!
//! The two phase masses fix the pressure through the volume constraint
//!
//! ```text
//! g(P) = m_g / (ρ_g(P, T) A) + m_l / (ρ_l(P, T) A) - 1 = 0
//! ```
//!
//! `g` is strictly decreasing in `P`, so a root is bracketed by the sign of
//! `g`. The iteration takes secant steps (the first one with the acoustic
//! slope `dρ/dP ≈ 1/c²`) and falls back to bisection, or to doubling and
//! halving while the bracket is open, whenever a step leaves the bracket.
//!
//! With the energy equation enabled the temperature is recovered from the
//! mixture enthalpy content by a secant iteration at the current pressure,
//! alternating with pressure solves until the temperature settles.

use crate::equations::{Composition, FluidState, P_REF, Phase, ThermoProvider};
use crate::error::SolverError;
use crate::mesh::{MIN_PHASE_HOLDUP, PipeSection};
use crate::solver::ConservedState;
use crate::types::CellIndex;

/// Relative size of a negative mass accepted as round-off.
const NEGATIVE_MASS_TOLERANCE: f64 = 1e-10;

/// Iteration controls for the pressure and temperature sub-solves.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecoveryConfig {
    /// Convergence tolerance on the volume residual and relative pressure step
    pub pressure_tolerance: f64,
    pub max_pressure_iterations: usize,
    /// Convergence tolerance on temperature (K)
    pub temperature_tolerance: f64,
    pub max_temperature_iterations: usize,
    /// Recover temperature from the energy content
    pub energy_equation: bool,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            pressure_tolerance: 1e-10,
            max_pressure_iterations: 60,
            temperature_tolerance: 1e-6,
            max_temperature_iterations: 40,
            energy_equation: false,
        }
    }
}

/// Identifies the cell and step being recovered, for error reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoveryContext {
    pub step: usize,
    pub cell: CellIndex,
}

/// Primitive state of one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrimitiveState {
    pub pressure: f64,
    pub temperature: f64,
    pub gas_holdup: f64,
    pub liquid_holdup: f64,
    pub gas_velocity: f64,
    pub liquid_velocity: f64,
    pub gas: FluidState,
    pub liquid: FluidState,
}

impl PrimitiveState {
    /// Write the state into a section, keeping its geometry and tags.
    pub fn apply_to(&self, section: &mut PipeSection) {
        section.pressure = self.pressure;
        section.temperature = self.temperature;
        section.gas_holdup = self.gas_holdup;
        section.liquid_holdup = self.liquid_holdup;
        section.gas_velocity = self.gas_velocity;
        section.liquid_velocity = self.liquid_velocity;
        section.gas = self.gas;
        section.liquid = self.liquid;
    }
}

/// Thermodynamic environment of the sub-solves.
pub struct PrimitiveSolver<'a> {
    pub thermo: &'a dyn ThermoProvider,
    pub composition: &'a Composition,
    pub config: RecoveryConfig,
}

impl<'a> PrimitiveSolver<'a> {
    pub fn new(
        thermo: &'a dyn ThermoProvider,
        composition: &'a Composition,
        config: RecoveryConfig,
    ) -> Self {
        Self {
            thermo,
            composition,
            config,
        }
    }

    /// Flash one phase, attaching the step and cell to a failure.
    pub fn flash(
        &self,
        ctx: RecoveryContext,
        phase: Phase,
        pressure: f64,
        temperature: f64,
    ) -> Result<FluidState, SolverError> {
        self.thermo
            .flash_state(phase, pressure, temperature, self.composition)
            .map_err(|source| SolverError::Flash {
                step: ctx.step,
                cell: ctx.cell,
                source,
            })
    }

    /// Recover the primitive state of a cell.
    ///
    /// `guess` supplies the geometry, the starting pressure and, when the
    /// energy equation is off, the temperature.
    pub fn recover(
        &self,
        ctx: RecoveryContext,
        u: &ConservedState,
        guess: &PipeSection,
    ) -> Result<PrimitiveState, SolverError> {
        let (mg, ml) = checked_masses(ctx, u)?;
        let area = guess.area;

        let mut temperature = guess.temperature;
        let mut solve = self.solve_pressure(ctx, mg, ml, area, guess.pressure, temperature)?;

        if self.config.energy_equation {
            let mut converged = false;
            let mut change = f64::NAN;
            for _ in 0..self.config.max_temperature_iterations {
                let t_new = self.solve_temperature(ctx, mg, ml, u.energy, solve.0, temperature)?;
                solve = self.solve_pressure(ctx, mg, ml, area, solve.0, t_new)?;
                change = (t_new - temperature).abs();
                temperature = t_new;
                if change < self.config.temperature_tolerance {
                    converged = true;
                    break;
                }
            }
            if !converged {
                return Err(SolverError::NonConvergence {
                    step: ctx.step,
                    cell: ctx.cell,
                    quantity: "pressure-temperature coupling",
                    iterations: self.config.max_temperature_iterations,
                    residual: change,
                });
            }
        }
        let (pressure, gas, liquid) = solve;

        let vol_g = mg / (gas.density * area);
        let vol_l = ml / (liquid.density * area);
        let total = vol_g + vol_l;
        let gas_holdup = vol_g / total;
        let liquid_holdup = vol_l / total;

        let (gas_velocity, liquid_velocity) =
            phase_velocities(u, gas_holdup, liquid_holdup, mg, ml);

        Ok(PrimitiveState {
            pressure,
            temperature,
            gas_holdup,
            liquid_holdup,
            gas_velocity,
            liquid_velocity,
            gas,
            liquid,
        })
    }

    /// Volume residual and its pressure slope at `p`.
    fn residual(
        &self,
        ctx: RecoveryContext,
        mg: f64,
        ml: f64,
        area: f64,
        p: f64,
        t: f64,
    ) -> Result<(f64, f64, FluidState, FluidState), SolverError> {
        let gas = self.flash(ctx, Phase::Gas, p, t)?;
        let liquid = self.flash(ctx, Phase::Liquid, p, t)?;
        let g = mg / (gas.density * area) + ml / (liquid.density * area) - 1.0;
        let slope = -mg / (gas.density * gas.density * area * gas.sound_speed * gas.sound_speed)
            - ml / (liquid.density * liquid.density * area * liquid.sound_speed * liquid.sound_speed);
        Ok((g, slope, gas, liquid))
    }

    fn solve_pressure(
        &self,
        ctx: RecoveryContext,
        mg: f64,
        ml: f64,
        area: f64,
        p_guess: f64,
        t: f64,
    ) -> Result<(f64, FluidState, FluidState), SolverError> {
        let tol = self.config.pressure_tolerance;
        let mut lo = 0.0_f64;
        let mut hi = f64::INFINITY;
        let mut p = if p_guess.is_finite() && p_guess > 0.0 {
            p_guess
        } else {
            P_REF
        };
        let mut prev: Option<(f64, f64)> = None;
        let mut g = f64::NAN;

        for _ in 0..self.config.max_pressure_iterations {
            let (res, acoustic_slope, gas, liquid) = self.residual(ctx, mg, ml, area, p, t)?;
            g = res;
            if g.abs() < tol {
                return Ok((p, gas, liquid));
            }
            // g decreases with P: positive residual means P is too low
            if g > 0.0 {
                lo = lo.max(p);
            } else {
                hi = hi.min(p);
            }

            let slope = match prev {
                Some((p0, g0)) if p != p0 => {
                    let secant = (g - g0) / (p - p0);
                    if secant < 0.0 && secant.is_finite() {
                        secant
                    } else {
                        acoustic_slope
                    }
                }
                _ => acoustic_slope,
            };
            prev = Some((p, g));

            let mut next = if slope < 0.0 { p - g / slope } else { f64::NAN };
            if !(next > lo && next < hi) {
                next = if hi.is_finite() && lo > 0.0 {
                    0.5 * (lo + hi)
                } else if g > 0.0 {
                    2.0 * p
                } else {
                    0.5 * p
                };
            }
            if (next - p).abs() <= tol * p {
                let (_, _, gas, liquid) = self.residual(ctx, mg, ml, area, next, t)?;
                return Ok((next, gas, liquid));
            }
            p = next;
        }

        Err(SolverError::NonConvergence {
            step: ctx.step,
            cell: ctx.cell,
            quantity: "pressure",
            iterations: self.config.max_pressure_iterations,
            residual: g.abs(),
        })
    }

    fn solve_temperature(
        &self,
        ctx: RecoveryContext,
        mg: f64,
        ml: f64,
        energy: f64,
        p: f64,
        t_guess: f64,
    ) -> Result<f64, SolverError> {
        let content = |t: f64| -> Result<f64, SolverError> {
            let h_g = if mg > 0.0 {
                self.flash(ctx, Phase::Gas, p, t)?.enthalpy
            } else {
                0.0
            };
            let h_l = if ml > 0.0 {
                self.flash(ctx, Phase::Liquid, p, t)?.enthalpy
            } else {
                0.0
            };
            Ok(mg * h_g + ml * h_l - energy)
        };

        let tol = self.config.temperature_tolerance;
        let mut t0 = t_guess;
        let mut f0 = content(t0)?;
        let mut t1 = t_guess + 1.0;
        let mut f1 = content(t1)?;

        for _ in 0..self.config.max_temperature_iterations {
            if (f1 - f0).abs() < f64::EPSILON * f1.abs().max(1.0) {
                break;
            }
            let mut t2 = t1 - f1 * (t1 - t0) / (f1 - f0);
            if !t2.is_finite() {
                break;
            }
            // keep the iterate physical
            if t2 <= 0.0 {
                t2 = 0.5 * t1;
            }
            if (t2 - t1).abs() < tol {
                return Ok(t2);
            }
            t0 = t1;
            f0 = f1;
            t1 = t2;
            f1 = content(t1)?;
        }

        Err(SolverError::NonConvergence {
            step: ctx.step,
            cell: ctx.cell,
            quantity: "temperature",
            iterations: self.config.max_temperature_iterations,
            residual: f1.abs(),
        })
    }
}

/// Phase masses with round-off negatives zeroed; real negatives and
/// non-finite states are divergence.
fn checked_masses(ctx: RecoveryContext, u: &ConservedState) -> Result<(f64, f64), SolverError> {
    let diverged = |field, value| SolverError::Diverged {
        step: ctx.step,
        cell: ctx.cell,
        field,
        value,
    };
    let fields = [
        ("gas_mass", u.gas_mass),
        ("liquid_mass", u.liquid_mass),
        ("gas_momentum", u.gas_momentum),
        ("liquid_momentum", u.liquid_momentum),
        ("energy", u.energy),
    ];
    if let Some((field, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
        return Err(diverged(field, *value));
    }

    let total = u.gas_mass.abs() + u.liquid_mass.abs();
    if total <= 0.0 {
        return Err(diverged("total_mass", total));
    }
    let floor = -NEGATIVE_MASS_TOLERANCE * total;
    if u.gas_mass < floor {
        return Err(diverged("gas_mass", u.gas_mass));
    }
    if u.liquid_mass < floor {
        return Err(diverged("liquid_mass", u.liquid_mass));
    }
    Ok((u.gas_mass.max(0.0), u.liquid_mass.max(0.0)))
}

/// Velocities from momenta; a vanishing phase moves with the other one.
fn phase_velocities(
    u: &ConservedState,
    gas_holdup: f64,
    liquid_holdup: f64,
    mg: f64,
    ml: f64,
) -> (f64, f64) {
    let gas_present = gas_holdup >= MIN_PHASE_HOLDUP && mg > 0.0;
    let liquid_present = liquid_holdup >= MIN_PHASE_HOLDUP && ml > 0.0;
    match (gas_present, liquid_present) {
        (true, true) => (u.gas_momentum / mg, u.liquid_momentum / ml),
        (true, false) => {
            let v = u.gas_momentum / mg;
            (v, v)
        }
        (false, true) => {
            let v = u.liquid_momentum / ml;
            (v, v)
        }
        (false, false) => (0.0, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::PolytropicFluids;
    use crate::mesh::PipeSegment;

    const TOL: f64 = 1e-8;

    fn ctx() -> RecoveryContext {
        RecoveryContext {
            step: 7,
            cell: CellIndex::new(2),
        }
    }

    /// Section at (p, T, holdup) with properties from the stub provider.
    fn section(fluids: &PolytropicFluids, p: f64, t: f64, liquid_holdup: f64) -> PipeSection {
        let c = Composition::default();
        let mut s = PipeSection::new(0.0, 0.0, &PipeSegment::horizontal(10.0, 0.2, 0.0));
        s.pressure = p;
        s.temperature = t;
        s.set_liquid_holdup(liquid_holdup);
        s.gas = fluids.flash_state(Phase::Gas, p, t, &c).unwrap();
        s.liquid = fluids.flash_state(Phase::Liquid, p, t, &c).unwrap();
        s.gas_velocity = 4.0;
        s.liquid_velocity = 1.5;
        s
    }

    #[test]
    fn test_recovers_pressure_from_far_guess() {
        let fluids = PolytropicFluids::default();
        let comp = Composition::default();
        let exact = section(&fluids, 5e6, 300.0, 0.2);
        let u = ConservedState::from_section(&exact);

        let mut guess = exact.clone();
        guess.pressure = 2e5;
        let solver = PrimitiveSolver::new(&fluids, &comp, RecoveryConfig::default());
        let prim = solver.recover(ctx(), &u, &guess).unwrap();

        assert!((prim.pressure - 5e6).abs() / 5e6 < TOL, "p = {}", prim.pressure);
        assert!((prim.liquid_holdup - 0.2).abs() < TOL);
        assert!((prim.gas_holdup + prim.liquid_holdup - 1.0).abs() < 1e-14);
        assert!((prim.gas_velocity - 4.0).abs() < TOL);
        assert!((prim.liquid_velocity - 1.5).abs() < TOL);
    }

    #[test]
    fn test_guess_above_root() {
        let fluids = PolytropicFluids::default();
        let comp = Composition::default();
        let exact = section(&fluids, 3e6, 290.0, 0.5);
        let u = ConservedState::from_section(&exact);
        let mut guess = exact.clone();
        guess.pressure = 9e7;
        let solver = PrimitiveSolver::new(&fluids, &comp, RecoveryConfig::default());
        let prim = solver.recover(ctx(), &u, &guess).unwrap();
        assert!((prim.pressure - 3e6).abs() / 3e6 < TOL);
    }

    #[test]
    fn test_vanishing_phase_takes_other_velocity() {
        let fluids = PolytropicFluids::default();
        let comp = Composition::default();
        let exact = section(&fluids, 2e6, 300.0, 0.0);
        let u = ConservedState::from_section(&exact);
        let solver = PrimitiveSolver::new(&fluids, &comp, RecoveryConfig::default());
        let prim = solver.recover(ctx(), &u, &exact).unwrap();
        assert_eq!(prim.liquid_holdup, 0.0);
        assert!((prim.liquid_velocity - prim.gas_velocity).abs() < 1e-12);
    }

    #[test]
    fn test_negative_mass_is_divergence() {
        let fluids = PolytropicFluids::default();
        let comp = Composition::default();
        let s = section(&fluids, 2e6, 300.0, 0.3);
        let mut u = ConservedState::from_section(&s);
        u.liquid_mass = -0.1 * u.liquid_mass;
        let solver = PrimitiveSolver::new(&fluids, &comp, RecoveryConfig::default());
        match solver.recover(ctx(), &u, &s) {
            Err(SolverError::Diverged { step, cell, field, .. }) => {
                assert_eq!(step, 7);
                assert_eq!(cell, CellIndex::new(2));
                assert_eq!(field, "liquid_mass");
            }
            other => panic!("expected divergence, got {:?}", other),
        }

        let mut u = ConservedState::from_section(&s);
        u.gas_momentum = f64::NAN;
        assert!(matches!(
            solver.recover(ctx(), &u, &s),
            Err(SolverError::Diverged { field: "gas_momentum", .. })
        ));
    }

    #[test]
    fn test_iteration_budget_reports_non_convergence() {
        let fluids = PolytropicFluids::default();
        let comp = Composition::default();
        let exact = section(&fluids, 5e6, 300.0, 0.2);
        let u = ConservedState::from_section(&exact);
        let mut guess = exact.clone();
        guess.pressure = 1e5;
        let config = RecoveryConfig {
            max_pressure_iterations: 1,
            ..RecoveryConfig::default()
        };
        let solver = PrimitiveSolver::new(&fluids, &comp, config);
        assert!(matches!(
            solver.recover(ctx(), &u, &guess),
            Err(SolverError::NonConvergence { quantity: "pressure", iterations: 1, .. })
        ));
    }

    #[test]
    fn test_flash_failure_is_reported_with_cell() {
        let fluids = PolytropicFluids::default();
        let bad = Composition::new(vec![0.7, 0.7]);
        let s = section(&fluids, 2e6, 300.0, 0.3);
        let u = ConservedState::from_section(&s);
        let solver = PrimitiveSolver::new(&fluids, &bad, RecoveryConfig::default());
        let err = solver.recover(ctx(), &u, &s).unwrap_err();
        assert!(matches!(err, SolverError::Flash { .. }));
        assert_eq!(err.cell(), Some(CellIndex::new(2)));
    }

    #[test]
    fn test_temperature_recovery() {
        let fluids = PolytropicFluids::default();
        let comp = Composition::default();
        let exact = section(&fluids, 4e6, 320.0, 0.25);
        let u = ConservedState::from_section(&exact);
        let mut guess = exact.clone();
        guess.temperature = 300.0;
        guess.pressure = 3.5e6;
        let config = RecoveryConfig {
            energy_equation: true,
            ..RecoveryConfig::default()
        };
        let solver = PrimitiveSolver::new(&fluids, &comp, config);
        let prim = solver.recover(ctx(), &u, &guess).unwrap();
        assert!((prim.temperature - 320.0).abs() < 1e-3, "T = {}", prim.temperature);
        assert!((prim.pressure - 4e6).abs() / 4e6 < 1e-5);
    }
}
