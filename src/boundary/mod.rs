//! Boundary conditions at the pipe ends.
//!
//! Each end contributes one face flux per phase. Pressure conditions build a
//! ghost section (a copy of the adjacent cell at the imposed pressure,
//! re-flashed) and flux it with the interior scheme; a mass-flow inlet
//! imposes its mass flux exactly.
//!
//! # Available Boundary Conditions
//!
//! | Inlet | Description |
//! |-------|-------------|
//! | `MassFlow` | Fixed gas and liquid mass rates, no-slip split at the first cell pressure |
//! | `Pressure` | Fixed pressure, temperature and liquid holdup |
//! | `Closed` | Wall |
//!
//! | Outlet | Description |
//! |--------|-------------|
//! | `Pressure` | Fixed pressure, holdup and velocities extrapolated |
//! | `Closed` | Wall |
//!
//! At a wall only the pressure force `α P A` crosses the face. At an inlet
//! the pressure force acts through the first cell's holdup, which is the
//! holdup the cell's `P ∂α/∂x` term uses at that face.

use crate::equations::{Composition, Phase, ThermoProvider};
use crate::error::{ConfigError, ThermoError};
use crate::flux::{PhaseFlux, PhaseFluxScheme, PhaseState};
use crate::mesh::PipeSection;

/// Inlet condition.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InletBoundary {
    /// Imposed mass rates (kg/s) at a feed temperature (K).
    MassFlow {
        gas: f64,
        liquid: f64,
        temperature: f64,
    },
    /// Imposed pressure (Pa), temperature (K) and liquid holdup.
    Pressure {
        pressure: f64,
        temperature: f64,
        liquid_holdup: f64,
    },
    Closed,
}

/// Outlet condition.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutletBoundary {
    /// Imposed pressure (Pa).
    Pressure(f64),
    Closed,
}

/// Conditions at both pipe ends.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundaryConditions {
    pub inlet: InletBoundary,
    pub outlet: OutletBoundary,
}

impl Default for BoundaryConditions {
    fn default() -> Self {
        Self::closed()
    }
}

impl BoundaryConditions {
    pub fn new(inlet: InletBoundary, outlet: OutletBoundary) -> Self {
        Self { inlet, outlet }
    }

    /// Both ends closed.
    pub fn closed() -> Self {
        Self::new(InletBoundary::Closed, OutletBoundary::Closed)
    }

    /// Mass-flow inlet discharging against a fixed outlet pressure.
    pub fn mass_flow_to_pressure(
        gas_rate: f64,
        liquid_rate: f64,
        inlet_temperature: f64,
        outlet_pressure: f64,
    ) -> Self {
        Self::new(
            InletBoundary::MassFlow {
                gas: gas_rate,
                liquid: liquid_rate,
                temperature: inlet_temperature,
            },
            OutletBoundary::Pressure(outlet_pressure),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |name, value, reason| ConfigError::InvalidParameter {
            name,
            value,
            reason,
        };
        match self.inlet {
            InletBoundary::MassFlow {
                gas,
                liquid,
                temperature,
            } => {
                if !gas.is_finite() || gas < 0.0 {
                    return Err(invalid("inlet_gas_rate", gas, "must be non-negative"));
                }
                if !liquid.is_finite() || liquid < 0.0 {
                    return Err(invalid("inlet_liquid_rate", liquid, "must be non-negative"));
                }
                if !temperature.is_finite() || temperature <= 0.0 {
                    return Err(invalid("inlet_temperature", temperature, "must be positive"));
                }
            }
            InletBoundary::Pressure {
                pressure,
                temperature,
                liquid_holdup,
            } => {
                if !pressure.is_finite() || pressure <= 0.0 {
                    return Err(invalid("inlet_pressure", pressure, "must be positive"));
                }
                if !temperature.is_finite() || temperature <= 0.0 {
                    return Err(invalid("inlet_temperature", temperature, "must be positive"));
                }
                if !(0.0..=1.0).contains(&liquid_holdup) {
                    return Err(invalid("inlet_liquid_holdup", liquid_holdup, "must lie in [0, 1]"));
                }
            }
            InletBoundary::Closed => {}
        }
        if let OutletBoundary::Pressure(p) = self.outlet
            && (!p.is_finite() || p <= 0.0)
        {
            return Err(invalid("outlet_pressure", p, "must be positive"));
        }
        Ok(())
    }
}

/// Gas and liquid flux through one face.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FaceFlux {
    pub gas: PhaseFlux,
    pub liquid: PhaseFlux,
}

impl FaceFlux {
    /// Wall face next to `cell`: only the pressure force acts.
    pub fn wall(cell: &PipeSection) -> Self {
        let wall = |holdup: f64| PhaseFlux {
            momentum: holdup * cell.pressure * cell.area,
            ..PhaseFlux::zero()
        };
        Self {
            gas: wall(cell.gas_holdup),
            liquid: wall(cell.liquid_holdup),
        }
    }

    /// Flux entering `inside` from the ghost `outside`.
    ///
    /// Mass, momentum and enthalpy are transported by the scheme from the
    /// ghost state. The pressure force is `α_inside · P_face · A` with the
    /// face pressure the mean of the two sides.
    pub fn inflow<F: PhaseFluxScheme + ?Sized>(
        scheme: &F,
        outside: &PipeSection,
        inside: &PipeSection,
        area: f64,
    ) -> Self {
        let face_pressure = 0.5 * (outside.pressure + inside.pressure);
        let phase_flux = |phase: Phase, holdup: f64| {
            let transport = |section: &PipeSection| PhaseState {
                pressure: 0.0,
                ..PhaseState::from_section(section, phase)
            };
            let mut flux = scheme.compute(&transport(outside), &transport(inside), area);
            flux.momentum += holdup * face_pressure * area;
            flux
        };
        Self {
            gas: phase_flux(Phase::Gas, inside.gas_holdup),
            liquid: phase_flux(Phase::Liquid, inside.liquid_holdup),
        }
    }

    /// Interface flux between two sections with the given scheme.
    pub fn between<F: PhaseFluxScheme + ?Sized>(
        scheme: &F,
        left: &PipeSection,
        right: &PipeSection,
        area: f64,
    ) -> Self {
        Self {
            gas: scheme.compute(
                &PhaseState::from_section(left, Phase::Gas),
                &PhaseState::from_section(right, Phase::Gas),
                area,
            ),
            liquid: scheme.compute(
                &PhaseState::from_section(left, Phase::Liquid),
                &PhaseState::from_section(right, Phase::Liquid),
                area,
            ),
        }
    }
}

/// Copy of `cell` at another pressure and temperature, re-flashed.
pub fn ghost_section(
    cell: &PipeSection,
    pressure: f64,
    temperature: f64,
    thermo: &dyn ThermoProvider,
    composition: &Composition,
) -> Result<PipeSection, ThermoError> {
    let mut ghost = cell.clone();
    ghost.pressure = pressure;
    ghost.temperature = temperature;
    ghost.gas = thermo.flash_state(Phase::Gas, pressure, temperature, composition)?;
    ghost.liquid = thermo.flash_state(Phase::Liquid, pressure, temperature, composition)?;
    Ok(ghost)
}

impl InletBoundary {
    /// Flux into the first cell.
    pub fn face_flux<F: PhaseFluxScheme + ?Sized>(
        &self,
        first: &PipeSection,
        scheme: &F,
        thermo: &dyn ThermoProvider,
        composition: &Composition,
    ) -> Result<FaceFlux, ThermoError> {
        match *self {
            InletBoundary::MassFlow {
                gas,
                liquid,
                temperature,
            } => {
                let p = first.pressure;
                let gas_state = thermo.flash_state(Phase::Gas, p, temperature, composition)?;
                let liquid_state = thermo.flash_state(Phase::Liquid, p, temperature, composition)?;
                let q_g = gas / gas_state.density;
                let q_l = liquid / liquid_state.density;
                let q = q_g + q_l;
                if q <= 0.0 {
                    return Ok(FaceFlux::wall(first));
                }
                let area = first.area;
                let v = q / area;
                let alpha_l = q_l / q;
                let alpha_g = 1.0 - alpha_l;
                let stream = |rate: f64, alpha: f64, wall_holdup: f64, enthalpy: f64| PhaseFlux {
                    mass: rate,
                    momentum: rate * v + wall_holdup * p * area,
                    energy: rate * enthalpy,
                    holdup: alpha * v,
                };
                Ok(FaceFlux {
                    gas: stream(gas, alpha_g, first.gas_holdup, gas_state.enthalpy),
                    liquid: stream(liquid, alpha_l, first.liquid_holdup, liquid_state.enthalpy),
                })
            }
            InletBoundary::Pressure {
                pressure,
                temperature,
                liquid_holdup,
            } => {
                let mut ghost = ghost_section(first, pressure, temperature, thermo, composition)?;
                ghost.set_liquid_holdup(liquid_holdup);
                Ok(FaceFlux::inflow(scheme, &ghost, first, first.area))
            }
            InletBoundary::Closed => Ok(FaceFlux::wall(first)),
        }
    }
}

impl OutletBoundary {
    /// Flux out of the last cell.
    pub fn face_flux<F: PhaseFluxScheme + ?Sized>(
        &self,
        last: &PipeSection,
        scheme: &F,
        thermo: &dyn ThermoProvider,
        composition: &Composition,
    ) -> Result<FaceFlux, ThermoError> {
        match *self {
            OutletBoundary::Pressure(pressure) => {
                let ghost = ghost_section(last, pressure, last.temperature, thermo, composition)?;
                Ok(FaceFlux::between(scheme, last, &ghost, last.area))
            }
            OutletBoundary::Closed => Ok(FaceFlux::wall(last)),
        }
    }
}
