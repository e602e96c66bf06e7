//! Wall and interfacial friction source terms.
//!
//! Wall shear per phase uses the Darcy factor on the pipe diameter:
//!
//! τ_w,k = f_k ρ_k v_k |v_k| / 8,  S_k = α_k π D (wetted perimeter)
//! S_momentum_k = -τ_w,k S_k
//!
//! with
//! - Re < 10: f = 6.4
//! - Re < 2300: f = 64 / Re (laminar)
//! - otherwise Haaland: 1/√f = -1.8 log10[(ε/D / 3.7)^1.11 + 6.9 / Re]
//!
//! floored at 0.001.
//!
//! Interfacial shear couples the phases with an equal and opposite force:
//!
//! τ_i = f_i ρ_g (v_g - v_l) |v_g - v_l| / 8,  S_i = 2 D √(α_l α_g)

use std::f64::consts::PI;

use crate::error::ConfigError;
use crate::mesh::{MIN_PHASE_HOLDUP, PipeSection};
use crate::solver::ConservedState;
use crate::source::SourceTerm;

/// Reynolds number below which the friction factor is held constant.
const CREEPING_REYNOLDS: f64 = 10.0;

/// Laminar-turbulent transition.
const TRANSITION_REYNOLDS: f64 = 2300.0;

/// Lower bound on any Darcy factor.
const MIN_FRICTION_FACTOR: f64 = 0.001;

/// Darcy friction factor.
///
/// # Arguments
/// * `reynolds` - Reynolds number (non-negative)
/// * `relative_roughness` - ε / D
pub fn darcy_friction_factor(reynolds: f64, relative_roughness: f64) -> f64 {
    let f = if reynolds < CREEPING_REYNOLDS {
        64.0 / CREEPING_REYNOLDS
    } else if reynolds < TRANSITION_REYNOLDS {
        64.0 / reynolds
    } else {
        let arg = (relative_roughness / 3.7).powf(1.11) + 6.9 / reynolds;
        let inv_sqrt_f = -1.8 * arg.log10();
        1.0 / (inv_sqrt_f * inv_sqrt_f)
    };
    f.max(MIN_FRICTION_FACTOR)
}

/// Friction options.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrictionConfig {
    /// Apply wall shear
    pub wall: bool,
    /// Apply gas-liquid interfacial shear
    pub interfacial: bool,
    /// Interfacial Darcy factor
    pub interfacial_factor: f64,
}

impl Default for FrictionConfig {
    fn default() -> Self {
        Self {
            wall: true,
            interfacial: true,
            interfacial_factor: 0.014,
        }
    }
}

impl FrictionConfig {
    /// No friction at all (inviscid transport).
    pub fn frictionless() -> Self {
        Self {
            wall: false,
            interfacial: false,
            ..Self::default()
        }
    }

    pub fn with_interfacial_factor(mut self, factor: f64) -> Self {
        self.interfacial_factor = factor;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.interfacial_factor.is_finite() || self.interfacial_factor < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "interfacial_factor",
                value: self.interfacial_factor,
                reason: "must be non-negative",
            });
        }
        Ok(())
    }
}

/// Wall shear on both phases.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WallFriction;

impl WallFriction {
    /// Shear force per unit length on one phase (N/m), opposing its motion.
    pub fn phase_force(
        section: &PipeSection,
        holdup: f64,
        density: f64,
        viscosity: f64,
        velocity: f64,
    ) -> f64 {
        if holdup < MIN_PHASE_HOLDUP || velocity == 0.0 || viscosity <= 0.0 {
            return 0.0;
        }
        let re = density * velocity.abs() * section.diameter / viscosity;
        let f = darcy_friction_factor(re, section.roughness / section.diameter);
        let tau = f * density * velocity * velocity.abs() / 8.0;
        -tau * holdup * PI * section.diameter
    }
}

impl SourceTerm for WallFriction {
    fn evaluate(&self, s: &PipeSection, _time: f64) -> ConservedState {
        ConservedState {
            gas_momentum: Self::phase_force(
                s,
                s.gas_holdup,
                s.gas.density,
                s.gas.viscosity,
                s.gas_velocity,
            ),
            liquid_momentum: Self::phase_force(
                s,
                s.liquid_holdup,
                s.liquid.density,
                s.liquid.viscosity,
                s.liquid_velocity,
            ),
            ..ConservedState::zero()
        }
    }

    fn name(&self) -> &'static str {
        "wall_friction"
    }
}

/// Gas-liquid interfacial shear.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterfacialFriction {
    pub friction_factor: f64,
}

impl InterfacialFriction {
    pub fn new(friction_factor: f64) -> Self {
        Self { friction_factor }
    }

    /// Interface width per unit length (m).
    pub fn interface_width(section: &PipeSection) -> f64 {
        let product = (section.liquid_holdup * section.gas_holdup).max(0.0);
        2.0 * section.diameter * product.sqrt()
    }
}

impl SourceTerm for InterfacialFriction {
    fn evaluate(&self, s: &PipeSection, _time: f64) -> ConservedState {
        if s.gas_holdup < MIN_PHASE_HOLDUP || s.liquid_holdup < MIN_PHASE_HOLDUP {
            return ConservedState::zero();
        }
        let slip = s.slip_velocity();
        let tau = self.friction_factor * s.gas.density * slip * slip.abs() / 8.0;
        let force = tau * Self::interface_width(s);
        ConservedState {
            gas_momentum: -force,
            liquid_momentum: force,
            ..ConservedState::zero()
        }
    }

    fn name(&self) -> &'static str {
        "interfacial_friction"
    }
}
