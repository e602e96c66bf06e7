//! Heat loss to the surrounding soil.
//!
//! Transient line-source solution around a buried pipe:
//!
//! q = 4π k_s (T - T_soil) / E1(r² / (4 a_s t))   (W/m)
//!
//! where `r` is the pipe radius, `k_s` the soil conductivity and `a_s` its
//! thermal diffusivity. The loss enters the energy equation only.

use std::f64::consts::PI;

use crate::error::ConfigError;
use crate::mesh::PipeSection;
use crate::solver::ConservedState;
use crate::source::SourceTerm;

/// Euler-Mascheroni constant.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Exponential integral `E1(x) = ∫_x^∞ e^{-t}/t dt` for `x > 0`.
///
/// Power series for `x ≤ 1`, continued fraction (modified Lentz) above.
/// Returns infinity for `x ≤ 0`.
pub fn exponential_integral_e1(x: f64) -> f64 {
    const EPS: f64 = 1e-15;
    const MAX_TERMS: usize = 200;

    if x <= 0.0 {
        return f64::INFINITY;
    }

    if x <= 1.0 {
        // E1(x) = -γ - ln x - Σ (-x)^n / (n n!)
        let mut sum = 0.0;
        let mut term = 1.0;
        for n in 1..=MAX_TERMS {
            term *= -x / n as f64;
            let contrib = term / n as f64;
            sum += contrib;
            if contrib.abs() < EPS * sum.abs().max(EPS) {
                break;
            }
        }
        return -EULER_GAMMA - x.ln() - sum;
    }

    let tiny = f64::MIN_POSITIVE / EPS;
    let mut b = x + 1.0;
    let mut c = 1.0 / tiny;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=MAX_TERMS {
        let an = -((i * i) as f64);
        b += 2.0;
        d = 1.0 / (an * d + b);
        c = b + an / c;
        let del = c * d;
        h *= del;
        if (del - 1.0).abs() < EPS {
            break;
        }
    }
    h * (-x).exp()
}

/// Soil heat-loss source.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoilHeatTransfer {
    /// Soil thermal conductivity (W/(m·K))
    pub conductivity: f64,
    /// Soil thermal diffusivity (m²/s)
    pub diffusivity: f64,
    /// Undisturbed soil temperature (K)
    pub soil_temperature: f64,
    /// Elapsed time floor for the line source (s)
    pub min_time: f64,
}

impl Default for SoilHeatTransfer {
    fn default() -> Self {
        Self {
            conductivity: 1.5,
            diffusivity: 7.0e-7,
            soil_temperature: 277.15,
            min_time: 3600.0,
        }
    }
}

impl SoilHeatTransfer {
    pub fn with_soil_temperature(mut self, temperature: f64) -> Self {
        self.soil_temperature = temperature;
        self
    }

    pub fn with_conductivity(mut self, conductivity: f64) -> Self {
        self.conductivity = conductivity;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("soil_conductivity", self.conductivity),
            ("soil_diffusivity", self.diffusivity),
            ("soil_temperature", self.soil_temperature),
            ("min_time", self.min_time),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidParameter {
                    name,
                    value,
                    reason: "must be positive",
                });
            }
        }
        Ok(())
    }

    /// Heat loss per unit length (W/m), positive when the fluid is warmer.
    pub fn heat_loss(&self, temperature: f64, diameter: f64, time: f64) -> f64 {
        let t = time.max(self.min_time);
        let radius = 0.5 * diameter;
        let x = radius * radius / (4.0 * self.diffusivity * t);
        4.0 * PI * self.conductivity * (temperature - self.soil_temperature)
            / exponential_integral_e1(x)
    }
}

impl SourceTerm for SoilHeatTransfer {
    fn evaluate(&self, section: &PipeSection, time: f64) -> ConservedState {
        ConservedState {
            energy: -self.heat_loss(section.temperature, section.diameter, time),
            ..ConservedState::zero()
        }
    }

    fn name(&self) -> &'static str {
        "soil_heat_transfer"
    }
}
