//! Thermodynamic state provider interface.
//!
//! The solver never evaluates an equation of state directly. It asks a
//! [`ThermoProvider`] for the phase properties at a pressure and
//! temperature, so a full flash package can be plugged in behind the same
//! narrow contract used by the deterministic [`PolytropicFluids`] stub.
//!
//! # Units
//!
//! - Pressure: Pa
//! - Temperature: K
//! - Density: kg/m³
//! - Enthalpy: J/kg, entropy: J/(kg·K)

use std::fmt;

use crate::error::ThermoError;

/// Reference temperature for enthalpy and entropy (K).
pub const T_REF: f64 = 288.15;

/// Reference pressure for enthalpy and entropy (Pa).
pub const P_REF: f64 = 101_325.0;

/// Fluid phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    Gas,
    Liquid,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Gas => write!(f, "gas"),
            Phase::Liquid => write!(f, "liquid"),
        }
    }
}

/// Overall mole fractions handed through to the provider.
///
/// The solver treats composition as opaque; an empty composition means the
/// provider's own default fluid.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Composition {
    pub mole_fractions: Vec<f64>,
}

impl Composition {
    pub fn new(mole_fractions: Vec<f64>) -> Self {
        Self { mole_fractions }
    }

    /// Whether the fractions are non-negative and sum to one.
    pub fn is_normalized(&self) -> bool {
        if self.mole_fractions.is_empty() {
            return true;
        }
        let sum: f64 = self.mole_fractions.iter().sum();
        self.mole_fractions.iter().all(|&z| z >= 0.0) && (sum - 1.0).abs() < 1e-6
    }
}

/// Phase properties returned by a flash.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FluidState {
    /// Density (kg/m³)
    pub density: f64,
    /// Dynamic viscosity (Pa·s)
    pub viscosity: f64,
    /// Speed of sound (m/s)
    pub sound_speed: f64,
    /// Specific enthalpy (J/kg)
    pub enthalpy: f64,
    /// Specific entropy (J/(kg·K))
    pub entropy: f64,
}

impl FluidState {
    /// Reject non-finite or non-positive properties.
    pub fn validated(self, phase: Phase) -> Result<Self, ThermoError> {
        let checks = [
            ("density", self.density),
            ("viscosity", self.viscosity),
            ("sound_speed", self.sound_speed),
        ];
        for (property, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(ThermoError::InvalidState {
                    phase,
                    property,
                    value,
                });
            }
        }
        if !self.enthalpy.is_finite() {
            return Err(ThermoError::InvalidState {
                phase,
                property: "enthalpy",
                value: self.enthalpy,
            });
        }
        Ok(self)
    }
}

/// Narrow contract to an equation-of-state package.
///
/// Calls are synchronous. A provider that cannot converge must return an
/// error rather than a substitute value.
pub trait ThermoProvider: Send + Sync {
    /// Properties of `phase` at the given pressure and temperature.
    fn flash_state(
        &self,
        phase: Phase,
        pressure: f64,
        temperature: f64,
        composition: &Composition,
    ) -> Result<FluidState, ThermoError>;

    /// Polytropic exponent used to extrapolate densities to cell faces.
    fn polytropic_exponent(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Gas => 1.0,
            Phase::Liquid => f64::INFINITY,
        }
    }

    /// Name for logging.
    fn name(&self) -> &'static str;
}

/// Ideal gas with a constant heat-capacity ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdealGas {
    /// Specific gas constant (J/(kg·K))
    pub gas_constant: f64,
    /// Heat-capacity ratio, also the polytropic exponent at faces
    pub gamma: f64,
    /// Dynamic viscosity (Pa·s)
    pub viscosity: f64,
}

impl Default for IdealGas {
    /// Light natural gas (M ≈ 19 g/mol).
    fn default() -> Self {
        Self {
            gas_constant: 437.6,
            gamma: 1.3,
            viscosity: 1.2e-5,
        }
    }
}

impl IdealGas {
    pub fn cp(&self) -> f64 {
        self.gamma * self.gas_constant / (self.gamma - 1.0)
    }

    pub fn density(&self, pressure: f64, temperature: f64) -> f64 {
        pressure / (self.gas_constant * temperature)
    }

    fn state(&self, pressure: f64, temperature: f64) -> FluidState {
        let cp = self.cp();
        FluidState {
            density: self.density(pressure, temperature),
            viscosity: self.viscosity,
            sound_speed: (self.gamma * self.gas_constant * temperature).sqrt(),
            enthalpy: cp * (temperature - T_REF),
            entropy: cp * (temperature / T_REF).ln() - self.gas_constant * (pressure / P_REF).ln(),
        }
    }
}

/// Weakly compressible liquid: `rho = rho_ref * (1 + (p - p_ref) / K)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompressibleLiquid {
    /// Density at the reference pressure (kg/m³)
    pub rho_ref: f64,
    /// Reference pressure (Pa)
    pub p_ref: f64,
    /// Bulk modulus (Pa)
    pub bulk_modulus: f64,
    /// Specific heat (J/(kg·K))
    pub cp: f64,
    /// Dynamic viscosity (Pa·s)
    pub viscosity: f64,
}

impl Default for CompressibleLiquid {
    /// Light crude / condensate.
    fn default() -> Self {
        Self {
            rho_ref: 800.0,
            p_ref: P_REF,
            bulk_modulus: 1.0e9,
            cp: 2100.0,
            viscosity: 1.0e-3,
        }
    }
}

impl CompressibleLiquid {
    pub fn density(&self, pressure: f64) -> f64 {
        self.rho_ref * (1.0 + (pressure - self.p_ref) / self.bulk_modulus)
    }

    fn state(&self, pressure: f64, temperature: f64) -> FluidState {
        let density = self.density(pressure);
        FluidState {
            density,
            viscosity: self.viscosity,
            sound_speed: (self.bulk_modulus / self.rho_ref).sqrt(),
            enthalpy: self.cp * (temperature - T_REF) + (pressure - self.p_ref) / density,
            entropy: self.cp * (temperature / T_REF).ln(),
        }
    }
}

/// Deterministic gas/liquid provider for tests and closed-form studies.
///
/// # Example
/// ```
/// use pipeflow::equations::{Composition, Phase, PolytropicFluids, ThermoProvider};
///
/// let fluids = PolytropicFluids::default();
/// let gas = fluids
///     .flash_state(Phase::Gas, 50e5, 300.0, &Composition::default())
///     .unwrap();
/// assert!((gas.density - 50e5 / (437.6 * 300.0)).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolytropicFluids {
    pub gas: IdealGas,
    pub liquid: CompressibleLiquid,
}

impl PolytropicFluids {
    pub fn new(gas: IdealGas, liquid: CompressibleLiquid) -> Self {
        Self { gas, liquid }
    }
}

impl ThermoProvider for PolytropicFluids {
    fn flash_state(
        &self,
        phase: Phase,
        pressure: f64,
        temperature: f64,
        composition: &Composition,
    ) -> Result<FluidState, ThermoError> {
        let fail = |reason| ThermoError::FlashFailed {
            phase,
            pressure,
            temperature,
            reason,
        };
        if !pressure.is_finite() || pressure <= 0.0 {
            return Err(fail("non-positive pressure"));
        }
        if !temperature.is_finite() || temperature <= 0.0 {
            return Err(fail("non-positive temperature"));
        }
        if !composition.is_normalized() {
            return Err(fail("composition does not sum to one"));
        }
        let state = match phase {
            Phase::Gas => self.gas.state(pressure, temperature),
            Phase::Liquid => {
                if self.liquid.density(pressure) <= 0.0 {
                    return Err(fail("liquid expanded past zero density"));
                }
                self.liquid.state(pressure, temperature)
            }
        };
        state.validated(phase)
    }

    fn polytropic_exponent(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Gas => self.gas.gamma,
            Phase::Liquid => f64::INFINITY,
        }
    }

    fn name(&self) -> &'static str {
        "polytropic"
    }
}

/// Density at a face pressure, extrapolated from the cell state.
///
/// Gas follows `p / rho^n = const`; an infinite exponent selects the
/// acoustic linearisation `rho + (p_face - p) / c²` used for liquids.
pub fn face_density(state: &FluidState, pressure: f64, face_pressure: f64, exponent: f64) -> f64 {
    if exponent.is_finite() && pressure > 0.0 && face_pressure > 0.0 {
        state.density * (face_pressure / pressure).powf(1.0 / exponent)
    } else {
        let c2 = (state.sound_speed * state.sound_speed).max(1.0);
        (state.density + (face_pressure - pressure) / c2).max(1e-6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    fn fluids() -> PolytropicFluids {
        PolytropicFluids::default()
    }

    #[test]
    fn test_ideal_gas_density_and_sound_speed() {
        let s = fluids()
            .flash_state(Phase::Gas, 1e6, 300.0, &Composition::default())
            .unwrap();
        assert!((s.density - 1e6 / (437.6 * 300.0)).abs() < TOL);
        assert!((s.sound_speed - (1.3_f64 * 437.6 * 300.0).sqrt()).abs() < TOL);
    }

    #[test]
    fn test_liquid_density_increases_with_pressure() {
        let f = fluids();
        let c = Composition::default();
        let lo = f.flash_state(Phase::Liquid, 1e5, 300.0, &c).unwrap();
        let hi = f.flash_state(Phase::Liquid, 1e7, 300.0, &c).unwrap();
        assert!(hi.density > lo.density);
        assert!((hi.sound_speed - (1.0e9_f64 / 800.0).sqrt()).abs() < TOL);
    }

    #[test]
    fn test_flash_rejects_bad_conditions() {
        let f = fluids();
        let c = Composition::default();
        assert!(matches!(
            f.flash_state(Phase::Gas, -1.0, 300.0, &c),
            Err(ThermoError::FlashFailed { .. })
        ));
        assert!(f.flash_state(Phase::Liquid, 1e5, 0.0, &c).is_err());
        let bad = Composition::new(vec![0.5, 0.6]);
        assert!(f.flash_state(Phase::Gas, 1e5, 300.0, &bad).is_err());
    }

    #[test]
    fn test_enthalpy_zero_at_reference() {
        let s = fluids()
            .flash_state(Phase::Gas, P_REF, T_REF, &Composition::default())
            .unwrap();
        assert!(s.enthalpy.abs() < TOL);
        assert!(s.entropy.abs() < TOL);
    }

    #[test]
    fn test_face_density_polytropic() {
        let gas = IdealGas::default().state(1e6, 300.0);
        let rho = face_density(&gas, 1e6, 2e6, 1.3);
        assert!((rho - gas.density * 2.0_f64.powf(1.0 / 1.3)).abs() < 1e-9);
        // same pressure gives the cell density back
        assert!((face_density(&gas, 1e6, 1e6, 1.3) - gas.density).abs() < TOL);
    }

    #[test]
    fn test_face_density_liquid_linearised() {
        let liq = CompressibleLiquid::default().state(1e6, 300.0);
        let rho = face_density(&liq, 1e6, 1e6 + 1.25e6, f64::INFINITY);
        let c2 = liq.sound_speed * liq.sound_speed;
        assert!((rho - (liq.density + 1.25e6 / c2)).abs() < 1e-9);
    }
}
