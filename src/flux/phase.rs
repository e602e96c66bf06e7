//! Per-phase interface states and fluxes.

use std::ops::{Add, Mul, Sub};

use crate::equations::Phase;
use crate::mesh::PipeSection;

/// Holdup below which a phase is considered absent at an interface.
pub const ZERO_HOLDUP: f64 = 1e-10;

/// Primitive state of one phase on one side of an interface.
///
/// Lives only for one flux evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhaseState {
    /// Density (kg/m³)
    pub density: f64,
    /// Velocity (m/s)
    pub velocity: f64,
    /// Pressure (Pa)
    pub pressure: f64,
    /// Speed of sound (m/s)
    pub sound_speed: f64,
    /// Specific enthalpy (J/kg)
    pub enthalpy: f64,
    /// Volume fraction
    pub holdup: f64,
}

impl PhaseState {
    pub fn new(
        density: f64,
        velocity: f64,
        pressure: f64,
        sound_speed: f64,
        enthalpy: f64,
        holdup: f64,
    ) -> Self {
        Self {
            density,
            velocity,
            pressure,
            sound_speed,
            enthalpy,
            holdup,
        }
    }

    /// Cell-average state of one phase of a section.
    pub fn from_section(section: &PipeSection, phase: Phase) -> Self {
        match phase {
            Phase::Gas => Self::new(
                section.gas.density,
                section.gas_velocity,
                section.pressure,
                section.gas.sound_speed,
                section.gas.enthalpy,
                section.gas_holdup,
            ),
            Phase::Liquid => Self::new(
                section.liquid.density,
                section.liquid_velocity,
                section.pressure,
                section.liquid.sound_speed,
                section.liquid.enthalpy,
                section.liquid_holdup,
            ),
        }
    }

    /// Copy with the velocity sign flipped.
    pub fn mirrored(&self) -> Self {
        Self {
            velocity: -self.velocity,
            ..*self
        }
    }

    /// Whether the phase is effectively absent.
    #[inline]
    pub fn is_absent(&self) -> bool {
        self.holdup < ZERO_HOLDUP
    }

    /// Mass per unit length `αρA`.
    #[inline]
    pub fn mass(&self, area: f64) -> f64 {
        self.holdup * self.density * area
    }

    /// Conserved vector `(αρA, αρvA, αρhA, α)` matching [`PhaseFlux`].
    pub fn conserved(&self, area: f64) -> PhaseFlux {
        let m = self.mass(area);
        PhaseFlux {
            mass: m,
            momentum: m * self.velocity,
            energy: m * self.enthalpy,
            holdup: self.holdup,
        }
    }

    /// Exact flux of this state through a face of the given area.
    pub fn physical_flux(&self, area: f64) -> PhaseFlux {
        let mass = self.mass(area) * self.velocity;
        PhaseFlux {
            mass,
            momentum: mass * self.velocity + self.holdup * self.pressure * area,
            energy: mass * self.enthalpy,
            holdup: self.holdup * self.velocity,
        }
    }
}

/// Flux of one phase through a face.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhaseFlux {
    /// Mass flow (kg/s)
    pub mass: f64,
    /// Momentum flux including the pressure force (N)
    pub momentum: f64,
    /// Enthalpy flow (W)
    pub energy: f64,
    /// Advective holdup flux (m/s)
    pub holdup: f64,
}

impl PhaseFlux {
    #[inline]
    pub const fn zero() -> Self {
        Self {
            mass: 0.0,
            momentum: 0.0,
            energy: 0.0,
            holdup: 0.0,
        }
    }

    /// Largest absolute component difference.
    pub fn max_abs_diff(&self, other: &PhaseFlux) -> f64 {
        (self.mass - other.mass)
            .abs()
            .max((self.momentum - other.momentum).abs())
            .max((self.energy - other.energy).abs())
            .max((self.holdup - other.holdup).abs())
    }
}

impl Add for PhaseFlux {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            mass: self.mass + rhs.mass,
            momentum: self.momentum + rhs.momentum,
            energy: self.energy + rhs.energy,
            holdup: self.holdup + rhs.holdup,
        }
    }
}

impl Sub for PhaseFlux {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            mass: self.mass - rhs.mass,
            momentum: self.momentum - rhs.momentum,
            energy: self.energy - rhs.energy,
            holdup: self.holdup - rhs.holdup,
        }
    }
}

impl Mul<f64> for PhaseFlux {
    type Output = Self;

    #[inline]
    fn mul(self, s: f64) -> Self {
        Self {
            mass: self.mass * s,
            momentum: self.momentum * s,
            energy: self.energy * s,
            holdup: self.holdup * s,
        }
    }
}

impl Mul<PhaseFlux> for f64 {
    type Output = PhaseFlux;

    #[inline]
    fn mul(self, f: PhaseFlux) -> PhaseFlux {
        f * self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_physical_flux() {
        let s = PhaseState::new(800.0, 2.0, 1e5, 1000.0, 500.0, 0.25);
        let f = s.physical_flux(0.1);
        let m = 0.25 * 800.0 * 0.1 * 2.0;
        assert!((f.mass - m).abs() < TOL);
        assert!((f.momentum - (m * 2.0 + 0.25 * 1e5 * 0.1)).abs() < 1e-9);
        assert!((f.energy - m * 500.0).abs() < 1e-9);
        assert!((f.holdup - 0.5).abs() < TOL);
    }

    #[test]
    fn test_flux_arithmetic() {
        let a = PhaseFlux {
            mass: 1.0,
            momentum: 2.0,
            energy: 3.0,
            holdup: 4.0,
        };
        let b = 2.0 * a - a;
        assert!(b.max_abs_diff(&a) < TOL);
        assert_eq!((a + a).holdup, 8.0);
    }

    #[test]
    fn test_from_section() {
        use crate::mesh::PipeSegment;

        let mut sec = PipeSection::new(0.0, 0.0, &PipeSegment::horizontal(1.0, 0.1, 0.0));
        sec.set_liquid_holdup(0.3);
        sec.pressure = 2e6;
        sec.liquid.density = 810.0;
        sec.liquid_velocity = 0.7;
        let s = PhaseState::from_section(&sec, Phase::Liquid);
        assert_eq!(s.density, 810.0);
        assert_eq!(s.velocity, 0.7);
        assert_eq!(s.holdup, 0.3);
        assert!((PhaseState::from_section(&sec, Phase::Gas).holdup - 0.7).abs() < TOL);
    }

    #[test]
    fn test_absent_phase() {
        let s = PhaseState::new(800.0, 2.0, 1e5, 1000.0, 0.0, 1e-12);
        assert!(s.is_absent());
        assert_eq!(s.mirrored().velocity, -2.0);
    }
}
