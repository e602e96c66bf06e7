//! Gravity body force along the pipe axis.
//!
//! S_momentum_k = -α_k ρ_k g sinθ A
//! S_energy     = -(ṁ_g + ṁ_l) g sinθ   (work against gravity, per unit length)

use crate::mesh::PipeSection;
use crate::solver::ConservedState;
use crate::source::SourceTerm;

/// Standard gravity (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Gravity source term.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GravitySource {
    pub g: f64,
}

impl Default for GravitySource {
    fn default() -> Self {
        Self {
            g: STANDARD_GRAVITY,
        }
    }
}

impl GravitySource {
    pub fn new(g: f64) -> Self {
        Self { g }
    }
}

impl SourceTerm for GravitySource {
    fn evaluate(&self, section: &PipeSection, _time: f64) -> ConservedState {
        let g_axial = self.g * section.inclination.sin();
        let mg = section.gas_mass_per_length();
        let ml = section.liquid_mass_per_length();
        ConservedState {
            gas_momentum: -mg * g_axial,
            liquid_momentum: -ml * g_axial,
            energy: -(mg * section.gas_velocity + ml * section.liquid_velocity) * g_axial,
            ..ConservedState::zero()
        }
    }

    fn name(&self) -> &'static str {
        "gravity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::PipeSegment;

    const TOL: f64 = 1e-10;

    fn section(dz: f64) -> PipeSection {
        let mut s = PipeSection::new(0.0, 0.0, &PipeSegment::new(10.0, 0.2, dz, 0.0));
        s.set_liquid_holdup(0.4);
        s.gas.density = 50.0;
        s.liquid.density = 800.0;
        s
    }

    #[test]
    fn test_horizontal_has_no_gravity() {
        let src = GravitySource::default().evaluate(&section(0.0), 0.0);
        assert_eq!(src, ConservedState::zero());
    }

    #[test]
    fn test_uphill_decelerates_both_phases() {
        let s = section(5.0);
        let src = GravitySource::default().evaluate(&s, 0.0);
        let expected_l = -0.4 * 800.0 * s.area * 9.81 * 0.5;
        assert!((src.liquid_momentum - expected_l).abs() < TOL);
        assert!(src.gas_momentum < 0.0);
        assert!(src.gas_mass == 0.0 && src.liquid_mass == 0.0);
    }

    #[test]
    fn test_downhill_accelerates() {
        let src = GravitySource::new(9.81).evaluate(&section(-5.0), 0.0);
        assert!(src.liquid_momentum > 0.0);
    }
}
