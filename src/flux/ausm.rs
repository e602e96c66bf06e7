//! AUSM+ flux splitting for one phase of the two-fluid model.
//!
//! The convective and pressure parts of the flux are split separately with
//! Mach-number polynomials:
//!
//! ```text
//! M_half = M⁺(M_L) + M⁻(M_R)
//! P_half = P⁺(M_L)·P_L·α_L + P⁻(M_R)·P_R·α_R
//! F = c_half·M_half·(α ρ (1, v, h))_upwind·A + (0, P_half·A, 0)
//! ```
//!
//! The pressure term is weighted by holdup so that each phase carries its
//! share of the interface pressure force.
//!
//! # References
//!
//! - Liou (1996): A sequel to AUSM: AUSM+. J. Comput. Phys. 129, 364-382.

use super::phase::{PhaseFlux, PhaseState};

/// AUSM+ coefficients.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AusmConfig {
    /// Pressure-splitting coefficient α
    pub alpha: f64,
    /// Mach-splitting coefficient β
    pub beta: f64,
    /// Floor applied to each side's sound speed (m/s)
    pub min_sound_speed: f64,
    /// Holdup below which both sides count as empty
    pub min_holdup: f64,
}

impl Default for AusmConfig {
    fn default() -> Self {
        Self {
            alpha: 3.0 / 16.0,
            beta: 1.0 / 8.0,
            min_sound_speed: 1.0,
            min_holdup: super::phase::ZERO_HOLDUP,
        }
    }
}

impl AusmConfig {
    pub fn with_min_sound_speed(mut self, c_min: f64) -> Self {
        self.min_sound_speed = c_min;
        self
    }

    pub fn with_coefficients(mut self, alpha: f64, beta: f64) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self
    }

    /// Interface sound speed: mean of the floored side values.
    #[inline]
    pub fn interface_sound_speed(&self, left: &PhaseState, right: &PhaseState) -> f64 {
        0.5 * (left.sound_speed.max(self.min_sound_speed)
            + right.sound_speed.max(self.min_sound_speed))
    }

    /// Split Mach number M⁺.
    #[inline]
    pub fn mach_plus(&self, m: f64) -> f64 {
        if m > 1.0 {
            m
        } else if m < -1.0 {
            0.0
        } else {
            let q = m * m - 1.0;
            0.25 * (m + 1.0) * (m + 1.0) + self.beta * q * q
        }
    }

    /// Split Mach number M⁻.
    #[inline]
    pub fn mach_minus(&self, m: f64) -> f64 {
        if m > 1.0 {
            0.0
        } else if m < -1.0 {
            m
        } else {
            let q = m * m - 1.0;
            -0.25 * (m - 1.0) * (m - 1.0) - self.beta * q * q
        }
    }

    /// Split pressure weight P⁺.
    #[inline]
    pub fn pressure_plus(&self, m: f64) -> f64 {
        if m > 1.0 {
            1.0
        } else if m < -1.0 {
            0.0
        } else {
            let q = m * m - 1.0;
            0.25 * (m + 1.0) * (m + 1.0) * (2.0 - m) + self.alpha * m * q * q
        }
    }

    /// Split pressure weight P⁻.
    #[inline]
    pub fn pressure_minus(&self, m: f64) -> f64 {
        if m > 1.0 {
            0.0
        } else if m < -1.0 {
            1.0
        } else {
            let q = m * m - 1.0;
            0.25 * (m - 1.0) * (m - 1.0) * (2.0 + m) - self.alpha * m * q * q
        }
    }
}

/// AUSM+ flux of one phase through a face of area `area`.
///
/// # Example
/// ```
/// use pipeflow::flux::{AusmConfig, PhaseState, ausm_plus_flux};
///
/// let s = PhaseState::new(50.0, 3.0, 5e6, 350.0, 0.0, 0.8);
/// let f = ausm_plus_flux(&s, &s, 0.05, &AusmConfig::default());
/// assert!((f.mass - 0.8 * 50.0 * 3.0 * 0.05).abs() < 1e-10);
/// ```
pub fn ausm_plus_flux(
    left: &PhaseState,
    right: &PhaseState,
    area: f64,
    cfg: &AusmConfig,
) -> PhaseFlux {
    if left.holdup < cfg.min_holdup && right.holdup < cfg.min_holdup {
        return PhaseFlux::zero();
    }

    let c_half = cfg.interface_sound_speed(left, right);
    let m_l = left.velocity / c_half;
    let m_r = right.velocity / c_half;

    let m_half = cfg.mach_plus(m_l) + cfg.mach_minus(m_r);
    let p_half = cfg.pressure_plus(m_l) * left.pressure * left.holdup
        + cfg.pressure_minus(m_r) * right.pressure * right.holdup;

    let up = if m_half >= 0.0 { left } else { right };
    let mass = c_half * m_half * up.holdup * up.density * area;

    PhaseFlux {
        mass,
        momentum: mass * up.velocity + p_half * area,
        energy: mass * up.enthalpy,
        holdup: up.holdup * up.velocity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;
    const AREA: f64 = 0.0314;

    fn liquid(v: f64, p: f64, holdup: f64) -> PhaseState {
        PhaseState::new(800.0, v, p, 1100.0, 2.0e4, holdup)
    }

    #[test]
    fn test_split_functions_consistent() {
        let cfg = AusmConfig::default();
        for &m in &[-2.0, -1.0, -0.7, -0.1, 0.0, 0.3, 0.99, 1.0, 1.5] {
            assert!(
                (cfg.mach_plus(m) + cfg.mach_minus(m) - m).abs() < TOL,
                "M± must sum to M at {}",
                m
            );
            assert!(
                (cfg.pressure_plus(m) + cfg.pressure_minus(m) - 1.0).abs() < TOL,
                "P± must sum to 1 at {}",
                m
            );
        }
    }

    #[test]
    fn test_split_functions_continuous_at_sonic() {
        let cfg = AusmConfig::default();
        let eps = 1e-9;
        for f in [
            AusmConfig::mach_plus as fn(&AusmConfig, f64) -> f64,
            AusmConfig::mach_minus,
            AusmConfig::pressure_plus,
            AusmConfig::pressure_minus,
        ] {
            assert!((f(&cfg, 1.0 - eps) - f(&cfg, 1.0 + eps)).abs() < 1e-6);
            assert!((f(&cfg, -1.0 - eps) - f(&cfg, -1.0 + eps)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_uniform_state_gives_analytic_flux() {
        let cfg = AusmConfig::default();
        let s = liquid(2.5, 4e6, 0.3);
        let f = ausm_plus_flux(&s, &s, AREA, &cfg);
        let exact = s.physical_flux(AREA);
        assert!((f.mass - 0.3 * 800.0 * 2.5 * AREA).abs() < TOL);
        assert!(f.max_abs_diff(&exact) < 1e-6);
    }

    #[test]
    fn test_stagnant_fluid_is_pure_pressure() {
        let cfg = AusmConfig::default();
        let l = liquid(0.0, 5e6, 0.4);
        let r = liquid(0.0, 4e6, 0.2);
        let f = ausm_plus_flux(&l, &r, AREA, &cfg);
        assert!(f.mass.abs() < TOL);
        assert!(f.energy.abs() < TOL);
        let expected = 0.5 * (5e6 * 0.4 + 4e6 * 0.2) * AREA;
        assert!((f.momentum - expected).abs() < 1e-6);
    }

    #[test]
    fn test_mirror_symmetry() {
        let cfg = AusmConfig::default();
        let l = liquid(3.0, 5e6, 0.4);
        let r = liquid(1.0, 4.8e6, 0.3);
        let f = ausm_plus_flux(&l, &r, AREA, &cfg);
        let g = ausm_plus_flux(&r.mirrored(), &l.mirrored(), AREA, &cfg);

        // Scalars flow the other way, momentum (a vector) flux is unchanged.
        assert!((f.mass + g.mass).abs() < 1e-9);
        assert!((f.energy + g.energy).abs() < 1e-6);
        assert!((f.holdup + g.holdup).abs() < TOL);
        assert!((f.momentum - g.momentum).abs() < 1e-6);
    }

    #[test]
    fn test_empty_interface_gives_zero() {
        let cfg = AusmConfig::default();
        let l = liquid(3.0, 5e6, 1e-12);
        let r = liquid(-1.0, 5e6, 0.0);
        assert_eq!(ausm_plus_flux(&l, &r, AREA, &cfg), PhaseFlux::zero());
    }

    #[test]
    fn test_upwinding_by_mach_sign() {
        let cfg = AusmConfig::default();
        let l = PhaseState::new(50.0, 10.0, 5e6, 350.0, 1.0, 0.9);
        let r = PhaseState::new(60.0, 10.0, 5e6, 350.0, 2.0, 0.7);
        let f = ausm_plus_flux(&l, &r, AREA, &cfg);
        assert!(f.mass > 0.0);
        assert!((f.holdup - 0.9 * 10.0).abs() < TOL);
        assert!((f.energy - f.mass * 1.0).abs() < TOL);

        let f = ausm_plus_flux(&l.mirrored(), &r.mirrored(), AREA, &cfg);
        assert!(f.mass < 0.0);
        assert!((f.holdup - 0.7 * -10.0).abs() < TOL);
    }

    #[test]
    fn test_supersonic_is_full_upwind() {
        let cfg = AusmConfig::default();
        let l = PhaseState::new(10.0, 500.0, 1e6, 300.0, 0.0, 1.0);
        let r = PhaseState::new(12.0, 480.0, 2e6, 300.0, 0.0, 1.0);
        let f = ausm_plus_flux(&l, &r, AREA, &cfg);
        let exact = l.physical_flux(AREA);
        assert!(f.max_abs_diff(&exact) < 1e-6);
    }

    #[test]
    fn test_sound_speed_floor() {
        let cfg = AusmConfig::default();
        let l = PhaseState::new(1.0, 0.5, 1e5, 0.0, 0.0, 0.5);
        let r = PhaseState::new(1.0, 0.5, 1e5, 0.0, 0.0, 0.5);
        let f = ausm_plus_flux(&l, &r, 1.0, &cfg);
        assert!(f.mass.is_finite());
        assert!((cfg.interface_sound_speed(&l, &r) - 1.0).abs() < TOL);
    }
}
