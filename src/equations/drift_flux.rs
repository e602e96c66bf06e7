//! Drift-flux holdup closure.
//!
//! Used to initialise a pipeline at a consistent steady holdup profile before
//! the transient two-fluid equations take over:
//!
//! v_G = C0 · v_m + v_gj,   α_G = v_sG / (C0 · v_m + v_gj)
//!
//! # References
//!
//! - Harmathy (1960): Velocity of large drops and bubbles in media of infinite
//!   or restricted extent.
//! - Bendiksen (1984): An experimental investigation of the motion of long
//!   bubbles in inclined tubes.

/// Drift-flux parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriftFluxClosure {
    /// Distribution coefficient C0
    pub distribution_coefficient: f64,
    /// Gas-liquid surface tension (N/m)
    pub surface_tension: f64,
    /// Gravitational acceleration (m/s²)
    pub g: f64,
}

impl Default for DriftFluxClosure {
    fn default() -> Self {
        Self {
            distribution_coefficient: 1.2,
            surface_tension: 0.02,
            g: 9.81,
        }
    }
}

impl DriftFluxClosure {
    pub fn new(distribution_coefficient: f64, surface_tension: f64, g: f64) -> Self {
        Self {
            distribution_coefficient,
            surface_tension,
            g,
        }
    }

    /// Inclination factor on the drift velocity.
    ///
    /// Uphill flow raises slip more strongly than downhill flow; floored at 0.1.
    pub fn inclination_factor(inclination: f64) -> f64 {
        let (sin_t, cos_t) = inclination.sin_cos();
        let f = if inclination >= 0.0 {
            cos_t + 1.2 * sin_t
        } else {
            cos_t + 0.3 * sin_t.abs()
        };
        f.max(0.1)
    }

    /// Drift velocity v_gj (m/s).
    pub fn drift_velocity(
        &self,
        rho_g: f64,
        rho_l: f64,
        diameter: f64,
        inclination: f64,
        v_mix: f64,
    ) -> f64 {
        let d_rho = (rho_l - rho_g).max(0.0);
        let rho_l = rho_l.max(1e-6);
        let f_theta = Self::inclination_factor(inclination);

        let eotvos = self.g * d_rho * diameter * diameter / self.surface_tension.max(1e-9);
        let v_gj = if eotvos > 40.0 {
            0.35 * (self.g * diameter * d_rho / rho_l).sqrt() * f_theta
        } else {
            1.53 * (self.g * self.surface_tension * d_rho / (rho_l * rho_l)).powf(0.25) * f_theta
        };

        let froude = v_mix.abs() / (self.g * diameter).sqrt();
        v_gj / (1.0 + 0.1 * froude)
    }

    /// Steady holdups `(liquid, gas)` for given superficial velocities.
    ///
    /// Gas holdup is bounded to [0.001, 0.999].
    pub fn holdups(
        &self,
        vsg: f64,
        vsl: f64,
        rho_g: f64,
        rho_l: f64,
        diameter: f64,
        inclination: f64,
    ) -> (f64, f64) {
        let v_mix = vsg + vsl;
        let v_gj = self.drift_velocity(rho_g, rho_l, diameter, inclination, v_mix);
        let denom = self.distribution_coefficient * v_mix + v_gj;
        let alpha_g = if denom.abs() < 1e-12 {
            0.5
        } else {
            vsg / denom
        };
        let alpha_g = alpha_g.clamp(0.001, 0.999);
        (1.0 - alpha_g, alpha_g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclination_factor() {
        assert!((DriftFluxClosure::inclination_factor(0.0) - 1.0).abs() < 1e-12);
        assert!(DriftFluxClosure::inclination_factor(0.3) > 1.0);
        assert!(DriftFluxClosure::inclination_factor(-1.0) < 1.0);
        assert!(DriftFluxClosure::inclination_factor(-1.5) >= 0.1);
    }

    #[test]
    fn test_holdups_sum_to_one() {
        let c = DriftFluxClosure::default();
        let (al, ag) = c.holdups(3.0, 0.5, 40.0, 800.0, 0.3, 0.0);
        assert!((al + ag - 1.0).abs() < 1e-12);
        assert!(ag < 3.0 / 3.5); // slip leaves more liquid than the no-slip fraction
    }

    #[test]
    fn test_uphill_holds_most_liquid() {
        let c = DriftFluxClosure::default();
        let (flat, _) = c.holdups(2.0, 0.5, 40.0, 800.0, 0.3, 0.0);
        let (down, _) = c.holdups(2.0, 0.5, 40.0, 800.0, 0.3, -0.2);
        let (up, _) = c.holdups(2.0, 0.5, 40.0, 800.0, 0.3, 0.2);
        assert!(up > flat);
        assert!(down < up);
    }
}
