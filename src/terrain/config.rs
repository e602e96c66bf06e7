//! Tracker parameters.

use crate::error::ConfigError;
use crate::source::STANDARD_GRAVITY;

/// Accumulation and release parameters.
///
/// Fractions refer to the zone capacity unless noted.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackerConfig {
    pub g: f64,
    /// Fill fraction above which a zone overflows
    pub overflow_fraction: f64,
    /// Fill fraction above which an overflowing zone releases unconditionally
    pub critical_fraction: f64,
    /// Fraction of the volume left behind as film after a release
    pub residual_fraction: f64,
    /// Tracked volume never falls below this fraction of the section liquid
    pub reconcile_fraction: f64,
    /// Minimum time between releases of one zone (s)
    pub min_dwell_time: f64,
    /// Liquid holdup of a released slug body
    pub slug_body_holdup: f64,
    /// Shortest released slug (m)
    pub min_slug_length: f64,
    /// Cap on a section's liquid holdup during redistribution
    pub max_section_holdup: f64,
    /// Empirical gravity settling rate constant
    pub settling_constant: f64,
    /// Share of the settling rate retained on uphill sections with slip
    pub uphill_settling_factor: f64,
    /// Slip velocity above which uphill sections hold liquid back (m/s)
    pub slip_threshold: f64,
    /// Downstream mixture velocity that carries a slug out (m/s)
    pub velocity_release_threshold: f64,
    /// Downstream elevation drop that lets a slug run out (m)
    pub downhill_release_drop: f64,
    /// Share of the downstream hydrostatic head the pressure drop must beat
    pub hydrostatic_release_factor: f64,
    /// Slug velocity over downstream mixture velocity
    pub slug_velocity_factor: f64,
    /// Slowest released slug (m/s)
    pub min_slug_velocity: f64,
    /// Riser base: upstream inclination below this (rad)
    pub riser_base_low_angle: f64,
    /// Riser base: downstream inclination above this (rad)
    pub riser_base_high_angle: f64,
    /// Holdup at which slugging initiates
    critical_holdup: f64,
    /// Orifice coefficient of zone drainage
    drainage_coefficient: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            g: STANDARD_GRAVITY,
            overflow_fraction: 0.7,
            critical_fraction: 0.85,
            residual_fraction: 0.2,
            reconcile_fraction: 0.8,
            min_dwell_time: 30.0,
            slug_body_holdup: 0.98,
            min_slug_length: 5.0,
            max_section_holdup: 0.95,
            settling_constant: 0.01,
            uphill_settling_factor: 0.3,
            slip_threshold: 0.1,
            velocity_release_threshold: 0.3,
            downhill_release_drop: 0.5,
            hydrostatic_release_factor: 0.3,
            slug_velocity_factor: 1.2,
            min_slug_velocity: 0.5,
            riser_base_low_angle: 5f64.to_radians(),
            riser_base_high_angle: 30f64.to_radians(),
            critical_holdup: 0.25,
            drainage_coefficient: 0.6,
        }
    }
}

impl TrackerConfig {
    pub fn with_overflow_fraction(mut self, fraction: f64) -> Self {
        self.overflow_fraction = fraction;
        self
    }

    pub fn with_min_dwell_time(mut self, seconds: f64) -> Self {
        self.min_dwell_time = seconds;
        self
    }

    pub fn with_residual_fraction(mut self, fraction: f64) -> Self {
        self.residual_fraction = fraction;
        self
    }

    /// Set the slug initiation holdup, clamped to `[0.1, 0.9]`.
    pub fn with_critical_holdup(mut self, holdup: f64) -> Self {
        self.set_critical_holdup(holdup);
        self
    }

    /// Set the drainage coefficient, clamped to `[0.1, 1.0]`.
    pub fn with_drainage_coefficient(mut self, coefficient: f64) -> Self {
        self.set_drainage_coefficient(coefficient);
        self
    }

    pub fn set_critical_holdup(&mut self, holdup: f64) {
        self.critical_holdup = holdup.clamp(0.1, 0.9);
    }

    pub fn set_drainage_coefficient(&mut self, coefficient: f64) {
        self.drainage_coefficient = coefficient.clamp(0.1, 1.0);
    }

    pub fn critical_holdup(&self) -> f64 {
        self.critical_holdup
    }

    pub fn drainage_coefficient(&self) -> f64 {
        self.drainage_coefficient
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |name, value, reason| ConfigError::InvalidParameter {
            name,
            value,
            reason,
        };
        let fractions = [
            ("overflow_fraction", self.overflow_fraction),
            ("critical_fraction", self.critical_fraction),
            ("residual_fraction", self.residual_fraction),
            ("reconcile_fraction", self.reconcile_fraction),
            ("slug_body_holdup", self.slug_body_holdup),
            ("max_section_holdup", self.max_section_holdup),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(name, value, "must lie in [0, 1]"));
            }
        }
        if self.overflow_fraction > self.critical_fraction {
            return Err(invalid(
                "overflow_fraction",
                self.overflow_fraction,
                "must not exceed critical_fraction",
            ));
        }
        if self.slug_body_holdup <= 0.0 {
            return Err(invalid("slug_body_holdup", self.slug_body_holdup, "must be positive"));
        }
        let non_negative = [
            ("g", self.g),
            ("min_dwell_time", self.min_dwell_time),
            ("min_slug_length", self.min_slug_length),
            ("settling_constant", self.settling_constant),
            ("min_slug_velocity", self.min_slug_velocity),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(name, value, "must be non-negative"));
            }
        }
        if self.riser_base_low_angle >= self.riser_base_high_angle {
            return Err(invalid(
                "riser_base_low_angle",
                self.riser_base_low_angle,
                "must be below riser_base_high_angle",
            ));
        }
        Ok(())
    }
}
