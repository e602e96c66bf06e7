//! Divergence monitoring for transient pipe simulations.
//!
//! Scans the section array after every step for the signatures of a
//! numerical blow-up: non-finite values, holdups leaving `[0, 1]` and
//! phase velocities beyond any physical pipe flow. Those findings are
//! critical and turn into [`SolverError::Diverged`]; the rest are warnings.
//!
//! # Example
//!
//! ```
//! use pipeflow::analysis::{StabilityMonitor, StabilityThresholds};
//! use pipeflow::mesh::Pipeline;
//!
//! let pipeline = Pipeline::horizontal(10, 100.0, 0.2, 0.0).unwrap();
//! let mut monitor = StabilityMonitor::new(StabilityThresholds::default());
//!
//! let status = monitor.ensure_stable(0, &pipeline.sections, 0.1).unwrap();
//! assert!(status.is_stable);
//! ```

use std::fmt;

use tracing::warn;

use crate::error::SolverError;
use crate::mesh::{MIN_PHASE_HOLDUP, PipeSection};
use crate::types::CellIndex;

/// Thresholds for stability monitoring.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StabilityThresholds {
    /// Maximum phase velocity magnitude (m/s).
    pub max_velocity: f64,
    /// Amount a holdup may overshoot `[0, 1]` before it counts as diverged.
    pub holdup_tolerance: f64,
    /// Minimum timestep before warning (s).
    pub min_dt: f64,
    /// Maximum consecutive warnings before recommending stop.
    pub max_consecutive_warnings: usize,
}

impl Default for StabilityThresholds {
    fn default() -> Self {
        Self::pipeline_default()
    }
}

impl StabilityThresholds {
    /// Default thresholds for production pipelines.
    ///
    /// - max_velocity: 100 m/s
    /// - holdup_tolerance: 1e-8
    /// - min_dt: 1e-6 s
    /// - max_consecutive_warnings: 10
    pub fn pipeline_default() -> Self {
        Self {
            max_velocity: 100.0,
            holdup_tolerance: 1e-8,
            min_dt: 1e-6,
            max_consecutive_warnings: 10,
        }
    }

    /// Strict thresholds for detecting issues early.
    pub fn strict() -> Self {
        Self {
            max_velocity: 30.0,
            holdup_tolerance: 1e-12,
            min_dt: 1e-4,
            max_consecutive_warnings: 3,
        }
    }

    /// Relaxed thresholds for exploratory runs.
    ///
    /// Only catches catastrophic blow-up.
    pub fn relaxed() -> Self {
        Self {
            max_velocity: 1000.0,
            holdup_tolerance: 1e-6,
            min_dt: 1e-9,
            max_consecutive_warnings: 100,
        }
    }

    pub fn with_max_velocity(mut self, max_velocity: f64) -> Self {
        self.max_velocity = max_velocity;
        self
    }

    pub fn with_holdup_tolerance(mut self, tolerance: f64) -> Self {
        self.holdup_tolerance = tolerance;
        self
    }

    pub fn with_min_dt(mut self, min_dt: f64) -> Self {
        self.min_dt = min_dt;
        self
    }
}

/// Types of stability warnings.
#[derive(Debug, Clone, PartialEq)]
pub enum StabilityWarning {
    /// NaN or infinite value in a section field.
    NonFiniteValue { cell: CellIndex, field: &'static str },
    /// Holdup outside `[0, 1]` beyond the tolerance.
    HoldupOutOfRange {
        cell: CellIndex,
        field: &'static str,
        value: f64,
    },
    /// Phase velocity magnitude exceeds threshold.
    VelocityExceedsMax {
        cell: CellIndex,
        field: &'static str,
        value: f64,
        threshold: f64,
    },
    /// Timestep dropped below minimum.
    TimestepBelowMin { value: f64, threshold: f64 },
}

impl StabilityWarning {
    /// Critical warnings abort the step.
    pub fn is_critical(&self) -> bool {
        !matches!(self, Self::TimestepBelowMin { .. })
    }

    /// Convert a critical warning into the step error.
    pub fn to_error(&self, step: usize) -> Option<SolverError> {
        let (cell, field, value) = match *self {
            Self::NonFiniteValue { cell, field } => (cell, field, f64::NAN),
            Self::HoldupOutOfRange { cell, field, value } => (cell, field, value),
            Self::VelocityExceedsMax {
                cell, field, value, ..
            } => (cell, field, value),
            Self::TimestepBelowMin { .. } => return None,
        };
        Some(SolverError::Diverged {
            step,
            cell,
            field,
            value,
        })
    }
}

impl fmt::Display for StabilityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteValue { cell, field } => {
                write!(f, "Non-finite {} at cell {}", field, cell)
            }
            Self::HoldupOutOfRange { cell, field, value } => {
                write!(f, "Holdup out of range: {}={:.6} at cell {}", field, value, cell)
            }
            Self::VelocityExceedsMax {
                cell,
                field,
                value,
                threshold,
            } => write!(
                f,
                "Velocity exceeds max: |{}|={:.2}m/s > {:.2}m/s at cell {}",
                field,
                value.abs(),
                threshold,
                cell
            ),
            Self::TimestepBelowMin { value, threshold } => {
                write!(f, "Timestep below min: dt={:.2e}s < {:.2e}s", value, threshold)
            }
        }
    }
}

/// Current stability status of the solution.
#[derive(Debug, Clone, PartialEq)]
pub struct StabilityStatus {
    /// Liquid holdup range (min, max).
    pub holdup_range: (f64, f64),
    /// Maximum phase velocity magnitude.
    pub max_velocity: f64,
    /// Current timestep.
    pub dt: f64,
    /// Whether the solution is stable.
    pub is_stable: bool,
    /// List of warnings detected.
    pub warnings: Vec<StabilityWarning>,
}

impl StabilityStatus {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn has_critical_warnings(&self) -> bool {
        self.warnings.iter().any(StabilityWarning::is_critical)
    }

    /// First critical warning, in cell order.
    pub fn first_critical(&self) -> Option<&StabilityWarning> {
        self.warnings.iter().find(|w| w.is_critical())
    }
}

/// Monitor for tracking solution stability.
#[derive(Debug, Clone)]
pub struct StabilityMonitor {
    thresholds: StabilityThresholds,
    consecutive_warnings: usize,
    total_checks: usize,
    total_warnings: usize,
    last_status: Option<StabilityStatus>,
}

impl Default for StabilityMonitor {
    fn default() -> Self {
        Self::new(StabilityThresholds::default())
    }
}

impl StabilityMonitor {
    pub fn new(thresholds: StabilityThresholds) -> Self {
        Self {
            thresholds,
            consecutive_warnings: 0,
            total_checks: 0,
            total_warnings: 0,
            last_status: None,
        }
    }

    pub fn thresholds(&self) -> &StabilityThresholds {
        &self.thresholds
    }

    pub fn consecutive_warnings(&self) -> usize {
        self.consecutive_warnings
    }

    pub fn total_checks(&self) -> usize {
        self.total_checks
    }

    pub fn total_warnings(&self) -> usize {
        self.total_warnings
    }

    pub fn last_status(&self) -> Option<&StabilityStatus> {
        self.last_status.as_ref()
    }

    /// Check the sections for stability issues.
    pub fn check(&mut self, sections: &[PipeSection], dt: f64) -> StabilityStatus {
        self.total_checks += 1;

        let th = self.thresholds;
        let mut warnings = Vec::new();
        let mut min_holdup = f64::INFINITY;
        let mut max_holdup = f64::NEG_INFINITY;
        let mut max_vel = 0.0_f64;

        for (i, s) in sections.iter().enumerate() {
            let cell = CellIndex::new(i);
            let fields = [
                ("pressure", s.pressure),
                ("gas_holdup", s.gas_holdup),
                ("liquid_holdup", s.liquid_holdup),
                ("gas_velocity", s.gas_velocity),
                ("liquid_velocity", s.liquid_velocity),
            ];
            if let Some(&(field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
                warnings.push(StabilityWarning::NonFiniteValue { cell, field });
                continue;
            }

            min_holdup = min_holdup.min(s.liquid_holdup);
            max_holdup = max_holdup.max(s.liquid_holdup);

            for (field, value) in [("gas_holdup", s.gas_holdup), ("liquid_holdup", s.liquid_holdup)] {
                if value < -th.holdup_tolerance || value > 1.0 + th.holdup_tolerance {
                    warnings.push(StabilityWarning::HoldupOutOfRange { cell, field, value });
                }
            }

            let phases = [
                ("gas_velocity", s.gas_velocity, s.gas_holdup),
                ("liquid_velocity", s.liquid_velocity, s.liquid_holdup),
            ];
            for (field, value, holdup) in phases {
                if holdup <= MIN_PHASE_HOLDUP {
                    continue;
                }
                max_vel = max_vel.max(value.abs());
                if value.abs() > th.max_velocity {
                    warnings.push(StabilityWarning::VelocityExceedsMax {
                        cell,
                        field,
                        value,
                        threshold: th.max_velocity,
                    });
                }
            }
        }

        if dt < th.min_dt {
            warnings.push(StabilityWarning::TimestepBelowMin {
                value: dt,
                threshold: th.min_dt,
            });
        }

        let is_stable = warnings.is_empty();
        if is_stable {
            self.consecutive_warnings = 0;
        } else {
            self.consecutive_warnings += 1;
            self.total_warnings += warnings.len();
        }

        let status = StabilityStatus {
            holdup_range: (min_holdup, max_holdup),
            max_velocity: max_vel,
            dt,
            is_stable,
            warnings,
        };
        self.last_status = Some(status.clone());
        status
    }

    /// Check the sections and fail on the first critical finding.
    ///
    /// Non-critical warnings are logged and the status is returned.
    pub fn ensure_stable(
        &mut self,
        step: usize,
        sections: &[PipeSection],
        dt: f64,
    ) -> Result<StabilityStatus, SolverError> {
        let status = self.check(sections, dt);
        if let Some(err) = status.first_critical().and_then(|w| w.to_error(step)) {
            return Err(err);
        }
        for warning in &status.warnings {
            warn!(step, %warning, "stability warning");
        }
        Ok(status)
    }

    /// Whether the warning history recommends stopping.
    pub fn should_stop(&self) -> bool {
        if self.consecutive_warnings >= self.thresholds.max_consecutive_warnings {
            return true;
        }
        self.last_status
            .as_ref()
            .is_some_and(StabilityStatus::has_critical_warnings)
    }

    /// Suggested remediation for the last status.
    pub fn suggest_remediation(&self) -> Vec<String> {
        let mut suggestions = Vec::new();

        if let Some(status) = &self.last_status {
            for warning in &status.warnings {
                match warning {
                    StabilityWarning::VelocityExceedsMax { .. } => {
                        suggestions.push(
                            "Velocity exceeds threshold: reduce the CFL number or switch to the Rusanov flux".to_string(),
                        );
                    }
                    StabilityWarning::HoldupOutOfRange { .. } => {
                        suggestions.push(
                            "Holdup out of range: use a more diffusive limiter (minmod) or a smaller time step".to_string(),
                        );
                    }
                    StabilityWarning::NonFiniteValue { .. } => {
                        suggestions.push(
                            "Non-finite state: check boundary pressures and the inlet rates".to_string(),
                        );
                        suggestions.push(
                            "Start from a drift-flux steady state instead of a uniform field".to_string(),
                        );
                    }
                    StabilityWarning::TimestepBelowMin { .. } => {
                        suggestions.push(
                            "Timestep too small: check for near-vacuum cells driving the wave speed".to_string(),
                        );
                    }
                }
            }
        }

        suggestions.sort();
        suggestions.dedup();
        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Pipeline;

    fn sections(liquid_holdup: f64, velocity: f64) -> Vec<PipeSection> {
        let mut sections = Pipeline::horizontal(4, 40.0, 0.2, 0.0).unwrap().sections;
        for s in &mut sections {
            s.set_liquid_holdup(liquid_holdup);
            s.pressure = 5e6;
            s.gas_velocity = velocity;
            s.liquid_velocity = velocity;
        }
        sections
    }

    #[test]
    fn test_default_thresholds() {
        let t = StabilityThresholds::default();
        assert_eq!(t.max_velocity, 100.0);
        assert_eq!(t.max_consecutive_warnings, 10);
    }

    #[test]
    fn test_stable_solution() {
        let s = sections(0.2, 3.0);
        let mut monitor = StabilityMonitor::default();

        let status = monitor.check(&s, 0.1);
        assert!(status.is_stable);
        assert_eq!(status.holdup_range, (0.2, 0.2));
        assert_eq!(status.max_velocity, 3.0);
        assert!(!monitor.should_stop());
    }

    #[test]
    fn test_nan_is_diverged() {
        let mut s = sections(0.2, 3.0);
        s[2].liquid_velocity = f64::NAN;
        let mut monitor = StabilityMonitor::default();

        let err = monitor.ensure_stable(7, &s, 0.1).unwrap_err();
        assert!(matches!(
            err,
            SolverError::Diverged { step: 7, field: "liquid_velocity", .. }
        ));
        assert_eq!(err.cell(), Some(CellIndex::new(2)));
        assert!(monitor.should_stop());
    }

    #[test]
    fn test_holdup_out_of_range() {
        let mut s = sections(0.2, 3.0);
        s[1].set_liquid_holdup(1.2);
        let mut monitor = StabilityMonitor::default();

        let status = monitor.check(&s, 0.1);
        assert!(status.has_critical_warnings());
        // liquid above one, gas below zero
        assert_eq!(status.warnings.len(), 2);
        let err = status.first_critical().and_then(|w| w.to_error(3)).unwrap();
        assert!(matches!(
            err,
            SolverError::Diverged { field: "gas_holdup", value, .. } if (value + 0.2).abs() < 1e-12
        ));
    }

    #[test]
    fn test_absent_phase_velocity_ignored() {
        let mut s = sections(0.0, 3.0);
        s[0].liquid_velocity = 500.0;
        let mut monitor = StabilityMonitor::default();
        assert!(monitor.check(&s, 0.1).is_stable);

        s[0].set_liquid_holdup(0.1);
        let status = monitor.check(&s, 0.1);
        assert!(status.warnings.iter().any(|w| matches!(
            w,
            StabilityWarning::VelocityExceedsMax { field: "liquid_velocity", .. }
        )));
    }

    #[test]
    fn test_small_timestep_only_warns() {
        let s = sections(0.2, 3.0);
        let mut monitor = StabilityMonitor::new(StabilityThresholds::strict());
        let status = monitor.ensure_stable(0, &s, 1e-6).unwrap();
        assert!(!status.is_stable);
        assert!(!status.has_critical_warnings());
        assert!(!monitor.suggest_remediation().is_empty());
    }

    #[test]
    fn test_consecutive_warnings() {
        let s = sections(0.2, 3.0);
        let mut monitor = StabilityMonitor::new(StabilityThresholds::default().with_min_dt(1.0));

        for _ in 0..9 {
            monitor.check(&s, 0.1);
        }
        assert_eq!(monitor.consecutive_warnings(), 9);
        assert!(!monitor.should_stop());

        monitor.check(&s, 0.1);
        assert!(monitor.should_stop());

        monitor.check(&s, 2.0);
        assert_eq!(monitor.consecutive_warnings(), 0);
        assert_eq!(monitor.total_checks(), 11);
        assert_eq!(monitor.total_warnings(), 10);
    }
}
