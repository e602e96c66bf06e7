//! Runtime diagnostics for transient pipe simulations.
//!
//! - Phase inventories (mass and liquid volume in the pipe)
//! - Solution bounds (holdup range, fastest phase, CFL number)
//! - Mass balance against the boundary transfers
//!
//! ```
//! use pipeflow::analysis::{InventoryTracker, PipeDiagnostics};
//! use pipeflow::mesh::Pipeline;
//! use pipeflow::solver::BoundaryTotals;
//!
//! let pipeline = Pipeline::horizontal(10, 100.0, 0.2, 0.0).unwrap();
//! let initial = PipeDiagnostics::compute(&pipeline.sections, 0.1);
//! let mut tracker = InventoryTracker::new(initial);
//!
//! tracker.update(0.1, PipeDiagnostics::compute(&pipeline.sections, 0.1), &BoundaryTotals::default());
//! assert_eq!(tracker.liquid_balance_error(), 0.0);
//! ```

use crate::mesh::{MIN_PHASE_HOLDUP, PipeSection};
use crate::solver::BoundaryTotals;

/// Liquid mass in the sections (kg).
pub fn liquid_inventory(sections: &[PipeSection]) -> f64 {
    sections
        .iter()
        .map(|s| s.liquid_mass_per_length() * s.length)
        .sum()
}

/// Gas mass in the sections (kg).
pub fn gas_inventory(sections: &[PipeSection]) -> f64 {
    sections
        .iter()
        .map(|s| s.gas_mass_per_length() * s.length)
        .sum()
}

/// Diagnostic quantities of one section array.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipeDiagnostics {
    /// Liquid mass (kg)
    pub liquid_mass: f64,
    /// Gas mass (kg)
    pub gas_mass: f64,
    /// Liquid volume (m³)
    pub liquid_volume: f64,
    pub min_liquid_holdup: f64,
    pub max_liquid_holdup: f64,
    /// Fastest phase velocity magnitude over present phases (m/s)
    pub max_velocity: f64,
    /// `dt · max(|v| + c) / L`, maximised over cells
    pub cfl_number: f64,
}

impl PipeDiagnostics {
    /// Compute all diagnostics for `sections` at time step `dt`.
    pub fn compute(sections: &[PipeSection], dt: f64) -> Self {
        let mut min_holdup = f64::INFINITY;
        let mut max_holdup = f64::NEG_INFINITY;
        let mut max_velocity = 0.0_f64;
        let mut cfl_number = 0.0_f64;

        for s in sections {
            min_holdup = min_holdup.min(s.liquid_holdup);
            max_holdup = max_holdup.max(s.liquid_holdup);
            if s.gas_holdup > MIN_PHASE_HOLDUP {
                max_velocity = max_velocity.max(s.gas_velocity.abs());
            }
            if s.liquid_holdup > MIN_PHASE_HOLDUP {
                max_velocity = max_velocity.max(s.liquid_velocity.abs());
            }
            if s.length > 0.0 {
                cfl_number = cfl_number.max(dt * s.max_wave_speed() / s.length);
            }
        }

        // empty pipeline
        if sections.is_empty() {
            min_holdup = 0.0;
            max_holdup = 0.0;
        }

        Self {
            liquid_mass: liquid_inventory(sections),
            gas_mass: gas_inventory(sections),
            liquid_volume: sections.iter().map(PipeSection::liquid_volume).sum(),
            min_liquid_holdup: min_holdup,
            max_liquid_holdup: max_holdup,
            max_velocity,
            cfl_number,
        }
    }

    pub fn summary_line(&self) -> String {
        format!(
            "M_l={:.4e} M_g={:.4e} V_l={:.4} α_l=[{:.3},{:.3}] |v|_max={:.3} CFL={:.3}",
            self.liquid_mass,
            self.gas_mass,
            self.liquid_volume,
            self.min_liquid_holdup,
            self.max_liquid_holdup,
            self.max_velocity,
            self.cfl_number
        )
    }
}

/// Tracks inventories against the mass that crossed the pipe ends.
#[derive(Clone, Debug)]
pub struct InventoryTracker {
    initial: PipeDiagnostics,
    current: PipeDiagnostics,
    /// Boundary transfers since the initial state
    transferred: BoundaryTotals,
    current_time: f64,
    n_updates: usize,
    max_cfl_seen: f64,
    max_velocity_seen: f64,
}

impl InventoryTracker {
    pub fn new(initial: PipeDiagnostics) -> Self {
        Self {
            current: initial,
            initial,
            transferred: BoundaryTotals::default(),
            current_time: 0.0,
            n_updates: 0,
            max_cfl_seen: initial.cfl_number,
            max_velocity_seen: initial.max_velocity,
        }
    }

    /// Record the state after a step and the boundary transfers of that step.
    pub fn update(&mut self, time: f64, diag: PipeDiagnostics, step_transfers: &BoundaryTotals) {
        self.current_time = time;
        self.n_updates += 1;
        self.transferred.accumulate(step_transfers);
        self.max_cfl_seen = self.max_cfl_seen.max(diag.cfl_number);
        self.max_velocity_seen = self.max_velocity_seen.max(diag.max_velocity);
        self.current = diag;
    }

    /// Relative liquid imbalance: inventory change minus net inflow, over
    /// the initial inventory (absolute when that is zero).
    pub fn liquid_balance_error(&self) -> f64 {
        balance_error(
            self.initial.liquid_mass,
            self.current.liquid_mass,
            self.transferred.net_liquid(),
        )
    }

    /// Relative gas imbalance.
    pub fn gas_balance_error(&self) -> f64 {
        balance_error(
            self.initial.gas_mass,
            self.current.gas_mass,
            self.transferred.net_gas(),
        )
    }

    pub fn transferred(&self) -> &BoundaryTotals {
        &self.transferred
    }

    pub fn current(&self) -> &PipeDiagnostics {
        &self.current
    }

    pub fn initial(&self) -> &PipeDiagnostics {
        &self.initial
    }

    pub fn n_updates(&self) -> usize {
        self.n_updates
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn max_cfl_seen(&self) -> f64 {
        self.max_cfl_seen
    }

    pub fn max_velocity_seen(&self) -> f64 {
        self.max_velocity_seen
    }
}

fn balance_error(initial: f64, current: f64, net_inflow: f64) -> f64 {
    let imbalance = current - initial - net_inflow;
    if initial.abs() > 1e-14 {
        imbalance.abs() / initial.abs()
    } else {
        imbalance.abs()
    }
}
