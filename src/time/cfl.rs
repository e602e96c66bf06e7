//! CFL time-step limit.
//!
//! ```text
//! dt ≤ CFL · min_i ( L_i / max_k(|v_k| + c_k) )
//! ```
//!
//! Only phases present in a cell contribute to its wave speed. A requested
//! step above the limit is a configuration error; it is never shortened
//! silently.

use crate::error::ConfigError;
use crate::mesh::PipeSection;
use crate::types::CellIndex;

/// Wave speeds below this are treated as a fluid at rest.
const MIN_WAVE_SPEED: f64 = 1e-14;

/// Most restrictive cell for the CFL condition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CflLimit {
    /// Largest admissible time step (s); infinite for a fluid at rest
    pub dt_max: f64,
    /// Cell that sets the limit
    pub cell: CellIndex,
    /// Fastest wave speed in that cell (m/s)
    pub wave_speed: f64,
}

/// Admissible time step over all sections.
///
/// # Arguments
/// * `sections` - Pipe cells
/// * `cfl` - CFL number (typically 0.3 - 0.9)
pub fn compute_dt(sections: &[PipeSection], cfl: f64) -> CflLimit {
    let mut limit = CflLimit {
        dt_max: f64::INFINITY,
        cell: CellIndex::new(0),
        wave_speed: 0.0,
    };
    for (i, s) in sections.iter().enumerate() {
        let speed = s.max_wave_speed();
        if speed < MIN_WAVE_SPEED {
            continue;
        }
        let dt = cfl * s.length / speed;
        if dt < limit.dt_max {
            limit = CflLimit {
                dt_max: dt,
                cell: CellIndex::new(i),
                wave_speed: speed,
            };
        }
    }
    limit
}

/// Reject `dt` when it exceeds the CFL limit.
pub fn check_cfl(sections: &[PipeSection], dt: f64, cfl: f64) -> Result<CflLimit, ConfigError> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(ConfigError::InvalidParameter {
            name: "dt",
            value: dt,
            reason: "time step must be positive and finite",
        });
    }
    let limit = compute_dt(sections, cfl);
    if dt > limit.dt_max {
        return Err(ConfigError::CflViolation {
            dt,
            dt_max: limit.dt_max,
            cell: limit.cell,
            wave_speed: limit.wave_speed,
        });
    }
    Ok(limit)
}
