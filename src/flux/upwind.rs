//! Fallback phase fluxes: first-order upwind and Rusanov.
//!
//! Both take the same arguments as [`ausm_plus_flux`](super::ausm_plus_flux)
//! and are used for start-up, stabilisation and cross-checks.
//!
//! Upwind picks the whole state on the side the mean velocity comes from:
//!
//! F* = F(q_L) if (v_L + v_R)/2 ≥ 0, else F(q_R)
//!
//! Rusanov (local Lax-Friedrichs) adds dissipation scaled by the fastest
//! signal speed on either side:
//!
//! F* = 0.5 (F(q_L) + F(q_R)) - 0.5 s_max (U_R - U_L),  s_max = max(|v| + c)

use super::phase::{PhaseFlux, PhaseState, ZERO_HOLDUP};

/// First-order upwind phase flux.
pub fn upwind_phase_flux(left: &PhaseState, right: &PhaseState, area: f64) -> PhaseFlux {
    if left.holdup < ZERO_HOLDUP && right.holdup < ZERO_HOLDUP {
        return PhaseFlux::zero();
    }
    let v_mean = 0.5 * (left.velocity + right.velocity);
    if v_mean >= 0.0 {
        left.physical_flux(area)
    } else {
        right.physical_flux(area)
    }
}

/// Rusanov (local Lax-Friedrichs) phase flux.
pub fn rusanov_phase_flux(left: &PhaseState, right: &PhaseState, area: f64) -> PhaseFlux {
    if left.holdup < ZERO_HOLDUP && right.holdup < ZERO_HOLDUP {
        return PhaseFlux::zero();
    }
    let s_max = (left.velocity.abs() + left.sound_speed)
        .max(right.velocity.abs() + right.sound_speed);

    let central = 0.5 * (left.physical_flux(area) + right.physical_flux(area));
    let jump = right.conserved(area) - left.conserved(area);
    central - (0.5 * s_max) * jump
}
