//! Numerical fluxes for the two-fluid equations.
//!
//! Each phase is fluxed separately through a face given its left and right
//! [`PhaseState`]:
//! - AUSM+ flux splitting (default)
//! - First-order upwind
//! - Rusanov / local Lax-Friedrichs
//!
//! The [`PhaseFluxScheme`] trait, the [`StandardFlux`] enum and the
//! [`BoxedFlux`] alias give generic, static and dynamic dispatch.

mod ausm;
mod phase;
mod traits;
mod upwind;

pub use ausm::{AusmConfig, ausm_plus_flux};
pub use phase::{PhaseFlux, PhaseState, ZERO_HOLDUP};
pub use traits::{
    AusmPlusFlux, BoxedFlux, PhaseFluxScheme, RusanovFlux, StandardFlux, UpwindFlux, create_flux,
};
pub use upwind::{rusanov_phase_flux, upwind_phase_flux};
