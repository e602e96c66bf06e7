//! Trait-based phase flux abstraction.
//!
//! All schemes share one signature, so the solver can switch between AUSM+
//! and the fallbacks at construction time.
//!
//! # Example
//! ```
//! use pipeflow::flux::{PhaseFluxScheme, PhaseState, StandardFlux, create_flux};
//!
//! let l = PhaseState::new(800.0, 1.0, 5e6, 1100.0, 0.0, 0.3);
//! let r = PhaseState::new(800.0, 1.0, 5e6, 1100.0, 0.0, 0.3);
//!
//! let ausm = StandardFlux::default();
//! let f1 = ausm.compute(&l, &r, 0.05);
//!
//! let boxed = create_flux("rusanov".parse().unwrap());
//! let f2 = boxed.compute(&l, &r, 0.05);
//! assert!((f1.mass - f2.mass).abs() < 1e-9);
//! ```

use std::str::FromStr;

use super::ausm::{AusmConfig, ausm_plus_flux};
use super::phase::{PhaseFlux, PhaseState};
use super::upwind::{rusanov_phase_flux, upwind_phase_flux};
use crate::error::ConfigError;

// =============================================================================
// Phase Flux Trait
// =============================================================================

/// Numerical flux of one phase through a cell face.
///
/// # Implementation Notes
///
/// - Consistent: `compute(q, q)` equals the physical flux of `q`
/// - Must return zero when the phase is absent on both sides
/// - Must not allocate
pub trait PhaseFluxScheme: Send + Sync {
    /// Flux from the left state into the right state through `area`.
    fn compute(&self, left: &PhaseState, right: &PhaseState, area: f64) -> PhaseFlux;

    /// Name for logging.
    fn name(&self) -> &'static str;

    /// Recommended CFL number.
    fn recommended_cfl(&self) -> f64 {
        0.5
    }
}

// =============================================================================
// Concrete Schemes
// =============================================================================

/// AUSM+ flux splitting.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AusmPlusFlux {
    pub config: AusmConfig,
}

impl AusmPlusFlux {
    pub fn new(config: AusmConfig) -> Self {
        Self { config }
    }
}

impl PhaseFluxScheme for AusmPlusFlux {
    #[inline]
    fn compute(&self, left: &PhaseState, right: &PhaseState, area: f64) -> PhaseFlux {
        ausm_plus_flux(left, right, area, &self.config)
    }

    fn name(&self) -> &'static str {
        "ausm+"
    }
}

/// First-order upwind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpwindFlux;

impl PhaseFluxScheme for UpwindFlux {
    #[inline]
    fn compute(&self, left: &PhaseState, right: &PhaseState, area: f64) -> PhaseFlux {
        upwind_phase_flux(left, right, area)
    }

    fn name(&self) -> &'static str {
        "upwind"
    }
}

/// Rusanov / local Lax-Friedrichs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RusanovFlux;

impl PhaseFluxScheme for RusanovFlux {
    #[inline]
    fn compute(&self, left: &PhaseState, right: &PhaseState, area: f64) -> PhaseFlux {
        rusanov_phase_flux(left, right, area)
    }

    fn name(&self) -> &'static str {
        "rusanov"
    }

    fn recommended_cfl(&self) -> f64 {
        0.4
    }
}

// =============================================================================
// Standard Flux Enum
// =============================================================================

/// Built-in schemes with static dispatch.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StandardFlux {
    AusmPlus(AusmConfig),
    Upwind,
    Rusanov,
}

impl Default for StandardFlux {
    fn default() -> Self {
        StandardFlux::AusmPlus(AusmConfig::default())
    }
}

impl PhaseFluxScheme for StandardFlux {
    #[inline]
    fn compute(&self, left: &PhaseState, right: &PhaseState, area: f64) -> PhaseFlux {
        match self {
            StandardFlux::AusmPlus(cfg) => ausm_plus_flux(left, right, area, cfg),
            StandardFlux::Upwind => upwind_phase_flux(left, right, area),
            StandardFlux::Rusanov => rusanov_phase_flux(left, right, area),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            StandardFlux::AusmPlus(_) => "ausm+",
            StandardFlux::Upwind => "upwind",
            StandardFlux::Rusanov => "rusanov",
        }
    }

    fn recommended_cfl(&self) -> f64 {
        match self {
            StandardFlux::AusmPlus(_) | StandardFlux::Upwind => 0.5,
            StandardFlux::Rusanov => 0.4,
        }
    }
}

impl FromStr for StandardFlux {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ausm+" | "ausm" | "ausm-plus" | "ausmplus" => Ok(Self::default()),
            "upwind" => Ok(StandardFlux::Upwind),
            "rusanov" | "llf" | "local-lax-friedrichs" => Ok(StandardFlux::Rusanov),
            _ => Err(ConfigError::UnknownFlux(s.to_string())),
        }
    }
}

// =============================================================================
// Boxed Flux
// =============================================================================

/// Boxed scheme for runtime polymorphism.
pub type BoxedFlux = Box<dyn PhaseFluxScheme>;

/// Boxed scheme from its enum tag.
pub fn create_flux(flux: StandardFlux) -> BoxedFlux {
    match flux {
        StandardFlux::AusmPlus(cfg) => Box::new(AusmPlusFlux::new(cfg)),
        StandardFlux::Upwind => Box::new(UpwindFlux),
        StandardFlux::Rusanov => Box::new(RusanovFlux),
    }
}
