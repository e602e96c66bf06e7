//! Source terms for the two-fluid equations.
//!
//! Sources are evaluated per cell from the primitive section state:
//! - [`GravitySource`]: axial body force
//! - [`WallFriction`], [`InterfacialFriction`]: shear closures
//! - [`SoilHeatTransfer`]: heat loss, energy equation only
//!
//! The non-conservative `P ∂α/∂x` term depends on face holdups and is
//! assembled with the fluxes in [`crate::solver`].

mod friction;
mod gravity;
mod heat_transfer;
mod traits;

pub use friction::{FrictionConfig, InterfacialFriction, WallFriction, darcy_friction_factor};
pub use gravity::{GravitySource, STANDARD_GRAVITY};
pub use heat_transfer::{SoilHeatTransfer, exponential_integral_e1};
pub use traits::{CombinedSource, SourceTerm};
