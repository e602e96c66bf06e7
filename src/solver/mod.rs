//! Finite-volume solver components.
//!
//! # Submodules
//!
//! - [`state`]: conserved cell states and the integrable pipe solution
//! - [`limiters`]: TVD slope limiters
//! - [`reconstruction`]: MUSCL face reconstruction
//! - [`primitive`]: pressure, temperature and holdup recovery
//! - [`rhs`]: flux divergence, non-conservative terms and sources
//! - [`regime`]: flow-regime map
//!
//! # Limiters
//!
//! [`SlopeLimiter`] selects `φ(r)` for the reconstruction:
//!
//! - `Minmod`: most dissipative TVD limiter
//! - `VanLeer`: smooth, symmetric (default)
//! - `VanAlbada`: smooth, bounded by 1
//! - `Superbee`: least dissipative, compressive
//! - `MonotonizedCentral`: MC limiter
//! - `None`: first order

pub mod limiters;
pub mod primitive;
pub mod reconstruction;
pub mod regime;
pub mod rhs;
pub mod state;

pub use limiters::SlopeLimiter;
pub use primitive::{PrimitiveSolver, PrimitiveState, RecoveryConfig, RecoveryContext};
pub use reconstruction::{
    DIFFERENCE_EPS, MusclReconstructor, RATIO_SENTINEL, ReconstructedPair, gradient_ratio,
    limited_slope,
};
pub use regime::RegimeClassifier;
pub use rhs::PipeRhs;
pub use state::{BoundaryTotals, ConservedState, PipeSolution};
