//! Fluid property closures.
//!
//! - [`ThermoProvider`]: narrow flash interface to an equation-of-state package
//! - [`PolytropicFluids`]: ideal gas plus weakly compressible liquid stub
//! - [`DriftFluxClosure`]: slip relation for steady holdup initialisation

mod drift_flux;
mod thermo;

pub use drift_flux::DriftFluxClosure;
pub use thermo::{
    CompressibleLiquid, Composition, FluidState, IdealGas, P_REF, Phase, PolytropicFluids, T_REF,
    ThermoProvider, face_density,
};
