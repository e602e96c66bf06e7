//! Time integration methods.

mod cfl;
mod integrator;

pub use cfl::{CflLimit, check_cfl, compute_dt};
pub use integrator::{
    BoxedIntegratorInfo, ForwardEuler, Integrable, IntegratorInfo, RK4, SSPRK3,
    StandardIntegrator, TimeIntegrator, create_integrator_info,
};
