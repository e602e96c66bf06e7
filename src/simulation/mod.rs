//! Transient simulation driver.
//!
//! Ties together:
//! - Flux evaluation and MUSCL reconstruction (right-hand side)
//! - Explicit time integration under a fatal CFL check
//! - Terrain accumulation, slug release and regime classification
//! - Divergence monitoring
//!
//! # Example
//! ```
//! use pipeflow::mesh::Pipeline;
//! use pipeflow::simulation::{BoundaryConditions, SolverConfig, TransientPipe};
//!
//! let pipeline = Pipeline::horizontal(20, 200.0, 0.2, 0.0).unwrap();
//! let boundary = BoundaryConditions::closed();
//! let mut pipe = TransientPipe::new(pipeline, boundary, SolverConfig::default()).unwrap();
//! pipe.initialize_uniform(5e6, 300.0, 0.1, 0.0, 0.0).unwrap();
//!
//! let summary = pipe.run_until(0.01, 1e-3, |_| {}).unwrap();
//! assert!(summary.n_steps >= 10);
//! ```

mod config;
mod runner;

pub use crate::boundary::BoundaryConditions;
pub use config::SolverConfig;
pub use runner::{RunSummary, StepReport, TransientPipe};
