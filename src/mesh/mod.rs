//! Pipeline discretisation.
//!
//! - [`PipeSegment`]: one `(length, diameter, elevation_change, roughness)` tuple
//! - [`PipeSection`]: a finite-volume cell with geometry and flow state
//! - [`Pipeline`]: ordered sections, face positions and terrain flags

mod pipeline;
mod section;

pub use pipeline::{BoundaryFace, Pipeline, is_local_maximum, is_local_minimum};
pub use section::{FlowRegime, MIN_PHASE_HOLDUP, PipeSection, PipeSegment};
