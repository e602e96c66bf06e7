//! Strongly-typed indices.
//!
//! Cells, faces and accumulation zones are all addressed by `usize`
//! internally; the newtypes keep them from being mixed up at API seams.

mod indices;

pub use indices::{CellIndex, FaceIndex, ZoneIndex};
