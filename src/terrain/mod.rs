//! Terrain-induced liquid accumulation.
//!
//! Liquid collects in low points and at riser bases. Each
//! [`AccumulationZone`] tracks its own volume, separate from the section
//! holdups the flow solver advances, and releases a slug once it
//! overflows and a driver pushes the liquid downstream.
//!
//! - [`identify_zones`]: zones from the static elevation profile
//! - [`AccumulationModel`]: strategy integrating a zone's volume
//! - [`LiquidAccumulationTracker`]: per-step update and release checks

mod config;
mod identify;
mod models;
mod tracker;
mod zone;

pub use config::TrackerConfig;
pub use identify::{identify_zones, validate_zones};
pub use models::{
    AccumulationModel, AccumulationStrategy, GravitySlipSettling, InflowBalance,
    boundary_liquid_rates,
};
pub use tracker::{LiquidAccumulationTracker, SlugCharacteristics};
pub use zone::{AccumulationZone, ZoneKind, ZoneState};
