//! Run-time analysis of pipe simulations.
//!
//! This module provides tools for:
//! - Detecting numerical divergence after each step ([`StabilityMonitor`])
//! - Phase inventories and the mass balance against boundary transfers
//!   ([`PipeDiagnostics`], [`InventoryTracker`])

mod diagnostics;
mod stability;

pub use diagnostics::{InventoryTracker, PipeDiagnostics, gas_inventory, liquid_inventory};
pub use stability::{StabilityMonitor, StabilityStatus, StabilityThresholds, StabilityWarning};
