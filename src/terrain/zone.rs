//! Accumulation zones and their fill state machine.

use std::fmt;

use crate::mesh::PipeSection;
use crate::types::ZoneIndex;

/// How a zone was found in the elevation profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZoneKind {
    /// Local elevation minimum with its adjoining down- and uphill runs
    LowPoint,
    /// Near-horizontal section followed by a steep riser
    RiserBase,
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneKind::LowPoint => write!(f, "low point"),
            ZoneKind::RiserBase => write!(f, "riser base"),
        }
    }
}

/// Fill state of a zone.
///
/// ```text
/// Filling ──(volume > overflow fraction)──▶ Overflowing
///    ▲                                          │
///    │                                   release check
///    │                                          ▼
///    └──────────(next update)────────── JustReleased
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZoneState {
    #[default]
    Filling,
    Overflowing,
    JustReleased,
}

impl ZoneState {
    /// State after a volume update.
    pub fn after_update(self, over_threshold: bool) -> Self {
        if over_threshold {
            ZoneState::Overflowing
        } else {
            ZoneState::Filling
        }
    }

    /// State after a release attempt.
    ///
    /// Only an overflowing zone can release; any other state is kept.
    pub fn after_release(self) -> Self {
        match self {
            ZoneState::Overflowing => ZoneState::JustReleased,
            other => other,
        }
    }

    #[inline]
    pub fn is_overflowing(self) -> bool {
        self == ZoneState::Overflowing
    }
}

/// A contiguous run of sections where liquid collects.
///
/// Membership is fixed at identification; the volume, timer and state
/// change every step. `0 ≤ liquid_volume ≤ max_volume` holds after every
/// tracker update.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccumulationZone {
    pub index: ZoneIndex,
    pub kind: ZoneKind,
    /// Member section indices, ascending
    pub sections: Vec<usize>,
    /// Upstream face position (m)
    pub start_position: f64,
    /// Downstream face position (m)
    pub end_position: f64,
    /// Tracked liquid volume (m³)
    pub liquid_volume: f64,
    /// Capacity (m³)
    pub max_volume: f64,
    /// Tracked volume over the mean flow area (m)
    pub liquid_level: f64,
    /// Liquid volume rate entering minus leaving the zone (m³/s)
    pub net_inflow_rate: f64,
    /// Time since the last release (s)
    pub time_since_slug: f64,
    pub state: ZoneState,
}

impl AccumulationZone {
    /// Zone over `members` of `sections`, empty and filling.
    ///
    /// `capacity_factor` scales the summed section volumes into the
    /// zone capacity.
    pub fn new(
        index: ZoneIndex,
        kind: ZoneKind,
        members: Vec<usize>,
        sections: &[PipeSection],
        capacity_factor: f64,
    ) -> Self {
        let (start_position, end_position) = match (members.first(), members.last()) {
            (Some(&first), Some(&last)) => {
                (sections[first].position, sections[last].end_position())
            }
            _ => (0.0, 0.0),
        };
        let max_volume =
            capacity_factor * members.iter().map(|&i| sections[i].volume()).sum::<f64>();
        Self {
            index,
            kind,
            sections: members,
            start_position,
            end_position,
            liquid_volume: 0.0,
            max_volume,
            liquid_level: 0.0,
            net_inflow_rate: 0.0,
            time_since_slug: 0.0,
            state: ZoneState::Filling,
        }
    }

    /// Along-pipe extent (m).
    #[inline]
    pub fn length(&self) -> f64 {
        self.end_position - self.start_position
    }

    #[inline]
    pub fn is_overflowing(&self) -> bool {
        self.state.is_overflowing()
    }

    pub fn first_section(&self) -> Option<usize> {
        self.sections.first().copied()
    }

    pub fn last_section(&self) -> Option<usize> {
        self.sections.last().copied()
    }

    /// Tracked volume over capacity.
    pub fn fill_fraction(&self) -> f64 {
        if self.max_volume > 0.0 {
            self.liquid_volume / self.max_volume
        } else {
            0.0
        }
    }

    /// Liquid volume currently held by the member sections (m³).
    pub fn section_liquid_volume(&self, sections: &[PipeSection]) -> f64 {
        self.sections
            .iter()
            .map(|&i| sections[i].liquid_volume())
            .sum()
    }

    /// Mean flow area over the zone (m²).
    pub fn mean_area(&self) -> f64 {
        let length = self.length();
        if length > 0.0 {
            self.max_volume / length
        } else {
            0.0
        }
    }

    /// Refresh `liquid_level` from the tracked volume.
    pub fn update_level(&mut self) {
        self.liquid_level = self.liquid_volume / (self.mean_area() + 1e-10);
    }

    pub fn contains(&self, section: usize) -> bool {
        self.sections.binary_search(&section).is_ok()
    }
}
