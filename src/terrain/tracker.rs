//! Terrain liquid accumulation and slug release.

use std::f64::consts::PI;
use std::fmt;

use tracing::info;

use crate::error::ConfigError;
use crate::mesh::PipeSection;
use crate::terrain::{
    AccumulationModel, AccumulationZone, GravitySlipSettling, TrackerConfig, ZoneKind,
    identify_zones, validate_zones,
};
use crate::types::ZoneIndex;

/// A terrain-induced slug leaving an accumulation zone.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlugCharacteristics {
    /// Zone the slug left
    pub zone: ZoneIndex,
    /// Front position (m)
    pub front_position: f64,
    /// Tail position (m)
    pub tail_position: f64,
    /// Length (m)
    pub length: f64,
    /// Body liquid holdup
    pub holdup: f64,
    /// Translational velocity (m/s)
    pub velocity: f64,
    /// Liquid volume (m³)
    pub volume: f64,
    /// Released from a terrain accumulation zone rather than grown hydrodynamically
    pub terrain_induced: bool,
}

impl fmt::Display for SlugCharacteristics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "slug from zone {}: {:.1}-{:.1} m, L={:.2} m, H={:.2}, v={:.2} m/s, V={:.3} m³",
            self.zone,
            self.tail_position,
            self.front_position,
            self.length,
            self.holdup,
            self.velocity,
            self.volume
        )
    }
}

/// Tracks liquid in low points and riser bases and releases slugs.
///
/// Zones are identified once from the elevation profile and updated in
/// registration order, so a later zone sees the holdups an earlier zone
/// has just redistributed.
pub struct LiquidAccumulationTracker {
    config: TrackerConfig,
    model: Box<dyn AccumulationModel>,
    zones: Vec<AccumulationZone>,
    n_sections: usize,
}

impl fmt::Debug for LiquidAccumulationTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiquidAccumulationTracker")
            .field("config", &self.config)
            .field("model", &self.model.name())
            .field("zones", &self.zones)
            .finish()
    }
}

impl Default for LiquidAccumulationTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl LiquidAccumulationTracker {
    /// Tracker with the gravity/slip settling model.
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_model(config, Box::new(GravitySlipSettling))
    }

    pub fn with_model(config: TrackerConfig, model: Box<dyn AccumulationModel>) -> Self {
        Self {
            config,
            model,
            zones: Vec::new(),
            n_sections: 0,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    /// Identify the zones of `sections`, replacing any previous ones.
    pub fn identify_zones(&mut self, sections: &[PipeSection]) -> &[AccumulationZone] {
        self.zones = identify_zones(sections, &self.config);
        self.n_sections = sections.len();
        let low_points = self
            .zones
            .iter()
            .filter(|z| z.kind == ZoneKind::LowPoint)
            .count();
        info!(
            zones = self.zones.len(),
            low_points,
            riser_bases = self.zones.len() - low_points,
            "identified accumulation zones"
        );
        &self.zones
    }

    /// Install externally built zones after checking their membership.
    pub fn set_zones(
        &mut self,
        zones: Vec<AccumulationZone>,
        n_sections: usize,
    ) -> Result<(), ConfigError> {
        validate_zones(&zones, n_sections)?;
        self.zones = zones;
        self.n_sections = n_sections;
        Ok(())
    }

    pub fn zones(&self) -> &[AccumulationZone] {
        &self.zones
    }

    pub fn zone(&self, index: ZoneIndex) -> Option<&AccumulationZone> {
        self.zones.get(index.get())
    }

    /// Integrate every zone over `dt`, in registration order.
    pub fn update(&mut self, sections: &mut [PipeSection], dt: f64) -> Result<(), ConfigError> {
        if sections.len() != self.n_sections {
            validate_zones(&self.zones, sections.len())?;
        }
        for zone in &mut self.zones {
            if zone.sections.is_empty() {
                continue;
            }
            self.model.update_zone(zone, sections, dt, &self.config);

            let actual = zone.section_liquid_volume(sections);
            let mean_holdup = actual / zone.max_volume.max(1e-10);
            let over = zone.fill_fraction() > self.config.overflow_fraction
                || mean_holdup > self.config.overflow_fraction;
            zone.state = zone.state.after_update(over);
            zone.update_level();
            zone.time_since_slug += dt;
        }
        Ok(())
    }

    /// Release check for one zone.
    ///
    /// Requires an overflowing zone, an elapsed dwell time, a downstream
    /// section inside the pipe and not already in a slug body, and one
    /// release driver: gas pressure beating part of the downstream head, a
    /// downhill exit, a fast downstream mixture, or a critically full zone.
    pub fn check_for_slug_release(
        &mut self,
        index: ZoneIndex,
        sections: &[PipeSection],
    ) -> Option<SlugCharacteristics> {
        let cfg = self.config;
        let zone = self.zones.get_mut(index.get())?;
        if !zone.is_overflowing() || zone.liquid_volume <= 0.0 {
            return None;
        }
        if zone.time_since_slug < cfg.min_dwell_time {
            return None;
        }
        let last = zone.last_section()?;
        let downstream = sections.get(last + 1)?;
        if downstream.in_slug_body {
            return None;
        }
        let exit = &sections[last];

        let pressure_drop = exit.pressure - downstream.pressure;
        let rise = downstream.elevation - exit.elevation;
        let head = exit.liquid.density * cfg.g * rise.max(0.0);
        let downstream_mixture = downstream.mixture_velocity();

        let pressure_driven = pressure_drop > cfg.hydrostatic_release_factor * head;
        let downhill = rise < -cfg.downhill_release_drop;
        let velocity_driven = downstream_mixture > cfg.velocity_release_threshold;
        let critically_full = zone.liquid_volume > cfg.critical_fraction * zone.max_volume;
        if !(pressure_driven || downhill || velocity_driven || critically_full) {
            return None;
        }

        let length = (zone.liquid_volume / (exit.area * cfg.slug_body_holdup))
            .min(zone.length())
            .max(cfg.min_slug_length);
        let slug = SlugCharacteristics {
            zone: zone.index,
            front_position: zone.end_position,
            tail_position: zone.end_position - length,
            length,
            holdup: cfg.slug_body_holdup,
            velocity: (cfg.slug_velocity_factor * downstream_mixture).max(cfg.min_slug_velocity),
            volume: zone.liquid_volume,
            terrain_induced: true,
        };

        zone.liquid_volume *= cfg.residual_fraction;
        zone.time_since_slug = 0.0;
        zone.state = zone.state.after_release();
        zone.update_level();

        info!(
            zone = %slug.zone,
            length = slug.length,
            volume = slug.volume,
            velocity = slug.velocity,
            pressure_driven,
            downhill,
            velocity_driven,
            critically_full,
            "terrain slug released"
        );
        Some(slug)
    }

    /// Run the release check on every zone, in registration order.
    pub fn release_slugs(&mut self, sections: &[PipeSection]) -> Vec<SlugCharacteristics> {
        (0..self.zones.len())
            .filter_map(|i| self.check_for_slug_release(ZoneIndex::new(i), sections))
            .collect()
    }

    /// Orifice drainage rate out of a zone (m³/s) under `pressure_drop` (Pa).
    pub fn drainage_rate(
        &self,
        index: ZoneIndex,
        sections: &[PipeSection],
        pressure_drop: f64,
    ) -> f64 {
        let Some(zone) = self.zone(index) else {
            return 0.0;
        };
        let Some(first) = zone.first_section() else {
            return 0.0;
        };
        if zone.liquid_volume <= 0.0 {
            return 0.0;
        }
        let Some(section) = sections.get(first) else {
            return 0.0;
        };
        let d = section.diameter;
        let rho_l = section.liquid.density;
        let level = zone.liquid_level;
        let drain_area = 0.25 * PI * d * d * level / d;
        let driving = pressure_drop + rho_l * self.config.g * level;
        if driving <= 0.0 || rho_l <= 0.0 {
            return 0.0;
        }
        self.config.drainage_coefficient() * drain_area * (2.0 * driving / rho_l).sqrt()
    }

    /// Equivalent liquid height in a zone (m).
    pub fn liquid_level(&self, index: ZoneIndex) -> f64 {
        self.zone(index).map_or(0.0, |z| z.liquid_level)
    }

    /// Tracked liquid over all zones (m³).
    pub fn total_accumulated_volume(&self) -> f64 {
        self.zones.iter().map(|z| z.liquid_volume).sum()
    }

    /// Zones currently overflowing.
    pub fn overflowing_zones(&self) -> Vec<ZoneIndex> {
        self.zones
            .iter()
            .filter(|z| z.is_overflowing())
            .map(|z| z.index)
            .collect()
    }

    pub fn critical_holdup(&self) -> f64 {
        self.config.critical_holdup()
    }

    /// Clamped to `[0.1, 0.9]`.
    pub fn set_critical_holdup(&mut self, holdup: f64) {
        self.config.set_critical_holdup(holdup);
    }

    /// Clamped to `[0.1, 1.0]`.
    pub fn set_drainage_coefficient(&mut self, coefficient: f64) {
        self.config.set_drainage_coefficient(coefficient);
    }
}
