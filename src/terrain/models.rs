//! Accumulation strategies.
//!
//! Two models integrate a zone's tracked liquid volume:
//!
//! | Model | Rate | Section feedback |
//! |---|---|---|
//! | [`GravitySlipSettling`] | settling on inclined sections + positive net inflow | reconciles against section holdups and moves liquid toward low sections |
//! | [`InflowBalance`] | net inflow, may drain | none |
//!
//! Both clamp the volume to `[0, max_volume]`.

use tracing::warn;

use crate::mesh::PipeSection;
use crate::terrain::{AccumulationZone, TrackerConfig};

/// Strategy integrating one zone over a step.
pub trait AccumulationModel: Send + Sync {
    /// Advance `zone.liquid_volume` (and possibly the member sections) by `dt`.
    fn update_zone(
        &self,
        zone: &mut AccumulationZone,
        sections: &mut [PipeSection],
        dt: f64,
        config: &TrackerConfig,
    );

    fn name(&self) -> &'static str;
}

/// Liquid volume rates through the zone ends, `(in, out)` in m³/s.
///
/// `None` when the zone touches either pipe end.
pub fn boundary_liquid_rates(zone: &AccumulationZone, sections: &[PipeSection]) -> Option<(f64, f64)> {
    let first = zone.first_section()?;
    let last = zone.last_section()?;
    if first == 0 || last + 1 >= sections.len() {
        return None;
    }
    let upstream = &sections[first - 1];
    let downstream = &sections[last + 1];
    let area = upstream.area;
    let rate = |s: &PipeSection| s.liquid_holdup * s.liquid_velocity.max(0.0) * area;
    Some((rate(upstream), rate(downstream)))
}

/// Gravity and slip driven settling with section feedback.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GravitySlipSettling;

impl GravitySlipSettling {
    /// Settling contribution of one section (m³/s, non-negative).
    pub fn settling_rate(section: &PipeSection, config: &TrackerConfig) -> f64 {
        let rho_l = section.liquid.density;
        let delta_rho = rho_l - section.gas.density;
        let theta = section.inclination;
        let settling = -delta_rho
            * config.g
            * theta.sin()
            * section.liquid_holdup
            * section.gas_holdup
            * section.area
            * config.settling_constant
            / rho_l.max(100.0);

        if theta < 0.0 {
            settling.abs()
        } else if theta > 0.0 && section.slip_velocity() > config.slip_threshold {
            config.uphill_settling_factor * settling.abs()
        } else {
            0.0
        }
    }

    /// Push the tracked volume back into the member sections.
    ///
    /// Each section's target holdup is the zone's mean accumulation holdup
    /// weighted toward low elevations, capped at `max_section_holdup`.
    /// Sections below their target receive liquid, and the liquid comes from
    /// the members that hold more than their target, which take the
    /// displaced gas in exchange. Each phase's volume in the zone is
    /// unchanged, so the pressure recovered from the conserved masses is
    /// too. When the donors cannot cover the deficit every receiver gets the
    /// same share of it. Liquid velocity of a receiver is damped in
    /// proportion to the added holdup.
    pub fn redistribute(zone: &AccumulationZone, sections: &mut [PipeSection], config: &TrackerConfig) {
        if zone.sections.is_empty() || zone.liquid_volume <= 0.0 {
            return;
        }
        let volume: f64 = zone.sections.iter().map(|&i| sections[i].volume()).sum();
        let accumulation_holdup = zone.liquid_volume / volume.max(1e-10);

        let (min_elev, max_elev) = zone.sections.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), &i| (lo.min(sections[i].elevation), hi.max(sections[i].elevation)),
        );
        let range = max_elev - min_elev + 1e-6;
        let weight = |elevation: f64| 1.0 + 2.0 * (max_elev - elevation) / range;
        let mean_weight = zone
            .sections
            .iter()
            .map(|&i| weight(sections[i].elevation))
            .sum::<f64>()
            / zone.sections.len() as f64;

        // (section, current holdup, capped target)
        let targets: Vec<(usize, f64, f64)> = zone
            .sections
            .iter()
            .map(|&i| {
                let section = &sections[i];
                let current = section.liquid_holdup;
                let target = accumulation_holdup * weight(section.elevation) / mean_weight;
                if target > config.max_section_holdup && current < config.max_section_holdup {
                    warn!(
                        zone = %zone.index,
                        section = i,
                        holdup = target,
                        cap = config.max_section_holdup,
                        "section holdup capped during redistribution"
                    );
                }
                (i, current, target.min(config.max_section_holdup))
            })
            .collect();

        let mut demand = 0.0;
        let mut supply = 0.0;
        for &(i, current, target) in &targets {
            let v = sections[i].volume();
            demand += (target - current).max(0.0) * v;
            supply += (current - target).max(0.0) * v;
        }
        let moved = demand.min(supply);
        let fill = if demand > 0.0 { moved / demand } else { 0.0 };
        let drain = if supply > 0.0 { moved / supply } else { 0.0 };

        for (i, current, target) in targets {
            let section = &mut sections[i];
            section.accumulated_liquid_volume = 0.0;
            if moved <= 0.0 {
                continue;
            }
            if target > current {
                let added = fill * (target - current);
                section.set_liquid_holdup(current + added);
                section.liquid_velocity *= (1.0 - added).max(0.3);
                section.accumulated_liquid_volume = added * section.volume();
            } else if current > target {
                section.set_liquid_holdup(current - drain * (current - target));
            }
        }
    }
}

impl AccumulationModel for GravitySlipSettling {
    fn update_zone(
        &self,
        zone: &mut AccumulationZone,
        sections: &mut [PipeSection],
        dt: f64,
        config: &TrackerConfig,
    ) {
        let mut rate: f64 = zone
            .sections
            .iter()
            .map(|&i| Self::settling_rate(&sections[i], config))
            .sum();

        if let Some((inflow, outflow)) = boundary_liquid_rates(zone, sections) {
            zone.net_inflow_rate = inflow - outflow;
            rate += zone.net_inflow_rate.max(0.0);
        }

        zone.liquid_volume = (zone.liquid_volume + rate * dt).clamp(0.0, zone.max_volume);
        let actual = zone.section_liquid_volume(sections);
        zone.liquid_volume = zone
            .liquid_volume
            .max(config.reconcile_fraction * actual)
            .min(zone.max_volume);

        Self::redistribute(zone, sections, config);
    }

    fn name(&self) -> &'static str {
        "gravity-slip-settling"
    }
}

/// Net inflow integration without section feedback.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InflowBalance;

impl AccumulationModel for InflowBalance {
    fn update_zone(
        &self,
        zone: &mut AccumulationZone,
        sections: &mut [PipeSection],
        dt: f64,
        _config: &TrackerConfig,
    ) {
        if let Some((inflow, outflow)) = boundary_liquid_rates(zone, sections) {
            zone.net_inflow_rate = inflow - outflow;
        }
        zone.liquid_volume =
            (zone.liquid_volume + zone.net_inflow_rate * dt).clamp(0.0, zone.max_volume);
    }

    fn name(&self) -> &'static str {
        "inflow-balance"
    }
}

/// Built-in accumulation models, selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccumulationStrategy {
    /// [`GravitySlipSettling`] (default)
    #[default]
    GravitySlipSettling,
    /// [`InflowBalance`]
    InflowBalance,
}

impl AccumulationStrategy {
    pub fn create_model(self) -> Box<dyn AccumulationModel> {
        match self {
            AccumulationStrategy::GravitySlipSettling => Box::new(GravitySlipSettling),
            AccumulationStrategy::InflowBalance => Box::new(InflowBalance),
        }
    }
}
