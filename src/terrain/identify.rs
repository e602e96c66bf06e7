//! Zone identification from the static elevation profile.
//!
//! Low points are interior sections no higher than both neighbours and
//! strictly lower than one. Each grows upstream over downhill sections and
//! downstream over uphill sections. Riser bases are transitions from a
//! near-horizontal section to a steep riser and always span two sections.
//! Zones are registered in that order: low points along the profile, then
//! riser bases.

use crate::error::ConfigError;
use crate::mesh::{PipeSection, is_local_minimum};
use crate::terrain::{AccumulationZone, TrackerConfig, ZoneKind};
use crate::types::ZoneIndex;

/// Find the accumulation zones of a pipeline.
pub fn identify_zones(sections: &[PipeSection], config: &TrackerConfig) -> Vec<AccumulationZone> {
    let n = sections.len();
    let elevations: Vec<f64> = sections.iter().map(|s| s.elevation).collect();
    let mut zones: Vec<AccumulationZone> = Vec::new();
    let covered = |zones: &[AccumulationZone], i: usize| zones.iter().any(|z| z.contains(i));

    for i in 1..n.saturating_sub(1) {
        if !is_local_minimum(&elevations, i) || covered(&zones, i) {
            continue;
        }
        let mut start = i;
        while start > 0 && sections[start - 1].inclination < 0.0 {
            start -= 1;
        }
        let mut end = i;
        while end + 1 < n && sections[end + 1].inclination > 0.0 {
            end += 1;
        }
        let index = ZoneIndex::new(zones.len());
        let members = (start..=end).collect();
        zones.push(AccumulationZone::new(index, ZoneKind::LowPoint, members, sections, 1.0));
    }

    for i in 1..n {
        let base = sections[i - 1].inclination < config.riser_base_low_angle;
        let riser = sections[i].inclination > config.riser_base_high_angle;
        if base && riser && !covered(&zones, i - 1) && !covered(&zones, i) {
            let index = ZoneIndex::new(zones.len());
            zones.push(AccumulationZone::new(
                index,
                ZoneKind::RiserBase,
                vec![i - 1, i],
                sections,
                1.0,
            ));
        }
    }
    zones
}

/// Check that every zone covers consecutive sections inside the pipeline.
pub fn validate_zones(zones: &[AccumulationZone], n_sections: usize) -> Result<(), ConfigError> {
    for zone in zones {
        let malformed = |section| ConfigError::MalformedTopology {
            zone: zone.index,
            section,
            n_sections,
        };
        for (k, &section) in zone.sections.iter().enumerate() {
            if section >= n_sections {
                return Err(malformed(section));
            }
            if k > 0 && section != zone.sections[k - 1] + 1 {
                return Err(malformed(section));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Pipeline;

    fn profile(faces: &[f64]) -> Vec<PipeSection> {
        Pipeline::from_elevation_profile(faces, 20.0, 0.2, 0.0)
            .unwrap()
            .sections
    }

    #[test]
    fn test_v_shape_is_one_zone() {
        // 3 sections down, 3 up
        let sections = profile(&[0.0, -2.0, -4.0, -6.0, -4.0, -2.0, 0.0]);
        let zones = identify_zones(&sections, &TrackerConfig::default());
        assert_eq!(zones.len(), 1);
        let zone = &zones[0];
        assert_eq!(zone.kind, ZoneKind::LowPoint);
        assert_eq!(zone.sections, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(zone.length(), 120.0);
        assert!(validate_zones(&zones, sections.len()).is_ok());
    }

    #[test]
    fn test_v_shape_with_horizontal_ends() {
        let sections = profile(&[0.0, 0.0, -2.0, -4.0, -2.0, 0.0, 0.0]);
        let zones = identify_zones(&sections, &TrackerConfig::default());
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].sections, vec![1, 2, 3, 4]);
        assert_eq!(zones[0].start_position, 20.0);
        assert_eq!(zones[0].end_position, 100.0);
    }

    #[test]
    fn test_two_low_points_in_profile_order() {
        let sections = profile(&[0.0, -1.0, -2.0, -1.0, 0.0, -1.0, -2.0, -1.0, 0.0]);
        let zones = identify_zones(&sections, &TrackerConfig::default());
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].index, ZoneIndex::new(0));
        assert!(zones[0].sections.iter().all(|&i| i < 4));
        assert!(zones[1].sections.iter().all(|&i| i >= 4));
    }

    #[test]
    fn test_riser_base() {
        // gentle rise into a 60° riser
        let sections = profile(&[0.0, 0.5, 1.0, 1.5, 2.0, 19.32, 36.64]);
        let zones = identify_zones(&sections, &TrackerConfig::default());
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].kind, ZoneKind::RiserBase);
        assert_eq!(zones[0].sections, vec![3, 4]);
        assert!((zones[0].max_volume - sections[3].volume() - sections[4].volume()).abs() < 1e-12);
    }

    #[test]
    fn test_flat_run_into_riser_is_low_point() {
        // the last flat section sits below the riser and level with its
        // upstream neighbour, so the riser base joins a low-point zone
        let sections = profile(&[0.0, 0.0, 0.0, 0.0, 0.0, 17.32, 34.64]);
        let zones = identify_zones(&sections, &TrackerConfig::default());
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].kind, ZoneKind::LowPoint);
        assert_eq!(zones[0].sections, vec![3, 4, 5]);
    }

    #[test]
    fn test_flat_pipe_has_no_zones() {
        let sections = profile(&[0.0; 6]);
        assert!(identify_zones(&sections, &TrackerConfig::default()).is_empty());
    }

    #[test]
    fn test_malformed_topology() {
        let sections = profile(&[0.0, -2.0, -4.0, -2.0, 0.0]);
        let mut zones = identify_zones(&sections, &TrackerConfig::default());
        zones[0].sections.push(9);
        assert!(matches!(
            validate_zones(&zones, sections.len()),
            Err(ConfigError::MalformedTopology { section: 9, n_sections: 4, .. })
        ));
        zones[0].sections = vec![0, 2];
        assert!(validate_zones(&zones, sections.len()).is_err());
    }
}
