//! Pipeline discretisation.
//!
//! A pipeline is an ordered run of [`PipeSection`] cells built from
//! topology tuples. Cell `i` has neighbours `i - 1` and `i + 1`; the first
//! cell touches the inlet and the last cell the outlet.

use crate::error::ConfigError;
use crate::mesh::{PipeSection, PipeSegment};

/// Boundary face of a pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryFace {
    Inlet,
    Outlet,
}

/// Ordered pipe sections with their face positions.
#[derive(Clone, Debug)]
pub struct Pipeline {
    pub sections: Vec<PipeSection>,
    /// Along-pipe face positions, `sections.len() + 1` entries
    pub vertices: Vec<f64>,
    /// Elevation at the inlet face (m)
    pub inlet_elevation: f64,
}

impl Pipeline {
    /// Build sections from topology tuples.
    ///
    /// Each tuple is validated: length and diameter must be positive and
    /// finite, the elevation change cannot exceed the length, roughness must
    /// be non-negative.
    pub fn from_segments(segments: &[PipeSegment], inlet_elevation: f64) -> Result<Self, ConfigError> {
        if segments.is_empty() {
            return Err(ConfigError::EmptyPipeline);
        }

        let mut sections = Vec::with_capacity(segments.len());
        let mut vertices = Vec::with_capacity(segments.len() + 1);
        let mut position = 0.0;
        let mut face_elevation = inlet_elevation;
        vertices.push(position);

        for (i, seg) in segments.iter().enumerate() {
            validate_segment(i, seg)?;
            let center_elevation = face_elevation + 0.5 * seg.elevation_change;
            sections.push(PipeSection::new(position, center_elevation, seg));
            position += seg.length;
            face_elevation += seg.elevation_change;
            vertices.push(position);
        }

        let mut pipeline = Self {
            sections,
            vertices,
            inlet_elevation,
        };
        pipeline.flag_extrema();
        Ok(pipeline)
    }

    /// Horizontal pipeline of `n` equal sections.
    pub fn horizontal(
        n: usize,
        total_length: f64,
        diameter: f64,
        roughness: f64,
    ) -> Result<Self, ConfigError> {
        if n == 0 {
            return Err(ConfigError::EmptyPipeline);
        }
        let seg = PipeSegment::horizontal(total_length / n as f64, diameter, roughness);
        Self::from_segments(&vec![seg; n], 0.0)
    }

    /// Equal-length sections following a profile of face elevations.
    ///
    /// `face_elevations` has one more entry than the number of sections.
    pub fn from_elevation_profile(
        face_elevations: &[f64],
        section_length: f64,
        diameter: f64,
        roughness: f64,
    ) -> Result<Self, ConfigError> {
        if face_elevations.len() < 2 {
            return Err(ConfigError::EmptyPipeline);
        }
        let segments: Vec<PipeSegment> = face_elevations
            .windows(2)
            .map(|w| PipeSegment::new(section_length, diameter, w[1] - w[0], roughness))
            .collect();
        Self::from_segments(&segments, face_elevations[0])
    }

    #[inline]
    pub fn n_sections(&self) -> usize {
        self.sections.len()
    }

    pub fn total_length(&self) -> f64 {
        self.vertices.last().copied().unwrap_or(0.0)
    }

    /// Shortest section length (m).
    pub fn min_length(&self) -> f64 {
        self.sections
            .iter()
            .map(|s| s.length)
            .fold(f64::INFINITY, f64::min)
    }

    /// Neighbours `(upstream, downstream)` of section `i`.
    pub fn neighbors(&self, i: usize) -> (Option<usize>, Option<usize>) {
        let up = i.checked_sub(1);
        let down = (i + 1 < self.sections.len()).then_some(i + 1);
        (up, down)
    }

    /// Boundary touched by section `i`, if any. A single-section pipeline
    /// reports the inlet.
    pub fn boundary_of(&self, i: usize) -> Option<BoundaryFace> {
        if i == 0 {
            Some(BoundaryFace::Inlet)
        } else if i + 1 == self.sections.len() {
            Some(BoundaryFace::Outlet)
        } else {
            None
        }
    }

    pub fn elevation_profile(&self) -> Vec<f64> {
        self.sections.iter().map(|s| s.elevation).collect()
    }

    pub fn holdup_profile(&self) -> Vec<f64> {
        self.sections.iter().map(|s| s.liquid_holdup).collect()
    }

    pub fn pressure_profile(&self) -> Vec<f64> {
        self.sections.iter().map(|s| s.pressure).collect()
    }

    /// Total liquid volume in the pipeline (m³).
    pub fn liquid_volume(&self) -> f64 {
        self.sections.iter().map(PipeSection::liquid_volume).sum()
    }

    fn flag_extrema(&mut self) {
        let elev = self.elevation_profile();
        for (i, section) in self.sections.iter_mut().enumerate() {
            section.is_low_point = is_local_minimum(&elev, i);
            section.is_high_point = is_local_maximum(&elev, i);
        }
    }
}

/// Whether interior section `i` sits no higher than both neighbours and
/// strictly lower than at least one.
pub fn is_local_minimum(elevations: &[f64], i: usize) -> bool {
    if i == 0 || i + 1 >= elevations.len() {
        return false;
    }
    let (prev, curr, next) = (elevations[i - 1], elevations[i], elevations[i + 1]);
    curr <= prev && curr <= next && (curr < prev || curr < next)
}

/// Whether interior section `i` sits no lower than both neighbours and
/// strictly higher than at least one.
pub fn is_local_maximum(elevations: &[f64], i: usize) -> bool {
    if i == 0 || i + 1 >= elevations.len() {
        return false;
    }
    let (prev, curr, next) = (elevations[i - 1], elevations[i], elevations[i + 1]);
    curr >= prev && curr >= next && (curr > prev || curr > next)
}

fn validate_segment(i: usize, seg: &PipeSegment) -> Result<(), ConfigError> {
    let invalid = |field, value| ConfigError::InvalidGeometry {
        section: i,
        field,
        value,
    };
    if !seg.length.is_finite() || seg.length <= 0.0 {
        return Err(invalid("length", seg.length));
    }
    if !seg.diameter.is_finite() || seg.diameter <= 0.0 {
        return Err(invalid("diameter", seg.diameter));
    }
    if !seg.elevation_change.is_finite() || seg.elevation_change.abs() > seg.length {
        return Err(invalid("elevation_change", seg.elevation_change));
    }
    if !seg.roughness.is_finite() || seg.roughness < 0.0 {
        return Err(invalid("roughness", seg.roughness));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_horizontal_pipeline() {
        let p = Pipeline::horizontal(10, 1000.0, 0.2, 1e-5).unwrap();
        assert_eq!(p.n_sections(), 10);
        assert_eq!(p.vertices.len(), 11);
        assert!((p.total_length() - 1000.0).abs() < TOL);
        assert!((p.min_length() - 100.0).abs() < TOL);
        assert!(p.sections.iter().all(|s| s.inclination == 0.0));
        assert!(p.sections.iter().all(|s| !s.is_low_point && !s.is_high_point));
    }

    #[test]
    fn test_center_elevations() {
        let p = Pipeline::from_elevation_profile(&[0.0, -2.0, -4.0, -2.0], 10.0, 0.1, 0.0).unwrap();
        let e = p.elevation_profile();
        assert!((e[0] + 1.0).abs() < TOL);
        assert!((e[1] + 3.0).abs() < TOL);
        assert!((e[2] + 3.0).abs() < TOL);
        assert!(p.sections[0].inclination < 0.0);
        assert!(p.sections[2].inclination > 0.0);
    }

    #[test]
    fn test_low_and_high_point_flags() {
        let p = Pipeline::from_elevation_profile(&[0.0, -1.0, 0.0, 1.0, 0.0], 10.0, 0.1, 0.0).unwrap();
        // centers: -0.5, -0.5, 0.5, 0.5
        assert!(!p.sections[0].is_low_point);
        assert!(p.sections[1].is_low_point);
        assert!(p.sections[2].is_high_point);

        let v = [3.0, 1.0, 2.0];
        assert!(is_local_minimum(&v, 1));
        let flat = [1.0, 1.0, 1.0];
        assert!(!is_local_minimum(&flat, 1));
        assert!(!is_local_maximum(&flat, 1));
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let bad = [PipeSegment::new(10.0, 0.0, 0.0, 0.0)];
        assert!(matches!(
            Pipeline::from_segments(&bad, 0.0),
            Err(ConfigError::InvalidGeometry { field: "diameter", .. })
        ));
        let bad = [PipeSegment::new(-1.0, 0.1, 0.0, 0.0)];
        assert!(matches!(
            Pipeline::from_segments(&bad, 0.0),
            Err(ConfigError::InvalidGeometry { field: "length", .. })
        ));
        let bad = [PipeSegment::new(1.0, 0.1, 2.0, 0.0)];
        assert!(Pipeline::from_segments(&bad, 0.0).is_err());
        assert!(matches!(
            Pipeline::from_segments(&[], 0.0),
            Err(ConfigError::EmptyPipeline)
        ));
    }

    #[test]
    fn test_neighbors_and_boundaries() {
        let p = Pipeline::horizontal(3, 30.0, 0.1, 0.0).unwrap();
        assert_eq!(p.neighbors(0), (None, Some(1)));
        assert_eq!(p.neighbors(2), (Some(1), None));
        assert_eq!(p.boundary_of(0), Some(BoundaryFace::Inlet));
        assert_eq!(p.boundary_of(1), None);
        assert_eq!(p.boundary_of(2), Some(BoundaryFace::Outlet));
    }
}
