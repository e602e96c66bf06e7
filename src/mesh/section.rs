//! Pipe sections: the finite-volume cells of a pipeline.

use std::f64::consts::PI;
use std::fmt;

use crate::equations::FluidState;

/// Holdup below which a phase is treated as absent.
pub const MIN_PHASE_HOLDUP: f64 = 1e-8;

/// One `(length, diameter, elevation_change, roughness)` topology tuple.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipeSegment {
    /// Along-pipe length (m)
    pub length: f64,
    /// Inner diameter (m)
    pub diameter: f64,
    /// Outlet minus inlet elevation (m)
    pub elevation_change: f64,
    /// Absolute wall roughness (m)
    pub roughness: f64,
}

impl PipeSegment {
    pub fn new(length: f64, diameter: f64, elevation_change: f64, roughness: f64) -> Self {
        Self {
            length,
            diameter,
            elevation_change,
            roughness,
        }
    }

    /// Horizontal segment.
    pub fn horizontal(length: f64, diameter: f64, roughness: f64) -> Self {
        Self::new(length, diameter, 0.0, roughness)
    }
}

/// Flow pattern tag of a section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlowRegime {
    #[default]
    SinglePhaseGas,
    SinglePhaseLiquid,
    StratifiedSmooth,
    StratifiedWavy,
    Intermittent,
    /// Liquid slug body bridging the pipe.
    SlugBody,
    Annular,
    DispersedBubble,
}

impl fmt::Display for FlowRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SinglePhaseGas => "single-phase gas",
            Self::SinglePhaseLiquid => "single-phase liquid",
            Self::StratifiedSmooth => "stratified smooth",
            Self::StratifiedWavy => "stratified wavy",
            Self::Intermittent => "intermittent",
            Self::SlugBody => "slug body",
            Self::Annular => "annular",
            Self::DispersedBubble => "dispersed bubble",
        };
        write!(f, "{}", name)
    }
}

/// Geometry and flow state of one cell.
///
/// Geometry is fixed at construction; the flow state is rewritten by the
/// flux update and by terrain redistribution every step.
#[derive(Clone, Debug, PartialEq)]
pub struct PipeSection {
    /// Along-pipe position of the upstream face (m)
    pub position: f64,
    pub length: f64,
    pub diameter: f64,
    pub roughness: f64,
    /// Elevation at the cell center (m)
    pub elevation: f64,
    /// Inclination from horizontal, positive uphill (rad)
    pub inclination: f64,
    /// Flow area (m²)
    pub area: f64,

    pub gas_holdup: f64,
    pub liquid_holdup: f64,
    pub gas_velocity: f64,
    pub liquid_velocity: f64,
    /// Mixture pressure (Pa)
    pub pressure: f64,
    /// Temperature (K)
    pub temperature: f64,
    /// Gas properties at the section pressure and temperature
    pub gas: FluidState,
    /// Liquid properties at the section pressure and temperature
    pub liquid: FluidState,

    pub regime: FlowRegime,
    pub is_low_point: bool,
    pub is_high_point: bool,
    pub in_slug_body: bool,
    /// Liquid added by terrain redistribution in the last step (m³)
    pub accumulated_liquid_volume: f64,
}

impl PipeSection {
    /// Section built from a topology tuple, filled with gas at rest.
    pub fn new(position: f64, elevation: f64, segment: &PipeSegment) -> Self {
        let ratio = (segment.elevation_change / segment.length).clamp(-1.0, 1.0);
        Self {
            position,
            length: segment.length,
            diameter: segment.diameter,
            roughness: segment.roughness,
            elevation,
            inclination: ratio.asin(),
            area: 0.25 * PI * segment.diameter * segment.diameter,
            gas_holdup: 1.0,
            liquid_holdup: 0.0,
            gas_velocity: 0.0,
            liquid_velocity: 0.0,
            pressure: 0.0,
            temperature: 0.0,
            gas: FluidState::default(),
            liquid: FluidState::default(),
            regime: FlowRegime::default(),
            is_low_point: false,
            is_high_point: false,
            in_slug_body: false,
            accumulated_liquid_volume: 0.0,
        }
    }

    /// Cell volume (m³).
    #[inline]
    pub fn volume(&self) -> f64 {
        self.area * self.length
    }

    /// Along-pipe position of the downstream face (m).
    #[inline]
    pub fn end_position(&self) -> f64 {
        self.position + self.length
    }

    /// Set the liquid holdup and the complementary gas holdup.
    pub fn set_liquid_holdup(&mut self, liquid_holdup: f64) {
        self.liquid_holdup = liquid_holdup;
        self.gas_holdup = 1.0 - liquid_holdup;
    }

    /// Deviation of the holdup sum from one.
    #[inline]
    pub fn holdup_error(&self) -> f64 {
        (self.gas_holdup + self.liquid_holdup - 1.0).abs()
    }

    pub fn superficial_gas_velocity(&self) -> f64 {
        self.gas_holdup * self.gas_velocity
    }

    pub fn superficial_liquid_velocity(&self) -> f64 {
        self.liquid_holdup * self.liquid_velocity
    }

    /// Volumetric mixture velocity (m/s).
    pub fn mixture_velocity(&self) -> f64 {
        self.superficial_gas_velocity() + self.superficial_liquid_velocity()
    }

    pub fn mixture_density(&self) -> f64 {
        self.gas_holdup * self.gas.density + self.liquid_holdup * self.liquid.density
    }

    /// Gas slip over liquid (m/s).
    pub fn slip_velocity(&self) -> f64 {
        self.gas_velocity - self.liquid_velocity
    }

    /// Liquid volume held in the cell (m³).
    pub fn liquid_volume(&self) -> f64 {
        self.liquid_holdup * self.volume()
    }

    /// Gas mass per unit length (kg/m).
    pub fn gas_mass_per_length(&self) -> f64 {
        self.gas_holdup * self.gas.density * self.area
    }

    /// Liquid mass per unit length (kg/m).
    pub fn liquid_mass_per_length(&self) -> f64 {
        self.liquid_holdup * self.liquid.density * self.area
    }

    /// Fastest characteristic speed over the phases present (m/s).
    pub fn max_wave_speed(&self) -> f64 {
        let mut s: f64 = 0.0;
        if self.gas_holdup > MIN_PHASE_HOLDUP {
            s = s.max(self.gas_velocity.abs() + self.gas.sound_speed);
        }
        if self.liquid_holdup > MIN_PHASE_HOLDUP {
            s = s.max(self.liquid_velocity.abs() + self.liquid.sound_speed);
        }
        s
    }
}
