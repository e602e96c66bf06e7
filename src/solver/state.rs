//! Conserved variables of the two-fluid model.
//!
//! Per cell and per unit length:
//! - gas mass `α_g ρ_g A`, liquid mass `α_l ρ_l A`
//! - gas momentum `α_g ρ_g v_g A`, liquid momentum `α_l ρ_l v_l A`
//! - mixture enthalpy content `Σ α_k ρ_k h_k A`

use std::ops::{Add, Mul, Sub};

use crate::mesh::PipeSection;

/// Conserved state of one cell (per unit length).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConservedState {
    /// kg/m
    pub gas_mass: f64,
    /// kg/m
    pub liquid_mass: f64,
    /// kg/s
    pub gas_momentum: f64,
    /// kg/s
    pub liquid_momentum: f64,
    /// J/m
    pub energy: f64,
}

impl ConservedState {
    pub fn new(
        gas_mass: f64,
        liquid_mass: f64,
        gas_momentum: f64,
        liquid_momentum: f64,
        energy: f64,
    ) -> Self {
        Self {
            gas_mass,
            liquid_mass,
            gas_momentum,
            liquid_momentum,
            energy,
        }
    }

    /// Conserved state implied by a section's primitive state.
    pub fn from_section(s: &PipeSection) -> Self {
        let mg = s.gas_mass_per_length();
        let ml = s.liquid_mass_per_length();
        Self {
            gas_mass: mg,
            liquid_mass: ml,
            gas_momentum: mg * s.gas_velocity,
            liquid_momentum: ml * s.liquid_velocity,
            energy: mg * s.gas.enthalpy + ml * s.liquid.enthalpy,
        }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self {
            gas_mass: 0.0,
            liquid_mass: 0.0,
            gas_momentum: 0.0,
            liquid_momentum: 0.0,
            energy: 0.0,
        }
    }

    pub fn to_array(self) -> [f64; 5] {
        [
            self.gas_mass,
            self.liquid_mass,
            self.gas_momentum,
            self.liquid_momentum,
            self.energy,
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

impl Add for ConservedState {
    type Output = Self;

    #[inline]
    fn add(self, o: Self) -> Self {
        Self {
            gas_mass: self.gas_mass + o.gas_mass,
            liquid_mass: self.liquid_mass + o.liquid_mass,
            gas_momentum: self.gas_momentum + o.gas_momentum,
            liquid_momentum: self.liquid_momentum + o.liquid_momentum,
            energy: self.energy + o.energy,
        }
    }
}

impl Sub for ConservedState {
    type Output = Self;

    #[inline]
    fn sub(self, o: Self) -> Self {
        Self {
            gas_mass: self.gas_mass - o.gas_mass,
            liquid_mass: self.liquid_mass - o.liquid_mass,
            gas_momentum: self.gas_momentum - o.gas_momentum,
            liquid_momentum: self.liquid_momentum - o.liquid_momentum,
            energy: self.energy - o.energy,
        }
    }
}

impl Mul<f64> for ConservedState {
    type Output = Self;

    #[inline]
    fn mul(self, s: f64) -> Self {
        Self {
            gas_mass: self.gas_mass * s,
            liquid_mass: self.liquid_mass * s,
            gas_momentum: self.gas_momentum * s,
            liquid_momentum: self.liquid_momentum * s,
            energy: self.energy * s,
        }
    }
}

impl Mul<ConservedState> for f64 {
    type Output = ConservedState;

    #[inline]
    fn mul(self, s: ConservedState) -> ConservedState {
        s * self
    }
}

/// Masses that crossed the pipe ends (kg), accumulated over a step.
///
/// Carried alongside the cell states so that multi-stage integrators weight
/// boundary transfers with the same coefficients as the cell updates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundaryTotals {
    pub inlet_gas: f64,
    pub inlet_liquid: f64,
    pub outlet_gas: f64,
    pub outlet_liquid: f64,
}

impl BoundaryTotals {
    /// Liquid mass gained by the domain (kg).
    pub fn net_liquid(&self) -> f64 {
        self.inlet_liquid - self.outlet_liquid
    }

    /// Gas mass gained by the domain (kg).
    pub fn net_gas(&self) -> f64 {
        self.inlet_gas - self.outlet_gas
    }

    pub fn accumulate(&mut self, other: &BoundaryTotals) {
        self.inlet_gas += other.inlet_gas;
        self.inlet_liquid += other.inlet_liquid;
        self.outlet_gas += other.outlet_gas;
        self.outlet_liquid += other.outlet_liquid;
    }
}

/// Integrable solution: one conserved state per cell plus boundary totals.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PipeSolution {
    pub cells: Vec<ConservedState>,
    pub boundary: BoundaryTotals,
}

impl PipeSolution {
    pub fn zeros(n_cells: usize) -> Self {
        Self {
            cells: vec![ConservedState::zero(); n_cells],
            boundary: BoundaryTotals::default(),
        }
    }

    pub fn from_sections(sections: &[PipeSection]) -> Self {
        Self {
            cells: sections.iter().map(ConservedState::from_section).collect(),
            boundary: BoundaryTotals::default(),
        }
    }

    #[inline]
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// self <- c * self
    pub fn scale(&mut self, c: f64) {
        for s in &mut self.cells {
            *s = *s * c;
        }
        let b = &mut self.boundary;
        b.inlet_gas *= c;
        b.inlet_liquid *= c;
        b.outlet_gas *= c;
        b.outlet_liquid *= c;
    }

    /// self <- self + c * other
    pub fn axpy(&mut self, c: f64, other: &PipeSolution) {
        debug_assert_eq!(self.cells.len(), other.cells.len());
        for (s, o) in self.cells.iter_mut().zip(&other.cells) {
            *s = *s + c * *o;
        }
        let b = &mut self.boundary;
        b.inlet_gas += c * other.boundary.inlet_gas;
        b.inlet_liquid += c * other.boundary.inlet_liquid;
        b.outlet_gas += c * other.boundary.outlet_gas;
        b.outlet_liquid += c * other.boundary.outlet_liquid;
    }

    /// Total liquid mass (kg) given the cell lengths.
    pub fn liquid_mass(&self, lengths: impl IntoIterator<Item = f64>) -> f64 {
        self.cells
            .iter()
            .zip(lengths)
            .map(|(s, dx)| s.liquid_mass * dx)
            .sum()
    }

    /// Total gas mass (kg) given the cell lengths.
    pub fn gas_mass(&self, lengths: impl IntoIterator<Item = f64>) -> f64 {
        self.cells
            .iter()
            .zip(lengths)
            .map(|(s, dx)| s.gas_mass * dx)
            .sum()
    }
}
