//! Semi-discrete right-hand side of the two-fluid equations.
//!
//! For cell `i` of length `dx_i`:
//!
//! ```text
//! dU_i/dt = -(F_{i+1/2} - F_{i-1/2}) / dx_i + S_i
//!           + P_i A (α⁻_{i+1/2} - α⁺_{i-1/2}) / dx_i      (momentum, per phase)
//! ```
//!
//! where `α⁻_{i+1/2}` and `α⁺_{i-1/2}` are the holdups reconstructed inside
//! cell `i` at its two faces. Interior faces use MUSCL-reconstructed
//! holdup, velocity and pressure per phase, with face densities extrapolated
//! from the cell state; sound speed and enthalpy stay at the cell values.
//! The boundary faces come from [`BoundaryConditions`] and are first order.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::boundary::{BoundaryConditions, FaceFlux};
use crate::equations::{Phase, face_density};
use crate::error::{SolverError, ThermoError};
use crate::flux::{PhaseFluxScheme, PhaseState};
use crate::mesh::PipeSection;
use crate::solver::{
    BoundaryTotals, ConservedState, MusclReconstructor, PipeSolution, PrimitiveSolver,
    ReconstructedPair, RecoveryContext,
};
use crate::source::SourceTerm;
use crate::types::{CellIndex, FaceIndex};

/// Face values of every reconstructed primitive, one entry per interior face.
struct FaceProfiles {
    pressure: Vec<ReconstructedPair>,
    gas_holdup: Vec<ReconstructedPair>,
    liquid_holdup: Vec<ReconstructedPair>,
    gas_velocity: Vec<ReconstructedPair>,
    liquid_velocity: Vec<ReconstructedPair>,
}

impl FaceProfiles {
    fn new(muscl: &MusclReconstructor, cells: &[PipeSection]) -> Self {
        let profile = |f: fn(&PipeSection) -> f64| {
            let values: Vec<f64> = cells.iter().map(f).collect();
            muscl.reconstruct_profile(&values)
        };
        Self {
            pressure: profile(|s| s.pressure),
            gas_holdup: profile(|s| s.gas_holdup),
            liquid_holdup: profile(|s| s.liquid_holdup),
            gas_velocity: profile(|s| s.gas_velocity),
            liquid_velocity: profile(|s| s.liquid_velocity),
        }
    }

    fn holdup(&self, phase: Phase) -> &[ReconstructedPair] {
        match phase {
            Phase::Gas => &self.gas_holdup,
            Phase::Liquid => &self.liquid_holdup,
        }
    }

    fn velocity(&self, phase: Phase) -> &[ReconstructedPair] {
        match phase {
            Phase::Gas => &self.gas_velocity,
            Phase::Liquid => &self.liquid_velocity,
        }
    }
}

/// Right-hand side evaluator for one step.
pub struct PipeRhs<'a, F: PhaseFluxScheme + ?Sized> {
    pub scheme: &'a F,
    pub reconstructor: MusclReconstructor,
    pub recovery: PrimitiveSolver<'a>,
    pub boundary: &'a BoundaryConditions,
    pub sources: &'a dyn SourceTerm,
    /// Step number reported in errors
    pub step: usize,
}

impl<'a, F: PhaseFluxScheme + ?Sized> PipeRhs<'a, F> {
    /// Recover the primitive state of every cell.
    ///
    /// `guess` supplies geometry, starting pressures and, without the energy
    /// equation, temperatures. Terrain flags and regimes are carried over.
    pub fn primitive_sections(
        &self,
        u: &PipeSolution,
        guess: &[PipeSection],
    ) -> Result<Vec<PipeSection>, SolverError> {
        guess
            .iter()
            .zip(&u.cells)
            .enumerate()
            .map(|(i, (section, state))| {
                let ctx = RecoveryContext {
                    step: self.step,
                    cell: CellIndex::new(i),
                };
                let primitive = self.recovery.recover(ctx, state, section)?;
                let mut out = section.clone();
                primitive.apply_to(&mut out);
                Ok(out)
            })
            .collect()
    }

    /// Time derivative of the conserved state and of the boundary totals.
    pub fn evaluate(
        &self,
        u: &PipeSolution,
        guess: &[PipeSection],
        time: f64,
    ) -> Result<PipeSolution, SolverError> {
        let cells = self.primitive_sections(u, guess)?;
        let n = cells.len();
        if n == 0 {
            return Ok(PipeSolution::zeros(0));
        }
        let profiles = FaceProfiles::new(&self.reconstructor, &cells);
        let faces = self.fluxes(&cells, &profiles)?;

        let mut rhs = PipeSolution::zeros(n);
        for (i, cell) in cells.iter().enumerate() {
            let index = CellIndex::new(i);
            let left = &faces[index.upstream_face()];
            let right = &faces[index.downstream_face()];
            let dx = cell.length;

            let divergence = ConservedState {
                gas_mass: right.gas.mass - left.gas.mass,
                liquid_mass: right.liquid.mass - left.liquid.mass,
                gas_momentum: right.gas.momentum - left.gas.momentum,
                liquid_momentum: right.liquid.momentum - left.liquid.momentum,
                energy: right.gas.energy + right.liquid.energy
                    - left.gas.energy
                    - left.liquid.energy,
            };

            // holdups seen from inside cell i at its two faces
            let inner = |phase: Phase, own: f64| {
                let pairs = profiles.holdup(phase);
                let at_left = if i > 0 { pairs[i - 1].right } else { own };
                let at_right = if i + 1 < n { pairs[i].left } else { own };
                at_right.clamp(0.0, 1.0) - at_left.clamp(0.0, 1.0)
            };
            let pa = cell.pressure * cell.area;
            let nonconservative = ConservedState {
                gas_momentum: pa * inner(Phase::Gas, cell.gas_holdup),
                liquid_momentum: pa * inner(Phase::Liquid, cell.liquid_holdup),
                ..ConservedState::zero()
            };

            let source = self.sources.evaluate(cell, time);
            rhs.cells[i] = (nonconservative - divergence) * (1.0 / dx) + source;
        }

        let inlet = &faces[FaceIndex::new(0)];
        let outlet = &faces[FaceIndex::new(n)];
        rhs.boundary = BoundaryTotals {
            inlet_gas: inlet.gas.mass,
            inlet_liquid: inlet.liquid.mass,
            outlet_gas: outlet.gas.mass,
            outlet_liquid: outlet.liquid.mass,
        };
        Ok(rhs)
    }

    /// Fluxes through all `n + 1` faces, indexed by [`FaceIndex`].
    pub fn face_fluxes(&self, cells: &[PipeSection]) -> Result<Vec<FaceFlux>, SolverError> {
        let profiles = FaceProfiles::new(&self.reconstructor, cells);
        self.fluxes(cells, &profiles)
    }

    fn fluxes(
        &self,
        cells: &[PipeSection],
        profiles: &FaceProfiles,
    ) -> Result<Vec<FaceFlux>, SolverError> {
        let n = cells.len();
        if n == 0 {
            return Ok(Vec::new());
        }
        let thermo = self.recovery.thermo;
        let composition = self.recovery.composition;
        let flash_error = |cell: usize| {
            let step = self.step;
            move |source: ThermoError| SolverError::Flash {
                step,
                cell: CellIndex::new(cell),
                source,
            }
        };

        let inlet = self
            .boundary
            .inlet
            .face_flux(&cells[0], self.scheme, thermo, composition)
            .map_err(flash_error(0))?;
        let outlet = self
            .boundary
            .outlet
            .face_flux(&cells[n - 1], self.scheme, thermo, composition)
            .map_err(flash_error(n - 1))?;

        let interior = |k: usize| self.interior_flux(cells, profiles, k);

        #[cfg(feature = "parallel")]
        let inner: Vec<FaceFlux> = (0..n - 1).into_par_iter().map(interior).collect();
        #[cfg(not(feature = "parallel"))]
        let inner: Vec<FaceFlux> = (0..n - 1).map(interior).collect();

        let mut faces = Vec::with_capacity(n + 1);
        faces.push(inlet);
        faces.extend(inner);
        faces.push(outlet);
        Ok(faces)
    }

    /// Flux through the face between cells `k` and `k + 1`.
    fn interior_flux(&self, cells: &[PipeSection], profiles: &FaceProfiles, k: usize) -> FaceFlux {
        let left = &cells[k];
        let right = &cells[k + 1];
        let area = 0.5 * (left.area + right.area);
        let p = profiles.pressure[k];

        let phase_flux = |phase: Phase| {
            let holdup = profiles.holdup(phase)[k];
            let velocity = profiles.velocity(phase)[k];
            let l = self.face_state(left, phase, p.left, holdup.left, velocity.left);
            let r = self.face_state(right, phase, p.right, holdup.right, velocity.right);
            self.scheme.compute(&l, &r, area)
        };
        FaceFlux {
            gas: phase_flux(Phase::Gas),
            liquid: phase_flux(Phase::Liquid),
        }
    }

    fn face_state(
        &self,
        cell: &PipeSection,
        phase: Phase,
        pressure: f64,
        holdup: f64,
        velocity: f64,
    ) -> PhaseState {
        let state = match phase {
            Phase::Gas => &cell.gas,
            Phase::Liquid => &cell.liquid,
        };
        let exponent = self.recovery.thermo.polytropic_exponent(phase);
        PhaseState::new(
            face_density(state, cell.pressure, pressure, exponent),
            velocity,
            pressure,
            state.sound_speed,
            state.enthalpy,
            holdup.clamp(0.0, 1.0),
        )
    }
}
