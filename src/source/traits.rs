//! Source term trait and composition.

use crate::mesh::PipeSection;
use crate::solver::ConservedState;

/// Trait for source terms of the two-fluid equations.
///
/// Source terms modify the RHS of the cell equations:
/// dU/dt = -(F_{i+1/2} - F_{i-1/2}) / dx + S(section, t)
///
/// Contributions are per unit pipe length, in the units of
/// [`ConservedState`] per second.
pub trait SourceTerm: Send + Sync {
    /// Source contribution of one section.
    ///
    /// # Arguments
    /// * `section` - Primitive state and geometry of the cell
    /// * `time` - Current time (s)
    fn evaluate(&self, section: &PipeSection, time: f64) -> ConservedState;

    /// Name of this source term for debugging.
    fn name(&self) -> &'static str;
}

/// Combine multiple source terms.
pub struct CombinedSource<'a> {
    sources: Vec<&'a dyn SourceTerm>,
}

impl<'a> CombinedSource<'a> {
    pub fn new(sources: Vec<&'a dyn SourceTerm>) -> Self {
        Self { sources }
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl<'a> SourceTerm for CombinedSource<'a> {
    fn evaluate(&self, section: &PipeSection, time: f64) -> ConservedState {
        self.sources
            .iter()
            .fold(ConservedState::zero(), |acc, s| acc + s.evaluate(section, time))
    }

    fn name(&self) -> &'static str {
        "combined"
    }
}
