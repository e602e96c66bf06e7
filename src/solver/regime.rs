//! Flow-regime classification of pipe sections.
//!
//! A Froude-number/holdup map, evaluated after every step:
//!
//! | Condition | Regime |
//! |---|---|
//! | α_l < 1e-4 | single-phase gas |
//! | α_g < 1e-4 | single-phase liquid |
//! | α_l ≥ 0.9 | slug body |
//! | θ > 30°, α_g < 0.25 | dispersed bubble |
//! | Fr < 1, α_l > 0.5 | stratified smooth |
//! | Fr < 4, α_l > 0.3 | stratified wavy |
//! | Fr ≥ 4, α_l < 0.1 | annular |
//! | otherwise | intermittent |
//!
//! with `Fr = v_m² / (g D)`.

use crate::mesh::{FlowRegime, PipeSection};
use crate::source::STANDARD_GRAVITY;

/// Regime map thresholds.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegimeClassifier {
    pub g: f64,
    /// Holdup below which a phase counts as absent
    pub single_phase_holdup: f64,
    /// Liquid holdup at and above which a section is a slug body
    pub slug_body_holdup: f64,
    /// Inclination above which low gas holdup is dispersed bubble (rad)
    pub steep_uphill: f64,
    pub dispersed_gas_holdup: f64,
}

impl Default for RegimeClassifier {
    fn default() -> Self {
        Self {
            g: STANDARD_GRAVITY,
            single_phase_holdup: 1e-4,
            slug_body_holdup: 0.9,
            steep_uphill: 30f64.to_radians(),
            dispersed_gas_holdup: 0.25,
        }
    }
}

impl RegimeClassifier {
    /// Mixture Froude number `v_m² / (g D)`.
    pub fn froude(&self, section: &PipeSection) -> f64 {
        let vm = section.mixture_velocity();
        vm * vm / (self.g * section.diameter)
    }

    pub fn classify(&self, section: &PipeSection) -> FlowRegime {
        let al = section.liquid_holdup;
        let ag = section.gas_holdup;

        if al < self.single_phase_holdup {
            return FlowRegime::SinglePhaseGas;
        }
        if ag < self.single_phase_holdup {
            return FlowRegime::SinglePhaseLiquid;
        }
        if al >= self.slug_body_holdup {
            return FlowRegime::SlugBody;
        }
        if section.inclination > self.steep_uphill && ag < self.dispersed_gas_holdup {
            return FlowRegime::DispersedBubble;
        }

        let fr = self.froude(section);
        if fr < 1.0 && al > 0.5 {
            FlowRegime::StratifiedSmooth
        } else if fr < 4.0 && al > 0.3 {
            FlowRegime::StratifiedWavy
        } else if fr >= 4.0 && al < 0.1 {
            FlowRegime::Annular
        } else {
            FlowRegime::Intermittent
        }
    }

    /// Tag every section and refresh its slug-body flag.
    pub fn classify_all(&self, sections: &mut [PipeSection]) {
        for s in sections.iter_mut() {
            s.regime = self.classify(s);
            s.in_slug_body = s.regime == FlowRegime::SlugBody;
        }
    }
}
