//! MUSCL reconstruction of face values from cell averages.
//!
//! For the face between cells `i` and `i + 1`:
//!
//! ```text
//! slope_i   = φ(r_i) (u_{i+1} - u_i),        r_i = (u_i - u_{i-1}) / (u_{i+1} - u_i)
//! left      = u_i     + slope_i / 2
//! right     = u_{i+1} - slope_{i+1} / 2
//! ```
//!
//! At the pipe ends the missing neighbour is replaced by the edge cell,
//! which makes the boundary cell's slope vanish.

use super::limiters::SlopeLimiter;

/// Ratio returned when the forward difference vanishes.
pub const RATIO_SENTINEL: f64 = 1e10;

/// Differences below this magnitude count as zero.
pub const DIFFERENCE_EPS: f64 = 1e-12;

/// Values on either side of one face.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReconstructedPair {
    /// Value on the upstream (left) side
    pub left: f64,
    /// Value on the downstream (right) side
    pub right: f64,
}

impl ReconstructedPair {
    /// First-order pair: the two cell averages.
    #[inline]
    pub fn piecewise_constant(left: f64, right: f64) -> Self {
        Self { left, right }
    }
}

/// Ratio of backward to forward difference, `None` when both vanish.
#[inline]
pub fn gradient_ratio(delta_left: f64, delta_center: f64) -> Option<f64> {
    if delta_left.abs() < DIFFERENCE_EPS && delta_center.abs() < DIFFERENCE_EPS {
        return None;
    }
    if delta_center.abs() < DIFFERENCE_EPS {
        return Some(delta_left.signum() * delta_center.signum() * RATIO_SENTINEL);
    }
    Some(delta_left / delta_center)
}

/// Limited slope `φ(r) · delta_center`.
#[inline]
pub fn limited_slope(limiter: SlopeLimiter, delta_left: f64, delta_center: f64) -> f64 {
    match gradient_ratio(delta_left, delta_center) {
        Some(r) => limiter.evaluate(r) * delta_center,
        None => 0.0,
    }
}

/// MUSCL reconstructor bound to one limiter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MusclReconstructor {
    pub limiter: SlopeLimiter,
}

impl MusclReconstructor {
    pub fn new(limiter: SlopeLimiter) -> Self {
        Self { limiter }
    }

    /// Face values between `u_i` and `u_ip1` from the four-cell stencil
    /// `u_im1, u_i, u_ip1, u_ip2`.
    ///
    /// # Example
    /// ```
    /// use pipeflow::solver::{MusclReconstructor, SlopeLimiter};
    ///
    /// let muscl = MusclReconstructor::new(SlopeLimiter::Minmod);
    /// let pair = muscl.reconstruct(1.0, 2.0, 3.0, 4.0);
    /// assert!((pair.left - 2.5).abs() < 1e-12);
    /// assert!((pair.right - 2.5).abs() < 1e-12);
    /// ```
    #[inline]
    pub fn reconstruct(&self, u_im1: f64, u_i: f64, u_ip1: f64, u_ip2: f64) -> ReconstructedPair {
        let slope = limited_slope(self.limiter, u_i - u_im1, u_ip1 - u_i);
        let slope_next = limited_slope(self.limiter, u_ip1 - u_i, u_ip2 - u_ip1);
        ReconstructedPair {
            left: u_i + 0.5 * slope,
            right: u_ip1 - 0.5 * slope_next,
        }
    }

    /// Face values at every interior face of a cell profile.
    ///
    /// Entry `k` is the face between cells `k` and `k + 1`; the result has
    /// `values.len() - 1` entries.
    pub fn reconstruct_profile(&self, values: &[f64]) -> Vec<ReconstructedPair> {
        let n = values.len();
        if n < 2 {
            return Vec::new();
        }
        (0..n - 1)
            .map(|i| {
                let u_im1 = values[i.saturating_sub(1)];
                let u_ip2 = values[(i + 2).min(n - 1)];
                self.reconstruct(u_im1, values[i], values[i + 1], u_ip2)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_gradient_ratio_guards() {
        assert_eq!(gradient_ratio(0.0, 0.0), None);
        assert_eq!(gradient_ratio(1.0, 0.0), Some(RATIO_SENTINEL));
        assert_eq!(gradient_ratio(-1.0, 0.0), Some(-RATIO_SENTINEL));
        assert_eq!(gradient_ratio(1.0, 2.0), Some(0.5));
    }

    #[test]
    fn test_linear_data_reproduced_exactly() {
        let values: Vec<f64> = (0..8).map(|i| 3.0 - 0.7 * i as f64).collect();
        for limiter in SlopeLimiter::ALL.into_iter().filter(|l| l.is_second_order()) {
            let faces = MusclReconstructor::new(limiter).reconstruct_profile(&values);
            // interior faces away from the duplicated edge cells
            for (k, face) in faces.iter().enumerate().take(values.len() - 2).skip(1) {
                let exact = 0.5 * (values[k] + values[k + 1]);
                assert!((face.left - exact).abs() < TOL, "{} left at face {}", limiter, k);
                assert!((face.right - exact).abs() < TOL, "{} right at face {}", limiter, k);
            }
        }
    }

    #[test]
    fn test_no_new_extrema_at_discontinuity() {
        let values = [0.0, 0.0, 0.0, 0.2, 1.0, 1.0, 0.9, 0.9];
        for limiter in [
            SlopeLimiter::Minmod,
            SlopeLimiter::VanLeer,
            SlopeLimiter::MonotonizedCentral,
        ] {
            let faces = MusclReconstructor::new(limiter).reconstruct_profile(&values);
            for (k, face) in faces.iter().enumerate() {
                let lo = values[k].min(values[k + 1]) - TOL;
                let hi = values[k].max(values[k + 1]) + TOL;
                assert!(face.left >= lo && face.left <= hi, "{} left at {}", limiter, k);
                assert!(face.right >= lo && face.right <= hi, "{} right at {}", limiter, k);
            }
        }
    }

    #[test]
    fn test_none_limiter_is_first_order() {
        let muscl = MusclReconstructor::new(SlopeLimiter::None);
        let pair = muscl.reconstruct(0.0, 1.0, 4.0, 9.0);
        assert_eq!(pair, ReconstructedPair::piecewise_constant(1.0, 4.0));
    }

    #[test]
    fn test_flat_data_zero_slope() {
        let muscl = MusclReconstructor::new(SlopeLimiter::Superbee);
        let pair = muscl.reconstruct(2.0, 2.0, 2.0, 2.0);
        assert!((pair.left - 2.0).abs() < TOL);
        assert!((pair.right - 2.0).abs() < TOL);
    }

    #[test]
    fn test_profile_boundaries_duplicate_edge() {
        let values = [1.0, 2.0, 3.0];
        let faces = MusclReconstructor::new(SlopeLimiter::Minmod).reconstruct_profile(&values);
        assert_eq!(faces.len(), 2);
        // edge cell slope vanishes
        assert!((faces[0].left - 1.0).abs() < TOL);
        assert!((faces[1].right - 3.0).abs() < TOL);
        assert!(MusclReconstructor::default().reconstruct_profile(&[1.0]).is_empty());
    }
}
