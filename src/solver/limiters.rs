//! Flux/slope limiters for MUSCL reconstruction.
//!
//! A limiter maps the ratio of consecutive differences `r` to a slope
//! multiplier `φ(r)`. All limiters here vanish for `r ≤ 0`, which drops the
//! reconstruction to first order at extrema, and satisfy `φ(r) ≤ min(2r, 2)`,
//! which keeps the face values between neighbouring cell averages.
//!
//! # References
//! - Sweby (1984), "High resolution schemes using flux limiters for
//!   hyperbolic conservation laws"
//! - van Leer (1979), "Towards the ultimate conservative difference scheme V"
//! - Roe (1985), superbee; van Albada et al. (1982)

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Slope limiter selected at construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SlopeLimiter {
    /// `min(1, r)`
    Minmod,
    /// `(r + |r|) / (1 + |r|)`
    #[default]
    VanLeer,
    /// `(r² + r) / (r² + 1)`
    VanAlbada,
    /// `max(min(2r, 1), min(r, 2))`
    Superbee,
    /// Monotonized central: `max(0, min(2, 2r, (1 + r) / 2))`
    MonotonizedCentral,
    /// First-order fallback, always 0.
    None,
}

impl SlopeLimiter {
    /// All limiters, in declaration order.
    pub const ALL: [SlopeLimiter; 6] = [
        SlopeLimiter::Minmod,
        SlopeLimiter::VanLeer,
        SlopeLimiter::VanAlbada,
        SlopeLimiter::Superbee,
        SlopeLimiter::MonotonizedCentral,
        SlopeLimiter::None,
    ];

    /// Limiter value `φ(r)`.
    #[inline]
    pub fn evaluate(self, r: f64) -> f64 {
        if r <= 0.0 || r.is_nan() {
            return 0.0;
        }
        match self {
            SlopeLimiter::Minmod => r.min(1.0),
            SlopeLimiter::VanLeer => 2.0 * r / (1.0 + r),
            SlopeLimiter::VanAlbada => (r * r + r) / (r * r + 1.0),
            SlopeLimiter::Superbee => (2.0 * r).min(1.0).max(r.min(2.0)),
            SlopeLimiter::MonotonizedCentral => (2.0 * r).min(0.5 * (1.0 + r)).min(2.0).max(0.0),
            SlopeLimiter::None => 0.0,
        }
    }

    /// Whether the limiter yields second-order reconstruction.
    pub fn is_second_order(self) -> bool {
        !matches!(self, SlopeLimiter::None)
    }

    pub fn name(self) -> &'static str {
        match self {
            SlopeLimiter::Minmod => "minmod",
            SlopeLimiter::VanLeer => "van-leer",
            SlopeLimiter::VanAlbada => "van-albada",
            SlopeLimiter::Superbee => "superbee",
            SlopeLimiter::MonotonizedCentral => "mc",
            SlopeLimiter::None => "none",
        }
    }
}

impl fmt::Display for SlopeLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SlopeLimiter {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();
        match key.as_str() {
            "minmod" => Ok(SlopeLimiter::Minmod),
            "vanleer" => Ok(SlopeLimiter::VanLeer),
            "vanalbada" => Ok(SlopeLimiter::VanAlbada),
            "superbee" => Ok(SlopeLimiter::Superbee),
            "mc" | "monotonizedcentral" => Ok(SlopeLimiter::MonotonizedCentral),
            "none" | "firstorder" => Ok(SlopeLimiter::None),
            _ => Err(ConfigError::UnknownLimiter(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_zero_for_non_positive_ratio() {
        for limiter in SlopeLimiter::ALL {
            for &r in &[-1e10, -3.0, -0.5, -1e-12, 0.0] {
                assert_eq!(limiter.evaluate(r), 0.0, "{} at r={}", limiter, r);
            }
        }
    }

    #[test]
    fn test_unity_at_one() {
        for limiter in [
            SlopeLimiter::Minmod,
            SlopeLimiter::VanLeer,
            SlopeLimiter::VanAlbada,
            SlopeLimiter::Superbee,
            SlopeLimiter::MonotonizedCentral,
        ] {
            assert!((limiter.evaluate(1.0) - 1.0).abs() < TOL, "{}", limiter);
        }
        assert_eq!(SlopeLimiter::None.evaluate(1.0), 0.0);
    }

    #[test]
    fn test_known_values() {
        assert!((SlopeLimiter::Minmod.evaluate(0.5) - 0.5).abs() < TOL);
        assert!((SlopeLimiter::Minmod.evaluate(3.0) - 1.0).abs() < TOL);
        assert!((SlopeLimiter::VanLeer.evaluate(3.0) - 1.5).abs() < TOL);
        assert!((SlopeLimiter::VanAlbada.evaluate(2.0) - 1.2).abs() < TOL);
        assert!((SlopeLimiter::Superbee.evaluate(0.25) - 0.5).abs() < TOL);
        assert!((SlopeLimiter::Superbee.evaluate(1.5) - 1.5).abs() < TOL);
        assert!((SlopeLimiter::Superbee.evaluate(5.0) - 2.0).abs() < TOL);
        assert!((SlopeLimiter::MonotonizedCentral.evaluate(0.2) - 0.4).abs() < TOL);
        assert!((SlopeLimiter::MonotonizedCentral.evaluate(2.0) - 1.5).abs() < TOL);
        assert!((SlopeLimiter::MonotonizedCentral.evaluate(10.0) - 2.0).abs() < TOL);
    }

    #[test]
    fn test_tvd_region() {
        for limiter in SlopeLimiter::ALL {
            for i in 1..400 {
                let r = i as f64 * 0.025;
                let phi = limiter.evaluate(r);
                assert!(phi >= 0.0);
                assert!(phi <= 2.0 * r + TOL, "{} above 2r at {}", limiter, r);
                assert!(phi <= 2.0 + TOL, "{} above 2 at {}", limiter, r);
            }
        }
    }

    #[test]
    fn test_superbee_envelope() {
        for i in 1..400 {
            let r = i as f64 * 0.025;
            let sb = SlopeLimiter::Superbee.evaluate(r);
            assert!(sb >= SlopeLimiter::Minmod.evaluate(r) - TOL);
            assert!(sb >= SlopeLimiter::MonotonizedCentral.evaluate(r).min(1.0) - TOL);
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("minmod".parse::<SlopeLimiter>().unwrap(), SlopeLimiter::Minmod);
        assert_eq!("Van Leer".parse::<SlopeLimiter>().unwrap(), SlopeLimiter::VanLeer);
        assert_eq!("van_albada".parse::<SlopeLimiter>().unwrap(), SlopeLimiter::VanAlbada);
        assert_eq!("MC".parse::<SlopeLimiter>().unwrap(), SlopeLimiter::MonotonizedCentral);
        assert_eq!("none".parse::<SlopeLimiter>().unwrap(), SlopeLimiter::None);
        assert!(matches!(
            "koren".parse::<SlopeLimiter>(),
            Err(ConfigError::UnknownLimiter(name)) if name == "koren"
        ));
        for limiter in SlopeLimiter::ALL {
            assert_eq!(limiter.name().parse::<SlopeLimiter>().unwrap(), limiter);
        }
    }
}
