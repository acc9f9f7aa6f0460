//! Angle normalization.
//!
//! `tan` diverges at 90° and flips sign every quadrant, so the rasterizer
//! works with a bounded surrogate instead: inside every 45° half-quadrant it
//! follows `tan` from 0 to 1, and in the upper half it is mirrored as
//! `1 - tan` so both halves meet at 1 on the 45° boundary and fall back to 0
//! at every multiple of 90°.

use super::{ensure_finite, GeometryError};

/// Classification of an angle inside its quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quadrant {
    /// `floor(angle / 90) mod 2 == 1`: quadrant one or three, geometry is rotated.
    pub odd_quarter: bool,
    /// `(angle mod 90) >= 45`: the companion axis is stepped, not the driving one.
    pub upper_half: bool,
}

impl Quadrant {
    pub fn of(angle: f64) -> Self {
        Self {
            odd_quarter: (angle / 90.0).floor().rem_euclid(2.0) >= 1.0,
            upper_half: angle.rem_euclid(90.0) >= 45.0,
        }
    }
}

/// Continuous replacement for `tan(angle)`, always in `[0, 1]`.
///
/// The boundary at `angle mod 90 == 45` belongs to the upper half, so
/// `continuous_tan(45.0)` is `1 - tan(0°) = 1.0` exactly.
///
/// The angle must be finite; NaN and infinities propagate as NaN.
pub fn continuous_tan(angle: f64) -> f64 {
    let small = angle.rem_euclid(45.0);
    let raw = small.to_radians().tan();
    if Quadrant::of(angle).upper_half {
        1.0 - raw
    } else {
        raw
    }
}

/// An angle after the reference offset has been removed, with everything the
/// rasterizer needs derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedAngle {
    pub degrees: f64,
    pub quadrant: Quadrant,
    pub tan: f64,
}

impl NormalizedAngle {
    /// `reference` is subtracted before any modulo is taken.
    pub fn new(angle: f64, reference: f64) -> Result<Self, GeometryError> {
        let degrees = ensure_finite(ensure_finite(angle)? - ensure_finite(reference)?)?;
        Ok(Self {
            degrees,
            quadrant: Quadrant::of(degrees),
            tan: continuous_tan(degrees),
        })
    }

    pub fn absolute(angle: f64) -> Result<Self, GeometryError> {
        Self::new(angle, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn zero_at_quadrant_edges() {
        for angle in [0.0, 90.0, 180.0, 270.0, 360.0, -90.0, 720.0] {
            assert!(continuous_tan(angle).abs() < EPS, "angle {angle}");
        }
    }

    #[test]
    fn exact_45_takes_the_upper_branch() {
        let q = Quadrant::of(45.0);
        assert!(q.upper_half);
        assert!(!q.odd_quarter);
        assert_eq!(continuous_tan(45.0), 1.0);
        assert_eq!(continuous_tan(135.0), 1.0);
        assert_eq!(continuous_tan(-45.0), 1.0);
    }

    #[test]
    fn follows_tan_in_the_lower_half() {
        let expected = 30f64.to_radians().tan();
        assert!((continuous_tan(30.0) - expected).abs() < EPS);
        assert!((continuous_tan(120.0) - expected).abs() < EPS);
    }

    #[test]
    fn mirrors_tan_in_the_upper_half() {
        let expected = 1.0 - 15f64.to_radians().tan();
        assert!((continuous_tan(60.0) - expected).abs() < EPS);
        assert!((continuous_tan(240.0) - expected).abs() < EPS);
    }

    #[test]
    fn stays_bounded_and_continuous() {
        let mut previous = continuous_tan(-720.0);
        for step in -7200..=7200 {
            let value = continuous_tan(step as f64 / 10.0);
            assert!((0.0..=1.0).contains(&value), "step {step}: {value}");
            // 0.1° never moves the surrogate by more than a few thousandths
            assert!((value - previous).abs() < 0.01, "jump at step {step}");
            previous = value;
        }
    }

    #[test]
    fn negative_angles_match_their_positive_equivalent() {
        for angle in [-10.0, -45.0, -95.5, -300.0] {
            assert!((continuous_tan(angle) - continuous_tan(angle + 360.0)).abs() < 1e-9);
            assert_eq!(Quadrant::of(angle), Quadrant::of(angle + 360.0));
        }
    }

    #[test]
    fn odd_quarters() {
        assert!(!Quadrant::of(10.0).odd_quarter);
        assert!(Quadrant::of(90.0).odd_quarter);
        assert!(Quadrant::of(100.0).odd_quarter);
        assert!(!Quadrant::of(180.0).odd_quarter);
        assert!(Quadrant::of(-10.0).odd_quarter);
    }

    #[test]
    fn reference_is_removed_before_normalizing() {
        let n = NormalizedAngle::new(370.0, 30.0).unwrap();
        assert_eq!(n.degrees, 340.0);
        assert_eq!(n.quadrant, Quadrant::of(340.0));
    }

    #[test]
    fn non_finite_input_is_rejected() {
        assert!(matches!(
            NormalizedAngle::absolute(f64::NAN),
            Err(GeometryError::NonFiniteAngle(_))
        ));
        assert!(NormalizedAngle::new(10.0, f64::INFINITY).is_err());
    }
}
