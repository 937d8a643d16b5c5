//! Scalar predicates shared by all geometry types.
//!
//! Every sign decision the decomposition depends on (orientation of a point
//! triple, half-plane classification, axis alignment) routes through the
//! helpers here so the comparison tolerance lives in exactly one place.

/// Tolerance for sign predicates on coordinates and cross products.
pub const EPS: f64 = 1e-9;

/// Sign of a scalar under the global tolerance: -1, 0 or +1.
#[inline]
pub fn sign(x: f64) -> i8 {
    if x > EPS {
        1
    } else if x < -EPS {
        -1
    } else {
        0
    }
}

/// True if `x` is zero under the global tolerance.
#[inline]
pub fn approx_zero(x: f64) -> bool {
    x.abs() <= EPS
}

/// True if `a` and `b` are equal under the global tolerance.
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPS
}

/// Normalize an angle in radians to the range [0, 2π).
#[inline]
pub fn normalize_angle(a: f64) -> f64 {
    let two_pi = 2.0 * std::f64::consts::PI;
    let mut r = a % two_pi;
    if r < 0.0 {
        r += two_pi;
    }
    r
}

/// Arc cosine with the argument clamped to the valid domain.
///
/// Dot products of normalized vectors drift slightly outside [-1, 1]; a raw
/// `acos` would return NaN there.
#[inline]
pub fn safe_acos(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sign() {
        assert_eq!(sign(1.0), 1);
        assert_eq!(sign(-1.0), -1);
        assert_eq!(sign(0.0), 0);
        assert_eq!(sign(EPS / 2.0), 0);
        assert_eq!(sign(-EPS / 2.0), 0);
    }

    #[test]
    fn test_normalize_angle() {
        use std::f64::consts::PI;
        assert_relative_eq!(normalize_angle(0.0), 0.0);
        assert_relative_eq!(normalize_angle(-PI / 2.0), 1.5 * PI);
        assert_relative_eq!(normalize_angle(2.5 * PI), 0.5 * PI);
    }

    #[test]
    fn test_safe_acos_clamps() {
        assert!(safe_acos(1.0 + 1e-12).is_finite());
        assert!(safe_acos(-1.0 - 1e-12).is_finite());
    }
}
