use crate::{HcError, HcResult};

/// Absolute/relative comparison tolerances.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: f64, b: f64, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: f64, what: &'static str) -> HcResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(HcError::NonFinite { what, value: v })
    }
}

/// Clamp a quantity that has no physical meaning below zero.
///
/// NaN passes through untouched.
#[inline]
pub fn clamp_non_negative(v: f64) -> f64 {
    if v < 0.0 { 0.0 } else { v }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(f64::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn clamp_non_negative_basic() {
        assert_eq!(clamp_non_negative(-0.5), 0.0);
        assert_eq!(clamp_non_negative(0.25), 0.25);
        assert!(clamp_non_negative(f64::NAN).is_nan());
    }
}
