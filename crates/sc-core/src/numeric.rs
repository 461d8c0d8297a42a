//! Float helpers shared by the store and the models.

use crate::CoreError;

/// Absolute tolerance below which two values are always equal.
pub const ABS_TOL: f64 = 1e-12;
/// Relative tolerance used by [`approx_eq`].
pub const REL_TOL: f64 = 1e-9;

/// `|a - b| <= max(abs_tol, rel_tol * max(|a|, |b|))`.
pub fn approx_eq_with(a: f64, b: f64, abs_tol: f64, rel_tol: f64) -> bool {
    let diff = (a - b).abs();
    diff <= abs_tol || diff <= rel_tol * a.abs().max(b.abs())
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    approx_eq_with(a, b, ABS_TOL, REL_TOL)
}

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Clamp a factor into `[0, 1]`. NaN collapses to 0.
pub fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Clamp to non-negative. NaN collapses to 0.
pub fn non_negative(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.max(0.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_eq_mixes_abs_and_rel() {
        assert!(approx_eq(1.0, 1.0 + 1e-12));
        assert!(approx_eq(0.0, 1e-13));
        assert!(approx_eq(3.6e6, 3.6e6 + 1e-4));
        assert!(!approx_eq(1.0, 1.0 + 1e-6));
        assert!(approx_eq_with(100.0, 100.5, 1.0, 0.0));
    }

    #[test]
    fn ensure_finite_names_the_value() {
        let err = ensure_finite(f64::NAN, "drag power").unwrap_err();
        assert!(err.to_string().contains("drag power"));
        assert_eq!(ensure_finite(2.5, "x").unwrap(), 2.5);
    }

    #[test]
    fn clamps_and_nan() {
        assert_eq!(clamp_unit(-0.2), 0.0);
        assert_eq!(clamp_unit(1.7), 1.0);
        assert_eq!(clamp_unit(0.25), 0.25);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
        assert_eq!(non_negative(-3.0), 0.0);
        assert_eq!(non_negative(f64::NAN), 0.0);
    }
}
