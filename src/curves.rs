//! Polynomial performance-curve evaluation.
//!
//! Coefficient layouts follow the EnergyPlus `Curve:*` objects. Inputs are
//! expected to be clamped by the caller; nothing here validates a domain.

/// Biquadratic curve: `c0 + c1*x + c2*x² + c3*y + c4*y² + c5*x*y`.
///
/// # Examples
///
/// ```
/// use ctes_prep::curves::biquad;
///
/// let c = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
/// assert_eq!(biquad(&c, 7.0, 35.0), 1.0);
/// ```
pub fn biquad(c: &[f64; 6], x: f64, y: f64) -> f64 {
    c[0] + c[1] * x + c[2] * x * x + c[3] * y + c[4] * y * y + c[5] * x * y
}

/// Quadratic curve: `c0 + c1*x + c2*x²`.
pub fn quad(c: &[f64; 3], x: f64) -> f64 {
    c[0] + c[1] * x + c[2] * x * x
}

/// Quadratic-linear curve: `(c0 + c1*x + c2*x²) + (c3 + c4*x + c5*x²)*y`.
pub fn quad_linear(c: &[f64; 6], x: f64, y: f64) -> f64 {
    (c[0] + c[1] * x + c[2] * x * x) + (c[3] + c[4] * x + c[5] * x * x) * y
}

/// Fifth-order polynomial in one variable.
pub fn poly5(c: &[f64; 6], x: f64) -> f64 {
    // Horner form
    ((((c[5] * x + c[4]) * x + c[3]) * x + c[2]) * x + c[1]) * x + c[0]
}
