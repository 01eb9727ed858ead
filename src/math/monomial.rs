//! Scalar helpers for evaluating static regressors.
//!
//! - `power(b, 0) = 1` for every base, including `b = 0`.
//! - `saturated_derivative(b, e) = e * b^(e-1)`, except that it is exactly `0`
//!   whenever `b = 0`. This keeps `0^(-1)` out of the gain matrix when `e = 0`,
//!   and applies to `e >= 1` as well.

/// `base^exponent` with `0^0 = 1`.
pub fn power(base: f64, exponent: u32) -> f64 {
    if exponent == 0 {
        return 1.0;
    }
    base.powi(exponent as i32)
}

/// Derivative term `exponent * base^(exponent - 1)`, saturated to 0 at `base = 0`.
pub fn saturated_derivative(base: f64, exponent: u32) -> f64 {
    if base == 0.0 || exponent == 0 {
        return 0.0;
    }
    exponent as f64 * base.powi(exponent as i32 - 1)
}
