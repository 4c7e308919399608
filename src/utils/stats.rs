//! Statistical utility functions.

use std::f64::consts::PI;

/// Log density of `Normal(mu, sigma)` at `x`.
///
/// Returns negative infinity for a non-positive scale.
pub fn ln_normal_pdf(x: f64, mu: f64, sigma: f64) -> f64 {
    if !(sigma > 0.0) {
        return f64::NEG_INFINITY;
    }
    let z = (x - mu) / sigma;
    -0.5 * z * z - sigma.ln() - 0.5 * (2.0 * PI).ln()
}

/// Log density of `HalfNormal(sigma)` at `x` (support `x >= 0`).
pub fn ln_half_normal_pdf(x: f64, sigma: f64) -> f64 {
    if x < 0.0 {
        return f64::NEG_INFINITY;
    }
    std::f64::consts::LN_2 + ln_normal_pdf(x, 0.0, sigma)
}
