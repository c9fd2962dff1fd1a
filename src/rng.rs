//! RNG helpers shared by parameter sampling and the controller.

/// Generate a random `f64` in the range `[low, high)`.
#[inline]
pub(crate) fn f64_range(rng: &mut fastrand::Rng, low: f64, high: f64) -> f64 {
    low + rng.f64() * (high - low)
}

/// Sample a value from the standard normal distribution using the
/// Box-Muller transform.
pub(crate) fn standard_normal(rng: &mut fastrand::Rng) -> f64 {
    let u1 = rng.f64().max(f64::EPSILON);
    let u2 = rng.f64() * core::f64::consts::TAU;
    (-2.0 * u1.ln()).sqrt() * u2.cos()
}

/// Sample a value from the exponential distribution with the given rate
/// (mean `1/rate`) by inverting the CDF.
pub(crate) fn exponential(rng: &mut fastrand::Rng, rate: f64) -> f64 {
    let u = (1.0 - rng.f64()).max(f64::EPSILON);
    -u.ln() / rate
}
