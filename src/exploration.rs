//! Acquisition strategies over the Gaussian process posterior.
//!
//! An [`Exploration`] folds the posterior at a candidate point into a single
//! scalar that the inner optimizer drives toward a minimum; the controller
//! flips the sign when the caller asked to maximize. Barrier functions live
//! here too: the controller stores one for composition by custom
//! explorations, but the default [`UCB`] never invokes it.

use crate::error::Result;
use crate::gp::GP;
use crate::params::Param;

/// Scores a candidate point for the inner optimizer.
pub trait Exploration: Send + Sync {
    /// Returns the acquisition scalar at `x`.
    ///
    /// The returned value is minimized by the inner optimizer. When
    /// `minimize` is false the controller negates it, so implementations
    /// should return "smaller is better toward the caller's goal" for
    /// `minimize = true` and "larger is better" otherwise.
    ///
    /// # Errors
    ///
    /// Posterior failures from [`GP::estimate`] must be propagated.
    fn estimate(&self, gp: &mut GP, minimize: bool, x: &[f64]) -> Result<f64>;
}

/// Upper confidence bound exploration.
///
/// Trades exploitation (the posterior mean) against exploration (the
/// posterior standard deviation): `μ(x) + κ·σ(x)` when maximizing and the
/// lower bound `μ(x) − κ·σ(x)` when minimizing.
///
/// # Examples
///
/// ```
/// use bayesopt::UCB;
///
/// let default = UCB::default(); // κ = 1.96, ≈95% normal coverage
/// let greedy = UCB { kappa: 0.5 };
/// assert!(greedy.kappa < default.kappa);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct UCB {
    /// Confidence weight on the posterior standard deviation.
    pub kappa: f64,
}

/// Default confidence weight (≈95% normal coverage).
pub const DEFAULT_KAPPA: f64 = 1.96;

impl Default for UCB {
    fn default() -> Self {
        Self {
            kappa: DEFAULT_KAPPA,
        }
    }
}

impl Exploration for UCB {
    fn estimate(&self, gp: &mut GP, minimize: bool, x: &[f64]) -> Result<f64> {
        let (mean, stddev) = gp.estimate(x)?;
        if minimize {
            Ok(mean - self.kappa * stddev)
        } else {
            Ok(mean + self.kappa * stddev)
        }
    }
}

/// A penalty folded over the parameter box, for composition by custom
/// [`Exploration`] implementations.
pub type BarrierFunc = fn(x: &[f64], params: &[Box<dyn Param>]) -> f64;

/// Returns `−∞` if any coordinate is outside its parameter's box, else 0.
#[must_use]
pub fn basic_barrier(x: &[f64], params: &[Box<dyn Param>]) -> f64 {
    for (v, p) in x.iter().zip(params) {
        if *v < p.min() || *v > p.max() {
            return f64::NEG_INFINITY;
        }
    }
    0.0
}

/// Log barrier over the parameter box:
/// `Σᵢ log₂(maxᵢ − xᵢ) + log₂(xᵢ − minᵢ)`.
///
/// Coordinates outside the box produce NaN terms, which collapse to `−∞`.
#[must_use]
pub fn log_barrier(x: &[f64], params: &[Box<dyn Param>]) -> f64 {
    let sum: f64 = x
        .iter()
        .zip(params)
        .map(|(v, p)| (p.max() - v).log2() + (v - p.min()).log2())
        .sum();
    if sum.is_nan() { f64::NEG_INFINITY } else { sum }
}
