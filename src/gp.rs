//! Gaussian process regression over logged observations.
//!
//! The GP is the surrogate model at the heart of the optimizer: every
//! observed `(x, y)` pair is appended to its training set, and the posterior
//! mean and standard deviation at arbitrary query points drive the
//! acquisition function. Observations are standardized (zero mean, unit
//! variance) before fitting, and the fit itself is a Cholesky factorization
//! of the kernel matrix plus a diagonal noise term.
//!
//! Fitting is lazy: appending marks the model dirty, and the next query
//! recomputes the factorization once. A single acquisition maximization
//! issues many thousands of posterior queries against one fit, so this
//! amortizes the O(n³) factorization over the whole round.
//!
//! Algorithm follows Rasmussen & Williams, *Gaussian Processes for Machine
//! Learning*, ch. 2.

use std::sync::Arc;

use nalgebra::{DMatrix, DVector, Dyn};

use crate::error::{Error, Result};
use crate::kernel::Kernel;

/// Floor applied to the sample standard deviation of the outputs so
/// standardization never divides by zero.
const MIN_STDDEV: f64 = 1e-10;

/// A Gaussian process with a pluggable covariance function.
///
/// # Examples
///
/// ```
/// use bayesopt::{GP, Matern52};
///
/// let mut gp = GP::new(Matern52, 0.0);
/// gp.add(vec![1.0], 1.0).unwrap();
/// let (mean, stddev) = gp.estimate(&[1.0]).unwrap();
/// assert!((mean - 1.0).abs() < 1e-4);
/// assert!(stddev.abs() < 1e-4);
/// ```
#[derive(Clone)]
pub struct GP {
    kernel: Arc<dyn Kernel>,
    noise: f64,

    inputs: Vec<Vec<f64>>,
    outputs: Vec<f64>,

    input_names: Vec<String>,
    output_name: String,

    fit: Option<Fit>,
    dirty: bool,
}

/// The factorized state derived from the observation set.
#[derive(Clone)]
struct Fit {
    /// Cholesky factor of `K + noise·I`.
    cholesky: nalgebra::linalg::Cholesky<f64, Dyn>,
    /// Solution of `K α = ỹ` for the standardized outputs.
    alpha: DVector<f64>,
    /// Sample mean of the outputs at fit time.
    mean: f64,
    /// Sample standard deviation of the outputs at fit time.
    stddev: f64,
    /// Number of observations at fit time.
    n: usize,
}

impl GP {
    /// Creates a new Gaussian process with the given covariance function and
    /// noise level (variance added to the kernel diagonal).
    pub fn new(kernel: impl Kernel + 'static, noise: f64) -> Self {
        Self {
            kernel: Arc::new(kernel),
            noise,
            inputs: Vec::new(),
            outputs: Vec::new(),
            input_names: Vec::new(),
            output_name: String::new(),
            fit: None,
            dirty: false,
        }
    }

    /// Sets the display names of the inputs and the output.
    pub fn set_names(&mut self, inputs: Vec<String>, output: impl Into<String>) {
        self.input_names = inputs;
        self.output_name = output.into();
    }

    /// Returns the display name of input `i`, or `x[i]` if unnamed.
    #[must_use]
    pub fn name(&self, i: usize) -> String {
        match self.input_names.get(i) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("x[{i}]"),
        }
    }

    /// Returns the display name of the output, or `y` if unnamed.
    #[must_use]
    pub fn output_name(&self) -> &str {
        if self.output_name.is_empty() {
            "y"
        } else {
            &self.output_name
        }
    }

    /// Returns a deep copy of the observation set, in insertion order.
    #[must_use]
    pub fn raw_data(&self) -> (Vec<Vec<f64>>, Vec<f64>) {
        (self.inputs.clone(), self.outputs.clone())
    }

    /// Returns the input dimensionality, fixed by the first observation.
    ///
    /// Returns 0 while the observation set is empty.
    #[must_use]
    pub fn dims(&self) -> usize {
        self.inputs.first().map_or(0, Vec::len)
    }

    /// Returns the number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Returns `true` if no observations have been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Appends an observation and marks the model dirty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `x` has a different length
    /// than the existing observations.
    pub fn add(&mut self, x: Vec<f64>, y: f64) -> Result<()> {
        if !self.inputs.is_empty() && x.len() != self.dims() {
            return Err(Error::DimensionMismatch {
                expected: self.dims(),
                got: x.len(),
            });
        }
        self.dirty = true;
        self.inputs.push(x);
        self.outputs.push(y);
        Ok(())
    }

    /// Returns the observation with the smallest output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoObservations`] if nothing has been logged.
    pub fn minimum(&self) -> Result<(&[f64], f64)> {
        self.extreme(|a, b| a < b)
    }

    /// Returns the observation with the largest output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoObservations`] if nothing has been logged.
    pub fn maximum(&self) -> Result<(&[f64], f64)> {
        self.extreme(|a, b| a > b)
    }

    fn extreme(&self, better: impl Fn(f64, f64) -> bool) -> Result<(&[f64], f64)> {
        let mut best: Option<usize> = None;
        for (i, &y) in self.outputs.iter().enumerate() {
            if best.is_none_or(|j| better(y, self.outputs[j])) {
                best = Some(i);
            }
        }
        let i = best.ok_or(Error::NoObservations)?;
        Ok((&self.inputs[i], self.outputs[i]))
    }

    /// Returns the posterior mean and standard deviation at `x`, refitting
    /// first if observations were appended since the last fit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoObservations`] on an empty model,
    /// [`Error::DimensionMismatch`] for a wrong-length query, and
    /// [`Error::FactorizeFailed`] if the kernel matrix is not
    /// positive-definite. A factorization failure leaves the model dirty; a
    /// later append may make the next refit succeed.
    pub fn estimate(&mut self, x: &[f64]) -> Result<(f64, f64)> {
        self.check_query(x)?;
        self.ensure_fit()?;
        let fit = self.fit.as_ref().expect("fit present after ensure_fit");

        let kstar = DVector::from_fn(fit.n, |i, _| self.kernel.cov(&self.inputs[i], x));
        let mean = kstar.dot(&fit.alpha) * fit.stddev + fit.mean;

        let v = fit.cholesky.solve(&kstar);
        // Exact arithmetic keeps the variance non-negative; floating point
        // does not.
        let variance = (self.kernel.cov(x, x) - kstar.dot(&v)).max(0.0);

        Ok((mean, variance.sqrt()))
    }

    /// Returns the gradient of the posterior mean at `x`, refitting first if
    /// the model is dirty.
    ///
    /// This differentiates only the kernel-to-training-point terms; the
    /// variance of the mean is not part of the acquisition gradient.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`estimate`](GP::estimate).
    pub fn gradient(&mut self, x: &[f64]) -> Result<Vec<f64>> {
        self.check_query(x)?;
        self.ensure_fit()?;
        let fit = self.fit.as_ref().expect("fit present after ensure_fit");

        let d = x.len();
        let columns: Vec<Vec<f64>> = self
            .inputs
            .iter()
            .map(|xi| self.kernel.grad(x, xi))
            .collect();
        let g = DMatrix::from_fn(d, fit.n, |r, c| columns[c][r]);

        let grad = g * &fit.alpha * fit.stddev;
        Ok(grad.iter().copied().collect())
    }

    fn check_query(&self, x: &[f64]) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(Error::NoObservations);
        }
        if x.len() != self.dims() {
            return Err(Error::DimensionMismatch {
                expected: self.dims(),
                got: x.len(),
            });
        }
        Ok(())
    }

    fn ensure_fit(&mut self) -> Result<()> {
        if !self.dirty && self.fit.is_some() {
            return Ok(());
        }

        let n = self.inputs.len();
        let k = DMatrix::from_fn(n, n, |i, j| {
            let v = self.kernel.cov(&self.inputs[i], &self.inputs[j]);
            if i == j { v + self.noise } else { v }
        });

        // A failed factorization leaves `dirty` set so a later append gets
        // another chance.
        let cholesky = nalgebra::linalg::Cholesky::new(k).ok_or(Error::FactorizeFailed)?;

        let (mean, stddev) = output_stats(&self.outputs);
        let y = DVector::from_fn(n, |i, _| (self.outputs[i] - mean) / stddev);
        let alpha = cholesky.solve(&y);

        self.fit = Some(Fit {
            cholesky,
            alpha,
            mean,
            stddev,
            n,
        });
        self.dirty = false;
        Ok(())
    }
}

/// Sample mean and standard deviation of the outputs.
///
/// A single observation gets unit standard deviation so it standardizes to
/// exactly zero and the posterior interpolates it.
fn output_stats(outputs: &[f64]) -> (f64, f64) {
    let n = outputs.len();
    let mean = outputs.iter().sum::<f64>() / n as f64;
    if n < 2 {
        return (mean, 1.0);
    }
    let variance = outputs.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    (mean, variance.sqrt().max(MIN_STDDEV))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::Matern52;

    #[test]
    fn test_single_point_interpolates() {
        let mut gp = GP::new(Matern52, 0.0);
        gp.add(vec![1.0], 1.0).unwrap();
        let (mean, stddev) = gp.estimate(&[1.0]).unwrap();
        assert!((mean - 1.0).abs() < 1e-4, "mean = {mean}; want 1");
        assert!(stddev.abs() < 1e-4, "stddev = {stddev}; want 0");
    }

    #[test]
    fn test_dimension_mismatch_on_add() {
        let mut gp = GP::new(Matern52, 0.0);
        gp.add(vec![1.0, 2.0], 1.0).unwrap();
        assert_eq!(
            gp.add(vec![1.0], 2.0),
            Err(Error::DimensionMismatch {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_empty_model_errors() {
        let mut gp = GP::new(Matern52, 0.0);
        assert_eq!(gp.estimate(&[0.0]), Err(Error::NoObservations));
        assert_eq!(gp.minimum().err(), Some(Error::NoObservations));
    }

    #[test]
    fn test_minimum_and_maximum() {
        let mut gp = GP::new(Matern52, 0.0);
        gp.add(vec![0.0], 3.0).unwrap();
        gp.add(vec![1.0], -2.0).unwrap();
        gp.add(vec![2.0], 5.0).unwrap();

        let (x, y) = gp.minimum().unwrap();
        assert_eq!((x, y), (&[1.0][..], -2.0));
        let (x, y) = gp.maximum().unwrap();
        assert_eq!((x, y), (&[2.0][..], 5.0));
    }

    #[test]
    fn test_gradient_matches_central_differences() {
        let mut gp = GP::new(Matern52, 1e-6);
        gp.add(vec![0.0, 0.0], 1.0).unwrap();
        gp.add(vec![1.0, -1.0], 2.0).unwrap();
        gp.add(vec![-0.5, 2.0], -1.0).unwrap();
        gp.add(vec![2.0, 1.0], 0.5).unwrap();

        let x = [0.25, 0.75];
        let grad = gp.gradient(&x).unwrap();
        let h = 1e-5;
        for i in 0..x.len() {
            let mut hi = x.to_vec();
            let mut lo = x.to_vec();
            hi[i] += h;
            lo[i] -= h;
            let (fh, _) = gp.estimate(&hi).unwrap();
            let (fl, _) = gp.estimate(&lo).unwrap();
            let numeric = (fh - fl) / (2.0 * h);
            assert!(
                (grad[i] - numeric).abs() < 1e-5,
                "gradient[{i}] = {}; central difference {numeric}",
                grad[i]
            );
        }
    }

    #[test]
    fn test_names() {
        let mut gp = GP::new(Matern52, 0.0);
        assert_eq!(gp.name(0), "x[0]");
        assert_eq!(gp.output_name(), "y");

        gp.set_names(vec!["alpha".into(), String::new()], "loss");
        assert_eq!(gp.name(0), "alpha");
        assert_eq!(gp.name(1), "x[1]");
        assert_eq!(gp.name(7), "x[7]");
        assert_eq!(gp.output_name(), "loss");
    }

    #[test]
    fn test_raw_data_is_a_copy() {
        let mut gp = GP::new(Matern52, 0.0);
        gp.add(vec![1.0], 2.0).unwrap();
        let (mut xs, ys) = gp.raw_data();
        xs[0][0] = 99.0;
        assert_eq!(gp.raw_data().0[0][0], 1.0);
        assert_eq!(ys, vec![2.0]);
    }
}
