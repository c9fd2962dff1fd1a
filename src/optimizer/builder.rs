//! Builder for configuring an [`Optimizer`].

use std::sync::Arc;

use parking_lot::Mutex;

use super::{DEFAULT_RANDOM_ROUNDS, DEFAULT_ROUNDS, Inner, Optimizer};
use crate::error::{Error, Result};
use crate::exploration::{BarrierFunc, Exploration, UCB, log_barrier};
use crate::gp::GP;
use crate::kernel::Matern52;
use crate::params::Param;

/// Builder for an [`Optimizer`].
///
/// All options have the documented defaults: 20 rounds, 5 of them random
/// warm-up, [`UCB`] exploration with κ = 1.96, minimization, and the
/// [`log_barrier`] stored for composition.
///
/// # Examples
///
/// ```
/// use bayesopt::{Optimizer, UCB, UniformParam};
///
/// let opt = Optimizer::builder()
///     .param(UniformParam::new("x", -10.0, 10.0))
///     .rounds(30)
///     .random_rounds(10)
///     .exploration(UCB { kappa: 1.0 })
///     .minimize(false)
///     .output_name("score")
///     .seed(42)
///     .build()
///     .unwrap();
/// assert_eq!(opt.rounds(), 0);
/// ```
pub struct OptimizerBuilder {
    params: Vec<Box<dyn Param>>,
    rounds: usize,
    random_rounds: usize,
    exploration: Arc<dyn Exploration>,
    barrier: BarrierFunc,
    minimize: bool,
    output_name: String,
    seed: Option<u64>,
}

impl OptimizerBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            params: Vec::new(),
            rounds: DEFAULT_ROUNDS,
            random_rounds: DEFAULT_RANDOM_ROUNDS,
            exploration: Arc::new(UCB::default()),
            barrier: log_barrier,
            minimize: true,
            output_name: String::new(),
            seed: None,
        }
    }

    /// Adds one parameter to optimize over.
    #[must_use]
    pub fn param(mut self, param: impl Param + 'static) -> Self {
        self.params.push(Box::new(param));
        self
    }

    /// Adds a batch of boxed parameters.
    #[must_use]
    pub fn params(mut self, params: impl IntoIterator<Item = Box<dyn Param>>) -> Self {
        self.params.extend(params);
        self
    }

    /// Sets the total number of rounds to run.
    ///
    /// Default: 20.
    #[must_use]
    pub fn rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    /// Sets the number of random warm-up rounds.
    ///
    /// Default: 5.
    #[must_use]
    pub fn random_rounds(mut self, rounds: usize) -> Self {
        self.random_rounds = rounds;
        self
    }

    /// Sets the exploration strategy.
    ///
    /// Default: [`UCB`] with κ = 1.96.
    #[must_use]
    pub fn exploration(mut self, exploration: impl Exploration + 'static) -> Self {
        self.exploration = Arc::new(exploration);
        self
    }

    /// Sets whether the objective is minimized (default) or maximized.
    #[must_use]
    pub fn minimize(mut self, minimize: bool) -> Self {
        self.minimize = minimize;
        self
    }

    /// Sets the barrier function stored on the controller.
    ///
    /// Default: [`log_barrier`]. The default [`UCB`] exploration does not
    /// invoke it.
    #[must_use]
    pub fn barrier_func(mut self, barrier: BarrierFunc) -> Self {
        self.barrier = barrier;
        self
    }

    /// Sets the output's display name, used by plotting consumers of
    /// [`Optimizer::gp`].
    #[must_use]
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    /// Seeds the controller's random source for deterministic runs.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds the configured [`Optimizer`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoParams`] if no parameters were added and
    /// [`Error::InvalidBounds`] if any parameter fails validation.
    pub fn build(self) -> Result<Optimizer> {
        if self.params.is_empty() {
            return Err(Error::NoParams);
        }
        for param in &self.params {
            param.validate()?;
        }

        let mut gp = GP::new(Matern52, 0.0);
        gp.set_names(
            self.params.iter().map(|p| p.name().to_string()).collect(),
            self.output_name,
        );

        let rng = self
            .seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);

        Ok(Optimizer {
            inner: Mutex::new(Inner {
                gp,
                params: Arc::new(self.params),
                round: 0,
                random_rounds: self.random_rounds,
                rounds: self.rounds,
                exploration: self.exploration,
                barrier: self.barrier,
                minimize: self.minimize,
                running: false,
                exploration_err: None,
                rng,
            }),
        })
    }
}

impl Default for OptimizerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::UniformParam;

    #[test]
    fn test_build_requires_params() {
        assert_eq!(Optimizer::builder().build().err(), Some(Error::NoParams));
    }

    #[test]
    fn test_build_validates_bounds() {
        let err = Optimizer::builder()
            .param(UniformParam::new("bad", 3.0, 1.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidBounds { .. }));
    }

    #[test]
    fn test_names_reach_the_gp() {
        let opt = Optimizer::builder()
            .param(UniformParam::new("rate", 0.0, 1.0))
            .output_name("loss")
            .build()
            .unwrap();
        let gp = opt.gp();
        assert_eq!(gp.name(0), "rate");
        assert_eq!(gp.output_name(), "loss");
    }
}
