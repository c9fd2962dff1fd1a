//! Round controller for the Bayesian optimization loop.
//!
//! The controller owns the Gaussian process, the parameter list, and the
//! round counters behind a single coarse mutex. Rounds come in two flavors:
//! random warm-up rounds, whose points are sampled from the parameter priors
//! and may be evaluated in parallel, and model-driven rounds, which maximize
//! the acquisition over the box with a global random search followed by many
//! restarts of bounds-clamped L-BFGS.
//!
//! The mutex is held only for state transitions; the heavy phases (the
//! global/local acquisition search, and the caller's objective evaluations)
//! run with the lock released. A model-driven round therefore works on a
//! snapshot of the GP taken under the lock — observations are append-only
//! and model-driven rounds are strictly sequential, so the snapshot is
//! always current.

mod builder;
mod optimize;

#[cfg(feature = "async")]
mod async_impl;

pub use builder::OptimizerBuilder;

use core::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::exploration::{BarrierFunc, Exploration};
use crate::gp::GP;
use crate::local::{self, Bounded, Lbfgs, LocalError};
use crate::params::{Param, ParamId};

/// Default number of rounds to run.
pub const DEFAULT_ROUNDS: usize = 20;

/// Default number of random warm-up rounds to run.
pub const DEFAULT_RANDOM_ROUNDS: usize = 5;

/// Number of random candidates scored in the global phase of a model-driven
/// round.
pub const NUM_RAND_POINTS: usize = 100_000;

/// Number of random restarts of the bounded local search per model-driven
/// round.
pub const NUM_GRAD_POINTS: usize = 256;

/// Iteration cap for each local search.
const MAX_LOCAL_ITERS: usize = 100;

/// A black-box Gaussian process optimizer.
///
/// Construct with [`Optimizer::new`] for defaults or
/// [`Optimizer::builder`] for configuration, then either drive the loop
/// yourself with [`next`](Optimizer::next) / [`log`](Optimizer::log) or let
/// [`optimize`](Optimizer::optimize) do it.
///
/// Points are exchanged as maps keyed by [`ParamId`] — the identities of
/// the parameters the optimizer was created with.
///
/// # Examples
///
/// ```no_run
/// use bayesopt::{Optimizer, Param, UniformParam};
///
/// let x = UniformParam::new("x", -10.0, 10.0);
/// let opt = Optimizer::builder().param(x.clone()).seed(42).build().unwrap();
///
/// let (best, y) = opt.optimize(|p| p[&x.id()].powi(2) + 1.0).unwrap();
/// println!("argmin {:.3} -> {:.3}", best[&x.id()], y);
/// ```
pub struct Optimizer {
    inner: Mutex<Inner>,
}

impl core::fmt::Debug for Optimizer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Optimizer").finish_non_exhaustive()
    }
}

/// All mutable state, serialized under the controller mutex.
struct Inner {
    gp: GP,
    params: Arc<Vec<Box<dyn Param>>>,
    round: usize,
    random_rounds: usize,
    rounds: usize,
    exploration: Arc<dyn Exploration>,
    barrier: BarrierFunc,
    minimize: bool,
    running: bool,
    /// Sticky: once set, all further model-driven rounds are skipped.
    exploration_err: Option<Error>,
    rng: fastrand::Rng,
}

impl Optimizer {
    /// Creates an optimizer over `params` with default options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoParams`] for an empty parameter list and
    /// [`Error::InvalidBounds`] if any parameter has `min > max`.
    pub fn new(params: Vec<Box<dyn Param>>) -> Result<Self> {
        Self::builder().params(params).build()
    }

    /// Returns a builder for configuring an optimizer.
    #[must_use]
    pub fn builder() -> OptimizerBuilder {
        OptimizerBuilder::new()
    }

    /// Returns the next point to evaluate, or `None` when the optimization
    /// is over (round budget exhausted, or a sticky exploration error).
    ///
    /// The flag is `true` when the returned point may be evaluated in
    /// parallel with other pending points — every random warm-up round
    /// except the last, so the first model-driven round sees the complete
    /// warm-up set.
    ///
    /// Numerical failures inside a model-driven round are not returned
    /// here: they land in the sticky slot readable via
    /// [`exploration_err`](Optimizer::exploration_err) and this method
    /// reports no next point.
    pub fn next(&self) -> (Option<HashMap<ParamId, f64>>, bool) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        if inner.round >= inner.rounds || inner.exploration_err.is_some() {
            return (None, false);
        }

        // Warm-up: sample from the parameter priors.
        if inner.round < inner.random_rounds {
            let x: Vec<f64> = inner.params.iter().map(|p| p.sample(&mut inner.rng)).collect();
            inner.round += 1;
            let parallel = inner.round < inner.random_rounds.min(inner.rounds);
            return (Some(to_map(&inner.params, &x)), parallel);
        }

        // Model-driven: snapshot under the lock, search with it released.
        let mut gp = inner.gp.clone();
        let params = Arc::clone(&inner.params);
        let exploration = Arc::clone(&inner.exploration);
        let minimize = inner.minimize;
        let mut rng = inner.rng.fork();
        drop(guard);

        let explored = explore(&mut gp, &params, exploration.as_ref(), minimize, &mut rng);

        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        match explored {
            Ok(x) => {
                inner.round += 1;
                (Some(to_map(&inner.params, &x)), false)
            }
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %err, "acquisition search failed; skipping model-driven rounds");
                inner.exploration_err = Some(err);
                (None, false)
            }
        }
    }

    /// Logs an observed `(x, y)` pair into the Gaussian process.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingParam`] if `x` lacks a value for one of the
    /// optimizer's parameters.
    pub fn log(&self, x: &HashMap<ParamId, f64>, y: f64) -> Result<()> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let mut xa = Vec::with_capacity(inner.params.len());
        for p in inner.params.iter() {
            let v = x
                .get(&p.id())
                .copied()
                .ok_or_else(|| Error::MissingParam(p.name().to_string()))?;
            xa.push(v);
        }
        inner.gp.add(xa, y)
    }

    /// Signals a running [`optimize`](Optimizer::optimize) call to stop at
    /// its next loop check.
    pub fn stop(&self) {
        self.inner.lock().running = false;
    }

    /// Returns whether an optimization run is in flight.
    #[must_use]
    pub fn running(&self) -> bool {
        self.inner.lock().running
    }

    /// Returns the number of rounds elapsed so far.
    #[must_use]
    pub fn rounds(&self) -> usize {
        self.inner.lock().round
    }

    /// Returns the sticky exploration error, if a model-driven round failed.
    #[must_use]
    pub fn exploration_err(&self) -> Option<Error> {
        self.inner.lock().exploration_err.clone()
    }

    /// Returns the barrier function configured on this optimizer.
    ///
    /// The default [`UCB`](crate::UCB) exploration does not invoke it; it is
    /// available for composition by custom [`Exploration`] implementations.
    #[must_use]
    pub fn barrier_func(&self) -> BarrierFunc {
        self.inner.lock().barrier
    }

    /// Returns a guard over the underlying Gaussian process, primarily for
    /// plotting consumers.
    ///
    /// The guard holds the controller mutex; drop it before calling any
    /// other method on the optimizer.
    pub fn gp(&self) -> MappedMutexGuard<'_, GP> {
        MutexGuard::map(self.inner.lock(), |inner| &mut inner.gp)
    }

    /// Marks the optimizer as running.
    pub(crate) fn start(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.running {
            return Err(Error::AlreadyRunning);
        }
        inner.running = true;
        Ok(())
    }

    /// Clears the running flag.
    pub(crate) fn finish(&self) {
        self.inner.lock().running = false;
    }

    /// Returns the best observation seen, according to the optimization
    /// direction.
    pub(crate) fn best(&self) -> Result<(HashMap<ParamId, f64>, f64)> {
        let guard = self.inner.lock();
        let (x, y) = if guard.minimize {
            guard.gp.minimum()?
        } else {
            guard.gp.maximum()?
        };
        Ok((to_map(&guard.params, x), y))
    }
}

/// Builds the id-keyed map for a point in parameter order.
fn to_map(params: &[Box<dyn Param>], x: &[f64]) -> HashMap<ParamId, f64> {
    params.iter().zip(x).map(|(p, &v)| (p.id(), v)).collect()
}

/// One model-driven acquisition search: a random global phase over the
/// parameter priors, the bounded local search from the incumbent, then
/// [`NUM_GRAD_POINTS`] random restarts. Returns the best point seen, or the
/// error to park in the sticky slot.
fn explore(
    gp: &mut GP,
    params: &[Box<dyn Param>],
    exploration: &dyn Exploration,
    minimize: bool,
    rng: &mut fastrand::Rng,
) -> Result<Vec<f64>> {
    let sign = if minimize { 1.0 } else { -1.0 };
    let gp = RefCell::new(gp);
    let round_err: RefCell<Option<Error>> = RefCell::new(None);

    // Errors raised by the posterior poison the candidate and are promoted
    // into the sticky slot at round end.
    let mut f = |x: &[f64]| -> f64 {
        let mut guard = gp.borrow_mut();
        match exploration.estimate(&mut **guard, minimize, x) {
            Ok(v) => sign * v,
            Err(err) => {
                round_err.borrow_mut().get_or_insert(err);
                f64::INFINITY
            }
        }
    };

    // Global phase: keep the best of many random candidates.
    let mut best_x: Option<Vec<f64>> = None;
    let mut best_f = f64::INFINITY;
    for _ in 0..NUM_RAND_POINTS {
        let x: Vec<f64> = params.iter().map(|p| p.sample(rng)).collect();
        let v = f(&x);
        if best_x.is_none() || v < best_f {
            best_f = v;
            best_x = Some(x);
        }
    }
    let incumbent = best_x.clone().expect("global phase produced a candidate");

    // Local phase: bounded L-BFGS from the incumbent, then random restarts.
    let bounds: Vec<(f64, f64)> = params.iter().map(|p| (p.min(), p.max())).collect();
    let mut method = Bounded::new(Lbfgs::new(), bounds);
    let mut fatal: Option<LocalError> = None;

    for i in 0..=NUM_GRAD_POINTS {
        let x0 = if i == 0 {
            incumbent.clone()
        } else {
            params.iter().map(|p| p.sample(rng)).collect()
        };
        let (minimum, err) = local::minimize(&mut method, &mut f, &x0, MAX_LOCAL_ITERS);
        if minimum.value < best_f {
            best_f = minimum.value;
            best_x = Some(minimum.x);
        }
        if let Some(err) = err {
            if err.is_fatal() {
                fatal = Some(err);
                break;
            }
            // Line-search failures and stalls are expected near active
            // bounds; the restarts absorb them.
        }
    }

    if let Some(err) = round_err.into_inner() {
        return Err(err);
    }
    if let Some(err) = fatal {
        return Err(Error::LocalSearch(err.to_string()));
    }
    Ok(best_x.expect("global phase produced a candidate"))
}
