//! A black-box function optimizer backed by Gaussian process regression.
//!
//! This library minimizes (or maximizes) an expensive-to-evaluate scalar
//! objective over a bounded real-valued parameter space using Bayesian
//! optimization: a Gaussian process surrogate with a Matérn 5/2 kernel
//! models the objective from the observations so far, and each round an
//! upper-confidence-bound acquisition is maximized over the box to pick the
//! next point to evaluate. It is intended for hyperparameter tuning and
//! similar workloads where each evaluation costs seconds to hours and the
//! budget is measured in dozens of rounds.
//!
//! # Quick start
//!
//! ```no_run
//! use bayesopt::{Optimizer, Param, UniformParam};
//!
//! let x = UniformParam::new("x", -10.0, 10.0);
//! let opt = Optimizer::builder()
//!     .param(x.clone())
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! // Minimize x^2 + 1: 5 random warm-up rounds, then 15 model-driven ones.
//! let (best, y) = opt.optimize(|p| p[&x.id()].powi(2) + 1.0).unwrap();
//! println!("argmin {:.3} -> {:.3}", best[&x.id()], y);
//! ```
//!
//! # Driving the loop yourself
//!
//! [`Optimizer::next`] and [`Optimizer::log`] expose the round loop
//! directly for callers that want to schedule evaluations themselves:
//!
//! ```no_run
//! use bayesopt::{Optimizer, Param, UniformParam};
//!
//! let x = UniformParam::new("x", 0.0, 1.0);
//! let opt = Optimizer::builder().param(x.clone()).build().unwrap();
//!
//! while let (Some(point), _parallel) = opt.next() {
//!     let y = point[&x.id()].sin();
//!     opt.log(&point, y).unwrap();
//! }
//! ```
//!
//! # How a round works
//!
//! 1. The first `random_rounds` rounds sample from the parameter priors;
//!    all but the last are parallelizable.
//! 2. Every later round scores 100 000 random candidates under the
//!    acquisition (global phase), then polishes with bounds-clamped L-BFGS
//!    from the incumbent and from 256 random restarts (local phase).
//! 3. The caller evaluates the proposed point and logs `(x, y)` back; the
//!    GP refits lazily on the next posterior query.
//!
//! Numerical failure degrades gracefully: a round that cannot factorize the
//! covariance matrix or crashes the local search parks its error in a
//! sticky slot, the remaining model-driven rounds are skipped, and
//! [`Optimizer::optimize`] still returns the best observation seen.
//!
//! # Feature flags
//!
//! - `async`: [`Optimizer::optimize_async`] driver (requires tokio)
//! - `tracing`: structured logging at round milestones

mod error;
mod exploration;
mod gp;
mod kernel;
mod local;
mod optimizer;
mod params;
mod rng;

pub use error::{Error, Result};
pub use exploration::{BarrierFunc, DEFAULT_KAPPA, Exploration, UCB, basic_barrier, log_barrier};
pub use gp::GP;
pub use kernel::{Kernel, Matern52};
pub use optimizer::{
    DEFAULT_RANDOM_ROUNDS, DEFAULT_ROUNDS, NUM_GRAD_POINTS, NUM_RAND_POINTS, Optimizer,
    OptimizerBuilder,
};
pub use params::{
    ExponentialParam, NormalParam, Param, ParamId, RejectionParam, SAMPLE_TRIES, UniformParam,
};
