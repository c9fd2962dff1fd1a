//! Bounded, sampleable scalar parameters.
//!
//! Every parameter carries a name, a box `[min, max]`, and a sampler used
//! both for warm-up rounds and for seeding the acquisition search. Identity
//! matters: the maps exchanged with the optimizer are keyed by [`ParamId`],
//! allocated once per logical parameter at construction. Cloning a parameter
//! copies its id, so clones refer to the same logical parameter.

use core::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};
use crate::rng;

static NEXT_PARAM_ID: AtomicU64 = AtomicU64::new(0);

/// Number of rejection attempts before a truncated sampler gives up and
/// clamps the last draw into the box.
pub const SAMPLE_TRIES: usize = 1000;

/// A unique identifier for a parameter instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(u64);

impl ParamId {
    /// Creates a new unique `ParamId`.
    pub fn new() -> Self {
        Self(NEXT_PARAM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ParamId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ParamId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "param_{}", self.0)
    }
}

/// A parameter that can be optimized.
///
/// Implementations must return samples inside `[min, max]`; the sampling
/// distribution is free (it does not have to be uniform).
pub trait Param: Send + Sync {
    /// Returns the identity of this parameter.
    fn id(&self) -> ParamId;

    /// Returns the name of the parameter.
    fn name(&self) -> &str;

    /// Returns the lower bound.
    fn min(&self) -> f64;

    /// Returns the upper bound.
    fn max(&self) -> f64;

    /// Returns a random point within the bounds.
    fn sample(&self, rng: &mut fastrand::Rng) -> f64;

    /// Validates the parameter configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] if `min > max`.
    fn validate(&self) -> Result<()> {
        if self.min() > self.max() {
            return Err(Error::InvalidBounds {
                name: self.name().to_string(),
                min: self.min(),
                max: self.max(),
            });
        }
        Ok(())
    }
}

/// Draws from `draw` until a value lands inside the parameter's box, up to
/// [`SAMPLE_TRIES`] attempts; on exhaustion the last draw is clamped into
/// the box.
pub(crate) fn truncate_sample(p: &dyn Param, mut draw: impl FnMut() -> f64) -> f64 {
    let (min, max) = (p.min(), p.max());
    let mut x = 0.0;
    for _ in 0..SAMPLE_TRIES {
        x = draw();
        if x >= min && x <= max {
            return x;
        }
    }
    x.clamp(min, max)
}

/// A uniformly distributed parameter between `min` and `max`.
///
/// # Examples
///
/// ```
/// use bayesopt::{Param, UniformParam};
///
/// let x = UniformParam::new("x", -10.0, 10.0);
/// let mut rng = fastrand::Rng::with_seed(42);
/// let v = x.sample(&mut rng);
/// assert!((-10.0..=10.0).contains(&v));
/// ```
#[derive(Clone, Debug)]
pub struct UniformParam {
    id: ParamId,
    name: String,
    min: f64,
    max: f64,
}

impl UniformParam {
    /// Creates a uniform parameter over `[min, max]`.
    #[must_use]
    pub fn new(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            id: ParamId::new(),
            name: name.into(),
            min,
            max,
        }
    }
}

impl Param for UniformParam {
    fn id(&self) -> ParamId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn min(&self) -> f64 {
        self.min
    }

    fn max(&self) -> f64 {
        self.max
    }

    fn sample(&self, rng: &mut fastrand::Rng) -> f64 {
        rng::f64_range(rng, self.min, self.max)
    }
}

/// A normally distributed parameter truncated to `[min, max]`.
///
/// Draws `N(mean, stddev²)` and rejects values outside the box, retrying up
/// to [`SAMPLE_TRIES`] times before clamping the last draw.
#[derive(Clone, Debug)]
pub struct NormalParam {
    id: ParamId,
    name: String,
    min: f64,
    max: f64,
    mean: f64,
    stddev: f64,
}

impl NormalParam {
    /// Creates a truncated normal parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, min: f64, max: f64, mean: f64, stddev: f64) -> Self {
        Self {
            id: ParamId::new(),
            name: name.into(),
            min,
            max,
            mean,
            stddev,
        }
    }
}

impl Param for NormalParam {
    fn id(&self) -> ParamId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn min(&self) -> f64 {
        self.min
    }

    fn max(&self) -> f64 {
        self.max
    }

    fn sample(&self, rng: &mut fastrand::Rng) -> f64 {
        truncate_sample(self, || self.mean + self.stddev * rng::standard_normal(rng))
    }
}

/// An exponentially distributed parameter truncated to `[min, max]`.
///
/// Draws `Exp(rate)` (mean `1/rate`) with the same truncated-rejection
/// scheme as [`NormalParam`].
#[derive(Clone, Debug)]
pub struct ExponentialParam {
    id: ParamId,
    name: String,
    min: f64,
    max: f64,
    rate: f64,
}

impl ExponentialParam {
    /// Creates a truncated exponential parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, min: f64, max: f64, rate: f64) -> Self {
        Self {
            id: ParamId::new(),
            name: name.into(),
            min,
            max,
            rate,
        }
    }
}

impl Param for ExponentialParam {
    fn id(&self) -> ParamId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn min(&self) -> f64 {
        self.min
    }

    fn max(&self) -> f64 {
        self.max
    }

    fn sample(&self, rng: &mut fastrand::Rng) -> f64 {
        truncate_sample(self, || rng::exponential(rng, self.rate))
    }
}

/// Rejection sampling over another parameter's distribution.
///
/// Each draw from the inner parameter is accepted with probability `f(x)`,
/// where `f` maps into `[0, 1]`. If `f` is zero over the inner
/// distribution's support, `sample` never terminates; bounding that is the
/// caller's responsibility.
pub struct RejectionParam<F> {
    id: ParamId,
    inner: Box<dyn Param>,
    f: F,
}

impl<F> RejectionParam<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    /// Wraps `inner` with acceptance function `f`.
    #[must_use]
    pub fn new(inner: impl Param + 'static, f: F) -> Self {
        Self {
            id: ParamId::new(),
            inner: Box::new(inner),
            f,
        }
    }
}

impl<F> Param for RejectionParam<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn id(&self) -> ParamId {
        self.id
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn min(&self) -> f64 {
        self.inner.min()
    }

    fn max(&self) -> f64 {
        self.inner.max()
    }

    fn sample(&self, rng: &mut fastrand::Rng) -> f64 {
        loop {
            let x = self.inner.sample(rng);
            if rng.f64() < (self.f)(x) {
                return x;
            }
        }
    }
}
