//! Box projection around an unconstrained local method.

use super::{LocalError, Method, Step};

/// Wraps a [`Method`], clamping every iterate into a box.
///
/// The wrapper is transparent to the inner method's state machine: it
/// forwards initialization and stepping unchanged and only mutates
/// coordinate vectors in flight — the iterate after every step, and every
/// line-search probe before evaluation.
pub(crate) struct Bounded<M> {
    inner: M,
    bounds: Vec<(f64, f64)>,
}

impl<M> Bounded<M> {
    pub(crate) fn new(inner: M, bounds: Vec<(f64, f64)>) -> Self {
        Self { inner, bounds }
    }

    fn clamp(bounds: &[(f64, f64)], x: &mut [f64]) {
        for (v, &(min, max)) in x.iter_mut().zip(bounds) {
            *v = v.clamp(min, max);
        }
    }
}

impl<M: Method> Method for Bounded<M> {
    fn init(&mut self, x: &mut [f64]) {
        self.inner.init(x);
        Self::clamp(&self.bounds, x);
    }

    fn step(
        &mut self,
        x: &mut [f64],
        fx: f64,
        grad: &[f64],
        f: &mut dyn FnMut(&[f64]) -> f64,
    ) -> Result<Step, LocalError> {
        let bounds = &self.bounds;
        let mut projected = |p: &[f64]| {
            let mut q = p.to_vec();
            Self::clamp(bounds, &mut q);
            f(&q)
        };
        let result = self.inner.step(x, fx, grad, &mut projected);
        Self::clamp(&self.bounds, x);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::super::Lbfgs;
    use super::*;

    #[test]
    fn test_init_projects_start_point() {
        let mut bounded = Bounded::new(Lbfgs::new(), vec![(0.0, 1.0), (-2.0, 2.0)]);
        let mut x = vec![5.0, -9.0];
        bounded.init(&mut x);
        assert_eq!(x, vec![1.0, -2.0]);
    }

    #[test]
    fn test_step_keeps_iterate_in_box() {
        let mut bounded = Bounded::new(Lbfgs::new(), vec![(5.0, 10.0)]);
        let mut x = vec![5.0];
        bounded.init(&mut x);
        let mut f = |p: &[f64]| p[0] * p[0];
        // Steep downhill gradient tries to leave through the lower bound.
        for _ in 0..10 {
            let fx = f(&x);
            let grad = [2.0 * x[0]];
            if bounded.step(&mut x, fx, &grad, &mut f).is_err() {
                break;
            }
            assert!((5.0..=10.0).contains(&x[0]), "iterate {} escaped", x[0]);
        }
        assert_eq!(x, vec![5.0]);
    }
}
