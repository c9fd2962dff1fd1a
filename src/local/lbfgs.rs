//! Limited-memory BFGS state machine.

use std::collections::VecDeque;

use super::{LocalError, Method, Step};

/// Number of curvature pairs kept in memory.
const DEFAULT_MEMORY: usize = 10;
/// Infinity-norm gradient tolerance for convergence.
const GRAD_TOL: f64 = 1e-8;
/// Infinity-norm step tolerance for convergence.
const STEP_TOL: f64 = 1e-11;
/// Sufficient-decrease constant for the Armijo condition.
const ARMIJO_C1: f64 = 1e-4;
/// Maximum halvings during backtracking.
const MAX_BACKTRACKS: usize = 30;
/// Accepted steps with negligible improvement before giving up.
const STALL_LIMIT: usize = 5;
/// Curvature threshold below which an (s, y) pair is discarded.
const MIN_CURVATURE: f64 = 1e-10;

/// L-BFGS with Armijo backtracking.
///
/// Maintains the inverse Hessian approximation through limited-memory
/// `(s, y)` pairs and the standard two-loop recursion. The first step uses
/// a gradient-scaled trial length; later steps start the line search at 1.
pub(crate) struct Lbfgs {
    memory: usize,
    s: VecDeque<Vec<f64>>,
    y: VecDeque<Vec<f64>>,
    rho: VecDeque<f64>,
    /// Previous iterate and gradient, for the next curvature pair.
    prev: Option<(Vec<f64>, Vec<f64>)>,
    /// Consecutive accepted steps with negligible improvement.
    stall: usize,
}

impl Lbfgs {
    pub(crate) fn new() -> Self {
        Self {
            memory: DEFAULT_MEMORY,
            s: VecDeque::new(),
            y: VecDeque::new(),
            rho: VecDeque::new(),
            prev: None,
            stall: 0,
        }
    }

    /// Two-loop recursion producing the search direction `−H·grad`.
    fn direction(&self, grad: &[f64]) -> Vec<f64> {
        let k = self.s.len();
        if k == 0 {
            return grad.iter().map(|&g| -g).collect();
        }

        let mut q = grad.to_vec();
        let mut alpha = vec![0.0; k];
        for i in (0..k).rev() {
            alpha[i] = self.rho[i] * dot(&self.s[i], &q);
            for (qj, yj) in q.iter_mut().zip(&self.y[i]) {
                *qj -= alpha[i] * yj;
            }
        }

        // Initial Hessian approximation H0 = gamma·I from the newest pair.
        let last = k - 1;
        let sy = dot(&self.s[last], &self.y[last]);
        let yy = dot(&self.y[last], &self.y[last]);
        let gamma = if yy > 1e-30 { sy / yy } else { 1.0 };
        for qj in &mut q {
            *qj *= gamma;
        }

        for i in 0..k {
            let beta = self.rho[i] * dot(&self.y[i], &q);
            for (qj, sj) in q.iter_mut().zip(&self.s[i]) {
                *qj += (alpha[i] - beta) * sj;
            }
        }

        for qj in &mut q {
            *qj = -*qj;
        }
        q
    }

    fn push_pair(&mut self, s: Vec<f64>, y: Vec<f64>) {
        let sy = dot(&s, &y);
        if sy <= MIN_CURVATURE {
            return;
        }
        if self.s.len() >= self.memory {
            self.s.pop_front();
            self.y.pop_front();
            self.rho.pop_front();
        }
        self.rho.push_back(1.0 / sy);
        self.s.push_back(s);
        self.y.push_back(y);
    }
}

impl Method for Lbfgs {
    fn init(&mut self, _x: &mut [f64]) {
        self.s.clear();
        self.y.clear();
        self.rho.clear();
        self.prev = None;
        self.stall = 0;
    }

    fn step(
        &mut self,
        x: &mut [f64],
        fx: f64,
        grad: &[f64],
        f: &mut dyn FnMut(&[f64]) -> f64,
    ) -> Result<Step, LocalError> {
        if !fx.is_finite() || grad.iter().any(|g| !g.is_finite()) {
            return Err(LocalError::NonFinite);
        }
        if inf_norm(grad) < GRAD_TOL {
            return Ok(Step::Converged);
        }

        // Record the curvature pair from the previous iterate. The incoming
        // x already reflects any projection a wrapper applied.
        if let Some((px, pg)) = self.prev.take() {
            let s: Vec<f64> = x.iter().zip(&px).map(|(a, b)| a - b).collect();
            let y: Vec<f64> = grad.iter().zip(&pg).map(|(a, b)| a - b).collect();
            self.push_pair(s, y);
        }

        let mut d = self.direction(grad);
        let mut dd = dot(grad, &d);
        if dd >= 0.0 {
            // Stale curvature produced an ascent direction; fall back to
            // steepest descent.
            self.s.clear();
            self.y.clear();
            self.rho.clear();
            d = grad.iter().map(|&g| -g).collect();
            dd = -dot(grad, grad);
            if dd >= 0.0 {
                return Ok(Step::Converged);
            }
        }

        let mut t = if self.s.is_empty() {
            (1.0 / norm(grad)).min(1.0)
        } else {
            1.0
        };

        let mut accepted: Option<(Vec<f64>, f64)> = None;
        for _ in 0..MAX_BACKTRACKS {
            let xt: Vec<f64> = x.iter().zip(&d).map(|(xi, di)| xi + t * di).collect();
            let ft = f(&xt);
            if ft.is_finite() && ft <= fx + ARMIJO_C1 * t * dd {
                accepted = Some((xt, ft));
                break;
            }
            t *= 0.5;
        }
        let Some((xt, ft)) = accepted else {
            return Err(LocalError::LineSearch);
        };

        self.prev = Some((x.to_vec(), grad.to_vec()));

        let moved = x
            .iter()
            .zip(&xt)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        x.copy_from_slice(&xt);

        if moved < STEP_TOL {
            return Ok(Step::Converged);
        }
        if fx - ft < 1e-12 {
            self.stall += 1;
            if self.stall >= STALL_LIMIT {
                return Err(LocalError::NoProgress);
            }
        } else {
            self.stall = 0;
        }

        Ok(Step::Continue)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

fn inf_norm(a: &[f64]) -> f64 {
    a.iter().fold(0.0, |acc, v| acc.max(v.abs()))
}
