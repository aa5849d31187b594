//! Limited-memory BFGS minimizer
//!
//! Approximates the inverse Hessian from the last few position/gradient
//! differences (two-loop recursion) and picks step sizes with an Armijo
//! backtracking line search.

use ndarray::Array1;
use std::collections::VecDeque;

/// Armijo sufficient-decrease constant
const ARMIJO_C1: f64 = 1e-4;
/// Step shrink factor per backtracking round
const BACKTRACK_RHO: f64 = 0.5;
const MAX_LINE_SEARCH_STEPS: usize = 50;
/// Curvature pairs with `s·y` at or below this are not stored
const MIN_CURVATURE: f64 = 1e-10;

/// Why the optimizer stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceStatus {
    /// Largest gradient component fell to the tolerance
    Converged,
    /// Iteration budget exhausted
    MaxIterations,
    /// Line search could not find a decreasing step
    Stalled,
}

#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub solution: Array1<f64>,
    pub objective_value: f64,
    /// `max |∇f|` at the solution
    pub gradient_max: f64,
    pub iterations: usize,
    pub status: ConvergenceStatus,
}

#[derive(Debug, Clone)]
pub struct Lbfgs {
    pub max_iter: usize,
    /// Stop once `max |∇f| <= tol`
    pub tol: f64,
    /// Number of correction pairs kept
    pub history: usize,
}

impl Default for Lbfgs {
    fn default() -> Self {
        Self {
            max_iter: 100,
            tol: 1e-4,
            history: 10,
        }
    }
}

struct Correction {
    s: Array1<f64>,
    y: Array1<f64>,
    rho: f64,
}

impl Lbfgs {
    pub fn new(max_iter: usize, tol: f64, history: usize) -> Self {
        Self {
            max_iter,
            tol,
            history: history.max(1),
        }
    }

    /// Minimize `f` starting from `x0`. `fg` returns the objective value and
    /// its gradient at a point.
    pub fn minimize<F>(&self, mut fg: F, x0: Array1<f64>) -> OptimizationResult
    where
        F: FnMut(&Array1<f64>) -> (f64, Array1<f64>),
    {
        let mut x = x0;
        let (mut fx, mut grad) = fg(&x);
        let mut history: VecDeque<Correction> = VecDeque::with_capacity(self.history);

        for iter in 0..self.max_iter {
            let gmax = max_abs(&grad);
            if gmax <= self.tol {
                return OptimizationResult {
                    solution: x,
                    objective_value: fx,
                    gradient_max: gmax,
                    iterations: iter,
                    status: ConvergenceStatus::Converged,
                };
            }

            let mut direction = Self::direction(&grad, &history);
            let mut slope = grad.dot(&direction);
            if slope >= 0.0 {
                // Not a descent direction: restart from steepest descent
                history.clear();
                direction = grad.mapv(|g| -g);
                slope = grad.dot(&direction);
            }

            let mut step = if history.is_empty() {
                (1.0 / l2_norm(&grad)).min(1.0)
            } else {
                1.0
            };

            let mut accepted = None;
            for _ in 0..MAX_LINE_SEARCH_STEPS {
                let candidate = &x + &(&direction * step);
                let (f_new, g_new) = fg(&candidate);
                if f_new.is_finite() && f_new <= fx + ARMIJO_C1 * step * slope {
                    accepted = Some((candidate, f_new, g_new));
                    break;
                }
                step *= BACKTRACK_RHO;
            }

            let Some((x_new, f_new, g_new)) = accepted else {
                return OptimizationResult {
                    solution: x,
                    objective_value: fx,
                    gradient_max: gmax,
                    iterations: iter,
                    status: ConvergenceStatus::Stalled,
                };
            };

            let s = &x_new - &x;
            let y = &g_new - &grad;
            let sy = s.dot(&y);
            if sy > MIN_CURVATURE {
                if history.len() == self.history {
                    history.pop_front();
                }
                history.push_back(Correction { s, y, rho: 1.0 / sy });
            }

            x = x_new;
            fx = f_new;
            grad = g_new;
        }

        let gmax = max_abs(&grad);
        let status = if gmax <= self.tol {
            ConvergenceStatus::Converged
        } else {
            ConvergenceStatus::MaxIterations
        };

        OptimizationResult {
            solution: x,
            objective_value: fx,
            gradient_max: gmax,
            iterations: self.max_iter,
            status,
        }
    }

    /// Two-loop recursion: approximates `-H⁻¹ ∇f`
    fn direction(grad: &Array1<f64>, history: &VecDeque<Correction>) -> Array1<f64> {
        let mut q = grad.mapv(|g| -g);
        if history.is_empty() {
            return q;
        }

        let mut alphas = vec![0.0; history.len()];
        for (i, c) in history.iter().enumerate().rev() {
            let alpha = c.rho * c.s.dot(&q);
            q.scaled_add(-alpha, &c.y);
            alphas[i] = alpha;
        }

        if let Some(last) = history.back() {
            let gamma = last.s.dot(&last.y) / last.y.dot(&last.y);
            q *= gamma;
        }

        for (i, c) in history.iter().enumerate() {
            let beta = c.rho * c.y.dot(&q);
            q.scaled_add(alphas[i] - beta, &c.s);
        }
        q
    }
}

fn max_abs(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0, |m, x| m.max(x.abs()))
}

fn l2_norm(v: &Array1<f64>) -> f64 {
    v.dot(v).sqrt()
}
