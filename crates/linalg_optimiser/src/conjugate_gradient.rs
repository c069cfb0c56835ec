//! Fletcher-Reeves nonlinear conjugate gradient minimiser.
//!
//! With `d = -∇f(x)` the current negative gradient and `s` the conjugate
//! direction, each iteration computes
//!
//! ```text
//! β = (d_next·d_next) / (d·d)
//! s ← d_next + β·s
//! ```
//!
//! The first direction is the normalised steepest descent `d₀/‖d₀‖`. The
//! accepted step length seeds the next search, and when `s` stops being a
//! descent direction the method restarts from `s = d_next`.
//!
//! ## Step rules
//!
//! | `ConjugateStep` | Searched along | Advance |
//! |-----------------|----------------|---------|
//! | `Gradient` (default) | `d/‖d‖` | `x + α·s` |
//! | `Direction` | `s/‖s‖` | `x + α·s/‖s‖` |
//!
//! Under `Gradient` the length `α` is measured along the gradient while the
//! move follows `s`, which is longer than one unit whenever `‖d‖ > 1`. The
//! conjugate move is committed only when it does at least as well as the
//! searched point `x + α·d/‖d‖`. Otherwise the searched point is taken and
//! `s` restarts from the steepest descent.

use linalg_core::Vector;
use tracing::{debug, info, warn};

use crate::cancellation::CancellationToken;
use crate::config::{ConjugateStep, OptimiserConfig};
use crate::error::OptimiserError;
use crate::line_search::LineSearch;
use crate::minimizer::{
    MinimizationReport, Minimizer, NumericFailure, Objective, ProgressCallback, Termination,
};

/// Nonlinear conjugate gradient minimiser (Fletcher-Reeves).
///
/// # Example
///
/// ```
/// use linalg_core::Vector;
/// use linalg_optimiser::{problems, CancellationToken, Minimizer, NonlinearConjugateGradient};
///
/// let mut ncg = NonlinearConjugateGradient::new(problems::paraboloid());
/// let x0 = Vector::from_vec(vec![1.0, 4.0, -5.0]).unwrap();
///
/// let report = ncg.minimize(&x0, &CancellationToken::new()).unwrap();
/// assert!(report.termination.is_converged());
/// ```
#[derive(Clone)]
pub struct NonlinearConjugateGradient {
    objective: Objective,
    config: OptimiserConfig,
    progress: Option<ProgressCallback>,
    last_report: Option<MinimizationReport>,
}

impl NonlinearConjugateGradient {
    /// Create a minimiser with the default configuration.
    pub fn new(objective: Objective) -> Self {
        Self {
            objective,
            config: OptimiserConfig::default(),
            progress: None,
            last_report: None,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: OptimiserConfig) -> Self {
        self.config = config;
        self
    }

    /// Install a progress callback.
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &OptimiserConfig {
        &self.config
    }

    fn run(
        &self,
        x0: &Vector<f64>,
        token: &CancellationToken,
    ) -> Result<MinimizationReport, OptimiserError> {
        self.config.validate()?;
        let cfg = &self.config;
        let line_search = LineSearch::new(cfg.line_search);

        let mut x = x0.clone();
        let mut fx = self.objective.value(&x);
        let mut grad = self.objective.gradient(&x)?;
        let mut grad_norm = grad.euclidean_norm();
        let mut descent = grad.neg();
        let mut direction = descent.div_scalar(grad_norm);
        let mut step = cfg.line_search.initial_step;
        let mut iterations = 0;

        let report = |x: &Vector<f64>, fx, grad_norm, iterations, termination| MinimizationReport {
            solution: x.clone(),
            termination,
            iterations,
            gradient_norm: grad_norm,
            objective_value: fx,
        };

        loop {
            if token.is_cancelled() {
                return Ok(report(&x, fx, grad_norm, iterations, Termination::Cancelled));
            }
            if grad_norm.is_nan() {
                let termination = Termination::NumericFailure(NumericFailure::NanGradient);
                return Ok(report(&x, fx, grad_norm, iterations, termination));
            }
            if grad_norm <= cfg.gradient_tolerance {
                return Ok(report(&x, fx, grad_norm, iterations, Termination::Converged));
            }
            if iterations >= cfg.max_iterations {
                return Ok(report(&x, fx, grad_norm, iterations, Termination::MaxIterations));
            }

            let unit = match cfg.conjugate_step {
                ConjugateStep::Gradient => descent.div_scalar(grad_norm),
                ConjugateStep::Direction => direction.div_scalar(direction.euclidean_norm()),
            };
            let outcome = line_search.search(&self.objective, &x, fx, &grad, &unit, step)?;
            let alpha = outcome.alpha;
            if !outcome.accepted || alpha.is_nan() || alpha < cfg.line_search.min_step {
                let termination = Termination::NumericFailure(NumericFailure::DegenerateStep);
                return Ok(report(&x, fx, grad_norm, iterations, termination));
            }

            let searched = x.add(&unit.scale(alpha))?;
            let (x_next, fx_next, conjugate) = match cfg.conjugate_step {
                ConjugateStep::Direction => (searched, outcome.value, true),
                ConjugateStep::Gradient => {
                    let stepped = x.add(&direction.scale(alpha))?;
                    let value = self.objective.value(&stepped);
                    if value <= outcome.value {
                        (stepped, value, true)
                    } else {
                        debug!(iteration = iterations, alpha, "Conjugate step rejected");
                        (searched, outcome.value, false)
                    }
                }
            };

            let grad_next = self.objective.gradient(&x_next)?;
            let grad_norm_next = grad_next.euclidean_norm();
            if grad_norm_next.is_nan() {
                let termination = Termination::NumericFailure(NumericFailure::NanGradient);
                return Ok(report(&x, fx, grad_norm, iterations, termination));
            }

            let descent_next = grad_next.neg();
            let beta = descent_next.norm_squared() / descent.norm_squared();
            direction = if conjugate {
                descent_next.add(&direction.scale(beta))?
            } else {
                descent_next.clone()
            };
            if direction.dot(&grad_next)? >= 0.0 {
                debug!(iteration = iterations, "Restarting along steepest descent");
                direction = descent_next.clone();
            }

            x = x_next;
            fx = fx_next;
            grad = grad_next;
            grad_norm = grad_norm_next;
            descent = descent_next;
            step = alpha;
            iterations += 1;

            if token.is_cancelled() {
                return Ok(report(&x, fx, grad_norm, iterations, Termination::Cancelled));
            }
            debug!(iteration = iterations, alpha, beta, gradient_norm = grad_norm, "NCG step");
            if let Some(progress) = &self.progress {
                progress(&x, grad_norm);
            }
        }
    }
}

impl Minimizer for NonlinearConjugateGradient {
    fn name(&self) -> &'static str {
        "ncg"
    }

    fn minimize(
        &mut self,
        x0: &Vector<f64>,
        token: &CancellationToken,
    ) -> Result<MinimizationReport, OptimiserError> {
        let report = self.run(x0, token)?;
        match report.termination {
            Termination::Converged | Termination::MaxIterations => info!(
                method = self.name(),
                iterations = report.iterations,
                gradient_norm = report.gradient_norm,
                termination = %report.termination,
                "Minimisation finished"
            ),
            Termination::Cancelled | Termination::NumericFailure(_) => warn!(
                method = self.name(),
                iterations = report.iterations,
                gradient_norm = report.gradient_norm,
                termination = %report.termination,
                "Minimisation stopped early"
            ),
        }
        self.last_report = Some(report.clone());
        Ok(report)
    }

    fn last_report(&self) -> Option<&MinimizationReport> {
        self.last_report.as_ref()
    }
}
