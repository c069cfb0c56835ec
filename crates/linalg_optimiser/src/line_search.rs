//! Backtracking line search.
//!
//! Given a point `x`, its value `f(x)`, gradient `g` and a direction `p`, the
//! search picks a step length `α` along `p`.
//!
//! ## Armijo policy
//!
//! With `m = g·p` and `t = -c·m`, a step is acceptable when
//! `f(x) - f(x + αp) ≥ α·t`. If the seed step is acceptable the search
//! keeps growing `α ← α/τ` while the inequality holds and `α ≤ max_step`,
//! returning the largest acceptable step. Otherwise it shrinks `α ← τ·α`
//! until the inequality holds or `α < min_step`.
//!
//! Near a minimum `f(x) - f(x + αp)` drops below the rounding error of
//! `f(x)`. Inside that band the test is replaced by its derivative form
//! `g(x + αp)·p ≤ (2c - 1)·m`, which keeps measuring progress.
//!
//! ## Wolfe policy
//!
//! Accepts `α` only when both
//! `f(x + αp) ≤ f(x) + c1·α·m` and `g(x + αp)·p ≥ c2·m` hold. Failing the
//! first shrinks the bracket from above, failing the second from below;
//! until an upper bound exists the step grows by `1/τ`. The first condition
//! switches to its derivative form inside the rounding band as well.

use linalg_core::Vector;

use crate::config::{LineSearchConfig, LineSearchPolicy};
use crate::error::OptimiserError;
use crate::minimizer::Objective;

/// Accepted step of a line search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSearchOutcome {
    /// Step length along the direction.
    pub alpha: f64,
    /// `f(x + α·p)`, or `f(x)` when no step was accepted.
    pub value: f64,
    /// Objective evaluations spent.
    pub evaluations: usize,
    /// Whether `alpha` satisfies the acceptance test.
    pub accepted: bool,
}

/// Line search; one instance applies one policy consistently.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineSearch {
    config: LineSearchConfig,
}

/// Evaluated trial point.
struct Trial {
    value: f64,
    point: Vector<f64>,
}

impl LineSearch {
    /// Create a line search from its constants.
    pub fn new(config: LineSearchConfig) -> Self {
        Self { config }
    }

    /// Constants in use.
    pub fn config(&self) -> &LineSearchConfig {
        &self.config
    }

    /// Search along `p` from `x`, seeded with `alpha0`.
    ///
    /// `fx` must be `f(x)` and `g` must be `∇f(x)`.
    ///
    /// # Errors
    ///
    /// Propagates shape errors and `OptimiserError::GradientDimension` from
    /// the gradient callback.
    pub fn search(
        &self,
        objective: &Objective,
        x: &Vector<f64>,
        fx: f64,
        g: &Vector<f64>,
        p: &Vector<f64>,
        alpha0: f64,
    ) -> Result<LineSearchOutcome, OptimiserError> {
        let slope = g.dot(p)?;
        let alpha0 = alpha0.clamp(self.config.min_step, self.config.max_step);
        match self.config.policy {
            LineSearchPolicy::Armijo => self.armijo(objective, x, fx, p, slope, alpha0),
            LineSearchPolicy::Wolfe => self.wolfe(objective, x, fx, p, slope, alpha0),
        }
    }

    fn trial(
        &self,
        objective: &Objective,
        x: &Vector<f64>,
        p: &Vector<f64>,
        alpha: f64,
    ) -> Result<Trial, OptimiserError> {
        let point = x.add(&p.scale(alpha))?;
        let value = objective.value(&point);
        Ok(Trial { value, point })
    }

    fn sufficient_decrease(
        &self,
        objective: &Objective,
        fx: f64,
        p: &Vector<f64>,
        slope: f64,
        alpha: f64,
        trial: &Trial,
    ) -> Result<bool, OptimiserError> {
        if !trial.value.is_finite() {
            return Ok(false);
        }
        let c = self.config.sufficient_decrease;
        let decrease = fx - trial.value;
        let band = self.config.rounding_band * (1.0 + fx.abs());

        if decrease.abs() <= band {
            let g_new = objective.gradient(&trial.point)?;
            return Ok(g_new.dot(p)? <= (2.0 * c - 1.0) * slope);
        }
        Ok(decrease >= alpha * (-c * slope))
    }

    fn armijo(
        &self,
        objective: &Objective,
        x: &Vector<f64>,
        fx: f64,
        p: &Vector<f64>,
        slope: f64,
        alpha0: f64,
    ) -> Result<LineSearchOutcome, OptimiserError> {
        let cfg = &self.config;
        let mut alpha = alpha0;
        let mut evaluations = 1;
        let first = self.trial(objective, x, p, alpha)?;

        if self.sufficient_decrease(objective, fx, p, slope, alpha, &first)? {
            let mut value = first.value;
            while evaluations < cfg.max_evaluations {
                let next = alpha / cfg.contraction;
                if next > cfg.max_step {
                    break;
                }
                let trial = self.trial(objective, x, p, next)?;
                evaluations += 1;
                if !self.sufficient_decrease(objective, fx, p, slope, next, &trial)? {
                    break;
                }
                alpha = next;
                value = trial.value;
            }
            return Ok(LineSearchOutcome {
                alpha,
                value,
                evaluations,
                accepted: true,
            });
        }

        while evaluations < cfg.max_evaluations {
            alpha *= cfg.contraction;
            if alpha < cfg.min_step {
                break;
            }
            let trial = self.trial(objective, x, p, alpha)?;
            evaluations += 1;
            if self.sufficient_decrease(objective, fx, p, slope, alpha, &trial)? {
                return Ok(LineSearchOutcome {
                    alpha,
                    value: trial.value,
                    evaluations,
                    accepted: true,
                });
            }
        }

        Ok(LineSearchOutcome {
            alpha,
            value: fx,
            evaluations,
            accepted: false,
        })
    }

    fn wolfe(
        &self,
        objective: &Objective,
        x: &Vector<f64>,
        fx: f64,
        p: &Vector<f64>,
        slope: f64,
        alpha0: f64,
    ) -> Result<LineSearchOutcome, OptimiserError> {
        let cfg = &self.config;
        let mut lo: Option<(f64, f64)> = None;
        let mut hi = f64::INFINITY;
        let mut alpha = alpha0;
        let mut evaluations = 0;

        while evaluations < cfg.max_evaluations && alpha >= cfg.min_step {
            let trial = self.trial(objective, x, p, alpha)?;
            evaluations += 1;

            let armijo = if !trial.value.is_finite() {
                false
            } else if (fx - trial.value).abs() <= cfg.rounding_band * (1.0 + fx.abs()) {
                let g_new = objective.gradient(&trial.point)?;
                g_new.dot(p)? <= (2.0 * cfg.c1 - 1.0) * slope
            } else {
                trial.value <= fx + cfg.c1 * alpha * slope
            };
            if !armijo {
                hi = alpha;
                let floor = lo.map_or(0.0, |(a, _)| a);
                alpha = 0.5 * (floor + hi);
                continue;
            }

            let g_new = objective.gradient(&trial.point)?;
            if g_new.dot(p)? >= cfg.c2 * slope {
                return Ok(LineSearchOutcome {
                    alpha,
                    value: trial.value,
                    evaluations,
                    accepted: true,
                });
            }

            lo = Some((alpha, trial.value));
            alpha = if hi.is_finite() {
                0.5 * (alpha + hi)
            } else {
                alpha / cfg.contraction
            };
            if alpha > cfg.max_step {
                break;
            }
        }

        // Exhausted: fall back to the best step satisfying sufficient decrease.
        Ok(match lo {
            Some((alpha, value)) => LineSearchOutcome {
                alpha,
                value,
                evaluations,
                accepted: true,
            },
            None => LineSearchOutcome {
                alpha,
                value: fx,
                evaluations,
                accepted: false,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bowl() -> Objective {
        Objective::new(
            |x: &Vector<f64>| 1.0 + x.add_scalar(5.0).norm_squared(),
            |x: &Vector<f64>| x.add_scalar(5.0).scale(2.0),
        )
    }

    fn point(values: &[f64]) -> Vector<f64> {
        Vector::from_slice(values).unwrap()
    }

    fn search_from(
        search: &LineSearch,
        objective: &Objective,
        x: &Vector<f64>,
        alpha0: f64,
    ) -> LineSearchOutcome {
        let g = objective.gradient(x).unwrap();
        let p = g.neg();
        search
            .search(objective, x, objective.value(x), &g, &p, alpha0)
            .unwrap()
    }

    // ========================================
    // Armijo Tests
    // ========================================

    #[test]
    fn test_shrinks_to_exact_minimiser_on_bowl() {
        let objective = bowl();
        let x = point(&[1.0, 4.0, -5.0]);
        let outcome = search_from(&LineSearch::default(), &objective, &x, 1.0);

        assert!(outcome.accepted);
        assert_relative_eq!(outcome.alpha, 0.5);
        assert_relative_eq!(outcome.value, 1.0);
    }

    #[test]
    fn test_grows_conservative_seed() {
        let objective = bowl();
        let x = point(&[1.0, 4.0, -5.0]);
        let outcome = search_from(&LineSearch::default(), &objective, &x, 1.0 / 64.0);

        assert!(outcome.accepted);
        assert_relative_eq!(outcome.alpha, 0.5);
        assert!(outcome.evaluations > 1);
    }

    #[test]
    fn test_growth_respects_cap() {
        let objective = Objective::new(
            |x: &Vector<f64>| -x[0],
            |_x: &Vector<f64>| Vector::from_vec(vec![-1.0]).unwrap(),
        );
        let config = LineSearchConfig {
            max_step: 8.0,
            ..Default::default()
        };
        let outcome = search_from(&LineSearch::new(config), &objective, &point(&[0.0]), 1.0);

        assert!(outcome.accepted);
        assert_relative_eq!(outcome.alpha, 8.0);
        assert_relative_eq!(outcome.value, -8.0);
    }

    #[test]
    fn test_ascent_direction_is_degenerate() {
        let objective = bowl();
        let x = point(&[1.0, 4.0, -5.0]);
        let g = objective.gradient(&x).unwrap();
        let outcome = LineSearch::default()
            .search(&objective, &x, objective.value(&x), &g, &g, 1.0)
            .unwrap();

        assert!(!outcome.accepted);
        assert!(outcome.alpha < LineSearchConfig::default().min_step);
        assert_eq!(outcome.value, objective.value(&x));
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        let objective = Objective::new(
            |x: &Vector<f64>| if x[0] > 1.0 { f64::NAN } else { -x[0] },
            |_x: &Vector<f64>| Vector::from_vec(vec![-1.0]).unwrap(),
        );
        let outcome = search_from(&LineSearch::default(), &objective, &point(&[0.0]), 4.0);

        assert!(outcome.accepted);
        assert!(outcome.alpha <= 1.0);
    }

    #[test]
    fn test_rounding_band_uses_slope() {
        // Quadratic so close to its minimum that f changes by less than 1e-10.
        let objective = bowl();
        let x = point(&[-5.0 + 1e-7, -5.0, -5.0]);
        let outcome = search_from(&LineSearch::default(), &objective, &x, 1.0);

        assert!(outcome.accepted);
        assert!(outcome.alpha > 0.0 && outcome.alpha <= 0.5);
    }

    // ========================================
    // Wolfe Tests
    // ========================================

    #[test]
    fn test_wolfe_accepts_both_conditions() {
        let objective = bowl();
        let x = point(&[1.0, 4.0, -5.0]);
        let g = objective.gradient(&x).unwrap();
        let p = g.neg();
        let fx = objective.value(&x);
        let config = LineSearchConfig::wolfe();
        let outcome = LineSearch::new(config)
            .search(&objective, &x, fx, &g, &p, 1e-3)
            .unwrap();

        assert!(outcome.accepted);
        let slope = g.dot(&p).unwrap();
        let x_new = x.add(&p.scale(outcome.alpha)).unwrap();
        let slope_new = objective.gradient(&x_new).unwrap().dot(&p).unwrap();
        assert!(outcome.value <= fx + config.c1 * outcome.alpha * slope);
        assert!(slope_new >= config.c2 * slope);
    }

    #[test]
    fn test_wolfe_bisects_overshoot() {
        let objective = bowl();
        let x = point(&[1.0, 4.0, -5.0]);
        let outcome = search_from(&LineSearch::new(LineSearchConfig::wolfe()), &objective, &x, 10.0);

        assert!(outcome.accepted);
        assert!(outcome.alpha < 1.0);
    }

    #[test]
    fn test_wolfe_ascent_is_degenerate() {
        let objective = bowl();
        let x = point(&[1.0, 4.0, -5.0]);
        let g = objective.gradient(&x).unwrap();
        let outcome = LineSearch::new(LineSearchConfig::wolfe())
            .search(&objective, &x, objective.value(&x), &g, &g, 1.0)
            .unwrap();

        assert!(!outcome.accepted);
    }

    #[test]
    fn test_mismatched_direction_is_error() {
        let objective = bowl();
        let x = point(&[1.0, 4.0, -5.0]);
        let g = objective.gradient(&x).unwrap();
        let p = point(&[1.0]);
        let err = LineSearch::default()
            .search(&objective, &x, objective.value(&x), &g, &p, 1.0)
            .unwrap_err();
        assert!(matches!(err, OptimiserError::Linalg(_)));
    }
}
