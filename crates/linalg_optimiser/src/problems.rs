//! Built-in test problems with known minimisers.
//!
//! | Problem | `f(x)` | Dimension | Minimiser |
//! |---------|--------|-----------|-----------|
//! | Paraboloid | `1 + Σ(xᵢ + 5)²` | any | `(-5, …, -5)` |
//! | Rosenbrock | `Σ (1 - xᵢ)² + 100(xᵢ₊₁ - xᵢ²)²` | any | `(1, …, 1)` |
//! | Quadratic | `3x² + xy + y²/2 - x + 2y` | 2 | `(0.6, -2.6)` |

use std::fmt;
use std::str::FromStr;

use linalg_core::Vector;

use crate::error::OptimiserError;
use crate::minimizer::Objective;

/// Shifted paraboloid `1 + Σ(xᵢ + 5)²`, minimum 1 at `xᵢ = -5`.
pub fn paraboloid() -> Objective {
    Objective::new(
        |x: &Vector<f64>| 1.0 + x.add_scalar(5.0).norm_squared(),
        |x: &Vector<f64>| x.map(|xi| 2.0 * (xi + 5.0)),
    )
}

/// Chained Rosenbrock function, minimum 0 at `xᵢ = 1`.
///
/// In one dimension it reduces to `(1 - x)²`.
pub fn rosenbrock() -> Objective {
    Objective::new(rosenbrock_value, rosenbrock_gradient)
}

fn rosenbrock_value(x: &Vector<f64>) -> f64 {
    let xs = x.as_slice();
    let mut total = 0.0;
    for (i, &xi) in xs.iter().enumerate() {
        total += (1.0 - xi).powi(2);
        if let Some(&next) = xs.get(i + 1) {
            total += 100.0 * (next - xi * xi).powi(2);
        }
    }
    total
}

fn rosenbrock_gradient(x: &Vector<f64>) -> Vector<f64> {
    let xs = x.as_slice();
    let mut grad = x.map(|xi| -2.0 * (1.0 - xi));
    for i in 0..xs.len().saturating_sub(1) {
        let r = xs[i + 1] - xs[i] * xs[i];
        grad[i] -= 400.0 * xs[i] * r;
        grad[i + 1] += 200.0 * r;
    }
    grad
}

/// Convex quadratic `3x² + xy + y²/2 - x + 2y`, minimum at `(0.6, -2.6)`.
///
/// Only the first two coordinates contribute; further ones have zero
/// gradient. Missing coordinates read as zero.
pub fn quadratic() -> Objective {
    fn coords(x: &Vector<f64>) -> (f64, f64) {
        (x.get(0).unwrap_or(0.0), x.get(1).unwrap_or(0.0))
    }

    Objective::new(
        |x: &Vector<f64>| {
            let (a, b) = coords(x);
            3.0 * a * a + a * b + 0.5 * b * b - a + 2.0 * b
        },
        |x: &Vector<f64>| {
            let (a, b) = coords(x);
            let mut grad = x.map(|_| 0.0);
            grad[0] = 6.0 * a + b - 1.0;
            if grad.len() > 1 {
                grad[1] = a + b + 2.0;
            }
            grad
        },
    )
}

/// Named built-in problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Problem {
    /// See [`paraboloid`].
    Paraboloid,
    /// See [`rosenbrock`].
    Rosenbrock,
    /// See [`quadratic`].
    Quadratic,
}

impl Problem {
    /// All built-in problems.
    pub const ALL: [Problem; 3] = [Self::Paraboloid, Self::Rosenbrock, Self::Quadratic];

    /// Objective and gradient of the problem.
    pub fn objective(&self) -> Objective {
        match self {
            Self::Paraboloid => paraboloid(),
            Self::Rosenbrock => rosenbrock(),
            Self::Quadratic => quadratic(),
        }
    }

    /// Dimension the problem requires, if fixed.
    pub fn dimension(&self) -> Option<usize> {
        match self {
            Self::Quadratic => Some(2),
            Self::Paraboloid | Self::Rosenbrock => None,
        }
    }

    /// Known minimiser in `dimension` coordinates.
    pub fn minimiser(&self, dimension: usize) -> Option<Vector<f64>> {
        match self {
            Self::Paraboloid => Vector::filled(-5.0, dimension).ok(),
            Self::Rosenbrock => Vector::filled(1.0, dimension).ok(),
            Self::Quadratic => Vector::from_vec(vec![0.6, -2.6]).ok(),
        }
    }

    /// Check that `x0` has a dimension the problem accepts.
    ///
    /// # Errors
    ///
    /// Returns `OptimiserError::InvalidConfig` on a dimension mismatch.
    pub fn check_start(&self, x0: &Vector<f64>) -> Result<(), OptimiserError> {
        match self.dimension() {
            Some(n) if n != x0.len() => Err(OptimiserError::InvalidConfig(format!(
                "{} needs a {}-dimensional start point, got {}",
                self,
                n,
                x0.len()
            ))),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paraboloid => write!(f, "paraboloid"),
            Self::Rosenbrock => write!(f, "rosenbrock"),
            Self::Quadratic => write!(f, "quadratic"),
        }
    }
}

impl FromStr for Problem {
    type Err = OptimiserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "paraboloid" | "bowl" => Ok(Self::Paraboloid),
            "rosenbrock" => Ok(Self::Rosenbrock),
            "quadratic" => Ok(Self::Quadratic),
            _ => Err(OptimiserError::InvalidConfig(format!(
                "Unknown problem: {}",
                s
            ))),
        }
    }
}
