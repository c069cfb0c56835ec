//! Shared minimiser surface: objective, outcome and the `Minimizer` trait.

use std::fmt;
use std::sync::Arc;

use linalg_core::Vector;

use crate::cancellation::CancellationToken;
use crate::error::OptimiserError;
use crate::handle::MinimizationHandle;

/// Objective callback `f(x)`.
pub type ObjectiveFn = Arc<dyn Fn(&Vector<f64>) -> f64 + Send + Sync>;

/// Gradient callback `∇f(x)`.
pub type GradientFn = Arc<dyn Fn(&Vector<f64>) -> Vector<f64> + Send + Sync>;

/// Progress callback invoked with `(x, ‖∇f(x)‖)` after every accepted step.
pub type ProgressCallback = Arc<dyn Fn(&Vector<f64>, f64) + Send + Sync>;

/// Objective paired with its gradient.
///
/// Both callbacks must be referentially transparent. The gradient length is
/// checked against the input on every evaluation.
///
/// # Example
///
/// ```
/// use linalg_core::Vector;
/// use linalg_optimiser::Objective;
///
/// let objective = Objective::new(
///     |x: &Vector<f64>| x.norm_squared(),
///     |x: &Vector<f64>| x.scale(2.0),
/// );
///
/// let x = Vector::from_vec(vec![1.0, 2.0]).unwrap();
/// assert_eq!(objective.value(&x), 5.0);
/// assert_eq!(objective.gradient(&x).unwrap().as_slice(), &[2.0, 4.0]);
/// ```
#[derive(Clone)]
pub struct Objective {
    value: ObjectiveFn,
    gradient: GradientFn,
}

impl Objective {
    /// Pair an objective with its gradient.
    pub fn new<F, G>(value: F, gradient: G) -> Self
    where
        F: Fn(&Vector<f64>) -> f64 + Send + Sync + 'static,
        G: Fn(&Vector<f64>) -> Vector<f64> + Send + Sync + 'static,
    {
        Self {
            value: Arc::new(value),
            gradient: Arc::new(gradient),
        }
    }

    /// Pair already shared callbacks.
    pub fn from_arcs(value: ObjectiveFn, gradient: GradientFn) -> Self {
        Self { value, gradient }
    }

    /// Evaluate `f(x)`.
    #[inline]
    pub fn value(&self, x: &Vector<f64>) -> f64 {
        (self.value)(x)
    }

    /// Evaluate `∇f(x)`.
    ///
    /// # Errors
    ///
    /// Returns `OptimiserError::GradientDimension` if the callback's output
    /// length differs from `x.len()`.
    pub fn gradient(&self, x: &Vector<f64>) -> Result<Vector<f64>, OptimiserError> {
        let g = (self.gradient)(x);
        if g.len() != x.len() {
            return Err(OptimiserError::GradientDimension {
                expected: x.len(),
                found: g.len(),
            });
        }
        Ok(g)
    }
}

impl fmt::Debug for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Objective").finish_non_exhaustive()
    }
}

/// Kind of numeric breakdown that stopped a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumericFailure {
    /// The line search could not find an acceptable step above `min_step`.
    DegenerateStep,
    /// `|sᵗy|` fell to `curvature_epsilon` or below.
    CurvatureBreakdown,
    /// The gradient norm became NaN; the offending step was rolled back.
    NanGradient,
}

impl fmt::Display for NumericFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateStep => write!(f, "degenerate step"),
            Self::CurvatureBreakdown => write!(f, "curvature breakdown"),
            Self::NanGradient => write!(f, "NaN gradient"),
        }
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// `‖∇f‖ ≤ gradient_tolerance`.
    Converged,
    /// The cancellation token was observed.
    Cancelled,
    /// `max_iterations` steps were taken without converging.
    MaxIterations,
    /// Iteration aborted on a numeric breakdown.
    NumericFailure(NumericFailure),
}

impl Termination {
    /// Whether the run reached the gradient tolerance.
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converged => write!(f, "converged"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::MaxIterations => write!(f, "maximum iterations reached"),
            Self::NumericFailure(kind) => write!(f, "numeric failure: {}", kind),
        }
    }
}

/// Result of one minimisation run.
///
/// `solution` is always the last iterate the run computed, whatever the
/// termination reason.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MinimizationReport {
    /// Final iterate.
    pub solution: Vector<f64>,
    /// Why the run stopped.
    pub termination: Termination,
    /// Accepted steps taken.
    pub iterations: usize,
    /// `‖∇f(solution)‖`
    pub gradient_norm: f64,
    /// `f(solution)`
    pub objective_value: f64,
}

impl MinimizationReport {
    /// Steps taken to reach the final iterate.
    pub fn num_steps_to_converge(&self) -> usize {
        self.iterations
    }
}

/// Gradient-based unconstrained minimiser.
pub trait Minimizer {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Run from `x0` until convergence, cancellation, the iteration limit or a
    /// numeric breakdown.
    ///
    /// The report is also retained and readable through [`Self::last_report`].
    ///
    /// # Errors
    ///
    /// - `OptimiserError::InvalidConfig` if the configuration fails validation
    /// - `OptimiserError::GradientDimension` if the gradient has the wrong length
    fn minimize(
        &mut self,
        x0: &Vector<f64>,
        token: &CancellationToken,
    ) -> Result<MinimizationReport, OptimiserError>;

    /// Report of the most recent completed run.
    fn last_report(&self) -> Option<&MinimizationReport>;

    /// Final iterate of the most recent run.
    fn solution(&self) -> Option<&Vector<f64>> {
        self.last_report().map(|r| &r.solution)
    }

    /// Steps taken by the most recent run.
    fn num_steps_to_converge(&self) -> Option<usize> {
        self.last_report().map(|r| r.iterations)
    }

    /// Run on tokio's blocking pool and return a handle to the pending report.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    fn spawn(mut self, x0: Vector<f64>, token: CancellationToken) -> MinimizationHandle
    where
        Self: Sized + Send + 'static,
    {
        let task_token = token.clone();
        MinimizationHandle::spawn(token, move || self.minimize(&x0, &task_token))
    }
}
