//! Minimiser and line-search configuration types.

use crate::error::OptimiserError;

/// Acceptance test applied by the line search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LineSearchPolicy {
    /// Grow-or-shrink backtracking on the sufficient-decrease inequality.
    #[default]
    Armijo,
    /// Bracketing search on both Wolfe conditions (`c1`, `c2`).
    Wolfe,
}

impl std::fmt::Display for LineSearchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Armijo => write!(f, "armijo"),
            Self::Wolfe => write!(f, "wolfe"),
        }
    }
}

impl std::str::FromStr for LineSearchPolicy {
    type Err = OptimiserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "armijo" => Ok(Self::Armijo),
            "wolfe" => Ok(Self::Wolfe),
            _ => Err(OptimiserError::InvalidConfig(format!(
                "Unknown line search policy: {}",
                s
            ))),
        }
    }
}

/// Tunable constants of the line search.
///
/// # Example
///
/// ```
/// use linalg_optimiser::{LineSearchConfig, LineSearchPolicy};
///
/// let config = LineSearchConfig::default();
/// assert_eq!(config.policy, LineSearchPolicy::Armijo);
/// assert_eq!(config.sufficient_decrease, 0.5);
/// assert_eq!(config.contraction, 0.5);
///
/// let wolfe = LineSearchConfig::wolfe();
/// assert!(wolfe.c1 < wolfe.c2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LineSearchConfig {
    /// Acceptance test.
    pub policy: LineSearchPolicy,

    /// Sufficient-decrease constant `c` of the Armijo policy.
    pub sufficient_decrease: f64,

    /// Factor `τ` applied when shrinking; growth divides by it.
    pub contraction: f64,

    /// Step tried by the first search of a run.
    pub initial_step: f64,

    /// Growth cap on the step length.
    pub max_step: f64,

    /// Steps below this are degenerate.
    pub min_step: f64,

    /// Relative band within which a change in objective value counts as
    /// rounding noise.
    ///
    /// Inside the band the Armijo policy switches to the derivative form of
    /// the sufficient-decrease test. Zero disables the switch.
    pub rounding_band: f64,

    /// Sufficient-decrease constant of the Wolfe policy.
    pub c1: f64,

    /// Curvature constant of the Wolfe policy.
    pub c2: f64,

    /// Objective evaluations allowed per search.
    pub max_evaluations: usize,
}

impl Default for LineSearchConfig {
    /// Default values:
    /// - `policy`: Armijo
    /// - `sufficient_decrease`: 0.5
    /// - `contraction`: 0.5
    /// - `initial_step`: 1.0
    /// - `max_step`: 1e6
    /// - `min_step`: 1e-16
    /// - `rounding_band`: 1e-10
    /// - `c1`: 1e-4
    /// - `c2`: 0.9
    /// - `max_evaluations`: 200
    fn default() -> Self {
        Self {
            policy: LineSearchPolicy::Armijo,
            sufficient_decrease: 0.5,
            contraction: 0.5,
            initial_step: 1.0,
            max_step: 1e6,
            min_step: 1e-16,
            rounding_band: 1e-10,
            c1: 1e-4,
            c2: 0.9,
            max_evaluations: 200,
        }
    }
}

impl LineSearchConfig {
    /// Default constants with the Wolfe policy selected.
    pub fn wolfe() -> Self {
        Self {
            policy: LineSearchPolicy::Wolfe,
            ..Default::default()
        }
    }

    /// Check that every constant is in its admissible range.
    ///
    /// # Errors
    ///
    /// Returns `OptimiserError::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<(), OptimiserError> {
        let open_unit = |v: f64| v > 0.0 && v < 1.0;

        if !open_unit(self.sufficient_decrease) {
            return Err(invalid("sufficient_decrease must be in (0, 1)"));
        }
        if !open_unit(self.contraction) {
            return Err(invalid("contraction must be in (0, 1)"));
        }
        if !(self.min_step > 0.0 && self.min_step < self.max_step && self.max_step.is_finite()) {
            return Err(invalid("step bounds must satisfy 0 < min_step < max_step < inf"));
        }
        if !(self.initial_step >= self.min_step && self.initial_step <= self.max_step) {
            return Err(invalid("initial_step must lie within [min_step, max_step]"));
        }
        if !(self.rounding_band >= 0.0 && self.rounding_band.is_finite()) {
            return Err(invalid("rounding_band must be non-negative"));
        }
        if !(open_unit(self.c1) && open_unit(self.c2) && self.c1 < self.c2) {
            return Err(invalid("Wolfe constants must satisfy 0 < c1 < c2 < 1"));
        }
        if self.max_evaluations == 0 {
            return Err(invalid("max_evaluations must be > 0"));
        }
        Ok(())
    }
}

/// How nonlinear conjugate gradient turns a line search into a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ConjugateStep {
    /// Search along the normalised negative gradient `d/‖d‖` and advance by
    /// `α·s` along the unnormalised conjugate direction.
    ///
    /// The conjugate step is kept only when `s` is a descent direction and
    /// `f(x + α·s)` is no worse than the searched point `f(x + α·d/‖d‖)`.
    /// Otherwise the searched point is taken and `s` restarts from `d`.
    #[default]
    Gradient,
    /// Search along `ŝ = s/‖s‖` and advance by `α·ŝ`.
    Direction,
}

impl std::fmt::Display for ConjugateStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gradient => write!(f, "gradient"),
            Self::Direction => write!(f, "direction"),
        }
    }
}

impl std::str::FromStr for ConjugateStep {
    type Err = OptimiserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gradient" => Ok(Self::Gradient),
            "direction" => Ok(Self::Direction),
            _ => Err(OptimiserError::InvalidConfig(format!(
                "Unknown conjugate step rule: {}",
                s
            ))),
        }
    }
}

/// Configuration shared by the minimisers.
///
/// # Example
///
/// ```
/// use linalg_optimiser::OptimiserConfig;
///
/// let config = OptimiserConfig::default();
/// assert_eq!(config.gradient_tolerance, 1e-8);
/// assert!(config.validate().is_ok());
///
/// let custom = OptimiserConfig::new(1e-10, 500);
/// assert_eq!(custom.max_iterations, 500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OptimiserConfig {
    /// The run converges once `‖∇f(x)‖ ≤ gradient_tolerance`.
    pub gradient_tolerance: f64,

    /// Accepted steps before the run stops with `MaxIterations`.
    pub max_iterations: usize,

    /// BFGS stops with a curvature breakdown when `|sᵗy|` is at or below this.
    pub curvature_epsilon: f64,

    /// Step rule of nonlinear conjugate gradient; BFGS ignores it.
    pub conjugate_step: ConjugateStep,

    /// Line-search constants.
    pub line_search: LineSearchConfig,
}

impl Default for OptimiserConfig {
    /// Default values:
    /// - `gradient_tolerance`: 1e-8
    /// - `max_iterations`: 10_000
    /// - `curvature_epsilon`: 1e-300
    /// - `conjugate_step`: `ConjugateStep::Gradient`
    /// - `line_search`: `LineSearchConfig::default()`
    fn default() -> Self {
        Self {
            gradient_tolerance: 1e-8,
            max_iterations: 10_000,
            curvature_epsilon: 1e-300,
            conjugate_step: ConjugateStep::Gradient,
            line_search: LineSearchConfig::default(),
        }
    }
}

impl OptimiserConfig {
    /// Create a configuration with the given tolerance and iteration limit.
    ///
    /// # Panics
    ///
    /// Panics if `gradient_tolerance <= 0` or `max_iterations == 0`.
    pub fn new(gradient_tolerance: f64, max_iterations: usize) -> Self {
        assert!(gradient_tolerance > 0.0, "gradient_tolerance must be positive");
        assert!(max_iterations > 0, "max_iterations must be > 0");
        Self {
            gradient_tolerance,
            max_iterations,
            ..Default::default()
        }
    }

    /// Tight tolerance (1e-12) and a generous iteration limit (100_000).
    pub fn high_precision() -> Self {
        Self {
            gradient_tolerance: 1e-12,
            max_iterations: 100_000,
            ..Default::default()
        }
    }

    /// Relaxed tolerance (1e-6) and a short iteration limit (1_000).
    pub fn fast() -> Self {
        Self {
            gradient_tolerance: 1e-6,
            max_iterations: 1_000,
            ..Default::default()
        }
    }

    /// Select the conjugate gradient step rule.
    pub fn with_conjugate_step(mut self, conjugate_step: ConjugateStep) -> Self {
        self.conjugate_step = conjugate_step;
        self
    }

    /// Replace the line-search constants.
    pub fn with_line_search(mut self, line_search: LineSearchConfig) -> Self {
        self.line_search = line_search;
        self
    }

    /// Check that every field is in its admissible range.
    ///
    /// # Errors
    ///
    /// Returns `OptimiserError::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<(), OptimiserError> {
        if !(self.gradient_tolerance > 0.0 && self.gradient_tolerance.is_finite()) {
            return Err(invalid("gradient_tolerance must be positive"));
        }
        if self.max_iterations == 0 {
            return Err(invalid("max_iterations must be > 0"));
        }
        if !(self.curvature_epsilon >= 0.0) {
            return Err(invalid("curvature_epsilon must be non-negative"));
        }
        self.line_search.validate()
    }
}

fn invalid(message: &str) -> OptimiserError {
    OptimiserError::InvalidConfig(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OptimiserConfig::default();
        assert!((config.gradient_tolerance - 1e-8).abs() < 1e-20);
        assert_eq!(config.max_iterations, 10_000);
        assert_eq!(config.line_search, LineSearchConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_new_config() {
        let config = OptimiserConfig::new(1e-12, 200);
        assert!((config.gradient_tolerance - 1e-12).abs() < 1e-24);
        assert_eq!(config.max_iterations, 200);
    }

    #[test]
    #[should_panic(expected = "gradient_tolerance must be positive")]
    fn test_new_config_zero_tolerance_panics() {
        let _ = OptimiserConfig::new(0.0, 100);
    }

    #[test]
    #[should_panic(expected = "max_iterations must be > 0")]
    fn test_new_config_zero_iterations_panics() {
        let _ = OptimiserConfig::new(1e-8, 0);
    }

    #[test]
    fn test_presets() {
        let precise = OptimiserConfig::high_precision();
        let fast = OptimiserConfig::fast();
        assert!(precise.gradient_tolerance < fast.gradient_tolerance);
        assert!(precise.max_iterations > fast.max_iterations);
        assert!(precise.validate().is_ok());
        assert!(fast.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_tolerance() {
        let config = OptimiserConfig {
            gradient_tolerance: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(OptimiserError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_line_search() {
        let mut ls = LineSearchConfig::default();
        ls.contraction = 1.0;
        assert!(ls.validate().is_err());

        let mut ls = LineSearchConfig::wolfe();
        ls.c1 = 0.95;
        assert!(ls.validate().is_err());

        let mut ls = LineSearchConfig::default();
        ls.initial_step = 1e7;
        assert!(ls.validate().is_err());

        let config = OptimiserConfig::default().with_line_search(LineSearchConfig {
            max_evaluations: 0,
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Wolfe".parse::<LineSearchPolicy>().unwrap(), LineSearchPolicy::Wolfe);
        assert_eq!("armijo".parse::<LineSearchPolicy>().unwrap(), LineSearchPolicy::Armijo);
        assert!("newton".parse::<LineSearchPolicy>().is_err());
        assert_eq!(LineSearchPolicy::Wolfe.to_string(), "wolfe");
    }

    #[test]
    fn test_conjugate_step_from_str() {
        assert_eq!(OptimiserConfig::default().conjugate_step, ConjugateStep::Gradient);
        assert_eq!(
            "Direction".parse::<ConjugateStep>().unwrap(),
            ConjugateStep::Direction
        );
        assert!(matches!(
            "polak-ribiere".parse::<ConjugateStep>(),
            Err(OptimiserError::InvalidConfig(_))
        ));
        assert_eq!(ConjugateStep::Gradient.to_string(), "gradient");

        let config = OptimiserConfig::fast().with_conjugate_step(ConjugateStep::Direction);
        assert_eq!(config.conjugate_step, ConjugateStep::Direction);
        assert_eq!(config.max_iterations, 1_000);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: OptimiserConfig = toml::from_str(
            r#"
            gradient_tolerance = 1e-6

            [line_search]
            policy = "wolfe"
            "#,
        )
        .unwrap();
        assert_eq!(config.gradient_tolerance, 1e-6);
        assert_eq!(config.max_iterations, 10_000);
        assert_eq!(config.line_search.policy, LineSearchPolicy::Wolfe);
        assert_eq!(config.line_search.c2, 0.9);
        assert_eq!(config.conjugate_step, ConjugateStep::Gradient);

        let config: OptimiserConfig = toml::from_str("conjugate_step = \"direction\"").unwrap();
        assert_eq!(config.conjugate_step, ConjugateStep::Direction);
    }
}
