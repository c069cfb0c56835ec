//! Minimize command implementation
//!
//! Runs BFGS or nonlinear conjugate gradient on a built-in problem using the
//! async handle, cancelling on timeout or Ctrl-C.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use linalg_core::Vector;
use linalg_optimiser::{
    BfgsMinimizer, CancellationToken, MinimizationReport, Minimizer, NonlinearConjugateGradient,
    Problem, ProgressCallback,
};
use tracing::{info, warn};

use crate::config::{CliConfig, Method};
use crate::{CliError, Result};

/// Iterations between progress log lines
const PROGRESS_EVERY: usize = 100;

/// Parse a comma-separated start point such as `1,4,-5`
pub fn parse_point(text: &str) -> Result<Vector<f64>> {
    let values = text
        .split(',')
        .map(|part| {
            part.trim().parse::<f64>().map_err(|_| {
                CliError::InvalidArgument(format!("Invalid coordinate '{}' in '{}'", part, text))
            })
        })
        .collect::<Result<Vec<f64>>>()?;
    Ok(Vector::from_vec(values)?)
}

fn progress_logger() -> ProgressCallback {
    let calls = AtomicUsize::new(0);
    Arc::new(move |_x: &Vector<f64>, gradient_norm: f64| {
        let iteration = calls.fetch_add(1, Ordering::Relaxed) + 1;
        if iteration % PROGRESS_EVERY == 0 {
            info!(iteration, gradient_norm, "Minimisation in progress");
        }
    })
}

/// Run the configured method asynchronously and wait for its report
pub async fn solve(
    problem: Problem,
    x0: Vector<f64>,
    config: &CliConfig,
) -> Result<MinimizationReport> {
    problem.check_start(&x0)?;

    let token = CancellationToken::new();
    let objective = problem.objective();
    let handle = match config.method {
        Method::Bfgs => BfgsMinimizer::new(objective)
            .with_config(config.optimiser)
            .with_progress(progress_logger())
            .spawn(x0, token.clone()),
        Method::Ncg => NonlinearConjugateGradient::new(objective)
            .with_config(config.optimiser)
            .with_progress(progress_logger())
            .spawn(x0, token.clone()),
    };

    if let Some(timeout_ms) = config.timeout_ms {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(timeout_ms)).await;
            if !token.is_cancelled() {
                warn!(timeout_ms, "Timeout reached, cancelling minimisation");
                token.cancel();
            }
        });
    }

    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling minimisation");
            interrupt.cancel();
        }
    });

    Ok(handle.join().await?)
}

/// Run the minimize command
pub fn run(problem: &str, x0: &str, config: &CliConfig) -> Result<()> {
    let problem: Problem = problem.parse()?;
    let x0 = parse_point(x0)?;

    info!("Starting minimisation...");
    info!("  Method: {}", config.method);
    info!("  Problem: {}", problem);
    info!("  Start point: {}", x0);
    info!("  Gradient tolerance: {:e}", config.optimiser.gradient_tolerance);
    info!("  Line search: {}", config.optimiser.line_search.policy);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let started = Instant::now();
    let report = runtime.block_on(solve(problem, x0, config))?;
    let elapsed = started.elapsed();

    println!("\n┌──────────────────┬──────────────────────────────────────┐");
    println!("│ Method           │ {:<36} │", config.method.to_string());
    println!("│ Problem          │ {:<36} │", problem.to_string());
    println!("│ Termination      │ {:<36} │", report.termination.to_string());
    println!("│ Iterations       │ {:<36} │", report.iterations);
    println!("│ f(x)             │ {:<36.12e} │", report.objective_value);
    println!("│ ‖∇f(x)‖          │ {:<36.3e} │", report.gradient_norm);
    println!("│ Elapsed          │ {:<36} │", format!("{:.3?}", elapsed));
    println!("└──────────────────┴──────────────────────────────────────┘");
    println!("x = {}", report.solution);

    if let Some(expected) = problem.minimiser(report.solution.len()) {
        let error = report.solution.sub(&expected)?.euclidean_norm();
        info!("Distance to known minimiser: {:.3e}", error);
    }

    info!("Minimisation complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use linalg_optimiser::Termination;

    #[test]
    fn test_parse_point() {
        let x = parse_point("1, 4,-5").unwrap();
        assert_eq!(x.as_slice(), &[1.0, 4.0, -5.0]);

        assert!(matches!(
            parse_point("1,,2"),
            Err(CliError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse_point("one"),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_solve_paraboloid_with_both_methods() {
        for method in [Method::Bfgs, Method::Ncg] {
            let config = CliConfig {
                method,
                ..Default::default()
            };
            let x0 = parse_point("1,4,-5").unwrap();
            let report = solve(Problem::Paraboloid, x0, &config).await.unwrap();

            assert_eq!(report.termination, Termination::Converged);
            for xi in report.solution.iter() {
                assert_relative_eq!(xi, -5.0, epsilon = 1e-8);
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_solve_rejects_wrong_dimension() {
        let x0 = parse_point("1,2,3").unwrap();
        let result = solve(Problem::Quadratic, x0, &CliConfig::default()).await;
        assert!(matches!(result, Err(CliError::Optimiser(_))));
    }

    #[test]
    fn test_run_rejects_unknown_problem() {
        assert!(matches!(
            run("himmelblau", "0,0", &CliConfig::default()),
            Err(CliError::Optimiser(_))
        ));
    }
}
