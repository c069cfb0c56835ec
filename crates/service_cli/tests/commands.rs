//! Commands driven through the library API with layered configuration.

use service_cli::commands::{check, minimize, multiply};
use service_cli::config::{build_config_with, CliArgs, Method};

use linalg_optimiser::{LineSearchPolicy, Problem, Termination};

fn no_env(_name: &str) -> Option<String> {
    None
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_minimize_rosenbrock_with_cli_overrides() {
    let cli = CliArgs {
        method: Some("ncg".to_string()),
        tolerance: Some(1e-6),
        max_iterations: Some(5_000),
        ..Default::default()
    };
    let config = build_config_with(&cli, no_env).unwrap();
    assert_eq!(config.method, Method::Ncg);

    let x0 = minimize::parse_point("-1.2,1").unwrap();
    let report = minimize::solve(Problem::Rosenbrock, x0, &config)
        .await
        .unwrap();

    assert_eq!(report.termination, Termination::Converged);
    assert!((report.solution[0] - 1.0).abs() < 1e-3);
    assert!((report.solution[1] - 1.0).abs() < 1e-3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_minimize_with_wolfe_from_environment() {
    let env = |name: &str| match name {
        "LINALG_LINE_SEARCH" => Some("wolfe".to_string()),
        "LINALG_TOLERANCE" => Some("1e-6".to_string()),
        _ => None,
    };
    let config = build_config_with(&CliArgs::default(), env).unwrap();
    assert_eq!(config.optimiser.line_search.policy, LineSearchPolicy::Wolfe);

    let x0 = minimize::parse_point("4,4").unwrap();
    let report = minimize::solve(Problem::Quadratic, x0, &config)
        .await
        .unwrap();
    assert!(report.termination.is_converged());
    assert!((report.solution[0] - 0.6).abs() < 1e-5);
    assert!((report.solution[1] + 2.6).abs() < 1e-5);
}

#[test]
fn test_multiply_and_check_succeed() {
    multiply::run(32).unwrap();

    let config = build_config_with(&CliArgs::default(), no_env).unwrap();
    check::run(&config).unwrap();
}
