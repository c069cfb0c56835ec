//! Minimisations spawned onto tokio's blocking pool.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use linalg_core::Vector;
use linalg_optimiser::prelude::*;
use linalg_optimiser::problems;

fn rosenbrock_start() -> Vector<f64> {
    Vector::from_vec(vec![-1.2, 1.0]).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_spawned_run_converges() {
    let handle = NonlinearConjugateGradient::new(problems::paraboloid())
        .spawn(Vector::from_vec(vec![1.0, 4.0, -5.0]).unwrap(), CancellationToken::new());

    let report = tokio::time::timeout(Duration::from_secs(30), handle.join())
        .await
        .expect("run timed out")
        .unwrap();

    assert!(report.termination.is_converged());
    for xi in report.solution.iter() {
        assert!((xi + 5.0).abs() < 1e-8);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_through_handle_keeps_last_iterate() {
    let token = CancellationToken::new();
    let (first_step_tx, first_step_rx) = mpsc::channel();
    let seen = Arc::new(Mutex::new(Vec::new()));

    // Park the run inside its first progress callback until cancelled.
    let progress: ProgressCallback = {
        let token = token.clone();
        let seen = Arc::clone(&seen);
        Arc::new(move |x: &Vector<f64>, _norm: f64| {
            seen.lock().unwrap().push(x.clone());
            let _ = first_step_tx.send(());
            while !token.is_cancelled() {
                std::thread::sleep(Duration::from_millis(1));
            }
        })
    };

    let handle = BfgsMinimizer::new(problems::rosenbrock())
        .with_progress(progress)
        .spawn(rosenbrock_start(), token);

    tokio::task::spawn_blocking(move || first_step_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(!handle.is_finished());
    handle.cancel();
    assert!(handle.token().is_cancelled());

    let report = handle.join().await.unwrap();
    assert_eq!(report.termination, Termination::Cancelled);
    assert_eq!(report.iterations, 1);
    assert_eq!(seen.lock().unwrap().last(), Some(&report.solution));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_panicking_objective_surfaces_as_task_failure() {
    let objective = Objective::new(
        |_x: &Vector<f64>| panic!("objective exploded"),
        |x: &Vector<f64>| x.clone(),
    );
    let handle = BfgsMinimizer::new(objective).spawn(rosenbrock_start(), CancellationToken::new());

    assert!(matches!(
        handle.join().await,
        Err(OptimiserError::TaskFailed(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_runs_are_independent() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let x0 = Vector::filled(i as f64, 3).unwrap();
            BfgsMinimizer::new(problems::paraboloid()).spawn(x0, CancellationToken::new())
        })
        .collect();

    for handle in handles {
        let report = handle.join().await.unwrap();
        assert!(report.termination.is_converged());
    }
}
